use itertools::Itertools;
use lstar_core::prelude::*;
use tracing::{debug, trace};

use crate::{
    error::{LearningError, Violation},
    oracle::MembershipOracle,
    table::{Inconsistency, ObservationTable},
};

/// Promotes rows until the table is closed. Whenever a short row has a successor that matches
/// no short row, the successor and its prefixes become short rows. Returns the labels of all
/// rows that were promoted.
pub fn close_table<S, O, M>(
    table: &mut ObservationTable<S, O>,
    oracle: &mut M,
) -> Result<Vec<Word<S>>, LearningError>
where
    S: Symbol,
    O: Output,
    M: MembershipOracle<Symbol = S, Output = O>,
{
    let start = std::time::Instant::now();
    let mut promoted = vec![];
    while let Some(unclosed) = table.find_unclosed_row() {
        let label = table.row(unclosed.successor).label().clone();
        trace!("table is not closed, promoting {label}");
        let rows = table.add_short_prefixes(label.prefixes(true), oracle)?;
        if rows.is_empty() {
            return Err(Violation::Stalled("closing the table").into());
        }
        promoted.extend(rows.into_iter().map(|id| table.row(id).label().clone()));
    }
    if !promoted.is_empty() {
        debug!(
            "closing the table promoted {} rows and took {} microseconds",
            promoted.len(),
            start.elapsed().as_micros()
        );
    }
    Ok(promoted)
}

/// Adds columns until the table is consistent. For every inconsistency, a distinguishing
/// suffix and all of its non-empty suffixes become columns. Returns the added suffixes.
pub fn make_consistent<S, O, M>(
    table: &mut ObservationTable<S, O>,
    oracle: &mut M,
) -> Result<Vec<Word<S>>, LearningError>
where
    S: Symbol,
    O: Output,
    M: MembershipOracle<Symbol = S, Output = O>,
{
    let mut added = vec![];
    while let Some(inconsistency) = table.find_inconsistency() {
        let suffix = find_distinguishing_suffix(table, &inconsistency)?;
        let columns = table.add_suffixes(suffix.non_empty_suffixes(), oracle)?;
        if columns.is_empty() {
            return Err(Violation::Stalled("resolving an inconsistency").into());
        }
        added.extend(columns);
    }
    if !added.is_empty() {
        debug!("made table consistent with columns {}", added.iter().join(", "));
    }
    Ok(added)
}

/// Computes a suffix that separates the two rows of an inconsistency. The successors of the
/// rows differ in some column `v`, so the symbol of the inconsistency followed by `v`
/// separates the rows themselves.
pub fn find_distinguishing_suffix<S: Symbol, O: Output>(
    table: &ObservationTable<S, O>,
    inconsistency: &Inconsistency,
) -> Result<Word<S>, Violation> {
    let Inconsistency {
        first,
        second,
        symbol,
    } = *inconsistency;
    let bogus = || Violation::BogusInconsistency {
        first: table.row(first).label().show(),
        second: table.row(second).label().show(),
        symbol: table
            .alphabet()
            .nth(symbol)
            .map(Show::show)
            .unwrap_or_else(|| format!("#{symbol}")),
    };

    let sym = table.alphabet().nth(symbol).ok_or_else(bogus)?;
    let (Some(left), Some(right)) = (
        table.row(first).successor(symbol),
        table.row(second).successor(symbol),
    ) else {
        return Err(bogus());
    };

    table
        .row_contents(left)
        .iter()
        .zip(table.row_contents(right))
        .position(|(l, r)| l != r)
        .map(|column| table.suffixes()[column].prepend(sym.clone()))
        .ok_or_else(bogus)
}

#[cfg(test)]
mod tests {
    use lstar_core::prelude::*;

    use super::{close_table, find_distinguishing_suffix, make_consistent};
    use crate::{
        error::Violation,
        oracle::SimulatorOracle,
        table::{Inconsistency, ObservationTable},
    };

    /// Accepts precisely `ε` and `a`.
    fn epsilon_or_a() -> Dfa<char> {
        Dfa::from_parts(
            Alphabet::of_size(2),
            vec![true, true, false],
            [
                (0, 'a', 1),
                (0, 'b', 2),
                (1, 'a', 2),
                (1, 'b', 2),
                (2, 'a', 2),
                (2, 'b', 2),
            ],
            0,
        )
        .unwrap()
    }

    fn inconsistent_table(
        oracle: &mut SimulatorOracle<Dfa<char>>,
    ) -> ObservationTable<char, bool> {
        let mut table = ObservationTable::new(Alphabet::of_size(2));
        table
            .initialize(
                vec![Word::epsilon(), Word::from("a")],
                vec![Word::epsilon(), Word::from("b")],
                oracle,
            )
            .unwrap();
        table
    }

    #[test_log::test]
    fn distinguishing_suffix_splits_rows() {
        let mut oracle = SimulatorOracle::new(epsilon_or_a());
        let mut table = inconsistent_table(&mut oracle);
        let inconsistency = table.find_inconsistency().unwrap();
        assert_eq!(
            find_distinguishing_suffix(&table, &inconsistency),
            Ok(Word::from("a"))
        );

        let (first, second) = (inconsistency.first, inconsistency.second);
        assert_eq!(
            table.row(first).content_id(),
            table.row(second).content_id()
        );
        let added = make_consistent(&mut table, &mut oracle).unwrap();
        assert_eq!(added, vec![Word::from("a")]);
        assert_ne!(
            table.row(first).content_id(),
            table.row(second).content_id()
        );
        assert!(table.is_consistent());
    }

    #[test_log::test]
    fn bogus_inconsistencies_are_reported() {
        let mut oracle = SimulatorOracle::new(epsilon_or_a());
        let table = inconsistent_table(&mut oracle);
        let bogus = Inconsistency {
            first: 0,
            second: 1,
            symbol: 1,
        };
        assert_eq!(
            find_distinguishing_suffix(&table, &bogus),
            Err(Violation::BogusInconsistency {
                first: "ε".into(),
                second: "a".into(),
                symbol: "b".into()
            })
        );
    }

    #[test_log::test]
    fn maintenance_is_idempotent() {
        let mut oracle = SimulatorOracle::new(epsilon_or_a());
        let mut table = inconsistent_table(&mut oracle);
        loop {
            close_table(&mut table, &mut oracle).unwrap();
            if make_consistent(&mut table, &mut oracle).unwrap().is_empty() {
                break;
            }
        }
        assert!(table.is_closed() && table.is_consistent());

        let (rows, columns) = (table.number_of_rows(), table.number_of_suffixes());
        assert!(close_table(&mut table, &mut oracle).unwrap().is_empty());
        assert!(make_consistent(&mut table, &mut oracle).unwrap().is_empty());
        assert_eq!(table.number_of_rows(), rows);
        assert_eq!(table.number_of_suffixes(), columns);
        assert_eq!(table.number_of_states(), 3);
    }
}
