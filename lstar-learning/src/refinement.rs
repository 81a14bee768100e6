use lstar_core::prelude::*;
use tracing::{debug, trace};

use crate::{
    config::CounterexampleComparison,
    error::{LearningError, Violation},
    hypothesis::Hypothesis,
    oracle::{Counterexample, MembershipOracle},
    table::ObservationTable,
};

/// Result of decomposing a counterexample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary<S: Symbol> {
    /// The remainder of the counterexample at the first split where the target stops agreeing
    /// with it. Adding it as a column separates two rows that the hypothesis merges.
    Suffix(Word<S>),
    /// The target agrees with the counterexample on every split that leaves a non-empty
    /// remainder.
    Exhausted,
}

/// How the table was changed to account for a counterexample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refinement<S: Symbol> {
    /// The given suffixes were added as columns.
    Columns(Vec<Word<S>>),
    /// The given prefixes of the counterexample became short rows.
    ShortPrefixes(Vec<Word<S>>),
}

impl<S: Symbol> std::fmt::Display for Refinement<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Refinement::Columns(columns) => write!(f, "added columns {}", columns.show()),
            Refinement::ShortPrefixes(rows) => write!(f, "added short rows {}", rows.show()),
        }
    }
}

/// Decomposes a counterexample `w` in the manner of Rivest and Schapire. For every split
/// `w = uv`, the state that the hypothesis reaches on `u` is replaced by its access word `u'`
/// and the target is asked for `u'v`. The first split at which the answer stops agreeing with
/// the counterexample determines the boundary.
pub fn find_boundary<H, M>(
    hypothesis: &Hypothesis<H>,
    counterexample: &Counterexample<H::Symbol, H::Output>,
    oracle: &mut M,
    comparison: CounterexampleComparison,
) -> Result<Boundary<H::Symbol>, LearningError>
where
    H: Machine,
    M: MembershipOracle<Symbol = H::Symbol, Output = H::Output>,
{
    let word = &counterexample.input;
    let expected = &counterexample.output;
    let automaton = hypothesis.automaton();

    if automaton.output(word)? == *expected {
        return Err(Violation::SpuriousCounterexample(counterexample.to_string()).into());
    }
    let actual = oracle.answer(word)?;
    if actual != *expected {
        return Err(Violation::ContradictingAnswer {
            word: word.show(),
            expected: expected.show(),
            actual: actual.show(),
        }
        .into());
    }

    for split in 1..=word.len() {
        let suffix = word.skip(split);
        let state = automaton.reached_state(&word.prefix(split))?;
        let access = hypothesis
            .access_word(state)
            .ok_or_else(|| Violation::MissingRow(format!("q{state}")))?;
        let answer = oracle.answer(&access.concat(&suffix))?;
        let agrees = match comparison {
            CounterexampleComparison::SuffixOutput => {
                answer.tail(suffix.len()) == expected.tail(suffix.len())
            }
            CounterexampleComparison::TrailingSymbol => answer.trailing() == expected.trailing(),
        };
        trace!(
            "split {split}: q{state} reached by {access}, answer {} on {suffix} {}",
            answer.show(),
            if agrees { "agrees" } else { "disagrees" }
        );
        if !agrees {
            return Ok(match suffix.is_empty() {
                true => Boundary::Exhausted,
                false => Boundary::Suffix(suffix),
            });
        }
    }
    Ok(Boundary::Exhausted)
}

/// Adds `suffix` and all of its non-empty suffixes as columns. Returns those that were new.
pub fn refine_columns<S, O, M>(
    table: &mut ObservationTable<S, O>,
    suffix: &Word<S>,
    oracle: &mut M,
) -> Result<Vec<Word<S>>, LearningError>
where
    S: Symbol,
    O: Output,
    M: MembershipOracle<Symbol = S, Output = O>,
{
    table.add_suffixes(suffix.non_empty_suffixes(), oracle)
}

/// Turns every prefix of `word` into a short row. Returns the labels of the rows that became
/// short.
pub fn refine_short_prefixes<S, O, M>(
    table: &mut ObservationTable<S, O>,
    word: &Word<S>,
    oracle: &mut M,
) -> Result<Vec<Word<S>>, LearningError>
where
    S: Symbol,
    O: Output,
    M: MembershipOracle<Symbol = S, Output = O>,
{
    let promoted = table.add_short_prefixes(word.prefixes(true), oracle)?;
    Ok(promoted
        .into_iter()
        .map(|id| table.row(id).label().clone())
        .collect())
}

/// Processes a counterexample. If the decomposition yields a suffix that is not yet a column,
/// it is added with its suffixes. Otherwise, all prefixes of the counterexample become short
/// rows. Fails if neither changes the table.
pub fn refine<H, M>(
    table: &mut ObservationTable<H::Symbol, H::Output>,
    hypothesis: &Hypothesis<H>,
    counterexample: &Counterexample<H::Symbol, H::Output>,
    oracle: &mut M,
    comparison: CounterexampleComparison,
) -> Result<Refinement<H::Symbol>, LearningError>
where
    H: Machine,
    M: MembershipOracle<Symbol = H::Symbol, Output = H::Output>,
{
    if let Boundary::Suffix(suffix) = find_boundary(hypothesis, counterexample, oracle, comparison)?
    {
        let columns = refine_columns(table, &suffix, oracle)?;
        if !columns.is_empty() {
            debug!("counterexample {counterexample} yields suffix {suffix}");
            return Ok(Refinement::Columns(columns));
        }
        debug!("all suffixes of {suffix} are columns already");
    }

    let rows = refine_short_prefixes(table, &counterexample.input, oracle)?;
    if rows.is_empty() {
        return Err(Violation::Stalled("processing a counterexample").into());
    }
    debug!(
        "counterexample {counterexample} yields {} short rows",
        rows.len()
    );
    Ok(Refinement::ShortPrefixes(rows))
}

#[cfg(test)]
mod tests {
    use lstar_core::prelude::*;

    use super::{find_boundary, refine, Boundary, Refinement};
    use crate::{
        config::CounterexampleComparison,
        error::{LearningError, Violation},
        hypothesis::{Hypothesis, LStarHypothesis},
        maintenance::{close_table, make_consistent},
        oracle::{Counterexample, SimulatorOracle},
        table::ObservationTable,
    };

    /// Emits `1` on every third `a`, `b` emits `0` and resets the count.
    fn third_a() -> MealyMachine<char, u8> {
        MealyMachine::from_parts(
            Alphabet::of_size(2),
            3,
            [
                (0, 'a', 0, 1),
                (0, 'b', 0, 0),
                (1, 'a', 0, 2),
                (1, 'b', 0, 0),
                (2, 'a', 1, 0),
                (2, 'b', 0, 0),
            ],
            0,
        )
        .unwrap()
    }

    type Setup = (
        ObservationTable<char, Word<u8>>,
        Hypothesis<MealyMachine<char, u8>>,
        SimulatorOracle<MealyMachine<char, u8>>,
    );

    fn first_round() -> Setup {
        let mut oracle = SimulatorOracle::new(third_a());
        let alphabet = Alphabet::of_size(2);
        let mut table = ObservationTable::new(alphabet.clone());
        table
            .initialize(
                vec![Word::epsilon()],
                MealyMachine::<char, u8>::mandatory_suffixes(&alphabet),
                &mut oracle,
            )
            .unwrap();
        assert!(close_table(&mut table, &mut oracle).unwrap().is_empty());
        assert!(make_consistent(&mut table, &mut oracle).unwrap().is_empty());
        let hypothesis = MealyMachine::from_table(&table).unwrap();
        assert_eq!(hypothesis.size(), 1);
        (table, hypothesis, oracle)
    }

    fn counterexample() -> Counterexample<char, Word<u8>> {
        Counterexample::new(Word::from("aaab"), Word::from(vec![0, 0, 1, 0]))
    }

    #[test_log::test]
    fn suffix_output_finds_a_column() {
        let (mut table, hypothesis, mut oracle) = first_round();
        assert_eq!(
            find_boundary(
                &hypothesis,
                &counterexample(),
                &mut oracle,
                CounterexampleComparison::SuffixOutput
            )
            .unwrap(),
            Boundary::Suffix(Word::from("aab"))
        );

        let refinement = refine(
            &mut table,
            &hypothesis,
            &counterexample(),
            &mut oracle,
            CounterexampleComparison::SuffixOutput,
        )
        .unwrap();
        assert_eq!(
            refinement,
            Refinement::Columns(vec![Word::from("ab"), Word::from("aab")])
        );
    }

    #[test_log::test]
    fn trailing_symbol_falls_back_to_prefixes() {
        let (mut table, hypothesis, mut oracle) = first_round();
        assert_eq!(
            find_boundary(
                &hypothesis,
                &counterexample(),
                &mut oracle,
                CounterexampleComparison::TrailingSymbol
            )
            .unwrap(),
            Boundary::Exhausted
        );

        let before = table.number_of_rows() * table.number_of_suffixes();
        let refinement = refine(
            &mut table,
            &hypothesis,
            &counterexample(),
            &mut oracle,
            CounterexampleComparison::TrailingSymbol,
        )
        .unwrap();
        assert_eq!(
            refinement,
            Refinement::ShortPrefixes(vec![
                Word::from("a"),
                Word::from("aa"),
                Word::from("aaa"),
                Word::from("aaab"),
            ])
        );
        assert!(table.number_of_rows() * table.number_of_suffixes() > before);
        for prefix in counterexample().input.prefixes(true) {
            let row = table.find_row(&prefix).unwrap();
            assert!(table.row(row).is_short());
        }
    }

    #[test]
    fn bad_counterexamples_are_violations() {
        let (mut table, hypothesis, mut oracle) = first_round();
        let agreeing = Counterexample::new(Word::from("ab"), Word::from(vec![0, 0]));
        assert!(matches!(
            refine(
                &mut table,
                &hypothesis,
                &agreeing,
                &mut oracle,
                CounterexampleComparison::SuffixOutput
            ),
            Err(LearningError::InvariantViolation(
                Violation::SpuriousCounterexample(_)
            ))
        ));

        let lying = Counterexample::new(Word::from("ab"), Word::from(vec![1, 0]));
        assert!(matches!(
            refine(
                &mut table,
                &hypothesis,
                &lying,
                &mut oracle,
                CounterexampleComparison::SuffixOutput
            ),
            Err(LearningError::InvariantViolation(
                Violation::ContradictingAnswer { .. }
            ))
        ));
    }
}
