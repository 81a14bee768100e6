use lstar_core::prelude::*;
use tracing::debug;

use crate::{
    error::{LearningError, Violation},
    table::{ObservationTable, RowId},
};

/// A hypothesis automaton together with an access word for each of its states. The access word
/// of a state is the label of the short row from which the state was built, it is what the
/// counterexample analysis uses to reach that state in the target.
#[derive(Debug, Clone)]
pub struct Hypothesis<H: Machine> {
    automaton: H,
    access: Vec<Word<H::Symbol>>,
}

impl<H: Machine> Hypothesis<H> {
    /// Pairs `automaton` with one access word per state.
    pub fn new(automaton: H, access: Vec<Word<H::Symbol>>) -> Self {
        debug_assert_eq!(automaton.size(), access.len());
        Self { automaton, access }
    }

    /// The hypothesis automaton.
    pub fn automaton(&self) -> &H {
        &self.automaton
    }

    /// Consumes `self` and returns the automaton.
    pub fn into_automaton(self) -> H {
        self.automaton
    }

    /// The access word of `state`.
    pub fn access_word(&self, state: StateIndex) -> Option<&Word<H::Symbol>> {
        self.access.get(state)
    }

    /// The access words, indexed by state.
    pub fn access_words(&self) -> &[Word<H::Symbol>] {
        &self.access
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.automaton.size()
    }
}

impl<H: Machine + std::fmt::Display> std::fmt::Display for Hypothesis<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.automaton)
    }
}

/// Something that L* can produce from a closed and consistent observation table.
pub trait LStarHypothesis: Machine + Sized {
    /// The columns that every table needs, so that the outputs of the hypothesis can be read
    /// off the table.
    fn mandatory_suffixes(alphabet: &Alphabet<Self::Symbol>) -> Vec<Word<Self::Symbol>>;

    /// Builds the hypothesis of a closed and consistent table.
    fn from_table(
        table: &ObservationTable<Self::Symbol, Self::Output>,
    ) -> Result<Hypothesis<Self>, LearningError>;
}

type Skeleton<S, Q, C> = (TransitionTable<S, Q, C>, StateIndex, Vec<Word<S>>);

/// Creates one state per content id of the short rows, the state of the empty word first and
/// the others in the order in which their rows became short. A transition is taken from the
/// first short row that has the content of its source.
fn assemble<S, O, Q, C, F, G>(
    table: &ObservationTable<S, O>,
    state_color: F,
    edge_color: G,
) -> Result<Skeleton<S, Q, C>, LearningError>
where
    S: Symbol,
    O: Output,
    F: Fn(RowId) -> Result<Q, Violation>,
    G: Fn(RowId, usize) -> Result<C, Violation>,
{
    let start = std::time::Instant::now();
    if let Some(unclosed) = table.find_unclosed_row() {
        let label = table.row(unclosed.successor).label().show();
        return Err(Violation::NotClosed(label).into());
    }
    if let Some(inconsistency) = table.find_inconsistency() {
        return Err(Violation::NotConsistent(
            table.row(inconsistency.first).label().show(),
            table.row(inconsistency.second).label().show(),
        )
        .into());
    }

    let epsilon = table
        .find_row(&Word::epsilon())
        .filter(|id| table.row(*id).is_short())
        .ok_or_else(|| Violation::MissingRow(Word::<S>::epsilon().show()))?;
    let order = std::iter::once(epsilon)
        .chain(table.short_rows().iter().copied().filter(|id| *id != epsilon))
        .collect::<Vec<_>>();

    let mut ts = TransitionTable::new(table.alphabet().clone());
    let mut state_of = math::Map::default();
    let mut access = vec![];
    for &id in &order {
        let row = table.row(id);
        if state_of.contains_key(&row.content_id()) {
            continue;
        }
        let state = ts.add_state(state_color(id)?);
        state_of.insert(row.content_id(), state);
        access.push(row.label().clone());
    }

    for &id in &order {
        let row = table.row(id);
        let source = state_of[&row.content_id()];
        for (i, successor) in row.successors().iter().enumerate() {
            if ts.transition(source, i).is_some() {
                continue;
            }
            let successor = table.row(*successor);
            let target = *state_of
                .get(&successor.content_id())
                .ok_or_else(|| Violation::NotClosed(successor.label().show()))?;
            ts.set_transition(source, i, target, edge_color(id, i)?)?;
        }
    }

    debug!(
        "building hypothesis with {} states took {} microseconds",
        access.len(),
        start.elapsed().as_micros()
    );
    Ok((ts, state_of[&table.row(epsilon).content_id()], access))
}

fn column<S: Symbol, O: Output>(
    table: &ObservationTable<S, O>,
    suffix: &Word<S>,
) -> Result<usize, Violation> {
    table
        .column_of(suffix)
        .ok_or_else(|| Violation::MissingColumn(suffix.show()))
}

fn singleton_columns<S: Symbol, O: Output>(
    table: &ObservationTable<S, O>,
) -> Result<Vec<usize>, Violation> {
    table
        .alphabet()
        .singletons()
        .iter()
        .map(|suffix| column(table, suffix))
        .collect()
}

fn cell<S: Symbol, O: Output>(
    table: &ObservationTable<S, O>,
    row: RowId,
    column: usize,
) -> Result<&O, Violation> {
    table
        .cell_contents(row, column)
        .ok_or_else(|| Violation::MissingColumn(format!("#{column}")))
}

/// Reads the single output symbol that a one-symbol column holds.
fn single_output<S: Symbol, O: Symbol>(
    table: &ObservationTable<S, Word<O>>,
    row: RowId,
    column: usize,
) -> Result<O, Violation> {
    cell(table, row, column)?.first_symbol().cloned().ok_or_else(|| {
        let word = table.row(row).label().concat(&table.suffixes()[column]);
        Violation::MalformedAnswer(word.show())
    })
}

impl<S: Symbol> LStarHypothesis for Dfa<S> {
    fn mandatory_suffixes(_alphabet: &Alphabet<S>) -> Vec<Word<S>> {
        vec![Word::epsilon()]
    }

    fn from_table(table: &ObservationTable<S, bool>) -> Result<Hypothesis<Self>, LearningError> {
        let epsilon = column(table, &Word::epsilon())?;
        let (ts, initial, access) =
            assemble(table, |row| cell(table, row, epsilon).copied(), |_, _| Ok(()))?;
        Ok(Hypothesis::new(ts.into_dfa(initial)?, access))
    }
}

impl<S: Symbol, O: Symbol> LStarHypothesis for MealyMachine<S, O> {
    fn mandatory_suffixes(alphabet: &Alphabet<S>) -> Vec<Word<S>> {
        alphabet.singletons()
    }

    fn from_table(table: &ObservationTable<S, Word<O>>) -> Result<Hypothesis<Self>, LearningError> {
        let columns = singleton_columns(table)?;
        let (ts, initial, access) = assemble(
            table,
            |_| Ok(()),
            |row, symbol| single_output(table, row, columns[symbol]),
        )?;
        Ok(Hypothesis::new(ts.into_mealy(initial)?, access))
    }
}

impl<S: Symbol, O: Symbol> LStarHypothesis for MooreMachine<S, O> {
    fn mandatory_suffixes(alphabet: &Alphabet<S>) -> Vec<Word<S>> {
        alphabet.singletons()
    }

    /// The table holds the outputs of the Mealy encoding, where every transition emits the
    /// output of its source. The output of a state is therefore read from the column of the
    /// first symbol.
    fn from_table(table: &ObservationTable<S, Word<O>>) -> Result<Hypothesis<Self>, LearningError> {
        let first = singleton_columns(table)?[0];
        let (ts, initial, access) = assemble(
            table,
            |row| single_output(table, row, first),
            |_, _| Ok(()),
        )?;
        Ok(Hypothesis::new(ts.into_moore(initial)?, access))
    }
}

#[cfg(test)]
mod tests {
    use lstar_core::prelude::*;

    use super::LStarHypothesis;
    use crate::{
        error::{LearningError, Violation},
        maintenance::{close_table, make_consistent},
        oracle::{MembershipOracle, SimulatorOracle},
        table::ObservationTable,
    };

    fn stabilized<M>(
        alphabet: Alphabet<char>,
        mandatory: Vec<Word<char>>,
        oracle: &mut M,
    ) -> ObservationTable<char, M::Output>
    where
        M: MembershipOracle<Symbol = char>,
    {
        let mut table = ObservationTable::new(alphabet);
        table
            .initialize(vec![Word::epsilon()], mandatory, oracle)
            .unwrap();
        loop {
            close_table(&mut table, oracle).unwrap();
            if make_consistent(&mut table, oracle).unwrap().is_empty() {
                return table;
            }
        }
    }

    fn xyz_moore() -> MooreMachine<char, char> {
        MooreMachine::from_parts(
            Alphabet::of_size(3),
            vec!['x', 'y', 'z', 'x'],
            [
                (0, 'a', 1),
                (0, 'b', 2),
                (0, 'c', 0),
                (1, 'a', 1),
                (1, 'b', 2),
                (1, 'c', 0),
                (2, 'a', 0),
                (2, 'b', 1),
                (2, 'c', 3),
                (3, 'a', 0),
                (3, 'b', 1),
                (3, 'c', 2),
            ],
            0,
        )
        .unwrap()
    }

    #[test_log::test]
    fn hypotheses_are_total_and_deterministic() {
        let target = xyz_moore().to_mealy();
        let alphabet = target.alphabet().clone();
        let mandatory = MealyMachine::<char, char>::mandatory_suffixes(&alphabet);
        let mut oracle = SimulatorOracle::new(target.clone());
        let table = stabilized(alphabet, mandatory, &mut oracle);

        let hypothesis = MealyMachine::from_table(&table).unwrap();
        assert_eq!(hypothesis.size(), table.number_of_states());
        assert_eq!(hypothesis.access_word(0), Some(&Word::epsilon()));
        let automaton = hypothesis.automaton();
        for q in 0..automaton.size() {
            for i in automaton.alphabet().indices() {
                assert!(automaton.successor(q, i) < automaton.size());
            }
            let access = hypothesis.access_word(q).unwrap();
            assert_eq!(automaton.reached_state(access).unwrap(), q);
        }
        for word in automaton.alphabet().words_up_to(2) {
            assert_eq!(
                automaton.output(&word).unwrap(),
                target.output(&word).unwrap()
            );
        }
    }

    #[test_log::test]
    fn moore_hypotheses_read_state_outputs() {
        let target = xyz_moore();
        let alphabet = target.alphabet().clone();
        let mandatory = MooreMachine::<char, char>::mandatory_suffixes(&alphabet);
        let mut oracle = SimulatorOracle::new(target.clone());
        let table = stabilized(alphabet, mandatory, &mut oracle);

        let hypothesis = MooreMachine::from_table(&table).unwrap();
        let automaton = hypothesis.automaton();
        assert_eq!(automaton.state_output(automaton.initial()), &'x');
        for (q, access) in hypothesis.access_words().iter().enumerate() {
            assert_eq!(
                automaton.state_output(q),
                &target.reached_output(access).unwrap()
            );
        }
    }

    #[test]
    fn unclosed_tables_are_rejected() {
        let target = Dfa::from_parts(
            Alphabet::of_size(2),
            vec![true, false],
            [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
            0,
        )
        .unwrap();
        let mut oracle = SimulatorOracle::new(target);
        let mut table = ObservationTable::new(Alphabet::of_size(2));
        table
            .initialize(vec![Word::epsilon()], vec![Word::epsilon()], &mut oracle)
            .unwrap();
        assert_eq!(
            Dfa::from_table(&table).unwrap_err(),
            LearningError::InvariantViolation(Violation::NotClosed("a".into()))
        );

        let mut empty = ObservationTable::<char, bool>::new(Alphabet::of_size(2));
        empty
            .initialize(vec![], vec![Word::epsilon()], &mut oracle)
            .unwrap();
        assert_eq!(
            Dfa::from_table(&empty).unwrap_err(),
            LearningError::InvariantViolation(Violation::MissingRow("ε".into()))
        );
    }
}
