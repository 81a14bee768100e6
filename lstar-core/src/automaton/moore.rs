use crate::{alphabet::Alphabet, word::Word, Show, Symbol};

use super::{AutomatonError, Dts, Machine, StateIndex, TransitionTable};

/// A Moore machine is a transition system where each state has an output. Usually, we are
/// interested in the output of the state that is reached by a word, see
/// [`MooreMachine::reached_output`]. In contrast to a [`super::MealyMachine`], the empty word
/// produces an output as well, namely that of the initial state.
///
/// As a [`Machine`], a Moore machine behaves like its Mealy encoding (see
/// [`MooreMachine::to_mealy`]): every transition emits the output of the state it leaves.
#[derive(Clone, Debug)]
pub struct MooreMachine<S: Symbol, O: Symbol> {
    ts: Dts<S, O, ()>,
    initial: StateIndex,
}

impl<S: Symbol, O: Symbol> MooreMachine<S, O> {
    pub(super) fn from_dts(ts: Dts<S, O, ()>, initial: StateIndex) -> Self {
        Self { ts, initial }
    }

    /// Builds a Moore machine from the outputs of its states and a list of transitions
    /// `(source, symbol, target)`.
    pub fn from_parts<I>(
        alphabet: Alphabet<S>,
        outputs: Vec<O>,
        transitions: I,
        initial: StateIndex,
    ) -> Result<Self, AutomatonError>
    where
        I: IntoIterator<Item = (StateIndex, S, StateIndex)>,
    {
        let mut table = TransitionTable::new(alphabet);
        for out in outputs {
            table.add_state(out);
        }
        for (from, sym, to) in transitions {
            table.add_transition(from, &sym, to, ())?;
        }
        table.into_moore(initial)
    }

    /// Returns the output of `state`.
    pub fn state_output(&self, state: StateIndex) -> &O {
        self.ts.state_color(state)
    }

    /// Returns the output of the state that `word` reaches.
    pub fn reached_output(&self, word: &Word<S>) -> Result<O, AutomatonError> {
        let reached = self.reached_state(word)?;
        Ok(self.state_output(reached).clone())
    }

    /// Gives access to the underlying transition system.
    pub fn transition_system(&self) -> &Dts<S, O, ()> {
        &self.ts
    }
}

impl<S: Symbol, O: Symbol> Machine for MooreMachine<S, O> {
    type Symbol = S;
    type Output = Word<O>;
    type Observation = O;

    fn alphabet(&self) -> &Alphabet<S> {
        self.ts.alphabet()
    }

    fn size(&self) -> usize {
        self.ts.size()
    }

    fn initial(&self) -> StateIndex {
        self.initial
    }

    fn successor(&self, state: StateIndex, symbol: usize) -> StateIndex {
        self.ts.successor(state, symbol)
    }

    fn output_from(&self, state: StateIndex, word: &Word<S>) -> Result<Word<O>, AutomatonError> {
        if state >= self.size() {
            return Err(AutomatonError::UnknownState(state));
        }
        let mut current = state;
        let mut out = Vec::with_capacity(word.len());
        for sym in word.symbols() {
            out.push(self.state_output(current).clone());
            current = self.successor(current, self.symbol_index(sym)?);
        }
        Ok(Word::from(out))
    }

    fn observe(&self, state: StateIndex) -> O {
        self.state_output(state).clone()
    }
}

impl<S: Symbol, O: Symbol> std::fmt::Display for MooreMachine<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.ts.build_transition_table(
                self.initial,
                |q, out| format!("q{q} / {}", out.show()),
                |target, _| format!("q{target}"),
            )
        )
    }
}
