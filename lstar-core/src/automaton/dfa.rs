use crate::{alphabet::Alphabet, word::Word, Show, Symbol};

use super::{AutomatonError, Dts, Machine, StateIndex, TransitionTable};

/// A deterministic finite automaton. Every state is either accepting or rejecting, a word is
/// accepted iff the state it reaches is accepting.
#[derive(Clone, Debug)]
pub struct Dfa<S: Symbol> {
    ts: Dts<S, bool, ()>,
    initial: StateIndex,
}

impl<S: Symbol> Dfa<S> {
    pub(super) fn from_dts(ts: Dts<S, bool, ()>, initial: StateIndex) -> Self {
        Self { ts, initial }
    }

    /// Builds a DFA from the acceptance flags of its states and a list of transitions
    /// `(source, symbol, target)`. Fails if a transition is missing or refers to something
    /// that does not exist.
    ///
    /// # Example
    /// ```
    /// use lstar_core::prelude::*;
    ///
    /// let dfa = Dfa::from_parts(
    ///     Alphabet::new(vec!['a', 'b']).unwrap(),
    ///     vec![true, false],
    ///     [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
    ///     0,
    /// )
    /// .unwrap();
    /// assert!(dfa.accepts(&Word::from("aba")).unwrap());
    /// assert!(!dfa.accepts(&Word::from("ab")).unwrap());
    /// ```
    pub fn from_parts<I>(
        alphabet: Alphabet<S>,
        accepting: Vec<bool>,
        transitions: I,
        initial: StateIndex,
    ) -> Result<Self, AutomatonError>
    where
        I: IntoIterator<Item = (StateIndex, S, StateIndex)>,
    {
        let mut table = TransitionTable::new(alphabet);
        for flag in accepting {
            table.add_state(flag);
        }
        for (from, sym, to) in transitions {
            table.add_transition(from, &sym, to, ())?;
        }
        table.into_dfa(initial)
    }

    /// Returns `true` iff `word` leads to an accepting state.
    pub fn accepts(&self, word: &Word<S>) -> Result<bool, AutomatonError> {
        self.output(word)
    }

    /// Returns `true` iff `state` is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> bool {
        *self.ts.state_color(state)
    }

    /// Gives access to the underlying transition system.
    pub fn transition_system(&self) -> &Dts<S, bool, ()> {
        &self.ts
    }
}

impl<S: Symbol> Machine for Dfa<S> {
    type Symbol = S;
    type Output = bool;
    type Observation = bool;

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

    fn output_from(&self, state: StateIndex, word: &Word<S>) -> Result<bool, AutomatonError> {
        let reached = self.reached_state_from(state, word)?;
        Ok(self.is_accepting(reached))
    }

    fn observe(&self, state: StateIndex) -> bool {
        self.is_accepting(state)
    }
}

impl<S: Symbol> std::fmt::Display for Dfa<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.ts.build_transition_table(
                self.initial,
                |q, accepting| format!("q{q} {}", accepting.show()),
                |target, _| format!("q{target}"),
            )
        )
    }
}
