use std::{collections::VecDeque, fmt::Debug};

use thiserror::Error;
use tracing::trace;

use crate::{alphabet::Alphabet, math, output::Output, word::Word, Show, Symbol};

mod transition_table;
pub use transition_table::{Dts, TransitionTable};

mod dfa;
pub use dfa::Dfa;

mod mealy;
pub use mealy::MealyMachine;

mod moore;
pub use moore::MooreMachine;

mod convert;

/// States are identified by their position in the transition table.
pub type StateIndex = usize;

/// Errors that can occur when building or running a machine.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AutomatonError {
    /// The referenced state does not exist.
    #[error("state {0} does not exist")]
    UnknownState(StateIndex),
    /// A word uses a symbol that is not part of the alphabet of the machine.
    #[error("symbol `{0}` is not part of the alphabet")]
    UnknownSymbol(String),
    /// A machine must be total, but the given state lacks an outgoing transition.
    #[error("state {state} has no transition on `{symbol}`")]
    MissingTransition {
        /// The state that lacks the transition.
        state: StateIndex,
        /// The symbol on which the transition is missing.
        symbol: String,
    },
    /// The outgoing transitions of a state produce different outputs, so no Moore machine
    /// corresponds to the given Mealy machine.
    #[error("outgoing transitions of state {0} do not agree on their output")]
    NotMooreLike(StateIndex),
}

/// A deterministic and total machine over a finite alphabet. Every state has precisely one
/// outgoing transition for every symbol, so running a word over the alphabet always succeeds.
///
/// Implementors fix what a run on a word produces through [`Machine::output_from`]. A
/// [`Dfa`] produces whether the reached state is accepting, a [`MealyMachine`] produces the
/// sequence of outputs on the transitions that are taken. Besides that, each state has a
/// local [`Machine::Observation`]: two states with different observations can be told apart
/// by the empty word or a word of length one. This is what the search for separating words
/// builds on.
pub trait Machine {
    /// The type of input symbol.
    type Symbol: Symbol;
    /// What a run on a word produces.
    type Output: Output;
    /// What can be observed locally in a state.
    type Observation: Eq + Debug;

    /// Returns the input alphabet.
    fn alphabet(&self) -> &Alphabet<Self::Symbol>;

    /// Returns the number of states.
    fn size(&self) -> usize;

    /// Returns the designated initial state.
    fn initial(&self) -> StateIndex;

    /// Returns the successor of `state` on the symbol with index `symbol`. Panics if either of
    /// them does not exist.
    fn successor(&self, state: StateIndex, symbol: usize) -> StateIndex;

    /// Produces the output of running `word` from `state`.
    fn output_from(
        &self,
        state: StateIndex,
        word: &Word<Self::Symbol>,
    ) -> Result<Self::Output, AutomatonError>;

    /// Returns the local observation in `state`.
    fn observe(&self, state: StateIndex) -> Self::Observation;

    /// Looks up the index of `symbol` in the alphabet.
    fn symbol_index(&self, symbol: &Self::Symbol) -> Result<usize, AutomatonError> {
        self.alphabet()
            .position(symbol)
            .ok_or_else(|| AutomatonError::UnknownSymbol(symbol.show()))
    }

    /// Returns the state that is reached by running `word` from `state`.
    fn reached_state_from(
        &self,
        state: StateIndex,
        word: &Word<Self::Symbol>,
    ) -> Result<StateIndex, AutomatonError> {
        if state >= self.size() {
            return Err(AutomatonError::UnknownState(state));
        }
        word.symbols()
            .try_fold(state, |q, a| Ok(self.successor(q, self.symbol_index(a)?)))
    }

    /// Returns the state that is reached by running `word` from the initial state.
    fn reached_state(&self, word: &Word<Self::Symbol>) -> Result<StateIndex, AutomatonError> {
        self.reached_state_from(self.initial(), word)
    }

    /// Produces the output of running `word` from the initial state.
    fn output(&self, word: &Word<Self::Symbol>) -> Result<Self::Output, AutomatonError> {
        self.output_from(self.initial(), word)
    }

    /// Computes a length-lexicographically minimal access word for every reachable state,
    /// in the order in which a breadth-first search discovers them.
    fn access_words(&self) -> Vec<(StateIndex, Word<Self::Symbol>)> {
        let mut seen = math::Set::default();
        let mut queue = VecDeque::from([(self.initial(), Word::epsilon())]);
        seen.insert(self.initial());
        let mut out = vec![];

        while let Some((state, word)) = queue.pop_front() {
            for (i, sym) in self.alphabet().symbols().enumerate() {
                let successor = self.successor(state, i);
                if seen.insert(successor) {
                    queue.push_back((successor, word.append(sym.clone())));
                }
            }
            out.push((state, word));
        }
        out
    }

    /// Searches for a shortest word on which `state` in `self` and `other_state` in `other`
    /// produce different outputs. Returns `None` if the two states are equivalent.
    fn separating_word<M>(
        &self,
        state: StateIndex,
        other: &M,
        other_state: StateIndex,
    ) -> Option<Word<Self::Symbol>>
    where
        M: Machine<Symbol = Self::Symbol, Output = Self::Output, Observation = Self::Observation>,
    {
        let mut seen = math::Set::default();
        let mut queue = VecDeque::from([(state, other_state, Word::epsilon())]);
        seen.insert((state, other_state));

        while let Some((l, r, word)) = queue.pop_front() {
            if self.observe(l) != other.observe(r) {
                trace!("states {l} and {r} reached by {word} are observably different");
                let differs = |w: &Word<Self::Symbol>| {
                    self.output_from(state, w).ok() != other.output_from(other_state, w).ok()
                };
                let candidates: Vec<_> = std::iter::once(word.clone())
                    .chain(self.alphabet().symbols().map(|a| word.append(a.clone())))
                    .collect();
                return Some(candidates.into_iter().find(differs).unwrap_or(word));
            }

            for (i, sym) in self.alphabet().symbols().enumerate() {
                let Some(j) = other.alphabet().position(sym) else {
                    return Some(word.append(sym.clone()));
                };
                let pair = (self.successor(l, i), other.successor(r, j));
                if seen.insert(pair) {
                    queue.push_back((pair.0, pair.1, word.append(sym.clone())));
                }
            }
        }
        None
    }

    /// Returns a word on which `self` and `other` produce different outputs, or `None` if they
    /// are equivalent.
    fn witness_inequivalence<M>(&self, other: &M) -> Option<Word<Self::Symbol>>
    where
        M: Machine<Symbol = Self::Symbol, Output = Self::Output, Observation = Self::Observation>,
    {
        self.separating_word(self.initial(), other, other.initial())
    }

    /// Checks whether `self` and `other` produce the same output on every word.
    fn equivalent<M>(&self, other: &M) -> bool
    where
        M: Machine<Symbol = Self::Symbol, Output = Self::Output, Observation = Self::Observation>,
    {
        self.witness_inequivalence(other).is_none()
    }
}
