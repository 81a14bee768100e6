use crate::{alphabet::Alphabet, word::Word, Show, Symbol};

use super::{AutomatonError, Dts, Machine, StateIndex, TransitionTable};

/// A Mealy machine is a transition system where each transition has an output. Thus, the output
/// of running a Mealy machine on a word produces a sequence of outputs, one for each transition
/// that is taken. Note that since the empty word does not take any transitions, it does not
/// produce any output. For a word of length `n`, there are `n` outputs.
#[derive(Clone, Debug)]
pub struct MealyMachine<S: Symbol, O: Symbol> {
    ts: Dts<S, (), O>,
    initial: StateIndex,
}

impl<S: Symbol, O: Symbol> MealyMachine<S, O> {
    pub(super) fn from_dts(ts: Dts<S, (), O>, initial: StateIndex) -> Self {
        Self { ts, initial }
    }

    /// Builds a Mealy machine with `states` states from a list of transitions
    /// `(source, symbol, output, target)`.
    ///
    /// # Example
    /// ```
    /// use lstar_core::prelude::*;
    ///
    /// let mm = MealyMachine::from_parts(
    ///     Alphabet::new(vec!['a', 'b']).unwrap(),
    ///     2,
    ///     [(0, 'a', 'x', 1), (0, 'b', 'y', 0), (1, 'a', 'y', 0), (1, 'b', 'x', 1)],
    ///     0,
    /// )
    /// .unwrap();
    /// assert_eq!(mm.output(&Word::from("aab")).unwrap(), Word::from("xyy"));
    /// ```
    pub fn from_parts<I>(
        alphabet: Alphabet<S>,
        states: usize,
        transitions: I,
        initial: StateIndex,
    ) -> Result<Self, AutomatonError>
    where
        I: IntoIterator<Item = (StateIndex, S, O, StateIndex)>,
    {
        let mut table = TransitionTable::new(alphabet);
        for _ in 0..states {
            table.add_state(());
        }
        for (from, sym, out, to) in transitions {
            table.add_transition(from, &sym, to, out)?;
        }
        table.into_mealy(initial)
    }

    /// Returns the output emitted by the transition from `state` on the symbol with index
    /// `symbol`.
    pub fn transition_output(&self, state: StateIndex, symbol: usize) -> &O {
        &self.ts.edge(state, symbol).1
    }

    /// Gives access to the underlying transition system.
    pub fn transition_system(&self) -> &Dts<S, (), O> {
        &self.ts
    }
}

impl<S: Symbol, O: Symbol> Machine for MealyMachine<S, O> {
    type Symbol = S;
    type Output = Word<O>;
    type Observation = Vec<O>;

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
            let (target, color) = self.ts.edge(current, self.symbol_index(sym)?);
            out.push(color.clone());
            current = *target;
        }
        Ok(Word::from(out))
    }

    fn observe(&self, state: StateIndex) -> Vec<O> {
        self.alphabet()
            .indices()
            .map(|i| self.transition_output(state, i).clone())
            .collect()
    }
}

impl<S: Symbol, O: Symbol> std::fmt::Display for MealyMachine<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.ts.build_transition_table(
                self.initial,
                |q, _| format!("q{q}"),
                |target, out| format!("q{target} / {}", out.show()),
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::MealyMachine;
    use crate::{alphabet::Alphabet, automaton::Machine, word::Word};

    fn flip_flop() -> MealyMachine<char, u8> {
        MealyMachine::from_parts(
            Alphabet::of_size(2),
            2,
            [(0, 'a', 0, 1), (0, 'b', 0, 0), (1, 'a', 1, 0), (1, 'b', 1, 1)],
            0,
        )
        .unwrap()
    }

    #[test]
    fn outputs_per_transition() {
        let mm = flip_flop();
        assert_eq!(mm.output(&Word::epsilon()).unwrap(), Word::epsilon());
        assert_eq!(mm.output(&Word::from("abab")).unwrap(), Word::from(vec![0, 1, 1, 0]));
        assert_eq!(mm.observe(1), vec![1, 1]);
    }

    #[test]
    fn separating_mealy_states() {
        let mm = flip_flop();
        assert_eq!(mm.separating_word(0, &mm, 1), Some(Word::from("a")));

        let other = MealyMachine::from_parts(
            Alphabet::of_size(2),
            2,
            [(0, 'a', 0, 1), (0, 'b', 0, 0), (1, 'a', 1, 0), (1, 'b', 0, 1)],
            0,
        )
        .unwrap();
        assert_eq!(mm.witness_inequivalence(&other), Some(Word::from("ab")));
    }
}
