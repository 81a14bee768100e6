//! Conversions between Moore and Mealy machines. A transition carries the output of its
//! source state, so the Mealy machine of a Moore machine emits the output of every state it
//! leaves and the output of the state reached last is not part of any answer.

use tracing::trace;

use crate::Symbol;

use super::{AutomatonError, Machine, MealyMachine, MooreMachine};

impl<S: Symbol, O: Symbol> MooreMachine<S, O> {
    /// Pushes the state outputs onto the outgoing transitions of `self` and collects the
    /// result into a [`MealyMachine`] with the same states and transitions. On a word of
    /// length `n`, the Mealy machine emits the outputs of the first `n` states that `self`
    /// visits.
    pub fn to_mealy(&self) -> MealyMachine<S, O> {
        let ts = self
            .transition_system()
            .map_colors(|_, _| (), |q, _, _| self.state_output(q).clone());
        MealyMachine::from_dts(ts, self.initial())
    }
}

impl<S: Symbol, O: Symbol> MealyMachine<S, O> {
    /// Reverses [`MooreMachine::to_mealy`]. Every state takes the output of its transition on
    /// the first symbol of the alphabet, which only works if all outgoing transitions of a
    /// state agree on their output. Otherwise [`AutomatonError::NotMooreLike`] is returned.
    pub fn try_into_moore(&self) -> Result<MooreMachine<S, O>, AutomatonError> {
        for q in 0..self.size() {
            let first = self.transition_output(q, 0);
            if self
                .alphabet()
                .indices()
                .any(|i| self.transition_output(q, i) != first)
            {
                trace!("state {q} emits different outputs on its transitions");
                return Err(AutomatonError::NotMooreLike(q));
            }
        }
        let ts = self
            .transition_system()
            .map_colors(|q, _| self.transition_output(q, 0).clone(), |_, _, _| ());
        Ok(MooreMachine::from_dts(ts, self.initial()))
    }
}
