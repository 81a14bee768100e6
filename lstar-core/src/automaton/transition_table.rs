use crate::{alphabet::Alphabet, Show, Symbol};

use super::{AutomatonError, Dfa, MealyMachine, MooreMachine, StateIndex};

/// A deterministic and complete transition system. States carry a color of type `Q` and each
/// transition carries a color of type `C`. For every state there is precisely one transition
/// per symbol, stored at the index of that symbol.
#[derive(Clone, Debug)]
pub struct Dts<S: Symbol, Q, C> {
    alphabet: Alphabet<S>,
    colors: Vec<Q>,
    edges: Vec<Vec<(StateIndex, C)>>,
}

impl<S: Symbol, Q, C> Dts<S, Q, C> {
    /// Returns the alphabet.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.colors.len()
    }

    /// Returns the color of `state`. Panics if the state does not exist.
    pub fn state_color(&self, state: StateIndex) -> &Q {
        &self.colors[state]
    }

    /// Returns the target and color of the transition from `state` on the symbol with index
    /// `symbol`. Panics if either does not exist.
    pub fn edge(&self, state: StateIndex, symbol: usize) -> &(StateIndex, C) {
        &self.edges[state][symbol]
    }

    /// Returns the successor of `state` on the symbol with index `symbol`.
    pub fn successor(&self, state: StateIndex, symbol: usize) -> StateIndex {
        self.edges[state][symbol].0
    }

    /// Returns a string representation of the transition table of the transition system.
    pub fn build_transition_table<SD, ED>(
        &self,
        initial: StateIndex,
        state_decorator: SD,
        edge_decorator: ED,
    ) -> String
    where
        SD: Fn(StateIndex, &Q) -> String,
        ED: Fn(StateIndex, &C) -> String,
    {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(self.alphabet.symbols().map(Show::show)),
        );
        for (id, color) in self.colors.iter().enumerate() {
            let marker = if id == initial { "→ " } else { "" };
            let mut row = vec![format!("{marker}{}", state_decorator(id, color))];
            for (target, edge_color) in &self.edges[id] {
                row.push(edge_decorator(*target, edge_color));
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }

    pub(super) fn map_colors<R, D, F, G>(&self, state_map: F, edge_map: G) -> Dts<S, R, D>
    where
        F: Fn(StateIndex, &Q) -> R,
        G: Fn(StateIndex, usize, &C) -> D,
    {
        Dts {
            alphabet: self.alphabet.clone(),
            colors: self
                .colors
                .iter()
                .enumerate()
                .map(|(q, c)| state_map(q, c))
                .collect(),
            edges: self
                .edges
                .iter()
                .enumerate()
                .map(|(q, row)| {
                    row.iter()
                        .enumerate()
                        .map(|(i, (p, c))| (*p, edge_map(q, i, c)))
                        .collect()
                })
                .collect(),
        }
    }
}

/// A growable and possibly incomplete transition table, used to assemble a machine state by
/// state and transition by transition. Once every state has a transition for every symbol,
/// it can be turned into a [`Dfa`], [`MealyMachine`] or [`MooreMachine`].
///
/// # Example
/// ```
/// use lstar_core::prelude::*;
///
/// let alphabet = Alphabet::new(vec!['a', 'b']).unwrap();
/// let mut table = TransitionTable::new(alphabet);
/// let q0 = table.add_state(true);
/// let q1 = table.add_state(false);
/// table.add_transition(q0, &'a', q1, ()).unwrap();
/// table.add_transition(q0, &'b', q0, ()).unwrap();
/// table.add_transition(q1, &'a', q0, ()).unwrap();
/// table.add_transition(q1, &'b', q1, ()).unwrap();
///
/// let dfa = table.into_dfa(q0).unwrap();
/// assert!(dfa.accepts(&Word::from("abab")).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct TransitionTable<S: Symbol, Q, C> {
    alphabet: Alphabet<S>,
    colors: Vec<Q>,
    edges: Vec<Vec<Option<(StateIndex, C)>>>,
}

impl<S: Symbol, Q, C> TransitionTable<S, Q, C> {
    /// Creates an empty table over `alphabet`.
    pub fn new(alphabet: Alphabet<S>) -> Self {
        Self {
            alphabet,
            colors: vec![],
            edges: vec![],
        }
    }

    /// Returns the alphabet.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Returns the number of states added so far.
    pub fn size(&self) -> usize {
        self.colors.len()
    }

    /// Adds a new state with the given color and returns its index.
    pub fn add_state(&mut self, color: Q) -> StateIndex {
        self.colors.push(color);
        self.edges
            .push(std::iter::repeat_with(|| None).take(self.alphabet.size()).collect());
        self.colors.len() - 1
    }

    /// Sets the transition from `from` on `symbol`, returning the transition it replaces.
    pub fn add_transition(
        &mut self,
        from: StateIndex,
        symbol: &S,
        to: StateIndex,
        color: C,
    ) -> Result<Option<(StateIndex, C)>, AutomatonError> {
        let index = self
            .alphabet
            .position(symbol)
            .ok_or_else(|| AutomatonError::UnknownSymbol(symbol.show()))?;
        self.set_transition(from, index, to, color)
    }

    /// Sets the transition from `from` on the symbol with index `symbol`, returning the
    /// transition it replaces.
    pub fn set_transition(
        &mut self,
        from: StateIndex,
        symbol: usize,
        to: StateIndex,
        color: C,
    ) -> Result<Option<(StateIndex, C)>, AutomatonError> {
        if to >= self.size() {
            return Err(AutomatonError::UnknownState(to));
        }
        let row = self
            .edges
            .get_mut(from)
            .ok_or(AutomatonError::UnknownState(from))?;
        let slot = row.get_mut(symbol).ok_or_else(|| {
            AutomatonError::UnknownSymbol(format!("#{symbol}"))
        })?;
        Ok(slot.replace((to, color)))
    }

    /// Returns the transition from `from` on the symbol with index `symbol`, if it was set.
    pub fn transition(&self, from: StateIndex, symbol: usize) -> Option<&(StateIndex, C)> {
        self.edges.get(from)?.get(symbol)?.as_ref()
    }

    /// Checks that every state has a transition for every symbol and that `initial` exists,
    /// then freezes the table into a complete transition system.
    pub fn complete(self, initial: StateIndex) -> Result<Dts<S, Q, C>, AutomatonError> {
        if initial >= self.size() {
            return Err(AutomatonError::UnknownState(initial));
        }
        let mut edges = Vec::with_capacity(self.edges.len());
        for (state, row) in self.edges.into_iter().enumerate() {
            let mut complete_row = Vec::with_capacity(row.len());
            for (i, edge) in row.into_iter().enumerate() {
                let Some(edge) = edge else {
                    return Err(AutomatonError::MissingTransition {
                        state,
                        symbol: self.alphabet.nth(i).map(Show::show).unwrap_or_default(),
                    });
                };
                complete_row.push(edge);
            }
            edges.push(complete_row);
        }
        Ok(Dts {
            alphabet: self.alphabet,
            colors: self.colors,
            edges,
        })
    }
}

impl<S: Symbol> TransitionTable<S, bool, ()> {
    /// Turns the table into a [`Dfa`] where a state is accepting iff its color is `true`.
    pub fn into_dfa(self, initial: StateIndex) -> Result<Dfa<S>, AutomatonError> {
        Ok(Dfa::from_dts(self.complete(initial)?, initial))
    }
}

impl<S: Symbol, O: Symbol> TransitionTable<S, (), O> {
    /// Turns the table into a [`MealyMachine`] whose transitions emit their color.
    pub fn into_mealy(self, initial: StateIndex) -> Result<MealyMachine<S, O>, AutomatonError> {
        Ok(MealyMachine::from_dts(self.complete(initial)?, initial))
    }
}

impl<S: Symbol, O: Symbol> TransitionTable<S, O, ()> {
    /// Turns the table into a [`MooreMachine`] whose states emit their color.
    pub fn into_moore(self, initial: StateIndex) -> Result<MooreMachine<S, O>, AutomatonError> {
        Ok(MooreMachine::from_dts(self.complete(initial)?, initial))
    }
}

#[cfg(test)]
mod tests {
    use super::TransitionTable;
    use crate::{alphabet::Alphabet, automaton::AutomatonError};

    #[test]
    fn incomplete_tables_are_rejected() {
        let mut table = TransitionTable::new(Alphabet::of_size(2));
        let q0 = table.add_state(false);
        table.add_transition(q0, &'a', q0, ()).unwrap();
        assert_eq!(
            table.clone().into_dfa(q0).unwrap_err(),
            AutomatonError::MissingTransition {
                state: 0,
                symbol: "b".into()
            }
        );
        assert_eq!(
            table.add_transition(q0, &'c', q0, ()).unwrap_err(),
            AutomatonError::UnknownSymbol("c".into())
        );
        assert_eq!(
            table.add_transition(q0, &'b', 4, ()).unwrap_err(),
            AutomatonError::UnknownState(4)
        );
        assert_eq!(
            table.clone().into_dfa(3).unwrap_err(),
            AutomatonError::UnknownState(3)
        );

        assert!(table.add_transition(q0, &'b', q0, ()).unwrap().is_none());
        assert_eq!(table.add_transition(q0, &'b', q0, ()).unwrap(), Some((0, ())));
        assert!(table.into_dfa(q0).is_ok());
    }
}
