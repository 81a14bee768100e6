//! Minimally adequate teachers for active learning. A learner poses membership queries through
//! a [`MembershipOracle`] and asks an [`EquivalenceOracle`] whether its hypothesis is correct.

use lstar_core::prelude::*;
use tracing::trace;

pub use crate::error::OracleError;

mod adapters;
pub use adapters::{CachedOracle, CountingOracle, MappedOracle, QueryCounter};

mod wmethod;
pub use wmethod::WMethodOracle;

/// Answers queries of the form "what does the target produce on this word?".
///
/// The trait is generic in what a query is answered with, which allows the same learner to
/// infer an acceptor by using `bool` as the `Output` and a transducer by using a [`Word`] of
/// output symbols.
pub trait MembershipOracle {
    /// Input symbols of the target.
    type Symbol: Symbol;
    /// What a query is answered with.
    type Output: Output;

    /// Answers the query on `word`. For a fixed target, this must be a total and deterministic
    /// function.
    fn answer(&mut self, word: &Word<Self::Symbol>) -> Result<Self::Output, OracleError>;
}

impl<M: MembershipOracle + ?Sized> MembershipOracle for &mut M {
    type Symbol = M::Symbol;
    type Output = M::Output;

    fn answer(&mut self, word: &Word<Self::Symbol>) -> Result<Self::Output, OracleError> {
        M::answer(self, word)
    }
}

/// A word on which the hypothesis and the target differ, together with the output of the
/// target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Counterexample<S: Symbol, O: Output> {
    /// The word on which the outputs differ.
    pub input: Word<S>,
    /// What the target produces on `input`.
    pub output: O,
}

impl<S: Symbol, O: Output> Counterexample<S, O> {
    /// Creates a new counterexample.
    pub fn new(input: Word<S>, output: O) -> Self {
        Self { input, output }
    }
}

impl<S: Symbol, O: Output> std::fmt::Display for Counterexample<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.input, self.output.show())
    }
}

/// Decides whether a hypothesis of type `H` is correct.
pub trait EquivalenceOracle<H: Machine> {
    /// Returns `None` if `hypothesis` is equivalent to the target and a [`Counterexample`]
    /// otherwise.
    fn find_counterexample(
        &mut self,
        hypothesis: &H,
    ) -> Result<Option<Counterexample<H::Symbol, H::Output>>, OracleError>;
}

impl<H: Machine, E: EquivalenceOracle<H> + ?Sized> EquivalenceOracle<H> for &mut E {
    fn find_counterexample(
        &mut self,
        hypothesis: &H,
    ) -> Result<Option<Counterexample<H::Symbol, H::Output>>, OracleError> {
        E::find_counterexample(self, hypothesis)
    }
}

pub(crate) fn oracle_error(err: AutomatonError) -> OracleError {
    match err {
        AutomatonError::UnknownSymbol(sym) => OracleError::UnknownSymbol(sym),
        other => OracleError::Failed(other.to_string()),
    }
}

/// Answers membership queries by running a known machine. Symbols are resolved by value
/// against the alphabet of the target, so a learner may work on a subset of its inputs.
#[derive(Debug, Clone)]
pub struct SimulatorOracle<M> {
    target: M,
}

impl<M: Machine> SimulatorOracle<M> {
    /// Wraps the given target.
    pub fn new(target: M) -> Self {
        Self { target }
    }

    /// Returns the simulated machine.
    pub fn target(&self) -> &M {
        &self.target
    }
}

impl<M: Machine> MembershipOracle for SimulatorOracle<M> {
    type Symbol = M::Symbol;
    type Output = M::Output;

    fn answer(&mut self, word: &Word<M::Symbol>) -> Result<M::Output, OracleError> {
        let out = self.target.output(word).map_err(oracle_error)?;
        trace!("simulator answers {word} with {}", out.show());
        Ok(out)
    }
}

/// Decides equivalence exactly by exploring the product of the hypothesis and a known target.
/// The returned counterexample is a shortest word on which the two differ.
#[derive(Debug, Clone)]
pub struct SimulatorEquivalenceOracle<M> {
    target: M,
}

impl<M: Machine> SimulatorEquivalenceOracle<M> {
    /// Wraps the given target.
    pub fn new(target: M) -> Self {
        Self { target }
    }
}

impl<M, H> EquivalenceOracle<H> for SimulatorEquivalenceOracle<M>
where
    M: Machine,
    H: Machine<Symbol = M::Symbol, Output = M::Output, Observation = M::Observation>,
{
    fn find_counterexample(
        &mut self,
        hypothesis: &H,
    ) -> Result<Option<Counterexample<H::Symbol, H::Output>>, OracleError> {
        let Some(input) = hypothesis.witness_inequivalence(&self.target) else {
            return Ok(None);
        };
        let output = self.target.output(&input).map_err(oracle_error)?;
        trace!("found counterexample {input} with output {}", output.show());
        Ok(Some(Counterexample { input, output }))
    }
}
