//! Hooks for watching a learning session. The learner hands out read-only views of its table
//! and hypothesis after every step, which is what the tutorial binary uses to narrate a run.

use lstar_core::prelude::*;
use tracing::debug;

use crate::{
    hypothesis::Hypothesis, oracle::Counterexample, refinement::Refinement,
    table::ObservationTable,
};

/// Callbacks that a [`crate::LStar`] session invokes. Every method does nothing by default.
#[allow(unused_variables)]
pub trait LearningObserver<H: Machine> {
    /// The table was seeded with the initial prefixes and suffixes.
    fn table_initialized(&mut self, table: &ObservationTable<H::Symbol, H::Output>) {}

    /// The table was closed by promoting the rows labeled by `promoted`.
    fn table_closed(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        promoted: &[Word<H::Symbol>],
    ) {
    }

    /// The table was made consistent by adding the columns `added`.
    fn table_made_consistent(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        added: &[Word<H::Symbol>],
    ) {
    }

    /// A hypothesis was built in the given round.
    fn hypothesis_built(
        &mut self,
        round: usize,
        table: &ObservationTable<H::Symbol, H::Output>,
        hypothesis: &Hypothesis<H>,
    ) {
    }

    /// The equivalence oracle rejected the hypothesis of the given round.
    fn counterexample_found(
        &mut self,
        round: usize,
        counterexample: &Counterexample<H::Symbol, H::Output>,
    ) {
    }

    /// The table was refined to account for a counterexample.
    fn table_refined(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        refinement: &Refinement<H::Symbol>,
    ) {
    }
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<H: Machine> LearningObserver<H> for NoopObserver {}

/// Logs every step together with the current table at `debug` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<H: Machine + std::fmt::Display> LearningObserver<H> for TracingObserver {
    fn table_initialized(&mut self, table: &ObservationTable<H::Symbol, H::Output>) {
        debug!("initialized observation table\n{table}");
    }

    fn table_closed(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        promoted: &[Word<H::Symbol>],
    ) {
        debug!(
            "closed table by promoting {}, open model\n{}\ntable\n{table}",
            promoted.show(),
            table.partial_model()
        );
    }

    fn table_made_consistent(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        added: &[Word<H::Symbol>],
    ) {
        debug!("made table consistent by adding {}\n{table}", added.show());
    }

    fn hypothesis_built(
        &mut self,
        round: usize,
        _table: &ObservationTable<H::Symbol, H::Output>,
        hypothesis: &Hypothesis<H>,
    ) {
        debug!("hypothesis {round}\n{hypothesis}");
    }

    fn counterexample_found(
        &mut self,
        round: usize,
        counterexample: &Counterexample<H::Symbol, H::Output>,
    ) {
        debug!("hypothesis {round} is refuted by {counterexample}");
    }

    fn table_refined(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        refinement: &Refinement<H::Symbol>,
    ) {
        debug!("{refinement}, refined table\n{table}");
    }
}
