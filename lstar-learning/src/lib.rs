//! Active learning of deterministic automata with Angluin's L* algorithm.
//!
//! The learner maintains an [`ObservationTable`] whose rows are labeled by prefixes and whose
//! columns are labeled by suffixes. Each cell holds what a [`oracle::MembershipOracle`]
//! answered for the concatenation of its row and column label. Once the table is closed and
//! consistent, a hypothesis is read off and handed to an [`oracle::EquivalenceOracle`], which
//! either accepts it or returns a counterexample that is used to refine the table.
//!
//! Hypotheses can be deterministic finite automata, Mealy machines or Moore machines, see
//! [`LStarHypothesis`]. A session is driven by [`LStar`], or for the common case by [`lstar`].
#![deny(rustdoc::broken_intra_doc_links)]

/// Everything that is needed to set up and run a learning session.
pub mod prelude {
    pub use super::{
        config::{CounterexampleComparison, LearnerConfig},
        lstar,
        observer::{LearningObserver, NoopObserver, TracingObserver},
        oracle::{
            CachedOracle, CountingOracle, Counterexample, EquivalenceOracle, MappedOracle,
            MembershipOracle, QueryCounter, SimulatorEquivalenceOracle, SimulatorOracle,
            WMethodOracle,
        },
        Hypothesis, LStar, LStarHypothesis, LearningError, LearningStatistics,
        ObservationTable, OracleError, Violation,
    };
}

pub mod config;
pub mod observer;
pub mod oracle;

mod error;
pub use error::{LearningError, OracleError, Violation};

mod table;
pub use table::{
    ContentId, Inconsistency, ObservationTable, PartialModel, Row, RowId, UnclosedRow,
};

mod maintenance;
pub use maintenance::{close_table, find_distinguishing_suffix, make_consistent};

mod hypothesis;
pub use hypothesis::{Hypothesis, LStarHypothesis};

mod refinement;
pub use refinement::{
    find_boundary, refine, refine_columns, refine_short_prefixes, Boundary, Refinement,
};

mod session;
pub use session::{lstar, LStar, LearningStatistics};
