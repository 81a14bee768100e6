use lstar_core::prelude::*;
use thiserror::Error;

use crate::config::ConfigurationError;

/// Errors that an oracle may raise when it is asked a query. The learner never retries a
/// query, so any of these aborts the learning session.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum OracleError {
    /// The query contains a symbol that the oracle does not know.
    #[error("symbol `{0}` is not known to the oracle")]
    UnknownSymbol(String),
    /// The target has no defined output for the queried word.
    #[error("the output of `{0}` is undefined")]
    Undefined(String),
    /// Answering the query failed for some other reason.
    #[error("oracle failed: {0}")]
    Failed(String),
}

/// Describes how an assumption of the learning algorithm was violated. This typically
/// indicates a target that is not deterministic or an equivalence oracle that is not exact.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Violation {
    /// Two rows were claimed to be inconsistent, but no column separates their successors.
    #[error("rows `{first}` and `{second}` are not inconsistent on `{symbol}`")]
    BogusInconsistency {
        /// Label of the first row.
        first: String,
        /// Label of the second row.
        second: String,
        /// The symbol on which the successors were claimed to differ.
        symbol: String,
    },
    /// A row that should exist in the table is missing.
    #[error("table has no row for `{0}`")]
    MissingRow(String),
    /// A column that should exist in the table is missing.
    #[error("table has no column for `{0}`")]
    MissingColumn(String),
    /// A word that should become a row or column uses symbols outside of the alphabet.
    #[error("`{0}` uses symbols outside of the alphabet")]
    ForeignWord(String),
    /// A hypothesis can only be built from a closed table.
    #[error("table is not closed, row `{0}` has no matching short row")]
    NotClosed(String),
    /// A hypothesis can only be built from a consistent table.
    #[error("table is not consistent, rows `{0}` and `{1}` disagree on a successor")]
    NotConsistent(String, String),
    /// A maintenance step was required but did not change the table.
    #[error("{0} did not change the table")]
    Stalled(&'static str),
    /// The answer to a query has an unexpected shape, e.g. too few output symbols.
    #[error("answer to `{0}` is malformed")]
    MalformedAnswer(String),
    /// The membership oracle disagrees with the output that the equivalence oracle reported.
    #[error("membership oracle answers `{actual}` on `{word}`, counterexample claims `{expected}`")]
    ContradictingAnswer {
        /// The counterexample word.
        word: String,
        /// The output that the equivalence oracle reported.
        expected: String,
        /// The answer of the membership oracle.
        actual: String,
    },
    /// The hypothesis already produces the output of the counterexample.
    #[error("hypothesis agrees with counterexample `{0}`")]
    SpuriousCounterexample(String),
    /// Building or running an automaton failed.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

/// Errors that can abort a learning session. None of them are recovered from internally.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LearningError {
    /// A membership or equivalence query could not be answered.
    #[error("oracle failure: {0}")]
    OracleFailure(#[from] OracleError),
    /// The table or a counterexample violates an assumption of the algorithm.
    #[error("invariant violated: {0}")]
    InvariantViolation(#[from] Violation),
    /// The learner was set up with an unusable configuration.
    #[error("malformed configuration: {0}")]
    MalformedConfiguration(#[from] ConfigurationError),
    /// The configured number of rounds passed without convergence.
    #[error("no convergence within {0} rounds")]
    RoundLimitExceeded(usize),
}

impl From<AutomatonError> for LearningError {
    fn from(value: AutomatonError) -> Self {
        Self::InvariantViolation(Violation::Automaton(value))
    }
}

impl From<AlphabetError> for LearningError {
    fn from(value: AlphabetError) -> Self {
        Self::MalformedConfiguration(ConfigurationError::Alphabet(value))
    }
}
