//! Configuration of a learning session.

use lstar_core::prelude::*;
use thiserror::Error;
use tracing::warn;

/// Default bound on the number of rounds, i.e. equivalence queries, of a session.
pub const ROUND_THRESHOLD: usize = if cfg!(debug_assertions) { 300 } else { 200000 };

/// Name of the environment variable that overrides [`ROUND_THRESHOLD`].
pub const ROUND_THRESHOLD_VAR: &str = "MAX_ITERATIONS";

/// Reasons for which a [`LearnerConfig`] is rejected.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConfigurationError {
    /// The alphabet could not be built.
    #[error(transparent)]
    Alphabet(#[from] AlphabetError),
    /// At least one prefix is needed to seed the short rows.
    #[error("no initial prefixes given")]
    NoPrefixes,
    /// The empty word identifies the initial state, so it must be a prefix.
    #[error("initial prefixes must contain the empty word")]
    MissingEpsilon,
    /// A user supplied set of suffixes must not be empty.
    #[error("no initial suffixes given")]
    NoSuffixes,
    /// A seed word uses a symbol outside of the alphabet.
    #[error("seed word `{0}` uses symbols outside of the alphabet")]
    ForeignSymbol(String),
    /// A session needs at least one round.
    #[error("round limit must be positive")]
    NoRounds,
}

/// Determines what is compared when a counterexample is decomposed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum CounterexampleComparison {
    /// Compare the outputs that the remaining suffix produces. This is the decomposition of
    /// Rivest and Schapire.
    #[default]
    SuffixOutput,
    /// Compare only the last emitted output symbol. Faster to evaluate, but for transducers
    /// it can miss a divergence and fall back to adding the prefixes of the counterexample.
    TrailingSymbol,
}

/// Settings of a learning session.
///
/// # Example
/// ```
/// use lstar_core::prelude::*;
/// use lstar_learning::config::{CounterexampleComparison, LearnerConfig};
///
/// let config = LearnerConfig::<char>::default()
///     .with_max_rounds(20)
///     .with_comparison(CounterexampleComparison::TrailingSymbol);
/// assert!(config.validate(&Alphabet::of_size(2)).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerConfig<S: Symbol> {
    /// Words that become short rows when the table is initialized.
    pub initial_prefixes: Vec<Word<S>>,
    /// Columns of the initial table. `None` means only the columns that the kind of hypothesis
    /// requires; otherwise the missing required columns are appended.
    pub initial_suffixes: Option<Vec<Word<S>>>,
    /// Bound on the number of rounds.
    pub max_rounds: usize,
    /// How counterexamples are decomposed.
    pub comparison: CounterexampleComparison,
}

impl<S: Symbol> Default for LearnerConfig<S> {
    fn default() -> Self {
        Self {
            initial_prefixes: vec![Word::epsilon()],
            initial_suffixes: None,
            max_rounds: ROUND_THRESHOLD,
            comparison: CounterexampleComparison::default(),
        }
    }
}

impl<S: Symbol> LearnerConfig<S> {
    /// Default configuration, except that the round limit is read from the `MAX_ITERATIONS`
    /// environment variable if it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(ROUND_THRESHOLD_VAR) {
            match value.parse() {
                Ok(rounds) => config.max_rounds = rounds,
                Err(_) => warn!("ignoring {ROUND_THRESHOLD_VAR}={value}, not a number"),
            }
        }
        config
    }

    /// Replaces the initial prefixes.
    pub fn with_prefixes<I: IntoIterator<Item = Word<S>>>(mut self, prefixes: I) -> Self {
        self.initial_prefixes = prefixes.into_iter().collect();
        self
    }

    /// Replaces the initial suffixes.
    pub fn with_suffixes<I: IntoIterator<Item = Word<S>>>(mut self, suffixes: I) -> Self {
        self.initial_suffixes = Some(suffixes.into_iter().collect());
        self
    }

    /// Sets the round limit.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Sets how counterexamples are decomposed.
    pub fn with_comparison(mut self, comparison: CounterexampleComparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Checks the configuration against the alphabet of the session.
    pub fn validate(&self, alphabet: &Alphabet<S>) -> Result<(), ConfigurationError> {
        if alphabet.size() == 0 {
            return Err(AlphabetError::Empty.into());
        }
        if self.initial_prefixes.is_empty() {
            return Err(ConfigurationError::NoPrefixes);
        }
        if !self.initial_prefixes.iter().any(Word::is_empty) {
            return Err(ConfigurationError::MissingEpsilon);
        }
        if self.initial_suffixes.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigurationError::NoSuffixes);
        }
        if self.max_rounds == 0 {
            return Err(ConfigurationError::NoRounds);
        }
        let suffixes = self.initial_suffixes.iter().flatten();
        match self
            .initial_prefixes
            .iter()
            .chain(suffixes)
            .find(|w| !alphabet.covers(w))
        {
            Some(foreign) => Err(ConfigurationError::ForeignSymbol(foreign.show())),
            None => Ok(()),
        }
    }

    /// Computes the columns of the initial table: the configured suffixes (or none) followed
    /// by those of `mandatory` that are missing.
    pub fn seed_suffixes(&self, mandatory: Vec<Word<S>>) -> Vec<Word<S>> {
        let mut suffixes = self.initial_suffixes.clone().unwrap_or_default();
        for column in mandatory {
            if !suffixes.contains(&column) {
                suffixes.push(column);
            }
        }
        suffixes
    }
}
