use std::marker::PhantomData;

use lstar_core::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    config::LearnerConfig,
    error::LearningError,
    hypothesis::{Hypothesis, LStarHypothesis},
    maintenance::{close_table, make_consistent},
    observer::{LearningObserver, NoopObserver},
    oracle::{EquivalenceOracle, MembershipOracle},
    refinement::refine,
    table::ObservationTable,
};

/// Figures describing a learning session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearningStatistics {
    /// Number of hypotheses that were built.
    pub rounds: usize,
    /// Number of counterexamples that were processed.
    pub counterexamples: usize,
    /// Number of states of the latest hypothesis.
    pub states: usize,
    /// Number of rows of the table.
    pub rows: usize,
    /// Number of columns of the table.
    pub columns: usize,
    /// Size of the alphabet.
    pub alphabet_size: usize,
}

impl LearningStatistics {
    /// Number of cells of the table.
    pub fn table_size(&self) -> usize {
        self.rows * self.columns
    }
}

impl std::fmt::Display for LearningStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Table size: {}", self.table_size())?;
        writeln!(f, "Rounds: {}", self.rounds)?;
        writeln!(f, "Counterexamples: {}", self.counterexamples)?;
        writeln!(f, "States: {}", self.states)?;
        write!(f, "Sigma: {}", self.alphabet_size)
    }
}

/// An implementation of the L* algorithm.
///
/// A session owns its observation table and the membership oracle. Each round it closes the
/// table and makes it consistent, builds a hypothesis and asks the equivalence oracle for a
/// counterexample. Counterexamples are decomposed in the manner of Rivest and Schapire. The
/// session ends once a hypothesis is accepted, or fails on the first error.
///
/// # Example
/// ```
/// use lstar_core::prelude::*;
/// use lstar_learning::prelude::*;
///
/// let target = Dfa::from_parts(
///     Alphabet::of_size(2),
///     vec![true, false],
///     [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
///     0,
/// )
/// .unwrap();
/// let mut learner: LStar<Dfa<char>, _> =
///     LStar::new(Alphabet::of_size(2), SimulatorOracle::new(target.clone())).unwrap();
/// let learned = learner
///     .learn(SimulatorEquivalenceOracle::new(target.clone()))
///     .unwrap();
/// assert!(learned.equivalent(&target));
/// assert_eq!(learned.size(), 2);
/// ```
pub struct LStar<H, M, B = NoopObserver>
where
    H: LStarHypothesis,
    M: MembershipOracle<Symbol = H::Symbol, Output = H::Output>,
{
    alphabet: Alphabet<H::Symbol>,
    config: LearnerConfig<H::Symbol>,
    oracle: M,
    table: ObservationTable<H::Symbol, H::Output>,
    observer: B,
    statistics: LearningStatistics,
    _hypothesis: PhantomData<H>,
}

impl<H, M> LStar<H, M>
where
    H: LStarHypothesis,
    M: MembershipOracle<Symbol = H::Symbol, Output = H::Output>,
{
    /// Creates a session with the default configuration, where the round limit may be
    /// overridden through the environment.
    pub fn new(alphabet: Alphabet<H::Symbol>, oracle: M) -> Result<Self, LearningError> {
        Self::with_config(alphabet, oracle, LearnerConfig::from_env())
    }

    /// Creates a session with the given configuration, which is validated first.
    pub fn with_config(
        alphabet: Alphabet<H::Symbol>,
        oracle: M,
        config: LearnerConfig<H::Symbol>,
    ) -> Result<Self, LearningError> {
        config.validate(&alphabet)?;
        Ok(Self {
            table: ObservationTable::new(alphabet.clone()),
            statistics: LearningStatistics {
                alphabet_size: alphabet.size(),
                ..Default::default()
            },
            alphabet,
            config,
            oracle,
            observer: NoopObserver,
            _hypothesis: PhantomData,
        })
    }
}

impl<H, M, B> LStar<H, M, B>
where
    H: LStarHypothesis,
    M: MembershipOracle<Symbol = H::Symbol, Output = H::Output>,
    B: LearningObserver<H>,
{
    /// Replaces the observer of the session.
    pub fn with_observer<C: LearningObserver<H>>(self, observer: C) -> LStar<H, M, C> {
        LStar {
            alphabet: self.alphabet,
            config: self.config,
            oracle: self.oracle,
            table: self.table,
            observer,
            statistics: self.statistics,
            _hypothesis: PhantomData,
        }
    }

    /// The observation table in its current state.
    pub fn table(&self) -> &ObservationTable<H::Symbol, H::Output> {
        &self.table
    }

    /// Figures on the session so far.
    pub fn statistics(&self) -> LearningStatistics {
        self.statistics
    }

    /// The configuration of the session.
    pub fn config(&self) -> &LearnerConfig<H::Symbol> {
        &self.config
    }

    /// The membership oracle.
    pub fn oracle(&self) -> &M {
        &self.oracle
    }

    /// The observer.
    pub fn observer(&self) -> &B {
        &self.observer
    }

    /// Runs rounds until `equivalence` accepts a hypothesis, which is then returned.
    pub fn learn<E: EquivalenceOracle<H>>(&mut self, mut equivalence: E) -> Result<H, LearningError> {
        let start = std::time::Instant::now();
        if self.table.is_empty() {
            self.initialize()?;
        }

        while self.statistics.rounds < self.config.max_rounds {
            self.statistics.rounds += 1;
            let round = self.statistics.rounds;
            let hypothesis = self.hypothesis()?;
            info!(
                "round {round}: hypothesis with {} states from {} rows and {} columns",
                hypothesis.size(),
                self.table.number_of_rows(),
                self.table.number_of_suffixes()
            );
            self.observer
                .hypothesis_built(round, &self.table, &hypothesis);

            let Some(counterexample) = equivalence.find_counterexample(hypothesis.automaton())?
            else {
                info!(
                    "learned {} states in {round} rounds, took {}ms",
                    hypothesis.size(),
                    start.elapsed().as_millis()
                );
                return Ok(hypothesis.into_automaton());
            };

            debug!("hypothesis {round} is refuted by {counterexample}");
            self.statistics.counterexamples += 1;
            self.observer.counterexample_found(round, &counterexample);
            let refinement = refine(
                &mut self.table,
                &hypothesis,
                &counterexample,
                &mut self.oracle,
                self.config.comparison,
            )?;
            self.observer.table_refined(&self.table, &refinement);
            self.update_statistics(None);
        }

        warn!("no convergence within {} rounds", self.config.max_rounds);
        Err(LearningError::RoundLimitExceeded(self.config.max_rounds))
    }

    /// Closes the table and makes it consistent, then builds its hypothesis.
    pub fn hypothesis(&mut self) -> Result<Hypothesis<H>, LearningError> {
        if self.table.is_empty() {
            self.initialize()?;
        }
        self.stabilize()?;
        let hypothesis = H::from_table(&self.table)?;
        self.update_statistics(Some(hypothesis.size()));
        Ok(hypothesis)
    }

    fn initialize(&mut self) -> Result<(), LearningError> {
        let suffixes = self
            .config
            .seed_suffixes(H::mandatory_suffixes(&self.alphabet));
        self.table.initialize(
            self.config.initial_prefixes.clone(),
            suffixes,
            &mut self.oracle,
        )?;
        self.update_statistics(None);
        self.observer.table_initialized(&self.table);
        Ok(())
    }

    fn stabilize(&mut self) -> Result<(), LearningError> {
        loop {
            let promoted = close_table(&mut self.table, &mut self.oracle)?;
            if !promoted.is_empty() {
                self.observer.table_closed(&self.table, &promoted);
            }
            let added = make_consistent(&mut self.table, &mut self.oracle)?;
            if added.is_empty() {
                return Ok(());
            }
            self.observer.table_made_consistent(&self.table, &added);
        }
    }

    fn update_statistics(&mut self, states: Option<usize>) {
        self.statistics.rows = self.table.number_of_rows();
        self.statistics.columns = self.table.number_of_suffixes();
        if let Some(states) = states {
            self.statistics.states = states;
        }
    }
}

/// Learns a hypothesis of type `H` over `alphabet` with the default configuration.
pub fn lstar<H, M, E>(alphabet: Alphabet<H::Symbol>, oracle: M, equivalence: E) -> Result<H, LearningError>
where
    H: LStarHypothesis,
    M: MembershipOracle<Symbol = H::Symbol, Output = H::Output>,
    E: EquivalenceOracle<H>,
{
    LStar::<H, M>::new(alphabet, oracle)?.learn(equivalence)
}

#[cfg(test)]
mod tests {
    use lstar_core::prelude::*;

    use super::{lstar, LStar};
    use crate::{
        config::{ConfigurationError, LearnerConfig},
        error::LearningError,
        oracle::{Counterexample, EquivalenceOracle, OracleError, SimulatorOracle},
    };

    fn even_as() -> Dfa<char> {
        Dfa::from_parts(
            Alphabet::of_size(2),
            vec![true, false],
            [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
            0,
        )
        .unwrap()
    }

    /// Claims that every hypothesis is wrong on the empty word.
    struct Stubborn;

    impl EquivalenceOracle<Dfa<char>> for Stubborn {
        fn find_counterexample(
            &mut self,
            hypothesis: &Dfa<char>,
        ) -> Result<Option<Counterexample<char, bool>>, OracleError> {
            let output = !hypothesis.accepts(&Word::epsilon()).unwrap();
            Ok(Some(Counterexample::new(Word::epsilon(), output)))
        }
    }

    /// Accepts whatever it is given.
    struct Lenient;

    impl EquivalenceOracle<Dfa<char>> for Lenient {
        fn find_counterexample(
            &mut self,
            _hypothesis: &Dfa<char>,
        ) -> Result<Option<Counterexample<char, bool>>, OracleError> {
            Ok(None)
        }
    }

    #[test_log::test]
    fn statistics_are_tracked() {
        let mut learner: LStar<Dfa<char>, _> =
            LStar::new(Alphabet::of_size(2), SimulatorOracle::new(even_as())).unwrap();
        let learned = learner.learn(Lenient).unwrap();
        assert_eq!(learned.size(), 2);

        let statistics = learner.statistics();
        assert_eq!(statistics.rounds, 1);
        assert_eq!(statistics.counterexamples, 0);
        assert_eq!(statistics.states, 2);
        assert_eq!(statistics.alphabet_size, 2);
        assert_eq!(statistics.table_size(), 5);
        assert!(statistics.to_string().contains("States: 2"));
    }

    #[test_log::test]
    fn contradicting_oracles_abort_the_session() {
        let result = lstar::<Dfa<char>, _, _>(
            Alphabet::of_size(2),
            SimulatorOracle::new(even_as()),
            Stubborn,
        );
        assert!(matches!(
            result,
            Err(LearningError::InvariantViolation(_))
        ));
    }

    #[test]
    fn malformed_configurations_are_rejected() {
        let config = LearnerConfig::default().with_prefixes([Word::from("a")]);
        let result: Result<LStar<Dfa<char>, _>, _> = LStar::with_config(
            Alphabet::of_size(2),
            SimulatorOracle::new(even_as()),
            config,
        );
        assert!(matches!(
            result,
            Err(LearningError::MalformedConfiguration(
                ConfigurationError::MissingEpsilon
            ))
        ));
    }

    #[test_log::test]
    fn rounds_are_bounded() {
        let target = Dfa::from_parts(
            Alphabet::of_size(2),
            vec![true, false, false],
            [
                (0, 'a', 1),
                (0, 'b', 0),
                (1, 'a', 2),
                (1, 'b', 1),
                (2, 'a', 0),
                (2, 'b', 2),
            ],
            0,
        )
        .unwrap();
        let config = LearnerConfig::default().with_max_rounds(1);
        let mut learner: LStar<Dfa<char>, _> = LStar::with_config(
            Alphabet::of_size(2),
            SimulatorOracle::new(target.clone()),
            config,
        )
        .unwrap();
        let result = learner.learn(crate::oracle::SimulatorEquivalenceOracle::new(target));
        assert_eq!(result.unwrap_err(), LearningError::RoundLimitExceeded(1));
    }
}
