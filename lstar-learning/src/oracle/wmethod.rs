use itertools::Itertools;
use lstar_core::prelude::*;
use tracing::{debug, trace};

use super::{oracle_error, Counterexample, EquivalenceOracle, MembershipOracle, OracleError};

/// Approximates equivalence queries by conformance testing with the W-method. For a hypothesis
/// with transition cover `P` and characterizing set `W`, the test words are `P · Σ^{≤d} · W`
/// where `d` is the exploration depth. If the target has at most `d` more states than the
/// hypothesis, a hypothesis that passes all tests is equivalent to the target.
///
/// The test words are posed to the wrapped membership oracle, the first one on which the
/// hypothesis produces a different output is returned as a counterexample.
#[derive(Debug, Clone)]
pub struct WMethodOracle<M> {
    oracle: M,
    depth: usize,
}

impl<M: MembershipOracle> WMethodOracle<M> {
    /// Creates a new conformance tester that explores up to `depth` symbols beyond the
    /// transition cover.
    pub fn new(oracle: M, depth: usize) -> Self {
        Self { oracle, depth }
    }

    /// Returns the exploration depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Gives access to the wrapped membership oracle.
    pub fn oracle(&self) -> &M {
        &self.oracle
    }
}

/// Computes the transition cover of `machine`, which consists of an access word for every
/// state and all its one-symbol extensions.
pub fn transition_cover<H: Machine>(machine: &H) -> Vec<Word<H::Symbol>> {
    machine
        .access_words()
        .into_iter()
        .flat_map(|(_, access)| {
            let extensions = machine
                .alphabet()
                .symbols()
                .map(|a| access.append(a.clone()))
                .collect_vec();
            std::iter::once(access).chain(extensions)
        })
        .unique()
        .collect()
}

/// Computes a characterizing set of `machine`, i.e. a set of words which contains a separating
/// word for every pair of inequivalent states. The empty word is always included.
pub fn characterizing_set<H: Machine>(machine: &H) -> Vec<Word<H::Symbol>> {
    std::iter::once(Word::epsilon())
        .chain(
            (0..machine.size())
                .tuple_combinations()
                .filter_map(|(p, q)| machine.separating_word(p, machine, q)),
        )
        .unique()
        .collect()
}

impl<M, H> EquivalenceOracle<H> for WMethodOracle<M>
where
    M: MembershipOracle,
    H: Machine<Symbol = M::Symbol, Output = M::Output>,
{
    fn find_counterexample(
        &mut self,
        hypothesis: &H,
    ) -> Result<Option<Counterexample<H::Symbol, H::Output>>, OracleError> {
        let start = std::time::Instant::now();
        let cover = transition_cover(hypothesis);
        let characterizing = characterizing_set(hypothesis);
        trace!(
            "testing with transition cover {} and characterizing set {}",
            cover.iter().join(", "),
            characterizing.iter().join(", ")
        );

        let mut seen = math::Set::default();
        let mut middle = vec![Word::epsilon()];
        for length in 0..=self.depth {
            if length > 0 {
                middle = middle
                    .iter()
                    .flat_map(|w| hypothesis.alphabet().symbols().map(|a| w.append(a.clone())))
                    .collect();
            }
            for prefix in &cover {
                for infix in &middle {
                    let explored = prefix.concat(infix);
                    for suffix in &characterizing {
                        let test = explored.concat(suffix);
                        if test.is_empty() || !seen.insert(test.clone()) {
                            continue;
                        }
                        let expected = self.oracle.answer(&test)?;
                        let actual = hypothesis.output(&test).map_err(oracle_error)?;
                        if expected != actual {
                            debug!(
                                "found counterexample {test} after {} tests in {}ms",
                                seen.len(),
                                start.elapsed().as_millis()
                            );
                            return Ok(Some(Counterexample::new(test, expected)));
                        }
                    }
                }
            }
        }

        debug!(
            "hypothesis passed {} tests in {}ms",
            seen.len(),
            start.elapsed().as_millis()
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use lstar_core::prelude::*;

    use super::{characterizing_set, transition_cover, WMethodOracle};
    use crate::oracle::{EquivalenceOracle, SimulatorOracle};

    fn mod_three_as() -> Dfa<char> {
        Dfa::from_parts(
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
        .unwrap()
    }

    #[test]
    fn covers_and_characterizing_sets() {
        let dfa = mod_three_as();
        let cover = transition_cover(&dfa);
        assert_eq!(cover.len(), 7);
        assert_eq!(cover[0], Word::epsilon());
        assert!(cover.contains(&Word::from("aab")));

        let characterizing = characterizing_set(&dfa);
        assert_eq!(characterizing, vec![Word::epsilon(), Word::from("a")]);
    }

    #[test_log::test]
    fn conformance_testing() {
        let target = mod_three_as();
        let hypothesis = Dfa::from_parts(
            Alphabet::of_size(2),
            vec![true],
            [(0, 'a', 0), (0, 'b', 0)],
            0,
        )
        .unwrap();

        let mut oracle = WMethodOracle::new(SimulatorOracle::new(target.clone()), 1);
        let counterexample = oracle.find_counterexample(&hypothesis).unwrap().unwrap();
        assert_eq!(counterexample.input, Word::from("a"));
        assert!(!counterexample.output);
        assert_eq!(oracle.find_counterexample(&target).unwrap(), None);
    }
}
