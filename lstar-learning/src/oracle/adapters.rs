use std::{cell::Cell, marker::PhantomData, rc::Rc};

use lstar_core::prelude::*;
use tracing::trace;

use super::{Counterexample, EquivalenceOracle, MembershipOracle, OracleError};

/// A named counter that can be shared between an oracle and whoever reports on it.
#[derive(Debug, Clone)]
pub struct QueryCounter {
    name: String,
    count: Rc<Cell<usize>>,
}

impl QueryCounter {
    /// Creates a counter starting at zero.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            count: Rc::new(Cell::new(0)),
        }
    }

    /// Returns the name of the counter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of queries counted so far.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Resets the count to zero.
    pub fn reset(&self) {
        self.count.set(0)
    }

    fn increment(&self) {
        self.count.set(self.count.get() + 1)
    }
}

impl std::fmt::Display for QueryCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.count())
    }
}

/// Counts every query that passes through it. Works for membership as well as equivalence
/// queries, depending on what the wrapped oracle is.
#[derive(Debug, Clone)]
pub struct CountingOracle<M> {
    inner: M,
    counter: QueryCounter,
}

impl<M> CountingOracle<M> {
    /// Wraps `inner` and counts its queries under the given name.
    pub fn new<N: Into<String>>(inner: M, name: N) -> Self {
        Self {
            inner,
            counter: QueryCounter::new(name),
        }
    }

    /// Returns a handle on the counter, which stays valid after the oracle was moved.
    pub fn counter(&self) -> QueryCounter {
        self.counter.clone()
    }

    /// Gives access to the wrapped oracle.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: MembershipOracle> MembershipOracle for CountingOracle<M> {
    type Symbol = M::Symbol;
    type Output = M::Output;

    fn answer(&mut self, word: &Word<M::Symbol>) -> Result<M::Output, OracleError> {
        self.counter.increment();
        self.inner.answer(word)
    }
}

impl<H: Machine, E: EquivalenceOracle<H>> EquivalenceOracle<H> for CountingOracle<E> {
    fn find_counterexample(
        &mut self,
        hypothesis: &H,
    ) -> Result<Option<Counterexample<H::Symbol, H::Output>>, OracleError> {
        self.counter.increment();
        self.inner.find_counterexample(hypothesis)
    }
}

/// Remembers every answer it has seen, so that each word is queried at most once.
#[derive(Debug, Clone)]
pub struct CachedOracle<M: MembershipOracle> {
    inner: M,
    cache: math::Map<Word<M::Symbol>, M::Output>,
    hits: usize,
}

impl<M: MembershipOracle> CachedOracle<M> {
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: math::Map::default(),
            hits: 0,
        }
    }

    /// Number of queries that were answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of distinct words in the cache.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl<M: MembershipOracle> MembershipOracle for CachedOracle<M> {
    type Symbol = M::Symbol;
    type Output = M::Output;

    fn answer(&mut self, word: &Word<M::Symbol>) -> Result<M::Output, OracleError> {
        if let Some(out) = self.cache.get(word) {
            self.hits += 1;
            return Ok(out.clone());
        }
        let out = self.inner.answer(word)?;
        self.cache.insert(word.clone(), out.clone());
        Ok(out)
    }
}

/// Translates between an abstract alphabet that the learner works on and the concrete inputs
/// and outputs of the wrapped oracle.
///
/// # Example
/// ```
/// use lstar_core::prelude::*;
/// use lstar_learning::oracle::{MappedOracle, MembershipOracle, SimulatorOracle};
///
/// let target = Dfa::from_parts(
///     Alphabet::new(vec![1u32, 2]).unwrap(),
///     vec![true, false],
///     [(0, 1, 1), (0, 2, 0), (1, 1, 0), (1, 2, 1)],
///     0,
/// )
/// .unwrap();
/// let mut oracle = MappedOracle::new(
///     SimulatorOracle::new(target),
///     |sym: &String| sym.parse().ok(),
///     |accepted: bool| accepted,
/// );
/// let word = Word::from(vec!["1".to_string(), "2".to_string()]);
/// assert_eq!(oracle.answer(&word), Ok(false));
/// ```
pub struct MappedOracle<M, A, B, I, O> {
    inner: M,
    map_input: I,
    map_output: O,
    _marker: PhantomData<(A, B)>,
}

impl<M, A, B, I, O> MappedOracle<M, A, B, I, O>
where
    M: MembershipOracle,
    A: Symbol,
    B: Output,
    I: Fn(&A) -> Option<M::Symbol>,
    O: Fn(M::Output) -> B,
{
    /// Wraps `inner`. Abstract symbols for which `map_input` returns `None` are rejected with
    /// [`OracleError::UnknownSymbol`].
    pub fn new(inner: M, map_input: I, map_output: O) -> Self {
        Self {
            inner,
            map_input,
            map_output,
            _marker: PhantomData,
        }
    }
}

impl<M, A, B, I, O> MembershipOracle for MappedOracle<M, A, B, I, O>
where
    M: MembershipOracle,
    A: Symbol,
    B: Output,
    I: Fn(&A) -> Option<M::Symbol>,
    O: Fn(M::Output) -> B,
{
    type Symbol = A;
    type Output = B;

    fn answer(&mut self, word: &Word<A>) -> Result<B, OracleError> {
        let concrete: Word<M::Symbol> = word
            .symbols()
            .map(|sym| (self.map_input)(sym).ok_or_else(|| OracleError::UnknownSymbol(sym.show())))
            .collect::<Result<_, _>>()?;
        trace!("mapped {word} to {concrete}");
        let out = self.inner.answer(&concrete)?;
        Ok((self.map_output)(out))
    }
}

#[cfg(test)]
mod tests {
    use lstar_core::prelude::*;

    use super::{CachedOracle, CountingOracle, MappedOracle};
    use crate::oracle::{MembershipOracle, OracleError, SimulatorOracle};

    fn counter_mod(n: u32) -> MealyMachine<u32, u32> {
        let alphabet = Alphabet::new((1..=5).collect()).unwrap();
        let transitions = (0..n)
            .flat_map(|q| (1..=5).map(move |i| (q as usize, i, q + i, ((q + i) % n) as usize)))
            .collect::<Vec<_>>();
        MealyMachine::from_parts(alphabet, n as usize, transitions, 0).unwrap()
    }

    #[test]
    fn counting_and_caching() {
        let counting = CountingOracle::new(SimulatorOracle::new(counter_mod(3)), "Output Queries");
        let counter = counting.counter();
        let mut cached = CachedOracle::new(counting);

        let word = Word::from(vec![1, 2]);
        assert_eq!(cached.answer(&word), Ok(Word::from(vec![1, 3])));
        assert_eq!(cached.answer(&word), Ok(Word::from(vec![1, 3])));
        assert_eq!(cached.answer(&Word::from(vec![2])), Ok(Word::from(vec![2])));

        assert_eq!(counter.count(), 2);
        assert_eq!(cached.hits(), 1);
        assert_eq!(cached.cached(), 2);
        assert_eq!(counter.to_string(), "Output Queries: 2");
        counter.reset();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn mapping_symbols() {
        let mut mapped = MappedOracle::new(
            SimulatorOracle::new(counter_mod(4)),
            |sym: &String| sym.parse::<u32>().ok(),
            |out: Word<u32>| out.into_iter().map(|o| o.to_string()).collect::<Word<String>>(),
        );
        let word: Word<String> = ["3", "2"].into_iter().map(String::from).collect();
        assert_eq!(
            mapped.answer(&word),
            Ok(["3", "5"].into_iter().map(String::from).collect())
        );
        let foreign: Word<String> = ["x".to_string()].into_iter().collect();
        assert_eq!(
            mapped.answer(&foreign),
            Err(OracleError::UnknownSymbol("x".into()))
        );
        let unknown: Word<String> = ["9".to_string()].into_iter().collect();
        assert_eq!(
            mapped.answer(&unknown),
            Err(OracleError::UnknownSymbol("9".into()))
        );
    }
}
