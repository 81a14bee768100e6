use itertools::Itertools;
use thiserror::Error;

use crate::{math, word::Word, Show, Symbol};

/// Errors that can occur when building an [`Alphabet`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AlphabetError {
    /// An alphabet needs at least one symbol.
    #[error("alphabet must contain at least one symbol")]
    Empty,
    /// Every symbol may only appear once.
    #[error("symbol `{0}` appears more than once")]
    DuplicateSymbol(String),
}

/// An ordered collection of unique symbols. The position of a symbol in the alphabet is its
/// index, which is what transitions are stored by. Lookups work in both directions, from a
/// symbol to its index and from an index to its symbol.
///
/// # Example
/// ```
/// use lstar_core::prelude::*;
///
/// let alphabet = Alphabet::new(vec!['a', 'b', 'c']).unwrap();
/// assert_eq!(alphabet.size(), 3);
/// assert_eq!(alphabet.position(&'b'), Some(1));
/// assert_eq!(alphabet.nth(2), Some(&'c'));
/// ```
#[derive(Clone)]
pub struct Alphabet<S: Symbol> {
    symbols: Vec<S>,
    index: math::Bijection<usize, S>,
}

impl<S: Symbol> Alphabet<S> {
    /// Creates a new alphabet, the order of `symbols` determines the index of each symbol.
    /// Fails if `symbols` is empty or contains a symbol twice.
    pub fn new(symbols: Vec<S>) -> Result<Self, AlphabetError> {
        if symbols.is_empty() {
            return Err(AlphabetError::Empty);
        }
        let mut index = math::Bijection::new();
        for (i, sym) in symbols.iter().enumerate() {
            if index.insert_no_overwrite(i, sym.clone()).is_err() {
                return Err(AlphabetError::DuplicateSymbol(sym.show()));
            }
        }
        Ok(Self { symbols, index })
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Iterates over the symbols in index order.
    pub fn symbols(&self) -> std::slice::Iter<'_, S> {
        self.symbols.iter()
    }

    /// Iterates over the indices `0..size`.
    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.size()
    }

    /// Returns the symbol with index `pos`, if it exists.
    pub fn nth(&self, pos: usize) -> Option<&S> {
        self.index.get_by_left(&pos)
    }

    /// Returns the index of `symbol`, if it is part of the alphabet.
    pub fn position(&self, symbol: &S) -> Option<usize> {
        self.index.get_by_right(symbol).copied()
    }

    /// Checks whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: &S) -> bool {
        self.index.contains_right(symbol)
    }

    /// Checks whether every symbol of `word` belongs to the alphabet.
    pub fn covers(&self, word: &Word<S>) -> bool {
        word.symbols().all(|sym| self.contains(sym))
    }

    /// Returns the single-symbol words, one for each symbol in index order.
    pub fn singletons(&self) -> Vec<Word<S>> {
        self.symbols.iter().cloned().map(Word::singleton).collect()
    }

    /// Returns all words over the alphabet of length at most `max_len`, ordered by length and
    /// then by symbol index.
    pub fn words_up_to(&self, max_len: usize) -> Vec<Word<S>> {
        let mut out = vec![Word::epsilon()];
        let mut layer = vec![Word::epsilon()];
        for _ in 0..max_len {
            layer = layer
                .iter()
                .flat_map(|w| self.symbols.iter().map(move |a| w.append(a.clone())))
                .collect();
            out.extend(layer.iter().cloned());
        }
        out
    }
}

impl Alphabet<char> {
    /// Creates an alphabet of the first `size` lowercase letters, starting at `'a'`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or larger than 26.
    pub fn of_size(size: usize) -> Self {
        assert!(size > 0 && size <= 26, "alphabet size must be between 1 and 26");
        Self::new((0..size).map(|i| (b'a' + i as u8) as char).collect())
            .expect("distinct letters form a valid alphabet")
    }
}

impl<S: Symbol> PartialEq for Alphabet<S> {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl<S: Symbol> Eq for Alphabet<S> {}

impl<S: Symbol> std::fmt::Debug for Alphabet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.symbols.iter().map(Show::show).join(", "))
    }
}

impl<S: Symbol> std::fmt::Display for Alphabet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{Alphabet, AlphabetError};
    use crate::word::Word;

    #[test]
    fn lookups_in_both_directions() {
        let alphabet = Alphabet::new(vec![3u32, 1, 2]).unwrap();
        assert_eq!(alphabet.size(), 3);
        assert_eq!(alphabet.position(&3), Some(0));
        assert_eq!(alphabet.position(&2), Some(2));
        assert_eq!(alphabet.position(&7), None);
        assert_eq!(alphabet.nth(1), Some(&1));
        assert_eq!(alphabet.nth(3), None);
        assert!(alphabet.covers(&Word::from(vec![1, 3, 3])));
        assert!(!alphabet.covers(&Word::from(vec![1, 4])));
    }

    #[test]
    fn malformed_alphabets() {
        assert_eq!(
            Alphabet::<char>::new(vec![]).unwrap_err(),
            AlphabetError::Empty
        );
        assert_eq!(
            Alphabet::new(vec!['a', 'b', 'a']).unwrap_err(),
            AlphabetError::DuplicateSymbol("a".into())
        );
    }

    #[test]
    #[should_panic(expected = "alphabet size must be between 1 and 26")]
    fn letter_alphabets_are_bounded() {
        Alphabet::of_size(27);
    }

    #[test]
    fn enumerating_words() {
        let alphabet = Alphabet::of_size(2);
        let words = alphabet.words_up_to(2);
        assert_eq!(words.len(), 1 + 2 + 4);
        assert_eq!(words[0], Word::epsilon());
        assert_eq!(words[1], Word::from("a"));
        assert_eq!(words[4], Word::from("ab"));
        assert_eq!(alphabet.singletons(), vec![Word::from("a"), Word::from("b")]);
    }
}
