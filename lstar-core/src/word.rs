use itertools::Itertools;

use crate::{Show, Symbol};

/// A finite sequence of symbols. Words are immutable values, every operation that changes a
/// word produces a new one. The empty word `ε` is the identity for concatenation.
///
/// # Example
/// ```
/// use lstar_core::prelude::*;
///
/// let word = Word::from("abc");
/// assert_eq!(word.len(), 3);
/// assert_eq!(word.prepend('c').to_string(), "cabc");
/// assert_eq!(word.suffix_of_length(2), Word::from("bc"));
/// assert_eq!(Word::<char>::epsilon().to_string(), "ε");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Word<S>(Vec<S>);

impl<S: Symbol> Word<S> {
    /// Returns the empty word.
    pub fn epsilon() -> Self {
        Self(vec![])
    }

    /// Builds the word consisting only of `symbol`.
    pub fn singleton(symbol: S) -> Self {
        Self(vec![symbol])
    }

    /// Gives the length of the word, i.e. the number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the word is empty, i.e. has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the symbols of the word.
    pub fn symbols(&self) -> std::slice::Iter<'_, S> {
        self.0.iter()
    }

    /// Returns the symbol at `position`, if the word is long enough.
    pub fn nth(&self, position: usize) -> Option<&S> {
        self.0.get(position)
    }

    /// Returns the first symbol or `None` for the empty word.
    pub fn first_symbol(&self) -> Option<&S> {
        self.0.first()
    }

    /// Builds the word that is `self` followed by `other`.
    pub fn concat(&self, other: &Word<S>) -> Word<S> {
        Self(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    /// Builds the word that starts with `symbol` and continues with `self`.
    pub fn prepend(&self, symbol: S) -> Word<S> {
        Self(std::iter::once(symbol).chain(self.0.iter().cloned()).collect())
    }

    /// Builds the word that is `self` followed by `symbol`.
    pub fn append(&self, symbol: S) -> Word<S> {
        let mut symbols = self.0.clone();
        symbols.push(symbol);
        Self(symbols)
    }

    /// Returns the prefix of length `len`. Panics if the word is shorter than that.
    pub fn prefix(&self, len: usize) -> Word<S> {
        assert!(len <= self.len(), "prefix length exceeds word length");
        Self(self.0[..len].to_vec())
    }

    /// Drops the first `n` symbols. Panics if the word is shorter than `n`.
    pub fn skip(&self, n: usize) -> Word<S> {
        assert!(n <= self.len(), "cannot skip more symbols than the word has");
        Self(self.0[n..].to_vec())
    }

    /// Returns the suffix of length `len`. Panics if the word is shorter than that.
    pub fn suffix_of_length(&self, len: usize) -> Word<S> {
        assert!(len <= self.len(), "suffix length exceeds word length");
        self.skip(self.len() - len)
    }

    /// Returns all prefixes, shortest first and starting with `ε`. The word itself is only
    /// included if `include_full` is set.
    pub fn prefixes(&self, include_full: bool) -> Vec<Word<S>> {
        let end = if include_full { self.len() } else { self.len().saturating_sub(1) };
        if !include_full && self.is_empty() {
            return vec![];
        }
        (0..=end).map(|len| self.prefix(len)).collect()
    }

    /// Returns all suffixes, shortest first and starting with `ε`. The word itself is only
    /// included if `include_full` is set.
    pub fn suffixes(&self, include_full: bool) -> Vec<Word<S>> {
        let end = if include_full { self.len() } else { self.len().saturating_sub(1) };
        if !include_full && self.is_empty() {
            return vec![];
        }
        (0..=end).map(|len| self.suffix_of_length(len)).collect()
    }

    /// Returns all suffixes of length at least one, shortest first.
    pub fn non_empty_suffixes(&self) -> Vec<Word<S>> {
        (1..=self.len()).map(|len| self.suffix_of_length(len)).collect()
    }

    /// Converts the word to a string, `ε` for the empty word.
    pub fn as_string(&self) -> String {
        if self.is_empty() {
            return "ε".into();
        }
        let shown = self.0.iter().map(Show::show).collect_vec();
        if shown.iter().all(|s| s.chars().count() == 1) {
            shown.join("")
        } else {
            shown.join("·")
        }
    }
}

impl<S: Symbol> Show for Word<S> {
    fn show(&self) -> String {
        self.as_string()
    }
}

impl<S: Symbol> std::fmt::Display for Word<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl<S: Symbol> std::fmt::Debug for Word<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.as_string())
    }
}

impl<S> From<Vec<S>> for Word<S> {
    fn from(value: Vec<S>) -> Self {
        Self(value)
    }
}

impl From<&str> for Word<char> {
    fn from(value: &str) -> Self {
        Self(value.chars().collect())
    }
}

impl<S> FromIterator<S> for Word<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<S> IntoIterator for Word<S> {
    type Item = S;
    type IntoIter = std::vec::IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, S> IntoIterator for &'a Word<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Word;

    #[test]
    fn concatenation_and_epsilon() {
        let eps = Word::<char>::epsilon();
        let ab = Word::from("ab");
        assert_eq!(eps.concat(&ab), ab);
        assert_eq!(ab.concat(&eps), ab);
        assert_eq!(ab.concat(&Word::from("ba")), Word::from("abba"));
        assert_eq!(ab.prepend('b'), Word::from("bab"));
        assert_eq!(ab.append('a'), Word::from("aba"));
        assert_eq!(ab.first_symbol(), Some(&'a'));
    }

    #[test]
    fn prefixes_and_suffixes() {
        let w = Word::from("abc");
        assert_eq!(
            w.prefixes(true),
            vec![Word::epsilon(), "a".into(), "ab".into(), "abc".into()]
        );
        assert_eq!(
            w.prefixes(false),
            vec![Word::epsilon(), "a".into(), "ab".into()]
        );
        assert_eq!(
            w.suffixes(true),
            vec![Word::epsilon(), "c".into(), "bc".into(), "abc".into()]
        );
        assert_eq!(w.suffixes(false), vec![Word::epsilon(), "c".into(), "bc".into()]);
        assert_eq!(w.non_empty_suffixes(), vec!["c".into(), "bc".into(), "abc".into()]);
        assert_eq!(w.suffix_of_length(0), Word::epsilon());
        assert_eq!(w.skip(1), Word::from("bc"));
        assert_eq!(w.prefix(2), Word::from("ab"));

        let eps = Word::<char>::epsilon();
        assert_eq!(eps.prefixes(true), vec![Word::epsilon()]);
        assert!(eps.prefixes(false).is_empty());
        assert!(eps.non_empty_suffixes().is_empty());
    }

    #[test]
    fn rendering() {
        assert_eq!(Word::from("aab").to_string(), "aab");
        assert_eq!(Word::from(vec![10u32, 2]).to_string(), "10·2");
        assert_eq!(Word::<u32>::epsilon().to_string(), "ε");
    }
}
