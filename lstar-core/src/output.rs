use std::{fmt::Debug, hash::Hash};

use crate::{word::Word, Show, Symbol};

/// The type of answer that a query on a word produces. Acceptors answer with a `bool`, stating
/// whether the word is accepted. Transducers answer with a [`Word`] over their output alphabet
/// that has one output symbol per input symbol.
///
/// When a query is made of a prefix followed by a suffix, only some part of the answer is
/// caused by the suffix. [`Output::tail`] extracts this part, it is what an observation table
/// stores in the cell for that prefix and suffix.
pub trait Output: Clone + Eq + Hash + Debug + Show {
    /// Returns the part of the answer that a suffix of length `len` is responsible for.
    fn tail(&self, len: usize) -> Self;

    /// Returns the last observation that was made, for an acceptor that is the answer itself
    /// and for a transducer the last output symbol (as a word of length at most one).
    fn trailing(&self) -> Self {
        self.tail(1)
    }
}

impl Output for bool {
    fn tail(&self, _len: usize) -> Self {
        *self
    }
}

impl<O: Symbol> Output for Word<O> {
    fn tail(&self, len: usize) -> Self {
        self.suffix_of_length(len.min(self.len()))
    }
}
