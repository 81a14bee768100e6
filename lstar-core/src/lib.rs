//! Core building blocks for active learning of finite automata.
//!
//! A learning session works over a fixed, finite [`Alphabet`] of symbols and poses queries on
//! finite [`word::Word`]s. Depending on the kind of target, a query is answered with an
//! [`output::Output`] that is either a `bool` (for acceptors, i.e. deterministic finite
//! automata) or a word over some output alphabet (for transducers such as Mealy machines).
//!
//! The crate provides the automata that a learner produces as hypotheses, namely
//! [`automaton::Dfa`], [`automaton::MealyMachine`] and [`automaton::MooreMachine`]. All of
//! them are deterministic and total, they are built through a [`automaton::TransitionTable`]
//! which validates completeness before handing out a machine. The [`automaton::Machine`] trait
//! abstracts over their semantics and provides the product-based search for separating words
//! that equivalence checks and conformance testing rely on.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use lstar_core::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, AlphabetError},
        automaton::{
            AutomatonError, Dfa, Machine, MealyMachine, MooreMachine, StateIndex, TransitionTable,
        },
        math,
        output::Output,
        word::Word,
        Show, Symbol,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;
pub use alphabet::Alphabet;

/// Module that contains definitions for dealing with finite words.
pub mod word;

/// Defines what a query can be answered with.
pub mod output;

/// Defines deterministic acceptors and transducers together with their common semantics.
pub mod automaton;

use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;

/// A symbol is anything that can label a transition. Symbols are opaque tokens which we only
/// ever compare, order, hash and print.
pub trait Symbol: Clone + Eq + Ord + Hash + Debug + Show {}

impl<T: Clone + Eq + Ord + Hash + Debug + Show> Symbol for T {}

/// Helper trait which can be used to display symbols, words, outputs and such.
pub trait Show {
    /// Returns a human readable representation of `self`. For a symbol this should be the symbol
    /// itself, for a word the concatenation of its symbols. This is mainly used when rendering
    /// observation tables and transition tables.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of symbols this should be the word they
    /// form, for a collection of words it should be `{w1, w2, ...}`.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        iter.into_iter().map(|sym| sym.to_string()).join("")
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for str {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for () {
    fn show(&self) -> String {
        "-".into()
    }
}

macro_rules! impl_show_for_integers {
    ($($int:ty),*) => {
        $(
            impl Show for $int {
                fn show(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_show_for_integers!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}
