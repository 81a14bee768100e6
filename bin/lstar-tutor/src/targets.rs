//! The systems under learning of the tutorial.

use lstar_core::prelude::*;

/// Accepts the words over `a` and `b` with an even number of both symbols.
pub fn angluin() -> Result<Dfa<char>, AutomatonError> {
    Dfa::from_parts(
        Alphabet::of_size(2),
        vec![true, false, false, false],
        [
            (0, 'a', 1),
            (0, 'b', 2),
            (1, 'a', 0),
            (1, 'b', 3),
            (2, 'a', 3),
            (2, 'b', 0),
            (3, 'a', 2),
            (3, 'b', 1),
        ],
        0,
    )
}

const XYZ: [(StateIndex, char, StateIndex); 12] = [
    (0, 'a', 1),
    (0, 'b', 2),
    (0, 'c', 0),
    (1, 'a', 1),
    (1, 'b', 2),
    (1, 'c', 0),
    (2, 'a', 0),
    (2, 'b', 1),
    (2, 'c', 3),
    (3, 'a', 0),
    (3, 'b', 1),
    (3, 'c', 2),
];

const XYZ_OUTPUTS: [char; 4] = ['x', 'y', 'z', 'x'];

/// Four states over `a`, `b` and `c`, every transition emits `x`, `y` or `z` depending on its
/// source.
pub fn xyz_mealy() -> Result<MealyMachine<char, char>, AutomatonError> {
    MealyMachine::from_parts(
        Alphabet::of_size(3),
        XYZ_OUTPUTS.len(),
        XYZ.map(|(from, sym, to)| (from, sym, XYZ_OUTPUTS[from], to)),
        0,
    )
}

/// The Moore machine whose states output `x`, `y`, `z` and `x`, with the transitions of
/// [`xyz_mealy`].
pub fn xyz_moore() -> Result<MooreMachine<char, char>, AutomatonError> {
    MooreMachine::from_parts(Alphabet::of_size(3), XYZ_OUTPUTS.to_vec(), XYZ, 0)
}

/// Inputs of the modular targets.
pub const CONCRETE_INPUTS: std::ops::RangeInclusive<u32> = 1..=1000;

fn concrete_alphabet() -> Alphabet<u32> {
    Alphabet::new(CONCRETE_INPUTS.collect()).expect("a range has no duplicates")
}

/// Moves from `s` to `(s + i) mod n` on input `i`. The initial state rejects, the states in
/// between accept iff their index is odd and the last state accepts iff `n` is even.
pub fn modular_dfa(n: u32) -> Result<Dfa<u32>, AutomatonError> {
    let accepting = (0..n)
        .map(|s| match s {
            0 => false,
            s if s == n - 1 => n % 2 == 0,
            s => s % 2 == 1,
        })
        .collect();
    let transitions = (0..n).flat_map(|s| {
        CONCRETE_INPUTS.map(move |i| (s as StateIndex, i, ((s + i) % n) as StateIndex))
    });
    Dfa::from_parts(concrete_alphabet(), accepting, transitions, 0)
}

/// Moves from `s` to `(s + i) mod n` on input `i` and emits `s + i`.
pub fn modular_mealy(n: u32) -> Result<MealyMachine<u32, u32>, AutomatonError> {
    let transitions = (0..n).flat_map(|s| {
        CONCRETE_INPUTS.map(move |i| (s as StateIndex, i, s + i, ((s + i) % n) as StateIndex))
    });
    MealyMachine::from_parts(concrete_alphabet(), n as usize, transitions, 0)
}
