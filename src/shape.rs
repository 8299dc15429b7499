use rand::{Rng, SeedableRng, rngs::StdRng};
use std::fmt;

/// One rotation state: rows of 0/1 occupancy flags, top row first.
pub type Grid = &'static [&'static [u8]];

// Rotation states for each tetromino, in the order a clockwise rotation steps through them.
// The ordering matters: the single-step wall kick probes rotation `r + 1` first.
static I_STATES: [Grid; 2] = [&[&[1, 1, 1, 1]], &[&[1], &[1], &[1], &[1]]];

static O_STATES: [Grid; 1] = [&[&[1, 1], &[1, 1]]];

static T_STATES: [Grid; 4] = [
    &[&[0, 1, 0], &[1, 1, 1]],
    &[&[1, 0], &[1, 1], &[1, 0]],
    &[&[1, 1, 1], &[0, 1, 0]],
    &[&[0, 1], &[1, 1], &[0, 1]],
];

static S_STATES: [Grid; 2] = [&[&[0, 1, 1], &[1, 1, 0]], &[&[1, 0], &[1, 1], &[0, 1]]];

static Z_STATES: [Grid; 2] = [&[&[1, 1, 0], &[0, 1, 1]], &[&[0, 1], &[1, 1], &[1, 0]]];

static J_STATES: [Grid; 4] = [
    &[&[1, 0, 0], &[1, 1, 1]],
    &[&[1, 1], &[1, 0], &[1, 0]],
    &[&[1, 1, 1], &[0, 0, 1]],
    &[&[0, 1], &[0, 1], &[1, 1]],
];

static L_STATES: [Grid; 4] = [
    &[&[0, 0, 1], &[1, 1, 1]],
    &[&[1, 0], &[1, 0], &[1, 1]],
    &[&[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1], &[0, 1], &[0, 1]],
];

// Indexed by `Kind as usize`.
static STATES: [&[Grid]; 7] = [
    &I_STATES, &O_STATES, &T_STATES, &S_STATES, &Z_STATES, &J_STATES, &L_STATES,
];

/// The seven tetromino kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::I,
        Kind::O,
        Kind::T,
        Kind::S,
        Kind::Z,
        Kind::J,
        Kind::L,
    ];

    pub fn rotation_states(self) -> &'static [Grid] {
        STATES[self as usize]
    }

    pub fn rotation_count(self) -> usize {
        self.rotation_states().len()
    }

    /// Rotation state `rotation mod count`; any integer is accepted, negatives included.
    pub fn state_at(self, rotation: i32) -> Grid {
        let states = self.rotation_states();
        states[rotation.rem_euclid(states.len() as i32) as usize]
    }

    // width, height of the shape at the given rotation
    pub fn dim(self, rotation: i32) -> (usize, usize) {
        let grid = self.state_at(rotation);
        (grid[0].len(), grid.len())
    }

    /// Offsets `(column, row)` of the occupied cells of a rotation state.
    pub fn cells(self, rotation: i32) -> impl Iterator<Item = (i32, i32)> {
        self.state_at(rotation)
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &flag)| flag != 0)
                    .map(move |(c, _)| (c as i32, r as i32))
            })
    }

    /// Per-kind cell marker, 1..=7. Used when locked cells are colored by kind.
    pub const fn marker(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Kind::I => 'I',
            Kind::O => 'O',
            Kind::T => 'T',
            Kind::S => 'S',
            Kind::Z => 'Z',
            Kind::J => 'J',
            Kind::L => 'L',
        };
        write!(f, "{c}")
    }
}

/// Supplies the kind of each newly spawned piece.
pub trait KindSource {
    fn next_kind(&mut self) -> Kind;
}

/// Uniform, independent choice over the seven kinds.
pub struct RandomKinds<R> {
    rng: R,
    seed: Option<u64>,
}

impl<R: Rng> RandomKinds<R> {
    pub fn new(rng: R) -> Self {
        RandomKinds { rng, seed: None }
    }
}

impl RandomKinds<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        RandomKinds {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Seeded from the process-wide generator; the seed is kept so a game can be replayed.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }
}

impl<R> RandomKinds<R> {
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl<R: Rng> KindSource for RandomKinds<R> {
    fn next_kind(&mut self) -> Kind {
        Kind::ALL[self.rng.random_range(0..Kind::ALL.len())]
    }
}

/// Cycles through a fixed list of kinds. Handy for reproducing a scenario exactly.
#[derive(Clone, Debug)]
pub struct KindSequence {
    kinds: Vec<Kind>,
    next: usize,
}

impl KindSequence {
    pub fn new(kinds: impl Into<Vec<Kind>>) -> Self {
        let kinds = kinds.into();
        assert!(!kinds.is_empty(), "kind sequence must not be empty");
        KindSequence { kinds, next: 0 }
    }
}

impl KindSource for KindSequence {
    fn next_kind(&mut self) -> Kind {
        let kind = self.kinds[self.next];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }
}
