//! Falling-block puzzle engine: the seven tetromino shapes, a 10x20 board, collision
//! probes, locking and line clearing. `game` strings these together into a playable state.

pub mod board;
pub mod game;
pub mod shape;

pub use board::{BOARD_HEIGHT, BOARD_WIDTH, Board};
pub use game::{Game, Move, Probe, Tetromino, line_clear_score};
pub use shape::{Kind, KindSequence, KindSource, RandomKinds};
