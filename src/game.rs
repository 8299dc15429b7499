use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Board, EMPTY, OCCUPIED};
use crate::shape::{Grid, Kind, KindSource};
use log::{debug, info};

const SOFT_DROP_POINTS: u32 = 1;

/// Points for clearing `lines` rows with one lock.
pub fn line_clear_score(lines: usize) -> u32 {
    match lines {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        _ => 800,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tetromino {
    pub kind: Kind,
    pub rotation: i32, // normalized modulo the kind's rotation count on every lookup
    pub x: i32,        // board offset of the shape grid's top-left corner
    pub y: i32,
}

/// A hypothetical placement for a collision probe. Unset fields fall back to the piece's own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Probe {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub rotation: Option<i32>,
}

impl Probe {
    pub const CURRENT: Probe = Probe {
        x: None,
        y: None,
        rotation: None,
    };

    pub fn x(self, x: i32) -> Probe {
        Probe { x: Some(x), ..self }
    }

    pub fn y(self, y: i32) -> Probe {
        Probe { y: Some(y), ..self }
    }

    pub fn rotation(self, rotation: i32) -> Probe {
        Probe {
            rotation: Some(rotation),
            ..self
        }
    }
}

impl Tetromino {
    pub fn new(kind: Kind, rotation: i32, x: i32, y: i32) -> Self {
        Tetromino {
            kind,
            rotation,
            x,
            y,
        }
    }

    /// Fresh piece at the top of the board, rotation 0, centered by integer division.
    ///
    /// Odd-width shapes land one column left of true center.
    pub fn spawn(kind: Kind) -> Self {
        let (width, _) = kind.dim(0);
        let x = (BOARD_WIDTH / 2) as i32 - (width / 2) as i32;
        Tetromino::new(kind, 0, x, 0)
    }

    pub fn spawn_from(source: &mut impl KindSource) -> Self {
        Tetromino::spawn(source.next_kind())
    }

    pub fn shape(&self) -> Grid {
        self.kind.state_at(self.rotation)
    }

    /// True if the piece, placed per `probe`, leaves the board or overlaps an occupied cell.
    pub fn collides(&self, board: &Board, probe: Probe) -> bool {
        let x = probe.x.unwrap_or(self.x);
        let y = probe.y.unwrap_or(self.y);
        let rotation = probe.rotation.unwrap_or(self.rotation);
        let cells = || self.kind.cells(rotation).map(move |(c, r)| (x + c, y + r));
        let in_bounds = |(bx, by): (i32, i32)| {
            (0..BOARD_WIDTH as i32).contains(&bx) && (0..BOARD_HEIGHT as i32).contains(&by)
        };
        // leaving the board wins over overlapping a settled cell
        if !cells().all(in_bounds) {
            return true;
        }
        cells().any(|(bx, by)| board.get(bx as usize, by as usize) != EMPTY)
    }

    /// Commit the piece's cells into `board` with the plain occupied marker.
    pub fn lock(&self, board: &mut Board) {
        self.lock_with(board, OCCUPIED);
    }

    pub fn lock_with(&self, board: &mut Board, marker: u8) {
        board.lock(self.kind, self.rotation, self.x, self.y, marker);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Left,
    Right,
    Down,
    Rotate,
}

pub struct Game<S> {
    pub tetromino: Tetromino, // active tetromino
    pub score: u32,
    pub board: Board,
    pub paused: bool,
    colored: bool,
    over: bool,
    lines: usize,
    kinds: S,
}

impl<S: KindSource> Game<S> {
    pub fn new(mut kinds: S) -> Self {
        let tetromino = Tetromino::spawn_from(&mut kinds);
        info!("new game, first piece {}", tetromino.kind);
        Game {
            tetromino,
            score: 0,
            board: Board::new(),
            paused: false,
            colored: false,
            over: false,
            lines: 0,
            kinds,
        }
    }

    /// Lock pieces with their kind's marker instead of the single occupied marker.
    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn restart(&mut self) {
        self.board = Board::new();
        self.score = 0;
        self.lines = 0;
        self.over = false;
        self.paused = false;
        self.tetromino = Tetromino::spawn_from(&mut self.kinds);
        info!("restart, first piece {}", self.tetromino.kind);
    }

    fn fits(&self, probe: Probe) -> bool {
        !self.tetromino.collides(&self.board, probe)
    }

    // move tetromino if it does not hit anything
    pub fn try_move(&mut self, m: Move) -> bool {
        if self.over {
            return false;
        }
        let tet = self.tetromino;
        match m {
            Move::Left => self.shift(tet.x - 1),
            Move::Right => self.shift(tet.x + 1),
            Move::Rotate => {
                let r = (tet.rotation + 1).rem_euclid(tet.kind.rotation_count() as i32);
                // wall kick - one column left, then one column right
                let kick = [tet.x, tet.x - 1, tet.x + 1]
                    .into_iter()
                    .find(|&x| self.fits(Probe::CURRENT.x(x).rotation(r)));
                match kick {
                    Some(x) => {
                        self.tetromino.x = x;
                        self.tetromino.rotation = r;
                        true
                    }
                    None => false,
                }
            }
            Move::Down => {
                if self.fits(Probe::CURRENT.y(tet.y + 1)) {
                    self.tetromino.y += 1;
                    self.score += SOFT_DROP_POINTS;
                    true
                } else {
                    self.settle();
                    false
                }
            }
        }
    }

    fn shift(&mut self, x: i32) -> bool {
        let hit = !self.fits(Probe::CURRENT.x(x));
        if !hit {
            self.tetromino.x = x;
        }
        !hit
    }

    /// One gravity step. Returns false once the game is over.
    pub fn fall(&mut self) -> bool {
        if self.over {
            return false;
        }
        if self.paused {
            return true;
        }
        if self.fits(Probe::CURRENT.y(self.tetromino.y + 1)) {
            self.tetromino.y += 1;
        } else {
            self.settle();
        }
        !self.over
    }

    // lock, clear rows, score, and bring in the next piece
    fn settle(&mut self) {
        let marker = if self.colored {
            self.tetromino.kind.marker()
        } else {
            OCCUPIED
        };
        self.tetromino.lock_with(&mut self.board, marker);
        let (board, cleared) = self.board.clear_lines();
        self.board = board;
        self.lines += cleared;
        self.score += line_clear_score(cleared);

        self.tetromino = Tetromino::spawn_from(&mut self.kinds);
        debug!("spawned {} at x={}", self.tetromino.kind, self.tetromino.x);
        if !self.fits(Probe::CURRENT) {
            self.over = true;
            info!("game over, score {} after {} lines", self.score, self.lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::KindSequence;

    fn game(kinds: &[Kind]) -> Game<KindSequence> {
        Game::new(KindSequence::new(kinds.to_vec()))
    }

    #[test]
    fn scores_by_lines_cleared() {
        let got: Vec<u32> = (0..=6).map(line_clear_score).collect();
        assert_eq!(got, vec![0, 100, 300, 500, 800, 800, 800]);
    }

    #[test]
    fn spawn_positions() {
        assert_eq!(Tetromino::spawn(Kind::I), Tetromino::new(Kind::I, 0, 3, 0));
        assert_eq!(Tetromino::spawn(Kind::O), Tetromino::new(Kind::O, 0, 4, 0));
        // width 3: 5 - 1, left of true center
        for kind in [Kind::T, Kind::S, Kind::Z, Kind::J, Kind::L] {
            assert_eq!(Tetromino::spawn(kind).x, 4, "{kind}");
        }
    }

    #[test]
    fn spawned_pieces_fit_an_empty_board() {
        let board = Board::new();
        for kind in Kind::ALL {
            assert!(!Tetromino::spawn(kind).collides(&board, Probe::CURRENT));
        }
    }

    #[test]
    fn probe_fields_default_independently() {
        let mut board = Board::new();
        board.set(9, 0, OCCUPIED);
        let piece = Tetromino::new(Kind::I, 0, 5, 0);
        assert!(!piece.collides(&board, Probe::CURRENT));
        assert!(piece.collides(&board, Probe::CURRENT.x(6)));
        assert!(!piece.collides(&board, Probe::CURRENT.x(6).y(1)));
        // vertical I at x=5 covers rows 0..4 of column 5 only
        assert!(!piece.collides(&board, Probe::CURRENT.rotation(1)));
        assert!(piece.collides(&board, Probe::CURRENT.rotation(1).y(17)));
    }

    #[test]
    fn empty_flags_never_collide() {
        let mut board = Board::new();
        board.set(0, 0, OCCUPIED);
        // top-left flag of T rotation 0 is empty
        let t = Tetromino::new(Kind::T, 0, 0, 0);
        assert!(!t.collides(&board, Probe::CURRENT));
        assert!(t.collides(&board, Probe::CURRENT.rotation(1)));
    }

    #[test]
    fn move_left_and_right_stop_at_walls() {
        let mut g = game(&[Kind::O]);
        for _ in 0..10 {
            g.try_move(Move::Left);
        }
        assert_eq!(g.tetromino.x, 0);
        assert!(!g.try_move(Move::Left));
        for _ in 0..10 {
            g.try_move(Move::Right);
        }
        assert_eq!(g.tetromino.x, 8);
        assert!(!g.try_move(Move::Right));
    }

    #[test]
    fn rotate_in_open_space() {
        let mut g = game(&[Kind::T]);
        g.tetromino.y = 5;
        assert!(g.try_move(Move::Rotate));
        assert_eq!(g.tetromino.rotation, 1);
        assert_eq!(g.tetromino.x, 4);
        for _ in 0..3 {
            g.try_move(Move::Rotate);
        }
        assert_eq!(g.tetromino.rotation, 0);
    }

    #[test]
    fn rotate_kicks_left_off_the_right_wall() {
        let mut g = game(&[Kind::T]);
        // vertical T hugging the right wall: rotating back to width 3 must shift left
        g.tetromino = Tetromino::new(Kind::T, 1, 8, 5);
        assert!(g.try_move(Move::Rotate));
        assert_eq!((g.tetromino.x, g.tetromino.rotation), (7, 2));
    }

    #[test]
    fn rotate_kicks_right_when_left_is_blocked() {
        let mut g = game(&[Kind::S]);
        g.tetromino = Tetromino::new(Kind::S, 1, 4, 5);
        // block the unkicked and left-kicked targets, leave x+1 free
        g.board.set(4, 6, OCCUPIED);
        g.board.set(3, 6, OCCUPIED);
        assert!(g.try_move(Move::Rotate));
        assert_eq!((g.tetromino.x, g.tetromino.rotation), (5, 0));
    }

    #[test]
    fn rotate_fails_without_room() {
        let mut g = game(&[Kind::I]);
        g.tetromino = Tetromino::new(Kind::I, 1, 4, 0);
        for y in 0..4 {
            for x in 0..BOARD_WIDTH {
                if x != 4 {
                    g.board.set(x, y, OCCUPIED);
                }
            }
        }
        assert!(!g.try_move(Move::Rotate));
        assert_eq!(g.tetromino, Tetromino::new(Kind::I, 1, 4, 0));
    }

    #[test]
    fn soft_drop_scores_one_per_row() {
        let mut g = game(&[Kind::O]);
        assert!(g.try_move(Move::Down));
        assert!(g.try_move(Move::Down));
        assert_eq!(g.score, 2);
        assert_eq!(g.tetromino.y, 2);
    }

    #[test]
    fn soft_drop_at_floor_locks_and_spawns() {
        let mut g = game(&[Kind::O, Kind::I]);
        while g.try_move(Move::Down) {}
        assert_eq!(g.score, 18);
        assert_eq!(g.board.get(4, 18), OCCUPIED);
        assert_eq!(g.board.get(5, 19), OCCUPIED);
        assert_eq!(g.tetromino, Tetromino::spawn(Kind::I));
        assert!(!g.is_over());
    }

    #[test]
    fn gravity_does_not_score() {
        let mut g = game(&[Kind::O]);
        for _ in 0..19 {
            assert!(g.fall());
        }
        assert_eq!(g.score, 0);
        assert_eq!(g.board.get(4, 19), OCCUPIED);
    }

    #[test]
    fn pause_holds_gravity() {
        let mut g = game(&[Kind::O]);
        g.paused = true;
        assert!(g.fall());
        assert_eq!(g.tetromino.y, 0);
    }

    #[test]
    fn settling_clears_lines_and_scores() {
        let mut g = game(&[Kind::I]);
        for x in 0..6 {
            g.board.set(x, 19, OCCUPIED);
        }
        g.tetromino = Tetromino::new(Kind::I, 0, 6, 19);
        g.fall();
        assert_eq!(g.score, 100);
        assert_eq!(g.lines(), 1);
        assert_eq!(g.board, Board::new());
    }

    #[test]
    fn colored_game_locks_kind_markers() {
        let mut g = game(&[Kind::Z, Kind::O]).colored(true);
        while g.fall() && g.tetromino.kind == Kind::Z {}
        assert_eq!(g.board.get(4, 18), Kind::Z.marker());
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let mut g = game(&[Kind::O]);
        g.board.set(4, 0, OCCUPIED);
        g.tetromino = Tetromino::new(Kind::O, 0, 0, 18);
        assert!(!g.fall());
        assert!(g.is_over());
        assert!(!g.try_move(Move::Left));
        assert!(!g.fall());

        g.restart();
        assert!(!g.is_over());
        assert_eq!(g.score, 0);
        assert_eq!(g.board, Board::new());
    }
}
