use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    QueueableCommand, cursor,
    event::{Event, KeyCode, KeyEvent, KeyEventKind, poll, read},
    style::{self, Stylize},
    terminal,
};
use log::info;
use std::fs::File;
use std::io::{Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use termtris::{BOARD_HEIGHT, BOARD_WIDTH, Game, KindSource, Move, RandomKinds};

#[derive(Parser, Debug)]
#[command(version, about = "Falling-block puzzle game for the terminal", long_about = None)]
struct Args {
    /// Seed for the piece sequence. A random seed is drawn (and logged) when omitted.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Milliseconds between gravity steps.
    #[arg(short, long, default_value_t = 500)]
    fall_ms: u64,
    /// Keep each piece's color after it locks.
    #[arg(short, long)]
    color: bool,
    /// Write log output here; the terminal is busy drawing the board.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn centered_x(s: &str) -> u16 {
    let leftedge: u16 = 25;
    let n = u16::try_from(s.len()).unwrap_or(u16::MAX - leftedge);

    match terminal::size() {
        Ok((cols, _rows)) => {
            if cols < leftedge + n {
                leftedge
            } else {
                (cols - leftedge - n) / 2 + leftedge
            }
        }
        Err(_) => leftedge,
    }
}

fn render_game_info<S: KindSource>(g: &Game<S>) -> Result<()> {
    let s1 = "Termtris";
    let s2 = "a/d move  w rotate  s drop  space pause  q quit";

    crossterm::queue!(
        stdout(),
        cursor::MoveTo(centered_x(s1), 2),
        style::PrintStyledContent(s1.cyan()),
        cursor::MoveTo(centered_x(s2), 3),
        style::PrintStyledContent(s2.yellow()),
    )?;

    let i = centered_x("Score : 123456");
    let status = if g.is_over() {
        "GAME OVER - r to restart"
    } else if g.paused {
        "Paused                  "
    } else {
        "                        "
    };
    crossterm::queue!(
        stdout(),
        cursor::MoveTo(i, 5),
        style::PrintStyledContent(format!("Score : {}", g.score).bold().white()),
        cursor::MoveTo(i, 6),
        style::PrintStyledContent(format!("Lines : {}", g.lines()).bold().white()),
        cursor::MoveTo(i, 8),
        style::PrintStyledContent(format!("Piece : {}", g.tetromino.kind).bold().white()),
        cursor::MoveTo(i, 10),
        style::PrintStyledContent(status.bold().red()),
    )?;
    Ok(())
}

fn draw_screen<S: KindSource>(g: &Game<S>) -> Result<()> {
    let mut stdout = stdout();

    let mut cells = *g.board.rows();
    if !g.is_over() {
        let tet = &g.tetromino;
        for (c, r) in tet.kind.cells(tet.rotation) {
            let (x, y) = ((tet.x + c) as usize, (tet.y + r) as usize);
            if let Some(cell) = cells.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = tet.kind.marker();
            }
        }
    }

    for (y, row) in cells.iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            let s = match v {
                0 => "  ".white(),
                1 => "  ".on_blue(),
                2 => "  ".on_yellow(),
                3 => "  ".on_green(),
                4 => "  ".on_magenta(),
                5 => "  ".on_dark_red(),
                6 => "  ".on_cyan(),
                _ => "  ".on_red(),
            };
            crossterm::queue!(
                stdout,
                cursor::MoveTo(x as u16 * 2 + 1, y as u16 + 1),
                style::PrintStyledContent(s),
            )?
        }
    }
    render_game_info(g)?;
    stdout.flush()?;
    Ok(())
}

fn key_move(code: KeyCode) -> Option<Move> {
    match code {
        KeyCode::Char('a') | KeyCode::Left => Some(Move::Left),
        KeyCode::Char('d') | KeyCode::Right => Some(Move::Right),
        KeyCode::Char('w') | KeyCode::Up => Some(Move::Rotate),
        KeyCode::Char('s') | KeyCode::Down => Some(Move::Down),
        _ => None,
    }
}

fn runloop<S: KindSource>(g: &mut Game<S>, fall: Duration) -> Result<()> {
    let mut last_fall = Instant::now();
    loop {
        draw_screen(g)?;
        let timeout = fall.saturating_sub(last_fall.elapsed());
        if poll(timeout)? {
            if let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) = read()?
            {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') if g.is_over() => g.restart(),
                    KeyCode::Char(' ') => g.paused = !g.paused,
                    _ => {
                        if let Some(m) = key_move(code).filter(|_| !g.paused) {
                            g.try_move(m);
                        }
                    }
                }
            }
        }
        if last_fall.elapsed() >= fall {
            last_fall = Instant::now();
            g.fall();
        }
    }
}

fn box_(x: u16, y: u16, width: u16, height: u16) -> Result<()> {
    const TOP_LEFT: &str = "\u{250f}";
    const TOP_RIGHT: &str = "\u{2513}";
    const BOTTOM_LEFT: &str = "\u{2517}";
    const BOTTOM_RIGHT: &str = "\u{251b}";
    const VERTICAL: &str = "\u{2503}";
    const HORIZONTAL: &str = "\u{2501}";
    let mut stdout = stdout();

    stdout
        .queue(terminal::Clear(terminal::ClearType::All))?
        .queue(cursor::MoveTo(x, y))?
        .queue(style::PrintStyledContent(TOP_LEFT.white()))?
        .queue(cursor::MoveTo(x + width, y))?
        .queue(style::PrintStyledContent(TOP_RIGHT.white()))?
        .queue(cursor::MoveTo(x, y + height))?
        .queue(style::PrintStyledContent(BOTTOM_LEFT.white()))?
        .queue(cursor::MoveTo(x + width, y + height))?
        .queue(style::PrintStyledContent(BOTTOM_RIGHT.white()))?;

    for i in 1..width {
        crossterm::queue!(
            stdout,
            cursor::MoveTo(x + i, y),
            style::PrintStyledContent(HORIZONTAL.white()),
            cursor::MoveTo(x + i, y + height),
            style::PrintStyledContent(HORIZONTAL.white())
        )?;
    }
    for i in 1..height {
        crossterm::queue!(
            stdout,
            cursor::MoveTo(x, y + i),
            style::PrintStyledContent(VERTICAL.white()),
            cursor::MoveTo(x + width, y + i),
            style::PrintStyledContent(VERTICAL.white())
        )?;
    }
    crossterm::queue!(stdout, cursor::Hide)?;

    stdout.flush()?;
    Ok(())
}

fn enter_terminal() -> Result<()> {
    crossterm::queue!(
        stdout(),
        style::ResetColor,
        terminal::Clear(terminal::ClearType::All),
        terminal::EnterAlternateScreen,
        cursor::Hide,
        cursor::MoveTo(0, 0)
    )?;
    terminal::enable_raw_mode().context("cannot switch terminal to raw mode")?;
    box_(0, 0, BOARD_WIDTH as u16 * 2 + 1, BOARD_HEIGHT as u16 + 1)
}

fn leave_terminal() -> Result<()> {
    crossterm::queue!(
        stdout(),
        terminal::Clear(terminal::ClearType::All),
        terminal::LeaveAlternateScreen,
        cursor::Show,
        cursor::MoveTo(0, 0)
    )?;
    stdout().flush()?;
    terminal::disable_raw_mode().context("cannot restore terminal mode")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let kinds = match args.seed {
        Some(seed) => RandomKinds::seeded(seed),
        None => RandomKinds::from_entropy(),
    };
    if let Some(seed) = kinds.seed() {
        info!("piece seed {seed}");
    }
    let mut game = Game::new(kinds).colored(args.color);

    let fall = Duration::from_millis(args.fall_ms);
    let result = enter_terminal().and_then(|()| runloop(&mut game, fall));
    // restore the terminal even when the loop failed
    let restored = leave_terminal();
    result?;
    restored?;

    println!("Score: {}; Lines: {}", game.score, game.lines());
    Ok(())
}
