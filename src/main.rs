mod display;

use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use bug_blaster::store::{FileStore, Records, Store};
use bug_blaster::{Game, GameConfig, GameError, PointerTarget};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::filter::EnvFilter;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

#[derive(Parser)]
#[command(name = "bug_blaster")]
#[command(about = "Blast space bugs for 30 seconds and climb the local leaderboard")]
struct Args {
    /// TOML file overriding the game tuning
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where best score, player name and leaderboard are kept
    #[arg(long)]
    store: Option<PathBuf>,
    /// Log file (the terminal itself is taken by the game)
    #[arg(long)]
    log: Option<PathBuf>,
    /// Seed for a reproducible round
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

/// Name entry. Every edit is sanitized and saved right away; Enter starts a
/// round once the name is non-empty.
fn show_menu<W: Write, S: Store>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    game: &mut Game<S>,
    rng: &mut StdRng,
) -> anyhow::Result<MenuResult> {
    let mut name = game.records().player_name();
    let mut notice = None;

    loop {
        let (width, height) = terminal::size()?;
        display::render_menu(
            out,
            &name,
            game.records().best_score(),
            game.records().leaderboard(),
            notice.as_ref(),
            width,
            height,
        )?;

        // Block until the user does something
        let Ok(ev) = rx.recv() else {
            return Ok(MenuResult::Quit);
        };
        let Event::Key(KeyEvent {
            code,
            kind,
            modifiers,
            ..
        }) = ev
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => {
                game.resize(display::field_for(width, height));
                match game.start(&name, rng) {
                    Ok(()) => return Ok(MenuResult::Start),
                    Err(GameError::NameRequired) => notice = game.message().cloned(),
                }
            }
            KeyCode::Esc => return Ok(MenuResult::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(MenuResult::Quit);
            }
            KeyCode::Backspace => {
                let _ = name.pop();
                name = game.set_player_name(&name);
            }
            KeyCode::Char(c) => {
                name.push(c);
                name = game.set_player_name(&name);
            }
            _ => {}
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
fn game_loop<W: Write, S: Store>(
    out: &mut W,
    game: &mut Game<S>,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> anyhow::Result<bool> {
    let step = game.config().blaster.step;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) if kind != KeyEventKind::Release => match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(true),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(true);
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') if !game.is_running() => {
                        return Ok(false);
                    }
                    KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                        game.move_blaster(-step)
                    }
                    KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                        game.move_blaster(step)
                    }
                    KeyCode::Char(' ') => {
                        let _ = game.fire(rng);
                    }
                    _ => {}
                },
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => handle_mouse(game, kind, column, row),
                Event::Resize(width, height) => game.resize(display::field_for(width, height)),
                _ => {}
            }
        }

        let now = Instant::now();
        game.advance(now - last, rng);
        last = now;

        for event in game.drain_events() {
            tracing::trace!(?event, "game event");
        }

        let (width, height) = terminal::size()?;
        display::render(out, game, width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

fn handle_mouse<S: Store>(game: &mut Game<S>, kind: MouseEventKind, column: u16, row: u16) {
    let point = display::cell_to_field(game.field(), column, row);
    match (kind, point) {
        (MouseEventKind::Down(MouseButton::Left), Some((x, y))) => {
            let target = if game.message().is_some() {
                PointerTarget::Message
            } else {
                game.target_at(x, y)
            };
            game.pointer_down(target, x);
        }
        (MouseEventKind::Drag(MouseButton::Left), Some((x, _))) => game.pointer_move(x),
        (MouseEventKind::Up(_), _) => game.pointer_up(),
        _ => {}
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_path = args
        .log
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("bug_blaster.log"));
    init_logging(&log_path)?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let store = FileStore::open(args.store.clone().unwrap_or_else(FileStore::default_path));
    tracing::info!(store = %store.path().display(), "bug blaster starting");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    let _ = thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, config, store, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
    store: FileStore,
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    let (width, height) = terminal::size()?;
    let mut game = Game::new(config, display::field_for(width, height), Records::new(store));

    loop {
        match show_menu(out, rx, &mut game, rng)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let quit = game_loop(out, &mut game, rx, rng)?;

                // Leaving mid-round still records the result
                game.end();
                let _ = game.drain_events();

                if quit {
                    break;
                }
                // Otherwise loop back to the menu
            }
        }
    }
    Ok(())
}
