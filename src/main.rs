mod assets;
mod components;
mod config;
mod delivery;
mod error;
mod hud;
mod input;
mod maze;
mod menu;
mod minigame;
mod obstacles;
mod orders;
mod pathfind;
mod player;
mod progress;
mod render;
mod road;
mod session;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::assets::Assets;
use crate::components::Direction;
use crate::config::{Settings, GAME_TITLE};
use crate::input::{InputEvent, InputFrame, Key, KeyHold};
use crate::progress::ProgressStore;
use crate::render::{Canvas, TerminalRenderer};
use crate::session::Session;

/// Longest step fed to the simulation, so a stall does not teleport obstacles.
const MAX_FRAME_DT: f32 = 0.1;

fn main() -> io::Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings.log_file);
    info!(?settings, "starting");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    stdout.execute(Hide)?;
    stdout.execute(SetTitle(GAME_TITLE))?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(DisableMouseCapture)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    info!("stopped");
    result
}

/// Logs go to a file since the game owns the terminal; no file, no logs.
fn init_logging(path: &Path) {
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(stdout: &mut Stdout, settings: &Settings) -> io::Result<()> {
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let progress = ProgressStore::open(settings.progress_path());
    let assets = Assets::new(&settings.assets_dir);
    let mut session = Session::new(progress, assets, rng);

    let mut renderer = TerminalRenderer::new();
    let mut hold = KeyHold::default();
    let frame_time = Duration::from_micros(1_000_000 / settings.fps.max(1));
    let mut last_frame = Instant::now();

    while session.is_running() {
        let frame_start = Instant::now();
        let dt = frame_start
            .duration_since(last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_DT);
        last_frame = frame_start;

        let canvas = renderer.canvas()?;
        let frame = poll_input(canvas.as_ref(), &mut hold)?;
        session.handle_frame(&frame);
        session.update(dt);

        match canvas {
            Some(mut canvas) => {
                session.draw(&mut canvas);
                renderer.present(stdout, &canvas, session.take_bell())?;
            }
            None => renderer.render_too_small(stdout)?,
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
    Ok(())
}

fn poll_input(canvas: Option<&Canvas>, hold: &mut KeyHold) -> io::Result<InputFrame> {
    let mut frame = InputFrame::default();
    while event::poll(Duration::from_millis(0))? {
        let event = match event::read()? {
            Event::Key(key) => map_key(key, hold),
            Event::Mouse(mouse) => canvas.and_then(|c| map_mouse(mouse, c)),
            _ => None,
        };
        frame.events.extend(event);
    }
    let now = Instant::now();
    frame.boost_held = hold.is_held(Direction::Up, now);
    frame.brake_held = hold.is_held(Direction::Down, now);
    Ok(frame)
}

fn map_key(key: KeyEvent, hold: &mut KeyHold) -> Option<InputEvent> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    let direction = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(InputEvent::Quit)
        }
        KeyCode::Char('q') => return Some(InputEvent::Quit),
        KeyCode::Esc => return Some(InputEvent::KeyDown(Key::Escape)),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Direction::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Direction::Right,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Direction::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Direction::Down,
        KeyCode::Char(c) => {
            let digit = c.to_digit(10)?;
            return Some(InputEvent::KeyDown(Key::Digit(digit as u8)));
        }
        _ => return None,
    };
    hold.press(direction, Instant::now());
    // Repeats only refresh the hold; a lane change or maze step needs a fresh press.
    if key.kind == KeyEventKind::Repeat {
        return None;
    }
    Some(InputEvent::KeyDown(Key::Arrow(direction)))
}

fn map_mouse(mouse: MouseEvent, canvas: &Canvas) -> Option<InputEvent> {
    let point = canvas.to_world(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(InputEvent::PointerMoved(point)),
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PointerClicked(point)),
        _ => None,
    }
}
