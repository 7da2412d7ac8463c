//! Maze Chase entry point
//!
//! Parses flags, loads settings and the high score, then runs either the
//! interactive terminal loop or a headless run.
//!
//! Usage:
//!   maze-chase [--config maze_chase.json] [--seed N] [--highscore FILE]
//!   maze-chase --headless 3000 --seed 7

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal;

use maze_chase::consts::MAX_FRAME_DT;
use maze_chase::persistence::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use maze_chase::platform::{self, HostInput};
use maze_chase::renderer::{self, TerminalGuard, TerminalRenderer};
use maze_chase::settings::DEFAULT_CONFIG_PATH;
use maze_chase::sim::{GameEvent, GameState, MazeModel, TickInput, tick};
use maze_chase::ui::{self, MenuItem, MenuOutcome};
use maze_chase::{HighScoreKeeper, Settings};

#[derive(Parser, Debug)]
#[command(name = "maze-chase")]
#[command(about = "Maze chase arcade game for the terminal")]
struct Args {
    /// Settings file (JSON); missing is fine
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// RNG seed, overrides the settings file
    #[arg(long)]
    seed: Option<u64>,
    /// High-score file, overrides the settings file
    #[arg(long)]
    highscore: Option<PathBuf>,
    /// Write logs here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Run this many ticks without a terminal and print the final snapshot
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

/// Simulation plus everything the host keeps around it
struct Game<S: HighScoreStore> {
    state: GameState,
    keeper: HighScoreKeeper<S>,
    accumulator: f32,
    dt: f32,
    max_substeps: u32,
    input: TickInput,
    menu: MenuItem,
    quit: bool,
}

impl<S: HighScoreStore> Game<S> {
    fn new(state: GameState, keeper: HighScoreKeeper<S>, settings: &Settings) -> Self {
        Self {
            state,
            keeper,
            accumulator: 0.0,
            dt: settings.tick_dt(),
            max_substeps: settings.max_substeps,
            input: TickInput::default(),
            menu: MenuItem::Resume,
            quit: false,
        }
    }

    /// Apply one poll of the mailbox
    fn handle_input(&mut self, host: HostInput) {
        if host.quit {
            log::info!("Quit requested");
            self.flush_high_score();
            self.quit = true;
            return;
        }

        if self.state.paused {
            let commands = ui::commands(&host.presses, host.tick.confirm, host.tick.cancel);
            match ui::run_commands(self.menu, &commands) {
                MenuOutcome::Stay(item) => self.menu = item,
                MenuOutcome::Chosen(item) => self.choose(item),
            }
        } else if host.tick.cancel {
            self.state.set_paused(true);
            self.menu = MenuItem::Resume;
        }

        self.input.merge(&host.tick);
    }

    /// Stop at the next frame once a termination signal has arrived
    fn check_shutdown(&mut self, shutdown: &AtomicBool) {
        if self.quit || !shutdown.load(Ordering::SeqCst) {
            return;
        }
        log::info!("Termination signal received");
        self.flush_high_score();
        self.quit = true;
    }

    fn choose(&mut self, item: MenuItem) {
        log::debug!("Menu: {}", item.label());
        match item {
            MenuItem::Resume => self.state.set_paused(false),
            MenuItem::Restart => {
                self.flush_high_score();
                self.state.restart();
                self.accumulator = 0.0;
            }
            MenuItem::Exit => {
                self.flush_high_score();
                self.quit = true;
            }
        }
        self.menu = MenuItem::Resume;
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            tick(&mut self.state, &self.input, self.dt);
            self.accumulator -= self.dt;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_edges();
        }

        self.handle_events();
    }

    /// Persist at level and life boundaries
    fn handle_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::LevelCleared { .. }
                | GameEvent::LifeLost { .. }
                | GameEvent::GameOver { .. } => self.flush_high_score(),
                GameEvent::NewHighScore { score } => log::info!("New high score: {}", score),
                _ => {}
            }
        }
    }

    fn flush_high_score(&mut self) {
        self.keeper.flush(self.state.high_score.max(self.state.score));
    }
}

impl<S: HighScoreStore> Drop for Game<S> {
    // Covers normal exit, errors and panics
    fn drop(&mut self) {
        self.flush_high_score();
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Scripted input for headless runs: each direction held for two seconds
fn scripted_input(tick_index: u64, tick_hz: u32) -> TickInput {
    let phase = (tick_index / (2 * tick_hz as u64).max(1)) % 4;
    TickInput {
        left: phase == 0,
        up: phase == 1,
        right: phase == 2,
        down: phase == 3,
        ..Default::default()
    }
}

fn run_headless(game: &mut Game<MemoryHighScoreStore>, ticks: u64, tick_hz: u32) -> Result<()> {
    for i in 0..ticks {
        game.input.merge(&scripted_input(i, tick_hz));
        let dt = game.dt;
        game.update(dt);
    }
    let json = serde_json::to_string_pretty(&game.state.snapshot())
        .context("Failed to serialize snapshot")?;
    println!("{}", json);
    Ok(())
}

fn run_interactive(
    game: &mut Game<FileHighScoreStore>,
    settings: &Settings,
    shutdown: &AtomicBool,
) -> Result<()> {
    let (sender, mut mailbox) = platform::mailbox();
    let mut guard = TerminalGuard::enter().context("Failed to enter raw mode")?;
    // Detached: exits on its own once the mailbox is gone
    let _reader = platform::spawn_keyboard_reader(sender).context("Failed to start keyboard reader")?;

    let mut renderer = TerminalRenderer::new();
    let mut stdout = io::stdout();
    let frame_time = Duration::from_secs_f64(1.0 / settings.render_fps.max(1) as f64);
    let mut last = Instant::now();

    while !game.quit {
        let frame_start = Instant::now();
        game.check_shutdown(shutdown);
        if game.quit {
            break;
        }
        game.handle_input(mailbox.poll(frame_start));
        if game.quit {
            break;
        }

        game.update(frame_start.duration_since(last).as_secs_f32());
        last = frame_start;

        let menu = game.state.paused.then_some(game.menu);
        let frame = renderer::compose(game.state.maze(), &game.state.snapshot(), menu);
        renderer.draw(&mut stdout, &frame, terminal::size()?)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }

    guard.leave().context("Failed to restore terminal")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    log::info!("Maze Chase starting...");

    let mut settings = Settings::load_or_default(&args.config);
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(path) = args.highscore {
        settings.highscore_path = path;
    }

    let maze = Arc::new(MazeModel::classic().context("Invalid maze layout")?);
    let seed = settings.seed.unwrap_or_else(time_seed);
    log::info!("Seed: {}", seed);

    let file_store = FileHighScoreStore::new(&settings.highscore_path);

    if let Some(ticks) = args.headless {
        // Headless runs read the high score but never write it
        let store = MemoryHighScoreStore {
            value: file_store.load(),
            ..Default::default()
        };
        let keeper = HighScoreKeeper::load(store);
        let state = GameState::new(maze, settings.tuning.clone(), seed, keeper.best());
        let mut game = Game::new(state, keeper, &settings);
        return run_headless(&mut game, ticks, settings.tick_hz);
    }

    // Raw mode turns Ctrl-C into a key event; this catches kill and hangup
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install signal handler")?;

    let keeper = HighScoreKeeper::load(file_store);
    let state = GameState::new(maze, settings.tuning.clone(), seed, keeper.best());
    let mut game = Game::new(state, keeper, &settings);
    let result = run_interactive(&mut game, &settings, &shutdown);
    drop(game);

    if let Err(e) = &result {
        log::error!("{:#}", e);
    }
    log::info!("Goodbye");
    result
}
