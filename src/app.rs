use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::constants::LOOP_TIME;
use crate::error::GameResult;
use crate::formatter;
use crate::game::{Game, GameConfig};
use crate::input::{Key, KeyEvent};
use crate::map::source::{DirectoryMaps, EmbeddedMaps, MapSource};
use crate::services::Services;

/// Options for a headless run.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Read maps from this directory instead of the embedded copies.
    pub map_dir: Option<PathBuf>,
    /// Keep progress and quiz documents in this directory instead of memory.
    pub save_dir: Option<PathBuf>,
    pub ticks: u64,
    pub seed: Option<u64>,
    /// Sleep between ticks to hold the loop at [`LOOP_TIME`].
    pub realtime: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            map_dir: None,
            save_dir: None,
            ticks: 600,
            seed: None,
            realtime: true,
        }
    }
}

/// Key events to inject at given ticks.
#[derive(Debug, Default)]
pub struct Script {
    steps: VecDeque<(u64, KeyEvent)>,
}

impl Script {
    pub fn new(mut steps: Vec<(u64, KeyEvent)>) -> Self {
        steps.sort_by_key(|(tick, _)| *tick);
        Self { steps: steps.into() }
    }

    /// A short walk around the starting area, greeting whoever is nearby.
    pub fn demo() -> Self {
        use KeyEvent::{Down, Up};
        Self::new(vec![
            (10, Down(Key::Right)),
            (90, Up(Key::Right)),
            (100, Down(Key::Down)),
            (160, Up(Key::Down)),
            (200, Down(Key::E)),
            (201, Up(Key::E)),
            (320, Down(Key::E)),
            (321, Up(Key::E)),
            (420, Down(Key::Q)),
            (421, Up(Key::Q)),
            (440, Down(Key::Left)),
            (520, Up(Key::Left)),
        ])
    }

    /// Removes and returns every event scheduled at or before `tick`.
    pub fn due(&mut self, tick: u64) -> Vec<KeyEvent> {
        let mut due = Vec::new();
        while self.steps.front().is_some_and(|(at, _)| *at <= tick) {
            if let Some((_, event)) = self.steps.pop_front() {
                due.push(event);
            }
        }
        due
    }
}

/// Fixed-step driver around a [`Game`] with no window.
pub struct App {
    pub game: Game,
    options: AppOptions,
    script: Script,
}

impl App {
    pub fn new(options: AppOptions, script: Script) -> GameResult<Self> {
        let maps: Box<dyn MapSource> = match &options.map_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "Reading maps from disk");
                Box::new(DirectoryMaps::new(dir.clone()))
            }
            None => Box::new(EmbeddedMaps),
        };

        let services = match &options.save_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "Saving progress to disk");
                Services::offline_in(dir.clone())?
            }
            None => Services::offline(),
        };

        let game = Game::new(GameConfig {
            maps,
            services,
            user: "local".to_string(),
            seed: options.seed,
        })?;

        Ok(Self { game, options, script })
    }

    /// Runs until the tick budget is spent or the game asks to exit.
    pub fn run(&mut self) {
        info!(
            ticks = self.options.ticks,
            loop_ms = LOOP_TIME.as_secs_f32() * 1000.0,
            "Starting game loop"
        );
        let started = Instant::now();
        let mut sleep_time = Duration::ZERO;

        for tick in 0..self.options.ticks {
            let start = Instant::now();

            for event in self.script.due(tick) {
                trace!(?event, "Scripted input");
                self.game.push_key(event);
            }
            if self.game.tick() {
                info!(tick, "Exit requested");
                break;
            }

            if self.options.realtime {
                let elapsed = start.elapsed();
                if elapsed < LOOP_TIME {
                    let time = LOOP_TIME - elapsed;
                    spin_sleep::sleep(time);
                    sleep_time += time;
                } else {
                    warn!(behind = ?(elapsed - LOOP_TIME), "Game loop behind schedule");
                }
            }
        }

        debug!(ticks = formatter::tick_count(), sleep = ?sleep_time, "Loop statistics");
        info!(
            elapsed = ?started.elapsed(),
            map = self.game.current_map(),
            mode = ?self.game.mode(),
            points = self.game.progress().points,
            "Game loop finished"
        );
    }
}
