//! The game world: resources, the per-tick schedule, and the handle frontends drive.

use std::sync::Arc;

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::resource::Resource;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::system::Res;
use bevy_ecs::world::World;
use glam::{IVec2, UVec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::chat::ChatSession;
use crate::collectibles::{Collectibles, PickupOdds};
use crate::constants::{self, MAIN_MAP, PLAYER_SIZE, TICK_MILLIS};
use crate::error::{GameError, GameResult};
use crate::formatter;
use crate::geometry::Rect;
use crate::input::{input_system, Bindings, KeyEvent, PendingInput};
use crate::interaction::InteractionManager;
use crate::map::direction::Direction;
use crate::map::manager::{MapManager, SpriteCollection, SwitchContext};
use crate::map::source::MapSource;
use crate::minigame::MinigameEngine;
use crate::quiz::QuizSession;
use crate::services::progress::PlayerProgress;
use crate::services::{ProgressStore, Services};

use self::events::GameEvent;
use self::state::{GameMode, ModeArbiter};
use self::systems::{
    collectible_system, command_system, interaction_system, minigame_system, npc_system, player_movement_system,
    poll_fetches_system, presentation_system, session_system,
};

pub mod events;
pub mod state;
pub mod systems;

/// Game time in milliseconds, advanced once per tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pub now: u64,
    pub tick: u64,
}

/// The single random source every system draws from.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub rect: Rect,
    pub facing: Direction,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            rect: Rect::new(0, 0, PLAYER_SIZE.0, PLAYER_SIZE.1),
            facing: Direction::Down,
        }
    }
}

impl Player {
    /// The pixel checked against collectible tiles, slightly below the sprite's center.
    pub fn pickup_point(&self) -> IVec2 {
        IVec2::new(
            self.rect.center_x(),
            self.rect.center_y() + constants::collectible::PICKUP_OFFSET_Y,
        )
    }
}

/// Pixel size of the active map, updated by every map switch.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldSize(pub UVec2);

#[derive(Resource, Debug, Default)]
pub struct GlobalState {
    pub exit: bool,
}

/// System set for all gameplay systems to ensure they run after input processing
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Raw input and the commands it produces
    Input,
    /// Movement, NPCs and the minigame; paused while settings are open
    Update,
    /// Reactions to the updated positions
    Respond,
    /// Typewriter and popup timers
    Present,
}

/// Everything needed to build a [`Game`].
pub struct GameConfig {
    pub maps: Box<dyn MapSource>,
    pub services: Services,
    /// Key of the progress document.
    pub user: String,
    /// Fixed seed for reproducible runs; random when `None`.
    pub seed: Option<u64>,
}

/// Headless game runtime built on a bevy `World` and a fixed `Schedule`.
///
/// Frontends queue raw key events with [`Game::push_key`], call [`Game::tick`]
/// once per frame, and read resources back out of [`Game::world`] to draw.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
}

impl Game {
    pub fn new(config: GameConfig) -> GameResult<Game> {
        let mut world = World::default();
        let mut schedule = Schedule::default();

        EventRegistry::register_event::<GameEvent>(&mut world);

        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(seed, "Random source seeded");

        let progress_store = ProgressStore::new(Arc::clone(&config.services.store), config.user);
        let progress = progress_store.load();
        info!(points = progress.points, quotes = progress.unlocked_quotes.len(), "Progress loaded");

        let mut maps = MapManager::new(config.maps, Arc::clone(&config.services.text), MAIN_MAP)?;
        let mut interactions = InteractionManager::new();
        let mut sprites = SpriteCollection::default();
        let mut player = Player::default();
        let mut world_size = WorldSize::default();
        {
            let mut ctx = SwitchContext {
                player: &mut player.rect,
                sprites: &mut sprites,
                interactions: &mut interactions,
            };
            if !maps.switch_map(MAIN_MAP, &mut ctx, &mut |size: UVec2| world_size.0 = size) {
                return Err(GameError::InvalidState(format!("could not enter '{MAIN_MAP}'")));
            }
        }

        world.insert_resource(Clock::default());
        world.insert_resource(GameRng(StdRng::seed_from_u64(seed)));
        world.insert_resource(GlobalState::default());
        world.insert_resource(Bindings::default());
        world.insert_resource(PendingInput::default());
        world.insert_resource(ModeArbiter::default());
        world.insert_resource(maps);
        world.insert_resource(interactions);
        world.insert_resource(sprites);
        world.insert_resource(player);
        world.insert_resource(world_size);
        world.insert_resource(MinigameEngine::default());
        world.insert_resource(QuizSession::default());
        world.insert_resource(ChatSession::default());
        world.insert_resource(Collectibles::default());
        world.insert_resource(PickupOdds::default());
        world.insert_resource(progress);
        world.insert_resource(progress_store);
        world.insert_resource(config.services);

        schedule
            .add_systems((
                (input_system, command_system).chain().in_set(GameplaySet::Input),
                (
                    poll_fetches_system,
                    player_movement_system,
                    collectible_system,
                    npc_system,
                    minigame_system,
                )
                    .chain()
                    .in_set(GameplaySet::Update),
                (interaction_system, session_system).chain().in_set(GameplaySet::Respond),
                presentation_system.in_set(GameplaySet::Present),
            ))
            .configure_sets(
                (
                    GameplaySet::Input,
                    GameplaySet::Update.run_if(|arbiter: Res<ModeArbiter>| *arbiter.mode() != GameMode::Settings),
                    GameplaySet::Respond,
                    GameplaySet::Present,
                )
                    .chain(),
            );

        Ok(Game { world, schedule })
    }

    /// Queues a raw key event for the next tick.
    pub fn push_key(&mut self, event: KeyEvent) {
        self.world.resource_mut::<PendingInput>().0.push(event);
    }

    /// Advances the game by one frame of [`TICK_MILLIS`].
    ///
    /// Returns `true` if the game should exit.
    pub fn tick(&mut self) -> bool {
        self.tick_for(TICK_MILLIS)
    }

    /// Advances the clock by `elapsed_ms` and runs every system once.
    pub fn tick_for(&mut self, elapsed_ms: u64) -> bool {
        {
            let mut clock = self.world.resource_mut::<Clock>();
            clock.now += elapsed_ms;
            clock.tick += 1;
        }

        self.schedule.run(&mut self.world);
        self.world.resource_mut::<Events<GameEvent>>().update();
        formatter::increment_tick();

        self.world.resource::<GlobalState>().exit
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<Clock>().now
    }

    pub fn mode(&self) -> &GameMode {
        self.world.resource::<ModeArbiter>().mode()
    }

    pub fn player(&self) -> &Player {
        self.world.resource::<Player>()
    }

    pub fn current_map(&self) -> &str {
        self.world.resource::<MapManager>().current_name()
    }

    pub fn progress(&self) -> &PlayerProgress {
        self.world.resource::<PlayerProgress>()
    }

    pub fn interactions(&self) -> &InteractionManager {
        self.world.resource::<InteractionManager>()
    }

    /// Moves the player so their center sits on `center`, bypassing collision.
    pub fn place_player(&mut self, center: IVec2) {
        let mut player = self.world.resource_mut::<Player>();
        player.rect = player.rect.with_center(center);
    }
}
