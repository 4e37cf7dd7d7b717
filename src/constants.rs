//! This module contains all the constants used in the game.

use std::time::Duration;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Milliseconds advanced by the game clock for every tick.
pub const TICK_MILLIS: u64 = 16;

/// The on-screen size of a single tile, in pixels.
pub const TILE_GAME_SIZE: u32 = 64;
/// The size of a tile inside the tileset image, in pixels.
pub const TILE_ORIG_SIZE: u32 = 16;
/// Tile id used by sparse layers (building, decoration) for "nothing here".
pub const EMPTY_TILE_ID: i32 = -1;

/// Name of the map the game starts on.
pub const MAIN_MAP: &str = "main_map";
/// Name of the wizard's house interior.
pub const WIZARD_HOUSE_MAP: &str = "wizard_house";
/// Name of the survival minigame arena.
pub const MINIGAME_ARENA_MAP: &str = "minigame_arena";

/// The player's sprite size, in pixels.
pub const PLAYER_SIZE: (i32, i32) = (128, 128);
/// Pixels moved by the player per tick.
pub const PLAYER_SPEED: i32 = 5;
/// NPC sprite size, in pixels.
pub const NPC_SIZE: (i32, i32) = (84, 128);

/// Extra distance beyond an interaction radius before the "already interacted" flag resets.
pub const RESET_BUFFER: f32 = 2.0;

pub mod wizard {
    pub const RADIUS: f32 = 30.0;
    pub const CENTER_OFFSET_Y: i32 = 28;
    pub const FLIP_INTERVAL_MS: u64 = 3_000;
    pub const PROMPT_TALK: &str = "Press E to talk to the Wizard. Press Q to walk away.";
    pub const PROMPT_VISIT_OR_LEAVE: &str = "Press E to visit the Wizard's house.\nPress Q to move on.";
    pub const THINKING: &str = "The Wizard is thinking...";
    pub const FALLBACK: &str = "The Wizard scratches his beard. \"My crystal ball is foggy today.\"";
    pub const JOKE_PROMPT: &str = "Tell me a short, wise, wizard-themed joke.";
}

pub mod naval {
    pub const RADIUS: f32 = 40.0;
    pub const QUOTE_COST: u32 = 5;
    pub const QUOTE_IDS: [u32; 5] = [1, 2, 3, 4, 5];
    pub const SPEED: i32 = 2;
    pub const CENTER_OFFSET_Y: i32 = 40;
    pub const INSUFFICIENT_POPUP_MS: u64 = 3_000;
    pub const SPEECH: &str = "Exchange 5 points for timeless wisdom?";
    pub const SPEECH_FRAMES: u32 = 300;
    pub const PROMPT_TALK: &str = "Press E to interact with Naval. Press Q to walk away.";
    pub const THINKING: &str = "Naval is reflecting...";
    pub const FALLBACK: &str = "Naval smiles. \"Some wisdom is best left unspoken today.\"";
    pub const ALL_UNLOCKED: &str = "You have already collected all of my wisdom.";
    pub const INSUFFICIENT: &str = "You need 5 Wisdom Points to hear Naval's wisdom.";
}

pub mod mysterious {
    pub const SIZE: (i32, i32) = (60, 60);
    pub const RADIUS: f32 = 50.0;
    pub const WRAP_WIDTH: usize = 50;
    pub const PROMPT_TALK: &str = "Press E to interact with the mysterious rectangle.\nPress Q to walk away.";
    pub const THINKING: &str = "The rectangle is thinking...";
    pub const LOST: &str = "The rectangle seems lost in thought. Please try again later.";
    pub const FALLBACK: &str = "The rectangle is having trouble speaking right now.";
    pub const QUESTION_PROMPT: &str = "Ask one short, thought-provoking philosophy question.";
}

pub mod minigame {
    pub const DURATION_MS: u64 = 30_000;
    pub const GRACE_MS: u64 = 2_000;
    pub const BASE_SPEED: f32 = 2.0;
    pub const SPEED_INCREMENT: f32 = 0.5;
    pub const SPEED_INTERVAL_MS: u64 = 5_000;
    pub const SPEED_BANNER_MS: u64 = 1_500;
    pub const RESULT_DISPLAY_MS: u64 = 2_000;
    pub const HAZARD_COUNT: usize = 5;
    pub const HAZARD_HALF_SIZE: f32 = 20.0;
    pub const MIN_SPAWN_DISTANCE: f32 = 250.0;
    pub const SPAWN_ATTEMPTS: usize = 200;
    /// Tick range for a hazard's spontaneous direction change.
    pub const TURN_TICKS: (u32, u32) = (60, 180);
    pub const PLAYER_MARGIN_LEFT: i32 = 37;
    pub const PLAYER_MARGIN_RIGHT: i32 = 37;
    pub const PLAYER_MARGIN_TOP: i32 = 10;
    pub const PLAYER_MARGIN_BOTTOM: i32 = 5;
    pub const DEATH_PENALTY: u32 = 1;
}

pub mod quiz {
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const QUESTION_COLLECTION: &str = "ai_questions";
    pub const QUESTION_IDS: [&str; 2] = ["1", "2"];
    pub const EVALUATING: &str = "Evaluating your answer...";
    pub const SERVICE_ERROR: &str = "Error occurred during evaluation. Please try again.";
}

pub mod collectible {
    pub const RESPAWN_MS: u64 = 15_000;
    pub const PICKUP_OFFSET_Y: i32 = 10;
    pub const QUIZ_CHANCE: f64 = 0.8;
    pub const MINIGAME_CHANCE: f64 = 0.1;
    pub const REWARD: u32 = 1;
}

/// Milliseconds between typewriter characters.
pub const TYPING_DELAY_MS: u64 = 40;
