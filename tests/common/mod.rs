#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use sagewalk::constants::{MAIN_MAP, MINIGAME_ARENA_MAP, WIZARD_HOUSE_MAP};
use sagewalk::error::ServiceError;
use sagewalk::game::{Game, GameConfig};
use sagewalk::map::record::{DecorationRecord, InteractableRecord, MapKind, MapRecord, ZoneAction};
use sagewalk::map::source::MemoryMaps;
use sagewalk::services::{CannedText, MemoryStore, Services, TextGenerator};

pub const TILE: u32 = 64;
pub const HOUSE_ZONE: &str = "house_exit";

/// A `width` x `height` collision grid, fully walkable.
pub fn open_rows(width: usize, height: usize) -> Vec<Vec<u8>> {
    vec![vec![0; width]; height]
}

/// A collision grid with a wall around the edge.
pub fn bordered_rows(width: usize, height: usize) -> Vec<Vec<u8>> {
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| u8::from(x == 0 || y == 0 || x == width - 1 || y == height - 1))
                .collect()
        })
        .collect()
}

pub fn record(name: &str, kind: MapKind, collision: Vec<Vec<u8>>) -> MapRecord {
    MapRecord {
        name: name.to_string(),
        kind,
        terrain_grid: collision.iter().map(|row| vec![0; row.len()]).collect(),
        building_grid: None,
        decoration_grid: None,
        collision_grid: collision,
        tile_size: TILE,
        tile_source_ref: format!("{name}_tiles.png"),
        tileset_width: 45,
        original_tile_size: 16,
        spawn_tile: Some((2, 2)),
        static_decorations: Vec::new(),
        interactables: Vec::new(),
        collectibles: Vec::new(),
    }
}

/// 20x20 exterior map with the wizard and one decoration.
pub fn main_record() -> MapRecord {
    let mut record = record(MAIN_MAP, MapKind::Exterior, bordered_rows(20, 20));
    record.interactables = vec![InteractableRecord::Wizard {
        x: 700,
        y: 700,
        radius: None,
    }];
    record.static_decorations = vec![DecorationRecord {
        id: "well".to_string(),
        x: 320,
        y: 320,
        sprite: "well.png".to_string(),
    }];
    record
}

/// 10x8 interior with a zone that opens the chat or leaves for the main map.
pub fn house_record() -> MapRecord {
    let mut record = record(WIZARD_HOUSE_MAP, MapKind::Interior, bordered_rows(10, 8));
    record.spawn_tile = Some((3, 3));
    record.interactables = vec![InteractableRecord::Zone {
        id: HOUSE_ZONE.to_string(),
        tile: (3, 4),
        radius: 80.0,
        message: "Stay a while?".to_string(),
        on_talk: ZoneAction::StartChat,
        on_dismiss: ZoneAction::SwitchMap {
            target: MAIN_MAP.to_string(),
        },
    }];
    record
}

pub fn arena_record() -> MapRecord {
    let mut record = record(MINIGAME_ARENA_MAP, MapKind::Arena, bordered_rows(24, 14));
    record.spawn_tile = Some((7, 7));
    record
}

pub fn memory_maps() -> MemoryMaps {
    MemoryMaps::new([main_record(), house_record(), arena_record()])
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn canned(replies: &[&str]) -> Arc<dyn TextGenerator> {
    Arc::new(CannedText::new(replies.iter().copied()))
}

/// A text service that is always down.
#[derive(Debug)]
pub struct FailingText;

impl TextGenerator for FailingText {
    fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Generation("offline".to_string()))
    }
}

pub fn services(replies: &[&str]) -> Services {
    Services::new(canned(replies), Arc::new(MemoryStore::with_sample_questions()))
}

pub fn game_with(maps: MemoryMaps, services: Services) -> Game {
    Game::new(GameConfig {
        maps: Box::new(maps),
        services,
        user: "tester".to_string(),
        seed: Some(7),
    })
    .expect("test game should build")
}

pub fn game() -> Game {
    game_with(memory_maps(), services(&["A wizard walks into a bar."]))
}

/// Polls `condition` until it holds or two seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
