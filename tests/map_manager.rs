use std::sync::Arc;

use glam::{UVec2, Vec2};
use pretty_assertions::assert_eq;
use sagewalk::constants::{MAIN_MAP, MINIGAME_ARENA_MAP, WIZARD_HOUSE_MAP};
use sagewalk::geometry::Rect;
use sagewalk::interaction::wizard::WIZARD_ID;
use sagewalk::interaction::{InteractionManager, TalkContext};
use sagewalk::map::record::{InteractableRecord, MapKind};
use sagewalk::map::source::MemoryMaps;
use sagewalk::map::{MapManager, SpriteCollection, SwitchContext};
use sagewalk::services::progress::PlayerProgress;
use speculoos::prelude::*;

mod common;

/// A map manager plus the world state it rewrites.
struct Harness {
    maps: MapManager,
    player: Rect,
    sprites: SpriteCollection,
    interactions: InteractionManager,
    size: UVec2,
    resizes: usize,
}

impl Harness {
    fn new(source: MemoryMaps) -> Self {
        Self::from_source(Box::new(source))
    }

    fn from_source(source: Box<dyn sagewalk::map::MapSource>) -> Self {
        let maps = MapManager::new(source, common::canned(&["Hello there."]), MAIN_MAP).unwrap();
        let mut harness = Self {
            maps,
            player: Rect::new(0, 0, 128, 128),
            sprites: SpriteCollection::default(),
            interactions: InteractionManager::new(),
            size: UVec2::ZERO,
            resizes: 0,
        };
        assert!(harness.switch(MAIN_MAP));
        harness
    }

    fn run<R>(&mut self, f: impl FnOnce(&mut MapManager, &mut SwitchContext<'_>, &mut dyn FnMut(UVec2)) -> R) -> R {
        let Self {
            maps,
            player,
            sprites,
            interactions,
            size,
            resizes,
        } = self;
        let mut ctx = SwitchContext {
            player,
            sprites,
            interactions,
        };
        f(maps, &mut ctx, &mut |dimensions: UVec2| {
            *size = dimensions;
            *resizes += 1;
        })
    }

    fn switch(&mut self, name: &str) -> bool {
        self.run(|maps, ctx, on_dimensions| maps.switch_map(name, ctx, on_dimensions))
    }
}

#[test]
fn test_switch_registers_declared_objects() {
    let harness = Harness::new(common::memory_maps());

    assert_eq!(harness.maps.current_name(), MAIN_MAP);
    assert_that(&harness.interactions.contains(WIZARD_ID)).is_true();
    assert_eq!(harness.sprites.len(), 1);
    assert_eq!(harness.size, UVec2::new(20 * 64, 20 * 64));
    assert_eq!((harness.player.x, harness.player.y), (128, 128));
}

#[test]
fn test_unknown_map_changes_nothing() {
    let mut harness = Harness::new(common::memory_maps());
    harness.player.x = 300;
    let resizes = harness.resizes;

    assert_that(&harness.switch("atlantis")).is_false();

    assert_eq!(harness.maps.current_name(), MAIN_MAP);
    assert_eq!(harness.player.x, 300);
    assert_eq!(harness.resizes, resizes);
    assert_that(&harness.interactions.contains(WIZARD_ID)).is_true();
    assert_eq!(harness.sprites.len(), 1);
}

#[test]
fn test_switching_to_the_same_map_keeps_dimensions() {
    let mut harness = Harness::new(common::memory_maps());
    let before = harness.size;

    assert_that(&harness.switch(MAIN_MAP)).is_true();

    assert_eq!(harness.size, before);
    assert_eq!(harness.interactions.len(), 1);
    assert_eq!(harness.sprites.len(), 1);
}

#[test]
fn test_wizard_hidden_indoors_and_back_outside() {
    let mut harness = Harness::new(common::memory_maps());

    assert_that(&harness.switch(WIZARD_HOUSE_MAP)).is_true();
    assert_that(&harness.interactions.contains(WIZARD_ID)).is_false();
    assert_that(&harness.interactions.contains(common::HOUSE_ZONE)).is_true();
    assert_that(&harness.sprites.is_empty()).is_true();
    assert_eq!(harness.size, UVec2::new(10 * 64, 8 * 64));
    assert_eq!((harness.player.x, harness.player.y), (192, 192));

    assert_that(&harness.switch(MAIN_MAP)).is_true();
    assert_that(&harness.interactions.contains(WIZARD_ID)).is_true();
    assert_that(&harness.interactions.contains(common::HOUSE_ZONE)).is_false();
    assert_eq!(harness.interactions.len(), 1);
}

#[test]
fn test_minigame_returns_to_the_previous_map() {
    let mut harness = Harness::new(common::memory_maps());
    harness.switch(WIZARD_HOUSE_MAP);

    assert_that(&harness.run(|maps, ctx, on_dimensions| maps.switch_to_minigame(ctx, on_dimensions))).is_true();
    assert_eq!(harness.maps.current_name(), MINIGAME_ARENA_MAP);
    assert_that(&harness.maps.in_minigame_arena()).is_true();
    assert_eq!(harness.maps.previous_map(), Some(WIZARD_HOUSE_MAP));

    assert_that(&harness.run(|maps, ctx, on_dimensions| maps.return_from_minigame(ctx, on_dimensions))).is_true();
    assert_eq!(harness.maps.current_name(), WIZARD_HOUSE_MAP);
    assert_that(&harness.maps.previous_map()).is_none();
    assert_that(&harness.interactions.contains(common::HOUSE_ZONE)).is_true();
}

#[test]
fn test_return_without_a_recorded_map_goes_to_main() {
    let mut harness = Harness::new(common::memory_maps());
    harness.switch(MINIGAME_ARENA_MAP);

    assert_that(&harness.run(|maps, ctx, on_dimensions| maps.return_from_minigame(ctx, on_dimensions))).is_true();
    assert_eq!(harness.maps.current_name(), MAIN_MAP);
}

#[test]
fn test_can_move_follows_the_active_map() {
    let mut harness = Harness::new(common::memory_maps());
    assert_that(&harness.maps.can_move(10, 10)).is_false();
    assert_that(&harness.maps.can_move(100, 100)).is_true();
    assert_that(&harness.maps.can_move(64 * 15, 64 * 15)).is_true();

    harness.switch(WIZARD_HOUSE_MAP);
    assert_that(&harness.maps.can_move(64 * 15, 64 * 15)).is_false();
}

#[test]
fn test_reload_picks_up_edited_record() {
    let source = Arc::new(common::memory_maps());
    let mut harness = Harness::from_source(Box::new(Arc::clone(&source)));
    harness.player.x = 400;

    let mut edited = common::main_record();
    edited.collision_grid = common::bordered_rows(30, 20);
    edited.terrain_grid = vec![vec![0; 30]; 20];
    edited.interactables.push(InteractableRecord::MysteriousRect {
        x: 900,
        y: 300,
        radius: None,
    });
    edited.static_decorations.clear();
    source.replace(edited);

    let reloaded = harness.run(|maps, ctx, on_dimensions| maps.refresh_active_map_after_reload(ctx, on_dimensions));
    assert_that(&reloaded.is_ok()).is_true();

    assert_eq!(harness.size, UVec2::new(30 * 64, 20 * 64));
    assert_eq!(harness.player.x, 400);
    assert_eq!(harness.interactions.len(), 2);
    assert_that(&harness.interactions.contains("mysterious_rect_900_300")).is_true();
    assert_that(&harness.sprites.is_empty()).is_true();
    assert_that(&harness.maps.can_move(64 * 25, 64 * 5)).is_true();
}

#[test]
fn test_failed_reload_keeps_the_active_map() {
    let source = Arc::new(common::memory_maps());
    let mut harness = Harness::from_source(Box::new(Arc::clone(&source)));
    let before = harness.size;

    let mut broken = common::main_record();
    broken.tile_size = 0;
    source.replace(broken);

    let reloaded = harness.run(|maps, ctx, on_dimensions| maps.refresh_active_map_after_reload(ctx, on_dimensions));
    assert_that(&reloaded.is_err()).is_true();
    assert_eq!(harness.size, before);
    assert_eq!(harness.maps.current().tile_size(), 64);
    assert_that(&harness.interactions.contains(WIZARD_ID)).is_true();
}

#[test]
fn test_npcs_keep_their_state_between_visits() {
    let mut house = common::house_record();
    house.interactables.push(InteractableRecord::NavalNpc {
        x: 300,
        y: 200,
        radius: None,
    });
    let source = MemoryMaps::new([common::main_record(), house, common::arena_record()]);
    let mut harness = Harness::new(source);
    harness.switch(WIZARD_HOUSE_MAP);

    let naval_id = "naval_npc_300_200";
    let mut progress = PlayerProgress::with_points(5);
    let mut rng = common::rng(11);
    {
        let naval = harness.interactions.get_mut(naval_id).unwrap();
        naval.talk(&mut TalkContext {
            progress: &mut progress,
            now: 0,
            rng: &mut rng,
        });
    }
    assert_that(&common::wait_until(|| {
        let naval = harness.interactions.get_mut(naval_id).unwrap();
        naval.poll();
        naval.properties().message == "Hello there."
    }))
    .is_true();

    harness.switch(MAIN_MAP);
    assert_that(&harness.interactions.contains(naval_id)).is_false();
    harness.switch(WIZARD_HOUSE_MAP);

    let naval = harness.interactions.get(naval_id).unwrap();
    assert_eq!(naval.properties().message, "Hello there.");
    assert_eq!(progress.points, 0);
}

#[test]
fn test_zone_sits_on_its_tile_center() {
    let mut harness = Harness::new(common::memory_maps());
    harness.switch(WIZARD_HOUSE_MAP);

    let zone = harness.interactions.get(common::HOUSE_ZONE).unwrap();
    assert_eq!(zone.properties().center, Vec2::new(3.5 * 64.0, 4.5 * 64.0));
    assert_eq!(harness.maps.current().kind, MapKind::Interior);
}

#[test]
fn test_reload_pulls_the_player_inside_a_smaller_map() {
    let source = Arc::new(common::memory_maps());
    let mut harness = Harness::from_source(Box::new(Arc::clone(&source)));
    harness.player.x = 900;
    harness.player.y = 900;

    let mut shrunk = common::main_record();
    shrunk.collision_grid = common::open_rows(12, 12);
    shrunk.terrain_grid = vec![vec![0; 12]; 12];
    source.replace(shrunk);

    let reloaded = harness.run(|maps, ctx, on_dimensions| maps.refresh_active_map_after_reload(ctx, on_dimensions));
    assert_that(&reloaded.is_ok()).is_true();

    assert_eq!(harness.size, UVec2::new(12 * 64, 12 * 64));
    assert_eq!((harness.player.x, harness.player.y), (640, 640));
}
