//! Owns the map catalog and performs map switches.
//!
//! A switch is a full teardown of the current map's objects followed by a full
//! registration of the next map's, all within one call. Objects leaving a map
//! are parked under that map's name so NPCs keep their state between visits;
//! exterior-only objects (the wizard) travel in a shared stash and come back
//! whenever an exterior map becomes active.

use std::collections::HashMap;
use std::sync::Arc;

use bevy_ecs::resource::Resource;
use glam::{IVec2, UVec2};
use tracing::{debug, error, info, warn};

use crate::constants::{MAIN_MAP, MINIGAME_ARENA_MAP};
use crate::error::MapError;
use crate::geometry::Rect;
use crate::interaction::{self, Interactable, InteractionManager};
use crate::map::descriptor::{MapDescriptor, TilesetRef};
use crate::map::grid::CollisionMap;
use crate::map::record::MapKind;
use crate::map::source::MapSource;
use crate::movement;
use crate::services::TextGenerator;

/// A render-only entity currently placed in the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub id: String,
    pub position: IVec2,
    pub sprite: String,
}

/// The shared drawing collection for static decorations of the active map.
#[derive(Resource, Debug, Default)]
pub struct SpriteCollection {
    decorations: Vec<Decoration>,
}

impl SpriteCollection {
    pub fn push(&mut self, decoration: Decoration) {
        self.decorations.push(decoration);
    }

    pub fn clear(&mut self) {
        self.decorations.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }
}

/// The world state a map switch rewrites.
pub struct SwitchContext<'a> {
    pub player: &'a mut Rect,
    pub sprites: &'a mut SpriteCollection,
    pub interactions: &'a mut InteractionManager,
}

#[derive(Resource)]
pub struct MapManager {
    source: Box<dyn MapSource>,
    text: Arc<dyn TextGenerator>,
    cache: HashMap<String, MapDescriptor>,
    active: MapDescriptor,
    /// Tileset the renderer should currently draw with.
    tileset: TilesetRef,
    previous_map: Option<String>,
    parked: HashMap<String, Vec<Box<dyn Interactable>>>,
    exterior_stash: Vec<Box<dyn Interactable>>,
    /// Whether the active map's objects have been registered yet.
    entered: bool,
}

impl std::fmt::Debug for MapManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapManager")
            .field("active", &self.active.name)
            .field("previous_map", &self.previous_map)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl MapManager {
    /// Loads `initial` as the current map. Nothing is registered until the first [`MapManager::switch_map`].
    pub fn new(source: Box<dyn MapSource>, text: Arc<dyn TextGenerator>, initial: &str) -> Result<Self, MapError> {
        let active = MapDescriptor::try_from(source.load(initial)?)?;
        let mut cache = HashMap::new();
        cache.insert(active.name.clone(), active.clone());
        info!(map = %active.name, "Map catalog ready");

        Ok(Self {
            source,
            text,
            cache,
            tileset: active.tileset.clone(),
            active,
            previous_map: None,
            parked: HashMap::new(),
            exterior_stash: Vec::new(),
            entered: false,
        })
    }

    pub fn current_name(&self) -> &str {
        &self.active.name
    }

    pub fn current(&self) -> &MapDescriptor {
        &self.active
    }

    pub fn collision(&self) -> &CollisionMap {
        &self.active.collision
    }

    pub fn tileset(&self) -> &TilesetRef {
        &self.tileset
    }

    pub fn world_size(&self) -> UVec2 {
        self.active.world_size()
    }

    pub fn previous_map(&self) -> Option<&str> {
        self.previous_map.as_deref()
    }

    pub fn is_exterior(&self) -> bool {
        self.active.kind == MapKind::Exterior
    }

    pub fn in_minigame_arena(&self) -> bool {
        self.active.kind == MapKind::Arena
    }

    /// Whether the pixel is walkable on the active map.
    pub fn can_move(&self, x: i32, y: i32) -> bool {
        self.active.can_move(x, y)
    }

    fn descriptor(&mut self, name: &str) -> Result<MapDescriptor, MapError> {
        if let Some(descriptor) = self.cache.get(name) {
            return Ok(descriptor.clone());
        }
        let descriptor = MapDescriptor::try_from(self.source.load(name)?)?;
        debug!(map = name, "Map descriptor cached");
        self.cache.insert(name.to_string(), descriptor.clone());
        Ok(descriptor)
    }

    /// Makes `name` the active map, repositioning the player to its spawn tile.
    ///
    /// Unknown or invalid maps are logged and leave every piece of state untouched.
    pub fn switch_map(&mut self, name: &str, ctx: &mut SwitchContext<'_>, on_dimensions: &mut dyn FnMut(UVec2)) -> bool {
        let next = match self.descriptor(name) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                error!(map = name, %error, "Cannot switch map");
                return false;
            }
        };

        let from = self.active.name.clone();
        self.teardown(ctx);

        self.active = next;
        self.tileset = self.active.tileset.clone();
        debug!(
            tileset = %self.tileset.source,
            tile_size = self.tileset.tile_size,
            "Rendering context rebound"
        );

        let objects = match self.parked.remove(name) {
            Some(objects) => objects,
            None => self.instantiate(),
        };
        self.register(objects, ctx);

        let dimensions = self.active.world_size();
        on_dimensions(dimensions);

        let spawn = self.active.spawn_pixel();
        ctx.player.x = spawn.x;
        ctx.player.y = spawn.y;

        info!(from = %from, to = name, width = dimensions.x, height = dimensions.y, "Switched map");
        true
    }

    /// Enters the minigame arena, remembering where the player came from.
    pub fn switch_to_minigame(&mut self, ctx: &mut SwitchContext<'_>, on_dimensions: &mut dyn FnMut(UVec2)) -> bool {
        let origin = self.active.name.clone();
        if !self.switch_map(MINIGAME_ARENA_MAP, ctx, on_dimensions) {
            return false;
        }
        self.previous_map = Some(origin);
        true
    }

    /// Returns to the map that was active before [`MapManager::switch_to_minigame`].
    pub fn return_from_minigame(&mut self, ctx: &mut SwitchContext<'_>, on_dimensions: &mut dyn FnMut(UVec2)) -> bool {
        let target = self.previous_map.take().unwrap_or_else(|| {
            warn!("No map recorded before the minigame, returning to the main map");
            MAIN_MAP.to_string()
        });
        self.switch_map(&target, ctx, on_dimensions)
    }

    /// Re-reads the active map from its source and rebuilds everything it declares.
    ///
    /// The player is not moved. On failure the previous descriptor stays active.
    pub fn refresh_active_map_after_reload(
        &mut self,
        ctx: &mut SwitchContext<'_>,
        on_dimensions: &mut dyn FnMut(UVec2),
    ) -> Result<(), MapError> {
        let name = self.active.name.clone();
        let reloaded = self
            .source
            .load(&name)
            .and_then(MapDescriptor::try_from)
            .inspect_err(|error| error!(map = %name, %error, "Map reload failed"))?;

        self.active = reloaded;
        self.cache.insert(name.clone(), self.active.clone());
        self.tileset = self.active.tileset.clone();

        let fresh = self.instantiate();
        let fresh_ids: Vec<String> = fresh.iter().map(|object| object.id().to_string()).collect();

        for object in ctx.interactions.drain() {
            if object.exterior_only() && !fresh_ids.iter().any(|id| id == object.id()) {
                self.exterior_stash.push(object);
            }
        }
        self.exterior_stash
            .retain(|object| !fresh_ids.iter().any(|id| id == object.id()));
        self.parked.remove(&name);
        ctx.sprites.clear();

        self.register(fresh, ctx);
        self.settle_player(ctx.player);
        on_dimensions(self.active.world_size());
        info!(map = %name, "Map reloaded");
        Ok(())
    }

    /// Pulls the player back inside a reloaded map. Falls back to the spawn tile
    /// when the clamped position leaves the feet on blocked tiles.
    fn settle_player(&self, player: &mut Rect) {
        let clamped = movement::clamp_to_world(*player, self.active.world_size());
        if movement::feet_clear(&clamped, |x, y| self.active.can_move(x, y)) {
            *player = clamped;
            return;
        }

        let spawn = self.active.spawn_pixel();
        warn!(map = %self.active.name, x = spawn.x, y = spawn.y, "Player stranded by reload, moved to spawn");
        player.x = spawn.x;
        player.y = spawn.y;
    }

    /// Unregisters every object and decoration of the active map, parking the objects.
    fn teardown(&mut self, ctx: &mut SwitchContext<'_>) {
        let mut staying = Vec::new();
        for object in ctx.interactions.drain() {
            if object.exterior_only() {
                self.exterior_stash.push(object);
            } else {
                staying.push(object);
            }
        }
        if self.entered {
            self.parked.insert(self.active.name.clone(), staying);
        }
        ctx.sprites.clear();
    }

    fn instantiate(&self) -> Vec<Box<dyn Interactable>> {
        let tile_size = self.active.tile_size();
        self.active
            .interactables
            .iter()
            .map(|record| interaction::build(record, tile_size, &self.text))
            .collect()
    }

    fn register(&mut self, objects: Vec<Box<dyn Interactable>>, ctx: &mut SwitchContext<'_>) {
        let exterior = self.is_exterior();
        if exterior {
            for object in self.exterior_stash.drain(..) {
                let _ = ctx.interactions.add(object);
            }
        }
        for object in objects {
            if ctx.interactions.contains(object.id()) {
                debug!(id = object.id(), "Already registered from the stash, skipping");
            } else if object.exterior_only() && !exterior {
                self.exterior_stash.push(object);
            } else {
                let _ = ctx.interactions.add(object);
            }
        }
        self.entered = true;

        for record in &self.active.decorations {
            ctx.sprites.push(Decoration {
                id: record.id.clone(),
                position: IVec2::new(record.x, record.y),
                sprite: record.sprite.clone(),
            });
        }
    }
}
