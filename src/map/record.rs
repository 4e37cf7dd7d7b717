//! The on-disk shape of a map: one JSON document per map.

use serde::{Deserialize, Serialize};

/// Whether a map is outdoors, indoors, or a minigame arena.
///
/// Entities tagged exterior-only are hidden while any non-exterior map is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    #[default]
    Exterior,
    Interior,
    Arena,
}

/// A map record exactly as stored in `assets/maps/<name>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub name: String,
    #[serde(default)]
    pub kind: MapKind,
    pub terrain_grid: Vec<Vec<i32>>,
    #[serde(default)]
    pub building_grid: Option<Vec<Vec<i32>>>,
    #[serde(default)]
    pub decoration_grid: Option<Vec<Vec<i32>>>,
    pub collision_grid: Vec<Vec<u8>>,
    pub tile_size: u32,
    pub tile_source_ref: String,
    pub tileset_width: u32,
    pub original_tile_size: u32,
    #[serde(default)]
    pub spawn_tile: Option<(u32, u32)>,
    #[serde(default)]
    pub static_decorations: Vec<DecorationRecord>,
    #[serde(default)]
    pub interactables: Vec<InteractableRecord>,
    #[serde(default)]
    pub collectibles: Vec<(u32, u32)>,
}

/// A render-only entity placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationRecord {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub sprite: String,
}

/// What a zone does when the player presses a key inside it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ZoneAction {
    /// Close the popup and mark the zone as visited.
    #[default]
    Close,
    /// Open the free-form chat with the wizard.
    StartChat,
    /// Leave for another map.
    SwitchMap { target: String },
}

/// One interactable declared by a map record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractableRecord {
    Wizard {
        x: i32,
        y: i32,
        #[serde(default)]
        radius: Option<f32>,
    },
    NavalNpc {
        x: i32,
        y: i32,
        #[serde(default)]
        radius: Option<f32>,
    },
    MysteriousRect {
        x: i32,
        y: i32,
        #[serde(default)]
        radius: Option<f32>,
    },
    Zone {
        id: String,
        /// Center tile; the circle is placed at the tile's pixel center.
        tile: (u32, u32),
        radius: f32,
        message: String,
        #[serde(default)]
        on_talk: ZoneAction,
        #[serde(default)]
        on_dismiss: ZoneAction,
    },
}
