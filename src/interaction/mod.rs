//! Interactive objects and the manager that decides which one the player may talk to.

use std::fmt::Debug;
use std::sync::Arc;

use glam::{UVec2, Vec2};
use rand::RngCore;

use crate::geometry::Rect;
use crate::map::grid::CollisionMap;
use crate::map::record::InteractableRecord;
use crate::services::progress::PlayerProgress;
use crate::services::TextGenerator;

pub mod fetch;
pub mod manager;
pub mod mysterious;
pub mod naval;
pub mod wizard;
pub mod zone;

pub use fetch::TextFetch;
pub use manager::InteractionManager;
pub use mysterious::MysteriousRect;
pub use naval::NavalNpc;
pub use wizard::Wizard;
pub use zone::Zone;

pub type Rgb = [u8; 3];

/// Snapshot of an object's interaction circle and current text.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionProperties {
    pub id: String,
    /// World pixel coordinates.
    pub center: Vec2,
    pub radius: f32,
    pub message: String,
    pub color: Rgb,
    pub thickness: u32,
}

/// Where an object is in its talk exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TalkState {
    /// Showing the prompt.
    #[default]
    Idle,
    /// Waiting on the text service; the message is a placeholder.
    Thinking,
    /// Showing fetched text.
    Displayed,
}

/// What the caller should do after a talk (E) or dismiss (Q).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionResponse {
    /// Keep the popup open; the message may have changed.
    Continue,
    /// Close the popup and mark the object as interacted.
    Close,
    /// Close the popup, mark the object and open the wizard chat.
    StartChat,
    /// Close the popup, mark the object and travel to another map.
    SwitchMap(String),
    /// Show a transient popup; nothing else changed.
    Popup { text: String, duration_ms: u64 },
    /// A quote was bought; progress changed and should be saved.
    QuoteGranted(u32),
}

/// Mutable game state an object may touch while being talked to.
pub struct TalkContext<'a> {
    pub progress: &'a mut PlayerProgress,
    pub now: u64,
    pub rng: &'a mut dyn RngCore,
}

/// What a self-moving object sees each tick.
pub struct NpcContext<'a> {
    pub now: u64,
    pub world: UVec2,
    pub collision: &'a CollisionMap,
    pub player: Rect,
    pub rng: &'a mut dyn RngCore,
}

/// Drawing hints for objects that have a sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteView {
    pub sprite: &'static str,
    pub rect: Rect,
    pub facing_right: bool,
}

/// Objects whose text must be wrapped before the typewriter slices it.
pub trait CustomDisplay {
    fn needs_custom_display(&self) -> bool {
        true
    }

    fn needs_custom_typing(&self) -> bool {
        true
    }

    /// The full message, wrapped for the popup.
    fn display_message(&self) -> String;

    /// The first `typed` characters of [`CustomDisplay::display_message`].
    fn typing_message(&self, typed: usize) -> String {
        self.display_message().chars().take(typed).collect()
    }
}

/// Anything the player can walk up to and talk to.
pub trait Interactable: Debug + Send + Sync {
    /// Unique among the objects registered at the same time.
    fn id(&self) -> &str;

    fn properties(&self) -> InteractionProperties;

    /// Handles E while this object is eligible.
    fn talk(&mut self, ctx: &mut TalkContext<'_>) -> InteractionResponse;

    /// Handles Q while this object is eligible.
    fn dismiss(&mut self) -> InteractionResponse;

    /// Picks up a finished fetch, if any.
    fn poll(&mut self) {}

    fn is_fetching(&self) -> bool {
        false
    }

    /// Consumes the "new message ready to type" flag.
    fn take_new_message(&mut self) -> bool {
        false
    }

    /// Hidden while any non-exterior map is active.
    fn exterior_only(&self) -> bool {
        false
    }

    fn tick(&mut self, _ctx: &mut NpcContext<'_>) {}

    fn sprite(&self) -> Option<SpriteView> {
        None
    }

    /// A second, non-typewritten line shown under the main popup.
    fn secondary_prompt(&self) -> Option<&str> {
        None
    }

    fn custom_display(&self) -> Option<&dyn CustomDisplay> {
        None
    }

    /// Returns to the prompt, dropping any in-flight fetch.
    fn reset(&mut self) {}
}

/// Instantiates the object a map record describes.
pub fn build(record: &InteractableRecord, tile_size: u32, text: &Arc<dyn TextGenerator>) -> Box<dyn Interactable> {
    match record {
        InteractableRecord::Wizard { x, y, radius } => Box::new(Wizard::new(*x, *y, *radius, Arc::clone(text))),
        InteractableRecord::NavalNpc { x, y, radius } => Box::new(NavalNpc::new(*x, *y, *radius, Arc::clone(text))),
        InteractableRecord::MysteriousRect { x, y, radius } => {
            Box::new(MysteriousRect::new(*x, *y, *radius, Arc::clone(text)))
        }
        InteractableRecord::Zone {
            id,
            tile,
            radius,
            message,
            on_talk,
            on_dismiss,
        } => {
            let size = tile_size as f32;
            let center = Vec2::new((tile.0 as f32 + 0.5) * size, (tile.1 as f32 + 0.5) * size);
            Box::new(Zone::new(id.clone(), center, *radius, message.clone(), on_talk.clone(), on_dismiss.clone()))
        }
    }
}
