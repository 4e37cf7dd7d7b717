use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use tracing::{debug, warn};

use crate::constants::{wizard, NPC_SIZE, WIZARD_HOUSE_MAP};
use crate::geometry::Rect;
use crate::interaction::{
    Interactable, InteractionProperties, InteractionResponse, NpcContext, SpriteView, TalkContext, TalkState, TextFetch,
};
use crate::services::TextGenerator;

pub const WIZARD_ID: &str = "wizard";

/// The joke-telling wizard standing outside his house. Only lives on exterior maps.
pub struct Wizard {
    rect: Rect,
    radius: f32,
    state: TalkState,
    message: String,
    new_message: bool,
    fetch: TextFetch,
    text: Arc<dyn TextGenerator>,
    facing_right: bool,
    last_flip: Option<u64>,
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("rect", &self.rect)
            .field("state", &self.state)
            .field("message", &self.message)
            .field("facing_right", &self.facing_right)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    pub fn new(x: i32, y: i32, radius: Option<f32>, text: Arc<dyn TextGenerator>) -> Self {
        Self {
            rect: Rect::new(x, y, NPC_SIZE.0, NPC_SIZE.1),
            radius: radius.unwrap_or(wizard::RADIUS),
            state: TalkState::Idle,
            message: wizard::PROMPT_TALK.to_string(),
            new_message: false,
            fetch: TextFetch::new(),
            text,
            facing_right: true,
            last_flip: None,
        }
    }

    pub fn state(&self) -> TalkState {
        self.state
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    /// The circle sits just below the wizard's feet.
    pub fn interaction_center(&self) -> Vec2 {
        Vec2::new(self.rect.center_x() as f32, (self.rect.bottom() + wizard::CENTER_OFFSET_Y) as f32)
    }

    fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.new_message = true;
    }
}

impl Interactable for Wizard {
    fn id(&self) -> &str {
        WIZARD_ID
    }

    fn properties(&self) -> InteractionProperties {
        InteractionProperties {
            id: WIZARD_ID.to_string(),
            center: self.interaction_center(),
            radius: self.radius,
            message: self.message.clone(),
            color: [255, 255, 0],
            thickness: 2,
        }
    }

    fn talk(&mut self, _ctx: &mut TalkContext<'_>) -> InteractionResponse {
        match self.state {
            TalkState::Idle => {
                if self.fetch.request(&self.text, wizard::JOKE_PROMPT) {
                    debug!("Wizard is fetching a joke");
                    self.state = TalkState::Thinking;
                    self.set_message(wizard::THINKING);
                }
                InteractionResponse::Continue
            }
            TalkState::Thinking => InteractionResponse::Continue,
            TalkState::Displayed => {
                self.reset();
                InteractionResponse::SwitchMap(WIZARD_HOUSE_MAP.to_string())
            }
        }
    }

    fn dismiss(&mut self) -> InteractionResponse {
        self.reset();
        InteractionResponse::Close
    }

    fn poll(&mut self) {
        let Some(result) = self.fetch.poll() else {
            return;
        };
        let joke = result.unwrap_or_else(|error| {
            warn!(%error, "Wizard joke fetch failed");
            wizard::FALLBACK.to_string()
        });
        if self.state == TalkState::Thinking {
            self.state = TalkState::Displayed;
            self.set_message(joke);
        }
    }

    fn is_fetching(&self) -> bool {
        self.fetch.in_flight()
    }

    fn take_new_message(&mut self) -> bool {
        std::mem::take(&mut self.new_message)
    }

    fn exterior_only(&self) -> bool {
        true
    }

    fn tick(&mut self, ctx: &mut NpcContext<'_>) {
        let last = *self.last_flip.get_or_insert(ctx.now);
        if ctx.now.saturating_sub(last) > wizard::FLIP_INTERVAL_MS {
            self.facing_right = !self.facing_right;
            self.last_flip = Some(ctx.now);
        }
    }

    fn sprite(&self) -> Option<SpriteView> {
        Some(SpriteView {
            sprite: "npcs/the_wizard.png",
            rect: self.rect,
            facing_right: self.facing_right,
        })
    }

    fn secondary_prompt(&self) -> Option<&str> {
        (self.state == TalkState::Displayed).then_some(wizard::PROMPT_VISIT_OR_LEAVE)
    }

    fn reset(&mut self) {
        self.fetch.abandon();
        self.state = TalkState::Idle;
        self.message = wizard::PROMPT_TALK.to_string();
        self.new_message = false;
    }
}
