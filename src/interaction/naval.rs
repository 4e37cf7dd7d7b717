use std::fmt;
use std::sync::Arc;

use glam::{IVec2, Vec2};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::constants::{naval, NPC_SIZE};
use crate::geometry::Rect;
use crate::interaction::{
    Interactable, InteractionProperties, InteractionResponse, NpcContext, SpriteView, TalkContext, TalkState, TextFetch,
};
use crate::map::direction::Direction;
use crate::movement;
use crate::services::TextGenerator;

const IDLE_FRAMES: (u32, u32) = (30, 120);
const MOVE_FRAMES: (u32, u32) = (60, 180);
const SPEECH_INTERVAL: (u32, u32) = (240, 480);

/// What the roaming AI is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Roam {
    Idle,
    Walking(Direction),
}

/// A wandering NPC who sells wisdom quotes for points.
pub struct NavalNpc {
    id: String,
    rect: Rect,
    radius: f32,
    state: TalkState,
    message: String,
    new_message: bool,
    fetch: TextFetch,
    text: Arc<dyn TextGenerator>,
    facing_right: bool,
    roam: Roam,
    roam_timer: u32,
    roam_duration: u32,
    speech_timer: u32,
    speech_interval: u32,
    speech_remaining: u32,
}

impl fmt::Debug for NavalNpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavalNpc")
            .field("id", &self.id)
            .field("rect", &self.rect)
            .field("state", &self.state)
            .field("message", &self.message)
            .field("roam", &self.roam)
            .finish_non_exhaustive()
    }
}

impl NavalNpc {
    pub fn new(x: i32, y: i32, radius: Option<f32>, text: Arc<dyn TextGenerator>) -> Self {
        Self {
            id: format!("naval_npc_{x}_{y}"),
            rect: Rect::new(x, y, NPC_SIZE.0, NPC_SIZE.1),
            radius: radius.unwrap_or(naval::RADIUS),
            state: TalkState::Idle,
            message: naval::PROMPT_TALK.to_string(),
            new_message: false,
            fetch: TextFetch::new(),
            text,
            facing_right: true,
            roam: Roam::Idle,
            roam_timer: 0,
            roam_duration: IDLE_FRAMES.1,
            speech_timer: 0,
            speech_interval: SPEECH_INTERVAL.1,
            speech_remaining: 0,
        }
    }

    pub fn state(&self) -> TalkState {
        self.state
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The circle follows the NPC, sitting a little above its feet.
    pub fn interaction_center(&self) -> Vec2 {
        Vec2::new(self.rect.center_x() as f32, (self.rect.bottom() - naval::CENTER_OFFSET_Y) as f32)
    }

    /// The speech bubble text while one is showing.
    pub fn speech(&self) -> Option<&str> {
        (self.speech_remaining > 0).then_some(naval::SPEECH)
    }

    fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.new_message = true;
    }

    fn pick_roam(&mut self, rng: &mut dyn rand::RngCore) {
        let choices = [None, Some(Direction::Up), Some(Direction::Down), Some(Direction::Left), Some(Direction::Right)];
        let choice = choices.choose(rng).copied().flatten();
        self.roam = choice.map_or(Roam::Idle, Roam::Walking);
        self.roam_timer = 0;
        self.roam_duration = match self.roam {
            Roam::Idle => rng.random_range(IDLE_FRAMES.0..=IDLE_FRAMES.1),
            Roam::Walking(_) => rng.random_range(MOVE_FRAMES.0..=MOVE_FRAMES.1),
        };
    }

    fn step(&mut self, ctx: &mut NpcContext<'_>) {
        self.roam_timer += 1;
        let Roam::Walking(direction) = self.roam else {
            if self.roam_timer >= self.roam_duration {
                self.pick_roam(ctx.rng);
            }
            return;
        };

        match direction {
            Direction::Left => self.facing_right = false,
            Direction::Right => self.facing_right = true,
            _ => {}
        }

        let delta = IVec2::from(direction) * naval::SPEED;
        let future = self.rect.translated(delta);
        let moved = if future.intersects(&ctx.player) {
            None
        } else {
            movement::try_move(self.rect, delta, ctx.world, |x, y| ctx.collision.walkable(x, y))
        };

        match moved {
            Some(rect) => {
                self.rect = rect;
                if self.roam_timer >= self.roam_duration {
                    self.pick_roam(ctx.rng);
                }
            }
            None => self.pick_roam(ctx.rng),
        }
    }

    fn speak(&mut self, rng: &mut dyn rand::RngCore) {
        if self.speech_remaining > 0 {
            self.speech_remaining -= 1;
            return;
        }
        self.speech_timer += 1;
        if self.speech_timer >= self.speech_interval {
            self.speech_remaining = naval::SPEECH_FRAMES;
            self.speech_timer = 0;
            self.speech_interval = rng.random_range(SPEECH_INTERVAL.0..=SPEECH_INTERVAL.1);
        }
    }
}

impl Interactable for NavalNpc {
    fn id(&self) -> &str {
        &self.id
    }

    fn properties(&self) -> InteractionProperties {
        InteractionProperties {
            id: self.id.clone(),
            center: self.interaction_center(),
            radius: self.radius,
            message: self.message.clone(),
            color: [255, 140, 0],
            thickness: 3,
        }
    }

    fn talk(&mut self, ctx: &mut TalkContext<'_>) -> InteractionResponse {
        match self.state {
            TalkState::Thinking => return InteractionResponse::Continue,
            TalkState::Displayed => {
                self.reset();
                return InteractionResponse::Close;
            }
            TalkState::Idle => {}
        }

        let locked: Vec<u32> = naval::QUOTE_IDS
            .iter()
            .copied()
            .filter(|id| !ctx.progress.unlocked_quotes.contains(id))
            .collect();
        if locked.is_empty() {
            self.state = TalkState::Displayed;
            self.set_message(naval::ALL_UNLOCKED);
            return InteractionResponse::Continue;
        }

        if ctx.progress.points < naval::QUOTE_COST {
            debug!(points = ctx.progress.points, "Not enough points for a quote");
            return InteractionResponse::Popup {
                text: naval::INSUFFICIENT.to_string(),
                duration_ms: naval::INSUFFICIENT_POPUP_MS,
            };
        }

        let Some(&quote) = locked.choose(&mut *ctx.rng) else {
            return InteractionResponse::Continue;
        };
        if !ctx.progress.try_spend(naval::QUOTE_COST) {
            return InteractionResponse::Continue;
        }
        ctx.progress.unlock_quote(quote);
        info!(quote, points = ctx.progress.points, "Quote unlocked");

        let prompt = format!("Share Naval's timeless wisdom number {quote} in two sentences.");
        if self.fetch.request(&self.text, prompt) {
            self.state = TalkState::Thinking;
            self.set_message(naval::THINKING);
        }
        InteractionResponse::QuoteGranted(quote)
    }

    fn dismiss(&mut self) -> InteractionResponse {
        self.reset();
        InteractionResponse::Close
    }

    fn poll(&mut self) {
        let Some(result) = self.fetch.poll() else {
            return;
        };
        let wisdom = result.unwrap_or_else(|error| {
            warn!(%error, "Quote elaboration fetch failed");
            naval::FALLBACK.to_string()
        });
        if self.state == TalkState::Thinking {
            self.state = TalkState::Displayed;
            self.set_message(wisdom);
        }
    }

    fn is_fetching(&self) -> bool {
        self.fetch.in_flight()
    }

    fn take_new_message(&mut self) -> bool {
        std::mem::take(&mut self.new_message)
    }

    fn tick(&mut self, ctx: &mut NpcContext<'_>) {
        self.step(ctx);
        self.speak(ctx.rng);
    }

    fn sprite(&self) -> Option<SpriteView> {
        Some(SpriteView {
            sprite: "npcs/naval.png",
            rect: self.rect,
            facing_right: self.facing_right,
        })
    }

    fn reset(&mut self) {
        self.fetch.abandon();
        self.state = TalkState::Idle;
        self.message = naval::PROMPT_TALK.to_string();
        self.new_message = false;
    }
}
