//! Which subsystem is driving the player, and the popups that come with it.

use bevy_ecs::resource::Resource;
use tracing::debug;

use crate::constants::TYPING_DELAY_MS;

/// At most one of these drives input and movement at any time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Exploring,
    /// A popup for the eligible interactable is open.
    Dialogue { id: String },
    /// Free-form conversation with the wizard.
    Chat,
    Quiz,
    Minigame,
    Settings,
}

/// Text that is valid until the clock passes `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedPopup {
    pub text: String,
    pub expires_at: u64,
}

impl TimedPopup {
    pub fn new(text: impl Into<String>, now: u64, duration_ms: u64) -> Self {
        Self {
            text: text.into(),
            expires_at: now + duration_ms,
        }
    }

    pub fn is_live(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

/// Character-by-character reveal of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Typewriter {
    text: String,
    shown: usize,
    last_char_at: u64,
    /// Text supplied by an object that slices its own message.
    revealed: Option<String>,
}

impl Typewriter {
    /// Starts revealing `text` from the first character.
    pub fn restart(&mut self, text: impl Into<String>, now: u64) {
        self.text = text.into();
        self.shown = 0;
        self.last_char_at = now;
        self.revealed = None;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.shown = 0;
        self.revealed = None;
    }

    /// Reveals one character per [`TYPING_DELAY_MS`] elapsed.
    pub fn advance(&mut self, now: u64) {
        let total = self.text.chars().count();
        while self.shown < total && now.saturating_sub(self.last_char_at) >= TYPING_DELAY_MS {
            self.shown += 1;
            self.last_char_at += TYPING_DELAY_MS;
        }
        if self.shown >= total {
            self.last_char_at = now;
        }
    }

    pub fn is_typing(&self) -> bool {
        self.shown < self.text.chars().count()
    }

    /// Number of characters revealed so far.
    pub fn shown(&self) -> usize {
        self.shown
    }

    /// Replaces the sliced text until the next restart. `None` falls back to slicing.
    pub fn set_revealed(&mut self, revealed: Option<String>) {
        self.revealed = revealed;
    }

    pub fn visible(&self) -> String {
        match &self.revealed {
            Some(revealed) => revealed.clone(),
            None => self.text.chars().take(self.shown).collect(),
        }
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }
}

/// Owns the current [`GameMode`] and everything the frontend needs to draw popups.
#[derive(Resource, Debug, Default)]
pub struct ModeArbiter {
    mode: GameMode,
    pub typewriter: Typewriter,
    /// Second, non-typed line under the dialogue popup.
    pub secondary: Option<String>,
    popup: Option<TimedPopup>,
}

impl ModeArbiter {
    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "Game mode changed");
            if !matches!(mode, GameMode::Dialogue { .. }) {
                self.typewriter.clear();
                self.secondary = None;
            }
            self.mode = mode;
        }
    }

    /// The player walks only while exploring or dodging hazards.
    pub fn can_player_move(&self) -> bool {
        matches!(self.mode, GameMode::Exploring | GameMode::Minigame)
    }

    pub fn dialogue_id(&self) -> Option<&str> {
        match &self.mode {
            GameMode::Dialogue { id } => Some(id),
            _ => None,
        }
    }

    /// Whether E/Q should reach interactables.
    pub fn accepts_talk(&self) -> bool {
        matches!(self.mode, GameMode::Dialogue { .. })
    }

    /// Whether typed characters belong to a text field.
    pub fn captures_text(&self) -> bool {
        matches!(self.mode, GameMode::Quiz | GameMode::Chat)
    }

    /// Toggles the settings screen. Ignored while a quiz or minigame owns the player.
    pub fn toggle_settings(&mut self) -> bool {
        match self.mode {
            GameMode::Settings => self.set_mode(GameMode::Exploring),
            GameMode::Exploring | GameMode::Dialogue { .. } => self.set_mode(GameMode::Settings),
            GameMode::Quiz | GameMode::Minigame | GameMode::Chat => return false,
        }
        true
    }

    pub fn show_popup(&mut self, text: impl Into<String>, now: u64, duration_ms: u64) {
        self.popup = Some(TimedPopup::new(text, now, duration_ms));
    }

    /// The timed popup text, if it has not expired.
    pub fn popup(&self, now: u64) -> Option<&str> {
        self.popup
            .as_ref()
            .filter(|popup| popup.is_live(now))
            .map(|popup| popup.text.as_str())
    }

    /// Drops an expired popup.
    pub fn expire_popups(&mut self, now: u64) {
        if self.popup.as_ref().is_some_and(|popup| !popup.is_live(now)) {
            self.popup = None;
        }
    }
}
