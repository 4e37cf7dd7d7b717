//! Free-form conversation with the wizard inside his house.

use std::sync::Arc;

use bevy_ecs::resource::Resource;
use tracing::{debug, warn};

use crate::constants::wizard;
use crate::interaction::TextFetch;
use crate::services::TextGenerator;

const GREETING: &str = "Ah, a visitor! Ask me anything, young seeker.";
const MAX_INPUT_CHARS: usize = 200;
/// Lines of history sent along with each message.
const CONTEXT_LINES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Player,
    Wizard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Resource, Debug, Default)]
pub struct ChatSession {
    active: bool,
    history: Vec<ChatLine>,
    input: String,
    fetch: TextFetch,
}

impl ChatSession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn history(&self) -> &[ChatLine] {
        &self.history
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_waiting(&self) -> bool {
        self.fetch.in_flight()
    }

    pub fn start(&mut self) {
        self.active = true;
        self.input.clear();
        self.history = vec![ChatLine {
            speaker: Speaker::Wizard,
            text: GREETING.to_string(),
        }];
        debug!("Wizard chat opened");
    }

    pub fn close(&mut self) {
        self.active = false;
        self.input.clear();
        self.fetch.abandon();
        debug!("Wizard chat closed");
    }

    pub fn type_char(&mut self, character: char) {
        if self.active && !character.is_control() && self.input.chars().count() < MAX_INPUT_CHARS {
            self.input.push(character);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Sends the typed line. Ignored while the wizard is still answering.
    pub fn submit(&mut self, text: &Arc<dyn TextGenerator>) -> bool {
        if !self.active || self.input.trim().is_empty() || self.fetch.in_flight() {
            return false;
        }
        let line = std::mem::take(&mut self.input);
        self.history.push(ChatLine {
            speaker: Speaker::Player,
            text: line.trim().to_string(),
        });

        let context = self
            .history
            .iter()
            .rev()
            .take(CONTEXT_LINES)
            .rev()
            .map(|line| match line.speaker {
                Speaker::Player => format!("Player: {}", line.text),
                Speaker::Wizard => format!("Wizard: {}", line.text),
            })
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!("You are a wise, playful wizard. Continue the conversation.\n{context}\nWizard:");
        self.fetch.request(text, prompt)
    }

    /// Appends the wizard's reply once it arrives.
    pub fn poll(&mut self) {
        let Some(result) = self.fetch.poll() else {
            return;
        };
        let reply = result.unwrap_or_else(|error| {
            warn!(%error, "Wizard chat reply failed");
            wizard::FALLBACK.to_string()
        });
        if self.active {
            self.history.push(ChatLine {
                speaker: Speaker::Wizard,
                text: reply.trim().to_string(),
            });
        }
    }
}
