use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use tracing::warn;

use crate::constants::mysterious;
use crate::geometry::Rect;
use crate::interaction::{
    CustomDisplay, Interactable, InteractionProperties, InteractionResponse, TalkContext, TalkState, TextFetch,
};
use crate::services::TextGenerator;

/// Word-wraps `text` to `width` columns, keeping existing line breaks and blank lines.
///
/// A word longer than `width` gets a line of its own rather than being split.
pub fn wrap(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() { word.chars().count() } else { current.chars().count() + 1 + word.chars().count() };
            if needed <= width || current.is_empty() {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines.join("\n")
}

/// A glowing rectangle that asks the player philosophy questions.
pub struct MysteriousRect {
    id: String,
    rect: Rect,
    radius: f32,
    state: TalkState,
    message: String,
    new_message: bool,
    fetch: TextFetch,
    text: Arc<dyn TextGenerator>,
}

impl fmt::Debug for MysteriousRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysteriousRect")
            .field("id", &self.id)
            .field("rect", &self.rect)
            .field("state", &self.state)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl MysteriousRect {
    pub fn new(x: i32, y: i32, radius: Option<f32>, text: Arc<dyn TextGenerator>) -> Self {
        Self {
            id: format!("mysterious_rect_{x}_{y}"),
            rect: Rect::new(x, y, mysterious::SIZE.0, mysterious::SIZE.1),
            radius: radius.unwrap_or(mysterious::RADIUS),
            state: TalkState::Idle,
            message: mysterious::PROMPT_TALK.to_string(),
            new_message: false,
            fetch: TextFetch::new(),
            text,
        }
    }

    pub fn state(&self) -> TalkState {
        self.state
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

impl CustomDisplay for MysteriousRect {
    fn display_message(&self) -> String {
        wrap(&self.message, mysterious::WRAP_WIDTH)
    }
}

impl Interactable for MysteriousRect {
    fn id(&self) -> &str {
        &self.id
    }

    fn properties(&self) -> InteractionProperties {
        InteractionProperties {
            id: self.id.clone(),
            center: Vec2::new(self.rect.center_x() as f32, self.rect.center_y() as f32),
            radius: self.radius,
            message: self.message.clone(),
            color: [255, 0, 0],
            thickness: 3,
        }
    }

    fn talk(&mut self, _ctx: &mut TalkContext<'_>) -> InteractionResponse {
        match self.state {
            TalkState::Idle => {
                if self.fetch.request(&self.text, mysterious::QUESTION_PROMPT) {
                    self.state = TalkState::Thinking;
                    self.message = mysterious::THINKING.to_string();
                    self.new_message = true;
                }
                InteractionResponse::Continue
            }
            TalkState::Thinking => InteractionResponse::Continue,
            TalkState::Displayed => {
                self.reset();
                InteractionResponse::Close
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
        if self.state != TalkState::Thinking {
            return;
        }
        self.message = match result {
            Ok(question) if !question.trim().is_empty() => format!("The rectangle asks:\n\"{}\"", question.trim()),
            Ok(_) => mysterious::LOST.to_string(),
            Err(error) => {
                warn!(%error, "Rectangle question fetch failed");
                mysterious::FALLBACK.to_string()
            }
        };
        self.state = TalkState::Displayed;
        self.new_message = true;
    }

    fn is_fetching(&self) -> bool {
        self.fetch.in_flight()
    }

    fn take_new_message(&mut self) -> bool {
        std::mem::take(&mut self.new_message)
    }

    fn custom_display(&self) -> Option<&dyn CustomDisplay> {
        Some(self)
    }

    fn reset(&mut self) {
        self.fetch.abandon();
        self.state = TalkState::Idle;
        self.message = mysterious::PROMPT_TALK.to_string();
        self.new_message = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_width_and_newlines() {
        let wrapped = wrap("one two three four\n\nfive", 9);
        assert_eq!(wrapped, "one two\nthree\nfour\n\nfive");
    }

    #[test]
    fn test_long_word_gets_its_own_line() {
        assert_eq!(wrap("a extraordinarily b", 5), "a\nextraordinarily\nb");
    }
}
