use glam::Vec2;

use crate::interaction::{Interactable, InteractionProperties, InteractionResponse, TalkContext};
use crate::map::record::ZoneAction;

/// A static circle declared by a map record: exits, doorways and yes/no questions.
#[derive(Debug, Clone)]
pub struct Zone {
    id: String,
    center: Vec2,
    radius: f32,
    message: String,
    on_talk: ZoneAction,
    on_dismiss: ZoneAction,
}

impl Zone {
    pub fn new(
        id: impl Into<String>,
        center: Vec2,
        radius: f32,
        message: impl Into<String>,
        on_talk: ZoneAction,
        on_dismiss: ZoneAction,
    ) -> Self {
        Self {
            id: id.into(),
            center,
            radius,
            message: message.into(),
            on_talk,
            on_dismiss,
        }
    }

    fn respond(action: &ZoneAction) -> InteractionResponse {
        match action {
            ZoneAction::Close => InteractionResponse::Close,
            ZoneAction::StartChat => InteractionResponse::StartChat,
            ZoneAction::SwitchMap { target } => InteractionResponse::SwitchMap(target.clone()),
        }
    }
}

impl Interactable for Zone {
    fn id(&self) -> &str {
        &self.id
    }

    fn properties(&self) -> InteractionProperties {
        InteractionProperties {
            id: self.id.clone(),
            center: self.center,
            radius: self.radius,
            message: self.message.clone(),
            color: [0, 255, 0],
            thickness: 2,
        }
    }

    fn talk(&mut self, _ctx: &mut TalkContext<'_>) -> InteractionResponse {
        Self::respond(&self.on_talk)
    }

    fn dismiss(&mut self) -> InteractionResponse {
        Self::respond(&self.on_dismiss)
    }
}
