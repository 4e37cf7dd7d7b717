use bevy_ecs::event::Event;

use crate::map::direction::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    MovePlayer(Direction),
    /// E: talk to the eligible object.
    Talk,
    /// Q: walk away from the eligible object.
    Dismiss,
    /// Enter: submit an answer or close a result.
    Confirm,
    /// Escape: toggle settings, or back out of a quiz or chat.
    Escape,
    Backspace,
    /// Re-read the active map's definition.
    ReloadMap,
    /// Grant a single point.
    DebugPoint,
    Exit,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
    /// A printable character typed by the player.
    Text(char),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}
