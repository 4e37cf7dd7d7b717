//! Key bindings and the translation of raw key events into game commands.

use std::collections::HashMap;

use bevy_ecs::event::EventWriter;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::ResMut;
use smallvec::SmallVec;
use strum_macros::{Display, EnumString};

use crate::game::events::{GameCommand, GameEvent};
use crate::map::direction::Direction;

/// The keys the game reacts to, independent of any windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    E,
    Q,
    U,
    F1,
    Enter,
    Escape,
    Backspace,
}

/// A raw event from the frontend. Printable characters arrive as `Text` in addition to any key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
    Text(char),
    /// The window was closed.
    Quit,
}

/// Raw events queued by the frontend since the last tick.
#[derive(Resource, Debug, Default)]
pub struct PendingInput(pub Vec<KeyEvent>);

#[derive(Debug, Clone, Resource)]
pub struct Bindings {
    key_bindings: HashMap<Key, GameCommand>,
    /// Held movement keys, most recently pressed last.
    held: SmallVec<[Key; 4]>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        key_bindings.insert(Key::Up, GameCommand::MovePlayer(Direction::Up));
        key_bindings.insert(Key::W, GameCommand::MovePlayer(Direction::Up));
        key_bindings.insert(Key::Down, GameCommand::MovePlayer(Direction::Down));
        key_bindings.insert(Key::S, GameCommand::MovePlayer(Direction::Down));
        key_bindings.insert(Key::Left, GameCommand::MovePlayer(Direction::Left));
        key_bindings.insert(Key::A, GameCommand::MovePlayer(Direction::Left));
        key_bindings.insert(Key::Right, GameCommand::MovePlayer(Direction::Right));
        key_bindings.insert(Key::D, GameCommand::MovePlayer(Direction::Right));

        key_bindings.insert(Key::E, GameCommand::Talk);
        key_bindings.insert(Key::Q, GameCommand::Dismiss);
        key_bindings.insert(Key::Enter, GameCommand::Confirm);
        key_bindings.insert(Key::Escape, GameCommand::Escape);
        key_bindings.insert(Key::Backspace, GameCommand::Backspace);
        key_bindings.insert(Key::U, GameCommand::ReloadMap);
        key_bindings.insert(Key::F1, GameCommand::DebugPoint);

        Self {
            key_bindings,
            held: SmallVec::new(),
        }
    }
}

impl Bindings {
    pub fn command(&self, key: Key) -> Option<GameCommand> {
        self.key_bindings.get(&key).copied()
    }

    fn is_movement(&self, key: Key) -> bool {
        matches!(self.command(key), Some(GameCommand::MovePlayer(_)))
    }

    /// The direction of the movement key that should drive the player right now.
    pub fn held_direction(&self) -> Option<Direction> {
        self.held.last().and_then(|key| match self.command(*key) {
            Some(GameCommand::MovePlayer(direction)) => Some(direction),
            _ => None,
        })
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

/// Turns one tick's worth of raw events into game events.
///
/// Movement keys keep emitting their command every tick while held. Among keys
/// pressed in the same batch, vertical ones take priority.
pub fn process_key_events(bindings: &mut Bindings, events: &[KeyEvent]) -> Vec<GameEvent> {
    let mut out = Vec::new();
    let mut pressed: SmallVec<[Key; 4]> = SmallVec::new();

    for event in events {
        match *event {
            KeyEvent::Down(key) => {
                if bindings.is_movement(key) {
                    bindings.held.retain(|held| *held != key);
                    pressed.push(key);
                } else if let Some(command) = bindings.command(key) {
                    out.push(GameEvent::Command(command));
                }
            }
            KeyEvent::Up(key) => {
                bindings.held.retain(|held| *held != key);
                pressed.retain(|held| *held != key);
            }
            KeyEvent::Text(character) => out.push(GameEvent::Text(character)),
            KeyEvent::Quit => out.push(GameCommand::Exit.into()),
        }
    }

    pressed.sort_by_key(|key| match bindings.command(*key) {
        Some(GameCommand::MovePlayer(direction)) => direction.is_vertical(),
        _ => false,
    });
    bindings.held.extend(pressed);

    if let Some(direction) = bindings.held_direction() {
        out.push(GameEvent::Command(GameCommand::MovePlayer(direction)));
    }
    out
}

pub fn input_system(mut bindings: ResMut<Bindings>, mut pending: ResMut<PendingInput>, mut writer: EventWriter<GameEvent>) {
    let events = std::mem::take(&mut pending.0);
    for event in process_key_events(&mut bindings, &events) {
        writer.write(event);
    }
}
