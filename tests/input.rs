use std::str::FromStr;

use pretty_assertions::assert_eq;
use sagewalk::game::events::{GameCommand, GameEvent};
use sagewalk::input::{process_key_events, Bindings, Key, KeyEvent};
use sagewalk::map::direction::Direction;
use speculoos::prelude::*;

fn moves(events: &[GameEvent]) -> Vec<Direction> {
    events
        .iter()
        .filter_map(|event| match event {
            GameEvent::Command(GameCommand::MovePlayer(direction)) => Some(*direction),
            _ => None,
        })
        .collect()
}

#[test]
fn test_key_bindings() {
    let bindings = Bindings::default();
    let cases = [
        (Key::Up, GameCommand::MovePlayer(Direction::Up)),
        (Key::W, GameCommand::MovePlayer(Direction::Up)),
        (Key::S, GameCommand::MovePlayer(Direction::Down)),
        (Key::A, GameCommand::MovePlayer(Direction::Left)),
        (Key::Right, GameCommand::MovePlayer(Direction::Right)),
        (Key::E, GameCommand::Talk),
        (Key::Q, GameCommand::Dismiss),
        (Key::Enter, GameCommand::Confirm),
        (Key::Escape, GameCommand::Escape),
        (Key::U, GameCommand::ReloadMap),
        (Key::F1, GameCommand::DebugPoint),
    ];
    for (key, command) in cases {
        assert_eq!(bindings.command(key), Some(command), "binding for {key}");
    }
}

#[test]
fn test_held_key_moves_every_tick() {
    let mut bindings = Bindings::default();

    let first = process_key_events(&mut bindings, &[KeyEvent::Down(Key::Left)]);
    assert_eq!(moves(&first), vec![Direction::Left]);

    for _ in 0..3 {
        let held = process_key_events(&mut bindings, &[]);
        assert_eq!(moves(&held), vec![Direction::Left]);
    }

    let released = process_key_events(&mut bindings, &[KeyEvent::Up(Key::Left)]);
    assert_that(&moves(&released).is_empty()).is_true();
}

#[test]
fn test_vertical_wins_within_one_batch() {
    let mut bindings = Bindings::default();
    let events = process_key_events(&mut bindings, &[KeyEvent::Down(Key::Down), KeyEvent::Down(Key::Right)]);
    assert_eq!(moves(&events), vec![Direction::Down]);
}

#[test]
fn test_latest_press_wins_across_ticks() {
    let mut bindings = Bindings::default();
    process_key_events(&mut bindings, &[KeyEvent::Down(Key::Up)]);
    let events = process_key_events(&mut bindings, &[KeyEvent::Down(Key::D)]);
    assert_eq!(moves(&events), vec![Direction::Right]);

    let events = process_key_events(&mut bindings, &[KeyEvent::Up(Key::D)]);
    assert_eq!(moves(&events), vec![Direction::Up]);
}

#[test]
fn test_text_and_quit_pass_through() {
    let mut bindings = Bindings::default();
    let events = process_key_events(
        &mut bindings,
        &[KeyEvent::Text('h'), KeyEvent::Down(Key::E), KeyEvent::Quit],
    );
    assert_eq!(
        events,
        vec![
            GameEvent::Text('h'),
            GameEvent::Command(GameCommand::Talk),
            GameEvent::Command(GameCommand::Exit),
        ]
    );
}

#[test]
fn test_release_all_stops_movement() {
    let mut bindings = Bindings::default();
    process_key_events(&mut bindings, &[KeyEvent::Down(Key::W)]);
    bindings.release_all();
    assert_that(&bindings.held_direction()).is_none();
}

#[test]
fn test_key_names_parse() {
    assert_eq!(Key::from_str("escape"), Ok(Key::Escape));
    assert_eq!(Key::from_str("F1"), Ok(Key::F1));
    assert_that(&Key::from_str("Tab").is_err()).is_true();
}
