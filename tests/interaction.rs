use std::sync::Arc;

use glam::Vec2;
use pretty_assertions::assert_eq;
use sagewalk::constants::{mysterious, naval, wizard, WIZARD_HOUSE_MAP};
use sagewalk::error::InteractionError;
use sagewalk::interaction::{
    Interactable, InteractionManager, InteractionResponse, MysteriousRect, NavalNpc, TalkContext, TalkState, Wizard, Zone,
};
use sagewalk::map::record::ZoneAction;
use sagewalk::services::progress::PlayerProgress;
use speculoos::prelude::*;

mod common;

fn zone(id: &str, center: Vec2, radius: f32) -> Box<dyn Interactable> {
    Box::new(Zone::new(id, center, radius, "hello", ZoneAction::Close, ZoneAction::Close))
}

/// Offset from `center` along +x by `distance`.
fn at(center: Vec2, distance: f32) -> Vec2 {
    center + Vec2::new(distance, 0.0)
}

#[test]
fn test_first_registered_wins_when_circles_overlap() {
    let center = Vec2::new(200.0, 200.0);
    let mut manager = InteractionManager::new();
    manager.add(zone("first", center, 50.0)).unwrap();
    manager.add(zone("second", center, 50.0)).unwrap();

    manager.update(center);
    assert_that(&manager.eligible_id()).is_equal_to(Some("first"));

    manager.set_flag("first", true);
    manager.update(center);
    assert_that(&manager.eligible_id()).is_equal_to(Some("second"));
}

#[test]
fn test_at_most_one_eligible() {
    let mut manager = InteractionManager::new();
    for index in 0..4 {
        manager.add(zone(&format!("zone_{index}"), Vec2::new(100.0, 100.0), 60.0)).unwrap();
    }
    manager.update(Vec2::new(110.0, 100.0));
    assert_that(&manager.eligible().is_some()).is_true();
    assert_eq!(manager.eligible_id(), Some("zone_0"));
}

#[test]
fn test_flag_resets_only_past_the_buffer() {
    let center = Vec2::new(500.0, 500.0);
    let mut manager = InteractionManager::new();
    manager.add(zone("well", center, 30.0)).unwrap();

    manager.update(at(center, 29.0));
    assert_eq!(manager.eligible_id(), Some("well"));

    manager.set_flag("well", true);
    assert_that(&manager.eligible_id()).is_none();

    manager.update(at(center, 31.0));
    assert_that(&manager.get_flag("well")).is_true();

    manager.update(at(center, 29.0));
    assert_that(&manager.eligible_id()).is_none();

    manager.update(at(center, 33.0));
    assert_that(&manager.get_flag("well")).is_false();

    manager.update(at(center, 29.0));
    assert_eq!(manager.eligible_id(), Some("well"));
}

#[test]
fn test_unknown_id_reports_interacted() {
    let manager = InteractionManager::new();
    assert_that(&manager.get_flag("nobody")).is_true();
}

#[test]
fn test_invalid_objects_are_rejected() {
    let mut manager = InteractionManager::new();
    manager.add(zone("gate", Vec2::ZERO, 10.0)).unwrap();

    assert_eq!(
        manager.add(zone("gate", Vec2::ONE, 20.0)),
        Err(InteractionError::DuplicateId("gate".to_string()))
    );
    assert_eq!(manager.add(zone("", Vec2::ZERO, 10.0)), Err(InteractionError::EmptyId));
    assert_that(&matches!(
        manager.add(zone("flat", Vec2::ZERO, 0.0)),
        Err(InteractionError::InvalidRadius { .. })
    ))
    .is_true();
    assert_that(&manager.add(zone("nan", Vec2::ZERO, f32::NAN)).is_err()).is_true();
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_removing_the_eligible_object_clears_it() {
    let mut manager = InteractionManager::new();
    manager.add(zone("far", Vec2::new(1000.0, 0.0), 10.0)).unwrap();
    manager.add(zone("near", Vec2::ZERO, 10.0)).unwrap();
    manager.update(Vec2::ZERO);
    assert_eq!(manager.eligible_id(), Some("near"));

    let removed = manager.remove("near");
    assert_that(&removed.is_some()).is_true();
    assert_that(&manager.eligible_id()).is_none();
    assert_that(&manager.remove("near").is_none()).is_true();
    assert_that(&manager.contains("far")).is_true();
}

#[test]
fn test_wizard_tells_a_joke_then_offers_the_house() {
    let mut wizard = Wizard::new(100, 100, None, common::canned(&["Abracadabra!"]));
    let mut progress = PlayerProgress::default();
    let mut rng = common::rng(1);
    let mut ctx = TalkContext {
        progress: &mut progress,
        now: 0,
        rng: &mut rng,
    };

    assert_eq!(wizard.talk(&mut ctx), InteractionResponse::Continue);
    assert_eq!(wizard.state(), TalkState::Thinking);
    assert_eq!(wizard.properties().message, wizard::THINKING);
    assert_that(&wizard.take_new_message()).is_true();

    assert_that(&common::wait_until(|| {
        wizard.poll();
        wizard.state() == TalkState::Displayed
    }))
    .is_true();
    assert_eq!(wizard.properties().message, "Abracadabra!");
    assert_that(&wizard.take_new_message()).is_true();
    assert_eq!(wizard.secondary_prompt(), Some(wizard::PROMPT_VISIT_OR_LEAVE));

    assert_eq!(
        wizard.talk(&mut ctx),
        InteractionResponse::SwitchMap(WIZARD_HOUSE_MAP.to_string())
    );
    assert_eq!(wizard.state(), TalkState::Idle);
    assert_eq!(wizard.properties().message, wizard::PROMPT_TALK);
}

#[test]
fn test_wizard_falls_back_when_text_service_fails() {
    let mut wizard = Wizard::new(0, 0, None, Arc::new(common::FailingText));
    let mut progress = PlayerProgress::default();
    let mut rng = common::rng(2);
    wizard.talk(&mut TalkContext {
        progress: &mut progress,
        now: 0,
        rng: &mut rng,
    });

    assert_that(&common::wait_until(|| {
        wizard.poll();
        !wizard.is_fetching()
    }))
    .is_true();
    assert_eq!(wizard.properties().message, wizard::FALLBACK);
}

#[test]
fn test_naval_refuses_without_enough_points() {
    let mut naval = NavalNpc::new(0, 0, None, common::canned(&["Seek wealth, not money."]));
    let mut progress = PlayerProgress::with_points(3);
    let mut rng = common::rng(3);

    let response = naval.talk(&mut TalkContext {
        progress: &mut progress,
        now: 0,
        rng: &mut rng,
    });

    assert_eq!(
        response,
        InteractionResponse::Popup {
            text: naval::INSUFFICIENT.to_string(),
            duration_ms: naval::INSUFFICIENT_POPUP_MS,
        }
    );
    assert_eq!(progress.points, 3);
    assert_that(&progress.unlocked_quotes.is_empty()).is_true();
    assert_eq!(naval.state(), TalkState::Idle);
}

#[test]
fn test_naval_sells_a_quote_for_five_points() {
    let mut naval = NavalNpc::new(0, 0, None, common::canned(&["Seek wealth, not money."]));
    let mut progress = PlayerProgress::with_points(5);
    let mut rng = common::rng(4);

    let response = naval.talk(&mut TalkContext {
        progress: &mut progress,
        now: 0,
        rng: &mut rng,
    });

    let quote = match response {
        InteractionResponse::QuoteGranted(quote) => quote,
        other => panic!("expected a quote, got {other:?}"),
    };
    assert_eq!(progress.points, 0);
    assert_that(&progress.unlocked_quotes.contains(&quote)).is_true();
    assert_that(&naval::QUOTE_IDS.contains(&quote)).is_true();

    assert_that(&common::wait_until(|| {
        naval.poll();
        naval.state() == TalkState::Displayed
    }))
    .is_true();
    assert_eq!(naval.properties().message, "Seek wealth, not money.");
}

#[test]
fn test_naval_with_every_quote_unlocked_charges_nothing() {
    let mut naval = NavalNpc::new(0, 0, None, common::canned(&["unused"]));
    let mut progress = PlayerProgress::with_points(50);
    for quote in naval::QUOTE_IDS {
        progress.unlock_quote(quote);
    }
    let mut rng = common::rng(5);

    let response = naval.talk(&mut TalkContext {
        progress: &mut progress,
        now: 0,
        rng: &mut rng,
    });

    assert_eq!(response, InteractionResponse::Continue);
    assert_eq!(progress.points, 50);
    assert_eq!(naval.properties().message, naval::ALL_UNLOCKED);
}

#[test]
fn test_rectangle_frames_the_question() {
    let mut rect = MysteriousRect::new(10, 20, None, common::canned(&["  What is time?  "]));
    assert_eq!(rect.id(), "mysterious_rect_10_20");
    let mut progress = PlayerProgress::default();
    let mut rng = common::rng(6);

    rect.talk(&mut TalkContext {
        progress: &mut progress,
        now: 0,
        rng: &mut rng,
    });
    assert_that(&common::wait_until(|| {
        rect.poll();
        rect.state() == TalkState::Displayed
    }))
    .is_true();

    assert_eq!(rect.properties().message, "The rectangle asks:\n\"What is time?\"");
    assert_eq!(rect.dismiss(), InteractionResponse::Close);
    assert_eq!(rect.properties().message, mysterious::PROMPT_TALK);
}

#[test]
fn test_rectangle_reports_an_empty_reply_as_lost() {
    let mut rect = MysteriousRect::new(0, 0, None, common::canned(&["   "]));
    let mut progress = PlayerProgress::default();
    let mut rng = common::rng(7);

    rect.talk(&mut TalkContext {
        progress: &mut progress,
        now: 0,
        rng: &mut rng,
    });
    assert_that(&common::wait_until(|| {
        rect.poll();
        rect.state() == TalkState::Displayed
    }))
    .is_true();
    assert_eq!(rect.properties().message, mysterious::LOST);
}

#[test]
fn test_zone_maps_actions_to_responses() {
    let mut exit = Zone::new(
        "exit",
        Vec2::ZERO,
        40.0,
        "Leave?",
        ZoneAction::StartChat,
        ZoneAction::SwitchMap {
            target: "main_map".to_string(),
        },
    );
    let mut progress = PlayerProgress::default();
    let mut rng = common::rng(8);

    assert_eq!(
        exit.talk(&mut TalkContext {
            progress: &mut progress,
            now: 0,
            rng: &mut rng,
        }),
        InteractionResponse::StartChat
    );
    assert_eq!(exit.dismiss(), InteractionResponse::SwitchMap("main_map".to_string()));
}

#[test]
fn test_text_backed_npcs_format_for_logs() {
    let text = common::canned(&["Hello there."]);
    let registered: Vec<Box<dyn Interactable>> = vec![
        Box::new(Wizard::new(100, 100, None, Arc::clone(&text))),
        Box::new(NavalNpc::new(300, 300, None, Arc::clone(&text))),
        Box::new(MysteriousRect::new(500, 500, None, text)),
    ];

    let formatted: Vec<String> = registered.iter().map(|object| format!("{object:?}")).collect();
    assert_that(&formatted[0]).starts_with("Wizard {");
    assert_that(&formatted[1]).contains("naval_npc_300_300");
    assert_that(&formatted[2]).contains("mysterious_rect_500_500");
    assert_that(&formatted.iter().all(|line| line.ends_with(".. }"))).is_true();
}
