//! Per-tick systems. Ordering is fixed by the schedule built in [`crate::game::Game::new`].

use bevy_ecs::event::EventReader;
use bevy_ecs::system::{Res, ResMut, SystemParam};
use glam::UVec2;
use tracing::{debug, info, warn};

use crate::chat::ChatSession;
use crate::collectibles::{Collectibles, PickupEffect, PickupOdds};
use crate::constants::{minigame, MAIN_MAP, PLAYER_SPEED, WIZARD_HOUSE_MAP};
use crate::game::events::{GameCommand, GameEvent};
use crate::game::state::{GameMode, ModeArbiter};
use crate::game::{Clock, GameRng, GlobalState, Player, WorldSize};
use crate::input::Bindings;
use crate::interaction::wizard::WIZARD_ID;
use crate::interaction::{Interactable, InteractionManager, InteractionResponse, NpcContext, TalkContext};
use crate::map::manager::{MapManager, SpriteCollection, SwitchContext};
use crate::minigame::{MinigameEngine, MinigameOutcome, MinigamePhase};
use crate::movement;
use crate::quiz::{QuizOutcome, QuizSession, QuizStage};
use crate::services::progress::PlayerProgress;
use crate::services::{ProgressStore, Services};

/// Distance below the wizard's circle where the player lands when leaving his house.
const HOUSE_EXIT_OFFSET: f32 = 100.0;

/// The resources a map switch rewrites, borrowed together.
#[derive(SystemParam)]
pub struct MapAccess<'w> {
    pub maps: ResMut<'w, MapManager>,
    pub interactions: ResMut<'w, InteractionManager>,
    pub sprites: ResMut<'w, SpriteCollection>,
    pub player: ResMut<'w, Player>,
    pub world_size: ResMut<'w, WorldSize>,
}

impl MapAccess<'_> {
    fn with_switch<R>(
        &mut self,
        f: impl FnOnce(&mut MapManager, &mut SwitchContext<'_>, &mut dyn FnMut(UVec2)) -> R,
    ) -> R {
        let Self {
            maps,
            interactions,
            sprites,
            player,
            world_size,
        } = self;
        let mut ctx = SwitchContext {
            player: &mut player.rect,
            sprites: &mut **sprites,
            interactions: &mut **interactions,
        };
        f(&mut **maps, &mut ctx, &mut |size: UVec2| world_size.0 = size)
    }

    pub fn switch_map(&mut self, name: &str) -> bool {
        self.with_switch(|maps, ctx, on_dimensions| maps.switch_map(name, ctx, on_dimensions))
    }

    pub fn switch_to_minigame(&mut self) -> bool {
        self.with_switch(|maps, ctx, on_dimensions| maps.switch_to_minigame(ctx, on_dimensions))
    }

    pub fn return_from_minigame(&mut self) -> bool {
        self.with_switch(|maps, ctx, on_dimensions| maps.return_from_minigame(ctx, on_dimensions))
    }

    /// Re-reads the active map. A failed reload keeps the current one.
    pub fn reload(&mut self) -> bool {
        self.with_switch(|maps, ctx, on_dimensions| maps.refresh_active_map_after_reload(ctx, on_dimensions))
            .is_ok()
    }

    /// Puts the player just south of the wizard's circle, if he is on this map.
    fn place_below_wizard(&mut self) {
        let Some(wizard) = self.interactions.get(WIZARD_ID) else {
            return;
        };
        let properties = wizard.properties();
        let bottom = (properties.center.y + properties.radius + HOUSE_EXIT_OFFSET) as i32;
        let rect = &mut self.player.rect;
        rect.x = properties.center.x as i32 - rect.w / 2;
        rect.y = bottom - rect.h;
    }
}

/// Player progress plus the store it is written back to after every change.
#[derive(SystemParam)]
pub struct ProgressAccess<'w> {
    pub progress: ResMut<'w, PlayerProgress>,
    store: Res<'w, ProgressStore>,
}

impl ProgressAccess<'_> {
    pub fn save(&self) {
        self.store.save(&self.progress);
    }

    pub fn grant(&mut self, amount: u32) {
        self.progress.grant(amount);
        info!(amount, total = self.progress.points, "Wisdom points granted");
        self.save();
    }

    pub fn penalize(&mut self, amount: u32) {
        self.progress.penalize(amount);
        info!(amount, total = self.progress.points, "Wisdom points lost");
        self.save();
    }
}

/// Restarts the popup typewriter with the object's current text.
fn show_dialogue(arbiter: &mut ModeArbiter, object: &dyn Interactable, now: u64) {
    let text = match object.custom_display() {
        Some(display) if display.needs_custom_display() => display.display_message(),
        _ => object.properties().message,
    };
    arbiter.typewriter.restart(text, now);
    arbiter.secondary = object.secondary_prompt().map(str::to_string);
}

pub fn poll_fetches_system(mut interactions: ResMut<InteractionManager>, mut chat: ResMut<ChatSession>) {
    for object in interactions.iter_mut() {
        object.poll();
    }
    chat.poll();
}

#[allow(clippy::too_many_arguments)]
pub fn command_system(
    mut events: EventReader<GameEvent>,
    clock: Res<Clock>,
    services: Res<Services>,
    mut rng: ResMut<GameRng>,
    mut arbiter: ResMut<ModeArbiter>,
    mut access: MapAccess,
    mut progress: ProgressAccess,
    mut quiz: ResMut<QuizSession>,
    mut chat: ResMut<ChatSession>,
    mut bindings: ResMut<Bindings>,
    mut state: ResMut<GlobalState>,
) {
    let now = clock.now;

    for event in events.read() {
        let command = match *event {
            GameEvent::Text(character) => {
                match arbiter.mode() {
                    GameMode::Quiz => quiz.type_char(character),
                    GameMode::Chat => chat.type_char(character),
                    _ => {}
                }
                continue;
            }
            GameEvent::Command(command) => command,
        };

        if arbiter.captures_text() && matches!(command, GameCommand::ReloadMap | GameCommand::DebugPoint) {
            continue;
        }

        match command {
            GameCommand::MovePlayer(_) => {}
            GameCommand::Talk | GameCommand::Dismiss if arbiter.accepts_talk() => {
                let outcome = access.interactions.eligible_mut().map(|object| {
                    let response = if command == GameCommand::Talk {
                        let mut ctx = TalkContext {
                            progress: &mut *progress.progress,
                            now,
                            rng: &mut rng.0,
                        };
                        object.talk(&mut ctx)
                    } else {
                        object.dismiss()
                    };
                    (object.id().to_string(), response)
                });
                let Some((id, response)) = outcome else {
                    continue;
                };
                debug!(id = %id, ?response, "Interaction response");
                apply_response(&id, response, now, &mut arbiter, &mut access, &mut progress, &mut chat);
            }
            GameCommand::Talk | GameCommand::Dismiss => {}
            GameCommand::Confirm => match arbiter.mode() {
                GameMode::Quiz => match quiz.stage() {
                    Some(QuizStage::Answering) => {
                        quiz.submit(&services.text);
                    }
                    Some(QuizStage::Result { .. }) => quiz.confirm(),
                    _ => {}
                },
                GameMode::Chat => {
                    chat.submit(&services.text);
                }
                _ => {}
            },
            GameCommand::Escape => match arbiter.mode() {
                GameMode::Quiz => quiz.close(),
                GameMode::Chat => chat.close(),
                _ => {
                    if arbiter.toggle_settings() {
                        bindings.release_all();
                    }
                }
            },
            GameCommand::Backspace => match arbiter.mode() {
                GameMode::Quiz => quiz.backspace(),
                GameMode::Chat => chat.backspace(),
                _ => {}
            },
            GameCommand::ReloadMap => {
                if matches!(arbiter.mode(), GameMode::Minigame | GameMode::Quiz) {
                    warn!("Map reload ignored while a quiz or minigame is running");
                } else if access.reload() && arbiter.dialogue_id().is_some() {
                    arbiter.set_mode(GameMode::Exploring);
                }
            }
            GameCommand::DebugPoint => progress.grant(1),
            GameCommand::Exit => {
                info!("Exit requested");
                state.exit = true;
            }
        }
    }
}

fn apply_response(
    id: &str,
    response: InteractionResponse,
    now: u64,
    arbiter: &mut ModeArbiter,
    access: &mut MapAccess<'_>,
    progress: &mut ProgressAccess<'_>,
    chat: &mut ChatSession,
) {
    match response {
        InteractionResponse::Continue => {
            if let Some(object) = access.interactions.get(id) {
                show_dialogue(arbiter, object, now);
            }
        }
        InteractionResponse::QuoteGranted(quote) => {
            debug!(quote, "Quote unlocked");
            progress.save();
            if let Some(object) = access.interactions.get(id) {
                show_dialogue(arbiter, object, now);
            }
        }
        InteractionResponse::Popup { text, duration_ms } => arbiter.show_popup(text, now, duration_ms),
        InteractionResponse::Close => {
            access.interactions.set_flag(id, true);
            arbiter.set_mode(GameMode::Exploring);
        }
        InteractionResponse::StartChat => {
            access.interactions.set_flag(id, true);
            chat.start();
            arbiter.set_mode(GameMode::Chat);
        }
        InteractionResponse::SwitchMap(target) => {
            access.interactions.set_flag(id, true);
            arbiter.set_mode(GameMode::Exploring);
            let leaving_house = access.maps.current_name() == WIZARD_HOUSE_MAP;
            if access.switch_map(&target) && leaving_house && target == MAIN_MAP {
                access.place_below_wizard();
            }
        }
    }
}

pub fn player_movement_system(
    mut events: EventReader<GameEvent>,
    arbiter: Res<ModeArbiter>,
    engine: Res<MinigameEngine>,
    maps: Res<MapManager>,
    world_size: Res<WorldSize>,
    mut player: ResMut<Player>,
) {
    let direction = events
        .read()
        .filter_map(|event| match event {
            GameEvent::Command(GameCommand::MovePlayer(direction)) => Some(*direction),
            _ => None,
        })
        .last();
    let Some(direction) = direction else {
        return;
    };

    if !arbiter.can_player_move() {
        return;
    }
    if *arbiter.mode() == GameMode::Minigame && engine.phase() != MinigamePhase::Active {
        return;
    }

    player.facing = direction;
    let delta = direction.as_ivec2() * PLAYER_SPEED;
    if let Some(moved) = movement::try_move(player.rect, delta, world_size.0, |x, y| maps.can_move(x, y)) {
        player.rect = moved;
    }
}

#[allow(clippy::too_many_arguments)]
pub fn collectible_system(
    clock: Res<Clock>,
    services: Res<Services>,
    odds: Res<PickupOdds>,
    mut rng: ResMut<GameRng>,
    mut arbiter: ResMut<ModeArbiter>,
    mut access: MapAccess,
    mut collectibles: ResMut<Collectibles>,
    mut engine: ResMut<MinigameEngine>,
    mut quiz: ResMut<QuizSession>,
    mut progress: ProgressAccess,
) {
    if !access.maps.is_exterior() {
        return;
    }
    let now = clock.now;
    let map = access.maps.current_name().to_string();
    let tiles = access.maps.current().collectibles.clone();
    if tiles.is_empty() {
        return;
    }
    collectibles.respawn(&map, &tiles, now);

    if *arbiter.mode() != GameMode::Exploring {
        return;
    }
    let tile = access.player.pickup_point() / access.maps.current().tile_size() as i32;
    if !collectibles.collect(&map, &tiles, tile, now) {
        return;
    }

    match PickupEffect::roll(&odds, &mut rng.0) {
        PickupEffect::Quiz { reward } => {
            if quiz.start(reward, &*services.store, &mut rng.0) {
                arbiter.set_mode(GameMode::Quiz);
            } else {
                warn!("Quiz could not start, item consumed");
            }
        }
        PickupEffect::Minigame { reward } => {
            if access.switch_to_minigame() {
                engine.start(reward, access.player.rect, access.maps.collision(), now, &mut rng.0);
                arbiter.set_mode(GameMode::Minigame);
            }
        }
        PickupEffect::Points(amount) => progress.grant(amount),
    }
}

pub fn npc_system(
    clock: Res<Clock>,
    mut rng: ResMut<GameRng>,
    maps: Res<MapManager>,
    world_size: Res<WorldSize>,
    player: Res<Player>,
    mut interactions: ResMut<InteractionManager>,
) {
    let mut ctx = NpcContext {
        now: clock.now,
        world: world_size.0,
        collision: maps.collision(),
        player: player.rect,
        rng: &mut rng.0,
    };
    for object in interactions.iter_mut() {
        object.tick(&mut ctx);
    }
}

pub fn minigame_system(
    clock: Res<Clock>,
    mut rng: ResMut<GameRng>,
    mut engine: ResMut<MinigameEngine>,
    mut arbiter: ResMut<ModeArbiter>,
    mut access: MapAccess,
    mut progress: ProgressAccess,
) {
    if !engine.is_active() {
        return;
    }
    let outcome = engine.update(
        access.player.rect,
        access.world_size.0,
        access.maps.collision(),
        clock.now,
        &mut rng.0,
    );
    let Some(outcome) = outcome else {
        return;
    };

    match outcome {
        MinigameOutcome::Success { reward } => progress.grant(reward),
        MinigameOutcome::Failure => progress.penalize(minigame::DEATH_PENALTY),
    }
    access.return_from_minigame();
    arbiter.set_mode(GameMode::Exploring);
}

/// Keeps the eligible interactable and the dialogue popup in step.
pub fn interaction_system(
    clock: Res<Clock>,
    player: Res<Player>,
    mut interactions: ResMut<InteractionManager>,
    mut arbiter: ResMut<ModeArbiter>,
) {
    if !matches!(arbiter.mode(), GameMode::Exploring | GameMode::Dialogue { .. }) {
        return;
    }
    interactions.update(player.rect.center_f32());

    let Some(id) = interactions.eligible_id().map(str::to_string) else {
        if arbiter.dialogue_id().is_some() {
            debug!("Popup hidden, no eligible interactable");
            arbiter.set_mode(GameMode::Exploring);
        }
        return;
    };

    if arbiter.dialogue_id() != Some(id.as_str()) {
        debug!(id = %id, "Player entered an interaction circle");
        arbiter.set_mode(GameMode::Dialogue { id });
        if let Some(object) = interactions.eligible() {
            show_dialogue(&mut arbiter, object, clock.now);
        }
    }

    if let Some(object) = interactions.eligible_mut() {
        if object.take_new_message() {
            show_dialogue(&mut arbiter, &**object, clock.now);
        }
    }
}

/// Hands control back to exploration once a quiz or chat has closed.
pub fn session_system(
    mut quiz: ResMut<QuizSession>,
    chat: Res<ChatSession>,
    mut arbiter: ResMut<ModeArbiter>,
    mut progress: ProgressAccess,
) {
    match quiz.poll() {
        Some(QuizOutcome::Passed { reward }) => progress.grant(reward),
        Some(QuizOutcome::Failed) => debug!("Quiz failed, no points awarded"),
        None => {}
    }

    let finished = match arbiter.mode() {
        GameMode::Quiz => !quiz.is_active(),
        GameMode::Chat => !chat.is_active(),
        _ => false,
    };
    if finished {
        arbiter.set_mode(GameMode::Exploring);
    }
}

pub fn presentation_system(clock: Res<Clock>, interactions: Res<InteractionManager>, mut arbiter: ResMut<ModeArbiter>) {
    arbiter.typewriter.advance(clock.now);

    let custom = arbiter
        .dialogue_id()
        .and_then(|id| interactions.get(id))
        .and_then(|object| object.custom_display())
        .filter(|display| display.needs_custom_typing())
        .map(|display| display.typing_message(arbiter.typewriter.shown()));
    arbiter.typewriter.set_revealed(custom);

    arbiter.expire_popups(clock.now);
}
