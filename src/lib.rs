//! Headless runtime for a tile-based exploration game.

pub mod app;
pub mod asset;
pub mod chat;
pub mod collectibles;
pub mod constants;
pub mod error;
pub mod formatter;
pub mod game;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod map;
pub mod minigame;
pub mod movement;
pub mod quiz;
pub mod services;
