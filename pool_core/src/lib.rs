//! Pool core game engine - 2D eight-ball physics and rules

pub mod ai;
pub mod error;
pub mod game;
pub mod geometry;
pub mod physics;
pub mod rack;
pub mod rules;
pub mod types;

// WASM bridge module - only compiled when wasm feature is enabled
#[cfg(feature = "wasm")]
pub mod wasm;

pub use ai::{AiPlanner, ShotPlan};
pub use error::{ConfigError, PlacementError, ShotError};
pub use game::Game;
pub use physics::{Physics, ShotPrediction};
pub use rules::{check_win_condition, judge_shot, Judgement, ShotRecord, TurnState};
pub use types::*;
