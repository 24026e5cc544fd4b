//! WASM bridge module for JavaScript interop

use crate::{Config, Game, Vec2};
use wasm_bindgen::prelude::*;

/// Parse a JSON config. Empty input means defaults; malformed input is an
/// error rather than a silent fallback.
fn parse_config(config_json: &str) -> Result<Config, String> {
    if config_json.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_json::from_str(config_json).map_err(|e| format!("invalid config JSON: {}", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize: {}", e);
            "null".to_string()
        }
    }
}

/// WASM-compatible wrapper around the core Game engine
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

impl WasmGame {
    fn from_json(config_json: &str) -> Result<WasmGame, String> {
        let config = parse_config(config_json)?;
        let game = Game::new(config).map_err(|e| e.to_string())?;
        log::info!("WasmGame created at {} Hz", game.config.tick_hz);
        Ok(WasmGame { inner: game })
    }
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game instance from JSON configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: String) -> Result<WasmGame, JsValue> {
        Self::from_json(&config_json).map_err(|e| JsValue::from_str(&e))
    }

    /// Step the game forward one tick.
    /// Returns the JSON array of events produced by this tick.
    pub fn step(&mut self) -> String {
        let events = self.inner.step();
        to_json(&events)
    }

    /// Get the current game view as JSON string
    pub fn view_json(&self) -> String {
        to_json(&self.inner.view())
    }

    /// Aim guide for the current cue as JSON (`null` when unavailable)
    pub fn prediction_json(&self) -> String {
        to_json(&self.inner.predict())
    }

    pub fn set_aim(&mut self, angle: f32, power: f32) {
        self.inner.set_aim(angle, power);
    }

    pub fn aim_from_pointer(&mut self, x: f32, y: f32) {
        self.inner.aim_from_pointer(Vec2::new(x, y));
    }

    /// Start the cue swing; rejects with a readable reason
    pub fn release_shot(&mut self) -> Result<(), JsValue> {
        self.inner
            .release_shot()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Place the cue ball during ball in hand; rejects with a readable reason
    pub fn place_cue_ball(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner
            .place_cue_ball(Vec2::new(x, y))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Reset the game to initial state (useful for rematch)
    pub fn reset_match(&mut self) {
        self.inner.reset_match();
        log::info!("Game reset for new match");
    }

    /// Get the current tick number
    pub fn get_tick(&self) -> u32 {
        self.inner.tick
    }

    pub fn is_ai_turn(&self) -> bool {
        self.inner.is_ai_turn()
    }

    /// Get a human-readable status string
    pub fn status_string(&self) -> String {
        self.inner.status_string().to_string()
    }
}

// Additional helper functions for WASM integration

/// Create a default config as JSON string (utility for JavaScript)
#[wasm_bindgen]
pub fn default_config_json() -> String {
    let config = Config::default();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => json,
        Err(_) => "{}".to_string(),
    }
}

/// Initialize WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Pool WASM module initialized");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, Event, GameMode, Player};

    #[test]
    fn test_wasm_game_creation() {
        let game = WasmGame::from_json("{}").unwrap();
        assert_eq!(game.get_tick(), 0);
        assert!(!game.is_ai_turn());
        assert_eq!(game.status_string(), "Aiming");
    }

    #[test]
    fn test_partial_config_json() {
        let config = parse_config(r#"{"mode": "vs-ai", "difficulty": "hard", "seed": 7}"#).unwrap();
        assert_eq!(config.mode, GameMode::VsAi);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.seed, 7);
        assert_eq!(config.table, Config::default().table);
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        assert!(parse_config("{not json").is_err());
        assert!(parse_config(r#"{"difficulty": "medium"}"#).is_err());
        assert!(WasmGame::from_json(r#"{"tick_hz": 0}"#).is_err());
    }

    #[test]
    fn test_wasm_game_step() {
        let mut game = WasmGame::from_json("").unwrap();
        game.set_aim(0.0, 80.0);
        game.inner.release_shot().unwrap();

        let mut released = false;
        for _ in 0..10 {
            let events: Vec<Event> = serde_json::from_str(&game.step()).unwrap();
            released |= events
                .iter()
                .any(|e| matches!(e, Event::ShotReleased { player: Player::One, .. }));
        }

        assert!(released);
        assert_eq!(game.get_tick(), 10);
    }

    #[test]
    fn test_view_json_serialization() {
        let game = WasmGame::from_json("{}").unwrap();
        let json = game.view_json();

        // Should be deserializable
        let view: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(view.get("tick").is_some());
        assert!(view.get("phase").is_some());
        assert_eq!(view["balls"].as_array().map(|b| b.len()), Some(16));
    }

    #[test]
    fn test_prediction_json() {
        let mut game = WasmGame::from_json("{}").unwrap();
        game.set_aim(0.0, 60.0);

        let prediction: serde_json::Value = serde_json::from_str(&game.prediction_json()).unwrap();
        assert!(prediction.get("contact").is_some());
    }

    #[test]
    fn test_default_config_json() {
        let json = default_config_json();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, Config::default());
    }
}
