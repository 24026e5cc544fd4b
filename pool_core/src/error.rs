//! Error types for configuration and rejected player actions.

use thiserror::Error;

/// Configuration problems, reported once at session start
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown game mode '{0}' (expected 'pvp' or 'vs-ai')")]
    UnknownMode(String),

    #[error("unknown AI difficulty '{0}' (expected 'easy' or 'hard')")]
    UnknownDifficulty(String),

    #[error("unknown rule set '{0}' (expected 'strict' or 'casual')")]
    UnknownRuleSet(String),

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("player {0} has an empty name")]
    EmptyPlayerName(usize),

    #[error("tick rate must be positive")]
    InvalidTickRate,
}

/// Why a ball-in-hand placement was refused. The game state is unchanged.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("the cue ball is not in hand")]
    NotInHand,

    #[error("placement is outside the playing area")]
    OutOfBounds,

    #[error("placement is inside a pocket")]
    InPocket,

    #[error("placement overlaps ball {0}")]
    Overlap(u8),

    #[error("it is the computer's turn")]
    AiTurn,
}

/// Why a shot could not be released
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum ShotError {
    #[error("a shot is already in progress")]
    InProgress,

    #[error("the cue ball is still moving")]
    BallMoving,

    #[error("the cue ball must be placed first")]
    BallInHand,

    #[error("it is the computer's turn")]
    AiTurn,

    #[error("the match is over")]
    MatchOver,

    #[error("power {0:.0} is too low to strike")]
    PowerTooLow(f32),
}

impl ShotError {
    /// Errors the player clears by simply waiting
    pub fn is_transient(&self) -> bool {
        matches!(self, ShotError::InProgress | ShotError::BallMoving | ShotError::AiTurn)
    }
}
