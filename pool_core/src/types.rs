//! Core types and constants for the eight-ball pool engine.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::rack::RACK_ROWS;

pub use glam::Vec2;

/// Tick counter type
pub type Tick = u32;

/// Where a pocketed cue ball waits until it is placed again
pub const CUE_PARK: Vec2 = Vec2::new(-1000.0, -1000.0);

/// Power (0-100) a human strike must exceed to start the swing
pub const MIN_STRIKE_POWER: f32 = 5.0;

/// Swing progress added per tick while the cue is striking
pub const STRIKE_STEP: f32 = 0.15;

/// Pointer pull-back distance that maps to full power
pub const MAX_PULLBACK: f32 = 200.0;

/// Player seat
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the other player
    pub fn opposite(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Index into per-player arrays
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player 1"),
            Player::Two => write!(f, "player 2"),
        }
    }
}

/// Ball group a player has to clear before the eight ball
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    Solids,
    Stripes,
}

impl Group {
    /// The group held by the other player
    pub fn complement(self) -> Group {
        match self {
            Group::Solids => Group::Stripes,
            Group::Stripes => Group::Solids,
        }
    }

    /// Ball kind that belongs to this group
    pub fn ball_kind(self) -> BallKind {
        match self {
            Group::Solids => BallKind::Solid,
            Group::Stripes => BallKind::Stripe,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Solids => write!(f, "solids"),
            Group::Stripes => write!(f, "stripes"),
        }
    }
}

/// Ball category, also used as the tag of a pot event
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BallKind {
    Cue,
    Solid,
    Stripe,
    Eight,
}

impl BallKind {
    /// Group this kind counts towards, if any
    pub fn group(self) -> Option<Group> {
        match self {
            BallKind::Solid => Some(Group::Solids),
            BallKind::Stripe => Some(Group::Stripes),
            BallKind::Cue | BallKind::Eight => None,
        }
    }
}

/// Ball colors. Solids and stripes share the seven object colors.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BallColor {
    White,
    Yellow,
    Blue,
    Red,
    Purple,
    Orange,
    Green,
    Maroon,
    Black,
}

impl BallColor {
    /// The seven colors used by solids and stripes, in rack order
    pub const OBJECT_COLORS: [BallColor; 7] = [
        BallColor::Yellow,
        BallColor::Blue,
        BallColor::Red,
        BallColor::Purple,
        BallColor::Orange,
        BallColor::Green,
        BallColor::Maroon,
    ];

    /// 8-bit RGB triple for renderers
    pub fn rgb(self) -> [u8; 3] {
        match self {
            BallColor::White => [255, 255, 255],
            BallColor::Yellow => [255, 255, 0],
            BallColor::Blue => [0, 0, 255],
            BallColor::Red => [255, 0, 0],
            BallColor::Purple => [128, 0, 128],
            BallColor::Orange => [255, 165, 0],
            BallColor::Green => [0, 128, 0],
            BallColor::Maroon => [128, 0, 0],
            BallColor::Black => [0, 0, 0],
        }
    }
}

/// Ball state
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ball {
    /// Conventional number: 0 cue, 1-7 solids, 8 eight ball, 9-15 stripes
    pub number: u8,
    pub color: BallColor,
    pub kind: BallKind,
    /// Center position (pixels)
    pub pos: Vec2,
    /// Velocity (pixels per tick)
    pub vel: Vec2,
    /// False once an object ball has been pocketed
    pub alive: bool,
    /// Cue ball waiting off the table after a scratch
    pub parked: bool,
}

impl Ball {
    pub fn new(number: u8, color: BallColor, kind: BallKind, pos: Vec2) -> Self {
        Ball {
            number,
            color,
            kind,
            pos,
            vel: Vec2::ZERO,
            alive: true,
            parked: false,
        }
    }

    pub fn is_cue(&self) -> bool {
        self.kind == BallKind::Cue
    }

    pub fn is_striped(&self) -> bool {
        self.kind == BallKind::Stripe
    }

    pub fn is_eight(&self) -> bool {
        self.kind == BallKind::Eight
    }

    /// Alive and physically present on the cloth
    pub fn on_table(&self) -> bool {
        self.alive && !self.parked
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    /// True for solids/stripes of the given group
    pub fn belongs_to(&self, group: Group) -> bool {
        self.kind == group.ball_kind()
    }
}

/// Game mode chosen at session start
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Two humans share the table
    #[default]
    Pvp,
    /// Player two is the computer
    VsAi,
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pvp" => Ok(GameMode::Pvp),
            "vs-ai" | "vsai" | "ai" => Ok(GameMode::VsAi),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Pvp => write!(f, "pvp"),
            GameMode::VsAi => write!(f, "vs-ai"),
        }
    }
}

/// AI strength
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Difficulty {
    /// Direct aim with angular noise
    #[default]
    Easy,
    /// Ghost-ball aim at the nearest pocket
    Hard,
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Foul rules applied when judging a shot
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RuleSet {
    /// Scratch fouls plus "own group must be contacted first"
    #[default]
    Strict,
    /// Scratch fouls only
    Casual,
}

impl FromStr for RuleSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(RuleSet::Strict),
            "casual" => Ok(RuleSet::Casual),
            _ => Err(ConfigError::UnknownRuleSet(s.to_string())),
        }
    }
}

/// Table geometry and physics constants, fixed for a session
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Table {
    /// Playable area bounds (ball edges reflect here)
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub ball_radius: f32,
    /// Capture distance from a pocket center
    pub pocket_radius: f32,
    /// Velocity retention per tick, in (0, 1)
    pub friction: f32,
    /// Velocity components below this snap to zero
    pub min_speed: f32,
    /// Cue ball speed at power 100 (pixels per tick)
    pub max_shot_speed: f32,
    pub pockets: [Vec2; 6],
    pub cue_start: Vec2,
    /// Position of the first ball of the triangle
    pub rack_apex: Vec2,
}

impl Default for Table {
    fn default() -> Self {
        let (width, height) = (900.0, 500.0);
        let (left, right, top, bottom) = (70.0, width - 70.0, 50.0, height - 50.0);
        let mid_x = (left + right) / 2.0;

        Table {
            left,
            right,
            top,
            bottom,
            ball_radius: 12.0,
            pocket_radius: 22.0,
            friction: 0.9851,
            min_speed: 0.01,
            max_shot_speed: 15.0,
            pockets: [
                Vec2::new(left, top),
                Vec2::new(mid_x, top),
                Vec2::new(right, top),
                Vec2::new(left, bottom),
                Vec2::new(mid_x, bottom),
                Vec2::new(right, bottom),
            ],
            cue_start: Vec2::new(width / 4.0, height / 2.0),
            rack_apex: Vec2::new(3.0 * width / 4.0, height / 2.0),
        }
    }
}

impl Table {
    /// Ball diameter, the contact distance between two centers
    pub fn diameter(&self) -> f32 {
        self.ball_radius * 2.0
    }

    /// Center distance between neighbouring rack columns
    pub fn rack_spacing(&self) -> f32 {
        self.diameter() + 1.0
    }

    /// Whether a ball centered at `pos` lies fully inside the bounds
    pub fn contains(&self, pos: Vec2) -> bool {
        let r = self.ball_radius;
        pos.x >= self.left + r
            && pos.x <= self.right - r
            && pos.y >= self.top + r
            && pos.y <= self.bottom - r
    }

    /// Check the constants describe a usable table
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::InvalidTable(reason.to_string()));

        if !(self.ball_radius > 0.0) {
            return invalid("ball radius must be positive");
        }
        if !(self.pocket_radius > 0.0) {
            return invalid("pocket radius must be positive");
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return invalid("friction must be in (0, 1)");
        }
        if !(self.min_speed >= 0.0) {
            return invalid("minimum speed must not be negative");
        }
        if !(self.max_shot_speed > 0.0) {
            return invalid("maximum shot speed must be positive");
        }
        if self.right - self.left <= self.diameter() || self.bottom - self.top <= self.diameter() {
            return invalid("bounds are too small for a ball");
        }
        if !self.contains(self.cue_start) {
            return invalid("cue start lies outside the bounds");
        }

        // Apex plus both ends of the widest column
        let back = (RACK_ROWS - 1) as f32;
        let back_x = self.rack_apex.x + back * self.rack_spacing();
        let back_top = self.rack_apex.y - back * self.ball_radius;
        let back_bottom = back_top + back * self.rack_spacing();
        let rack_fits = self.contains(self.rack_apex)
            && self.contains(Vec2::new(back_x, back_top))
            && self.contains(Vec2::new(back_x, back_bottom));
        if !rack_fits {
            return invalid("rack does not fit inside the bounds");
        }
        Ok(())
    }
}

/// Session configuration, consumed once by `Game::new`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Display names for player one and two
    pub player_names: [String; 2],
    pub rules: RuleSet,
    /// Random seed for the AI
    pub seed: u64,
    /// Tick frequency (Hz)
    pub tick_hz: u16,
    /// Ticks the AI waits before committing to a shot
    pub ai_think_ticks: u16,
    pub table: Table,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: GameMode::Pvp,
            difficulty: Difficulty::Easy,
            player_names: ["Player 1".to_string(), "Player 2".to_string()],
            rules: RuleSet::Strict,
            seed: 0xC0FFEE,
            tick_hz: 60,
            ai_think_ticks: 60, // 1 second at 60 Hz
            table: Table::default(),
        }
    }
}

impl Config {
    /// Fail fast on anything the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, name) in self.player_names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyPlayerName(i + 1));
            }
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::InvalidTickRate);
        }
        self.table.validate()
    }

    pub fn name_of(&self, player: Player) -> &str {
        &self.player_names[player.index()]
    }
}

/// Cue stick attached to the cue ball
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Cue {
    /// Shot direction (radians)
    pub angle: f32,
    /// Shot power [0, 100]
    pub power: f32,
    /// Swing progress [0, 1) while a strike is animating
    pub strike_progress: Option<f32>,
}

impl Cue {
    pub fn set_aim(&mut self, angle: f32, power: f32) {
        self.angle = angle;
        self.power = power.clamp(0.0, 100.0);
    }

    /// Aim by pulling back from the cue ball: the shot goes from the pointer
    /// through the ball, harder the further the pointer is.
    pub fn aim_from_pointer(&mut self, cue_pos: Vec2, pointer: Vec2) {
        let pull = cue_pos - pointer;
        self.angle = pull.y.atan2(pull.x);
        self.power = pull.length().min(MAX_PULLBACK) / MAX_PULLBACK * 100.0;
    }

    pub fn is_striking(&self) -> bool {
        self.strike_progress.is_some()
    }

    /// Cue ball velocity produced by the current aim
    pub fn velocity(&self, table: &Table) -> Vec2 {
        shot_velocity(self.angle, self.power, table)
    }
}

/// Velocity for a shot of `power` (0-100) along `angle`
pub fn shot_velocity(angle: f32, power: f32, table: &Table) -> Vec2 {
    Vec2::from_angle(angle) * (power.clamp(0.0, 100.0) / 100.0 * table.max_shot_speed)
}

/// A ball dropped into a pocket during one tick
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pot {
    pub ball_index: usize,
    pub kind: BallKind,
}

/// First object ball the cue ball touched
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FirstContact {
    /// Kind of the struck ball (never `Cue`)
    pub kind: BallKind,
    /// Cue ball center at the moment of contact
    pub point: Vec2,
    pub ball_index: usize,
}

/// What one physics tick produced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepReport {
    pub pots: Vec<Pot>,
    pub first_contact: Option<FirstContact>,
}

/// Rule violations
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Foul {
    /// Cue ball pocketed
    Scratch,
    /// Cue ball touched no object ball
    NoContact,
    /// Cue ball touched the wrong kind of ball first
    WrongFirstContact { hit: BallKind },
}

/// Why a player lost on the eight ball
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LossReason {
    /// Eight ball pocketed before the group was cleared
    EarlyEightBall,
    /// Eight ball and cue ball pocketed on the same shot
    ScratchOnEightBall,
}

/// Result of the most recent judged shot
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ShotOutcome {
    #[default]
    None,
    Foul(Foul),
    Win(Player),
    Loss { player: Player, reason: LossReason },
}

/// Match phase
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player to aim and shoot (or place the cue ball)
    Aiming,
    /// Cue swing animating; velocity is applied when it completes
    Striking,
    /// Balls rolling; judged as soon as all are at rest
    InFlight,
    /// Match over
    Resolved { winner: Player },
}

/// Events produced while stepping the game
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    ShotReleased { player: Player, angle: f32, power: f32 },
    Potted(Pot),
    Foul { player: Player, foul: Foul },
    GroupsAssigned { player_one: Group },
    TurnEnded { next: Player },
    MatchOver { winner: Player, outcome: ShotOutcome },
}

/// Read-only view of the match for rendering
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub tick: Tick,
    pub phase: Phase,
    pub player_turn: Player,
    /// Group of player one and two (None while the table is open)
    pub groups: [Option<Group>; 2],
    pub cue_ball_in_hand: bool,
    pub ai_turn: bool,
    pub last_outcome: ShotOutcome,
    /// Object balls pocketed by each player
    pub scores: [u8; 2],
    pub player_names: [String; 2],
    pub cue: Cue,
    pub balls: Vec<Ball>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_opposite() {
        assert_eq!(Player::One.opposite(), Player::Two);
        assert_eq!(Player::Two.opposite(), Player::One);
        assert_eq!(Player::Two.index(), 1);
    }

    #[test]
    fn test_group_complement() {
        assert_eq!(Group::Solids.complement(), Group::Stripes);
        assert_eq!(Group::Stripes.complement(), Group::Solids);
        assert_eq!(BallKind::Stripe.group(), Some(Group::Stripes));
        assert_eq!(BallKind::Eight.group(), None);
    }

    #[test]
    fn test_parse_config_values() {
        assert_eq!("pvp".parse::<GameMode>().unwrap(), GameMode::Pvp);
        assert_eq!("vs-ai".parse::<GameMode>().unwrap(), GameMode::VsAi);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("casual".parse::<RuleSet>().unwrap(), RuleSet::Casual);
    }

    #[test]
    fn test_unknown_difficulty_is_rejected() {
        let err = "medium".parse::<Difficulty>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownDifficulty("medium".to_string()));
        assert!(err.to_string().contains("medium"));
        assert!("solo".parse::<GameMode>().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_table_rejected() {
        let mut config = Config::default();
        config.table.friction = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTable(_))
        ));

        let mut config = Config::default();
        config.player_names[1] = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyPlayerName(2)));
    }

    #[test]
    fn test_rack_must_fit_on_table() {
        let mut table = Table::default();
        table.rack_apex.x = table.right - 3.0 * table.ball_radius;
        assert!(matches!(table.validate(), Err(ConfigError::InvalidTable(_))));

        let mut table = Table::default();
        table.rack_apex.y = table.top + table.ball_radius * 2.0;
        assert!(matches!(table.validate(), Err(ConfigError::InvalidTable(_))));

        // Apex inside, back column past the right rail
        let mut table = Table::default();
        table.rack_apex.x = table.right - 2.0 * table.rack_spacing();
        assert!(table.contains(table.rack_apex));
        assert!(table.validate().is_err());

        // Every racked ball is inside a valid table
        let table = Table::default();
        assert!(table.validate().is_ok());
        let balls = crate::rack::create_balls(&table);
        assert!(balls.iter().all(|b| table.contains(b.pos)));
    }

    #[test]
    fn test_table_contains() {
        let table = Table::default();
        assert!(table.contains(table.cue_start));
        assert!(table.contains(Vec2::new(table.left + table.ball_radius, 250.0)));
        assert!(!table.contains(Vec2::new(table.left, 250.0)));
        assert!(!table.contains(CUE_PARK));
    }

    #[test]
    fn test_cue_pointer_aim() {
        let mut cue = Cue::default();
        // Pointer left of the ball: shot goes right
        cue.aim_from_pointer(Vec2::new(300.0, 250.0), Vec2::new(200.0, 250.0));
        assert!(cue.angle.abs() < 1e-6);
        assert!((cue.power - 50.0).abs() < 1e-4);

        // Pull-back is capped at full power
        cue.aim_from_pointer(Vec2::new(300.0, 250.0), Vec2::new(300.0, 900.0));
        assert!((cue.power - 100.0).abs() < 1e-4);
        assert!(cue.angle < 0.0); // pointing up
    }

    #[test]
    fn test_shot_velocity_scale() {
        let table = Table::default();
        let v = shot_velocity(0.0, 100.0, &table);
        assert!((v.x - table.max_shot_speed).abs() < 1e-4);
        assert!(v.y.abs() < 1e-4);

        // Power is clamped
        let v = shot_velocity(0.0, 250.0, &table);
        assert!((v.length() - table.max_shot_speed).abs() < 1e-4);
    }
}
