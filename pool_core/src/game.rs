//! Main game logic and state management.

use crate::ai::{placement_check, AiPlanner};
use crate::error::{ConfigError, PlacementError, ShotError};
use crate::physics::{Physics, ShotPrediction};
use crate::rack::create_balls;
use crate::rules::TurnState;
use crate::types::*;

/// Main game state and logic
#[derive(Debug, Clone)]
pub struct Game {
    pub config: Config,
    pub tick: Tick,
    pub phase: Phase,
    pub balls: Vec<Ball>,
    pub cue: Cue,
    pub turn: TurnState,
    ai: Option<AiPlanner>,
    /// Ticks left before the AI acts on its turn
    ai_wait: Option<u16>,
}

impl Game {
    /// Create a new game with the given configuration
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let ai = match config.mode {
            GameMode::VsAi => Some(AiPlanner::new(config.difficulty, config.seed)),
            GameMode::Pvp => None,
        };

        log::info!(
            "New {} match: {} vs {} ({:?} rules)",
            config.mode,
            config.name_of(Player::One),
            config.name_of(Player::Two),
            config.rules
        );

        Ok(Game {
            balls: create_balls(&config.table),
            config,
            tick: 0,
            phase: Phase::Aiming,
            cue: Cue::default(),
            turn: TurnState::new(Player::One),
            ai,
            ai_wait: None,
        })
    }

    /// Step the game simulation forward by one tick
    pub fn step(&mut self) -> Vec<Event> {
        let mut events = Vec::new();

        match self.phase {
            Phase::Aiming => {
                if self.is_ai_turn() {
                    self.step_ai(&mut events);
                }
            }

            Phase::Striking => {
                let progress = self.cue.strike_progress.unwrap_or(0.0) + STRIKE_STEP;
                if progress >= 1.0 {
                    self.launch(&mut events);
                } else {
                    self.cue.strike_progress = Some(progress);
                }
            }

            Phase::InFlight => {
                let report = Physics::step(
                    &mut self.balls,
                    &self.config.table,
                    self.turn.cue_ball_in_hand,
                );

                for pot in &report.pots {
                    log::info!("Ball {} potted", self.balls[pot.ball_index].number);
                    events.push(Event::Potted(*pot));
                }
                self.turn.record(&report);

                if Physics::all_stopped(&self.balls) {
                    self.settle(&mut events);
                }
            }

            Phase::Resolved { .. } => {
                // Match is over, wait for a rematch
            }
        }

        self.tick += 1;
        events
    }

    /// Aim the cue (ignored while a shot is running)
    pub fn set_aim(&mut self, angle: f32, power: f32) {
        if self.phase == Phase::Aiming {
            self.cue.set_aim(angle, power);
        }
    }

    /// Aim by pulling back from the cue ball towards `pointer`
    pub fn aim_from_pointer(&mut self, pointer: Vec2) {
        if self.phase != Phase::Aiming {
            return;
        }
        if let Some(cue_ball) = self.cue_ball() {
            let pos = cue_ball.pos;
            self.cue.aim_from_pointer(pos, pointer);
        }
    }

    /// Start the cue swing with the current aim. The shot is launched by
    /// `step` once the swing completes.
    pub fn release_shot(&mut self) -> Result<(), ShotError> {
        let result = self.check_release();
        match result {
            Ok(()) => {
                self.cue.strike_progress = Some(0.0);
                self.phase = Phase::Striking;
            }
            Err(err) => log::warn!("Shot rejected: {}", err),
        }
        result
    }

    fn check_release(&self) -> Result<(), ShotError> {
        match self.phase {
            Phase::Resolved { .. } => return Err(ShotError::MatchOver),
            Phase::Striking | Phase::InFlight => return Err(ShotError::InProgress),
            Phase::Aiming => {}
        }
        if self.is_ai_turn() {
            return Err(ShotError::AiTurn);
        }
        if self.turn.cue_ball_in_hand {
            return Err(ShotError::BallInHand);
        }
        if self.cue_ball().is_some_and(|b| b.is_moving()) {
            return Err(ShotError::BallMoving);
        }
        if self.cue.power <= MIN_STRIKE_POWER {
            return Err(ShotError::PowerTooLow(self.cue.power));
        }
        Ok(())
    }

    /// Drop the cue ball at `pos` during ball in hand. On error nothing
    /// changes.
    pub fn place_cue_ball(&mut self, pos: Vec2) -> Result<(), PlacementError> {
        if self.is_ai_turn() {
            log::warn!("Placement rejected: {}", PlacementError::AiTurn);
            return Err(PlacementError::AiTurn);
        }

        self.put_cue_ball(pos).map_err(|err| {
            log::warn!("Placement at {:?} rejected: {}", pos, err);
            err
        })
    }

    fn put_cue_ball(&mut self, pos: Vec2) -> Result<(), PlacementError> {
        if self.phase != Phase::Aiming || !self.turn.cue_ball_in_hand {
            return Err(PlacementError::NotInHand);
        }
        placement_check(&self.balls, &self.config.table, pos)?;

        if let Some(cue_ball) = self.balls.iter_mut().find(|b| b.is_cue()) {
            cue_ball.pos = pos;
            cue_ball.vel = Vec2::ZERO;
            cue_ball.parked = false;
        }
        self.turn.cue_ball_in_hand = false;

        log::debug!("{} placed the cue ball at {:?}", self.turn.player_turn, pos);
        Ok(())
    }

    /// Aim guide for the current cue. `None` unless the player to move can
    /// shoot from where the cue ball lies.
    pub fn predict(&self) -> Option<ShotPrediction> {
        if self.phase != Phase::Aiming || self.turn.cue_ball_in_hand {
            return None;
        }
        Physics::predict_shot(
            &self.balls,
            &self.config.table,
            self.cue.angle,
            self.cue.power,
        )
    }

    /// Generate a view of the current game state for rendering
    pub fn view(&self) -> View {
        View {
            tick: self.tick,
            phase: self.phase,
            player_turn: self.turn.player_turn,
            groups: [
                self.turn.group_of(Player::One),
                self.turn.group_of(Player::Two),
            ],
            cue_ball_in_hand: self.turn.cue_ball_in_hand,
            ai_turn: self.is_ai_turn(),
            last_outcome: self.turn.last_outcome,
            scores: self.turn.scores,
            player_names: self.config.player_names.clone(),
            cue: self.cue,
            balls: self.balls.clone(),
        }
    }

    /// Reset the game for a new match (rematch)
    pub fn reset_match(&mut self) {
        self.tick = 0;
        self.phase = Phase::Aiming;
        self.balls = create_balls(&self.config.table);
        self.cue = Cue::default();
        self.turn = TurnState::new(Player::One);
        self.ai = self
            .ai
            .as_ref()
            .map(|ai| AiPlanner::new(ai.difficulty(), self.config.seed));
        self.ai_wait = None;
    }

    /// Whether the computer is the player to move
    pub fn is_ai_turn(&self) -> bool {
        self.ai.is_some() && self.turn.player_turn == Player::Two
    }

    /// Get the current winner (if the match is over)
    pub fn winner(&self) -> Option<Player> {
        match self.phase {
            Phase::Resolved { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn cue_ball(&self) -> Option<&Ball> {
        self.balls.iter().find(|b| b.is_cue())
    }

    /// Get a human-readable status string
    pub fn status_string(&self) -> &'static str {
        match self.phase {
            Phase::Aiming if self.turn.cue_ball_in_hand => "Ball in hand",
            Phase::Aiming if self.is_ai_turn() => "Computer is thinking...",
            Phase::Aiming => "Aiming",
            Phase::Striking => "Striking",
            Phase::InFlight => "Balls rolling",
            Phase::Resolved { .. } => "Match over",
        }
    }

    /// Count down the thinking delay, then place (if needed) and shoot
    fn step_ai(&mut self, events: &mut Vec<Event>) {
        let wait = self.ai_wait.get_or_insert(self.config.ai_think_ticks);
        if *wait > 0 {
            *wait -= 1;
            return;
        }

        let Some(ai) = self.ai.as_mut() else {
            return;
        };

        if self.turn.cue_ball_in_hand {
            match ai.choose_placement(&self.balls, &self.config.table) {
                Some(pos) => {
                    if let Err(err) = self.put_cue_ball(pos) {
                        log::warn!("AI placement at {:?} rejected: {}", pos, err);
                    }
                }
                None => log::warn!("No legal spot for the cue ball"),
            }
        }

        let group = self.turn.group_of(self.turn.player_turn);
        let Some(ai) = self.ai.as_mut() else {
            return;
        };
        let plan = ai.plan_shot(&self.balls, &self.config.table, group);
        self.cue.set_aim(plan.angle, plan.power);
        self.launch(events);
    }

    /// Apply the cue velocity and start the shot accumulator
    fn launch(&mut self, events: &mut Vec<Event>) {
        let velocity = self.cue.velocity(&self.config.table);
        let in_hand = self.turn.cue_ball_in_hand;
        if let Some(cue_ball) = self.balls.iter_mut().find(|b| b.is_cue() && b.on_table()) {
            if !in_hand {
                cue_ball.vel = velocity;
            }
        }

        self.cue.strike_progress = None;
        self.turn.begin_shot(&self.balls);
        self.phase = Phase::InFlight;
        self.ai_wait = None;

        let player = self.turn.player_turn;
        log::debug!(
            "{} shoots: angle {:.2}, power {:.0}",
            player,
            self.cue.angle,
            self.cue.power
        );
        events.push(Event::ShotReleased {
            player,
            angle: self.cue.angle,
            power: self.cue.power,
        });
    }

    /// Judge the finished shot and move to the next turn or end the match
    fn settle(&mut self, events: &mut Vec<Event>) {
        let Some(judgement) = self.turn.settle(&self.balls, self.config.rules) else {
            self.phase = Phase::Aiming;
            return;
        };

        if let Some(player_one) = judgement.assigned {
            log::info!("Groups assigned: player 1 has {}", player_one);
            events.push(Event::GroupsAssigned { player_one });
        }

        if let ShotOutcome::Foul(foul) = judgement.outcome {
            events.push(Event::Foul {
                player: judgement.shooter,
                foul,
            });
        }

        match judgement.winner() {
            Some(winner) => {
                log::info!("{} wins the match", self.config.name_of(winner));
                self.phase = Phase::Resolved { winner };
                events.push(Event::MatchOver {
                    winner,
                    outcome: judgement.outcome,
                });
            }
            None => {
                self.phase = Phase::Aiming;
                events.push(Event::TurnEnded {
                    next: self.turn.player_turn,
                });
            }
        }
    }
}
