//! Computer opponent: target selection, aiming and cue ball placement.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::PlacementError;
use crate::geometry::{angle_to, ghost_ball, nearest};
use crate::types::*;

/// Angular noise (radians) of an easy shot
const EASY_AIM_NOISE: f32 = 0.3;

/// Random spots tried before falling back to a grid scan
const PLACEMENT_ATTEMPTS: usize = 100;

/// A shot the planner wants to take
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShotPlan {
    pub angle: f32,
    /// 0-100
    pub power: f32,
}

impl ShotPlan {
    /// Zero-power shot when there is nothing to aim at
    pub const NONE: ShotPlan = ShotPlan {
        angle: 0.0,
        power: 0.0,
    };

    pub fn is_none(&self) -> bool {
        self.power <= 0.0
    }
}

/// Seeded shot planner. Equal seeds on equal tables give equal plans.
#[derive(Debug, Clone)]
pub struct AiPlanner {
    difficulty: Difficulty,
    rng: StdRng,
}

impl AiPlanner {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        AiPlanner {
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Plan a shot for a player holding `group` (None: open table)
    pub fn plan_shot(&mut self, balls: &[Ball], table: &Table, group: Option<Group>) -> ShotPlan {
        let Some(cue) = balls.iter().find(|b| b.is_cue() && b.on_table()) else {
            return ShotPlan::NONE;
        };

        let targets = Self::targets(balls, group);
        let Some(&target) = targets.choose(&mut self.rng) else {
            log::debug!("AI has no target, passing");
            return ShotPlan::NONE;
        };

        let plan = match self.difficulty {
            Difficulty::Easy => {
                let noise = self.rng.gen_range(-EASY_AIM_NOISE..=EASY_AIM_NOISE);
                ShotPlan {
                    angle: angle_to(cue.pos, target.pos) + noise,
                    power: self.rng.gen_range(30.0..=70.0),
                }
            }
            Difficulty::Hard => self.plan_cut(cue.pos, target.pos, table),
        };

        log::debug!(
            "AI ({}) aims at ball {}: angle {:.2}, power {:.0}",
            self.difficulty,
            target.number,
            plan.angle,
            plan.power
        );
        plan
    }

    /// Ghost-ball aim at the pocket nearest the target
    fn plan_cut(&mut self, cue: Vec2, target: Vec2, table: &Table) -> ShotPlan {
        let ghost = nearest(&table.pockets, target)
            .and_then(|(pocket, _)| ghost_ball(target, table.pockets[pocket], table.diameter()));

        match ghost {
            Some(ghost) if ghost != cue => ShotPlan {
                angle: angle_to(cue, ghost),
                power: self.rng.gen_range(70.0..=100.0),
            },
            _ => ShotPlan {
                angle: angle_to(cue, target),
                power: self.rng.gen_range(50.0..=90.0),
            },
        }
    }

    /// Alive balls of `group`; on an open table any object ball but the
    /// eight; the eight ball once the group is cleared.
    fn targets(balls: &[Ball], group: Option<Group>) -> Vec<&Ball> {
        let wanted: Vec<&Ball> = balls
            .iter()
            .filter(|b| b.on_table())
            .filter(|b| match group {
                Some(g) => b.belongs_to(g),
                None => b.kind.group().is_some(),
            })
            .collect();

        if !wanted.is_empty() {
            return wanted;
        }
        balls.iter().filter(|b| b.is_eight() && b.on_table()).collect()
    }

    /// Pick a legal ball-in-hand spot. Random attempts first, then a grid
    /// scan; `None` only when no legal spot exists.
    pub fn choose_placement(&mut self, balls: &[Ball], table: &Table) -> Option<Vec2> {
        let r = table.ball_radius;
        let (min_x, max_x) = (table.left + r, table.right - r);
        let (min_y, max_y) = (table.top + r, table.bottom - r);

        for _ in 0..PLACEMENT_ATTEMPTS {
            let pos = Vec2::new(
                self.rng.gen_range(min_x..=max_x),
                self.rng.gen_range(min_y..=max_y),
            );
            if placement_check(balls, table, pos).is_ok() {
                log::debug!("AI places cue ball at {:?}", pos);
                return Some(pos);
            }
        }

        let step = table.ball_radius;
        let mut y = min_y;
        while y <= max_y {
            let mut x = min_x;
            while x <= max_x {
                let pos = Vec2::new(x, y);
                if placement_check(balls, table, pos).is_ok() {
                    log::debug!("AI places cue ball at {:?} (grid)", pos);
                    return Some(pos);
                }
                x += step;
            }
            y += step;
        }

        None
    }
}

/// Whether the cue ball may be dropped at `pos`: inside the bounds, clear of
/// the pockets and at least one diameter from every other ball on the table.
pub fn placement_check(balls: &[Ball], table: &Table, pos: Vec2) -> Result<(), PlacementError> {
    if !table.contains(pos) {
        return Err(PlacementError::OutOfBounds);
    }
    if table
        .pockets
        .iter()
        .any(|pocket| pos.distance(*pocket) < table.pocket_radius)
    {
        return Err(PlacementError::InPocket);
    }
    if let Some(ball) = balls
        .iter()
        .filter(|b| !b.is_cue() && b.on_table())
        .find(|b| b.pos.distance(pos) < table.diameter())
    {
        return Err(PlacementError::Overlap(ball.number));
    }
    Ok(())
}
