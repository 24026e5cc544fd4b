//! Ball physics: motion, ball-ball collisions and pocket capture.
//!
//! Everything here works on a plain ball slice so one tick can be run
//! (and tested) without a game or a renderer around it.

use crate::geometry::{contact_normal, decompose};
use crate::types::*;

/// Ticks simulated by `Physics::predict_shot`
pub const PREDICTION_TICKS: usize = 250;

/// Outcome of a simulated shot, for aim guides
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShotPrediction {
    /// Cue ball position before the shot
    pub cue_start: Vec2,
    /// Contact point, or where the cue ball stops if it hits nothing
    pub cue_end: Vec2,
    pub contact: Option<FirstContact>,
    /// Struck ball path from contact to where it stops (or drops)
    pub object_path: Option<(Vec2, Vec2)>,
}

/// Physics calculations for game simulation
pub struct Physics;

impl Physics {
    /// Advance one ball by one tick: translate, reflect off the rails,
    /// apply rolling friction and snap slow components to zero.
    pub fn integrate_ball(ball: &mut Ball, table: &Table) {
        let r = table.ball_radius;

        ball.pos += ball.vel;

        // Left/right rails
        if ball.pos.x - r < table.left {
            ball.pos.x = table.left + r;
            ball.vel.x = -ball.vel.x;
        } else if ball.pos.x + r > table.right {
            ball.pos.x = table.right - r;
            ball.vel.x = -ball.vel.x;
        }

        // Top/bottom rails
        if ball.pos.y - r < table.top {
            ball.pos.y = table.top + r;
            ball.vel.y = -ball.vel.y;
        } else if ball.pos.y + r > table.bottom {
            ball.pos.y = table.bottom - r;
            ball.vel.y = -ball.vel.y;
        }

        ball.vel *= table.friction;
        if ball.vel.x.abs() < table.min_speed {
            ball.vel.x = 0.0;
        }
        if ball.vel.y.abs() < table.min_speed {
            ball.vel.y = 0.0;
        }
    }

    /// Resolve contact between two balls if they overlap. The pair is pushed
    /// apart to exactly one diameter and the velocity components along the
    /// contact normal are exchanged (equal masses, perfectly elastic).
    pub fn resolve_pair(a: &mut Ball, b: &mut Ball, table: &Table) -> bool {
        let diameter = table.diameter();
        let distance = a.pos.distance(b.pos);
        if distance >= diameter {
            return false;
        }

        let n = contact_normal(a.pos, b.pos);
        let t = n.perp();

        let push = n * ((diameter - distance) / 2.0);
        a.pos -= push;
        b.pos += push;

        let (norm_a, tan_a) = decompose(a.vel, n);
        let (norm_b, tan_b) = decompose(b.vel, n);
        a.vel = t * tan_a + n * norm_b;
        b.vel = t * tan_b + n * norm_a;

        true
    }

    /// Scan every pair of balls on the table once and resolve overlaps in
    /// index order. While the cue ball is in hand it has no physical presence.
    ///
    /// Returns the first cue-ball contact of this scan, if any.
    pub fn check_collisions(
        balls: &mut [Ball],
        table: &Table,
        cue_in_hand: bool,
    ) -> Option<FirstContact> {
        let mut first_contact = None;

        for i in 0..balls.len() {
            let (head, tail) = balls.split_at_mut(i + 1);
            let a = &mut head[i];
            if !a.on_table() || (cue_in_hand && a.is_cue()) {
                continue;
            }

            for (offset, b) in tail.iter_mut().enumerate() {
                if !b.on_table() || (cue_in_hand && b.is_cue()) {
                    continue;
                }
                let j = i + 1 + offset;

                // Contact point is taken before the pair is separated
                let contact = if first_contact.is_none() {
                    Self::cue_contact(a, i, b, j)
                } else {
                    None
                };

                if Self::resolve_pair(a, b, table) && contact.is_some() {
                    first_contact = contact;
                }
            }
        }

        first_contact
    }

    fn cue_contact(a: &Ball, i: usize, b: &Ball, j: usize) -> Option<FirstContact> {
        let (cue, other, index) = if a.is_cue() {
            (a, b, j)
        } else if b.is_cue() {
            (b, a, i)
        } else {
            return None;
        };

        Some(FirstContact {
            kind: other.kind,
            point: cue.pos,
            ball_index: index,
        })
    }

    /// Capture every ball whose center is inside a pocket. Object balls leave
    /// play; the cue ball is parked off the table and stays alive.
    pub fn check_pockets(balls: &mut [Ball], table: &Table) -> Vec<Pot> {
        Self::capture(balls, table, false)
    }

    fn capture(balls: &mut [Ball], table: &Table, skip_cue: bool) -> Vec<Pot> {
        let mut pots = Vec::new();

        for (index, ball) in balls.iter_mut().enumerate() {
            if !ball.on_table() || (skip_cue && ball.is_cue()) {
                continue;
            }

            let captured = table
                .pockets
                .iter()
                .any(|pocket| ball.pos.distance(*pocket) < table.pocket_radius);
            if !captured {
                continue;
            }

            if ball.is_cue() {
                ball.pos = CUE_PARK;
                ball.vel = Vec2::ZERO;
                ball.parked = true;
            } else {
                ball.alive = false;
                ball.vel = Vec2::ZERO;
            }

            log::trace!("Ball {} dropped at {:?}", ball.number, ball.pos);
            pots.push(Pot {
                ball_index: index,
                kind: ball.kind,
            });
        }

        pots
    }

    /// Run one full tick: integrate, collide, capture
    pub fn step(balls: &mut [Ball], table: &Table, cue_in_hand: bool) -> StepReport {
        for ball in balls.iter_mut() {
            if ball.on_table() && !(cue_in_hand && ball.is_cue()) {
                Self::integrate_ball(ball, table);
            }
        }

        let first_contact = Self::check_collisions(balls, table, cue_in_hand);

        let pots = Self::capture(balls, table, cue_in_hand);

        StepReport {
            pots,
            first_contact,
        }
    }

    /// True when no ball on the table is moving
    pub fn all_stopped(balls: &[Ball]) -> bool {
        balls.iter().filter(|b| b.on_table()).all(|b| !b.is_moving())
    }

    /// Simulate a shot on a copy of the balls. `None` if the cue ball is not
    /// on the table.
    pub fn predict_shot(
        balls: &[Ball],
        table: &Table,
        angle: f32,
        power: f32,
    ) -> Option<ShotPrediction> {
        let cue_index = balls.iter().position(|b| b.is_cue() && b.on_table())?;
        let mut sim = balls.to_vec();

        let cue_start = sim[cue_index].pos;
        sim[cue_index].vel = shot_velocity(angle, power, table);

        let mut cue_end = cue_start;
        let mut contact: Option<FirstContact> = None;
        let mut object_path = None;

        for _ in 0..PREDICTION_TICKS {
            let report = Self::step(&mut sim, table, false);

            if sim[cue_index].on_table() && contact.is_none() {
                cue_end = sim[cue_index].pos;
            }

            if contact.is_none() {
                if let Some(hit) = report.first_contact {
                    cue_end = hit.point;
                    contact = Some(hit);
                    object_path = Some((sim[hit.ball_index].pos, sim[hit.ball_index].pos));
                }
            }

            match contact {
                Some(hit) => {
                    let object = &sim[hit.ball_index];
                    if let Some((_, end)) = object_path.as_mut() {
                        *end = object.pos;
                    }
                    if !object.alive || !object.is_moving() {
                        break;
                    }
                }
                None => {
                    if !sim[cue_index].on_table() || !sim[cue_index].is_moving() {
                        break;
                    }
                }
            }
        }

        Some(ShotPrediction {
            cue_start,
            cue_end,
            contact,
            object_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rack::create_balls;

    fn ball(number: u8, kind: BallKind, x: f32, y: f32) -> Ball {
        Ball::new(number, BallColor::Red, kind, Vec2::new(x, y))
    }

    fn cue(x: f32, y: f32) -> Ball {
        Ball::new(0, BallColor::White, BallKind::Cue, Vec2::new(x, y))
    }

    #[test]
    fn test_ball_moves_and_slows() {
        let table = Table::default();
        let mut b = ball(1, BallKind::Solid, 300.0, 250.0);
        b.vel = Vec2::new(4.0, -2.0);

        Physics::integrate_ball(&mut b, &table);

        assert!((b.pos - Vec2::new(304.0, 248.0)).length() < 1e-4);
        assert!((b.vel.x - 4.0 * table.friction).abs() < 1e-5);
        assert!((b.vel.y + 2.0 * table.friction).abs() < 1e-5);
    }

    #[test]
    fn test_ball_wall_collision() {
        let table = Table::default();
        let mut b = ball(1, BallKind::Solid, 300.0, table.top + table.ball_radius + 1.0);
        b.vel = Vec2::new(0.0, -3.0);

        Physics::integrate_ball(&mut b, &table);

        assert_eq!(b.pos.y, table.top + table.ball_radius); // Clamped to rail
        assert!(b.vel.y > 0.0); // Velocity should reverse
    }

    #[test]
    fn test_wall_bounce_is_lossless() {
        let table = Table::default();
        let mut b = ball(1, BallKind::Solid, table.left + table.ball_radius + 0.5, 250.0);
        b.vel = Vec2::new(-2.0, 0.0);

        Physics::integrate_ball(&mut b, &table);

        // Only friction reduces speed, the rail does not
        assert!((b.vel.x - 2.0 * table.friction).abs() < 1e-5);
    }

    #[test]
    fn test_rest_is_idempotent() {
        let table = Table::default();
        let mut b = ball(1, BallKind::Solid, 300.0, 250.0);
        b.vel = Vec2::new(table.min_speed * 0.5, -table.min_speed * 0.5);

        Physics::integrate_ball(&mut b, &table);
        assert_eq!(b.vel, Vec2::ZERO);
        let rest = b.pos;

        for _ in 0..500 {
            Physics::integrate_ball(&mut b, &table);
        }
        assert_eq!(b.vel, Vec2::ZERO);
        assert_eq!(b.pos, rest);
    }

    #[test]
    fn test_ball_eventually_stops() {
        let table = Table::default();
        let mut balls = vec![cue(300.0, 250.0)];
        balls[0].vel = Vec2::new(6.0, 3.0);

        let mut ticks = 0;
        while !Physics::all_stopped(&balls) {
            Physics::step(&mut balls, &table, false);
            ticks += 1;
            assert!(ticks < 5_000, "ball never came to rest");
        }
    }

    #[test]
    fn test_collision_conserves_momentum() {
        let table = Table::default();
        let mut a = ball(1, BallKind::Solid, 200.0, 200.0);
        let mut b = ball(9, BallKind::Stripe, 220.0, 212.0);
        a.vel = Vec2::new(3.0, 1.0);
        b.vel = Vec2::new(-1.0, 0.5);

        let n = contact_normal(a.pos, b.pos);
        let t = n.perp();
        let before = a.vel + b.vel;
        let (tan_a, tan_b) = (a.vel.dot(t), b.vel.dot(t));

        assert!(Physics::resolve_pair(&mut a, &mut b, &table));

        let after = a.vel + b.vel;
        assert!((before - after).length() < 1e-4);
        // Tangential speeds are untouched
        assert!((a.vel.dot(t) - tan_a).abs() < 1e-4);
        assert!((b.vel.dot(t) - tan_b).abs() < 1e-4);
    }

    #[test]
    fn test_collision_separates_to_one_diameter() {
        let table = Table::default();
        let mut a = ball(1, BallKind::Solid, 200.0, 200.0);
        let mut b = ball(2, BallKind::Solid, 205.0, 203.0);

        assert!(Physics::resolve_pair(&mut a, &mut b, &table));
        assert!((a.pos.distance(b.pos) - table.diameter()).abs() < 1e-3);
    }

    #[test]
    fn test_coincident_balls_are_separated() {
        let table = Table::default();
        let mut a = ball(1, BallKind::Solid, 200.0, 200.0);
        let mut b = ball(2, BallKind::Solid, 200.0, 200.0);

        assert!(Physics::resolve_pair(&mut a, &mut b, &table));
        assert!((a.pos.distance(b.pos) - table.diameter()).abs() < 1e-3);
    }

    #[test]
    fn test_no_collision_when_apart() {
        let table = Table::default();
        let mut a = ball(1, BallKind::Solid, 200.0, 200.0);
        let mut b = ball(2, BallKind::Solid, 200.0 + table.diameter(), 200.0);
        a.vel = Vec2::new(1.0, 0.0);

        assert!(!Physics::resolve_pair(&mut a, &mut b, &table));
        assert_eq!(a.vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_first_contact_recorded() {
        let table = Table::default();
        let mut balls = vec![
            cue(300.0, 250.0),
            ball(9, BallKind::Stripe, 320.0, 250.0),
            ball(3, BallKind::Solid, 500.0, 400.0),
        ];
        balls[0].vel = Vec2::new(2.0, 0.0);

        let contact = Physics::check_collisions(&mut balls, &table, false).unwrap();
        assert_eq!(contact.kind, BallKind::Stripe);
        assert_eq!(contact.ball_index, 1);
        assert_eq!(contact.point, Vec2::new(300.0, 250.0));
    }

    #[test]
    fn test_only_first_contact_in_scan() {
        let table = Table::default();
        // Cue ball touches a solid (index 1) and the eight ball (index 2)
        let mut balls = vec![
            cue(300.0, 250.0),
            ball(1, BallKind::Solid, 320.0, 250.0),
            ball(8, BallKind::Eight, 280.0, 250.0),
        ];

        let contact = Physics::check_collisions(&mut balls, &table, false).unwrap();
        assert_eq!(contact.ball_index, 1);
        assert_eq!(contact.kind, BallKind::Solid);
    }

    #[test]
    fn test_object_collisions_have_no_contact() {
        let table = Table::default();
        let mut balls = vec![
            cue(100.0, 100.0),
            ball(1, BallKind::Solid, 300.0, 250.0),
            ball(2, BallKind::Solid, 310.0, 250.0),
        ];

        assert!(Physics::check_collisions(&mut balls, &table, false).is_none());
        assert!((balls[1].pos.distance(balls[2].pos) - table.diameter()).abs() < 1e-3);
    }

    #[test]
    fn test_cue_in_hand_is_ignored() {
        let table = Table::default();
        let mut balls = vec![cue(300.0, 250.0), ball(1, BallKind::Solid, 305.0, 250.0)];

        assert!(Physics::check_collisions(&mut balls, &table, true).is_none());
        assert_eq!(balls[0].pos, Vec2::new(300.0, 250.0));
        assert_eq!(balls[1].pos, Vec2::new(305.0, 250.0));
    }

    #[test]
    fn test_dead_balls_do_not_collide() {
        let table = Table::default();
        let mut balls = vec![cue(300.0, 250.0), ball(1, BallKind::Solid, 305.0, 250.0)];
        balls[1].alive = false;

        assert!(Physics::check_collisions(&mut balls, &table, false).is_none());
        assert_eq!(balls[1].pos, Vec2::new(305.0, 250.0));
    }

    #[test]
    fn test_pocket_capture() {
        let table = Table::default();
        let corner = table.pockets[0];
        let mut balls = vec![
            cue(corner.x + 5.0, corner.y + 5.0),
            ball(9, BallKind::Stripe, table.pockets[2].x - 5.0, table.pockets[2].y + 5.0),
            ball(8, BallKind::Eight, 400.0, 250.0),
        ];
        balls[0].vel = Vec2::new(-1.0, -1.0);

        let pots = Physics::check_pockets(&mut balls, &table);

        assert_eq!(
            pots,
            vec![
                Pot { ball_index: 0, kind: BallKind::Cue },
                Pot { ball_index: 1, kind: BallKind::Stripe },
            ]
        );
        // Cue ball is parked, not removed
        assert!(balls[0].alive);
        assert!(balls[0].parked);
        assert_eq!(balls[0].pos, CUE_PARK);
        assert_eq!(balls[0].vel, Vec2::ZERO);
        assert!(!balls[1].alive);
        assert!(balls[2].alive);
    }

    #[test]
    fn test_ball_is_never_captured_twice() {
        let table = Table::default();
        let pocket = table.pockets[4];
        let mut balls = vec![cue(300.0, 250.0), ball(1, BallKind::Solid, pocket.x, pocket.y - 5.0)];

        assert_eq!(Physics::check_pockets(&mut balls, &table).len(), 1);
        assert!(Physics::check_pockets(&mut balls, &table).is_empty());

        // A parked cue ball is not re-captured either
        balls[0].pos = pocket;
        balls[0].parked = true;
        assert!(Physics::check_pockets(&mut balls, &table).is_empty());
    }

    #[test]
    fn test_step_leaves_cue_in_hand_alone() {
        let table = Table::default();
        let pocket = table.pockets[1];
        let mut balls = vec![cue(pocket.x, pocket.y + 10.0), ball(1, BallKind::Solid, 300.0, 250.0)];

        let report = Physics::step(&mut balls, &table, true);

        assert!(report.pots.is_empty());
        assert!(!balls[0].parked);
        assert_eq!(balls[0].pos, Vec2::new(pocket.x, pocket.y + 10.0));
    }

    #[test]
    fn test_eight_ball_pot_tag() {
        let table = Table::default();
        let pocket = table.pockets[5];
        let mut balls = vec![cue(300.0, 250.0), ball(8, BallKind::Eight, pocket.x - 3.0, pocket.y - 3.0)];

        let pots = Physics::check_pockets(&mut balls, &table);
        assert_eq!(pots, vec![Pot { ball_index: 1, kind: BallKind::Eight }]);
    }

    #[test]
    fn test_rack_is_stable() {
        let table = Table::default();
        let mut balls = create_balls(&table);
        let before = balls.clone();

        let report = Physics::step(&mut balls, &table, false);

        assert!(report.pots.is_empty());
        assert!(report.first_contact.is_none());
        assert_eq!(balls, before);
        assert!(Physics::all_stopped(&balls));
    }

    #[test]
    fn test_break_shot_hits_rack() {
        let table = Table::default();
        let mut balls = create_balls(&table);
        balls[0].vel = Vec2::new(table.max_shot_speed, 0.0);

        let mut contact = None;
        for _ in 0..200 {
            let report = Physics::step(&mut balls, &table, false);
            if contact.is_none() {
                contact = report.first_contact;
            }
        }

        let contact = contact.expect("break should hit the apex ball");
        assert_eq!(contact.ball_index, 1);
        assert!(balls[1..].iter().any(|b| b.is_moving() || !b.alive));
    }

    #[test]
    fn test_predict_shot_does_not_touch_state() {
        let table = Table::default();
        let balls = create_balls(&table);
        let before = balls.clone();

        let prediction = Physics::predict_shot(&balls, &table, 0.0, 60.0).unwrap();

        assert_eq!(balls, before);
        assert_eq!(prediction.cue_start, table.cue_start);
        let contact = prediction.contact.unwrap();
        assert_eq!(contact.ball_index, 1);
        assert!(prediction.cue_end.x < table.rack_apex.x);
        assert!(prediction.object_path.is_some());
    }

    #[test]
    fn test_predict_shot_without_contact() {
        let table = Table::default();
        let balls = vec![cue(300.0, 250.0)];

        // Straight up, slow enough to stop before the rail
        let prediction = Physics::predict_shot(&balls, &table, -std::f32::consts::FRAC_PI_2, 5.0)
            .unwrap();

        assert!(prediction.contact.is_none());
        assert!(prediction.object_path.is_none());
        assert!(prediction.cue_end.y < 250.0);
        assert!((prediction.cue_end.x - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_predict_needs_cue_on_table() {
        let table = Table::default();
        let mut balls = vec![cue(300.0, 250.0)];
        balls[0].parked = true;
        assert!(Physics::predict_shot(&balls, &table, 0.0, 50.0).is_none());
    }
}
