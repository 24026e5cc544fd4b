//! Initial ball layout.

use crate::types::{Ball, BallColor, BallKind, Table, Vec2};

/// Triangle size (columns)
pub const RACK_ROWS: usize = 5;

/// Triangle slot (column, row) reserved for the eight ball
pub const EIGHT_SLOT: (usize, usize) = (2, 1);

/// Build the 16 balls: cue ball first, then the 14 object balls in rack
/// order, then the eight ball last. Object balls alternate solid/stripe in
/// color order.
pub fn create_balls(table: &Table) -> Vec<Ball> {
    let r = table.ball_radius;
    let spacing = table.rack_spacing();
    let apex = table.rack_apex;

    let mut balls = Vec::with_capacity(16);
    balls.push(Ball::new(0, BallColor::White, BallKind::Cue, table.cue_start));

    // (number, color, kind): solid n is followed by the stripe n + 8
    let mut object_balls = BallColor::OBJECT_COLORS
        .iter()
        .enumerate()
        .flat_map(|(i, &color)| {
            let solid = i as u8 + 1;
            [
                (solid, color, BallKind::Solid),
                (solid + 8, color, BallKind::Stripe),
            ]
        });

    let mut eight = None;
    for col in 0..RACK_ROWS {
        for row in 0..=col {
            let pos = Vec2::new(
                apex.x + col as f32 * spacing,
                apex.y - col as f32 * r + row as f32 * spacing,
            );

            if (col, row) == EIGHT_SLOT {
                eight = Some(Ball::new(8, BallColor::Black, BallKind::Eight, pos));
            } else if let Some((number, color, kind)) = object_balls.next() {
                balls.push(Ball::new(number, color, kind, pos));
            }
        }
    }
    balls.extend(eight);

    log::debug!("Racked {} balls", balls.len());
    balls
}

/// Index of the eight ball (always last)
pub fn eight_ball_index(balls: &[Ball]) -> Option<usize> {
    balls.iter().rposition(|b| b.is_eight())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rack_composition() {
        let balls = create_balls(&Table::default());

        assert_eq!(balls.len(), 16);
        assert_eq!(balls.iter().filter(|b| b.is_cue()).count(), 1);
        assert_eq!(balls.iter().filter(|b| b.is_eight()).count(), 1);
        assert_eq!(balls.iter().filter(|b| b.kind == BallKind::Solid).count(), 7);
        assert_eq!(balls.iter().filter(|b| b.kind == BallKind::Stripe).count(), 7);
        assert!(balls[0].is_cue());
        assert!(balls[15].is_eight());
        assert_eq!(eight_ball_index(&balls), Some(15));
    }

    #[test]
    fn test_one_ball_per_color_and_stripe() {
        let balls = create_balls(&Table::default());
        let combos: HashSet<_> = balls
            .iter()
            .filter(|b| b.kind == BallKind::Solid || b.kind == BallKind::Stripe)
            .map(|b| (b.color, b.is_striped()))
            .collect();
        assert_eq!(combos.len(), 14);

        let numbers: HashSet<_> = balls.iter().map(|b| b.number).collect();
        assert_eq!(numbers.len(), 16);
    }

    #[test]
    fn test_rack_alternates_solids_and_stripes() {
        let balls = create_balls(&Table::default());
        for (i, ball) in balls[1..15].iter().enumerate() {
            let expected = if i % 2 == 0 {
                BallKind::Solid
            } else {
                BallKind::Stripe
            };
            assert_eq!(ball.kind, expected, "rack slot {}", i);
        }
    }

    #[test]
    fn test_eight_ball_in_triangle_center() {
        let table = Table::default();
        let balls = create_balls(&table);
        let spacing = table.ball_radius * 2.0 + 1.0;
        let eight = balls[15];

        assert!((eight.pos.x - (table.rack_apex.x + 2.0 * spacing)).abs() < 1e-4);
        assert!((eight.pos.y - table.rack_apex.y).abs() <= 1.0 + 1e-4);
    }

    #[test]
    fn test_rack_inside_bounds() {
        let table = Table::default();
        for ball in create_balls(&table) {
            assert!(table.contains(ball.pos), "ball {} at {:?}", ball.number, ball.pos);
            assert_eq!(ball.vel, Vec2::ZERO);
            assert!(ball.alive);
        }
    }
}
