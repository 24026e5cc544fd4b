//! Small vector helpers shared by the physics and the AI.

use glam::Vec2;

/// Angle (radians) of the direction from `from` to `to`
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector from `a` to `b`. Coincident points fall back to +x so that
/// overlapping balls still get pushed apart.
pub fn contact_normal(a: Vec2, b: Vec2) -> Vec2 {
    (b - a).try_normalize().unwrap_or(Vec2::X)
}

/// Split `v` into (normal, tangential) scalar components along unit `n`
pub fn decompose(v: Vec2, n: Vec2) -> (f32, f32) {
    (v.dot(n), v.dot(n.perp()))
}

/// Index and distance of the point in `points` closest to `target`
pub fn nearest(points: &[Vec2], target: Vec2) -> Option<(usize, f32)> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.distance(target)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Where the cue ball's center must be at contact to send `target` toward
/// `pocket`: one diameter behind the target on the pocket line.
pub fn ghost_ball(target: Vec2, pocket: Vec2, diameter: f32) -> Option<Vec2> {
    let line = (pocket - target).try_normalize()?;
    Some(target - line * diameter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_angle_to() {
        assert!(angle_to(Vec2::ZERO, Vec2::new(5.0, 0.0)).abs() < 1e-6);
        assert!((angle_to(Vec2::ZERO, Vec2::new(0.0, 3.0)) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_contact_normal_fallback() {
        let n = contact_normal(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0));
        assert_eq!(n, Vec2::X);

        let n = contact_normal(Vec2::ZERO, Vec2::new(0.0, -4.0));
        assert!((n - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_decompose() {
        let n = Vec2::X;
        let (normal, tangent) = decompose(Vec2::new(3.0, -2.0), n);
        assert!((normal - 3.0).abs() < 1e-6);
        assert!((tangent + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_nearest() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(4.0, 4.0)];
        let (idx, dist) = nearest(&points, Vec2::new(9.0, 1.0)).unwrap();
        assert_eq!(idx, 1);
        assert!((dist - 2f32.sqrt()).abs() < 1e-5);
        assert!(nearest(&[], Vec2::ZERO).is_none());
    }

    #[test]
    fn test_ghost_ball() {
        // Pocket straight to the right: ghost ball sits one diameter to the left
        let ghost = ghost_ball(Vec2::new(100.0, 50.0), Vec2::new(200.0, 50.0), 24.0).unwrap();
        assert!((ghost - Vec2::new(76.0, 50.0)).length() < 1e-4);

        // Target sitting on the pocket center has no aim line
        assert!(ghost_ball(Vec2::ONE, Vec2::ONE, 24.0).is_none());
    }
}
