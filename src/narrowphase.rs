use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Default inward tolerance: bodies must share at least one pixel on each axis.
pub const OVERLAP_TOLERANCE: f32 = 1.0;

/// Pairwise rectangle tests.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn overlap_within(a: &Body, b: &Body, offset: Vec2, tolerance: f32) -> bool {
        // Each axis is written as "a reaches into b" and "b reaches into a"
        // so swapping the arguments only swaps the two conditions.
        let b_min = b.pos + offset;
        let b_max = b_min + b.size;
        let a_max = a.pos + a.size;
        a_max.x - b_min.x >= tolerance
            && b_max.x - a.pos.x >= tolerance
            && a_max.y - b_min.y >= tolerance
            && b_max.y - a.pos.y >= tolerance
    }

    fn overlaps(a: &Body, b: &Body) -> bool {
        Self::overlap_within(a, b, Vec2::ZERO, OVERLAP_TOLERANCE)
    }

    fn overlaps_offset(a: &Body, b: &Body, off_x: f32, off_y: f32) -> bool {
        Self::overlap_within(a, b, Vec2::new(off_x, off_y), OVERLAP_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_two_pixel_penetration() {
        let a = Body::new(0.0, 0.0, 32.0, 32.0);
        let b = Body::new(30.0, 0.0, 32.0, 32.0);
        assert!(Narrowphase::overlaps(&a, &b));
    }

    #[test]
    fn test_overlap_edge_touch_is_not_a_hit() {
        let a = Body::new(0.0, 0.0, 32.0, 32.0);
        let b = Body::new(32.0, 0.0, 32.0, 32.0);
        assert!(!Narrowphase::overlaps(&a, &b));
        let below = Body::new(0.0, 32.0, 32.0, 32.0);
        assert!(!Narrowphase::overlaps(&a, &below));
    }

    #[test]
    fn test_overlap_one_pixel_is_enough() {
        let a = Body::new(0.0, 0.0, 16.0, 16.0);
        let b = Body::new(15.0, 15.0, 16.0, 16.0);
        assert!(Narrowphase::overlaps(&a, &b));
        let c = Body::new(15.5, 0.0, 16.0, 16.0);
        assert!(!Narrowphase::overlaps(&a, &c));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let bodies = [
            Body::new(0.0, 0.0, 32.0, 32.0),
            Body::new(30.0, 0.0, 32.0, 32.0),
            Body::new(32.0, 0.0, 32.0, 32.0),
            Body::new(-10.5, 20.25, 12.0, 40.0),
            Body::new(5.0, 5.0, 4.0, 4.0),
            Body::new(1.0, 31.0, 100.0, 3.0),
            Body::new(0.3, -7.7, 0.5, 0.5),
        ];
        for a in &bodies {
            for b in &bodies {
                assert_eq!(
                    Narrowphase::overlaps(a, b),
                    Narrowphase::overlaps(b, a),
                    "asymmetric for {:?} / {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_offset_zero_matches_plain() {
        let a = Body::new(0.0, 0.0, 32.0, 32.0);
        for x in [-40.0, -31.0, -30.5, 0.0, 12.0, 31.0, 32.0, 50.0] {
            let b = Body::new(x, x * 0.5, 32.0, 32.0);
            assert_eq!(
                Narrowphase::overlaps_offset(&a, &b, 0.0, 0.0),
                Narrowphase::overlaps(&a, &b)
            );
        }
    }

    #[test]
    fn test_offset_shifts_second_body() {
        let hostile = Body::new(0.0, 32.0, 32.0, 32.0);
        let player = Body::new(0.0, 0.0, 32.0, 32.0);
        assert!(!Narrowphase::overlaps(&hostile, &player));
        // Pushing the player 2px down makes it sink into the hostile.
        assert!(Narrowphase::overlaps_offset(&hostile, &player, 0.0, 2.0));
        // Pushing it up keeps them apart.
        assert!(!Narrowphase::overlaps_offset(&hostile, &player, 0.0, -2.0));
    }

    #[test]
    fn test_zero_tolerance_counts_touching() {
        let a = Body::new(0.0, 0.0, 32.0, 32.0);
        let b = Body::new(32.0, 0.0, 32.0, 32.0);
        assert!(Narrowphase::overlap_within(&a, &b, Vec2::ZERO, 0.0));
    }
}
