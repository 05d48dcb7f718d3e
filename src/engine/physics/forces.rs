use eframe::egui::Vec2;

const MIN_DISTANCE: f32 = 0.0001;

/// Push on the body at `delta` (its offset from the other body) when the two
/// are closer than `reach`. Exact overlaps carry no direction and are skipped.
pub(super) fn repulsion_between(delta: Vec2, reach: f32, strength: f32) -> Option<Vec2> {
    if delta.x.abs() >= reach || delta.y.abs() >= reach {
        return None;
    }

    let distance_sq = delta.length_sq();
    if distance_sq <= MIN_DISTANCE * MIN_DISTANCE {
        return None;
    }
    let distance = distance_sq.sqrt();
    if distance >= reach {
        return None;
    }

    let overlap = reach - distance;
    let direction = delta / distance;
    Some(direction * (strength * overlap / distance.max(1.0)))
}

/// Spring toward the ideal orbit plus a constant weak pull, both along
/// `to_parent`. Only the child receives it.
pub(super) fn parent_attraction(
    to_parent: Vec2,
    ideal_distance: f32,
    spring_strength: f32,
    pull: f32,
    scale: f32,
) -> Vec2 {
    let distance = to_parent.length();
    if distance <= MIN_DISTANCE {
        return Vec2::ZERO;
    }
    let direction = to_parent / distance;
    let spring = (distance - ideal_distance) * spring_strength;
    direction * (spring + pull) * scale
}

/// Inverse-distance push away from the drag pointer plus a share of the
/// pointer's velocity, fading out at `radius`.
pub(super) fn drag_push(
    from_pointer: Vec2,
    drag_velocity: Vec2,
    radius: f32,
    strength: f32,
    wake_fraction: f32,
) -> Vec2 {
    let distance = from_pointer.length();
    if distance >= radius || distance <= MIN_DISTANCE {
        return Vec2::ZERO;
    }
    let direction = from_pointer / distance;
    let push = direction * strength * (radius / distance - 1.0);
    let wake = drag_velocity * wake_fraction * (1.0 - distance / radius);
    push + wake
}

pub(super) fn clamp_length(value: Vec2, max: f32) -> Vec2 {
    let length_sq = value.length_sq();
    if length_sq > max * max && length_sq > 0.0 {
        value * (max / length_sq.sqrt())
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn repulsion_points_away_and_grows_with_overlap() {
        let near = repulsion_between(vec2(10.0, 0.0), 110.0, 1.0).expect("overlapping");
        let far = repulsion_between(vec2(80.0, 0.0), 110.0, 1.0).expect("overlapping");
        assert!(near.x > far.x && far.x > 0.0);
        assert_eq!(near.y, 0.0);
    }

    #[test]
    fn repulsion_skips_distant_and_coincident_pairs() {
        assert!(repulsion_between(vec2(200.0, 0.0), 110.0, 1.0).is_none());
        // inside the bounding box but outside the circle
        assert!(repulsion_between(vec2(100.0, 100.0), 110.0, 1.0).is_none());
        assert!(repulsion_between(Vec2::ZERO, 110.0, 1.0).is_none());
    }

    #[test]
    fn parent_attraction_pulls_in_from_beyond_the_orbit() {
        let force = parent_attraction(vec2(300.0, 0.0), 200.0, 0.01, 0.05, 1.0);
        assert!(force.x > 0.0);
        let inside = parent_attraction(vec2(50.0, 0.0), 200.0, 0.01, 0.05, 1.0);
        assert!(inside.x < 0.0, "pushed back out toward the orbit");
        let scaled = parent_attraction(vec2(300.0, 0.0), 200.0, 0.01, 0.05, 0.5);
        assert!((scaled.x - force.x * 0.5).abs() < 1e-6);
    }

    #[test]
    fn drag_push_fades_to_zero_at_radius() {
        let close = drag_push(vec2(20.0, 0.0), Vec2::ZERO, 170.0, 0.6, 0.2);
        let edge = drag_push(vec2(169.0, 0.0), Vec2::ZERO, 170.0, 0.6, 0.2);
        assert!(close.x > edge.x && edge.x >= 0.0);
        assert_eq!(drag_push(vec2(200.0, 0.0), vec2(5.0, 0.0), 170.0, 0.6, 0.2), Vec2::ZERO);
        let wake = drag_push(vec2(0.0, 85.0), vec2(10.0, 0.0), 170.0, 0.0, 0.2);
        assert!((wake.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn clamp_length_caps_magnitude() {
        let capped = clamp_length(vec2(30.0, 40.0), 10.0);
        assert!((capped.length() - 10.0).abs() < 1e-5);
        assert_eq!(clamp_length(vec2(3.0, 4.0), 10.0), vec2(3.0, 4.0));
    }
}
