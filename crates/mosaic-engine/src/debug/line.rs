use glam::{Vec2, Vec3};

/// One debug line segment with a frame countdown.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Line2D {
    pub start: Vec2,
    pub end: Vec2,
    pub color: Vec3,
    lifetime: i32,
}

impl Line2D {
    pub fn new(start: Vec2, end: Vec2, color: Vec3, lifetime: i32) -> Self {
        Self {
            start,
            end,
            color,
            lifetime,
        }
    }

    /// Frames left before eviction.
    #[inline]
    pub fn lifetime(&self) -> i32 {
        self.lifetime
    }

    /// Counts one frame down and returns what is left. Negative means expired.
    #[inline]
    pub fn begin_frame(&mut self) -> i32 {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_past_zero() {
        let mut l = Line2D::new(Vec2::ZERO, Vec2::ONE, Vec3::ONE, 1);
        assert_eq!(l.begin_frame(), 0);
        assert_eq!(l.begin_frame(), -1);
        assert_eq!(l.lifetime(), -1);
    }

    #[test]
    fn most_negative_lifetime_stays_expired() {
        let mut l = Line2D::new(Vec2::ZERO, Vec2::ONE, Vec3::ONE, i32::MIN);
        assert_eq!(l.begin_frame(), i32::MIN);
    }
}
