//! Rectangle used for output geometry and usable work areas.
#![allow(clippy::module_name_repetitions)]
use super::Margins;
use serde::{Deserialize, Serialize};

/// Placement and size, x,y from top left.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Copy)]
pub struct Xyhw {
    x: i32,
    y: i32,
    h: i32,
    w: i32,
}

impl Xyhw {
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, h, w }
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn w(&self) -> i32 {
        self.w
    }

    #[must_use]
    pub const fn h(&self) -> i32 {
        self.h
    }

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[must_use]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        (self.x <= x && x < self.right()) && (self.y <= y && y < self.bottom())
    }

    /// Shrinks the rectangle by the given margins. Width and height never go negative.
    #[must_use]
    pub fn shrink(&self, margins: Margins) -> Self {
        let top = clamp_i32(margins.top);
        let bottom = clamp_i32(margins.bottom);
        let left = clamp_i32(margins.left);
        let right = clamp_i32(margins.right);
        Self {
            x: self.x.saturating_add(left),
            y: self.y.saturating_add(top),
            w: self.w.saturating_sub(left).saturating_sub(right).max(0),
            h: self.h.saturating_sub(top).saturating_sub(bottom).max(0),
        }
    }
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_should_remove_margins_from_every_side() {
        let area = Xyhw::new(0, 0, 1920, 1080);
        let margins = Margins {
            top: 25,
            bottom: 5,
            left: 10,
            right: 0,
        };
        assert_eq!(area.shrink(margins), Xyhw::new(10, 25, 1910, 1050));
    }

    #[test]
    fn shrink_should_never_produce_negative_sizes() {
        let area = Xyhw::new(0, 0, 100, 100);
        let margins = Margins {
            top: 80,
            bottom: 80,
            left: 0,
            right: 0,
        };
        assert_eq!(area.shrink(margins).h(), 0);
    }

    #[test]
    fn contains_point_is_exclusive_on_far_edges() {
        let area = Xyhw::new(0, 0, 10, 10);
        assert!(area.contains_point(0, 0));
        assert!(area.contains_point(9, 9));
        assert!(!area.contains_point(10, 5));
    }
}
