//! # Geometry
//!
//! Integer user-space value types. The Y axis points up: the bottom of a
//! page is `0` and a node placed below its predecessor gets a *smaller* Y.

use serde::{Deserialize, Serialize};

/// A point in user space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Edge values used for style padding and page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Padding {
    pub fn uniform(v: i32) -> Self {
        Self {
            left: v,
            right: v,
            top: v,
            bottom: v,
        }
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    /// Parse `"v"`, `"v h"` or `"top right bottom left"` (CSS order).
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<i32> = s
            .split_whitespace()
            .map(|p| p.parse::<i32>().ok())
            .collect::<Option<Vec<_>>>()?;
        match parts.as_slice() {
            [v] => Some(Self::uniform(*v)),
            [v, h] => Some(Self {
                left: *h,
                right: *h,
                top: *v,
                bottom: *v,
            }),
            [t, r, b, l] => Some(Self {
                left: *l,
                right: *r,
                top: *t,
                bottom: *b,
            }),
            _ => None,
        }
    }
}

/// An axis-aligned rectangle, `top >= bottom` and `right >= left` once a
/// layout pass has completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl Rectangle {
    pub fn new(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.top - self.bottom
    }

    pub fn bottom_left(&self) -> Position {
        Position::new(self.left, self.bottom)
    }

    pub fn top_left(&self) -> Position {
        Position::new(self.left, self.top)
    }

    pub fn is_valid(&self) -> bool {
        self.top >= self.bottom && self.right >= self.left
    }

    /// Shrink by a padding box. Never inverts the rectangle.
    pub fn inset(&self, padding: &Padding) -> Rectangle {
        let left = self.left + padding.left;
        let right = (self.right - padding.right).max(left);
        let top = self.top - padding.top;
        let bottom = (self.bottom + padding.bottom).min(top);
        Rectangle::new(left, bottom, right, top)
    }

    /// Same horizontal extent, collapsed to zero height at `top`.
    pub fn collapsed_at(&self, top: i32) -> Rectangle {
        Rectangle::new(self.left, top, self.right, top)
    }

    /// Shift vertically, preserving height.
    pub fn moved_to_top(&self, top: i32) -> Rectangle {
        let height = self.height();
        Rectangle::new(self.left, top - height, self.right, top)
    }

    pub fn contains(&self, other: &Rectangle) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top <= self.top
            && other.bottom >= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_dimensions() {
        let r = Rectangle::new(10, 20, 110, 220);
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 200);
        assert_eq!(r.bottom_left(), Position::new(10, 20));
    }

    #[test]
    fn inset_never_inverts() {
        let r = Rectangle::new(0, 0, 10, 10);
        let inner = r.inset(&Padding::uniform(8));
        assert!(inner.is_valid());
        assert_eq!(inner.top, 2);
        assert_eq!(inner.bottom, 2);
    }

    #[test]
    fn moved_to_top_preserves_height() {
        let r = Rectangle::new(0, 40, 50, 100);
        let moved = r.moved_to_top(70);
        assert_eq!(moved, Rectangle::new(0, 10, 50, 70));
    }

    #[test]
    fn parse_padding_forms() {
        assert_eq!(Padding::parse("4"), Some(Padding::uniform(4)));
        let p = Padding::parse("1 2 3 4").unwrap();
        assert_eq!((p.top, p.right, p.bottom, p.left), (1, 2, 3, 4));
        let p = Padding::parse("5 6").unwrap();
        assert_eq!((p.top, p.left), (5, 6));
        assert_eq!(Padding::parse("1 2 3"), None);
        assert_eq!(Padding::parse("x"), None);
    }
}
