//! Integer 2D math

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul};

/// 2D integer coordinate or extent.
///
/// Arithmetic wraps at the `i32` boundary instead of panicking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: i32,
    pub y: i32,
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, other: Self) {
        self.x = self.x.wrapping_add(other.x);
        self.y = self.y.wrapping_add(other.y);
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Mul<i32> for Vector2 {
    type Output = Self;

    fn mul(self, factor: i32) -> Self {
        Self::new(self.x.wrapping_mul(factor), self.y.wrapping_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assign_accumulates() {
        let mut v = Vector2::new(1, 2);
        v += Vector2::new(3, -4);
        assert_eq!(v, Vector2::new(4, -2));
        assert_eq!(v + Vector2::new(1, 1), Vector2::new(5, -1));
    }

    #[test]
    fn test_scalar_mul() {
        assert_eq!(Vector2::new(3, -2) * 3, Vector2::new(9, -6));
        assert_eq!(Vector2::new(3, -2) * 0, Vector2::ZERO);
    }

    #[test]
    fn test_identity_operations() {
        let mut pos = Vector2::new(1, 2);
        pos += Vector2::new(0, 0);
        assert_eq!(pos, Vector2::new(1, 2));
        assert_eq!(pos * 1, pos);
    }

    #[test]
    fn test_arithmetic_wraps_at_boundary() {
        let mut v = Vector2::new(i32::MAX, i32::MIN);
        v += Vector2::new(1, -1);
        assert_eq!(v, Vector2::new(i32::MIN, i32::MAX));

        assert_eq!(Vector2::new(i32::MAX, 2) * 2, Vector2::new(-2, 4));
        assert_eq!(Vector2::new(i32::MIN, 0) * -1, Vector2::new(i32::MIN, 0));
    }

    #[test]
    fn test_serializes_as_named_fields() {
        let json = serde_json::to_value(Vector2::new(7, 8)).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 7, "y": 8 }));
    }
}
