//! Tether Engine Core
//!
//! Contains the native object model and the script bridge:
//! - Game objects owned by a generational `World`
//! - Type-indexed component storage
//! - Script components backed by a foreign runtime
//! - Integer 2D math

pub mod ecs;
pub mod math;
pub mod script;

pub use math::Vector2;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
