//! Core types and utilities

pub mod convergence;
pub mod soil_texture;
pub mod units;

pub use convergence::Convergence;
pub use soil_texture::{SoilTexture, SoilType};
pub use units::*;
