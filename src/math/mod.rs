//! Math utilities and types for the simulation.
//!
//! This module provides the vector type shared by the collision, movement and
//! diagnostics code, plus the coordinate transformations between the maze grid
//! and world space.
//!
//! # Module Organization
//!
//! - [`vec`] module contains all vector operations
//! - [`coordinates`] module maps between grid cells and world positions

pub mod coordinates;
pub mod vec;

pub use vec::Vec3;
