//! Sol Core - Scene model for the Sol path tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `World`, `Plane`, `Sphere`, `Material`
//! - **Scene files**: JSON scene descriptions and the built-in demo scene
//!
//! # Example
//!
//! ```ignore
//! use sol_core::SceneDescription;
//!
//! let description = SceneDescription::load("scene.json")?;
//! let world = description.to_world()?;
//! println!("Loaded {} primitives", world.primitive_count());
//! ```

pub mod description;
pub mod scene;

// Re-export commonly used types
pub use description::{CameraPlacement, SceneDescription};
pub use scene::{
    Material, Plane, SceneError, SceneResult, Sphere, World, BACKGROUND_MATERIAL,
};
