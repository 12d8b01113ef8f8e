//! Serialized scene descriptions.
//!
//! A [`SceneDescription`] is the on-disk form of a scene: where the camera
//! sits plus the raw material/plane/sphere lists. It is checked and turned
//! into a [`World`] with [`SceneDescription::to_world`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sol_math::Vec3;

use crate::scene::{Material, Plane, SceneResult, Sphere, World};

/// Camera position and the point it looks at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: Vec3,

    /// Defaults to the origin
    #[serde(default)]
    pub target: Vec3,
}

impl Default for CameraPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.83, 10.0),
            target: Vec3::ZERO,
        }
    }
}

/// A scene as read from a JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraPlacement,

    /// Material 0 is the background
    pub materials: Vec<Material>,

    #[serde(default)]
    pub planes: Vec<Plane>,

    #[serde(default)]
    pub spheres: Vec<Sphere>,
}

impl SceneDescription {
    /// Parse a description from a JSON string.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a description from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let description = Self::from_json_str(&json)?;
        log::info!(
            "Loaded scene {}: {} materials, {} planes, {} spheres",
            path.display(),
            description.materials.len(),
            description.planes.len(),
            description.spheres.len()
        );
        Ok(description)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and build the world.
    pub fn to_world(&self) -> SceneResult<World> {
        World::new(
            self.planes.clone(),
            self.spheres.clone(),
            self.materials.clone(),
        )
    }

    /// The built-in scene: a green ground plane, a dark sphere, a mirror-like
    /// sphere and a red emitter under a blue sky.
    pub fn demo() -> Self {
        let materials = vec![
            // Sky
            Material::emissive(Vec3::new(0.4, 0.4, 0.9)),
            // Ground
            Material::reflective(Vec3::new(0.3, 0.9, 0.3), 0.0),
            Material::reflective(Vec3::new(0.2, 0.2, 0.2), 0.0),
            Material::reflective(Vec3::new(0.8, 0.95, 0.8), 0.94),
            // Light
            Material::emissive(Vec3::new(5.0, 1.0, 1.0)),
        ];

        let planes = vec![Plane::new(Vec3::Y, 0.0, 1)];

        let spheres = vec![
            Sphere::new(Vec3::new(0.0, 0.0, 0.0), 1.0, 2),
            Sphere::new(Vec3::new(3.0, 0.0, 2.0), 1.0, 3),
            Sphere::new(Vec3::new(2.5, 2.0, -5.0), 1.0, 4),
        ];

        Self {
            camera: CameraPlacement::default(),
            materials,
            planes,
            spheres,
        }
    }
}
