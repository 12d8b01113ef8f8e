//! Scene model for the path tracer.
//!
//! A [`World`] is a flat set of planes, spheres and the materials they
//! reference by index. It is validated once at construction and then only
//! borrowed immutably while rendering, so the hot path never has to check
//! indices or radii.

use serde::{Deserialize, Serialize};
use sol_math::Vec3;
use thiserror::Error;

/// Errors that can occur while building or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Scene has no materials; material 0 (background) is required")]
    NoMaterials,

    #[error("{primitive} references material {index}, but only {count} materials exist")]
    MaterialOutOfRange {
        primitive: String,
        index: usize,
        count: usize,
    },

    #[error("{primitive} references material 0, which is reserved for the background")]
    ReservedMaterial { primitive: String },

    #[error("Sphere {index} has non-positive radius {radius}")]
    InvalidRadius { index: usize, radius: f32 },

    #[error("Material {index} has specularity {value} outside [0, 1]")]
    InvalidSpecularity { index: usize, value: f32 },

    #[error("Non-finite value in {what}")]
    NonFinite { what: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// How a surface responds to light.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Emitted radiance (RGB, may exceed 1 for lights)
    #[serde(default)]
    pub emit: Vec3,

    /// Reflectance (RGB, 0-1)
    #[serde(default)]
    pub reflect: Vec3,

    /// Blend between diffuse (0) and mirror (1) bounces
    #[serde(default)]
    pub specularity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            emit: Vec3::ZERO,
            reflect: Vec3::ZERO,
            specularity: 0.0,
        }
    }
}

impl Material {
    /// A purely emissive material. Used for the background and for lights.
    pub fn emissive(emit: Vec3) -> Self {
        Self {
            emit,
            ..Default::default()
        }
    }

    /// A non-emissive material.
    pub fn reflective(reflect: Vec3, specularity: f32) -> Self {
        Self {
            emit: Vec3::ZERO,
            reflect,
            specularity,
        }
    }

    /// Check if this material emits light.
    pub fn is_emissive(&self) -> bool {
        self.emit.length_squared() > 0.0
    }
}

/// An infinite plane `dot(normal, p) + offset = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal (not normalized for you)
    pub normal: Vec3,

    /// Signed distance term
    pub offset: f32,

    /// Index into the world's materials
    pub material: usize,
}

impl Plane {
    pub fn new(normal: Vec3, offset: f32, material: usize) -> Self {
        Self {
            normal,
            offset,
            material,
        }
    }
}

/// A solid sphere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,

    /// Index into the world's materials
    pub material: usize,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: usize) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

/// Index of the background material. Rays that hit nothing report it.
pub const BACKGROUND_MATERIAL: usize = 0;

/// The complete, validated scene.
#[derive(Clone, Debug)]
pub struct World {
    planes: Vec<Plane>,
    spheres: Vec<Sphere>,
    materials: Vec<Material>,
}

impl World {
    /// Build a world, checking every invariant the renderer relies on.
    ///
    /// Material 0 is the background and must exist. Primitives must reference
    /// one of the other materials.
    pub fn new(
        planes: Vec<Plane>,
        spheres: Vec<Sphere>,
        materials: Vec<Material>,
    ) -> SceneResult<Self> {
        if materials.is_empty() {
            return Err(SceneError::NoMaterials);
        }

        for (i, material) in materials.iter().enumerate() {
            check_finite(material.emit, || format!("material {} emit", i))?;
            check_finite(material.reflect, || format!("material {} reflect", i))?;
            if !(0.0..=1.0).contains(&material.specularity) {
                return Err(SceneError::InvalidSpecularity {
                    index: i,
                    value: material.specularity,
                });
            }
        }

        for (i, plane) in planes.iter().enumerate() {
            let name = || format!("plane {}", i);
            check_finite(plane.normal, name)?;
            if !plane.offset.is_finite() {
                return Err(SceneError::NonFinite { what: name() });
            }
            check_material(plane.material, materials.len(), name)?;
        }

        for (i, sphere) in spheres.iter().enumerate() {
            let name = || format!("sphere {}", i);
            check_finite(sphere.center, name)?;
            if !(sphere.radius > 0.0) || !sphere.radius.is_finite() {
                return Err(SceneError::InvalidRadius {
                    index: i,
                    radius: sphere.radius,
                });
            }
            check_material(sphere.material, materials.len(), name)?;
        }

        log::debug!(
            "World built: {} planes, {} spheres, {} materials",
            planes.len(),
            spheres.len(),
            materials.len()
        );

        Ok(Self {
            planes,
            spheres,
            materials,
        })
    }

    /// A world with no primitives. Every ray sees `background`.
    pub fn empty(background: Material) -> Self {
        Self {
            planes: Vec::new(),
            spheres: Vec::new(),
            materials: vec![background],
        }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Get a material by index.
    ///
    /// Indices stored in primitives are always valid, so the renderer can
    /// index directly.
    #[inline]
    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    /// The background material (index 0).
    pub fn background(&self) -> &Material {
        &self.materials[BACKGROUND_MATERIAL]
    }

    /// Total number of primitives.
    pub fn primitive_count(&self) -> usize {
        self.planes.len() + self.spheres.len()
    }
}

fn check_finite(v: Vec3, what: impl FnOnce() -> String) -> SceneResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SceneError::NonFinite { what: what() })
    }
}

fn check_material(index: usize, count: usize, primitive: impl Fn() -> String) -> SceneResult<()> {
    if index == BACKGROUND_MATERIAL {
        return Err(SceneError::ReservedMaterial {
            primitive: primitive(),
        });
    }
    if index >= count {
        return Err(SceneError::MaterialOutOfRange {
            primitive: primitive(),
            index,
            count,
        });
    }
    Ok(())
}
