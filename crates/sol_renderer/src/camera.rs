//! Pinhole camera with a unit film plane.

use sol_math::{Ray, Vec3, VectorExt};

/// Camera for generating primary rays into the scene.
///
/// The film sits one unit in front of the camera. Its longer side spans one
/// unit and the shorter side is scaled by the image aspect ratio.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    position: Vec3,
    x_axis: Vec3,
    y_axis: Vec3,
    z_axis: Vec3,

    // Film
    film_center: Vec3,
    film_half_w: f32,
    film_half_h: f32,
    half_pixel_w: f32,
    half_pixel_h: f32,
}

/// Distance from the camera position to the film plane.
const FILM_DISTANCE: f32 = 1.0;

impl Camera {
    /// Create a camera at `position` looking at the origin.
    pub fn new(position: Vec3, width: u32, height: u32) -> Self {
        Self::looking_at(position, Vec3::ZERO, width, height)
    }

    /// Create a camera at `position` looking at `target`.
    ///
    /// The basis is built against +X, so a view direction parallel to X
    /// collapses the basis to zero vectors. Rays then all have zero direction
    /// and see only the background.
    pub fn looking_at(position: Vec3, target: Vec3, width: u32, height: u32) -> Self {
        let z_axis = (position - target).normalize_zero();
        let y_axis = z_axis.cross(Vec3::X).normalize_zero();
        let x_axis = y_axis.cross(z_axis).normalize_zero();

        if x_axis == Vec3::ZERO {
            log::warn!(
                "Degenerate camera basis for position {} target {}",
                position,
                target
            );
        }

        let mut film_w = 1.0;
        let mut film_h = 1.0;
        if width > height {
            film_h = film_w * (height as f32 / width as f32);
        } else if height > width {
            film_w = film_h * (width as f32 / height as f32);
        }

        Self {
            image_width: width,
            image_height: height,
            position,
            x_axis,
            y_axis,
            z_axis,
            film_center: position - FILM_DISTANCE * z_axis,
            film_half_w: 0.5 * film_w,
            film_half_h: 0.5 * film_h,
            half_pixel_w: 0.5 / width as f32,
            half_pixel_h: 0.5 / height as f32,
        }
    }

    /// Generate the primary ray through pixel (`row`, `col`).
    ///
    /// Row 0 is the bottom of the film. The ray is the same for every sample
    /// of a pixel.
    pub fn primary_ray(&self, row: u32, col: u32) -> Ray {
        let film_y = -1.0 + 2.0 * (row as f32 / self.image_height as f32);
        let film_x = -1.0 + 2.0 * (col as f32 / self.image_width as f32);

        let offset_x = film_x + self.half_pixel_w;
        let offset_y = film_y + self.half_pixel_h;

        let film_p = self.film_center
            + offset_x * self.film_half_w * self.x_axis
            + offset_y * self.film_half_h * self.y_axis;

        Ray::new(self.position, (film_p - self.position).normalize_zero())
    }

    /// Camera basis as (x, y, z). `z` points away from the view direction.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.x_axis, self.y_axis, self.z_axis)
    }

    /// Half extents of the film plane.
    pub fn film_half_extent(&self) -> (f32, f32) {
        (self.film_half_w, self.film_half_h)
    }
}
