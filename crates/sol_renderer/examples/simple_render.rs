//! Simple path tracer example.
//!
//! Renders the built-in demo scene and saves it in PPM format.

use sol_core::SceneDescription;
use sol_renderer::{render, unpack_rgba8, Camera, Image, OsThreads, RenderConfig, TileOrder};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() {
    println!("Sol Path Tracer - Simple Example");
    println!("================================");

    let description = SceneDescription::demo();
    let world = description.to_world().expect("Demo scene is valid");

    let camera = Camera::looking_at(
        description.camera.position,
        description.camera.target,
        640,
        360,
    );

    let config = RenderConfig::default()
        .with_quality(16, 8)
        .with_tiles(32, TileOrder::Spiral);

    println!(
        "Rendering {}x{} @ {} rays/pixel on {} workers...",
        camera.image_width, camera.image_height, config.rays_per_pixel, config.workers
    );

    let start = std::time::Instant::now();
    let image = render(&world, &camera, &config, &OsThreads).expect("Render failed");
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    save_ppm(&image, filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn save_ppm(image: &Image, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    // PPM is top-down; row 0 of the image is the bottom
    for row in (0..image.height).rev() {
        for col in 0..image.width {
            let [r, g, b, _] = unpack_rgba8(image.get(row, col));
            writeln!(writer, "{} {} {}", r, g, b)?;
        }
    }

    Ok(())
}
