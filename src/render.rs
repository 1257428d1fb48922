//! Render driver (spec §4.9, §5): tile-parallel sample accumulation, gamma,
//! clamp, and byte quantization. No terminal display here — the CLI writes
//! the framebuffer straight to PNG.

use crate::camera::Camera;
use crate::integrator::ray_color;
use crate::math::Color;
use crate::scene::Scene;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Height, in scanlines, of one parallel work unit (spec §5: "partition the
/// image into tiles and dispatch one tile per worker").
const TILE_ROWS: u32 = 16;

pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Framebuffer {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width * height * 3) as usize],
        }
    }
}

/// Averages `spp` samples for one pixel, applies `sqrt` gamma, clamps to
/// `[0, 0.999]`, and quantizes to a byte (spec §4.9, §8 invariant 8).
pub(crate) fn quantize_channel(sum: f64, spp: u32) -> u8 {
    let averaged = sum / spp as f64;
    let gamma = averaged.max(0.0).sqrt();
    (256.0 * gamma.clamp(0.0, 0.999)) as u8
}

/// Renders `scene` through `camera`, returning a row-major top-to-bottom
/// RGB byte buffer (spec §4.9, §6). Each scanline tile is independent
/// (spec §5): no shared mutable state across workers, one PRNG stream per
/// tile seeded deterministically from its first row so repeat renders are
/// reproducible (spec §8: "same seed produces identical CPU output").
pub fn render(scene: &Scene, camera: &Camera) -> Framebuffer {
    let width = camera.image_width;
    let height = camera.image_height;
    let spp = camera.samples_per_pixel;
    let max_depth = camera.max_depth;

    info!(
        "rendering {width}x{height} at {spp} spp, max_depth={max_depth}, {} tile rows",
        TILE_ROWS
    );

    let mut framebuffer = Framebuffer::new(width, height);
    let row_chunks: Vec<(u32, &mut [u8])> = framebuffer
        .pixels
        .chunks_mut((width * 3) as usize)
        .enumerate()
        .map(|(row, chunk)| (row as u32, chunk))
        .collect();

    row_chunks
        .into_par_iter()
        .chunks(TILE_ROWS as usize)
        .for_each(|tile| {
            let tile_seed = tile.first().map(|(row, _)| *row).unwrap_or(0) as u64;
            let mut rng = SmallRng::seed_from_u64(tile_seed);

            for (row, pixels) in tile {
                for col in 0..width {
                    let mut sum = Color::zero();
                    for _ in 0..spp {
                        let ray = camera.get_ray(col, row, &mut rng);
                        sum += ray_color(scene, ray, max_depth, &mut rng);
                    }
                    let base = (col * 3) as usize;
                    pixels[base] = quantize_channel(sum.x, spp);
                    pixels[base + 1] = quantize_channel(sum.y, spp);
                    pixels[base + 2] = quantize_channel(sum.z, spp);
                }
            }
        });

    framebuffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_clamps_to_byte_range() {
        assert_eq!(quantize_channel(0.0, 1), 0);
        assert_eq!(quantize_channel(1000.0, 1), 255);
    }

    #[test]
    fn quantize_applies_sqrt_gamma() {
        // average=0.25 -> gamma=0.5 -> 256*0.5 = 128
        let byte = quantize_channel(0.25, 1);
        assert_eq!(byte, 128);
    }

    #[test]
    fn render_produces_full_row_major_buffer() {
        use crate::camera::CameraConfig;
        use crate::material::MaterialArrays;

        let scene = Scene::new(vec![], vec![], MaterialArrays::new());
        let config = CameraConfig {
            image_width: 8,
            aspect_ratio: 1.0,
            samples_per_pixel: 2,
            max_depth: 4,
            ..CameraConfig::default()
        };
        let camera = Camera::new(&config);
        let fb = render(&scene, &camera);
        assert_eq!(fb.pixels.len(), (fb.width * fb.height * 3) as usize);
        // Empty scene: every pixel is the sky gradient, never pure black.
        assert!(fb.pixels.iter().any(|&b| b > 0));
    }
}
