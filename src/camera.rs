//! Thin-lens camera (spec §4.7): pixel-grid ray generation with jittered
//! sampling and an optional defocus disk for depth-of-field.

use crate::math::*;

pub struct CameraConfig {
    pub eye: Point3,
    pub look_at: Point3,
    pub up: Vec3,
    pub vfov_degrees: f64,
    pub image_width: u32,
    pub aspect_ratio: f64,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub defocus_angle_degrees: f64,
    pub focus_dist: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            vfov_degrees: 40.0,
            image_width: 600,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            defocus_angle_degrees: 0.0,
            focus_dist: 3.0,
        }
    }
}

/// Derived camera state used at render time (spec §4.7). `pixel00` is the
/// center of pixel (0, 0); `pixel_du`/`pixel_dv` step one pixel right/down.
pub struct Camera {
    pub eye: Point3,
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pixel00: Point3,
    pixel_du: Vec3,
    pixel_dv: Vec3,
    defocus_angle: f64,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let image_height = ((config.image_width as f64 / config.aspect_ratio) as u32).max(1);

        let theta = config.vfov_degrees.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan() * config.focus_dist;
        let viewport_width =
            viewport_height * (config.image_width as f64 / image_height as f64);

        let w = (config.eye - config.look_at).normalized();
        let u = config.up.cross(w).normalized();
        let v = w.cross(u);

        let viewport_u = u * viewport_width;
        let viewport_v = -v * viewport_height;
        let pixel_du = viewport_u / config.image_width as f64;
        let pixel_dv = viewport_v / image_height as f64;

        let viewport_upper_left =
            config.eye - w * config.focus_dist - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00 = viewport_upper_left + (pixel_du + pixel_dv) * 0.5;

        let defocus_radius =
            config.focus_dist * (config.defocus_angle_degrees.to_radians() / 2.0).tan();

        Self {
            eye: config.eye,
            image_width: config.image_width,
            image_height,
            samples_per_pixel: config.samples_per_pixel,
            max_depth: config.max_depth,
            pixel00,
            pixel_du,
            pixel_dv,
            defocus_angle: config.defocus_angle_degrees,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }

    /// Exposes the derived basis vectors the GPU push-constant block carries
    /// (spec §4.10): `(pixel00, pixel_du, pixel_dv, defocus_disk_u, defocus_disk_v)`.
    pub fn gpu_basis(&self) -> (Point3, Vec3, Vec3, Vec3, Vec3) {
        (
            self.pixel00,
            self.pixel_du,
            self.pixel_dv,
            self.defocus_disk_u,
            self.defocus_disk_v,
        )
    }

    pub fn defocus_angle(&self) -> f64 {
        self.defocus_angle
    }

    /// Generates a jittered primary ray through pixel `(i, j)` (spec §4.7).
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn rand::RngCore) -> Ray {
        use rand::Rng;
        let jitter_x: f64 = rng.gen_range(-0.5..0.5);
        let jitter_y: f64 = rng.gen_range(-0.5..0.5);

        let pixel_sample = self.pixel00
            + self.pixel_du * (i as f64 + jitter_x)
            + self.pixel_dv * (j as f64 + jitter_y);

        let origin = if self.defocus_angle <= 0.0 {
            self.eye
        } else {
            let disk = Vec3::random_in_unit_disk(rng);
            self.eye + self.defocus_disk_u * disk.x + self.defocus_disk_v * disk.y
        };

        Ray::new(origin, pixel_sample - origin)
    }
}
