//! Built-in demo scene, used by the CLI when no `--scene <path>` is given.
//! This is the "metal sphere on ground" end-to-end scenario (spec §8 #1),
//! reproduced exactly: ground gray 0.5, a left Lambertian (0.7,0.3,0.3), a
//! center Metal (0.8,0.8,0.8, fuzz 0.0), 100x100 at 100 spp.

use crate::camera::CameraConfig;
use crate::material::MaterialArrays;
use crate::math::{Point3, Vec3};
use crate::primitives::Sphere;
use crate::scene::Scene;

pub fn showcase() -> (Scene, CameraConfig) {
    let mut materials = MaterialArrays::new();
    let ground = materials.add_lambertian(Vec3::splat(0.5));
    let left = materials.add_lambertian(Vec3::new(0.7, 0.3, 0.3));
    let center = materials.add_metal(Vec3::splat(0.8), 0.0);

    let spheres = vec![
        Sphere::new(Point3::new(0.0, -100.5, -1.0), 100.0, ground),
        Sphere::new(Point3::new(-1.0, 0.0, -1.0), 0.5, left),
        Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, center),
    ];

    let scene = Scene::new(spheres, vec![], materials);
    let config = CameraConfig {
        eye: Point3::new(0.0, 0.0, 0.0),
        look_at: Point3::new(0.0, 0.0, -1.0),
        up: Vec3::unit_y(),
        vfov_degrees: 90.0,
        image_width: 100,
        aspect_ratio: 1.0,
        samples_per_pixel: 100,
        max_depth: 50,
        defocus_angle_degrees: 0.0,
        focus_dist: 1.0,
    };
    (scene, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::render;

    #[test]
    fn showcase_scene_has_three_spheres_and_no_triangles() {
        let (scene, _) = showcase();
        assert_eq!(scene.spheres.len(), 3);
        assert!(scene.triangles.is_empty());
    }

    /// The Metal sphere sits dead center and reflects the sky: its upper rim
    /// should read bluer than its lower rim, which reflects the gray ground.
    #[test]
    fn metal_sphere_is_blue_tinged_on_top_and_gray_on_bottom() {
        let (scene, config) = showcase();
        let camera = Camera::new(&config);
        let fb = render::render(&scene, &camera);

        let row_channel_avg = |row: u32, channel: usize| -> f64 {
            let y = row as usize;
            let mut sum = 0u32;
            let cols = 40..60usize;
            for x in cols.clone() {
                sum += fb.pixels[(y * fb.width as usize + x) * 3 + channel] as u32;
            }
            sum as f64 / cols.len() as f64
        };

        let top_blue = row_channel_avg(20, 2);
        let top_red = row_channel_avg(20, 0);
        let bottom_blue = row_channel_avg(75, 2);
        let bottom_red = row_channel_avg(75, 0);

        assert!(
            top_blue - top_red > bottom_blue - bottom_red,
            "top of metal sphere ({top_red},_,{top_blue}) is not bluer relative to \
             its red channel than the bottom ({bottom_red},_,{bottom_blue})"
        );
    }
}
