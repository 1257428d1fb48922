//! Monte Carlo path-trace integrator (spec §4.8).
//!
//! Implemented iteratively rather than as the spec's recursive pseudocode:
//! attenuation accumulates multiplicatively bounce-to-bounce, which is the
//! same computation without growing the call stack to `max_depth`.

use crate::material::scatter;
use crate::math::{Color, Ray, Vec3};
use crate::scene::Scene;

/// `t_min = 0.001`: the self-shadow epsilon separating a scattered ray's
/// origin from the surface it just left (spec §4.8).
pub const T_MIN: f64 = 0.001;

pub fn ray_color(scene: &Scene, mut ray: Ray, max_depth: u32, rng: &mut dyn rand::RngCore) -> Color {
    let mut radiance = Color::ones();

    for _ in 0..max_depth {
        match scene.hit(&ray, T_MIN, f64::INFINITY) {
            Some(hit) => match scatter(&scene.materials, hit.material, ray.direction, &hit, rng) {
                Some((attenuation, next_dir)) => {
                    radiance = radiance.hadamard(attenuation);
                    ray = Ray::new(hit.point, next_dir);
                }
                None => return Color::zero(),
            },
            None => return radiance.hadamard(sky_gradient(ray.direction)),
        }
    }

    Color::zero()
}

/// Vertical gradient standing in for all other light sources (spec §4.8).
fn sky_gradient(direction: Vec3) -> Color {
    let unit = direction.normalized();
    let t = 0.5 * (unit.y + 1.0);
    Color::ones() * (1.0 - t) + Color::new(0.5, 0.7, 1.0) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialArrays;
    use crate::math::Point3;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn empty_scene_returns_sky_gradient() {
        let scene = Scene::new(vec![], vec![], MaterialArrays::new());
        let mut rng = SmallRng::seed_from_u64(1);
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let color = ray_color(&scene, ray, 50, &mut rng);
        assert_eq!(color, sky_gradient(ray.direction));
    }

    #[test]
    fn zero_depth_budget_returns_black() {
        let scene = Scene::new(vec![], vec![], MaterialArrays::new());
        let mut rng = SmallRng::seed_from_u64(2);
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(ray_color(&scene, ray, 0, &mut rng), Color::zero());
    }

    #[test]
    fn lambertian_sphere_never_returns_pure_black_over_many_samples() {
        use crate::primitives::Sphere;
        let mut mats = MaterialArrays::new();
        let mat = mats.add_lambertian(Color::new(0.5, 0.5, 0.5));
        let scene = Scene::new(vec![Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, mat)], vec![], mats);
        let mut rng = SmallRng::seed_from_u64(3);
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let mut accum = Color::zero();
        for _ in 0..64 {
            accum += ray_color(&scene, ray, 10, &mut rng);
        }
        assert!(accum.length() > 0.0);
    }
}
