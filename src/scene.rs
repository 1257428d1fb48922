//! A scene bundles geometry, materials, and the triangle BVH built once at
//! load time (spec §3, §9: triangles go through the BVH, spheres are
//! brute-force scanned).

use crate::bvh::Bvh;
use crate::material::MaterialArrays;
use crate::math::Ray;
use crate::primitives::{HitRecord, Sphere, Triangle};

pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub triangles: Vec<Triangle>,
    pub materials: MaterialArrays,
    bvh: Option<Bvh>,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>, triangles: Vec<Triangle>, materials: MaterialArrays) -> Self {
        let bvh = Bvh::build(&triangles);
        Self {
            spheres,
            triangles,
            materials,
            bvh,
        }
    }

    /// Nearest-hit query across both primitive kinds: spheres by brute-force
    /// scan, triangles by BVH traversal, merged by keeping the smaller `t`.
    pub fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let mut closest = t_max;
        let mut best = None;

        for sphere in &self.spheres {
            if let Some(hit) = sphere.hit(ray, t_min, closest) {
                closest = hit.t;
                best = Some(hit);
            }
        }

        if let Some(bvh) = &self.bvh {
            if let Some(hit) = bvh.traverse(&self.triangles, ray, t_min, closest) {
                best = Some(hit);
            }
        }

        best
    }

    /// Flat BVH node array, for GPU buffer flattening (spec §4.10). Empty
    /// when the scene has no triangles.
    pub fn bvh_nodes(&self) -> &[crate::bvh::BvhNode] {
        self.bvh.as_ref().map(|b| b.nodes.as_slice()).unwrap_or(&[])
    }

    /// Triangle-id permutation backing the BVH leaves (spec §3, §4.10).
    pub fn tri_ids(&self) -> &[u32] {
        self.bvh.as_ref().map(|b| b.tri_ids.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialArrays;
    use crate::math::{Point3, Vec3};
    use crate::primitives::Uv;

    #[test]
    fn sphere_only_scene_hits_without_a_bvh() {
        let mut mats = MaterialArrays::new();
        let mat = mats.add_lambertian(Vec3::ones());
        let scene = Scene::new(vec![Sphere::new(Point3::zero(), 1.0, mat)], vec![], mats);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(scene.hit(&ray, 0.001, f64::INFINITY).is_some());
    }

    #[test]
    fn nearer_sphere_wins_over_farther_triangle() {
        let mut mats = MaterialArrays::new();
        let mat = mats.add_lambertian(Vec3::ones());
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -2.0), 0.5, mat);
        let triangle = Triangle::from_positions(
            Point3::new(-5.0, -5.0, -10.0),
            Point3::new(5.0, -5.0, -10.0),
            Point3::new(0.0, 5.0, -10.0),
            Uv::default(),
            Uv::default(),
            Uv::default(),
            mat,
        );
        let scene = Scene::new(vec![sphere], vec![triangle], mats);
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray, 0.001, f64::INFINITY).unwrap();
        assert!((hit.t - 1.5).abs() < 1e-9);
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = Scene::new(vec![], vec![], MaterialArrays::new());
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.hit(&ray, 0.001, f64::INFINITY).is_none());
    }
}
