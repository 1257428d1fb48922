//! Geometric primitives and their ray intersections (spec §3, §4.3).

use crate::material::MaterialHandle;
use crate::math::{Aabb, Point3, Ray, Vec3};

/// A UV pair, used for texture lookups and barycentric interpolation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

impl Uv {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

/// Ray/primitive intersection result. `normal` is always oriented against
/// the incoming ray; `front_face` records which side was actually hit.
pub struct HitRecord {
    pub point: Point3,
    pub normal: Vec3,
    pub t: f64,
    pub uv: Uv,
    pub front_face: bool,
    pub material: MaterialHandle,
}

impl HitRecord {
    /// Invariant (spec §3): `front_face = dot(ray.direction, geometric_normal) < 0`;
    /// `normal` always points against the incoming ray.
    #[inline]
    fn oriented(
        point: Point3,
        geometric_normal: Vec3,
        t: f64,
        uv: Uv,
        material: MaterialHandle,
        ray_direction: Vec3,
    ) -> Self {
        let front_face = ray_direction.dot(geometric_normal) < 0.0;
        let normal = if front_face {
            geometric_normal
        } else {
            -geometric_normal
        };
        Self {
            point,
            normal,
            t,
            uv,
            front_face,
            material,
        }
    }
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
    pub material: MaterialHandle,
}

impl Sphere {
    pub fn new(center: Point3, radius: f64, material: MaterialHandle) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        let r = Vec3::splat(self.radius.abs());
        Aabb::new(self.center - r, self.center + r)
    }

    /// Quadratic-form sphere intersection (spec §4.3).
    pub fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (h - sqrtd) / a;
        if root <= t_min || root >= t_max {
            root = (h + sqrtd) / a;
            if root <= t_min || root >= t_max {
                return None;
            }
        }

        let point = ray.at(root);
        let outward_normal = (point - self.center) / self.radius;
        Some(HitRecord::oriented(
            point,
            outward_normal,
            root,
            Uv::default(),
            self.material,
            ray.direction,
        ))
    }
}

// ─── Triangle ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
    pub n0: Vec3,
    pub n1: Vec3,
    pub n2: Vec3,
    pub uv0: Uv,
    pub uv1: Uv,
    pub uv2: Uv,
    pub material: MaterialHandle,
}

impl Triangle {
    /// Constructs a triangle with explicit per-vertex normals.
    pub fn new(
        v0: Point3,
        v1: Point3,
        v2: Point3,
        n0: Vec3,
        n1: Vec3,
        n2: Vec3,
        uv0: Uv,
        uv1: Uv,
        uv2: Uv,
        material: MaterialHandle,
    ) -> Self {
        Self {
            v0,
            v1,
            v2,
            n0,
            n1,
            n2,
            uv0,
            uv1,
            uv2,
            material,
        }
    }

    /// Constructs a triangle with no stored normals — §3: "normals may be
    /// omitted; the triangle constructor then uses the geometric normal for
    /// all three vertices".
    pub fn from_positions(
        v0: Point3,
        v1: Point3,
        v2: Point3,
        uv0: Uv,
        uv1: Uv,
        uv2: Uv,
        material: MaterialHandle,
    ) -> Self {
        let geometric_normal = (v1 - v0).cross(v2 - v0).normalized();
        Self::new(
            v0,
            v1,
            v2,
            geometric_normal,
            geometric_normal,
            geometric_normal,
            uv0,
            uv1,
            uv2,
            material,
        )
    }

    #[inline]
    pub fn centroid(&self) -> Point3 {
        (self.v0 + self.v1 + self.v2) * (1.0 / 3.0)
    }

    pub fn bounding_box(&self) -> Aabb {
        let mut b = Aabb::empty();
        b.grow_point(self.v0);
        b.grow_point(self.v1);
        b.grow_point(self.v2);
        b
    }

    /// Möller–Trumbore intersection (spec §4.3). The front-face test uses
    /// the geometric normal, independent of any interpolated vertex normal.
    pub fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        const EPSILON: f64 = f32::EPSILON as f64;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < EPSILON {
            return None; // ray parallel to triangle plane
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t <= t_min || t >= t_max {
            return None;
        }

        let point = ray.at(t);
        let w = 1.0 - u - v;
        let interpolated_normal =
            (self.n0 * w + self.n1 * u + self.n2 * v).normalized();
        let geometric_normal = edge1.cross(edge2).normalized();
        let uv = Uv::new(
            w * self.uv0.u + u * self.uv1.u + v * self.uv2.u,
            w * self.uv0.v + u * self.uv1.v + v * self.uv2.v,
        );

        // front_face is decided from the geometric normal; the stored
        // normal used for shading is the interpolated one, re-oriented
        // to match front_face (same convention HitRecord::oriented applies).
        let front_face = ray.direction.dot(geometric_normal) < 0.0;
        let normal = if front_face {
            interpolated_normal
        } else {
            -interpolated_normal
        };

        Some(HitRecord {
            point,
            normal,
            t,
            uv,
            front_face,
            material: self.material,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialArrays, MaterialKind};

    fn dummy_material() -> MaterialHandle {
        let mut mats = MaterialArrays::new();
        mats.add_lambertian(Vec3::ones())
    }

    #[test]
    fn sphere_hit_reports_outward_normal() {
        let mat = dummy_material();
        let sphere = Sphere::new(Point3::zero(), 1.0, mat);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = sphere.hit(&ray, 0.001, f64::INFINITY).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-9);
        assert!(hit.front_face);
        assert!(hit.normal.dot(ray.direction) <= 0.0);
    }

    #[test]
    fn sphere_hit_before_t_min_is_a_miss() {
        let mat = dummy_material();
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.1, mat);
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, 1.0));
        assert!(sphere.hit(&ray, 2.0, f64::INFINITY).is_none());
    }

    #[test]
    fn triangle_hit_through_center_returns_expected_uv() {
        let mat = dummy_material();
        let tri = Triangle::from_positions(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Uv::new(0.0, 0.0),
            Uv::new(1.0, 0.0),
            Uv::new(0.5, 1.0),
            mat,
        );
        let ray = Ray::new(Point3::new(0.0, -0.667, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = tri.hit(&ray, 0.001, f64::INFINITY);
        assert!(hit.is_some());
    }

    #[test]
    fn triangle_parallel_ray_is_a_miss_not_nan() {
        let mat = dummy_material();
        let tri = Triangle::from_positions(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Uv::default(),
            Uv::default(),
            Uv::default(),
            mat,
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(1.0, 0.0, 0.0));
        let hit = tri.hit(&ray, 0.001, f64::INFINITY);
        assert!(hit.is_none());
    }

    #[test]
    fn front_face_invariant_holds() {
        let mat = dummy_material();
        let sphere = Sphere::new(Point3::zero(), 1.0, mat);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = sphere.hit(&ray, 0.001, f64::INFINITY).unwrap();
        let geometric_normal = (hit.point - sphere.center) / sphere.radius;
        assert_eq!(
            hit.front_face,
            ray.direction.dot(geometric_normal) < 0.0
        );
        assert!(hit.normal.dot(ray.direction) <= 0.0);
    }
}
