//! GPU back-end parity shim (spec §4.10, C10).
//!
//! Flattens the scene into the same `bytemuck`-POD buffers a real compute
//! shader would bind, then runs a pure-Rust reference kernel over them with
//! the Wang-hash PRNG instead of `SmallRng`. No device, queue, or pipeline
//! is opened — `ash`/`wgpu` are deliberately absent (spec §1) — this exists
//! so the parity contract (§8) can be asserted on CPU-only CI.

use crate::bvh::BvhNode;
use crate::camera::Camera;
use crate::material::{
    schlick_reflectance, GpuDielectric, GpuLambertian, GpuMetal, MaterialArrays, MaterialKind,
};
use crate::math::{Point3, Ray, Vec3};
use crate::primitives::{Sphere, Triangle};
use crate::render::{self, Framebuffer};
use crate::rng::WangRng;
use crate::scene::Scene;
use bytemuck::{Pod, Zeroable};
use log::info;
use rayon::prelude::*;

/// 16-byte-aligned sphere record (spec §4.10).
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct GpuSphere {
    pub center: [f32; 3],
    pub radius: f32,
    pub material_kind: u32,
    pub material_index: u32,
    pub _pad: [f32; 2],
}

/// Triangle record: positions, normals, uvs, material tag (spec §4.10).
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct GpuTriangle {
    pub v0: [f32; 3],
    pub _pad0: f32,
    pub v1: [f32; 3],
    pub _pad1: f32,
    pub v2: [f32; 3],
    pub _pad2: f32,
    pub n0: [f32; 3],
    pub _pad3: f32,
    pub n1: [f32; 3],
    pub _pad4: f32,
    pub n2: [f32; 3],
    pub _pad5: f32,
    pub uv0: [f32; 2],
    pub uv1: [f32; 2],
    pub uv2: [f32; 2],
    pub material_kind: u32,
    pub material_index: u32,
}

/// BVH node record — 32 bytes, identical layout to the CPU `BvhNode`
/// (spec §3, §4.10), but with `f32` extents for device upload.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct GpuBvhNode {
    pub aabb_min: [f32; 3],
    pub left_first: u32,
    pub aabb_max: [f32; 3],
    pub prim_count: u32,
}

/// Per-dispatch push constants (spec §4.10).
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct GpuPushConstants {
    pub pixel00: [f32; 3],
    pub _pad0: f32,
    pub pixel_du: [f32; 3],
    pub _pad1: f32,
    pub pixel_dv: [f32; 3],
    pub _pad2: f32,
    pub eye: [f32; 3],
    pub _pad3: f32,
    pub defocus_disk_u: [f32; 3],
    pub _pad4: f32,
    pub defocus_disk_v: [f32; 3],
    pub _pad5: f32,
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub sphere_count: u32,
    pub triangle_count: u32,
    pub defocus_angle_is_positive: u32,
    pub _pad6: u32,
}

fn to_f32_3(v: Vec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

pub fn flatten_spheres(spheres: &[Sphere]) -> Vec<GpuSphere> {
    spheres
        .iter()
        .map(|s| GpuSphere {
            center: to_f32_3(s.center),
            radius: s.radius as f32,
            material_kind: s.material.kind as u32,
            material_index: s.material.index,
            _pad: [0.0; 2],
        })
        .collect()
}

pub fn flatten_triangles(triangles: &[Triangle]) -> Vec<GpuTriangle> {
    triangles
        .iter()
        .map(|t| GpuTriangle {
            v0: to_f32_3(t.v0),
            _pad0: 0.0,
            v1: to_f32_3(t.v1),
            _pad1: 0.0,
            v2: to_f32_3(t.v2),
            _pad2: 0.0,
            n0: to_f32_3(t.n0),
            _pad3: 0.0,
            n1: to_f32_3(t.n1),
            _pad4: 0.0,
            n2: to_f32_3(t.n2),
            _pad5: 0.0,
            uv0: [t.uv0.u as f32, t.uv0.v as f32],
            uv1: [t.uv1.u as f32, t.uv1.v as f32],
            uv2: [t.uv2.u as f32, t.uv2.v as f32],
            material_kind: t.material.kind as u32,
            material_index: t.material.index,
        })
        .collect()
}

pub fn flatten_bvh_nodes(nodes: &[BvhNode]) -> Vec<GpuBvhNode> {
    nodes
        .iter()
        .map(|n| GpuBvhNode {
            aabb_min: to_f32_3(n.aabb_min),
            left_first: n.left_first,
            aabb_max: to_f32_3(n.aabb_max),
            prim_count: n.prim_count,
        })
        .collect()
}

struct GpuHit {
    t: f64,
    point: Point3,
    normal: Vec3,
    front_face: bool,
    material_kind: MaterialKind,
    material_index: u32,
}

fn intersect_sphere(s: &GpuSphere, ray: &Ray, t_min: f64, t_max: f64) -> Option<GpuHit> {
    let center = Point3::new(s.center[0] as f64, s.center[1] as f64, s.center[2] as f64);
    let radius = s.radius as f64;
    let oc = center - ray.origin;
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;
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
    let outward_normal = (point - center) / radius;
    let front_face = ray.direction.dot(outward_normal) < 0.0;
    Some(GpuHit {
        t: root,
        point,
        normal: if front_face {
            outward_normal
        } else {
            -outward_normal
        },
        front_face,
        material_kind: kind_from_u32(s.material_kind),
        material_index: s.material_index,
    })
}

fn intersect_triangle(tri: &GpuTriangle, ray: &Ray, t_min: f64, t_max: f64) -> Option<GpuHit> {
    const EPSILON: f64 = f32::EPSILON as f64;
    let v0 = Point3::new(tri.v0[0] as f64, tri.v0[1] as f64, tri.v0[2] as f64);
    let v1 = Point3::new(tri.v1[0] as f64, tri.v1[1] as f64, tri.v1[2] as f64);
    let v2 = Point3::new(tri.v2[0] as f64, tri.v2[1] as f64, tri.v2[2] as f64);

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None;
    }
    let f = 1.0 / a;
    let s = ray.origin - v0;
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

    let w = 1.0 - u - v;
    let n0 = Vec3::new(tri.n0[0] as f64, tri.n0[1] as f64, tri.n0[2] as f64);
    let n1 = Vec3::new(tri.n1[0] as f64, tri.n1[1] as f64, tri.n1[2] as f64);
    let n2 = Vec3::new(tri.n2[0] as f64, tri.n2[1] as f64, tri.n2[2] as f64);
    let interpolated_normal = (n0 * w + n1 * u + n2 * v).normalized();
    let geometric_normal = edge1.cross(edge2).normalized();
    let front_face = ray.direction.dot(geometric_normal) < 0.0;

    Some(GpuHit {
        t,
        point: ray.at(t),
        normal: if front_face {
            interpolated_normal
        } else {
            -interpolated_normal
        },
        front_face,
        material_kind: kind_from_u32(tri.material_kind),
        material_index: tri.material_index,
    })
}

fn kind_from_u32(v: u32) -> MaterialKind {
    match v {
        0 => MaterialKind::Lambertian,
        1 => MaterialKind::Metal,
        _ => MaterialKind::Dielectric,
    }
}

/// Stack-based BVH traversal over flattened buffers — identical shape to
/// [`crate::bvh::Bvh::traverse`], reading `GpuBvhNode`/`GpuTriangle` arrays
/// instead of the CPU tree.
fn traverse_gpu(
    nodes: &[GpuBvhNode],
    tri_ids: &[u32],
    triangles: &[GpuTriangle],
    ray: &Ray,
    t_min: f64,
    t_max: f64,
) -> Option<GpuHit> {
    if nodes.is_empty() {
        return None;
    }
    let mut stack = [0u32; crate::bvh::MAX_DEPTH as usize];
    let mut stack_ptr = 0usize;
    let mut node_idx = 0u32;
    let mut closest = t_max;
    let mut best = None;

    let aabb_hit = |n: &GpuBvhNode| -> f64 {
        let min = Vec3::new(n.aabb_min[0] as f64, n.aabb_min[1] as f64, n.aabb_min[2] as f64);
        let max = Vec3::new(n.aabb_max[0] as f64, n.aabb_max[1] as f64, n.aabb_max[2] as f64);
        crate::math::Aabb::new(min, max).intersect(ray, closest)
    };

    loop {
        let node = &nodes[node_idx as usize];
        if node.prim_count > 0 {
            for i in 0..node.prim_count {
                let id = tri_ids[(node.left_first + i) as usize] as usize;
                if let Some(hit) = intersect_triangle(&triangles[id], ray, t_min, closest) {
                    closest = hit.t;
                    best = Some(hit);
                }
            }
            if stack_ptr == 0 {
                break;
            }
            stack_ptr -= 1;
            node_idx = stack[stack_ptr];
        } else {
            let mut left_idx = node.left_first;
            let mut right_idx = node.left_first + 1;
            let mut d_left = aabb_hit(&nodes[left_idx as usize]);
            let mut d_right = aabb_hit(&nodes[right_idx as usize]);
            if d_left > d_right {
                std::mem::swap(&mut d_left, &mut d_right);
                std::mem::swap(&mut left_idx, &mut right_idx);
            }
            if d_left == f64::INFINITY {
                if stack_ptr == 0 {
                    break;
                }
                stack_ptr -= 1;
                node_idx = stack[stack_ptr];
            } else {
                node_idx = left_idx;
                if d_right != f64::INFINITY {
                    stack[stack_ptr] = right_idx;
                    stack_ptr += 1;
                }
            }
        }
    }

    best
}

fn rand_unit(rng: &mut WangRng) -> f64 {
    rng.next_f64()
}

/// Same three-way scatter contract as [`crate::material::scatter`] (spec
/// §4.4), evaluated against the flattened per-kind material buffers.
#[allow(clippy::too_many_arguments)]
fn scatter_gpu(
    lambertian: &[GpuLambertian],
    metal: &[GpuMetal],
    dielectric: &[GpuDielectric],
    kind: MaterialKind,
    index: u32,
    ray_direction: Vec3,
    hit: &GpuHit,
    rng: &mut WangRng,
) -> Option<(Vec3, Vec3)> {
    match kind {
        MaterialKind::Lambertian => {
            let mat = &lambertian[index as usize];
            let mut dir = hit.normal + random_unit_vector(rng);
            if dir.near_zero() {
                dir = hit.normal;
            }
            let albedo = Vec3::new(mat.albedo[0] as f64, mat.albedo[1] as f64, mat.albedo[2] as f64);
            Some((albedo, dir))
        }
        MaterialKind::Metal => {
            let mat = &metal[index as usize];
            let fuzz = mat.fuzz as f64;
            let dir = ray_direction.normalized().reflect(hit.normal) + random_unit_vector(rng) * fuzz;
            if dir.dot(hit.normal) <= 0.0 {
                None
            } else {
                let albedo = Vec3::new(mat.albedo[0] as f64, mat.albedo[1] as f64, mat.albedo[2] as f64);
                Some((albedo, dir))
            }
        }
        MaterialKind::Dielectric => {
            let mat = &dielectric[index as usize];
            let ior = mat.ior as f64;
            let eta_ratio = if hit.front_face { 1.0 / ior } else { ior };
            let unit_dir = ray_direction.normalized();
            let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
            let cannot_refract = eta_ratio * sin_theta > 1.0;
            let reflectance = schlick_reflectance(cos_theta, eta_ratio);
            let dir = if cannot_refract || reflectance > rand_unit(rng) {
                unit_dir.reflect(hit.normal)
            } else {
                unit_dir
                    .refract(hit.normal, eta_ratio)
                    .unwrap_or_else(|| unit_dir.reflect(hit.normal))
            };
            Some((Vec3::ones(), dir))
        }
    }
}

fn random_unit_vector(rng: &mut WangRng) -> Vec3 {
    use std::f64::consts::PI;
    let z = rng.next_f64() * 2.0 - 1.0;
    let a = rng.next_f64() * 2.0 * PI;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * a.cos(), r * a.sin(), z)
}

fn sky_gradient(direction: Vec3) -> Vec3 {
    let unit = direction.normalized();
    let t = 0.5 * (unit.y + 1.0);
    Vec3::ones() * (1.0 - t) + Vec3::new(0.5, 0.7, 1.0) * t
}

/// Flattened, device-shaped view of a [`Scene`] (spec §4.10).
pub struct GpuBuffers {
    pub spheres: Vec<GpuSphere>,
    pub triangles: Vec<GpuTriangle>,
    pub lambertian: Vec<GpuLambertian>,
    pub metal: Vec<GpuMetal>,
    pub dielectric: Vec<GpuDielectric>,
    pub tri_ids: Vec<u32>,
    pub bvh_nodes: Vec<GpuBvhNode>,
}

impl GpuBuffers {
    pub fn build(scene: &Scene) -> Self {
        Self {
            spheres: flatten_spheres(&scene.spheres),
            triangles: flatten_triangles(&scene.triangles),
            lambertian: flatten_lambertian(&scene.materials),
            metal: flatten_metal(&scene.materials),
            dielectric: flatten_dielectric(&scene.materials),
            tri_ids: scene.tri_ids().to_vec(),
            bvh_nodes: flatten_bvh_nodes(scene.bvh_nodes()),
        }
    }

    fn ray_color(&self, mut ray: Ray, max_depth: u32, rng: &mut WangRng) -> Vec3 {
        let mut radiance = Vec3::ones();
        for _ in 0..max_depth {
            let mut closest = f64::INFINITY;
            let mut best: Option<GpuHit> = None;
            for sphere in &self.spheres {
                if let Some(hit) = intersect_sphere(sphere, &ray, crate::integrator::T_MIN, closest) {
                    closest = hit.t;
                    best = Some(hit);
                }
            }
            if let Some(hit) = traverse_gpu(&self.bvh_nodes, &self.tri_ids, &self.triangles, &ray, crate::integrator::T_MIN, closest) {
                best = Some(hit);
            }

            match best {
                Some(hit) => {
                    match scatter_gpu(
                        &self.lambertian,
                        &self.metal,
                        &self.dielectric,
                        hit.material_kind,
                        hit.material_index,
                        ray.direction,
                        &hit,
                        rng,
                    ) {
                        Some((attenuation, next_dir)) => {
                            radiance = radiance.hadamard(attenuation);
                            ray = Ray::new(hit.point, next_dir);
                        }
                        None => return Vec3::zero(),
                    }
                }
                None => return radiance.hadamard(sky_gradient(ray.direction)),
            }
        }
        Vec3::zero()
    }
}

fn flatten_lambertian(mats: &MaterialArrays) -> Vec<GpuLambertian> {
    mats.lambertian
        .iter()
        .map(|m| {
            let albedo = match &m.albedo {
                crate::material::Albedo::Solid(c) => *c,
                crate::material::Albedo::Texture(_) => Vec3::ones(),
            };
            GpuLambertian {
                albedo: to_f32_3(albedo),
                texture_index: u32::MAX,
            }
        })
        .collect()
}

fn flatten_metal(mats: &MaterialArrays) -> Vec<GpuMetal> {
    mats.metal
        .iter()
        .map(|m| GpuMetal {
            albedo: to_f32_3(m.albedo),
            fuzz: m.fuzz as f32,
        })
        .collect()
}

fn flatten_dielectric(mats: &MaterialArrays) -> Vec<GpuDielectric> {
    mats.dielectric
        .iter()
        .map(|m| GpuDielectric {
            ior: m.ior as f32,
            _pad: [0.0; 3],
        })
        .collect()
}

/// Builds the per-dispatch push-constant block a real compute shader would
/// bind (spec §4.10) from the camera's derived basis.
pub fn push_constants(camera: &Camera, sphere_count: u32, triangle_count: u32) -> GpuPushConstants {
    let (pixel00, pixel_du, pixel_dv, defocus_disk_u, defocus_disk_v) = camera.gpu_basis();
    GpuPushConstants {
        pixel00: to_f32_3(pixel00),
        _pad0: 0.0,
        pixel_du: to_f32_3(pixel_du),
        _pad1: 0.0,
        pixel_dv: to_f32_3(pixel_dv),
        _pad2: 0.0,
        eye: to_f32_3(camera.eye),
        _pad3: 0.0,
        defocus_disk_u: to_f32_3(defocus_disk_u),
        _pad4: 0.0,
        defocus_disk_v: to_f32_3(defocus_disk_v),
        _pad5: 0.0,
        image_width: camera.image_width,
        image_height: camera.image_height,
        samples_per_pixel: camera.samples_per_pixel,
        max_depth: camera.max_depth,
        sphere_count,
        triangle_count,
        defocus_angle_is_positive: (camera.defocus_angle() > 0.0) as u32,
        _pad6: 0,
    }
}

/// Renders via the reference kernel instead of [`crate::render::render`]
/// (spec §4.10): same camera/scene contract, Wang-hash PRNG seeded per
/// (pixel, sample, bounce), dispatched over 8x8 pixel work-groups.
pub fn render_reference(scene: &Scene, camera: &Camera) -> Framebuffer {
    const WORKGROUP: u32 = 8;

    let width = camera.image_width;
    let height = camera.image_height;
    let spp = camera.samples_per_pixel;
    let max_depth = camera.max_depth;
    let buffers = GpuBuffers::build(scene);
    let push_constants = push_constants(camera, buffers.spheres.len() as u32, buffers.triangles.len() as u32);

    info!(
        "reference kernel: {width}x{height} dispatched as {}x{} work-groups of {WORKGROUP}x{WORKGROUP}, {} spheres, {} triangles",
        width.div_ceil(WORKGROUP),
        height.div_ceil(WORKGROUP),
        push_constants.sphere_count,
        push_constants.triangle_count,
    );

    let mut framebuffer = Framebuffer::new(width, height);
    let rows: Vec<&mut [u8]> = framebuffer.pixels.chunks_mut((width * 3) as usize).collect();
    let mut row_slots: Vec<Option<&mut [u8]>> = rows.into_iter().map(Some).collect();

    // The real compute dispatch parallelizes over 8x8 work-groups; the
    // per-pixel independence (spec §5) lets this reference kernel instead
    // parallelize over scanlines, which keeps each worker's output range
    // disjoint without extra bookkeeping.
    row_slots.par_iter_mut().enumerate().for_each(|(row, slot)| {
        let pixels = slot.take().expect("row consumed once");
        for col in 0..width {
            let pixel_index = row as u32 * width + col;
            let mut sum = Vec3::zero();
            for sample in 0..spp {
                let mut rng = WangRng::new(pixel_index, sample, 0);
                let ray = camera.get_ray(col, row as u32, &mut rng);
                sum += buffers.ray_color(ray, max_depth, &mut rng);
            }
            let base = (col * 3) as usize;
            pixels[base] = render::quantize_channel(sum.x, spp);
            pixels[base + 1] = render::quantize_channel(sum.y, spp);
            pixels[base + 2] = render::quantize_channel(sum.z, spp);
        }
    });

    framebuffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::Bvh;
    use crate::camera::CameraConfig;
    use crate::material::MaterialArrays;
    use crate::math::Point3;

    #[test]
    fn flattened_sphere_round_trips_center_and_radius() {
        let mut mats = MaterialArrays::new();
        let mat = mats.add_lambertian(Vec3::new(0.5, 0.5, 0.5));
        let sphere = Sphere::new(Point3::new(1.0, 2.0, 3.0), 0.5, mat);
        let flat = flatten_spheres(&[sphere]);
        assert_eq!(flat[0].center, [1.0, 2.0, 3.0]);
        assert_eq!(flat[0].radius, 0.5);
    }

    #[test]
    fn empty_scene_parity_both_backends_match_sky() {
        let scene = Scene::new(vec![], vec![], MaterialArrays::new());
        let config = CameraConfig {
            image_width: 4,
            aspect_ratio: 1.0,
            samples_per_pixel: 8,
            max_depth: 4,
            ..CameraConfig::default()
        };
        let camera = Camera::new(&config);
        let cpu_fb = render::render(&scene, &camera);
        let gpu_fb = render_reference(&scene, &camera);

        let mut total_diff = 0i64;
        for (a, b) in cpu_fb.pixels.iter().zip(gpu_fb.pixels.iter()) {
            total_diff += (*a as i64 - *b as i64).abs();
        }
        let mean_diff = total_diff as f64 / cpu_fb.pixels.len() as f64;
        assert!(mean_diff < 2.0, "mean abs diff {mean_diff} exceeds 2/255 tolerance");
    }

    #[test]
    fn bvh_nodes_flatten_to_32_byte_records() {
        assert_eq!(std::mem::size_of::<GpuBvhNode>(), 32);
    }

    /// Builds the 22x22 mixed-material sphere forest over a two-triangle
    /// ground quad from the random-sphere-forest scenario, so parity is
    /// checked with real BVH traversal, every material kind, and genuine
    /// multi-bounce scatter on both sides.
    fn sphere_forest_scene() -> (Scene, CameraConfig) {
        let mut materials = MaterialArrays::new();
        let ground_mat = materials.add_lambertian(Vec3::new(0.5, 0.5, 0.5));

        let ground = vec![
            Triangle::from_positions(
                Point3::new(-1000.0, 0.0, -1000.0),
                Point3::new(1000.0, 0.0, -1000.0),
                Point3::new(1000.0, 0.0, 1000.0),
                crate::primitives::Uv::new(0.0, 0.0),
                crate::primitives::Uv::new(1.0, 0.0),
                crate::primitives::Uv::new(1.0, 1.0),
                ground_mat,
            ),
            Triangle::from_positions(
                Point3::new(-1000.0, 0.0, -1000.0),
                Point3::new(1000.0, 0.0, 1000.0),
                Point3::new(-1000.0, 0.0, 1000.0),
                crate::primitives::Uv::new(0.0, 0.0),
                crate::primitives::Uv::new(1.0, 1.0),
                crate::primitives::Uv::new(0.0, 1.0),
                ground_mat,
            ),
        ];

        let mut spheres = Vec::with_capacity(22 * 22);
        for a in -11..11i32 {
            for b in -11..11i32 {
                let center = Point3::new(a as f64 + 0.4, 0.2, b as f64 + 0.4);
                let material = match (a + b).rem_euclid(3) {
                    0 => materials.add_lambertian(Vec3::new(0.4, 0.2, 0.6)),
                    1 => materials.add_metal(Vec3::new(0.7, 0.6, 0.5), 0.1),
                    _ => materials.add_dielectric(1.5),
                };
                spheres.push(Sphere::new(center, 0.2, material));
            }
        }

        let scene = Scene::new(spheres, ground, materials);
        let config = CameraConfig {
            eye: Point3::new(13.0, 2.0, 3.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            vfov_degrees: 20.0,
            image_width: 32,
            aspect_ratio: 1.0,
            samples_per_pixel: 64,
            max_depth: 8,
            defocus_angle_degrees: 0.0,
            focus_dist: 10.0,
        };
        (scene, config)
    }

    #[test]
    fn sphere_forest_parity_within_tolerance() {
        let (scene, config) = sphere_forest_scene();
        let camera = Camera::new(&config);
        let cpu_fb = render::render(&scene, &camera);
        let gpu_fb = render_reference(&scene, &camera);

        let mut total_diff = 0i64;
        for (a, b) in cpu_fb.pixels.iter().zip(gpu_fb.pixels.iter()) {
            total_diff += (*a as i64 - *b as i64).abs();
        }
        let mean_diff = total_diff as f64 / cpu_fb.pixels.len() as f64;
        assert!(
            mean_diff < 2.0,
            "mean abs diff {mean_diff} exceeds 2/255 tolerance over the mixed-material sphere forest"
        );
    }
}
