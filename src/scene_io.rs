//! Scene exchange format (spec §6) — a thin `serde_json` loader. Parsing
//! fidelity is explicitly an external collaborator's concern (spec §1); this
//! module exists so the CLI has something to load.

use crate::material::{MaterialArrays, MaterialHandle};
use crate::math::{Point3, Vec3};
use crate::primitives::{Sphere, Triangle, Uv};
use crate::scene::Scene;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scene JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("material index {index} out of range (0..{len})")]
    MaterialIndexOutOfRange { index: usize, len: usize },
    #[error("vertex index {index} out of range (0..{len})")]
    VertexIndexOutOfRange { index: usize, len: usize },
    #[error("unknown material type_id {0} (expected 1=Lambert, 2=Metal, 4=Dielectric)")]
    UnknownMaterialType(u32),
    #[error("failed to decode texture image {path}: {source}")]
    TextureDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Albedo is either an inline RGB triple or a path to a decoded image
/// texture (spec §6: "Lambert albedo may be an RGB triple or a filesystem
/// path to an image texture").
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AlbedoDesc {
    Rgb([f64; 3]),
    TexturePath(String),
}

#[derive(Debug, Deserialize)]
struct MaterialDesc {
    type_id: u32,
    albedo: Option<AlbedoDesc>,
    fuzz: Option<f64>,
    ior: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SphereDesc {
    material_index: usize,
    radius: f64,
    center: [f64; 3],
}

#[derive(Debug, Deserialize)]
struct VertexDesc {
    position: [f64; 3],
    texcoord: [f64; 2],
    #[serde(default)]
    normal: Option<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
struct TriangleDesc {
    material_index: usize,
    indices: [usize; 3],
}

#[derive(Debug, Deserialize)]
struct CameraDesc {
    center: [f64; 3],
    lookat: [f64; 3],
    vup: [f64; 3],
    defocus_angle: f64,
    focus_dist: f64,
    screen_width: u32,
    aspect_ratio: f64,
    samples_per_pixel: u32,
    max_depth: u32,
    vfov_deg: f64,
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    camera: CameraDesc,
    #[serde(default)]
    materials: Vec<MaterialDesc>,
    #[serde(default)]
    spheres: Vec<SphereDesc>,
    #[serde(default)]
    vertices: Vec<VertexDesc>,
    #[serde(default)]
    triangles: Vec<TriangleDesc>,
}

pub struct LoadedScene {
    pub scene: Scene,
    pub camera_config: crate::camera::CameraConfig,
}

pub fn load_scene_file(path: impl AsRef<Path>) -> Result<LoadedScene, SceneLoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SceneLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: SceneFile = serde_json::from_str(&text)?;
    build_scene(file)
}

fn build_scene(file: SceneFile) -> Result<LoadedScene, SceneLoadError> {
    use std::sync::Arc;

    let mut materials = MaterialArrays::new();
    let mut handles = Vec::with_capacity(file.materials.len());

    for desc in &file.materials {
        let handle = match desc.type_id {
            1 => match &desc.albedo {
                Some(AlbedoDesc::Rgb(rgb)) => materials.add_lambertian(Vec3::new(rgb[0], rgb[1], rgb[2])),
                Some(AlbedoDesc::TexturePath(path)) => {
                    let decoded = image::open(path).map_err(|source| SceneLoadError::TextureDecode {
                        path: path.clone(),
                        source,
                    })?;
                    let rgba = decoded.to_rgba8();
                    let (width, height) = rgba.dimensions();
                    materials.add_lambertian_textured(Arc::new(crate::material::ImageTexture {
                        width,
                        height,
                        rgba8: rgba.into_raw(),
                    }))
                }
                None => materials.add_lambertian(Vec3::splat(0.5)),
            },
            2 => {
                let albedo = match &desc.albedo {
                    Some(AlbedoDesc::Rgb(rgb)) => Vec3::new(rgb[0], rgb[1], rgb[2]),
                    _ => Vec3::splat(0.8),
                };
                materials.add_metal(albedo, desc.fuzz.unwrap_or(0.0))
            }
            4 => materials.add_dielectric(desc.ior.unwrap_or(1.5)),
            other => return Err(SceneLoadError::UnknownMaterialType(other)),
        };
        handles.push(handle);
    }

    let scene = build_geometry(&file, &mut materials, &mut handles)?;
    Ok(LoadedScene {
        scene,
        camera_config: camera_config_from(&file.camera),
    })
}

fn build_geometry(
    file: &SceneFile,
    materials: &mut MaterialArrays,
    handles: &mut Vec<MaterialHandle>,
) -> Result<Scene, SceneLoadError> {
    let material_at = |index: usize| -> Result<MaterialHandle, SceneLoadError> {
        handles
            .get(index)
            .copied()
            .ok_or(SceneLoadError::MaterialIndexOutOfRange { index, len: handles.len() })
    };

    let mut spheres = Vec::with_capacity(file.spheres.len());
    for desc in &file.spheres {
        let material = material_at(desc.material_index)?;
        spheres.push(Sphere::new(
            Point3::new(desc.center[0], desc.center[1], desc.center[2]),
            desc.radius,
            material,
        ));
    }

    let vertex_at = |index: usize| -> Result<&VertexDesc, SceneLoadError> {
        file.vertices
            .get(index)
            .ok_or(SceneLoadError::VertexIndexOutOfRange { index, len: file.vertices.len() })
    };

    let mut triangles = Vec::with_capacity(file.triangles.len());
    for desc in &file.triangles {
        let material = material_at(desc.material_index)?;
        let v0 = vertex_at(desc.indices[0])?;
        let v1 = vertex_at(desc.indices[1])?;
        let v2 = vertex_at(desc.indices[2])?;

        let pos = |v: &VertexDesc| Point3::new(v.position[0], v.position[1], v.position[2]);
        let uv = |v: &VertexDesc| Uv::new(v.texcoord[0], v.texcoord[1]);

        let triangle = match (v0.normal, v1.normal, v2.normal) {
            (Some(n0), Some(n1), Some(n2)) => Triangle::new(
                pos(v0),
                pos(v1),
                pos(v2),
                Vec3::new(n0[0], n0[1], n0[2]),
                Vec3::new(n1[0], n1[1], n1[2]),
                Vec3::new(n2[0], n2[1], n2[2]),
                uv(v0),
                uv(v1),
                uv(v2),
                material,
            ),
            _ => Triangle::from_positions(pos(v0), pos(v1), pos(v2), uv(v0), uv(v1), uv(v2), material),
        };
        triangles.push(triangle);
    }

    let materials = std::mem::take(materials);
    Ok(Scene::new(spheres, triangles, materials))
}

fn camera_config_from(desc: &CameraDesc) -> crate::camera::CameraConfig {
    crate::camera::CameraConfig {
        eye: Point3::new(desc.center[0], desc.center[1], desc.center[2]),
        look_at: Point3::new(desc.lookat[0], desc.lookat[1], desc.lookat[2]),
        up: Vec3::new(desc.vup[0], desc.vup[1], desc.vup[2]),
        vfov_degrees: desc.vfov_deg,
        image_width: desc.screen_width,
        aspect_ratio: desc.aspect_ratio,
        samples_per_pixel: desc.samples_per_pixel,
        max_depth: desc.max_depth,
        defocus_angle_degrees: desc.defocus_angle,
        focus_dist: desc.focus_dist,
    }
}
