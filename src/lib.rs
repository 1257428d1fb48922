//! # photon-core
//!
//! An offline Monte Carlo path tracer over a SAH-partitioned triangle BVH
//! plus brute-force spheres, with two back-ends that implement the same
//! traversal and scatter contract:
//!
//! - **CPU**: [`render::render`], using `rand::rngs::SmallRng`.
//! - **GPU parity shim**: [`gpu::render_reference`], a pure-Rust reference
//!   kernel over `bytemuck`-POD flattened buffers, seeded with the Wang
//!   hash the way a real compute shader would be. No GPU device is opened;
//!   this crate's job ends at producing the same pixels a shader would.
//!
//! The two back-ends are not required to be bit-identical — only
//! statistically equivalent at a reasonable sample count (see the parity
//! test in [`gpu`]).

pub mod bvh;
pub mod camera;
pub mod demo_scenes;
pub mod gpu;
pub mod integrator;
pub mod material;
pub mod math;
pub mod primitives;
pub mod render;
pub mod rng;
pub mod scene;
pub mod scene_io;
