// sand-engine - Particle backgrounds for the personal site
//
// Four canvas variants share one engine:
//   - sand: pours out of the prompt input, piles up on text and floor
//   - drift: ambient dust that trails the pointer
//   - grid: dots pushed around by the pointer, springing back home
//   - triangles: arrows turning to face the pointer
//
// The simulation core (sim/, world/, frame_loop.rs) is plain Rust and
// runs headless. web.rs is the only wasm32-specific code.

pub mod config;
pub mod error;
pub mod frame_loop;
pub mod input;
pub mod render;
pub mod sandbox;
pub mod sim;
pub mod world;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{CollisionConfig, DriftConfig, GridConfig, SandConfig, TriangleConfig};
pub use error::EngineError;
pub use frame_loop::{FrameHandle, FrameLoop, FrameScheduler, LoopState, ManualScheduler};
pub use input::{Pointer, Visibility};
pub use render::{Encoder, Rgba, Shape, Surface};
pub use sim::{DriftWorld, FrameInput, GridWorld, SandWorld, Scene, TriangleField};
pub use world::{Bounds, Capsule, GeometryProbe, GeometrySource, Obstacles, StaticGeometry};
