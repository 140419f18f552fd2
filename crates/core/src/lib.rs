#![deny(unsafe_code)]
//! Core logic for the sakura-tilt page effects.
//!
//! Provides the falling-petal particle system (`Petal`, `PetalSimulation`,
//! driven through the `Engine` trait and drawn onto a `Surface`), the pointer
//! tilt transform (`TiltAngles`, `Transform`, `DepthMarker`) with its
//! frame-coalescing `TiltTracker`, component configuration, and the
//! `RandomSource` PRNG. Nothing here touches the browser.

pub mod config;
pub mod depth;
pub mod engine;
pub mod error;
pub mod petal;
pub mod prng;
pub mod simulation;
pub mod surface;
pub mod tilt;
pub mod tracker;

pub use config::{PetalConfig, TiltConfig};
pub use depth::DepthMarker;
pub use engine::Engine;
pub use error::CoreError;
pub use petal::{Direction, Petal};
pub use prng::{RandomSource, Sequence, Xorshift64};
pub use simulation::PetalSimulation;
pub use surface::{DrawCall, RecordingSurface, Sprite, Surface, Viewport};
pub use tilt::{Axis, Bounds, PointerSample, TiltAngles, Transform};
pub use tracker::{DepthPose, TiltEffect, TiltPhase, TiltTracker, TiltUpdate};
