#![deny(unsafe_code)]
//! Core types and traits for the procedural aquarium.
//!
//! Provides the immutable `AquariumConfig`, the `NoiseField` trait that
//! steers every fish, the `Xorshift64` PRNG used for one-time randomized
//! draws, the API-independent `InstanceBuffer`, and the `ParticleSystem`
//! trait implemented by bubbles and seaweed.

pub mod config;
pub mod error;
pub mod instance;
pub mod noise_field;
pub mod params;
pub mod prng;
pub mod system;

#[cfg(feature = "render")]
pub mod render;

pub use config::{AquariumConfig, Easing, FishRanges, Range};
pub use error::AquariumError;
pub use instance::{InstanceAttribute, InstanceBuffer, UniformValue, Uniforms};
pub use noise_field::{ConstantNoise, NoiseField, PerlinNoise, SimplexNoise};
pub use prng::Xorshift64;
pub use system::{BaseMesh, DrawState, ParticleSystem, TIME_UNIFORM};
