//! # VERDANCE Shared
//!
//! Common math types used by the generator and everything downstream of it.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a scene graph, renderer or physics
//! engine. Projections into those live with their consumers.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;

pub use math::{Quaternion, Transform, Vec3};
