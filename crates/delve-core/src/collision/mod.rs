//! Collision engine: oriented boxes, overlap tests and penetration resolution.
//!
//! - [`obb`]: [`Collider`] construction, the separating-axis [`test`],
//!   [`resolve_penetration`] and [`contains_point`]
//! - [`world`]: [`CollisionWorld`], which owns the static colliders of each
//!   [`Scope`] and runs sequential mover resolution
//!
//! # Architecture
//!
//! Dynamic colliders (the player and actors) are rebuilt from their owner's
//! transform every tick by the simulation. Static colliders are built once when
//! registered. Scope filtering happens when colliders are collected for a
//! query, never inside [`test`] itself.
//!
//! # Example
//!
//! ```
//! use delve_core::collision::{test, Collider, ColliderOwner};
//! use delve_core::entity::TransformState;
//! use glam::Vec3;
//!
//! let a = Collider::build(ColliderOwner::Player, &TransformState::at(Vec3::ZERO), Vec3::ONE, 1e-3);
//! let b = Collider::build(
//!     ColliderOwner::Player,
//!     &TransformState::at(Vec3::new(1.5, 0.0, 0.0)),
//!     Vec3::ONE,
//!     1e-3,
//! );
//!
//! let result = test(&a, &b);
//! assert!(result.intersects);
//! assert!((result.depth - 0.5).abs() < 1e-5);
//! ```

pub mod obb;
pub mod world;

pub use obb::{contains_point, resolve_penetration, test, Collider, ColliderOwner, SatResult};
pub use world::{CollisionWorld, Scope, StaticGeometry, StaticId};
