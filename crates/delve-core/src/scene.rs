//! Scene collaborator.
//!
//! The core tells the renderer's scene graph which visuals to add and remove.
//! It never asks the scene anything.

use serde::{Deserialize, Serialize};

use crate::collision::Scope;
use crate::entity::ActorId;
use crate::projectile::ProjectileId;

/// A visual the core asks the scene to manage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneObject {
    /// An actor's model
    Actor(ActorId),
    /// A projectile's model
    Projectile(ProjectileId),
}

/// Scene-graph insertion and removal.
pub trait SceneHooks {
    /// Adds a visual to the given scope's scene.
    fn add_object(&mut self, object: SceneObject, scope: Scope);

    /// Removes a visual from whichever scene holds it.
    fn remove_object(&mut self, object: SceneObject);
}

/// Scene that ignores every call, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullScene;

impl SceneHooks for NullScene {
    fn add_object(&mut self, _object: SceneObject, _scope: Scope) {}

    fn remove_object(&mut self, _object: SceneObject) {}
}
