//! Scene containers.
//!
//! Generated props are plain records. Anything that wants them in a scene
//! graph implements [`SceneSink`] and receives [`SceneObject`]s built from
//! primitive [`Part`]s. [`ContainerRef`] is the shared handle downstream
//! systems use to attach their own objects next to the generated ones.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use verdance_shared::{Transform, Vec3};

/// Primitive shape of one part. Dimensions are full extents, not half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartShape {
    /// Axis-aligned box in the part's local frame.
    Block {
        /// Extent along each local axis.
        size: Vec3,
    },
    /// Sphere.
    Ball {
        /// Radius.
        radius: f32,
    },
    /// Upright cylinder centred on its offset.
    Cylinder {
        /// Radius.
        radius: f32,
        /// Height along local Y.
        height: f32,
    },
    /// Upright cone, base centred on its offset.
    Cone {
        /// Base radius.
        radius: f32,
        /// Height along local Y.
        height: f32,
    },
}

/// Surface treatment of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finish {
    /// Plain diffuse surface.
    Matte,
    /// Foliage.
    Leaves,
    /// Timber.
    Wood,
    /// Stone and rock.
    Stone,
    /// Self-lit surface.
    Emissive,
    /// Not rendered; still collidable if the part says so.
    Invisible,
}

/// One primitive of a generated object.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Short name ("trunk", "deck", ...).
    pub name: &'static str,
    /// Geometry.
    pub shape: PartShape,
    /// Placement relative to the object's pivot.
    pub offset: Transform,
    /// Linear RGB colour.
    pub color: [f32; 3],
    /// Surface treatment.
    pub finish: Finish,
    /// Whether the part blocks movement.
    pub collidable: bool,
}

impl Part {
    /// Creates a collidable matte part at a local offset.
    #[must_use]
    pub fn new(name: &'static str, shape: PartShape, offset: Transform, color: [f32; 3]) -> Self {
        Self {
            name,
            shape,
            offset,
            color,
            finish: Finish::Matte,
            collidable: true,
        }
    }

    /// Sets the finish.
    #[must_use]
    pub fn with_finish(mut self, finish: Finish) -> Self {
        self.finish = finish;
        self
    }

    /// Sets collidability.
    #[must_use]
    pub fn with_collision(mut self, collidable: bool) -> Self {
        self.collidable = collidable;
        self
    }
}

/// A local light source attached to an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Position relative to the object's pivot.
    pub offset: Vec3,
    /// Linear RGB colour.
    pub color: [f32; 3],
    /// Brightness multiplier.
    pub brightness: f32,
    /// Falloff range in world units.
    pub range: f32,
}

/// An object ready to be attached to a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Display name.
    pub name: String,
    /// World transform of the pivot.
    pub transform: Transform,
    /// Primitives, relative to the pivot.
    pub parts: Vec<Part>,
    /// Attached lights.
    pub lights: Vec<PointLight>,
}

/// Identifier of an attached object, unique within its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Anything generated objects can be parented into.
pub trait SceneSink {
    /// Attaches an object and returns its id.
    fn attach(&mut self, object: SceneObject) -> ObjectId;
}

/// A named, ordered list of attached objects.
#[derive(Debug, Clone, Default)]
pub struct SceneContainer {
    name: String,
    objects: Vec<(ObjectId, SceneObject)>,
    next_id: u64,
}

impl SceneContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            next_id: 0,
        }
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of attached objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Looks up an attached object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|(i, _)| *i == id).map(|(_, o)| o)
    }

    /// Mutable access to an attached object.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|(i, _)| *i == id).map(|(_, o)| o)
    }

    /// Iterates objects in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, o)| (*id, o))
    }

    /// Detaches one object.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|(i, _)| *i == id)?;
        Some(self.objects.remove(idx).1)
    }

    /// Keeps only objects matching the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(ObjectId, &SceneObject) -> bool) {
        self.objects.retain(|(id, o)| keep(*id, o));
    }

    /// Detaches everything. Ids are not reused.
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl SceneSink for SceneContainer {
    fn attach(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push((id, object));
        id
    }
}

/// Shared handle to a [`SceneContainer`].
///
/// Cloning the handle shares the container.
#[derive(Debug, Clone)]
pub struct ContainerRef(Arc<RwLock<SceneContainer>>);

impl ContainerRef {
    /// Creates a handle to a new empty container.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(SceneContainer::new(name))))
    }

    /// Read access.
    pub fn read(&self) -> RwLockReadGuard<'_, SceneContainer> {
        self.0.read()
    }

    /// Write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, SceneContainer> {
        self.0.write()
    }

    /// Returns true if both handles share one container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl SceneSink for ContainerRef {
    fn attach(&mut self, object: SceneObject) -> ObjectId {
        self.0.write().attach(object)
    }
}
