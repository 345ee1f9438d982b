//! Native object handle with its ownership flag.
//!
//! A reference-counted handle takes one engine reference per wrapper
//! (`Clone` takes another, `Drop` gives it back). A manual handle only
//! observes: dropping it does nothing and the object lives until the engine
//! or an explicit `free` destroys it.

use super::backend::{Memory, ObjectId};
use super::class_info::ClassInfo;
use super::runtime;
use crate::core::error::{BindingError, BindingResult};
use std::hash::{Hash, Hasher};

pub struct ObjectHandle {
    id: ObjectId,
    ref_counted: bool,
}

impl ObjectHandle {
    /// Allocates a new native instance of `info`'s class.
    pub(crate) fn construct(info: &ClassInfo) -> BindingResult<Self> {
        let constructor = info
            .constructor()
            .ok_or_else(|| BindingError::ConstructorNotFound(info.name().to_string()))?;
        let id = runtime::backend()
            .construct(constructor)
            .ok_or_else(|| BindingError::ConstructionFailed(info.name().to_string()))?;

        let ref_counted = info.memory() == Memory::RefCounted;
        if ref_counted {
            runtime::backend().reference(id);
        }
        tracing::trace!(target: "bindings", class = info.name(), id = id.raw(), ref_counted, "Object constructed");
        Ok(Self { id, ref_counted })
    }

    /// Adopts an existing native object without allocating.
    ///
    /// Ownership follows the object's actual native discipline.
    pub fn adopt(id: ObjectId) -> Self {
        let backend = runtime::backend();
        let ref_counted = backend.is_ref_counted(id) && backend.reference(id);
        Self { id, ref_counted }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn is_ref_counted(&self) -> bool {
        self.ref_counted
    }

    pub fn memory(&self) -> Memory {
        if self.ref_counted {
            Memory::RefCounted
        } else {
            Memory::Manual
        }
    }
}

impl Clone for ObjectHandle {
    fn clone(&self) -> Self {
        if self.ref_counted {
            runtime::backend().reference(self.id);
        }
        Self {
            id: self.id,
            ref_counted: self.ref_counted,
        }
    }
}

impl Drop for ObjectHandle {
    fn drop(&mut self) {
        if self.ref_counted && runtime::backend().unreference(self.id) {
            tracing::trace!(target: "bindings", id = self.id.raw(), "Last reference released");
        }
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectHandle {}

impl Hash for ObjectHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("id", &self.id.raw())
            .field("memory", &self.memory())
            .finish()
    }
}
