//! # Engine Bindings
//!
//! Generated wrapper classes for a scene-graph game engine, plus the small
//! interop layer they are generated against.
//!
//! ## Architecture Design
//!
//! - **Wrapper classes** ([`classes`]): one handle type per engine class,
//!   typed properties, method forwarders, `_ex` builders and signal proxies.
//! - **Interop layer** ([`bindings`]): method-bind resolution and caching,
//!   typed call adapters, `Variant`, `Callable` and the `EngineBackend` seam.
//! - **Headless engine** ([`headless`]): an in-process engine that implements
//!   the backend for tests and tooling, built in the State + Service style.
//!
//! ### Example
//!
//! ```ignore
//! use engine_bindings::prelude::*;
//!
//! let mesh = ArrayMesh::new()?;
//! let mut arrays = vec![Variant::Nil; ArrayType::MAX.ord() as usize];
//! arrays[ArrayType::VERTEX.ord() as usize] = Variant::PackedVector3Array(vertices);
//! mesh.add_surface_from_arrays(PrimitiveType::TRIANGLES, arrays);
//! assert_eq!(mesh.get_surface_count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: errors, logging and the class-generation macros
//! - [`config`]: backend selection and logging configuration
//! - [`bindings`]: the interop layer
//! - [`classes`]: wrapped engine classes
//! - [`headless`]: in-process engine backend

/// Errors, logging and the class-generation macros
#[macro_use]
pub mod core;
/// Configuration system
pub mod config;
/// Interop layer between wrappers and the engine
pub mod bindings;
/// Wrapped engine classes
pub mod classes;
/// In-process engine backend
pub mod headless;

pub use crate::core::error::{BindingError, BindingResult};

/// 常用类型
pub mod prelude {
    pub use crate::bindings::{
        Aabb, Callable, Color, ConnectFlags, EngineClass, ErrorCode, FromVariant, Rect2,
        StringName, ToVariant, Variant, VariantArray,
    };
    pub use crate::classes::*;
    pub use glam::{IVec2, Vec2, Vec3};
}
