//! Language Binding Layer (FFI)
//!
//! The interop layer every wrapper class in [`crate::classes`] is generated
//! against. Wrappers never talk to the engine directly; they go through the
//! fixed call surface below.
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Wrapper classes (crate::classes)               │
//! │   properties · method forwarders · signal proxies           │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │
//!                             v
//! ┌─────────────────────────────────────────────────────────────┐
//! │  MethodBind / ClassInfo      call_0 … call_6      signal    │
//! │  (resolve once, cache)       (typed adapters)     proxies   │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │  Variant frames
//!                             v
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  EngineBackend (runtime)                    │
//! │      NativeBackend (libloading)   │   HeadlessEngine        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod call;
pub mod callable;
pub mod class_info;
pub mod method_bind;
pub mod native;
pub mod object_handle;
pub mod runtime;
pub mod signal;
pub mod string_name;
pub mod variant;

pub use backend::{
    ConnectFlags, ConstructorHandle, EngineBackend, ErrorCode, Memory, MethodHandle, ObjectId,
};
pub use callable::{Callable, CallableId, CallableRegistry, ConnectionToken};
pub use class_info::{ClassInfo, ClassNames, EngineClass};
pub use method_bind::MethodBind;
pub use native::NativeBackend;
pub use object_handle::ObjectHandle;
pub use string_name::{StaticName, StringName};
pub use variant::{
    Aabb, Color, Dictionary, FromVariant, Rect2, ToVariant, Variant, VariantArray,
    VariantConversionError, VariantType,
};
