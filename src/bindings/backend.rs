//! Engine backend capability.
//!
//! Everything the wrappers need from the engine goes through [`EngineBackend`]:
//! symbol resolution against the class database, construction, typed calls,
//! signal connections and reference counting. The native engine library and
//! the headless test double both implement it.

use super::callable::Callable;
use super::string_name::StringName;
use super::variant::Variant;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Opaque id of an engine-side object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(NonZeroU64);

impl ObjectId {
    /// `0` is the engine's null object.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// Resolved method bind (callable address in the engine's class database).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodHandle(NonZeroU64);

impl MethodHandle {
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// Resolved class constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstructorHandle(NonZeroU64);

impl ConstructorHandle {
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// Memory discipline declared by a wrapped class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Memory {
    /// 包装器参与引用计数，最后一个包装器释放时引擎销毁对象
    RefCounted,
    /// 包装器只是观察者，对象由引擎或显式 `free` 释放
    Manual,
}

crate::engine_enum! {
    /// Engine error code, returned unchanged from wrapped methods.
    pub struct ErrorCode {
        OK = 0,
        FAILED = 1,
        ERR_UNAVAILABLE = 2,
        ERR_UNCONFIGURED = 3,
        ERR_UNAUTHORIZED = 4,
        ERR_PARAMETER_RANGE_ERROR = 5,
        ERR_OUT_OF_MEMORY = 6,
        ERR_FILE_NOT_FOUND = 7,
        ERR_CANT_OPEN = 19,
        ERR_CANT_CREATE = 20,
        ERR_ALREADY_IN_USE = 22,
        ERR_TIMEOUT = 24,
        ERR_CANT_CONNECT = 25,
        ERR_CANT_RESOLVE = 26,
        ERR_CONNECTION_ERROR = 27,
        ERR_INVALID_DATA = 30,
        ERR_INVALID_PARAMETER = 31,
        ERR_ALREADY_EXISTS = 32,
        ERR_DOES_NOT_EXIST = 33,
        ERR_PARSE_ERROR = 43,
        ERR_BUSY = 44,
        ERR_BUG = 47,
    }
}

impl ErrorCode {
    pub fn is_ok(self) -> bool {
        self == ErrorCode::OK
    }
}

bitflags! {
    /// Signal connection flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConnectFlags: u32 {
        const DEFERRED = 1;
        const PERSIST = 2;
        const ONE_SHOT = 4;
        const REFERENCE_COUNTED = 8;
    }
}

/// Capability interface onto the engine.
///
/// Implementations must be usable from any thread; the engine's own
/// threading rules still apply to the objects behind the ids.
pub trait EngineBackend: Send + Sync {
    /// 短名称，用于日志
    fn name(&self) -> &str;

    fn resolve_constructor(&self, class: &StringName) -> Option<ConstructorHandle>;

    fn resolve_method(
        &self,
        class: &StringName,
        method: &StringName,
        hash: u32,
    ) -> Option<MethodHandle>;

    fn construct(&self, constructor: ConstructorHandle) -> Option<ObjectId>;

    fn singleton(&self, name: &StringName) -> Option<ObjectId>;

    /// Invokes a method bind. `object` is `None` for static methods.
    fn call(&self, method: MethodHandle, object: Option<ObjectId>, args: &[Variant]) -> Variant;

    fn connect(
        &self,
        object: ObjectId,
        signal: &StringName,
        callable: &Callable,
        flags: ConnectFlags,
    ) -> ErrorCode;

    fn disconnect(&self, object: ObjectId, signal: &StringName, callable: &Callable);

    fn is_connected(&self, object: ObjectId, signal: &StringName, callable: &Callable) -> bool;

    /// Takes a reference; returns `false` if the object is not reference counted.
    fn reference(&self, object: ObjectId) -> bool;

    /// Drops a reference; returns `true` when the engine destroyed the object.
    fn unreference(&self, object: ObjectId) -> bool;

    fn free(&self, object: ObjectId);

    fn is_ref_counted(&self, object: ObjectId) -> bool;

    fn is_instance_valid(&self, object: ObjectId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_ids() {
        assert!(ObjectId::from_raw(0).is_none());
        assert_eq!(ObjectId::from_raw(42).map(ObjectId::raw), Some(42));
        assert!(MethodHandle::from_raw(0).is_none());
        assert!(ConstructorHandle::from_raw(0).is_none());
    }

    #[test]
    fn test_error_code_passthrough() {
        assert!(ErrorCode::OK.is_ok());
        assert!(!ErrorCode::ERR_CANT_CONNECT.is_ok());
        assert_eq!(ErrorCode::from_ord(25), ErrorCode::ERR_CANT_CONNECT);
        assert_eq!(format!("{:?}", ErrorCode::from_ord(48)), "ErrorCode(48)");
    }

    #[test]
    fn test_connect_flag_bits() {
        let flags = ConnectFlags::ONE_SHOT | ConnectFlags::REFERENCE_COUNTED;
        assert_eq!(flags.bits(), 12);
        assert!(flags.contains(ConnectFlags::ONE_SHOT));
    }
}
