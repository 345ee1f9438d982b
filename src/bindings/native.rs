//! Native engine backend.
//!
//! Loads the engine's binding library with libloading and maps
//! [`EngineBackend`] onto its C ABI. Argument lists and return values cross
//! the boundary as bincode-encoded variant frames; the engine owns returned
//! buffers and takes them back through `engine_bindings_free_buffer`.
//! Connections are named on the native side by their [`ConnectionToken`],
//! never by the callable id.
//!
//! Exported symbols:
//!
//! | Symbol | Signature |
//! | --- | --- |
//! | `engine_bindings_get_constructor` | `(class: *const c_char) -> u64` |
//! | `engine_bindings_construct` | `(constructor: u64) -> u64` |
//! | `engine_bindings_get_singleton` | `(name: *const c_char) -> u64` |
//! | `engine_bindings_get_method_bind` | `(class, method: *const c_char, hash: u32) -> u64` |
//! | `engine_bindings_call` | `(method, object: u64, args: *const u8, len: usize, ret: *mut NativeBuffer)` |
//! | `engine_bindings_free_buffer` | `(buffer: NativeBuffer)` |
//! | `engine_bindings_connect` | `(object: u64, signal: *const c_char, token: u64, flags: u32, trampoline) -> i64` |
//! | `engine_bindings_disconnect` | `(object: u64, signal: *const c_char, token: u64)` |
//! | `engine_bindings_is_connected` | `(object: u64, signal: *const c_char, token: u64) -> u8` |
//! | `engine_bindings_reference` / `_unreference` | `(object: u64) -> u8` |
//! | `engine_bindings_free` | `(object: u64)` |
//! | `engine_bindings_is_ref_counted` / `_is_instance_valid` | `(object: u64) -> u8` |

use super::backend::{
    ConnectFlags, ConstructorHandle, EngineBackend, ErrorCode, MethodHandle, ObjectId,
};
use super::callable::{Callable, CallableRegistry, ConnectionToken};
use super::string_name::StringName;
use super::variant::Variant;
use crate::core::error::{BindingError, BindingResult};
use libloading::Library;
use std::ffi::{c_char, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::ptr;

/// Engine-owned byte buffer returned from a call.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NativeBuffer {
    pub ptr: *mut u8,
    pub len: usize,
}

/// Entry point the engine calls when a connected signal fires.
pub type CallableTrampoline = unsafe extern "C" fn(token: u64, args: *const u8, args_len: usize);

type GetConstructorFn = unsafe extern "C" fn(class: *const c_char) -> u64;
type ConstructFn = unsafe extern "C" fn(constructor: u64) -> u64;
type GetSingletonFn = unsafe extern "C" fn(name: *const c_char) -> u64;
type GetMethodBindFn =
    unsafe extern "C" fn(class: *const c_char, method: *const c_char, hash: u32) -> u64;
type CallFn = unsafe extern "C" fn(
    method: u64,
    object: u64,
    args: *const u8,
    args_len: usize,
    ret: *mut NativeBuffer,
);
type FreeBufferFn = unsafe extern "C" fn(buffer: NativeBuffer);
type ConnectFn = unsafe extern "C" fn(
    object: u64,
    signal: *const c_char,
    token: u64,
    flags: u32,
    trampoline: CallableTrampoline,
) -> i64;
type DisconnectFn = unsafe extern "C" fn(object: u64, signal: *const c_char, token: u64);
type IsConnectedFn = unsafe extern "C" fn(object: u64, signal: *const c_char, token: u64) -> u8;
type ObjectPredicateFn = unsafe extern "C" fn(object: u64) -> u8;
type FreeObjectFn = unsafe extern "C" fn(object: u64);

struct NativeApi {
    get_constructor: GetConstructorFn,
    construct: ConstructFn,
    get_singleton: GetSingletonFn,
    get_method_bind: GetMethodBindFn,
    call: CallFn,
    free_buffer: FreeBufferFn,
    connect: ConnectFn,
    disconnect: DisconnectFn,
    is_connected: IsConnectedFn,
    reference: ObjectPredicateFn,
    unreference: ObjectPredicateFn,
    free: FreeObjectFn,
    is_ref_counted: ObjectPredicateFn,
    is_instance_valid: ObjectPredicateFn,
}

/// Copies a function pointer out of the library.
///
/// # Safety
/// `T` must be the exact function pointer type of the exported symbol.
unsafe fn symbol<T: Copy>(library: &Library, name: &str) -> BindingResult<T> {
    let symbol = library
        .get::<T>(name.as_bytes())
        .map_err(|_| BindingError::MissingSymbol(name.to_string()))?;
    Ok(*symbol)
}

impl NativeApi {
    /// # Safety
    /// The library must export the binding ABI documented at module level.
    unsafe fn load(library: &Library) -> BindingResult<Self> {
        Ok(Self {
            get_constructor: symbol(library, "engine_bindings_get_constructor")?,
            construct: symbol(library, "engine_bindings_construct")?,
            get_singleton: symbol(library, "engine_bindings_get_singleton")?,
            get_method_bind: symbol(library, "engine_bindings_get_method_bind")?,
            call: symbol(library, "engine_bindings_call")?,
            free_buffer: symbol(library, "engine_bindings_free_buffer")?,
            connect: symbol(library, "engine_bindings_connect")?,
            disconnect: symbol(library, "engine_bindings_disconnect")?,
            is_connected: symbol(library, "engine_bindings_is_connected")?,
            reference: symbol(library, "engine_bindings_reference")?,
            unreference: symbol(library, "engine_bindings_unreference")?,
            free: symbol(library, "engine_bindings_free")?,
            is_ref_counted: symbol(library, "engine_bindings_is_ref_counted")?,
            is_instance_valid: symbol(library, "engine_bindings_is_instance_valid")?,
        })
    }
}

/// Backend backed by a dynamically loaded engine library.
pub struct NativeBackend {
    api: NativeApi,
    path: PathBuf,
    // Keeps the function pointers in `api` valid.
    _library: Library,
}

impl NativeBackend {
    pub fn load(path: impl AsRef<Path>) -> BindingResult<Self> {
        let path = path.as_ref();
        let library = unsafe { Library::new(path) }.map_err(|e| BindingError::LibraryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let api = unsafe { NativeApi::load(&library)? };
        tracing::info!(target: "bindings", path = %path.display(), "Engine library loaded");
        Ok(Self {
            api,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn c_name(name: &StringName) -> Option<CString> {
    match CString::new(name.as_str()) {
        Ok(name) => Some(name),
        Err(_) => {
            tracing::error!(target: "bindings", name = %name, "Name contains an interior NUL byte");
            None
        }
    }
}

pub(crate) fn encode_frame(args: &[Variant]) -> BindingResult<Vec<u8>> {
    bincode::serialize(args).map_err(|e| BindingError::Encode(e.to_string()))
}

pub(crate) fn decode_frame(bytes: &[u8]) -> BindingResult<Vec<Variant>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    bincode::deserialize(bytes).map_err(|e| BindingError::Encode(e.to_string()))
}

/// Called by the engine when a signal connected through this backend fires.
/// One-shot connections are forgotten once they fire.
///
/// # Safety
/// `args` must point to `args_len` readable bytes (or be null with length 0).
pub unsafe extern "C" fn invoke_callable(token: u64, args: *const u8, args_len: usize) {
    let bytes: &[u8] = if args.is_null() || args_len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(args, args_len)
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let args = match decode_frame(bytes) {
            Ok(args) => args,
            Err(err) => {
                tracing::error!(target: "bindings", token, error = %err, "Bad signal argument frame");
                return;
            }
        };
        match CallableRegistry::global().fire(ConnectionToken::from_raw(token)) {
            Some(target) => target.invoke(&args),
            None => tracing::warn!(target: "bindings", token, "Signal fired for unknown connection"),
        }
    }));

    if outcome.is_err() {
        tracing::error!(target: "bindings", token, "Signal callback panicked");
    }
}

impl EngineBackend for NativeBackend {
    fn name(&self) -> &str {
        "native"
    }

    fn resolve_constructor(&self, class: &StringName) -> Option<ConstructorHandle> {
        let class = c_name(class)?;
        ConstructorHandle::from_raw(unsafe { (self.api.get_constructor)(class.as_ptr()) })
    }

    fn resolve_method(
        &self,
        class: &StringName,
        method: &StringName,
        hash: u32,
    ) -> Option<MethodHandle> {
        let class = c_name(class)?;
        let method = c_name(method)?;
        MethodHandle::from_raw(unsafe {
            (self.api.get_method_bind)(class.as_ptr(), method.as_ptr(), hash)
        })
    }

    fn construct(&self, constructor: ConstructorHandle) -> Option<ObjectId> {
        ObjectId::from_raw(unsafe { (self.api.construct)(constructor.raw()) })
    }

    fn singleton(&self, name: &StringName) -> Option<ObjectId> {
        let name = c_name(name)?;
        ObjectId::from_raw(unsafe { (self.api.get_singleton)(name.as_ptr()) })
    }

    fn call(&self, method: MethodHandle, object: Option<ObjectId>, args: &[Variant]) -> Variant {
        let frame = match encode_frame(args) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(target: "bindings", error = %err, "Failed to encode call arguments");
                return Variant::Nil;
            }
        };

        let mut ret = NativeBuffer {
            ptr: ptr::null_mut(),
            len: 0,
        };
        unsafe {
            (self.api.call)(
                method.raw(),
                object.map_or(0, ObjectId::raw),
                frame.as_ptr(),
                frame.len(),
                &mut ret,
            );
        }
        if ret.ptr.is_null() {
            return Variant::Nil;
        }

        let bytes = unsafe { std::slice::from_raw_parts(ret.ptr, ret.len) };
        let value = match bincode::deserialize::<Variant>(bytes) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(target: "bindings", error = %err, "Failed to decode return value");
                Variant::Nil
            }
        };
        unsafe { (self.api.free_buffer)(ret) };
        value
    }

    fn connect(
        &self,
        object: ObjectId,
        signal: &StringName,
        callable: &Callable,
        flags: ConnectFlags,
    ) -> ErrorCode {
        let Some(c_signal) = c_name(signal) else {
            return ErrorCode::ERR_INVALID_PARAMETER;
        };
        let registry = CallableRegistry::global();
        let connected = registry.lookup(object, signal, callable.id()).is_some();
        if connected && !flags.contains(ConnectFlags::REFERENCE_COUNTED) {
            tracing::error!(target: "bindings", signal = %signal, "Signal is already connected to this callable");
            return ErrorCode::ERR_INVALID_PARAMETER;
        }

        let token = registry.retain(object, signal, callable, flags.contains(ConnectFlags::ONE_SHOT));
        let code = ErrorCode::from_ord(unsafe {
            (self.api.connect)(
                object.raw(),
                c_signal.as_ptr(),
                token.raw(),
                flags.bits(),
                invoke_callable,
            )
        });
        if !code.is_ok() {
            registry.release(token);
        }
        code
    }

    fn disconnect(&self, object: ObjectId, signal: &StringName, callable: &Callable) {
        let registry = CallableRegistry::global();
        let Some(token) = registry.lookup(object, signal, callable.id()) else {
            tracing::error!(target: "bindings", signal = %signal, "Disconnecting a nonexistent connection");
            return;
        };
        let Some(c_signal) = c_name(signal) else {
            return;
        };
        unsafe { (self.api.disconnect)(object.raw(), c_signal.as_ptr(), token.raw()) };
        registry.release(token);
    }

    fn is_connected(&self, object: ObjectId, signal: &StringName, callable: &Callable) -> bool {
        let Some(token) = CallableRegistry::global().lookup(object, signal, callable.id()) else {
            return false;
        };
        let Some(c_signal) = c_name(signal) else {
            return false;
        };
        unsafe { (self.api.is_connected)(object.raw(), c_signal.as_ptr(), token.raw()) != 0 }
    }

    fn reference(&self, object: ObjectId) -> bool {
        unsafe { (self.api.reference)(object.raw()) != 0 }
    }

    fn unreference(&self, object: ObjectId) -> bool {
        let destroyed = unsafe { (self.api.unreference)(object.raw()) != 0 };
        if destroyed {
            CallableRegistry::global().release_object(object);
        }
        destroyed
    }

    fn free(&self, object: ObjectId) {
        unsafe { (self.api.free)(object.raw()) };
        CallableRegistry::global().release_object(object);
    }

    fn is_ref_counted(&self, object: ObjectId) -> bool {
        unsafe { (self.api.is_ref_counted)(object.raw()) != 0 }
    }

    fn is_instance_valid(&self, object: ObjectId) -> bool {
        unsafe { (self.api.is_instance_valid)(object.raw()) != 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_missing_library_reports_path() {
        let err = NativeBackend::load("/nonexistent/libengine_bindings.so")
            .err()
            .expect("load must fail");
        match err {
            BindingError::LibraryLoad { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/libengine_bindings.so"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_frame_round_trip_keeps_types() {
        let args = vec![
            Variant::Int(3),
            Variant::StringName(StringName::new("Master")),
            Variant::PackedVector3Array(vec![Vec3::X, Vec3::Y]),
            Variant::Object(ObjectId::from_raw(9)),
        ];
        let frame = encode_frame(&args).unwrap();
        assert_eq!(decode_frame(&frame).unwrap(), args);
        assert!(decode_frame(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_trampoline_dispatches_by_token() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callable = Callable::from_fn(move |args| sink.lock().unwrap().extend_from_slice(args));
        let object = ObjectId::from_raw(u64::MAX - 1).unwrap();
        let signal = StringName::new("value_changed");
        let token = CallableRegistry::global().retain(object, &signal, &callable, false);

        let frame = encode_frame(&[Variant::Float(1.5)]).unwrap();
        unsafe { invoke_callable(token.raw(), frame.as_ptr(), frame.len()) };
        assert!(CallableRegistry::global().release(token));
        unsafe { invoke_callable(token.raw(), frame.as_ptr(), frame.len()) };

        assert_eq!(*seen.lock().unwrap(), vec![Variant::Float(1.5)]);
    }

    #[test]
    fn test_one_shot_trampoline_forgets_connection() {
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        let callable = Callable::from_fn(move |_| *counter.lock().unwrap() += 1);
        let object = ObjectId::from_raw(u64::MAX - 2).unwrap();
        let signal = StringName::new("finished");
        let token = CallableRegistry::global().retain(object, &signal, &callable, true);

        unsafe { invoke_callable(token.raw(), ptr::null(), 0) };
        unsafe { invoke_callable(token.raw(), ptr::null(), 0) };

        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(CallableRegistry::global().lookup(object, &signal, callable.id()), None);
    }
}
