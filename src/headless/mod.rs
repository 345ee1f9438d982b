//! Headless engine
//!
//! In-process implementation of [`EngineBackend`] used when no native engine
//! library is configured, and by the test suite. It keeps a small class
//! database with the same compatibility hashes as the wrappers, per-object
//! property storage, reference counts and signal connections.
//!
//! Only a documented subset of native behaviour is modelled:
//! - pure-storage properties with class defaults
//! - mesh surface bookkeeping and bounds
//! - node children, tree entry/exit signals and deferred deletion
//! - sprite sheet frame clamping and rect computation
//! - audio playback flags
//! - WebSocket ready-state transitions over a loopback connection
//! - a few `Geometry2D` predicates and the convex hull
//!
//! Methods outside that subset are not registered, so calling them through
//! a wrapper yields the declared return type's sentinel.
//!
//! ## 架构设计
//!
//! ```text
//! ┌──────────────┐   resolve / call   ┌───────────────────────────┐
//! │ MethodBind   │ ─────────────────► │ ClassDb (classes, hashes) │
//! └──────────────┘                    └─────────────┬─────────────┘
//!                                                   │ MethodBody
//!                                                   v
//!                          ┌──────────────────────────────────────┐
//!                          │ services: object · mesh · scene ·    │
//!                          │           socket · geometry          │
//!                          └─────────────┬────────────────────────┘
//!                                        │
//!                                        v
//!                          ┌──────────────────────────────────────┐
//!                          │ ObjectState store (Mutex<HashMap>)   │
//!                          └──────────────────────────────────────┘
//! ```
//!
//! No lock is held while a managed callable runs, so callbacks may call
//! back into the engine.

mod classdb;
mod geometry;
mod mesh;
mod object;
mod scene;
mod socket;
mod state;

pub use classdb::{ClassDb, ClassDef, MethodBody, MethodDef, PropertyDef};
pub use state::CallRecord;

use crate::bindings::backend::{
    ConnectFlags, ConstructorHandle, EngineBackend, ErrorCode, MethodHandle, ObjectId,
};
use crate::bindings::callable::Callable;
use crate::bindings::class_info::EngineClass;
use crate::bindings::runtime;
use crate::bindings::string_name::StringName;
use crate::bindings::variant::{FromVariant, Variant};
use crate::classes::{Node, Object};
use state::{Connection, ObjectState};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread::{self, ThreadId};

/// 每个线程保留的调用记录条数
const CALL_LOG_CAPACITY: usize = 512;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Positional argument, the type's default when absent or mistyped.
pub(crate) fn arg<T: FromVariant + Default>(args: &[Variant], index: usize) -> T {
    args.get(index).map(Variant::to).unwrap_or_default()
}

pub struct HeadlessEngine {
    classes: ClassDb,
    objects: Mutex<HashMap<ObjectId, ObjectState>>,
    next_id: AtomicU64,
    singletons: Mutex<HashMap<usize, ObjectId>>,
    scene_root: OnceLock<ObjectId>,
    resolutions: Mutex<HashMap<(String, String), usize>>,
    call_log: Mutex<HashMap<ThreadId, VecDeque<CallRecord>>>,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            classes: ClassDb::standard(),
            objects: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            singletons: Mutex::new(HashMap::new()),
            scene_root: OnceLock::new(),
            resolutions: Mutex::new(HashMap::new()),
            call_log: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide instance.
    pub fn shared() -> Arc<HeadlessEngine> {
        static SHARED: OnceLock<Arc<HeadlessEngine>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(HeadlessEngine::new())))
    }

    /// Installs the shared instance as the process backend.
    ///
    /// Installing again is a no-op, so every test can call this first.
    pub fn install() -> Arc<HeadlessEngine> {
        let engine = Self::shared();
        if runtime::install_backend(engine.clone()).is_err() && runtime::backend().name() != "headless" {
            tracing::warn!(
                target: "headless",
                backend = runtime::backend().name(),
                "Another backend is already installed"
            );
        }
        engine
    }

    pub fn classes(&self) -> &ClassDb {
        &self.classes
    }

    // ------------------------------------------------------------------
    // Object store
    // ------------------------------------------------------------------

    pub(crate) fn create_object(&self, class: usize) -> ObjectId {
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = ObjectId::from_raw(raw).unwrap_or_else(|| unreachable!("object ids start at 1"));
        let ref_counted = self.classes.chain(class).any(|index| self.classes.class(index).ref_counted);
        lock(&self.objects).insert(id, ObjectState::new(class, ref_counted));
        tracing::trace!(target: "headless", class = self.classes.class(class).name, id = raw, "Object created");
        id
    }

    pub(crate) fn create_object_of(&self, class: &str) -> Option<ObjectId> {
        self.classes.index_of(class).map(|index| self.create_object(index))
    }

    /// Runs `f` on the object's state under the store lock.
    ///
    /// `f` must not call back into the engine.
    pub(crate) fn with_state<R>(&self, id: ObjectId, f: impl FnOnce(&mut ObjectState) -> R) -> Option<R> {
        lock(&self.objects).get_mut(&id).map(f)
    }

    pub(crate) fn class_of(&self, id: ObjectId) -> Option<usize> {
        self.with_state(id, |state| state.class)
    }

    pub(crate) fn is_instance_of(&self, id: ObjectId, class: &str) -> bool {
        self.class_of(id)
            .is_some_and(|index| self.classes.inherits(index, class))
    }

    /// Stored value of `name`, else the class default, else nil.
    pub(crate) fn property(&self, id: ObjectId, name: &str) -> Variant {
        match self.with_state(id, |state| (state.class, state.properties.get(name).cloned())) {
            Some((_, Some(value))) => value,
            Some((class, None)) => self
                .classes
                .find_property(class, name)
                .map(|property| (property.default)())
                .unwrap_or_default(),
            None => Variant::Nil,
        }
    }

    pub(crate) fn store_property(&self, id: ObjectId, name: &str, value: Variant) {
        self.with_state(id, |state| state.properties.insert(name.to_string(), value));
    }

    /// `Object.get`: declared getter if any, else storage.
    pub(crate) fn get_property(&self, id: ObjectId, name: &str) -> Variant {
        let getter = self
            .class_of(id)
            .and_then(|class| self.classes.find_property(class, name))
            .and_then(|property| property.getter);
        match getter {
            Some(getter) => self.call_method(id, getter, &[]),
            None => self.property(id, name),
        }
    }

    /// `Object.set`: declared setter if any, else storage.
    pub(crate) fn set_property(&self, id: ObjectId, name: &str, value: Variant) {
        let declared = self
            .class_of(id)
            .and_then(|class| self.classes.find_property(class, name))
            .map(|property| property.setter);
        match declared {
            Some(Some(setter)) => {
                self.call_method(id, setter, &[value]);
            }
            Some(None) => {
                tracing::warn!(target: "headless", property = name, "Property is read-only");
            }
            None => self.store_property(id, name, value),
        }
    }

    /// Dynamic call by method name, as `Object.call` does.
    pub(crate) fn call_method(&self, id: ObjectId, method: &str, args: &[Variant]) -> Variant {
        let found = self
            .class_of(id)
            .and_then(|class| self.classes.find_method(class, method))
            .map(|(handle, _)| handle);
        match found {
            Some(handle) => self.dispatch(handle, Some(id), args),
            None => {
                tracing::error!(target: "headless", method, id = id.raw(), "Method not found");
                Variant::Nil
            }
        }
    }

    fn dispatch(&self, handle: MethodHandle, object: Option<ObjectId>, args: &[Variant]) -> Variant {
        let Some((class, method)) = self.classes.method(handle) else {
            return Variant::Nil;
        };
        let id = match (method.body, object) {
            (MethodBody::Static(body), _) => return body(self, args),
            (_, Some(id)) => id,
            (_, None) => {
                tracing::error!(target: "headless", class = class.name, method = method.name, "Instance method called without an object");
                return Variant::Nil;
            }
        };
        if !self.is_instance_of(id, class.name) {
            tracing::error!(
                target: "headless",
                class = class.name,
                method = method.name,
                id = id.raw(),
                "Object is freed or not an instance of the method's class"
            );
            return Variant::Nil;
        }

        match method.body {
            MethodBody::Getter(property) => self.property(id, property),
            MethodBody::Setter(property) => {
                self.store_property(id, property, args.first().cloned().unwrap_or_default());
                Variant::Nil
            }
            MethodBody::Instance(body) => body(self, id, args),
            MethodBody::Static(body) => body(self, args),
        }
    }

    /// Destroys the object; nodes leave their parent and take their
    /// children with them.
    pub(crate) fn destroy(&self, id: ObjectId) {
        scene::release_node(self, id);
        let removed = lock(&self.objects).remove(&id);
        if let Some(state) = &removed {
            tracing::trace!(target: "headless", id = id.raw(), "Object destroyed");
            for held in &state.held {
                self.unreference(*held);
            }
        }
        // Connections may own wrappers; drop them outside the lock.
        drop(removed);
    }

    /// Stores an object-valued property, moving the held reference from the
    /// old value to the new one. Returns whether the value changed.
    pub(crate) fn store_object_property(&self, id: ObjectId, name: &str, value: Option<ObjectId>) -> bool {
        let previous: Option<ObjectId> = self.property(id, name).to();
        if previous == value {
            return false;
        }
        if let Some(new) = value {
            if self.reference(new) {
                self.with_state(id, |state| state.held.push(new));
            }
        }
        self.store_property(id, name, Variant::Object(value));
        if let Some(old) = previous {
            let released = self
                .with_state(id, |state| {
                    let position = state.held.iter().position(|held| *held == old)?;
                    Some(state.held.remove(position))
                })
                .flatten();
            if released.is_some() {
                self.unreference(old);
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    /// Emits `signal` on `id`, invoking every connected callable once.
    pub fn emit_signal(&self, id: ObjectId, signal: &str, args: &[Variant]) -> ErrorCode {
        let name = StringName::new(signal);
        let callables: Vec<Callable> = {
            let mut objects = lock(&self.objects);
            let Some(state) = objects.get_mut(&id) else {
                return ErrorCode::ERR_INVALID_PARAMETER;
            };
            if !self.classes.has_signal(state.class, signal) {
                tracing::warn!(target: "headless", signal, id = id.raw(), "Emitting an undeclared signal");
                return ErrorCode::ERR_UNAVAILABLE;
            }
            let Some(connections) = state.connections.get_mut(&name) else {
                return ErrorCode::OK;
            };
            let callables = connections
                .iter()
                .map(|connection| connection.callable.clone())
                .collect();
            connections.retain(|connection| !connection.flags.contains(ConnectFlags::ONE_SHOT));
            callables
        };

        tracing::trace!(target: "headless", signal, id = id.raw(), receivers = callables.len(), "Signal emitted");
        for callable in &callables {
            callable.invoke(args);
        }
        ErrorCode::OK
    }

    pub fn connection_count(&self, id: ObjectId, signal: &str) -> usize {
        let name = StringName::new(signal);
        self.with_state(id, |state| state.connections.get(&name).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Inspection helpers
    // ------------------------------------------------------------------

    pub fn is_alive(&self, id: ObjectId) -> bool {
        lock(&self.objects).contains_key(&id)
    }

    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }

    /// Engine-side reference count, `None` for manual or freed objects.
    pub fn reference_count(&self, id: ObjectId) -> Option<i64> {
        self.with_state(id, |state| state.refcount).flatten()
    }

    /// How many times `(class, method)` was looked up in the class database.
    pub fn resolution_count(&self, class: &str, method: &str) -> usize {
        lock(&self.resolutions)
            .get(&(class.to_string(), method.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Calls made on `object` from the current thread, oldest first.
    pub fn calls_on(&self, object: ObjectId) -> Vec<CallRecord> {
        let log = lock(&self.call_log);
        log.get(&thread::current().id())
            .map(|calls| {
                calls
                    .iter()
                    .filter(|call| call.object == Some(object))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Arguments of the latest `method` call on `object` from this thread.
    pub fn last_args(&self, object: ObjectId, method: &str) -> Option<Vec<Variant>> {
        self.find_last_call(|call| call.object == Some(object) && call.method == method)
    }

    /// Arguments of the latest static `class.method` call from this thread.
    pub fn last_static_args(&self, class: &str, method: &str) -> Option<Vec<Variant>> {
        self.find_last_call(|call| call.object.is_none() && call.class == class && call.method == method)
    }

    fn find_last_call(&self, matches: impl Fn(&CallRecord) -> bool) -> Option<Vec<Variant>> {
        let log = lock(&self.call_log);
        log.get(&thread::current().id())?
            .iter()
            .rev()
            .find(|call| matches(call))
            .map(|call| call.args.clone())
    }

    fn record_call(&self, record: CallRecord) {
        let mut log = lock(&self.call_log);
        let calls = log.entry(thread::current().id()).or_default();
        if calls.len() == CALL_LOG_CAPACITY {
            calls.pop_front();
        }
        calls.push_back(record);
    }

    // ------------------------------------------------------------------
    // Scene
    // ------------------------------------------------------------------

    pub(crate) fn scene_root_id(&self) -> ObjectId {
        *self.scene_root.get_or_init(|| scene::create_root(self))
    }

    /// Root of the scene tree; nodes added below it are inside the tree.
    pub fn scene_root(&self) -> Node {
        Node::from_object_unchecked(Object::from_id(self.scene_root_id()))
    }

    /// Ends the current frame: pending redraws are drawn and nodes queued
    /// with `queue_free` are deleted.
    pub fn process_frame(&self) {
        scene::process_frame(self);
    }

    /// Simulates the end of the stream on an `AudioStreamPlayer`.
    pub fn finish_playback(&self, player: ObjectId) {
        scene::finish_playback(self, player);
    }
}

impl EngineBackend for HeadlessEngine {
    fn name(&self) -> &str {
        "headless"
    }

    fn resolve_constructor(&self, class: &StringName) -> Option<ConstructorHandle> {
        let index = self.classes.index_of(class.as_str())?;
        if !self.classes.class(index).instantiable {
            tracing::debug!(target: "headless", class = %class, "Class is not instantiable");
            return None;
        }
        ConstructorHandle::from_raw(index as u64 + 1)
    }

    fn resolve_method(
        &self,
        class: &StringName,
        method: &StringName,
        hash: u32,
    ) -> Option<MethodHandle> {
        *lock(&self.resolutions)
            .entry((class.to_string(), method.to_string()))
            .or_insert(0) += 1;

        let index = self.classes.index_of(class.as_str())?;
        let (handle, def) = self.classes.find_method(index, method.as_str())?;
        if def.hash != hash {
            tracing::debug!(
                target: "headless",
                class = %class,
                method = %method,
                expected = def.hash,
                requested = hash,
                "Compatibility hash mismatch"
            );
            return None;
        }
        Some(handle)
    }

    fn construct(&self, constructor: ConstructorHandle) -> Option<ObjectId> {
        let index = usize::try_from(constructor.raw() - 1).ok()?;
        if index >= self.classes.len() || !self.classes.class(index).instantiable {
            return None;
        }
        Some(self.create_object(index))
    }

    fn singleton(&self, name: &StringName) -> Option<ObjectId> {
        let index = self.classes.index_of(name.as_str())?;
        if !self.classes.class(index).singleton {
            return None;
        }
        let mut singletons = lock(&self.singletons);
        let id = *singletons
            .entry(index)
            .or_insert_with(|| self.create_object(index));
        Some(id)
    }

    fn call(&self, method: MethodHandle, object: Option<ObjectId>, args: &[Variant]) -> Variant {
        let Some((class, def)) = self.classes.method(method) else {
            tracing::error!(target: "headless", handle = method.raw(), "Unknown method handle");
            return Variant::Nil;
        };
        self.record_call(CallRecord {
            class: class.name,
            method: def.name,
            object,
            args: args.to_vec(),
        });
        self.dispatch(method, object, args)
    }

    fn connect(
        &self,
        object: ObjectId,
        signal: &StringName,
        callable: &Callable,
        flags: ConnectFlags,
    ) -> ErrorCode {
        let mut objects = lock(&self.objects);
        let Some(state) = objects.get_mut(&object) else {
            return ErrorCode::ERR_INVALID_PARAMETER;
        };
        if !self.classes.has_signal(state.class, signal.as_str()) {
            tracing::warn!(target: "headless", signal = %signal, "Connecting to an undeclared signal");
            return ErrorCode::ERR_INVALID_PARAMETER;
        }

        let connections = state.connections.entry(signal.clone()).or_default();
        if let Some(existing) = connections.iter_mut().find(|c| c.callable == *callable) {
            if flags.contains(ConnectFlags::REFERENCE_COUNTED) {
                existing.count += 1;
                return ErrorCode::OK;
            }
            return ErrorCode::ERR_INVALID_PARAMETER;
        }
        connections.push(Connection {
            callable: callable.clone(),
            flags,
            count: 1,
        });
        ErrorCode::OK
    }

    fn disconnect(&self, object: ObjectId, signal: &StringName, callable: &Callable) {
        let removed = {
            let mut objects = lock(&self.objects);
            objects
                .get_mut(&object)
                .and_then(|state| state.connections.get_mut(signal))
                .and_then(|connections| {
                    let position = connections.iter().position(|c| c.callable == *callable)?;
                    let connection = &mut connections[position];
                    if connection.count > 1 {
                        connection.count -= 1;
                        Some(None)
                    } else {
                        Some(Some(connections.remove(position)))
                    }
                })
        };
        if removed.is_none() {
            tracing::error!(target: "headless", signal = %signal, id = object.raw(), "Disconnecting a nonexistent connection");
        }
    }

    fn is_connected(&self, object: ObjectId, signal: &StringName, callable: &Callable) -> bool {
        self.with_state(object, |state| {
            state
                .connections
                .get(signal)
                .is_some_and(|connections| connections.iter().any(|c| c.callable == *callable))
        })
        .unwrap_or(false)
    }

    fn reference(&self, object: ObjectId) -> bool {
        self.with_state(object, |state| match state.refcount.as_mut() {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        })
        .unwrap_or(false)
    }

    fn unreference(&self, object: ObjectId) -> bool {
        let released = self
            .with_state(object, |state| match state.refcount.as_mut() {
                Some(count) => {
                    *count -= 1;
                    *count <= 0
                }
                None => false,
            })
            .unwrap_or(false);
        if released {
            self.destroy(object);
        }
        released
    }

    fn free(&self, object: ObjectId) {
        match self.with_state(object, |state| state.refcount.is_some()) {
            None => tracing::warn!(target: "headless", id = object.raw(), "Freeing an invalid object"),
            Some(true) => tracing::error!(
                target: "headless",
                id = object.raw(),
                "Reference-counted objects can't be freed explicitly"
            ),
            Some(false) => self.destroy(object),
        }
    }

    fn is_ref_counted(&self, object: ObjectId) -> bool {
        self.with_state(object, |state| state.refcount.is_some())
            .unwrap_or(false)
    }

    fn is_instance_valid(&self, object: ObjectId) -> bool {
        self.is_alive(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn engine_with_object() -> (HeadlessEngine, ObjectId) {
        let engine = HeadlessEngine::new();
        let id = engine.create_object_of("Object").unwrap();
        (engine, id)
    }

    #[test]
    fn test_constructor_requires_instantiable_class() {
        let engine = HeadlessEngine::new();
        assert!(engine.resolve_constructor(&StringName::new("Node")).is_some());
        assert!(engine.resolve_constructor(&StringName::new("Mesh")).is_none());
        assert!(engine.resolve_constructor(&StringName::new("Missing")).is_none());
    }

    #[test]
    fn test_resolution_checks_hash() {
        let engine = HeadlessEngine::new();
        let node = StringName::new("Node2D");
        let method = StringName::new("get_class");
        assert!(engine.resolve_method(&node, &method, 201670096).is_some());
        assert!(engine.resolve_method(&node, &method, 7).is_none());
        assert_eq!(engine.resolution_count("Node2D", "get_class"), 2);
    }

    #[test]
    fn test_refcount_lifecycle() {
        let engine = HeadlessEngine::new();
        let id = engine.create_object_of("RefCounted").unwrap();
        assert!(engine.is_ref_counted(id));
        assert!(engine.reference(id));
        assert!(engine.reference(id));
        assert!(!engine.unreference(id));
        assert_eq!(engine.reference_count(id), Some(1));

        engine.free(id);
        assert!(engine.is_alive(id));
        assert!(engine.unreference(id));
        assert!(!engine.is_alive(id));
    }

    #[test]
    fn test_one_shot_connection_fires_once() {
        let (engine, id) = engine_with_object();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let callable = Callable::from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let signal = StringName::new("script_changed");

        assert!(engine.connect(id, &signal, &callable, ConnectFlags::ONE_SHOT).is_ok());
        engine.emit_signal(id, "script_changed", &[]);
        engine.emit_signal(id, "script_changed", &[]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!engine.is_connected(id, &signal, &callable));
    }

    #[test]
    fn test_reference_counted_connection() {
        let (engine, id) = engine_with_object();
        let callable = Callable::from_fn(|_| {});
        let signal = StringName::new("script_changed");

        assert!(engine.connect(id, &signal, &callable, ConnectFlags::empty()).is_ok());
        assert_eq!(
            engine.connect(id, &signal, &callable, ConnectFlags::empty()),
            ErrorCode::ERR_INVALID_PARAMETER
        );
        assert!(engine.connect(id, &signal, &callable, ConnectFlags::REFERENCE_COUNTED).is_ok());

        engine.disconnect(id, &signal, &callable);
        assert!(engine.is_connected(id, &signal, &callable));
        engine.disconnect(id, &signal, &callable);
        assert!(!engine.is_connected(id, &signal, &callable));
    }

    #[test]
    fn test_undeclared_signal_is_rejected() {
        let (engine, id) = engine_with_object();
        let callable = Callable::from_fn(|_| {});
        assert_eq!(
            engine.connect(id, &StringName::new("nope"), &callable, ConnectFlags::empty()),
            ErrorCode::ERR_INVALID_PARAMETER
        );
        assert_eq!(engine.emit_signal(id, "nope", &[]), ErrorCode::ERR_UNAVAILABLE);
    }

    #[test]
    fn test_callback_may_reenter_engine() {
        let engine = Arc::new(HeadlessEngine::new());
        let id = engine.create_object_of("Object").unwrap();
        let inner = Arc::clone(&engine);
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        let callable = Callable::from_fn(move |_| {
            if inner.is_alive(id) {
                sink.fetch_add(1, Ordering::SeqCst);
            }
        });
        engine.connect(id, &StringName::new("property_list_changed"), &callable, ConnectFlags::empty());
        engine.emit_signal(id, "property_list_changed", &[]);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_call_log_is_per_thread() {
        let engine = Arc::new(HeadlessEngine::new());
        let id = engine.create_object_of("Object").unwrap();
        let object = engine.classes().index_of("Object").unwrap();
        let (handle, _) = engine.classes().find_method(object, "get_class").unwrap();

        engine.call(handle, Some(id), &[]);
        let other = Arc::clone(&engine);
        thread::spawn(move || {
            assert!(other.calls_on(id).is_empty());
        })
        .join()
        .unwrap();
        assert_eq!(engine.calls_on(id).len(), 1);
        assert_eq!(engine.last_args(id, "get_class"), Some(vec![]));
    }

    #[test]
    fn test_singleton_is_created_once() {
        let engine = HeadlessEngine::new();
        let name = StringName::new("Geometry2D");
        let first = engine.singleton(&name).unwrap();
        assert_eq!(engine.singleton(&name), Some(first));
        assert!(!engine.is_ref_counted(first));
        assert!(engine.singleton(&StringName::new("Node")).is_none());
    }
}
