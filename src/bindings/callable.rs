//! Managed callbacks in the engine's callable convention.
//!
//! A [`Callable`] pairs a process-unique id with a closure over variant
//! arguments. Backends that hand callables across the native boundary keep
//! them in the [`CallableRegistry`] so the engine can call back by
//! connection token.

use super::backend::ObjectId;
use super::string_name::StringName;
use super::variant::Variant;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

type CallableFn = dyn Fn(&[Variant]) + Send + Sync;

static NEXT_CALLABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId(u64);

impl CallableId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Managed callback wrapped for the native call convention.
#[derive(Clone)]
pub struct Callable {
    id: CallableId,
    target: Arc<CallableFn>,
}

impl Callable {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Variant]) + Send + Sync + 'static,
    {
        Self {
            id: CallableId(NEXT_CALLABLE_ID.fetch_add(1, Ordering::Relaxed)),
            target: Arc::new(f),
        }
    }

    pub fn id(&self) -> CallableId {
        self.id
    }

    pub fn invoke(&self, args: &[Variant]) {
        (self.target)(args);
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Callable {}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("id", &self.id.0).finish()
    }
}

/// Handle the native side uses to call back into one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionToken(u64);

impl ConnectionToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConnectionKey {
    object: ObjectId,
    signal: StringName,
    callable: CallableId,
}

struct Connection {
    key: ConnectionKey,
    callable: Callable,
    one_shot: bool,
    // 引用计数连接的连接次数
    count: usize,
}

#[derive(Default)]
struct RegistryInner {
    next_token: u64,
    by_token: HashMap<ConnectionToken, Connection>,
    by_key: HashMap<ConnectionKey, ConnectionToken>,
}

impl RegistryInner {
    fn remove(&mut self, token: ConnectionToken) -> Option<Connection> {
        let connection = self.by_token.remove(&token)?;
        self.by_key.remove(&connection.key);
        Some(connection)
    }
}

/// Native connections and the callables they reach.
///
/// Every `(object, signal, callable)` connection gets its own token, so a
/// callable shared between objects stays alive until its last connection
/// goes away.
#[derive(Default)]
pub struct CallableRegistry {
    inner: Mutex<RegistryInner>,
}

impl CallableRegistry {
    /// Process-wide registry
    pub fn global() -> &'static CallableRegistry {
        static REGISTRY: OnceLock<CallableRegistry> = OnceLock::new();
        REGISTRY.get_or_init(CallableRegistry::default)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Token of an existing connection.
    pub fn lookup(&self, object: ObjectId, signal: &StringName, callable: CallableId) -> Option<ConnectionToken> {
        let key = ConnectionKey {
            object,
            signal: signal.clone(),
            callable,
        };
        self.lock().by_key.get(&key).copied()
    }

    /// Records one connection; connecting again bumps its count.
    pub fn retain(
        &self,
        object: ObjectId,
        signal: &StringName,
        callable: &Callable,
        one_shot: bool,
    ) -> ConnectionToken {
        let key = ConnectionKey {
            object,
            signal: signal.clone(),
            callable: callable.id(),
        };
        let mut inner = self.lock();
        if let Some(token) = inner.by_key.get(&key).copied() {
            if let Some(connection) = inner.by_token.get_mut(&token) {
                connection.count += 1;
                return token;
            }
        }
        inner.next_token += 1;
        let token = ConnectionToken(inner.next_token);
        inner.by_key.insert(key.clone(), token);
        inner.by_token.insert(
            token,
            Connection {
                key,
                callable: callable.clone(),
                one_shot,
                count: 1,
            },
        );
        token
    }

    /// Drops one count of a connection; returns `true` when it was removed.
    pub fn release(&self, token: ConnectionToken) -> bool {
        let mut inner = self.lock();
        let Some(connection) = inner.by_token.get_mut(&token) else {
            return false;
        };
        connection.count -= 1;
        if connection.count > 0 {
            return false;
        }
        inner.remove(token);
        true
    }

    /// Callable to invoke for a fired connection. One-shot connections are
    /// removed before the call.
    pub fn fire(&self, token: ConnectionToken) -> Option<Callable> {
        let mut inner = self.lock();
        let one_shot = inner.by_token.get(&token)?.one_shot;
        if one_shot {
            inner.remove(token).map(|connection| connection.callable)
        } else {
            inner.by_token.get(&token).map(|connection| connection.callable.clone())
        }
    }

    /// Forgets every connection of a destroyed object.
    pub fn release_object(&self, object: ObjectId) -> usize {
        let mut inner = self.lock();
        let tokens: Vec<ConnectionToken> = inner
            .by_token
            .iter()
            .filter(|(_, connection)| connection.key.object == object)
            .map(|(token, _)| *token)
            .collect();
        for token in &tokens {
            inner.remove(*token);
        }
        tokens.len()
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.lock().by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_ids_are_unique() {
        let a = Callable::from_fn(|_| {});
        let b = Callable::from_fn(|_| {});
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_invoke_passes_arguments() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let callable = Callable::from_fn(move |args| {
            counter.fetch_add(args.len(), Ordering::SeqCst);
        });
        callable.invoke(&[Variant::Int(1), Variant::Nil]);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    fn object(raw: u64) -> ObjectId {
        ObjectId::from_raw(raw).unwrap()
    }

    #[test]
    fn test_shared_callable_survives_foreign_disconnect() {
        let registry = CallableRegistry::default();
        let signal = StringName::new("changed");
        let callable = Callable::from_fn(|_| {});

        let a = registry.retain(object(1), &signal, &callable, false);
        let b = registry.retain(object(2), &signal, &callable, false);
        assert_ne!(a, b);

        // 从未连接的对象上断开不影响其它连接
        assert_eq!(registry.lookup(object(3), &signal, callable.id()), None);

        assert!(registry.release(a));
        assert_eq!(registry.lookup(object(1), &signal, callable.id()), None);
        assert_eq!(registry.fire(b), Some(callable.clone()));
        assert!(registry.release(b));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reference_counted_connections() {
        let registry = CallableRegistry::default();
        let signal = StringName::new("changed");
        let callable = Callable::from_fn(|_| {});

        let first = registry.retain(object(1), &signal, &callable, false);
        let second = registry.retain(object(1), &signal, &callable, false);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        assert!(!registry.release(first));
        assert!(registry.fire(first).is_some());
        assert!(registry.release(first));
        assert!(!registry.release(first));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_one_shot_released_after_firing() {
        let registry = CallableRegistry::default();
        let callable = Callable::from_fn(|_| {});
        let token = registry.retain(object(1), &StringName::new("finished"), &callable, true);

        assert_eq!(registry.fire(token), Some(callable));
        assert_eq!(registry.fire(token), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_destroyed_object_drops_its_connections() {
        let registry = CallableRegistry::default();
        let callable = Callable::from_fn(|_| {});
        registry.retain(object(1), &StringName::new("ready"), &callable, false);
        registry.retain(object(1), &StringName::new("renamed"), &callable, false);
        let kept = registry.retain(object(2), &StringName::new("ready"), &callable, false);

        assert_eq!(registry.release_object(object(1)), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.fire(kept).is_some());
    }
}
