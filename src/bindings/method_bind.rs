//! Lazily resolved method binds.
//!
//! Each wrapped method owns one `static MethodBind`. The first call resolves
//! `(class, method, hash)` against the installed backend; the outcome, found
//! or not, is cached for the rest of the process.

use super::backend::MethodHandle;
use super::runtime;
use super::string_name::StringName;
use std::fmt;
use std::sync::OnceLock;

pub struct MethodBind {
    class: &'static str,
    method: &'static str,
    hash: u32,
    handle: OnceLock<Option<MethodHandle>>,
}

impl MethodBind {
    pub const fn new(class: &'static str, method: &'static str, hash: u32) -> Self {
        Self {
            class,
            method,
            hash,
            handle: OnceLock::new(),
        }
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Resolved handle, `None` if the engine does not know this bind.
    pub fn handle(&self) -> Option<MethodHandle> {
        *self.handle.get_or_init(|| self.resolve())
    }

    pub fn is_resolved(&self) -> bool {
        self.handle.get().is_some()
    }

    fn resolve(&self) -> Option<MethodHandle> {
        let class = StringName::new(self.class);
        let method = StringName::new(self.method);
        let handle = runtime::backend().resolve_method(&class, &method, self.hash);
        match handle {
            Some(handle) => tracing::trace!(
                target: "bindings",
                class = self.class,
                method = self.method,
                handle = handle.raw(),
                "Method bind resolved"
            ),
            None => tracing::error!(
                target: "bindings",
                class = self.class,
                method = self.method,
                hash = self.hash,
                "Method bind not found in engine class database"
            ),
        }
        handle
    }
}

impl fmt::Debug for MethodBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBind")
            .field("class", &self.class)
            .field("method", &self.method)
            .field("hash", &self.hash)
            .field("handle", &self.handle.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessEngine;

    #[test]
    fn test_resolves_once() {
        static GET_CLASS: MethodBind = MethodBind::new("Object", "get_class", 201670096);
        let engine = HeadlessEngine::install();

        assert!(GET_CLASS.handle().is_some());
        assert!(GET_CLASS.is_resolved());
        let before = engine.resolution_count("Object", "get_class");
        GET_CLASS.handle();
        GET_CLASS.handle();
        assert_eq!(engine.resolution_count("Object", "get_class"), before);
    }

    #[test]
    fn test_hash_mismatch_is_cached_as_absent() {
        static STALE: MethodBind = MethodBind::new("Object", "is_class", 1);
        HeadlessEngine::install();

        assert!(STALE.handle().is_none());
        assert!(STALE.is_resolved());
        assert!(STALE.handle().is_none());
    }
}
