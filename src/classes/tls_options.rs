//! `TlsOptions`: TLS configuration, created only through its static constructors.

use crate::bindings::call::{call_0, call_static_1, call_static_2};
use crate::bindings::method_bind::MethodBind;
use crate::classes::{RefCounted, X509Certificate};

static CLIENT: MethodBind = MethodBind::new("TlsOptions", "client", 3565000357);
static CLIENT_UNSAFE: MethodBind = MethodBind::new("TlsOptions", "client_unsafe", 2090251749);
static IS_SERVER: MethodBind = MethodBind::new("TlsOptions", "is_server", 36873697);
static IS_UNSAFE_CLIENT: MethodBind = MethodBind::new("TlsOptions", "is_unsafe_client", 36873697);

crate::engine_class! {
    pub struct TlsOptions : RefCounted {
        methods: ["client", "client_unsafe", "is_server", "is_unsafe_client"],
        properties: [],
        signals: [],
    }
}

impl TlsOptions {
    /// Client options verifying against the system CA list.
    pub fn client() -> Option<TlsOptions> {
        Self::client_ex().done()
    }

    pub fn client_ex() -> ExClient<'static> {
        ExClient {
            trusted_chain: None,
            common_name_override: String::new(),
        }
    }

    /// Client options that skip certificate verification.
    pub fn client_unsafe() -> Option<TlsOptions> {
        Self::client_unsafe_ex().done()
    }

    pub fn client_unsafe_ex() -> ExClientUnsafe<'static> {
        ExClientUnsafe {
            trusted_chain: None,
        }
    }

    pub fn is_server(&self) -> bool {
        call_0(&IS_SERVER, self.handle())
    }

    pub fn is_unsafe_client(&self) -> bool {
        call_0(&IS_UNSAFE_CLIENT, self.handle())
    }
}

#[must_use]
pub struct ExClient<'a> {
    trusted_chain: Option<&'a X509Certificate>,
    common_name_override: String,
}

impl<'a> ExClient<'a> {
    pub fn trusted_chain<'b>(self, trusted_chain: &'b X509Certificate) -> ExClient<'b> {
        ExClient {
            trusted_chain: Some(trusted_chain),
            common_name_override: self.common_name_override,
        }
    }

    pub fn common_name_override(mut self, common_name: &str) -> Self {
        self.common_name_override = common_name.to_string();
        self
    }

    pub fn done(self) -> Option<TlsOptions> {
        call_static_2(&CLIENT, self.trusted_chain, self.common_name_override)
    }
}

#[must_use]
pub struct ExClientUnsafe<'a> {
    trusted_chain: Option<&'a X509Certificate>,
}

impl ExClientUnsafe<'_> {
    pub fn trusted_chain(self, trusted_chain: &X509Certificate) -> ExClientUnsafe<'_> {
        ExClientUnsafe {
            trusted_chain: Some(trusted_chain),
        }
    }

    pub fn done(self) -> Option<TlsOptions> {
        call_static_1(&CLIENT_UNSAFE, self.trusted_chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::class_info::EngineClass;
    use crate::bindings::variant::{ToVariant, Variant};
    use crate::headless::HeadlessEngine;

    #[test]
    fn test_static_constructors() {
        let engine = HeadlessEngine::install();
        let safe = TlsOptions::client().unwrap();
        assert!(!safe.is_server());
        assert!(!safe.is_unsafe_client());
        assert_eq!(safe.get_reference_count(), 1);

        let id = safe.instance_id();
        drop(safe);
        assert!(!engine.is_alive(id));

        let unsafe_client = TlsOptions::client_unsafe().unwrap();
        assert!(unsafe_client.is_unsafe_client());
    }

    #[test]
    fn test_client_with_chain() {
        let engine = HeadlessEngine::install();
        let chain = X509Certificate::new().unwrap();
        let options = TlsOptions::client_ex()
            .trusted_chain(&chain)
            .common_name_override("example.com")
            .done()
            .unwrap();
        assert!(!options.is_unsafe_client());

        let args = engine.last_static_args("TlsOptions", "client").unwrap();
        assert_eq!(args[0], chain.to_variant());
        assert_eq!(args[1], Variant::String("example.com".into()));
    }
}
