//! `X509Certificate`: certificate chain resource used by [`TlsOptions`](crate::classes::TlsOptions).

use crate::bindings::backend::ErrorCode;
use crate::bindings::call::{call_0, call_1};
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::classes::Resource;
use crate::core::error::BindingResult;

static SAVE: MethodBind = MethodBind::new("X509Certificate", "save", 166001499);
static LOAD: MethodBind = MethodBind::new("X509Certificate", "load", 166001499);
static SAVE_TO_STRING: MethodBind =
    MethodBind::new("X509Certificate", "save_to_string", 2841200299);
static LOAD_FROM_STRING: MethodBind =
    MethodBind::new("X509Certificate", "load_from_string", 166001499);

crate::engine_class! {
    pub struct X509Certificate : Resource {
        methods: ["save", "load", "save_to_string", "load_from_string"],
        properties: [],
        signals: [],
    }
}

impl X509Certificate {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn save(&self, path: &str) -> ErrorCode {
        call_1(&SAVE, self.handle(), path)
    }

    pub fn load(&self, path: &str) -> ErrorCode {
        call_1(&LOAD, self.handle(), path)
    }

    /// PEM text of the chain.
    pub fn save_to_string(&self) -> String {
        call_0(&SAVE_TO_STRING, self.handle())
    }

    pub fn load_from_string(&self, pem: &str) -> ErrorCode {
        call_1(&LOAD_FROM_STRING, self.handle(), pem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessEngine;

    const PEM: &str = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";

    #[test]
    fn test_pem_round_trip() {
        HeadlessEngine::install();
        let cert = X509Certificate::new().unwrap();
        assert!(cert.load_from_string(PEM).is_ok());
        assert_eq!(cert.save_to_string(), PEM);
    }

    #[test]
    fn test_rejects_non_pem() {
        HeadlessEngine::install();
        let cert = X509Certificate::new().unwrap();
        assert_eq!(cert.load_from_string("garbage"), ErrorCode::ERR_PARSE_ERROR);
        assert_eq!(cert.save_to_string(), "");
    }
}
