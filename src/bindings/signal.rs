//! Typed signal proxies.
//!
//! A wrapper's `connect_<signal>` turns a typed Rust callback into a
//! [`Callable`] that decodes the emitted variants and registers it under the
//! signal's fixed name; `disconnect_<signal>` reverses the registration.

use super::backend::{ConnectFlags, ErrorCode};
use super::callable::Callable;
use super::object_handle::ObjectHandle;
use super::runtime;
use super::string_name::StringName;
use super::variant::{FromVariant, Variant};

/// Argument tuple of a signal, decoded from the emitted variants.
pub trait SignalArgs: Sized {
    const ARITY: usize;

    fn decode(args: &[Variant]) -> Option<Self>;
}

impl SignalArgs for () {
    const ARITY: usize = 0;

    fn decode(_args: &[Variant]) -> Option<Self> {
        Some(())
    }
}

macro_rules! impl_signal_args {
    ($arity:expr; $($ty:ident : $idx:tt),+) => {
        impl<$($ty: FromVariant),+> SignalArgs for ($($ty,)+) {
            const ARITY: usize = $arity;

            fn decode(args: &[Variant]) -> Option<Self> {
                Some(($($ty::try_from_variant(args.get($idx)?).ok()?,)+))
            }
        }
    };
}

impl_signal_args!(1; A0: 0);
impl_signal_args!(2; A0: 0, A1: 1);
impl_signal_args!(3; A0: 0, A1: 1, A2: 2);
impl_signal_args!(4; A0: 0, A1: 1, A2: 2, A3: 3);

/// Wraps `callback` so it receives decoded arguments.
pub fn typed_callable<Args, F>(signal: &StringName, callback: F) -> Callable
where
    Args: SignalArgs,
    F: Fn(Args) + Send + Sync + 'static,
{
    let signal = signal.clone();
    Callable::from_fn(move |args| match Args::decode(args) {
        Some(decoded) => callback(decoded),
        None => tracing::warn!(
            target: "bindings",
            signal = %signal,
            expected = Args::ARITY,
            received = args.len(),
            "Signal arguments do not match the declared types"
        ),
    })
}

/// Connects a typed callback to `signal` on `object`.
pub fn connect<Args, F>(object: &ObjectHandle, signal: &StringName, callback: F) -> Callable
where
    Args: SignalArgs,
    F: Fn(Args) + Send + Sync + 'static,
{
    let callable = typed_callable(signal, callback);
    let result = connect_callable(object, signal, &callable, ConnectFlags::empty());
    if !result.is_ok() {
        tracing::warn!(target: "bindings", signal = %signal, code = ?result, "Signal connection refused");
    }
    callable
}

pub fn connect_callable(
    object: &ObjectHandle,
    signal: &StringName,
    callable: &Callable,
    flags: ConnectFlags,
) -> ErrorCode {
    runtime::backend().connect(object.id(), signal, callable, flags)
}

pub fn disconnect(object: &ObjectHandle, signal: &StringName, callable: &Callable) {
    runtime::backend().disconnect(object.id(), signal, callable);
}

pub fn is_connected(object: &ObjectHandle, signal: &StringName, callable: &Callable) -> bool {
    runtime::backend().is_connected(object.id(), signal, callable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_decode_tuple() {
        let args = [Variant::Int(3), Variant::String("a".into())];
        let decoded = <(i64, String)>::decode(&args);
        assert_eq!(decoded, Some((3, "a".to_string())));
    }

    #[test]
    fn test_decode_rejects_short_or_mistyped() {
        assert_eq!(<(i64, i64)>::decode(&[Variant::Int(1)]), None);
        assert_eq!(<(bool,)>::decode(&[Variant::Int(1)]), None);
        assert_eq!(<()>::decode(&[Variant::Int(1)]), Some(()));
    }

    #[test]
    fn test_typed_callable_skips_bad_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callable = typed_callable(&StringName::new("value_changed"), move |(v,): (f64,)| {
            sink.lock().unwrap().push(v);
        });

        callable.invoke(&[Variant::Float(0.25)]);
        callable.invoke(&[Variant::String("nope".into())]);
        assert_eq!(*seen.lock().unwrap(), vec![0.25]);
    }
}
