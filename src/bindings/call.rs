//! Typed call adapters.
//!
//! One adapter per arity: arguments are packed into variants, the resolved
//! method bind is invoked on the native object and the result is decoded to
//! the declared return type. An unresolved bind or an undecodable result
//! yields the return type's default, the same sentinel the engine produces.

use super::backend::ObjectId;
use super::method_bind::MethodBind;
use super::object_handle::ObjectHandle;
use super::runtime;
use super::variant::{FromVariant, ToVariant, Variant};

fn invoke<R: FromVariant + Default>(
    bind: &MethodBind,
    object: Option<ObjectId>,
    args: &[Variant],
) -> R {
    let Some(method) = bind.handle() else {
        return R::default();
    };
    let ret = runtime::backend().call(method, object, args);
    decode_return(bind, &ret)
}

fn decode_return<R: FromVariant + Default>(bind: &MethodBind, ret: &Variant) -> R {
    match R::try_from_variant(ret) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                target: "bindings",
                class = bind.class(),
                method = bind.method(),
                error = %err,
                "Unexpected return type"
            );
            R::default()
        }
    }
}

macro_rules! call_adapters {
    ($($name:ident, $static_name:ident => ($($arg:ident: $ty:ident),*);)*) => {
        $(
            pub fn $name<$($ty: ToVariant,)* R: FromVariant + Default>(
                bind: &MethodBind,
                object: &ObjectHandle,
                $($arg: $ty),*
            ) -> R {
                invoke(bind, Some(object.id()), &[$($arg.to_variant()),*])
            }

            pub fn $static_name<$($ty: ToVariant,)* R: FromVariant + Default>(
                bind: &MethodBind,
                $($arg: $ty),*
            ) -> R {
                invoke(bind, None, &[$($arg.to_variant()),*])
            }
        )*
    };
}

call_adapters! {
    call_0, call_static_0 => ();
    call_1, call_static_1 => (a0: A0);
    call_2, call_static_2 => (a0: A0, a1: A1);
    call_3, call_static_3 => (a0: A0, a1: A1, a2: A2);
    call_4, call_static_4 => (a0: A0, a1: A1, a2: A2, a3: A3);
    call_5, call_static_5 => (a0: A0, a1: A1, a2: A2, a3: A3, a4: A4);
    call_6, call_static_6 => (a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
}

/// Vararg methods (`call`, `emit_signal`): fixed leading args then the rest.
pub fn call_vararg<R: FromVariant + Default>(
    bind: &MethodBind,
    object: &ObjectHandle,
    fixed: &[Variant],
    rest: &[Variant],
) -> R {
    let mut args = Vec::with_capacity(fixed.len() + rest.len());
    args.extend_from_slice(fixed);
    args.extend_from_slice(rest);
    invoke(bind, Some(object.id()), &args)
}
