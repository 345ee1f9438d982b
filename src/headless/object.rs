//! `Object`, `RefCounted` and the plain resource classes.

use super::classdb::ClassDef;
use super::{arg, HeadlessEngine};
use crate::bindings::backend::{EngineBackend, ErrorCode, ObjectId};
use crate::bindings::variant::{ToVariant, Variant};
use std::fs;
use std::io;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

pub(super) fn register(classes: &mut Vec<ClassDef>) {
    classes.push(
        ClassDef::new("Object", None)
            .instantiable()
            .method("get_class", 201670096, ObjectService::get_class)
            .method("is_class", 3927539163, ObjectService::is_class)
            .method("get", 2760726917, ObjectService::get)
            .method("set", 3776071444, ObjectService::set)
            .method("call", 3400424181, ObjectService::call)
            .method("has_method", 2619796661, ObjectService::has_method)
            .method("has_signal", 2619796661, ObjectService::has_signal)
            .method("emit_signal", 4047867050, ObjectService::emit_signal)
            .method("get_instance_id", 3905245786, ObjectService::get_instance_id)
            .signals(&["script_changed", "property_list_changed"]),
    );

    classes.push(
        ClassDef::new("RefCounted", Some("Object"))
            .ref_counted()
            .instantiable()
            .method("get_reference_count", 3905245786, ObjectService::get_reference_count),
    );

    classes.push(
        ClassDef::new("Resource", Some("RefCounted"))
            .instantiable()
            .property(
                "resource_name",
                || Variant::String(String::new()),
                ("set_name", 83702148),
                ("get_name", 201670096),
            )
            .property(
                "resource_path",
                || Variant::String(String::new()),
                ("set_path", 83702148),
                ("get_path", 201670096),
            )
            .property(
                "resource_local_to_scene",
                || Variant::Bool(false),
                ("set_local_to_scene", 2586408642),
                ("is_local_to_scene", 36873697),
            )
            .method("emit_changed", 3218959716, ResourceService::emit_changed)
            .method("duplicate", 482882304, ResourceService::duplicate)
            .signals(&["changed"]),
    );

    classes.push(
        ClassDef::new("AudioStream", Some("Resource"))
            .instantiable()
            .method("get_length", 1740695150, |_, _, _| Variant::Float(0.0))
            .method("is_monophonic", 36873697, |_, _, _| Variant::Bool(false)),
    );

    classes.push(
        ClassDef::new("X509Certificate", Some("Resource"))
            .instantiable()
            .method("save", 166001499, CertificateService::save)
            .method("load", 166001499, CertificateService::load)
            .method("save_to_string", 2841200299, CertificateService::save_to_string)
            .method("load_from_string", 166001499, CertificateService::load_from_string),
    );

    classes.push(
        ClassDef::new("TlsOptions", Some("RefCounted"))
            .static_method("client", 3565000357, TlsService::client)
            .static_method("client_unsafe", 2090251749, TlsService::client_unsafe)
            .method("is_server", 36873697, |engine, id, _| {
                Variant::Bool(engine.with_state(id, |state| state.tls.server).unwrap_or(false))
            })
            .method("is_unsafe_client", 36873697, |engine, id, _| {
                Variant::Bool(engine.with_state(id, |state| state.tls.unsafe_client).unwrap_or(false))
            }),
    );
}

/// 对象服务 - 反射与动态调用
pub struct ObjectService;

impl ObjectService {
    fn get_class(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let name = engine
            .class_of(id)
            .map(|index| engine.classes().class(index).name)
            .unwrap_or_default();
        Variant::String(name.to_string())
    }

    fn is_class(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let class: String = arg(args, 0);
        Variant::Bool(engine.is_instance_of(id, &class))
    }

    fn get(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let property: String = arg(args, 0);
        engine.get_property(id, &property)
    }

    fn set(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let property: String = arg(args, 0);
        engine.set_property(id, &property, args.get(1).cloned().unwrap_or_default());
        Variant::Nil
    }

    /// 按名称动态调用
    fn call(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let method: String = arg(args, 0);
        engine.call_method(id, &method, args.get(1..).unwrap_or(&[]))
    }

    fn has_method(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let method: String = arg(args, 0);
        let found = engine
            .class_of(id)
            .and_then(|index| engine.classes().find_method(index, &method))
            .is_some();
        Variant::Bool(found)
    }

    fn has_signal(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let signal: String = arg(args, 0);
        let found = engine
            .class_of(id)
            .is_some_and(|index| engine.classes().has_signal(index, &signal));
        Variant::Bool(found)
    }

    fn emit_signal(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let signal: String = arg(args, 0);
        engine
            .emit_signal(id, &signal, args.get(1..).unwrap_or(&[]))
            .to_variant()
    }

    fn get_instance_id(_engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        Variant::Int(id.raw() as i64)
    }

    fn get_reference_count(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        Variant::Int(engine.reference_count(id).unwrap_or(0))
    }
}

/// 资源服务
pub struct ResourceService;

impl ResourceService {
    fn emit_changed(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        engine.emit_signal(id, "changed", &[]);
        Variant::Nil
    }

    /// 复制资源数据；路径不复制，子资源共享
    fn duplicate(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let subresources: bool = arg(args, 0);
        let Some(class) = engine.class_of(id) else {
            return Variant::Object(None);
        };
        let copy = engine.create_object(class);
        let source = engine.with_state(id, |state| {
            let mut properties = state.properties.clone();
            properties.remove("resource_path");
            (
                properties,
                state.surfaces.clone(),
                state.blend_shapes.clone(),
                state.certificate.clone(),
                state.tls.clone(),
            )
        });
        if let Some((properties, surfaces, blend_shapes, certificate, tls)) = source {
            engine.with_state(copy, |state| {
                state.properties = properties;
                state.surfaces = surfaces;
                state.blend_shapes = blend_shapes;
                state.certificate = certificate;
                state.tls = tls;
            });
        }
        tracing::trace!(
            target: "headless",
            source = id.raw(),
            copy = copy.raw(),
            subresources,
            "Resource duplicated"
        );
        Variant::Object(Some(copy))
    }
}

/// 证书服务 - 只校验 PEM 外框，不解析证书内容
pub struct CertificateService;

impl CertificateService {
    fn parse(engine: &HeadlessEngine, id: ObjectId, pem: &str) -> ErrorCode {
        let trimmed = pem.trim();
        if !(trimmed.starts_with(PEM_BEGIN) && trimmed.ends_with(PEM_END)) {
            tracing::warn!(target: "headless", "Certificate is not PEM encoded");
            return ErrorCode::ERR_PARSE_ERROR;
        }
        engine.with_state(id, |state| state.certificate = Some(format!("{trimmed}\n")));
        ErrorCode::OK
    }

    fn save(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let path: String = arg(args, 0);
        let Some(pem) = engine.with_state(id, |state| state.certificate.clone()).flatten() else {
            return ErrorCode::ERR_UNCONFIGURED.to_variant();
        };
        let code = match fs::write(&path, pem) {
            Ok(()) => ErrorCode::OK,
            Err(err) => {
                tracing::warn!(target: "headless", path = %path, error = %err, "Failed to save certificate");
                ErrorCode::ERR_CANT_CREATE
            }
        };
        code.to_variant()
    }

    fn load(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let path: String = arg(args, 0);
        let code = match fs::read_to_string(&path) {
            Ok(pem) => Self::parse(engine, id, &pem),
            Err(err) if err.kind() == io::ErrorKind::NotFound => ErrorCode::ERR_FILE_NOT_FOUND,
            Err(err) => {
                tracing::warn!(target: "headless", path = %path, error = %err, "Failed to load certificate");
                ErrorCode::ERR_CANT_OPEN
            }
        };
        code.to_variant()
    }

    fn save_to_string(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let pem = engine
            .with_state(id, |state| state.certificate.clone())
            .flatten()
            .unwrap_or_default();
        Variant::String(pem)
    }

    fn load_from_string(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let pem: String = arg(args, 0);
        Self::parse(engine, id, &pem).to_variant()
    }
}

/// TLS 选项服务
pub struct TlsService;

impl TlsService {
    fn create(engine: &HeadlessEngine, unsafe_client: bool, args: &[Variant]) -> Variant {
        let Some(id) = engine.create_object_of("TlsOptions") else {
            return Variant::Object(None);
        };
        let trusted_chain: Option<ObjectId> = arg(args, 0);
        let common_name_override: String = if unsafe_client { String::new() } else { arg(args, 1) };
        // 选项持有证书链的引用
        let held = trusted_chain.filter(|chain| engine.reference(*chain));
        engine.with_state(id, |state| {
            state.held.extend(held);
            state.tls.unsafe_client = unsafe_client;
            state.tls.trusted_chain = trusted_chain;
            state.tls.common_name_override = common_name_override;
        });
        Variant::Object(Some(id))
    }

    fn client(engine: &HeadlessEngine, args: &[Variant]) -> Variant {
        Self::create(engine, false, args)
    }

    fn client_unsafe(engine: &HeadlessEngine, args: &[Variant]) -> Variant {
        Self::create(engine, true, args)
    }
}
