//! `PacketPeer`: abstract packet-based connection.

use crate::bindings::backend::ErrorCode;
use crate::bindings::call::{call_0, call_1, call_2};
use crate::bindings::method_bind::MethodBind;
use crate::bindings::variant::{ToVariant, Variant};
use crate::classes::RefCounted;

static GET_AVAILABLE_PACKET_COUNT: MethodBind =
    MethodBind::new("PacketPeer", "get_available_packet_count", 3905245786);
static GET_PACKET: MethodBind = MethodBind::new("PacketPeer", "get_packet", 2115431945);
static PUT_PACKET: MethodBind = MethodBind::new("PacketPeer", "put_packet", 680677267);
static GET_PACKET_ERROR: MethodBind = MethodBind::new("PacketPeer", "get_packet_error", 3185525595);
static GET_VAR: MethodBind = MethodBind::new("PacketPeer", "get_var", 3442865206);
static PUT_VAR: MethodBind = MethodBind::new("PacketPeer", "put_var", 2436251611);
static SET_ENCODE_BUFFER_MAX_SIZE: MethodBind =
    MethodBind::new("PacketPeer", "set_encode_buffer_max_size", 1286410249);
static GET_ENCODE_BUFFER_MAX_SIZE: MethodBind =
    MethodBind::new("PacketPeer", "get_encode_buffer_max_size", 3905245786);

crate::engine_class! {
    pub struct PacketPeer : RefCounted {
        methods: [
            "get_available_packet_count",
            "get_packet",
            "put_packet",
            "get_packet_error",
            "get_var",
            "put_var",
            "set_encode_buffer_max_size",
            "get_encode_buffer_max_size",
        ],
        properties: ["encode_buffer_max_size"],
        signals: [],
    }
}

impl PacketPeer {
    pub fn get_available_packet_count(&self) -> i32 {
        call_0(&GET_AVAILABLE_PACKET_COUNT, self.handle())
    }

    /// Next queued packet, empty if none.
    pub fn get_packet(&self) -> Vec<u8> {
        call_0(&GET_PACKET, self.handle())
    }

    pub fn put_packet(&self, buffer: &[u8]) -> ErrorCode {
        call_1(&PUT_PACKET, self.handle(), buffer.to_vec())
    }

    /// Error of the last `get_packet`.
    pub fn get_packet_error(&self) -> ErrorCode {
        call_0(&GET_PACKET_ERROR, self.handle())
    }

    /// Decodes the next packet as a variant; objects are not decoded.
    pub fn get_var(&self) -> Variant {
        self.get_var_ex().done()
    }

    pub fn get_var_ex(&self) -> ExGetVar<'_> {
        ExGetVar {
            peer: self,
            allow_objects: false,
        }
    }

    pub fn put_var(&self, var: impl ToVariant) -> ErrorCode {
        self.put_var_ex(var).done()
    }

    pub fn put_var_ex(&self, var: impl ToVariant) -> ExPutVar<'_> {
        ExPutVar {
            peer: self,
            var: var.to_variant(),
            full_objects: false,
        }
    }

    pub fn set_encode_buffer_max_size(&self, max_size: i32) {
        call_1(&SET_ENCODE_BUFFER_MAX_SIZE, self.handle(), max_size)
    }

    pub fn get_encode_buffer_max_size(&self) -> i32 {
        call_0(&GET_ENCODE_BUFFER_MAX_SIZE, self.handle())
    }
}

#[must_use]
pub struct ExGetVar<'a> {
    peer: &'a PacketPeer,
    allow_objects: bool,
}

impl ExGetVar<'_> {
    pub fn allow_objects(mut self, allow_objects: bool) -> Self {
        self.allow_objects = allow_objects;
        self
    }

    pub fn done(self) -> Variant {
        call_1(&GET_VAR, self.peer.handle(), self.allow_objects)
    }
}

#[must_use]
pub struct ExPutVar<'a> {
    peer: &'a PacketPeer,
    var: Variant,
    full_objects: bool,
}

impl ExPutVar<'_> {
    pub fn full_objects(mut self, full_objects: bool) -> Self {
        self.full_objects = full_objects;
        self
    }

    pub fn done(self) -> ErrorCode {
        call_2(&PUT_VAR, self.peer.handle(), self.var, self.full_objects)
    }
}
