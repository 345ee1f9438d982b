//! `WebSocketPeer`: WebSocket connection as a packet peer.
//!
//! The handshake and framing run inside the engine; this wrapper only
//! forwards calls. The connection advances when `poll` is called.

use crate::bindings::backend::ErrorCode;
use crate::bindings::call::{call_0, call_1, call_2};
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::variant::Dictionary;
use crate::classes::{PacketPeer, TlsOptions};
use crate::core::error::BindingResult;

static CONNECT_TO_URL: MethodBind = MethodBind::new("WebSocketPeer", "connect_to_url", 1966198364);
static SEND: MethodBind = MethodBind::new("WebSocketPeer", "send", 2780360567);
static SEND_TEXT: MethodBind = MethodBind::new("WebSocketPeer", "send_text", 166001499);
static WAS_STRING_PACKET: MethodBind =
    MethodBind::new("WebSocketPeer", "was_string_packet", 36873697);
static POLL: MethodBind = MethodBind::new("WebSocketPeer", "poll", 3218959716);
static CLOSE: MethodBind = MethodBind::new("WebSocketPeer", "close", 1047156615);
static GET_CONNECTED_HOST: MethodBind =
    MethodBind::new("WebSocketPeer", "get_connected_host", 201670096);
static GET_CONNECTED_PORT: MethodBind =
    MethodBind::new("WebSocketPeer", "get_connected_port", 3905245786);
static GET_SELECTED_PROTOCOL: MethodBind =
    MethodBind::new("WebSocketPeer", "get_selected_protocol", 201670096);
static GET_REQUESTED_URL: MethodBind =
    MethodBind::new("WebSocketPeer", "get_requested_url", 201670096);
static GET_READY_STATE: MethodBind = MethodBind::new("WebSocketPeer", "get_ready_state", 346482985);
static GET_CLOSE_CODE: MethodBind = MethodBind::new("WebSocketPeer", "get_close_code", 3905245786);
static GET_CLOSE_REASON: MethodBind =
    MethodBind::new("WebSocketPeer", "get_close_reason", 201670096);
static SET_NO_DELAY: MethodBind = MethodBind::new("WebSocketPeer", "set_no_delay", 2586408642);
static SET_SUPPORTED_PROTOCOLS: MethodBind =
    MethodBind::new("WebSocketPeer", "set_supported_protocols", 4015028928);
static GET_SUPPORTED_PROTOCOLS: MethodBind =
    MethodBind::new("WebSocketPeer", "get_supported_protocols", 1139954409);
static SET_HANDSHAKE_HEADERS: MethodBind =
    MethodBind::new("WebSocketPeer", "set_handshake_headers", 4015028928);
static GET_HANDSHAKE_HEADERS: MethodBind =
    MethodBind::new("WebSocketPeer", "get_handshake_headers", 1139954409);
static SET_INBOUND_BUFFER_SIZE: MethodBind =
    MethodBind::new("WebSocketPeer", "set_inbound_buffer_size", 1286410249);
static GET_INBOUND_BUFFER_SIZE: MethodBind =
    MethodBind::new("WebSocketPeer", "get_inbound_buffer_size", 3905245786);
static SET_OUTBOUND_BUFFER_SIZE: MethodBind =
    MethodBind::new("WebSocketPeer", "set_outbound_buffer_size", 1286410249);
static GET_OUTBOUND_BUFFER_SIZE: MethodBind =
    MethodBind::new("WebSocketPeer", "get_outbound_buffer_size", 3905245786);
static SET_MAX_QUEUED_PACKETS: MethodBind =
    MethodBind::new("WebSocketPeer", "set_max_queued_packets", 1286410249);
static GET_MAX_QUEUED_PACKETS: MethodBind =
    MethodBind::new("WebSocketPeer", "get_max_queued_packets", 3905245786);

crate::engine_enum! {
    pub struct WriteMode {
        TEXT = 0,
        BINARY = 1,
    }
}

crate::engine_enum! {
    /// 连接状态
    pub struct State {
        CONNECTING = 0,
        OPEN = 1,
        CLOSING = 2,
        CLOSED = 3,
    }
}

crate::engine_class! {
    pub struct WebSocketPeer : PacketPeer {
        methods: [
            "connect_to_url",
            "send",
            "send_text",
            "was_string_packet",
            "poll",
            "close",
            "get_connected_host",
            "get_connected_port",
            "get_selected_protocol",
            "get_requested_url",
            "get_ready_state",
            "get_close_code",
            "get_close_reason",
            "set_no_delay",
            "set_supported_protocols",
            "get_supported_protocols",
            "set_handshake_headers",
            "get_handshake_headers",
            "set_inbound_buffer_size",
            "get_inbound_buffer_size",
            "set_outbound_buffer_size",
            "get_outbound_buffer_size",
            "set_max_queued_packets",
            "get_max_queued_packets",
        ],
        properties: [
            "supported_protocols",
            "handshake_headers",
            "inbound_buffer_size",
            "outbound_buffer_size",
            "max_queued_packets",
        ],
        signals: [],
    }
}

impl WebSocketPeer {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    /// Starts the handshake with default TLS client options.
    pub fn connect_to_url(&self, url: &str) -> ErrorCode {
        self.connect_to_url_ex(url).done()
    }

    pub fn connect_to_url_ex<'a>(&'a self, url: &str) -> ExConnectToUrl<'a> {
        ExConnectToUrl {
            peer: self,
            url: url.to_string(),
            tls_client_options: None,
        }
    }

    /// Sends a binary frame.
    pub fn send(&self, message: &[u8]) -> ErrorCode {
        self.send_ex(message).done()
    }

    pub fn send_ex(&self, message: &[u8]) -> ExSend<'_> {
        ExSend {
            peer: self,
            message: message.to_vec(),
            write_mode: WriteMode::BINARY,
        }
    }

    pub fn send_text(&self, message: &str) -> ErrorCode {
        call_1(&SEND_TEXT, self.handle(), message)
    }

    pub fn was_string_packet(&self) -> bool {
        call_0(&WAS_STRING_PACKET, self.handle())
    }

    pub fn poll(&self) {
        call_0(&POLL, self.handle())
    }

    /// Closes with code `1000` and an empty reason.
    pub fn close(&self) {
        self.close_ex().done()
    }

    pub fn close_ex(&self) -> ExClose<'_> {
        ExClose {
            peer: self,
            code: 1000,
            reason: String::new(),
        }
    }

    pub fn get_connected_host(&self) -> String {
        call_0(&GET_CONNECTED_HOST, self.handle())
    }

    pub fn get_connected_port(&self) -> i32 {
        call_0(&GET_CONNECTED_PORT, self.handle())
    }

    pub fn get_selected_protocol(&self) -> String {
        call_0(&GET_SELECTED_PROTOCOL, self.handle())
    }

    pub fn get_requested_url(&self) -> String {
        call_0(&GET_REQUESTED_URL, self.handle())
    }

    pub fn get_ready_state(&self) -> State {
        call_0(&GET_READY_STATE, self.handle())
    }

    /// `-1` until the connection is closed.
    pub fn get_close_code(&self) -> i32 {
        call_0(&GET_CLOSE_CODE, self.handle())
    }

    pub fn get_close_reason(&self) -> String {
        call_0(&GET_CLOSE_REASON, self.handle())
    }

    pub fn set_no_delay(&self, enabled: bool) {
        call_1(&SET_NO_DELAY, self.handle(), enabled)
    }

    pub fn set_supported_protocols(&self, protocols: Vec<String>) {
        call_1(&SET_SUPPORTED_PROTOCOLS, self.handle(), protocols)
    }

    pub fn get_supported_protocols(&self) -> Vec<String> {
        call_0(&GET_SUPPORTED_PROTOCOLS, self.handle())
    }

    pub fn set_handshake_headers(&self, headers: Vec<String>) {
        call_1(&SET_HANDSHAKE_HEADERS, self.handle(), headers)
    }

    pub fn get_handshake_headers(&self) -> Vec<String> {
        call_0(&GET_HANDSHAKE_HEADERS, self.handle())
    }

    pub fn set_inbound_buffer_size(&self, size: i32) {
        call_1(&SET_INBOUND_BUFFER_SIZE, self.handle(), size)
    }

    pub fn get_inbound_buffer_size(&self) -> i32 {
        call_0(&GET_INBOUND_BUFFER_SIZE, self.handle())
    }

    pub fn set_outbound_buffer_size(&self, size: i32) {
        call_1(&SET_OUTBOUND_BUFFER_SIZE, self.handle(), size)
    }

    pub fn get_outbound_buffer_size(&self) -> i32 {
        call_0(&GET_OUTBOUND_BUFFER_SIZE, self.handle())
    }

    pub fn set_max_queued_packets(&self, count: i32) {
        call_1(&SET_MAX_QUEUED_PACKETS, self.handle(), count)
    }

    pub fn get_max_queued_packets(&self) -> i32 {
        call_0(&GET_MAX_QUEUED_PACKETS, self.handle())
    }
}

#[must_use]
pub struct ExConnectToUrl<'a> {
    peer: &'a WebSocketPeer,
    url: String,
    tls_client_options: Option<&'a TlsOptions>,
}

impl<'a> ExConnectToUrl<'a> {
    pub fn tls_client_options(mut self, options: &'a TlsOptions) -> Self {
        self.tls_client_options = Some(options);
        self
    }

    pub fn done(self) -> ErrorCode {
        call_2(&CONNECT_TO_URL, self.peer.handle(), self.url, self.tls_client_options)
    }
}

#[must_use]
pub struct ExSend<'a> {
    peer: &'a WebSocketPeer,
    message: Vec<u8>,
    write_mode: WriteMode,
}

impl ExSend<'_> {
    pub fn write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn done(self) -> ErrorCode {
        call_2(&SEND, self.peer.handle(), self.message, self.write_mode)
    }
}

#[must_use]
pub struct ExClose<'a> {
    peer: &'a WebSocketPeer,
    code: i32,
    reason: String,
}

impl ExClose<'_> {
    pub fn code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    pub fn reason(mut self, reason: &str) -> Self {
        self.reason = reason.to_string();
        self
    }

    pub fn done(self) {
        call_2(&CLOSE, self.peer.handle(), self.code, self.reason)
    }
}

/// Handshake headers in `Name: value` form.
pub fn handshake_headers(headers: &Dictionary) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            format!("{}: {}", name.to::<String>(), value.to::<String>())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::class_info::EngineClass;
    use crate::bindings::variant::Variant;
    use crate::headless::HeadlessEngine;

    #[test]
    fn test_connect_then_poll_opens() {
        HeadlessEngine::install();
        let peer = WebSocketPeer::new().unwrap();
        assert_eq!(peer.get_ready_state(), State::CLOSED);

        assert!(peer.connect_to_url("ws://localhost:9080/chat").is_ok());
        assert_eq!(peer.get_ready_state(), State::CONNECTING);
        assert_eq!(peer.get_requested_url(), "ws://localhost:9080/chat");

        peer.poll();
        assert_eq!(peer.get_ready_state(), State::OPEN);
        assert_eq!(peer.get_connected_host(), "localhost");
        assert_eq!(peer.get_connected_port(), 9080);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        HeadlessEngine::install();
        let peer = WebSocketPeer::new().unwrap();
        assert_eq!(peer.connect_to_url("http://nope"), ErrorCode::ERR_INVALID_PARAMETER);
        assert_eq!(peer.get_ready_state(), State::CLOSED);
    }

    #[test]
    fn test_send_defaults_to_binary() {
        let engine = HeadlessEngine::install();
        let peer = WebSocketPeer::new().unwrap();
        peer.connect_to_url("ws://localhost:9080");
        peer.poll();

        assert!(peer.send(b"hi").is_ok());
        let args = engine.last_args(peer.instance_id(), "send").unwrap();
        assert_eq!(args[1], Variant::Int(WriteMode::BINARY.ord()));

        peer.poll();
        assert_eq!(peer.get_available_packet_count(), 1);
        assert_eq!(peer.get_packet(), b"hi".to_vec());
        assert!(!peer.was_string_packet());

        peer.send_text("hello");
        peer.poll();
        assert_eq!(peer.get_packet(), b"hello".to_vec());
        assert!(peer.was_string_packet());
    }

    #[test]
    fn test_send_before_open_fails() {
        HeadlessEngine::install();
        let peer = WebSocketPeer::new().unwrap();
        assert_eq!(peer.send(b"x"), ErrorCode::FAILED);
    }

    #[test]
    fn test_close_defaults() {
        let engine = HeadlessEngine::install();
        let peer = WebSocketPeer::new().unwrap();
        peer.connect_to_url("ws://localhost:9080");
        peer.poll();
        assert_eq!(peer.get_close_code(), -1);

        peer.close();
        assert_eq!(
            engine.last_args(peer.instance_id(), "close"),
            Some(vec![Variant::Int(1000), Variant::String(String::new())])
        );
        assert_eq!(peer.get_ready_state(), State::CLOSING);
        peer.poll();
        assert_eq!(peer.get_ready_state(), State::CLOSED);
        assert_eq!(peer.get_close_code(), 1000);
    }

    #[test]
    fn test_buffer_properties() {
        HeadlessEngine::install();
        let peer = WebSocketPeer::new().unwrap();
        assert_eq!(peer.get_inbound_buffer_size(), 65535);
        assert_eq!(peer.get_max_queued_packets(), 4096);
        peer.set_outbound_buffer_size(1024);
        assert_eq!(peer.get_outbound_buffer_size(), 1024);

        let mut headers = Dictionary::new();
        headers.insert("X-Token", "abc");
        peer.set_handshake_headers(handshake_headers(&headers));
        assert_eq!(peer.get_handshake_headers(), vec!["X-Token: abc".to_string()]);
    }
}
