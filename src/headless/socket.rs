//! Packet peers and a loopback WebSocket connection.
//!
//! The simulated connection never touches the network: `poll` advances the
//! handshake and delivers every packet sent while open back to the peer.

use super::classdb::ClassDef;
use super::state::{Packet, SocketState, WS_CLOSED, WS_CLOSING, WS_CONNECTING, WS_OPEN};
use super::{arg, HeadlessEngine};
use crate::bindings::backend::{ErrorCode, ObjectId};
use crate::bindings::native::{decode_frame, encode_frame};
use crate::bindings::variant::{ToVariant, Variant};

/// 写入模式序数
const WRITE_MODE_TEXT: i64 = 0;
/// 编码缓冲区下限
const MIN_ENCODE_BUFFER: i64 = 1024;
const MAX_ENCODE_BUFFER: i64 = 256 * 1024 * 1024;

pub(super) fn register(classes: &mut Vec<ClassDef>) {
    classes.push(
        ClassDef::new("PacketPeer", Some("RefCounted"))
            .method("get_available_packet_count", 3905245786, |engine, id, _| {
                Variant::Int(engine.with_state(id, |state| state.socket.inbound.len() as i64).unwrap_or(0))
            })
            .method("get_packet", 2115431945, PacketPeerService::get_packet)
            .method("put_packet", 680677267, PacketPeerService::put_packet)
            .method("get_packet_error", 3185525595, |engine, id, _| {
                engine
                    .with_state(id, |state| state.socket.last_error)
                    .unwrap_or_default()
                    .to_variant()
            })
            .method("get_var", 3442865206, PacketPeerService::get_var)
            .method("put_var", 2436251611, PacketPeerService::put_var)
            .method("set_encode_buffer_max_size", 1286410249, PacketPeerService::set_encode_buffer_max_size)
            .method("get_encode_buffer_max_size", 3905245786, |engine, id, _| {
                engine.property(id, "encode_buffer_max_size")
            })
            .property_with(
                "encode_buffer_max_size",
                || Variant::Int(8 * 1024 * 1024),
                Some("set_encode_buffer_max_size"),
                Some("get_encode_buffer_max_size"),
            ),
    );

    classes.push(
        ClassDef::new("WebSocketPeer", Some("PacketPeer"))
            .instantiable()
            .method("connect_to_url", 1966198364, WebSocketService::connect_to_url)
            .method("send", 2780360567, |engine, id, args| {
                let data: Vec<u8> = arg(args, 0);
                let mode: i64 = arg(args, 1);
                WebSocketService::send(engine, id, data, mode == WRITE_MODE_TEXT).to_variant()
            })
            .method("send_text", 166001499, |engine, id, args| {
                let text: String = arg(args, 0);
                WebSocketService::send(engine, id, text.into_bytes(), true).to_variant()
            })
            .method("was_string_packet", 36873697, |engine, id, _| {
                Variant::Bool(engine.with_state(id, |state| state.socket.was_string).unwrap_or(false))
            })
            .method("poll", 3218959716, WebSocketService::poll)
            .method("close", 1047156615, WebSocketService::close)
            .method("get_connected_host", 201670096, |engine, id, _| {
                Variant::String(WebSocketService::read(engine, id, |socket| socket.host.clone()))
            })
            .method("get_connected_port", 3905245786, |engine, id, _| {
                Variant::Int(WebSocketService::read(engine, id, |socket| socket.port))
            })
            .method("get_selected_protocol", 201670096, |engine, id, _| {
                Variant::String(WebSocketService::read(engine, id, |socket| socket.selected_protocol.clone()))
            })
            .method("get_requested_url", 201670096, |engine, id, _| {
                Variant::String(WebSocketService::read(engine, id, |socket| socket.requested_url.clone()))
            })
            .method("get_ready_state", 346482985, |engine, id, _| {
                Variant::Int(WebSocketService::read(engine, id, |socket| socket.ready_state))
            })
            .method("get_close_code", 3905245786, |engine, id, _| {
                Variant::Int(WebSocketService::read(engine, id, |socket| socket.close_code))
            })
            .method("get_close_reason", 201670096, |engine, id, _| {
                Variant::String(WebSocketService::read(engine, id, |socket| socket.close_reason.clone()))
            })
            .method("set_no_delay", 2586408642, |engine, id, args| {
                let enabled: bool = arg(args, 0);
                engine.with_state(id, |state| state.socket.no_delay = enabled);
                Variant::Nil
            })
            .property(
                "supported_protocols",
                || Variant::PackedStringArray(Vec::new()),
                ("set_supported_protocols", 4015028928),
                ("get_supported_protocols", 1139954409),
            )
            .property(
                "handshake_headers",
                || Variant::PackedStringArray(Vec::new()),
                ("set_handshake_headers", 4015028928),
                ("get_handshake_headers", 1139954409),
            )
            .property(
                "inbound_buffer_size",
                || Variant::Int(65535),
                ("set_inbound_buffer_size", 1286410249),
                ("get_inbound_buffer_size", 3905245786),
            )
            .property(
                "outbound_buffer_size",
                || Variant::Int(65535),
                ("set_outbound_buffer_size", 1286410249),
                ("get_outbound_buffer_size", 3905245786),
            )
            .property(
                "max_queued_packets",
                || Variant::Int(4096),
                ("set_max_queued_packets", 1286410249),
                ("get_max_queued_packets", 3905245786),
            ),
    );
}

/// 数据包服务 - 收发队列与变体编码
pub struct PacketPeerService;

impl PacketPeerService {
    fn pop_packet(engine: &HeadlessEngine, id: ObjectId) -> Option<Packet> {
        engine
            .with_state(id, |state| {
                let socket = &mut state.socket;
                match socket.inbound.pop_front() {
                    Some(packet) => {
                        socket.was_string = packet.is_string;
                        socket.last_error = ErrorCode::OK;
                        Some(packet)
                    }
                    None => {
                        socket.last_error = ErrorCode::ERR_UNAVAILABLE;
                        None
                    }
                }
            })
            .flatten()
    }

    fn get_packet(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let data = Self::pop_packet(engine, id).map(|packet| packet.data).unwrap_or_default();
        Variant::PackedByteArray(data)
    }

    fn put_packet(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let data: Vec<u8> = arg(args, 0);
        WebSocketService::send(engine, id, data, false).to_variant()
    }

    /// 不允许对象时，解码出的对象被拒绝
    fn get_var(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let allow_objects: bool = arg(args, 0);
        let Some(packet) = Self::pop_packet(engine, id) else {
            return Variant::Nil;
        };
        let value = match decode_frame(&packet.data) {
            Ok(values) => values.into_iter().next().unwrap_or_default(),
            Err(err) => {
                tracing::warn!(target: "headless", error = %err, "Packet is not an encoded variant");
                engine.with_state(id, |state| state.socket.last_error = ErrorCode::ERR_INVALID_DATA);
                return Variant::Nil;
            }
        };
        if matches!(value, Variant::Object(Some(_))) && !allow_objects {
            tracing::warn!(target: "headless", "Decoded an object while objects are not allowed");
            engine.with_state(id, |state| state.socket.last_error = ErrorCode::ERR_UNAUTHORIZED);
            return Variant::Nil;
        }
        value
    }

    fn put_var(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let value = args.first().cloned().unwrap_or_default();
        let max_size: i64 = engine.property(id, "encode_buffer_max_size").to();
        let code = match encode_frame(&[value]) {
            Ok(data) if data.len() as i64 > max_size => ErrorCode::ERR_OUT_OF_MEMORY,
            Ok(data) => WebSocketService::send(engine, id, data, false),
            Err(err) => {
                tracing::warn!(target: "headless", error = %err, "Failed to encode variant");
                ErrorCode::ERR_INVALID_DATA
            }
        };
        code.to_variant()
    }

    /// 向上取整到 2 的幂
    fn set_encode_buffer_max_size(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let size: i64 = arg(args, 0);
        if size < MIN_ENCODE_BUFFER {
            tracing::error!(target: "headless", size, "Encode buffer must be at least 1024 bytes");
            return Variant::Nil;
        }
        if size > MAX_ENCODE_BUFFER {
            tracing::error!(target: "headless", size, "Encode buffer must not exceed 256 MiB");
            return Variant::Nil;
        }
        let rounded = size.unsigned_abs().next_power_of_two() as i64;
        engine.store_property(id, "encode_buffer_max_size", Variant::Int(rounded));
        Variant::Nil
    }
}

/// WebSocket 服务 - 就绪状态机
pub struct WebSocketService;

impl WebSocketService {
    fn read<R: Default>(engine: &HeadlessEngine, id: ObjectId, f: impl FnOnce(&SocketState) -> R) -> R {
        engine.with_state(id, |state| f(&state.socket)).unwrap_or_default()
    }

    fn connect_to_url(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let url: String = arg(args, 0);
        let Some((host, port)) = parse_url(&url) else {
            tracing::warn!(target: "headless", url = %url, "Invalid WebSocket URL");
            return ErrorCode::ERR_INVALID_PARAMETER.to_variant();
        };

        let code = engine
            .with_state(id, |state| {
                let socket = &mut state.socket;
                if socket.ready_state != WS_CLOSED {
                    return ErrorCode::ERR_ALREADY_IN_USE;
                }
                *socket = SocketState {
                    ready_state: WS_CONNECTING,
                    requested_url: url.clone(),
                    host,
                    port,
                    no_delay: socket.no_delay,
                    ..SocketState::default()
                };
                ErrorCode::OK
            })
            .unwrap_or(ErrorCode::ERR_INVALID_PARAMETER);
        if code.is_ok() {
            tracing::debug!(target: "headless", id = id.raw(), url = %url, "WebSocket connecting");
        }
        code.to_variant()
    }

    pub(super) fn send(engine: &HeadlessEngine, id: ObjectId, data: Vec<u8>, is_string: bool) -> ErrorCode {
        engine
            .with_state(id, |state| {
                if state.socket.ready_state != WS_OPEN {
                    return ErrorCode::FAILED;
                }
                state.socket.outbound.push_back(Packet { data, is_string });
                ErrorCode::OK
            })
            .unwrap_or(ErrorCode::FAILED)
    }

    fn poll(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let protocols: Vec<String> = engine.property(id, "supported_protocols").to();
        let max_queued: i64 = engine.property(id, "max_queued_packets").to();
        engine.with_state(id, |state| {
            let socket = &mut state.socket;
            match socket.ready_state {
                WS_CONNECTING => {
                    socket.ready_state = WS_OPEN;
                    socket.selected_protocol = protocols.first().cloned().unwrap_or_default();
                }
                WS_OPEN => {
                    while let Some(packet) = socket.outbound.pop_front() {
                        if socket.inbound.len() as i64 >= max_queued {
                            tracing::warn!(target: "headless", "Inbound queue full, dropping packet");
                            continue;
                        }
                        socket.inbound.push_back(packet);
                    }
                }
                WS_CLOSING => {
                    let (code, reason) = socket.pending_close.take().unwrap_or((-1, String::new()));
                    socket.ready_state = WS_CLOSED;
                    socket.close_code = code;
                    socket.close_reason = reason;
                    socket.outbound.clear();
                }
                _ => {}
            }
        });
        Variant::Nil
    }

    fn close(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let code: i64 = arg(args, 0);
        let reason: String = arg(args, 1);
        engine.with_state(id, |state| {
            let socket = &mut state.socket;
            match socket.ready_state {
                WS_CONNECTING => {
                    socket.ready_state = WS_CLOSED;
                    socket.close_code = -1;
                }
                WS_OPEN => {
                    socket.ready_state = WS_CLOSING;
                    socket.pending_close = Some((code, reason));
                }
                _ => {}
            }
        });
        Variant::Nil
    }
}

/// `ws://host[:port][/path]` 或 `wss://...`，返回主机和端口
fn parse_url(url: &str) -> Option<(String, i64)> {
    let (rest, default_port) = if let Some(rest) = url.strip_prefix("ws://") {
        (rest, 80)
    } else if let Some(rest) = url.strip_prefix("wss://") {
        (rest, 443)
    } else {
        return None;
    };
    let authority = rest.split(|c| c == '/' || c == '?').next().unwrap_or_default();
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok().map(i64::from)?),
        None => (authority, default_port),
    };
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert_eq!(parse_url("ws://localhost:9080/chat"), Some(("localhost".into(), 9080)));
        assert_eq!(parse_url("wss://example.com"), Some(("example.com".into(), 443)));
        assert_eq!(parse_url("ws://example.com/path?x=1"), Some(("example.com".into(), 80)));
        assert_eq!(parse_url("ws://:80"), None);
        assert_eq!(parse_url("ws://host:notaport"), None);
        assert_eq!(parse_url("http://example.com"), None);
    }

    fn open_peer(engine: &HeadlessEngine) -> ObjectId {
        let id = engine.create_object_of("WebSocketPeer").unwrap();
        WebSocketService::connect_to_url(engine, id, &[Variant::String("ws://localhost".into())]);
        WebSocketService::poll(engine, id, &[]);
        id
    }

    #[test]
    fn test_encode_buffer_bounds() {
        let engine = HeadlessEngine::new();
        let id = open_peer(&engine);
        let stored = || engine.property(id, "encode_buffer_max_size");
        let default = stored();

        engine.set_property(id, "encode_buffer_max_size", Variant::Int((1 << 62) + 1));
        assert_eq!(stored(), default);
        engine.set_property(id, "encode_buffer_max_size", Variant::Int(MAX_ENCODE_BUFFER + 1));
        assert_eq!(stored(), default);
        engine.set_property(id, "encode_buffer_max_size", Variant::Int(MIN_ENCODE_BUFFER - 1));
        assert_eq!(stored(), default);

        engine.set_property(id, "encode_buffer_max_size", Variant::Int(MAX_ENCODE_BUFFER));
        assert_eq!(stored(), Variant::Int(MAX_ENCODE_BUFFER));
        engine.set_property(id, "encode_buffer_max_size", Variant::Int(MIN_ENCODE_BUFFER + 1));
        assert_eq!(stored(), Variant::Int(2048));
        assert_eq!(
            PacketPeerService::put_var(&engine, id, &[Variant::Int(7)]),
            ErrorCode::OK.to_variant()
        );
    }

    #[test]
    fn test_variant_round_trip_over_loopback() {
        let engine = HeadlessEngine::new();
        let id = open_peer(&engine);
        PacketPeerService::put_var(&engine, id, &[Variant::Int(42), Variant::Bool(false)]);
        WebSocketService::poll(&engine, id, &[]);
        assert_eq!(PacketPeerService::get_var(&engine, id, &[Variant::Bool(false)]), Variant::Int(42));
    }

    #[test]
    fn test_objects_need_permission() {
        let engine = HeadlessEngine::new();
        let id = open_peer(&engine);
        let object = Variant::Object(Some(id));
        PacketPeerService::put_var(&engine, id, &[object.clone(), Variant::Bool(false)]);
        PacketPeerService::put_var(&engine, id, &[object.clone(), Variant::Bool(false)]);
        WebSocketService::poll(&engine, id, &[]);

        assert_eq!(PacketPeerService::get_var(&engine, id, &[Variant::Bool(false)]), Variant::Nil);
        let error = engine.with_state(id, |state| state.socket.last_error).unwrap();
        assert_eq!(error, ErrorCode::ERR_UNAUTHORIZED);
        assert_eq!(PacketPeerService::get_var(&engine, id, &[Variant::Bool(true)]), object);
    }

    #[test]
    fn test_empty_queue_sets_error() {
        let engine = HeadlessEngine::new();
        let id = open_peer(&engine);
        assert_eq!(PacketPeerService::get_packet(&engine, id, &[]), Variant::PackedByteArray(vec![]));
        let error = engine.with_state(id, |state| state.socket.last_error).unwrap();
        assert_eq!(error, ErrorCode::ERR_UNAVAILABLE);
    }

    #[test]
    fn test_close_while_connecting() {
        let engine = HeadlessEngine::new();
        let id = engine.create_object_of("WebSocketPeer").unwrap();
        WebSocketService::connect_to_url(&engine, id, &[Variant::String("ws://localhost".into())]);
        assert_eq!(
            WebSocketService::connect_to_url(&engine, id, &[Variant::String("ws://localhost".into())]),
            ErrorCode::ERR_ALREADY_IN_USE.to_variant()
        );
        WebSocketService::close(&engine, id, &[Variant::Int(1000), Variant::String(String::new())]);
        assert_eq!(WebSocketService::read(&engine, id, |socket| socket.ready_state), WS_CLOSED);
    }

    #[test]
    fn test_encode_buffer_rounds_up() {
        let engine = HeadlessEngine::new();
        let id = engine.create_object_of("WebSocketPeer").unwrap();
        PacketPeerService::set_encode_buffer_max_size(&engine, id, &[Variant::Int(3000)]);
        assert_eq!(engine.property(id, "encode_buffer_max_size"), Variant::Int(4096));
        PacketPeerService::set_encode_buffer_max_size(&engine, id, &[Variant::Int(10)]);
        assert_eq!(engine.property(id, "encode_buffer_max_size"), Variant::Int(4096));
    }
}
