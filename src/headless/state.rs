//! Per-object state held by the headless engine.
//!
//! Pure data: every behaviour lives in the service modules.

use crate::bindings::backend::{ConnectFlags, ErrorCode, ObjectId};
use crate::bindings::callable::Callable;
use crate::bindings::string_name::StringName;
use crate::bindings::variant::{Variant, VariantArray};
use std::collections::{HashMap, VecDeque};

/// 信号连接
#[derive(Debug, Clone)]
pub struct Connection {
    pub callable: Callable,
    pub flags: ConnectFlags,
    /// `REFERENCE_COUNTED` 连接的引用次数
    pub count: usize,
}

/// 网格表面
#[derive(Debug, Clone, Default)]
pub struct Surface {
    /// 图元类型序数
    pub primitive: i64,
    /// 按数组槽位排列的表面数组
    pub arrays: VariantArray,
    pub format: i64,
    pub name: String,
}

/// 场景树节点状态
#[derive(Debug, Clone, Default)]
pub struct NodeState {
    pub parent: Option<ObjectId>,
    /// 子节点及其内部模式序数（0 = 非内部）
    pub children: Vec<(ObjectId, i64)>,
    pub inside_tree: bool,
    pub ready_emitted: bool,
    pub queued_for_deletion: bool,
    pub redraw_pending: bool,
}

/// 数据包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
    pub is_string: bool,
}

/// WebSocket 连接状态序数
pub const WS_CONNECTING: i64 = 0;
pub const WS_OPEN: i64 = 1;
pub const WS_CLOSING: i64 = 2;
pub const WS_CLOSED: i64 = 3;

/// 模拟的 WebSocket 连接（回环：发送的数据在下一次 poll 时被接收）
#[derive(Debug, Clone)]
pub struct SocketState {
    pub ready_state: i64,
    pub requested_url: String,
    pub host: String,
    pub port: i64,
    pub selected_protocol: String,
    pub no_delay: bool,
    pub outbound: VecDeque<Packet>,
    pub inbound: VecDeque<Packet>,
    pub was_string: bool,
    pub last_error: ErrorCode,
    pub pending_close: Option<(i64, String)>,
    pub close_code: i64,
    pub close_reason: String,
}

impl Default for SocketState {
    fn default() -> Self {
        Self {
            ready_state: WS_CLOSED,
            requested_url: String::new(),
            host: String::new(),
            port: 0,
            selected_protocol: String::new(),
            no_delay: false,
            outbound: VecDeque::new(),
            inbound: VecDeque::new(),
            was_string: false,
            last_error: ErrorCode::OK,
            pending_close: None,
            close_code: -1,
            close_reason: String::new(),
        }
    }
}

/// 音频播放状态
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackState {
    pub playing: bool,
    pub position: f64,
}

/// TLS 选项
#[derive(Debug, Clone, Default)]
pub struct TlsState {
    pub unsafe_client: bool,
    pub server: bool,
    pub trusted_chain: Option<ObjectId>,
    pub common_name_override: String,
}

/// 引擎侧对象
#[derive(Debug, Clone)]
pub struct ObjectState {
    /// 类数据库中的类索引
    pub class: usize,
    /// 引用计数；手动管理的对象为 `None`
    pub refcount: Option<i64>,
    /// 已存储的属性值（未存储的属性回退到类默认值）
    pub properties: HashMap<String, Variant>,
    pub connections: HashMap<StringName, Vec<Connection>>,
    pub surfaces: Vec<Surface>,
    pub blend_shapes: Vec<StringName>,
    pub node: NodeState,
    pub socket: SocketState,
    pub playback: PlaybackState,
    pub tls: TlsState,
    /// 证书 PEM 文本
    pub certificate: Option<String>,
    /// 对象属性持有的引用（销毁时释放）
    pub held: Vec<ObjectId>,
}

impl ObjectState {
    pub fn new(class: usize, ref_counted: bool) -> Self {
        Self {
            class,
            refcount: ref_counted.then_some(0),
            properties: HashMap::new(),
            connections: HashMap::new(),
            surfaces: Vec::new(),
            blend_shapes: Vec::new(),
            node: NodeState::default(),
            socket: SocketState::default(),
            playback: PlaybackState::default(),
            tls: TlsState::default(),
            certificate: None,
            held: Vec::new(),
        }
    }
}

/// 调用记录，用于验证包装器传递的参数
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub class: &'static str,
    pub method: &'static str,
    pub object: Option<ObjectId>,
    pub args: Vec<Variant>,
}
