//! Wrapped engine classes.
//!
//! Every class follows the same shape, expanded from `engine_class!`:
//! a handle wrapper that derefs to its parent class, lazily resolved
//! `static MethodBind`s, typed accessors and method forwarders, `_ex`
//! builders for methods with optional parameters, and typed signal proxies.
//!
//! ```text
//! Object
//! ├── RefCounted
//! │   ├── Resource
//! │   │   ├── Mesh ── ArrayMesh
//! │   │   ├── Texture2D ── PlaceholderTexture2D
//! │   │   ├── AudioStream
//! │   │   └── X509Certificate
//! │   ├── PacketPeer ── WebSocketPeer
//! │   └── TlsOptions
//! ├── Node
//! │   ├── CanvasItem ── Node2D ── Sprite2D
//! │   └── AudioStreamPlayer
//! └── Geometry2D
//! ```

pub mod array_mesh;
pub mod audio_stream;
pub mod audio_stream_player;
pub mod canvas_item;
pub mod geometry_2d;
pub mod mesh;
pub mod node;
pub mod node_2d;
pub mod object;
pub mod packet_peer;
pub mod ref_counted;
pub mod resource;
pub mod sprite_2d;
pub mod texture_2d;
pub mod tls_options;
pub mod websocket_peer;
pub mod x509_certificate;

pub use array_mesh::ArrayMesh;
pub use audio_stream::AudioStream;
pub use audio_stream_player::{AudioStreamPlayer, MixTarget};
pub use canvas_item::CanvasItem;
pub use geometry_2d::{Geometry2D, PolyJoinType};
pub use mesh::{ArrayFormat, ArrayType, BlendShapeMode, Mesh, PrimitiveType};
pub use node::{InternalMode, Node};
pub use node_2d::Node2D;
pub use object::Object;
pub use packet_peer::PacketPeer;
pub use ref_counted::RefCounted;
pub use resource::Resource;
pub use sprite_2d::Sprite2D;
pub use texture_2d::{PlaceholderTexture2D, Texture2D};
pub use tls_options::TlsOptions;
pub use websocket_peer::{State as WebSocketState, WebSocketPeer, WriteMode};
pub use x509_certificate::X509Certificate;
