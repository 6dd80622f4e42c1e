//! Codec module - serde encoders used by the body marshallers.
//!
//! - [`JsonCodec`] - JSON using `serde_json`
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (struct-as-map encoding)
//!
//! Codecs are marker structs with static methods; the marshallers pick one at
//! compile time. `encode` backs the response marshallers. `decode` is the
//! matching half for routes that read a request entity.
//!
//! # Example
//!
//! ```
//! use routewire::codec::{JsonCodec, MsgPackCodec};
//!
//! let json = JsonCodec::encode(&vec![1, 2, 3]).unwrap();
//! assert_eq!(json, b"[1,2,3]");
//!
//! let packed = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&packed).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod json;
mod msgpack;

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
