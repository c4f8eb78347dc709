//! Dynamic Postgres composite type decoder.
//!
//! Decode binary composite values into [`Record`] without declaring a
//! matching Rust type.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use bytes::{BufMut, BytesMut};
//! use pgcomposite::{CompositeType, TypeRegistry, Value, postgres::oid};
//!
//! # async fn app() -> pgcomposite::Result<()> {
//! let registry = TypeRegistry::with_builtins();
//! let address = registry.register_composite(Arc::new(
//!     CompositeType::new(16_400, "address")
//!         .field("street", oid::TEXT)
//!         .field("number", oid::INT4),
//! ));
//!
//! let mut buf = BytesMut::new();
//! buf.put_i32(2);
//! buf.put_u32(oid::TEXT);
//! buf.put_i32(4);
//! buf.put_slice(b"Main");
//! buf.put_u32(oid::INT4);
//! buf.put_i32(-1);
//!
//! let mut bytes = buf.freeze();
//! let len = bytes.len();
//! let record = address.decode_record(&mut bytes, len).await?;
//!
//! assert_eq!(record["street"], Value::from("Main"));
//! assert!(!record.contains_key("number"));
//! # Ok(())
//! # }
//! ```

pub mod common;
mod ext;

// Protocol
pub mod postgres;
pub mod frame;

// Value
mod value;
pub mod record;

// Decoder
pub mod decode;
pub mod composite;
pub mod registry;

mod error;


pub use value::Value;
pub use record::Record;
pub use frame::{FrameReader, FrameReaderExt};
#[cfg(feature = "tokio")]
pub use frame::BufferedReader;
pub use decode::{Builtin, DecodeError, FieldDecoder};
pub use composite::{CompositeDecoder, CompositeDecoderFactory, CompositeType};
pub use registry::{Registry, TypeRegistry};
pub use error::{Error, ErrorKind, Result};
