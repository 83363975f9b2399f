//! # MessagePack Log Encoder
//!
//! A low-allocation encoder that turns structured log events into compact
//! MessagePack records, ready to stream to a log collector speaking the
//! forward protocol.
//!
//! Every record has the shape of a forward-protocol `Entry`:
//!
//! ```text
//! [ timestamp, { key: value, ... } ]
//! ```
//!
//! ## Key Features
//!
//! * Pooled encoders and record buffers, reused across calls and threads
//! * Nested maps and sequences of any depth through marshaler callbacks
//! * Copy-on-write cloning for "add fields to a copy" logger contexts
//! * Dotted key namespaces
//! * Pluggable level, name and caller formatting with safe fallbacks
//!
//! ## Main Components
//!
//! * `Encoder`: the field encoder, implementing `ObjectEncoder` and `ArrayEncoder`
//! * `Encoder::encode_entry`: assembles one event and its fields into a `RecordBuffer`
//! * `Field`: typed key/value entries applied to an encoder
//! * `EncoderConfig`: envelope key names and formatting callbacks
//! * `pool`: the process-wide encoder and buffer pools
//!
//! ## Quick Start
//!
//! ```
//! use msgpack_log_encoder::{Encoder, EncoderConfig, Entry, Field, Level, ObjectMarshalerFn};
//!
//! let enc = Encoder::new(EncoderConfig::production());
//!
//! let entry = Entry::new(Level::Info, "request served").with_logger_name("http");
//! let fields = [
//!     Field::string("path", "/index.html"),
//!     Field::u16("status", 200),
//!     Field::object("client", ObjectMarshalerFn::new(|obj| {
//!         obj.add_string("ip", "10.0.0.7");
//!         obj.add_bool("tls", true);
//!         Ok(())
//!     })),
//! ];
//!
//! let record = enc.encode_entry(&entry, &fields);
//! assert_eq!(record[0], 0x92); // two-element array
//! // Dropping the record returns its buffer to the pool.
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod encoder;
pub mod entry;
pub mod error;
pub mod field;
pub mod level;
pub mod marshaler;
pub mod pool;

pub use buffer::RecordBuffer;
pub use config::{EncoderConfig, EncoderSettings};
pub use encoder::Encoder;
pub use entry::{Entry, EntryCaller};
pub use error::{ConfigError, EncodeError, Result};
pub use field::{ArrayElement, Field, FieldValue};
pub use level::Level;
pub use marshaler::{
    ArrayEncoder, ArrayMarshaler, ArrayMarshalerFn, Complex128, Complex64, ObjectEncoder,
    ObjectMarshaler, ObjectMarshalerFn, Reflected,
};
pub use pool::{buffer_pool_metrics, encoder_pool_metrics};
