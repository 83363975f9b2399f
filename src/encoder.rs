//! The field encoder.
//!
//! An [`Encoder`] owns one pooled byte buffer and tracks how many map entries
//! and sequence elements it has written. MessagePack frames a container with
//! its element count up front, so nested maps and sequences are accumulated in
//! a separate scratch encoder first and only framed into the parent once the
//! marshaler has finished.

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::codec;
use crate::config::EncoderConfig;
use crate::error::Result;
use crate::field::Field;
use crate::marshaler::{
    ArrayEncoder, ArrayMarshaler, Complex128, Complex64, ObjectEncoder, ObjectMarshaler, Reflected,
};
use crate::pool::{self, EncoderSlot};

const COMPLEX_UNSUPPORTED: &str = "complex numbers not supported in msgpack";

/// Pooled MessagePack encoder for one map or sequence scope.
///
/// Instances come from a process-wide pool and go back to it when dropped,
/// with their buffer, counts and namespace cleared. `Clone` yields an
/// independent copy (also pooled) carrying the same bytes, counts and
/// namespace, so fields added to the copy never show up in the original.
///
/// # Examples
///
/// ```
/// use msgpack_log_encoder::{Encoder, EncoderConfig, ObjectEncoder};
///
/// let mut enc = Encoder::new(EncoderConfig::production());
/// enc.open_namespace("http");
/// enc.add_string("method", "GET");
/// enc.add_u16("status", 200);
/// assert_eq!(enc.map_size(), 2);
/// ```
pub struct Encoder {
    config: Arc<EncoderConfig>,
    pub(crate) buf: Vec<u8>,
    pub(crate) map_size: usize,
    pub(crate) slice_len: usize,
    pub(crate) ns_prefix: String,
}

impl Encoder {
    /// Creates a top-level encoder owning `config`.
    pub fn new(config: EncoderConfig) -> Self {
        Self::with_config(Arc::new(config))
    }

    /// Creates a top-level encoder sharing an existing config.
    pub fn with_config(config: Arc<EncoderConfig>) -> Self {
        let EncoderSlot { buf, ns_prefix } = pool::get_encoder_slot();
        Self {
            config,
            buf,
            map_size: 0,
            slice_len: 0,
            ns_prefix,
        }
    }

    /// A blank encoder sharing this one's config: empty buffer, zero counts,
    /// no namespace.
    pub(crate) fn scratch(&self) -> Encoder {
        Self::with_config(Arc::clone(&self.config))
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Bytes written to this scope so far, without any container header.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of map entries written so far.
    pub fn map_size(&self) -> usize {
        self.map_size
    }

    /// Number of sequence elements written so far.
    pub fn slice_len(&self) -> usize {
        self.slice_len
    }

    /// Current namespace prefix, e.g. `"a.b."`.
    pub fn namespace(&self) -> &str {
        &self.ns_prefix
    }

    /// Clones this encoder and applies `fields` to the clone.
    pub fn with_fields(&self, fields: &[Field]) -> Encoder {
        let mut enc = self.clone();
        for field in fields {
            field.add_to(&mut enc);
        }
        enc
    }

    #[inline]
    fn encode_key(&mut self, key: &str) {
        if self.ns_prefix.is_empty() {
            codec::write_str(&mut self.buf, key);
        } else {
            codec::write_prefixed_str(&mut self.buf, &self.ns_prefix, key);
        }
    }

    fn marshal_array(&self, arr: &dyn ArrayMarshaler) -> Result<Encoder> {
        let mut scope = self.scratch();
        arr.marshal_log_array(&mut scope)?;
        Ok(scope)
    }

    fn marshal_object(&self, obj: &dyn ObjectMarshaler) -> Result<Encoder> {
        let mut scope = self.scratch();
        obj.marshal_log_object(&mut scope)?;
        Ok(scope)
    }

    /// Writes `scope` as a sequence: header from its element count, then its bytes.
    pub(crate) fn frame_array(&mut self, scope: &Encoder) {
        codec::write_array_len(&mut self.buf, scope.slice_len);
        self.buf.extend_from_slice(&scope.buf);
    }

    /// Writes `scope` as a map: header from its entry count, then its bytes.
    pub(crate) fn frame_map(&mut self, scope: &Encoder) {
        codec::write_map_len(&mut self.buf, scope.map_size);
        self.buf.extend_from_slice(&scope.buf);
    }

    /// Writes `val` after `mark`, rolling the buffer back to `mark` on failure.
    fn write_reflected(&mut self, mark: usize, val: &dyn Reflected) -> Result<()> {
        if let Err(err) = val.encode_reflected(&mut self.buf) {
            self.buf.truncate(mark);
            return Err(err);
        }
        Ok(())
    }
}

impl Clone for Encoder {
    fn clone(&self) -> Self {
        let mut clone = self.scratch();
        clone.buf.extend_from_slice(&self.buf);
        clone.map_size = self.map_size;
        clone.slice_len = self.slice_len;
        clone.ns_prefix.push_str(&self.ns_prefix);
        clone
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        pool::put_encoder_slot(EncoderSlot {
            buf: mem::take(&mut self.buf),
            ns_prefix: mem::take(&mut self.ns_prefix),
        });
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("len", &self.buf.len())
            .field("map_size", &self.map_size)
            .field("slice_len", &self.slice_len)
            .field("ns_prefix", &self.ns_prefix)
            .finish()
    }
}

macro_rules! add_scalars {
    ($($method:ident($ty:ty) => $write:path;)*) => {$(
        #[inline]
        fn $method(&mut self, key: &str, val: $ty) {
            self.map_size += 1;
            self.encode_key(key);
            $write(&mut self.buf, val);
        }
    )*};
}

macro_rules! append_scalars {
    ($($method:ident($ty:ty) => $write:path;)*) => {$(
        #[inline]
        fn $method(&mut self, val: $ty) {
            self.slice_len += 1;
            $write(&mut self.buf, val);
        }
    )*};
}

impl ObjectEncoder for Encoder {
    fn add_array(&mut self, key: &str, arr: &dyn ArrayMarshaler) -> Result<()> {
        let scope = self.marshal_array(arr)?;
        self.map_size += 1;
        self.encode_key(key);
        self.frame_array(&scope);
        Ok(())
    }

    fn add_object(&mut self, key: &str, obj: &dyn ObjectMarshaler) -> Result<()> {
        let scope = self.marshal_object(obj)?;
        self.map_size += 1;
        self.encode_key(key);
        self.frame_map(&scope);
        Ok(())
    }

    add_scalars! {
        add_binary(&[u8]) => codec::write_bin;
        add_byte_string(&[u8]) => codec::write_byte_str;
        add_bool(bool) => codec::write_bool;
        add_duration(Duration) => codec::write_duration;
        add_f64(f64) => codec::write_f64;
        add_f32(f32) => codec::write_f32;
        add_isize(isize) => codec::write_isize;
        add_i64(i64) => codec::write_i64;
        add_i32(i32) => codec::write_i32;
        add_i16(i16) => codec::write_i16;
        add_i8(i8) => codec::write_i8;
        add_string(&str) => codec::write_str;
        add_time(SystemTime) => codec::write_time;
        add_usize(usize) => codec::write_usize;
        add_u64(u64) => codec::write_u64;
        add_u32(u32) => codec::write_u32;
        add_u16(u16) => codec::write_u16;
        add_u8(u8) => codec::write_u8;
    }

    fn add_complex128(&mut self, _key: &str, _val: Complex128) {
        panic!("{}", COMPLEX_UNSUPPORTED);
    }

    fn add_complex64(&mut self, _key: &str, _val: Complex64) {
        panic!("{}", COMPLEX_UNSUPPORTED);
    }

    fn add_reflected(&mut self, key: &str, val: &dyn Reflected) -> Result<()> {
        let mark = self.buf.len();
        self.encode_key(key);
        self.write_reflected(mark, val)?;
        self.map_size += 1;
        Ok(())
    }

    fn open_namespace(&mut self, name: &str) {
        self.ns_prefix.push_str(name);
        self.ns_prefix.push('.');
    }
}

impl ArrayEncoder for Encoder {
    fn append_array(&mut self, arr: &dyn ArrayMarshaler) -> Result<()> {
        let scope = self.marshal_array(arr)?;
        self.slice_len += 1;
        self.frame_array(&scope);
        Ok(())
    }

    fn append_object(&mut self, obj: &dyn ObjectMarshaler) -> Result<()> {
        let scope = self.marshal_object(obj)?;
        self.slice_len += 1;
        self.frame_map(&scope);
        Ok(())
    }

    append_scalars! {
        append_binary(&[u8]) => codec::write_bin;
        append_byte_string(&[u8]) => codec::write_byte_str;
        append_bool(bool) => codec::write_bool;
        append_duration(Duration) => codec::write_duration;
        append_f64(f64) => codec::write_f64;
        append_f32(f32) => codec::write_f32;
        append_isize(isize) => codec::write_isize;
        append_i64(i64) => codec::write_i64;
        append_i32(i32) => codec::write_i32;
        append_i16(i16) => codec::write_i16;
        append_i8(i8) => codec::write_i8;
        append_string(&str) => codec::write_str;
        append_time(SystemTime) => codec::write_time;
        append_usize(usize) => codec::write_usize;
        append_u64(u64) => codec::write_u64;
        append_u32(u32) => codec::write_u32;
        append_u16(u16) => codec::write_u16;
        append_u8(u8) => codec::write_u8;
    }

    fn append_complex128(&mut self, _val: Complex128) {
        panic!("{}", COMPLEX_UNSUPPORTED);
    }

    fn append_complex64(&mut self, _val: Complex64) {
        panic!("{}", COMPLEX_UNSUPPORTED);
    }

    fn append_reflected(&mut self, val: &dyn Reflected) -> Result<()> {
        let mark = self.buf.len();
        self.write_reflected(mark, val)?;
        self.slice_len += 1;
        Ok(())
    }
}
