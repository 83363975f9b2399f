//! The capability surface exposed to field producers and formatting callbacks.
//!
//! [`ObjectEncoder`] adds named entries to a map scope, [`ArrayEncoder`]
//! appends unnamed elements to a sequence scope. Nested values are produced by
//! [`ObjectMarshaler`] and [`ArrayMarshaler`] implementations which receive a
//! fresh scope to populate.

use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::error::Result;

/// Complex number with `f32` parts. MessagePack has no representation for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex64 {
    pub re: f32,
    pub im: f32,
}

/// Complex number with `f64` parts. MessagePack has no representation for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex128 {
    pub re: f64,
    pub im: f64,
}

/// Any value that can go through the slow, serde-driven reflected path.
///
/// Implemented for every `Serialize` type. Structs are written as maps keyed
/// by field name.
pub trait Reflected {
    fn encode_reflected(&self, buf: &mut Vec<u8>) -> Result<()>;
}

impl<T: Serialize + ?Sized> Reflected for T {
    fn encode_reflected(&self, buf: &mut Vec<u8>) -> Result<()> {
        rmp_serde::encode::write_named(buf, self)?;
        Ok(())
    }
}

/// Adds named entries to a map scope.
///
/// Every `add_*` call contributes exactly one entry. The key is prefixed with
/// the namespace opened on this scope, if any.
pub trait ObjectEncoder {
    /// Adds a nested sequence. On error nothing is written.
    fn add_array(&mut self, key: &str, arr: &dyn ArrayMarshaler) -> Result<()>;
    /// Adds a nested map. On error nothing is written.
    fn add_object(&mut self, key: &str, obj: &dyn ObjectMarshaler) -> Result<()>;

    /// Adds an opaque binary payload.
    fn add_binary(&mut self, key: &str, val: &[u8]);
    /// Adds UTF-8 text given as bytes.
    fn add_byte_string(&mut self, key: &str, val: &[u8]);
    fn add_bool(&mut self, key: &str, val: bool);
    /// Panics: complex numbers cannot be encoded.
    fn add_complex128(&mut self, key: &str, val: Complex128);
    /// Panics: complex numbers cannot be encoded.
    fn add_complex64(&mut self, key: &str, val: Complex64);
    /// Adds a duration as floating-point seconds.
    fn add_duration(&mut self, key: &str, val: Duration);
    fn add_f64(&mut self, key: &str, val: f64);
    fn add_f32(&mut self, key: &str, val: f32);
    fn add_isize(&mut self, key: &str, val: isize);
    fn add_i64(&mut self, key: &str, val: i64);
    fn add_i32(&mut self, key: &str, val: i32);
    fn add_i16(&mut self, key: &str, val: i16);
    fn add_i8(&mut self, key: &str, val: i8);
    fn add_string(&mut self, key: &str, val: &str);
    fn add_time(&mut self, key: &str, val: SystemTime);
    fn add_usize(&mut self, key: &str, val: usize);
    fn add_u64(&mut self, key: &str, val: u64);
    fn add_u32(&mut self, key: &str, val: u32);
    fn add_u16(&mut self, key: &str, val: u16);
    fn add_u8(&mut self, key: &str, val: u8);

    /// Adds an arbitrary serde value. This goes through a full serde
    /// traversal, so it is slow and allocation-heavy.
    fn add_reflected(&mut self, key: &str, val: &dyn Reflected) -> Result<()>;

    /// Prefixes every subsequent key on this scope with `name.`.
    ///
    /// Namespaces only nest; there is no way to close one. Clone the encoder
    /// first if keys outside the namespace are still needed.
    fn open_namespace(&mut self, name: &str);
}

/// Appends unnamed elements to a sequence scope.
pub trait ArrayEncoder {
    /// Appends a nested sequence. On error nothing is written.
    fn append_array(&mut self, arr: &dyn ArrayMarshaler) -> Result<()>;
    /// Appends a nested map. On error nothing is written.
    fn append_object(&mut self, obj: &dyn ObjectMarshaler) -> Result<()>;

    fn append_binary(&mut self, val: &[u8]);
    fn append_byte_string(&mut self, val: &[u8]);
    fn append_bool(&mut self, val: bool);
    /// Panics: complex numbers cannot be encoded.
    fn append_complex128(&mut self, val: Complex128);
    /// Panics: complex numbers cannot be encoded.
    fn append_complex64(&mut self, val: Complex64);
    fn append_duration(&mut self, val: Duration);
    fn append_f64(&mut self, val: f64);
    fn append_f32(&mut self, val: f32);
    fn append_isize(&mut self, val: isize);
    fn append_i64(&mut self, val: i64);
    fn append_i32(&mut self, val: i32);
    fn append_i16(&mut self, val: i16);
    fn append_i8(&mut self, val: i8);
    fn append_string(&mut self, val: &str);
    fn append_time(&mut self, val: SystemTime);
    fn append_usize(&mut self, val: usize);
    fn append_u64(&mut self, val: u64);
    fn append_u32(&mut self, val: u32);
    fn append_u16(&mut self, val: u16);
    fn append_u8(&mut self, val: u8);

    /// Appends an arbitrary serde value; slow, see [`ObjectEncoder::add_reflected`].
    fn append_reflected(&mut self, val: &dyn Reflected) -> Result<()>;
}

/// Populates a nested map scope.
pub trait ObjectMarshaler {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()>;
}

/// Populates a nested sequence scope.
pub trait ArrayMarshaler {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()>;
}

/// Adapts a closure into an [`ObjectMarshaler`].
pub struct ObjectMarshalerFn<F>(F);

impl<F> ObjectMarshalerFn<F>
where
    F: Fn(&mut dyn ObjectEncoder) -> Result<()>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ObjectMarshaler for ObjectMarshalerFn<F>
where
    F: Fn(&mut dyn ObjectEncoder) -> Result<()>,
{
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        (self.0)(enc)
    }
}

/// Adapts a closure into an [`ArrayMarshaler`].
pub struct ArrayMarshalerFn<F>(F);

impl<F> ArrayMarshalerFn<F>
where
    F: Fn(&mut dyn ArrayEncoder) -> Result<()>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ArrayMarshaler for ArrayMarshalerFn<F>
where
    F: Fn(&mut dyn ArrayEncoder) -> Result<()>,
{
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        (self.0)(enc)
    }
}
