//! Typed key/value fields applied to an encoder.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::error::Result;
use crate::marshaler::{
    ArrayEncoder, ArrayMarshaler, Complex128, Complex64, ObjectEncoder, ObjectMarshaler, Reflected,
};

/// A value that knows how to append itself to a sequence scope.
pub trait ArrayElement {
    fn append_to(&self, enc: &mut dyn ArrayEncoder);
}

macro_rules! array_elements {
    ($($ty:ty => $method:ident;)*) => {$(
        impl ArrayElement for $ty {
            #[inline]
            fn append_to(&self, enc: &mut dyn ArrayEncoder) {
                enc.$method(*self);
            }
        }
    )*};
}

array_elements! {
    bool => append_bool;
    f64 => append_f64;
    f32 => append_f32;
    isize => append_isize;
    i64 => append_i64;
    i32 => append_i32;
    i16 => append_i16;
    i8 => append_i8;
    usize => append_usize;
    u64 => append_u64;
    u32 => append_u32;
    u16 => append_u16;
    u8 => append_u8;
    Duration => append_duration;
    SystemTime => append_time;
}

impl ArrayElement for String {
    fn append_to(&self, enc: &mut dyn ArrayEncoder) {
        enc.append_string(self);
    }
}

impl ArrayElement for &'static str {
    fn append_to(&self, enc: &mut dyn ArrayEncoder) {
        enc.append_string(self);
    }
}

/// Byte strings: UTF-8 text held as bytes.
impl ArrayElement for Vec<u8> {
    fn append_to(&self, enc: &mut dyn ArrayEncoder) {
        enc.append_byte_string(self);
    }
}

/// A homogeneous sequence of [`ArrayElement`]s.
pub struct Slice<T>(pub Vec<T>);

impl<T: ArrayElement> ArrayMarshaler for Slice<T> {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        for item in &self.0 {
            item.append_to(enc);
        }
        Ok(())
    }
}

/// The payload of a [`Field`].
#[derive(Clone)]
pub enum FieldValue {
    Bool(bool),
    F64(f64),
    F32(f32),
    Isize(isize),
    I64(i64),
    I32(i32),
    I16(i16),
    I8(i8),
    Usize(usize),
    U64(u64),
    U32(u32),
    U16(u16),
    U8(u8),
    String(String),
    ByteString(Vec<u8>),
    Binary(Vec<u8>),
    Duration(Duration),
    Time(SystemTime),
    Complex64(Complex64),
    Complex128(Complex128),
    Array(Arc<dyn ArrayMarshaler + Send + Sync>),
    Object(Arc<dyn ObjectMarshaler + Send + Sync>),
    /// Object whose entries go straight into the target map.
    Inline(Arc<dyn ObjectMarshaler + Send + Sync>),
    Reflected(Arc<dyn Reflected + Send + Sync>),
    Namespace,
    Skip,
}

/// One entry of a field list.
#[derive(Clone)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

macro_rules! scalar_constructors {
    ($($name:ident($ty:ty) => $variant:ident;)*) => {$(
        pub fn $name(key: impl Into<String>, val: $ty) -> Self {
            Self::new(key, FieldValue::$variant(val))
        }
    )*};
}

impl Field {
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    scalar_constructors! {
        bool(bool) => Bool;
        f64(f64) => F64;
        f32(f32) => F32;
        isize(isize) => Isize;
        i64(i64) => I64;
        i32(i32) => I32;
        i16(i16) => I16;
        i8(i8) => I8;
        usize(usize) => Usize;
        u64(u64) => U64;
        u32(u32) => U32;
        u16(u16) => U16;
        u8(u8) => U8;
        duration(Duration) => Duration;
        time(SystemTime) => Time;
        complex64(Complex64) => Complex64;
        complex128(Complex128) => Complex128;
    }

    pub fn string(key: impl Into<String>, val: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(val.into()))
    }

    pub fn byte_string(key: impl Into<String>, val: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::ByteString(val.into()))
    }

    pub fn binary(key: impl Into<String>, val: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::Binary(val.into()))
    }

    pub fn array(key: impl Into<String>, arr: impl ArrayMarshaler + Send + Sync + 'static) -> Self {
        Self::new(key, FieldValue::Array(Arc::new(arr)))
    }

    pub fn object(key: impl Into<String>, obj: impl ObjectMarshaler + Send + Sync + 'static) -> Self {
        Self::new(key, FieldValue::Object(Arc::new(obj)))
    }

    /// Merges the object's entries into the target instead of nesting them.
    pub fn inline(obj: impl ObjectMarshaler + Send + Sync + 'static) -> Self {
        Self::new("", FieldValue::Inline(Arc::new(obj)))
    }

    /// A sequence of plain values, e.g. `Field::slice("ids", vec![1i16, 2, 3])`.
    pub fn slice<T>(key: impl Into<String>, items: Vec<T>) -> Self
    where
        T: ArrayElement + Send + Sync + 'static,
    {
        Self::array(key, Slice(items))
    }

    /// Encodes any serde value through the slow reflected path.
    pub fn reflect<T>(key: impl Into<String>, val: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        Self::new(key, FieldValue::Reflected(Arc::new(val)))
    }

    /// Opens namespace `key` on the target; later keys are prefixed with it.
    pub fn namespace(key: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Namespace)
    }

    pub fn skip() -> Self {
        Self::new("", FieldValue::Skip)
    }

    /// Applies this field to `enc`.
    ///
    /// A nested value that fails to encode leaves no entry under its own key;
    /// an entry `"<key>Error"` carrying the error text is added instead.
    pub fn add_to(&self, enc: &mut dyn ObjectEncoder) {
        let key = self.key.as_str();
        let res = match &self.value {
            FieldValue::Array(arr) => enc.add_array(key, &**arr),
            FieldValue::Object(obj) => enc.add_object(key, &**obj),
            FieldValue::Inline(obj) => obj.marshal_log_object(enc),
            FieldValue::Reflected(val) => enc.add_reflected(key, &**val),
            scalar => {
                add_scalar(enc, key, scalar);
                Ok(())
            }
        };

        if let Err(err) = res {
            tracing::debug!(key, error = %err, "field failed to encode");
            enc.add_string(&format!("{key}Error"), &err.to_string());
        }
    }
}

fn add_scalar(enc: &mut dyn ObjectEncoder, key: &str, value: &FieldValue) {
    match value {
        FieldValue::Bool(v) => enc.add_bool(key, *v),
        FieldValue::F64(v) => enc.add_f64(key, *v),
        FieldValue::F32(v) => enc.add_f32(key, *v),
        FieldValue::Isize(v) => enc.add_isize(key, *v),
        FieldValue::I64(v) => enc.add_i64(key, *v),
        FieldValue::I32(v) => enc.add_i32(key, *v),
        FieldValue::I16(v) => enc.add_i16(key, *v),
        FieldValue::I8(v) => enc.add_i8(key, *v),
        FieldValue::Usize(v) => enc.add_usize(key, *v),
        FieldValue::U64(v) => enc.add_u64(key, *v),
        FieldValue::U32(v) => enc.add_u32(key, *v),
        FieldValue::U16(v) => enc.add_u16(key, *v),
        FieldValue::U8(v) => enc.add_u8(key, *v),
        FieldValue::String(v) => enc.add_string(key, v),
        FieldValue::ByteString(v) => enc.add_byte_string(key, v),
        FieldValue::Binary(v) => enc.add_binary(key, v),
        FieldValue::Duration(v) => enc.add_duration(key, *v),
        FieldValue::Time(v) => enc.add_time(key, *v),
        FieldValue::Complex64(v) => enc.add_complex64(key, *v),
        FieldValue::Complex128(v) => enc.add_complex128(key, *v),
        FieldValue::Namespace => enc.open_namespace(key),
        FieldValue::Skip
        | FieldValue::Array(_)
        | FieldValue::Object(_)
        | FieldValue::Inline(_)
        | FieldValue::Reflected(_) => {}
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "Bool({v})"),
            FieldValue::F64(v) => write!(f, "F64({v})"),
            FieldValue::F32(v) => write!(f, "F32({v})"),
            FieldValue::Isize(v) => write!(f, "Isize({v})"),
            FieldValue::I64(v) => write!(f, "I64({v})"),
            FieldValue::I32(v) => write!(f, "I32({v})"),
            FieldValue::I16(v) => write!(f, "I16({v})"),
            FieldValue::I8(v) => write!(f, "I8({v})"),
            FieldValue::Usize(v) => write!(f, "Usize({v})"),
            FieldValue::U64(v) => write!(f, "U64({v})"),
            FieldValue::U32(v) => write!(f, "U32({v})"),
            FieldValue::U16(v) => write!(f, "U16({v})"),
            FieldValue::U8(v) => write!(f, "U8({v})"),
            FieldValue::String(v) => write!(f, "String({v:?})"),
            FieldValue::ByteString(v) => write!(f, "ByteString({v:?})"),
            FieldValue::Binary(v) => write!(f, "Binary({} bytes)", v.len()),
            FieldValue::Duration(v) => write!(f, "Duration({v:?})"),
            FieldValue::Time(v) => write!(f, "Time({v:?})"),
            FieldValue::Complex64(v) => write!(f, "{v:?}"),
            FieldValue::Complex128(v) => write!(f, "{v:?}"),
            FieldValue::Array(_) => f.write_str("Array(..)"),
            FieldValue::Object(_) => f.write_str("Object(..)"),
            FieldValue::Inline(_) => f.write_str("Inline(..)"),
            FieldValue::Reflected(_) => f.write_str("Reflected(..)"),
            FieldValue::Namespace => f.write_str("Namespace"),
            FieldValue::Skip => f.write_str("Skip"),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
