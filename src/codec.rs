//! MessagePack primitives used by the field encoder.
//!
//! Thin layer over `rmp::encode`. Every destination is an in-memory `Vec<u8>`
//! which cannot fail to grow, so write errors are discarded here and the
//! encoder hot path stays free of error branches.

use std::time::{SystemTime, UNIX_EPOCH};

use rmp::encode;

/// Extension type reserved by MessagePack for timestamps.
pub const TIMESTAMP_EXT_TYPE: i8 = -1;

const NANOS_PER_SEC: u32 = 1_000_000_000;

#[inline]
pub fn write_bool(buf: &mut Vec<u8>, val: bool) {
    let _ = encode::write_bool(buf, val);
}

#[inline]
pub fn write_i8(buf: &mut Vec<u8>, val: i8) {
    let _ = encode::write_i8(buf, val);
}

#[inline]
pub fn write_i16(buf: &mut Vec<u8>, val: i16) {
    let _ = encode::write_i16(buf, val);
}

#[inline]
pub fn write_i32(buf: &mut Vec<u8>, val: i32) {
    let _ = encode::write_i32(buf, val);
}

#[inline]
pub fn write_i64(buf: &mut Vec<u8>, val: i64) {
    let _ = encode::write_i64(buf, val);
}

#[inline]
pub fn write_isize(buf: &mut Vec<u8>, val: isize) {
    write_i64(buf, val as i64);
}

#[inline]
pub fn write_u8(buf: &mut Vec<u8>, val: u8) {
    let _ = encode::write_u8(buf, val);
}

#[inline]
pub fn write_u16(buf: &mut Vec<u8>, val: u16) {
    let _ = encode::write_u16(buf, val);
}

#[inline]
pub fn write_u32(buf: &mut Vec<u8>, val: u32) {
    let _ = encode::write_u32(buf, val);
}

#[inline]
pub fn write_u64(buf: &mut Vec<u8>, val: u64) {
    let _ = encode::write_u64(buf, val);
}

#[inline]
pub fn write_usize(buf: &mut Vec<u8>, val: usize) {
    write_u64(buf, val as u64);
}

#[inline]
pub fn write_f32(buf: &mut Vec<u8>, val: f32) {
    let _ = encode::write_f32(buf, val);
}

#[inline]
pub fn write_f64(buf: &mut Vec<u8>, val: f64) {
    let _ = encode::write_f64(buf, val);
}

#[inline]
pub fn write_str(buf: &mut Vec<u8>, val: &str) {
    let _ = encode::write_str(buf, val);
}

/// Writes `prefix + val` as one string without building it first.
#[inline]
pub fn write_prefixed_str(buf: &mut Vec<u8>, prefix: &str, val: &str) {
    let _ = encode::write_str_len(buf, (prefix.len() + val.len()) as u32);
    buf.extend_from_slice(prefix.as_bytes());
    buf.extend_from_slice(val.as_bytes());
}

/// Writes raw bytes with a `str` header. The bytes are not validated.
#[inline]
pub fn write_byte_str(buf: &mut Vec<u8>, val: &[u8]) {
    let _ = encode::write_str_len(buf, val.len() as u32);
    buf.extend_from_slice(val);
}

#[inline]
pub fn write_bin(buf: &mut Vec<u8>, val: &[u8]) {
    let _ = encode::write_bin(buf, val);
}

#[inline]
pub fn write_array_len(buf: &mut Vec<u8>, len: usize) {
    let _ = encode::write_array_len(buf, len as u32);
}

#[inline]
pub fn write_map_len(buf: &mut Vec<u8>, len: usize) {
    let _ = encode::write_map_len(buf, len as u32);
}

/// Durations are written as floating-point seconds.
#[inline]
pub fn write_duration(buf: &mut Vec<u8>, val: std::time::Duration) {
    write_f64(buf, val.as_secs_f64());
}

/// Splits a wall-clock time into signed Unix seconds and non-negative nanos.
pub fn unix_parts(time: SystemTime) -> (i64, u32) {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            let secs = -(d.as_secs() as i64);
            match d.subsec_nanos() {
                0 => (secs, 0),
                nanos => (secs - 1, NANOS_PER_SEC - nanos),
            }
        }
    }
}

/// Writes a timestamp extension using the smallest layout that holds `time`.
///
/// * 32-bit: seconds in `u32`, no nanos
/// * 64-bit: `nanos << 34 | seconds` for seconds below 2^34
/// * 96-bit: `u32` nanos followed by `i64` seconds
pub fn write_time(buf: &mut Vec<u8>, time: SystemTime) {
    let (secs, nanos) = unix_parts(time);

    if secs >> 34 == 0 {
        let data = (u64::from(nanos) << 34) | secs as u64;
        if data & 0xffff_ffff_0000_0000 == 0 {
            let _ = encode::write_ext_meta(buf, 4, TIMESTAMP_EXT_TYPE);
            buf.extend_from_slice(&(data as u32).to_be_bytes());
        } else {
            let _ = encode::write_ext_meta(buf, 8, TIMESTAMP_EXT_TYPE);
            buf.extend_from_slice(&data.to_be_bytes());
        }
        return;
    }

    let _ = encode::write_ext_meta(buf, 12, TIMESTAMP_EXT_TYPE);
    buf.extend_from_slice(&nanos.to_be_bytes());
    buf.extend_from_slice(&secs.to_be_bytes());
}
