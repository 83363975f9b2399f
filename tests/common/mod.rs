#![allow(dead_code)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use msgpack_log_encoder::Encoder;
use rmpv::Value;

/// Decodes exactly one value from `bytes`.
pub fn decode(bytes: &[u8]) -> Value {
    let mut rd = bytes;
    let value = rmpv::decode::read_value(&mut rd).expect("valid msgpack");
    assert!(rd.is_empty(), "{} trailing bytes after value", rd.len());
    value
}

/// Decodes an encoder's accumulated entries as a map.
pub fn decode_map(enc: &Encoder) -> Value {
    let mut bytes = Vec::new();
    rmp::encode::write_map_len(&mut bytes, enc.map_size() as u32).unwrap();
    bytes.extend_from_slice(enc.as_bytes());
    decode(&bytes)
}

/// Decodes an encoder's accumulated elements as a sequence.
pub fn decode_array(enc: &Encoder) -> Value {
    let mut bytes = Vec::new();
    rmp::encode::write_array_len(&mut bytes, enc.slice_len() as u32).unwrap();
    bytes.extend_from_slice(enc.as_bytes());
    decode(&bytes)
}

/// Splits a record into its timestamp and its field map.
pub fn split_record(record: &Value) -> (&Value, &Value) {
    let parts = record.as_array().expect("record is an array");
    assert_eq!(parts.len(), 2, "record has two elements");
    assert!(parts[1].is_map(), "second element is a map");
    (&parts[0], &parts[1])
}

pub fn get<'a>(map: &'a Value, key: &str) -> Option<&'a Value> {
    map.as_map()
        .expect("value is a map")
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

pub fn keys(map: &Value) -> Vec<&str> {
    map.as_map()
        .expect("value is a map")
        .iter()
        .map(|(k, _)| k.as_str().expect("string key"))
        .collect()
}

/// Interprets a timestamp extension value.
pub fn timestamp(value: &Value) -> SystemTime {
    let (ty, data) = match value {
        Value::Ext(ty, data) => (*ty, data.as_slice()),
        other => panic!("expected timestamp extension, got {other:?}"),
    };
    assert_eq!(ty, -1);

    let (secs, nanos) = match data.len() {
        4 => (u32::from_be_bytes(data.try_into().unwrap()) as i64, 0u32),
        8 => {
            let raw = u64::from_be_bytes(data.try_into().unwrap());
            ((raw & ((1 << 34) - 1)) as i64, (raw >> 34) as u32)
        }
        12 => (
            i64::from_be_bytes(data[4..].try_into().unwrap()),
            u32::from_be_bytes(data[..4].try_into().unwrap()),
        ),
        n => panic!("bad timestamp length {n}"),
    };

    if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + Duration::from_nanos(nanos as u64)
    }
}
