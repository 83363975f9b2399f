mod common;

use std::time::{Duration, UNIX_EPOCH};

use common::{decode_array, decode_map, get, keys, timestamp};
use msgpack_log_encoder::{
    ArrayEncoder, ArrayMarshalerFn, Complex128, Complex64, EncodeError, Encoder, EncoderConfig,
    ObjectEncoder, ObjectMarshalerFn,
};
use serde::{Serialize, Serializer};

fn encoder() -> Encoder {
    Encoder::new(EncoderConfig::production())
}

#[test]
fn test_add_counts_one_entry_per_call() {
    let mut enc = encoder();
    enc.add_bool("a", true);
    enc.add_string("b", "x");
    enc.add_u64("c", 7);
    assert_eq!(enc.map_size(), 3);
    assert_eq!(enc.slice_len(), 0);

    let map = decode_map(&enc);
    assert_eq!(keys(&map), ["a", "b", "c"]);
}

#[test]
fn test_append_counts_one_element_per_call() {
    let mut enc = encoder();
    enc.append_bool(false);
    enc.append_string("foo");
    assert_eq!(enc.slice_len(), 2);
    assert_eq!(enc.map_size(), 0);

    let arr = decode_array(&enc);
    let items = arr.as_array().unwrap();
    assert_eq!(items[0].as_bool(), Some(false));
    assert_eq!(items[1].as_str(), Some("foo"));
}

#[test]
fn test_append_scalars_use_fixed_markers() {
    let mut enc = encoder();
    enc.append_binary(&[1, 2]);
    enc.append_byte_string(b"hi");
    enc.append_bool(true);
    enc.append_f32(1.5);
    enc.append_f64(1.5);
    enc.append_i8(-1);
    enc.append_i16(-2);
    enc.append_i32(-5);
    enc.append_i64(1);
    enc.append_isize(1);
    enc.append_u8(7);
    enc.append_u16(7);
    enc.append_u32(7);
    enc.append_u64(7);
    enc.append_usize(7);
    enc.append_string("ok");
    enc.append_duration(Duration::from_secs(2));
    enc.append_time(UNIX_EPOCH + Duration::from_secs(1));
    assert_eq!(enc.slice_len(), 18);
    assert_eq!(enc.map_size(), 0);

    let expected: Vec<u8> = [
        &[0xc4, 0x02, 0x01, 0x02][..], // bin 8
        &[0xa2, b'h', b'i'], // fixstr
        &[0xc3], // true
        &[0xca, 0x3f, 0xc0, 0x00, 0x00], // float 32
        &[0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0], // float 64
        &[0xd0, 0xff], // int 8
        &[0xd1, 0xff, 0xfe], // int 16
        &[0xd2, 0xff, 0xff, 0xff, 0xfb], // int 32
        &[0xd3, 0, 0, 0, 0, 0, 0, 0, 1], // int 64
        &[0xd3, 0, 0, 0, 0, 0, 0, 0, 1], // isize as int 64
        &[0xcc, 0x07], // uint 8
        &[0xcd, 0x00, 0x07], // uint 16
        &[0xce, 0x00, 0x00, 0x00, 0x07], // uint 32
        &[0xcf, 0, 0, 0, 0, 0, 0, 0, 7], // uint 64
        &[0xcf, 0, 0, 0, 0, 0, 0, 0, 7], // usize as uint 64
        &[0xa2, b'o', b'k'], // fixstr
        &[0xcb, 0x40, 0x00, 0, 0, 0, 0, 0, 0], // 2.0 seconds
        &[0xd6, 0xff, 0x00, 0x00, 0x00, 0x01], // timestamp 32
    ]
    .concat();
    assert_eq!(enc.as_bytes(), expected.as_slice());
}

#[test]
fn test_scalar_values() {
    let ts = UNIX_EPOCH + Duration::new(1_529_425_222, 99);
    let mut enc = encoder();
    enc.add_bool("bool", true);
    enc.add_i8("i8", -8);
    enc.add_i16("i16", -345);
    enc.add_i32("i32", 123_456_789);
    enc.add_i64("i64", -1 << 40);
    enc.add_isize("isize", -2);
    enc.add_u8("u8", 255);
    enc.add_u16("u16", 45_678);
    enc.add_u32("u32", 4_000_000_000);
    enc.add_u64("u64", u64::MAX);
    enc.add_usize("usize", 3);
    enc.add_f32("f32", 3.5);
    enc.add_f64("f64", 0.9999);
    enc.add_string("str", "💩");
    enc.add_duration("dur", Duration::from_millis(500));
    enc.add_time("time", ts);

    let map = decode_map(&enc);
    assert_eq!(get(&map, "bool").unwrap().as_bool(), Some(true));
    assert_eq!(get(&map, "i8").unwrap().as_i64(), Some(-8));
    assert_eq!(get(&map, "i16").unwrap().as_i64(), Some(-345));
    assert_eq!(get(&map, "i32").unwrap().as_i64(), Some(123_456_789));
    assert_eq!(get(&map, "i64").unwrap().as_i64(), Some(-1 << 40));
    assert_eq!(get(&map, "isize").unwrap().as_i64(), Some(-2));
    assert_eq!(get(&map, "u8").unwrap().as_u64(), Some(255));
    assert_eq!(get(&map, "u16").unwrap().as_u64(), Some(45_678));
    assert_eq!(get(&map, "u32").unwrap().as_u64(), Some(4_000_000_000));
    assert_eq!(get(&map, "u64").unwrap().as_u64(), Some(u64::MAX));
    assert_eq!(get(&map, "usize").unwrap().as_u64(), Some(3));
    assert!(get(&map, "f32").unwrap().is_f32());
    assert_eq!(get(&map, "f32").unwrap().as_f64(), Some(3.5));
    assert_eq!(get(&map, "f64").unwrap().as_f64(), Some(0.9999));
    assert_eq!(get(&map, "str").unwrap().as_str(), Some("💩"));
    assert_eq!(get(&map, "dur").unwrap().as_f64(), Some(0.5));
    assert_eq!(timestamp(get(&map, "time").unwrap()), ts);
}

#[test]
fn test_byte_string_is_text_and_binary_is_bin() {
    let mut enc = encoder();
    enc.add_byte_string("bs", b"hello");
    enc.add_byte_string("empty", b"");
    enc.add_binary("bits", &[0, 1, 2, 3]);

    let map = decode_map(&enc);
    assert!(get(&map, "bs").unwrap().is_str());
    assert_eq!(get(&map, "bs").unwrap().as_str(), Some("hello"));
    assert_eq!(get(&map, "empty").unwrap().as_str(), Some(""));
    assert!(get(&map, "bits").unwrap().is_bin());
    assert_eq!(get(&map, "bits").unwrap().as_slice(), Some(&[0u8, 1, 2, 3][..]));
}

#[test]
fn test_namespaces_concatenate() {
    let mut enc = encoder();
    enc.add_string("top", "v");
    enc.open_namespace("a");
    enc.open_namespace("b");
    enc.add_string("c", "v");
    assert_eq!(enc.namespace(), "a.b.");

    let map = decode_map(&enc);
    assert_eq!(keys(&map), ["top", "a.b.c"]);
}

#[test]
fn test_namespace_applies_to_nested_adds_only_by_key() {
    let mut enc = encoder();
    enc.open_namespace("req");
    enc.add_object(
        "user",
        &ObjectMarshalerFn::new(|obj| {
            obj.add_string("name", "bob");
            Ok(())
        }),
    )
    .unwrap();

    // The nested scope starts without a namespace.
    let map = decode_map(&enc);
    let user = get(&map, "req.user").unwrap();
    assert_eq!(keys(user), ["name"]);
}

#[test]
fn test_clone_isolation() {
    let mut original = encoder();
    original.add_string("shared", "yes");
    original.open_namespace("ns");

    let mut copy = original.clone();
    assert_eq!(copy.as_bytes(), original.as_bytes());
    assert_eq!(copy.map_size(), 1);
    assert_eq!(copy.namespace(), "ns.");

    copy.add_i64("only_copy", 1);
    original.add_i64("only_original", 2);

    assert_eq!(keys(&decode_map(&original)), ["shared", "ns.only_original"]);
    assert_eq!(keys(&decode_map(&copy)), ["shared", "ns.only_copy"]);
}

#[test]
fn test_clone_outlives_original() {
    let copy = {
        let mut original = encoder();
        original.add_bool("flag", true);
        original.clone()
    };
    assert_eq!(keys(&decode_map(&copy)), ["flag"]);
}

#[test]
fn test_nested_container_lengths() {
    let mut enc = encoder();
    enc.add_array("zero", &ArrayMarshalerFn::new(|_| Ok(()))).unwrap();
    enc.add_array(
        "one",
        &ArrayMarshalerFn::new(|arr| {
            arr.append_i16(1);
            Ok(())
        }),
    )
    .unwrap();
    enc.add_array(
        "many",
        &ArrayMarshalerFn::new(|arr| {
            arr.append_bool(false);
            arr.append_bool(true);
            arr.append_isize(34);
            Ok(())
        }),
    )
    .unwrap();
    enc.add_object("empty_obj", &ObjectMarshalerFn::new(|_| Ok(()))).unwrap();
    enc.add_object(
        "obj",
        &ObjectMarshalerFn::new(|obj| {
            obj.add_u16("x", 3344);
            obj.add_u16("y", 1);
            Ok(())
        }),
    )
    .unwrap();
    assert_eq!(enc.map_size(), 5);

    let map = decode_map(&enc);
    assert_eq!(get(&map, "zero").unwrap().as_array().unwrap().len(), 0);
    assert_eq!(get(&map, "one").unwrap().as_array().unwrap().len(), 1);
    assert_eq!(get(&map, "many").unwrap().as_array().unwrap().len(), 3);
    assert_eq!(get(&map, "empty_obj").unwrap().as_map().unwrap().len(), 0);
    assert_eq!(get(&map, "obj").unwrap().as_map().unwrap().len(), 2);
}

#[test]
fn test_deeply_nested_values() {
    let mut enc = encoder();
    enc.add_array(
        "arr3",
        &ArrayMarshalerFn::new(|arr| {
            arr.append_string("foo");
            arr.append_duration(Duration::from_secs(5));
            arr.append_array(&ArrayMarshalerFn::new(|inner| {
                inner.append_f64(3.0);
                inner.append_usize(45_678);
                Ok(())
            }))?;
            arr.append_object(&ObjectMarshalerFn::new(|obj| {
                obj.add_u16("x", 3344);
                Ok(())
            }))?;
            Ok(())
        }),
    )
    .unwrap();

    let map = decode_map(&enc);
    let arr3 = get(&map, "arr3").unwrap().as_array().unwrap();
    assert_eq!(arr3.len(), 4);
    assert_eq!(arr3[0].as_str(), Some("foo"));
    assert_eq!(arr3[1].as_f64(), Some(5.0));
    let inner = arr3[2].as_array().unwrap();
    assert_eq!(inner[0].as_f64(), Some(3.0));
    assert_eq!(inner[1].as_u64(), Some(45_678));
    assert_eq!(get(&arr3[3], "x").unwrap().as_u64(), Some(3344));
}

#[test]
fn test_failed_object_leaves_parent_untouched() {
    let mut enc = encoder();
    enc.add_string("before", "ok");
    let snapshot = enc.as_bytes().to_vec();

    let err = enc
        .add_object(
            "broken",
            &ObjectMarshalerFn::new(|obj| {
                obj.add_string("partial", "value");
                Err(EncodeError::marshal("backend unavailable"))
            }),
        )
        .unwrap_err();

    assert_eq!(err.to_string(), "backend unavailable");
    assert_eq!(enc.map_size(), 1);
    assert_eq!(enc.as_bytes(), snapshot.as_slice());
}

#[test]
fn test_failed_nested_array_propagates() {
    let mut enc = encoder();
    let res = enc.add_array(
        "outer",
        &ArrayMarshalerFn::new(|arr| {
            arr.append_u8(1);
            arr.append_array(&ArrayMarshalerFn::new(|_| Err(EncodeError::marshal("inner"))))?;
            Ok(())
        }),
    );

    assert!(matches!(res, Err(EncodeError::Marshal(msg)) if msg == "inner"));
    assert_eq!(enc.map_size(), 0);
    assert!(enc.as_bytes().is_empty());
}

#[derive(Serialize)]
struct Bar {
    key: String,
    val: f64,
}

#[derive(Serialize)]
struct Foo {
    #[serde(rename = "aee")]
    a: String,
    #[serde(rename = "bee")]
    b: i64,
    #[serde(rename = "dee")]
    d: Vec<Bar>,
}

#[test]
fn test_reflected_struct_encodes_as_named_map() {
    let foo = Foo {
        a: "lol".into(),
        b: 123,
        d: vec![
            Bar { key: "pi".into(), val: std::f64::consts::PI },
            Bar { key: "tau".into(), val: std::f64::consts::TAU },
        ],
    };

    let mut enc = encoder();
    enc.add_reflected("such", &foo).unwrap();
    enc.append_reflected(&vec![1u8, 2]).unwrap();
    assert_eq!(enc.map_size(), 1);
    assert_eq!(enc.slice_len(), 1);

    let mut map_only = encoder();
    map_only.add_reflected("such", &foo).unwrap();
    let map = decode_map(&map_only);
    let such = get(&map, "such").unwrap();
    assert_eq!(keys(such), ["aee", "bee", "dee"]);
    assert_eq!(get(such, "bee").unwrap().as_i64(), Some(123));
    let dee = get(such, "dee").unwrap().as_array().unwrap();
    assert_eq!(get(&dee[1], "key").unwrap().as_str(), Some("tau"));
    assert_eq!(get(&dee[1], "val").unwrap().as_f64(), Some(std::f64::consts::TAU));
}

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("refusing to serialize"))
    }
}

#[test]
fn test_reflected_failure_rolls_back() {
    let mut enc = encoder();
    enc.add_bool("kept", true);
    let snapshot = enc.as_bytes().to_vec();

    let err = enc.add_reflected("bad", &Unserializable).unwrap_err();
    assert!(matches!(err, EncodeError::Reflect(_)));
    assert!(err.to_string().contains("refusing to serialize"));
    assert_eq!(enc.map_size(), 1);
    assert_eq!(enc.as_bytes(), snapshot.as_slice());

    assert!(enc.append_reflected(&Unserializable).is_err());
    assert_eq!(enc.slice_len(), 0);
    assert_eq!(enc.as_bytes(), snapshot.as_slice());
}

#[test]
#[should_panic(expected = "complex numbers not supported")]
fn test_add_complex128_panics() {
    let mut enc = encoder();
    enc.add_complex128("c", Complex128 { re: 1.0, im: 2.0 });
}

#[test]
#[should_panic(expected = "complex numbers not supported")]
fn test_append_complex128_panics() {
    let mut enc = encoder();
    enc.append_complex128(Complex128 { re: 1.0, im: 2.0 });
}

#[test]
#[should_panic(expected = "complex numbers not supported")]
fn test_add_complex64_panics() {
    let mut enc = encoder();
    enc.add_complex64("c", Complex64 { re: 1.0, im: 2.0 });
}

#[test]
#[should_panic(expected = "complex numbers not supported")]
fn test_append_complex64_panics() {
    let mut enc = encoder();
    enc.append_complex64(Complex64 { re: 1.0, im: 2.0 });
}

#[test]
fn test_with_fields_does_not_touch_source() {
    let base = encoder();
    let derived = base.with_fields(&[msgpack_log_encoder::Field::string("svc", "api")]);
    assert_eq!(base.map_size(), 0);
    assert!(base.as_bytes().is_empty());
    assert_eq!(keys(&decode_map(&derived)), ["svc"]);
}
