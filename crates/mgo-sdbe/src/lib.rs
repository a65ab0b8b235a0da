// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! # Self-Describing Binary Encoding (SDBE)
//!
//! SDBE is the canonical wire format of the Mgo chain: every byte sequence
//! signed or submitted by this SDK is produced by this codec, and a server
//! decoding those bytes independently must arrive at the same value. The
//! format is deterministic; there is exactly one encoding for a given value.
//!
//! The grammar, driven entirely by static type information:
//!
//! * booleans are one byte, `0x00` or `0x01`;
//! * integers are fixed-width little-endian (`u8` through `u128`);
//! * dynamic byte strings and utf-8 strings carry a ULEB128 length prefix
//!   followed by the raw bytes;
//! * fixed-size arrays and tuples are the plain concatenation of their
//!   elements, with no prefix;
//! * variable-length sequences carry a ULEB128 element count followed by the
//!   encoding of each element;
//! * optionals are a flag byte (`0x00` absent, `0x01` present), then the
//!   value when present;
//! * composites are their fields concatenated in declaration order;
//! * tagged unions are the ULEB128 index of the active variant (declaration
//!   order), then that variant's payload. Reordering variants is a
//!   wire-breaking change.
//!
//! ULEB128 values are little-endian base-128, at most ten bytes; decoders
//! reject sequences whose digits overflow a 64-bit value and report the
//! offending byte offset.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! enum Toggle {
//!     Off,
//!     On(u16),
//! }
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Frame {
//!     tag: [u8; 2],
//!     body: Vec<u8>,
//!     toggle: Toggle,
//!     note: Option<u8>,
//! }
//!
//! let frame = Frame {
//!     tag: [0xAA, 0xBB],
//!     body: vec![1, 2, 3],
//!     toggle: Toggle::On(8000),
//!     note: None,
//! };
//! let bytes = mgo_sdbe::to_bytes(&frame).unwrap();
//! assert_eq!(bytes, vec![0xAA, 0xBB, 3, 1, 2, 3, 1, 0x40, 0x1F, 0]);
//! assert_eq!(mgo_sdbe::from_bytes::<Frame>(&bytes).unwrap(), frame);
//! ```
//!
//! Types with bespoke wire forms implement `Serialize`/`Deserialize` by hand
//! instead of deriving them; the codec always defers to the type's own
//! implementation, which is how 32-byte address carriers end up as bare
//! arrays while digests keep their length prefix.

mod de;
mod error;
mod ser;

/// Variable length sequences are limited to a max length of 2^31 elements.
pub const MAX_SEQUENCE_LENGTH: usize = 1 << 31;

pub use de::{from_bytes, from_bytes_seed, Deserializer};
pub use error::{Error, Result};
pub use ser::to_bytes;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[test]
    fn integers_are_little_endian_fixed_width() {
        assert_eq!(to_bytes(&true).unwrap(), vec![1]);
        assert_eq!(to_bytes(&false).unwrap(), vec![0]);
        assert_eq!(to_bytes(&0x12u8).unwrap(), vec![0x12]);
        assert_eq!(to_bytes(&0x1234u16).unwrap(), vec![0x34, 0x12]);
        assert_eq!(
            to_bytes(&0x12345678u32).unwrap(),
            vec![0x78, 0x56, 0x34, 0x12]
        );
        assert_eq!(
            to_bytes(&10_000_000u64).unwrap(),
            vec![0x80, 0x96, 0x98, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(to_bytes(&1u128).unwrap().len(), 16);
    }

    #[test]
    fn uleb128_length_prefixes() {
        let encoded = to_bytes(&vec![7u8; 127]).unwrap();
        assert_eq!(encoded[0], 127);
        assert_eq!(encoded.len(), 128);

        let encoded = to_bytes(&vec![7u8; 128]).unwrap();
        assert_eq!(&encoded[..2], &[0x80, 0x01]);

        let encoded = to_bytes(&vec![(); 16384]).unwrap();
        assert_eq!(encoded, vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn strings_are_length_prefixed_utf8() {
        assert_eq!(
            to_bytes("hello world").unwrap(),
            [&[11u8][..], b"hello world"].concat()
        );
        let round: String = from_bytes(&to_bytes("çå∞").unwrap()).unwrap();
        assert_eq!(round, "çå∞");
    }

    #[test]
    fn fixed_arrays_have_no_prefix() {
        assert_eq!(to_bytes(&[1u8, 2, 3]).unwrap(), vec![1, 2, 3]);
        assert_eq!(to_bytes(&(4u8, 5u16)).unwrap(), vec![4, 5, 0]);
    }

    #[test]
    fn options_use_a_flag_byte() {
        assert_eq!(to_bytes(&Some(8u8)).unwrap(), vec![1, 8]);
        assert_eq!(to_bytes(&None::<u8>).unwrap(), vec![0]);
        assert_eq!(from_bytes::<Option<u8>>(&[1, 8]).unwrap(), Some(8));
        assert_eq!(from_bytes::<Option<u8>>(&[0]).unwrap(), None);
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Point,
        Line(u16),
        Rect { w: u32, h: u32 },
    }

    #[test]
    fn enums_encode_the_variant_index_then_payload() {
        assert_eq!(to_bytes(&Shape::Point).unwrap(), vec![0]);
        assert_eq!(to_bytes(&Shape::Line(8000)).unwrap(), vec![1, 0x40, 0x1F]);
        assert_eq!(
            to_bytes(&Shape::Rect { w: 1, h: 2 }).unwrap(),
            vec![2, 1, 0, 0, 0, 2, 0, 0, 0]
        );
        for shape in [Shape::Point, Shape::Line(9), Shape::Rect { w: 3, h: 4 }] {
            assert_eq!(from_bytes::<Shape>(&to_bytes(&shape).unwrap()).unwrap(), shape);
        }
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Layered {
        first: Vec<u8>,
        second: String,
        third: Option<Shape>,
    }

    #[test]
    fn struct_fields_concatenate_in_declaration_order() {
        let value = Layered {
            first: vec![0xC0, 0xDE],
            second: "a".to_owned(),
            third: Some(Shape::Point),
        };
        let bytes = to_bytes(&value).unwrap();
        assert_eq!(bytes, vec![2, 0xC0, 0xDE, 1, b'a', 1, 0]);
        assert_eq!(from_bytes::<Layered>(&bytes).unwrap(), value);
    }

    #[test]
    fn encoding_is_deterministic() {
        let value = Layered {
            first: (0..63).collect(),
            second: "determinism".to_owned(),
            third: Some(Shape::Rect { w: 9, h: 9 }),
        };
        assert_eq!(to_bytes(&value).unwrap(), to_bytes(&value).unwrap());
    }

    #[test]
    fn uleb128_overflow_names_the_byte() {
        // Ten continuation bytes with a large final digit cannot fit in u64.
        let overlong = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let err = from_bytes::<Vec<u8>>(&overlong).unwrap_err();
        assert!(matches!(err, Error::UlebOverflow { position: 9 }), "{err:?}");
    }

    #[test]
    fn declared_length_beyond_input_is_a_short_read() {
        let err = from_bytes::<String>(&[5, b'h', b'i']).unwrap_err();
        assert_eq!(
            err,
            Error::ShortRead {
                position: 1,
                declared: 5,
                available: 2,
            }
        );
        // Element-wise sequences run out of input instead.
        let err = from_bytes::<Vec<u8>>(&[5, 1, 2]).unwrap_err();
        assert_eq!(err, Error::Eof { position: 3 });
    }

    #[test]
    fn truncated_input_reports_eof_position() {
        let err = from_bytes::<u32>(&[1, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::ShortRead {
                position: 0,
                declared: 4,
                available: 2,
            }
        );
        let err = from_bytes::<Option<u8>>(&[]).unwrap_err();
        assert_eq!(err, Error::Eof { position: 0 });
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let err = from_bytes::<u8>(&[1, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::RemainingInput {
                position: 1,
                remaining: 1,
            }
        );
    }

    #[test]
    fn invalid_bool_and_option_flags_are_rejected() {
        assert_eq!(
            from_bytes::<bool>(&[2]).unwrap_err(),
            Error::ExpectedBoolean { byte: 2, position: 0 }
        );
        assert_eq!(
            from_bytes::<Option<u8>>(&[9, 1]).unwrap_err(),
            Error::ExpectedOptionFlag { byte: 9, position: 0 }
        );
    }

    #[test]
    fn unknown_variant_index_fails() {
        assert!(from_bytes::<Shape>(&[3]).is_err());
    }

    #[test]
    fn floats_and_maps_are_unsupported() {
        assert_eq!(to_bytes(&1.0f64).unwrap_err(), Error::NotSupported("f64"));
        let map: std::collections::BTreeMap<u8, u8> = Default::default();
        assert_eq!(to_bytes(&map).unwrap_err(), Error::NotSupported("map"));
    }

    #[test]
    fn deserializer_exposes_bytes_consumed() {
        let bytes = to_bytes(&(7u8, 0x0102u16)).unwrap();
        let mut deserializer = Deserializer::new(&bytes);
        let _: u8 = serde::Deserialize::deserialize(&mut deserializer).unwrap();
        assert_eq!(deserializer.position(), 1);
        let _: u16 = serde::Deserialize::deserialize(&mut deserializer).unwrap();
        assert_eq!(deserializer.position(), 3);
    }
}
