// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::crypto::{MgoKeyPair, SignatureScheme};

const SHORT: &str = "0x2";
const FULL: &str = "0x0000000000000000000000000000000000000000000000000000000000000002";

#[test]
fn address_parsing_normalizes() {
    let a: MgoAddress = SHORT.parse().unwrap();
    assert_eq!(a.to_string(), FULL);

    // Case folds, 0x optional.
    let b: MgoAddress = "0X00000000000000000000000000000000000000000000000000000000000000AB"
        .parse()
        .unwrap();
    assert_eq!(
        b.to_string(),
        "0x00000000000000000000000000000000000000000000000000000000000000ab"
    );
    let c: MgoAddress = "ab".parse().unwrap();
    assert_eq!(b, c);
}

#[test]
fn address_parsing_rejects_bad_input() {
    assert_eq!("".parse::<MgoAddress>(), Err(MgoError::InvalidAddress));
    assert_eq!("0x".parse::<MgoAddress>(), Err(MgoError::InvalidAddress));
    assert_eq!("hello".parse::<MgoAddress>(), Err(MgoError::InvalidAddress));
    // 65 hex digits.
    let too_long = format!("0x{}", "0".repeat(65));
    assert_eq!(too_long.parse::<MgoAddress>(), Err(MgoError::InvalidAddress));
}

#[test]
fn address_binary_form_is_32_raw_bytes() {
    let a: MgoAddress = FULL.parse().unwrap();
    let bytes = mgo_sdbe::to_bytes(&a).unwrap();
    assert_eq!(bytes.len(), MGO_ADDRESS_LENGTH);
    assert_eq!(bytes[31], 2);
    assert_eq!(mgo_sdbe::from_bytes::<MgoAddress>(&bytes).unwrap(), a);
}

#[test]
fn address_json_form_is_the_display_string() {
    let a: MgoAddress = SHORT.parse().unwrap();
    assert_eq!(serde_json::to_value(a).unwrap(), serde_json::json!(FULL));
    let back: MgoAddress = serde_json::from_value(serde_json::json!(FULL)).unwrap();
    assert_eq!(back, a);
}

#[test]
fn object_id_shares_the_address_carrier() {
    let id: ObjectID = FULL.parse().unwrap();
    assert_eq!(id.to_string(), FULL);
    assert_eq!(mgo_sdbe::to_bytes(&id).unwrap().len(), ObjectID::LENGTH);
    assert_eq!(MgoAddress::from(id).to_string(), FULL);
}

#[test]
fn sequence_number_is_fixed_width() {
    let v = SequenceNumber::from(1000u64);
    assert_eq!(
        mgo_sdbe::to_bytes(&v).unwrap(),
        1000u64.to_le_bytes().to_vec()
    );
    assert_eq!(v.value(), 1000);
}

#[test]
fn address_derivation_is_stable_per_key() {
    let kp = MgoKeyPair::generate(SignatureScheme::ED25519);
    let a1 = MgoAddress::from(&kp.public());
    let a2 = kp.mgo_address();
    assert_eq!(a1, a2);
    assert_ne!(a1, MgoAddress::ZERO);
}
