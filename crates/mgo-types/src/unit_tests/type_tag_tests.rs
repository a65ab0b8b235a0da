// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use super::*;

const FRAMEWORK: &str = "0x0000000000000000000000000000000000000000000000000000000000000002";

fn struct_tag(module: &str, name: &str, type_params: Vec<TypeTag>) -> StructTag {
    StructTag {
        address: FRAMEWORK.parse().unwrap(),
        module: module.to_owned(),
        name: name.to_owned(),
        type_params,
    }
}

#[test]
fn primitive_grammar_round_trips() {
    for repr in ["bool", "u8", "u16", "u32", "u64", "u128", "u256", "address", "signer"] {
        let tag: TypeTag = repr.parse().unwrap();
        assert_eq!(tag.to_string(), repr);
    }
}

#[test]
fn wire_discriminants_follow_declaration_order() {
    // The chain's discriminant table; any change here is wire-breaking.
    let expected: [(TypeTag, u8); 9] = [
        (TypeTag::Bool, 0),
        (TypeTag::U8, 1),
        (TypeTag::U128, 2),
        (TypeTag::U256, 3),
        (TypeTag::Address, 4),
        (TypeTag::Signer, 5),
        (TypeTag::U16, 8),
        (TypeTag::U32, 9),
        (TypeTag::U64, 10),
    ];
    for (tag, index) in expected {
        assert_eq!(mgo_sdbe::to_bytes(&tag).unwrap(), vec![index]);
    }
    assert_eq!(
        mgo_sdbe::to_bytes(&TypeTag::Vector(Box::new(TypeTag::U8))).unwrap(),
        vec![6, 1]
    );
}

#[test]
fn nested_vectors_round_trip() {
    let repr = "vector<vector<u8>>";
    let tag: TypeTag = repr.parse().unwrap();
    assert_eq!(
        tag,
        TypeTag::Vector(Box::new(TypeTag::Vector(Box::new(TypeTag::U8))))
    );
    assert_eq!(tag.to_string(), repr);

    // Nested unions on the wire: vector, vector, u8.
    assert_eq!(mgo_sdbe::to_bytes(&tag).unwrap(), vec![6, 6, 1]);
}

#[test]
fn struct_grammar_round_trips() {
    let coin = TypeTag::from(struct_tag(
        "coin",
        "Coin",
        vec![TypeTag::from(struct_tag("mgo", "MGO", vec![]))],
    ));
    let repr = format!("{FRAMEWORK}::coin::Coin<{FRAMEWORK}::mgo::MGO>");
    assert_eq!(coin.to_string(), repr);

    let parsed: TypeTag = repr.parse().unwrap();
    assert_eq!(parsed, coin);
    assert_eq!(
        mgo_sdbe::to_bytes(&parsed).unwrap(),
        mgo_sdbe::to_bytes(&coin).unwrap()
    );
}

#[test]
fn type_params_split_on_top_level_commas_only() {
    let repr = format!(
        "{FRAMEWORK}::pair::Pair<{FRAMEWORK}::coin::Coin<{FRAMEWORK}::mgo::MGO>, vector<u64>>"
    );
    let parsed: TypeTag = repr.parse().unwrap();
    let TypeTag::Struct(pair) = &parsed else {
        panic!("expected struct tag")
    };
    assert_eq!(pair.type_params.len(), 2);
    assert_eq!(pair.type_params[1], TypeTag::Vector(Box::new(TypeTag::U64)));
    assert_eq!(parsed.to_string(), repr);
}

#[test]
fn short_address_form_parses_and_normalizes() {
    let parsed: TypeTag = "0x2::mgo::MGO".parse().unwrap();
    assert_eq!(parsed.to_string(), format!("{FRAMEWORK}::mgo::MGO"));
}

#[test]
fn malformed_tags_are_rejected() {
    for bad in [
        "u512",
        "Coin",
        "0x2::coin",
        "0x2::coin::Coin<",
        "0x2::coin::Coin<u8",
        "vector<>",
        "0xzz::coin::Coin",
    ] {
        assert!(bad.parse::<TypeTag>().is_err(), "{bad} should not parse");
    }
}

#[test]
fn empty_type_parameter_lists_are_permitted() {
    let tag = TypeTag::from(struct_tag("mgo", "MGO", vec![]));
    let bytes = mgo_sdbe::to_bytes(&tag).unwrap();
    // variant || address || "mgo" || "MGO" || uleb(0) params
    assert_eq!(bytes[0], 7);
    assert_eq!(*bytes.last().unwrap(), 0);
    assert_eq!(mgo_sdbe::from_bytes::<TypeTag>(&bytes).unwrap(), tag);
}
