// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::base_types::MgoAddress;
use crate::transaction::{
    GasData, ProgrammableTransaction, TransactionData, TransactionKind,
};

fn ed25519_keypair() -> MgoKeyPair {
    MgoKeyPair::from_secret_key_hex(
        SignatureScheme::ED25519,
        "0xa1fbf2c281a52d8655a2c793376490bc4f4bef6a1e89346e5d9a255ba4972236",
    )
    .unwrap()
}

fn dummy_transaction_bytes(sender: MgoAddress) -> String {
    let data = TransactionData::new_v1(
        TransactionKind::ProgrammableTransaction(ProgrammableTransaction::default()),
        sender,
        GasData {
            payment: vec![],
            owner: sender,
            price: 1000,
            budget: 50_000_000,
        },
        None,
    );
    Base64::encode(mgo_sdbe::to_bytes(&data).unwrap())
}

#[test]
fn scheme_flags_and_sizes() {
    assert_eq!(SignatureScheme::ED25519.flag(), 0x00);
    assert_eq!(SignatureScheme::Secp256k1.flag(), 0x01);
    assert_eq!(SignatureScheme::ED25519.public_key_length(), 32);
    assert_eq!(SignatureScheme::Secp256k1.public_key_length(), 33);
    assert_eq!(
        SignatureScheme::from_flag_byte(&0x05),
        Err(MgoError::UnknownSignatureScheme(0x05))
    );
}

#[test]
fn keypair_base64_round_trip() {
    for scheme in [SignatureScheme::ED25519, SignatureScheme::Secp256k1] {
        let kp = MgoKeyPair::generate(scheme);
        let encoded = kp.encode_base64();
        let decoded = MgoKeyPair::decode_base64(&encoded).unwrap();
        assert_eq!(decoded.mgo_address(), kp.mgo_address());
        assert_eq!(decoded.scheme().flag(), scheme.flag());
    }
}

#[test]
fn keypair_from_hex_accepts_prefixed_and_bare() {
    let a = ed25519_keypair();
    let b = MgoKeyPair::from_secret_key_hex(
        SignatureScheme::ED25519,
        "a1fbf2c281a52d8655a2c793376490bc4f4bef6a1e89346e5d9a255ba4972236",
    )
    .unwrap();
    assert_eq!(a.mgo_address(), b.mgo_address());

    assert_eq!(
        MgoKeyPair::from_secret_key_hex(SignatureScheme::ED25519, "zz"),
        Err(MgoError::InvalidPrivateKey)
    );
}

#[test]
fn address_is_keccak_of_flag_and_pubkey() {
    let kp = ed25519_keypair();
    let pk = kp.public();

    let mut hasher = DefaultHash::default();
    hasher.update([pk.flag()]);
    hasher.update(pk.as_ref());
    let digest = hasher.finalize().digest;

    assert_eq!(kp.mgo_address().as_ref(), &digest[..32]);
}

#[test]
fn serialized_signature_layout() {
    let kp = ed25519_keypair();
    let sig = kp.sign_personal_message(b"hello world");
    let bytes = sig.as_ref();

    // flag || 64-byte signature || 32-byte pubkey
    assert_eq!(bytes.len(), 97);
    assert_eq!(bytes[0], SignatureScheme::ED25519.flag());

    let info = parse_serialized_signature(bytes).unwrap();
    assert_eq!(info.signature.len(), 64);
    assert_eq!(info.public_key, kp.public().as_ref());
    assert_eq!(signer_address(bytes).unwrap(), kp.mgo_address());
}

#[test]
fn personal_message_digest_uses_intent_and_uleb_prefix() {
    let kp = ed25519_keypair();
    let msg = b"hello world";
    let sig = kp.sign_personal_message(msg);

    // digest = keccak256((3, 0, 0) || uleb(11) || msg)
    let mut framed = vec![3u8, 0, 0];
    framed.push(msg.len() as u8);
    framed.extend_from_slice(msg);
    let digest = Keccak256::digest(&framed).digest;

    let info = parse_serialized_signature(sig.as_ref()).unwrap();
    let raw = Ed25519Signature::from_bytes(info.signature).unwrap();
    let pk = Ed25519PublicKey::from_bytes(info.public_key).unwrap();
    pk.verify(&digest, &raw).unwrap();
}

#[test]
fn personal_message_verifies_and_tampering_fails() {
    for scheme in [SignatureScheme::ED25519, SignatureScheme::Secp256k1] {
        let kp = MgoKeyPair::generate(scheme);
        let msg = b"hello world";
        let sig = kp.sign_personal_message(msg);
        verify_personal_message(msg, sig.as_ref()).unwrap();

        // Any flipped signature byte must flip the verdict.
        let mut corrupted = sig.as_ref().to_vec();
        corrupted[10] ^= 0x01;
        assert!(verify_personal_message(msg, &corrupted).is_err());

        // So must a different message.
        assert!(verify_personal_message(b"hello worlc", sig.as_ref()).is_err());
    }
}

#[test]
fn transaction_block_signing_round_trips() {
    let kp = ed25519_keypair();
    let tx_bytes = dummy_transaction_bytes(kp.mgo_address());

    let signed = kp.sign_transaction_block(&tx_bytes).unwrap();
    assert_eq!(signed.tx_bytes, tx_bytes);

    let raw_tx = Base64::decode(&tx_bytes).unwrap();
    let raw_sig = Base64::decode(&signed.signature).unwrap();
    verify_transaction_block(&raw_tx, &raw_sig).unwrap();

    // Tampering with the payload invalidates the signature.
    let mut other_tx = raw_tx.clone();
    let last = other_tx.len() - 1;
    other_tx[last] ^= 0x01;
    assert!(verify_transaction_block(&other_tx, &raw_sig).is_err());
}

#[test]
fn signature_scheme_dispatch_from_bytes() {
    let kp = MgoKeyPair::generate(SignatureScheme::Secp256k1);
    let sig = kp.sign_personal_message(b"abc");
    assert_eq!(sig.as_ref().len(), 98);
    assert_eq!(sig.as_ref()[0], 0x01);

    let parsed = Signature::from_bytes(sig.as_ref()).unwrap();
    assert_eq!(parsed.scheme(), SignatureScheme::Secp256k1);
    assert_eq!(parsed, sig);

    // Unknown flag byte.
    let mut bogus = sig.as_ref().to_vec();
    bogus[0] = 0x07;
    assert!(Signature::from_bytes(&bogus).is_err());
}

#[test]
fn new_secure_commits_to_the_intent_scope() {
    let kp = ed25519_keypair();
    let author = kp.mgo_address();
    let value = PersonalMessage {
        message: b"scoped".to_vec(),
    };

    let msg = IntentMessage::new(Intent::personal_message(), value.clone());
    let sig = Signature::new_secure(&msg, &kp);
    sig.verify_secure(&msg, author).unwrap();

    // Same value, different scope: must not verify.
    let wrong_scope = IntentMessage::new(Intent::mgo_transaction(), value);
    assert!(sig.verify_secure(&wrong_scope, author).is_err());
}
