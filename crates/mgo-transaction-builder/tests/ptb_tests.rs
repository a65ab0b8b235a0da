// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use fastcrypto::encoding::{Base64, Encoding};

use mgo_json_rpc_types::{
    ExecuteTransactionBlockRequest, ExecuteTransactionRequestType, MgoTransactionBlockResponse,
    MgoTransactionBlockResponseOptions,
};
use mgo_transaction_builder::{
    DataProvider, TransactionBuilder, TransactionBuilderError, DEFAULT_GAS_BUDGET,
};
use mgo_types::base_types::{MgoAddress, ObjectID, ObjectRef, SequenceNumber};
use mgo_types::crypto::{signer_address, verify_transaction_block, MgoKeyPair, SignatureScheme};
use mgo_types::digests::ObjectDigest;
use mgo_types::transaction::{
    Argument, CallArg, Command, ObjectArg, TransactionData, TransactionKind,
};

const SENDER: &str = "0x2d6e8c6068158916fc130036314e54dac83e72912a3f83dd3be5526569490204";
const RECEIVER: &str = "0x0cafa361487490f306c0b4c3e4cf0dc6fd584c5259ab1d5457d80a9e2170e238";

fn object_id(byte: u8) -> ObjectID {
    let mut bytes = [0u8; 32];
    bytes[31] = byte;
    ObjectID::new(bytes)
}

fn gas_payment() -> ObjectRef {
    (object_id(0xDC), SequenceNumber::from(5), ObjectDigest::random())
}

fn shared_object(id: ObjectID, mutable: bool) -> ObjectArg {
    ObjectArg::SharedObject {
        id,
        initial_shared_version: SequenceNumber::from(1),
        mutable,
    }
}

fn decode_envelope(b64: &str) -> TransactionData {
    mgo_sdbe::from_bytes(&Base64::decode(b64).unwrap()).unwrap()
}

#[test]
fn split_and_transfer_builds_two_commands() {
    let sender: MgoAddress = SENDER.parse().unwrap();
    let receiver: MgoAddress = RECEIVER.parse().unwrap();

    let mut tx = TransactionBuilder::new();
    tx.set_sender(sender)
        .set_gas_owner(sender)
        .set_gas_price(1000)
        .set_gas_budget(50_000_000)
        .set_gas_payment(vec![gas_payment()]);

    let amount = tx.pure(10_000_000u64).unwrap();
    let recipient = tx.pure(RECEIVER).unwrap();
    let split = tx.split_coins(tx.gas(), vec![amount]);
    tx.transfer_objects(vec![split], recipient);

    assert_eq!(amount, Argument::Input(0));
    assert_eq!(recipient, Argument::Input(1));
    assert_eq!(split, Argument::Result(0));

    // First input: the 8-byte little-endian amount.
    assert_eq!(
        tx.inputs()[0],
        CallArg::Pure(10_000_000u64.to_le_bytes().to_vec())
    );
    // Second input: the raw 32 address bytes, not an encoded string.
    assert_eq!(tx.inputs()[1], CallArg::Pure(receiver.to_vec()));

    let data = decode_envelope(&tx.build(false).unwrap());
    assert_eq!(data.sender(), sender);
    assert_eq!(data.gas_data().price, 1000);
    assert_eq!(data.gas_data().budget, 50_000_000);

    let TransactionKind::ProgrammableTransaction(pt) = data.kind() else {
        panic!("expected a programmable transaction");
    };
    assert_eq!(pt.commands.len(), 2);
    assert_eq!(
        pt.commands[0],
        Command::SplitCoins(Argument::GasCoin, vec![Argument::Input(0)])
    );
    assert_eq!(
        pt.commands[1],
        Command::TransferObjects(vec![Argument::Result(0)], Argument::Input(1))
    );
}

#[test]
fn encoding_is_deterministic() {
    let sender: MgoAddress = SENDER.parse().unwrap();
    let mut tx = TransactionBuilder::new();
    tx.set_sender(sender)
        .set_gas_owner(sender)
        .set_gas_price(1000)
        .set_gas_budget(50_000_000)
        .set_gas_payment(vec![(object_id(1), SequenceNumber::from(2), ObjectDigest::ZERO)]);
    let amount = tx.pure(1u64).unwrap();
    tx.split_coins(tx.gas(), vec![amount]);

    assert_eq!(tx.build(false).unwrap(), tx.build(false).unwrap());
    assert_eq!(tx.build(true).unwrap(), tx.build(true).unwrap());
}

#[test]
fn shared_object_inputs_deduplicate_and_upgrade_mutability() {
    let id = object_id(0x77);
    let mut tx = TransactionBuilder::new();

    let first = tx.object(shared_object(id, false)).unwrap();
    let second = tx.object(shared_object(id, true)).unwrap();
    let third = tx.object(shared_object(id, false)).unwrap();

    // One input only, all handles pointing at it.
    assert_eq!(first, Argument::Input(0));
    assert_eq!(second, Argument::Input(0));
    assert_eq!(third, Argument::Input(0));
    assert_eq!(tx.inputs().len(), 1);

    // The surviving input took the mutability upgrade and keeps it.
    assert_eq!(
        tx.inputs()[0],
        CallArg::Object(shared_object(id, true))
    );
}

#[test]
fn distinct_shared_objects_stay_distinct() {
    let mut tx = TransactionBuilder::new();
    tx.object(shared_object(object_id(1), false)).unwrap();
    tx.object(shared_object(object_id(2), true)).unwrap();
    assert_eq!(tx.inputs().len(), 2);
}

#[test]
fn owned_object_inputs_always_append() {
    let oref = (object_id(3), SequenceNumber::from(9), ObjectDigest::random());
    let mut tx = TransactionBuilder::new();
    tx.object(ObjectArg::ImmOrOwnedObject(oref)).unwrap();
    tx.object(ObjectArg::ImmOrOwnedObject(oref)).unwrap();
    assert_eq!(tx.inputs().len(), 2);
}

#[test]
fn object_accepts_the_three_documented_shapes() {
    let mut tx = TransactionBuilder::new();

    // An address string becomes an unresolved-object input.
    let unresolved = tx.object(SENDER).unwrap();
    assert_eq!(unresolved, Argument::Input(0));

    // An existing argument passes through.
    let handle = tx.object(Argument::Result(4)).unwrap();
    assert_eq!(handle, Argument::Result(4));

    // A non-object call argument is not acceptable.
    assert!(matches!(
        tx.object(CallArg::Pure(vec![1])),
        Err(TransactionBuilderError::ObjectNotSupportedType)
    ));
    // Nor is a string that is not an address.
    assert!(matches!(
        tx.object("not-an-address"),
        Err(TransactionBuilderError::ObjectNotSupportedType)
    ));
}

#[test]
fn pure_encodes_non_address_strings_as_strings() {
    let mut tx = TransactionBuilder::new();
    tx.pure("hello").unwrap();
    let expected = [&[5u8][..], b"hello"].concat();
    assert_eq!(tx.inputs()[0], CallArg::Pure(expected));
}

#[test]
fn unresolved_inputs_refuse_to_build() {
    let sender: MgoAddress = SENDER.parse().unwrap();
    let mut tx = TransactionBuilder::new();
    tx.set_sender(sender)
        .set_gas_owner(sender)
        .set_gas_price(1000)
        .set_gas_budget(50_000_000)
        .set_gas_payment(vec![gas_payment()]);
    tx.object(SENDER).unwrap();

    assert!(matches!(
        tx.build(false),
        Err(TransactionBuilderError::Encoding(_))
    ));
}

#[test]
fn build_validates_sender_and_gas_data() {
    let sender: MgoAddress = SENDER.parse().unwrap();

    let mut tx = TransactionBuilder::new();
    assert!(matches!(
        tx.build(false),
        Err(TransactionBuilderError::SenderNotSet)
    ));

    tx.set_sender(sender);
    assert!(matches!(
        tx.build(false),
        Err(TransactionBuilderError::GasDataNotAllSet)
    ));

    // Kind-only builds skip both checks.
    tx.build(true).unwrap();

    tx.set_gas_owner(sender)
        .set_gas_price(1000)
        .set_gas_budget(50_000_000)
        .set_gas_payment(vec![gas_payment()]);
    tx.build(false).unwrap();
}

struct StaticProvider {
    gas_price: u64,
}

#[async_trait]
impl DataProvider for StaticProvider {
    async fn get_reference_gas_price(&self) -> Result<u64, anyhow::Error> {
        Ok(self.gas_price)
    }

    async fn execute_transaction_block(
        &self,
        request: ExecuteTransactionBlockRequest,
    ) -> Result<MgoTransactionBlockResponse, anyhow::Error> {
        let mut response = MgoTransactionBlockResponse::default();
        response.raw_transaction = Some(request.tx_bytes);
        Ok(response)
    }
}

#[tokio::test]
async fn build_transaction_applies_defaults() {
    let keypair = MgoKeyPair::generate(SignatureScheme::ED25519);
    let signer_addr = keypair.mgo_address();

    let mut tx = TransactionBuilder::new();
    tx.set_client(Arc::new(StaticProvider { gas_price: 750 }))
        .set_signer(keypair)
        .set_gas_payment(vec![gas_payment()]);
    let amount = tx.pure(7u64).unwrap();
    tx.split_coins(tx.gas(), vec![amount]);

    let data = decode_envelope(&tx.build_transaction().await.unwrap());

    // Sender and gas owner fall back to the signer, the price comes from the
    // collaborator, the budget from the default.
    assert_eq!(data.sender(), signer_addr);
    assert_eq!(data.gas_data().owner, signer_addr);
    assert_eq!(data.gas_data().price, 750);
    assert_eq!(data.gas_data().budget, DEFAULT_GAS_BUDGET);
}

#[tokio::test]
async fn explicit_gas_price_skips_the_fetch() {
    let keypair = MgoKeyPair::generate(SignatureScheme::ED25519);
    let mut tx = TransactionBuilder::new();
    tx.set_client(Arc::new(StaticProvider { gas_price: 750 }))
        .set_signer(keypair)
        .set_gas_price(1000)
        .set_gas_payment(vec![gas_payment()]);

    let data = decode_envelope(&tx.build_transaction().await.unwrap());
    assert_eq!(data.gas_data().price, 1000);
}

#[tokio::test]
async fn missing_signer_and_client_are_reported() {
    let mut tx = TransactionBuilder::new();
    assert!(matches!(
        tx.build_transaction().await,
        Err(TransactionBuilderError::SignerNotSet)
    ));

    tx.set_signer(MgoKeyPair::generate(SignatureScheme::ED25519));
    assert!(matches!(
        tx.execute(
            MgoTransactionBlockResponseOptions::new(),
            ExecuteTransactionRequestType::WaitForLocalExecution,
        )
        .await,
        Err(TransactionBuilderError::ClientNotSet)
    ));
}

#[tokio::test]
async fn sponsored_requests_place_the_sponsor_signature_first() {
    let sender_kp = MgoKeyPair::generate(SignatureScheme::ED25519);
    let sponsor_kp = MgoKeyPair::generate(SignatureScheme::ED25519);
    let sender_addr = sender_kp.mgo_address();
    let sponsor_addr = sponsor_kp.mgo_address();

    // The author only shapes the kind subtree.
    let mut authored = TransactionBuilder::new();
    let oref = (object_id(0xC8), SequenceNumber::from(2), ObjectDigest::random());
    let object = authored.object(ObjectArg::ImmOrOwnedObject(oref)).unwrap();
    let recipient = authored.pure(sponsor_addr).unwrap();
    authored.transfer_objects(vec![object], recipient);
    let kind_bytes = authored.build(true).unwrap();

    // The sponsor attaches gas and both parties sign.
    let mut sponsored = authored.new_transaction_from_kind();
    assert_eq!(sponsored.build(true).unwrap(), kind_bytes);

    sponsored
        .set_signer(sender_kp)
        .set_sponsor_signer(sponsor_kp)
        .set_sender(sender_addr)
        .set_gas_owner(sponsor_addr)
        .set_gas_price(1000)
        .set_gas_budget(50_000_000)
        .set_gas_payment(vec![gas_payment()]);

    let request = sponsored
        .to_execute_request(
            MgoTransactionBlockResponseOptions::new().with_effects(),
            ExecuteTransactionRequestType::WaitForLocalExecution,
        )
        .await
        .unwrap();

    assert_eq!(request.signatures.len(), 2);
    let tx_bytes = Base64::decode(&request.tx_bytes).unwrap();

    let data: TransactionData = mgo_sdbe::from_bytes(&tx_bytes).unwrap();
    assert_eq!(data.sender(), sender_addr);
    assert_eq!(data.gas_data().owner, sponsor_addr);

    // Sponsor first, then sender; each is flag || signature || pubkey.
    let sponsor_sig = Base64::decode(&request.signatures[0]).unwrap();
    let sender_sig = Base64::decode(&request.signatures[1]).unwrap();
    assert_eq!(sponsor_sig.len(), 97);
    assert_eq!(sponsor_sig[0], SignatureScheme::ED25519.flag());
    assert_eq!(signer_address(&sponsor_sig).unwrap(), sponsor_addr);
    assert_eq!(signer_address(&sender_sig).unwrap(), sender_addr);
    verify_transaction_block(&tx_bytes, &sponsor_sig).unwrap();
    verify_transaction_block(&tx_bytes, &sender_sig).unwrap();
}

#[tokio::test]
async fn execute_round_trips_through_the_provider() {
    let keypair = MgoKeyPair::generate(SignatureScheme::ED25519);
    let mut tx = TransactionBuilder::new();
    tx.set_client(Arc::new(StaticProvider { gas_price: 1000 }))
        .set_signer(keypair)
        .set_gas_payment(vec![gas_payment()]);
    let amount = tx.pure(7u64).unwrap();
    tx.split_coins(tx.gas(), vec![amount]);

    let response = tx
        .execute(
            MgoTransactionBlockResponseOptions::full_content(),
            ExecuteTransactionRequestType::WaitForEffectsCert,
        )
        .await
        .unwrap();
    assert!(response.raw_transaction.is_some());
}
