// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Assembly of programmable transaction blocks: inputs, commands, gas
//! configuration, and the signing envelope that turns the canonical bytes
//! into a submit-ready request.

use std::sync::Arc;

use async_trait::async_trait;
use fastcrypto::encoding::{Base64, Encoding};
use serde::Serialize;
use tracing::debug;

use mgo_json_rpc_types::{
    ExecuteTransactionBlockRequest, ExecuteTransactionRequestType, MgoTransactionBlockResponse,
    MgoTransactionBlockResponseOptions,
};
use mgo_types::base_types::{MgoAddress, ObjectID, ObjectRef};
use mgo_types::transaction::{
    Argument, CallArg, Command, GasData, ObjectArg, ProgrammableMoveCall, ProgrammableTransaction,
    TransactionData, TransactionExpiration, TransactionKind, UnresolvedObject,
};
use mgo_types::type_tag::TypeTag;
use mgo_types::crypto::MgoKeyPair;

pub mod error;
pub mod serialized;

pub use error::{TransactionBuilderError, TransactionBuilderResult};

/// Budget applied by `build_transaction` when the caller never set one.
pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;

/// The RPC collaborator the builder leans on: fetching the reference gas
/// price before building, and submitting the finished request.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn get_reference_gas_price(&self) -> Result<u64, anyhow::Error>;

    async fn execute_transaction_block(
        &self,
        request: ExecuteTransactionBlockRequest,
    ) -> Result<MgoTransactionBlockResponse, anyhow::Error>;
}

/// Gas parameters while they are being collected. Building the full
/// envelope requires all four to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GasConfig {
    pub payment: Option<Vec<ObjectRef>>,
    pub owner: Option<MgoAddress>,
    pub price: Option<u64>,
    pub budget: Option<u64>,
}

impl GasConfig {
    pub fn is_all_set(&self) -> bool {
        self.payment.is_some()
            && self.owner.is_some()
            && self.price.is_some()
            && self.budget.is_some()
    }
}

/// Accepted shapes for [`TransactionBuilder::object`].
pub enum ObjectInput {
    /// An object known only by id; recorded as an unresolved input.
    Id(String),
    /// An existing handle, passed through untouched.
    Argument(Argument),
    /// A fully resolved object input.
    CallArg(CallArg),
}

impl From<&str> for ObjectInput {
    fn from(id: &str) -> Self {
        ObjectInput::Id(id.to_owned())
    }
}

impl From<String> for ObjectInput {
    fn from(id: String) -> Self {
        ObjectInput::Id(id)
    }
}

impl From<Argument> for ObjectInput {
    fn from(argument: Argument) -> Self {
        ObjectInput::Argument(argument)
    }
}

impl From<CallArg> for ObjectInput {
    fn from(call_arg: CallArg) -> Self {
        ObjectInput::CallArg(call_arg)
    }
}

impl From<ObjectArg> for ObjectInput {
    fn from(object_arg: ObjectArg) -> Self {
        ObjectInput::CallArg(CallArg::Object(object_arg))
    }
}

/// Builder for one programmable transaction block.
///
/// Inputs and commands are appended in program order and never renumbered;
/// the `Argument` handles returned along the way stay valid for the life of
/// the builder. One builder represents one in-flight transaction and is not
/// meant to be shared across threads.
pub struct TransactionBuilder {
    transaction: ProgrammableTransaction,
    sender: Option<MgoAddress>,
    gas: GasConfig,
    expiration: Option<TransactionExpiration>,
    signer: Option<MgoKeyPair>,
    sponsor: Option<MgoKeyPair>,
    client: Option<Arc<dyn DataProvider>>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self {
            transaction: ProgrammableTransaction::default(),
            sender: None,
            gas: GasConfig::default(),
            expiration: None,
            signer: None,
            sponsor: None,
            client: None,
        }
    }

    //
    // Configuration
    //

    pub fn set_client(&mut self, client: Arc<dyn DataProvider>) -> &mut Self {
        self.client = Some(client);
        self
    }

    pub fn set_signer(&mut self, signer: MgoKeyPair) -> &mut Self {
        self.signer = Some(signer);
        self
    }

    /// The sponsor pays for gas and signs first in the submitted envelope.
    pub fn set_sponsor_signer(&mut self, sponsor: MgoKeyPair) -> &mut Self {
        self.sponsor = Some(sponsor);
        self
    }

    pub fn set_sender(&mut self, sender: MgoAddress) -> &mut Self {
        self.sender = Some(sender);
        self
    }

    pub fn set_sender_if_not_set(&mut self, sender: MgoAddress) -> &mut Self {
        if self.sender.is_none() {
            self.sender = Some(sender);
        }
        self
    }

    pub fn set_expiration(&mut self, expiration: TransactionExpiration) -> &mut Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn set_gas_payment(&mut self, payment: Vec<ObjectRef>) -> &mut Self {
        self.gas.payment = Some(payment);
        self
    }

    pub fn set_gas_owner(&mut self, owner: MgoAddress) -> &mut Self {
        self.gas.owner = Some(owner);
        self
    }

    pub fn set_gas_price(&mut self, price: u64) -> &mut Self {
        self.gas.price = Some(price);
        self
    }

    pub fn set_gas_budget(&mut self, budget: u64) -> &mut Self {
        self.gas.budget = Some(budget);
        self
    }

    pub fn set_gas_budget_if_not_set(&mut self, budget: u64) -> &mut Self {
        if self.gas.budget.is_none() {
            self.gas.budget = Some(budget);
        }
        self
    }

    //
    // Inspection
    //

    pub fn sender(&self) -> Option<MgoAddress> {
        self.sender
    }

    pub fn gas_config(&self) -> &GasConfig {
        &self.gas
    }

    pub fn expiration(&self) -> Option<&TransactionExpiration> {
        self.expiration.as_ref()
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.transaction.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.transaction.commands
    }

    //
    // Inputs and commands
    //

    /// The gas coin handle.
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// Add a pure input. A string that parses as an address is stored as its
    /// 32 raw bytes; every other value is stored as its SDBE encoding.
    pub fn pure<T: Serialize>(&mut self, value: T) -> TransactionBuilderResult<Argument> {
        if let Ok(serde_json::Value::String(s)) = serde_json::to_value(&value) {
            if let Ok(address) = s.parse::<MgoAddress>() {
                return Ok(self.transaction.add_input(CallArg::Pure(address.to_vec())));
            }
        }
        let bytes = mgo_sdbe::to_bytes(&value)?;
        Ok(self.transaction.add_input(CallArg::Pure(bytes)))
    }

    /// Add an object input.
    ///
    /// Shared objects are deduplicated by id: a second reference to an
    /// already-added shared object returns the existing input handle, and a
    /// mutable reference upgrades the stored input to mutable. Owned and
    /// receiving references always append a fresh input.
    pub fn object(&mut self, input: impl Into<ObjectInput>) -> TransactionBuilderResult<Argument> {
        match input.into() {
            ObjectInput::Id(id) => {
                let object_id: ObjectID = id
                    .parse()
                    .map_err(|_| TransactionBuilderError::ObjectNotSupportedType)?;
                Ok(self
                    .transaction
                    .add_input(CallArg::UnresolvedObject(UnresolvedObject { object_id })))
            }
            ObjectInput::Argument(argument) => Ok(argument),
            ObjectInput::CallArg(CallArg::Object(object_arg)) => {
                if let ObjectArg::SharedObject { id, mutable, .. } = object_arg {
                    if let Some(index) = self.transaction.input_index_of_object(id) {
                        if mutable {
                            if let Some(CallArg::Object(ObjectArg::SharedObject {
                                mutable: existing,
                                ..
                            })) = self.transaction.inputs.get_mut(index as usize)
                            {
                                *existing = true;
                            }
                        }
                        return Ok(Argument::Input(index));
                    }
                }
                Ok(self.transaction.add_input(CallArg::Object(object_arg)))
            }
            ObjectInput::CallArg(_) => Err(TransactionBuilderError::ObjectNotSupportedType),
        }
    }

    /// Append a command. The returned handle names all outputs of the
    /// command; a single output is addressed with `Argument::NestedResult`.
    pub fn add(&mut self, command: Command) -> Argument {
        Argument::Result(self.transaction.add_command(command))
    }

    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Argument {
        self.add(Command::SplitCoins(coin, amounts))
    }

    pub fn merge_coins(&mut self, destination: Argument, sources: Vec<Argument>) -> Argument {
        self.add(Command::MergeCoins(destination, sources))
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, address: Argument) -> Argument {
        self.add(Command::TransferObjects(objects, address))
    }

    pub fn publish(&mut self, modules: Vec<ObjectID>, dependencies: Vec<ObjectID>) -> Argument {
        self.add(Command::Publish(modules, dependencies))
    }

    pub fn upgrade(
        &mut self,
        modules: Vec<ObjectID>,
        dependencies: Vec<ObjectID>,
        package: ObjectID,
        ticket: Argument,
    ) -> Argument {
        self.add(Command::Upgrade(modules, dependencies, package, ticket))
    }

    pub fn make_move_vec(
        &mut self,
        element_type: Option<TypeTag>,
        elements: Vec<Argument>,
    ) -> Argument {
        self.add(Command::MakeMoveVec(element_type, elements))
    }

    pub fn move_call(
        &mut self,
        package: ObjectID,
        module: impl Into<String>,
        function: impl Into<String>,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Argument {
        self.add(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package,
            module: module.into(),
            function: function.into(),
            type_arguments,
            arguments,
        })))
    }

    //
    // Building and submission
    //

    /// Encode to canonical bytes, base64 encoded.
    ///
    /// With `only_transaction_kind` the output is the SDBE of the
    /// transaction-kind union alone; otherwise a present sender and fully
    /// set gas data are required and the output is the full envelope.
    pub fn build(&self, only_transaction_kind: bool) -> TransactionBuilderResult<String> {
        let kind = TransactionKind::ProgrammableTransaction(self.transaction.clone());
        if only_transaction_kind {
            return Ok(Base64::encode(mgo_sdbe::to_bytes(&kind)?));
        }

        let sender = self.sender.ok_or(TransactionBuilderError::SenderNotSet)?;
        let owner = self
            .gas
            .owner
            .or_else(|| self.signer.as_ref().map(|signer| signer.mgo_address()));
        let (Some(payment), Some(owner), Some(price), Some(budget)) =
            (self.gas.payment.clone(), owner, self.gas.price, self.gas.budget)
        else {
            return Err(TransactionBuilderError::GasDataNotAllSet);
        };

        let data = TransactionData::new_v1(
            kind,
            sender,
            GasData {
                payment,
                owner,
                price,
                budget,
            },
            self.expiration,
        );
        Ok(Base64::encode(mgo_sdbe::to_bytes(&data)?))
    }

    /// Apply the remaining defaults, fetching the reference gas price from
    /// the client when no price was set, then build the full envelope.
    pub async fn build_transaction(&mut self) -> TransactionBuilderResult<String> {
        let signer_address = self
            .signer
            .as_ref()
            .map(|signer| signer.mgo_address())
            .ok_or(TransactionBuilderError::SignerNotSet)?;

        if self.gas.price.is_none() {
            if let Some(client) = &self.client {
                let price = client
                    .get_reference_gas_price()
                    .await
                    .map_err(TransactionBuilderError::Rpc)?;
                debug!(price, "using reference gas price");
                self.set_gas_price(price);
            }
        }
        self.set_gas_budget_if_not_set(DEFAULT_GAS_BUDGET);
        self.set_sender_if_not_set(signer_address);

        self.build(false)
    }

    /// Build and sign, producing the submit-request payload. When a sponsor
    /// signer is present its signature is placed first, then the sender's.
    pub async fn to_execute_request(
        &mut self,
        options: MgoTransactionBlockResponseOptions,
        request_type: ExecuteTransactionRequestType,
    ) -> TransactionBuilderResult<ExecuteTransactionBlockRequest> {
        if self.signer.is_none() {
            return Err(TransactionBuilderError::SignerNotSet);
        }
        let tx_bytes = self.build_transaction().await?;

        let mut signatures = Vec::new();
        if let Some(sponsor) = &self.sponsor {
            signatures.push(sponsor.sign_transaction_block(&tx_bytes)?.signature);
        }
        let signer = self.signer.as_ref().ok_or(TransactionBuilderError::SignerNotSet)?;
        signatures.push(signer.sign_transaction_block(&tx_bytes)?.signature);

        Ok(ExecuteTransactionBlockRequest {
            tx_bytes,
            signatures,
            options,
            request_type,
        })
    }

    /// Submit through the RPC collaborator.
    pub async fn execute(
        &mut self,
        options: MgoTransactionBlockResponseOptions,
        request_type: ExecuteTransactionRequestType,
    ) -> TransactionBuilderResult<MgoTransactionBlockResponse> {
        let client = self
            .client
            .clone()
            .ok_or(TransactionBuilderError::ClientNotSet)?;
        let request = self.to_execute_request(options, request_type).await?;
        client
            .execute_transaction_block(request)
            .await
            .map_err(TransactionBuilderError::Rpc)
    }

    /// Deep-copy the kind subtree into a fresh builder. Used to separate
    /// authoring from sponsoring: the author builds the kind, the sponsor
    /// attaches gas and signatures.
    pub fn new_transaction_from_kind(&self) -> TransactionBuilder {
        TransactionBuilder {
            transaction: self.transaction.clone(),
            ..TransactionBuilder::new()
        }
    }
}
