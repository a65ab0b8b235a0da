// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::base_types::{MgoAddress, ObjectID, ObjectRef, SequenceNumber};
use crate::type_tag::TypeTag;

#[cfg(test)]
#[path = "unit_tests/transaction_tests.rs"]
mod transaction_tests;

pub type EpochId = u64;

/// An input value for a programmable transaction.
///
/// Variant order fixes the wire discriminants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// Opaque SDBE bytes of a Move value.
    Pure(Vec<u8>),
    /// An object reference.
    Object(ObjectArg),
    /// A deferred value awaiting encoding; carried in the JSON projection
    /// but not encodable to the wire.
    UnresolvedPure(UnresolvedPure),
    /// An object known only by id; version and digest to be filled later.
    UnresolvedObject(UnresolvedObject),
}

impl CallArg {
    /// The object id referenced by this input, when it is an object input.
    pub fn object_id(&self) -> Option<ObjectID> {
        match self {
            CallArg::Object(object_arg) => Some(object_arg.id()),
            CallArg::UnresolvedObject(unresolved) => Some(unresolved.object_id),
            CallArg::Pure(_) | CallArg::UnresolvedPure(_) => None,
        }
    }
}

/// A deferred pure value: the original JSON is preserved untouched until
/// something resolves it. Refuses binary encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedPure {
    pub value: serde_json::Value,
}

impl Serialize for UnresolvedPure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            self.value.serialize(serializer)
        } else {
            Err(serde::ser::Error::custom(
                "unresolved pure call argument cannot be encoded",
            ))
        }
    }
}

impl<'de> Deserialize<'de> for UnresolvedPure {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            Ok(UnresolvedPure {
                value: serde_json::Value::deserialize(deserializer)?,
            })
        } else {
            Err(serde::de::Error::custom(
                "unresolved pure call argument cannot be decoded",
            ))
        }
    }
}

/// An object input that still needs its version and digest resolved.
/// Refuses binary encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedObject {
    pub object_id: ObjectID,
}

impl Serialize for UnresolvedObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let mut s = serializer.serialize_struct("UnresolvedObject", 1)?;
            s.serialize_field("objectId", &self.object_id)?;
            s.end()
        } else {
            Err(serde::ser::Error::custom(
                "unresolved object call argument cannot be encoded",
            ))
        }
    }
}

impl<'de> Deserialize<'de> for UnresolvedObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            #[derive(Deserialize)]
            #[serde(rename_all = "camelCase")]
            struct Raw {
                object_id: ObjectID,
            }
            let raw = Raw::deserialize(deserializer)?;
            Ok(UnresolvedObject {
                object_id: raw.object_id,
            })
        } else {
            Err(serde::de::Error::custom(
                "unresolved object call argument cannot be decoded",
            ))
        }
    }
}

/// The three ways an object can enter a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    /// A Move object, either immutable or owned by the sender.
    ImmOrOwnedObject(ObjectRef),
    /// A Move object whose state is shared between transactions. When two
    /// references to the same shared object are added to one transaction,
    /// the merged input is mutable if any contributor asked for mutability.
    SharedObject {
        id: ObjectID,
        initial_shared_version: SequenceNumber,
        mutable: bool,
    },
    /// An object passed by a reference granting the callee the right to
    /// take it.
    Receiving(ObjectRef),
}

impl ObjectArg {
    pub fn id(&self) -> ObjectID {
        match self {
            ObjectArg::ImmOrOwnedObject((id, _, _)) | ObjectArg::Receiving((id, _, _)) => *id,
            ObjectArg::SharedObject { id, .. } => *id,
        }
    }
}

/// A handle to a value inside a programmable transaction: the gas coin, an
/// input by index, or the output(s) of an earlier command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    /// The gas coin. Only usable by-reference except with TransferObjects.
    GasCoin,
    /// One of the transaction inputs, by index.
    Input(u16),
    /// The (whole) result of an earlier command, by command index.
    Result(u16),
    /// One output of an earlier command that returned multiple values.
    NestedResult(u16, u16),
}

/// A single command in a programmable transaction.
///
/// Variant order fixes the wire discriminants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Call a Move entry function.
    MoveCall(Box<ProgrammableMoveCall>),
    /// Send objects to an address given as an argument.
    TransferObjects(Vec<Argument>, Argument),
    /// Split amounts off a coin; results are the new coins.
    SplitCoins(Argument, Vec<Argument>),
    /// Merge source coins into the destination coin.
    MergeCoins(Argument, Vec<Argument>),
    /// Publish modules with the given dependencies.
    Publish(Vec<ObjectID>, Vec<ObjectID>),
    /// Build a Move vector from elements, with an optional element type
    /// required when the vector is empty.
    MakeMoveVec(Option<TypeTag>, Vec<Argument>),
    /// Upgrade a package, authorized by an upgrade ticket.
    Upgrade(Vec<ObjectID>, Vec<ObjectID>, ObjectID, Argument),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableMoveCall {
    /// The package containing the module and function.
    pub package: ObjectID,
    pub module: String,
    pub function: String,
    /// Type arguments to the function.
    pub type_arguments: Vec<TypeTag>,
    /// Arguments to the function.
    pub arguments: Vec<Argument>,
}

/// The ordered inputs and commands of a programmable transaction block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl ProgrammableTransaction {
    /// Append an input; the returned handle stays valid for the lifetime of
    /// the transaction, inputs are never renumbered.
    pub fn add_input(&mut self, input: CallArg) -> Argument {
        let index = self.inputs.len() as u16;
        self.inputs.push(input);
        Argument::Input(index)
    }

    /// Append a command, returning its index.
    pub fn add_command(&mut self, command: Command) -> u16 {
        let index = self.commands.len() as u16;
        self.commands.push(command);
        index
    }

    /// Find the input holding the given object id, scanning object inputs
    /// only.
    pub fn input_index_of_object(&self, id: ObjectID) -> Option<u16> {
        self.inputs.iter().position(|input| match input {
            CallArg::Object(object_arg) => object_arg.id() == id,
            _ => false,
        })
        .map(|index| index as u16)
    }
}

/// The kinds of transaction the chain executes. The builder only produces
/// the programmable variant; the remaining positions are system
/// transactions reserved for the validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
    ChangeEpoch,
    Genesis,
    ConsensusCommitPrologue,
}

impl TransactionKind {
    pub fn as_programmable(&self) -> Option<&ProgrammableTransaction> {
        match self {
            TransactionKind::ProgrammableTransaction(pt) => Some(pt),
            _ => None,
        }
    }
}

/// Gas parameters, fully resolved. The builder stages these as optional
/// values and only assembles this form once all four are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: MgoAddress,
    pub price: u64,
    pub budget: u64,
}

/// When a transaction stops being executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionExpiration {
    /// The transaction has no expiration.
    None,
    /// Valid until (and excluding) consensus of the given epoch.
    Epoch(EpochId),
}

/// The versioned transaction-data envelope. V1 occupies discriminant 0;
/// further positions are reserved for future versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: MgoAddress,
    pub gas_data: GasData,
    pub expiration: Option<TransactionExpiration>,
}

impl TransactionData {
    pub fn new_v1(
        kind: TransactionKind,
        sender: MgoAddress,
        gas_data: GasData,
        expiration: Option<TransactionExpiration>,
    ) -> Self {
        TransactionData::V1(TransactionDataV1 {
            kind,
            sender,
            gas_data,
            expiration,
        })
    }

    pub fn kind(&self) -> &TransactionKind {
        let TransactionData::V1(v1) = self;
        &v1.kind
    }

    pub fn sender(&self) -> MgoAddress {
        let TransactionData::V1(v1) = self;
        v1.sender
    }

    pub fn gas_data(&self) -> &GasData {
        let TransactionData::V1(v1) = self;
        &v1.gas_data
    }

    pub fn expiration(&self) -> Option<&TransactionExpiration> {
        let TransactionData::V1(v1) = self;
        v1.expiration.as_ref()
    }
}

/// A transaction envelope carrying the signatures that authorize it. For a
/// sponsored transaction the sponsor signature comes first, then the
/// sender's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction_data: TransactionData,
    pub tx_signatures: Vec<Vec<u8>>,
}
