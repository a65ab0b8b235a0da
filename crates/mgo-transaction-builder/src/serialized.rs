// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

//! The stable JSON projection of a transaction block, used for interchange
//! and offline signing flows. Reconstructing a builder from this schema and
//! re-encoding must reproduce the same canonical bytes for the kind subtree;
//! gas payment entries only carry object ids, so their version and digest
//! default on the way back in.

use fastcrypto::encoding::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use mgo_types::base_types::{ObjectID, SequenceNumber};
use mgo_types::digests::ObjectDigest;
use mgo_types::transaction::{
    Argument, CallArg, Command, ObjectArg, ProgrammableMoveCall, TransactionExpiration,
    UnresolvedObject, UnresolvedPure,
};
use mgo_types::type_tag::TypeTag;

use crate::{TransactionBuilder, TransactionBuilderError, TransactionBuilderResult};

pub const SERIALIZED_TRANSACTION_DATA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTransactionData {
    pub version: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expiration: Option<Value>,
    pub gas_config: SerializedGasConfig,
    #[serde(default)]
    pub inputs: Vec<SerializedInput>,
    #[serde(default)]
    pub transactions: Vec<SerializedTransaction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerializedGasConfig {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<String>,
    /// Decimal string.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub budget: Option<String>,
    /// Decimal string.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub price: Option<String>,
    /// Object id strings only; version and digest are not carried.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedInput {
    /// Always `"Input"`.
    pub kind: String,
    pub index: u16,
    pub value: Value,
    /// `"pure"` or `"object"`.
    #[serde(rename = "type")]
    pub input_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SerializedTransaction {
    MoveCall {
        /// `<package>::<module>::<function>`.
        target: String,
        #[serde(rename = "typeArguments", default)]
        type_arguments: Vec<String>,
        #[serde(default)]
        arguments: Vec<SerializedArgument>,
    },
    TransferObjects {
        objects: Vec<SerializedArgument>,
        address: SerializedArgument,
    },
    SplitCoins {
        coin: SerializedArgument,
        amounts: Vec<SerializedArgument>,
    },
    MergeCoins {
        destination: SerializedArgument,
        sources: Vec<SerializedArgument>,
    },
    Publish {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<String>,
    },
    MakeMoveVec {
        #[serde(rename = "type")]
        element_type: SerializedTypeOption,
        objects: Vec<SerializedArgument>,
    },
    Upgrade {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<String>,
        #[serde(rename = "packageId")]
        package_id: String,
        ticket: SerializedArgument,
    },
}

/// `{"Some": "<type string>"}` or `{"None": true}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SerializedTypeOption {
    Some(String),
    None(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SerializedArgument {
    GasCoin,
    Input {
        index: u16,
    },
    Result {
        index: u16,
    },
    NestedResult {
        index: u16,
        #[serde(rename = "resultIndex")]
        result_index: u16,
    },
}

impl From<&Argument> for SerializedArgument {
    fn from(argument: &Argument) -> Self {
        match argument {
            Argument::GasCoin => SerializedArgument::GasCoin,
            Argument::Input(index) => SerializedArgument::Input { index: *index },
            Argument::Result(index) => SerializedArgument::Result { index: *index },
            Argument::NestedResult(index, result_index) => SerializedArgument::NestedResult {
                index: *index,
                result_index: *result_index,
            },
        }
    }
}

impl From<&SerializedArgument> for Argument {
    fn from(argument: &SerializedArgument) -> Self {
        match argument {
            SerializedArgument::GasCoin => Argument::GasCoin,
            SerializedArgument::Input { index } => Argument::Input(*index),
            SerializedArgument::Result { index } => Argument::Result(*index),
            SerializedArgument::NestedResult {
                index,
                result_index,
            } => Argument::NestedResult(*index, *result_index),
        }
    }
}

fn serialize_arguments(arguments: &[Argument]) -> Vec<SerializedArgument> {
    arguments.iter().map(SerializedArgument::from).collect()
}

fn parse_arguments(arguments: &[SerializedArgument]) -> Vec<Argument> {
    arguments.iter().map(Argument::from).collect()
}

fn project_input(index: u16, input: &CallArg) -> SerializedInput {
    let (input_type, value) = match input {
        CallArg::Pure(bytes) => ("pure", json!({ "Pure": Base64::encode(bytes) })),
        CallArg::Object(ObjectArg::ImmOrOwnedObject((id, version, digest))) => (
            "object",
            json!({ "Object": { "ImmOrOwned": {
                "objectId": id.to_string(),
                "version": version.value(),
                "digest": digest.to_string(),
            }}}),
        ),
        CallArg::Object(ObjectArg::Receiving((id, version, digest))) => (
            "object",
            json!({ "Object": { "Receiving": {
                "objectId": id.to_string(),
                "version": version.value(),
                "digest": digest.to_string(),
            }}}),
        ),
        CallArg::Object(ObjectArg::SharedObject {
            id,
            initial_shared_version,
            mutable,
        }) => (
            "object",
            json!({ "Object": { "Shared": {
                "objectId": id.to_string(),
                "initialSharedVersion": initial_shared_version.value(),
                "mutable": mutable,
            }}}),
        ),
        CallArg::UnresolvedPure(unresolved) => ("pure", unresolved.value.clone()),
        CallArg::UnresolvedObject(unresolved) => (
            "object",
            json!({ "UnresolvedObject": { "objectId": unresolved.object_id.to_string() } }),
        ),
    };
    SerializedInput {
        kind: "Input".to_owned(),
        index,
        value,
        input_type: input_type.to_owned(),
    }
}

fn parse_object_ref(value: &Value) -> TransactionBuilderResult<(ObjectID, SequenceNumber, ObjectDigest)> {
    let id: ObjectID = value
        .get("objectId")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("object input is missing objectId"))?
        .parse()
        .map_err(|_| TransactionBuilderError::InvalidObjectId)?;
    let version = value.get("version").and_then(Value::as_u64).unwrap_or(0);
    let digest = value
        .get("digest")
        .and_then(Value::as_str)
        .and_then(|digest| digest.parse().ok())
        .unwrap_or(ObjectDigest::ZERO);
    Ok((id, SequenceNumber::from(version), digest))
}

fn parse_input(input: &SerializedInput) -> TransactionBuilderResult<CallArg> {
    match input.input_type.as_str() {
        "object" => {
            if let Some(object) = input.value.get("Object") {
                if let Some(imm_or_owned) = object.get("ImmOrOwned") {
                    return Ok(CallArg::Object(ObjectArg::ImmOrOwnedObject(
                        parse_object_ref(imm_or_owned)?,
                    )));
                }
                if let Some(receiving) = object.get("Receiving") {
                    return Ok(CallArg::Object(ObjectArg::Receiving(parse_object_ref(
                        receiving,
                    )?)));
                }
                if let Some(shared) = object.get("Shared") {
                    let id: ObjectID = shared
                        .get("objectId")
                        .and_then(Value::as_str)
                        .ok_or_else(|| malformed("shared object input is missing objectId"))?
                        .parse()
                        .map_err(|_| TransactionBuilderError::InvalidObjectId)?;
                    let initial_shared_version =
                        shared.get("initialSharedVersion").and_then(Value::as_u64).unwrap_or(0);
                    let mutable = shared.get("mutable").and_then(Value::as_bool).unwrap_or(false);
                    return Ok(CallArg::Object(ObjectArg::SharedObject {
                        id,
                        initial_shared_version: SequenceNumber::from(initial_shared_version),
                        mutable,
                    }));
                }
                return Err(malformed("unknown object input shape"));
            }
            if let Some(unresolved) = input.value.get("UnresolvedObject") {
                let object_id: ObjectID = unresolved
                    .get("objectId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed("unresolved object input is missing objectId"))?
                    .parse()
                    .map_err(|_| TransactionBuilderError::InvalidObjectId)?;
                return Ok(CallArg::UnresolvedObject(UnresolvedObject { object_id }));
            }
            Err(malformed("unknown object input shape"))
        }
        "pure" => match input.value.get("Pure") {
            Some(Value::String(encoded)) => {
                let bytes = Base64::decode(encoded)
                    .map_err(|_| malformed("pure input is not valid base64"))?;
                Ok(CallArg::Pure(bytes))
            }
            // Legacy form: an array of byte values.
            Some(Value::Array(numbers)) => {
                let bytes = numbers
                    .iter()
                    .map(|n| {
                        n.as_u64()
                            .and_then(|n| u8::try_from(n).ok())
                            .ok_or_else(|| malformed("pure input byte is out of range"))
                    })
                    .collect::<TransactionBuilderResult<Vec<u8>>>()?;
                Ok(CallArg::Pure(bytes))
            }
            _ => Ok(CallArg::UnresolvedPure(UnresolvedPure {
                value: input.value.clone(),
            })),
        },
        other => Err(malformed(&format!("unknown input type {other:?}"))),
    }
}

fn project_command(command: &Command) -> SerializedTransaction {
    match command {
        Command::MoveCall(call) => SerializedTransaction::MoveCall {
            target: format!("{}::{}::{}", call.package, call.module, call.function),
            type_arguments: call.type_arguments.iter().map(ToString::to_string).collect(),
            arguments: serialize_arguments(&call.arguments),
        },
        Command::TransferObjects(objects, address) => SerializedTransaction::TransferObjects {
            objects: serialize_arguments(objects),
            address: address.into(),
        },
        Command::SplitCoins(coin, amounts) => SerializedTransaction::SplitCoins {
            coin: coin.into(),
            amounts: serialize_arguments(amounts),
        },
        Command::MergeCoins(destination, sources) => SerializedTransaction::MergeCoins {
            destination: destination.into(),
            sources: serialize_arguments(sources),
        },
        Command::Publish(modules, dependencies) => SerializedTransaction::Publish {
            modules: modules.iter().map(|module| module.to_vec()).collect(),
            dependencies: dependencies.iter().map(ToString::to_string).collect(),
        },
        Command::MakeMoveVec(element_type, elements) => SerializedTransaction::MakeMoveVec {
            element_type: match element_type {
                Some(tag) => SerializedTypeOption::Some(tag.to_string()),
                None => SerializedTypeOption::None(true),
            },
            objects: serialize_arguments(elements),
        },
        Command::Upgrade(modules, dependencies, package, ticket) => SerializedTransaction::Upgrade {
            modules: modules.iter().map(|module| module.to_vec()).collect(),
            dependencies: dependencies.iter().map(ToString::to_string).collect(),
            package_id: package.to_string(),
            ticket: ticket.into(),
        },
    }
}

fn parse_module_blobs(modules: &[Vec<u8>]) -> TransactionBuilderResult<Vec<ObjectID>> {
    modules
        .iter()
        .map(|module| {
            ObjectID::try_from(module.as_slice())
                .map_err(|_| TransactionBuilderError::InvalidObjectId)
        })
        .collect()
}

fn parse_id_strings(ids: &[String]) -> TransactionBuilderResult<Vec<ObjectID>> {
    ids.iter()
        .map(|id| {
            id.parse::<ObjectID>()
                .map_err(|_| TransactionBuilderError::InvalidObjectId)
        })
        .collect()
}

fn parse_type_tags(tags: &[String]) -> TransactionBuilderResult<Vec<TypeTag>> {
    tags.iter()
        .map(|tag| tag.parse::<TypeTag>().map_err(TransactionBuilderError::Types))
        .collect()
}

fn parse_command(transaction: &SerializedTransaction) -> TransactionBuilderResult<Command> {
    Ok(match transaction {
        SerializedTransaction::MoveCall {
            target,
            type_arguments,
            arguments,
        } => {
            let parts: Vec<&str> = target.split("::").collect();
            let &[package, module, function] = parts.as_slice() else {
                return Err(malformed(&format!("invalid target format {target:?}")));
            };
            Command::MoveCall(Box::new(ProgrammableMoveCall {
                package: package
                    .parse()
                    .map_err(|_| TransactionBuilderError::InvalidAddress)?,
                module: module.to_owned(),
                function: function.to_owned(),
                type_arguments: parse_type_tags(type_arguments)?,
                arguments: parse_arguments(arguments),
            }))
        }
        SerializedTransaction::TransferObjects { objects, address } => {
            Command::TransferObjects(parse_arguments(objects), address.into())
        }
        SerializedTransaction::SplitCoins { coin, amounts } => {
            Command::SplitCoins(coin.into(), parse_arguments(amounts))
        }
        SerializedTransaction::MergeCoins {
            destination,
            sources,
        } => Command::MergeCoins(destination.into(), parse_arguments(sources)),
        SerializedTransaction::Publish {
            modules,
            dependencies,
        } => Command::Publish(parse_module_blobs(modules)?, parse_id_strings(dependencies)?),
        SerializedTransaction::MakeMoveVec {
            element_type,
            objects,
        } => Command::MakeMoveVec(
            match element_type {
                SerializedTypeOption::Some(tag) => {
                    Some(tag.parse::<TypeTag>().map_err(TransactionBuilderError::Types)?)
                }
                SerializedTypeOption::None(_) => None,
            },
            parse_arguments(objects),
        ),
        SerializedTransaction::Upgrade {
            modules,
            dependencies,
            package_id,
            ticket,
        } => Command::Upgrade(
            parse_module_blobs(modules)?,
            parse_id_strings(dependencies)?,
            package_id
                .parse()
                .map_err(|_| TransactionBuilderError::InvalidObjectId)?,
            ticket.into(),
        ),
    })
}

fn malformed(message: &str) -> TransactionBuilderError {
    TransactionBuilderError::MalformedSerializedTransaction(message.to_owned())
}

impl TransactionBuilder {
    /// Project the staged transaction into the stable JSON schema.
    pub fn to_serialized(&self) -> SerializedTransactionData {
        let gas_config = SerializedGasConfig {
            owner: self.gas.owner.map(|owner| owner.to_string()),
            budget: self.gas.budget.map(|budget| budget.to_string()),
            price: self.gas.price.map(|price| price.to_string()),
            payment: self.gas.payment.as_ref().map(|payment| {
                payment.iter().map(|(id, _, _)| id.to_string()).collect()
            }),
        };

        let expiration = self.expiration.as_ref().map(|expiration| match expiration {
            TransactionExpiration::Epoch(epoch) => json!({ "Epoch": epoch }),
            TransactionExpiration::None => json!({ "None": true }),
        });

        SerializedTransactionData {
            version: SERIALIZED_TRANSACTION_DATA_VERSION,
            sender: self.sender.map(|sender| sender.to_string()),
            expiration,
            gas_config,
            inputs: self
                .transaction
                .inputs
                .iter()
                .enumerate()
                .map(|(index, input)| project_input(index as u16, input))
                .collect(),
            transactions: self.transaction.commands.iter().map(project_command).collect(),
        }
    }

    pub fn to_json(&self) -> TransactionBuilderResult<String> {
        Ok(serde_json::to_string(&self.to_serialized())?)
    }

    /// Rebuild a transaction from its JSON projection. Gas payment entries
    /// come back with version zero and an empty digest; they carry only the
    /// object id in this schema.
    pub fn from_serialized(
        data: SerializedTransactionData,
    ) -> TransactionBuilderResult<TransactionBuilder> {
        let mut builder = TransactionBuilder::new();

        if let Some(sender) = &data.sender {
            builder.set_sender(
                sender
                    .parse()
                    .map_err(|_| TransactionBuilderError::InvalidAddress)?,
            );
        }

        if let Some(expiration) = &data.expiration {
            match expiration.get("Epoch").and_then(Value::as_u64) {
                Some(epoch) => builder.set_expiration(TransactionExpiration::Epoch(epoch)),
                None => builder.set_expiration(TransactionExpiration::None),
            };
        }

        if let Some(owner) = &data.gas_config.owner {
            builder.set_gas_owner(
                owner
                    .parse()
                    .map_err(|_| TransactionBuilderError::InvalidAddress)?,
            );
        }
        if let Some(budget) = &data.gas_config.budget {
            builder.set_gas_budget(
                budget
                    .parse()
                    .map_err(|_| malformed("gas budget is not a decimal string"))?,
            );
        }
        if let Some(price) = &data.gas_config.price {
            builder.set_gas_price(
                price
                    .parse()
                    .map_err(|_| malformed("gas price is not a decimal string"))?,
            );
        }
        if let Some(payment) = &data.gas_config.payment {
            let payment = payment
                .iter()
                .map(|id| {
                    Ok((
                        id.parse::<ObjectID>()
                            .map_err(|_| TransactionBuilderError::InvalidObjectId)?,
                        SequenceNumber::new(),
                        ObjectDigest::ZERO,
                    ))
                })
                .collect::<TransactionBuilderResult<Vec<_>>>()?;
            builder.set_gas_payment(payment);
        }

        for input in &data.inputs {
            builder.transaction.add_input(parse_input(input)?);
        }
        for transaction in &data.transactions {
            builder.transaction.add_command(parse_command(transaction)?);
        }

        Ok(builder)
    }

    pub fn from_json(json: &str) -> TransactionBuilderResult<TransactionBuilder> {
        Self::from_serialized(serde_json::from_str(json)?)
    }
}
