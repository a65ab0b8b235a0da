// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use mgo_types::base_types::{ObjectID, ObjectRef, SequenceNumber};
use mgo_types::digests::{ObjectDigest, TransactionDigest};
use mgo_types::error::{MgoError, MgoResult};

/// Which parts of a transaction block the node should include in its
/// response. Everything defaults to off.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase", rename = "TransactionBlockResponseOptions", default)]
pub struct MgoTransactionBlockResponseOptions {
    /// Whether to show transaction input data. Default to be false.
    pub show_input: bool,
    /// Whether to show the SDBE-encoded transaction input bytes. Default to be false.
    pub show_raw_input: bool,
    /// Whether to show transaction effects. Default to be false.
    pub show_effects: bool,
    /// Whether to show transaction events. Default to be false.
    pub show_events: bool,
    /// Whether to show object changes. Default to be false.
    pub show_object_changes: bool,
    /// Whether to show balance changes. Default to be false.
    pub show_balance_changes: bool,
}

impl MgoTransactionBlockResponseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full_content() -> Self {
        Self {
            show_input: true,
            show_raw_input: true,
            show_effects: true,
            show_events: true,
            show_object_changes: true,
            show_balance_changes: true,
        }
    }

    pub fn with_input(mut self) -> Self {
        self.show_input = true;
        self
    }

    pub fn with_raw_input(mut self) -> Self {
        self.show_raw_input = true;
        self
    }

    pub fn with_effects(mut self) -> Self {
        self.show_effects = true;
        self
    }

    pub fn with_events(mut self) -> Self {
        self.show_events = true;
        self
    }

    pub fn with_object_changes(mut self) -> Self {
        self.show_object_changes = true;
        self
    }

    pub fn with_balance_changes(mut self) -> Self {
        self.show_balance_changes = true;
        self
    }
}

/// How long the node should hold the request before responding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecuteTransactionRequestType {
    /// Respond once an effects certificate is formed.
    WaitForEffectsCert,
    /// Respond after the node has executed the transaction locally.
    WaitForLocalExecution,
}

/// The positional payload of `mgo_executeTransactionBlock`:
/// `[tx_bytes, signatures, options, request_type]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteTransactionBlockRequest {
    /// Base64 SDBE bytes of the transaction-data envelope.
    pub tx_bytes: String,
    /// Base64 serialized signatures, sponsor first when sponsored.
    pub signatures: Vec<String>,
    pub options: MgoTransactionBlockResponseOptions,
    pub request_type: ExecuteTransactionRequestType,
}

/// What the node returns for a submitted transaction block. Sections are
/// present according to the requested options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MgoTransactionBlockResponse {
    pub digest: Option<TransactionDigest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<serde_json::Value>,
    /// Base64 SDBE bytes of the submitted envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_transaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_changes: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_changes: Option<serde_json::Value>,
    /// Decimal string, as served by the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_local_execution: Option<bool>,
    /// Decimal string, as served by the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// The reference slice of an object the SDK needs to build inputs: id,
/// version, digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MgoObjectData {
    pub object_id: ObjectID,
    /// Decimal string, as served by the node.
    pub version: String,
    pub digest: ObjectDigest,
}

impl MgoObjectData {
    /// The typed object reference, ready for the transaction builder.
    pub fn object_ref(&self) -> MgoResult<ObjectRef> {
        let version: u64 = self
            .version
            .parse()
            .map_err(|_| MgoError::InvalidObjectVersion(self.version.clone()))?;
        Ok((self.object_id, SequenceNumber::from(version), self.digest))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MgoObjectResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MgoObjectData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_serialize_camel_case() {
        let options = MgoTransactionBlockResponseOptions::new()
            .with_input()
            .with_effects();
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["showInput"], true);
        assert_eq!(json["showRawInput"], false);
        assert_eq!(json["showEffects"], true);
    }

    #[test]
    fn request_type_uses_the_wire_names() {
        assert_eq!(
            serde_json::to_value(ExecuteTransactionRequestType::WaitForLocalExecution).unwrap(),
            serde_json::json!("WaitForLocalExecution")
        );
        assert_eq!(
            serde_json::to_value(ExecuteTransactionRequestType::WaitForEffectsCert).unwrap(),
            serde_json::json!("WaitForEffectsCert")
        );
    }

    #[test]
    fn object_data_yields_a_typed_object_ref() {
        let data: MgoObjectData = serde_json::from_value(serde_json::json!({
            "objectId": "0xdc9b8d1b0a44e0eda3e77ddc16470616584dff25ca971c073defac8c67bc1804",
            "version": "41",
            "digest": "11111111111111111111111111111111",
        }))
        .unwrap();
        let (id, version, _digest) = data.object_ref().unwrap();
        assert_eq!(id, data.object_id);
        assert_eq!(version.value(), 41);

        let bad = MgoObjectData {
            version: "not-a-number".to_owned(),
            ..data
        };
        assert_eq!(
            bad.object_ref(),
            Err(MgoError::InvalidObjectVersion("not-a-number".to_owned()))
        );
    }

    #[test]
    fn response_tolerates_missing_sections() {
        let response: MgoTransactionBlockResponse = serde_json::from_value(serde_json::json!({
            "digest": "11111111111111111111111111111111",
        }))
        .unwrap();
        assert!(response.digest.is_some());
        assert!(response.effects.is_none());
        assert!(response.errors.is_empty());
    }
}
