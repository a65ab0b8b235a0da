// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

/// The version here must align with the version on the wire; adding a new
/// version is a breaking change for everything that hashes intent messages.
#[derive(Serialize_repr, Deserialize_repr, Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum IntentVersion {
    V0 = 0,
}

/// The application domain a signature commits to. Signatures produced for one
/// app id never verify under another.
#[derive(Serialize_repr, Deserialize_repr, Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum AppId {
    Mgo = 0,
}

impl Default for AppId {
    fn default() -> Self {
        Self::Mgo
    }
}

/// What the signed payload is. The discriminant is the first byte of the
/// three-byte intent header.
#[derive(Serialize_repr, Deserialize_repr, Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum IntentScope {
    TransactionData = 0,
    TransactionEffects = 1,
    CheckpointSummary = 2,
    PersonalMessage = 3,
}

#[derive(Debug, Error)]
pub enum IntentError {
    #[error("invalid intent bytes")]
    InvalidIntent,
}

/// A three-byte domain separator prepended to every payload before hashing
/// for signature: `(scope, version, app_id)`.
///
/// Under SDBE each field is one raw byte, so `sdbe(intent)` is exactly the
/// header the chain expects in front of the payload bytes.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Intent {
    pub scope: IntentScope,
    pub version: IntentVersion,
    pub app_id: AppId,
}

impl Intent {
    pub fn mgo_app(scope: IntentScope) -> Self {
        Self {
            scope,
            version: IntentVersion::V0,
            app_id: AppId::Mgo,
        }
    }

    /// Intent for the serialized transaction-data envelope.
    pub fn mgo_transaction() -> Self {
        Self::mgo_app(IntentScope::TransactionData)
    }

    /// Intent for a user-facing personal message.
    pub fn personal_message() -> Self {
        Self::mgo_app(IntentScope::PersonalMessage)
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.scope as u8, self.version as u8, self.app_id as u8]
    }
}

impl TryFrom<&[u8]> for Intent {
    type Error = IntentError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        mgo_sdbe::from_bytes(bytes).map_err(|_| IntentError::InvalidIntent)
    }
}

/// An intent paired with the value it frames. Signing always hashes
/// `sdbe(IntentMessage)`, never the bare value, so a signature over one scope
/// can not be replayed under another.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Hash)]
pub struct IntentMessage<T> {
    pub intent: Intent,
    pub value: T,
}

impl<T> IntentMessage<T> {
    pub fn new(intent: Intent, value: T) -> Self {
        Self { intent, value }
    }
}

/// A personal message payload. SDBE prefixes the byte string with its ULEB128
/// length, which is part of what gets hashed and signed.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Hash)]
pub struct PersonalMessage {
    pub message: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_header_is_three_raw_bytes() {
        let intent = Intent::mgo_transaction();
        assert_eq!(mgo_sdbe::to_bytes(&intent).unwrap(), vec![0, 0, 0]);
        assert_eq!(intent.to_bytes(), [0, 0, 0]);

        let intent = Intent::personal_message();
        assert_eq!(mgo_sdbe::to_bytes(&intent).unwrap(), vec![3, 0, 0]);
    }

    #[test]
    fn intent_message_prefixes_the_payload() {
        let message = IntentMessage::new(
            Intent::personal_message(),
            PersonalMessage {
                message: b"hello world".to_vec(),
            },
        );
        let bytes = mgo_sdbe::to_bytes(&message).unwrap();
        assert_eq!(&bytes[..3], &[3, 0, 0]);
        assert_eq!(bytes[3], 11);
        assert_eq!(&bytes[4..], b"hello world");
    }

    #[test]
    fn intent_round_trips_from_bytes() {
        let intent = Intent::mgo_app(IntentScope::CheckpointSummary);
        let bytes = mgo_sdbe::to_bytes(&intent).unwrap();
        assert_eq!(Intent::try_from(bytes.as_slice()).unwrap(), intent);
    }
}
