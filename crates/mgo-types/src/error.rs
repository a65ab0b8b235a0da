// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type MgoResult<T = ()> = Result<T, MgoError>;

#[derive(Eq, PartialEq, Clone, Debug, Error)]
pub enum MgoError {
    #[error("invalid mgo address")]
    InvalidAddress,

    #[error("invalid object digest")]
    InvalidObjectDigest,

    #[error("invalid object version: {0}")]
    InvalidObjectVersion(String),

    #[error("unrecognized type tag: {0}")]
    InvalidTypeTag(String),

    #[error("unknown signature scheme flag: {0:#04x}")]
    UnknownSignatureScheme(u8),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("key conversion error: {0}")]
    KeyConversionError(String),

    #[error("invalid signature: {error}")]
    InvalidSignature { error: String },

    #[error("incorrect signer: {error}")]
    IncorrectSigner { error: String },

    #[error("transaction deserialization failed: {error}")]
    TransactionDeserialization { error: String },
}
