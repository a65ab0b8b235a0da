// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use mgo_types::error::MgoError;
use thiserror::Error;

pub type TransactionBuilderResult<T = ()> = Result<T, TransactionBuilderError>;

#[derive(Debug, Error)]
pub enum TransactionBuilderError {
    #[error("signer not set")]
    SignerNotSet,

    #[error("sender not set")]
    SenderNotSet,

    #[error("mgo client not set")]
    ClientNotSet,

    #[error("gas data not all set")]
    GasDataNotAllSet,

    #[error("invalid mgo address")]
    InvalidAddress,

    #[error("invalid object id")]
    InvalidObjectId,

    #[error("object not support type")]
    ObjectNotSupportedType,

    #[error("serialized transaction is malformed: {0}")]
    MalformedSerializedTransaction(String),

    #[error(transparent)]
    Encoding(#[from] mgo_sdbe::Error),

    #[error(transparent)]
    Types(#[from] MgoError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rpc(anyhow::Error),
}
