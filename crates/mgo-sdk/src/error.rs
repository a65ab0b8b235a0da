// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type MgoRpcResult<T = ()> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failures and remote error envelopes, surfaced verbatim.
    #[error(transparent)]
    RpcError(#[from] jsonrpsee::core::Error),

    #[error(transparent)]
    JsonSerializationError(#[from] serde_json::Error),

    #[error("Data error: {0}")]
    DataError(String),
}
