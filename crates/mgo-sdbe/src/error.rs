// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use serde::{de, ser};
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unexpected end of input at byte {position}")]
    Eof { position: usize },

    #[error("exceeded max sequence length: {0}")]
    ExceededMaxLen(usize),

    #[error("sequence is missing a length")]
    MissingLen,

    #[error("unsupported kind: {0}")]
    NotSupported(&'static str),

    #[error("ULEB128 overflow at byte {position}")]
    UlebOverflow { position: usize },

    #[error("short read at byte {position}: {declared} bytes declared, {available} available")]
    ShortRead {
        position: usize,
        declared: usize,
        available: usize,
    },

    #[error("expected boolean, found {byte:#04x} at byte {position}")]
    ExpectedBoolean { byte: u8, position: usize },

    #[error("expected option flag, found {byte:#04x} at byte {position}")]
    ExpectedOptionFlag { byte: u8, position: usize },

    #[error("malformed utf8 in string starting at byte {position}")]
    Utf8 { position: usize },

    #[error("remaining input: {remaining} trailing bytes at byte {position}")]
    RemainingInput { position: usize, remaining: usize },

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}
