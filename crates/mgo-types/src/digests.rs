// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use fastcrypto::encoding::{Base58, Encoding};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::error::{MgoError, MgoResult};
use crate::mgo_serde::Readable;

pub const DIGEST_LENGTH: usize = 32;

/// Digest identifying an object's contents at a version. Base58 in string
/// form; a length-prefixed byte string on the wire.
#[serde_as]
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct ObjectDigest(#[serde_as(as = "Readable<Base58, Bytes>")] [u8; DIGEST_LENGTH]);

/// Digest of a transaction's sender-signed data.
#[serde_as]
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct TransactionDigest(#[serde_as(as = "Readable<Base58, Bytes>")] [u8; DIGEST_LENGTH]);

macro_rules! impl_digest {
    ($name:ident) => {
        impl $name {
            pub const ZERO: Self = Self([0u8; DIGEST_LENGTH]);

            pub const fn new(digest: [u8; DIGEST_LENGTH]) -> Self {
                Self(digest)
            }

            pub fn inner(&self) -> &[u8; DIGEST_LENGTH] {
                &self.0
            }

            pub fn base58_encode(&self) -> String {
                Base58::encode(self.0)
            }

            // for testing
            pub fn random() -> Self {
                Self(rand::thread_rng().gen())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; DIGEST_LENGTH]> for $name {
            fn from(digest: [u8; DIGEST_LENGTH]) -> Self {
                Self(digest)
            }
        }

        impl FromStr for $name {
            type Err = MgoError;

            fn from_str(s: &str) -> MgoResult<Self> {
                let bytes = Base58::decode(s).map_err(|_| MgoError::InvalidObjectDigest)?;
                let arr: [u8; DIGEST_LENGTH] =
                    bytes.try_into().map_err(|_| MgoError::InvalidObjectDigest)?;
                Ok(Self(arr))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.base58_encode())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.base58_encode())
            }
        }
    };
}

impl_digest!(ObjectDigest);
impl_digest!(TransactionDigest);
