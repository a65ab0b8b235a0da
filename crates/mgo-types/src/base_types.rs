// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use fastcrypto::encoding::{Encoding, Hex};
use fastcrypto::hash::HashFunction;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::{DefaultHash, MgoPublicKey, PublicKey};
use crate::digests::ObjectDigest;
use crate::error::{MgoError, MgoResult};

#[cfg(test)]
#[path = "unit_tests/base_types_tests.rs"]
mod base_types_tests;

pub const MGO_ADDRESS_LENGTH: usize = 32;

/// A 32-byte account address.
///
/// The canonical string form is `0x` followed by 64 lowercase hex digits;
/// parsing normalizes case and left-pads short inputs with zeros. On the
/// binary wire an address is its 32 raw bytes with no length prefix, which is
/// what distinguishes it from an ordinary byte string.
#[derive(Eq, Default, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct MgoAddress([u8; MGO_ADDRESS_LENGTH]);

impl MgoAddress {
    pub const ZERO: Self = Self([0u8; MGO_ADDRESS_LENGTH]);

    pub fn new(bytes: [u8; MGO_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_inner(self) -> [u8; MGO_ADDRESS_LENGTH] {
        self.0
    }

    // for testing
    pub fn random_for_testing_only() -> Self {
        Self(rand::thread_rng().gen())
    }
}

impl AsRef<[u8]> for MgoAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl TryFrom<&[u8]> for MgoAddress {
    type Error = MgoError;

    fn try_from(bytes: &[u8]) -> MgoResult<Self> {
        let arr: [u8; MGO_ADDRESS_LENGTH] =
            bytes.try_into().map_err(|_| MgoError::InvalidAddress)?;
        Ok(Self(arr))
    }
}

impl TryFrom<Vec<u8>> for MgoAddress {
    type Error = MgoError;

    fn try_from(bytes: Vec<u8>) -> MgoResult<Self> {
        Self::try_from(&bytes[..])
    }
}

impl FromStr for MgoAddress {
    type Err = MgoError;

    /// Accepts any hex string of at most 64 digits, with or without a `0x`
    /// prefix, in either case; shorter inputs are zero-padded on the left.
    fn from_str(s: &str) -> MgoResult<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if digits.is_empty() || digits.len() > MGO_ADDRESS_LENGTH * 2 {
            return Err(MgoError::InvalidAddress);
        }
        let mut normalized = String::with_capacity(MGO_ADDRESS_LENGTH * 2);
        for _ in 0..(MGO_ADDRESS_LENGTH * 2 - digits.len()) {
            normalized.push('0');
        }
        normalized.push_str(&digits.to_lowercase());
        let bytes = Hex::decode(&normalized).map_err(|_| MgoError::InvalidAddress)?;
        Self::try_from(&bytes[..])
    }
}

impl fmt::Display for MgoAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", Hex::encode(self.0))
    }
}

impl fmt::Debug for MgoAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", Hex::encode(self.0))
    }
}

impl Serialize for MgoAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            // Bare 32 bytes, no length prefix.
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for MgoAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(Error::custom)
        } else {
            Ok(Self(<[u8; MGO_ADDRESS_LENGTH]>::deserialize(deserializer)?))
        }
    }
}

/// Account address derivation: the first 32 bytes of
/// `keccak256(scheme_flag || public_key)`.
impl<T: MgoPublicKey> From<&T> for MgoAddress {
    fn from(pk: &T) -> Self {
        let mut hasher = DefaultHash::default();
        hasher.update([T::SIGNATURE_SCHEME.flag()]);
        hasher.update(pk);
        let digest = hasher.finalize().digest;

        let mut res = [0u8; MGO_ADDRESS_LENGTH];
        res.copy_from_slice(&digest[..MGO_ADDRESS_LENGTH]);
        MgoAddress(res)
    }
}

impl From<&PublicKey> for MgoAddress {
    fn from(pk: &PublicKey) -> Self {
        let mut hasher = DefaultHash::default();
        hasher.update([pk.flag()]);
        hasher.update(pk);
        let digest = hasher.finalize().digest;

        let mut res = [0u8; MGO_ADDRESS_LENGTH];
        res.copy_from_slice(&digest[..MGO_ADDRESS_LENGTH]);
        MgoAddress(res)
    }
}

impl From<ObjectID> for MgoAddress {
    fn from(object_id: ObjectID) -> Self {
        Self(object_id.0 .0)
    }
}

/// A 32-byte object identifier; the object flavor of the address carrier.
#[derive(Eq, Default, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct ObjectID(MgoAddress);

impl ObjectID {
    pub const LENGTH: usize = MGO_ADDRESS_LENGTH;
    pub const ZERO: Self = Self(MgoAddress::ZERO);

    pub fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(MgoAddress::new(bytes))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn into_bytes(self) -> [u8; Self::LENGTH] {
        self.0.to_inner()
    }

    // for testing
    pub fn random() -> Self {
        Self(MgoAddress::random_for_testing_only())
    }
}

impl AsRef<[u8]> for ObjectID {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<MgoAddress> for ObjectID {
    fn from(address: MgoAddress) -> Self {
        Self(address)
    }
}

impl TryFrom<&[u8]> for ObjectID {
    type Error = MgoError;

    fn try_from(bytes: &[u8]) -> MgoResult<Self> {
        MgoAddress::try_from(bytes).map(Self)
    }
}

impl FromStr for ObjectID {
    type Err = MgoError;

    fn from_str(s: &str) -> MgoResult<Self> {
        s.parse::<MgoAddress>().map(Self)
    }
}

impl fmt::Display for ObjectID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for ObjectID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// The version of an object, incremented at every mutation.
#[derive(
    Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Default, Debug, Serialize, Deserialize,
)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub const MIN: Self = Self(u64::MIN);

    pub fn new() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SequenceNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type VersionNumber = SequenceNumber;

/// Reference to an object at a particular version.
pub type ObjectRef = (ObjectID, SequenceNumber, ObjectDigest);

pub fn random_object_ref() -> ObjectRef {
    (
        ObjectID::random(),
        SequenceNumber::new(),
        ObjectDigest::new([0; 32]),
    )
}
