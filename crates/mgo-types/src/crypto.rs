// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use derive_more::{AsMut, AsRef, From};
use eyre::eyre;
use fastcrypto::ed25519::{Ed25519KeyPair, Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
use fastcrypto::encoding::{Base64, Encoding, Hex};
use fastcrypto::error::FastCryptoError;
use fastcrypto::hash::{HashFunction, Keccak256};
use fastcrypto::secp256k1::{
    Secp256k1KeyPair, Secp256k1PrivateKey, Secp256k1PublicKey, Secp256k1Signature,
};
pub use fastcrypto::traits::KeyPair as KeypairTraits;
pub use fastcrypto::traits::Signer;
pub use fastcrypto::traits::{Authenticator, EncodeDecodeBase64, SigningKey, ToFromBytes, VerifyingKey};
use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::intent::{Intent, IntentMessage, PersonalMessage};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use strum_macros::EnumString;

pub use enum_dispatch::enum_dispatch;

use crate::base_types::MgoAddress;
use crate::error::{MgoError, MgoResult};
use crate::mgo_serde::Readable;
use crate::transaction::TransactionData;

#[cfg(test)]
#[path = "unit_tests/crypto_tests.rs"]
mod crypto_tests;

/// Every signature in the system commits to a Keccak-256 digest of the
/// intent-framed payload.
pub type DefaultHash = Keccak256;

///////////////////////////////////////////////
/// Account Keys
///
/// * The keypairs accounts use to interact with the chain: eddsa
/// * (ed25519) and ecdsa (secp256k1).
///

#[allow(clippy::large_enum_variant)]
#[derive(Debug, From, PartialEq, Eq)]
pub enum MgoKeyPair {
    Ed25519(Ed25519KeyPair),
    Secp256k1(Secp256k1KeyPair),
}

#[derive(Clone, PartialEq, Eq, From)]
pub enum PublicKey {
    Ed25519(Ed25519PublicKey),
    Secp256k1(Secp256k1PublicKey),
}

impl MgoKeyPair {
    pub fn public(&self) -> PublicKey {
        match self {
            MgoKeyPair::Ed25519(kp) => PublicKey::Ed25519(kp.public().clone()),
            MgoKeyPair::Secp256k1(kp) => PublicKey::Secp256k1(kp.public().clone()),
        }
    }

    /// The account address controlled by this keypair.
    pub fn mgo_address(&self) -> MgoAddress {
        MgoAddress::from(&self.public())
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.public().scheme()
    }

    /// Generate a fresh keypair for the given scheme.
    pub fn generate(scheme: SignatureScheme) -> Self {
        let mut rng = StdRng::from_rng(OsRng).expect("OS rng is available");
        match scheme {
            SignatureScheme::ED25519 => MgoKeyPair::Ed25519(Ed25519KeyPair::generate(&mut rng)),
            SignatureScheme::Secp256k1 => {
                MgoKeyPair::Secp256k1(Secp256k1KeyPair::generate(&mut rng))
            }
        }
    }

    /// Reconstruct a keypair from raw 32-byte secret key material.
    pub fn from_secret_key_bytes(scheme: SignatureScheme, bytes: &[u8]) -> MgoResult<Self> {
        match scheme {
            SignatureScheme::ED25519 => {
                let sk = Ed25519PrivateKey::from_bytes(bytes)
                    .map_err(|_| MgoError::InvalidPrivateKey)?;
                Ok(MgoKeyPair::Ed25519(Ed25519KeyPair::from(sk)))
            }
            SignatureScheme::Secp256k1 => {
                let sk = Secp256k1PrivateKey::from_bytes(bytes)
                    .map_err(|_| MgoError::InvalidPrivateKey)?;
                Ok(MgoKeyPair::Secp256k1(Secp256k1KeyPair::from(sk)))
            }
        }
    }

    /// Reconstruct a keypair from a hex secret key, `0x` prefix optional.
    pub fn from_secret_key_hex(scheme: SignatureScheme, hex: &str) -> MgoResult<Self> {
        let hex = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
        let bytes = Hex::decode(hex).map_err(|_| MgoError::InvalidPrivateKey)?;
        Self::from_secret_key_bytes(scheme, &bytes)
    }

    /// Sign a personal message. The payload is the ULEB128-length-prefixed
    /// message bytes under the personal-message intent.
    pub fn sign_personal_message(&self, message: &[u8]) -> Signature {
        Signature::new_secure(
            &IntentMessage::new(
                Intent::personal_message(),
                PersonalMessage {
                    message: message.to_vec(),
                },
            ),
            self,
        )
    }

    /// Sign the base64 transaction bytes produced by the builder. The bytes
    /// are decoded back into the transaction-data envelope so the signed
    /// digest covers `intent || envelope` exactly.
    pub fn sign_transaction_block(
        &self,
        tx_bytes_b64: &str,
    ) -> MgoResult<SignedTransactionSerializedSig> {
        let tx_bytes = Base64::decode(tx_bytes_b64).map_err(|e| {
            MgoError::TransactionDeserialization {
                error: e.to_string(),
            }
        })?;
        let data: TransactionData =
            mgo_sdbe::from_bytes(&tx_bytes).map_err(|e| MgoError::TransactionDeserialization {
                error: e.to_string(),
            })?;
        let signature =
            Signature::new_secure(&IntentMessage::new(Intent::mgo_transaction(), data), self);
        Ok(SignedTransactionSerializedSig {
            tx_bytes: tx_bytes_b64.to_owned(),
            signature: Base64::encode(signature.as_ref()),
        })
    }
}

impl Signer<Signature> for MgoKeyPair {
    fn sign(&self, msg: &[u8]) -> Signature {
        match self {
            MgoKeyPair::Ed25519(kp) => kp.sign(msg),
            MgoKeyPair::Secp256k1(kp) => kp.sign(msg),
        }
    }
}

impl EncodeDecodeBase64 for MgoKeyPair {
    /// Encode as `flag || privkey` in Base64. The pubkey is recomputed on
    /// decode.
    fn encode_base64(&self) -> String {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.push(self.public().flag());
        match self {
            MgoKeyPair::Ed25519(kp) => bytes.extend_from_slice(kp.as_bytes()),
            MgoKeyPair::Secp256k1(kp) => bytes.extend_from_slice(kp.as_bytes()),
        }
        Base64::encode(&bytes[..])
    }

    fn decode_base64(value: &str) -> Result<Self, eyre::Report> {
        let bytes = Base64::decode(value).map_err(|e| eyre!("{}", e.to_string()))?;
        let flag = bytes.first().ok_or_else(|| eyre!("Invalid length"))?;
        let secret = bytes.get(1..).ok_or_else(|| eyre!("Invalid length"))?;
        let scheme = SignatureScheme::from_flag_byte(flag).map_err(|e| eyre!("{}", e))?;
        MgoKeyPair::from_secret_key_bytes(scheme, secret).map_err(|e| eyre!("{}", e))
    }
}

impl Serialize for MgoKeyPair {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode_base64())
    }
}

impl<'de> Deserialize<'de> for MgoKeyPair {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        <MgoKeyPair as EncodeDecodeBase64>::decode_base64(&s)
            .map_err(|e| Error::custom(e.to_string()))
    }
}

impl FromStr for MgoKeyPair {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode_base64(s).map_err(|e| eyre!("{}", e.to_string()))
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(pk) => pk.as_ref(),
            PublicKey::Secp256k1(pk) => pk.as_ref(),
        }
    }
}

impl EncodeDecodeBase64 for PublicKey {
    fn encode_base64(&self) -> String {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&[self.flag()]);
        bytes.extend_from_slice(self.as_ref());
        Base64::encode(&bytes[..])
    }

    fn decode_base64(value: &str) -> Result<Self, eyre::Report> {
        let bytes = Base64::decode(value).map_err(|e| eyre!("{}", e.to_string()))?;
        let flag = bytes.first().ok_or_else(|| eyre!("Invalid length"))?;
        let scheme = SignatureScheme::from_flag_byte(flag).map_err(|e| eyre!("{}", e))?;
        let key_bytes = bytes.get(1..).ok_or_else(|| eyre!("Invalid length"))?;
        PublicKey::try_from_bytes(scheme, key_bytes).map_err(|e| eyre!("{}", e))
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        <PublicKey as EncodeDecodeBase64>::decode_base64(&s)
            .map_err(|e| Error::custom(e.to_string()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.encode_base64())
    }
}

impl PublicKey {
    pub fn flag(&self) -> u8 {
        self.scheme().flag()
    }

    pub fn scheme(&self) -> SignatureScheme {
        match self {
            PublicKey::Ed25519(_) => Ed25519MgoSignature::SCHEME,
            PublicKey::Secp256k1(_) => Secp256k1MgoSignature::SCHEME,
        }
    }

    pub fn try_from_bytes(scheme: SignatureScheme, key_bytes: &[u8]) -> MgoResult<PublicKey> {
        match scheme {
            SignatureScheme::ED25519 => Ok(PublicKey::Ed25519(
                Ed25519PublicKey::from_bytes(key_bytes)
                    .map_err(|e| MgoError::KeyConversionError(e.to_string()))?,
            )),
            SignatureScheme::Secp256k1 => Ok(PublicKey::Secp256k1(
                Secp256k1PublicKey::from_bytes(key_bytes)
                    .map_err(|e| MgoError::KeyConversionError(e.to_string()))?,
            )),
        }
    }
}

//
// Account Signatures
//

// Enums for signature scheme signatures
#[enum_dispatch]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signature {
    Ed25519MgoSignature,
    Secp256k1MgoSignature,
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes = self.as_ref();

        if serializer.is_human_readable() {
            serializer.serialize_str(&Base64::encode(bytes))
        } else {
            serializer.serialize_bytes(bytes)
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let bytes = if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Base64::decode(&s).map_err(|e| Error::custom(e.to_string()))?
        } else {
            Vec::deserialize(deserializer)?
        };

        Self::from_bytes(&bytes).map_err(|e| Error::custom(e.to_string()))
    }
}

impl Signature {
    /// Sign an intent-framed value: the signed digest is
    /// `keccak256(sdbe(intent_msg))`.
    pub fn new_secure<T>(value: &IntentMessage<T>, secret: &dyn Signer<Signature>) -> Self
    where
        T: Serialize,
    {
        let mut hasher = DefaultHash::default();
        hasher.update(mgo_sdbe::to_bytes(value).expect("message serialization should not fail"));
        Signer::sign(secret, &hasher.finalize().digest)
    }

    /// Parse the public key carried in the trailing bytes of the serialized
    /// signature.
    pub fn to_public_key(&self) -> MgoResult<PublicKey> {
        PublicKey::try_from_bytes(self.scheme(), self.public_key_bytes())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        match self {
            Signature::Ed25519MgoSignature(sig) => sig.as_ref(),
            Signature::Secp256k1MgoSignature(sig) => sig.as_ref(),
        }
    }
}

impl ToFromBytes for Signature {
    fn from_bytes(bytes: &[u8]) -> Result<Self, FastCryptoError> {
        match bytes.first() {
            Some(x) => {
                if x == &Ed25519MgoSignature::SCHEME.flag() {
                    Ok(<Ed25519MgoSignature as ToFromBytes>::from_bytes(bytes)?.into())
                } else if x == &Secp256k1MgoSignature::SCHEME.flag() {
                    Ok(<Secp256k1MgoSignature as ToFromBytes>::from_bytes(bytes)?.into())
                } else {
                    Err(FastCryptoError::InvalidInput)
                }
            }
            _ => Err(FastCryptoError::InvalidInput),
        }
    }
}

//
// Ed25519 Mgo Signature port
//

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, AsRef, AsMut)]
#[as_ref(forward)]
#[as_mut(forward)]
pub struct Ed25519MgoSignature(
    #[serde_as(as = "Readable<Base64, Bytes>")]
    [u8; Ed25519PublicKey::LENGTH + Ed25519Signature::LENGTH + 1],
);

impl MgoSignatureInner for Ed25519MgoSignature {
    type Sig = Ed25519Signature;
    type PubKey = Ed25519PublicKey;
    type KeyPair = Ed25519KeyPair;
    const LENGTH: usize = Ed25519PublicKey::LENGTH + Ed25519Signature::LENGTH + 1;
}

impl MgoPublicKey for Ed25519PublicKey {
    const SIGNATURE_SCHEME: SignatureScheme = SignatureScheme::ED25519;
}

impl ToFromBytes for Ed25519MgoSignature {
    fn from_bytes(bytes: &[u8]) -> Result<Self, FastCryptoError> {
        if bytes.len() != Self::LENGTH {
            return Err(FastCryptoError::InputLengthWrong(Self::LENGTH));
        }
        let mut sig_bytes = [0; Self::LENGTH];
        sig_bytes.copy_from_slice(bytes);
        Ok(Self(sig_bytes))
    }
}

impl Signer<Signature> for Ed25519KeyPair {
    fn sign(&self, msg: &[u8]) -> Signature {
        Ed25519MgoSignature::new(self, msg).into()
    }
}

//
// Secp256k1 Mgo Signature port
//

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, AsRef, AsMut)]
#[as_ref(forward)]
#[as_mut(forward)]
pub struct Secp256k1MgoSignature(
    #[serde_as(as = "Readable<Base64, Bytes>")]
    [u8; Secp256k1PublicKey::LENGTH + Secp256k1Signature::LENGTH + 1],
);

impl MgoSignatureInner for Secp256k1MgoSignature {
    type Sig = Secp256k1Signature;
    type PubKey = Secp256k1PublicKey;
    type KeyPair = Secp256k1KeyPair;
    const LENGTH: usize = Secp256k1PublicKey::LENGTH + Secp256k1Signature::LENGTH + 1;
}

impl MgoPublicKey for Secp256k1PublicKey {
    const SIGNATURE_SCHEME: SignatureScheme = SignatureScheme::Secp256k1;
}

impl ToFromBytes for Secp256k1MgoSignature {
    fn from_bytes(bytes: &[u8]) -> Result<Self, FastCryptoError> {
        if bytes.len() != Self::LENGTH {
            return Err(FastCryptoError::InputLengthWrong(Self::LENGTH));
        }
        let mut sig_bytes = [0; Self::LENGTH];
        sig_bytes.copy_from_slice(bytes);
        Ok(Self(sig_bytes))
    }
}

impl Signer<Signature> for Secp256k1KeyPair {
    fn sign(&self, msg: &[u8]) -> Signature {
        Secp256k1MgoSignature::new(self, msg).into()
    }
}

//
// This struct exists due to the limitations of the `enum_dispatch` library.
//
pub trait MgoSignatureInner: Sized + ToFromBytes + PartialEq + Eq + Hash {
    type Sig: Authenticator<PubKey = Self::PubKey>;
    type PubKey: VerifyingKey<Sig = Self::Sig> + MgoPublicKey;
    type KeyPair: KeypairTraits<PubKey = Self::PubKey, Sig = Self::Sig>;

    const LENGTH: usize = Self::Sig::LENGTH + Self::PubKey::LENGTH + 1;
    const SCHEME: SignatureScheme = Self::PubKey::SIGNATURE_SCHEME;

    fn get_verification_inputs(&self, author: MgoAddress) -> MgoResult<(Self::Sig, Self::PubKey)> {
        // Is this signature emitted by the expected author?
        let bytes = self.public_key_bytes();
        let pk = Self::PubKey::from_bytes(bytes)
            .map_err(|_| MgoError::KeyConversionError("Invalid public key".to_string()))?;

        let received_addr = MgoAddress::from(&pk);
        if received_addr != author {
            return Err(MgoError::IncorrectSigner {
                error: format!("expected {author}, received {received_addr}"),
            });
        }

        let signature = Self::Sig::from_bytes(self.signature_bytes()).map_err(|_| {
            MgoError::InvalidSignature {
                error: "Fail to get pubkey and sig".to_string(),
            }
        })?;

        Ok((signature, pk))
    }

    fn new(kp: &Self::KeyPair, message: &[u8]) -> Self {
        let sig = Signer::sign(kp, message);

        let mut signature_bytes: Vec<u8> = Vec::new();
        signature_bytes
            .extend_from_slice(&[<Self::PubKey as MgoPublicKey>::SIGNATURE_SCHEME.flag()]);
        signature_bytes.extend_from_slice(sig.as_ref());
        signature_bytes.extend_from_slice(kp.public().as_ref());
        Self::from_bytes(&signature_bytes[..])
            .expect("serialized signature did not have expected size")
    }
}

pub trait MgoPublicKey: VerifyingKey {
    const SIGNATURE_SCHEME: SignatureScheme;
}

#[enum_dispatch(Signature)]
pub trait MgoSignature: Sized + ToFromBytes {
    fn signature_bytes(&self) -> &[u8];
    fn public_key_bytes(&self) -> &[u8];
    fn scheme(&self) -> SignatureScheme;

    fn verify_secure<T>(&self, value: &IntentMessage<T>, author: MgoAddress) -> MgoResult<()>
    where
        T: Serialize;
}

impl<S: MgoSignatureInner + Sized> MgoSignature for S {
    fn signature_bytes(&self) -> &[u8] {
        // Layout is flag || signature || pubkey.
        &self.as_ref()[1..1 + S::Sig::LENGTH]
    }

    fn public_key_bytes(&self) -> &[u8] {
        &self.as_ref()[S::Sig::LENGTH + 1..]
    }

    fn scheme(&self) -> SignatureScheme {
        S::PubKey::SIGNATURE_SCHEME
    }

    fn verify_secure<T>(&self, value: &IntentMessage<T>, author: MgoAddress) -> MgoResult<()>
    where
        T: Serialize,
    {
        let mut hasher = DefaultHash::default();
        hasher.update(mgo_sdbe::to_bytes(value).expect("message serialization should not fail"));
        let digest = hasher.finalize().digest;

        let (sig, pk) = &self.get_verification_inputs(author)?;
        pk.verify(&digest, sig).map_err(|e| MgoError::InvalidSignature {
            error: format!("Fail to verify user sig {e}"),
        })
    }
}

//
// Serialized signature plumbing
//

/// The two pieces the submit payload carries for one signer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransactionSerializedSig {
    pub tx_bytes: String,
    pub signature: String,
}

/// The parts of a serialized signature `flag || sig || pubkey`.
#[derive(Debug, Clone)]
pub struct SignatureInfo<'a> {
    pub scheme: SignatureScheme,
    pub signature: &'a [u8],
    pub public_key: &'a [u8],
}

/// Split a serialized signature into scheme, raw signature, and public key.
/// The public key occupies the trailing scheme-specific number of bytes.
pub fn parse_serialized_signature(serialized: &[u8]) -> MgoResult<SignatureInfo<'_>> {
    let flag = serialized.first().ok_or(MgoError::InvalidSignature {
        error: "empty signature".to_string(),
    })?;
    let scheme = SignatureScheme::from_flag_byte(flag)?;
    let pk_len = scheme.public_key_length();
    if serialized.len() < 1 + pk_len + 1 {
        return Err(MgoError::InvalidSignature {
            error: "serialized signature too short".to_string(),
        });
    }
    let signature = &serialized[1..serialized.len() - pk_len];
    let public_key = &serialized[serialized.len() - pk_len..];
    Ok(SignatureInfo {
        scheme,
        signature,
        public_key,
    })
}

/// Recover the signer address of a serialized signature.
pub fn signer_address(serialized: &[u8]) -> MgoResult<MgoAddress> {
    let info = parse_serialized_signature(serialized)?;
    let pk = PublicKey::try_from_bytes(info.scheme, info.public_key)?;
    Ok(MgoAddress::from(&pk))
}

/// Verify a serialized signature over a personal message.
pub fn verify_personal_message(message: &[u8], serialized: &[u8]) -> MgoResult<()> {
    let signature = Signature::from_bytes(serialized).map_err(|e| MgoError::InvalidSignature {
        error: e.to_string(),
    })?;
    let author = MgoAddress::from(&signature.to_public_key()?);
    signature.verify_secure(
        &IntentMessage::new(
            Intent::personal_message(),
            PersonalMessage {
                message: message.to_vec(),
            },
        ),
        author,
    )
}

/// Verify a serialized signature over transaction-envelope bytes.
pub fn verify_transaction_block(tx_bytes: &[u8], serialized: &[u8]) -> MgoResult<()> {
    let data: TransactionData =
        mgo_sdbe::from_bytes(tx_bytes).map_err(|e| MgoError::TransactionDeserialization {
            error: e.to_string(),
        })?;
    let signature = Signature::from_bytes(serialized).map_err(|e| MgoError::InvalidSignature {
        error: e.to_string(),
    })?;
    let author = MgoAddress::from(&signature.to_public_key()?);
    signature.verify_secure(&IntentMessage::new(Intent::mgo_transaction(), data), author)
}

#[derive(Clone, Copy, Deserialize, Serialize, Debug, EnumString, strum_macros::Display, PartialEq, Eq)]
pub enum SignatureScheme {
    ED25519,
    Secp256k1,
}

impl SignatureScheme {
    pub fn flag(&self) -> u8 {
        match self {
            SignatureScheme::ED25519 => 0x00,
            SignatureScheme::Secp256k1 => 0x01,
        }
    }

    pub fn public_key_length(&self) -> usize {
        match self {
            SignatureScheme::ED25519 => Ed25519PublicKey::LENGTH,
            SignatureScheme::Secp256k1 => Secp256k1PublicKey::LENGTH,
        }
    }

    pub fn from_flag_byte(byte_int: &u8) -> MgoResult<SignatureScheme> {
        match byte_int {
            0x00 => Ok(SignatureScheme::ED25519),
            0x01 => Ok(SignatureScheme::Secp256k1),
            _ => Err(MgoError::UnknownSignatureScheme(*byte_int)),
        }
    }
}
