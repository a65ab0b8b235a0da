// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base_types::MgoAddress;
use crate::error::{MgoError, MgoResult};

#[cfg(test)]
#[path = "unit_tests/type_tag_tests.rs"]
mod type_tag_tests;

/// A Move type instantiation.
///
/// The variant order fixes the wire discriminants and must never change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U64,
}

/// A fully qualified Move struct type, optionally instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    pub address: MgoAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::U256 => f.write_str("u256"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if let Some((first, rest)) = self.type_params.split_first() {
            write!(f, "<{first}")?;
            for param in rest {
                write!(f, ", {param}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl FromStr for TypeTag {
    type Err = MgoError;

    fn from_str(s: &str) -> MgoResult<Self> {
        parse_type_tag(s.trim())
    }
}

impl From<StructTag> for TypeTag {
    fn from(tag: StructTag) -> Self {
        TypeTag::Struct(Box::new(tag))
    }
}

fn parse_type_tag(s: &str) -> MgoResult<TypeTag> {
    Ok(match s {
        "bool" => TypeTag::Bool,
        "u8" => TypeTag::U8,
        "u16" => TypeTag::U16,
        "u32" => TypeTag::U32,
        "u64" => TypeTag::U64,
        "u128" => TypeTag::U128,
        "u256" => TypeTag::U256,
        "address" => TypeTag::Address,
        "signer" => TypeTag::Signer,
        _ => {
            if let Some(inner) = s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
                TypeTag::Vector(Box::new(parse_type_tag(inner.trim())?))
            } else if s.contains("::") {
                TypeTag::Struct(Box::new(parse_struct_tag(s)?))
            } else {
                return Err(MgoError::InvalidTypeTag(s.to_owned()));
            }
        }
    })
}

fn parse_struct_tag(s: &str) -> MgoResult<StructTag> {
    // `::` inside type parameters must not split the path, so the scan
    // tracks angle-bracket depth.
    let parts = split_outside_brackets(s, Separator::PathSep);
    if parts.len() != 3 {
        return Err(MgoError::InvalidTypeTag(s.to_owned()));
    }

    let address: MgoAddress = parts[0]
        .parse()
        .map_err(|_| MgoError::InvalidTypeTag(s.to_owned()))?;
    let module = parts[1].to_owned();

    let mut name = parts[2].as_str();
    let mut type_params = Vec::new();
    if let Some(open) = name.find('<') {
        let close = name
            .rfind('>')
            .filter(|close| *close == name.len() - 1)
            .ok_or_else(|| MgoError::InvalidTypeTag(s.to_owned()))?;
        for param in split_outside_brackets(&name[open + 1..close], Separator::Comma) {
            let param = param.trim();
            if !param.is_empty() {
                type_params.push(parse_type_tag(param)?);
            }
        }
        name = &name[..open];
    }

    if module.is_empty() || name.is_empty() {
        return Err(MgoError::InvalidTypeTag(s.to_owned()));
    }

    Ok(StructTag {
        address,
        module,
        name: name.to_owned(),
        type_params,
    })
}

#[derive(PartialEq)]
enum Separator {
    /// `::`
    PathSep,
    /// `,`
    Comma,
}

/// Split on the separator at angle-bracket depth zero only.
fn split_outside_brackets(s: &str, separator: Separator) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < s.len() {
        let c = bytes[i] as char;
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ':' if separator == Separator::PathSep
                && depth == 0
                && bytes.get(i + 1) == Some(&b':') =>
            {
                parts.push(std::mem::take(&mut current));
                i += 1;
            }
            ',' if separator == Separator::Comma && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
        i += 1;
    }
    parts.push(current);
    parts
}
