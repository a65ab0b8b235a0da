// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod base_types;
pub mod crypto;
pub mod digests;
pub mod error;
pub mod mgo_serde;
pub mod transaction;
pub mod type_tag;
