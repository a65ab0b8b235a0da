// Copyright (c) MangoNet Labs Ltd.
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod intent;
