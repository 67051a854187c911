// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Cryptoki (PKCS#11 v2.40) C types and constants.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

pub use cryptoki_sys::*;
