// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

pub mod schema {
    use serde::{Deserialize, Serialize};
    use std::convert::TryFrom;

    /// Wire form of a single PKCS#11 attribute.
    ///
    /// `value` is the base64 encoding of the attribute bytes and is only present when an actual
    /// payload travels (client pushing a template, or server returning data). `value_len` is
    /// omitted in type-only records, i.e. when the client asks the server for a length.
    #[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
    pub struct Attribute {
        #[serde(
            rename = "type",
            default,
            deserialize_with = "lenient_u32",
            skip_serializing_if = "Option::is_none"
        )]
        pub type_: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub value: Option<String>,
        #[serde(
            rename = "valueLen",
            default,
            deserialize_with = "lenient_u32",
            skip_serializing_if = "Option::is_none"
        )]
        pub value_len: Option<u32>,
    }

    /// Any JSON value is accepted here; anything that is not an unsigned 32-bit number becomes
    /// `None`, leaving the record check to the attribute decoder.
    fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok()))
    }

    #[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
    pub struct Version {
        pub major: u8,
        pub minor: u8,
    }

    #[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
    pub struct Info {
        pub cryptoki_version: Version,
        pub manufacturer_id: String,
        pub flags: u64,
        pub library_description: String,
        pub library_version: Version,
    }

    #[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
    pub struct SlotInfo {
        pub slot_description: String,
        pub manufacturer_id: String,
        pub flags: u64,
        pub hardware_version: Version,
        pub firmware_version: Version,
    }

    #[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
    pub struct TokenInfo {
        pub label: String,
        pub manufacturer_id: String,
        pub model: String,
        pub serial_number: String,
        pub flags: u64,
        pub max_session_count: u64,
        pub session_count: u64,
        pub max_rw_session_count: u64,
        pub rw_session_count: u64,
        pub max_pin_len: u64,
        pub min_pin_len: u64,
        pub total_public_memory: u64,
        pub free_public_memory: u64,
        pub total_private_memory: u64,
        pub free_private_memory: u64,
        pub hardware_version: Version,
        pub firmware_version: Version,
        pub utc_time: String,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct Mechanism {
        pub mechanism: u64,
        /// Base64 encoded mechanism parameter bytes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub parameter: Option<String>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct GetSlotListArgs {
        pub token_present: bool,
        /// Capacity of the caller's slot list, `None` when the caller only asks for the count.
        pub count: Option<u64>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct SlotArgs {
        pub slot_id: u64,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct OpenSessionArgs {
        pub slot_id: u64,
        pub flags: u64,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct SessionArgs {
        pub session: u64,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct LoginArgs {
        pub session: u64,
        pub user_type: u64,
        /// Base64 encoded PIN.
        pub pin: String,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct GetAttributeValueArgs {
        pub session: u64,
        pub object: u64,
        pub template: Vec<Attribute>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct FindObjectsInitArgs {
        pub session: u64,
        pub template: Vec<Attribute>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct FindObjectsArgs {
        pub session: u64,
        pub max_count: u64,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct SignInitArgs {
        pub session: u64,
        pub mechanism: Mechanism,
        pub key: u64,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct SignArgs {
        pub session: u64,
        /// Base64 encoded data to sign.
        pub data: String,
        /// Capacity of the caller's signature buffer, `None` for a length query.
        pub signature_len: Option<u64>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct SignUpdateArgs {
        pub session: u64,
        /// Base64 encoded data part.
        pub part: String,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct SignFinalArgs {
        pub session: u64,
        /// Capacity of the caller's signature buffer, `None` for a length query.
        pub signature_len: Option<u64>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct SlotList {
        /// Number of slots the server knows about.
        pub count: u64,
        /// Slot IDs, present only when the caller provided a list.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub slots: Option<Vec<u64>>,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    pub struct Signature {
        /// Actual (or required) signature length.
        pub len: u64,
        /// Base64 encoded signature, absent when only the length is reported.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data: Option<String>,
    }
}

/// An RPC API request, holding the API endpoint (i.e. procedure) and its input params.
///
/// This type will provide serialization (and deserialization) facilities, so that it can be
/// sent over an RPC transport.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum ApiRequest {
    Initialize,
    Finalize,
    GetInfo,
    GetSlotList(schema::GetSlotListArgs),
    GetSlotInfo(schema::SlotArgs),
    GetTokenInfo(schema::SlotArgs),
    OpenSession(schema::OpenSessionArgs),
    CloseSession(schema::SessionArgs),
    CloseAllSessions(schema::SlotArgs),
    Login(schema::LoginArgs),
    Logout(schema::SessionArgs),
    GetAttributeValue(schema::GetAttributeValueArgs),
    FindObjectsInit(schema::FindObjectsInitArgs),
    FindObjects(schema::FindObjectsArgs),
    FindObjectsFinal(schema::SessionArgs),
    SignInit(schema::SignInitArgs),
    Sign(schema::SignArgs),
    SignUpdate(schema::SignUpdateArgs),
    SignFinal(schema::SignFinalArgs),
}

impl ApiRequest {
    /// Short endpoint name, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "Initialize",
            Self::Finalize => "Finalize",
            Self::GetInfo => "GetInfo",
            Self::GetSlotList(_) => "GetSlotList",
            Self::GetSlotInfo(_) => "GetSlotInfo",
            Self::GetTokenInfo(_) => "GetTokenInfo",
            Self::OpenSession(_) => "OpenSession",
            Self::CloseSession(_) => "CloseSession",
            Self::CloseAllSessions(_) => "CloseAllSessions",
            Self::Login(_) => "Login",
            Self::Logout(_) => "Logout",
            Self::GetAttributeValue(_) => "GetAttributeValue",
            Self::FindObjectsInit(_) => "FindObjectsInit",
            Self::FindObjects(_) => "FindObjects",
            Self::FindObjectsFinal(_) => "FindObjectsFinal",
            Self::SignInit(_) => "SignInit",
            Self::Sign(_) => "Sign",
            Self::SignUpdate(_) => "SignUpdate",
            Self::SignFinal(_) => "SignFinal",
        }
    }
}

/// Output payload of a response, one variant per kind of data an endpoint can return.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum ResponseBody {
    Info(schema::Info),
    SlotList(schema::SlotList),
    SlotInfo(schema::SlotInfo),
    TokenInfo(schema::TokenInfo),
    Session(u64),
    Template(Vec<schema::Attribute>),
    Objects(Vec<u64>),
    Signature(schema::Signature),
}

/// An RPC API response: the PKCS#11 return value reported by the remote token, plus the
/// endpoint output, if any.
///
/// The body may accompany a non-OK `rv` (e.g. a template holding the lengths the caller
/// needs after `CKR_BUFFER_TOO_SMALL`).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ApiResponse {
    pub rv: u64,
    #[serde(default)]
    pub body: Option<ResponseBody>,
}

impl ApiResponse {
    /// The PKCS#11 `CKR_OK` value.
    pub const RV_OK: u64 = 0;

    pub fn ok(body: Option<ResponseBody>) -> Self {
        Self {
            rv: Self::RV_OK,
            body,
        }
    }

    pub fn rv(rv: u64) -> Self {
        Self { rv, body: None }
    }

    pub fn is_ok(&self) -> bool {
        self.rv == Self::RV_OK
    }
}
