// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

extern crate lazy_static;
#[macro_use]
extern crate log;

#[macro_use]
mod util;
mod api;
pub mod client;
pub mod codec;
pub mod pkcs11;

use rsc_common::config::Error as ConfigError;
use rsc_rpc::TransportError;

/// Library and device information
mod defs {
    use super::pkcs11;

    pub const CRYPTOKI_VERSION: pkcs11::CK_VERSION = ck_version!(
        pkcs11::CRYPTOKI_VERSION_MAJOR as u8,
        pkcs11::CRYPTOKI_VERSION_MINOR as u8
    );
}

mod data {
    use lazy_static::lazy_static;
    use std::sync::{Arc, Mutex};

    use super::api;
    use super::api::nyi;
    use super::client::Client;
    use super::defs;
    use super::pkcs11::*;
    use rsc_rpc::Transport;

    pub type RemoteClient = Client<Box<dyn Transport + Send>>;

    /// Supported Criptoki PKCS#11 functions. As per specification,
    /// all functions are exported but some return CKR_FUNCTION_NOT_SUPPORTED.
    pub static FN_LIST: CK_FUNCTION_LIST = CK_FUNCTION_LIST {
        version: defs::CRYPTOKI_VERSION,
        C_Initialize: Some(api::C_Initialize),
        C_Finalize: Some(api::C_Finalize),
        C_GetInfo: Some(api::C_GetInfo),
        C_GetFunctionList: Some(api::C_GetFunctionList),
        C_GetSlotList: Some(api::token::C_GetSlotList),
        C_GetSlotInfo: Some(api::token::C_GetSlotInfo),
        C_GetTokenInfo: Some(api::token::C_GetTokenInfo),
        C_GetMechanismList: Some(nyi::C_GetMechanismList),
        C_GetMechanismInfo: Some(nyi::C_GetMechanismInfo),
        C_InitToken: Some(nyi::C_InitToken),
        C_InitPIN: Some(nyi::C_InitPIN),
        C_SetPIN: Some(nyi::C_SetPIN),
        C_OpenSession: Some(api::session::C_OpenSession),
        C_CloseSession: Some(api::session::C_CloseSession),
        C_CloseAllSessions: Some(api::session::C_CloseAllSessions),
        C_GetSessionInfo: Some(nyi::C_GetSessionInfo),
        C_GetOperationState: Some(nyi::C_GetOperationState),
        C_SetOperationState: Some(nyi::C_SetOperationState),
        C_Login: Some(api::token::C_Login),
        C_Logout: Some(api::token::C_Logout),
        C_CreateObject: Some(nyi::C_CreateObject),
        C_CopyObject: Some(nyi::C_CopyObject),
        C_DestroyObject: Some(nyi::C_DestroyObject),
        C_GetObjectSize: Some(nyi::C_GetObjectSize),
        C_GetAttributeValue: Some(api::object::C_GetAttributeValue),
        C_SetAttributeValue: Some(nyi::C_SetAttributeValue),
        C_FindObjectsInit: Some(api::object::C_FindObjectsInit),
        C_FindObjects: Some(api::object::C_FindObjects),
        C_FindObjectsFinal: Some(api::object::C_FindObjectsFinal),
        C_EncryptInit: Some(nyi::C_EncryptInit),
        C_Encrypt: Some(nyi::C_Encrypt),
        C_EncryptUpdate: Some(nyi::C_EncryptUpdate),
        C_EncryptFinal: Some(nyi::C_EncryptFinal),
        C_DecryptInit: Some(nyi::C_DecryptInit),
        C_Decrypt: Some(nyi::C_Decrypt),
        C_DecryptUpdate: Some(nyi::C_DecryptUpdate),
        C_DecryptFinal: Some(nyi::C_DecryptFinal),
        C_DigestInit: Some(nyi::C_DigestInit),
        C_Digest: Some(nyi::C_Digest),
        C_DigestUpdate: Some(nyi::C_DigestUpdate),
        C_DigestKey: Some(nyi::C_DigestKey),
        C_DigestFinal: Some(nyi::C_DigestFinal),
        C_SignInit: Some(api::sign::C_SignInit),
        C_Sign: Some(api::sign::C_Sign),
        C_SignUpdate: Some(api::sign::C_SignUpdate),
        C_SignFinal: Some(api::sign::C_SignFinal),
        C_SignRecoverInit: Some(nyi::C_SignRecoverInit),
        C_SignRecover: Some(nyi::C_SignRecover),
        C_VerifyInit: Some(nyi::C_VerifyInit),
        C_Verify: Some(nyi::C_Verify),
        C_VerifyUpdate: Some(nyi::C_VerifyUpdate),
        C_VerifyFinal: Some(nyi::C_VerifyFinal),
        C_VerifyRecoverInit: Some(nyi::C_VerifyRecoverInit),
        C_VerifyRecover: Some(nyi::C_VerifyRecover),
        C_DigestEncryptUpdate: Some(nyi::C_DigestEncryptUpdate),
        C_DecryptDigestUpdate: Some(nyi::C_DecryptDigestUpdate),
        C_SignEncryptUpdate: Some(nyi::C_SignEncryptUpdate),
        C_DecryptVerifyUpdate: Some(nyi::C_DecryptVerifyUpdate),
        C_GenerateKey: Some(nyi::C_GenerateKey),
        C_GenerateKeyPair: Some(nyi::C_GenerateKeyPair),
        C_WrapKey: Some(nyi::C_WrapKey),
        C_UnwrapKey: Some(nyi::C_UnwrapKey),
        C_DeriveKey: Some(nyi::C_DeriveKey),
        C_SeedRandom: Some(nyi::C_SeedRandom),
        C_GenerateRandom: Some(nyi::C_GenerateRandom),
        C_GetFunctionStatus: Some(api::session::C_GetFunctionStatus),
        C_CancelFunction: Some(api::session::C_CancelFunction),
        C_WaitForSlotEvent: Some(nyi::C_WaitForSlotEvent),
    };

    lazy_static! {
        /// The client context: present between C_Initialize and C_Finalize.
        pub static ref CLIENT: Arc<Mutex<Option<RemoteClient>>> = Arc::new(Mutex::new(None));
    }
}

#[derive(Debug)]
pub enum Error {
    /// A status reported by the remote token.
    CkError(pkcs11::CK_RV),
    CodecError(codec::Error),
    ConfigError(ConfigError),
    TransportError(TransportError),
    /// The response body does not match the request.
    UnexpectedResponse,
    GeneralError,
}

impl Error {
    pub fn ck_rv(&self) -> pkcs11::CK_RV {
        match self {
            Self::CkError(code) => *code,
            Self::CodecError(codec::Error::BufferTooSmall) => pkcs11::CKR_BUFFER_TOO_SMALL,
            Self::TransportError(_) => pkcs11::CKR_DEVICE_ERROR,
            Self::UnexpectedResponse => pkcs11::CKR_DEVICE_ERROR,
            _ => pkcs11::CKR_GENERAL_ERROR,
        }
    }
}

impl From<Error> for pkcs11::CK_RV {
    fn from(src: Error) -> pkcs11::CK_RV {
        src.ck_rv()
    }
}

impl From<codec::Error> for Error {
    fn from(src: codec::Error) -> Self {
        Self::CodecError(src)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            Error::CkError(pkcs11::CKR_PIN_INCORRECT).ck_rv(),
            pkcs11::CKR_PIN_INCORRECT
        );
        assert_eq!(
            Error::CodecError(codec::Error::BufferTooSmall).ck_rv(),
            pkcs11::CKR_BUFFER_TOO_SMALL
        );
        assert_eq!(
            Error::CodecError(codec::Error::TooManyAttributes).ck_rv(),
            pkcs11::CKR_GENERAL_ERROR
        );
        assert_eq!(
            Error::CodecError(codec::Error::EncodingOverflow).ck_rv(),
            pkcs11::CKR_GENERAL_ERROR
        );
        assert_eq!(
            Error::TransportError(TransportError::ParseError).ck_rv(),
            pkcs11::CKR_DEVICE_ERROR
        );
        assert_eq!(Error::UnexpectedResponse.ck_rv(), pkcs11::CKR_DEVICE_ERROR);
        assert_eq!(
            Error::ConfigError(ConfigError::NotConfigured("secret")).ck_rv(),
            pkcs11::CKR_GENERAL_ERROR
        );
    }
}
