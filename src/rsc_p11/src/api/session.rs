// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::pkcs11;

/// See PKCS#11 v2.40 Section 5.6 Session management functions

pub extern "C" fn C_OpenSession(
    slotID: pkcs11::CK_SLOT_ID,
    flags: pkcs11::CK_FLAGS,
    _pApplication: pkcs11::CK_VOID_PTR,
    _Notify: pkcs11::CK_NOTIFY,
    phSession: pkcs11::CK_SESSION_HANDLE_PTR,
) -> pkcs11::CK_RV {
    trace!("C_OpenSession() called: slotID={}, flags={:#x}", slotID, flags);

    if phSession.is_null() {
        error!("C_OpenSession() called with NULL session handle ptr");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);
    client
        .open_session(slotID, flags)
        .map(|handle| {
            unsafe {
                std::ptr::write(phSession, handle);
            }
            pkcs11::CKR_OK
        })
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_CloseSession(hSession: pkcs11::CK_SESSION_HANDLE) -> pkcs11::CK_RV {
    trace!("C_CloseSession() called");

    lock_client!(guard, client);
    client
        .close_session(hSession)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_CloseAllSessions(slotID: pkcs11::CK_SLOT_ID) -> pkcs11::CK_RV {
    trace!("C_CloseAllSessions() called");

    lock_client!(guard, client);
    client
        .close_all_sessions(slotID)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_GetFunctionStatus(_hSession: pkcs11::CK_SESSION_HANDLE) -> pkcs11::CK_RV {
    trace!("C_GetFunctionStatus() called");
    lock_client!(_guard, _client);
    pkcs11::CKR_FUNCTION_NOT_PARALLEL
}

pub extern "C" fn C_CancelFunction(_hSession: pkcs11::CK_SESSION_HANDLE) -> pkcs11::CK_RV {
    trace!("C_CancelFunction() called");
    lock_client!(_guard, _client);
    pkcs11::CKR_FUNCTION_NOT_PARALLEL
}
