// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::pkcs11;

/// See PKCS#11 v2.40 Section 5.5 Slot and token management functions

pub extern "C" fn C_GetSlotList(
    tokenPresent: pkcs11::CK_BBOOL,
    pSlotList: pkcs11::CK_SLOT_ID_PTR,
    pulCount: pkcs11::CK_ULONG_PTR,
) -> pkcs11::CK_RV {
    trace!("C_GetSlotList() called.");

    if pulCount.is_null() {
        error!("C_GetSlotList() called with NULL count");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);

    // Already checked for NULL.
    let mut count = unsafe { std::ptr::read(pulCount) };
    let slots = ck_out_buf_to_opt_slice!(pSlotList, count);

    let rv = client
        .get_slot_list(tokenPresent != 0, slots, &mut count)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into());
    if rv == pkcs11::CKR_OK || rv == pkcs11::CKR_BUFFER_TOO_SMALL {
        unsafe {
            std::ptr::write(pulCount, count);
        }
    }
    rv
}

pub extern "C" fn C_GetSlotInfo(
    slotID: pkcs11::CK_SLOT_ID,
    pInfo: pkcs11::CK_SLOT_INFO_PTR,
) -> pkcs11::CK_RV {
    trace!("C_GetSlotInfo() called: slotID={}", slotID);

    if pInfo.is_null() {
        error!("C_GetSlotInfo() called with NULL info");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);

    client
        .get_slot_info(slotID)
        .map(|ck_info| {
            unsafe {
                std::ptr::write(pInfo, ck_info);
            }
            pkcs11::CKR_OK
        })
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_GetTokenInfo(
    slotID: pkcs11::CK_SLOT_ID,
    pInfo: pkcs11::CK_TOKEN_INFO_PTR,
) -> pkcs11::CK_RV {
    trace!("C_GetTokenInfo() called: slotID={}", slotID);

    if pInfo.is_null() {
        error!("C_GetTokenInfo() called with NULL OUTPUT pointer.");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);

    client
        .get_token_info(slotID)
        .map(|ck_info| {
            unsafe {
                std::ptr::write(pInfo, ck_info);
            }
            pkcs11::CKR_OK
        })
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_Login(
    hSession: pkcs11::CK_SESSION_HANDLE,
    userType: pkcs11::CK_USER_TYPE,
    pPin: pkcs11::CK_UTF8CHAR_PTR,
    ulPinLen: pkcs11::CK_ULONG,
) -> pkcs11::CK_RV {
    trace!("C_Login() called");

    let pin = ck_in_buf_to_slice!(pPin, ulPinLen);

    lock_client!(guard, client);
    client
        .login(hSession, userType, pin)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_Logout(hSession: pkcs11::CK_SESSION_HANDLE) -> pkcs11::CK_RV {
    trace!("C_Logout() called");

    lock_client!(guard, client);
    client
        .logout(hSession)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing;
    use rsc_rpc::api::schema;
    use rsc_rpc::{ApiRequest, ApiResponse, ResponseBody};

    #[test]
    fn test_get_slot_list_two_phase() {
        let _lock = testing::lock();
        testing::install(vec![
            Some(ApiResponse::ok(Some(ResponseBody::SlotList(
                schema::SlotList {
                    count: 2,
                    slots: None,
                },
            )))),
            Some(ApiResponse::ok(Some(ResponseBody::SlotList(
                schema::SlotList {
                    count: 2,
                    slots: Some(vec![1, 4]),
                },
            )))),
        ]);

        assert_eq!(
            C_GetSlotList(pkcs11::CK_TRUE, std::ptr::null_mut(), std::ptr::null_mut()),
            pkcs11::CKR_ARGUMENTS_BAD
        );

        let mut count: pkcs11::CK_ULONG = 0;
        assert_eq!(
            C_GetSlotList(pkcs11::CK_TRUE, std::ptr::null_mut(), &mut count),
            pkcs11::CKR_OK
        );
        assert_eq!(count, 2);

        let mut slots = vec![0 as pkcs11::CK_SLOT_ID; count as usize];
        assert_eq!(
            C_GetSlotList(pkcs11::CK_TRUE, slots.as_mut_ptr(), &mut count),
            pkcs11::CKR_OK
        );
        assert_eq!(slots, vec![1, 4]);
        testing::uninstall();
    }

    #[test]
    fn test_login_logout() {
        let _lock = testing::lock();
        let reqs = testing::install(vec![
            Some(ApiResponse::rv(pkcs11::CKR_PIN_INCORRECT as u64)),
            Some(ApiResponse::ok(None)),
            Some(ApiResponse::ok(None)),
        ]);

        let mut pin = *b"0000";
        assert_eq!(
            C_Login(5, pkcs11::CKU_USER, pin.as_mut_ptr(), pin.len() as pkcs11::CK_ULONG),
            pkcs11::CKR_PIN_INCORRECT
        );
        assert_eq!(
            C_Login(5, pkcs11::CKU_USER, std::ptr::null_mut(), 4),
            pkcs11::CKR_ARGUMENTS_BAD
        );
        // Protected authentication path: no PIN at all.
        assert_eq!(
            C_Login(5, pkcs11::CKU_USER, std::ptr::null_mut(), 0),
            pkcs11::CKR_OK
        );
        assert_eq!(C_Logout(5), pkcs11::CKR_OK);

        let reqs = reqs.lock().unwrap();
        assert_eq!(reqs.len(), 3);
        assert_eq!(
            reqs[1],
            ApiRequest::Login(schema::LoginArgs {
                session: 5,
                user_type: pkcs11::CKU_USER as u64,
                pin: String::new(),
            })
        );
        testing::uninstall();
    }
}
