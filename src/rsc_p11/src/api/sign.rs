// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::pkcs11;
use crate::util::CkRawMechanism;

/// See PKCS#11 v2.40 Section 5.11 Signing and MACing functions

pub extern "C" fn C_SignInit(
    hSession: pkcs11::CK_SESSION_HANDLE,
    pMechanism: pkcs11::CK_MECHANISM_PTR,
    hKey: pkcs11::CK_OBJECT_HANDLE,
) -> pkcs11::CK_RV {
    trace!("C_SignInit() called");

    if pMechanism.is_null() {
        error!("C_SignInit() called with NULL mech");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }
    let raw_mech = unsafe { CkRawMechanism::from_raw_ptr_unchecked(pMechanism) };

    lock_client!(guard, client);
    client
        .sign_init(hSession, raw_mech.type_(), raw_mech.param_bytes(), hKey)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_Sign(
    hSession: pkcs11::CK_SESSION_HANDLE,
    pData: pkcs11::CK_BYTE_PTR,
    ulDataLen: pkcs11::CK_ULONG,
    pSignature: pkcs11::CK_BYTE_PTR,
    pulSignatureLen: pkcs11::CK_ULONG_PTR,
) -> pkcs11::CK_RV {
    trace!("C_Sign() called");

    if pulSignatureLen.is_null() {
        error!("C_Sign() called with NULL signature length ptr");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }
    let in_slice = ck_in_buf_to_slice!(pData, ulDataLen);

    lock_client!(guard, client);

    let mut sig_len = unsafe { std::ptr::read(pulSignatureLen) };
    let out_slice = ck_out_buf_to_opt_slice!(pSignature, sig_len);
    let rv = client
        .sign(hSession, in_slice, out_slice, &mut sig_len)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into());
    write_sig_len(rv, pulSignatureLen, sig_len)
}

pub extern "C" fn C_SignUpdate(
    hSession: pkcs11::CK_SESSION_HANDLE,
    pPart: pkcs11::CK_BYTE_PTR,
    ulPartLen: pkcs11::CK_ULONG,
) -> pkcs11::CK_RV {
    trace!("C_SignUpdate() called");

    let in_slice = ck_in_buf_to_slice!(pPart, ulPartLen);

    lock_client!(guard, client);
    client
        .sign_update(hSession, in_slice)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_SignFinal(
    hSession: pkcs11::CK_SESSION_HANDLE,
    pSignature: pkcs11::CK_BYTE_PTR,
    pulSignatureLen: pkcs11::CK_ULONG_PTR,
) -> pkcs11::CK_RV {
    trace!("C_SignFinal() called");

    if pulSignatureLen.is_null() {
        error!("C_SignFinal() called with NULL signature length ptr");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);

    let mut sig_len = unsafe { std::ptr::read(pulSignatureLen) };
    let out_slice = ck_out_buf_to_opt_slice!(pSignature, sig_len);
    let rv = client
        .sign_final(hSession, out_slice, &mut sig_len)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into());
    write_sig_len(rv, pulSignatureLen, sig_len)
}

/// The signature length is reported on success and alongside CKR_BUFFER_TOO_SMALL.
fn write_sig_len(
    rv: pkcs11::CK_RV,
    len_ptr: pkcs11::CK_ULONG_PTR,
    len: pkcs11::CK_ULONG,
) -> pkcs11::CK_RV {
    if rv == pkcs11::CKR_OK || rv == pkcs11::CKR_BUFFER_TOO_SMALL {
        unsafe {
            std::ptr::write(len_ptr, len);
        }
    }
    rv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing;
    use rsc_rpc::api::schema;
    use rsc_rpc::{ApiRequest, ApiResponse, ResponseBody};

    fn signature(len: u64, data: Option<&str>) -> Option<ApiResponse> {
        Some(ApiResponse::ok(Some(ResponseBody::Signature(
            schema::Signature {
                len,
                data: data.map(str::to_string),
            },
        ))))
    }

    #[test]
    fn test_sign_single_part() {
        let _lock = testing::lock();
        let reqs = testing::install(vec![
            Some(ApiResponse::ok(None)),
            signature(4, None),
            signature(4, Some("AQIDBA==")),
        ]);

        let mut mech = pkcs11::CK_MECHANISM {
            mechanism: pkcs11::CKM_ECDSA,
            pParameter: std::ptr::null_mut(),
            ulParameterLen: 0,
        };
        assert_eq!(C_SignInit(1, std::ptr::null_mut(), 2), pkcs11::CKR_ARGUMENTS_BAD);
        assert_eq!(C_SignInit(1, &mut mech, 2), pkcs11::CKR_OK);

        let mut data = *b"digest";
        let mut sig_len: pkcs11::CK_ULONG = 0;
        assert_eq!(
            C_Sign(
                1,
                data.as_mut_ptr(),
                data.len() as pkcs11::CK_ULONG,
                std::ptr::null_mut(),
                &mut sig_len
            ),
            pkcs11::CKR_OK
        );
        assert_eq!(sig_len, 4);

        let mut sig = vec![0u8; sig_len as usize];
        assert_eq!(
            C_Sign(
                1,
                data.as_mut_ptr(),
                data.len() as pkcs11::CK_ULONG,
                sig.as_mut_ptr(),
                &mut sig_len
            ),
            pkcs11::CKR_OK
        );
        assert_eq!(sig, vec![1, 2, 3, 4]);

        assert_eq!(
            reqs.lock().unwrap()[0],
            ApiRequest::SignInit(schema::SignInitArgs {
                session: 1,
                mechanism: schema::Mechanism {
                    mechanism: pkcs11::CKM_ECDSA as u64,
                    parameter: None,
                },
                key: 2,
            })
        );
        testing::uninstall();
    }

    #[test]
    fn test_sign_multi_part_buffer_too_small() {
        let _lock = testing::lock();
        let reqs = testing::install(vec![
            Some(ApiResponse::ok(None)),
            Some(ApiResponse::ok(None)),
            Some(ApiResponse {
                rv: pkcs11::CKR_BUFFER_TOO_SMALL as u64,
                body: Some(ResponseBody::Signature(schema::Signature {
                    len: 64,
                    data: None,
                })),
            }),
        ]);

        let mut part = [0u8; 32];
        assert_eq!(
            C_SignUpdate(1, part.as_mut_ptr(), part.len() as pkcs11::CK_ULONG),
            pkcs11::CKR_OK
        );
        assert_eq!(
            C_SignUpdate(1, std::ptr::null_mut(), 4),
            pkcs11::CKR_ARGUMENTS_BAD
        );
        assert_eq!(C_SignUpdate(1, std::ptr::null_mut(), 0), pkcs11::CKR_OK);

        let mut sig = [0u8; 8];
        let mut sig_len = sig.len() as pkcs11::CK_ULONG;
        assert_eq!(
            C_SignFinal(1, sig.as_mut_ptr(), &mut sig_len),
            pkcs11::CKR_BUFFER_TOO_SMALL
        );
        assert_eq!(sig_len, 64);
        assert_eq!(
            C_SignFinal(1, sig.as_mut_ptr(), std::ptr::null_mut()),
            pkcs11::CKR_ARGUMENTS_BAD
        );

        assert_eq!(
            reqs.lock().unwrap()[1],
            ApiRequest::SignUpdate(schema::SignUpdateArgs {
                session: 1,
                part: String::new(),
            })
        );
        testing::uninstall();
    }
}
