// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::pkcs11;
use crate::util::CkRawAttrTemplate;
use std::ptr;

/// See PKCS#11 v2.40 Section 5.7 Object management functions

pub extern "C" fn C_FindObjectsInit(
    hSession: pkcs11::CK_SESSION_HANDLE,
    pTemplate: pkcs11::CK_ATTRIBUTE_PTR,
    ulCount: pkcs11::CK_ULONG,
) -> pkcs11::CK_RV {
    trace!("C_FindObjectsInit() called");

    if ulCount > 0 && pTemplate.is_null() {
        error!("C_FindObjectsInit() called with non-zero count and NULL template");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);

    let count = if pTemplate.is_null() { 0 } else { ulCount as usize };
    let attr_template = unsafe { CkRawAttrTemplate::from_raw_ptr_unchecked(pTemplate, count) };
    attr_template
        .with_attrs(|attrs| client.find_objects_init(hSession, attrs))
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_FindObjects(
    hSession: pkcs11::CK_SESSION_HANDLE,
    phObject: pkcs11::CK_OBJECT_HANDLE_PTR,
    ulMaxObjectCount: pkcs11::CK_ULONG,
    pulObjectCount: pkcs11::CK_ULONG_PTR,
) -> pkcs11::CK_RV {
    trace!("C_FindObjects() called");

    if phObject.is_null() || pulObjectCount.is_null() {
        error!("C_FindObects(): NULL output pointer provided.");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);

    // Already checked for NULL.
    let out = unsafe { std::slice::from_raw_parts_mut(phObject, ulMaxObjectCount as usize) };
    match client.find_objects(hSession, out) {
        Ok(count) => {
            info!("C_FindObjects returning count={}", count);
            unsafe {
                ptr::write(pulObjectCount, count as pkcs11::CK_ULONG);
            }
            pkcs11::CKR_OK
        }
        Err(e) => e.into(),
    }
}

pub extern "C" fn C_FindObjectsFinal(hSession: pkcs11::CK_SESSION_HANDLE) -> pkcs11::CK_RV {
    trace!("C_FindObjectsFinal() called");

    lock_client!(guard, client);
    client
        .find_objects_final(hSession)
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}

pub extern "C" fn C_GetAttributeValue(
    hSession: pkcs11::CK_SESSION_HANDLE,
    hObject: pkcs11::CK_OBJECT_HANDLE,
    pTemplate: pkcs11::CK_ATTRIBUTE_PTR,
    ulCount: pkcs11::CK_ULONG,
) -> pkcs11::CK_RV {
    trace!("C_GetAttributeValue() called, count={}", ulCount);
    if pTemplate.is_null() {
        error!("C_GetAttributeValue() called with NULL output ptr");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);

    // Already checked for null
    let mut attr_tmpl =
        unsafe { CkRawAttrTemplate::from_raw_ptr_unchecked(pTemplate, ulCount as usize) };

    attr_tmpl
        .with_attrs_mut(|attrs| client.get_attribute_value(hSession, hObject, attrs))
        .map(|_| pkcs11::CKR_OK)
        .unwrap_or_else(|e| e.into())
}
