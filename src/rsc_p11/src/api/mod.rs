// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![allow(non_snake_case)]

/// Utility macro for locking the client context
/// It creates two variables in the calling scope, one holding the lock guard
/// and the other a mutable reference to the client.
macro_rules! lock_client {
    ($guard:ident, $client:ident) => {
        let mut $guard = match crate::data::CLIENT.lock() {
            Ok(guard) => guard,
            Err(_) => {
                error!("Client context lock poisoned");
                return crate::Error::GeneralError.into();
            }
        };
        let $client = match $guard.as_mut() {
            Some(client) => client,
            None => return crate::pkcs11::CKR_CRYPTOKI_NOT_INITIALIZED,
        };
    };
}

/// Utility macro for passing raw foreign input buffers to the client.
/// A NULL buffer is only accepted for zero-length input.
macro_rules! ck_in_buf_to_slice {
    ($buf_ptr:ident, $buf_len:ident) => {{
        if $buf_ptr.is_null() {
            if $buf_len != 0 {
                error!("NULL input buffer with length {}", $buf_len);
                return crate::pkcs11::CKR_ARGUMENTS_BAD;
            }
            &[][..]
        } else {
            unsafe { std::slice::from_raw_parts($buf_ptr as *const _, $buf_len as usize) }
        }
    }};
}

/// Utility macro for two-phase output buffers (PKCS#11 v2.40 Section 5.2).
/// A NULL buffer becomes `None`, i.e. a length query.
macro_rules! ck_out_buf_to_opt_slice {
    ($buf_ptr:ident, $buf_len:expr) => {
        if $buf_ptr.is_null() {
            None
        } else {
            Some(unsafe { std::slice::from_raw_parts_mut($buf_ptr, $buf_len as usize) })
        }
    };
}

pub mod nyi;
pub mod object;
pub mod session;
pub mod sign;
pub mod token;

use rsc_common::config::{ConfigProvider, EnvConfig};
use rsc_common::defs::DEFAULT_LOG_LEVEL;
use rsc_rpc::Transport;

use crate::client::Client;
use crate::data;
use crate::pkcs11;
use crate::util::logger::Logger;
use crate::Error;

/// See PKCS#11 v2.40 Section 5.4 General-purpose functions
#[no_mangle]
pub extern "C" fn C_GetFunctionList(
    ppFunctionList: pkcs11::CK_FUNCTION_LIST_PTR_PTR,
) -> pkcs11::CK_RV {
    if ppFunctionList.is_null() {
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    unsafe {
        std::ptr::write(
            ppFunctionList,
            &data::FN_LIST as *const pkcs11::CK_FUNCTION_LIST as pkcs11::CK_FUNCTION_LIST_PTR,
        );
    }
    pkcs11::CKR_OK
}

pub extern "C" fn C_Initialize(pInitArgs: pkcs11::CK_VOID_PTR) -> pkcs11::CK_RV {
    let config = EnvConfig::from_process_env().resolve();
    Logger::init(
        config
            .as_ref()
            .map(|cfg| cfg.log_level)
            .unwrap_or(DEFAULT_LOG_LEVEL),
    );

    trace!("C_Initialize() called");

    if !pInitArgs.is_null() {
        let args = pInitArgs as pkcs11::CK_C_INITIALIZE_ARGS_PTR;
        unsafe {
            if !(*args).pReserved.is_null() {
                return pkcs11::CKR_ARGUMENTS_BAD;
            }
        }
    }

    let mut maybe_client = match data::CLIENT.lock() {
        Ok(guard) => guard,
        Err(_) => return Error::GeneralError.into(),
    };
    if maybe_client.is_some() {
        return pkcs11::CKR_CRYPTOKI_ALREADY_INITIALIZED;
    }

    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("C_Initialize(): remotesc is not configured: {:?}", e);
            return Error::ConfigError(e).into();
        }
    };
    let transport = match rsc_rpc::connect(&config) {
        Ok(xport) => xport,
        Err(e) => {
            error!("C_Initialize(): unable to reach {}: {:?}", config.addr, e);
            return Error::TransportError(e).into();
        }
    };

    let transport: Box<dyn Transport + Send> = Box::new(transport);
    let mut client = Client::new(transport);
    match client.initialize() {
        Ok(_) => {
            maybe_client.replace(client);
            pkcs11::CKR_OK
        }
        Err(e) => e.into(),
    }
}

pub extern "C" fn C_Finalize(pReserved: pkcs11::CK_VOID_PTR) -> pkcs11::CK_RV {
    trace!("C_Finalize() called");

    if !pReserved.is_null() {
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    let mut maybe_client = match data::CLIENT.lock() {
        Ok(guard) => guard,
        Err(_) => return Error::GeneralError.into(),
    };
    match maybe_client.take() {
        None => pkcs11::CKR_CRYPTOKI_NOT_INITIALIZED,
        Some(mut client) => client
            .finalize()
            .map(|_| pkcs11::CKR_OK)
            .unwrap_or_else(|e| e.into()),
    }
}

pub extern "C" fn C_GetInfo(pInfo: pkcs11::CK_INFO_PTR) -> pkcs11::CK_RV {
    trace!("C_GetInfo() called");

    if pInfo.is_null() {
        error!("C_GetInfo() received NULL pointer.");
        return pkcs11::CKR_ARGUMENTS_BAD;
    }

    lock_client!(guard, client);
    client
        .get_info()
        .map(|info| {
            unsafe {
                std::ptr::write(pInfo, info);
            }
            pkcs11::CKR_OK
        })
        .unwrap_or_else(|e| e.into())
}

#[cfg(test)]
pub(crate) mod testing {
    use lazy_static::lazy_static;
    use std::sync::{Arc, Mutex, MutexGuard};

    use rsc_rpc::{ApiRequest, ApiResponse, Transport};

    use crate::client::mock::MockTransport;
    use crate::client::Client;
    use crate::data;

    lazy_static! {
        /// Serializes the tests touching the process-wide client context.
        static ref TEST_LOCK: Mutex<()> = Mutex::new(());
    }

    pub fn lock() -> MutexGuard<'static, ()> {
        TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Install a client backed by a scripted transport, as a successful C_Initialize would.
    pub fn install(responses: Vec<Option<ApiResponse>>) -> Arc<Mutex<Vec<ApiRequest>>> {
        let (xport, reqs) = MockTransport::new(responses);
        let xport: Box<dyn Transport + Send> = Box::new(xport);
        data::CLIENT.lock().unwrap().replace(Client::new(xport));
        reqs
    }

    pub fn uninstall() {
        data::CLIENT.lock().unwrap().take();
    }
}
