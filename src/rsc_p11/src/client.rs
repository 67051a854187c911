// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The client context: maps every remoted Cryptoki call onto one RPC exchange.
//!
//! Handles (slots, sessions, objects) are opaque to the client and travel untouched. The
//! client keeps no session or operation state of its own; call ordering is enforced by the
//! remote token, whose status codes are passed through verbatim.

use rsc_rpc::api::schema;
use rsc_rpc::{ApiRequest, ApiResponse, ResponseBody, Transport};

use crate::codec::{AttrCodec, Attribute, Direction};
use crate::pkcs11;
use crate::{Error, Result};

pub struct Client<T: Transport> {
    transport: T,
    codec: AttrCodec,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self::with_codec(transport, AttrCodec::default())
    }

    pub fn with_codec(transport: T, codec: AttrCodec) -> Self {
        Self { transport, codec }
    }

    fn call(&mut self, req: ApiRequest) -> Result<ApiResponse> {
        debug!("RPC call: {}", req.name());
        let resp = self.transport.call(&req).map_err(|e| {
            error!("RPC {} failed: {:?}", req.name(), e);
            Error::TransportError(e)
        })?;
        if !resp.is_ok() {
            debug!("RPC {} returned rv={:#x}", req.name(), resp.rv);
        }
        Ok(resp)
    }

    /// Perform a call whose only output is its status.
    fn call_status(&mut self, req: ApiRequest) -> Result<()> {
        let resp = self.call(req)?;
        status(resp.rv)
    }

    /// Perform a call that must produce a body on success.
    fn call_body(&mut self, req: ApiRequest) -> Result<ResponseBody> {
        let resp = self.call(req)?;
        status(resp.rv)?;
        resp.body.ok_or(Error::UnexpectedResponse)
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.call_status(ApiRequest::Initialize)
    }

    pub fn finalize(&mut self) -> Result<()> {
        self.call_status(ApiRequest::Finalize)
    }

    pub fn get_info(&mut self) -> Result<pkcs11::CK_INFO> {
        match self.call_body(ApiRequest::GetInfo)? {
            ResponseBody::Info(info) => Ok(ck_info(&info)),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    /// Fetch the slot list. `count` is always set to the number of slots the server reports;
    /// `slots == None` asks for the count only.
    pub fn get_slot_list(
        &mut self,
        token_present: bool,
        slots: Option<&mut [pkcs11::CK_SLOT_ID]>,
        count: &mut pkcs11::CK_ULONG,
    ) -> Result<()> {
        let ApiResponse { rv, body } =
            self.call(ApiRequest::GetSlotList(schema::GetSlotListArgs {
                token_present,
                count: slots.as_ref().map(|s| s.len() as u64),
            }))?;
        let list = match body {
            Some(ResponseBody::SlotList(list)) => list,
            None if rv != ApiResponse::RV_OK => return status(rv),
            _ => return Err(Error::UnexpectedResponse),
        };
        *count = list.count as pkcs11::CK_ULONG;
        status(rv)?;

        match (slots, list.slots) {
            (Some(out), Some(ids)) => {
                if ids.len() > out.len() {
                    return Err(Error::CkError(pkcs11::CKR_BUFFER_TOO_SMALL));
                }
                for (dst, id) in out.iter_mut().zip(ids.iter()) {
                    *dst = *id as pkcs11::CK_SLOT_ID;
                }
                *count = ids.len() as pkcs11::CK_ULONG;
                Ok(())
            }
            // A buffer was supplied, so a non-empty list must come back with ids.
            (Some(_), None) if list.count != 0 => {
                error!("GetSlotList reported {} slots without ids", list.count);
                Err(Error::UnexpectedResponse)
            }
            _ => Ok(()),
        }
    }

    pub fn get_slot_info(&mut self, slot: pkcs11::CK_SLOT_ID) -> Result<pkcs11::CK_SLOT_INFO> {
        match self.call_body(ApiRequest::GetSlotInfo(schema::SlotArgs {
            slot_id: slot as u64,
        }))? {
            ResponseBody::SlotInfo(info) => Ok(ck_slot_info(&info)),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn get_token_info(&mut self, slot: pkcs11::CK_SLOT_ID) -> Result<pkcs11::CK_TOKEN_INFO> {
        match self.call_body(ApiRequest::GetTokenInfo(schema::SlotArgs {
            slot_id: slot as u64,
        }))? {
            ResponseBody::TokenInfo(info) => Ok(ck_token_info(&info)),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn open_session(
        &mut self,
        slot: pkcs11::CK_SLOT_ID,
        flags: pkcs11::CK_FLAGS,
    ) -> Result<pkcs11::CK_SESSION_HANDLE> {
        match self.call_body(ApiRequest::OpenSession(schema::OpenSessionArgs {
            slot_id: slot as u64,
            flags: flags as u64,
        }))? {
            ResponseBody::Session(handle) => Ok(handle as pkcs11::CK_SESSION_HANDLE),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn close_session(&mut self, session: pkcs11::CK_SESSION_HANDLE) -> Result<()> {
        self.call_status(ApiRequest::CloseSession(schema::SessionArgs {
            session: session as u64,
        }))
    }

    pub fn close_all_sessions(&mut self, slot: pkcs11::CK_SLOT_ID) -> Result<()> {
        self.call_status(ApiRequest::CloseAllSessions(schema::SlotArgs {
            slot_id: slot as u64,
        }))
    }

    pub fn login(
        &mut self,
        session: pkcs11::CK_SESSION_HANDLE,
        user_type: pkcs11::CK_USER_TYPE,
        pin: &[u8],
    ) -> Result<()> {
        let pin = self.codec.encode_bytes(pin)?;
        self.call_status(ApiRequest::Login(schema::LoginArgs {
            session: session as u64,
            user_type: user_type as u64,
            pin,
        }))
    }

    pub fn logout(&mut self, session: pkcs11::CK_SESSION_HANDLE) -> Result<()> {
        self.call_status(ApiRequest::Logout(schema::SessionArgs {
            session: session as u64,
        }))
    }

    /// Read attribute values (or lengths) into `attrs`.
    ///
    /// The returned template is decoded for the statuses that still carry per-attribute
    /// results, so that the caller sees which lengths / values are available.
    pub fn get_attribute_value(
        &mut self,
        session: pkcs11::CK_SESSION_HANDLE,
        object: pkcs11::CK_OBJECT_HANDLE,
        attrs: &mut [Attribute],
    ) -> Result<()> {
        let template = self.codec.encode(attrs, Direction::Query).map_err(|e| {
            warn!("Unable to encode attribute template: {:?}", e);
            Error::CodecError(e)
        })?;
        let resp = self.call(ApiRequest::GetAttributeValue(
            schema::GetAttributeValueArgs {
                session: session as u64,
                object: object as u64,
                template,
            },
        ))?;

        let partial = matches!(
            resp.rv as pkcs11::CK_RV,
            pkcs11::CKR_ATTRIBUTE_SENSITIVE
                | pkcs11::CKR_ATTRIBUTE_TYPE_INVALID
                | pkcs11::CKR_BUFFER_TOO_SMALL
        );
        match resp.body {
            Some(ResponseBody::Template(ref records)) if resp.is_ok() || partial => {
                self.codec.decode(records, attrs).map_err(|e| {
                    warn!("Unable to decode attribute template: {:?}", e);
                    Error::CodecError(e)
                })?;
                status(resp.rv)
            }
            None if !resp.is_ok() => status(resp.rv),
            _ if resp.is_ok() => Err(Error::UnexpectedResponse),
            _ => status(resp.rv),
        }
    }

    pub fn find_objects_init(
        &mut self,
        session: pkcs11::CK_SESSION_HANDLE,
        attrs: &[Attribute],
    ) -> Result<()> {
        let template = self.codec.encode(attrs, Direction::Set).map_err(|e| {
            warn!("Unable to encode search template: {:?}", e);
            Error::CodecError(e)
        })?;
        self.call_status(ApiRequest::FindObjectsInit(schema::FindObjectsInitArgs {
            session: session as u64,
            template,
        }))
    }

    /// Fetch the next batch of search results into `objects`, returning how many were written.
    pub fn find_objects(
        &mut self,
        session: pkcs11::CK_SESSION_HANDLE,
        objects: &mut [pkcs11::CK_OBJECT_HANDLE],
    ) -> Result<usize> {
        let handles = match self.call_body(ApiRequest::FindObjects(schema::FindObjectsArgs {
            session: session as u64,
            max_count: objects.len() as u64,
        }))? {
            ResponseBody::Objects(handles) => handles,
            _ => return Err(Error::UnexpectedResponse),
        };
        if handles.len() > objects.len() {
            error!(
                "FindObjects returned {} handles, {} requested",
                handles.len(),
                objects.len()
            );
            return Err(Error::UnexpectedResponse);
        }
        for (dst, handle) in objects.iter_mut().zip(handles.iter()) {
            *dst = *handle as pkcs11::CK_OBJECT_HANDLE;
        }
        Ok(handles.len())
    }

    pub fn find_objects_final(&mut self, session: pkcs11::CK_SESSION_HANDLE) -> Result<()> {
        self.call_status(ApiRequest::FindObjectsFinal(schema::SessionArgs {
            session: session as u64,
        }))
    }

    pub fn sign_init(
        &mut self,
        session: pkcs11::CK_SESSION_HANDLE,
        mechanism: pkcs11::CK_MECHANISM_TYPE,
        parameter: Option<&[u8]>,
        key: pkcs11::CK_OBJECT_HANDLE,
    ) -> Result<()> {
        let parameter = match parameter {
            Some(bytes) => Some(self.codec.encode_bytes(bytes)?),
            None => None,
        };
        self.call_status(ApiRequest::SignInit(schema::SignInitArgs {
            session: session as u64,
            mechanism: schema::Mechanism {
                mechanism: mechanism as u64,
                parameter,
            },
            key: key as u64,
        }))
    }

    /// Single-part sign. `out == None` is a length query; `len` receives the signature
    /// length reported by the server, including alongside `CKR_BUFFER_TOO_SMALL`.
    pub fn sign(
        &mut self,
        session: pkcs11::CK_SESSION_HANDLE,
        data: &[u8],
        out: Option<&mut [u8]>,
        len: &mut pkcs11::CK_ULONG,
    ) -> Result<()> {
        let data = self.codec.encode_bytes(data)?;
        let resp = self.call(ApiRequest::Sign(schema::SignArgs {
            session: session as u64,
            data,
            signature_len: out.as_ref().map(|o| o.len() as u64),
        }))?;
        self.signature_out(resp, out, len)
    }

    pub fn sign_update(&mut self, session: pkcs11::CK_SESSION_HANDLE, part: &[u8]) -> Result<()> {
        let part = self.codec.encode_bytes(part)?;
        self.call_status(ApiRequest::SignUpdate(schema::SignUpdateArgs {
            session: session as u64,
            part,
        }))
    }

    /// Finish a multi-part sign. Output semantics match `sign()`.
    pub fn sign_final(
        &mut self,
        session: pkcs11::CK_SESSION_HANDLE,
        out: Option<&mut [u8]>,
        len: &mut pkcs11::CK_ULONG,
    ) -> Result<()> {
        let resp = self.call(ApiRequest::SignFinal(schema::SignFinalArgs {
            session: session as u64,
            signature_len: out.as_ref().map(|o| o.len() as u64),
        }))?;
        self.signature_out(resp, out, len)
    }

    fn signature_out(
        &self,
        resp: ApiResponse,
        out: Option<&mut [u8]>,
        len: &mut pkcs11::CK_ULONG,
    ) -> Result<()> {
        let sig = match resp.body {
            Some(ResponseBody::Signature(ref sig)) => sig,
            None if !resp.is_ok() => return status(resp.rv),
            _ => return Err(Error::UnexpectedResponse),
        };
        *len = sig.len as pkcs11::CK_ULONG;
        status(resp.rv)?;

        match (out, sig.data.as_ref()) {
            (Some(out), Some(text)) => {
                self.codec
                    .decode_bytes(text.as_str(), sig.len as usize, out)
                    .map_err(|e| {
                        warn!("Unable to decode signature: {:?}", e);
                        Error::CodecError(e)
                    })
            }
            (Some(_), None) if sig.len != 0 => {
                error!("Signature of length {} returned without data", sig.len);
                Err(Error::UnexpectedResponse)
            }
            _ => Ok(()),
        }
    }
}

fn status(rv: u64) -> Result<()> {
    if rv == ApiResponse::RV_OK {
        Ok(())
    } else {
        Err(Error::CkError(rv as pkcs11::CK_RV))
    }
}

fn ck_version(src: &schema::Version) -> pkcs11::CK_VERSION {
    ck_version!(src.major, src.minor)
}

fn ck_info(src: &schema::Info) -> pkcs11::CK_INFO {
    pkcs11::CK_INFO {
        cryptokiVersion: ck_version(&src.cryptoki_version),
        manufacturerID: ck_padded_str!(src.manufacturer_id, 32),
        flags: src.flags as pkcs11::CK_FLAGS,
        libraryDescription: ck_padded_str!(src.library_description, 32),
        libraryVersion: ck_version(&src.library_version),
    }
}

fn ck_slot_info(src: &schema::SlotInfo) -> pkcs11::CK_SLOT_INFO {
    pkcs11::CK_SLOT_INFO {
        slotDescription: ck_padded_str!(src.slot_description, 64),
        manufacturerID: ck_padded_str!(src.manufacturer_id, 32),
        flags: src.flags as pkcs11::CK_FLAGS,
        hardwareVersion: ck_version(&src.hardware_version),
        firmwareVersion: ck_version(&src.firmware_version),
    }
}

fn ck_token_info(src: &schema::TokenInfo) -> pkcs11::CK_TOKEN_INFO {
    pkcs11::CK_TOKEN_INFO {
        label: ck_padded_str!(src.label, 32),
        manufacturerID: ck_padded_str!(src.manufacturer_id, 32),
        model: ck_padded_str!(src.model, 16),
        serialNumber: ck_padded_str!(src.serial_number, 16),
        flags: src.flags as pkcs11::CK_FLAGS,
        ulMaxSessionCount: src.max_session_count as pkcs11::CK_ULONG,
        ulSessionCount: src.session_count as pkcs11::CK_ULONG,
        ulMaxRwSessionCount: src.max_rw_session_count as pkcs11::CK_ULONG,
        ulRwSessionCount: src.rw_session_count as pkcs11::CK_ULONG,
        ulMaxPinLen: src.max_pin_len as pkcs11::CK_ULONG,
        ulMinPinLen: src.min_pin_len as pkcs11::CK_ULONG,
        ulTotalPublicMemory: src.total_public_memory as pkcs11::CK_ULONG,
        ulFreePublicMemory: src.free_public_memory as pkcs11::CK_ULONG,
        ulTotalPrivateMemory: src.total_private_memory as pkcs11::CK_ULONG,
        ulFreePrivateMemory: src.free_private_memory as pkcs11::CK_ULONG,
        hardwareVersion: ck_version(&src.hardware_version),
        firmwareVersion: ck_version(&src.firmware_version),
        utcTime: ck_padded_str!(src.utc_time, 16),
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use rsc_rpc::transport::{Error, Result};
    use rsc_rpc::{ApiRequest, ApiResponse, Transport};

    /// A scripted transport: answers requests with canned responses, in order, and records
    /// every request it was sent. A `None` response simulates a broken channel.
    pub struct MockTransport {
        responses: VecDeque<Option<ApiResponse>>,
        requests: Arc<Mutex<Vec<ApiRequest>>>,
    }

    impl MockTransport {
        pub fn new(responses: Vec<Option<ApiResponse>>) -> (Self, Arc<Mutex<Vec<ApiRequest>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let xport = Self {
                responses: responses.into_iter().collect(),
                requests: requests.clone(),
            };
            (xport, requests)
        }
    }

    impl Transport for MockTransport {
        fn recv_request(&mut self) -> Result<ApiRequest> {
            Err(Error::ParseError)
        }
        fn send_request(&mut self, req: &ApiRequest) -> Result<()> {
            self.requests.lock().unwrap().push(req.clone());
            Ok(())
        }
        fn recv_response(&mut self) -> Result<ApiResponse> {
            self.responses
                .pop_front()
                .flatten()
                .ok_or(Error::ParseError)
        }
        fn send_response(&mut self, _resp: &ApiResponse) -> Result<()> {
            Err(Error::ParseError)
        }
    }
}
