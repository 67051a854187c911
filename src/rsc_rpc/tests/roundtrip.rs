// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::os::unix::net::UnixStream;
use std::thread;

use rsc_common::defs;
use rsc_rpc::api::schema;
use rsc_rpc::{ApiRequest, ApiResponse, HttpTransport, ResponseBody, Transport, TransportError};

const SECRET: &str = "shared-secret";

/// Serve `count` requests on `stream`, answering each with whatever `handler` returns.
fn serve<F>(stream: UnixStream, secret: &'static str, count: usize, handler: F) -> thread::JoinHandle<()>
where
    F: Fn(ApiRequest) -> ApiResponse + Send + 'static,
{
    thread::spawn(move || {
        let mut xport = HttpTransport::new(stream, defs::RPC_URL, secret);
        for _ in 0..count {
            match xport.recv_request() {
                Ok(req) => xport.send_response(&handler(req)).unwrap(),
                Err(_) => return,
            }
        }
    })
}

#[test]
fn test_request_response_exchange() {
    let (client, server) = UnixStream::pair().unwrap();
    let srv = serve(server, SECRET, 2, |req| match req {
        ApiRequest::OpenSession(args) => {
            assert_eq!(args.slot_id, 3);
            ApiResponse::ok(Some(ResponseBody::Session(0x1234)))
        }
        ApiRequest::GetAttributeValue(args) => {
            assert_eq!(args.template.len(), 1);
            ApiResponse::ok(Some(ResponseBody::Template(vec![schema::Attribute {
                type_: Some(3),
                value: Some("aGVsbG8=".to_string()),
                value_len: Some(5),
            }])))
        }
        _ => ApiResponse::rv(0x54),
    });

    let mut xport = HttpTransport::new(client, defs::RPC_URL, SECRET);
    let resp = xport
        .call(&ApiRequest::OpenSession(schema::OpenSessionArgs {
            slot_id: 3,
            flags: 4,
        }))
        .unwrap();
    assert_eq!(resp, ApiResponse::ok(Some(ResponseBody::Session(0x1234))));

    let resp = xport
        .call(&ApiRequest::GetAttributeValue(schema::GetAttributeValueArgs {
            session: 0x1234,
            object: 9,
            template: vec![schema::Attribute {
                type_: Some(3),
                value: None,
                value_len: None,
            }],
        }))
        .unwrap();
    match resp.body {
        Some(ResponseBody::Template(tpl)) => assert_eq!(tpl[0].value_len, Some(5)),
        other => panic!("unexpected body: {:?}", other),
    }

    srv.join().unwrap();
}

#[test]
fn test_wrong_secret_gets_no_answer() {
    let (client, server) = UnixStream::pair().unwrap();
    let srv = serve(server, "another-secret", 1, |_| ApiResponse::ok(None));

    let mut xport = HttpTransport::new(client, defs::RPC_URL, SECRET);
    // The server drops the connection instead of answering.
    match xport.call(&ApiRequest::GetInfo) {
        Err(TransportError::IoError(_)) | Err(TransportError::ParseError) => (),
        other => panic!("unexpected result: {:?}", other),
    }
    srv.join().unwrap();
}
