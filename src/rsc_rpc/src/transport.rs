// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use rsc_common::config::Config;
use rsc_common::defs;

use super::api::{ApiRequest, ApiResponse};

#[derive(Debug)]
pub enum Error {
    BadUrl,
    IoError(std::io::Error),
    MsgLen,
    ParseError,
    SerdeError(serde_json::error::Error),
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, Error>;

/// RPC transport trait. Implementors will have to provide the methods for send / receiving
/// requests and responses. The implementation will likely wrap an underlying stream
/// (i.e. Read + Write), and handle message / datagram traffic.
pub trait Transport {
    /// Receive an RPC request.
    fn recv_request(&mut self) -> Result<ApiRequest>;
    /// Send an RPC request.
    fn send_request(&mut self, req: &ApiRequest) -> Result<()>;
    /// Receive an RPC response.
    fn recv_response(&mut self) -> Result<ApiResponse>;
    /// Send an RPC response.
    fn send_response(&mut self, resp: &ApiResponse) -> Result<()>;

    /// Perform one full request / response exchange.
    fn call(&mut self, req: &ApiRequest) -> Result<ApiResponse> {
        self.send_request(req)?;
        self.recv_response()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn recv_request(&mut self) -> Result<ApiRequest> {
        (**self).recv_request()
    }
    fn send_request(&mut self, req: &ApiRequest) -> Result<()> {
        (**self).send_request(req)
    }
    fn recv_response(&mut self) -> Result<ApiResponse> {
        (**self).recv_response()
    }
    fn send_response(&mut self, resp: &ApiResponse) -> Result<()> {
        (**self).send_response(resp)
    }
    fn call(&mut self, req: &ApiRequest) -> Result<ApiResponse> {
        (**self).call(req)
    }
}

/// RPC transport implementation via a super-simple subset of HTTP.
///
/// Requests and responses are serialized as HTTP messages, with JSON bodies.
/// They always travel the underlying stream sequentially (i.e. once a request is sent,
/// the caller must always read its corresponding response before submitting a new request).
///
/// All API-related information is exchanged via the message (JSON) body. I.e. HTTP handling
/// stops at the transport layer, so methods, URLs, status codes, do not change across RPC
/// messages. I.e:
/// - the method is always POST;
/// - the URL is always `self.url`;
/// - the response status is always "200 OK".
///
/// Every request carries the shared secret as a bearer token. On the receiving end, requests
/// are only accepted if the token matches the secret this transport was built with.
///
/// Example:
///
/// ----- REQUEST -----
/// POST /rpc/v1 HTTP/1.1
/// Authorization: Bearer s3cr3t
/// Content-Type: application/json
/// Content-Length: 39
///
/// {"OpenSession":{"slot_id":1,"flags":4}}
/// ----- REQUEST -----
///
/// ----- RESPONSE -----
/// 200 OK
/// Content-Type: application/json
/// Content-Length: 29
///
/// {"rv":0,"body":{"Session":1}}
/// ----- RESPONSE -----
pub struct HttpTransport<S: Read + Write> {
    /// The (connected) data stream between caller and callee.
    stream: S,
    /// The HTTP URL that the RPC server responds to. This can be used to versionize the API
    /// (e.g. /rpc/v1).
    url: &'static str,
    /// Secret shared between client and server.
    secret: String,
}

/// The HTTP headers our RPC transport is interested in.
struct HttpHeaders {
    content_length: usize,
    bearer: Option<String>,
}

impl<S: Read + Write> HttpTransport<S> {
    /// Maximum size (in bytes) of an HTTP message headers section.
    const MAX_HDR_LEN: usize = 1 * 1024;
    /// Maximum size (in bytes) of an HTTP message body.
    const MAX_BODY_LEN: usize = 1024 * 1024;

    /// Create a new HTTP transport object from a connected stream.
    /// Args:
    ///   - stream: the connected `Read + Write` stream;
    ///   - url: the HTTP URL (can be used to provide API versioning);
    ///          Note: all requests use the same URL, since the actual API endpoint call is
    ///          part of the JSON body.
    ///   - secret: the shared secret, sent with (or expected on) every request.
    pub fn new(stream: S, url: &'static str, secret: &str) -> Self {
        Self {
            stream,
            url,
            secret: secret.to_string(),
        }
    }

    /// Read / parse the HTTP headers (that we recognize) from the provided buffered reader.
    fn read_headers<R: BufRead>(reader: &mut R) -> Result<HttpHeaders> {
        let mut content_length = None;
        let mut bearer = None;

        loop {
            let mut ln = String::new();
            reader.read_line(&mut ln).map_err(Error::IoError)?;
            let ln = ln.as_str().trim();

            if ln.is_empty() {
                break;
            }

            let mut iter = ln.splitn(2, ": ");
            match (iter.next(), iter.next()) {
                (Some("Content-Length"), Some(len)) => {
                    let len = len.parse::<usize>().map_err(|_| Error::ParseError)?;
                    content_length = Some(len);
                }
                (Some("Content-Type"), Some("application/json")) => (),
                (Some("Authorization"), Some(auth)) => {
                    let token = auth.strip_prefix("Bearer ").ok_or(Error::ParseError)?;
                    bearer = Some(token.to_string());
                }
                _ => return Err(Error::ParseError),
            }
        }

        match content_length {
            Some(content_length) => {
                if content_length > Self::MAX_BODY_LEN {
                    return Err(Error::MsgLen);
                }
                Ok(HttpHeaders {
                    content_length,
                    bearer,
                })
            }
            _ => Err(Error::ParseError),
        }
    }

    /// Read the message body announced by `headers` and deserialize it.
    fn read_body<R, T>(reader: &mut BufReader<std::io::Take<R>>, headers: &HttpHeaders) -> Result<T>
    where
        R: Read,
        T: serde::de::DeserializeOwned,
    {
        // The body may be larger than the header limit; whatever the BufReader already
        // buffered is still served first.
        reader.get_mut().set_limit(headers.content_length as u64);
        let mut buf = vec![0u8; headers.content_length];
        reader
            .read_exact(buf.as_mut_slice())
            .map_err(Error::IoError)?;
        serde_json::from_slice(buf.as_slice()).map_err(Error::SerdeError)
    }

    fn write_message(&mut self, start_line: String, auth: bool, body: &[u8]) -> Result<()> {
        let mut head = start_line;
        if auth {
            head.push_str(format!("Authorization: Bearer {}\r\n", self.secret).as_str());
        }
        head.push_str(
            format!(
                "Content-Type: application/json\r\n\
                Content-Length: {}\r\n\
                \r\n",
                body.len()
            )
            .as_str(),
        );
        self.stream
            .write_all(head.as_bytes())
            .map_err(Error::IoError)?;
        self.stream.write_all(body).map_err(Error::IoError)?;
        self.stream.flush().map_err(Error::IoError)
    }
}

/// Compare two secrets without short-circuiting on the first mismatching byte.
fn secrets_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

impl<S: Read + Write> Transport for HttpTransport<S> {
    fn recv_request(&mut self) -> Result<ApiRequest> {
        // Read::take(N) limits the amount of data we read from the wire while parsing the
        // headers. Take needs to own its Read, so we hand it a &mut to our stream.
        let mut reader = BufReader::new((&mut self.stream).take(Self::MAX_HDR_LEN as u64));
        let mut ln = String::new();
        reader.read_line(&mut ln).map_err(Error::IoError)?;
        let mut iter = ln.as_str().trim().split_whitespace();
        match (iter.next(), iter.next(), iter.next()) {
            (Some("POST"), Some(url), Some("HTTP/1.1")) => {
                if url != self.url {
                    return Err(Error::BadUrl);
                }
            }
            _ => return Err(Error::ParseError),
        }

        let headers = Self::read_headers(&mut reader)?;
        match headers.bearer.as_ref() {
            Some(token) if secrets_match(token, self.secret.as_str()) => (),
            _ => return Err(Error::Unauthorized),
        }
        Self::read_body(&mut reader, &headers)
    }

    fn send_request(&mut self, request: &ApiRequest) -> Result<()> {
        let body = serde_json::to_vec(&request).map_err(Error::SerdeError)?;
        let start_line = format!("POST {} HTTP/1.1\r\n", self.url);
        self.write_message(start_line, true, body.as_slice())
    }

    fn recv_response(&mut self) -> Result<ApiResponse> {
        let mut reader = BufReader::new((&mut self.stream).take(Self::MAX_HDR_LEN as u64));
        let mut ln = String::new();
        reader.read_line(&mut ln).map_err(Error::IoError)?;
        let mut iter = ln.as_str().trim().split_whitespace();
        match (iter.next(), iter.next()) {
            (Some("200"), Some("OK")) => (),
            _ => return Err(Error::ParseError),
        }
        let headers = Self::read_headers(&mut reader)?;
        Self::read_body(&mut reader, &headers)
    }

    fn send_response(&mut self, response: &ApiResponse) -> Result<()> {
        let body = serde_json::to_vec(&response).map_err(Error::SerdeError)?;
        self.write_message("200 OK\r\n".to_string(), false, body.as_slice())
    }
}

/// Connect to the server described by `config`, returning a ready-to-use transport.
///
/// The socket I/O timeout is the only cancellation mechanism: a call blocks for at most
/// `config.timeout_ms` per read / write.
///
/// The stream is plain TCP. `config.fingerprint` is validated at config time but not used
/// here, and the shared secret travels as a cleartext bearer header.
pub fn connect(config: &Config) -> Result<HttpTransport<TcpStream>> {
    // TODO: wrap the stream in TLS and pin the server certificate against `config.fingerprint`.
    let stream = TcpStream::connect(config.addr.as_str()).map_err(Error::IoError)?;
    let timeout = Some(Duration::from_millis(config.timeout_ms));
    stream.set_read_timeout(timeout).map_err(Error::IoError)?;
    stream.set_write_timeout(timeout).map_err(Error::IoError)?;
    stream.set_nodelay(true).map_err(Error::IoError)?;
    log::debug!("Connected to {}", config.addr);
    Ok(HttpTransport::new(
        stream,
        defs::RPC_URL,
        config.secret.as_str(),
    ))
}
