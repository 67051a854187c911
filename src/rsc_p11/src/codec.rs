// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! PKCS#11 attribute templates to / from their wire form.
//!
//! A template is an ordered array of `(type, buffer, length)` triples, and the wire form is
//! an ordered array of `{"type", "value", "valueLen"}` records, correlated by position.
//!
//! Four attribute types (`CKA_CLASS`, `CKA_CERTIFICATE_TYPE`, `CKA_KEY_TYPE`,
//! `CKA_MODULUS_BITS`) hold a `CK_ULONG`, whose host width is platform defined, while their
//! wire width is always 4 bytes. Lengths of these attributes are clamped on encode and widened
//! back to the host width on decode.

use std::cmp;
use std::convert::TryFrom;
use std::mem::size_of;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsc_common::defs::MAX_CRYPTO_OBJ_SIZE;
use rsc_rpc::api::schema;

use crate::pkcs11;

/// Wire width of a `CK_ULONG` attribute value.
pub const NET_ULONG_LEN: usize = 4;
/// Wire counterpart of `CK_UNAVAILABLE_INFORMATION`.
pub const NET_UNAVAILABLE_INFORMATION: u32 = 0xffff_ffff;

const HOST_ULONG_LEN: usize = size_of::<pkcs11::CK_ULONG>();

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Error {
    /// A value (once base64 encoded) does not fit the maximum object size.
    EncodingOverflow,
    /// The peer returned more records than the caller has attributes.
    TooManyAttributes,
    /// A record is missing its type or length, or carries invalid base64.
    MalformedRecord,
    /// A returned value is larger than the caller's buffer.
    BufferTooSmall,
    /// A returned value does not fit the maximum object size.
    DecodeOverflow,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Which side supplies attribute payloads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    /// The server is asked to read attribute values: only types and lengths travel.
    Query,
    /// The client pushes attribute values (e.g. a search template).
    Set,
}

/// A caller-owned PKCS#11 attribute.
///
/// `value == None` is a length query: the caller wants to learn the attribute size before
/// providing a buffer. `len` holds the caller's buffer capacity on input, and the
/// reported length after a decode (possibly `CK_UNAVAILABLE_INFORMATION`).
#[derive(Debug)]
pub struct Attribute<'a> {
    pub type_: pkcs11::CK_ATTRIBUTE_TYPE,
    pub value: Option<&'a mut [u8]>,
    pub len: pkcs11::CK_ULONG,
}

impl<'a> Attribute<'a> {
    /// An attribute backed by `buf`, declaring the whole buffer as its capacity.
    pub fn new(type_: pkcs11::CK_ATTRIBUTE_TYPE, buf: &'a mut [u8]) -> Self {
        let len = buf.len() as pkcs11::CK_ULONG;
        Self {
            type_,
            value: Some(buf),
            len,
        }
    }

    /// An attribute with no buffer, asking for the value length only.
    pub fn query(type_: pkcs11::CK_ATTRIBUTE_TYPE) -> Self {
        Self {
            type_,
            value: None,
            len: 0,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.len == pkcs11::CK_UNAVAILABLE_INFORMATION
    }
}

fn is_ulong_attr(type_: pkcs11::CK_ATTRIBUTE_TYPE) -> bool {
    matches!(
        type_,
        pkcs11::CKA_CLASS | pkcs11::CKA_CERTIFICATE_TYPE | pkcs11::CKA_KEY_TYPE | pkcs11::CKA_MODULUS_BITS
    )
}

/// Attribute template codec. Every payload crossing it, in either direction, is bounded by
/// `max_obj_size`.
#[derive(Clone, Copy, Debug)]
pub struct AttrCodec {
    max_obj_size: usize,
}

impl Default for AttrCodec {
    fn default() -> Self {
        Self::new(MAX_CRYPTO_OBJ_SIZE)
    }
}

impl AttrCodec {
    pub fn new(max_obj_size: usize) -> Self {
        Self { max_obj_size }
    }

    pub fn max_obj_size(&self) -> usize {
        self.max_obj_size
    }

    /// Encode `attrs` into wire records. Either the whole template is encoded, or an error
    /// is returned and nothing is.
    pub fn encode(&self, attrs: &[Attribute], dir: Direction) -> Result<Vec<schema::Attribute>> {
        attrs
            .iter()
            .map(|attr| self.encode_attr(attr, dir))
            .collect()
    }

    fn encode_attr(&self, attr: &Attribute, dir: Direction) -> Result<schema::Attribute> {
        let mut rec = schema::Attribute {
            type_: Some(u32::try_from(attr.type_).map_err(|_| Error::EncodingOverflow)?),
            ..Default::default()
        };
        let buf = match attr.value.as_ref() {
            Some(buf) => buf,
            None => return Ok(rec),
        };

        let mut len = attr.len;
        if is_ulong_attr(attr.type_) {
            len = cmp::min(len, NET_ULONG_LEN as pkcs11::CK_ULONG);
        }
        let wire_len = u32::try_from(len).map_err(|_| Error::EncodingOverflow)?;

        if dir == Direction::Set {
            let src = buf
                .get(..wire_len as usize)
                .ok_or(Error::EncodingOverflow)?;
            rec.value = Some(self.encode_bytes(src)?);
        }
        rec.value_len = Some(wire_len);
        Ok(rec)
    }

    /// Decode wire records into `attrs`, in place.
    ///
    /// On error, attributes before the failing record may already have been updated; the
    /// template as a whole must be considered unreliable.
    pub fn decode(&self, records: &[schema::Attribute], attrs: &mut [Attribute]) -> Result<()> {
        for (i, rec) in records.iter().enumerate() {
            let attr = attrs.get_mut(i).ok_or(Error::TooManyAttributes)?;
            let (type_, wire_len) = match (rec.type_, rec.value_len) {
                (Some(type_), Some(wire_len)) => (type_, wire_len),
                _ => return Err(Error::MalformedRecord),
            };
            attr.type_ = type_ as pkcs11::CK_ATTRIBUTE_TYPE;

            // A zero length is a legitimate empty value. Keep whatever the caller declared.
            if wire_len == 0 {
                continue;
            }
            if wire_len == NET_UNAVAILABLE_INFORMATION {
                attr.len = pkcs11::CK_UNAVAILABLE_INFORMATION;
                continue;
            }

            let mut len = wire_len as usize;
            if is_ulong_attr(attr.type_) {
                len = cmp::max(len, HOST_ULONG_LEN);
            }

            let text = match rec.value.as_ref() {
                Some(text) => text,
                None => {
                    attr.len = len as pkcs11::CK_ULONG;
                    continue;
                }
            };

            let declared = attr.len;
            let buf = match attr.value.as_mut() {
                Some(buf) if len as pkcs11::CK_ULONG <= declared && len <= buf.len() => buf,
                _ => return Err(Error::BufferTooSmall),
            };
            let bytes = self.decode_text(text)?;

            let dst = &mut buf[..len];
            for b in dst.iter_mut() {
                *b = 0;
            }
            let count = cmp::min(bytes.len(), len);
            dst[..count].copy_from_slice(&bytes[..count]);
            attr.len = len as pkcs11::CK_ULONG;
        }
        Ok(())
    }

    /// Base64 encode a raw payload (PIN, data to sign, mechanism parameter).
    pub fn encode_bytes(&self, bytes: &[u8]) -> Result<String> {
        match base64::encoded_len(bytes.len(), true) {
            Some(n) if n <= self.max_obj_size => Ok(BASE64.encode(bytes)),
            _ => Err(Error::EncodingOverflow),
        }
    }

    /// Decode a base64 payload of (reported) length `len` into `out`. Fails with
    /// `BufferTooSmall` before touching `out` if it cannot hold `len` bytes.
    pub fn decode_bytes(&self, text: &str, len: usize, out: &mut [u8]) -> Result<()> {
        if len > out.len() {
            return Err(Error::BufferTooSmall);
        }
        let bytes = self.decode_text(text)?;
        if bytes.len() != len {
            return Err(Error::MalformedRecord);
        }
        out[..len].copy_from_slice(bytes.as_slice());
        Ok(())
    }

    fn decode_text(&self, text: &str) -> Result<Vec<u8>> {
        // Base64 yields at most 3 bytes for every 4 characters.
        if (text.len() + 3) / 4 * 3 > self.max_obj_size + 2 {
            return Err(Error::DecodeOverflow);
        }
        let bytes = BASE64.decode(text).map_err(|_| Error::MalformedRecord)?;
        if bytes.len() > self.max_obj_size {
            return Err(Error::DecodeOverflow);
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(type_: pkcs11::CK_ATTRIBUTE_TYPE, value: Option<&str>, len: u32) -> schema::Attribute {
        schema::Attribute {
            type_: Some(type_ as u32),
            value: value.map(|v| v.to_string()),
            value_len: Some(len),
        }
    }

    #[test]
    fn test_encode_set_raw_value() {
        let mut secret = *b"secretkey";
        let attrs = [Attribute::new(pkcs11::CKA_VALUE, &mut secret)];
        let recs = AttrCodec::default().encode(&attrs, Direction::Set).unwrap();
        assert_eq!(
            recs,
            vec![record(pkcs11::CKA_VALUE, Some("c2VjcmV0a2V5"), 9)]
        );
    }

    #[test]
    fn test_decode_raw_value_capacity() {
        let codec = AttrCodec::default();
        let recs = vec![record(pkcs11::CKA_VALUE, Some("c2VjcmV0a2V5"), 9)];

        let mut buf = [0u8; 9];
        let mut attrs = [Attribute::new(pkcs11::CKA_VALUE, &mut buf)];
        codec.decode(&recs, &mut attrs).unwrap();
        assert_eq!(attrs[0].len, 9);
        assert_eq!(&buf, b"secretkey");

        let mut small = [0xaau8; 4];
        let mut attrs = [Attribute::new(pkcs11::CKA_VALUE, &mut small)];
        assert_eq!(codec.decode(&recs, &mut attrs), Err(Error::BufferTooSmall));
        assert_eq!(attrs[0].len, 4);
        assert_eq!(small, [0xaa; 4]);
    }

    #[test]
    fn test_ulong_attr_clamp_and_widen() {
        let codec = AttrCodec::default();
        let mut key_type = (2 as pkcs11::CK_ULONG).to_ne_bytes();
        let attrs = [Attribute::new(pkcs11::CKA_KEY_TYPE, &mut key_type)];
        let recs = codec.encode(&attrs, Direction::Set).unwrap();
        assert_eq!(recs[0].value_len, Some(NET_ULONG_LEN as u32));
        assert_eq!(
            recs[0].value.as_deref(),
            Some(BASE64.encode(&key_type[..NET_ULONG_LEN]).as_str())
        );

        let mut out = [0xffu8; HOST_ULONG_LEN];
        let mut attrs = [Attribute::new(pkcs11::CKA_KEY_TYPE, &mut out)];
        codec.decode(&recs, &mut attrs).unwrap();
        assert_eq!(attrs[0].len, HOST_ULONG_LEN as pkcs11::CK_ULONG);
        // The upper (non-transmitted) bytes are zeroed, not left as they were.
        #[cfg(target_endian = "little")]
        assert_eq!(pkcs11::CK_ULONG::from_ne_bytes(out), 2);
    }

    #[test]
    fn test_ulong_attr_widened_before_capacity_check() {
        let codec = AttrCodec::default();
        let recs = vec![record(pkcs11::CKA_CLASS, Some("AwAAAA=="), 4)];
        let mut buf = [0u8; NET_ULONG_LEN];
        let mut attrs = [Attribute::new(pkcs11::CKA_CLASS, &mut buf)];
        let res = codec.decode(&recs, &mut attrs);
        if HOST_ULONG_LEN > NET_ULONG_LEN {
            assert_eq!(res, Err(Error::BufferTooSmall));
        } else {
            assert_eq!(res, Ok(()));
        }
    }

    #[test]
    fn test_length_query() {
        let codec = AttrCodec::default();
        let attrs = [
            Attribute::query(pkcs11::CKA_LABEL),
            Attribute::query(pkcs11::CKA_MODULUS_BITS),
        ];
        let recs = codec.encode(&attrs, Direction::Query).unwrap();
        for rec in recs.iter() {
            assert!(rec.value.is_none());
            assert!(rec.value_len.is_none());
        }

        let reply = vec![
            record(pkcs11::CKA_LABEL, None, 12),
            record(pkcs11::CKA_MODULUS_BITS, None, 4),
        ];
        let mut attrs = [
            Attribute::query(pkcs11::CKA_LABEL),
            Attribute::query(pkcs11::CKA_MODULUS_BITS),
        ];
        codec.decode(&reply, &mut attrs).unwrap();
        assert_eq!(attrs[0].len, 12);
        assert_eq!(attrs[1].len, HOST_ULONG_LEN as pkcs11::CK_ULONG);
        assert!(attrs[0].value.is_none());
    }

    #[test]
    fn test_query_with_buffer_sends_capacity_only() {
        let mut buf = [0x55u8; 32];
        let attrs = [Attribute::new(pkcs11::CKA_ID, &mut buf)];
        let recs = AttrCodec::default()
            .encode(&attrs, Direction::Query)
            .unwrap();
        assert_eq!(recs, vec![record(pkcs11::CKA_ID, None, 32)]);
    }

    #[test]
    fn test_length_only_reply_leaves_buffer_untouched() {
        let mut buf = [0x11u8; 16];
        let mut attrs = [Attribute::new(pkcs11::CKA_LABEL, &mut buf)];
        AttrCodec::default()
            .decode(&[record(pkcs11::CKA_LABEL, None, 7)], &mut attrs)
            .unwrap();
        assert_eq!(attrs[0].len, 7);
        assert_eq!(buf, [0x11u8; 16]);
    }

    #[test]
    fn test_unavailable_sentinel() {
        let mut buf = [0x22u8; 16];
        let mut attrs = [Attribute::new(pkcs11::CKA_PRIVATE_EXPONENT, &mut buf)];
        let recs = vec![record(
            pkcs11::CKA_PRIVATE_EXPONENT,
            Some("AAAA"),
            NET_UNAVAILABLE_INFORMATION,
        )];
        AttrCodec::default().decode(&recs, &mut attrs).unwrap();
        assert!(attrs[0].is_unavailable());
        assert_eq!(buf, [0x22u8; 16]);
    }

    #[test]
    fn test_zero_length_keeps_declared_length() {
        let mut buf = [0u8; 5];
        let mut attrs = [Attribute::new(pkcs11::CKA_LABEL, &mut buf)];
        AttrCodec::default()
            .decode(&[record(pkcs11::CKA_LABEL, Some(""), 0)], &mut attrs)
            .unwrap();
        assert_eq!(attrs[0].len, 5);
    }

    #[test]
    fn test_too_many_records() {
        let recs = vec![
            record(pkcs11::CKA_LABEL, None, 3),
            record(pkcs11::CKA_ID, None, 4),
        ];
        let mut attrs = [Attribute::query(pkcs11::CKA_LABEL)];
        assert_eq!(
            AttrCodec::default().decode(&recs, &mut attrs),
            Err(Error::TooManyAttributes)
        );
        assert_eq!(attrs[0].len, 3);
    }

    #[test]
    fn test_too_many_records_stops_at_failing_index() {
        let recs = vec![
            record(pkcs11::CKA_LABEL, Some("YWJj"), 3),
            record(pkcs11::CKA_ID, Some("AQI="), 2),
            record(pkcs11::CKA_VALUE, Some("eHl6"), 3),
        ];
        let mut label = [0u8; 3];
        let mut id = [0u8; 2];
        let mut value = [0u8; 3];
        let mut attrs = [
            Attribute::new(pkcs11::CKA_LABEL, &mut label),
            Attribute::new(pkcs11::CKA_ID, &mut id),
            Attribute::new(pkcs11::CKA_VALUE, &mut value),
        ];
        assert_eq!(
            AttrCodec::default().decode(&recs, &mut attrs[..2]),
            Err(Error::TooManyAttributes)
        );
        assert_eq!(attrs[1].len, 2);
        assert_eq!(attrs[2].len, 3);
        assert_eq!(attrs[2].type_, pkcs11::CKA_VALUE);
        assert_eq!(&label, b"abc");
        assert_eq!(id, [1, 2]);
        assert_eq!(value, [0, 0, 0]);
    }

    #[test]
    fn test_malformed_records() {
        let codec = AttrCodec::default();
        let mut attrs = [Attribute::query(pkcs11::CKA_LABEL)];

        let no_len = schema::Attribute {
            type_: Some(pkcs11::CKA_LABEL as u32),
            ..Default::default()
        };
        assert_eq!(codec.decode(&[no_len], &mut attrs), Err(Error::MalformedRecord));

        let no_type = schema::Attribute {
            value_len: Some(3),
            ..Default::default()
        };
        assert_eq!(codec.decode(&[no_type], &mut attrs), Err(Error::MalformedRecord));

        let mut buf = [0u8; 8];
        let mut attrs = [Attribute::new(pkcs11::CKA_LABEL, &mut buf)];
        let bad_b64 = record(pkcs11::CKA_LABEL, Some("!!not base64!!"), 3);
        assert_eq!(codec.decode(&[bad_b64], &mut attrs), Err(Error::MalformedRecord));
    }

    #[test]
    fn test_value_without_buffer_is_rejected() {
        let mut attrs = [Attribute::query(pkcs11::CKA_LABEL)];
        let recs = vec![record(pkcs11::CKA_LABEL, Some("YWJj"), 3)];
        assert_eq!(
            AttrCodec::default().decode(&recs, &mut attrs),
            Err(Error::BufferTooSmall)
        );
    }

    #[test]
    fn test_size_limits() {
        let codec = AttrCodec::new(8);

        let mut big = [7u8; 16];
        let attrs = [Attribute::new(pkcs11::CKA_VALUE, &mut big)];
        assert_eq!(
            codec.encode(&attrs, Direction::Set),
            Err(Error::EncodingOverflow)
        );
        // Queries carry no payload, so the limit does not apply.
        assert!(codec.encode(&attrs, Direction::Query).is_ok());

        let text = BASE64.encode([1u8; 16]);
        let mut buf = [0u8; 16];
        let mut attrs = [Attribute::new(pkcs11::CKA_VALUE, &mut buf)];
        assert_eq!(
            codec.decode(&[record(pkcs11::CKA_VALUE, Some(&text), 16)], &mut attrs),
            Err(Error::DecodeOverflow)
        );
        assert_eq!(buf, [0u8; 16]);
    }

    #[test]
    fn test_declared_length_beyond_buffer() {
        let mut buf = [1u8, 2, 3];
        let attrs = [Attribute {
            type_: pkcs11::CKA_VALUE,
            value: Some(&mut buf),
            len: 10,
        }];
        assert_eq!(
            AttrCodec::default().encode(&attrs, Direction::Set),
            Err(Error::EncodingOverflow)
        );
    }

    #[test]
    fn test_template_round_trip() {
        let codec = AttrCodec::default();
        let mut label = *b"my-key";
        let mut id = [0x01u8, 0x02];
        let mut class = pkcs11::CKO_PRIVATE_KEY.to_ne_bytes();
        let attrs = [
            Attribute::new(pkcs11::CKA_LABEL, &mut label),
            Attribute::new(pkcs11::CKA_ID, &mut id),
            Attribute::new(pkcs11::CKA_CLASS, &mut class),
        ];
        let recs = codec.encode(&attrs, Direction::Set).unwrap();

        let mut label_out = [0u8; 6];
        let mut id_out = [0u8; 2];
        let mut class_out = [0u8; HOST_ULONG_LEN];
        let mut out = [
            Attribute::new(pkcs11::CKA_LABEL, &mut label_out),
            Attribute::new(pkcs11::CKA_ID, &mut id_out),
            Attribute::new(pkcs11::CKA_CLASS, &mut class_out),
        ];
        codec.decode(&recs, &mut out).unwrap();
        assert_eq!(out[0].len, 6);
        assert_eq!(out[1].len, 2);
        assert_eq!(out[2].len, HOST_ULONG_LEN as pkcs11::CK_ULONG);
        assert_eq!(&label_out, b"my-key");
        assert_eq!(id_out, [0x01, 0x02]);
        #[cfg(target_endian = "little")]
        assert_eq!(
            pkcs11::CK_ULONG::from_ne_bytes(class_out),
            pkcs11::CKO_PRIVATE_KEY
        );
    }

    #[test]
    fn test_decode_bytes() {
        let codec = AttrCodec::default();
        let mut out = [0u8; 4];
        codec.decode_bytes("c2ln", 3, &mut out).unwrap();
        assert_eq!(&out[..3], b"sig");
        assert_eq!(codec.decode_bytes("c2ln", 3, &mut out[..2]), Err(Error::BufferTooSmall));
        assert_eq!(codec.decode_bytes("c2ln", 2, &mut out), Err(Error::MalformedRecord));
    }
}
