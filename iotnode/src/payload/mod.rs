use std_alloc::vec::Vec;

use crate::code;
use crate::msg::{Message, MessageRead};
use crate::opt::{known, ContentFormat, UInt};
use crate::Error;

/// CBOR encoding
pub mod cbor;

/// Serialize a JSON document as `format`.
///
/// Only JSON and CBOR are supported; anything else is [`Error::Codec`].
///
/// ```
/// use iotnode::opt::ContentFormat;
/// use iotnode::payload;
/// use serde_json::json;
///
/// let doc = json!({"state": "idle"});
/// assert_eq!(payload::encode(&doc, ContentFormat::Json).unwrap(),
///            br#"{"state":"idle"}"#.to_vec());
/// assert_eq!(payload::encode(&doc, ContentFormat::Cbor).unwrap()[0], 0xA1);
/// ```
pub fn encode(doc: &serde_json::Value, format: ContentFormat) -> Result<Vec<u8>, Error> {
  match format {
    | ContentFormat::Json => serde_json::to_vec(doc).map_err(|e| {
                                                      log::error!("json encoding failed: {}", e);
                                                      Error::Codec
                                                    }),
    | ContentFormat::Cbor => Ok(cbor::Value::from(doc).to_vec()),
    | _ => Err(Error::Codec),
  }
}

/// Parse a JSON payload
pub fn decode_json(bytes: &[u8]) -> Result<serde_json::Value, Error> {
  serde_json::from_slice(bytes).map_err(|e| {
                                 log::debug!("invalid json payload: {}", e);
                                 Error::Codec
                               })
}

/// The format a response should use, from the request's Accept option.
///
/// No Accept means `default`. An Accept that isn't in `supported`
/// (or isn't a valid content format) is `Err(None)`;
/// the caller answers 4.02 Bad Option.
pub fn negotiate(req: &dyn MessageRead,
                 default: ContentFormat,
                 supported: &[ContentFormat])
                 -> Result<ContentFormat, Option<ContentFormat>> {
  match req.content_format_option(known::ACCEPT) {
    | Ok(None) => Ok(default),
    | Ok(Some(f)) if supported.contains(&f) => Ok(f),
    | Ok(Some(f)) => Err(Some(f)),
    | Err(_) => Err(None),
  }
}

/// Answer 2.05 with `body` tagged as `format`
pub fn reply(rep: &mut dyn Message, format: ContentFormat, body: &[u8]) -> Result<(), Error> {
  rep.set_code(code::CONTENT);
  rep.add_option(UInt::content_format(known::CONTENT_FORMAT, format).into())?;
  rep.set_payload(body)
}

/// Answer 2.05 with `doc` in the format the request negotiates
/// (JSON by default, or CBOR).
///
/// Unsupported Accept values get 4.02 Bad Option and [`Error::Codec`].
pub fn reply_doc(req: &dyn MessageRead,
                 rep: &mut dyn Message,
                 doc: &serde_json::Value)
                 -> Result<(), Error> {
  match negotiate(req,
                  ContentFormat::Json,
                  &[ContentFormat::Json, ContentFormat::Cbor])
  {
    | Ok(format) => reply(rep, format, &encode(doc, format)?),
    | Err(accept) => {
      log::debug!("can't produce accepted format {:?}", accept);
      rep.set_code(code::BAD_OPTION);
      Err(Error::Codec)
    },
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::msg::{Request, Response};
  use crate::test::MsgMock;

  fn accepting(n: Option<u8>) -> MsgMock {
    let mut m = MsgMock::default();
    m.code = code::GET.0;
    if let Some(n) = n {
      m.opts.push((known::ACCEPT, vec![n]));
    }
    m
  }

  #[test]
  fn negotiate_defaults_and_rejects() {
    let both = [ContentFormat::Json, ContentFormat::Cbor];

    assert_eq!(negotiate(&Request::new(&accepting(None)), ContentFormat::Text, &both),
               Ok(ContentFormat::Text));
    assert_eq!(negotiate(&Request::new(&accepting(Some(60))), ContentFormat::Json, &both),
               Ok(ContentFormat::Cbor));
    assert_eq!(negotiate(&Request::new(&accepting(Some(41))), ContentFormat::Json, &both),
               Err(Some(ContentFormat::Xml)));
  }

  #[test]
  fn reply_doc_sets_format() {
    let req = accepting(None);
    let mut rep = MsgMock::default();
    reply_doc(&Request::new(&req), &mut Response::new(&mut rep), &json!({"a": 1})).unwrap();

    assert_eq!(rep.code, code::CONTENT);
    assert_eq!(rep.opts, vec![(known::CONTENT_FORMAT, vec![50])]);
    assert_eq!(rep.payload.as_deref(), Some(&br#"{"a":1}"#[..]));
  }

  #[test]
  fn reply_doc_bad_accept() {
    let req = accepting(Some(0));
    let mut rep = MsgMock::default();
    let r = reply_doc(&Request::new(&req), &mut Response::new(&mut rep), &json!({}));

    assert_eq!(r, Err(Error::Codec));
    assert_eq!(rep.code, code::BAD_OPTION);
    assert!(rep.payload.is_none());
  }

  #[test]
  fn decode_json_rejects_garbage() {
    assert_eq!(decode_json(b"{\"color\":"), Err(Error::Codec));
    assert_eq!(decode_json(b"[1]").unwrap(), json!([1]));
  }

  #[test]
  fn encode_other_formats() {
    assert_eq!(encode(&json!(null), ContentFormat::Text), Err(Error::Codec));
  }
}
