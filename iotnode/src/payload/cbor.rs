//! Just enough CBOR ([RFC 8949](https://www.rfc-editor.org/rfc/rfc8949)) to
//! encode the data model of a JSON document.
//!
//! Maps keep their entries in insertion order; nothing is canonicalized.

use std_alloc::string::String;
use std_alloc::vec::Vec;

const UNSIGNED: u8 = 0;
const NEGATIVE: u8 = 1;
const BYTES: u8 = 2;
const TEXT: u8 = 3;
const ARRAY: u8 = 4;
const MAP: u8 = 5;
const SIMPLE: u8 = 7;

const FALSE: u8 = 0xF4;
const TRUE: u8 = 0xF5;
const NULL: u8 = 0xF6;
const FLOAT64: u8 = 0xFB;

/// A CBOR data item
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  /// major type 0
  Unsigned(u64),
  /// major type 1; holds the value itself, not `-1 - n`
  Negative(i64),
  /// major type 2
  Bytes(Vec<u8>),
  /// major type 3
  Text(String),
  /// major type 4
  Array(Vec<Value>),
  /// major type 5
  Map(Vec<(Value, Value)>),
  /// `true` / `false`
  Bool(bool),
  /// `null`
  Null,
  /// double-precision float
  Float(f64),
}

impl Value {
  /// A map with text keys, in the given order
  pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
    Value::Map(entries.into_iter()
                      .map(|(k, v)| (Value::from(k), v))
                      .collect())
  }

  /// Serialize this item
  pub fn to_vec(&self) -> Vec<u8> {
    let mut out = Vec::new();
    self.write(&mut out);
    out
  }

  fn write(&self, out: &mut Vec<u8>) {
    match self {
      | Value::Unsigned(n) => head(out, UNSIGNED, *n),
      | Value::Negative(n) if *n >= 0 => head(out, UNSIGNED, *n as u64),
      | Value::Negative(n) => head(out, NEGATIVE, (-1 - *n) as u64),
      | Value::Bytes(b) => {
        head(out, BYTES, b.len() as u64);
        out.extend_from_slice(b);
      },
      | Value::Text(s) => {
        head(out, TEXT, s.len() as u64);
        out.extend_from_slice(s.as_bytes());
      },
      | Value::Array(items) => {
        head(out, ARRAY, items.len() as u64);
        items.iter().for_each(|v| v.write(out));
      },
      | Value::Map(entries) => {
        head(out, MAP, entries.len() as u64);
        entries.iter().for_each(|(k, v)| {
                        k.write(out);
                        v.write(out);
                      });
      },
      | Value::Bool(false) => out.push(FALSE),
      | Value::Bool(true) => out.push(TRUE),
      | Value::Null => out.push(NULL),
      | Value::Float(f) => {
        out.push(FLOAT64);
        out.extend_from_slice(&f.to_be_bytes());
      },
    }
  }
}

/// Initial byte plus the shortest argument encoding of `n`
fn head(out: &mut Vec<u8>, major: u8, n: u64) {
  let major = major << 5;

  match n {
    | n if n < 24 => out.push(major | n as u8),
    | n if n <= u8::MAX as u64 => out.extend_from_slice(&[major | 24, n as u8]),
    | n if n <= u16::MAX as u64 => {
      out.push(major | 25);
      out.extend_from_slice(&(n as u16).to_be_bytes());
    },
    | n if n <= u32::MAX as u64 => {
      out.push(major | 26);
      out.extend_from_slice(&(n as u32).to_be_bytes());
    },
    | n => {
      out.push(major | 27);
      out.extend_from_slice(&n.to_be_bytes());
    },
  }
}

impl<'a> From<&'a str> for Value {
  fn from(s: &'a str) -> Self {
    Value::Text(String::from(s))
  }
}

impl From<u64> for Value {
  fn from(n: u64) -> Self {
    Value::Unsigned(n)
  }
}

impl<'a> From<&'a serde_json::Value> for Value {
  fn from(v: &'a serde_json::Value) -> Self {
    use serde_json::Value as Json;

    match v {
      | Json::Null => Value::Null,
      | Json::Bool(b) => Value::Bool(*b),
      | Json::Number(n) => n.as_u64()
                            .map(Value::Unsigned)
                            .or_else(|| n.as_i64().map(Value::Negative))
                            .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or(0.0))),
      | Json::String(s) => Value::Text(s.clone()),
      | Json::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
      | Json::Object(entries) => Value::Map(entries.iter()
                                                   .map(|(k, v)| (Value::from(k.as_str()), Value::from(v)))
                                                   .collect()),
    }
  }
}
