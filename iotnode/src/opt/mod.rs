use core::fmt;

use tinyvec::ArrayVec;

use crate::slot::Slot;
use crate::Error;

/// Option numbers and the kind table
pub mod known;

/// Content-Format values
pub mod content_format;

#[doc(inline)]
pub use content_format::ContentFormat;
#[doc(inline)]
pub use known::kind_of;

/// Largest opaque or string option value this crate will hold
pub const MAX_VALUE_LEN: usize = 64;

/// Bytes reserved by an [`OptSlot`]
pub const SLOT_SIZE: usize = 96;

/// A fixed-capacity slot holding one [`Opt`]
pub type OptSlot = Slot<Opt, SLOT_SIZE>;

/// Raw value bytes of an option
pub type Bytes = ArrayVec<[u8; MAX_VALUE_LEN]>;

/// # Option Number
/// The number identifying an option, e.g. `12` for Content-Format.
///
/// See [`known`] for the numbers this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OptNumber(pub u16);

impl fmt::Display for OptNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The value format of an option
/// ([RFC 7252 section 3.2](https://datatracker.ietf.org/doc/html/rfc7252#section-3.2))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptKind {
  /// zero-length
  Empty,
  /// arbitrary bytes
  Opaque,
  /// minimal-length big-endian unsigned integer
  UInt,
  /// UTF-8 text
  String,
}

/// An option without a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Empty {
  /// option number
  pub number: OptNumber,
}

impl Empty {
  /// Create an empty option
  pub fn new(number: OptNumber) -> Self {
    Self { number }
  }
}

/// An option holding arbitrary bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opaque {
  /// option number
  pub number: OptNumber,
  /// value
  pub data: Bytes,
}

impl Opaque {
  /// Copy `data` into a new opaque option
  pub fn new(number: OptNumber, data: &[u8]) -> Result<Self, Error> {
    if data.len() > MAX_VALUE_LEN {
      return Err(Error::OptionTooLong);
    }

    let mut bytes = Bytes::new();
    bytes.extend_from_slice(data);
    Ok(Self { number, data: bytes })
  }
}

/// An option holding an unsigned integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UInt {
  /// option number
  pub number: OptNumber,
  /// value
  pub value: u32,
}

impl UInt {
  /// Create an integer option
  pub fn new(number: OptNumber, value: u32) -> Self {
    Self { number, value }
  }

  /// A Content-Format or Accept option
  ///
  /// ```
  /// use iotnode::opt::{known, ContentFormat, UInt};
  ///
  /// assert_eq!(UInt::content_format(known::CONTENT_FORMAT, ContentFormat::Cbor).value, 60);
  /// ```
  pub fn content_format(number: OptNumber, format: ContentFormat) -> Self {
    Self::new(number, u32::from(u16::from(&format)))
  }

  /// Interpret the value as a content format
  ///
  /// Values that do not fit in 16 bits are not content formats.
  pub fn as_content_format(&self) -> Option<ContentFormat> {
    u16::try_from(self.value).ok().map(ContentFormat::from)
  }
}

/// An option holding UTF-8 text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Str {
  /// option number
  pub number: OptNumber,
  /// value
  pub data: toad_string::String<MAX_VALUE_LEN>,
}

impl Str {
  /// Copy `s` into a new string option
  pub fn new(number: OptNumber, s: &str) -> Result<Self, Error> {
    if s.len() > MAX_VALUE_LEN {
      return Err(Error::OptionTooLong);
    }

    Ok(Self { number,
              data: toad_string::String::from(s) })
  }

  /// The option's text
  pub fn as_str(&self) -> &str {
    self.data.as_str()
  }
}

/// # Option
/// A numbered option of one of the four [`OptKind`]s.
///
/// Which kind an option number carries is fixed by [`known::kind_of`];
/// [`Opt::decode`] and [`Opt::encode`] are inverses.
///
/// ```
/// use iotnode::opt::{known, Opt, Str, UInt};
///
/// let accept = Opt::from(UInt::new(known::ACCEPT, 50));
/// assert_eq!(accept.encode().as_slice(), &[50]);
/// assert_eq!(Opt::decode(known::ACCEPT, &[50]), Ok(accept));
///
/// let path = Opt::from(Str::new(known::URI_PATH, "led").unwrap());
/// assert_eq!(path.encode().as_slice(), b"led");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opt {
  /// see [`Empty`]
  Empty(Empty),
  /// see [`Opaque`]
  Opaque(Opaque),
  /// see [`UInt`]
  UInt(UInt),
  /// see [`Str`]
  String(Str),
}

crate::variants!(Opt { Empty(Empty),
                       Opaque(Opaque),
                       UInt(UInt),
                       String(Str) });

impl Opt {
  /// The option number
  pub fn number(&self) -> OptNumber {
    match self {
      | Opt::Empty(o) => o.number,
      | Opt::Opaque(o) => o.number,
      | Opt::UInt(o) => o.number,
      | Opt::String(o) => o.number,
    }
  }

  /// The option's kind
  pub fn kind(&self) -> OptKind {
    match self {
      | Opt::Empty(_) => OptKind::Empty,
      | Opt::Opaque(_) => OptKind::Opaque,
      | Opt::UInt(_) => OptKind::UInt,
      | Opt::String(_) => OptKind::String,
    }
  }

  /// Number of bytes in the encoded value
  pub fn encoded_len(&self) -> usize {
    match self {
      | Opt::Empty(_) => 0,
      | Opt::Opaque(o) => o.data.len(),
      | Opt::UInt(o) => uint_len(o.value),
      | Opt::String(o) => o.data.as_bytes().len(),
    }
  }

  /// Serialize the value of this option
  pub fn encode(&self) -> Bytes {
    match self {
      | Opt::Empty(_) => Bytes::new(),
      | Opt::Opaque(o) => o.data,
      | Opt::UInt(o) => encode_uint(o.value).into_iter().collect(),
      | Opt::String(o) => o.data.as_bytes().iter().copied().collect(),
    }
  }

  /// Build the typed option for `number` from its raw value.
  ///
  /// The kind is looked up with [`kind_of`]; numbers the table doesn't
  /// know are [`Empty`] and their bytes are ignored.
  pub fn decode(number: OptNumber, raw: &[u8]) -> Result<Opt, Error> {
    match kind_of(number) {
      | OptKind::Empty => Ok(Empty::new(number).into()),
      | OptKind::Opaque => Opaque::new(number, raw).map(Opt::from),
      | OptKind::UInt => decode_uint(raw).map(|value| UInt::new(number, value).into()),
      | OptKind::String => {
        if raw.len() > MAX_VALUE_LEN {
          return Err(Error::OptionTooLong);
        }

        toad_string::String::<MAX_VALUE_LEN>::from_utf8(raw).map(|data| Str { number, data }.into())
                                                            .map_err(|_| Error::OptionValue)
      },
    }
  }
}

/// Bytes needed to represent `n` without leading zeroes
fn uint_len(n: u32) -> usize {
  4 - (n.leading_zeros() / 8) as usize
}

/// Minimal-length big-endian encoding of `n`.
///
/// ```
/// use iotnode::opt::encode_uint;
///
/// assert!(encode_uint(0).is_empty());
/// assert_eq!(encode_uint(255).as_slice(), &[0xFF]);
/// assert_eq!(encode_uint(256).as_slice(), &[1, 0]);
/// assert_eq!(encode_uint(0x1000000).as_slice(), &[1, 0, 0, 0]);
/// ```
pub fn encode_uint(n: u32) -> ArrayVec<[u8; 4]> {
  let bytes = n.to_be_bytes();
  bytes[4 - uint_len(n)..].iter().copied().collect()
}

/// Inverse of [`encode_uint`]; leading zero bytes are tolerated
pub fn decode_uint(raw: &[u8]) -> Result<u32, Error> {
  if raw.len() > 4 {
    return Err(Error::OptionValue);
  }

  Ok(raw.iter().fold(0u32, |n, b| (n << 8) | u32::from(*b)))
}

#[cfg(test)]
mod tests {
  use super::*;

  macro_rules! round_trip {
    ($($name:ident: $opt:expr),+ $(,)?) => {
      $(
        paste::paste! {
          #[test]
          fn [<round_trip_ $name>]() {
            let opt: Opt = $opt;
            let bytes = opt.encode();
            assert_eq!(bytes.len(), opt.encoded_len());
            assert_eq!(Opt::decode(opt.number(), &bytes), Ok(opt));
          }
        }
      )+
    };
  }

  round_trip! {
    if_none_match: Empty::new(known::IF_NONE_MATCH).into(),
    etag: Opaque::new(known::ETAG, &[0xDE, 0xAD, 0x00]).unwrap().into(),
    empty_etag: Opaque::new(known::ETAG, &[]).unwrap().into(),
    uri_host: Str::new(known::URI_HOST, "iotnode.local").unwrap().into(),
    uri_query: Str::new(known::URI_QUERY, "rt=oic.r.switch").unwrap().into(),
    accept_json: UInt::content_format(known::ACCEPT, ContentFormat::Json).into(),
    max_age_zero: UInt::new(known::MAX_AGE, 0).into(),
    size1_max: UInt::new(known::SIZE1, u32::MAX).into(),
  }

  #[test]
  fn uint_encoding_is_minimal() {
    let cases: [(u32, usize); 9] = [(0, 0),
                                     (1, 1),
                                     (255, 1),
                                     (256, 2),
                                     (65535, 2),
                                     (65536, 3),
                                     (0xFFFFFF, 3),
                                     (0x1000000, 4),
                                     (u32::MAX, 4)];

    for (n, len) in cases {
      assert_eq!(encode_uint(n).len(), len, "{}", n);
      assert_eq!(decode_uint(&encode_uint(n)), Ok(n));
    }
  }

  #[test]
  fn decode_uint_rejects_wide_values() {
    assert_eq!(decode_uint(&[1, 2, 3, 4, 5]), Err(Error::OptionValue));
    assert_eq!(Opt::decode(known::ACCEPT, &[0, 0, 0, 0, 50]),
               Err(Error::OptionValue));
  }

  #[test]
  fn decode_unknown_number_is_empty() {
    let opt = Opt::decode(OptNumber(2048), b"ignored").unwrap();
    assert_eq!(opt, Opt::Empty(Empty::new(OptNumber(2048))));
    assert!(opt.encode().is_empty());
  }

  #[test]
  fn decode_string_checks_utf8_and_length() {
    assert_eq!(Opt::decode(known::URI_PATH, &[0xFF, 0xFE]),
               Err(Error::OptionValue));
    assert_eq!(Opt::decode(known::URI_PATH, &[b'a'; MAX_VALUE_LEN + 1]),
               Err(Error::OptionTooLong));
    assert_eq!(Opaque::new(known::ETAG, &[0; MAX_VALUE_LEN + 1]),
               Err(Error::OptionTooLong));
  }

  #[test]
  fn options_fit_their_slot() {
    let slot = OptSlot::with(Str::new(known::PROXY_URI, "coap://x").unwrap());
    assert!(core::mem::size_of::<Opt>() <= slot.capacity());
    assert_eq!(slot.get().map(Opt::kind), Some(OptKind::String));
    assert_eq!(slot.get_as::<Str>().map(Str::as_str), Some("coap://x"));
  }
}
