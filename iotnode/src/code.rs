use core::fmt;

/// # CoAP message code
///
/// A class (the `x` in `x.yy`) and a detail (the `yy`), packed on the
/// wire as `class << 5 | detail`.
///
/// ```
/// use iotnode::code::{self, Code};
///
/// assert_eq!(code::CONTENT, Code::new(2, 5));
/// assert_eq!(u8::from(code::CONTENT), 0x45);
/// assert_eq!(Code::from(0x84u8), code::NOT_FOUND);
/// assert_eq!(code::METHOD_NOT_ALLOWED.to_string(), "4.05");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Code {
  /// `2` in `2.05`
  pub class: u8,
  /// `05` in `2.05`
  pub detail: u8,
}

impl Code {
  /// Create a code from its class and detail
  pub const fn new(class: u8, detail: u8) -> Self {
    Self { class, detail }
  }

  /// 0.00; an unset code in a fresh response
  pub const EMPTY: Self = Self::new(0, 0);

  /// Is this a request method code (0.01 - 0.31)?
  pub fn is_request(&self) -> bool {
    self.class == 0 && self.detail != 0
  }

  /// Is this a success (2.xx) code?
  pub fn is_success(&self) -> bool {
    self.class == 2
  }
}

impl From<Code> for u8 {
  fn from(code: Code) -> u8 {
    (code.class << 5) | (code.detail & 0b11111)
  }
}

impl From<u8> for Code {
  fn from(b: u8) -> Self {
    Code::new(b >> 5, b & 0b11111)
  }
}

impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", self.class, self.detail)
  }
}

/// A request method.
///
/// Thin wrapper around the request [`Code`]s 0.01 - 0.04.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method(pub Code);

impl Method {
  /// Is this code one of GET, POST, PUT or DELETE?
  pub fn try_from_code(code: Code) -> Option<Self> {
    [GET, POST, PUT, DELETE].into_iter().find(|m| m.0 == code)
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match *self {
      | GET => "GET",
      | POST => "POST",
      | PUT => "PUT",
      | DELETE => "DELETE",
      | Method(other) => return write!(f, "{}", other),
    };

    f.write_str(name)
  }
}

macro_rules! code {
  (rfc7252($section:literal) $name:ident = $c:literal * $d:literal) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: Code = Code::new($c, $d);
  };
  (rfc7252($section:literal) $name:ident = $newtype:tt($c:literal * $d:literal)) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: $newtype = $newtype(Code::new($c, $d));
  };
}

// 0.xx
code!(rfc7252("5.8.1") GET    = Method(0*01));
code!(rfc7252("5.8.2") POST   = Method(0*02));
code!(rfc7252("5.8.3") PUT    = Method(0*03));
code!(rfc7252("5.8.4") DELETE = Method(0*04));

// 2.xx
code!(rfc7252("5.9.1.1") CREATED = 2*01);
code!(rfc7252("5.9.1.2") DELETED = 2*02);
code!(rfc7252("5.9.1.3") VALID   = 2*03);
code!(rfc7252("5.9.1.4") CHANGED = 2*04);
code!(rfc7252("5.9.1.5") CONTENT = 2*05);

// 4.xx
code!(rfc7252("5.9.2.1")  BAD_REQUEST                = 4*00);
code!(rfc7252("5.9.2.2")  UNAUTHORIZED               = 4*01);
code!(rfc7252("5.9.2.3")  BAD_OPTION                 = 4*02);
code!(rfc7252("5.9.2.4")  FORBIDDEN                  = 4*03);
code!(rfc7252("5.9.2.5")  NOT_FOUND                  = 4*04);
code!(rfc7252("5.9.2.6")  METHOD_NOT_ALLOWED         = 4*05);
code!(rfc7252("5.9.2.7")  NOT_ACCEPTABLE             = 4*06);
code!(rfc7252("5.9.2.8")  PRECONDITION_FAILED        = 4*12);
code!(rfc7252("5.9.2.9")  REQUEST_ENTITY_TOO_LARGE   = 4*13);
code!(rfc7252("5.9.2.10") UNSUPPORTED_CONTENT_FORMAT = 4*15);

// 5.xx
code!(rfc7252("5.9.3.1") INTERNAL_SERVER_ERROR  = 5*00);
code!(rfc7252("5.9.3.2") NOT_IMPLEMENTED        = 5*01);
code!(rfc7252("5.9.3.3") BAD_GATEWAY            = 5*02);
code!(rfc7252("5.9.3.4") SERVICE_UNAVAILABLE    = 5*03);
code!(rfc7252("5.9.3.5") GATEWAY_TIMEOUT        = 5*04);
code!(rfc7252("5.9.3.6") PROXYING_NOT_SUPPORTED = 5*05);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn packs_class_and_detail() {
    assert_eq!(u8::from(GET.0), 0x01);
    assert_eq!(u8::from(CHANGED), 0x44);
    assert_eq!(u8::from(INTERNAL_SERVER_ERROR), 0xA0);
    assert_eq!(Code::from(0x45u8), CONTENT);
  }

  #[test]
  fn only_four_methods() {
    assert_eq!(Method::try_from_code(Code::new(0, 2)), Some(POST));
    assert_eq!(Method::try_from_code(Code::new(0, 5)), None);
    assert_eq!(Method::try_from_code(CONTENT), None);
  }

  #[test]
  fn display() {
    assert_eq!(format!("{}", BAD_OPTION), "4.02");
    assert_eq!(format!("{}", DELETE), "DELETE");
    assert_eq!(format!("{}", Method(Code::new(0, 7))), "0.07");
  }
}
