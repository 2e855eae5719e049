use super::{OptKind, OptNumber};

macro_rules! opt {
  (rfc7252($section:literal) $name:ident = $n:literal) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    pub const $name: OptNumber = OptNumber($n);
  };
  (#[doc = $doc:expr] $name:ident = $n:literal) => {
    #[doc = $doc]
    pub const $name: OptNumber = OptNumber($n);
  };
}

opt!(rfc7252("5.10.8.1") IF_MATCH = 1);
opt!(rfc7252("5.10.1") URI_HOST = 3);
opt!(rfc7252("5.10.6") ETAG = 4);
opt!(rfc7252("5.10.8.2") IF_NONE_MATCH = 5);
opt!(#[doc = "Observe ([RFC 7641](https://www.rfc-editor.org/rfc/rfc7641#section-2))"]
     OBSERVE = 6);
opt!(#[doc = "See [`URI_HOST`]"]
     URI_PORT = 7);
opt!(rfc7252("5.10.7") LOCATION_PATH = 8);
opt!(#[doc = "See [`URI_HOST`]"]
     URI_PATH = 11);
opt!(rfc7252("5.10.3") CONTENT_FORMAT = 12);
opt!(rfc7252("5.10.5") MAX_AGE = 14);
opt!(#[doc = "See [`URI_HOST`]"]
     URI_QUERY = 15);
opt!(rfc7252("5.10.4") ACCEPT = 17);
opt!(#[doc = "See [`LOCATION_PATH`]"]
     LOCATION_QUERY = 20);
opt!(rfc7252("5.10.2") PROXY_URI = 35);
opt!(#[doc = "See [`PROXY_URI`]"]
     PROXY_SCHEME = 39);
opt!(rfc7252("5.10.9") SIZE1 = 60);

/// The value kind of every option number this crate knows about.
///
/// Kinds follow the option definitions of RFC 7252 section 5.10 and RFC 7641.
pub static KINDS: [(OptNumber, OptKind); 16] = [(IF_MATCH, OptKind::Opaque),
                                                (URI_HOST, OptKind::String),
                                                (ETAG, OptKind::Opaque),
                                                (IF_NONE_MATCH, OptKind::Empty),
                                                (OBSERVE, OptKind::UInt),
                                                (URI_PORT, OptKind::UInt),
                                                (LOCATION_PATH, OptKind::String),
                                                (URI_PATH, OptKind::String),
                                                (CONTENT_FORMAT, OptKind::UInt),
                                                (MAX_AGE, OptKind::UInt),
                                                (URI_QUERY, OptKind::String),
                                                (ACCEPT, OptKind::UInt),
                                                (LOCATION_QUERY, OptKind::String),
                                                (PROXY_URI, OptKind::String),
                                                (PROXY_SCHEME, OptKind::String),
                                                (SIZE1, OptKind::UInt)];

/// Look up the kind of an option number; unknown numbers are [`OptKind::Empty`].
///
/// ```
/// use iotnode::opt::{known, OptKind, OptNumber};
///
/// assert_eq!(known::kind_of(known::ACCEPT), OptKind::UInt);
/// assert_eq!(known::kind_of(OptNumber(65000)), OptKind::Empty);
/// ```
pub fn kind_of(number: OptNumber) -> OptKind {
  KINDS.iter()
       .find(|(n, _)| *n == number)
       .map(|(_, kind)| *kind)
       .unwrap_or(OptKind::Empty)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_kind_per_number() {
    KINDS.iter().enumerate().for_each(|(ix, (n, _))| {
                              assert!(KINDS[ix + 1..].iter().all(|(m, _)| m != n),
                                      "{} listed twice",
                                      n)
                            });
  }

  #[test]
  fn negotiation_options_are_uints() {
    assert_eq!(kind_of(ACCEPT), OptKind::UInt);
    assert_eq!(kind_of(CONTENT_FORMAT), OptKind::UInt);
    assert_eq!(kind_of(URI_PATH), OptKind::String);
    assert_eq!(kind_of(ETAG), OptKind::Opaque);
  }
}
