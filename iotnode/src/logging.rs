use core::fmt::Write;

use tinyvec::ArrayVec;
use toad_writable::Writable;

use crate::code::{Code, Method};
use crate::msg::MessageRead;

/// `GET /led -> 2.05`, truncated to fit
pub(crate) fn dispatch_summary(uri: &str,
                               req: &dyn MessageRead,
                               rep: Code)
                               -> Writable<ArrayVec<[u8; 96]>> {
  let mut buf: Writable<ArrayVec<[u8; 96]>> = Default::default();
  let method = req.code();
  let payload = req.payload().map(<[u8]>::len).unwrap_or(0);

  let wrote = match Method::try_from_code(method) {
    | Some(m) => write!(buf, "{} ", m),
    | None => write!(buf, "{} ", method),
  };

  wrote.and_then(|_| write!(buf, "{} ({}b) -> {}", uri, payload, rep))
       .ok();
  buf
}
