use crate::code::{self, Code};
use crate::engine::{NativeMessage, NativeObserver};
use crate::opt::{ContentFormat, Opt, OptNumber, OptSlot, UInt};
use crate::Error;

/// Read access to a message; what a request looks like to a resource
pub trait MessageRead {
  /// Decode the option numbered `number` into a slot.
  ///
  /// Yields [`Error::NotFound`] when the message doesn't carry it.
  fn get_option(&self, number: OptNumber) -> Result<OptSlot, Error>;

  /// Method or status code
  fn code(&self) -> Code;

  /// Payload bytes; [`Error::NoPayload`] if there are none
  fn payload(&self) -> Result<&[u8], Error>;

  /// Value of an integer option
  fn uint_option(&self, number: OptNumber) -> Result<u32, Error> {
    let slot = self.get_option(number)?;
    slot.get_as::<UInt>()
        .map(|u| u.value)
        .ok_or(Error::OptionValue)
  }

  /// Content format named by an option (Accept or Content-Format).
  ///
  /// `Ok(None)` when the option is absent.
  fn content_format_option(&self, number: OptNumber) -> Result<Option<ContentFormat>, Error> {
    match self.uint_option(number) {
      | Ok(n) => u16::try_from(n).map(|n| Some(ContentFormat::from(n)))
                                 .map_err(|_| Error::OptionValue),
      | Err(Error::NotFound) => Ok(None),
      | Err(e) => Err(e),
    }
  }
}

/// # Message capability
/// Everything a resource may do to a response: options,
/// status code and payload.
pub trait Message: MessageRead {
  /// Append an option
  fn add_option(&mut self, opt: Opt) -> Result<(), Error>;

  /// Set the status code
  fn set_code(&mut self, code: Code);

  /// Replace the payload with a copy of `bytes`
  fn set_payload(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

/// # Observer capability
/// A peer subscribed to a resource, as remembered from its registering request.
pub trait Observer {
  /// Decode an option of the registering request into a slot
  fn get_option(&self, number: OptNumber) -> Result<OptSlot, Error>;
}

fn decode_into_slot(number: OptNumber, raw: Option<&[u8]>) -> Result<OptSlot, Error> {
  let raw = raw.ok_or(Error::NotFound)?;
  Opt::decode(number, raw).map(OptSlot::holding)
}

fn native<T, E: core::fmt::Debug>(what: &str, r: Result<T, E>) -> Result<T, Error> {
  r.map_err(|e| {
     log::error!("{} failed: {:?}", what, e);
     Error::Native
   })
}

/// Read-only adapter over a native request
#[derive(Debug, Clone, Copy)]
pub struct Request<'a, M>(&'a M);

impl<'a, M: NativeMessage> Request<'a, M> {
  /// Wrap a native message
  pub fn new(msg: &'a M) -> Self {
    Self(msg)
  }
}

impl<'a, M: NativeMessage> MessageRead for Request<'a, M> {
  fn get_option(&self, number: OptNumber) -> Result<OptSlot, Error> {
    decode_into_slot(number, self.0.find_option(number))
  }

  fn code(&self) -> Code {
    self.0.code()
  }

  fn payload(&self) -> Result<&[u8], Error> {
    self.0.payload().ok_or(Error::NoPayload)
  }
}

/// Adapter over a native response
#[derive(Debug)]
pub struct Response<'a, M>(&'a mut M);

impl<'a, M: NativeMessage> Response<'a, M> {
  /// Wrap a native message
  pub fn new(msg: &'a mut M) -> Self {
    Self(msg)
  }
}

impl<'a, M: NativeMessage> MessageRead for Response<'a, M> {
  fn get_option(&self, number: OptNumber) -> Result<OptSlot, Error> {
    decode_into_slot(number, self.0.find_option(number))
  }

  fn code(&self) -> Code {
    self.0.code()
  }

  fn payload(&self) -> Result<&[u8], Error> {
    self.0.payload().ok_or(Error::NoPayload)
  }
}

impl<'a, M: NativeMessage> Message for Response<'a, M> {
  fn add_option(&mut self, opt: Opt) -> Result<(), Error> {
    match opt {
      | Opt::UInt(UInt { number, value }) => {
        native("append_uint_option", self.0.append_uint_option(number, value))
      },
      | other => native("copy_option_to_list",
                        self.0.copy_option_to_list(other.number(), &other.encode())),
    }
  }

  fn set_code(&mut self, code: Code) {
    self.0.set_code(code)
  }

  fn set_payload(&mut self, bytes: &[u8]) -> Result<(), Error> {
    native("set_payload", self.0.set_payload(bytes))
  }
}

/// Adapter over a native observer
#[derive(Debug, Clone, Copy)]
pub struct ObserverRef<'a, O>(&'a O);

impl<'a, O: NativeObserver> ObserverRef<'a, O> {
  /// Wrap a native observer
  pub fn new(o: &'a O) -> Self {
    Self(o)
  }
}

impl<'a, O: NativeObserver> Observer for ObserverRef<'a, O> {
  fn get_option(&self, number: OptNumber) -> Result<OptSlot, Error> {
    decode_into_slot(number, self.0.find_option(number))
  }
}

/// An observer seen as the GET request it would send to poll the resource.
///
/// Answering this is how a notification stays identical to a GET
/// response for the same state.
#[derive(Clone, Copy)]
pub struct ObservedGet<'a>(pub &'a dyn Observer);

impl<'a> core::fmt::Debug for ObservedGet<'a> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("ObservedGet").finish()
  }
}

impl<'a> MessageRead for ObservedGet<'a> {
  fn get_option(&self, number: OptNumber) -> Result<OptSlot, Error> {
    self.0.get_option(number)
  }

  fn code(&self) -> Code {
    code::GET.0
  }

  fn payload(&self) -> Result<&[u8], Error> {
    Err(Error::NoPayload)
  }
}
