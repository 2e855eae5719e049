use core::fmt;

/// Errors surfaced by the adapter.
///
/// None of these ever reach a remote peer directly; the dispatcher
/// turns failures into response codes (see [`crate::code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
  /// The option is not present in the message.
  ///
  /// Distinct from an option that is present with an empty value.
  NotFound,
  /// The message carries no payload
  NoPayload,
  /// An opaque or string option value exceeds [`crate::opt::MAX_VALUE_LEN`]
  OptionTooLong,
  /// The raw bytes are not a valid value for the option's kind
  /// (a `UInt` wider than 4 bytes, or a `String` that isn't UTF-8)
  OptionValue,
  /// [`RegisterMethod`](crate::adapter::Resource::register_method) was
  /// given a code that is not GET, POST, PUT or DELETE
  NotAMethod,
  /// The engine refused to create a native resource
  CreateResource,
  /// No registration matches the handle
  UnknownResource,
  /// The registry has no room for another resource
  RegistryFull,
  /// The notification queue is full
  QueueFull,
  /// A native message mutator failed (e.g. the engine ran out of memory)
  Native,
  /// The engine reported a failure
  Engine,
  /// The clock could not be read
  Clock,
  /// A payload could not be encoded or decoded
  Codec,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let msg = match self {
      | Error::NotFound => "option not found",
      | Error::NoPayload => "message has no payload",
      | Error::OptionTooLong => "option value too long",
      | Error::OptionValue => "option value does not match its kind",
      | Error::NotAMethod => "code is not a request method",
      | Error::CreateResource => "engine failed to create resource",
      | Error::UnknownResource => "no registration for resource",
      | Error::RegistryFull => "resource registry is full",
      | Error::QueueFull => "notification queue is full",
      | Error::Native => "native message operation failed",
      | Error::Engine => "protocol engine failure",
      | Error::Clock => "clock unavailable",
      | Error::Codec => "payload codec failed",
    };

    f.write_str(msg)
  }
}

#[cfg(feature = "std")]
impl ::std::error::Error for Error {}
