use core::fmt::Debug;

use crate::code::Code;
use crate::net::Addrd;
use crate::opt::{ContentFormat, OptNumber};
use crate::platform::Platform;
use crate::resource::Methods;

/// What a handler tells the engine about the response it was handed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerResult {
  /// The response is ready to send
  Ok,
  /// The response will be sent later (separate response)
  Postpone,
  /// The handler failed; the response carries an error code
  Error,
}

/// A request or response owned by the engine.
///
/// The adapter only ever borrows these; see [`crate::msg`] for the
/// typed view handed to application resources.
pub trait NativeMessage {
  /// Error yielded by the mutators
  type Error: Debug;

  /// Status / method code
  fn code(&self) -> Code;

  /// Overwrite the status code
  fn set_code(&mut self, code: Code);

  /// Raw value of the first option numbered `number`
  fn find_option(&self, number: OptNumber) -> Option<&[u8]>;

  /// Append an integer option, letting the engine choose its encoding
  fn append_uint_option(&mut self, number: OptNumber, value: u32) -> Result<(), Self::Error>;

  /// Append an option, copying `value`
  fn copy_option_to_list(&mut self, number: OptNumber, value: &[u8]) -> Result<(), Self::Error>;

  /// The payload, if the message carries one
  fn payload(&self) -> Option<&[u8]>;

  /// Replace the payload with a copy of `bytes`
  fn set_payload(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// A subscriber the engine remembered from the request that registered it
pub trait NativeObserver {
  /// Raw value of the first option numbered `number` in the registering request
  fn find_option(&self, number: OptNumber) -> Option<&[u8]>;
}

/// Options a native resource is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOptions {
  /// Content format advertised for the resource
  pub content_format: ContentFormat,
  /// Methods the engine should let through
  pub methods: Methods,
}

impl Default for ResourceOptions {
  fn default() -> Self {
    Self { content_format: ContentFormat::Text,
           methods: Methods::ALL }
  }
}

/// Callbacks the engine invokes on the thread that drives it
pub trait Handler<E: Engine + ?Sized> {
  /// A request matched `resource`; fill in `response`
  fn on_request(&self,
                resource: E::Resource,
                request: &E::Message,
                response: &mut E::Message)
                -> HandlerResult;

  /// `resource` asked to notify its observers; fill in `response` for `observer`
  fn on_notify(&self,
               resource: E::Resource,
               observer: &E::Observer,
               response: &mut E::Message)
               -> HandlerResult;
}

/// # Protocol engine
/// A CoAP implementation (message framing, deduplication, retransmission,
/// observer bookkeeping) the adapter drives from its poll loop.
///
/// The engine never calls application code directly: whenever it has
/// a request (or a notification) to answer, it calls the [`Handler`]
/// passed to [`Engine::handle_incoming_packet`] or [`Engine::do_work`],
/// and it transmits through the [`Platform`].
pub trait Engine {
  /// Handle of a resource owned by the engine
  type Resource: Copy + PartialEq + Debug;
  /// Native request/response
  type Message: NativeMessage;
  /// Native observer record
  type Observer: NativeObserver;
  /// Engine failure
  type Error: Debug;

  /// Prepare internal state; called once before anything else
  fn init(&mut self) -> Result<(), Self::Error>;

  /// Create a resource at `uri`, `None` if the engine could not
  fn create_resource(&mut self, uri: &str, options: ResourceOptions) -> Option<Self::Resource>;

  /// Forget a resource and its observers
  fn remove_resource(&mut self, resource: Self::Resource);

  /// Replace the set of methods the engine lets through for `resource`
  fn set_allowed_methods(&mut self, resource: Self::Resource, methods: Methods);

  /// Allow or forbid Observe registrations for `resource`
  fn set_observable(&mut self, resource: Self::Resource, observable: bool);

  /// Mark every observer of `resource` as due for a notification.
  ///
  /// Notifications are produced by the next [`Engine::do_work`].
  fn notify_observers(&mut self, resource: Self::Resource) -> Result<(), Self::Error>;

  /// Parse and answer a datagram
  fn handle_incoming_packet(&mut self,
                            packet: Addrd<&[u8]>,
                            platform: &mut dyn Platform,
                            handler: &dyn Handler<Self>);

  /// Drive retransmissions, timeouts and due notifications
  fn do_work(&mut self, platform: &mut dyn Platform, handler: &dyn Handler<Self>);
}
