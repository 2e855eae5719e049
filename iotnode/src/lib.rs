//! `iotnode` glues independent, memory-constrained resource handlers
//! (an RGB LED, a push switch, network status, OIC discovery) to a
//! CoAP protocol engine, without either side knowing the other's types.
//!
//! ## Layers
//! - The engine (framing, retransmission, option wire rules) is **not** part
//!   of this crate. It is reached through the [`Engine`](crate::engine::Engine) trait.
//! - The [`Adapter`](crate::adapter::Adapter) owns the engine and a
//!   [`Registry`](crate::resource::Registry) of application resources.
//!   When the engine matches an inbound request to a resource, the registry
//!   wraps the engine's native messages in [`msg`] adapters and invokes the
//!   [`ApplicationResource`](crate::resource::ApplicationResource).
//! - Options are typed through a static table ([`opt::known`]) and handed
//!   out in fixed-capacity [`Slot`](crate::slot::Slot)s; nothing in the
//!   request path allocates.
//! - Background producers (e.g. a GPIO debounce thread) never touch the engine.
//!   They post into a [`NotifyQueue`](crate::observe::NotifyQueue), which the
//!   [`PollLoop`](crate::poll::PollLoop) drains once per iteration.
//!
//! ## Example
//! ```
//! use iotnode::resource::{ApplicationResource, Outcome};
//! use iotnode::msg::{Message, MessageRead};
//! use iotnode::code;
//!
//! struct Hello;
//!
//! impl ApplicationResource for Hello {
//!   fn handle_request(&self, _: &dyn MessageRead, rep: &mut dyn Message) -> Outcome {
//!     rep.set_code(code::CONTENT);
//!     match rep.set_payload(b"hello") {
//!       | Ok(()) => Outcome::Ok,
//!       | Err(_) => Outcome::Error,
//!     }
//!   }
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/iotnode/0.3.0")]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc as std_alloc;


pub(crate) mod logging;

/// crate-wide error type
pub mod error;

/// status & method codes
pub mod code;

/// fixed-capacity storage for one of a closed set of variants
pub mod slot;

/// typed CoAP options
pub mod opt;

/// message capabilities & adapters over engine-owned messages
pub mod msg;

/// contract of the native protocol engine
pub mod engine;

/// services the engine calls back into
pub mod platform;

/// application resources, registry & dispatch
pub mod resource;

/// the adapter owning engine & registry
pub mod adapter;

/// cross-thread notification handoff
pub mod observe;

/// retry / backoff timer for the security handshake
pub mod timer;

/// the poll loop
pub mod poll;

/// network abstractions
pub mod net;

/// time abstractions
pub mod time;

/// configuration
pub mod config;

/// payload codecs (JSON & CBOR)
#[cfg(feature = "alloc")]
pub mod payload;

/// resources exposed by an iotnode
#[cfg(feature = "alloc")]
pub mod resources;

/// `std`-only platform implementations
#[cfg(feature = "std")]
pub mod std;

pub use error::Error;
