use core::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use toad_array::Array;

use crate::adapter::Adapter;
use crate::code;
use crate::engine::Engine;
use crate::msg::{Message, MessageRead};
use crate::observe::Notifier;
use crate::payload;
use crate::resource::{ApplicationResource, Outcome, Registration, ResourceId};
use crate::Error;

/// Milliseconds the debounce task ignores edges after handling one
pub const DEBOUNCE_MS: u64 = 20;

/// Position of the switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
  /// released
  Idle,
  /// held down
  Pushed,
}

impl State {
  fn as_str(&self) -> &'static str {
    match self {
      | State::Idle => "idle",
      | State::Pushed => "pushed",
    }
  }
}

/// # Push switch
/// Observable; answers GET (and notifications) with `{"state":"idle"|"pushed"}`.
///
/// The state is written by a [`Debouncer`] on another thread and read by
/// the poll loop, so it lives in an atomic.
#[derive(Debug, Default)]
pub struct Switch {
  pushed: AtomicBool,
}

impl Switch {
  /// An idle switch
  pub const fn new() -> Self {
    Self { pushed: AtomicBool::new(false) }
  }

  /// Register at `switch`, answering GET and accepting observers
  pub fn install<'r, E, A>(&'r self, adapter: &mut Adapter<E, A>) -> Result<ResourceId, Error>
    where E: Engine,
          A: Array<Item = Registration<'r, E::Resource>>
  {
    let id = adapter.create_resource(self, "switch")?;
    adapter.resource(id)?
           .register_method(code::GET)?
           .register_observable()?;
    Ok(id)
  }

  /// Current position
  pub fn state(&self) -> State {
    if self.pushed.load(Ordering::Acquire) {
      State::Pushed
    } else {
      State::Idle
    }
  }

  /// Store a new position, yielding whether it changed
  pub fn store(&self, state: State) -> bool {
    let pushed = state == State::Pushed;
    self.pushed.swap(pushed, Ordering::AcqRel) != pushed
  }
}

impl ApplicationResource for Switch {
  fn handle_request(&self, req: &dyn MessageRead, rep: &mut dyn Message) -> Outcome {
    match payload::reply_doc(req, rep, &json!({ "state": self.state().as_str() })) {
      | Ok(()) => Outcome::Ok,
      | Err(_) => Outcome::Error,
    }
  }
}

/// Input pin the switch is wired to
pub trait Gpio {
  /// Current logic level
  fn level(&self) -> u32;
}

/// # Debouncer
/// The producer half of the switch: samples the pin after an edge and,
/// when the position changed, asks the poll loop to notify observers.
///
/// Never touches the engine.
#[derive(Debug)]
pub struct Debouncer<'a, G, const N: usize> {
  gpio: G,
  active_level: u32,
  switch: &'a Switch,
  notifier: Notifier<'a, N>,
  id: ResourceId,
}

impl<'a, G: Gpio, const N: usize> Debouncer<'a, G, N> {
  /// Watch `gpio` for `switch`, registered as `id`.
  ///
  /// The switch reads as pushed while the pin is at `active_level`.
  pub fn new(gpio: G,
             active_level: u32,
             switch: &'a Switch,
             notifier: Notifier<'a, N>,
             id: ResourceId)
             -> Self {
    Self { gpio,
           active_level,
           switch,
           notifier,
           id }
  }

  fn sample(&self) -> State {
    if self.gpio.level() == self.active_level {
      State::Pushed
    } else {
      State::Idle
    }
  }

  /// Seed the switch with the pin's current level, without notifying
  pub fn prime(&self) {
    self.switch.store(self.sample());
  }

  /// Handle an edge.
  ///
  /// Yields whether the position changed (and a notification was requested).
  pub fn on_edge(&self) -> bool {
    let changed = self.switch.store(self.sample());

    if changed {
      log::debug!("switch {} {}", self.id, self.switch.state().as_str());
      self.notifier.notify(self.id).ok();
    }

    changed
  }
}

#[cfg(feature = "std")]
impl<G: Gpio + Send + 'static, const N: usize> Debouncer<'static, G, N> {
  /// Prime the switch from the pin, then run the debouncer on its own thread.
  ///
  /// Every message on `edges` is one interrupt; after handling it the
  /// thread sleeps for [`DEBOUNCE_MS`]. The thread ends when every
  /// sender is dropped.
  pub fn spawn(self, edges: ::std::sync::mpsc::Receiver<()>) -> ::std::thread::JoinHandle<()> {
    self.prime();

    ::std::thread::spawn(move || {
      while edges.recv().is_ok() {
        self.on_edge();
        ::std::thread::sleep(::std::time::Duration::from_millis(DEBOUNCE_MS));
      }
    })
  }
}
