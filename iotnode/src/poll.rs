use toad_array::Array;

use crate::adapter::Adapter;
use crate::config::Config;
use crate::engine::Engine;
use crate::net::{Addrd, Socket};
use crate::observe::NotifyQueue;
use crate::platform::Host;
use crate::resource::Registration;
use crate::time::Clock;

/// Largest datagram the loop reads; bigger ones are truncated by the socket
pub const MAX_DGRAM: usize = 1152;

/// # Poll loop
/// The one thread that drives the engine.
///
/// Each iteration:
/// 1. when the network is up, waits (bounded by the socket's read timeout)
///    for one datagram and hands it to the engine, which dispatches it
/// 2. drains the [`NotifyQueue`], asking the engine to notify observers
/// 3. lets the engine do its periodic work, which is when
///    notifications are actually produced and sent
#[derive(Debug)]
pub struct PollLoop<'q, E, A, S, C, const N: usize> {
  adapter: Adapter<E, A>,
  socket: S,
  clock: C,
  queue: &'q NotifyQueue<N>,
  config: Config,
}

impl<'q, 'r, E, A, S, C, const N: usize> PollLoop<'q, E, A, S, C, N>
  where E: Engine,
        A: Array<Item = Registration<'r, E::Resource>>,
        S: Socket,
        C: Clock
{
  /// Take ownership of an adapter and the socket it is served on
  pub fn new(adapter: Adapter<E, A>,
             socket: S,
             clock: C,
             queue: &'q NotifyQueue<N>,
             config: Config)
             -> Self {
    Self { adapter,
           socket,
           clock,
           queue,
           config }
  }

  /// The adapter, for configuration from the loop's own thread
  pub fn adapter(&mut self) -> &mut Adapter<E, A> {
    &mut self.adapter
  }

  /// The socket
  pub fn socket(&self) -> &S {
    &self.socket
  }

  /// Check the registry before serving.
  ///
  /// Yields the number of registrations that answer no methods.
  pub fn start(&self) -> usize {
    log::info!("serving on {}", self.socket.local_addr());
    self.adapter.warn_unusable()
  }

  /// Serve forever
  pub fn run(&mut self) -> ! {
    self.start();

    loop {
      self.poll_once();
    }
  }

  /// Run one iteration of the loop
  pub fn poll_once(&mut self) {
    let mut host = Host::new(&self.socket, &self.clock);

    if self.adapter.network_ready() {
      let mut buf = [0u8; MAX_DGRAM];

      match self.socket.recv(&mut buf) {
        | Ok(Addrd(n, addr)) => {
          log::trace!("received {} bytes from {}", n, addr);
          self.adapter
              .handle_datagram(Addrd(&buf[..n.min(MAX_DGRAM)], addr), &mut host);
        },
        | Err(nb::Error::WouldBlock) => (),
        | Err(nb::Error::Other(e)) => log::error!("recv failed: {:?}", e),
      }
    }

    if self.config.coalesce_notifications {
      self.queue
          .drain_coalesced()
          .into_iter()
          .for_each(|id| {
            self.adapter.notify_observers(id).ok();
          });
    } else {
      for id in self.queue.drain() {
        self.adapter.notify_observers(id).ok();
      }
    }

    self.adapter.do_work(&mut host);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::code;
  use crate::observe::NotifyQueue;
  use crate::resource::ResourceId;
  use crate::test::{self, ClockMock, EngineMock, MockResource, Reply, SockMock, WireMsg};

  type Loop<'q, 'r> =
    PollLoop<'q, EngineMock, Vec<Registration<'r, usize>>, SockMock, ClockMock, 8>;

  fn with_loop<'q, 'r>(queue: &'q NotifyQueue<8>,
                       app: &'r MockResource,
                       observable: bool)
                       -> (Loop<'q, 'r>, ResourceId) {
    let mut adapter = Adapter::new(EngineMock::default());
    adapter.start().unwrap();
    let id = adapter.create_resource(app, "/a").unwrap();
    adapter.resource(id)
           .unwrap()
           .register_method(code::GET)
           .unwrap();
    if observable {
      adapter.resource(id).unwrap().register_observable().unwrap();
    }

    let lp = PollLoop::new(adapter,
                           SockMock::new(),
                           ClockMock::new(),
                           queue,
                           Config::default());
    (lp, id)
  }

  #[test]
  fn gated_on_network_ready() {
    let queue = NotifyQueue::new();
    let app = MockResource::replying(Reply::Content);
    let (mut lp, _) = with_loop(&queue, &app, false);

    lp.socket().push_rx(WireMsg::get("/a"), test::dummy_addr());
    lp.poll_once();
    assert!(lp.socket().take_tx().is_empty());
    assert_eq!(lp.adapter().engine().work_ticks, 1);

    lp.adapter().set_network_ready(true);
    lp.poll_once();

    let sent = lp.socket().take_tx();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].data().code, u8::from(code::CONTENT));
    assert_eq!(app.calls(), 1);
  }

  #[test]
  fn notify_requests_are_coalesced_before_work() {
    let queue = NotifyQueue::new();
    let app = MockResource::replying(Reply::Content);
    let (mut lp, id) = with_loop(&queue, &app, true);
    lp.adapter().set_network_ready(true);

    lp.socket().push_rx(WireMsg::observe("/a"), test::dummy_addr());
    lp.poll_once();
    assert_eq!(lp.socket().take_tx().len(), 1);

    let n = queue.notifier();
    n.notify(id).unwrap();
    n.notify(id).unwrap();
    lp.poll_once();

    let sent = lp.socket().take_tx();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].data().observe);
    assert_eq!(app.calls(), 2);
  }

  #[test]
  fn without_coalescing_every_request_notifies() {
    let queue = NotifyQueue::new();
    let app = MockResource::replying(Reply::Content);
    let (mut lp, id) = with_loop(&queue, &app, true);
    lp.config.coalesce_notifications = false;
    lp.adapter().set_network_ready(true);

    lp.socket().push_rx(WireMsg::observe("/a"), test::dummy_addr());
    lp.poll_once();
    lp.socket().take_tx();

    queue.notifier().notify(id).unwrap();
    queue.notifier().notify(id).unwrap();
    lp.poll_once();

    let id_native = lp.adapter().registry().get(id).unwrap().native.unwrap();
    assert_eq!(lp.adapter().engine().resource(id_native).unwrap().notify_requests, 2);
  }

  #[test]
  fn start_reports_unusable_resources() {
    let queue = NotifyQueue::new();
    let app = MockResource::replying(Reply::Content);
    let (mut lp, _) = with_loop(&queue, &app, false);
    assert_eq!(lp.start(), 0);

    lp.adapter().create_resource(&app, "/b").unwrap();
    assert_eq!(lp.start(), 1);
  }
}
