use crate::net::{Addrd, Socket};
use crate::time::{now_millis, Clock};

/// # Platform services
/// What the protocol engine needs from the host: a coarse clock, somewhere
/// to write diagnostics, and a way to put datagrams on the wire.
pub trait Platform {
  /// Seconds since the platform started
  fn rtc_1hz(&self) -> u32;

  /// Engine diagnostics
  fn debug_puts(&self, msg: &str);

  /// Transmit a datagram.
  ///
  /// `false` when the datagram could not be sent; the engine treats
  /// that as a lost packet.
  fn tx(&mut self, dgram: Addrd<&[u8]>) -> bool;
}

/// [`Platform`] over a [`Socket`] and a [`Clock`]
#[derive(Debug)]
pub struct Host<'a, S, C> {
  socket: &'a S,
  clock: &'a C,
}

impl<'a, S: Socket, C: Clock> Host<'a, S, C> {
  /// Borrow a socket and clock for the engine to use
  pub fn new(socket: &'a S, clock: &'a C) -> Self {
    Self { socket, clock }
  }
}

impl<'a, S: Socket, C: Clock> Platform for Host<'a, S, C> {
  fn rtc_1hz(&self) -> u32 {
    now_millis(self.clock).map(|ms| (ms / 1000) as u32)
                          .unwrap_or(0)
  }

  fn debug_puts(&self, msg: &str) {
    log::debug!(target: "iotnode::engine", "{}", msg);
  }

  fn tx(&mut self, dgram: Addrd<&[u8]>) -> bool {
    let addr = dgram.addr();
    let len = dgram.data().len();

    match nb::block!(self.socket.send(dgram)) {
      | Ok(()) => {
        log::trace!("sent {} bytes to {}", len, addr);
        true
      },
      | Err(e) => {
        log::error!("failed to send {} bytes to {}: {:?}", len, addr, e);
        false
      },
    }
  }
}
