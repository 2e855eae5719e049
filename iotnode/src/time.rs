use embedded_time::Instant;

use crate::Error;

/// A duration, in milliseconds
pub type Millis = embedded_time::duration::Milliseconds<u64>;

/// Supertrait of [`embedded_time::Clock`] pinning the
/// type of "ticks" to u64
pub trait Clock: embedded_time::Clock<T = u64> {}
impl<C: embedded_time::Clock<T = u64>> Clock for C {}

/// Milliseconds elapsed between `instant` and the clock's epoch
pub fn millis_since_epoch<C: Clock>(instant: Instant<C>) -> Result<u64, Error> {
  Millis::try_from(instant.duration_since_epoch()).map(|m| m.0)
                                                  .map_err(|_| Error::Clock)
}

/// Read the clock, in milliseconds since its epoch
pub fn now_millis<C: Clock>(clock: &C) -> Result<u64, Error> {
  clock.try_now()
       .map_err(|e| {
         log::error!("clock unavailable: {:?}", e);
         Error::Clock
       })
       .and_then(millis_since_epoch)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::ClockMock;

  #[test]
  fn reads_millis() {
    let clock = ClockMock::new();
    clock.set(1_500_000_000);
    assert_eq!(now_millis(&clock), Ok(1_500));

    clock.set(999_999);
    assert_eq!(now_millis(&clock), Ok(0));
  }
}
