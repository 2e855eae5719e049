use crate::time::{now_millis, Clock};

/// Where a handshake timer is in its interim/final progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerState {
  /// No timer set
  Cancelled,
  /// Neither deadline passed yet
  Running,
  /// The interim deadline passed
  PassedInterim,
  /// The final deadline passed
  PassedFinal,
}

impl From<TimerState> for i8 {
  fn from(s: TimerState) -> i8 {
    match s {
      | TimerState::Cancelled => -1,
      | TimerState::Running => 0,
      | TimerState::PassedInterim => 1,
      | TimerState::PassedFinal => 2,
    }
  }
}

/// # Timer context
/// The two-deadline timer a DTLS-style handshake uses to decide when to
/// retransmit a flight (interim) and when to give up on it (final).
///
/// Times are milliseconds on whatever clock the caller reads; deadlines
/// are only observed when [`TimerContext::tick`] is called.
///
/// ```
/// use iotnode::timer::{TimerContext, TimerState};
///
/// let mut t = TimerContext::default();
/// t.set_delay(0, 100, 400);
///
/// assert_eq!(t.tick(99), TimerState::Running);
/// assert_eq!(t.tick(100), TimerState::PassedInterim);
/// assert_eq!(t.tick(399), TimerState::PassedInterim);
/// assert_eq!(t.tick(400), TimerState::PassedFinal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerContext {
  state: TimerState,
  alarm: u64,
  remaining: u64,
}

impl Default for TimerContext {
  fn default() -> Self {
    Self { state: TimerState::Cancelled,
           alarm: 0,
           remaining: 0 }
  }
}

impl TimerContext {
  /// Arm the timer at `now`.
  ///
  /// - `final_ms == 0` cancels it
  /// - `interim_ms == 0` skips straight to [`TimerState::PassedInterim`]
  ///   with the alarm set for `final_ms`
  /// - otherwise the alarm fires after `interim_ms`, then re-arms
  ///   for the rest of `final_ms`
  pub fn set_delay(&mut self, now: u64, interim_ms: u32, final_ms: u32) {
    let (interim, fin) = (u64::from(interim_ms), u64::from(final_ms));

    *self = match (interim, fin) {
      | (_, 0) => Self::default(),
      | (0, fin) => Self { state: TimerState::PassedInterim,
                           alarm: now.saturating_add(fin),
                           remaining: 0 },
      | (interim, fin) => Self { state: TimerState::Running,
                                 alarm: now.saturating_add(interim),
                                 remaining: fin.saturating_sub(interim) },
    };
  }

  /// Fire whichever alarms are due at `now` and yield the resulting state
  pub fn tick(&mut self, now: u64) -> TimerState {
    loop {
      match self.state {
        | TimerState::Running if now >= self.alarm => {
          self.state = TimerState::PassedInterim;
          self.alarm = self.alarm.saturating_add(self.remaining);
          self.remaining = 0;
        },
        | TimerState::PassedInterim if now >= self.alarm => {
          self.state = TimerState::PassedFinal;
        },
        | state => break state,
      }
    }
  }

  /// Give up on the timer: every later tick yields [`TimerState::PassedFinal`]
  pub fn expire(&mut self) {
    *self = Self { state: TimerState::PassedFinal,
                   alarm: 0,
                   remaining: 0 };
  }

  /// The state as of the last tick
  pub fn state(&self) -> TimerState {
    self.state
  }
}

/// The timer callbacks a handshake implementation expects from its host
pub trait HandshakeTimer {
  /// See [`TimerContext::set_delay`]
  fn set_delay(&mut self, interim_ms: u32, final_ms: u32);

  /// Current [`TimerState`]
  fn get_delay(&mut self) -> TimerState;
}

/// A [`TimerContext`] read against a [`Clock`]; what a security session
/// hands its handshake.
#[derive(Debug)]
pub struct Session<C> {
  clock: C,
  timer: TimerContext,
}

impl<C: Clock> Session<C> {
  /// A session with a cancelled timer
  pub fn new(clock: C) -> Self {
    Self { clock,
           timer: TimerContext::default() }
  }

  /// The session's clock
  pub fn clock(&self) -> &C {
    &self.clock
  }
}

impl<C: Clock> HandshakeTimer for Session<C> {
  fn set_delay(&mut self, interim_ms: u32, final_ms: u32) {
    match now_millis(&self.clock) {
      | Ok(now) => self.timer.set_delay(now, interim_ms, final_ms),
      | Err(_) if final_ms == 0 => self.timer = TimerContext::default(),
      | Err(e) => {
        log::warn!("{:?} arming handshake timer; expiring it", e);
        self.timer.expire();
      },
    }
  }

  fn get_delay(&mut self) -> TimerState {
    match now_millis(&self.clock) {
      | Ok(now) => self.timer.tick(now),
      // without a clock the handshake can't wait; let it give up
      | Err(_) if self.timer.state() == TimerState::Cancelled => TimerState::Cancelled,
      | Err(_) => TimerState::PassedFinal,
    }
  }
}
