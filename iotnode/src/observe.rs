use core::fmt;

use heapless::mpmc::MpMcQueue;
use tinyvec::ArrayVec;

use crate::resource::ResourceId;
use crate::Error;

/// Default capacity of a [`NotifyQueue`]
pub const DEFAULT_CAPACITY: usize = 8;

/// Most distinct resources [`NotifyQueue::drain_coalesced`] tracks per drain
pub const MAX_COALESCED: usize = 16;

/// # Notify queue
/// Bounded, lock-free handoff of "please notify observers of this
/// resource" from any thread to the thread that owns the engine.
///
/// `N` must be a power of two no larger than 128.
///
/// ```
/// use iotnode::observe::NotifyQueue;
/// use iotnode::resource::ResourceId;
///
/// static QUEUE: NotifyQueue = NotifyQueue::new();
///
/// let notifier = QUEUE.notifier();
/// std::thread::spawn(move || notifier.notify(ResourceId(1)).unwrap()).join()
///                                                                    .unwrap();
///
/// assert_eq!(QUEUE.drain().collect::<Vec<_>>(), vec![ResourceId(1)]);
/// ```
pub struct NotifyQueue<const N: usize = DEFAULT_CAPACITY>(MpMcQueue<ResourceId, N>);

impl<const N: usize> NotifyQueue<N> {
  /// An empty queue
  pub const fn new() -> Self {
    Self(MpMcQueue::new())
  }

  /// Producer handle
  pub fn notifier(&self) -> Notifier<'_, N> {
    Notifier(self)
  }

  /// Take every pending request, oldest first
  pub fn drain(&self) -> impl Iterator<Item = ResourceId> + '_ {
    core::iter::from_fn(move || self.0.dequeue())
  }

  /// Take every pending request, dropping repeats of a resource
  /// already seen in this drain.
  ///
  /// First-request order is kept.
  pub fn drain_coalesced(&self) -> ArrayVec<[ResourceId; MAX_COALESCED]> {
    let mut seen = ArrayVec::<[ResourceId; MAX_COALESCED]>::new();

    self.drain().for_each(|id| {
                  if seen.contains(&id) {
                    log::trace!("coalesced notify for {}", id);
                  } else if seen.len() < MAX_COALESCED {
                    seen.push(id);
                  } else {
                    log::warn!("too many distinct notify requests, dropping {}", id);
                  }
                });

    seen
  }
}

impl<const N: usize> Default for NotifyQueue<N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<const N: usize> fmt::Debug for NotifyQueue<N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NotifyQueue").field("capacity", &N).finish()
  }
}

/// Producer side of a [`NotifyQueue`]; cheap to copy into any thread
/// that can borrow the queue (e.g. a `static` queue).
#[derive(Clone, Copy)]
pub struct Notifier<'q, const N: usize = DEFAULT_CAPACITY>(&'q NotifyQueue<N>);

impl<'q, const N: usize> Notifier<'q, N> {
  /// Request a notification for the resource `id`.
  ///
  /// Fire-and-forget: when the queue is full the request is dropped,
  /// logged, and [`Error::QueueFull`] returned.
  pub fn notify(&self, id: ResourceId) -> Result<(), Error> {
    self.0 .0.enqueue(id).map_err(|id| {
                           log::warn!("notify queue full, dropping request for {}", id);
                           Error::QueueFull
                         })
  }
}

impl<'q, const N: usize> fmt::Debug for Notifier<'q, N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Notifier").field(self.0).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn full_queue_drops() {
    let q = NotifyQueue::<2>::new();
    let n = q.notifier();

    assert_eq!(n.notify(ResourceId(0)), Ok(()));
    assert_eq!(n.notify(ResourceId(1)), Ok(()));
    assert_eq!(n.notify(ResourceId(2)), Err(Error::QueueFull));
    assert_eq!(q.drain().collect::<Vec<_>>(),
               vec![ResourceId(0), ResourceId(1)]);
    assert_eq!(q.drain().count(), 0);
  }

  #[test]
  fn coalesces_in_first_request_order() {
    let q = NotifyQueue::<8>::new();
    let n = q.notifier();
    [3, 1, 3, 3, 2, 1].into_iter()
                      .for_each(|id| n.notify(ResourceId(id)).unwrap());

    assert_eq!(q.drain_coalesced().as_slice(),
               &[ResourceId(3), ResourceId(1), ResourceId(2)]);
  }

  #[test]
  fn many_producers() {
    static QUEUE: NotifyQueue<64> = NotifyQueue::new();

    let handles = (0..4).map(|t| {
                          let n = QUEUE.notifier();
                          std::thread::spawn(move || {
                            (0..8).for_each(|i| n.notify(ResourceId(t * 8 + i)).unwrap())
                          })
                        })
                        .collect::<Vec<_>>();
    handles.into_iter().for_each(|h| h.join().unwrap());

    let mut got = QUEUE.drain().map(|ResourceId(n)| n).collect::<Vec<_>>();
    got.sort_unstable();
    assert_eq!(got, (0..32).collect::<Vec<_>>());
  }
}
