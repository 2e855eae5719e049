use core::mem::size_of;

/// A concrete type that may live in a [`Slot`] whose closed variant type is `T`.
///
/// `T` is usually an enum with one variant per concrete type,
/// and the conversions here are the (un)wrapping of that enum.
/// Use [`variants!`](crate::slot::variants) to implement this for every variant at once.
pub trait Variant<T>: Sized {
  /// Wrap `self` as the closed type
  fn into_slot(self) -> T;

  /// Borrow `Self` out of the closed type, if that is what it holds
  fn from_slot(t: &T) -> Option<&Self>;

  /// Mutably borrow `Self` out of the closed type, if that is what it holds
  fn from_slot_mut(t: &mut T) -> Option<&mut Self>;
}

/// # Fixed-capacity slot
/// Storage for at most one value of the closed variant type `T`,
/// reserving `N` bytes for it.
///
/// `N` is checked against `size_of::<T>()` at build time; a slot whose
/// type does not fit fails to compile as soon as it is constructed.
///
/// Capability-typed access goes through [`Slot::get`] (the methods of `T`),
/// typed access through [`Slot::get_as`].
///
/// ```
/// use iotnode::opt::{known, Opt, OptSlot, UInt};
///
/// let mut slot = OptSlot::new();
/// assert!(slot.get().is_none());
///
/// slot.construct(UInt::new(known::ACCEPT, 50));
/// assert_eq!(slot.get().map(Opt::number), Some(known::ACCEPT));
/// assert_eq!(slot.get_as::<UInt>().map(|u| u.value), Some(50));
///
/// slot.destroy();
/// assert!(slot.get().is_none());
/// ```
///
/// ```compile_fail
/// use iotnode::slot::Slot;
///
/// let _ = Slot::<[u8; 16], 8>::new();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T, const N: usize> {
  occupant: Option<T>,
}

impl<T, const N: usize> Slot<T, N> {
  const FITS: () = assert!(size_of::<T>() <= N, "slot capacity is smaller than its variant type");

  /// An empty slot
  pub const fn new() -> Self {
    #[allow(clippy::let_unit_value)]
    let () = Self::FITS;
    Self { occupant: None }
  }

  /// A slot already holding `v`
  pub fn with<V: Variant<T>>(v: V) -> Self {
    let mut slot = Self::new();
    slot.construct(v);
    slot
  }

  /// A slot already holding the closed value `t`
  pub fn holding(t: T) -> Self {
    let mut slot = Self::new();
    slot.put(t);
    slot
  }

  /// The number of bytes reserved by this slot
  pub const fn capacity(&self) -> usize {
    N
  }

  /// Place `v` in the slot, dropping whatever lived there before.
  pub fn construct<V: Variant<T>>(&mut self, v: V) -> &mut T {
    self.destroy();
    self.occupant.insert(v.into_slot())
  }

  /// Place an already-wrapped value in the slot, dropping whatever lived there before.
  pub fn put(&mut self, t: T) -> &mut T {
    self.destroy();
    self.occupant.insert(t)
  }

  /// End the lifetime of the current occupant, if any
  pub fn destroy(&mut self) {
    self.occupant = None;
  }

  /// Move the occupant out, leaving the slot empty
  pub fn take(&mut self) -> Option<T> {
    self.occupant.take()
  }

  /// Is something living in the slot?
  pub fn is_occupied(&self) -> bool {
    self.occupant.is_some()
  }

  /// Capability access to the occupant
  pub fn get(&self) -> Option<&T> {
    self.occupant.as_ref()
  }

  /// Mutable capability access to the occupant
  pub fn get_mut(&mut self) -> Option<&mut T> {
    self.occupant.as_mut()
  }

  /// Typed access; `None` if the slot is empty or holds another variant
  pub fn get_as<V: Variant<T>>(&self) -> Option<&V> {
    self.occupant.as_ref().and_then(V::from_slot)
  }

  /// Mutable typed access
  pub fn get_as_mut<V: Variant<T>>(&mut self) -> Option<&mut V> {
    self.occupant.as_mut().and_then(V::from_slot_mut)
  }
}

impl<T, const N: usize> Default for Slot<T, N> {
  fn default() -> Self {
    Self::new()
  }
}

/// Implement [`Variant`] (and `From`) for each `Enum::Variant(Type)` pair.
///
/// ```
/// use iotnode::slot::{variants, Slot};
///
/// #[derive(Debug)]
/// pub struct Red(u8);
/// #[derive(Debug)]
/// pub struct Blue(u16);
///
/// #[derive(Debug)]
/// pub enum Color {
///   Red(Red),
///   Blue(Blue),
/// }
///
/// variants!(Color { Red(Red), Blue(Blue) });
///
/// let slot = Slot::<Color, 4>::with(Blue(7));
/// assert!(slot.get_as::<Red>().is_none());
/// assert_eq!(slot.get_as::<Blue>().map(|b| b.0), Some(7));
/// ```
#[macro_export]
macro_rules! variants {
  ($enum:ident { $($var:ident($ty:ty)),+ $(,)? }) => {
    $(
      impl $crate::slot::Variant<$enum> for $ty {
        fn into_slot(self) -> $enum {
          $enum::$var(self)
        }

        #[allow(unreachable_patterns)]
        fn from_slot(t: &$enum) -> Option<&Self> {
          match t {
            | $enum::$var(v) => Some(v),
            | _ => None,
          }
        }

        #[allow(unreachable_patterns)]
        fn from_slot_mut(t: &mut $enum) -> Option<&mut Self> {
          match t {
            | $enum::$var(v) => Some(v),
            | _ => None,
          }
        }
      }

      impl From<$ty> for $enum {
        fn from(v: $ty) -> $enum {
          $enum::$var(v)
        }
      }
    )+
  };
}

#[doc(inline)]
pub use crate::variants;
