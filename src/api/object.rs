/*!

The `Object` is the only kind of heap value. Objects come in two variants: an
integer, and an ordered pair of references to other objects. A pair's edges
are fixed at construction and never mutated afterwards, but since an edge may
point at any already-allocated object — including, transitively, the pair's
own ancestors once a test or an embedding wires one up — the heap must be
treated as a general directed graph, not a tree.

Objects are owned by the registry and addressed through `ObjRef` handles. The
object itself carries no bookkeeping link; the one piece of collector state
that lives on it is the `Reached` flag, which is set transiently during a
mark pass and is false whenever no collection is in progress.

*/

use std::fmt::{Display, Formatter};

use enumflags2::{bitflags, BitFlags};

/// A non-owning reference to an object held in a `Vm`'s registry.
///
/// The handle pairs a slot index with the slot's generation at the time the
/// object was registered. Vacating a slot bumps its generation, so a handle
/// that outlives its object resolves to `None` instead of aliasing whatever
/// occupies the slot next.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObjRef {
  pub(crate) index     : u32,
  pub(crate) generation: u32,
}

impl Display for ObjRef {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "@{}", self.index)
  }
}

/// Variant discriminator, payload stripped.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ObjectKind {
  Integer,
  Pair,
}

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum ObjectFlag {
  /// Proven reachable by the in-progress mark pass
  Reached,
}

pub type ObjectFlags = BitFlags<ObjectFlag, u8>;

pub enum ObjectPayload {
  Integer(i64),
  Pair { first: ObjRef, second: ObjRef },
}

pub struct Object {
  pub(crate) payload: ObjectPayload,
  pub(crate) flags  : ObjectFlags,
}

impl Object {
  // region Constructors

  pub(crate) fn integer(value: i64) -> Object {
    Object {
      payload: ObjectPayload::Integer(value),
      flags  : ObjectFlags::empty(),
    }
  }

  pub(crate) fn pair(first: ObjRef, second: ObjRef) -> Object {
    Object {
      payload: ObjectPayload::Pair { first, second },
      flags  : ObjectFlags::empty(),
    }
  }

  // endregion Constructors

  // region Accessors

  #[inline(always)]
  pub fn kind(&self) -> ObjectKind {
    match self.payload {
      ObjectPayload::Integer(_)  => ObjectKind::Integer,
      ObjectPayload::Pair { .. } => ObjectKind::Pair,
    }
  }

  #[inline(always)]
  pub fn as_integer(&self) -> Option<i64> {
    match self.payload {
      ObjectPayload::Integer(value) => Some(value),
      ObjectPayload::Pair { .. }    => None,
    }
  }

  #[inline(always)]
  pub fn as_pair(&self) -> Option<(ObjRef, ObjRef)> {
    match self.payload {
      ObjectPayload::Pair { first, second } => Some((first, second)),
      ObjectPayload::Integer(_)             => None,
    }
  }

  #[inline(always)]
  pub fn first(&self) -> Option<ObjRef> {
    self.as_pair().map(|(first, _)| first)
  }

  #[inline(always)]
  pub fn second(&self) -> Option<ObjRef> {
    self.as_pair().map(|(_, second)| second)
  }

  // endregion

  #[inline(always)]
  pub fn is_reached(&self) -> bool {
    self.flags.contains(ObjectFlag::Reached)
  }
}

impl Display for Object {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.payload {
      ObjectPayload::Integer(value)         => write!(f, "int<{}>", value),
      ObjectPayload::Pair { first, second } => write!(f, "pair<{}, {}>", first, second),
    }
  }
}
