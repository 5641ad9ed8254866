/*!

The registry exclusively owns every allocated object. It is a slot arena: a
vector of slots, each either occupied by an object or vacant and chained into
an intrusive free list by slot index. Vacant slots are reused before the
vector grows, so the arena stays compact across collection cycles.

Each slot carries a generation that is bumped whenever the slot is vacated.
A handle minted for one occupant therefore never resolves to a later
occupant of the same slot; it just stops resolving.

The sweep phase is a single linear pass over the slots, which is the whole
point of keeping every allocation in one owning container: the collector
never has to chase object-to-object links to find garbage.

*/

use crate::api::object::{ObjRef, Object, ObjectFlag};

/// Free-list terminator.
const NO_SLOT: u32 = u32::MAX;

enum SlotEntry {
  Occupied(Object),
  Vacant { next_free: u32 },
}

struct Slot {
  generation: u32,
  entry     : SlotEntry,
}

pub(crate) struct Registry {
  slots    : Vec<Slot>,
  free_head: u32,
  live     : usize,
}

impl Registry {
  pub fn new() -> Registry {
    Registry {
      slots    : Vec::new(),
      free_head: NO_SLOT,
      live     : 0,
    }
  }

  /// Takes ownership of `object` and returns the handle it is now reachable
  /// under. Reuses a vacant slot when one exists.
  pub fn register(&mut self, object: Object) -> ObjRef {
    self.live += 1;

    if self.free_head != NO_SLOT {
      let index = self.free_head;
      let slot  = &mut self.slots[index as usize];

      self.free_head = match slot.entry {
        SlotEntry::Vacant { next_free } => next_free,
        SlotEntry::Occupied(_)          => unreachable!("occupied slot on the free list"),
      };
      slot.entry = SlotEntry::Occupied(object);

      return ObjRef { index, generation: slot.generation };
    }

    let index = self.slots.len() as u32;
    self.slots.push(Slot {
      generation: 0,
      entry     : SlotEntry::Occupied(object),
    });

    ObjRef { index, generation: 0 }
  }

  /// Resolves a handle. Stale generations and out-of-range indices yield
  /// `None`.
  pub fn get(&self, r: ObjRef) -> Option<&Object> {
    match self.slots.get(r.index as usize) {
      Some(Slot { generation, entry: SlotEntry::Occupied(object) })
        if *generation == r.generation => Some(object),
      _ => None,
    }
  }

  pub fn get_mut(&mut self, r: ObjRef) -> Option<&mut Object> {
    match self.slots.get_mut(r.index as usize) {
      Some(Slot { generation, entry: SlotEntry::Occupied(object) })
        if *generation == r.generation => Some(object),
      _ => None,
    }
  }

  /// Sweep phase: reclaims every object whose `Reached` flag is down and
  /// clears the flag on every survivor, restoring the at-rest state for the
  /// next cycle. Returns the number reclaimed.
  pub fn sweep_unreached(&mut self) -> usize {
    let mut reclaimed = 0;

    for (index, slot) in self.slots.iter_mut().enumerate() {
      if let SlotEntry::Occupied(object) = &mut slot.entry {
        if object.flags.contains(ObjectFlag::Reached) {
          object.flags.remove(ObjectFlag::Reached);
        } else {
          slot.generation = slot.generation.wrapping_add(1);
          slot.entry      = SlotEntry::Vacant { next_free: self.free_head };
          self.free_head  = index as u32;
          self.live      -= 1;
          reclaimed      += 1;
        }
      }
    }

    reclaimed
  }

  /// Vacates every occupied slot unconditionally. Generations are bumped as
  /// in a sweep, so outstanding handles stay stale. Returns the number
  /// released.
  pub fn release_all(&mut self) -> usize {
    let mut released = 0;

    for (index, slot) in self.slots.iter_mut().enumerate() {
      if let SlotEntry::Occupied(_) = slot.entry {
        slot.generation = slot.generation.wrapping_add(1);
        slot.entry      = SlotEntry::Vacant { next_free: self.free_head };
        self.free_head  = index as u32;
        released       += 1;
      }
    }

    self.live = 0;
    released
  }

  #[inline(always)]
  pub fn live_count(&self) -> usize {
    self.live
  }

  #[cfg(feature = "gc_debug")]
  pub fn slot_count(&self) -> usize {
    self.slots.len()
  }

  /// Verify that no object is in a reached state. Outside a collection this
  /// is an invariant; a set flag here means a mark pass leaked state.
  #[cfg(feature = "gc_debug")]
  pub fn check_flags_clear(&self) {
    for (index, slot) in self.slots.iter().enumerate() {
      if let SlotEntry::Occupied(object) = &slot.entry {
        if object.flags.contains(ObjectFlag::Reached) {
          eprintln!("check_flags_clear() : REACHED object at rest! slot = {}", index);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::object::{Object, ObjectFlag};

  #[test]
  fn register_then_get() {
    let mut registry = Registry::new();
    let r = registry.register(Object::integer(7));

    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.get(r).unwrap().as_integer(), Some(7));
  }

  #[test]
  fn sweep_reclaims_only_unreached() {
    let mut registry = Registry::new();
    let kept    = registry.register(Object::integer(1));
    let dropped = registry.register(Object::integer(2));

    registry.get_mut(kept).unwrap().flags.insert(ObjectFlag::Reached);

    assert_eq!(registry.sweep_unreached(), 1);
    assert_eq!(registry.live_count(), 1);
    assert!(registry.get(dropped).is_none());

    // Survivor is retained with its flag lowered again.
    let survivor = registry.get(kept).unwrap();
    assert_eq!(survivor.as_integer(), Some(1));
    assert!(!survivor.is_reached());
  }

  #[test]
  fn stale_handle_never_aliases_a_reused_slot() {
    let mut registry = Registry::new();
    let old = registry.register(Object::integer(1));
    registry.sweep_unreached();
    assert!(registry.get(old).is_none());

    // The vacated slot is reused, under a new generation.
    let new = registry.register(Object::integer(2));
    assert_eq!(new.index, old.index);
    assert_ne!(new.generation, old.generation);
    assert!(registry.get(old).is_none());
    assert_eq!(registry.get(new).unwrap().as_integer(), Some(2));
  }

  #[test]
  fn release_all_vacates_everything() {
    let mut registry = Registry::new();
    let a = registry.register(Object::integer(1));
    let b = registry.register(Object::integer(2));

    assert_eq!(registry.release_all(), 2);
    assert_eq!(registry.live_count(), 0);
    assert!(registry.get(a).is_none());
    assert!(registry.get(b).is_none());
  }

  #[test]
  fn freed_slots_are_reused_before_growth() {
    let mut registry = Registry::new();
    for value in 0..4 {
      registry.register(Object::integer(value));
    }
    registry.sweep_unreached(); // nothing reached, all four vacated

    for value in 0..4 {
      let r = registry.register(Object::integer(value));
      assert!(r.index < 4);
    }
    assert_eq!(registry.live_count(), 4);
  }
}
