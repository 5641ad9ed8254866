/*!

The mark and sweep phases.

Marking floods the `Reached` flag outward from the root stack using an
explicit work list rather than recursion, so traversal depth is bounded by
the live heap size instead of the host call stack. A reference whose object
is already reached terminates that branch of the flood; that single check is
what makes cyclic graphs safe, since every object is marked at most once.

Sweeping is delegated to the registry, which reclaims every unreached slot
and lowers the flag on survivors in one linear pass.

*/

use crate::{
  api::object::{ObjRef, ObjectFlag, ObjectPayload},
  core::{registry::Registry, root_stack::RootStack},
};
use crate::log::warning;

/// Floods the `Reached` flag through everything transitively referenced by
/// `root`.
pub(crate) fn mark(registry: &mut Registry, root: ObjRef) {
  let mut pending: Vec<ObjRef> = vec![root];

  while let Some(next) = pending.pop() {
    let object = match registry.get_mut(next) {
      Some(object) => object,
      None => {
        // A live object can only reference live objects, so a dangling edge
        // means the graph was corrupted before we got here.
        warning!(0, "dangling reference {} encountered during mark", next);
        continue;
      }
    };

    if object.flags.contains(ObjectFlag::Reached) {
      continue;
    }
    object.flags.insert(ObjectFlag::Reached);

    if let ObjectPayload::Pair { first, second } = object.payload {
      pending.push(first);
      pending.push(second);
    }
  }
}

/// Mark phase: floods from every entry currently on the root stack.
pub(crate) fn mark_roots(roots: &RootStack, registry: &mut Registry) {
  for root in roots.iter() {
    mark(registry, *root);
  }
}

/// Runs a full collection over the given stack and registry and returns the
/// number of objects reclaimed. Threshold bookkeeping is the caller's job.
pub(crate) fn collect(roots: &RootStack, registry: &mut Registry) -> usize {
  #[cfg(feature = "gc_debug")]
  registry.check_flags_clear();

  mark_roots(roots, registry);
  registry.sweep_unreached()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::object::{Object, ObjectPayload};
  use crate::core::{registry::Registry, root_stack::RootStack};

  /// Rewires a pair's edges in place. Pairs are immutable through the public
  /// surface; tests use this to close reference cycles.
  fn rewire(registry: &mut Registry, pair: ObjRef, first: ObjRef, second: ObjRef) {
    registry.get_mut(pair).unwrap().payload = ObjectPayload::Pair { first, second };
  }

  #[test]
  fn mark_terminates_on_self_cycle() {
    let mut registry = Registry::new();
    let a = registry.register(Object::integer(1));
    let p = registry.register(Object::pair(a, a));
    rewire(&mut registry, p, a, p); // p.second -> p

    mark(&mut registry, p);

    assert!(registry.get(p).unwrap().is_reached());
    assert!(registry.get(a).unwrap().is_reached());
  }

  #[test]
  fn rooted_cycle_survives_collection() {
    let mut registry = Registry::new();
    let mut stack = RootStack::with_capacity(8);

    let a = registry.register(Object::integer(1));
    let b = registry.register(Object::integer(2));
    let p = registry.register(Object::pair(a, b));
    let q = registry.register(Object::pair(p, p));
    rewire(&mut registry, p, a, q); // p <-> q, mutually referential

    stack.push(p).unwrap();
    assert_eq!(collect(&stack, &mut registry), 1); // only b is unreachable now
    assert_eq!(registry.live_count(), 3);

    // Flags are back at rest on every survivor.
    for r in [a, p, q] {
      assert!(!registry.get(r).unwrap().is_reached());
    }
  }

  #[test]
  fn unrooted_cycle_is_reclaimed() {
    let mut registry = Registry::new();
    let stack = RootStack::with_capacity(8);

    let a = registry.register(Object::integer(1));
    let p = registry.register(Object::pair(a, a));
    let q = registry.register(Object::pair(p, p));
    rewire(&mut registry, p, q, q);

    // Nothing is rooted, so the whole tangle goes.
    assert_eq!(collect(&stack, &mut registry), 3);
    assert_eq!(registry.live_count(), 0);
  }

  #[test]
  fn shared_structure_is_marked_once_and_kept() {
    let mut registry = Registry::new();
    let mut stack = RootStack::with_capacity(8);

    let shared = registry.register(Object::integer(9));
    let left   = registry.register(Object::pair(shared, shared));
    let right  = registry.register(Object::pair(shared, left));

    stack.push(left).unwrap();
    stack.push(right).unwrap();

    assert_eq!(collect(&stack, &mut registry), 0);
    assert_eq!(registry.live_count(), 3);
  }

  #[test]
  fn deep_chain_does_not_recurse() {
    // A list long enough to blow a call stack if marking recursed.
    let mut registry = Registry::new();
    let mut stack = RootStack::with_capacity(8);

    let nil = registry.register(Object::integer(0));
    let mut head = nil;
    for value in 0..100_000 {
      let cell = registry.register(Object::integer(value));
      head = registry.register(Object::pair(cell, head));
    }

    stack.push(head).unwrap();
    assert_eq!(collect(&stack, &mut registry), 0);
    assert_eq!(registry.live_count(), 200_001);
  }
}
