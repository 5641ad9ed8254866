/*!

The `Vm` is the runtime context: it owns the root stack, the object
registry, and the collection threshold, and exposes the whole public
operation set. One `Vm`, one logical thread of control — collection is
stop-the-world relative to the single caller, so nothing here needs
synchronization.

Allocation is the only trigger point for collection. Immediately before an
object is created, the live count is compared against the threshold; on a
hit, a full mark/sweep runs and the threshold is reset to twice the
surviving population. The collector therefore runs less often as the live
working set grows, trading peak memory for fewer pauses.

*/

use crate::{
  api::{
    error::VmError,
    object::{ObjRef, Object},
  },
  core::{collector, registry::Registry, root_stack::RootStack},
};
use crate::log::debug;

/// Default root stack capacity.
pub const DEFAULT_STACK_CAPACITY: usize = 256;
/// Default live-object count at which the first collection triggers.
pub const DEFAULT_INITIAL_THRESHOLD: usize = 8;

/// Running totals over the lifetime of a `Vm`. Plain counters; the runtime
/// is single-threaded.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct GcStats {
  /// Collections run, triggered or forced.
  pub collections      : u64,
  /// Objects ever created by the allocation path.
  pub objects_allocated: u64,
  /// Objects reclaimed by sweeps.
  pub objects_reclaimed: u64,
}

pub struct Vm {
  stack    : RootStack,
  registry : Registry,
  threshold: usize,
  stats    : GcStats,
}

impl Vm {
  // region Constructors

  pub fn new() -> Vm {
    Vm::with_settings(DEFAULT_STACK_CAPACITY, DEFAULT_INITIAL_THRESHOLD)
  }

  /// Creates a context with an explicit root stack capacity and initial
  /// collection threshold. The threshold should be positive: zero makes a
  /// collection run before the first object exists, which is pointless but
  /// harmless.
  pub fn with_settings(stack_capacity: usize, initial_threshold: usize) -> Vm {
    Vm {
      stack    : RootStack::with_capacity(stack_capacity),
      registry : Registry::new(),
      threshold: initial_threshold,
      stats    : GcStats::default(),
    }
  }

  // endregion Constructors

  // region Allocation path

  /// Allocates an integer object, roots it, and returns its handle.
  ///
  /// The stack slot is checked before anything is created, so a full stack
  /// fails with `StackOverflow` and leaves the heap untouched.
  pub fn allocate_integer(&mut self, value: i64) -> Result<ObjRef, VmError> {
    if self.stack.is_full() {
      return Err(VmError::StackOverflow);
    }

    self.collect_if_due();

    let r = self.register(Object::integer(value));
    self.stack.push(r)?; // cannot fail: capacity was checked above
    Ok(r)
  }

  /// Pops two roots, allocates a pair referencing them, roots it, and
  /// returns its handle. The reference pushed last becomes `second`; the one
  /// under it becomes `first`. That order decides which operand lands on
  /// which edge and is part of the contract.
  ///
  /// Both operands are required up front, so a short stack fails with
  /// `StackUnderflow` before anything is popped or created.
  pub fn allocate_pair(&mut self) -> Result<ObjRef, VmError> {
    if self.stack.len() < 2 {
      return Err(VmError::StackUnderflow);
    }

    // Collect before the operands leave the stack; they are still rooted
    // here and must survive.
    self.collect_if_due();

    let second = self.stack.pop()?;
    let first  = self.stack.pop()?;

    let r = self.register(Object::pair(first, second));
    self.stack.push(r)?; // cannot fail: two pops just freed a slot
    Ok(r)
  }

  // endregion Allocation path

  // region Stack access

  /// Roots an existing object directly.
  pub fn push(&mut self, root: ObjRef) -> Result<(), VmError> {
    self.stack.push(root)
  }

  /// Unroots and returns the most recently pushed reference.
  pub fn pop(&mut self) -> Result<ObjRef, VmError> {
    self.stack.pop()
  }

  // endregion Stack access

  // region Collection

  /// Runs a collection unconditionally, bypassing the trigger check.
  /// Returns the number of objects reclaimed.
  pub fn force_collect(&mut self) -> usize {
    self.collect()
  }

  /// Unroots everything and releases every registered object, reclaimed or
  /// not. Returns the number released. The `Vm` is reusable afterwards.
  pub fn release_all(&mut self) -> usize {
    self.stack.clear();
    self.registry.release_all()
  }

  fn collect_if_due(&mut self) {
    // Equality, not `>=`: the live count moves by exactly one between
    // trigger checks, so the threshold can never be stepped over. Anything
    // that allocates in larger increments must switch this to `>=`.
    if self.registry.live_count() == self.threshold {
      self.collect();
    }
  }

  fn collect(&mut self) -> usize {
    let before    = self.registry.live_count();
    let reclaimed = collector::collect(&self.stack, &mut self.registry);
    let live      = self.registry.live_count();

    self.threshold = 2 * live;
    self.stats.collections       += 1;
    self.stats.objects_reclaimed += reclaimed as u64;

    debug!(
      1,
      "collection {}: {} of {} objects reclaimed, {} live, next threshold {}",
      self.stats.collections, reclaimed, before, live, self.threshold
    );

    reclaimed
  }

  // endregion Collection

  // region Observers

  /// Resolves a handle to the object it names, or `None` if the object has
  /// been reclaimed.
  pub fn get(&self, r: ObjRef) -> Option<&Object> {
    self.registry.get(r)
  }

  #[inline(always)]
  pub fn live_count(&self) -> usize {
    self.registry.live_count()
  }

  #[inline(always)]
  pub fn root_count(&self) -> usize {
    self.stack.len()
  }

  #[inline(always)]
  pub fn stack_capacity(&self) -> usize {
    self.stack.capacity()
  }

  /// The live-object count at which the next allocation triggers a
  /// collection.
  #[inline(always)]
  pub fn threshold(&self) -> usize {
    self.threshold
  }

  #[inline(always)]
  pub fn stats(&self) -> &GcStats {
    &self.stats
  }

  // endregion Observers

  fn register(&mut self, object: Object) -> ObjRef {
    let r = self.registry.register(object);
    self.stats.objects_allocated += 1;
    r
  }

  /// Prints the state of the context.
  #[cfg(feature = "gc_debug")]
  pub fn dump_memory_variables(&self) {
    eprintln!("╭─────────────────────────────────────────────╮");
    eprintln!("│{:<32} {:>12}│", "Variable", "Value");
    eprintln!("├─────────────────────────────────────────────┤");
    eprintln!("│{:<32} {:>12}│", "live_count", self.registry.live_count());
    eprintln!("│{:<32} {:>12}│", "root_count", self.stack.len());
    eprintln!("│{:<32} {:>12}│", "stack_capacity", self.stack.capacity());
    eprintln!("│{:<32} {:>12}│", "threshold", self.threshold);
    eprintln!("│{:<32} {:>12}│", "slot_count", self.registry.slot_count());
    eprintln!("│{:<32} {:>12}│", "collections", self.stats.collections);
    eprintln!("│{:<32} {:>12}│", "objects_allocated", self.stats.objects_allocated);
    eprintln!("│{:<32} {:>12}│", "objects_reclaimed", self.stats.objects_reclaimed);
    eprintln!("╰─────────────────────────────────────────────╯");
  }
}

impl Default for Vm {
  fn default() -> Self {
    Vm::new()
  }
}
