/*!

A stop-the-world mark-and-sweep collector for a tiny two-variant object heap.

Heap values are either integers or ordered pairs of references; pairs may
reference pairs, so the heap forms a general directed graph, cycles included.
A [`Vm`] owns the whole runtime: a bounded root stack (the entry point for
reachability), an object registry that owns every allocation, and the
collector that runs over both whenever the live population reaches an
adaptive threshold.

```
use pairgc::Vm;

let mut vm = Vm::with_settings(256, 8);
vm.allocate_integer(1).unwrap();
vm.allocate_integer(2).unwrap();
vm.allocate_pair().unwrap();
assert_eq!(vm.live_count(), 3);

// Drop the pair from the roots; all three objects become unreachable.
vm.pop().unwrap();
assert_eq!(vm.force_collect(), 3);
assert_eq!(vm.live_count(), 0);
```

*/

pub mod abstractions;
pub mod api;
mod core;

// We re-export abstractions that are meant to be used publicly.
pub use abstractions::log;

pub use api::{
  GcStats,
  ObjRef,
  Object,
  ObjectKind,
  Vm,
  VmError,
};
