/*!

A minimal mutator session: push two integers, fold them into a pair, drop
the pair from the roots, and force a collection that reclaims all three
objects. Run with `cargo run -p mutator_example`.

*/

use pairgc::{Vm, VmError};
use pairgc::log::{info, set_global_logging_threshold};

fn main() -> Result<(), VmError> {
  set_global_logging_threshold(3);

  // A deliberately tiny threshold so the collector is exercised early.
  let mut vm = Vm::with_settings(256, 1);

  info!("pushing two integers");
  vm.allocate_integer(0)?;
  vm.allocate_integer(1)?;

  info!("combining them into a pair");
  let pair = vm.allocate_pair()?;
  info!(
    0,
    "{} roots, {} live objects, next collection at {}",
    vm.root_count(),
    vm.live_count(),
    vm.threshold()
  );

  info!("popping the pair; nothing is rooted anymore");
  let popped = vm.pop()?;
  assert_eq!(popped, pair);

  let reclaimed = vm.force_collect();
  info!(0, "forced collection reclaimed {} objects, {} live", reclaimed, vm.live_count());

  let stats = vm.stats();
  info!(
    0,
    "session totals: {} allocated, {} reclaimed over {} collections",
    stats.objects_allocated, stats.objects_reclaimed, stats.collections
  );

  Ok(())
}
