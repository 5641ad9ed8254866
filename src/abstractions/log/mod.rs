/*!

Logging with a global verbosity threshold layered over the `tracing` crate.

Every message is logged *at* a numeric threshold and is emitted only if that
threshold is at most the global one; higher global values mean more verbose
output. A message logged without a threshold defaults to 0 and is always
emitted. The level (`error!` … `trace!`) describes what kind of message it
is; the threshold describes how verbose the logger must be before it shows
up.

```
use pairgc::log::*;

set_global_logging_threshold(1);

error!("always shown, threshold defaults to 0");
info!(1, "shown: 1 <= global threshold 1");
debug!(2, "not shown: 2 > global threshold 1");
```

The subscriber installs itself lazily on first use; no explicit
initialization is required. The global threshold is an atomic, so reading
and writing it is safe from anywhere, though this crate itself only ever
logs from its single mutator thread.

*/
mod filter;
mod macros;

use std::sync::{
    atomic::{AtomicU8, Ordering},
    LazyLock
  };

use tracing_subscriber::{
  fmt,
  layer::SubscriberExt,
  Registry
};

use filter::{FieldFormatter, ThresholdFilter};
pub use macros::*;

/// Used for implicit initialization.
static INIT_LOGGER: LazyLock<()> = LazyLock::new(|| {
  let subscriber = Registry::default()
      .with(ThresholdFilter)
      .with(
        fmt::layer()
            .fmt_fields(FieldFormatter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stdout),
      );

  tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
});

/// This does not need to be called directly. Initializes the logging system.
pub fn init_logger() {
  LazyLock::force(&INIT_LOGGER);
}

static GLOBAL_LOGGING_THRESHOLD: AtomicU8 = AtomicU8::new(3); // Default threshold

/// Sets the global verbosity threshold.
pub fn set_global_logging_threshold(new_threshold: u8) {
  GLOBAL_LOGGING_THRESHOLD.store(new_threshold, Ordering::SeqCst);
}

/// Retrieves the global verbosity threshold.
pub fn get_global_logging_threshold() -> u8 {
  GLOBAL_LOGGING_THRESHOLD.load(Ordering::SeqCst)
}
