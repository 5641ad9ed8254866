/*!

The `tracing` plumbing behind the threshold scheme: a `Layer` that drops any
event whose `threshold` field exceeds the global threshold, and a field
formatter that prints the message while hiding the `threshold` bookkeeping
field itself.

*/

use std::fmt::Debug;

use tracing::{
  field::{Field, Visit},
  Event,
  Subscriber
};
use tracing_subscriber::{
  field::RecordFields,
  fmt::{
    format::Writer,
    FormatFields
  },
  layer::Context,
  registry::LookupSpan,
  Layer,
};

use super::get_global_logging_threshold;

/// Filters events against the global threshold. An event without a
/// `threshold` field is treated as threshold 0 and always passes.
pub(crate) struct ThresholdFilter;

impl<S> Layer<S> for ThresholdFilter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
  fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
    let mut visitor = ThresholdVisitor { threshold: None };
    event.record(&mut visitor);

    match visitor.threshold {
      Some(threshold) => threshold <= get_global_logging_threshold(),
      None            => true,
    }
  }
}

/// Extracts the `threshold` field from an event, the way the `tracing` crate
/// wants it done.
struct ThresholdVisitor {
  threshold: Option<u8>,
}

impl Visit for ThresholdVisitor {
  fn record_i64(&mut self, field: &Field, value: i64) {
    if field.name() == "threshold" {
      if value >= 0 && value <= u8::MAX as i64 {
        self.threshold = Some(value as u8);
      } else {
        panic!("Invalid threshold value supplied to the logger: {:?}", value);
      }
    }
  }

  fn record_u64(&mut self, field: &Field, value: u64) {
    if field.name() == "threshold" {
      if value <= u8::MAX as u64 {
        self.threshold = Some(value as u8);
      } else {
        panic!("Invalid threshold value supplied to the logger: {:?}", value);
      }
    }
  }

  fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
    if field.name() == "threshold" {
      panic!("Invalid threshold value supplied to the logger: {:?}", value);
    }
  }
}

/// Formats event fields, suppressing the `threshold` field.
pub(crate) struct FieldFormatter;

impl<'writer> FormatFields<'writer> for FieldFormatter {
  fn format_fields<R: RecordFields>(
    &self,
    writer: Writer<'writer>,
    fields: R,
  ) -> std::fmt::Result {
    let mut visitor = FieldVisitor { writer };
    fields.record(&mut visitor);
    Ok(())
  }
}

struct FieldVisitor<'writer> {
  writer: Writer<'writer>,
}

impl<'writer> Visit for FieldVisitor<'writer> {
  fn record_i64(&mut self, field: &Field, value: i64) {
    if field.name() != "threshold" {
      let _ = write!(self.writer, "{}={} ", field.name(), value);
    }
  }

  fn record_u64(&mut self, field: &Field, value: u64) {
    if field.name() != "threshold" {
      let _ = write!(self.writer, "{}={} ", field.name(), value);
    }
  }

  fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
    match field.name() {

      "message" => {
        let _ = write!(self.writer, "{:?}", value);
      }

      "threshold" => {
        // Do not print.
      }

      name => {
        let _ = write!(self.writer, "{}={:?} ", name, value);
      }

    }
  }
}
