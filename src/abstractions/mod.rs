/*!

Facilities that abstract over a backing implementation chosen from the
ecosystem. Currently that is just the logging subsystem, which fronts the
`tracing` crate so that the rest of the library can narrate what it is doing
without committing to a subscriber.

*/

pub mod log;
