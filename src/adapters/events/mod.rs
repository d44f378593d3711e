//! Event publisher adapters.
//!
//! - `InMemoryEventBus` - records events for assertions
//! - `TracingEventPublisher` - emits events to the structured log

mod in_memory;
mod tracing_publisher;

pub use in_memory::InMemoryEventBus;
pub use tracing_publisher::TracingEventPublisher;
