//! Observability for the mapping layer
//!
//! - Structured logging (one JSON object per line)
//! - Counters for everything the mapping layer skips silently
//! - Begin/complete tracing of multi-step operations
//!
//! Silent drops (unconvertible fields, undecodable records, unresolvable
//! references) never surface as errors; they surface here.
//!
//! # Usage
//!
//! ```ignore
//! use recordkit::observability::{Event, Logger, MappingMetrics};
//!
//! Logger::warn(Event::RecordDropped, &[("record_type", "Task")]);
//!
//! let metrics = MappingMetrics::new();
//! metrics.increment_records_dropped();
//! assert_eq!(metrics.snapshot().records_dropped, 1);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MappingMetrics, MetricsSnapshot};
pub use scope::ObservationScope;
