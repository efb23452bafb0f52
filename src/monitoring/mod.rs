/*!
 * Monitor Observability
 * Listeners, counters and tracing setup
 */

mod listener;
mod stats;
mod tracer;

pub use listener::{EventLog, MonitorEvent, MonitorListener, TracingListener};
pub use stats::{MonitorStats, MonitorStatsSnapshot};
pub use tracer::{
    generate_trace_id, init_tracing, span_operation, try_init_tracing, OperationSpan,
};
