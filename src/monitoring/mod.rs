/*!
 * Monitoring
 * Structured tracing for the stress harness
 */

mod tracer;

pub use tracer::{init_tracing, span_scenario, ScenarioSpan};
