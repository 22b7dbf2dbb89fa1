// =============================================================================
// Rolling-statistics engine
// =============================================================================
//
// The numeric core. `zscore` holds the batch kernel; `window` holds the
// streaming state that mirrors it tick-by-tick. Everything here is pure and
// synchronous: no I/O, no suspension points, no shared state across calls.

pub mod window;
pub mod zscore;
