use chrono::{DateTime, FixedOffset, Local};

/// Wall clock in the viewer's zone. On wasm `Local` reads the browser's `Date`.
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}
