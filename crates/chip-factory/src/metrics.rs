//! Chip counters, recorded through the `metrics` facade.
//!
//! Nothing is exported unless the host installs a recorder.

use chip_common::OutputFormat;
use metrics::counter;

/// Pixel requests sent to the remote service.
pub const CHIP_REQUESTS_TOTAL: &str = "chipper_chip_requests_total";

/// Chip files written, labelled by output format.
pub const CHIPS_WRITTEN_TOTAL: &str = "chipper_chips_written_total";

pub fn record_chip_request() {
    counter!(CHIP_REQUESTS_TOTAL).increment(1);
}

pub fn record_chip_written(format: OutputFormat) {
    counter!(CHIPS_WRITTEN_TOTAL, "format" => format.as_str()).increment(1);
}
