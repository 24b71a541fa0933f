use std::time::Duration;

const KIB: f32 = 1024.0;
const MIB: f32 = KIB * 1024.0;

/// Render a human-friendly transfer speed string.
#[must_use]
pub fn format_speed(bytes_per_sec: f32) -> String {
    if bytes_per_sec < KIB {
        format!("{bytes_per_sec:.0} B/s")
    } else if bytes_per_sec < MIB {
        format!("{:.1} KB/s", bytes_per_sec / KIB)
    } else {
        format!("{:.1} MB/s", bytes_per_sec / MIB)
    }
}

/// Render a byte count as B, KB or MB.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    let value = bytes as f32;
    if value < KIB {
        format!("{bytes} B")
    } else if value < MIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / MIB)
    }
}

/// Average speed of a finished transfer.
#[must_use]
pub fn average_speed(bytes: u64, elapsed: Duration) -> f32 {
    let secs = elapsed.as_secs_f32();
    if secs > 0.0 { bytes as f32 / secs } else { 0.0 }
}
