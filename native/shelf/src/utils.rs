use humansize::{DECIMAL, format_size};
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

/// Formats an install count the way store listings do: `1.2M+`, `12K+`, `940`.
pub fn format_downloads(downloads: u64) -> String {
    match downloads {
        n if n >= 1_000_000 => format!("{:.1}M+", n as f64 / 1_000_000.0),
        n if n >= 1_000 => format!("{}K+", n / 1_000),
        n => n.to_string(),
    }
}

pub const NO_DATA_SAFETY_MESSAGE: &str =
    "The developer has not provided any data safety information.";

/// Bulleted data safety entries, or a notice when the developer gave none.
pub fn data_safety_lines(entries: &[String]) -> Vec<String> {
    if entries.is_empty() {
        return vec![NO_DATA_SAFETY_MESSAGE.to_string()];
    }
    entries.iter().map(|entry| format!("- {entry}")).collect()
}

/// File sizes are carried in megabytes.
pub fn format_file_size(megabytes: f64) -> String {
    if !megabytes.is_finite() || megabytes <= 0.0 {
        return "Unknown".to_string();
    }
    format_size((megabytes * 1_000_000.0).round() as u64, DECIMAL)
}

/// Share of ratings per star (1..=5), in percent. All zero when there are no ratings.
pub fn histogram_shares(histogram: &[u64; 5]) -> [f32; 5] {
    let total: f64 = histogram.iter().map(|&count| count as f64).sum();
    if total == 0.0 {
        return [0.0; 5];
    }
    histogram.map(|count| (count as f64 * 100.0 / total) as f32)
}

/// Renders an update timestamp as `May 14, 2024`.
///
/// Accepts RFC 3339 strings and unix timestamps in seconds or milliseconds.
/// Anything else is returned unchanged.
pub fn format_updated_at(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "Unknown".to_string();
    }

    let parsed = match raw.parse::<i64>() {
        Ok(ts) if ts.abs() >= 100_000_000_000 => {
            OffsetDateTime::from_unix_timestamp_nanos(ts as i128 * 1_000_000).ok()
        }
        Ok(ts) => OffsetDateTime::from_unix_timestamp(ts).ok(),
        Err(_) => OffsetDateTime::parse(raw, &Rfc3339).ok(),
    };

    parsed
        .and_then(|dt| {
            dt.format(format_description!("[month repr:short] [day padding:none], [year]")).ok()
        })
        .unwrap_or_else(|| raw.to_string())
}
