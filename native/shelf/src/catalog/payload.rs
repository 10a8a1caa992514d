//! Mapping from the scraping backend's native JSON shape to [`AppRecord`].
//!
//! The backend forwards whatever the Play Store scraper produced, so any
//! field may be missing, `null`, or of an unexpected type. Every accessor
//! here falls back to the field's default instead of failing.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::{AppRecord, AppStatus, NO_UPDATES_SENTINEL, ReviewRecord};

/// Builds a fully populated [`AppRecord`] from a raw backend payload.
///
/// Never fails and is deterministic for identical input, including review
/// ids the backend left out.
pub fn normalize_app_payload(data: &Value) -> AppRecord {
    let id = string_field(data, "appId");
    AppRecord {
        slug: id.clone(),
        id,
        name: string_field(data, "title"),
        developer: string_field(data, "developer"),
        developer_website: string_field(data, "developerWebsite"),
        privacy_policy: string_field(data, "privacyPolicy"),
        icon: string_field(data, "icon"),
        screenshots: string_list(data.get("screenshots")),
        short_description: string_field(data, "summary"),
        full_description: string_field(data, "description"),
        whats_new: whats_new(data.get("whatsNew")),
        category: string_field(data, "genre"),
        tags: keyword_tags(data.get("topKeywords")),
        version: string_field(data, "version"),
        file_size: 0.0,
        min_android_version: scalar_string(data.get("androidVersion")),
        downloads: count(data.get("realInstalls")),
        ratings_count: count(data.get("ratings")),
        reviews_count: count(data.get("reviews")),
        average_rating: rating(data.get("score")),
        histogram: histogram(data.get("histogram")),
        reviews: reviews(data.get("reviewsData")),
        content_rating: string_field(data, "contentRating"),
        permissions: permissions(data.get("permissions")),
        data_safety: string_list(data.get("dataSafety")),
        status: AppStatus::Published,
        is_featured: data.get("isFeatured").and_then(Value::as_bool).unwrap_or(false),
        updated_at: scalar_string(data.get("lastUpdated")),
    }
}

fn string_field(data: &Value, key: &str) -> String {
    data.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Strings are taken as-is, numbers are printed, anything else is empty.
fn scalar_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

fn count(value: Option<&Value>) -> u64 {
    let Some(Value::Number(n)) = value else {
        return 0;
    };
    if let Some(u) = n.as_u64() {
        return u;
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f as u64,
        _ => 0,
    }
}

fn rating(value: Option<&Value>) -> f32 {
    match value.and_then(Value::as_f64) {
        Some(f) if f.is_finite() => f.clamp(0.0, 5.0) as f32,
        _ => 0.0,
    }
}

fn histogram(value: Option<&Value>) -> [u64; 5] {
    let mut out = [0; 5];
    if let Some(arr) = value.and_then(Value::as_array)
        && arr.len() == out.len()
    {
        for (slot, v) in out.iter_mut().zip(arr) {
            *slot = count(Some(v));
        }
    }
    out
}

fn whats_new(value: Option<&Value>) -> String {
    let text = match value {
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    if text.trim().is_empty() { NO_UPDATES_SENTINEL.to_string() } else { text }
}

/// Object keys are already unique, so the tag list is duplicate free.
fn keyword_tags(value: Option<&Value>) -> Vec<String> {
    value.and_then(Value::as_object).map(|m| m.keys().cloned().collect()).unwrap_or_default()
}

fn permissions(value: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    let Some(groups) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    groups
        .iter()
        .filter(|(_, perms)| perms.is_array())
        .map(|(group, perms)| (group.clone(), string_list(Some(perms))))
        .collect()
}

fn reviews(value: Option<&Value>) -> Vec<ReviewRecord> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries.iter().filter(|r| r.is_object()).map(review).collect()
}

fn review(r: &Value) -> ReviewRecord {
    let user = string_field(r, "user");
    let text = string_field(r, "text");
    let score = rating(r.get("rating"));
    let id = match scalar_string(r.get("id")) {
        id if !id.is_empty() => id,
        _ => derive_review_id(&user, &text, score),
    };
    let version =
        r.get("version").and_then(Value::as_str).filter(|v| !v.is_empty()).map(String::from);
    ReviewRecord { id, avatar: string_field(r, "avatar"), user, rating: score, text, version }
}

/// Stable id for a review the backend sent without one.
pub(crate) fn derive_review_id(user: &str, text: &str, rating: f32) -> String {
    let mut ctx = md5::Context::new();
    ctx.consume(user.as_bytes());
    ctx.consume([0u8]);
    ctx.consume(text.as_bytes());
    ctx.consume([0u8]);
    ctx.consume(rating.to_string().as_bytes());
    let digest = format!("{:x}", ctx.finalize());
    format!("r-{}", &digest[..16])
}
