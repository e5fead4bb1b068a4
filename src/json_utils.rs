use serde_json::{Map, Value};

/// A thing's `data` payload. Missing payloads are treated as empty maps.
pub type Payload = Map<String, Value>;

/// String field; `None` for absent, null, or non-string values.
pub fn str_field(data: &Payload, key: &str) -> Option<String> {
    data.get(key).and_then(|x| x.as_str()).map(|s| s.to_string())
}

/// String field that must also be non-empty (e.g. `permalink`).
pub fn non_empty_str_field<'a>(data: &'a Payload, key: &str) -> Option<&'a str> {
    data.get(key).and_then(|x| x.as_str()).filter(|s| !s.is_empty())
}

/// Free text (`body`/`selftext`), trimmed; absent or null text becomes `""`.
pub fn text_field(data: &Payload, key: &str) -> String {
    data.get(key)
        .and_then(|x| x.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Integer field. Archives occasionally carry counts as floats (`12.0`);
/// those are accepted only when integral and within `i64` range.
pub fn int_field(data: &Payload, key: &str) -> Option<i64> {
    let v = data.get(key)?;
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    // 2^63 is exactly representable; anything at or above it overflows.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    v.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= -LIMIT && *f < LIMIT)
        .map(|f| f as i64)
}

/// Epoch-seconds field (`created_utc` is usually a float like `1136073600.0`).
pub fn epoch_field(data: &Payload, key: &str) -> Option<f64> {
    data.get(key).and_then(|x| x.as_f64()).filter(|f| f.is_finite())
}

/// `kind` discriminator of a thing, if present.
pub fn kind_tag(thing: &Value) -> Option<&str> {
    thing.get("kind").and_then(|x| x.as_str())
}
