use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Render archive epoch seconds (possibly fractional) as RFC 3339 UTC.
/// Returns `None` for values outside the representable range.
pub fn epoch_to_rfc3339(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    let nanos = (secs * 1e9).round() as i128;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
    dt.format(&Rfc3339).ok()
}
