use chrono::NaiveDate;
use tracing::debug;

/// Puts raw provider rows into series order: ascending dates, one value per
/// date (the last one seen wins), finite values only.
pub fn normalize_rows(rows: &mut Vec<(NaiveDate, f64)>) {
    let before = rows.len();

    rows.retain(|(_, value)| value.is_finite());
    let non_finite = before - rows.len();

    // stable sort keeps provider order among equal dates
    rows.sort_by_key(|(date, _)| *date);

    let mut deduped: Vec<(NaiveDate, f64)> = Vec::with_capacity(rows.len());
    for (date, value) in rows.drain(..) {
        match deduped.last_mut() {
            Some(last) if last.0 == date => last.1 = value,
            _ => deduped.push((date, value)),
        }
    }
    let duplicates = before - non_finite - deduped.len();
    *rows = deduped;

    if non_finite > 0 || duplicates > 0 {
        debug!(
            "Normalized rows: dropped {} non-finite, {} duplicate dates",
            non_finite, duplicates
        );
    }
}
