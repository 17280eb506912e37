use crate::model::{AnalysisError, TrendDirection};

fn ensure_positive(window: i64) -> Result<usize, AnalysisError> {
    if window <= 0 {
        return Err(AnalysisError::InvalidWindow(window));
    }
    Ok(window as usize)
}

fn ensure_non_empty(values: &[f64]) -> Result<(), AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(())
}

/// Trailing simple moving average.
///
/// The first `window - 1` positions are `None`; a window longer than the
/// input yields all `None`.
pub fn moving_average(values: &[f64], window: i64) -> Result<Vec<Option<f64>>, AnalysisError> {
    let window = ensure_positive(window)?;
    ensure_non_empty(values)?;

    if window > values.len() {
        return Ok(vec![None; values.len()]);
    }

    let mut result = vec![None; window - 1];
    result.extend(
        values
            .windows(window)
            .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
    );
    Ok(result)
}

/// Marks positions that close a strictly monotonic run of `run_length`
/// day-over-day changes (`run_length + 1` values ending at the position).
///
/// Positions without a full window are `false`. Equal neighbours break the run.
pub fn consecutive_run(
    values: &[f64],
    run_length: i64,
    direction: TrendDirection,
) -> Result<Vec<bool>, AnalysisError> {
    let run_length = ensure_positive(run_length)?;
    ensure_non_empty(values)?;

    let mut mask = vec![false; values.len()];
    if run_length >= values.len() {
        return Ok(mask);
    }

    for (offset, window) in values.windows(run_length + 1).enumerate() {
        mask[offset + run_length] = window.windows(2).all(|pair| match direction {
            TrendDirection::Rising => pair[1] > pair[0],
            TrendDirection::Falling => pair[1] < pair[0],
        });
    }
    Ok(mask)
}
