use crate::model::{AnalysisError, MonthKey, MonthlyAggregate, MonthlyAverage, PricePoint};
use std::collections::BTreeMap;

/// Groups points by calendar month and averages each group.
///
/// Months without observations are absent; output is ascending by month.
pub fn monthly_average(points: &[PricePoint]) -> Result<MonthlyAggregate, AnalysisError> {
    if points.is_empty() {
        return Err(AnalysisError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let mut grouped: BTreeMap<MonthKey, (f64, usize)> = BTreeMap::new();
    for point in points {
        let entry = grouped.entry(MonthKey::of(point.date)).or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }

    Ok(grouped
        .into_iter()
        .map(|(month, (sum, count))| MonthlyAverage {
            month,
            average: sum / count as f64,
            observations: count,
        })
        .collect())
}
