// =============================================================================
// Fundamentals: statement ratios and financial-table cleaning
// =============================================================================
//
// Ratios use the most recent period of each statement line:
//
//   revenue_growth = (revenue[t] - revenue[t-1]) / revenue[t-1]
//   gross_margin   = gross_profit[t] / revenue[t]
//   net_margin     = net_income[t]   / revenue[t]
//   roe            = net_income[t]   / equity[t]
//   debt_ratio     = total_liabilities[t] / total_assets[t]
//
// A missing line, a zero denominator or a non-finite result leaves the ratio
// undefined (`None`).
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;
use crate::stats::quantile_linear;

/// Multiplier on the interquartile range beyond which a value is an outlier.
const IQR_FENCE: f64 = 1.5;

/// Statement history, oldest period first. Absent lines are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    #[serde(default)]
    pub revenue: Vec<f64>,
    #[serde(default)]
    pub gross_profit: Vec<f64>,
    #[serde(default)]
    pub net_income: Vec<f64>,
    #[serde(default)]
    pub equity: Vec<f64>,
    #[serde(default)]
    pub total_liabilities: Vec<f64>,
    #[serde(default)]
    pub total_assets: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub revenue_growth: Option<f64>,
    pub gross_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub roe: Option<f64>,
    pub debt_ratio: Option<f64>,
}

impl FinancialMetrics {
    pub fn from_statements(s: &FinancialStatements) -> Self {
        let revenue_growth = match s.revenue.as_slice() {
            [.., prev, last] => ratio(Some(last - prev), Some(*prev)),
            _ => None,
        };

        Self {
            revenue_growth,
            gross_margin: ratio(s.gross_profit.last().copied(), s.revenue.last().copied()),
            net_margin: ratio(s.net_income.last().copied(), s.revenue.last().copied()),
            roe: ratio(s.net_income.last().copied(), s.equity.last().copied()),
            debt_ratio: ratio(
                s.total_liabilities.last().copied(),
                s.total_assets.last().copied(),
            ),
        }
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    let r = n / d;
    r.is_finite().then_some(r)
}

// =============================================================================
// Table cleaning
// =============================================================================

/// Fill gaps and drop outlier rows from a period-by-line table.
///
/// 1. Forward-fill each column, then back-fill what is still missing at the
///    start. A column with no values at all stays empty.
/// 2. Per column, compute Q1/Q3 (linear interpolation) and drop every row
///    holding a value outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
///
/// Rows must all have the same width.
pub fn clean_rows(rows: &[Vec<Option<f64>>]) -> Result<Vec<Vec<Option<f64>>>, AnalysisError> {
    let Some(width) = rows.first().map(Vec::len) else {
        return Ok(Vec::new());
    };
    if let Some(index) = rows.iter().position(|r| r.len() != width) {
        return Err(AnalysisError::MalformedInput(format!(
            "row {index} has {} columns, expected {width}",
            rows[index].len()
        )));
    }

    let mut filled: Vec<Vec<Option<f64>>> = rows
        .iter()
        .map(|r| r.iter().map(|v| v.filter(|x| x.is_finite())).collect())
        .collect();

    for col in 0..width {
        let mut carry = None;
        for row in filled.iter_mut() {
            match row[col] {
                Some(v) => carry = Some(v),
                None => row[col] = carry,
            }
        }
        let mut carry = None;
        for row in filled.iter_mut().rev() {
            match row[col] {
                Some(v) => carry = Some(v),
                None => row[col] = carry,
            }
        }
    }

    let fences: Vec<Option<(f64, f64)>> = (0..width)
        .map(|col| {
            let column: Vec<f64> = filled.iter().filter_map(|r| r[col]).collect();
            let q1 = quantile_linear(&column, 0.25)?;
            let q3 = quantile_linear(&column, 0.75)?;
            let iqr = q3 - q1;
            Some((q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr))
        })
        .collect();

    let before = filled.len();
    filled.retain(|row| {
        row.iter().zip(&fences).all(|(value, fence)| match (value, fence) {
            (Some(v), Some((lo, hi))) => *v >= *lo && *v <= *hi,
            _ => true,
        })
    });

    debug!(rows = before, kept = filled.len(), columns = width, "financial table cleaned");
    Ok(filled)
}
