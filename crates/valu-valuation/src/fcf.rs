//! The Free-Cash-Flow Computer (§2 component 3): the forced canonical rule
//! `FCF = OCF - |CAPEX|`. A provider's own "free cash flow" field, if any,
//! is never consulted — this is the only accepted computation.

use valu_core::{Failure, FinancialData};

/// Derive the canonical FCF series, most-recent-first, from a validated
/// `FinancialData` snapshot.
pub fn compute_fcf_series(data: &FinancialData) -> Result<Vec<f64>, Failure> {
    data.validate()?;
    Ok(data
        .ocf
        .iter()
        .zip(data.capex.iter())
        .map(|(ocf, capex)| ocf - capex.abs())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> FinancialData {
        FinancialData {
            ticker: "TEST".into(),
            providers: vec!["yahoo".into()],
            as_of: Utc::now(),
            current_price: 100.0,
            shares_outstanding: 1_000.0,
            ocf: vec![120.0, 100.0, 90.0],
            capex: vec![-20.0, -15.0, -10.0],
            cash: 5.0,
            total_debt: 20.0,
            book_value: 50.0,
            revenue: 80.0,
            ebitda: 30.0,
            net_income: 15.0,
            eps_diluted: 1.5,
            dividends_per_share: vec![0.5],
            beta: 1.1,
            sector: "Technology".into(),
            country: "USA".into(),
            data_completeness: 0.9,
            confidence: 0.9,
        }
    }

    #[test]
    fn fcf_ignores_capex_sign() {
        let fcf = compute_fcf_series(&sample()).unwrap();
        assert_eq!(fcf, vec![100.0, 85.0, 80.0]);
    }

    #[test]
    fn positive_capex_is_still_subtracted_as_magnitude() {
        let mut fd = sample();
        fd.capex = vec![20.0, 15.0, 10.0];
        let fcf = compute_fcf_series(&fd).unwrap();
        assert_eq!(fcf, vec![100.0, 85.0, 80.0]);
    }

    #[test]
    fn misaligned_series_is_rejected() {
        let mut fd = sample();
        fd.capex.pop();
        assert!(compute_fcf_series(&fd).is_err());
    }
}
