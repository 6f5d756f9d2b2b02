//! The WACC Engine (§4.3): CAPM cost of equity with Blume/Hamada beta
//! transforms, cost of debt, capital-structure weights, sector floors, and
//! the financial-services industry-WACC redirect.

use valu_core::tables::{industry_row, sector_wacc_floor};
use valu_core::{WaccInputs, WaccResult};

/// Compute the composite WACC per §4.3.
///
/// Financial-services companies are redirected to the Damodaran
/// industry-WACC value outright (bank leverage is operational, not
/// financing) and never go through the sector-floor check, since the
/// redirect already pins them to a reference value.
#[must_use]
pub fn compute_wacc(inputs: &WaccInputs) -> WaccResult {
    let blume_beta = if inputs.apply_blume {
        (2.0 / 3.0) * inputs.raw_beta + (1.0 / 3.0) * 1.0
    } else {
        inputs.raw_beta
    };

    let (unlevered_beta, relevered_beta, effective_beta) = match inputs.target_debt_to_equity {
        Some(target_de) => {
            let unlevered =
                blume_beta / (1.0 + (1.0 - inputs.tax_rate) * inputs.current_debt_to_equity);
            let relevered = unlevered * (1.0 + (1.0 - inputs.tax_rate) * target_de);
            (Some(unlevered), Some(relevered), relevered)
        }
        None => (None, None, blume_beta),
    };

    let cost_of_equity =
        inputs.risk_free_rate + effective_beta * inputs.market_risk_premium + inputs.country_premium;
    let after_tax_cost_of_debt = inputs.cost_of_debt * (1.0 - inputs.tax_rate);

    let gross_debt_threshold = (5.0e9_f64).max(0.01 * inputs.market_cap);
    let debt_for_weights = if inputs.gross_debt > gross_debt_threshold {
        inputs.gross_debt
    } else {
        (inputs.total_debt - inputs.cash).max(0.0)
    };
    let equity = inputs.market_cap;
    let total_capital = equity + debt_for_weights;
    let (equity_weight, debt_weight) = if total_capital > 0.0 {
        (equity / total_capital, debt_for_weights / total_capital)
    } else {
        (1.0, 0.0)
    };

    let mut wacc = equity_weight * cost_of_equity + debt_weight * after_tax_cost_of_debt;

    let mut industry_override_applied = false;
    let mut sector_floor_applied = false;

    if inputs.sector.eq_ignore_ascii_case("Financial Services") {
        wacc = industry_row(&inputs.sector).industry_wacc;
        industry_override_applied = true;
    } else {
        let floor = sector_wacc_floor(&inputs.sector);
        if wacc < floor {
            wacc = floor;
            sector_floor_applied = true;
        }
    }

    WaccResult {
        risk_free_rate: inputs.risk_free_rate,
        risk_free_source: inputs.risk_free_source.clone(),
        market_risk_premium: inputs.market_risk_premium,
        raw_beta: inputs.raw_beta,
        blume_beta,
        unlevered_beta,
        relevered_beta,
        effective_beta,
        current_debt_to_equity: inputs.current_debt_to_equity,
        target_debt_to_equity: inputs.target_debt_to_equity,
        tax_rate: inputs.tax_rate,
        cost_of_debt: inputs.cost_of_debt,
        after_tax_cost_of_debt,
        cost_of_equity,
        equity_weight,
        debt_weight,
        country_premium: inputs.country_premium,
        sector_floor_applied,
        industry_override_applied,
        wacc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> WaccInputs {
        WaccInputs {
            risk_free_rate: 0.0445,
            risk_free_source: "static_default".into(),
            market_risk_premium: 0.0447,
            raw_beta: 1.2,
            current_debt_to_equity: 0.3,
            target_debt_to_equity: None,
            tax_rate: 0.21,
            cost_of_debt: 0.05,
            country_premium: 0.0,
            sector: "Technology".into(),
            gross_debt: 1.0e9,
            market_cap: 50.0e9,
            cash: 2.0e9,
            total_debt: 1.0e9,
            apply_blume: true,
        }
    }

    #[test]
    fn blume_shrinks_beta_toward_one() {
        let result = compute_wacc(&base_inputs());
        // beta=1.2 shrinks toward 1.0: (2/3)*1.2 + (1/3)*1.0 = 1.1333...
        assert!((result.blume_beta - 1.1333333333).abs() < 1e-6);
    }

    #[test]
    fn hamada_unlever_relever_only_when_target_given() {
        let mut inputs = base_inputs();
        let no_target = compute_wacc(&inputs);
        assert!(no_target.unlevered_beta.is_none());

        inputs.target_debt_to_equity = Some(0.6);
        let with_target = compute_wacc(&inputs);
        assert!(with_target.unlevered_beta.is_some());
        assert!(with_target.relevered_beta.is_some());
    }

    #[test]
    fn financial_services_redirects_to_industry_wacc() {
        let mut inputs = base_inputs();
        inputs.sector = "Financial Services".into();
        let result = compute_wacc(&inputs);
        assert!(result.industry_override_applied);
        assert!((result.wacc - 0.0599).abs() < 1e-9);
    }

    #[test]
    fn sector_floor_lifts_low_computed_wacc() {
        let mut inputs = base_inputs();
        inputs.raw_beta = 0.1;
        inputs.cost_of_debt = 0.01;
        inputs.apply_blume = false;
        let result = compute_wacc(&inputs);
        assert!(result.sector_floor_applied);
        assert!((result.wacc - 0.075).abs() < 1e-9);
    }

    #[test]
    fn gross_debt_used_when_it_exceeds_the_threshold() {
        let mut inputs = base_inputs();
        inputs.gross_debt = 6.0e9; // exceeds max(5e9, 1% of 50e9=0.5e9)
        inputs.total_debt = 6.0e9;
        inputs.cash = 10.0e9; // net debt would be negative/zero
        let result = compute_wacc(&inputs);
        assert!(result.debt_weight > 0.0);
    }
}
