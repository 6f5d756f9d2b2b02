//! Relative (multiples-based) valuation (§4.5.4): P/E, P/B, and EV/EBITDA
//! ratios, plus the implied-price conversion used to apply a peer multiple.

/// Price-to-earnings ratio.
#[must_use]
pub fn pe_ratio(price: f64, eps_diluted: f64) -> f64 {
    if eps_diluted <= 0.0 {
        return f64::NAN;
    }
    price / eps_diluted
}

/// Price-to-book ratio.
#[must_use]
pub fn pb_ratio(price: f64, book_value_per_share: f64) -> f64 {
    if book_value_per_share <= 0.0 {
        return f64::NAN;
    }
    price / book_value_per_share
}

/// Enterprise-value-to-EBITDA ratio.
#[must_use]
pub fn ev_to_ebitda(enterprise_value: f64, ebitda: f64) -> f64 {
    if ebitda <= 0.0 {
        return f64::NAN;
    }
    enterprise_value / ebitda
}

/// Implied per-share price from a peer multiple applied to a per-share
/// metric (EPS, book value per share, or EBITDA per share), net of any
/// per-share debt the metric's basis requires subtracting (zero for
/// equity-basis metrics like P/E and P/B; the EV/EBITDA caller passes net
/// debt per share).
#[must_use]
pub fn implied_price_from_multiple(metric_per_share: f64, peer_multiple: f64, net_debt_per_share: f64) -> f64 {
    metric_per_share * peer_multiple - net_debt_per_share
}
