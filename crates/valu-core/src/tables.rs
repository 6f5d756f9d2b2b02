//! Process-local static reference data: the Damodaran-style industry
//! dataset, sector WACC floors, and country risk premia (§4.3, §9 "Static
//! tables"). These are deliberately plain const slices rather than a
//! generated map — the table is small, read-only, and versioned with the
//! engine's own releases per spec §9.

/// Per-sector Damodaran-style reference figures: unlevered beta, composite
/// tax rate, and industry-average WACC. Figures are illustrative snapshots,
/// not live market data.
#[derive(Debug, Clone, Copy)]
pub struct IndustryRow {
    pub sector: &'static str,
    pub unlevered_beta: f64,
    pub tax_rate: f64,
    pub industry_wacc: f64,
}

pub const DAMODARAN_INDUSTRY: &[IndustryRow] = &[
    IndustryRow { sector: "Technology", unlevered_beta: 1.15, tax_rate: 0.21, industry_wacc: 0.0950 },
    IndustryRow { sector: "Healthcare", unlevered_beta: 0.90, tax_rate: 0.21, industry_wacc: 0.0780 },
    IndustryRow { sector: "Consumer Defensive", unlevered_beta: 0.65, tax_rate: 0.23, industry_wacc: 0.0680 },
    IndustryRow { sector: "Consumer Cyclical", unlevered_beta: 1.05, tax_rate: 0.23, industry_wacc: 0.0870 },
    IndustryRow { sector: "Energy", unlevered_beta: 1.10, tax_rate: 0.25, industry_wacc: 0.0820 },
    IndustryRow { sector: "Industrials", unlevered_beta: 1.00, tax_rate: 0.24, industry_wacc: 0.0800 },
    IndustryRow { sector: "Utilities", unlevered_beta: 0.45, tax_rate: 0.22, industry_wacc: 0.0580 },
    IndustryRow { sector: "Financial Services", unlevered_beta: 0.80, tax_rate: 0.24, industry_wacc: 0.0599 },
    IndustryRow { sector: "Real Estate", unlevered_beta: 0.70, tax_rate: 0.21, industry_wacc: 0.0650 },
    IndustryRow { sector: "Basic Materials", unlevered_beta: 1.05, tax_rate: 0.25, industry_wacc: 0.0860 },
    IndustryRow { sector: "Communication Services", unlevered_beta: 0.95, tax_rate: 0.22, industry_wacc: 0.0840 },
];

/// Fallback row used when a sector has no entry in `DAMODARAN_INDUSTRY`.
pub const DEFAULT_INDUSTRY: IndustryRow = IndustryRow {
    sector: "Default",
    unlevered_beta: 1.0,
    tax_rate: 0.21,
    industry_wacc: 0.0750,
};

/// Look up a sector's Damodaran row, falling back to `DEFAULT_INDUSTRY`.
#[must_use]
pub fn industry_row(sector: &str) -> IndustryRow {
    DAMODARAN_INDUSTRY
        .iter()
        .find(|row| row.sector.eq_ignore_ascii_case(sector))
        .copied()
        .unwrap_or(DEFAULT_INDUSTRY)
}

/// Sector-specific WACC lower bounds (§4.3 "Sector floors").
pub const SECTOR_WACC_FLOORS: &[(&str, f64)] = &[
    ("Technology", 0.075),
    ("Healthcare", 0.065),
    ("Consumer Defensive", 0.060),
];

/// Default floor applied when a sector is not listed explicitly.
pub const DEFAULT_WACC_FLOOR: f64 = 0.065;

/// Look up the WACC floor for a sector.
#[must_use]
pub fn sector_wacc_floor(sector: &str) -> f64 {
    SECTOR_WACC_FLOORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sector))
        .map(|(_, floor)| *floor)
        .unwrap_or(DEFAULT_WACC_FLOOR)
}

/// Country risk premia added to cost of equity (§4.3 `CRP`). Mature markets
/// carry a premium of zero.
pub const COUNTRY_RISK_PREMIA: &[(&str, f64)] = &[
    ("USA", 0.0),
    ("CAN", 0.0),
    ("GBR", 0.0),
    ("DEU", 0.0),
    ("FRA", 0.0),
    ("JPN", 0.0),
    ("AUS", 0.0),
    ("CHN", 0.0095),
    ("IND", 0.0215),
    ("BRA", 0.0290),
    ("IDN", 0.0220),
    ("MEX", 0.0195),
    ("ZAF", 0.0330),
    ("TUR", 0.0520),
    ("ARG", 0.1280),
];

/// Look up the country risk premium, defaulting to 0 for unlisted (assumed
/// mature) markets.
#[must_use]
pub fn country_risk_premium(country_code: &str) -> f64 {
    COUNTRY_RISK_PREMIA
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(country_code))
        .map(|(_, premium)| *premium)
        .unwrap_or(0.0)
}

/// Static default risk-free rate used when dynamic mode is off or the
/// Treasury probe is unavailable (§4.3).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0445;

/// Configured constant market risk premium (§4.3).
pub const DEFAULT_MARKET_RISK_PREMIUM: f64 = 0.0447;
