//! Derived dimension attributes
//!
//! Pure functions computing the warehouse-side attributes that do not exist
//! in the source feeds: customer segmentation, product profitability, and
//! the 2-decimal rounding shared by all derived money measures.

/// Round to 2 decimal places, half away from zero
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Classify a customer by geography
///
/// - `INTERNATIONAL` for USA, UK, and Australia
/// - `MAJOR_CITY` for Vietnamese customers in Hanoi or Ho Chi Minh
/// - `OTHER` for everyone else
pub fn customer_segment(country: &str, city: &str) -> &'static str {
    match country {
        "USA" | "UK" | "Australia" => "INTERNATIONAL",
        "Vietnam" if city == "Hanoi" || city == "Ho Chi Minh" => "MAJOR_CITY",
        _ => "OTHER",
    }
}

/// Product margin as a percentage of MSRP, rounded to 2 decimals
///
/// Returns 0.0 for a non-positive MSRP; transform rules reject those rows
/// before they reach the dimension load.
pub fn profit_margin_pct(cost_price: f64, msrp: f64) -> f64 {
    if msrp <= 0.0 {
        return 0.0;
    }
    round2(((msrp - cost_price) / msrp) * 100.0)
}

#[cfg(test)]
#[path = "derive_test.rs"]
mod tests;
