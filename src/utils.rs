/// Coldest and hottest air temperatures we accept from the provider, in Celsius.
pub const MIN_PLAUSIBLE_TEMP_C: f64 = -90.0;
pub const MAX_PLAUSIBLE_TEMP_C: f64 = 60.0;

/// Convert temperature from Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn is_plausible_celsius(celsius: f64) -> bool {
    celsius.is_finite() && (MIN_PLAUSIBLE_TEMP_C..=MAX_PLAUSIBLE_TEMP_C).contains(&celsius)
}

/// "Name, Region", falling back to the country when the region is blank.
pub fn format_location(name: &str, region: &str, country: &str) -> String {
    let area = if region.trim().is_empty() { country } else { region };
    format!("{}, {}", name, area)
}
