// Derived metrics and their severity bands
use serde::Serialize;

/// Display severity of a derived metric, rendered as a `metric-*` class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Positive,
    Neutral,
    Warning,
    Negative,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Positive => "metric-positive",
            Severity::Neutral => "metric-neutral",
            Severity::Warning => "metric-warning",
            Severity::Negative => "metric-negative",
        }
    }

    /// Higher is better: `>= good` positive, `>= fair` warning, else negative
    pub fn at_least(value: f64, good: f64, fair: f64) -> Self {
        if value >= good {
            Severity::Positive
        } else if value >= fair {
            Severity::Warning
        } else {
            Severity::Negative
        }
    }

    /// Higher is better with strict bounds: `> good` positive, `> fair` warning
    pub fn above(value: f64, good: f64, fair: f64) -> Self {
        if value > good {
            Severity::Positive
        } else if value > fair {
            Severity::Warning
        } else {
            Severity::Negative
        }
    }

    /// Lower is better: `< good` positive, `< fair` warning, else negative
    pub fn below(value: f64, good: f64, fair: f64) -> Self {
        if value < good {
            Severity::Positive
        } else if value < fair {
            Severity::Warning
        } else {
            Severity::Negative
        }
    }

    /// Positive when the condition holds, warning otherwise
    pub fn positive_or_warning(condition: bool) -> Self {
        if condition {
            Severity::Positive
        } else {
            Severity::Warning
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetric {
    pub label: String,
    pub value: String,
    pub severity: Severity,
}

impl DerivedMetric {
    pub fn new(label: impl Into<String>, value: impl Into<String>, severity: Severity) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            severity,
        }
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is zero
pub fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Round to `digits` decimals with ties going up, so -2.5 becomes -2
/// and 12.25 becomes 12.3.
pub fn round_half_up(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale + 0.5).floor() / scale
}

/// Whole-number percentage, rounded half up
pub fn rounded_percent(numerator: f64, denominator: f64) -> i64 {
    round_half_up(ratio_percent(numerator, denominator), 0) as i64
}

/// Minutes to hours, rounded to one decimal
pub fn minutes_to_hours(minutes: f64) -> f64 {
    round_half_up(minutes / 60.0, 1)
}

pub fn currency_symbol(code: &str) -> &'static str {
    match code {
        "EUR" => "€",
        "GBP" => "£",
        _ => "$",
    }
}

/// Format with comma thousands separators and at most three fraction digits
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::at_least(100.0, 100.0, 80.0), Severity::Positive);
        assert_eq!(Severity::at_least(80.0, 100.0, 80.0), Severity::Warning);
        assert_eq!(Severity::at_least(79.9, 100.0, 80.0), Severity::Negative);

        assert_eq!(Severity::above(98.0, 98.0, 95.0), Severity::Warning);
        assert_eq!(Severity::above(95.0, 98.0, 95.0), Severity::Negative);

        assert_eq!(Severity::below(0.99, 1.0, 2.0), Severity::Positive);
        assert_eq!(Severity::below(1.0, 1.0, 2.0), Severity::Warning);
        assert_eq!(Severity::below(2.0, 1.0, 2.0), Severity::Negative);
    }

    #[test]
    fn test_ratio_helpers() {
        assert_eq!(rounded_percent(45.0, 60.0), 75);
        assert_eq!(rounded_percent(1.0, 0.0), 0);
        assert_eq!(minutes_to_hours(95.0), 1.6);
        assert_eq!(minutes_to_hours(120.0), 2.0);
    }

    #[test]
    fn test_ties_round_up() {
        assert_eq!(round_half_up(12.25, 1), 12.3);
        assert_eq!(round_half_up(2.5, 0), 3.0);
        assert_eq!(round_half_up(-2.5, 0), -2.0);
        assert_eq!(round_half_up(-2.51, 0), -3.0);
        assert_eq!(rounded_percent(-1.0, 8.0), -12);
        assert_eq!(rounded_percent(1.0, 8.0), 13);
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("GBP"), "£");
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("JPY"), "$");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(10000.0), "10,000");
        assert_eq!(group_thousands(63750.25), "63,750.25");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1234567.8912), "1,234,567.891");
        assert_eq!(group_thousands(-4200.5), "-4,200.5");
        assert_eq!(group_thousands(0.0), "0");
    }
}
