// Copyright 2025 Cowboy AI, LLC.

//! Mediation value objects: units, currencies and numeric ranges

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Measurement unit, kept in its declared symbolic form (e.g. `t/ha`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Unit {
    /// Unit expression
    pub symbol: String,
}

impl Unit {
    /// Create a unit from its symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Currency types to classify monetary units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CurrencyType {
    /// Government-issued fiat currency (ISO-4217)
    Fiat,
    /// Crypto currency
    Crypto,
    /// Anything else (loyalty points, model-internal value units)
    Other,
}

/// Currency, optionally pinned to a reference year (`EUR@2020`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Currency {
    /// ISO-4217 code or ticker
    pub code: String,
    /// Year the currency value refers to
    pub year: Option<u16>,
    /// Classification
    pub kind: CurrencyType,
}

impl Currency {
    /// Fiat currency with no reference year
    pub fn fiat(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            year: None,
            kind: CurrencyType::Fiat,
        }
    }

    /// Pin the currency to a reference year
    pub fn at_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{}@{}", self.code, year),
            None => f.write_str(&self.code),
        }
    }
}

/// Unit or currency. An observable carries at most one of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Mediation {
    /// Physical unit
    Unit(Unit),
    /// Monetary currency
    Currency(Currency),
}

impl fmt::Display for Mediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mediation::Unit(unit) => unit.fmt(f),
            Mediation::Currency(currency) => currency.fmt(f),
        }
    }
}

/// Numeric interval with optionally open or unbounded ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NumericRange {
    lower: Option<f64>,
    upper: Option<f64>,
    lower_exclusive: bool,
    upper_exclusive: bool,
}

impl NumericRange {
    /// Closed interval; bounds given in the wrong order are swapped
    pub fn new(lower: f64, upper: f64) -> Self {
        let (lower, upper) = if lower > upper {
            (upper, lower)
        } else {
            (lower, upper)
        };
        Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_exclusive: false,
            upper_exclusive: false,
        }
    }

    /// Interval with at least one unbounded end
    pub fn bounded(lower: Option<f64>, upper: Option<f64>) -> Self {
        match (lower, upper) {
            (Some(l), Some(u)) => Self::new(l, u),
            _ => Self {
                lower,
                upper,
                lower_exclusive: false,
                upper_exclusive: false,
            },
        }
    }

    /// Exclude the lower bound
    pub fn exclusive_lower(mut self) -> Self {
        self.lower_exclusive = true;
        self
    }

    /// Exclude the upper bound
    pub fn exclusive_upper(mut self) -> Self {
        self.upper_exclusive = true;
        self
    }

    /// Lower bound, `None` when unbounded
    pub fn lower(&self) -> Option<f64> {
        self.lower
    }

    /// Upper bound, `None` when unbounded
    pub fn upper(&self) -> Option<f64> {
        self.upper
    }

    /// Whether a value falls within the range
    pub fn contains(&self, value: f64) -> bool {
        let above = match self.lower {
            Some(l) if self.lower_exclusive => value > l,
            Some(l) => value >= l,
            None => true,
        };
        let below = match self.upper {
            Some(u) if self.upper_exclusive => value < u,
            Some(u) => value <= u,
            None => true,
        };
        above && below
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |value: Option<f64>, exclusive: bool| match value {
            None => "unbounded".to_string(),
            Some(v) if exclusive => format!("{v:?} exclusive"),
            Some(v) => format!("{v:?}"),
        };
        write!(
            f,
            "{} to {}",
            bound(self.lower, self.lower_exclusive),
            bound(self.upper, self.upper_exclusive)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_swaps_bounds() {
        let range = NumericRange::new(10.0, 1.0);
        assert_eq!(range.lower(), Some(1.0));
        assert_eq!(range.upper(), Some(10.0));
        assert_eq!(range.to_string(), "1.0 to 10.0");
    }

    #[test]
    fn test_range_contains() {
        let range = NumericRange::new(0.0, 1.0).exclusive_upper();
        assert!(range.contains(0.0));
        assert!(range.contains(0.5));
        assert!(!range.contains(1.0));

        let open = NumericRange::bounded(Some(5.0), None).exclusive_lower();
        assert!(!open.contains(5.0));
        assert!(open.contains(1e9));
        assert_eq!(open.to_string(), "5.0 exclusive to unbounded");
    }

    #[test]
    fn test_mediation_display() {
        assert_eq!(Mediation::Unit(Unit::new("t/ha")).to_string(), "t/ha");
        assert_eq!(
            Mediation::Currency(Currency::fiat("EUR").at_year(2020)).to_string(),
            "EUR@2020"
        );
    }
}
