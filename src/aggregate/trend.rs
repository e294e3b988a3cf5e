//! Comparative calculator: period-over-period change and benchmark tiers

use serde::{Deserialize, Serialize};

use super::rates::round_to;
use crate::error::{ErrorCode, EsgError, Result};

/// Signed percentage change from `previous` to `current`.
///
/// `((current - previous) / previous) * 100` when `previous > 0`. When there
/// is no positive baseline the change is `+100` if `current > 0` and `0`
/// otherwise. The `+100` case is a product convention kept for dashboard
/// compatibility, not a derived quantity.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn of(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            Self::Up
        } else if change_percent < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// Current vs previous period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current: f64,
    pub previous: f64,
    /// Rounded to the display precision
    pub change_percent: f64,
    pub direction: TrendDirection,
}

impl PeriodComparison {
    pub fn new(current: f64, previous: f64, decimals: u32) -> Self {
        let change = percent_change(current, previous);
        Self {
            current,
            previous,
            change_percent: round_to(change, decimals),
            direction: TrendDirection::of(change),
        }
    }
}

/// Whether a larger value is a better result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Ordered performance tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Excellent,
    Good,
    Attention,
    Critical,
    /// No usable benchmark
    Unrated,
}

/// Multipliers of the benchmark at which each tier starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkTiers {
    pub excellent: f64,
    pub good: f64,
    pub attention: f64,
}

impl Default for BenchmarkTiers {
    fn default() -> Self {
        Self {
            excellent: 1.2,
            good: 1.0,
            attention: 0.6,
        }
    }
}

impl BenchmarkTiers {
    /// Multipliers must be finite, non-negative and descending
    pub fn validate(&self) -> Result<()> {
        let values = [self.excellent, self.good, self.attention];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(EsgError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                "tier multipliers must be finite and non-negative",
                Some("benchmarks.tiers".to_string()),
            ));
        }
        if !(self.excellent >= self.good && self.good >= self.attention) {
            return Err(EsgError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!(
                    "tier multipliers must descend (excellent {} >= good {} >= attention {})",
                    self.excellent, self.good, self.attention
                ),
                Some("benchmarks.tiers".to_string()),
            ));
        }
        Ok(())
    }

    /// Performance relative to the benchmark, oriented so that above 1 is
    /// better. `None` when the benchmark is unusable.
    pub fn performance_ratio(&self, value: f64, benchmark: f64, polarity: Polarity) -> Option<f64> {
        if !benchmark.is_finite() || benchmark <= 0.0 || !value.is_finite() {
            return None;
        }
        match polarity {
            Polarity::HigherIsBetter => Some(value / benchmark),
            Polarity::LowerIsBetter if value <= 0.0 => Some(f64::INFINITY),
            Polarity::LowerIsBetter => Some(benchmark / value),
        }
    }

    pub fn classify(&self, value: f64, benchmark: f64, polarity: Polarity) -> PerformanceTier {
        match self.performance_ratio(value, benchmark, polarity) {
            None => PerformanceTier::Unrated,
            Some(ratio) if ratio >= self.excellent => PerformanceTier::Excellent,
            Some(ratio) if ratio >= self.good => PerformanceTier::Good,
            Some(ratio) if ratio >= self.attention => PerformanceTier::Attention,
            Some(_) => PerformanceTier::Critical,
        }
    }

    pub fn assess(
        &self,
        value: f64,
        benchmark: f64,
        polarity: Polarity,
        decimals: u32,
    ) -> BenchmarkAssessment {
        let ratio = self
            .performance_ratio(value, benchmark, polarity)
            .filter(|r| r.is_finite())
            .map(|r| round_to(r, 2));
        BenchmarkAssessment {
            value: round_to(value, decimals),
            benchmark,
            polarity,
            ratio,
            tier: self.classify(value, benchmark, polarity),
        }
    }
}

/// A metric classified against a sector benchmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkAssessment {
    pub value: f64,
    pub benchmark: f64,
    pub polarity: Polarity,
    /// Oriented performance ratio, two decimals; `None` when unbounded or
    /// unrated
    pub ratio: Option<f64>,
    pub tier: PerformanceTier,
}
