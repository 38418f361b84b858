//! Earnings estimation
//!
//! Turns average views per video into monthly and yearly revenue bands using
//! fixed RPM (revenue per 1000 views) ranges for each video bucket.

use crate::data::{AverageViews, EarningsEstimate, EarningsRange, PeriodEarnings, VideoSample, CURRENCY_USD};

/// RPM band in USD per 1000 views
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpmBand {
    pub min: f64,
    pub max: f64,
}

/// RPM for regular uploads
pub const STANDARD_RPM: RpmBand = RpmBand { min: 2.0, max: 7.0 };

/// RPM for short-form uploads
pub const SHORTS_RPM: RpmBand = RpmBand { min: 0.2, max: 1.0 };

/// Months in a year, used to scale monthly views
const MONTHS_PER_YEAR: u64 = 12;

/// Floored mean of the samples' view counts, 0 for no samples
pub fn average_view_count(samples: &[VideoSample]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let total: u64 = samples.iter().map(|s| s.view_count).sum();
    total / samples.len() as u64
}

/// Floored earnings for `views` at `rpm`
fn earnings_at(views: u64, rpm: f64) -> u64 {
    (views as f64 / 1000.0 * rpm).floor() as u64
}

fn range_for(views: u64, rpm: RpmBand) -> EarningsRange {
    let min = earnings_at(views, rpm.min);
    let max = earnings_at(views, rpm.max);
    EarningsRange {
        min,
        max,
        average: (min + max) / 2,
    }
}

/// Monthly and yearly bands for one bucket
///
/// Yearly bounds are computed from twelve months of views directly, not by
/// scaling the floored monthly bounds.
fn period_earnings(monthly_views: u64, rpm: RpmBand) -> PeriodEarnings {
    PeriodEarnings {
        monthly: range_for(monthly_views, rpm),
        yearly: range_for(monthly_views * MONTHS_PER_YEAR, rpm),
    }
}

fn sum_ranges(a: EarningsRange, b: EarningsRange) -> EarningsRange {
    EarningsRange {
        min: a.min + b.min,
        max: a.max + b.max,
        average: a.average + b.average,
    }
}

/// Estimates earnings for a channel's average views
pub fn estimate_earnings(average_views: &AverageViews) -> EarningsEstimate {
    let standard = period_earnings(average_views.standard, STANDARD_RPM);
    let short = period_earnings(average_views.short, SHORTS_RPM);
    let total = PeriodEarnings {
        monthly: sum_ranges(standard.monthly, short.monthly),
        yearly: sum_ranges(standard.yearly, short.yearly),
    };

    EarningsEstimate {
        standard,
        short,
        total,
        currency: CURRENCY_USD.to_string(),
    }
}
