use scout_core::error::AppError;
use scout_core::normalize::parse_published_date;
use time::Date;

/// `0.5 ^ (elapsed / half_life)`, with negative elapsed clamped to zero.
///
/// The result stays strictly positive: once the power underflows the weight is pinned
/// at `f64::MIN_POSITIVE`. That happens past 1022 half-lives (about 235 years at the
/// default 12 weeks); below that the weight strictly decreases with elapsed time, and
/// beyond it all dates weigh the same.
pub fn decay_weight(elapsed: f64, half_life: f64) -> f64 {
    let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
    0.5f64.powf(elapsed / half_life).max(f64::MIN_POSITIVE)
}

/// Recency weight of publication dates relative to a fixed evaluation day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecencyScorer {
    today: Date,
    half_life_weeks: f64,
}

impl RecencyScorer {
    pub fn new(today: Date, half_life_weeks: f64) -> Result<Self, AppError> {
        if !(half_life_weeks.is_finite() && half_life_weeks > 0.0) {
            return Err(AppError::invalid_argument("half-life must be a positive number of weeks")
                .with_details(format!("half_life_weeks={half_life_weeks}")));
        }
        Ok(Self {
            today,
            half_life_weeks,
        })
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn half_life_weeks(&self) -> f64 {
        self.half_life_weeks
    }

    /// Weeks between `published` and today; negative for future dates.
    pub fn elapsed_weeks(&self, published: Date) -> f64 {
        (self.today - published).whole_days() as f64 / 7.0
    }

    pub fn decay_for_date(&self, published: Date) -> f64 {
        decay_weight(self.elapsed_weeks(published), self.half_life_weeks)
    }

    /// Decay for a raw source date; `RECENCY_INVALID_DATE` when it cannot be parsed.
    pub fn decay(&self, published: &str) -> Result<f64, AppError> {
        Ok(self.decay_for_date(parse_published_date(published)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn today_weighs_one_and_half_life_halves() {
        let scorer = RecencyScorer::new(date!(2025 - 05 - 14), 12.0).unwrap();
        assert_eq!(scorer.decay_for_date(date!(2025 - 05 - 14)), 1.0);
        let twelve_weeks_ago = date!(2025 - 05 - 14) - time::Duration::weeks(12);
        assert!((scorer.decay_for_date(twelve_weeks_ago) - 0.5).abs() < 1e-12);
        let two_half_lives = date!(2025 - 05 - 14) - time::Duration::weeks(24);
        assert!((scorer.decay_for_date(two_half_lives) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn future_dates_clamp_to_one() {
        let scorer = RecencyScorer::new(date!(2025 - 05 - 14), 12.0).unwrap();
        assert_eq!(scorer.decay_for_date(date!(2026 - 01 - 01)), 1.0);
        assert_eq!(scorer.decay("2030-01-01T00:00:00Z").unwrap(), 1.0);
    }

    #[test]
    fn ancient_dates_stay_positive() {
        let scorer = RecencyScorer::new(date!(2025 - 05 - 14), 1.0).unwrap();
        let w = scorer.decay_for_date(date!(1000 - 01 - 01));
        assert!(w > 0.0);
        assert!(w <= 1.0);
        assert!(decay_weight(f64::INFINITY, 1.0) > 0.0);
    }

    #[test]
    fn strictly_decreasing_until_the_floor() {
        let half_life = 12.0;
        let mut previous = decay_weight(0.0, half_life);
        // One step per day out to 1000 half-lives.
        for day in 1..=(1000 * 12 * 7) {
            let w = decay_weight(f64::from(day) / 7.0, half_life);
            assert!(w < previous, "day={day}");
            previous = w;
        }
        assert!(previous > f64::MIN_POSITIVE);

        let floor_a = decay_weight(1100.0 * half_life, half_life);
        let floor_b = decay_weight(5000.0 * half_life, half_life);
        assert_eq!(floor_a, f64::MIN_POSITIVE);
        assert_eq!(floor_a, floor_b);
    }

    #[test]
    fn unparsable_date_is_reported() {
        let scorer = RecencyScorer::new(date!(2025 - 05 - 14), 12.0).unwrap();
        let err = scorer.decay("last tuesday").unwrap_err();
        assert_eq!(err.code, "RECENCY_INVALID_DATE");
    }

    #[test]
    fn rejects_non_positive_half_life() {
        for hl in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(RecencyScorer::new(date!(2025 - 05 - 14), hl).is_err());
        }
    }
}
