use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

/// Flat month used for every daily-rent conversion, whatever the calendar month length.
pub const DAYS_PER_MONTH: Decimal = dec!(30);

const OUTPUT_PRECISION: u32 = 2;

/// How a report measures vacancy. Each report keeps its own approximation on purpose:
/// consumers read the figures with that method in mind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VacancyMethod {
    /// Current unit status only.
    StatusSnapshot,
    /// Single most recent expired/terminated lease per unit.
    LatestTerminalLease,
    /// Uncovered days between every lease touching the window.
    TimelineReconstruction,
    /// Window length divided by the number of currently vacant units.
    PeriodAverage,
}

impl VacancyMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StatusSnapshot => "Status snapshot",
            Self::LatestTerminalLease => "Latest terminal lease",
            Self::TimelineReconstruction => "Timeline reconstruction",
            Self::PeriodAverage => "Period average",
        }
    }
}

/// `part / whole * 100`, or zero when `whole` is zero. Unrounded.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * dec!(100)
    }
}

/// Count-based variant of [`percentage`].
pub fn count_percentage(part: usize, whole: usize) -> Decimal {
    percentage(Decimal::from(part), Decimal::from(whole))
}

/// `numerator / denominator`, or zero when `denominator` is zero.
pub fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

pub fn daily_rent(monthly_rent: Decimal) -> Decimal {
    monthly_rent / DAYS_PER_MONTH
}

/// Modeled revenue for `days` idle days at `monthly_rent`.
pub fn loss_for_days(monthly_rent: Decimal, days: i64) -> Decimal {
    daily_rent(monthly_rent) * Decimal::from(days)
}

/// Half-up rounding to two places. Only applied when building output records.
pub fn round_output(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(OUTPUT_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}
