use std::fmt;
use std::str::FromStr;

use crate::core::AlpacaError;

/// The unit of a bar aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrameUnit {
    /// Minutes (1-59).
    Min,
    /// Hours (1-23).
    Hour,
    /// A single trading day.
    Day,
    /// A single week.
    Week,
    /// A single month.
    Month,
}

impl TimeFrameUnit {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "Min",
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
        }
    }

    const fn max_amount(self) -> u32 {
        match self {
            Self::Min => 59,
            Self::Hour => 23,
            Self::Day | Self::Week | Self::Month => 1,
        }
    }
}

/// Size of the aggregation bucket used for bars, e.g. `5Min` or `1Day`.
///
/// Values are validated on construction and immutable afterwards. The
/// `Display` rendering is what goes on the wire as the `timeframe` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeFrame {
    amount: u32,
    unit: TimeFrameUnit,
}

impl TimeFrame {
    /// One-minute bars.
    pub const ONE_MIN: Self = Self::unchecked(1, TimeFrameUnit::Min);
    /// One-hour bars.
    pub const ONE_HOUR: Self = Self::unchecked(1, TimeFrameUnit::Hour);
    /// Daily bars.
    pub const ONE_DAY: Self = Self::unchecked(1, TimeFrameUnit::Day);
    /// Weekly bars.
    pub const ONE_WEEK: Self = Self::unchecked(1, TimeFrameUnit::Week);
    /// Monthly bars.
    pub const ONE_MONTH: Self = Self::unchecked(1, TimeFrameUnit::Month);

    /// Creates a time frame, checking the amount against the unit's bounds.
    ///
    /// # Errors
    ///
    /// Returns `AlpacaError::InvalidArgument` if `amount` is zero, above 59 for
    /// minutes, above 23 for hours, or anything but 1 for days, weeks and months.
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, AlpacaError> {
        let max = unit.max_amount();
        if amount == 0 || amount > max {
            return Err(AlpacaError::invalid(format!(
                "time frame amount {amount} out of range 1..={max} for unit {}",
                unit.as_str()
            )));
        }
        Ok(Self { amount, unit })
    }

    const fn unchecked(amount: u32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    /// Number of units per bucket.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// The bucket unit.
    #[must_use]
    pub const fn unit(&self) -> TimeFrameUnit {
        self.unit
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = AlpacaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| AlpacaError::invalid(format!("time frame `{s}` has no unit")))?;
        let (digits, unit) = s.split_at(split);
        let amount: u32 = digits
            .parse()
            .map_err(|_| AlpacaError::invalid(format!("time frame `{s}` has no amount")))?;
        let unit = match unit {
            "Min" => TimeFrameUnit::Min,
            "Hour" => TimeFrameUnit::Hour,
            "Day" => TimeFrameUnit::Day,
            "Week" => TimeFrameUnit::Week,
            "Month" => TimeFrameUnit::Month,
            other => {
                return Err(AlpacaError::invalid(format!(
                    "unknown time frame unit `{other}`"
                )));
            }
        };
        Self::new(amount, unit)
    }
}
