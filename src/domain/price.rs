//! Validated prices and price ticks.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::PriceError;

/// A strictly positive instrument price.
///
/// Prices are exact decimals so that a configured boundary such as `0.9`
/// compares equal to a streamed `"0.9"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Smallest positive price representable.
    pub const MIN_POSITIVE: Self = Self(Decimal::from_parts(1, 0, 0, false, 28));

    /// Validate a numeric price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NonPositive`] for zero or negative values.
    pub fn try_new(value: Decimal) -> Result<Self, PriceError> {
        if value <= Decimal::ZERO {
            return Err(PriceError::NonPositive { price: value });
        }
        Ok(Self(value))
    }

    /// Parse a price from the textual form used by market-data feeds.
    ///
    /// Scientific notation is accepted. `NaN`, infinities and anything else
    /// that is not a finite decimal are rejected.
    ///
    /// Positive values outside the decimal range are clamped: anything below
    /// [`Price::MIN_POSITIVE`] becomes that value and anything above
    /// `Decimal::MAX` becomes `Decimal::MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Unparseable`], [`PriceError::NonPositive`] or,
    /// for a negative value the decimal range cannot hold,
    /// [`PriceError::OutOfRange`].
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let trimmed = raw.trim();
        match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
            // A zero may be a tiny positive input rounded away.
            Ok(value) if !value.is_zero() => Self::try_new(value),
            _ => Self::parse_out_of_range(raw, trimmed),
        }
    }

    fn parse_out_of_range(raw: &str, trimmed: &str) -> Result<Self, PriceError> {
        let value = trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| PriceError::Unparseable {
                raw: raw.to_string(),
            })?;

        if value == 0.0 {
            return Err(PriceError::NonPositive {
                price: Decimal::ZERO,
            });
        }
        if value < 0.0 {
            return Err(PriceError::OutOfRange {
                raw: raw.to_string(),
            });
        }

        if let Some(exact) = Decimal::from_f64(value).filter(|d| !d.is_zero()) {
            return Self::try_new(exact);
        }

        let clamped = if value < 1.0 {
            Self::MIN_POSITIVE
        } else {
            Self(Decimal::MAX)
        };
        debug!(raw, price = %clamped, "Clamped out-of-range price");
        Ok(clamped)
    }

    /// Wrap a value known to be positive, such as a compile-time constant.
    pub(crate) const fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A price observation exactly as delivered by a stream, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTick {
    /// Instrument symbol as reported by the venue.
    pub symbol: String,
    /// Unparsed price text.
    pub price: String,
    /// Venue event time, if the feed provides one.
    pub event_time: Option<DateTime<Utc>>,
}

impl RawTick {
    /// Create a raw tick without an event time.
    pub fn new(symbol: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: price.into(),
            event_time: None,
        }
    }

    /// Attach the venue event time.
    #[must_use]
    pub fn with_event_time(mut self, event_time: DateTime<Utc>) -> Self {
        self.event_time = Some(event_time);
        self
    }

    /// Validate the price, producing a [`Tick`].
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] when the price is malformed or not positive.
    pub fn validate(&self) -> Result<Tick, PriceError> {
        Ok(Tick {
            symbol: self.symbol.clone(),
            price: Price::parse(&self.price)?,
            event_time: self.event_time,
        })
    }
}

/// A validated price observation for the monitored instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub symbol: String,
    pub price: Price,
    /// Venue event time. Used for ordering only, never for cooldown math.
    pub event_time: Option<DateTime<Utc>>,
}
