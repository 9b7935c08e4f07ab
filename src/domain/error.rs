//! Domain validation errors.
//!
//! These errors are returned by the validating constructors of the domain
//! types ([`Price::parse`](super::price::Price::parse),
//! [`TierTable::new`](super::tier::TierTable::new)). The alert engine itself
//! never fails: anything that reaches it has already been validated.
//!
//! # Examples
//!
//! ```
//! use tierwatch::domain::error::PriceError;
//! use tierwatch::domain::price::Price;
//!
//! assert!(matches!(Price::parse("NaN"), Err(PriceError::Unparseable { .. })));
//! assert!(matches!(Price::parse("-1"), Err(PriceError::NonPositive { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// A price that cannot be fed to the alert engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The raw value is not a finite decimal number.
    #[error("price is not a number: {raw:?}")]
    Unparseable {
        /// The raw text received from the stream.
        raw: String,
    },

    /// Prices must be strictly positive.
    #[error("price must be positive, got {price}")]
    NonPositive {
        /// The rejected value.
        price: Decimal,
    },

    /// A negative value outside the representable decimal range.
    #[error("price is out of range: {raw:?}")]
    OutOfRange {
        /// The raw text received from the stream.
        raw: String,
    },
}

/// A tier table that does not partition the positive price line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TierTableError {
    /// At least one alerting tier is required.
    #[error("tier table must contain at least one tier")]
    Empty,

    /// Lower bounds must be strictly increasing.
    #[error("tier {name} lower bound {lower_bound} must be greater than {previous}")]
    UnorderedBounds {
        /// Offending tier.
        name: String,
        /// Its lower bound.
        lower_bound: Decimal,
        /// Lower bound of the tier before it.
        previous: Decimal,
    },

    /// Tier names identify replenishment edges and must be unique.
    #[error("duplicate tier name: {name}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// A replenishment edge must point at an existing, strictly higher tier.
    #[error("tier {from} cannot replenish {to}: {reason}")]
    InvalidEdge {
        /// Source of the edge (`safe` for the safe zone).
        from: String,
        /// Target of the edge.
        to: String,
        /// Why the edge was rejected.
        reason: &'static str,
    },
}
