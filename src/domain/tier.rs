//! Price tiers and the tier classifier.
//!
//! A [`TierTable`] is the immutable alerting policy: an ordered list of
//! tiers, each defined only by its inclusive lower bound. A tier's upper
//! bound is the next tier's lower bound, and the top tier is unbounded. Prices
//! below the first tier fall into the safe band. Because bounds are derived
//! rather than declared, the table partitions the positive price line with
//! no gaps or overlaps by construction.
//!
//! ```text
//!   0 ── safe ──┤ tier 0 ├── tier 1 ──┤── tier 2 ── … ──▶
//!             b0        b1            b2
//! ```

use std::collections::HashSet;
use std::fmt;

use chrono::Duration;
use rust_decimal_macros::dec;

use super::error::TierTableError;
use super::price::Price;

/// Index of an alerting tier within its [`TierTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TierId(pub usize);

impl TierId {
    /// Position of the tier in the table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The band a price falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    /// Below every alerting tier.
    Safe,
    /// Inside an alerting tier.
    Tier(TierId),
}

impl Band {
    /// The tier, unless this is the safe band.
    #[must_use]
    pub const fn tier(self) -> Option<TierId> {
        match self {
            Self::Safe => None,
            Self::Tier(id) => Some(id),
        }
    }
}

/// One alerting price band with its own budget and cooldown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    /// Human-readable name used in logs and notifications.
    pub name: String,
    /// Inclusive lower bound of the band.
    pub lower_bound: Price,
    /// Alerts allowed before the tier falls silent.
    pub budget: u32,
    /// Minimum spacing between two alerts in this tier.
    pub cooldown: Duration,
    /// Quiet period after the last alert, with the budget exhausted, after
    /// which [`replenishes`](Self::replenishes) gets its budget back.
    pub stability_reset: Option<Duration>,
    /// Declared replenishment edge. Always a higher tier.
    pub replenishes: Option<TierId>,
}

impl Tier {
    /// Create a tier without a stability reset.
    pub fn new(name: impl Into<String>, lower_bound: Price, budget: u32, cooldown: Duration) -> Self {
        Self {
            name: name.into(),
            lower_bound,
            budget,
            cooldown,
            stability_reset: None,
            replenishes: None,
        }
    }

    /// Declare that `target`'s budget is refilled once this tier has been
    /// exhausted and quiet for `after`.
    #[must_use]
    pub fn with_stability_reset(mut self, after: Duration, target: TierId) -> Self {
        self.stability_reset = Some(after);
        self.replenishes = Some(target);
        self
    }
}

/// Immutable tier configuration shared by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<Tier>,
    safe_replenishes: Option<TierId>,
}

impl TierTable {
    /// Validate and build a tier table.
    ///
    /// `safe_replenishes` is the tier whose budget is restored every time
    /// price re-enters the safe band.
    ///
    /// # Errors
    ///
    /// Returns a [`TierTableError`] if the table is empty, bounds are not
    /// strictly increasing, names repeat, or an edge does not point to a
    /// higher existing tier.
    pub fn new(tiers: Vec<Tier>, safe_replenishes: Option<TierId>) -> Result<Self, TierTableError> {
        if tiers.is_empty() {
            return Err(TierTableError::Empty);
        }

        let mut names = HashSet::new();
        for (index, tier) in tiers.iter().enumerate() {
            if !names.insert(tier.name.as_str()) {
                return Err(TierTableError::DuplicateName {
                    name: tier.name.clone(),
                });
            }
            if index > 0 {
                let previous = tiers[index - 1].lower_bound;
                if tier.lower_bound <= previous {
                    return Err(TierTableError::UnorderedBounds {
                        name: tier.name.clone(),
                        lower_bound: tier.lower_bound.value(),
                        previous: previous.value(),
                    });
                }
            }
            if let Some(target) = tier.replenishes {
                let reason = if target.index() >= tiers.len() {
                    Some("no such tier")
                } else if target.index() <= index {
                    Some("target must be a higher tier")
                } else if tier.stability_reset.is_none() {
                    Some("edge requires a stability reset duration")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(TierTableError::InvalidEdge {
                        from: tier.name.clone(),
                        to: target.to_string(),
                        reason,
                    });
                }
            }
        }

        if let Some(target) = safe_replenishes {
            if target.index() >= tiers.len() {
                return Err(TierTableError::InvalidEdge {
                    from: "safe".into(),
                    to: target.to_string(),
                    reason: "no such tier",
                });
            }
        }

        Ok(Self {
            tiers,
            safe_replenishes,
        })
    }

    /// The three-band policy the monitor ships with.
    ///
    /// `[0.9, 1.8)`, `[1.8, 2.7)` and `[2.7, ∞)`, three alerts each, 9 s
    /// apart. Twenty cooldowns of quiet in level1 re-arm level2, forty in
    /// level2 re-arm level3, and dropping below 0.9 re-arms level1.
    #[must_use]
    pub fn standard() -> Self {
        let cooldown = Duration::milliseconds(9_000);
        let bound = Price::new_unchecked;
        let tiers = vec![
            Tier::new("level1", bound(dec!(0.9)), 3, cooldown)
                .with_stability_reset(cooldown * 20, TierId(1)),
            Tier::new("level2", bound(dec!(1.8)), 3, cooldown)
                .with_stability_reset(cooldown * 40, TierId(2)),
            Tier::new("level3", bound(dec!(2.7)), 3, cooldown),
        ];
        Self {
            tiers,
            safe_replenishes: Some(TierId(0)),
        }
    }

    /// Return the band containing `price`.
    ///
    /// Lower bounds are inclusive: a price exactly on a boundary belongs to
    /// the band that starts there.
    #[must_use]
    pub fn classify(&self, price: Price) -> Band {
        // Number of tiers whose lower bound is at or below the price.
        let crossed = self.tiers.partition_point(|tier| tier.lower_bound <= price);
        match crossed {
            0 => Band::Safe,
            n => Band::Tier(TierId(n - 1)),
        }
    }

    /// Look up a tier.
    #[must_use]
    pub fn get(&self, id: TierId) -> Option<&Tier> {
        self.tiers.get(id.index())
    }

    /// Look up a tier by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TierId> {
        self.tiers.iter().position(|t| t.name == name).map(TierId)
    }

    /// Upper bound of a tier (exclusive), `None` for the top tier.
    #[must_use]
    pub fn upper_bound(&self, id: TierId) -> Option<Price> {
        self.tiers.get(id.index() + 1).map(|t| t.lower_bound)
    }

    /// Tier re-armed when price enters the safe band.
    #[must_use]
    pub const fn safe_replenishes(&self) -> Option<TierId> {
        self.safe_replenishes
    }

    /// All tiers in ascending order.
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Number of alerting tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always false for a validated table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
