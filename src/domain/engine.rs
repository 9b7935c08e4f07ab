//! The tiered alert engine.
//!
//! [`AlertEngine`] pairs an immutable [`TierTable`] with the only mutable
//! alerting state in the system, [`EngineState`]. Each call to
//! [`AlertEngine::evaluate`] classifies one price, decides whether an alert
//! is due, and updates budgets and timestamps before returning.
//!
//! Two independent limits apply inside a tier:
//!
//! - **cooldown**: consecutive alerts are at least `cooldown` apart
//! - **budget**: at most `budget` alerts until the tier is re-armed
//!
//! A tier is re-armed only from outside: entering the safe band re-arms the
//! table's `safe_replenishes` tier, and an exhausted tier that has stayed
//! quiet for its `stability_reset` re-arms the tier its edge points at.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use super::price::Price;
use super::tier::{Band, TierId, TierTable};

/// Per-tier budgets and alert timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    remaining: Vec<u32>,
    last_alert: Vec<Option<DateTime<Utc>>>,
}

impl EngineState {
    /// Full budgets, no alerts sent yet.
    #[must_use]
    pub fn new(table: &TierTable) -> Self {
        Self {
            remaining: table.tiers().iter().map(|t| t.budget).collect(),
            last_alert: vec![None; table.len()],
        }
    }

    /// Alerts still allowed in a tier.
    #[must_use]
    pub fn remaining(&self, tier: TierId) -> u32 {
        self.remaining.get(tier.index()).copied().unwrap_or(0)
    }

    /// Time of the last alert sent in a tier.
    #[must_use]
    pub fn last_alert(&self, tier: TierId) -> Option<DateTime<Utc>> {
        self.last_alert.get(tier.index()).copied().flatten()
    }

    /// Restore a tier's budget. Returns true if the budget changed.
    fn replenish(&mut self, table: &TierTable, tier: TierId) -> bool {
        let (Some(slot), Some(config)) = (self.remaining.get_mut(tier.index()), table.get(tier))
        else {
            return false;
        };
        let changed = *slot != config.budget;
        *slot = config.budget;
        changed
    }

    fn record_alert(&mut self, tier: TierId, at: DateTime<Utc>) -> u32 {
        let index = tier.index();
        self.remaining[index] = self.remaining[index].saturating_sub(1);
        self.last_alert[index] = Some(at);
        self.remaining[index]
    }
}

/// An alert that should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub tier: TierId,
    pub tier_name: String,
    pub price: Price,
    /// Budget left in the tier after this alert.
    pub remaining: u32,
    pub at: DateTime<Utc>,
}

/// Why no alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressReason {
    /// Price is below every alerting tier.
    SafeZone,
    /// The tier alerted too recently.
    CooldownActive,
    /// The tier has no alerts left.
    BudgetExhausted,
    /// The price mapped to a tier the table does not hold.
    Unclassified,
}

impl SuppressReason {
    /// Stable identifier for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SafeZone => "safe-zone",
            Self::CooldownActive => "cooldown-active",
            Self::BudgetExhausted => "budget-exhausted",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suppressed tick, with any budget it re-armed as a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suppression {
    pub band: Band,
    pub reason: SuppressReason,
    /// Tier whose budget this tick restored, if it changed.
    pub replenished: Option<TierId>,
}

/// Outcome of evaluating one price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Send(Alert),
    Suppress(Suppression),
}

impl Decision {
    /// True when an alert should be delivered.
    #[must_use]
    pub const fn is_send(&self) -> bool {
        matches!(self, Self::Send(_))
    }

    /// The suppression reason, if suppressed.
    #[must_use]
    pub const fn suppress_reason(&self) -> Option<SuppressReason> {
        match self {
            Self::Send(_) => None,
            Self::Suppress(s) => Some(s.reason),
        }
    }

    /// The alert, if one is due.
    #[must_use]
    pub const fn alert(&self) -> Option<&Alert> {
        match self {
            Self::Send(alert) => Some(alert),
            Self::Suppress(_) => None,
        }
    }
}

/// True if at least `span` has passed since `last`. Never alerted counts as
/// forever ago, and a clock that stepped backwards counts as no time passed.
fn quiet_for(last: Option<DateTime<Utc>>, now: DateTime<Utc>, span: Duration) -> bool {
    match last {
        None => true,
        Some(at) => (now - at).max(Duration::zero()) >= span,
    }
}

/// Single-writer alert state machine.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    table: Arc<TierTable>,
    state: EngineState,
}

impl AlertEngine {
    /// Create an engine with full budgets.
    #[must_use]
    pub fn new(table: Arc<TierTable>) -> Self {
        let state = EngineState::new(&table);
        Self { table, state }
    }

    /// The alerting policy.
    #[must_use]
    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// Current budgets and timestamps.
    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Classify `price` and decide whether to alert at `now`.
    ///
    /// The state is fully updated before this returns. The caller delivers
    /// any alert; the engine never waits on delivery.
    pub fn evaluate(&mut self, price: Price, now: DateTime<Utc>) -> Decision {
        let tier_id = match self.table.classify(price) {
            Band::Safe => return self.enter_safe_zone(price),
            Band::Tier(id) => id,
        };
        let Some(tier) = self.table.get(tier_id) else {
            // classify only returns ids from the table
            error!(%price, tier = %tier_id, "Price classified into unknown tier");
            return Decision::Suppress(Suppression {
                band: Band::Tier(tier_id),
                reason: SuppressReason::Unclassified,
                replenished: None,
            });
        };

        let remaining = self.state.remaining(tier_id);
        let last_alert = self.state.last_alert(tier_id);

        if remaining > 0 {
            if quiet_for(last_alert, now, tier.cooldown) {
                let remaining = self.state.record_alert(tier_id, now);
                info!(
                    tier = %tier.name,
                    %price,
                    remaining,
                    "Price entered alert tier, raising alert"
                );
                return Decision::Send(Alert {
                    tier: tier_id,
                    tier_name: tier.name.clone(),
                    price,
                    remaining,
                    at: now,
                });
            }

            warn!(tier = %tier.name, %price, "Last alert too recent, skipping");
            return Decision::Suppress(Suppression {
                band: Band::Tier(tier_id),
                reason: SuppressReason::CooldownActive,
                replenished: None,
            });
        }

        debug!(tier = %tier.name, %price, "Alert budget exhausted, price stable in tier");
        let mut replenished = None;
        if let (Some(after), Some(target)) = (tier.stability_reset, tier.replenishes) {
            if quiet_for(last_alert, now, after) && self.state.replenish(&self.table, target) {
                let target_name = self.table.get(target).map_or("", |t| t.name.as_str());
                info!(
                    tier = %tier.name,
                    replenished = %target_name,
                    "Tier stable long enough, re-arming next tier"
                );
                replenished = Some(target);
            }
        }

        Decision::Suppress(Suppression {
            band: Band::Tier(tier_id),
            reason: SuppressReason::BudgetExhausted,
            replenished,
        })
    }

    fn enter_safe_zone(&mut self, price: Price) -> Decision {
        let mut replenished = None;
        if let Some(target) = self.table.safe_replenishes() {
            if self.state.replenish(&self.table, target) {
                let target_name = self.table.get(target).map_or("", |t| t.name.as_str());
                info!(%price, replenished = %target_name, "Price back in safe zone, re-arming tier");
                replenished = Some(target);
            } else {
                debug!(%price, "Price in safe zone");
            }
        }
        Decision::Suppress(Suppression {
            band: Band::Safe,
            reason: SuppressReason::SafeZone,
            replenished,
        })
    }
}
