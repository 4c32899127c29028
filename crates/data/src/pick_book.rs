//! In-memory book of picks, settlements and the shared bankroll.
//!
//! The two mutable resources are serialized separately:
//! - each pick sits behind its own mutex, so settling the same pick twice
//!   from different threads applies profit and releases exposure once;
//! - the bankroll sits behind a single mutex, taken after a pick lock
//!   (settle) or after the entries write lock (record).
//!
//! Settling an already settled pick is a read: the stored settlement is
//! returned unchanged.

use betedge_core::{
    pick, BankrollState, EngineError, GameResult, MarketLine, Pick, PickReason, Result,
    Settlement, SkipReason,
};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug)]
struct PickEntry {
    pick: Pick,
    settlement: Option<Settlement>,
}

type Slot = Arc<Mutex<PickEntry>>;

/// Thread-safe store of evaluated picks and their settlements.
#[derive(Debug)]
pub struct PickBook {
    entries: RwLock<HashMap<Uuid, Slot>>,
    bankroll: Mutex<BankrollState>,
}

impl PickBook {
    #[must_use]
    pub fn new(bankroll: BankrollState) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            bankroll: Mutex::new(bankroll),
        }
    }

    /// Current bankroll snapshot.
    #[must_use]
    pub fn bankroll(&self) -> BankrollState {
        self.bankroll.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Stores a pick and, for a BET, places its stake against the bankroll.
    ///
    /// The daily exposure limit is re-checked under the bankroll lock; a bet
    /// that no longer fits is stored as a PASS. Recording an id that already
    /// exists returns the stored pick unchanged.
    ///
    /// Holds the entries write lock throughout; takes the bankroll after it.
    pub fn record(&self, mut pick: Pick) -> Pick {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&pick.id) {
            tracing::warn!(pick_id = %pick.id, "Pick already recorded, ignoring");
            return existing.lock().pick.clone();
        }

        if pick.is_bet() {
            let mut bankroll = self.bankroll.lock();
            match bankroll.with_stake_placed(pick.stake_amount) {
                Ok(next) => {
                    *bankroll = next;
                    tracing::info!(
                        pick_id = %pick.id,
                        game_id = %pick.game_id,
                        selection = %pick.selection,
                        stake = %pick.stake_amount,
                        active_exposure = %bankroll.active_exposure,
                        "Placed stake"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        pick_id = %pick.id,
                        stake = %pick.stake_amount,
                        error = %err,
                        "Stake no longer fits daily exposure, passing pick"
                    );
                    pick.demote(PickReason::RiskSkip(SkipReason::ExceedsDailyLimit));
                }
            }
        }

        entries.insert(
            pick.id,
            Arc::new(Mutex::new(PickEntry {
                pick: pick.clone(),
                settlement: None,
            })),
        );
        pick
    }

    /// Records picks in order; later bets see the exposure of earlier ones.
    pub fn record_all(&self, picks: impl IntoIterator<Item = Pick>) -> Vec<Pick> {
        picks.into_iter().map(|p| self.record(p)).collect()
    }

    /// Reloads a pick exactly as it was recorded.
    ///
    /// Decision and stake are kept; a pending BET adds its stake back to
    /// active exposure without the daily-limit check, since the bet was
    /// already placed. Restoring an id that already exists returns the stored
    /// pick unchanged.
    pub fn restore(&self, pick: Pick) -> Pick {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&pick.id) {
            tracing::warn!(pick_id = %pick.id, "Pick already recorded, ignoring");
            return existing.lock().pick.clone();
        }

        if pick.is_bet() && !pick.status.is_terminal() {
            let mut bankroll = self.bankroll.lock();
            *bankroll = bankroll.with_exposure_restored(pick.stake_amount);
            tracing::debug!(
                pick_id = %pick.id,
                stake = %pick.stake_amount,
                active_exposure = %bankroll.active_exposure,
                "Restored stake"
            );
        }

        entries.insert(
            pick.id,
            Arc::new(Mutex::new(PickEntry {
                pick: pick.clone(),
                settlement: None,
            })),
        );
        pick
    }

    /// Restores picks in order.
    pub fn restore_all(&self, picks: impl IntoIterator<Item = Pick>) -> Vec<Pick> {
        picks.into_iter().map(|p| self.restore(p)).collect()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Pick> {
        self.slot(id).map(|slot| slot.lock().pick.clone())
    }

    #[must_use]
    pub fn settlement(&self, id: Uuid) -> Option<Settlement> {
        self.slot(id).and_then(|slot| slot.lock().settlement.clone())
    }

    /// Settles a pick exactly once.
    ///
    /// A repeat call returns the stored settlement without touching the
    /// bankroll. Without a closing line CLV stays empty; profit is still
    /// graded.
    ///
    /// # Errors
    /// Returns `UnknownPick` for an id that was never recorded and
    /// `InvalidOdds` for an invalid closing price. Neither has side effects.
    pub fn settle(
        &self,
        id: Uuid,
        result: GameResult,
        closing: Option<&MarketLine>,
        settled_at: DateTime<Utc>,
    ) -> Result<Settlement> {
        let slot = self.slot(id).ok_or(EngineError::UnknownPick(id))?;
        let mut entry = slot.lock();

        if let Some(existing) = &entry.settlement {
            tracing::warn!(
                pick_id = %id,
                status = entry.pick.status.as_str(),
                "Pick already settled, returning existing settlement"
            );
            return Ok(existing.clone());
        }

        let settlement = Settlement::grade(&entry.pick, result, closing, settled_at)?;
        entry.pick.transition(settlement.result)?;

        if entry.pick.is_bet() {
            let mut bankroll = self.bankroll.lock();
            *bankroll = bankroll.with_settlement(settlement.stake, settlement.profit);
        }

        tracing::info!(
            pick_id = %id,
            result = settlement.result.as_str(),
            profit = %settlement.profit,
            clv = ?settlement.clv,
            "Settled pick"
        );

        entry.settlement = Some(settlement.clone());
        Ok(settlement)
    }

    /// All picks ordered by evaluation time.
    #[must_use]
    pub fn picks(&self) -> Vec<Pick> {
        let mut picks: Vec<Pick> = self
            .entries
            .read()
            .values()
            .map(|slot| slot.lock().pick.clone())
            .collect();
        picks.sort_by(|a, b| a.evaluated_at.cmp(&b.evaluated_at).then(a.id.cmp(&b.id)));
        picks
    }

    /// Every pick evaluated on `date` (UTC), pending or settled.
    #[must_use]
    pub fn picks_on(&self, date: NaiveDate) -> Vec<Pick> {
        self.picks()
            .into_iter()
            .filter(|p| p.evaluated_at.date_naive() == date)
            .collect()
    }

    /// Pending BET picks ranked by EV then edge.
    #[must_use]
    pub fn value_board(&self) -> Vec<Pick> {
        let pending: Vec<Pick> = self
            .picks()
            .into_iter()
            .filter(|p| !p.status.is_terminal())
            .collect();
        pick::value_board(&pending).into_iter().cloned().collect()
    }

    /// All settlements ordered by settlement time.
    #[must_use]
    pub fn settlements(&self) -> Vec<Settlement> {
        let mut settlements: Vec<Settlement> = self
            .entries
            .read()
            .values()
            .filter_map(|slot| slot.lock().settlement.clone())
            .collect();
        settlements.sort_by(|a, b| {
            a.settled_at
                .cmp(&b.settled_at)
                .then(a.pick_id.cmp(&b.pick_id))
        });
        settlements
    }

    fn slot(&self, id: Uuid) -> Option<Slot> {
        self.entries.read().get(&id).cloned()
    }
}
