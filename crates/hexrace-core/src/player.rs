//! Player state and the status-effect debt engine.
//!
//! This module contains:
//! - `EffectKind` and the debt each effect starts with
//! - `StatusEffects`, the set of active effects keyed by kind
//! - `PlayerState`, which owns position, currency and all puzzle progress
//! - Debt settlement for a study event, including proportional memory
//!   restoration while disoriented

use crate::actions::{GameEvent, StudyEvent};
use crate::hex::HexCoord;
use crate::objectives::{RuinState, WagerState};
use crate::world::HexWorld;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Freeze debt only drops for answers faster than this
pub const FREEZE_FAST_ANSWER_MS: u64 = 5_000;

/// A failed answer while buried adds this much debt
pub const RUBBLE_PENALTY: u32 = 5;

/// Study times remembered for pace tracking
const PACE_WINDOW: usize = 5;

/// Mean study time below which the pace counts as fast
const FAST_PACE_MS: u64 = 8_000;

/// Status effects a player can suffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Tundra frostbite; only fast answers thaw it
    Frozen,
    /// Caught in an opponent's trap
    Trapped,
    /// Wasteland rockslide; wrong answers pile on rubble
    Buried,
    /// Volcanic burns
    Burning,
    /// Dune sandstorm; vision collapses and the map is forgotten
    Disoriented,
    /// Scaling a mountain
    Climbing,
}

impl EffectKind {
    /// All effect kinds
    pub const ALL: [EffectKind; 6] = [
        EffectKind::Frozen,
        EffectKind::Trapped,
        EffectKind::Buried,
        EffectKind::Burning,
        EffectKind::Disoriented,
        EffectKind::Climbing,
    ];

    /// Debt armed when the effect strikes
    pub const fn initial_debt(self) -> u32 {
        match self {
            EffectKind::Frozen => 150,
            EffectKind::Trapped => 100,
            EffectKind::Buried => 100,
            EffectKind::Burning => 200,
            EffectKind::Disoriented => 300,
            EffectKind::Climbing => 100,
        }
    }

    /// Whether the effect prevents all movement
    pub const fn immobilizes(self) -> bool {
        !matches!(self, EffectKind::Disoriented)
    }
}

/// One active effect and what is left to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub debt_remaining: u32,
}

/// Active effects keyed by kind. An effect is active exactly while its
/// debt is above zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffects {
    debts: BTreeMap<EffectKind, u32>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an effect with its standard debt; returns the debt now owed
    pub fn arm(&mut self, kind: EffectKind) -> u32 {
        self.arm_with(kind, kind.initial_debt())
    }

    /// Arm an effect with a specific debt, never lowering an existing one
    pub fn arm_with(&mut self, kind: EffectKind, debt: u32) -> u32 {
        if debt == 0 {
            return self.debt(kind);
        }
        let entry = self.debts.entry(kind).or_insert(0);
        *entry = (*entry).max(debt);
        *entry
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.debts.contains_key(&kind)
    }

    /// Remaining debt, zero when inactive
    pub fn debt(&self, kind: EffectKind) -> u32 {
        self.debts.get(&kind).copied().unwrap_or(0)
    }

    /// Pay down an active effect. Returns the remaining debt, or `None` if the
    /// effect was not active. The effect is removed when the debt hits zero.
    pub fn pay(&mut self, kind: EffectKind, amount: u32) -> Option<u32> {
        let debt = self.debts.get_mut(&kind)?;
        *debt = debt.saturating_sub(amount);
        let remaining = *debt;
        if remaining == 0 {
            self.debts.remove(&kind);
        }
        Some(remaining)
    }

    /// Increase the debt of an active effect; returns the new debt
    pub fn add(&mut self, kind: EffectKind, amount: u32) -> Option<u32> {
        let debt = self.debts.get_mut(&kind)?;
        *debt += amount;
        Some(*debt)
    }

    pub fn clear(&mut self, kind: EffectKind) {
        self.debts.remove(&kind);
    }

    /// The first active effect that prevents movement
    pub fn blocking(&self) -> Option<EffectKind> {
        self.debts.keys().copied().find(|k| k.immobilizes())
    }

    /// Active effects in kind order
    pub fn iter(&self) -> impl Iterator<Item = StatusEffect> + '_ {
        self.debts.iter().map(|(&kind, &debt_remaining)| StatusEffect {
            kind,
            debt_remaining,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }
}

/// Fog state of a tile remembered while disoriented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySnapshot {
    #[serde(alias = "vis")]
    pub was_visible: bool,
    #[serde(alias = "vst")]
    pub was_visited: bool,
}

/// Tiles hidden by a sandstorm, waiting to be restored
pub type LostMemory = BTreeMap<HexCoord, MemorySnapshot>;

/// Everything a player owns during one match.
///
/// Persisted through [`crate::save::SaveRecord`], which flattens it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: HexCoord,
    pub currency: u32,
    pub has_key: bool,
    pub effects: StatusEffects,
    /// Consecutive tundra tiles entered
    pub cold_stacks: u32,
    /// Elapsed time of the most recent study events, newest last
    pub recent_study_ms: VecDeque<u64>,
    pub ruin: RuinState,
    pub wager: WagerState,
    /// Pinged key/exit locations
    pub radar_targets: Vec<HexCoord>,
    pub lost_memory: LostMemory,
    /// A flare revealed the opponent for the rest of the match
    pub opponent_visible: bool,
}

impl PlayerState {
    /// A fresh player at the origin with no currency and no effects
    pub fn new() -> Self {
        Self {
            position: HexCoord::ORIGIN,
            currency: 0,
            has_key: false,
            effects: StatusEffects::new(),
            cold_stacks: 0,
            recent_study_ms: VecDeque::with_capacity(PACE_WINDOW),
            ruin: RuinState::default(),
            wager: WagerState::default(),
            radar_targets: Vec::new(),
            lost_memory: LostMemory::new(),
            opponent_visible: false,
        }
    }

    /// Check if the player can pay a cost
    pub fn can_afford(&self, cost: u32) -> bool {
        self.currency >= cost
    }

    /// Deduct a cost, returning false (and changing nothing) if unaffordable
    pub fn try_spend(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.currency -= cost;
        true
    }

    pub fn credit(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Remember how long a study event took
    pub fn record_study_time(&mut self, elapsed_ms: u64) {
        if self.recent_study_ms.len() == PACE_WINDOW {
            self.recent_study_ms.pop_front();
        }
        self.recent_study_ms.push_back(elapsed_ms);
    }

    /// Whether recent study events have been answered quickly
    pub fn is_fast_pace(&self) -> bool {
        if self.recent_study_ms.is_empty() {
            return false;
        }
        let total: u64 = self.recent_study_ms.iter().sum();
        total / (self.recent_study_ms.len() as u64) < FAST_PACE_MS
    }

    pub fn is_disoriented(&self) -> bool {
        self.effects.is_active(EffectKind::Disoriented)
    }

    pub fn is_climbing(&self) -> bool {
        self.effects.is_active(EffectKind::Climbing)
    }

    /// Arm an effect and report it
    pub(crate) fn arm_effect(&mut self, kind: EffectKind, events: &mut Vec<GameEvent>) {
        let debt = self.effects.arm(kind);
        events.push(GameEvent::EffectArmed { effect: kind, debt });
    }

    /// Snapshot and hide every tile except `keep`, arming nothing.
    /// Returns how many tiles were hidden.
    pub(crate) fn forget_map(&mut self, world: &mut HexWorld, keep: &[HexCoord]) -> usize {
        let coords: Vec<HexCoord> = world.coords().filter(|c| !keep.contains(c)).collect();
        for coord in &coords {
            if let Some(tile) = world.get_tile_mut(coord) {
                self.lost_memory.insert(
                    *coord,
                    MemorySnapshot {
                        was_visible: tile.visible,
                        was_visited: tile.visited,
                    },
                );
                tile.visible = false;
                tile.visited = false;
            }
        }
        coords.len()
    }

    /// Settle every effect debt for one study event.
    ///
    /// Runs in a fixed order: freeze, trap/climb/burn, rockslide, sandstorm.
    pub fn settle_debts(&mut self, world: &mut HexWorld, study: StudyEvent) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if study.elapsed_ms < FREEZE_FAST_ANSWER_MS {
            self.pay_one(EffectKind::Frozen, &mut events);
        }

        for kind in [EffectKind::Trapped, EffectKind::Climbing, EffectKind::Burning] {
            self.pay_one(kind, &mut events);
        }

        if self.effects.is_active(EffectKind::Buried) {
            if study.is_passing() {
                self.pay_one(EffectKind::Buried, &mut events);
            } else if let Some(debt) = self.effects.add(EffectKind::Buried, RUBBLE_PENALTY) {
                events.push(GameEvent::DebtIncreased {
                    effect: EffectKind::Buried,
                    debt,
                });
            }
        }

        if self.effects.is_active(EffectKind::Disoriented) {
            self.pay_one(EffectKind::Disoriented, &mut events);
        }
        if !self.lost_memory.is_empty() {
            let remaining_debt = self.effects.debt(EffectKind::Disoriented);
            let restored = self.restore_memory(world, remaining_debt);
            events.push(GameEvent::MemoryRestored {
                tiles: restored,
                remaining: self.lost_memory.len(),
            });
        }

        events
    }

    fn pay_one(&mut self, kind: EffectKind, events: &mut Vec<GameEvent>) {
        if self.effects.pay(kind, 1) == Some(0) {
            events.push(GameEvent::EffectCleared { effect: kind });
        }
    }

    /// Restore a batch of forgotten tiles sized `ceil(lost / remaining_debt)`,
    /// or everything once the debt is gone. Returns how many were restored.
    pub(crate) fn restore_memory(&mut self, world: &mut HexWorld, remaining_debt: u32) -> usize {
        let lost = self.lost_memory.len();
        let batch = if remaining_debt == 0 {
            lost
        } else {
            lost.div_ceil(remaining_debt as usize).max(1)
        };

        let coords: Vec<HexCoord> = self.lost_memory.keys().take(batch).copied().collect();
        for coord in &coords {
            if let Some(snapshot) = self.lost_memory.remove(coord) {
                if let Some(tile) = world.get_tile_mut(coord) {
                    // Anything seen since the storm stays seen
                    tile.visible |= snapshot.was_visible;
                    tile.visited |= snapshot.was_visited;
                }
            }
        }
        coords.len()
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}
