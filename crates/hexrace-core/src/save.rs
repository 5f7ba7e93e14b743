//! Versioned save record.
//!
//! The record is a flat JSON document holding the player identity, lifetime
//! stats and, while a match runs, the whole expedition. Reading accepts every
//! older layout and migrates it; writing always produces the current one.

use crate::game::Expedition;
use crate::hex::HexCoord;
use crate::objectives::{RuinState, WagerState};
use crate::player::{EffectKind, LostMemory, MemorySnapshot, PlayerState, StatusEffects};
use crate::sync::WinLoss;
use crate::world::{HexWorld, WorldRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

/// Layout written by this version
pub const SAVE_VERSION: u32 = 2;

/// Layout assumed when a record carries no version
const LEGACY_VERSION: u32 = 1;

/// Errors that can occur when decoding a save record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("Save record has no uid")]
    MissingUid,

    #[error("Malformed save record: {0}")]
    Malformed(String),

    #[error("Unsupported save version {0}")]
    UnsupportedVersion(u32),

    #[error("Could not encode save record: {0}")]
    Encode(String),
}

/// Player identity and lifetime record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub uid: String,
    pub username: String,
    pub stats: WinLoss,
}

/// The current save layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRecord {
    pub version: u32,
    pub uid: String,
    pub username: String,
    pub currency: u32,
    pub world: Option<WorldRecord>,
    pub pos_q: i32,
    pub pos_r: i32,
    pub has_key: bool,
    pub freeze_debt: u32,
    pub is_frozen: bool,
    pub trap_debt: u32,
    pub is_trapped: bool,
    pub rock_debt: u32,
    pub is_buried: bool,
    pub burn_debt: u32,
    pub is_burning: bool,
    pub disorient_debt: u32,
    pub is_disoriented: bool,
    pub climb_debt: u32,
    pub is_climbing: bool,
    pub cold_stacks: u32,
    pub recent_study_ms: Vec<u64>,
    pub ruin_active: bool,
    pub ruin_progress: u32,
    pub current_ruin_location: Option<HexCoord>,
    pub completed_ruins: Vec<HexCoord>,
    pub radar_targets: Vec<HexCoord>,
    /// Keyed by `"q,r"`
    pub lost_memory: BTreeMap<String, MemorySnapshot>,
    pub opponent_visible: bool,
    pub wager_active: bool,
    pub wager_progress: u32,
    pub wager_correct: u32,
    pub stats: WinLoss,
    /// Seed of the match in progress
    pub match_seed: Option<u64>,
}

/// `lost_memory` as found on disk
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum LostMemoryWire {
    Map(BTreeMap<String, MemorySnapshot>),
    /// `["q,r", ...]`, every listed tile had been walked
    Legacy(Vec<String>),
}

impl Default for LostMemoryWire {
    fn default() -> Self {
        LostMemoryWire::Map(BTreeMap::new())
    }
}

impl LostMemoryWire {
    fn into_map(self) -> BTreeMap<String, MemorySnapshot> {
        match self {
            LostMemoryWire::Map(map) => map,
            LostMemoryWire::Legacy(keys) => keys
                .into_iter()
                .map(|key| {
                    (
                        key,
                        MemorySnapshot {
                            was_visible: false,
                            was_visited: true,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Any layout ever written; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSaveRecord {
    version: Option<u32>,
    uid: Option<String>,
    username: Option<String>,
    currency: u32,
    world: Option<WorldRecord>,
    /// Older layouts store the position as `[q, r]`
    player_pos: Option<(i32, i32)>,
    pos_q: i32,
    pos_r: i32,
    has_key: bool,
    freeze_debt: u32,
    is_frozen: bool,
    trap_debt: u32,
    is_trapped: bool,
    rock_debt: u32,
    is_buried: bool,
    burn_debt: u32,
    #[serde(alias = "is_burned")]
    is_burning: bool,
    #[serde(alias = "disorientation_debt")]
    disorient_debt: u32,
    is_disoriented: bool,
    climb_debt: u32,
    is_climbing: bool,
    cold_stacks: u32,
    recent_study_ms: Vec<u64>,
    ruin_active: bool,
    ruin_progress: u32,
    current_ruin_location: Option<HexCoord>,
    completed_ruins: Vec<HexCoord>,
    radar_targets: Vec<HexCoord>,
    lost_memory: LostMemoryWire,
    opponent_visible: bool,
    wager_active: bool,
    wager_progress: u32,
    wager_correct: u32,
    stats: WinLoss,
    match_seed: Option<u64>,
}

/// Legacy records sometimes carry an effect flag without its debt
fn migrate_debt(debt: u32, flag: bool, kind: EffectKind) -> u32 {
    if debt == 0 && flag {
        kind.initial_debt()
    } else {
        debt
    }
}

impl RawSaveRecord {
    fn migrate(self) -> Result<SaveRecord, SaveError> {
        let version = self.version.unwrap_or(LEGACY_VERSION);
        if version > SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(version));
        }
        let uid = self
            .uid
            .filter(|uid| !uid.trim().is_empty())
            .ok_or(SaveError::MissingUid)?;

        let freeze_debt = migrate_debt(self.freeze_debt, self.is_frozen, EffectKind::Frozen);
        let trap_debt = migrate_debt(self.trap_debt, self.is_trapped, EffectKind::Trapped);
        let rock_debt = migrate_debt(self.rock_debt, self.is_buried, EffectKind::Buried);
        let burn_debt = migrate_debt(self.burn_debt, self.is_burning, EffectKind::Burning);
        let disorient_debt =
            migrate_debt(self.disorient_debt, self.is_disoriented, EffectKind::Disoriented);
        let climb_debt = migrate_debt(self.climb_debt, self.is_climbing, EffectKind::Climbing);
        let (pos_q, pos_r) = self.player_pos.unwrap_or((self.pos_q, self.pos_r));

        Ok(SaveRecord {
            version: SAVE_VERSION,
            uid,
            username: self.username.unwrap_or_default(),
            currency: self.currency,
            world: self.world,
            pos_q,
            pos_r,
            has_key: self.has_key,
            freeze_debt,
            is_frozen: freeze_debt > 0,
            trap_debt,
            is_trapped: trap_debt > 0,
            rock_debt,
            is_buried: rock_debt > 0,
            burn_debt,
            is_burning: burn_debt > 0,
            disorient_debt,
            is_disoriented: disorient_debt > 0,
            climb_debt,
            is_climbing: climb_debt > 0,
            cold_stacks: self.cold_stacks,
            recent_study_ms: self.recent_study_ms,
            ruin_active: self.ruin_active,
            ruin_progress: self.ruin_progress,
            current_ruin_location: self.current_ruin_location,
            completed_ruins: self.completed_ruins,
            radar_targets: self.radar_targets,
            lost_memory: self.lost_memory.into_map(),
            opponent_visible: self.opponent_visible,
            wager_active: self.wager_active,
            wager_progress: self.wager_progress,
            wager_correct: self.wager_correct,
            stats: self.stats,
            match_seed: self.match_seed,
        })
    }
}

impl SaveRecord {
    /// A record for a profile with no match in progress
    pub fn fresh(profile: &Profile) -> Self {
        Self::capture(profile, None, None)
    }

    /// Snapshot a profile and, if one is running, its expedition
    pub fn capture(profile: &Profile, expedition: Option<&Expedition>, match_seed: Option<u64>) -> Self {
        let default_player = PlayerState::new();
        let player = expedition.map_or(&default_player, |e| &e.player);
        let debt = |kind| player.effects.debt(kind);

        Self {
            version: SAVE_VERSION,
            uid: profile.uid.clone(),
            username: profile.username.clone(),
            currency: player.currency,
            world: expedition.map(|e| e.world.to_record()),
            pos_q: player.position.q,
            pos_r: player.position.r,
            has_key: player.has_key,
            freeze_debt: debt(EffectKind::Frozen),
            is_frozen: debt(EffectKind::Frozen) > 0,
            trap_debt: debt(EffectKind::Trapped),
            is_trapped: debt(EffectKind::Trapped) > 0,
            rock_debt: debt(EffectKind::Buried),
            is_buried: debt(EffectKind::Buried) > 0,
            burn_debt: debt(EffectKind::Burning),
            is_burning: debt(EffectKind::Burning) > 0,
            disorient_debt: debt(EffectKind::Disoriented),
            is_disoriented: debt(EffectKind::Disoriented) > 0,
            climb_debt: debt(EffectKind::Climbing),
            is_climbing: debt(EffectKind::Climbing) > 0,
            cold_stacks: player.cold_stacks,
            recent_study_ms: player.recent_study_ms.iter().copied().collect(),
            ruin_active: player.ruin.active,
            ruin_progress: player.ruin.progress,
            current_ruin_location: player.ruin.location,
            completed_ruins: player.ruin.completed.iter().copied().collect(),
            radar_targets: player.radar_targets.clone(),
            lost_memory: player
                .lost_memory
                .iter()
                .map(|(coord, snapshot)| (coord.to_string(), *snapshot))
                .collect(),
            opponent_visible: player.opponent_visible,
            wager_active: player.wager.active,
            wager_progress: player.wager.progress,
            wager_correct: player.wager.correct,
            stats: profile.stats,
            match_seed: expedition.and(match_seed),
        }
    }

    /// Decode any supported layout
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let raw: RawSaveRecord =
            serde_json::from_str(json).map_err(|e| SaveError::Malformed(e.to_string()))?;
        raw.migrate()
    }

    /// Encode in the current layout
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|e| SaveError::Encode(e.to_string()))
    }

    pub fn profile(&self) -> Profile {
        Profile {
            uid: self.uid.clone(),
            username: self.username.clone(),
            stats: self.stats,
        }
    }

    /// Rebuild the saved expedition, if the record holds one
    pub fn restore_expedition(&self) -> Option<Expedition> {
        let world = HexWorld::from_record(self.world.clone()?);

        let mut player = PlayerState::new();
        player.position = HexCoord::new(self.pos_q, self.pos_r);
        if !world.contains(&player.position) {
            tracing::warn!(position = %player.position, "save.position_outside_world");
            player.position = world.start;
        }
        player.currency = self.currency;
        player.has_key = self.has_key;
        player.effects = self.effects();
        player.cold_stacks = self.cold_stacks;
        player.recent_study_ms = self.recent_study_ms.iter().copied().collect::<VecDeque<_>>();
        while player.recent_study_ms.len() > 5 {
            player.recent_study_ms.pop_front();
        }
        player.ruin = RuinState {
            active: self.ruin_active,
            progress: self.ruin_progress,
            location: self.current_ruin_location,
            completed: self.completed_ruins.iter().copied().collect(),
        };
        player.wager = WagerState {
            active: self.wager_active,
            progress: self.wager_progress,
            correct: self.wager_correct,
        };
        player.radar_targets = self.radar_targets.clone();
        player.lost_memory = self.parse_lost_memory();
        player.opponent_visible = self.opponent_visible;

        Some(Expedition::from_parts(world, player))
    }

    fn effects(&self) -> StatusEffects {
        let mut effects = StatusEffects::new();
        let pairs = [
            (EffectKind::Frozen, self.freeze_debt),
            (EffectKind::Trapped, self.trap_debt),
            (EffectKind::Buried, self.rock_debt),
            (EffectKind::Burning, self.burn_debt),
            (EffectKind::Disoriented, self.disorient_debt),
            (EffectKind::Climbing, self.climb_debt),
        ];
        for (kind, debt) in pairs {
            effects.arm_with(kind, debt);
        }
        effects
    }

    fn parse_lost_memory(&self) -> LostMemory {
        self.lost_memory
            .iter()
            .filter_map(|(key, snapshot)| match key.parse::<HexCoord>() {
                Ok(coord) => Some((coord, *snapshot)),
                Err(err) => {
                    tracing::warn!(%err, "save.bad_memory_key");
                    None
                }
            })
            .collect()
    }
}
