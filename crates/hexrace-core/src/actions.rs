//! Inputs the engine reacts to and the events it reports back.
//!
//! Every state-changing operation on an [`crate::game::Expedition`] returns the
//! list of `GameEvent`s it produced, in order, so the client can render them
//! and forward the relevant ones to the coordinator.

use crate::hex::HexCoord;
use crate::objectives::ExitProximity;
use crate::player::EffectKind;
use serde::{Deserialize, Serialize};

/// One completed study item from the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyEvent {
    /// Answer quality; above 1 counts as passing
    pub grade: u8,
    /// Time spent answering
    pub elapsed_ms: u64,
}

impl StudyEvent {
    pub fn new(grade: u8, elapsed_ms: u64) -> Self {
        Self { grade, elapsed_ms }
    }

    pub fn is_passing(&self) -> bool {
        self.grade > 1
    }
}

/// Events that occur as a result of moves, study events and actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    // ==================== Movement ====================
    /// The player stepped onto a new tile
    Moved {
        from: HexCoord,
        to: HexCoord,
        cost: u32,
    },
    /// The player's balance after an operation
    CurrencyChanged { currency: u32 },
    /// Fog of war was recomputed
    VisionUpdated { visible: usize, newly_visited: usize },
    /// The player began scaling a mountain
    ClimbStarted { at: HexCoord, debt: u32 },

    // ==================== Study ====================
    /// A passing answer paid out
    StudyCredited { amount: u32 },

    // ==================== Effects ====================
    EffectArmed { effect: EffectKind, debt: u32 },
    /// A failed answer made an effect worse
    DebtIncreased { effect: EffectKind, debt: u32 },
    EffectCleared { effect: EffectKind },
    /// Swamp took part of the balance
    CurrencyLost { amount: u32 },
    /// A sandstorm hid this many tiles
    MemoryLost { tiles: usize },
    /// Hidden tiles came back; `remaining` are still hidden
    MemoryRestored { tiles: usize, remaining: usize },

    // ==================== Objectives ====================
    /// Standing on an unstudied ruin
    RuinOffered { at: HexCoord },
    RuinAlreadyStudied { at: HexCoord },
    RuinStudyStarted { at: HexCoord },
    RuinCompleted { at: HexCoord },
    /// A key or exit location was revealed
    RadarPing { at: HexCoord },
    /// Every key and exit has already been found or pinged
    NoSignalsRemain,
    WagerStarted { stake: u32 },
    WagerResolved {
        won: bool,
        correct: u32,
        total: u32,
        bonus: u32,
    },
    KeyFound { at: HexCoord },
    /// Reached the exit without a key
    ExitLocked { at: HexCoord },
    MatchWon { at: HexCoord },

    // ==================== Shop ====================
    /// Teleported back to the start
    Recalled {
        from: HexCoord,
        to: HexCoord,
        cost: u32,
    },
    /// The opponent stays revealed from now on
    FlareFired { cost: u32 },
    ThermometerRead { reading: ExitProximity },

    // ==================== Traps ====================
    /// The player stepped into an opponent trap
    TrapTriggered { at: HexCoord, group: u32 },
    /// A trap cluster was laid locally
    TrapPlaced {
        center: HexCoord,
        cluster: Vec<HexCoord>,
    },
    /// A local trap cluster was lifted
    TrapRemoved { at: HexCoord, tiles: usize },
    /// The coordinator reports fewer of our traps than before
    OpponentTriggeredTrap { remaining: usize },
}
