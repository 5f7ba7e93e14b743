//! Hexrace - a two-player hex exploration race fuelled by study sessions
//!
//! This crate provides the core game logic for Hexrace, including:
//! - Axial hex coordinates and the terrain catalog
//! - Seeded, deterministic world generation
//! - Fog of war
//! - Player state with debt-based status effects
//! - Ruins, radar, wagers and trap clusters
//! - The recall, flare and thermometer shop actions
//! - The match synchronization state machine and the save-record schema
//!
//! # Architecture
//!
//! The engine is synchronous and performs no I/O. Randomness is passed in by
//! the caller so every rule can be replayed deterministically. The client
//! binary owns networking and persistence and drives an [`Expedition`].
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for hex tiles
//! - [`terrain`]: Terrain kinds and their static costs
//! - [`world`]: Tiles and the world map
//! - [`generator`]: Procedural world generation
//! - [`vision`]: Fog of war
//! - [`player`]: Player state and status-effect debts
//! - [`objectives`]: Ruins, radar and wagers
//! - [`traps`]: Trap clusters
//! - [`game`]: Move and study resolution
//! - [`sync`]: Match lifecycle against the coordinator
//! - [`save`]: Persisted save record

pub mod actions;
pub mod game;
pub mod generator;
pub mod hex;
pub mod objectives;
pub mod player;
pub mod save;
pub mod sync;
pub mod terrain;
pub mod traps;
pub mod vision;
pub mod world;

// Re-export commonly used types
pub use actions::{GameEvent, StudyEvent};
pub use game::{ActionError, Expedition, MoveRejection};
pub use generator::{generate, generate_with_report, GenerationAnomaly, GenerationReport};
pub use hex::HexCoord;
pub use objectives::ExitProximity;
pub use player::{EffectKind, PlayerState, StatusEffect, StatusEffects};
pub use save::{Profile, SaveError, SaveRecord};
pub use sync::{
    CoordinatorStatus, JoinOutcome, MatchOutcome, MatchPhase, MatchSnapshot, MatchSync, MoveAck,
    OpponentView, SyncEvent, WinLoss,
};
pub use terrain::{TerrainInfo, TerrainKind};
pub use traps::TrapSystem;
pub use world::{HexWorld, Tile, TrapOwner};
