//! One player's expedition through a generated world.
//!
//! `Expedition` is the state machine the client drives: it validates and
//! resolves moves, settles study events, and runs the ruin, wager, trap and
//! shop actions. Every operation either returns the events it produced or a
//! rejection, and a rejection never mutates state.

use crate::actions::{GameEvent, StudyEvent};
use crate::generator;
use crate::hex::HexCoord;
use crate::objectives::{self, WAGER_STAKE};
use crate::player::{EffectKind, PlayerState};
use crate::terrain::TerrainKind;
use crate::traps::{TrapSystem, TRAP_COST};
use crate::vision::{self, VisionLimit};
use crate::world::{HexWorld, Tile};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency credited for each passing study event
pub const STUDY_REWARD: u32 = 5;

/// Scrub cost while the player is studying quickly
pub const SCRUB_FAST_COST: u32 = 20;

/// Price of teleporting back to the start
pub const RECALL_COST: u32 = 600;

/// Price of revealing the opponent for the rest of the match
pub const FLARE_COST: u32 = 250;

/// Extra tundra cost per consecutive tundra tile already crossed
pub const COLD_STACK_COST: u32 = 20;

const FROSTBITE_CHANCE: f64 = 0.33;
const ROCKSLIDE_CHANCE: f64 = 0.33;
const ERUPTION_CHANCE: f64 = 0.33;
const SINKHOLE_CHANCE: f64 = 0.2;

/// Reasons a move is declined
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveRejection {
    #[error("The match is over")]
    MatchOver,

    #[error("No such tile")]
    UnknownTile,

    #[error("Target is not adjacent")]
    NotAdjacent,

    #[error("Cannot move while {0:?}")]
    Immobilized(EffectKind),

    #[error("Cannot move while studying a ruin")]
    StudyingRuin,

    #[error("{0:?} is impassable")]
    Impassable(TerrainKind),

    #[error("Climbing a mountain must be confirmed")]
    ClimbNeedsConfirmation,

    #[error("Costs {cost}, only {available} available")]
    InsufficientFunds { cost: u32, available: u32 },
}

/// Reasons a non-move action is declined
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActionError {
    #[error("The match is over")]
    MatchOver,

    #[error("Not standing on a ruin")]
    NotOnRuin,

    #[error("This ruin has already been studied")]
    RuinAlreadyStudied,

    #[error("A ruin study is already running")]
    RuinStudyActive,

    #[error("A wager is already running")]
    WagerActive,

    #[error("Costs {cost}, only {available} available")]
    InsufficientFunds { cost: u32, available: u32 },

    #[error("No such tile")]
    UnknownTile,

    #[error("A trap cannot be placed here")]
    TrapNotAllowed,

    #[error("None of our traps covers this tile")]
    NoOwnTrap,

    #[error("The opponent is already revealed")]
    OpponentAlreadyVisible,

    #[error("Opponent signal lost")]
    NoOpponentSignal,
}

/// A running match from the local player's point of view
#[derive(Debug, Clone, PartialEq)]
pub struct Expedition {
    pub world: HexWorld,
    pub player: PlayerState,
    pub traps: TrapSystem,
    won: bool,
}

impl Expedition {
    /// Generate the world for a match and place a fresh player at the start
    pub fn start(seed: u64, level: u32) -> Self {
        let (world, report) = generator::generate_with_report(seed, level);
        if !report.is_clean() {
            tracing::info!(seed, level, anomalies = report.anomalies.len(), "expedition.irregular_world");
        }
        Self::new(world)
    }

    /// Start a fresh player in an existing world
    pub fn new(world: HexWorld) -> Self {
        let mut expedition = Self::from_parts(world, PlayerState::new());
        expedition.refresh_vision();
        expedition
    }

    /// Resume from saved parts without touching fog of war
    pub fn from_parts(world: HexWorld, player: PlayerState) -> Self {
        let traps = TrapSystem::from_world(&world);
        Self {
            world,
            player,
            traps,
            won: false,
        }
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn position(&self) -> HexCoord {
        self.player.position
    }

    pub fn currency(&self) -> u32 {
        self.player.currency
    }

    /// Current price of stepping onto a tile
    pub fn move_cost(&self, tile: &Tile) -> u32 {
        match tile.kind {
            TerrainKind::Scrub if self.player.is_fast_pace() => SCRUB_FAST_COST,
            TerrainKind::Tundra => tile.cost + COLD_STACK_COST * self.player.cold_stacks,
            _ => tile.cost,
        }
    }

    /// Price of stepping onto `target`, if it exists
    pub fn preview_cost(&self, target: &HexCoord) -> Option<u32> {
        self.world.get_tile(target).map(|t| self.move_cost(t))
    }

    // ==================== Movement ====================

    /// Validate a move without changing anything; returns its cost
    pub fn validate_move(&self, target: HexCoord, confirm_climb: bool) -> Result<u32, MoveRejection> {
        if self.won {
            return Err(MoveRejection::MatchOver);
        }
        if !self.player.position.is_adjacent(&target) {
            return Err(MoveRejection::NotAdjacent);
        }
        let tile = self.world.get_tile(&target).ok_or(MoveRejection::UnknownTile)?;
        if let Some(effect) = self.player.effects.blocking() {
            return Err(MoveRejection::Immobilized(effect));
        }
        if self.player.ruin.active {
            return Err(MoveRejection::StudyingRuin);
        }
        if !tile.is_passable() {
            return Err(MoveRejection::Impassable(tile.kind));
        }
        if tile.kind == TerrainKind::Mountain && !confirm_climb {
            return Err(MoveRejection::ClimbNeedsConfirmation);
        }

        let cost = self.move_cost(tile);
        if !self.player.can_afford(cost) {
            return Err(MoveRejection::InsufficientFunds {
                cost,
                available: self.player.currency,
            });
        }
        Ok(cost)
    }

    /// Move to an adjacent tile, paying its cost and rolling its hazards
    pub fn resolve_move<R: Rng>(
        &mut self,
        target: HexCoord,
        confirm_climb: bool,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, MoveRejection> {
        let cost = self.validate_move(target, confirm_climb)?;
        let kind = self.world.kind_at(&target).ok_or(MoveRejection::UnknownTile)?;

        let mut events = Vec::new();
        let from = self.player.position;
        self.player.currency -= cost;
        self.player.position = target;
        self.player.cold_stacks = if kind == TerrainKind::Tundra {
            self.player.cold_stacks + 1
        } else {
            0
        };
        events.push(GameEvent::Moved {
            from,
            to: target,
            cost,
        });

        if kind == TerrainKind::Mountain {
            let debt = self.player.effects.arm(EffectKind::Climbing);
            events.push(GameEvent::ClimbStarted { at: target, debt });
        }

        self.roll_hazard(kind, target, rng, &mut events);

        if kind == TerrainKind::Ruins {
            if self.player.ruin.is_completed(&target) {
                events.push(GameEvent::RuinAlreadyStudied { at: target });
            } else {
                events.push(GameEvent::RuinOffered { at: target });
            }
        }

        if let Some(group) = self.traps.check_trigger(&mut self.world, &target) {
            events.push(GameEvent::TrapTriggered { at: target, group });
            self.player.arm_effect(EffectKind::Trapped, &mut events);
        }

        if kind == TerrainKind::Key && !self.player.has_key {
            self.player.has_key = true;
            self.world.set_exit_locked(false);
            events.push(GameEvent::KeyFound { at: target });
        }

        if target == self.world.exit {
            if self.player.has_key {
                self.won = true;
                events.push(GameEvent::CurrencyChanged {
                    currency: self.player.currency,
                });
                events.push(GameEvent::MatchWon { at: target });
                return Ok(events);
            }
            events.push(GameEvent::ExitLocked { at: target });
        }

        events.push(self.refresh_vision());
        events.push(GameEvent::CurrencyChanged {
            currency: self.player.currency,
        });
        Ok(events)
    }

    fn roll_hazard<R: Rng>(
        &mut self,
        kind: TerrainKind,
        at: HexCoord,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        match kind {
            TerrainKind::Tundra if rng.gen_bool(FROSTBITE_CHANCE) => {
                self.player.arm_effect(EffectKind::Frozen, events);
            }
            TerrainKind::Wasteland if rng.gen_bool(ROCKSLIDE_CHANCE) => {
                self.player.arm_effect(EffectKind::Buried, events);
            }
            TerrainKind::Volcanic if rng.gen_bool(ERUPTION_CHANCE) => {
                self.player.arm_effect(EffectKind::Burning, events);
            }
            TerrainKind::Swamp if rng.gen_bool(SINKHOLE_CHANCE) => {
                let amount = self.player.currency / 2;
                self.player.currency -= amount;
                events.push(GameEvent::CurrencyLost { amount });
            }
            TerrainKind::Dunes if !self.player.is_disoriented() => {
                self.player.arm_effect(EffectKind::Disoriented, events);
                let start = self.world.start;
                let tiles = self.player.forget_map(&mut self.world, &[start, at]);
                events.push(GameEvent::MemoryLost { tiles });
            }
            _ => {}
        }
    }

    /// Recompute fog of war around the player
    pub fn refresh_vision(&mut self) -> GameEvent {
        let position = self.player.position;
        let standing_on = self.world.kind_at(&position).unwrap_or(TerrainKind::Plains);
        let limit = VisionLimit::for_terrain(standing_on, self.player.is_climbing());
        let report = vision::update_vision(
            &mut self.world,
            position,
            limit,
            self.player.is_disoriented(),
        );
        GameEvent::VisionUpdated {
            visible: report.visible,
            newly_visited: report.newly_visited.len(),
        }
    }

    // ==================== Study ====================

    /// Settle one study event: pay out, advance puzzles, then pay down debts
    pub fn on_study_event<R: Rng>(&mut self, study: StudyEvent, rng: &mut R) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.won {
            return events;
        }
        let before = self.player.currency;
        self.player.record_study_time(study.elapsed_ms);

        if study.is_passing() {
            self.player.credit(STUDY_REWARD);
            events.push(GameEvent::StudyCredited {
                amount: STUDY_REWARD,
            });
        }

        if let Some(at) = self.player.ruin.advance() {
            events.push(GameEvent::RuinCompleted { at });
            let ping = objectives::radar_ping(&self.world, &self.player.radar_targets, rng);
            match ping {
                Some(target) => {
                    self.player.radar_targets.push(target);
                    events.push(GameEvent::RadarPing { at: target });
                }
                None => events.push(GameEvent::NoSignalsRemain),
            }
        }

        if let Some(outcome) = self.player.wager.advance(study.is_passing()) {
            let bonus = outcome.bonus();
            self.player.credit(bonus);
            events.push(GameEvent::WagerResolved {
                won: outcome.won,
                correct: outcome.correct,
                total: outcome.total,
                bonus,
            });
        }

        let settled = self.player.settle_debts(&mut self.world, study);
        let sight_changed = settled.iter().any(|e| {
            matches!(
                e,
                GameEvent::EffectCleared {
                    effect: EffectKind::Climbing | EffectKind::Disoriented
                }
            )
        });
        events.extend(settled);
        if sight_changed {
            events.push(self.refresh_vision());
        }

        if self.player.currency != before {
            events.push(GameEvent::CurrencyChanged {
                currency: self.player.currency,
            });
        }
        events
    }

    // ==================== Objectives ====================

    /// Begin deciphering the ruin the player stands on
    pub fn start_ruin_study(&mut self) -> Result<Vec<GameEvent>, ActionError> {
        if self.won {
            return Err(ActionError::MatchOver);
        }
        if self.player.ruin.active {
            return Err(ActionError::RuinStudyActive);
        }
        let at = self.player.position;
        if self.world.kind_at(&at) != Some(TerrainKind::Ruins) {
            return Err(ActionError::NotOnRuin);
        }
        if self.player.ruin.is_completed(&at) {
            return Err(ActionError::RuinAlreadyStudied);
        }

        self.player.ruin.start(at);
        Ok(vec![GameEvent::RuinStudyStarted { at }])
    }

    /// Stake currency on the accuracy of the next answers
    pub fn start_wager(&mut self) -> Result<Vec<GameEvent>, ActionError> {
        if self.won {
            return Err(ActionError::MatchOver);
        }
        if self.player.wager.active {
            return Err(ActionError::WagerActive);
        }
        if !self.player.try_spend(WAGER_STAKE) {
            return Err(ActionError::InsufficientFunds {
                cost: WAGER_STAKE,
                available: self.player.currency,
            });
        }

        self.player.wager.start();
        Ok(vec![
            GameEvent::WagerStarted { stake: WAGER_STAKE },
            GameEvent::CurrencyChanged {
                currency: self.player.currency,
            },
        ])
    }

    // ==================== Traps ====================

    /// Lay a trap cluster around `center`
    pub fn place_trap(&mut self, center: HexCoord) -> Result<Vec<GameEvent>, ActionError> {
        if self.won {
            return Err(ActionError::MatchOver);
        }
        let tile = self.world.get_tile(&center).ok_or(ActionError::UnknownTile)?;
        if center == self.world.start || center == self.world.exit || tile.trap_owner.is_some() {
            return Err(ActionError::TrapNotAllowed);
        }
        if !self.player.try_spend(TRAP_COST) {
            return Err(ActionError::InsufficientFunds {
                cost: TRAP_COST,
                available: self.player.currency,
            });
        }

        let cluster = self.traps.place(&mut self.world, center);
        Ok(vec![
            GameEvent::TrapPlaced { center, cluster },
            GameEvent::CurrencyChanged {
                currency: self.player.currency,
            },
        ])
    }

    /// Lift the local trap cluster covering `at`
    pub fn remove_trap(&mut self, at: HexCoord) -> Result<Vec<GameEvent>, ActionError> {
        if self.won {
            return Err(ActionError::MatchOver);
        }
        let tiles = self.traps.lift(&mut self.world, &at).ok_or(ActionError::NoOwnTrap)?;
        Ok(vec![GameEvent::TrapRemoved { at, tiles }])
    }

    /// Replace local trap markings with the coordinator's confirmed clusters
    pub fn reconcile_traps(&mut self, clusters: &[Vec<HexCoord>]) -> Vec<GameEvent> {
        self.traps.reconcile(&mut self.world, clusters)
    }

    // ==================== Shop ====================

    /// Teleport back to the start
    pub fn recall(&mut self) -> Result<Vec<GameEvent>, ActionError> {
        if self.won {
            return Err(ActionError::MatchOver);
        }
        if self.player.ruin.active {
            return Err(ActionError::RuinStudyActive);
        }
        if !self.player.try_spend(RECALL_COST) {
            return Err(ActionError::InsufficientFunds {
                cost: RECALL_COST,
                available: self.player.currency,
            });
        }

        let from = self.player.position;
        let to = self.world.start;
        self.player.position = to;
        self.player.cold_stacks = 0;
        tracing::debug!(%from, %to, "expedition.recall");
        Ok(vec![
            GameEvent::Recalled {
                from,
                to,
                cost: RECALL_COST,
            },
            self.refresh_vision(),
            GameEvent::CurrencyChanged {
                currency: self.player.currency,
            },
        ])
    }

    /// Reveal the opponent's position for the rest of the match
    pub fn fire_flare(&mut self) -> Result<Vec<GameEvent>, ActionError> {
        if self.won {
            return Err(ActionError::MatchOver);
        }
        if self.player.opponent_visible {
            return Err(ActionError::OpponentAlreadyVisible);
        }
        if !self.player.try_spend(FLARE_COST) {
            return Err(ActionError::InsufficientFunds {
                cost: FLARE_COST,
                available: self.player.currency,
            });
        }

        self.player.opponent_visible = true;
        Ok(vec![
            GameEvent::FlareFired { cost: FLARE_COST },
            GameEvent::CurrencyChanged {
                currency: self.player.currency,
            },
        ])
    }

    /// Compare our distance to the exit with the opponent's last known one
    pub fn read_thermometer(&self, opponent: Option<HexCoord>) -> Result<Vec<GameEvent>, ActionError> {
        if self.won {
            return Err(ActionError::MatchOver);
        }
        let opponent = opponent.ok_or(ActionError::NoOpponentSignal)?;
        let reading = objectives::exit_proximity(&self.world, self.player.position, opponent);
        Ok(vec![GameEvent::ThermometerRead { reading }])
    }

    /// The coordinator says our last move landed in an opponent trap
    pub fn apply_remote_trap_hit(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.won {
            self.player.arm_effect(EffectKind::Trapped, &mut events);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objectives::ExitProximity;
    use crate::world::TrapOwner;
    use pretty_assertions::assert_eq;
    use rand::rngs::mock::StepRng;

    /// Always rolls the hazard
    fn unlucky() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Never rolls the hazard
    fn lucky() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    /// Radius-3 plains hexagon with the exit at (3, 0)
    fn test_world() -> HexWorld {
        let mut tiles = Vec::new();
        for q in -3..=3 {
            for r in -3..=3 {
                let coord = HexCoord::new(q, r);
                if coord.distance_to(&HexCoord::ORIGIN) <= 3 {
                    let kind = match (q, r) {
                        (0, 0) => TerrainKind::Start,
                        (3, 0) => TerrainKind::Exit,
                        _ => TerrainKind::Plains,
                    };
                    tiles.push(Tile::new(coord, kind));
                }
            }
        }
        let mut world = HexWorld::from_tiles(7, 1, tiles);
        world.set_exit_locked(true);
        world
    }

    fn expedition_with(currency: u32, edits: &[(HexCoord, TerrainKind)]) -> Expedition {
        let mut world = test_world();
        for (coord, kind) in edits {
            world.set_kind(coord, *kind);
        }
        let mut expedition = Expedition::new(world);
        expedition.player.currency = currency;
        expedition
    }

    const EAST: HexCoord = HexCoord::new(1, 0);

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let mut expedition = expedition_with(0, &[]);
        let before = expedition.clone();
        let err = expedition.resolve_move(EAST, false, &mut lucky()).unwrap_err();
        assert_eq!(
            err,
            MoveRejection::InsufficientFunds {
                cost: 20,
                available: 0
            }
        );
        assert_eq!(expedition, before);
    }

    #[test]
    fn test_validation_order() {
        let mut expedition = expedition_with(100, &[(EAST, TerrainKind::Lake)]);
        assert_eq!(
            expedition.validate_move(HexCoord::new(2, 0), false),
            Err(MoveRejection::NotAdjacent)
        );
        assert_eq!(
            expedition.validate_move(EAST, false),
            Err(MoveRejection::Impassable(TerrainKind::Lake))
        );

        expedition.player.effects.arm(EffectKind::Burning);
        assert_eq!(
            expedition.validate_move(EAST, false),
            Err(MoveRejection::Immobilized(EffectKind::Burning))
        );

        expedition.player.effects.clear(EffectKind::Burning);
        expedition.player.ruin.start(HexCoord::ORIGIN);
        assert_eq!(
            expedition.validate_move(HexCoord::new(0, 1), false),
            Err(MoveRejection::StudyingRuin)
        );
    }

    #[test]
    fn test_disoriented_player_can_still_move() {
        let mut expedition = expedition_with(40, &[]);
        expedition.player.effects.arm(EffectKind::Disoriented);
        assert!(expedition.resolve_move(EAST, false, &mut lucky()).is_ok());
    }

    #[test]
    fn test_mountain_climb_is_free_but_confirmed() {
        let mut expedition = expedition_with(0, &[(EAST, TerrainKind::Mountain)]);
        assert_eq!(
            expedition.resolve_move(EAST, false, &mut lucky()),
            Err(MoveRejection::ClimbNeedsConfirmation)
        );

        let events = expedition.resolve_move(EAST, true, &mut lucky()).unwrap();
        assert!(events.contains(&GameEvent::ClimbStarted { at: EAST, debt: 100 }));
        assert_eq!(expedition.currency(), 0);
        assert!(expedition.player.is_climbing());
        assert_eq!(
            expedition.validate_move(HexCoord::new(2, 0), false),
            Err(MoveRejection::Immobilized(EffectKind::Climbing))
        );
    }

    #[test]
    fn test_summit_vision_opens_after_climb() {
        let mut expedition = expedition_with(0, &[(EAST, TerrainKind::Mountain)]);
        expedition.resolve_move(EAST, true, &mut lucky()).unwrap();
        assert!(!expedition.world.get_tile(&HexCoord::new(-3, 0)).unwrap().visible);

        expedition.player.effects.pay(EffectKind::Climbing, 99);
        let events = expedition.on_study_event(StudyEvent::new(1, 9_000), &mut lucky());
        assert!(events.contains(&GameEvent::EffectCleared {
            effect: EffectKind::Climbing
        }));
        // Summit range 5 covers the whole radius-3 world from (1, 0)
        assert!(expedition.world.tiles().all(|t| t.visible));
    }

    #[test]
    fn test_scrub_discount_on_fast_pace() {
        let mut expedition = expedition_with(100, &[(EAST, TerrainKind::Scrub)]);
        assert_eq!(expedition.preview_cost(&EAST), Some(60));
        for _ in 0..3 {
            expedition.player.record_study_time(3_000);
        }
        assert_eq!(expedition.preview_cost(&EAST), Some(SCRUB_FAST_COST));
    }

    #[test]
    fn test_tundra_cold_stacks() {
        let edits = [
            (EAST, TerrainKind::Tundra),
            (HexCoord::new(2, 0), TerrainKind::Tundra),
        ];
        let mut expedition = expedition_with(400, &edits);
        expedition.resolve_move(EAST, false, &mut lucky()).unwrap();
        assert_eq!(expedition.currency(), 300);
        assert_eq!(expedition.player.cold_stacks, 1);

        let events = expedition
            .resolve_move(HexCoord::new(2, 0), false, &mut lucky())
            .unwrap();
        assert_eq!(
            events[0],
            GameEvent::Moved {
                from: EAST,
                to: HexCoord::new(2, 0),
                cost: 120
            }
        );

        expedition.resolve_move(HexCoord::new(2, -1), false, &mut lucky()).unwrap();
        assert_eq!(expedition.player.cold_stacks, 0);
    }

    #[test]
    fn test_hazards_arm_debts() {
        let cases = [
            (TerrainKind::Tundra, EffectKind::Frozen, 150),
            (TerrainKind::Wasteland, EffectKind::Buried, 100),
            (TerrainKind::Volcanic, EffectKind::Burning, 200),
        ];
        for (terrain, effect, debt) in cases {
            let mut expedition = expedition_with(100, &[(EAST, terrain)]);
            let events = expedition.resolve_move(EAST, false, &mut unlucky()).unwrap();
            assert!(events.contains(&GameEvent::EffectArmed { effect, debt }), "{terrain:?}");

            let mut expedition = expedition_with(100, &[(EAST, terrain)]);
            expedition.resolve_move(EAST, false, &mut lucky()).unwrap();
            assert!(!expedition.player.effects.is_active(effect), "{terrain:?}");
        }
    }

    #[test]
    fn test_swamp_takes_half_rounded_down() {
        let mut expedition = expedition_with(101, &[(EAST, TerrainKind::Swamp)]);
        let events = expedition.resolve_move(EAST, false, &mut unlucky()).unwrap();
        assert!(events.contains(&GameEvent::CurrencyLost { amount: 25 }));
        assert_eq!(expedition.currency(), 26);
    }

    #[test]
    fn test_dunes_wipe_memory_except_start_and_destination() {
        let mut expedition = expedition_with(100, &[(EAST, TerrainKind::Dunes)]);
        let events = expedition.resolve_move(EAST, false, &mut lucky()).unwrap();
        assert!(events.contains(&GameEvent::EffectArmed {
            effect: EffectKind::Disoriented,
            debt: 300
        }));
        // 37 tiles minus start and destination
        assert!(events.contains(&GameEvent::MemoryLost { tiles: 35 }));
        assert_eq!(expedition.player.lost_memory.len(), 35);

        let far = expedition.world.get_tile(&HexCoord::new(-2, 0)).unwrap();
        assert!(!far.visited && !far.visible);
        // Disoriented vision only reaches the neighbors
        assert!(expedition.world.get_tile(&HexCoord::new(2, 0)).unwrap().visible);
        assert!(!expedition.world.get_tile(&HexCoord::new(3, 0)).unwrap().visible);

        // A second dune does not re-arm
        expedition.world.set_kind(&HexCoord::new(2, 0), TerrainKind::Dunes);
        let events = expedition
            .resolve_move(HexCoord::new(2, 0), false, &mut lucky())
            .unwrap();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::MemoryLost { .. })));
    }

    #[test]
    fn test_exit_without_key_is_denied() {
        let mut expedition = expedition_with(100, &[]);
        expedition.player.position = HexCoord::new(2, 0);
        let events = expedition
            .resolve_move(HexCoord::new(3, 0), false, &mut lucky())
            .unwrap();
        assert!(events.contains(&GameEvent::ExitLocked {
            at: HexCoord::new(3, 0)
        }));
        assert!(!expedition.is_won());
    }

    #[test]
    fn test_key_unlocks_exit_and_wins() {
        let mut expedition = expedition_with(100, &[(HexCoord::new(2, 0), TerrainKind::Key)]);
        expedition.player.position = EAST;
        let events = expedition
            .resolve_move(HexCoord::new(2, 0), false, &mut lucky())
            .unwrap();
        assert!(events.contains(&GameEvent::KeyFound {
            at: HexCoord::new(2, 0)
        }));
        assert!(!expedition.world.get_tile(&HexCoord::new(3, 0)).unwrap().locked);

        let events = expedition
            .resolve_move(HexCoord::new(3, 0), false, &mut lucky())
            .unwrap();
        assert_eq!(
            events.last(),
            Some(&GameEvent::MatchWon {
                at: HexCoord::new(3, 0)
            })
        );
        assert!(expedition.is_won());
        assert_eq!(
            expedition.resolve_move(HexCoord::new(2, 0), false, &mut lucky()),
            Err(MoveRejection::MatchOver)
        );
        assert!(expedition
            .on_study_event(StudyEvent::new(4, 1_000), &mut lucky())
            .is_empty());
    }

    #[test]
    fn test_opponent_trap_arms_trapped() {
        let mut expedition = expedition_with(100, &[]);
        let cluster = expedition.world.trap_cluster(HexCoord::new(2, 0));
        expedition
            .traps
            .mark_opponent_trap(&mut expedition.world, &cluster);

        let events = expedition.resolve_move(EAST, false, &mut lucky()).unwrap();
        assert!(events.iter().any(|e| matches!(e, GameEvent::TrapTriggered { .. })));
        assert_eq!(expedition.player.effects.debt(EffectKind::Trapped), 100);
        assert!(expedition.world.tiles().all(|t| t.trap_owner.is_none()));
    }

    #[test]
    fn test_ruin_study_locks_movement_until_done() {
        let west = HexCoord::new(-1, 0);
        let mut expedition = expedition_with(100, &[(west, TerrainKind::Ruins)]);
        let events = expedition.resolve_move(west, false, &mut lucky()).unwrap();
        assert!(events.contains(&GameEvent::RuinOffered { at: west }));
        assert_eq!(expedition.currency(), 100);

        expedition.start_ruin_study().unwrap();
        assert_eq!(
            expedition.start_ruin_study(),
            Err(ActionError::RuinStudyActive)
        );
        assert_eq!(
            expedition.validate_move(HexCoord::new(-2, 0), false),
            Err(MoveRejection::StudyingRuin)
        );

        let mut last = Vec::new();
        for _ in 0..objectives::RUIN_STUDY_TARGET {
            last = expedition.on_study_event(StudyEvent::new(1, 9_000), &mut unlucky());
        }
        assert!(last.contains(&GameEvent::RuinCompleted { at: west }));
        // The exit at (3, 0) is the only signal not yet seen
        assert!(last.contains(&GameEvent::RadarPing {
            at: HexCoord::new(3, 0)
        }));
        assert!(expedition.validate_move(HexCoord::new(-2, 0), false).is_ok());
        assert_eq!(
            expedition.start_ruin_study(),
            Err(ActionError::RuinAlreadyStudied)
        );
    }

    #[test]
    fn test_place_trap_rules() {
        let mut expedition = expedition_with(350, &[]);
        assert_eq!(
            expedition.place_trap(HexCoord::ORIGIN),
            Err(ActionError::TrapNotAllowed)
        );
        assert_eq!(
            expedition.place_trap(HexCoord::new(3, 0)),
            Err(ActionError::TrapNotAllowed)
        );
        assert_eq!(
            expedition.place_trap(HexCoord::new(9, 9)),
            Err(ActionError::UnknownTile)
        );

        let events = expedition.place_trap(HexCoord::new(-2, 1)).unwrap();
        assert!(matches!(&events[0], GameEvent::TrapPlaced { cluster, .. } if cluster.len() == 7));
        assert_eq!(expedition.currency(), 100);
        assert_eq!(
            expedition.world.get_tile(&HexCoord::new(-2, 1)).unwrap().trap_owner,
            Some(TrapOwner::Local)
        );

        assert_eq!(
            expedition.place_trap(HexCoord::new(-2, -1)),
            Err(ActionError::InsufficientFunds {
                cost: TRAP_COST,
                available: 100
            })
        );
    }

    #[test]
    fn test_remove_own_trap_only() {
        let mut expedition = expedition_with(TRAP_COST, &[]);
        expedition.place_trap(HexCoord::new(-1, -1)).unwrap();
        assert_eq!(
            expedition.remove_trap(HexCoord::new(2, 0)),
            Err(ActionError::NoOwnTrap)
        );
        let events = expedition.remove_trap(HexCoord::new(-1, 0)).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::TrapRemoved {
                at: HexCoord::new(-1, 0),
                tiles: 7
            }]
        );
        assert!(expedition.world.tiles().all(|t| t.trap_owner.is_none()));
    }

    #[test]
    fn test_wager_stake_and_payout() {
        let mut expedition = expedition_with(WAGER_STAKE, &[]);
        expedition.start_wager().unwrap();
        assert_eq!(expedition.currency(), 0);
        assert_eq!(expedition.start_wager(), Err(ActionError::WagerActive));

        let mut last = Vec::new();
        for _ in 0..objectives::WAGER_LENGTH {
            last = expedition.on_study_event(StudyEvent::new(3, 2_000), &mut lucky());
        }
        assert!(last.contains(&GameEvent::WagerResolved {
            won: true,
            correct: 200,
            total: 200,
            bonus: objectives::WAGER_BONUS
        }));
        assert_eq!(
            expedition.currency(),
            STUDY_REWARD * objectives::WAGER_LENGTH + objectives::WAGER_BONUS
        );
    }

    #[test]
    fn test_recall_returns_to_start() {
        let mut expedition = expedition_with(RECALL_COST + 40, &[(EAST, TerrainKind::Tundra)]);
        expedition.resolve_move(EAST, false, &mut lucky()).unwrap();
        expedition.player.currency = RECALL_COST - 1;
        let before = expedition.clone();
        assert_eq!(
            expedition.recall(),
            Err(ActionError::InsufficientFunds {
                cost: RECALL_COST,
                available: RECALL_COST - 1
            })
        );
        assert_eq!(expedition, before);

        expedition.player.currency = RECALL_COST + 5;
        let events = expedition.recall().unwrap();
        assert_eq!(
            events[0],
            GameEvent::Recalled {
                from: EAST,
                to: HexCoord::ORIGIN,
                cost: RECALL_COST
            }
        );
        assert_eq!(expedition.position(), HexCoord::ORIGIN);
        assert_eq!(expedition.currency(), 5);
        assert_eq!(expedition.player.cold_stacks, 0);
        assert!(expedition.world.get_tile(&HexCoord::new(-2, 0)).unwrap().visible);
    }

    #[test]
    fn test_recall_blocked_while_studying_ruin() {
        let mut expedition = expedition_with(RECALL_COST, &[]);
        expedition.player.ruin.start(HexCoord::ORIGIN);
        assert_eq!(expedition.recall(), Err(ActionError::RuinStudyActive));
        assert_eq!(expedition.currency(), RECALL_COST);
    }

    #[test]
    fn test_flare_reveals_opponent_once() {
        let mut expedition = expedition_with(FLARE_COST * 2, &[]);
        let events = expedition.fire_flare().unwrap();
        assert_eq!(events[0], GameEvent::FlareFired { cost: FLARE_COST });
        assert!(expedition.player.opponent_visible);
        assert_eq!(expedition.currency(), FLARE_COST);
        assert_eq!(expedition.fire_flare(), Err(ActionError::OpponentAlreadyVisible));
        assert_eq!(expedition.currency(), FLARE_COST);
    }

    #[test]
    fn test_thermometer_compares_exit_distance() {
        let expedition = expedition_with(0, &[]);
        assert_eq!(
            expedition.read_thermometer(None),
            Err(ActionError::NoOpponentSignal)
        );

        // We stand 3 from the exit at (3, 0)
        let reading = |opponent| match expedition.read_thermometer(Some(opponent)) {
            Ok(events) => events,
            Err(err) => panic!("{err}"),
        };
        assert_eq!(
            reading(HexCoord::new(2, 0)),
            vec![GameEvent::ThermometerRead {
                reading: ExitProximity::Farther
            }]
        );
        assert_eq!(
            reading(HexCoord::new(-3, 0)),
            vec![GameEvent::ThermometerRead {
                reading: ExitProximity::Closer
            }]
        );
        assert_eq!(
            reading(HexCoord::new(0, 3)),
            vec![GameEvent::ThermometerRead {
                reading: ExitProximity::Level
            }]
        );
    }
}
