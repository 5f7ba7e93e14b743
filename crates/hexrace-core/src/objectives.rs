//! Ruin study puzzles, the radar reveal, the exit thermometer and the
//! performance wager.

use crate::hex::HexCoord;
use crate::world::HexWorld;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Study events needed to decipher a ruin
pub const RUIN_STUDY_TARGET: u32 = 500;

/// Currency staked when a wager starts
pub const WAGER_STAKE: u32 = 200;

/// Study events a wager runs for
pub const WAGER_LENGTH: u32 = 200;

/// Paid when a wager is won
pub const WAGER_BONUS: u32 = 500;

/// Share of passing answers needed to win a wager
pub const WAGER_PASS_PERCENT: u32 = 90;

/// Progress on ruin puzzles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuinState {
    /// A study is running and the player cannot move
    pub active: bool,
    pub progress: u32,
    pub location: Option<HexCoord>,
    pub completed: BTreeSet<HexCoord>,
}

impl RuinState {
    pub fn is_completed(&self, at: &HexCoord) -> bool {
        self.completed.contains(at)
    }

    pub fn start(&mut self, at: HexCoord) {
        self.active = true;
        self.progress = 0;
        self.location = Some(at);
    }

    /// Count one study event. Returns the ruin location once it is deciphered.
    pub fn advance(&mut self) -> Option<HexCoord> {
        if !self.active {
            return None;
        }
        self.progress += 1;
        if self.progress < RUIN_STUDY_TARGET {
            return None;
        }

        self.active = false;
        self.progress = 0;
        let location = self.location.take()?;
        self.completed.insert(location);
        Some(location)
    }
}

/// How a finished wager went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WagerOutcome {
    pub won: bool,
    pub correct: u32,
    pub total: u32,
}

impl WagerOutcome {
    pub fn bonus(&self) -> u32 {
        if self.won {
            WAGER_BONUS
        } else {
            0
        }
    }
}

/// A running side bet on answer accuracy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerState {
    pub active: bool,
    pub progress: u32,
    pub correct: u32,
}

impl WagerState {
    pub fn start(&mut self) {
        *self = Self {
            active: true,
            progress: 0,
            correct: 0,
        };
    }

    /// Count one answer; resolves the wager after [`WAGER_LENGTH`] answers
    pub fn advance(&mut self, passing: bool) -> Option<WagerOutcome> {
        if !self.active {
            return None;
        }
        self.progress += 1;
        if passing {
            self.correct += 1;
        }
        if self.progress < WAGER_LENGTH {
            return None;
        }

        let outcome = WagerOutcome {
            won: self.correct * 100 >= self.progress * WAGER_PASS_PERCENT,
            correct: self.correct,
            total: self.progress,
        };
        *self = Self::default();
        Some(outcome)
    }
}

/// Pick an unvisited key or exit tile that has not been pinged yet
pub fn radar_ping<R: Rng>(world: &HexWorld, pinged: &[HexCoord], rng: &mut R) -> Option<HexCoord> {
    let candidates: Vec<HexCoord> = world
        .tiles()
        .filter(|t| t.kind.is_signal() && !t.visited && !pinged.contains(&t.coord))
        .map(|t| t.coord)
        .collect();
    candidates.choose(rng).copied()
}

/// Where we stand relative to the opponent on the way to the exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitProximity {
    Closer,
    Farther,
    Level,
}

/// Compare two positions by their distance to the exit
pub fn exit_proximity(world: &HexWorld, me: HexCoord, opponent: HexCoord) -> ExitProximity {
    let mine = me.distance_to(&world.exit);
    let theirs = opponent.distance_to(&world.exit);
    match mine.cmp(&theirs) {
        Ordering::Less => ExitProximity::Closer,
        Ordering::Greater => ExitProximity::Farther,
        Ordering::Equal => ExitProximity::Level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainKind;
    use crate::world::Tile;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_ruin_completes_at_target() {
        let mut ruin = RuinState::default();
        let at = HexCoord::new(5, -2);
        ruin.start(at);

        for _ in 1..RUIN_STUDY_TARGET {
            assert_eq!(ruin.advance(), None);
        }
        assert_eq!(ruin.advance(), Some(at));
        assert!(!ruin.active);
        assert!(ruin.is_completed(&at));
        assert_eq!(ruin.advance(), None);
    }

    #[test]
    fn test_wager_threshold() {
        let mut wager = WagerState::default();
        wager.start();
        let mut outcome = None;
        for i in 0..WAGER_LENGTH {
            // 180 of 200 passing is exactly 90%
            outcome = wager.advance(i >= 20);
        }
        let first = outcome.take().unwrap();
        assert!(first.won);
        assert_eq!(first.bonus(), WAGER_BONUS);
        assert!(!wager.active);

        wager.start();
        for i in 0..WAGER_LENGTH {
            outcome = wager.advance(i >= 21);
        }
        let second = outcome.unwrap();
        assert!(!second.won);
        assert_eq!(second.bonus(), 0);
    }

    #[test]
    fn test_wager_resolves_only_at_length() {
        let mut wager = WagerState::default();
        wager.start();
        for _ in 1..WAGER_LENGTH {
            assert_eq!(wager.advance(true), None);
        }
        assert!(wager.advance(true).is_some_and(|o| o.won && o.total == WAGER_LENGTH));
    }

    #[test]
    fn test_exit_proximity() {
        let world = HexWorld::from_tiles(
            0,
            1,
            vec![
                Tile::new(HexCoord::ORIGIN, TerrainKind::Start),
                Tile::new(HexCoord::new(4, 0), TerrainKind::Exit),
            ],
        );
        let me = HexCoord::new(2, 0);
        assert_eq!(exit_proximity(&world, me, HexCoord::ORIGIN), ExitProximity::Closer);
        assert_eq!(exit_proximity(&world, me, HexCoord::new(3, 0)), ExitProximity::Farther);
        assert_eq!(exit_proximity(&world, me, HexCoord::new(4, -2)), ExitProximity::Level);
    }

    #[test]
    fn test_radar_skips_visited_and_pinged() {
        let mut key = Tile::new(HexCoord::new(1, 0), TerrainKind::Key);
        key.visited = true;
        let world = HexWorld::from_tiles(
            0,
            1,
            vec![
                Tile::new(HexCoord::ORIGIN, TerrainKind::Start),
                key,
                Tile::new(HexCoord::new(2, 0), TerrainKind::Exit),
                Tile::new(HexCoord::new(3, 0), TerrainKind::Key),
            ],
        );

        let mut rng = StepRng::new(0, 0);
        let ping = radar_ping(&world, &[HexCoord::new(2, 0)], &mut rng);
        assert_eq!(ping, Some(HexCoord::new(3, 0)));

        let all = [HexCoord::new(2, 0), HexCoord::new(3, 0)];
        assert_eq!(radar_ping(&world, &all, &mut rng), None);
    }
}
