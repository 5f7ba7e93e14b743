//! Trap clusters.
//!
//! A trap covers a center tile and its existing neighbors. Locally laid
//! traps are shown optimistically, then replaced wholesale by whatever the
//! coordinator confirms on each poll.

use crate::actions::GameEvent;
use crate::hex::HexCoord;
use crate::world::{HexWorld, TrapOwner};
use serde::{Deserialize, Serialize};

/// Currency needed to lay a trap
pub const TRAP_COST: u32 = 250;

/// Trap bookkeeping for one match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapSystem {
    next_group: u32,
    /// Local clusters the coordinator reported on the last poll
    confirmed_count: Option<usize>,
}

impl TrapSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild bookkeeping from the trap markings already in a world
    pub fn from_world(world: &HexWorld) -> Self {
        let next_group = world
            .tiles()
            .filter_map(|t| t.trap_group)
            .max()
            .map_or(0, |g| g + 1);
        Self {
            next_group,
            confirmed_count: None,
        }
    }

    fn fresh_group(&mut self) -> u32 {
        let group = self.next_group;
        self.next_group += 1;
        group
    }

    /// Mark a local trap around `center`; returns the cluster
    pub fn place(&mut self, world: &mut HexWorld, center: HexCoord) -> Vec<HexCoord> {
        let cluster = world.trap_cluster(center);
        let group = self.fresh_group();
        world.mark_trap(&cluster, TrapOwner::Local, group);
        cluster
    }

    /// Record an opponent cluster known to this client
    pub fn mark_opponent_trap(&mut self, world: &mut HexWorld, cluster: &[HexCoord]) -> u32 {
        let group = self.fresh_group();
        world.mark_trap(cluster, TrapOwner::Opponent, group);
        group
    }

    /// Spring an opponent trap at `at`, clearing its whole cluster.
    /// Returns the group that fired.
    pub fn check_trigger(&mut self, world: &mut HexWorld, at: &HexCoord) -> Option<u32> {
        let tile = world.get_tile(at)?;
        if tile.trap_owner != Some(TrapOwner::Opponent) {
            return None;
        }
        let group = tile.trap_group?;
        world.clear_trap_group(TrapOwner::Opponent, group);
        Some(group)
    }

    /// Remove the local cluster covering `at`; returns how many tiles it covered
    pub fn lift(&mut self, world: &mut HexWorld, at: &HexCoord) -> Option<usize> {
        let tile = world.get_tile(at)?;
        if tile.trap_owner != Some(TrapOwner::Local) {
            return None;
        }
        let group = tile.trap_group?;
        Some(world.clear_trap_group(TrapOwner::Local, group))
    }

    /// Replace every local trap marking with the coordinator's clusters
    pub fn reconcile(&mut self, world: &mut HexWorld, clusters: &[Vec<HexCoord>]) -> Vec<GameEvent> {
        world.clear_traps_owned_by(TrapOwner::Local);
        for cluster in clusters {
            let group = self.fresh_group();
            world.mark_trap(cluster, TrapOwner::Local, group);
        }

        let mut events = Vec::new();
        let remaining = clusters.len();
        if self.confirmed_count.is_some_and(|previous| remaining < previous) {
            events.push(GameEvent::OpponentTriggeredTrap { remaining });
        }
        self.confirmed_count = Some(remaining);
        events
    }
}
