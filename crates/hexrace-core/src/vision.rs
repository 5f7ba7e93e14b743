//! Fog of war.
//!
//! A vision pass clears `visible` on every tile, then walks breadth-first
//! from the player's tile up to the current vision range. Every tile reached
//! becomes both `visible` and `visited`. Walls never pass sight through, and
//! forests and lakes only do so from a summit.

use crate::hex::HexCoord;
use crate::terrain::TerrainKind;
use crate::world::HexWorld;
use std::collections::{BTreeSet, VecDeque};

/// Vision range on ordinary terrain
pub const DEFAULT_VISION: u32 = 2;

/// Vision range while standing in a forest
pub const FOREST_VISION: u32 = 1;

/// Vision range from a conquered summit
pub const SUMMIT_VISION: u32 = 5;

/// Vision range while disoriented
pub const DISORIENTED_VISION: u32 = 1;

/// How far and through what the player can currently see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisionLimit {
    pub range: u32,
    /// Sight passes over forests and lakes
    pub summit: bool,
}

impl VisionLimit {
    /// Vision for a player standing on `standing_on`.
    ///
    /// The summit bonus only applies once the climb debt is fully paid.
    pub fn for_terrain(standing_on: TerrainKind, climbing: bool) -> Self {
        match standing_on {
            TerrainKind::Forest => Self {
                range: FOREST_VISION,
                summit: false,
            },
            TerrainKind::Mountain if !climbing => Self {
                range: SUMMIT_VISION,
                summit: true,
            },
            _ => Self {
                range: DEFAULT_VISION,
                summit: false,
            },
        }
    }

    fn blocks_sight(&self, kind: TerrainKind) -> bool {
        match kind {
            TerrainKind::Wall => true,
            TerrainKind::Forest | TerrainKind::Lake => !self.summit,
            _ => false,
        }
    }
}

/// Result of one vision pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisionReport {
    /// Tiles lit by this pass
    pub visible: usize,
    /// Tiles seen for the first time
    pub newly_visited: Vec<HexCoord>,
}

/// Recompute fog of war around `origin`.
///
/// While `disoriented`, nothing beyond distance 1 of the origin is reached
/// regardless of terrain.
pub fn update_vision(
    world: &mut HexWorld,
    origin: HexCoord,
    limit: VisionLimit,
    disoriented: bool,
) -> VisionReport {
    world.clear_visible();
    let mut report = VisionReport::default();
    if !world.contains(&origin) {
        return report;
    }

    let range = if disoriented {
        limit.range.min(DISORIENTED_VISION)
    } else {
        limit.range
    };

    let mut seen = BTreeSet::from([origin]);
    let mut queue = VecDeque::from([(origin, 0u32)]);
    light(world, origin, &mut report);

    while let Some((coord, depth)) = queue.pop_front() {
        if depth >= range {
            continue;
        }
        for next in coord.neighbors() {
            if seen.contains(&next) || !world.contains(&next) {
                continue;
            }
            if disoriented && next.distance_to(&origin) > DISORIENTED_VISION {
                continue;
            }
            seen.insert(next);
            light(world, next, &mut report);

            let blocked = world
                .kind_at(&next)
                .is_some_and(|kind| limit.blocks_sight(kind));
            if !blocked {
                queue.push_back((next, depth + 1));
            }
        }
    }

    report
}

fn light(world: &mut HexWorld, coord: HexCoord, report: &mut VisionReport) {
    if let Some(tile) = world.get_tile_mut(&coord) {
        tile.visible = true;
        report.visible += 1;
        if !tile.visited {
            tile.visited = true;
            report.newly_visited.push(coord);
        }
    }
}
