//! World representation: tiles, fog-of-war flags and trap markings.
//!
//! A `HexWorld` is produced once per match by the [`crate::generator`] and its
//! geometry never changes afterwards. Only the per-tile `visible`, `visited`,
//! `locked` and trap fields mutate during play.

use crate::hex::HexCoord;
use crate::terrain::TerrainKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who laid a trap on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapOwner {
    /// Laid by this client's player
    Local,
    /// Laid by the opponent and known to this client
    Opponent,
}

/// A single hex tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub coord: HexCoord,
    /// What kind of terrain this is
    pub kind: TerrainKind,
    /// Currency needed to enter, derived from the kind
    pub cost: u32,
    /// In sight this turn (recomputed every vision pass)
    #[serde(default)]
    pub visible: bool,
    /// Seen at least once
    #[serde(default)]
    pub visited: bool,
    /// Gated until a key is held (the exit)
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub trap_owner: Option<TrapOwner>,
    #[serde(default)]
    pub trap_group: Option<u32>,
    /// Rendering noise, not gameplay relevant
    #[serde(default)]
    pub variant: u8,
}

impl Tile {
    /// Create an unexplored tile of the given kind
    pub fn new(coord: HexCoord, kind: TerrainKind) -> Self {
        Self {
            coord,
            kind,
            cost: kind.base_cost(),
            visible: false,
            visited: false,
            locked: false,
            trap_owner: None,
            trap_group: None,
            variant: 0,
        }
    }

    /// Change the terrain kind, re-deriving the cost
    pub fn set_kind(&mut self, kind: TerrainKind) {
        self.kind = kind;
        self.cost = kind.base_cost();
    }

    pub fn is_passable(&self) -> bool {
        self.kind.is_passable()
    }
}

/// The complete generated world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexWorld {
    /// Determinism key issued by the coordinator
    pub seed: u64,
    pub level: u32,
    /// 1 + the largest distance of any tile from the origin
    pub radius: u32,
    /// Always the origin
    pub start: HexCoord,
    /// The objective tile
    pub exit: HexCoord,
    /// All tiles indexed by coordinate
    tiles: BTreeMap<HexCoord, Tile>,
}

impl HexWorld {
    /// Create an empty world
    pub fn new(seed: u64, level: u32) -> Self {
        Self {
            seed,
            level,
            radius: 0,
            start: HexCoord::ORIGIN,
            exit: HexCoord::ORIGIN,
            tiles: BTreeMap::new(),
        }
    }

    /// Build a world from prepared tiles.
    ///
    /// The start is the origin, the exit is the first tile of kind `Exit`
    /// (origin if there is none) and the radius is derived from the tiles.
    pub fn from_tiles(seed: u64, level: u32, tiles: impl IntoIterator<Item = Tile>) -> Self {
        let mut world = Self::new(seed, level);
        for tile in tiles {
            world.tiles.insert(tile.coord, tile);
        }
        world.exit = world
            .tiles
            .values()
            .find(|t| t.kind == TerrainKind::Exit)
            .map(|t| t.coord)
            .unwrap_or(HexCoord::ORIGIN);
        world.recompute_radius();
        world
    }

    // ==================== Query Methods ====================

    /// Get a tile by coordinate
    pub fn get_tile(&self, coord: &HexCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    /// Get a mutable tile by coordinate
    pub fn get_tile_mut(&mut self, coord: &HexCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(coord)
    }

    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.tiles.contains_key(coord)
    }

    /// All tiles in coordinate order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.values_mut()
    }

    /// All coordinates in order
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.tiles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles of the given kind
    pub fn count_kind(&self, kind: TerrainKind) -> usize {
        self.tiles.values().filter(|t| t.kind == kind).count()
    }

    /// Terrain kind at a coordinate
    pub fn kind_at(&self, coord: &HexCoord) -> Option<TerrainKind> {
        self.tiles.get(coord).map(|t| t.kind)
    }

    /// Existing neighbors of a coordinate
    pub fn neighbors_of(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.tiles.contains_key(n))
            .collect()
    }

    /// Coordinates currently marked visible
    pub fn visible_coords(&self) -> Vec<HexCoord> {
        self.tiles
            .values()
            .filter(|t| t.visible)
            .map(|t| t.coord)
            .collect()
    }

    // ==================== Mutation Methods ====================

    pub(crate) fn insert(&mut self, tile: Tile) {
        self.tiles.insert(tile.coord, tile);
    }

    /// Change the kind of an existing tile
    pub fn set_kind(&mut self, coord: &HexCoord, kind: TerrainKind) {
        if let Some(tile) = self.tiles.get_mut(coord) {
            tile.set_kind(kind);
        }
    }

    /// Recompute the radius from the current tile set
    pub fn recompute_radius(&mut self) {
        let max = self
            .tiles
            .keys()
            .map(|c| c.distance_to(&HexCoord::ORIGIN))
            .max()
            .unwrap_or(0);
        self.radius = max + 1;
    }

    /// Clear `visible` on every tile
    pub fn clear_visible(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.visible = false;
        }
    }

    /// Lock or unlock the exit
    pub fn set_exit_locked(&mut self, locked: bool) {
        let exit = self.exit;
        if let Some(tile) = self.tiles.get_mut(&exit) {
            tile.locked = locked;
        }
    }

    // ==================== Traps ====================

    /// The 7-tile cluster around a center, clipped to existing tiles
    pub fn trap_cluster(&self, center: HexCoord) -> Vec<HexCoord> {
        std::iter::once(center)
            .chain(center.neighbors())
            .filter(|c| self.tiles.contains_key(c))
            .collect()
    }

    /// Mark a cluster of tiles as trapped
    pub fn mark_trap(&mut self, cluster: &[HexCoord], owner: TrapOwner, group: u32) {
        for coord in cluster {
            if let Some(tile) = self.tiles.get_mut(coord) {
                tile.trap_owner = Some(owner);
                tile.trap_group = Some(group);
            }
        }
    }

    /// Remove every marking of one trap group; returns how many tiles were cleared
    pub fn clear_trap_group(&mut self, owner: TrapOwner, group: u32) -> usize {
        let mut cleared = 0;
        for tile in self.tiles.values_mut() {
            if tile.trap_owner == Some(owner) && tile.trap_group == Some(group) {
                tile.trap_owner = None;
                tile.trap_group = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Remove every trap marking laid by `owner`
    pub fn clear_traps_owned_by(&mut self, owner: TrapOwner) {
        for tile in self.tiles.values_mut() {
            if tile.trap_owner == Some(owner) {
                tile.trap_owner = None;
                tile.trap_group = None;
            }
        }
    }

    /// Convert to the flat record stored in the save file
    pub fn to_record(&self) -> WorldRecord {
        WorldRecord {
            seed: self.seed,
            level: self.level,
            radius: self.radius,
            start: self.start,
            exit: self.exit,
            tiles: self.tiles.values().cloned().collect(),
        }
    }

    /// Rebuild from a save record
    pub fn from_record(record: WorldRecord) -> Self {
        let mut world = Self::new(record.seed, record.level);
        for tile in record.tiles {
            world.tiles.insert(tile.coord, tile);
        }
        world.radius = record.radius;
        world.start = record.start;
        world.exit = record.exit;
        world
    }
}

/// JSON-friendly world representation with an array instead of a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub seed: u64,
    pub level: u32,
    pub radius: u32,
    pub start: HexCoord,
    pub exit: HexCoord,
    pub tiles: Vec<Tile>,
}
