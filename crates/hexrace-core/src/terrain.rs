//! Terrain catalog.
//!
//! Each `TerrainKind` maps to a static `TerrainInfo` row holding its display
//! name, base traversal cost and passability. Dynamic adjustments (scrub
//! discount, tundra cold stacks) are applied by the movement rules in
//! [`crate::game`], never stored here.

use serde::{Deserialize, Serialize};

/// Kind of terrain on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// The origin tile every player starts on
    Start,
    /// The objective tile
    Exit,
    /// Holds a key that unlocks the exit
    Key,
    Plains,
    Hills,
    Scrub,
    /// Shrinks vision to 1 and blocks sight lines
    Forest,
    /// Impassable and blocks sight lines
    Lake,
    /// Free to enter but requires a climb; the summit widens vision
    Mountain,
    /// Impassable and opaque
    Wall,
    Tundra,
    Wasteland,
    Volcanic,
    Swamp,
    Dunes,
    /// Archive puzzle tile
    Ruins,
}

/// Static metadata for a terrain kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainInfo {
    pub name: &'static str,
    /// Currency needed to step onto the tile before dynamic adjustments
    pub base_cost: u32,
    pub passable: bool,
    /// Single-character glyph for text renderings
    pub glyph: char,
}

const fn info(name: &'static str, base_cost: u32, passable: bool, glyph: char) -> TerrainInfo {
    TerrainInfo {
        name,
        base_cost,
        passable,
        glyph,
    }
}

impl TerrainKind {
    /// All terrain kinds
    pub const ALL: [TerrainKind; 16] = [
        TerrainKind::Start,
        TerrainKind::Exit,
        TerrainKind::Key,
        TerrainKind::Plains,
        TerrainKind::Hills,
        TerrainKind::Scrub,
        TerrainKind::Forest,
        TerrainKind::Lake,
        TerrainKind::Mountain,
        TerrainKind::Wall,
        TerrainKind::Tundra,
        TerrainKind::Wasteland,
        TerrainKind::Volcanic,
        TerrainKind::Swamp,
        TerrainKind::Dunes,
        TerrainKind::Ruins,
    ];

    /// Catalog row for this kind
    pub const fn info(self) -> TerrainInfo {
        match self {
            TerrainKind::Start => info("Base", 0, true, 'S'),
            TerrainKind::Exit => info("Artifact", 0, true, 'E'),
            TerrainKind::Key => info("Key", 0, true, 'K'),
            TerrainKind::Plains => info("Plains", 20, true, '.'),
            TerrainKind::Hills => info("Hills", 40, true, 'h'),
            TerrainKind::Scrub => info("Scrub", 60, true, ','),
            TerrainKind::Forest => info("Forest", 50, true, 'f'),
            TerrainKind::Lake => info("Lake", 0, false, '~'),
            TerrainKind::Mountain => info("Mountain", 0, true, '^'),
            TerrainKind::Wall => info("Bedrock", 0, false, '#'),
            TerrainKind::Tundra => info("Tundra", 100, true, '*'),
            TerrainKind::Wasteland => info("Jagged Peaks", 100, true, 'w'),
            TerrainKind::Volcanic => info("Volcanic", 100, true, 'v'),
            TerrainKind::Swamp => info("Bog", 50, true, 's'),
            TerrainKind::Dunes => info("Dunes", 40, true, 'd'),
            TerrainKind::Ruins => info("Ancient Ruins", 0, true, 'R'),
        }
    }

    /// Base traversal cost
    pub const fn base_cost(self) -> u32 {
        self.info().base_cost
    }

    /// Whether a player may ever stand on this kind
    pub const fn is_passable(self) -> bool {
        self.info().passable
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Open ground that forest clusters may grow over
    pub fn is_open(self) -> bool {
        matches!(self, TerrainKind::Plains | TerrainKind::Hills | TerrainKind::Scrub)
    }

    /// Outer-rim terrain the exit is chosen from
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            TerrainKind::Tundra | TerrainKind::Wasteland | TerrainKind::Volcanic
        )
    }

    /// Objective tiles the radar can ping
    pub fn is_signal(self) -> bool {
        matches!(self, TerrainKind::Key | TerrainKind::Exit)
    }
}
