//! Hex coordinate system using axial coordinates (q, r).
//!
//! Every tile of a world is addressed by a `HexCoord`. Axial coordinates keep
//! neighbor and distance calculations simple and avoid the wasted space of
//! offset coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
///
/// Coordinates are ordered by `(q, r)` so that maps keyed by them iterate
/// deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// The world origin, where every player starts
    pub const ORIGIN: HexCoord = HexCoord::new(0, 0);

    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes in clockwise order starting from East
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),     // East
            HexCoord::new(self.q + 1, self.r - 1), // NorthEast
            HexCoord::new(self.q, self.r - 1),     // NorthWest
            HexCoord::new(self.q - 1, self.r),     // West
            HexCoord::new(self.q - 1, self.r + 1), // SouthWest
            HexCoord::new(self.q, self.r + 1),     // SouthEast
        ]
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Whether `other` is one of the six immediate neighbors
    pub fn is_adjacent(&self, other: &HexCoord) -> bool {
        self.distance_to(other) == 1
    }
}

impl fmt::Display for HexCoord {
    /// Formats as `"q,r"`, the key form used by the save record
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Error returned when a `"q,r"` key cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex key: {0:?}")]
pub struct ParseHexError(pub String);

impl FromStr for HexCoord {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| ParseHexError(s.to_string()))?;
        let q = q.trim().parse().map_err(|_| ParseHexError(s.to_string()))?;
        let r = r.trim().parse().map_err(|_| ParseHexError(s.to_string()))?;
        Ok(HexCoord::new(q, r))
    }
}
