//! JSON messages exchanged with the match coordinator.
//!
//! Coordinates travel as `[q, r]` pairs.

use hexrace_core::{
    CoordinatorStatus, HexCoord, JoinOutcome, MatchSnapshot, MoveAck, OpponentView, WinLoss,
};
use serde::{Deserialize, Serialize};

/// A coordinate on the wire
pub type WirePos = (i32, i32);

fn to_coord((q, r): WirePos) -> HexCoord {
    HexCoord::new(q, r)
}

/// Request body for `/join`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub uid: String,
    pub username: String,
    pub category: String,
}

/// Request body for `/status` and `/leave`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UidRequest {
    pub uid: String,
}

/// Request body for `/move`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub uid: String,
    pub q: i32,
    pub r: i32,
    /// The move reached the exit holding a key
    pub found: bool,
}

/// Request body for `/place_trap` and `/clear_trap`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrapRequest {
    pub uid: String,
    pub q: i32,
    pub r: i32,
}

/// Reply to `/join`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub status: CoordinatorStatus,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub level: Option<u32>,
}

impl JoinResponse {
    pub fn outcome(&self) -> JoinOutcome {
        match (self.status.is_active(), self.seed) {
            (true, Some(seed)) => JoinOutcome::Matched {
                seed,
                level: self.level.unwrap_or(1),
            },
            _ => JoinOutcome::Queued,
        }
    }
}

/// Reply to `/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: CoordinatorStatus,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub opponent_pos: Option<WirePos>,
    #[serde(default)]
    pub opponent_name: Option<String>,
    #[serde(default)]
    pub opponent_stats: Option<WinLoss>,
    #[serde(default)]
    pub my_stats: Option<WinLoss>,
    #[serde(default)]
    pub my_traps: Vec<Vec<WirePos>>,
}

impl From<StatusResponse> for MatchSnapshot {
    fn from(response: StatusResponse) -> Self {
        MatchSnapshot {
            status: response.status,
            seed: response.seed,
            level: response.level.unwrap_or(1),
            opponent: OpponentView {
                name: response.opponent_name,
                position: response.opponent_pos.map(to_coord),
                stats: response.opponent_stats.unwrap_or_default(),
            },
            my_stats: response.my_stats,
            my_traps: response
                .my_traps
                .into_iter()
                .map(|cluster| cluster.into_iter().map(to_coord).collect())
                .collect(),
        }
    }
}

/// Reply to `/move`.
///
/// The coordinator answers with `{"status": "trapped" | "game_over"}`;
/// the boolean flags are still accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub trapped: bool,
    #[serde(default)]
    pub game_over: bool,
}

impl From<MoveResponse> for MoveAck {
    fn from(response: MoveResponse) -> Self {
        let status = response.status.as_deref();
        MoveAck {
            trapped: response.trapped || status == Some("trapped"),
            game_over: response.game_over || status == Some("game_over"),
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default = "default_ok")]
    pub ok: bool,
}

fn default_ok() -> bool {
    true
}
