//! Match synchronization with the remote coordinator.
//!
//! `MatchSync` is a pure state machine. The client feeds it join replies,
//! status snapshots and move acknowledgements; it answers with `SyncEvent`s
//! describing what the local game should do. The coordinator wins for
//! opponent and trap state, the local expedition wins for its own position
//! and currency.
//!
//! ```text
//! Idle -> Queued -> Active -> Finished(Won | Lost | Expired | OpponentLeft)
//! ```
//!
//! A terminal outcome is reported at most once per match.

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};

/// Status strings the coordinator reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorStatus {
    Idle,
    Queued,
    Active,
    /// Older coordinators say `matched` for an active match
    Matched,
    Won,
    Lost,
    OpponentLeft,
    Expired,
}

impl CoordinatorStatus {
    /// The terminal outcome this status denotes, if any
    pub fn outcome(self) -> Option<MatchOutcome> {
        match self {
            CoordinatorStatus::Won => Some(MatchOutcome::Won),
            CoordinatorStatus::Lost => Some(MatchOutcome::Lost),
            CoordinatorStatus::OpponentLeft => Some(MatchOutcome::OpponentLeft),
            CoordinatorStatus::Expired => Some(MatchOutcome::Expired),
            _ => None,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, CoordinatorStatus::Active | CoordinatorStatus::Matched)
    }
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Won,
    Lost,
    Expired,
    OpponentLeft,
}

/// Win/loss record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub l: u32,
}

impl WinLoss {
    /// Count a finished match; only wins and losses are recorded
    pub fn record(&mut self, outcome: MatchOutcome) {
        match outcome {
            MatchOutcome::Won => self.w += 1,
            MatchOutcome::Lost => self.l += 1,
            MatchOutcome::Expired | MatchOutcome::OpponentLeft => {}
        }
    }
}

/// Local lifecycle of the match slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Idle,
    Queued,
    Active,
    Finished(MatchOutcome),
}

/// What we know about the opponent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentView {
    pub name: Option<String>,
    pub position: Option<HexCoord>,
    pub stats: WinLoss,
}

/// One status reply from the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub status: CoordinatorStatus,
    pub seed: Option<u64>,
    pub level: u32,
    pub opponent: OpponentView,
    pub my_stats: Option<WinLoss>,
    /// Our trap clusters the coordinator still holds
    pub my_traps: Vec<Vec<HexCoord>>,
}

impl MatchSnapshot {
    /// A bare snapshot with only a status
    pub fn status(status: CoordinatorStatus) -> Self {
        Self {
            status,
            seed: None,
            level: 1,
            opponent: OpponentView::default(),
            my_stats: None,
            my_traps: Vec::new(),
        }
    }
}

/// Reply to a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAck {
    /// The destination held an opponent trap
    pub trapped: bool,
    pub game_over: bool,
}

/// Reply to a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Queued,
    Matched { seed: u64, level: u32 },
}

/// Instructions for the local game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Generate the world for this seed and start playing
    MatchStarted { seed: u64, level: u32 },
    OpponentMoved { name: Option<String>, position: HexCoord },
    /// Replace local trap markings with these clusters
    TrapsReplaced { clusters: Vec<Vec<HexCoord>> },
    Terminal(MatchOutcome),
    /// Our last move landed in an opponent trap
    TrappedByOpponent,
    /// The coordinator's record of our wins and losses
    StatsUpdated(WinLoss),
}

/// Match state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSync {
    phase: MatchPhase,
    seed: Option<u64>,
    opponent: OpponentView,
    terminal_handled: bool,
}

impl MatchSync {
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::Idle,
            seed: None,
            opponent: OpponentView::default(),
            terminal_handled: false,
        }
    }

    /// Resume an active match after a restart
    pub fn resume(seed: u64) -> Self {
        Self {
            phase: MatchPhase::Active,
            seed: Some(seed),
            ..Self::new()
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn opponent(&self) -> &OpponentView {
        &self.opponent
    }

    pub fn is_active(&self) -> bool {
        self.phase == MatchPhase::Active
    }

    /// Whether status polling should run
    pub fn wants_polling(&self) -> bool {
        matches!(self.phase, MatchPhase::Queued | MatchPhase::Active)
    }

    /// Whether a new join may be sent
    pub fn can_join(&self) -> bool {
        matches!(self.phase, MatchPhase::Idle | MatchPhase::Finished(_))
    }

    /// Handle the reply to a join request
    pub fn on_joined(&mut self, outcome: JoinOutcome) -> Vec<SyncEvent> {
        self.terminal_handled = false;
        self.opponent = OpponentView::default();
        match outcome {
            JoinOutcome::Queued => {
                self.phase = MatchPhase::Queued;
                self.seed = None;
                Vec::new()
            }
            JoinOutcome::Matched { seed, level } => self.begin(seed, level),
        }
    }

    fn begin(&mut self, seed: u64, level: u32) -> Vec<SyncEvent> {
        self.phase = MatchPhase::Active;
        self.seed = Some(seed);
        vec![SyncEvent::MatchStarted { seed, level }]
    }

    /// Merge a status snapshot.
    ///
    /// Reported stats come last so they overwrite anything recorded locally
    /// for a terminal outcome in the same snapshot.
    pub fn apply_snapshot(&mut self, mut snapshot: MatchSnapshot) -> Vec<SyncEvent> {
        let my_stats = snapshot.my_stats.take();
        let mut events = self.merge(snapshot);
        if let Some(stats) = my_stats {
            events.push(SyncEvent::StatsUpdated(stats));
        }
        events
    }

    fn merge(&mut self, snapshot: MatchSnapshot) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        match self.phase {
            MatchPhase::Idle | MatchPhase::Finished(_) => return events,
            MatchPhase::Queued | MatchPhase::Active => {}
        }

        if let Some(outcome) = snapshot.status.outcome() {
            return self.terminate(outcome);
        }

        match (self.phase, snapshot.status) {
            // The coordinator dropped a running match
            (MatchPhase::Active, CoordinatorStatus::Idle) => {
                return self.terminate(MatchOutcome::OpponentLeft)
            }
            (_, status) if !status.is_active() => return events,
            _ => {}
        }

        if self.phase == MatchPhase::Queued {
            match snapshot.seed {
                Some(seed) => events.extend(self.begin(seed, snapshot.level)),
                None => return events,
            }
        }

        let opponent = snapshot.opponent;
        if let Some(position) = opponent.position {
            if self.opponent.position != Some(position) {
                events.push(SyncEvent::OpponentMoved {
                    name: opponent.name.clone(),
                    position,
                });
            }
        }
        self.opponent = opponent;

        events.push(SyncEvent::TrapsReplaced {
            clusters: snapshot.my_traps,
        });
        events
    }

    /// Handle the reply to a move; `found_exit` is what the move reported.
    /// `game_over` on a move that did not find the exit means the opponent
    /// got there first.
    pub fn on_move_ack(&mut self, ack: MoveAck, found_exit: bool) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        if !self.is_active() {
            return events;
        }
        if ack.trapped {
            events.push(SyncEvent::TrappedByOpponent);
        }
        if ack.game_over {
            let outcome = if found_exit {
                MatchOutcome::Won
            } else {
                MatchOutcome::Lost
            };
            events.extend(self.terminate(outcome));
        }
        events
    }

    /// The local expedition reached the exit with a key
    pub fn finish_local_win(&mut self) -> Vec<SyncEvent> {
        self.terminate(MatchOutcome::Won)
    }

    /// Give up the match slot
    pub fn leave(&mut self) {
        self.phase = MatchPhase::Idle;
        self.seed = None;
        self.opponent = OpponentView::default();
    }

    fn terminate(&mut self, outcome: MatchOutcome) -> Vec<SyncEvent> {
        if self.terminal_handled || !self.wants_polling() {
            return Vec::new();
        }
        self.terminal_handled = true;
        self.phase = MatchPhase::Finished(outcome);
        vec![SyncEvent::Terminal(outcome)]
    }
}

impl Default for MatchSync {
    fn default() -> Self {
        Self::new()
    }
}
