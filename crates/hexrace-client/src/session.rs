//! The client's game session.
//!
//! `GameSession` owns the profile, the match state machine and the running
//! expedition. It never touches the network itself: every handler returns
//! the [`Outbound`] actions the runtime should carry out, so the whole
//! session can be driven synchronously in tests.

use crate::commands::Command;
use crate::store::{SaveStore, StoreError};
use hexrace_core::{
    ExitProximity, Expedition, GameEvent, HexCoord, JoinOutcome, MatchPhase, MatchSnapshot, MatchSync, MoveAck,
    Profile, SaveRecord, SyncEvent, TrapOwner, WinLoss,
};
use rand::Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Work for the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Join,
    Move { to: HexCoord, found: bool },
    PlaceTrap(HexCoord),
    ClearTrap(HexCoord),
    Leave,
    StartPolling,
    StopPolling,
    /// Text for the player
    Notice(String),
}

/// Replies from the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    Joined(JoinOutcome),
    Status(MatchSnapshot),
    MoveAck { ack: MoveAck, found: bool },
    TrapAck { at: HexCoord, ok: bool },
}

pub struct GameSession {
    profile: Profile,
    sync: MatchSync,
    expedition: Option<Expedition>,
    store: SaveStore,
    category: String,
}

impl GameSession {
    /// Restore the session from `store`, or start a fresh profile
    pub fn load(store: SaveStore, username: &str, category: &str) -> Self {
        let record = match store.load() {
            Ok(record) => Some(record),
            Err(StoreError::Missing(path)) => {
                info!("No save at {}, creating a new profile", path.display());
                None
            }
            Err(err) => {
                warn!("Discarding unreadable save {}: {}", store.path().display(), err);
                None
            }
        };

        let session = match record {
            Some(record) => {
                let expedition = record.restore_expedition();
                let sync = match (record.match_seed, expedition.is_some()) {
                    (Some(seed), true) => MatchSync::resume(seed),
                    _ => MatchSync::new(),
                };
                Self {
                    profile: record.profile(),
                    expedition: sync.is_active().then_some(expedition).flatten(),
                    sync,
                    store,
                    category: category.to_string(),
                }
            }
            None => Self {
                profile: Profile {
                    uid: Uuid::new_v4().to_string(),
                    username: username.to_string(),
                    stats: WinLoss::default(),
                },
                sync: MatchSync::new(),
                expedition: None,
                store,
                category: category.to_string(),
            },
        };
        session.persist();
        session
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn phase(&self) -> MatchPhase {
        self.sync.phase()
    }

    pub fn expedition(&self) -> Option<&Expedition> {
        self.expedition.as_ref()
    }

    /// Actions to take right after loading
    pub fn startup(&self) -> Vec<Outbound> {
        if self.sync.wants_polling() {
            info!("Resuming match with seed {:?}", self.sync.seed());
            vec![
                Outbound::Notice("Resuming your match.".to_string()),
                Outbound::StartPolling,
            ]
        } else {
            Vec::new()
        }
    }

    pub fn handle_command<R: Rng>(&mut self, command: Command, rng: &mut R) -> Vec<Outbound> {
        let out = match command {
            Command::Join => self.join(),
            Command::Leave => self.leave(),
            Command::Move { target, climb } => self.move_to(target, climb, rng),
            Command::Study(study) => match self.expedition.as_mut() {
                Some(expedition) => notices(&expedition.on_study_event(study, rng)),
                None => vec![notice("Study recorded. Join a match to spend it.")],
            },
            Command::Ruin => self.with_action(|e| e.start_ruin_study()),
            Command::Wager => self.with_action(|e| e.start_wager()),
            Command::Recall => self.recall(),
            Command::Flare => self.with_action(|e| e.fire_flare()),
            Command::Ping => {
                let opponent = self.sync.opponent().position;
                self.with_action(|e| e.read_thermometer(opponent))
            }
            Command::Trap(at) => {
                let before = self.has_local_trap(at);
                let mut out = self.with_action(|e| e.place_trap(at));
                if !before && self.has_local_trap(at) {
                    out.push(Outbound::PlaceTrap(at));
                }
                out
            }
            Command::Untrap(at) => {
                let before = self.has_local_trap(at);
                let mut out = self.with_action(|e| e.remove_trap(at));
                if before && !self.has_local_trap(at) {
                    out.push(Outbound::ClearTrap(at));
                }
                out
            }
            Command::Look => vec![Outbound::Notice(self.render())],
            Command::Quit => Vec::new(),
        };
        self.persist();
        out
    }

    pub fn handle_net(&mut self, event: NetEvent) -> Vec<Outbound> {
        let out = match event {
            NetEvent::Joined(outcome) => {
                if self.sync.phase() != MatchPhase::Queued && !self.sync.can_join() {
                    debug!("Ignoring join reply while in {:?}", self.sync.phase());
                    return Vec::new();
                }
                let events = self.sync.on_joined(outcome);
                let mut out = vec![Outbound::StartPolling];
                if events.is_empty() {
                    out.push(notice("Waiting for an opponent..."));
                }
                out.extend(self.apply_sync(events));
                out
            }
            NetEvent::Status(snapshot) => {
                let events = self.sync.apply_snapshot(snapshot);
                self.apply_sync(events)
            }
            NetEvent::MoveAck { ack, found } => {
                let events = self.sync.on_move_ack(ack, found);
                self.apply_sync(events)
            }
            NetEvent::TrapAck { at, ok } => {
                if ok {
                    Vec::new()
                } else {
                    warn!("Coordinator refused the trap at {}", at);
                    vec![notice(&format!(
                        "The coordinator refused the trap at {at}; it will vanish on the next update."
                    ))]
                }
            }
        };
        self.persist();
        out
    }

    fn join(&mut self) -> Vec<Outbound> {
        if !self.sync.can_join() {
            return vec![notice("Already in a match. Use `leave` first.")];
        }
        self.expedition = None;
        vec![notice("Looking for a match..."), Outbound::Join]
    }

    fn leave(&mut self) -> Vec<Outbound> {
        if !self.sync.wants_polling() {
            return vec![notice("Not in a match.")];
        }
        info!("Leaving match");
        self.sync.leave();
        self.expedition = None;
        vec![Outbound::StopPolling, Outbound::Leave, notice("Left the match.")]
    }

    fn move_to<R: Rng>(&mut self, target: HexCoord, climb: bool, rng: &mut R) -> Vec<Outbound> {
        if !self.sync.is_active() {
            return vec![notice("No match running.")];
        }
        let Some(expedition) = self.expedition.as_mut() else {
            return vec![notice("No match running.")];
        };

        match expedition.resolve_move(target, climb, rng) {
            Err(rejection) => vec![notice(&rejection.to_string())],
            Ok(events) => {
                let found = expedition.is_won();
                let mut out = notices(&events);
                out.push(Outbound::Move { to: target, found });
                if found {
                    let terminal = self.sync.finish_local_win();
                    out.extend(self.apply_sync(terminal));
                }
                out
            }
        }
    }

    /// A recall is a move as far as the coordinator is concerned
    fn recall(&mut self) -> Vec<Outbound> {
        let Some(expedition) = self.expedition.as_mut() else {
            return vec![notice("No match running.")];
        };
        match expedition.recall() {
            Ok(events) => {
                let mut out = notices(&events);
                out.push(Outbound::Move {
                    to: expedition.position(),
                    found: false,
                });
                out
            }
            Err(err) => vec![notice(&err.to_string())],
        }
    }

    fn with_action<F>(&mut self, action: F) -> Vec<Outbound>
    where
        F: FnOnce(&mut Expedition) -> Result<Vec<GameEvent>, hexrace_core::ActionError>,
    {
        match self.expedition.as_mut() {
            None => vec![notice("No match running.")],
            Some(expedition) => match action(expedition) {
                Ok(events) => notices(&events),
                Err(err) => vec![notice(&err.to_string())],
            },
        }
    }

    fn has_local_trap(&self, at: HexCoord) -> bool {
        self.expedition
            .as_ref()
            .and_then(|e| e.world.get_tile(&at))
            .map_or(false, |tile| tile.trap_owner == Some(TrapOwner::Local))
    }

    fn apply_sync(&mut self, events: Vec<SyncEvent>) -> Vec<Outbound> {
        let mut out = Vec::new();
        for event in events {
            match event {
                SyncEvent::MatchStarted { seed, level } => {
                    info!("Match started with seed {} at level {}", seed, level);
                    let expedition = Expedition::start(seed, level);
                    out.push(notice(&format!(
                        "Match found! {} tiles to explore. Find the key, then the exit.",
                        expedition.world.len()
                    )));
                    self.expedition = Some(expedition);
                }
                SyncEvent::OpponentMoved { name, position } => {
                    let visible = self.expedition.as_ref().is_some_and(|e| e.player.opponent_visible);
                    if visible {
                        let name = name.unwrap_or_else(|| "Opponent".to_string());
                        out.push(notice(&format!("{name} moved to {position}")));
                    }
                }
                SyncEvent::TrapsReplaced { clusters } => {
                    if let Some(expedition) = self.expedition.as_mut() {
                        out.extend(notices(&expedition.reconcile_traps(&clusters)));
                    }
                }
                SyncEvent::TrappedByOpponent => {
                    if let Some(expedition) = self.expedition.as_mut() {
                        out.extend(notices(&expedition.apply_remote_trap_hit()));
                    }
                }
                SyncEvent::Terminal(outcome) => {
                    info!("Match over: {:?}", outcome);
                    self.profile.stats.record(outcome);
                    self.expedition = None;
                    out.push(Outbound::StopPolling);
                    out.push(notice(&format!(
                        "Match over: {:?}. Record {}-{}.",
                        outcome, self.profile.stats.w, self.profile.stats.l
                    )));
                }
                SyncEvent::StatsUpdated(stats) => {
                    if stats != self.profile.stats {
                        debug!("Coordinator record {:?} replaces {:?}", stats, self.profile.stats);
                    }
                    self.profile.stats = stats;
                }
            }
        }
        out
    }

    fn persist(&self) {
        let record = SaveRecord::capture(&self.profile, self.expedition.as_ref(), self.sync.seed());
        if let Err(err) = self.store.save(&record) {
            warn!("Could not write save {}: {}", self.store.path().display(), err);
        }
    }

    /// Text map of the known world with a status line
    pub fn render(&self) -> String {
        let Some(expedition) = self.expedition() else {
            return format!(
                "{} ({}-{}) - {:?}",
                self.profile.username, self.profile.stats.w, self.profile.stats.l,
                self.phase()
            );
        };

        let world = &expedition.world;
        let player = &expedition.player;
        let opponent = self
            .sync
            .opponent()
            .position
            .filter(|_| player.opponent_visible);
        let radius = world.radius as i32;

        let mut text = String::new();
        for r in -radius..=radius {
            let mut row = " ".repeat(r.unsigned_abs() as usize);
            for q in -radius..=radius {
                let coord = HexCoord::new(q, r);
                if coord.distance_to(&HexCoord::ORIGIN) as i32 > radius {
                    continue;
                }
                let glyph = match world.get_tile(&coord) {
                    _ if coord == player.position => '@',
                    _ if Some(coord) == opponent => '&',
                    Some(tile) if tile.trap_owner == Some(TrapOwner::Local) => 'x',
                    Some(tile) if tile.visited => tile.kind.info().glyph,
                    Some(_) if player.radar_targets.contains(&coord) => '!',
                    Some(_) => '?',
                    None => ' ',
                };
                row.push(glyph);
                row.push(' ');
            }
            if row.trim().is_empty() {
                continue;
            }
            text.push_str(row.trim_end());
            text.push('\n');
        }

        let effects: Vec<String> = player
            .effects
            .iter()
            .map(|e| format!("{:?} {}", e.kind, e.debt_remaining))
            .collect();
        text.push_str(&format!(
            "@ {}  currency {}  key {}  effects [{}]",
            player.position,
            player.currency,
            if player.has_key { "yes" } else { "no" },
            effects.join(", ")
        ));
        text
    }
}

fn notice(text: &str) -> Outbound {
    Outbound::Notice(text.to_string())
}

fn notices(events: &[GameEvent]) -> Vec<Outbound> {
    events.iter().filter_map(describe).map(Outbound::Notice).collect()
}

/// Player-facing text for an event; bookkeeping events stay silent
fn describe(event: &GameEvent) -> Option<String> {
    let text = match event {
        GameEvent::Moved { to, cost, .. } => format!("Moved to {to} for {cost}."),
        GameEvent::CurrencyChanged { .. } | GameEvent::VisionUpdated { .. } => return None,
        GameEvent::ClimbStarted { debt, .. } => format!("Climbing! Answer {debt} to reach the summit."),
        GameEvent::StudyCredited { amount } => format!("+{amount}"),
        GameEvent::EffectArmed { effect, debt } => format!("{effect:?}! Debt {debt}."),
        GameEvent::DebtIncreased { effect, debt } => format!("{effect:?} worsened, debt {debt}."),
        GameEvent::EffectCleared { effect } => format!("{effect:?} cleared."),
        GameEvent::CurrencyLost { amount } => format!("A sinkhole swallowed {amount}."),
        GameEvent::MemoryLost { tiles } => format!("A sandstorm hid {tiles} tiles."),
        GameEvent::MemoryRestored { tiles, remaining } => {
            format!("Recovered {tiles} tiles, {remaining} still hidden.")
        }
        GameEvent::RuinOffered { .. } => "Ancient ruins. Use `ruin` to study them.".to_string(),
        GameEvent::RuinAlreadyStudied { .. } => "You already studied these ruins.".to_string(),
        GameEvent::RuinStudyStarted { .. } => "Studying the ruins...".to_string(),
        GameEvent::RuinCompleted { .. } => "The ruins are deciphered.".to_string(),
        GameEvent::RadarPing { at } => format!("Radar ping at {at}!"),
        GameEvent::NoSignalsRemain => "The radar finds nothing new.".to_string(),
        GameEvent::WagerStarted { stake } => format!("Wager placed: {stake}."),
        GameEvent::WagerResolved {
            won,
            correct,
            total,
            bonus,
        } => {
            if *won {
                format!("Wager won ({correct}/{total}): +{bonus}.")
            } else {
                format!("Wager lost ({correct}/{total}).")
            }
        }
        GameEvent::KeyFound { .. } => "You found the key! The exit is unlocked.".to_string(),
        GameEvent::ExitLocked { .. } => "The exit is locked. Find the key first.".to_string(),
        GameEvent::MatchWon { .. } => "You escaped!".to_string(),
        GameEvent::TrapTriggered { .. } => "You stepped into a trap!".to_string(),
        GameEvent::TrapPlaced { center, cluster } => {
            format!("Trap laid at {center} covering {} tiles.", cluster.len())
        }
        GameEvent::TrapRemoved { at, tiles } => format!("Trap at {at} lifted ({tiles} tiles)."),
        GameEvent::OpponentTriggeredTrap { .. } => "Your opponent hit one of your traps!".to_string(),
        GameEvent::Recalled { to, cost, .. } => format!("Recalled to {to} for {cost}."),
        GameEvent::FlareFired { .. } => "A flare lights up the sky. Your opponent is revealed.".to_string(),
        GameEvent::ThermometerRead { reading } => match reading {
            ExitProximity::Closer => "Hot: you are closer to the exit.".to_string(),
            ExitProximity::Farther => "Cold: your opponent is closer to the exit.".to_string(),
            ExitProximity::Level => "Lukewarm: you are level with your opponent.".to_string(),
        },
    };
    Some(text)
}
