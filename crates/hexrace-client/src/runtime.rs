//! Async runtime for the client.
//!
//! A single logic loop owns the [`GameSession`]. Stdin lines and coordinator
//! replies both reach it as [`RuntimeEvent`]s over one unbounded channel, so
//! session state is only ever touched from one task. Coordinator calls run
//! in short-lived background tasks; status polling runs in a task of its own
//! that is aborted when the match ends.

use crate::commands::Command;
use crate::config::ClientConfig;
use crate::coordinator::HttpCoordinator;
use crate::session::{GameSession, NetEvent, Outbound};
use crate::store::SaveStore;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum RuntimeEvent {
    Command(Command),
    Net(NetEvent),
}

/// Executes [`Outbound`] actions against the coordinator
struct Dispatcher {
    coordinator: HttpCoordinator,
    tx: mpsc::UnboundedSender<RuntimeEvent>,
    uid: String,
    username: String,
    category: String,
    poll_interval: Duration,
    poller: Option<JoinHandle<()>>,
}

impl Dispatcher {
    fn dispatch(&mut self, action: Outbound) {
        match action {
            Outbound::Notice(text) => println!("{text}"),
            Outbound::StartPolling => self.start_polling(),
            Outbound::StopPolling => self.stop_polling(),
            Outbound::Join => {
                let (coordinator, tx) = (self.coordinator.clone(), self.tx.clone());
                let (uid, username, category) =
                    (self.uid.clone(), self.username.clone(), self.category.clone());
                tokio::spawn(async move {
                    match coordinator.join(&uid, &username, &category).await {
                        Ok(outcome) => {
                            let _ = tx.send(RuntimeEvent::Net(NetEvent::Joined(outcome)));
                        }
                        Err(e) => warn!("Join failed: {}", e),
                    }
                });
            }
            Outbound::Move { to, found } => {
                let (coordinator, tx, uid) = (self.coordinator.clone(), self.tx.clone(), self.uid.clone());
                tokio::spawn(async move {
                    match coordinator.send_move(&uid, to, found).await {
                        Ok(ack) => {
                            let _ = tx.send(RuntimeEvent::Net(NetEvent::MoveAck { ack, found }));
                        }
                        Err(e) => debug!("Move report to {} failed: {}", to, e),
                    }
                });
            }
            Outbound::PlaceTrap(at) => {
                let (coordinator, tx, uid) = (self.coordinator.clone(), self.tx.clone(), self.uid.clone());
                tokio::spawn(async move {
                    match coordinator.place_trap(&uid, at).await {
                        Ok(ok) => {
                            let _ = tx.send(RuntimeEvent::Net(NetEvent::TrapAck { at, ok }));
                        }
                        Err(e) => warn!("Trap placement at {} failed: {}", at, e),
                    }
                });
            }
            Outbound::ClearTrap(at) => {
                let (coordinator, uid) = (self.coordinator.clone(), self.uid.clone());
                tokio::spawn(async move {
                    if let Err(e) = coordinator.clear_trap(&uid, at).await {
                        warn!("Trap removal at {} failed: {}", at, e);
                    }
                });
            }
            Outbound::Leave => {
                let (coordinator, uid) = (self.coordinator.clone(), self.uid.clone());
                tokio::spawn(async move {
                    if let Err(e) = coordinator.leave(&uid).await {
                        warn!("Leave failed: {}", e);
                    }
                });
            }
        }
    }

    fn start_polling(&mut self) {
        if self.poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let (coordinator, tx, uid) = (self.coordinator.clone(), self.tx.clone(), self.uid.clone());
        let period = self.poll_interval;
        debug!("Polling every {:?}", period);

        self.poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match coordinator.status(&uid).await {
                    Ok(snapshot) => {
                        if tx.send(RuntimeEvent::Net(NetEvent::Status(snapshot))).is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!("Status poll failed: {}", e),
                }
            }
        }));
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            debug!("Stopping status polling");
            handle.abort();
        }
    }
}

fn spawn_stdin_reader(tx: mpsc::UnboundedSender<RuntimeEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("stdin read failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if tx.send(RuntimeEvent::Command(command)).is_err() {
                        return;
                    }
                }
                Err(e) => println!("{e}"),
            }
        }
        let _ = tx.send(RuntimeEvent::Command(Command::Quit));
    })
}

/// Run the client until `quit` or end of input
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let coordinator = HttpCoordinator::new(&config.coordinator_url, config.request_timeout)?;
    let mut session = GameSession::load(
        SaveStore::new(&config.save_path),
        &config.username,
        &config.category,
    );
    info!(
        "Playing as {} ({}) against {}",
        session.profile().username,
        session.profile().uid,
        config.coordinator_url
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut dispatcher = Dispatcher {
        coordinator,
        tx: tx.clone(),
        uid: session.profile().uid.clone(),
        username: session.profile().username.clone(),
        category: session.category().to_string(),
        poll_interval: config.poll_interval,
        poller: None,
    };
    let stdin = spawn_stdin_reader(tx);

    println!("{}", session.render());
    for action in session.startup() {
        dispatcher.dispatch(action);
    }

    let mut rng = rand::thread_rng();
    while let Some(event) = rx.recv().await {
        let actions = match event {
            RuntimeEvent::Command(Command::Quit) => break,
            RuntimeEvent::Command(command) => session.handle_command(command, &mut rng),
            RuntimeEvent::Net(net) => session.handle_net(net),
        };
        for action in actions {
            dispatcher.dispatch(action);
        }
    }

    dispatcher.stop_polling();
    stdin.abort();
    info!("Goodbye");
    Ok(())
}
