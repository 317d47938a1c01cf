//! Line-oriented in-process driver
//!
//! Reads JSON commands one per line, runs them against a [`ChatServer`],
//! and writes JSON events one per line. Every connected participant gets
//! a consumer task that drains its mailbox into `delivered` events.
//! There is no network listener; stdin/stdout (or any async reader and
//! writer) stand in for the connections.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::DriverError;
use crate::mailbox::Delivery;
use crate::message::{Command, ErrorCode, Event};
use crate::participant::Participant;
use crate::server::ChatServer;

/// A participant connected through the driver
struct Session {
    participant: Arc<Participant>,
    consumer: JoinHandle<()>,
}

/// Run the driver until `input` is exhausted
///
/// On end of input every remaining participant is disconnected and its
/// mailbox drained before returning. Returns the output writer.
pub async fn run<R, W>(server: Arc<ChatServer>, input: R, output: W) -> Result<W, DriverError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    // Spawn write task (Event -> output)
    let writer = tokio::spawn(write_events(event_rx, output));

    let mut sessions: HashMap<String, Session> = HashMap::new();
    let mut finished: Vec<JoinHandle<()>> = Vec::new();

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Command>(line) {
            Ok(cmd) => {
                handle_command(&server, &mut sessions, &mut finished, &event_tx, cmd);
            }
            Err(e) => {
                warn!("Invalid command line: {}", e);
                let _ = event_tx.send(Event::Error {
                    code: ErrorCode::InvalidCommand,
                    message: format!("Invalid command: {}", e),
                });
            }
        }
    }

    debug!("Input closed, disconnecting {} participants", sessions.len());
    for (_, session) in sessions.drain() {
        server.disconnect(&session.participant);
        finished.push(session.consumer);
    }
    for consumer in finished {
        if let Err(e) = consumer.await {
            error!("Consumer task failed: {}", e);
        }
    }

    drop(event_tx);
    match writer.await {
        Ok(result) => result,
        Err(e) => Err(std::io::Error::other(e).into()),
    }
}

/// Execute a single command
fn handle_command(
    server: &ChatServer,
    sessions: &mut HashMap<String, Session>,
    finished: &mut Vec<JoinHandle<()>>,
    events: &mpsc::UnboundedSender<Event>,
    cmd: Command,
) {
    let event = match cmd {
        Command::Connect { username } => match server.connect(&username) {
            Ok(participant) => {
                let consumer = tokio::spawn(consume(participant.clone(), events.clone()));
                sessions.insert(
                    username.clone(),
                    Session {
                        participant,
                        consumer,
                    },
                );
                Event::Connected { username }
            }
            Err(e) => e.into(),
        },
        Command::Disconnect { username } => match sessions.remove(&username) {
            Some(session) => {
                server.disconnect(&session.participant);
                finished.push(session.consumer);
                Event::Disconnected { username }
            }
            None => unknown_user(&username),
        },
        Command::Broadcast { from, body } => match sessions.get(&from) {
            Some(session) => match server.broadcast(&session.participant, &body) {
                Ok(report) => Event::BroadcastSent {
                    from,
                    delivered: report.delivered,
                    dropped: report.dropped,
                    disconnected: report.disconnected,
                },
                Err(e) => e.into(),
            },
            None => unknown_user(&from),
        },
        Command::Private { from, to, body } => match sessions.get(&from) {
            Some(session) => match server.private_message(&session.participant, &to, &body) {
                Ok(delivery) => Event::PrivateSent {
                    from,
                    to,
                    dropped: delivery == Delivery::Dropped,
                },
                Err(e) => e.into(),
            },
            None => unknown_user(&from),
        },
        Command::Stats => Event::Stats {
            stats: server.stats(),
            participants: server.usernames(),
        },
    };

    let _ = events.send(event);
}

fn unknown_user(username: &str) -> Event {
    Event::Error {
        code: ErrorCode::UnknownUser,
        message: format!("No session for '{}'", username),
    }
}

/// Drain one participant's mailbox into `delivered` events
async fn consume(participant: Arc<Participant>, events: mpsc::UnboundedSender<Event>) {
    while let Some(msg) = participant.receive().await {
        let event = Event::Delivered {
            to: participant.username().to_string(),
            text: msg.text(),
        };
        if events.send(event).is_err() {
            debug!("Event writer closed, ending consumer for {}", participant.id());
            break;
        }
    }
    debug!("Consumer ended for '{}'", participant.username());
}

/// Serialize events as JSON lines
async fn write_events<W>(mut events: mpsc::UnboundedReceiver<Event>, mut output: W) -> Result<W, DriverError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = events.recv().await {
        let mut json = serde_json::to_string(&event)?;
        json.push('\n');
        output.write_all(json.as_bytes()).await?;
        output.flush().await?;
    }
    info!("Event stream closed");
    Ok(output)
}
