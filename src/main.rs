//! Headless rules-engine host (default binary).
//!
//! Runs the level session behind the TCP adapter: a remote driver sends
//! gameplay intents and receives acks, the event stream, and state
//! observations. There is no local rendering; presentation is the driver's
//! job.

use std::time::{Duration, Instant};

use anyhow::Result;

use jelly_crush::adapter::{
    build_observation, create_ack, create_error, create_event_batch, Adapter, ErrorCode,
    InboundIntent, InboundPayload, IntentOutcome, IntentPayload, OutboundMessage,
};
use jelly_crush::core::{CoreError, LevelSession};
use jelly_crush::types::{
    IdleOutcome, LevelConfig, SwapOutcome, TickOutcome, HINT_DELAY_MS, MOVE_CHECK_DELAY_MS,
};

const FRAME_MS: u64 = 50;

fn main() -> Result<()> {
    let Some(adapter) = Adapter::start_from_env() else {
        println!("[host] remote link disabled (CRUSH_HOST_DISABLED)");
        return Ok(());
    };

    // Replay drivers disable wall-clock ticking and drive time via intents.
    let autotick = std::env::var("CRUSH_HOST_AUTOTICK")
        .map(|v| v != "0" && v.to_lowercase() != "false")
        .unwrap_or(true);

    run(adapter, autotick)
}

struct Host {
    adapter: Adapter,
    session: Option<LevelSession>,
    out_seq: u64,
    /// Milliseconds of player inactivity, for the hint/reshuffle check.
    idle_ms: u64,
    dirty: bool,
}

fn run(adapter: Adapter, autotick: bool) -> Result<()> {
    let mut host = Host {
        adapter,
        session: None,
        out_seq: 0,
        idle_ms: 0,
        dirty: false,
    };

    let mut last_frame = Instant::now();
    loop {
        std::thread::sleep(Duration::from_millis(FRAME_MS));
        let delta_ms = last_frame.elapsed().as_millis() as u64;
        last_frame = Instant::now();

        if autotick {
            host.advance_time(delta_ms);
        }

        while let Some(intent) = host.adapter.try_recv() {
            host.apply(intent);
        }

        host.flush();
    }
}

impl Host {
    fn next_seq(&mut self) -> u64 {
        self.out_seq += 1;
        self.out_seq
    }

    fn advance_time(&mut self, delta_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.tick(delta_ms) == TickOutcome::TimeExpired {
            self.dirty = true;
        }

        // Idle check after a grace period: hint when a move exists,
        // reshuffle otherwise.
        if session.is_game_over() || session.is_level_completing() || session.is_busy() {
            self.idle_ms = 0;
            return;
        }
        self.idle_ms += delta_ms;
        if self.idle_ms >= u64::from(MOVE_CHECK_DELAY_MS + HINT_DELAY_MS) {
            self.idle_ms = 0;
            session.check_idle();
            self.dirty = true;
        }
    }

    fn apply(&mut self, intent: InboundIntent) {
        let client_id = intent.client_id;
        let seq = intent.seq;
        match intent.payload {
            InboundPayload::SnapshotRequest => {
                if let Some(session) = &self.session {
                    let snapshot = session.snapshot();
                    let obs_seq = self.next_seq();
                    self.adapter.send(OutboundMessage::ToClientObservation {
                        client_id,
                        obs: build_observation(&snapshot, obs_seq),
                    });
                }
            }
            InboundPayload::Intent(payload) => {
                self.apply_gameplay(client_id, seq, payload);
            }
        }
    }

    fn apply_gameplay(&mut self, client_id: usize, seq: u64, payload: IntentPayload) {
        match payload {
            IntentPayload::StartLevel {
                level,
                seed,
                fruit_match_probability,
            } => {
                let mut config = LevelConfig::default();
                if let Some(seed) = seed {
                    config.seed = seed;
                }
                if let Some(p) = fruit_match_probability {
                    config.fruit_match_probability = p;
                }
                match LevelSession::start_level(level, config) {
                    Ok(session) => {
                        self.session = Some(session);
                        self.idle_ms = 0;
                        self.dirty = true;
                        self.ack(client_id, seq, IntentOutcome::Started);
                    }
                    Err(e) => self.error(client_id, seq, ErrorCode::InvalidConfig, &e.to_string()),
                }
            }
            IntentPayload::Swap { from, to } => {
                let Some(session) = self.session.as_mut() else {
                    self.error(client_id, seq, ErrorCode::NoSession, "No active level");
                    return;
                };
                match session.attempt_swap(from.into(), to.into()) {
                    Ok(outcome) => {
                        self.idle_ms = 0;
                        self.dirty = true;
                        let outcome = match outcome {
                            SwapOutcome::Resolved => IntentOutcome::Resolved,
                            SwapOutcome::Rejected => IntentOutcome::Rejected,
                            SwapOutcome::Busy => IntentOutcome::Busy,
                        };
                        self.ack(client_id, seq, outcome);
                    }
                    Err(e @ CoreError::InvalidCoordinate(_, _)) => {
                        self.error(client_id, seq, ErrorCode::InvalidCoordinate, &e.to_string());
                    }
                    Err(e) => {
                        self.error(client_id, seq, ErrorCode::InvalidCommand, &e.to_string());
                    }
                }
            }
            IntentPayload::Tick { delta_ms } => {
                let Some(session) = self.session.as_mut() else {
                    self.error(client_id, seq, ErrorCode::NoSession, "No active level");
                    return;
                };
                let outcome = match session.tick(delta_ms) {
                    TickOutcome::Running => IntentOutcome::Running,
                    TickOutcome::TimeExpired => IntentOutcome::TimeExpired,
                };
                self.dirty = true;
                self.ack(client_id, seq, outcome);
            }
            IntentPayload::CheckIdle => {
                let Some(session) = self.session.as_mut() else {
                    self.error(client_id, seq, ErrorCode::NoSession, "No active level");
                    return;
                };
                let outcome = match session.check_idle() {
                    IdleOutcome::Hint(_, _) => IntentOutcome::Hint,
                    IdleOutcome::Reshuffled => IntentOutcome::Reshuffled,
                    IdleOutcome::Busy => IntentOutcome::Busy,
                };
                self.dirty = true;
                self.ack(client_id, seq, outcome);
            }
            IntentPayload::AdvanceLevel => {
                let Some(session) = self.session.as_mut() else {
                    self.error(client_id, seq, ErrorCode::NoSession, "No active level");
                    return;
                };
                if !session.is_level_completing() {
                    self.error(
                        client_id,
                        seq,
                        ErrorCode::InvalidCommand,
                        "Level is not completing",
                    );
                    return;
                }
                session.advance_level();
                self.idle_ms = 0;
                self.dirty = true;
                self.ack(client_id, seq, IntentOutcome::Started);
            }
        }
    }

    /// Broadcast pending events and a fresh observation after any state
    /// change.
    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let events = session.drain_events();
        let snapshot = session.snapshot();
        if !events.is_empty() {
            let seq = self.next_seq();
            self.adapter.send(OutboundMessage::BroadcastEvents {
                batch: create_event_batch(seq, &events),
            });
        }
        let seq = self.next_seq();
        self.adapter.send(OutboundMessage::BroadcastObservation {
            obs: build_observation(&snapshot, seq),
        });
    }

    fn ack(&mut self, client_id: usize, seq: u64, outcome: IntentOutcome) {
        self.adapter.send(OutboundMessage::ToClientAck {
            client_id,
            ack: create_ack(seq, Some(outcome)),
        });
    }

    fn error(&mut self, client_id: usize, seq: u64, code: ErrorCode, message: &str) {
        self.adapter.send(OutboundMessage::ToClientError {
            client_id,
            err: create_error(seq, code, message),
        });
    }
}
