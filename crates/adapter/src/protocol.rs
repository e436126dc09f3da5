//! Protocol module - JSON message types for the remote host link
//!
//! Implements the line-delimited JSON protocol spoken between the rules
//! engine and a remote driver (bot, test rig, or presentation frontend).
//! All messages have: type, seq (sequence number), ts (timestamp in ms).

use serde::{Deserialize, Serialize};

use jelly_crush_core::SessionSnapshot;
use jelly_crush_types::{
    CompletionBreakdown, Coord, Fruit, GameEvent, SpecialKind, FRUIT_COUNT, GRID_SIZE,
};

pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Engine Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IntentType {
    #[serde(rename = "intent")]
    #[default]
    Intent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlType {
    #[serde(rename = "control")]
    #[default]
    Control,
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(rename = "stream_events")]
    pub stream_events: bool,
    #[serde(rename = "stream_observations")]
    pub stream_observations: bool,
}

/// A board coordinate on the wire: `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordPair(pub [u8; 2]);

impl From<Coord> for CoordPair {
    fn from(value: Coord) -> Self {
        Self([value.row, value.col])
    }
}

impl From<CoordPair> for Coord {
    fn from(value: CoordPair) -> Self {
        Coord::new(value.0[0], value.0[1])
    }
}

/// Intent message (controller only): one gameplay operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: IntentType,
    pub seq: u64,
    pub ts: u64,
    pub intent: IntentPayload,
}

/// The gameplay operations a controller may request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IntentPayload {
    #[serde(rename = "startLevel")]
    StartLevel {
        level: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u32>,
        #[serde(
            rename = "fruit_match_probability",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        fruit_match_probability: Option<f64>,
    },
    #[serde(rename = "swap")]
    Swap { from: CoordPair, to: CoordPair },
    #[serde(rename = "tick")]
    Tick {
        #[serde(rename = "delta_ms")]
        delta_ms: u64,
    },
    #[serde(rename = "checkIdle")]
    CheckIdle,
    #[serde(rename = "advanceLevel")]
    AdvanceLevel,
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlAction {
    #[serde(rename = "claim")]
    Claim,
    #[serde(rename = "release")]
    Release,
}

// ============== Engine -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "controller_active")]
    ControllerActive,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_coordinate")]
    InvalidCoordinate,
    #[serde(rename = "invalid_config")]
    InvalidConfig,
    #[serde(rename = "no_session")]
    NoSession,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// How an intent landed; mirrors the engine's outcome enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentOutcome {
    #[serde(rename = "started")]
    Started,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "rejected")]
    Rejected,
    #[serde(rename = "busy")]
    Busy,
    #[serde(rename = "running")]
    Running,
    #[serde(rename = "time_expired")]
    TimeExpired,
    #[serde(rename = "hint")]
    Hint,
    #[serde(rename = "reshuffled")]
    Reshuffled,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub intents: Vec<String>,
    #[serde(rename = "grid_size")]
    pub grid_size: u8,
    #[serde(rename = "fruit_palette")]
    pub fruit_palette: Vec<String>,
}

/// Acknowledgment for an applied intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<IntentOutcome>,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

/// Batch of gameplay events in emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    pub events: Vec<WireEvent>,
}

/// Wire form of a core event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WireEvent {
    #[serde(rename = "pieces_removed")]
    PiecesRemoved {
        coords: Vec<CoordPair>,
        #[serde(rename = "caused_by_jelly")]
        caused_by_jelly: bool,
    },
    #[serde(rename = "special_created")]
    SpecialCreated { at: CoordPair, special: String },
    #[serde(rename = "special_activated")]
    SpecialActivated { at: CoordPair, special: String },
    #[serde(rename = "score_changed")]
    ScoreChanged { delta: u32, total: u32 },
    #[serde(rename = "goal_progressed")]
    GoalProgressed {
        fruit: String,
        collected: u32,
        target: u32,
    },
    #[serde(rename = "level_completed")]
    LevelCompleted { bonus: WireBreakdown },
    #[serde(rename = "game_over")]
    GameOver {
        #[serde(rename = "final_score")]
        final_score: u32,
        #[serde(rename = "final_level")]
        final_level: u32,
    },
    #[serde(rename = "reshuffled")]
    Reshuffled,
    #[serde(rename = "hint_available")]
    HintAvailable { a: CoordPair, b: CoordPair },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBreakdown {
    pub level: u32,
    #[serde(rename = "time_bonus")]
    pub time_bonus: u32,
    #[serde(rename = "level_bonus")]
    pub level_bonus: u32,
    #[serde(rename = "special_bonus")]
    pub special_bonus: u32,
    #[serde(rename = "total_bonus")]
    pub total_bonus: u32,
}

impl From<CompletionBreakdown> for WireBreakdown {
    fn from(value: CompletionBreakdown) -> Self {
        Self {
            level: value.level,
            time_bonus: value.time_bonus,
            level_bonus: value.level_bonus,
            special_bonus: value.special_bonus,
            total_bonus: value.total_bonus,
        }
    }
}

fn special_name(kind: SpecialKind) -> String {
    kind.as_str().to_string()
}

impl From<&GameEvent> for WireEvent {
    fn from(value: &GameEvent) -> Self {
        match value {
            GameEvent::PiecesRemoved {
                coords,
                caused_by_jelly,
            } => Self::PiecesRemoved {
                coords: coords.iter().map(|&c| c.into()).collect(),
                caused_by_jelly: *caused_by_jelly,
            },
            GameEvent::SpecialCreated { at, kind } => Self::SpecialCreated {
                at: (*at).into(),
                special: special_name(*kind),
            },
            GameEvent::SpecialActivated { at, kind } => Self::SpecialActivated {
                at: (*at).into(),
                special: special_name(*kind),
            },
            GameEvent::ScoreChanged { delta, total } => Self::ScoreChanged {
                delta: *delta,
                total: *total,
            },
            GameEvent::GoalProgressed {
                fruit,
                collected,
                target,
            } => Self::GoalProgressed {
                fruit: fruit.as_str().to_string(),
                collected: *collected,
                target: *target,
            },
            GameEvent::LevelCompleted { breakdown } => Self::LevelCompleted {
                bonus: (*breakdown).into(),
            },
            GameEvent::GameOver {
                final_score,
                final_level,
            } => Self::GameOver {
                final_score: *final_score,
                final_level: *final_level,
            },
            GameEvent::Reshuffled => Self::Reshuffled,
            GameEvent::HintAvailable { a, b } => Self::HintAvailable {
                a: (*a).into(),
                b: (*b).into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Full session snapshot (sent to all streaming clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub busy: bool,
    #[serde(rename = "level_completing")]
    pub level_completing: bool,
    #[serde(rename = "game_over")]
    pub game_over: bool,
    pub board: BoardSnapshot,
    pub jelly: [[u8; GRID_SIZE]; GRID_SIZE],
    pub goals: GoalsSnapshot,
    pub score: u32,
    pub level: u32,
    pub seed: u32,
    #[serde(rename = "time_left_ms")]
    pub time_left_ms: u64,
    #[serde(rename = "max_time_ms")]
    pub max_time_ms: u64,
    #[serde(rename = "state_hash")]
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// 0 = empty, 1..=7 = fruit, 8..=11 = special.
    pub cells: [[u8; GRID_SIZE]; GRID_SIZE],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsSnapshot {
    pub target: u32,
    /// Collected counts in palette order.
    pub collected: [u32; FRUIT_COUNT],
}

/// Deterministic state hash serialized as lowercase hex (without heap allocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            let nib = (v & 0x0f) as usize;
            buf[15 - i] = HEX[nib];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).expect("hex is valid utf8");
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        let s = s.trim();
        let mut v: u64 = 0;
        for b in s.as_bytes() {
            let d = match b {
                b'0'..=b'9' => (b - b'0') as u64,
                b'a'..=b'f' => (b - b'a' + 10) as u64,
                b'A'..=b'F' => (b - b'A' + 10) as u64,
                _ => return Err(serde::de::Error::custom("invalid hex")),
            };
            v = (v << 4) | d;
        }
        Ok(StateHash(v))
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "intent")]
        Intent(IntentMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Intent(m)) => Ok(ParsedMessage::Intent(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(json)?
                .msg_type
                .unwrap_or("unknown");
            if msg_type != "hello" && msg_type != "intent" && msg_type != "control" {
                #[derive(Debug, Deserialize)]
                struct SeqOnly {
                    seq: Option<u64>,
                }
                let seq = serde_json::from_str::<SeqOnly>(json)?.seq.unwrap_or(0);
                return Ok(ParsedMessage::Unknown(UnknownMessage { seq }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Intent(IntentMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities {
            stream_events: true,
            stream_observations: true,
        },
    }
}

/// Create a welcome message
pub fn create_welcome(seq: u64, protocol_version: &str, client_id: u64) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id: Some(client_id),
        game_id: "jelly-crush".to_string(),
        capabilities: ServerCapabilities {
            intents: vec![
                "startLevel".to_string(),
                "swap".to_string(),
                "tick".to_string(),
                "checkIdle".to_string(),
                "advanceLevel".to_string(),
            ],
            grid_size: GRID_SIZE as u8,
            fruit_palette: Fruit::ALL.iter().map(|f| f.as_str().to_string()).collect(),
        },
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64, outcome: Option<IntentOutcome>) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        outcome,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Create an event batch message
pub fn create_event_batch(seq: u64, events: &[GameEvent]) -> EventMessage {
    EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        events: events.iter().map(WireEvent::from).collect(),
    }
}

/// Build an observation message from a session snapshot.
pub fn build_observation(snapshot: &SessionSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snapshot.playable(),
        busy: snapshot.busy,
        level_completing: snapshot.level_completing,
        game_over: snapshot.game_over,
        board: BoardSnapshot {
            width: GRID_SIZE as u8,
            height: GRID_SIZE as u8,
            cells: snapshot.board,
        },
        jelly: snapshot.jelly,
        goals: GoalsSnapshot {
            target: snapshot.goal_target,
            collected: snapshot.goal_collected,
        },
        score: snapshot.score,
        level: snapshot.level,
        seed: snapshot.seed,
        time_left_ms: snapshot.time_left_ms,
        max_time_ms: snapshot.max_time_ms,
        state_hash: state_hash(snapshot),
    }
}

/// Stable 64-bit FNV-1a over the snapshot; `DefaultHasher` is avoided since
/// its output is not guaranteed stable across Rust versions/platforms.
pub fn state_hash(snapshot: &SessionSnapshot) -> StateHash {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut state = OFFSET_BASIS;
    let mut write = |bytes: &[u8]| {
        for &b in bytes {
            state ^= b as u64;
            state = state.wrapping_mul(PRIME);
        }
    };

    for row in &snapshot.board {
        write(row);
    }
    for row in &snapshot.jelly {
        write(row);
    }
    write(&snapshot.goal_target.to_le_bytes());
    for count in &snapshot.goal_collected {
        write(&count.to_le_bytes());
    }
    write(&snapshot.level.to_le_bytes());
    write(&snapshot.score.to_le_bytes());
    write(&snapshot.time_left_ms.to_le_bytes());
    write(&snapshot.seed.to_le_bytes());
    write(&[
        u8::from(snapshot.busy),
        u8::from(snapshot.level_completing),
        u8::from(snapshot.game_over),
    ]);
    StateHash(state)
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
