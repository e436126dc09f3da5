//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! This module lets an external driver (bot, replay harness, or
//! presentation frontend) run the rules engine over a socket. The engine
//! stays headless; the driver sends gameplay intents and receives the event
//! stream and state observations.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7710)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Streaming**: Server pushes event batches and observations
//! 5. **Intents**: Controller sends gameplay operations
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and streaming preferences
//! - **intent**: One gameplay operation (startLevel, swap, tick, checkIdle,
//!   advanceLevel)
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with server capabilities
//! - **ack**: Intent acknowledgment carrying the engine outcome
//! - **event**: Batch of gameplay events in emission order
//! - **observation**: Full session snapshot (board, jelly, goals, score,
//!   timer)
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `CRUSH_HOST_ADDR`: Bind address (default: "127.0.0.1")
//! - `CRUSH_HOST_PORT`: Port number (default: 7710)
//! - `CRUSH_HOST_MAX_PENDING`: Intent queue depth (default: 16)
//! - `CRUSH_HOST_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_events":true,"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":2,"protocol_version":"1.0.0",...}
//! Client -> Server: {"type":"intent","seq":2,"ts":3,"intent":{"kind":"startLevel","level":1,"seed":42}}
//! Server -> Client: {"type":"ack","seq":2,"ts":4,"status":"ok","outcome":"started"}
//! Client -> Server: {"type":"intent","seq":3,"ts":5,"intent":{"kind":"swap","from":[4,3],"to":[4,4]}}
//! Server -> Client: {"type":"event","seq":4,"ts":6,"events":[{"kind":"pieces_removed",...}]}
//! ```
//!
//! # Testing
//!
//! Connect with netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7710
//! {"type":"hello","seq":1,"ts":1,"client":{"name":"test","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_events":true,"stream_observations":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use jelly_crush_core as core;
pub use jelly_crush_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, InboundIntent, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
