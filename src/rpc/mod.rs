//! Host serial protocol.
//!
//! Single-character command frames in, CRLF-terminated text frames out.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      RPC Stack                             │
//! │                                                            │
//! │  ┌───────────┐   ┌──────────┐   ┌───────────────────────┐  │
//! │  │ Transport │──▶│ Mailbox  │──▶│  Engine (dispatcher)  │  │
//! │  │ (trait)   │   │ (1 slot) │   │  → AppService         │  │
//! │  └───────────┘   └──────────┘   └───────────────────────┘  │
//! │       ▲                                    │               │
//! │       │              ┌─────────────────────┘               │
//! │       │              ▼                                     │
//! │  ┌───────────┐   ┌──────────┐                              │
//! │  │ Transport │◀──│  Codec   │   (status / error frames)    │
//! │  │ (write)   │   │  (text)  │                              │
//! │  └───────────┘   └──────────┘                              │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod engine;
pub mod mailbox;
pub mod transport;
