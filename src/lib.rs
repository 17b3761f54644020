//! Lobby info: live match and lobby details from the Dead by Daylight log.
//!
//! Tails the game log, classifies new lines with ordered pattern rules and
//! turns them into typed [`signal::LobbySignal`]s. Match events are enriched
//! through the game's session API, which needs transparent guest
//! re-authentication and a two-hop friend lookup to describe the killer.
//!
//! See `DESIGN.md` for the component map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod logging;

pub mod friends;
pub mod handlers;
pub mod reference;
pub mod rules;
pub mod signal;

pub mod reader;
pub mod tailer;
pub mod watcher;
