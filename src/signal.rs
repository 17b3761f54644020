//! Signals emitted to the presentation layer.
//!
//! The core pushes typed [`LobbySignal`]s onto an unbounded channel; the
//! consumer drains it on its own schedule. Enrichment runs on spawned tasks,
//! so a [`LobbySignal::KillerIdentified`] usually follows the
//! [`LobbySignal::MatchInfo`] of the same match but is not guaranteed to.

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::models::{CharacterInfo, CustomizationItem, FriendRecord};

/// Everything the core reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbySignal {
    /// The player went back to the offline lobby.
    LobbyLeft,
    /// A cosmetic item was selected.
    CustomizationChanged(CustomizationChange),
    /// Match details were fetched.
    MatchInfo {
        /// Match rank.
        rank: i32,
        /// Match identifier.
        match_id: String,
    },
    /// The killer's identity was resolved through a mutual friend.
    KillerIdentified(FriendRecord),
}

/// Payload of [`LobbySignal::CustomizationChanged`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizationChange {
    /// Outfit/item id as written in the log.
    pub outfit: String,
    /// The item record.
    pub item: CustomizationItem,
    /// The character the item belongs to.
    pub character: CharacterInfo,
}

/// Sending half handed to the core.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<LobbySignal>,
}

/// Receiving half handed to the consumer.
pub type SignalReceiver = mpsc::UnboundedReceiver<LobbySignal>;

/// Create a connected sender/receiver pair.
pub fn channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender { tx }, rx)
}

impl SignalSender {
    /// Emit a signal. A dropped consumer is not an error for the core.
    pub fn emit(&self, signal: LobbySignal) {
        if let Err(e) = self.tx.send(signal) {
            debug!(signal = ?e.0, "signal consumer dropped");
        }
    }
}
