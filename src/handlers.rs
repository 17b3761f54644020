//! Side effects for parsed [`LogEvent`]s.
//!
//! Lobby transitions and customization selections are handled inline on the
//! caller's thread. Match requests spawn a task that fetches match details
//! and then tries to identify the killer; every failure on that path is
//! swallowed and simply produces no signal.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::SessionApi;
use crate::friends::resolve_identity;
use crate::reference::ReferenceData;
use crate::rules::{LogEvent, MapUrl};
use crate::signal::{CustomizationChange, LobbySignal, SignalSender};

/// Turns parsed log events into [`LobbySignal`]s.
pub struct EventHandlers {
    reference: Arc<ReferenceData>,
    session: Arc<dyn SessionApi>,
    signals: SignalSender,
    /// Serializes customization handling across all callers.
    customization: Mutex<()>,
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("characters", &self.reference.character_count())
            .field("items", &self.reference.item_count())
            .finish_non_exhaustive()
    }
}

impl EventHandlers {
    /// Create handlers over a loaded reference snapshot.
    pub fn new(
        reference: Arc<ReferenceData>,
        session: Arc<dyn SessionApi>,
        signals: SignalSender,
    ) -> Self {
        Self {
            reference,
            session,
            signals,
            customization: Mutex::new(()),
        }
    }

    /// Handle one event.
    ///
    /// Returns the enrichment task for match requests so callers can await
    /// it; other events complete before this returns. Must be called from
    /// within a Tokio runtime.
    pub fn handle(&self, event: LogEvent) -> Option<JoinHandle<()>> {
        match event {
            LogEvent::StartingMap(map) => {
                self.on_starting_map(&map);
                None
            }
            LogEvent::CustomizationSelected { outfit } => {
                self.on_customization(&outfit);
                None
            }
            LogEvent::MatchRequested { match_id } => Some(self.on_match_requested(match_id)),
        }
    }

    /// Emit [`LobbySignal::LobbyLeft`] when the next map is the offline lobby.
    pub fn on_starting_map(&self, map: &MapUrl) {
        debug!(path = %map.path, options = map.query.len(), "starting map set");
        if map.is_offline_lobby() {
            self.signals.emit(LobbySignal::LobbyLeft);
        }
    }

    /// Emit [`LobbySignal::CustomizationChanged`] for a known outfit.
    ///
    /// Unknown outfits, and outfits whose character is unknown, are ignored.
    /// Role filtering is left to the consumer.
    pub fn on_customization(&self, outfit: &str) {
        let _guard = self.lock_customization();

        let Some((item, character)) = self.reference.outfit(outfit) else {
            debug!(outfit, "customization not in reference data");
            return;
        };

        self.signals
            .emit(LobbySignal::CustomizationChanged(CustomizationChange {
                outfit: outfit.to_owned(),
                item: item.clone(),
                character: character.clone(),
            }));
    }

    /// Spawn match enrichment for `match_id`.
    pub fn on_match_requested(&self, match_id: String) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let signals = self.signals.clone();
        tokio::spawn(async move {
            enrich_match(session.as_ref(), &signals, &match_id).await;
        })
    }

    fn lock_customization(&self) -> MutexGuard<'_, ()> {
        match self.customization.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("customization lock poisoned, continuing");
                poisoned.into_inner()
            }
        }
    }
}

/// Fetch a match, emit its info and try to identify the killer.
///
/// Emits [`LobbySignal::MatchInfo`] once the match is fetched, then
/// [`LobbySignal::KillerIdentified`] if the first side-A participant resolves
/// through a mutual friend. Failures end the enrichment quietly.
pub async fn enrich_match<S>(session: &S, signals: &SignalSender, match_id: &str)
where
    S: SessionApi + ?Sized,
{
    let info = match session.fetch_match(match_id).await {
        Ok(info) => info,
        Err(e) => {
            debug!(match_id, error = %e, "match lookup failed");
            return;
        }
    };

    signals.emit(LobbySignal::MatchInfo {
        rank: info.rank,
        match_id: info.match_id.clone(),
    });

    let Some(killer_id) = info.killer_id() else {
        debug!(match_id, "match has no side-A participants");
        return;
    };

    if let Some(record) = resolve_identity(session, killer_id).await {
        signals.emit(LobbySignal::KillerIdentified(record));
    }
}
