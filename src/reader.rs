//! Startup orchestration and the per-line pipeline.
//!
//! [`LobbyReader::start`] performs the fatal startup checks in order: the
//! log directory must exist, then both reference tables must load. Only
//! after that is the file watcher armed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::client::ApiClient;
use crate::api::parse_base_url;
use crate::api::session::SessionClient;
use crate::config::Config;
use crate::handlers::EventHandlers;
use crate::reference::ReferenceData;
use crate::rules::RuleSet;
use crate::signal::{self, SignalReceiver};
use crate::tailer::{LogPosition, LogTailer};
use crate::watcher::LogWatcher;

/// Classifies lines and hands the resulting events to the handlers.
#[derive(Debug)]
pub struct LinePipeline {
    rules: RuleSet,
    handlers: EventHandlers,
}

impl LinePipeline {
    /// Combine a rule set with handlers.
    pub fn new(rules: RuleSet, handlers: EventHandlers) -> Self {
        Self { rules, handlers }
    }

    /// Process one line. Returns the enrichment task if the line started one.
    ///
    /// A line the matching rule rejects is logged and dropped; it never
    /// affects other lines.
    pub fn process_line(&self, line: &str) -> Option<JoinHandle<()>> {
        match self.rules.classify(line)? {
            Ok(event) => self.handlers.handle(event),
            Err(e) => {
                warn!(error = %e, "skipping log line");
                None
            }
        }
    }

    /// Process lines in file order.
    pub fn process_lines(&self, lines: &[String]) {
        for line in lines {
            // Enrichment runs detached; its outcome arrives as signals.
            let _ = self.process_line(line);
        }
    }
}

/// A running reader: reference data loaded and the log watched.
#[derive(Debug)]
pub struct LobbyReader {
    tailer: Arc<LogTailer>,
    reference: Arc<ReferenceData>,
    _watcher: LogWatcher,
}

impl LobbyReader {
    /// Check the log directory, load reference data, then arm the watcher.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory does not exist, if either
    /// reference table fails to load, or if the watcher cannot be armed.
    pub async fn start(config: &Config) -> anyhow::Result<(Self, SignalReceiver)> {
        let log_dir = config.log.resolve_directory()?;
        if !log_dir.is_dir() {
            anyhow::bail!("cannot find game log directory at {}", log_dir.display());
        }

        let session_base = parse_base_url(&config.api.session_base_url)
            .context("invalid session base url")?;
        let metadata_base = parse_base_url(&config.api.metadata_base_url)
            .context("invalid metadata base url")?;

        let client = ApiClient::new(session_base).context("failed to build http client")?;
        let reference = Arc::new(
            ReferenceData::load(&client, &metadata_base)
                .await
                .context("failed to load reference data")?,
        );

        let (sender, receiver) = signal::channel();
        let handlers = EventHandlers::new(
            Arc::clone(&reference),
            Arc::new(SessionClient::new(client)),
            sender,
        );
        let rules = RuleSet::standard().context("failed to compile log rules")?;
        let pipeline = Arc::new(LinePipeline::new(rules, handlers));

        let tailer = Arc::new(LogTailer::new(log_dir.join(&config.log.file_name)));
        let watcher = LogWatcher::spawn(Arc::clone(&tailer), pipeline)?;

        info!(log = %tailer.path().display(), "lobby reader started");

        Ok((
            Self {
                tailer,
                reference,
                _watcher: watcher,
            },
            receiver,
        ))
    }

    /// Base directory announced by the current log file, once seen.
    pub fn base_directory(&self) -> Option<PathBuf> {
        self.tailer.base_directory()
    }

    /// Current tail position.
    pub fn position(&self) -> LogPosition {
        self.tailer.position()
    }

    /// The loaded reference snapshot.
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }
}
