//! Incremental reader for the game log.
//!
//! The tailer remembers how many complete lines of the current file instance
//! it has consumed ([`LogPosition`]) together with the matching byte offset,
//! so each change notification only reads what was appended since.
//!
//! A fresh file instance starts [`LogPosition::Uninitialized`]: the first
//! read does not hand out any lines, it only scans for the base-directory
//! marker the game writes at startup and then records the line count.
//! Recreation of the file (or truncation below the consumed offset) puts the
//! tailer back into that state.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use tracing::{debug, info, warn};

/// Marker that announces the game's base installation directory.
pub const BASE_DIRECTORY_MARKER: &str = "LogInit: Base Directory: ";

/// Relative suffix the marker path carries after the install root.
const BINARIES_SUFFIX: &str = "/Binaries/Win64";

/// How much of the current file instance has been consumed.
///
/// In numeric form the uninitialized state is `-1`; see
/// [`LogPosition::as_raw`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPosition {
    /// File not yet scanned; the next read rescans for the base directory.
    #[default]
    Uninitialized,
    /// Number of complete lines already consumed.
    Consumed(u64),
}

impl LogPosition {
    /// Numeric form: the consumed line count, or `-1` when uninitialized.
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Uninitialized => -1,
            Self::Consumed(lines) => i64::try_from(lines).unwrap_or(i64::MAX),
        }
    }
}

#[derive(Debug, Default)]
struct TailState {
    position: LogPosition,
    /// Byte offset just past the last consumed line.
    offset: u64,
    base_directory: Option<PathBuf>,
}

/// Tails one log file. Safe to share between the change and creation
/// notification paths; both serialize on an internal lock.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    state: Mutex<TailState>,
}

impl LogTailer {
    /// Tail `path`, starting uninitialized.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(TailState::default()),
        }
    }

    /// Tail `path` treating every line from the start as new.
    ///
    /// Used to replay a complete log through the rules.
    pub fn from_start(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(TailState {
                position: LogPosition::Consumed(0),
                ..TailState::default()
            }),
        }
    }

    /// Path of the tailed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current position.
    pub fn position(&self) -> LogPosition {
        self.lock().position
    }

    /// Base directory announced by the current file instance, if seen.
    pub fn base_directory(&self) -> Option<PathBuf> {
        self.lock().base_directory.clone()
    }

    /// Forget the current file instance.
    ///
    /// Called when the file is recreated. A read already in progress finishes
    /// first; the next read starts from the beginning and re-derives the base
    /// directory.
    pub fn reset(&self) {
        let mut state = self.lock();
        debug!(path = %self.path.display(), previous = state.position.as_raw(), "log position reset");
        *state = TailState::default();
    }

    /// Read the complete lines appended since the last call.
    ///
    /// While uninitialized this returns nothing and only records the base
    /// directory and the line count. A trailing line without a newline is left
    /// for the next call.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, seeked or read.
    pub fn read_new_lines(&self) -> anyhow::Result<Vec<String>> {
        self.read(false)
    }

    /// Like [`read_new_lines`](Self::read_new_lines), but also consumes a
    /// trailing line without a newline.
    ///
    /// For files that are complete, such as a saved log being replayed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, seeked or read.
    pub fn read_remaining_lines(&self) -> anyhow::Result<Vec<String>> {
        self.read(true)
    }

    fn read(&self, include_partial: bool) -> anyhow::Result<Vec<String>> {
        let mut state = self.lock();

        let mut file = open_shared(&self.path)
            .with_context(|| format!("failed to open log file {}", self.path.display()))?;
        let file_len = file
            .metadata()
            .with_context(|| format!("failed to read metadata for {}", self.path.display()))?
            .len();

        // Shrunk without a creation event: treat as a new instance.
        if file_len < state.offset {
            info!(path = %self.path.display(), "log file truncated, rescanning");
            *state = TailState::default();
        }

        if state.position != LogPosition::Uninitialized && file_len == state.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(state.offset))
            .with_context(|| format!("failed to seek in log file {}", self.path.display()))?;

        self.consume(&mut state, BufReader::new(file), include_partial)
    }

    fn consume(
        &self,
        state: &mut TailState,
        mut reader: BufReader<File>,
        include_partial: bool,
    ) -> anyhow::Result<Vec<String>> {
        let scanning = state.position == LogPosition::Uninitialized;
        let mut consumed = match state.position {
            LogPosition::Uninitialized => 0,
            LogPosition::Consumed(lines) => lines,
        };
        let mut offset = state.offset;
        let mut lines = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .with_context(|| format!("failed to read line from {}", self.path.display()))?;
            let terminated = buf.last() == Some(&b'\n');
            if read == 0 || (!terminated && !include_partial) {
                break;
            }

            let line = decode_line(&buf);
            if scanning {
                if let Some(dir) = parse_base_directory(&line) {
                    info!(base_directory = %dir.display(), "game base directory found");
                    state.base_directory = Some(dir);
                }
            } else {
                lines.push(line);
            }

            consumed = consumed.saturating_add(1);
            offset = offset.saturating_add(u64::try_from(read).unwrap_or(u64::MAX));
            if !terminated {
                break;
            }
        }

        state.position = LogPosition::Consumed(consumed);
        state.offset = offset;
        Ok(lines)
    }

    fn lock(&self) -> MutexGuard<'_, TailState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("log tailer lock poisoned, continuing with last state");
                poisoned.into_inner()
            }
        }
    }
}

/// Extract the install root from a base-directory marker line.
///
/// Strips the `/Binaries/Win64/` suffix and converts separators to the
/// platform's own. Returns `None` for lines without the marker.
pub fn parse_base_directory(line: &str) -> Option<PathBuf> {
    let (_, raw) = line.split_once(BASE_DIRECTORY_MARKER)?;
    let raw = raw.trim();
    let raw = raw.strip_suffix('/').unwrap_or(raw);
    let raw = raw.strip_suffix(BINARIES_SUFFIX).unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }

    let normalized: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect();
    Some(PathBuf::from(normalized))
}

fn decode_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim_end_matches(['\n', '\r']).to_owned()
}

/// Open for reading without blocking the game's writer.
fn open_shared(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        // FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE
        options.share_mode(0x1 | 0x2 | 0x4);
    }
    options.open(path)
}
