//! Ordered pattern rules that turn log lines into [`LogEvent`]s.
//!
//! Classification is pure: a [`RuleSet`] maps a line to at most one parsed
//! event and never performs side effects. Rules are tried in registration
//! order and the first pattern that matches decides the outcome, even when
//! its parser rejects the line.

use regex::{Captures, Regex};
use url::Url;

/// Path of the offline lobby map.
pub const OFFLINE_LOBBY_PATH: &str = "/Game/Maps/OfflineLobby";

/// Path of the online lobby map.
pub const ONLINE_LOBBY_PATH: &str = "/Game/Maps/OnlineLobby";

const STARTING_MAP_PATTERN: &str =
    r"GameFlow:\sLoadingContextComponent::SetStartingMapUrl\(\)\sUrl='(.*?)'";
const MATCH_REQUEST_PATTERN: &str =
    r"LogMirrors:\sSENDING\sREQUEST:\s\[GET\shttps://.*?/api/v1/match/(.*?)\]";
const CUSTOMIZATION_PATTERN: &str = r"LogCustomization:\s-->\s([a-zA-Z0-9_]+)";

/// A domain event parsed from one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// The game set the map it will load next.
    StartingMap(MapUrl),
    /// The game requested details for a match.
    MatchRequested {
        /// Match identifier from the request URL.
        match_id: String,
    },
    /// A cosmetic item was selected in the lobby.
    CustomizationSelected {
        /// Outfit/item id.
        outfit: String,
    },
}

/// Why a matched line could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// The pattern matched but the expected capture group is absent or empty.
    #[error("rule '{rule}' matched without a value")]
    MissingCapture {
        /// Name of the rule.
        rule: &'static str,
    },
    /// The starting-map URL is not parseable.
    #[error("invalid map url '{url}': {reason}")]
    InvalidMapUrl {
        /// The raw URL from the log.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// Parser invoked with the captures of a matching rule.
pub type RuleParser = fn(&Captures<'_>) -> Result<LogEvent, LineError>;

/// An immutable (pattern, parser) pair.
#[derive(Clone)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    parse: RuleParser,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

impl Rule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(name: &'static str, pattern: &str, parse: RuleParser) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            parse,
        })
    }

    /// Rule name, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Compiled pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// Ordered, first-match-wins collection of rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a set from rules in priority order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules for the game log: starting map, match request,
    /// customization selection, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in pattern fails to compile.
    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            Rule::new("starting_map", STARTING_MAP_PATTERN, parse_starting_map)?,
            Rule::new("match_request", MATCH_REQUEST_PATTERN, parse_match_request)?,
            Rule::new("customization", CUSTOMIZATION_PATTERN, parse_customization)?,
        ]))
    }

    /// Classify a line.
    ///
    /// Returns `None` when no rule matches, otherwise the outcome of the first
    /// matching rule's parser. Later rules are never consulted once one
    /// pattern matched.
    pub fn classify(&self, line: &str) -> Option<Result<LogEvent, LineError>> {
        self.matching_rule(line)
            .map(|(rule, captures)| (rule.parse)(&captures))
    }

    /// The first rule whose pattern matches `line`, with its captures.
    pub fn matching_rule<'l>(&self, line: &'l str) -> Option<(&Rule, Captures<'l>)> {
        self.rules
            .iter()
            .find_map(|rule| rule.pattern.captures(line).map(|captures| (rule, captures)))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

fn first_group(captures: &Captures<'_>, rule: &'static str) -> Result<String, LineError> {
    captures
        .get(1)
        .map(|m| m.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or(LineError::MissingCapture { rule })
}

fn parse_starting_map(captures: &Captures<'_>) -> Result<LogEvent, LineError> {
    let raw = first_group(captures, "starting_map")?;
    MapUrl::parse(&raw).map(LogEvent::StartingMap)
}

fn parse_match_request(captures: &Captures<'_>) -> Result<LogEvent, LineError> {
    first_group(captures, "match_request").map(|match_id| LogEvent::MatchRequested { match_id })
}

fn parse_customization(captures: &Captures<'_>) -> Result<LogEvent, LineError> {
    first_group(captures, "customization").map(|outfit| LogEvent::CustomizationSelected { outfit })
}

// ---------------------------------------------------------------------------
// Map URLs
// ---------------------------------------------------------------------------

/// A normalized starting-map URL: map path plus travel options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapUrl {
    /// Map path, e.g. `/Game/Maps/OfflineLobby`.
    pub path: String,
    /// Travel options in order of appearance.
    pub query: Vec<(String, String)>,
}

impl MapUrl {
    /// Parse a map URL as written by the game.
    ///
    /// Relative paths are resolved against a placeholder host. Travel options
    /// may be separated by `?` or `&`.
    ///
    /// # Errors
    ///
    /// Returns `LineError::InvalidMapUrl` if the path cannot be parsed.
    pub fn parse(raw: &str) -> Result<Self, LineError> {
        let invalid = |reason: String| LineError::InvalidMapUrl {
            url: raw.to_owned(),
            reason,
        };

        let (location, options) = match raw.split_once('?') {
            Some((location, options)) => (location, Some(options)),
            None => (raw, None),
        };

        let url = if location.contains("//") {
            Url::parse(location)
        } else {
            Url::parse("unreal://localhost/").and_then(|base| base.join(location))
        }
        .map_err(|e| invalid(e.to_string()))?;

        let query = options
            .map(|options| {
                let options = options.replace('?', "&");
                url::form_urlencoded::parse(options.as_bytes())
                    .map(|(key, value)| (key.into_owned(), value.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            path: url.path().to_owned(),
            query,
        })
    }

    /// Whether this is the offline lobby map.
    pub fn is_offline_lobby(&self) -> bool {
        self.path == OFFLINE_LOBBY_PATH
    }

    /// Value of a travel option.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
