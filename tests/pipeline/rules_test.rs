//! Line classification with the standard rules.

use lobby_info::rules::{LineError, LogEvent, Rule, RuleParser, RuleSet, OFFLINE_LOBBY_PATH};
use regex::Captures;

fn standard() -> RuleSet {
    match RuleSet::standard() {
        Ok(rules) => rules,
        Err(err) => panic!("standard rules should compile: {err}"),
    }
}

fn classify(rules: &RuleSet, line: &str) -> LogEvent {
    match rules.classify(line) {
        Some(Ok(event)) => event,
        Some(Err(err)) => panic!("line should parse: {err}"),
        None => panic!("line should match a rule: {line}"),
    }
}

#[test]
fn offline_lobby_starting_map() {
    let rules = standard();
    let line = "[2021.03.01-10.00.00:000][  0]GameFlow: LoadingContextComponent::SetStartingMapUrl() Url='/Game/Maps/OfflineLobby'";

    match classify(&rules, line) {
        LogEvent::StartingMap(map) => {
            assert_eq!(map.path, OFFLINE_LOBBY_PATH);
            assert!(map.is_offline_lobby());
        }
        other => panic!("expected starting map, got: {other:?}"),
    }
}

#[test]
fn online_lobby_with_options() {
    let rules = standard();
    let line = "GameFlow: LoadingContextComponent::SetStartingMapUrl() Url='/Game/Maps/OnlineLobby?Name=Player?Listen'";

    match classify(&rules, line) {
        LogEvent::StartingMap(map) => {
            assert!(!map.is_offline_lobby());
            assert_eq!(map.option("Name"), Some("Player"));
        }
        other => panic!("expected starting map, got: {other:?}"),
    }
}

#[test]
fn match_request_yields_match_id() {
    let rules = standard();
    let line = "[2021.03.01-10.05.00:000][ 12]LogMirrors: SENDING REQUEST: [GET https://steam.live.bhvrdbd.com/api/v1/match/abc123]";

    assert_eq!(
        classify(&rules, line),
        LogEvent::MatchRequested {
            match_id: "abc123".to_owned()
        }
    );
}

#[test]
fn customization_yields_outfit() {
    let rules = standard();
    let line = "LogCustomization: --> TR_Head01";

    assert_eq!(
        classify(&rules, line),
        LogEvent::CustomizationSelected {
            outfit: "TR_Head01".to_owned()
        }
    );
}

#[test]
fn unrelated_lines_do_not_match() {
    let rules = standard();
    assert!(rules.classify("LogInit: Build: ++DeadByDaylight+Live").is_none());
    assert!(rules.classify("LogMirrors: SENDING REQUEST: [POST https://x/api/v1/queue]").is_none());
    assert!(rules.classify("").is_none());
}

#[test]
fn standard_order_is_fixed() {
    let rules = standard();
    assert_eq!(rules.len(), 3);

    let line = "LogCustomization: --> TR_Head01";
    let name = rules.matching_rule(line).map(|(rule, _)| rule.name());
    assert_eq!(name, Some("customization"));
}

fn parse_any(captures: &Captures<'_>) -> Result<LogEvent, LineError> {
    Ok(LogEvent::CustomizationSelected {
        outfit: captures
            .get(0)
            .map(|m| m.as_str().to_owned())
            .unwrap_or_default(),
    })
}

fn reject(_: &Captures<'_>) -> Result<LogEvent, LineError> {
    Err(LineError::MissingCapture { rule: "first" })
}

fn rule(name: &'static str, pattern: &str, parse: RuleParser) -> Rule {
    match Rule::new(name, pattern, parse) {
        Ok(rule) => rule,
        Err(err) => panic!("rule should compile: {err}"),
    }
}

#[test]
fn first_matching_rule_wins() {
    let rules = RuleSet::new(vec![
        rule("first", "Log", parse_any),
        rule("second", "LogCustomization", parse_any),
    ]);

    let name = rules
        .matching_rule("LogCustomization: --> X")
        .map(|(rule, _)| rule.name());
    assert_eq!(name, Some("first"));
}

#[test]
fn rejection_by_first_rule_is_final() {
    let rules = RuleSet::new(vec![
        rule("first", "Log", reject),
        rule("second", "Log", parse_any),
    ]);

    assert_eq!(
        rules.classify("LogCustomization: --> X"),
        Some(Err(LineError::MissingCapture { rule: "first" }))
    );
}
