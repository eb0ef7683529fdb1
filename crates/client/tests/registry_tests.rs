// Rewind - Time-Travel Debugger Client
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Breakpoint registry behavior against a recording oracle.

use std::sync::Arc;

use rewind_client::{
    test_utils::{MockOracle, OracleCall},
    BreakpointRegistry, OracleError,
};
use rewind_common::{
    logging::ensure_test_logging,
    types::{BreakpointOptions, Location, LogGroupId},
};

fn setup() -> (Arc<MockOracle>, BreakpointRegistry<MockOracle>) {
    ensure_test_logging(None);
    let oracle = Arc::new(MockOracle::new());
    let registry = BreakpointRegistry::new(oracle.clone());
    (oracle, registry)
}

fn url_location(line: u32) -> Location {
    Location::by_url("https://example.com/app.js", line, None)
}

fn set_by_url(line: u32, condition: Option<&str>) -> OracleCall {
    OracleCall::SetBreakpointByUrl {
        url: "https://example.com/app.js".to_string(),
        line,
        column: None,
        condition: condition.map(str::to_string),
    }
}

fn remove_by_url(line: u32) -> OracleCall {
    OracleCall::RemoveBreakpointByUrl {
        url: "https://example.com/app.js".to_string(),
        line,
        column: None,
    }
}

#[tokio::test]
async fn test_set_then_remove_round_trip() {
    let (oracle, mut registry) = setup();
    let location = url_location(12);

    registry.set_breakpoint(location.clone(), BreakpointOptions::pause()).await.unwrap();
    assert!(registry.has_breakpoint(&location));

    registry.remove_breakpoint(&location).await.unwrap();
    assert!(!registry.has_breakpoint(&location));
    assert!(registry.is_empty());
    assert_eq!(oracle.calls(), vec![set_by_url(12, None), remove_by_url(12)]);
}

#[tokio::test]
async fn test_setting_twice_keeps_one_entry() {
    let (oracle, mut registry) = setup();
    let location = url_location(3);

    registry.set_breakpoint(location.clone(), BreakpointOptions::pause()).await.unwrap();
    registry
        .set_breakpoint(location.clone(), BreakpointOptions::pause().with_condition("x > 1"))
        .await
        .unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(&location).unwrap().options.condition.as_deref(), Some("x > 1"));
    assert_eq!(oracle.calls(), vec![set_by_url(3, None), set_by_url(3, Some("x > 1"))]);
}

#[tokio::test]
async fn test_equal_fields_share_an_entry() {
    let (_oracle, mut registry) = setup();

    registry
        .set_breakpoint(Location::by_url("a.js", 5, Some(2)), BreakpointOptions::pause())
        .await
        .unwrap();

    assert!(registry.has_breakpoint(&Location::by_url("a.js", 5, Some(2))));
    assert!(!registry.has_breakpoint(&Location::by_url("a.js", 5, None)));
    assert!(!registry.has_breakpoint(&Location::by_url("a.js", 5, Some(3))));
}

#[tokio::test]
async fn test_source_id_routing() {
    let (oracle, mut registry) = setup();
    let location = Location::by_source_id("source-7", 40, Some(8));

    registry.set_breakpoint(location.clone(), BreakpointOptions::pause()).await.unwrap();
    registry.remove_breakpoint(&location).await.unwrap();

    assert_eq!(
        oracle.calls(),
        vec![
            OracleCall::SetBreakpointBySourceId {
                source_id: "source-7".to_string(),
                line: 40,
                column: Some(8),
                condition: None,
            },
            OracleCall::RemoveBreakpointBySourceId {
                source_id: "source-7".to_string(),
                line: 40,
                column: Some(8),
            },
        ]
    );
}

#[tokio::test]
async fn test_logpoint_gets_fresh_group() {
    let (oracle, mut registry) = setup();
    let location = url_location(20);

    let mut options = BreakpointOptions::log("count").with_condition("count > 2");
    options.log_group_id = Some(LogGroupId("caller-supplied".to_string()));
    registry.set_breakpoint(location.clone(), options).await.unwrap();

    let entry = registry.get(&location).unwrap();
    let group_id = entry.options.log_group_id.clone().unwrap();
    assert_ne!(group_id.as_str(), "caller-supplied");

    assert_eq!(
        oracle.calls(),
        vec![OracleCall::SetLogpoint {
            group_id: group_id.clone(),
            location: location.clone(),
            expression: "count".to_string(),
            condition: Some("count > 2".to_string()),
        }]
    );
    assert!(oracle.live_log_groups().contains(&group_id));
}

#[tokio::test]
async fn test_logpoint_round_trip_removes_its_own_group() {
    let (oracle, mut registry) = setup();
    let location = url_location(21);

    registry.set_breakpoint(location.clone(), BreakpointOptions::log("x")).await.unwrap();
    let group_id = registry.get(&location).unwrap().options.log_group_id.clone().unwrap();
    registry.remove_breakpoint(&location).await.unwrap();

    assert!(!registry.has_breakpoint(&location));
    assert_eq!(
        oracle.calls(),
        vec![
            OracleCall::SetLogpoint {
                group_id: group_id.clone(),
                location: location.clone(),
                expression: "x".to_string(),
                condition: None,
            },
            OracleCall::RemoveLogpoint { group_id },
            remove_by_url(21),
        ]
    );
    assert!(oracle.live_log_groups().is_empty());
}

#[tokio::test]
async fn test_replacing_logpoint_clears_old_group_first() {
    let (oracle, mut registry) = setup();
    let location = url_location(8);

    registry.set_breakpoint(location.clone(), BreakpointOptions::log("a")).await.unwrap();
    let first = registry.get(&location).unwrap().options.log_group_id.clone().unwrap();
    oracle.clear_calls();

    registry.set_breakpoint(location.clone(), BreakpointOptions::log("b")).await.unwrap();
    let second = registry.get(&location).unwrap().options.log_group_id.clone().unwrap();
    assert_ne!(first, second);

    let events = oracle.events();
    let removed = events.iter().position(|e| e == "end:removeLogpoint").unwrap();
    let set = events.iter().position(|e| e == "start:setLogpoint").unwrap();
    assert!(removed < set, "old group must be cleared before the new one is set: {events:?}");

    assert_eq!(oracle.live_log_groups().len(), 1);
    assert!(oracle.live_log_groups().contains(&second));
}

#[tokio::test]
async fn test_pause_and_log_calls_are_concurrent() {
    let (oracle, mut registry) = setup();
    let options = BreakpointOptions { should_pause: true, ..BreakpointOptions::log("x") };

    registry.set_breakpoint(url_location(1), options).await.unwrap();

    let events = oracle.events();
    assert_eq!(events.len(), 4);
    assert!(events[..2].iter().all(|e| e.starts_with("start:")), "{events:?}");
    assert!(events[2..].iter().all(|e| e.starts_with("end:")), "{events:?}");
}

#[tokio::test]
async fn test_disabled_entry_makes_no_remote_calls() {
    let (oracle, mut registry) = setup();
    let location = url_location(9);
    let options = BreakpointOptions {
        should_pause: true,
        disabled: true,
        ..BreakpointOptions::log("value")
    };

    registry.set_breakpoint(location.clone(), options).await.unwrap();

    assert!(registry.has_breakpoint(&location));
    assert!(registry.get(&location).unwrap().options.log_group_id.is_none());
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn test_disabling_tears_down_remote_state() {
    let (oracle, mut registry) = setup();
    let location = url_location(9);
    let options = BreakpointOptions { should_pause: true, ..BreakpointOptions::log("value") };
    registry.set_breakpoint(location.clone(), options).await.unwrap();
    oracle.clear_calls();

    assert!(registry.set_breakpoint_disabled(&location, true).await.unwrap());

    let calls = oracle.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], OracleCall::RemoveLogpoint { .. }));
    assert_eq!(calls[1], remove_by_url(9));
    assert!(oracle.live_log_groups().is_empty());
    assert!(registry.get(&location).unwrap().options.disabled);

    oracle.clear_calls();
    assert!(registry.set_breakpoint_disabled(&location, false).await.unwrap());
    assert_eq!(oracle.count("setBreakpointByUrl"), 1);
    assert_eq!(oracle.count("setLogpoint"), 1);
    assert!(!registry.set_breakpoint_disabled(&url_location(100), true).await.unwrap());
}

#[tokio::test]
async fn test_switching_to_log_only_removes_pause_breakpoint() {
    let (oracle, mut registry) = setup();
    let location = url_location(15);

    registry.set_breakpoint(location.clone(), BreakpointOptions::pause()).await.unwrap();
    registry.set_breakpoint(location.clone(), BreakpointOptions::log("y")).await.unwrap();

    let calls = oracle.calls();
    assert_eq!(calls[0], set_by_url(15, None));
    assert!(calls.contains(&remove_by_url(15)));
    assert_eq!(oracle.count("setLogpoint"), 1);
}

#[tokio::test]
async fn test_removing_absent_location_is_noop() {
    let (oracle, mut registry) = setup();
    registry.remove_breakpoint(&url_location(1)).await.unwrap();
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn test_failed_set_keeps_local_entry() {
    let (oracle, mut registry) = setup();
    let location = url_location(2);
    oracle.fail_on("setBreakpointByUrl");

    let result = registry.set_breakpoint(location.clone(), BreakpointOptions::pause()).await;
    assert!(matches!(
        result,
        Err(OracleError::Rejected { ref method, .. }) if method == "setBreakpointByUrl"
    ));
    assert!(registry.has_breakpoint(&location));
}

#[tokio::test]
async fn test_toggle_breakpoint() {
    let (oracle, mut registry) = setup();
    let location = url_location(30);

    let options = BreakpointOptions::pause();
    assert!(registry.toggle_breakpoint(location.clone(), options.clone()).await.unwrap());
    assert!(!registry.toggle_breakpoint(location.clone(), options).await.unwrap());
    assert!(!registry.has_breakpoint(&location));
    assert_eq!(oracle.calls(), vec![set_by_url(30, None), remove_by_url(30)]);
}

#[tokio::test]
async fn test_reset_is_local() {
    let (oracle, mut registry) = setup();
    registry.set_breakpoint(url_location(1), BreakpointOptions::log("a")).await.unwrap();
    registry.logpoints_mut().set_exception_logging(true).await.unwrap();
    oracle.clear_calls();

    registry.reset();

    assert!(registry.is_empty());
    assert!(registry.logpoints().exception_group().is_none());
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn test_listing_follows_line_order() {
    let (_oracle, mut registry) = setup();
    for line in [10, 9, 100] {
        registry.set_breakpoint(url_location(line), BreakpointOptions::pause()).await.unwrap();
    }
    let with_column = Location::by_url("https://example.com/app.js", 9, Some(4));
    registry.set_breakpoint(with_column, BreakpointOptions::pause()).await.unwrap();

    let listed: Vec<_> = registry
        .entries()
        .iter()
        .map(|entry| (entry.location.line, entry.location.column))
        .collect();
    assert_eq!(listed, vec![(9, None), (9, Some(4)), (10, None), (100, None)]);
}
