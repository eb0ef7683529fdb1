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

//! Singleton log group lifecycle.

use std::sync::Arc;

use rewind_client::{
    test_utils::{MockOracle, OracleCall},
    LogpointCoordinator,
};
use rewind_common::{logging::ensure_test_logging, types::LogGroupScope};

fn setup() -> (Arc<MockOracle>, LogpointCoordinator<MockOracle>) {
    ensure_test_logging(None);
    let oracle = Arc::new(MockOracle::new());
    let coordinator = LogpointCoordinator::new(oracle.clone());
    (oracle, coordinator)
}

fn events(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn test_event_group_is_replaced() {
    let (oracle, mut coordinator) = setup();

    coordinator.set_event_breakpoints(&events(&["click"])).await.unwrap();
    let first = coordinator.event_group().unwrap();
    assert_eq!(first.scope, LogGroupScope::Event);

    coordinator.set_event_breakpoints(&events(&["click", "keydown"])).await.unwrap();
    let second = coordinator.event_group().unwrap();
    assert_ne!(first.id, second.id);

    assert_eq!(
        oracle.calls(),
        vec![
            OracleCall::SetEventLogpoint { group_id: first.id.clone(), event_ids: events(&["click"]) },
            OracleCall::SetActiveEventBreakpoints { event_ids: events(&["click"]) },
            OracleCall::RemoveLogpoint { group_id: first.id },
            OracleCall::SetEventLogpoint {
                group_id: second.id.clone(),
                event_ids: events(&["click", "keydown"]),
            },
            OracleCall::SetActiveEventBreakpoints { event_ids: events(&["click", "keydown"]) },
        ]
    );
    assert_eq!(oracle.live_log_groups().len(), 1);
}

#[tokio::test]
async fn test_empty_event_list_leaves_no_group() {
    let (oracle, mut coordinator) = setup();

    coordinator.set_event_breakpoints(&events(&["click"])).await.unwrap();
    coordinator.set_event_breakpoints(&[]).await.unwrap();

    assert!(coordinator.event_group().is_none());
    assert!(oracle.live_log_groups().is_empty());
    assert_eq!(
        oracle.calls().last(),
        Some(&OracleCall::SetActiveEventBreakpoints { event_ids: Vec::new() })
    );
    assert_eq!(oracle.count("setEventLogpoint"), 1);
}

#[tokio::test]
async fn test_removal_completes_before_new_group() {
    let (oracle, mut coordinator) = setup();
    coordinator.set_exception_logging(true).await.unwrap();
    oracle.clear_calls();

    coordinator.set_exception_logging(true).await.unwrap();

    assert_eq!(
        oracle.events(),
        vec![
            "start:removeLogpoint",
            "end:removeLogpoint",
            "start:setExceptionLogpoint",
            "end:setExceptionLogpoint",
        ]
    );
    assert_eq!(oracle.live_log_groups().len(), 1);
}

#[tokio::test]
async fn test_exception_logging_toggle() {
    let (oracle, mut coordinator) = setup();

    coordinator.set_exception_logging(false).await.unwrap();
    assert!(oracle.calls().is_empty());

    coordinator.set_exception_logging(true).await.unwrap();
    let group = coordinator.exception_group().unwrap();
    assert_eq!(group.scope, LogGroupScope::Exception);
    assert!(oracle.live_log_groups().contains(&group.id));

    coordinator.set_exception_logging(false).await.unwrap();
    assert!(coordinator.exception_group().is_none());
    assert!(oracle.live_log_groups().is_empty());
}

#[tokio::test]
async fn test_event_and_exception_groups_are_independent() {
    let (oracle, mut coordinator) = setup();

    coordinator.set_exception_logging(true).await.unwrap();
    coordinator.set_event_breakpoints(&events(&["load"])).await.unwrap();
    coordinator.set_event_breakpoints(&[]).await.unwrap();

    assert!(coordinator.exception_group().is_some());
    assert!(coordinator.event_group().is_none());
    assert_eq!(oracle.live_log_groups().len(), 1);
}

#[tokio::test]
async fn test_reset_forgets_without_calls() {
    let (oracle, mut coordinator) = setup();
    coordinator.set_exception_logging(true).await.unwrap();
    coordinator.set_event_breakpoints(&events(&["load"])).await.unwrap();
    oracle.clear_calls();

    coordinator.reset();

    assert!(coordinator.exception_group().is_none());
    assert!(coordinator.event_group().is_none());
    assert!(oracle.calls().is_empty());

    // A reset coordinator does not try to remove groups it no longer knows
    coordinator.set_exception_logging(true).await.unwrap();
    assert_eq!(oracle.count("removeLogpoint"), 0);
}
