/*
[INPUT]:  Mock backend requirements for controller-level tests
[OUTPUT]: Wire fixtures and an event pump for DashboardController
[POS]:    Test infrastructure - shared across basis-monitor integration tests
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use std::time::Duration;

use basis_monitor::DashboardController;
use serde_json::{Value, json};

pub fn record_json(symbol: &str, basis_percent: f64) -> Value {
    json!({
        "symbol": symbol,
        "spot_price": 100.0,
        "futures_price": 100.0 + basis_percent,
        "basis": basis_percent,
        "basis_percent": basis_percent,
        "spot_volume": 1000.0,
        "futures_volume": 2000.0
    })
}

pub fn basis_body(records: Vec<Value>) -> Value {
    json!({
        "success": true,
        "timestamp": "2024-05-01T09:30:00",
        "total_count": records.len(),
        "data": records
    })
}

/// Apply feed events until `done` holds, failing after `limit`.
pub async fn pump_until<P>(controller: &mut DashboardController, limit: Duration, mut done: P)
where
    P: FnMut(&DashboardController) -> bool,
{
    tokio::time::timeout(limit, async {
        while !done(controller) {
            match controller.next_event().await {
                Some(event) => controller.apply(event),
                None => panic!("feed stopped before condition held"),
            }
        }
    })
    .await
    .expect("condition not reached in time");
}
