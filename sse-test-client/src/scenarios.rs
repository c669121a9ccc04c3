use crate::api_client::ApiClient;
use crate::output::TestResult;
use crate::sse_client::Connection;
use anyhow::Result;
use colored::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use uuid::Uuid;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_secs(2);
const ORDER_CREATED: &str = "order_created";

/// Everything a scenario needs to place orders and watch both streams.
pub struct Fixture<'a> {
    pub api: &'a ApiClient,
    pub restaurant_id: Uuid,
    pub staff_token: &'a str,
    pub user_token: &'a str,
    pub customer_id: i64,
}

/// A menu item id unlikely to collide with earlier runs, used to recognize
/// the frame produced by this scenario's order.
fn marker_item() -> i64 {
    (Uuid::new_v4().as_u128() % 1_000_000_000) as i64 + 1
}

fn carries_item(data: &Value, item_id: i64) -> bool {
    data["items"].get(item_id.to_string()).is_some()
}

fn finish(name: &str, started: Instant, outcome: Result<String>) -> TestResult {
    match outcome {
        Ok(message) => TestResult {
            name: name.to_string(),
            passed: true,
            message: Some(message),
            duration: started.elapsed(),
        },
        Err(e) => TestResult {
            name: name.to_string(),
            passed: false,
            message: Some(e.to_string()),
            duration: started.elapsed(),
        },
    }
}

pub async fn test_connection(staff: &mut Connection, viewer: &mut Connection) -> Result<TestResult> {
    println!("\n{} Connection test", "→".blue());
    let started = Instant::now();

    // Nothing has been placed, so neither stream may carry an order.
    let outcome = async {
        staff
            .expect_no_event(ORDER_CREATED, SILENCE_WINDOW, |_| true)
            .await?;
        viewer
            .expect_no_event(ORDER_CREATED, SILENCE_WINDOW, |_| true)
            .await?;
        Ok::<_, anyhow::Error>(format!("{} and {} stayed open and quiet", staff.label, viewer.label))
    }
    .await;

    Ok(finish("connection_test", started, outcome))
}

pub async fn test_staff_order(
    fixture: &Fixture<'_>,
    staff: &mut Connection,
    viewer: &mut Connection,
) -> Result<TestResult> {
    println!("\n{} Staff order reaches every viewer", "→".blue());
    let started = Instant::now();
    let item = marker_item();

    let outcome = async {
        fixture
            .api
            .create_staff_order(
                fixture.staff_token,
                &fixture.restaurant_id,
                fixture.customer_id,
                &[(item, 2)],
            )
            .await?;

        let to_staff = staff
            .wait_for_event(ORDER_CREATED, DELIVERY_TIMEOUT, |data| carries_item(data, item))
            .await?;
        let to_viewer = viewer
            .wait_for_event(ORDER_CREATED, DELIVERY_TIMEOUT, |data| carries_item(data, item))
            .await?;

        if to_staff.data["restaurant_id"] != fixture.restaurant_id.to_string() {
            anyhow::bail!("Frame carried the wrong restaurant: {}", to_staff.data);
        }
        if to_staff.data["status"] != "placed" {
            anyhow::bail!("Frame carried an unexpected status: {}", to_staff.data);
        }

        if to_viewer.data["id"] != to_staff.data["id"] {
            anyhow::bail!(
                "Viewers saw different orders: {} vs {}",
                to_staff.data["id"],
                to_viewer.data["id"]
            );
        }

        Ok::<_, anyhow::Error>(format!(
            "order {} delivered to {} and {}",
            to_staff.data["id"], staff.label, viewer.label
        ))
    }
    .await;

    Ok(finish("staff_order", started, outcome))
}

pub async fn test_own_order_excluded(
    fixture: &Fixture<'_>,
    staff: &mut Connection,
    viewer: &mut Connection,
) -> Result<TestResult> {
    println!("\n{} Customer's own order is left out of their stream", "→".blue());
    let started = Instant::now();
    let item = marker_item();

    let outcome = async {
        fixture
            .api
            .create_user_order(fixture.user_token, &fixture.restaurant_id, &[(item, 1)])
            .await?;

        let to_staff = staff
            .wait_for_event(ORDER_CREATED, DELIVERY_TIMEOUT, |data| carries_item(data, item))
            .await?;
        viewer
            .expect_no_event(ORDER_CREATED, SILENCE_WINDOW, |data| carries_item(data, item))
            .await?;

        Ok::<_, anyhow::Error>(format!(
            "order {} reached {} only",
            to_staff.data["id"], staff.label
        ))
    }
    .await;

    Ok(finish("own_order_excluded", started, outcome))
}

pub async fn test_listing(fixture: &Fixture<'_>) -> Result<TestResult> {
    println!("\n{} Listing returns open orders", "→".blue());
    let started = Instant::now();

    let outcome = async {
        let orders = fixture
            .api
            .list_orders(fixture.staff_token, &fixture.restaurant_id)
            .await?;

        if orders.iter().any(|order| order["status"] == "closed") {
            anyhow::bail!("Listing contained a closed order");
        }

        Ok::<_, anyhow::Error>(format!("{} open order(s)", orders.len()))
    }
    .await;

    Ok(finish("listing", started, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frames_are_recognized_by_their_marker_item() {
        let data = json!({"id": 3, "items": {"42": 2}});

        assert!(carries_item(&data, 42));
        assert!(!carries_item(&data, 43));
    }

    #[test]
    fn marker_items_are_positive() {
        for _ in 0..100 {
            assert!(marker_item() > 0);
        }
    }
}
