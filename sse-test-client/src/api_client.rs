use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

/// Thin client over the order endpoints of a running backend.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub fn orders_url(&self, restaurant_id: &Uuid) -> String {
        format!("{}/restaurants/{}/orders", self.base_url, restaurant_id)
    }

    /// Places an order as restaurant staff on behalf of `customer_id`.
    pub async fn create_staff_order(
        &self,
        staff_token: &str,
        restaurant_id: &Uuid,
        customer_id: i64,
        items: &[(i64, i64)],
    ) -> Result<()> {
        let response = self
            .client
            .post(self.orders_url(restaurant_id))
            .bearer_auth(staff_token)
            .json(&json!({
                "customer_id": customer_id,
                "items": items_body(items),
            }))
            .send()
            .await
            .context("Failed to create staff order")?;

        expect_no_content(response, "staff order").await
    }

    /// Places an order as the customer that owns `user_token`.
    pub async fn create_user_order(
        &self,
        user_token: &str,
        restaurant_id: &Uuid,
        items: &[(i64, i64)],
    ) -> Result<()> {
        let url = format!("{}/restaurants/{}/user_orders", self.base_url, restaurant_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(user_token)
            .json(&json!({ "items": items_body(items) }))
            .send()
            .await
            .context("Failed to create user order")?;

        expect_no_content(response, "user order").await
    }

    /// Fetches the open orders of a restaurant as JSON.
    pub async fn list_orders(&self, staff_token: &str, restaurant_id: &Uuid) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(self.orders_url(restaurant_id))
            .bearer_auth(staff_token)
            .send()
            .await
            .context("Failed to list orders")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Failed to list orders: {} - Response: {}", status, body);
        }

        let api_response: Value = response.json().await.context("Failed to parse response")?;

        // Extract the data array from ApiResponse wrapper
        api_response["data"]
            .as_array()
            .cloned()
            .context("No data array in response")
    }
}

fn items_body(items: &[(i64, i64)]) -> Value {
    Value::Object(
        items
            .iter()
            .map(|(item_id, quantity)| (item_id.to_string(), json!(quantity)))
            .collect(),
    )
}

async fn expect_no_content(response: reqwest::Response, what: &str) -> Result<()> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(());
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    anyhow::bail!("Failed to create {}: {} - Response: {}", what, status, body)
}
