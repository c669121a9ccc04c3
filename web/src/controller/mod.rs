use serde::Serialize;

pub(crate) mod health_check_controller;
pub(crate) mod order_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn api_response_wraps_data_with_its_status() {
        let response = ApiResponse::new(StatusCode::OK.into(), vec![1, 2]);

        // Compare as values since key order in the serialized string is not fixed
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"status_code": 200, "data": [1, 2]}));
    }
}
