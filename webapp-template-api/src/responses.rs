use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::result::ApiStatus;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExampleData {
    pub items: Vec<String>,
    pub count: usize,
}

/// Body of `GET /api/example/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExampleResponse {
    pub status: ApiStatus,
    pub message: String,
    pub data: ExampleData,
}

impl ExampleResponse {
    /// The fixed payload served by the public example endpoint.
    pub fn sample() -> Self {
        let items: Vec<String> = ["item1", "item2", "item3"]
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            status: ApiStatus::Success,
            message: "This is an example API endpoint".to_string(),
            data: ExampleData {
                count: items.len(),
                items,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub email: String,
    pub id: i32,
}

/// Body of `GET /api/protected/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProtectedUserResponse {
    pub status: ApiStatus,
    pub message: String,
    pub user: UserSummary,
}

/// Body of `POST /api/protected/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EchoResponse {
    pub status: ApiStatus,
    pub message: String,
    pub received: serde_json::Value,
}

/// One registered social application as shown by the OAuth diagnostics.
/// Credentials are truncated to a short prefix.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SocialAppSummary {
    pub id: i32,
    pub provider: String,
    pub name: String,
    pub client_id_prefix: String,
    pub secret_prefix: String,
    pub sites: Vec<String>,
}

/// Body of `GET /debug/oauth/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DebugOAuthResponse {
    pub site_domain: String,
    pub site_name: String,
    pub callback_url: String,
    pub request_path: String,
    pub request_host: String,
    pub query_params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub social_apps: Vec<SocialAppSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_three_items() {
        let sample = ExampleResponse::sample();
        assert_eq!(sample.data.count, 3);
        assert_eq!(sample.data.items, vec!["item1", "item2", "item3"]);
    }

    #[test]
    fn sample_serializes_with_success_status() {
        let json = serde_json::to_value(ExampleResponse::sample()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["count"], 3);
    }
}
