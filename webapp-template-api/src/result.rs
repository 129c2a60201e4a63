use serde::{Deserialize, Serialize};

/// Outcome marker carried in the `status` field of every JSON body.
///
/// Serialized as `"success"` / `"error"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}
