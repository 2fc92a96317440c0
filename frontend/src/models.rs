use serde::{Deserialize, Serialize};

/// Matches the relay `Citation` model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Citation {
    pub label: String,
    pub url: String,
}

/// Request body for `POST /ask`.
#[derive(Clone, Debug, Serialize)]
pub struct AskRequest {
    pub message: String,
}

/// Successful response from `POST /ask`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AskResponse {
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Error body returned with non-2xx relay statuses.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
