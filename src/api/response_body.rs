use serde::{Deserialize, Serialize};

/// Body sent with every error status, e.g. `{"message": "Server not found"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseBody {
    pub message: String,
}

impl ResponseBody {
    pub fn message(message: impl Into<String>) -> Self {
        ResponseBody {
            message: message.into(),
        }
    }
}
