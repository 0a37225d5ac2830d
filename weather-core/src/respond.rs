//! Responder: turns the pipeline outcome into a status code and a JSON body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::{error::Result, model::AggregatedWeather};

/// Failure body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: message.into(),
        };
        Self {
            status,
            body: serde_json::to_value(body).unwrap_or_default(),
        }
    }
}

pub fn respond(result: Result<AggregatedWeather>) -> Reply {
    match result {
        Ok(weather) => match serde_json::to_value(&weather) {
            Ok(body) => Reply { status: 200, body },
            Err(e) => {
                error!(error = %e, "failed to serialize aggregated weather");
                Reply::error(500, "Internal Server Error")
            }
        },
        Err(err) => Reply::error(err.status_code(), err.public_message()),
    }
}
