// POST /summarize — validate the request and run the summarizer.
//
// 200 { content } on success, 400 { detail } for invalid parameters or
// unparseable JSON, 415 when the body isn't sent as application/json,
// 500 { detail } when segmentation, embedding, or clustering fails.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::output::preview;
use crate::summary::validation::validate_request;
use crate::web::{api_error, AppState};

/// Response body of a successful summarization.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub content: String,
}

pub async fn summarize(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => {
            return api_error(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported media type. The request body must be application/json.",
            );
        }
        Err(rejection) => {
            debug!(error = %rejection, "Rejected request body");
            return api_error(
                StatusCode::BAD_REQUEST,
                "Malformed request body. The body must be valid JSON.",
            );
        }
    };

    let request = match validate_request(&body) {
        Ok(request) => request,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    debug!(
        text_preview = %preview(&request.text, 50),
        num_sentences = ?request.num_sentences,
        sent_ratio = request.sent_ratio,
        use_first_sent = request.use_first_sent,
        "Summarization request"
    );

    let params = request.params(state.config.min_length, state.config.max_length);

    match state.assembler.summarize(&request.text, &params).await {
        Ok(content) => Json(SummaryResponse { content }).into_response(),
        Err(e) => {
            error!(error = %format!("{e:#}"), "Summarization failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Summarization failed: {e}"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serializes_content_only() {
        let body = serde_json::to_value(SummaryResponse {
            content: "First. Second.".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "content": "First. Second." }));
    }
}
