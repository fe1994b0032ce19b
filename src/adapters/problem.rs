use {
    crate::domain::error::StoreError,
    serde::Deserialize,
    std::collections::HashMap,
};

/// RFC 7807-style error body as the backend emits it
/// (`application/problem+json`, occasionally plain `application/json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    pub title: Option<String>,
    pub status: Option<u16>,
    pub detail: Option<String>,
    pub trace_id: Option<String>,
    pub correlation_id: Option<String>,
    /// Field-level validation errors, present on 400 responses.
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ProblemDetails {
    fn message(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "unspecified problem".to_string())
    }
}

/// Map a non-success response to the error taxonomy callers consume.
/// The confirmation poller ignores the distinction and treats every
/// variant as "not yet resolved".
pub async fn error_from_response(res: reqwest::Response) -> StoreError {
    let status = res.status();
    let correlation_id = res
        .headers()
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = res.text().await.unwrap_or_default();

    let problem: Option<ProblemDetails> = serde_json::from_str(&body).ok();
    if let Some(cid) = problem
        .as_ref()
        .and_then(|p| p.correlation_id.clone())
        .or(correlation_id)
    {
        tracing::debug!(status = %status, correlation_id = %cid, "backend error response");
    }

    match (status.as_u16(), problem) {
        (400, Some(p)) => {
            let fields = p
                .errors
                .as_ref()
                .map(|e| e.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            if fields.is_empty() {
                StoreError::Validation(p.message())
            } else {
                StoreError::Validation(format!("{} ({fields})", p.message()))
            }
        }
        (400, None) => StoreError::Validation(body),
        (401, _) => StoreError::Unauthorized,
        (404, Some(p)) => StoreError::NotFound(p.message()),
        (404, None) => StoreError::NotFound(body),
        (_, Some(p)) => StoreError::Problem(p.message()),
        (_, None) => StoreError::Problem(format!("status {status}: {body}")),
    }
}
