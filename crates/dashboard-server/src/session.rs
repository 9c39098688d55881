use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use portfolio_analysis::OptimizationContext;
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-session-id";

/// Optimization contexts older than this are dropped on the next insert.
const SESSION_MAX_AGE_HOURS: i64 = 24;

/// Session id carried through handlers as a request extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId(pub String);

/// Reuses the caller's `x-session-id` or issues a new one, and echoes it on the response.
pub async fn session_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(SessionId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(SESSION_HEADER, val);
    }
    response
}

/// Last optimization result per session.
#[derive(Default)]
pub struct SessionStore {
    contexts: DashMap<String, OptimizationContext>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: &SessionId, context: OptimizationContext) {
        let cutoff = Utc::now() - Duration::hours(SESSION_MAX_AGE_HOURS);
        self.contexts.retain(|_, ctx| ctx.created_at >= cutoff);
        self.contexts.insert(session.0.clone(), context);
    }

    pub fn get(&self, session: &SessionId) -> Option<OptimizationContext> {
        self.contexts.get(&session.0).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
