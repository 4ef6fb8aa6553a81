//! Working-location fetcher.
//!
//! Builds the local-day query against the events-list endpoint, issues one
//! authenticated GET through the [`HttpTransport`] collaborator and classifies
//! failures. There is no retry loop here; retry policy belongs to the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use worklocation_core::TimeWindow;

use crate::credentials::CredentialProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, WORKING_LOCATION_EVENT_TYPE};
use crate::transport::{ApiRequest, HttpTransport};

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Fetches today's working-location events for one calendar.
pub struct WorkingLocationFetcher {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
    timeout: Duration,
}

impl WorkingLocationFetcher {
    /// Default timeout for one fetch, credential lookup included.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a fetcher over the given collaborators.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            transport,
            credentials,
            base_url: CALENDAR_API_BASE.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set the timeout for one fetch.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the events-list URL for a calendar.
    pub fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    /// Fetches the events of the local day containing `now`.
    ///
    /// An empty list is a valid result.
    ///
    /// # Errors
    ///
    /// Authentication errors for HTTP 401 or an unusable credential, transient
    /// errors for other statuses, network failures and timeouts, and malformed
    /// data errors when the body is not an events list at all.
    pub async fn fetch(
        &self,
        calendar_id: &str,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> ProviderResult<Vec<RawEvent>> {
        let window = TimeWindow::local_day(now, offset);
        self.fetch_window(calendar_id, &window).await
    }

    /// Fetches the events inside a precomputed window.
    pub async fn fetch_window(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<RawEvent>> {
        match tokio::time::timeout(self.timeout, self.fetch_inner(calendar_id, window)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    calendar_id,
                    timeout_secs = self.timeout.as_secs(),
                    "working location fetch timed out"
                );
                Err(ProviderError::timeout("request timeout"))
            }
        }
    }

    async fn fetch_inner(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<RawEvent>> {
        let token = self.credentials.access_token().await?;

        let request = ApiRequest::get(self.events_url(calendar_id), token)
            .with_query("timeMin", window.time_min())
            .with_query("timeMax", window.time_max())
            .with_query("singleEvents", "true")
            .with_query("orderBy", "startTime")
            .with_query("eventTypes", WORKING_LOCATION_EVENT_TYPE);

        debug!(
            calendar_id,
            time_min = %window.time_min(),
            time_max = %window.time_max(),
            "fetching working location events"
        );

        let response = self.transport.get(request).await?;

        if !response.is_success() {
            return Err(ProviderError::from_status(response.status, &response.body));
        }

        let events = parse_events_body(&response.body)?;
        debug!(calendar_id, count = events.len(), "fetched working location events");
        Ok(events)
    }
}

/// Decodes an events-list response body.
///
/// An empty body or a missing or `null` `items` field is an empty list.
/// Individual items are decoded leniently by [`RawEvent::from_item`]; items
/// whose `eventType` is set to anything but `workingLocation` are skipped.
pub fn parse_events_body(body: &str) -> ProviderResult<Vec<RawEvent>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        ProviderError::malformed(format!("failed to parse response: {}", e)).with_source(e)
    })?;

    let Value::Object(mut object) = value else {
        return Err(ProviderError::malformed("response is not a JSON object"));
    };

    match object.remove("items") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .map(RawEvent::from_item)
            .filter(|event| {
                let keep = event.is_working_location();
                if !keep {
                    debug!(
                        event_id = event.id.as_deref().unwrap_or("<missing>"),
                        event_type = event.event_type.as_deref().unwrap_or_default(),
                        "skipping non working location event"
                    );
                }
                keep
            })
            .collect()),
        Some(_) => Err(ProviderError::malformed("`items` is not an array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::TimeZone;

    use crate::credentials::StaticToken;
    use crate::error::ProviderErrorCode;
    use crate::transport::{ApiResponse, BoxFuture};

    /// Transport returning a canned result and recording requests.
    struct FakeTransport {
        response: Mutex<Option<ProviderResult<ApiResponse>>>,
        requests: Mutex<Vec<ApiRequest>>,
        delay: Option<Duration>,
    }

    impl FakeTransport {
        fn respond(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Ok(ApiResponse::new(status, body)))),
                requests: Mutex::new(Vec::new()),
                delay: None,
            })
        }

        fn fail(error: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Err(error))),
                requests: Mutex::new(Vec::new()),
                delay: None,
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Ok(ApiResponse::new(200, "{}")))),
                requests: Mutex::new(Vec::new()),
                delay: Some(delay),
            })
        }

        fn last_request(&self) -> ApiRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl HttpTransport for FakeTransport {
        fn get(&self, request: ApiRequest) -> BoxFuture<'_, ProviderResult<ApiResponse>> {
            self.requests.lock().unwrap().push(request);
            let response = self
                .response
                .lock()
                .unwrap()
                .take()
                .expect("one request per test");
            let delay = self.delay;
            Box::pin(async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                response
            })
        }
    }

    fn fetcher(transport: Arc<FakeTransport>) -> WorkingLocationFetcher {
        WorkingLocationFetcher::new(transport, Arc::new(StaticToken::new("token-123")))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap()
    }

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn builds_local_day_query() {
        let transport = FakeTransport::respond(200, r#"{"items": []}"#);
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();

        fetcher(transport.clone())
            .fetch("primary", now(), offset)
            .await
            .unwrap();

        let request = transport.last_request();
        assert_eq!(
            request.url,
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
        assert_eq!(request.bearer_token, "token-123");
        assert_eq!(
            request.query_value("timeMin"),
            Some("2024-01-15T00:00:00+05:30")
        );
        assert_eq!(
            request.query_value("timeMax"),
            Some("2024-01-16T00:00:00+05:30")
        );
        assert_eq!(request.query_value("singleEvents"), Some("true"));
        assert_eq!(request.query_value("orderBy"), Some("startTime"));
        assert_eq!(request.query_value("eventTypes"), Some("workingLocation"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn calendar_id_is_encoded_in_path() {
        let transport = FakeTransport::respond(200, "{}");
        fetcher(transport.clone())
            .with_base_url("http://localhost:1234/v3/")
            .fetch("team@group.calendar.google.com", now(), utc_offset())
            .await
            .unwrap();

        assert_eq!(
            transport.last_request().url,
            "http://localhost:1234/v3/calendars/team%40group.calendar.google.com/events"
        );
    }

    #[tokio::test]
    async fn returns_items_in_api_order() {
        let body = r#"{
            "kind": "calendar#events",
            "items": [
                {"id": "e1", "start": {"dateTime": "2024-01-15T09:00:00Z"}, "end": {"dateTime": "2024-01-15T12:00:00Z"}},
                {"id": "e2", "start": {"dateTime": "2024-01-15T12:00:00Z"}, "end": {"dateTime": "2024-01-15T17:00:00Z"}}
            ]
        }"#;
        let events = fetcher(FakeTransport::respond(200, body))
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn empty_items_is_empty_list() {
        let events = fetcher(FakeTransport::respond(200, r#"{"items": []}"#))
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn missing_items_is_empty_list() {
        let events = fetcher(FakeTransport::respond(200, r#"{"kind": "calendar#events"}"#))
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_empty_list() {
        let events = fetcher(FakeTransport::respond(204, ""))
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap();
        assert!(events.is_empty());

        assert!(parse_events_body("  \n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_event_types_are_skipped() {
        let body = r#"{
            "items": [
                {"id": "meeting", "eventType": "default"},
                {"id": "wl", "eventType": "workingLocation"},
                {"id": "untyped"}
            ]
        }"#;
        let events = fetcher(FakeTransport::respond(200, body))
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["wl", "untyped"]);
    }

    #[tokio::test]
    async fn status_401_is_auth_error() {
        let err = fetcher(FakeTransport::respond(401, r#"{"error": {}}"#))
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn other_statuses_are_transient() {
        for status in [403, 404, 429, 500, 502] {
            let err = fetcher(FakeTransport::respond(status, ""))
                .fetch("primary", now(), utc_offset())
                .await
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Transient, "status {status}");
        }
    }

    #[tokio::test]
    async fn network_failure_is_transient() {
        let err = fetcher(FakeTransport::fail(ProviderError::transient(
            "connection reset",
        )))
        .fetch("primary", now(), utc_offset())
        .await
        .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unusable_credential_skips_request() {
        let transport = FakeTransport::respond(200, "{}");
        let fetcher = WorkingLocationFetcher::new(transport.clone(), Arc::new(StaticToken::new("")));

        let err = fetcher
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn timeout_is_transient() {
        let err = fetcher(FakeTransport::slow(Duration::from_millis(200)))
            .with_timeout(Duration::from_millis(20))
            .fetch("primary", now(), utc_offset())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Transient);
        assert!(err.message().contains("timeout"));
    }

    #[test]
    fn unparseable_body_is_malformed() {
        let err = parse_events_body("<html>").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MalformedData);

        let err = parse_events_body("[]").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MalformedData);

        let err = parse_events_body(r#"{"items": {"id": "x"}}"#).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MalformedData);
    }

    #[test]
    fn malformed_items_do_not_fail_the_list() {
        let events =
            parse_events_body(r#"{"items": [{"id": "ok"}, {"id": "bad", "start": 5}, 7]}"#)
                .unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].id.as_deref(), Some("bad"));
        assert!(events[2].id.is_none());
    }
}
