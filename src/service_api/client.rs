use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{
    wire::LiveModeRequest, Ack, CollectionReport, DaySummary, OpenDayEntry, ServiceError,
    SyncBackend,
};
use crate::model::IMPORT_YEAR;

pub const DEFAULT_API_BASE_URL: &str = "https://shopify-klara-sync-backend.onrender.com";

/// HTTP client for the reconciliation backend
pub struct SyncService {
    http: reqwest::Client,
    api_base: String,
}

impl SyncService {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("klara-sync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.api_base, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

fn day_path(date: NaiveDate) -> String {
    format!("days/{}", date.format("%Y-%m-%d"))
}

fn import_path(action: &str) -> String {
    format!("import/{IMPORT_YEAR}/{action}")
}

impl SyncBackend for SyncService {
    async fn day_summary(&self, date: NaiveDate) -> Result<DaySummary, ServiceError> {
        log::debug!("GET {}", day_path(date));
        self.execute(self.http.get(self.url(&day_path(date)))).await
    }

    async fn open_days(&self) -> Result<Vec<OpenDayEntry>, ServiceError> {
        log::debug!("GET open-days");
        self.execute(self.http.get(self.url("open-days"))).await
    }

    async fn send_day(&self, date: NaiveDate) -> Result<Ack, ServiceError> {
        let path = format!("{}/send", day_path(date));
        log::debug!("POST {path}");
        self.execute(self.http.post(self.url(&path))).await
    }

    async fn run_collection(&self) -> Result<CollectionReport, ServiceError> {
        let path = import_path("collect");
        log::debug!("POST {path}");
        self.execute(self.http.post(self.url(&path))).await
    }

    async fn send_postings(&self) -> Result<Ack, ServiceError> {
        let path = import_path("send");
        log::debug!("POST {path}");
        self.execute(self.http.post(self.url(&path))).await
    }

    async fn set_live_mode(&self, enabled: bool) -> Result<Ack, ServiceError> {
        log::debug!("PUT live-mode enabled={enabled}");
        let request = self
            .http
            .put(self.url("live-mode"))
            .json(&LiveModeRequest { enabled });
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(api_base: &str) -> SyncService {
        SyncService::new(api_base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn urls() {
        let service = service(DEFAULT_API_BASE_URL);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(
            "https://shopify-klara-sync-backend.onrender.com/api/days/2026-01-05",
            service.url(&day_path(date))
        );
        assert_eq!(
            "https://shopify-klara-sync-backend.onrender.com/api/import/2025/collect",
            service.url(&import_path("collect"))
        );
    }

    #[test]
    fn trailing_slash_is_dropped() {
        assert_eq!(
            "http://localhost:3000/api/open-days",
            service("http://localhost:3000/").url("open-days")
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_failure() {
        // Nothing listens on port 9 (discard) on loopback in the test environment
        let service = service("http://127.0.0.1:9");
        let err = service.open_days().await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)), "{err:?}");
    }
}
