//! Client for the Concept2 logbook API.
//!
//! Downloads are written straight into a [`DataStore`]; ranking never talks
//! to the network. The access token is passed into every call.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::SourceError;
use crate::source::store::DataStore;
use crate::types::workout::{RawWorkout, ResultsPage, StrokePage};

/// Upper bound on result pages fetched per athlete.
pub const MAX_PAGES: usize = 50;

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Deserialize)]
struct PagedResults {
    #[serde(default)]
    data: Vec<RawWorkout>,
    meta: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub id: u64,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub requested: usize,
    pub succeeded: usize,
    pub failures: Vec<SyncFailure>,
}

/// A workout whose strokes should be downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeRequest {
    pub user_id: u64,
    pub workout_id: u64,
}

#[derive(Debug, Clone)]
pub struct LogbookClient {
    http: Client,
    api_root: String,
    concurrency: usize,
}

impl LogbookClient {
    pub fn new(api_root: &str, timeout: Duration, concurrency: usize) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SourceError::Http(format!("Failed to create HTTP client: {}", err)))?;
        Ok(Self {
            http,
            api_root: api_root.trim_end_matches('/').to_string(),
            concurrency: concurrency.max(1),
        })
    }

    /// All results of `athlete_id` logged on or after `from`.
    pub async fn fetch_results(
        &self,
        token: &AccessToken,
        athlete_id: u64,
        from: NaiveDate,
    ) -> Result<ResultsPage, SourceError> {
        let mut url = format!(
            "{}/api/users/{}/results?from={}",
            self.api_root,
            athlete_id,
            from.format("%Y-%m-%d")
        );
        let mut data = Vec::new();
        let mut pages = 0;

        loop {
            if pages == MAX_PAGES {
                tracing::warn!(
                    "Athlete {}: stopped after {} result pages, {} is not fetched",
                    athlete_id,
                    MAX_PAGES,
                    url
                );
                break;
            }
            pages += 1;

            let page: PagedResults = self
                .get_json(token, &url)
                .await
                .map_err(|err| match err {
                    SourceError::Status { status: 404, .. } => SourceError::NotFound(athlete_id),
                    other => other,
                })?;
            data.extend(page.data);

            let next = page
                .meta
                .as_ref()
                .and_then(|meta| meta.pointer("/pagination/links/next"))
                .and_then(Value::as_str)
                .map(str::to_string);
            match next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(ResultsPage { data })
    }

    pub async fn fetch_strokes(
        &self,
        token: &AccessToken,
        request: StrokeRequest,
    ) -> Result<StrokePage, SourceError> {
        let url = format!(
            "{}/api/users/{}/results/{}/strokes",
            self.api_root, request.user_id, request.workout_id
        );
        self.get_json(token, &url).await
    }

    /// Downloads recent results for every athlete into `store`, a bounded
    /// number at a time. One athlete failing does not stop the others.
    pub async fn sync_results(
        &self,
        token: &AccessToken,
        athletes: Vec<u64>,
        from: NaiveDate,
        store: &DataStore,
    ) -> SyncReport {
        let jobs = athletes.into_iter().map(|athlete_id| {
            let client = self.clone();
            let token = token.clone();
            let store = store.clone();
            (athlete_id, async move {
                let page = client.fetch_results(&token, athlete_id, from).await?;
                tracing::info!("Athlete {} updated ({} results)", athlete_id, page.data.len());
                store.save_results(athlete_id, &page)
            })
        });
        self.run_bounded("results", jobs).await
    }

    pub async fn prefetch_strokes(
        &self,
        token: &AccessToken,
        requests: Vec<StrokeRequest>,
        store: &DataStore,
    ) -> SyncReport {
        let jobs = requests.into_iter().map(|request| {
            let client = self.clone();
            let token = token.clone();
            let store = store.clone();
            (request.workout_id, async move {
                let page = client.fetch_strokes(&token, request).await?;
                store.save_strokes(request.workout_id, &page)
            })
        });
        self.run_bounded("strokes", jobs).await
    }

    async fn run_bounded<I, F>(&self, label: &str, jobs: I) -> SyncReport
    where
        I: IntoIterator<Item = (u64, F)>,
        F: std::future::Future<Output = Result<(), SourceError>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let start = Instant::now();

        let tasks: Vec<_> = jobs
            .into_iter()
            .map(|(id, job)| {
                let semaphore = Arc::clone(&semaphore);
                let handle = tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|err| SourceError::Http(format!("Worker pool closed: {}", err)))?;
                    job.await
                });
                (id, handle)
            })
            .collect();

        let mut report = SyncReport {
            requested: tasks.len(),
            ..SyncReport::default()
        };
        for (id, task) in tasks {
            let outcome = match task.await {
                Ok(result) => result.map_err(|err| err.to_string()),
                Err(err) => Err(format!("Task error: {}", err)),
            };
            match outcome {
                Ok(()) => report.succeeded += 1,
                Err(error) => {
                    tracing::warn!("Failed to download {} for {}: {}", label, id, error);
                    report.failures.push(SyncFailure { id, error });
                }
            }
        }

        tracing::info!(
            "Downloaded {} {}/{} in {:.2}s",
            label,
            report.succeeded,
            report.requested,
            start.elapsed().as_secs_f64()
        );
        report
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: &str,
    ) -> Result<T, SourceError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token.as_str())
            .header("Accept", "application/vnd.c2logbook.v1+json")
            .send()
            .await
            .map_err(|err| SourceError::Http(format!("Request to {} failed: {}", url, err)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SourceError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|err| SourceError::Http(format!("Invalid response from {}: {}", url, err)))
    }
}
