//! Hosted database adapter speaking a PostgREST-style HTTP API.
//!
//! Questions live in the `questions` table and responses in `quiz_responses`.
//! Rows are filtered with `column=eq.value` query parameters.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizmark_core::error::StoreError;
use quizmark_core::model::{EvaluationResult, Grade, Question, ResponseRecord};
use quizmark_core::traits::{QuestionStore, ResponseStore};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const QUESTIONS_TABLE: &str = "questions";
const RESPONSES_TABLE: &str = "quiz_responses";

/// A store backed by a hosted REST database.
pub struct RestStore {
    base_url: String,
    api_key: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
            client,
        })
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{table}", self.base_url))
            .map_err(|e| StoreError::Network(format!("invalid store URL: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.timeout_secs)
            } else {
                StoreError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RestError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(match status {
            401 | 403 => StoreError::Unauthorized(message),
            404 => StoreError::NotFound(message),
            409 => StoreError::Conflict(message),
            _ => StoreError::Api { status, message },
        })
    }

    async fn rows<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Vec<T>, StoreError> {
        let response = self.send(builder).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::Serialization(format!("failed to parse rows: {e}")))
    }
}

#[derive(Deserialize)]
struct RestError {
    message: String,
}

#[derive(Serialize)]
struct EvaluationPatch<'a> {
    score: Grade,
    feedback: &'a str,
    evaluated_at: DateTime<Utc>,
}

#[async_trait]
impl QuestionStore for RestStore {
    #[instrument(skip(self))]
    async fn get_question(&self, question_id: &str) -> Result<Question, StoreError> {
        let url = self.table_url(
            QUESTIONS_TABLE,
            &[("id", format!("eq.{question_id}")), ("select", "*".into())],
        )?;
        let rows: Vec<Question> = self.rows(self.request(Method::GET, url)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("question {question_id}")))
    }

    #[instrument(skip(self))]
    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<Question>, StoreError> {
        let url = self.table_url(
            QUESTIONS_TABLE,
            &[("quiz_id", format!("eq.{quiz_id}")), ("select", "*".into())],
        )?;
        self.rows(self.request(Method::GET, url)).await
    }
}

#[async_trait]
impl ResponseStore for RestStore {
    #[instrument(skip(self, record), fields(question_id = %record.question_id, user_id = %record.user_id))]
    async fn insert_response(&self, record: &ResponseRecord) -> Result<ResponseRecord, StoreError> {
        let url = self.table_url(
            RESPONSES_TABLE,
            &[("on_conflict", "question_id,user_id".into())],
        )?;
        let builder = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[record]);
        let rows: Vec<ResponseRecord> = self.rows(builder).await?;
        Ok(rows.into_iter().next().unwrap_or_else(|| record.clone()))
    }

    #[instrument(skip(self, result), fields(score = result.score.value()))]
    async fn update_evaluation(
        &self,
        question_id: &str,
        user_id: &str,
        result: &EvaluationResult,
    ) -> Result<ResponseRecord, StoreError> {
        let url = self.table_url(
            RESPONSES_TABLE,
            &[
                ("question_id", format!("eq.{question_id}")),
                ("user_id", format!("eq.{user_id}")),
            ],
        )?;
        let patch = EvaluationPatch {
            score: result.score,
            feedback: &result.feedback,
            evaluated_at: Utc::now(),
        };
        let builder = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows: Vec<ResponseRecord> = self.rows(builder).await?;
        rows.into_iter().next().ok_or_else(|| {
            StoreError::NotFound(format!("response for {question_id} by {user_id}"))
        })
    }

    #[instrument(skip(self))]
    async fn get_response(
        &self,
        question_id: &str,
        user_id: &str,
    ) -> Result<Option<ResponseRecord>, StoreError> {
        let url = self.table_url(
            RESPONSES_TABLE,
            &[
                ("question_id", format!("eq.{question_id}")),
                ("user_id", format!("eq.{user_id}")),
                ("select", "*".into()),
            ],
        )?;
        let rows: Vec<ResponseRecord> = self.rows(self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn list_responses(&self, question_id: &str) -> Result<Vec<ResponseRecord>, StoreError> {
        let url = self.table_url(
            RESPONSES_TABLE,
            &[
                ("question_id", format!("eq.{question_id}")),
                ("select", "*".into()),
            ],
        )?;
        self.rows(self.request(Method::GET, url)).await
    }
}
