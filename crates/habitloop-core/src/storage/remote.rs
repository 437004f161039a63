//! Remote habit store client.
//!
//! Talks to the hosted backend-as-a-service over its PostgREST-style
//! REST surface. The backend owns schema and auth; this client only
//! issues CRUD calls and maps failures to [`StoreError`].

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use url::Url;

use super::config::RemoteConfig;
use crate::error::StoreError;
use crate::habit::{Completion, Habit, HabitPatch};
use crate::storage::HabitStore;

/// Client for the hosted habit store.
pub struct RemoteStore {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl RemoteStore {
    /// Create a client from the `[remote]` config section.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse.
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| StoreError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client: Client::new(),
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/rest/v1/{resource}", self.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(StoreError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn completions_at(
        &self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Completion>, StoreError> {
        let resp = self
            .authed(self.http_client.get(self.endpoint("completions")))
            .query(&[
                ("habitId", format!("eq.{habit_id}")),
                ("date", format!("eq.{date}")),
            ])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}

#[async_trait]
impl HabitStore for RemoteStore {
    async fn create_habit(&self, habit: &Habit) -> Result<(), StoreError> {
        let resp = self
            .authed(self.http_client.post(self.endpoint("habits")))
            .json(habit)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn update_habit(&self, id: &str, patch: &HabitPatch) -> Result<(), StoreError> {
        let resp = self
            .authed(self.http_client.patch(self.endpoint("habits")))
            .query(&[("id", format!("eq.{id}"))])
            .json(patch)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_habit(&self, id: &str) -> Result<(), StoreError> {
        let resp = self
            .authed(self.http_client.delete(self.endpoint("habits")))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_completions(&self, habit_id: &str) -> Result<(), StoreError> {
        let resp = self
            .authed(self.http_client.delete(self.endpoint("completions")))
            .query(&[("habitId", format!("eq.{habit_id}"))])
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError> {
        let resp = self
            .authed(self.http_client.get(self.endpoint("habits")))
            .query(&[
                ("id", format!("eq.{id}")),
                ("select", "*,completions(*)".to_string()),
            ])
            .send()
            .await?;
        let habits: Vec<Habit> = Self::check(resp).await?.json().await?;
        Ok(habits.into_iter().next())
    }

    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StoreError> {
        let resp = self
            .authed(self.http_client.get(self.endpoint("habits")))
            .query(&[
                ("userId", format!("eq.{user_id}")),
                ("select", "*,completions(*)".to_string()),
            ])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn toggle_completion(&self, habit_id: &str, date: NaiveDate) -> Result<bool, StoreError> {
        let existing = self.completions_at(habit_id, date).await?;
        if !existing.is_empty() {
            let resp = self
                .authed(self.http_client.delete(self.endpoint("completions")))
                .query(&[
                    ("habitId", format!("eq.{habit_id}")),
                    ("date", format!("eq.{date}")),
                ])
                .send()
                .await?;
            Self::check(resp).await?;
            return Ok(false);
        }

        let completion = Completion {
            date,
            habit_id: habit_id.to_string(),
        };
        let resp = self
            .authed(self.http_client.post(self.endpoint("completions")))
            .json(&completion)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(true)
    }
}
