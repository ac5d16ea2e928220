//! `reqwest` implementation of [`TicketApi`].

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use claimdesk_core::config::ApiConfig;
use claimdesk_core::error::{AppError, ErrorKind};
use claimdesk_core::result::AppResult;
use claimdesk_core::types::{TaskId, TicketId};
use claimdesk_entity::{Task, TaskDraft, TaskStatus, Ticket, TicketPriority, TicketStatus};

use crate::api::TicketApi;

/// HTTP client for the ticket/task REST API.
#[derive(Debug)]
pub struct HttpTicketApi {
    client: Client,
    base_url: String,
    /// Bearer token of the current identity, if any.
    token: RwLock<Option<String>>,
}

#[derive(Serialize)]
struct StatusPatch<S> {
    status: S,
}

#[derive(Serialize)]
struct PriorityPatch {
    priority: TicketPriority,
}

impl HttpTicketApi {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Replace the bearer token sent with every request.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.token.read().unwrap_or_else(|e| e.into_inner()).as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> AppResult<T> {
        let response = builder.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Request for {what} failed"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(what, status = %status, "API request succeeded");
            return response.json::<T>().await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Unexpected response body for {what}"),
                    e,
                )
            });
        }

        let body = response.text().await.unwrap_or_default();
        warn!(what, status = %status, body = %body, "API request rejected");
        Err(status_error(status, what, &body))
    }
}

/// Map a non-success HTTP status to an application error.
fn status_error(status: StatusCode, what: &str, body: &str) -> AppError {
    let message = if body.is_empty() {
        format!("{what}: HTTP {status}")
    } else {
        format!("{what}: HTTP {status}: {body}")
    };

    let kind = match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Authentication,
        StatusCode::FORBIDDEN => ErrorKind::Authorization,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        _ => ErrorKind::ExternalService,
    };
    AppError::new(kind, message)
}

#[async_trait]
impl TicketApi for HttpTicketApi {
    async fn list_tickets(&self) -> AppResult<Vec<Ticket>> {
        self.send(self.request(Method::GET, "/tickets"), "ticket list")
            .await
    }

    async fn get_ticket(&self, id: &TicketId) -> AppResult<Ticket> {
        self.send(self.request(Method::GET, &format!("/tickets/{id}")), "ticket")
            .await
    }

    async fn list_tasks(&self, ticket_id: &TicketId) -> AppResult<Vec<Task>> {
        self.send(
            self.request(Method::GET, &format!("/tickets/{ticket_id}/tasks")),
            "task list",
        )
        .await
    }

    async fn get_task(&self, id: &TaskId) -> AppResult<Task> {
        self.send(self.request(Method::GET, &format!("/tasks/{id}")), "task")
            .await
    }

    async fn update_ticket_status(&self, id: &TicketId, status: TicketStatus) -> AppResult<Ticket> {
        let builder = self
            .request(Method::PATCH, &format!("/tickets/{id}"))
            .json(&StatusPatch { status });
        self.send(builder, "ticket status update").await
    }

    async fn update_ticket_priority(
        &self,
        id: &TicketId,
        priority: TicketPriority,
    ) -> AppResult<Ticket> {
        let builder = self
            .request(Method::PATCH, &format!("/tickets/{id}"))
            .json(&PriorityPatch { priority });
        self.send(builder, "ticket priority update").await
    }

    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> AppResult<Task> {
        let builder = self
            .request(Method::PATCH, &format!("/tasks/{id}"))
            .json(&StatusPatch { status });
        self.send(builder, "task status update").await
    }

    async fn create_task(&self, ticket_id: &TicketId, draft: &TaskDraft) -> AppResult<Task> {
        let builder = self
            .request(Method::POST, &format!("/tickets/{ticket_id}/tasks"))
            .json(draft);
        self.send(builder, "task creation").await
    }
}
