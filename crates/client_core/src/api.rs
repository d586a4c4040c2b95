use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use session::Session;
use shared::{
    domain::{Task, TaskId},
    error::ApiErrorBody,
    protocol::{AuthResponse, Credentials, Registration, ReorderRequest, TaskDraft, TaskPatch},
};

use crate::error::ClientError;

/// The source imposed no request timeout; expiry here is an ordinary
/// transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The remote contract the controller depends on. Authenticated calls take
/// the session explicitly; there is no ambient token.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError>;
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError>;
    async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, ClientError>;
    async fn create_task(&self, session: &Session, draft: &TaskDraft)
        -> Result<Task, ClientError>;
    async fn update_task(
        &self,
        session: &Session,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, ClientError>;
    async fn delete_task(&self, session: &Session, id: &TaskId) -> Result<(), ClientError>;
    async fn reorder_tasks(&self, session: &Session, tasks: &[Task]) -> Result<(), ClientError>;
}

/// `reqwest`-backed implementation against the remote HTTP service.
pub struct HttpTaskApi {
    http: Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.bearer_auth(&session.token)
    }

    async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn expect_ok(response: Response) -> Result<(), ClientError> {
        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.json::<ApiErrorBody>().await.ok();
        Err(ClientError::from_rejection(status.as_u16(), body))
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(credentials)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/register"))
            .json(registration)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, ClientError> {
        let response = self
            .authed(self.http.get(self.url("/todos")), session)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn create_task(
        &self,
        session: &Session,
        draft: &TaskDraft,
    ) -> Result<Task, ClientError> {
        let response = self
            .authed(self.http.post(self.url("/todos")), session)
            .json(draft)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn update_task(
        &self,
        session: &Session,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, ClientError> {
        let response = self
            .authed(
                self.http.put(self.url(&format!("/todos/{id}"))),
                session,
            )
            .json(patch)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn delete_task(&self, session: &Session, id: &TaskId) -> Result<(), ClientError> {
        let response = self
            .authed(
                self.http.delete(self.url(&format!("/todos/{id}"))),
                session,
            )
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn reorder_tasks(&self, session: &Session, tasks: &[Task]) -> Result<(), ClientError> {
        let body = ReorderRequest {
            todos: tasks.to_vec(),
        };
        let response = self
            .authed(self.http.put(self.url("/todos/reorder")), session)
            .json(&body)
            .send()
            .await?;
        Self::expect_ok(response).await
    }
}
