use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use workshop_core::api::{
    ApiError, ApiErrorKind, Authenticator, Customer, Employee, LoginResponse, Task, TaskAuthority,
    TaskCreate, TaskId, TaskUpdate, Workorder, WorkorderCreate, WorkorderPatch, WorkorderStatus,
    WorkshopDirectory,
};

use super::response::{from_reqwest, parse_json_response};
use crate::credentials::CredentialStore;

/// reqwest client for the workshop REST API.
#[derive(Clone)]
pub struct WorkshopHttpClient {
    http: reqwest::Client,
    credentials: Arc<CredentialStore>,
    url_tasks: String,
    url_workorders: String,
    url_customers: String,
    url_employees: String,
    url_login: String,
}

impl WorkshopHttpClient {
    pub fn new(
        base_url: &str,
        credentials: Arc<CredentialStore>,
        timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/');
        Ok(Self {
            http,
            credentials,
            url_tasks: format!("{}/tasks", normalized),
            url_workorders: format!("{}/workorders", normalized),
            url_customers: format!("{}/customers", normalized),
            url_employees: format!("{}/employees", normalized),
            url_login: format!("{}/auth/login", normalized),
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn bearer(&self, url: &str) -> Result<String, ApiError> {
        self.credentials
            .token()
            .ok_or_else(|| ApiError::missing_credential(url))
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, ApiError> {
        req.send().await.map_err(|err| from_reqwest(err, url))
    }

    /// Decodes an authenticated response. A 401 drops the stored token.
    async fn finish<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, ApiError> {
        if resp.status() == StatusCode::UNAUTHORIZED {
            let url = resp.url().to_string();
            tracing::error!(
                target: "workshop.http",
                stage = "http.unauthorized",
                url = %url,
                "token rejected, clearing stored credential"
            );
            if let Err(err) = self.credentials.clear() {
                tracing::warn!(target: "workshop.http", error = %err, "failed to clear credential");
            }
            return Err(ApiError::unauthorized(url));
        }
        parse_json_response(resp).await
    }

    /// GET a list. No credential means no data, not an error.
    async fn get_list<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let Some(token) = self.credentials.token() else {
            tracing::debug!(
                target: "workshop.http",
                stage = "http.list.skip",
                url = %url,
                "no credential, returning empty list"
            );
            return Ok(Vec::new());
        };
        tracing::debug!(target: "workshop.http", stage = "http.list.in", url = %url);
        let req = self.http.get(url).query(query).bearer_auth(token);
        let resp = self.send(req, url).await?;
        let status = resp.status();
        let items: Vec<T> = self.finish(resp).await?;
        tracing::debug!(
            target: "workshop.http",
            stage = "http.list.out",
            status = %status,
            count = items.len()
        );
        Ok(items)
    }
}

#[async_trait]
impl TaskAuthority for WorkshopHttpClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get_list(&self.url_tasks, &[]).await
    }

    async fn create_task(&self, payload: TaskCreate) -> Result<Task, ApiError> {
        let url = &self.url_tasks;
        let token = self.bearer(url)?;
        tracing::debug!(
            target: "workshop.http",
            stage = "http.task.create.in",
            url = %url,
            workorder_id = %payload.workorder_id
        );
        let req = self.http.post(url).json(&payload).bearer_auth(token);
        let resp = self.send(req, url).await?;
        self.finish(resp).await
    }

    async fn update_task(&self, id: TaskId, payload: TaskUpdate) -> Result<Task, ApiError> {
        let url = format!("{}/{}", self.url_tasks, id);
        let token = self.bearer(&url)?;
        tracing::debug!(
            target: "workshop.http",
            stage = "http.task.update.in",
            url = %url,
            status = %payload.status
        );
        let req = self.http.patch(&url).json(&payload).bearer_auth(token);
        let resp = self.send(req, &url).await?;
        let status = resp.status();
        let task: Task = self.finish(resp).await?;
        tracing::debug!(
            target: "workshop.http",
            stage = "http.task.update.out",
            status = %status,
            task_status = %task.status
        );
        Ok(task)
    }
}

#[async_trait]
impl WorkshopDirectory for WorkshopHttpClient {
    async fn list_workorders(
        &self,
        status: Option<WorkorderStatus>,
    ) -> Result<Vec<Workorder>, ApiError> {
        match status {
            Some(s) => {
                self.get_list(&self.url_workorders, &[("status", s.as_str())])
                    .await
            }
            None => self.get_list(&self.url_workorders, &[]).await,
        }
    }

    async fn create_workorder(&self, payload: WorkorderCreate) -> Result<Workorder, ApiError> {
        let url = &self.url_workorders;
        let token = self.bearer(url)?;
        tracing::debug!(
            target: "workshop.http",
            stage = "http.workorder.create.in",
            url = %url,
            customer_id = payload.customer_id
        );
        let req = self.http.post(url).json(&payload).bearer_auth(token);
        let resp = self.send(req, url).await?;
        self.finish(resp).await
    }

    async fn update_workorder(
        &self,
        id: &str,
        patch: WorkorderPatch,
    ) -> Result<Workorder, ApiError> {
        let url = format!("{}/{}", self.url_workorders, id);
        let token = self.bearer(&url)?;
        tracing::debug!(target: "workshop.http", stage = "http.workorder.update.in", url = %url);
        let req = self.http.patch(&url).json(&patch).bearer_auth(token);
        let resp = self.send(req, &url).await?;
        self.finish(resp).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get_list(&self.url_customers, &[]).await
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get_list(&self.url_employees, &[]).await
    }
}

#[async_trait]
impl Authenticator for WorkshopHttpClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = &self.url_login;
        tracing::debug!(target: "workshop.http", stage = "http.login.in", url = %url);
        let req = self
            .http
            .post(url)
            .form(&[("username", username), ("password", password)]);
        let resp = self.send(req, url).await?;
        let login: LoginResponse = parse_json_response(resp).await?;
        self.credentials
            .save(&login.access_token)
            .map_err(|err| ApiError::new(ApiErrorKind::Unknown, err.to_string()))?;
        tracing::info!(target: "workshop.http", stage = "http.login.out", "logged in");
        Ok(login)
    }

    fn logout(&self) -> anyhow::Result<()> {
        self.credentials.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use workshop_core::api::TaskStatus;

    fn client(server: &Server, token: Option<&str>) -> WorkshopHttpClient {
        let creds = Arc::new(CredentialStore::in_memory(token.map(str::to_string)));
        WorkshopHttpClient::new(&server.url(), creds, 1_000).unwrap()
    }

    const TASK_JSON: &str = r#"{"id":1,"workorder_id":"2025-014","name":"Inspectie remsysteem","assigned_id":1,"status":"Bezig","time":"30 min"}"#;

    #[tokio::test]
    async fn test_list_tasks_sends_bearer() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/tasks")
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", TASK_JSON))
            .create_async()
            .await;

        let tasks = client(&server, Some("secret-token")).list_tasks().await.unwrap();
        m.assert_async().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_list_without_credential_makes_no_request() {
        let mut server = Server::new_async().await;
        let m = server.mock("GET", "/tasks").expect(0).create_async().await;

        let tasks = client(&server, None).list_tasks().await.unwrap();
        assert!(tasks.is_empty());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_task_patches_full_body() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/tasks/1")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(serde_json::json!({
                "workorder_id": "2025-014",
                "name": "Inspectie remsysteem",
                "assigned_id": 1,
                "status": "Bezig"
            })))
            .with_status(200)
            .with_body(TASK_JSON)
            .create_async()
            .await;

        let payload = TaskUpdate {
            workorder_id: "2025-014".into(),
            name: "Inspectie remsysteem".into(),
            assigned_id: 1,
            status: TaskStatus::InProgress,
        };
        let task = client(&server, Some("tok"))
            .update_task(1, payload)
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(task.time.as_deref(), Some("30 min"));
    }

    #[tokio::test]
    async fn test_update_task_without_credential() {
        let server = Server::new_async().await;
        let payload = TaskUpdate {
            workorder_id: "a".into(),
            name: "b".into(),
            assigned_id: 1,
            status: TaskStatus::Done,
        };
        let err = client(&server, None).update_task(1, payload).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::MissingCredential);
    }

    #[tokio::test]
    async fn test_status_error_carries_detail() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("PATCH", "/tasks/7")
            .with_status(404)
            .with_body(r#"{"detail":"Task not found"}"#)
            .create_async()
            .await;

        let payload = TaskUpdate {
            workorder_id: "a".into(),
            name: "b".into(),
            assigned_id: 1,
            status: TaskStatus::Done,
        };
        let err = client(&server, Some("tok"))
            .update_task(7, payload)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Status);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.detail(), Some("Task not found"));
        assert!(err.url().unwrap_or_default().contains("/tasks/7"));
        assert_eq!(err.user_message(), "API error (404): Task not found");
    }

    #[tokio::test]
    async fn test_status_error_without_detail_uses_reason() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/tasks")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = client(&server, Some("tok"))
            .create_task(TaskCreate::new("2025-014", "x", 1))
            .await
            .unwrap_err();
        assert_eq!(err.detail(), None);
        assert_eq!(err.user_message(), "API error (502): Bad Gateway");
    }

    #[tokio::test]
    async fn test_unauthorized_clears_credential() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/workorders")
            .with_status(401)
            .create_async()
            .await;

        let c = client(&server, Some("expired"));
        let err = c.list_workorders(None).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Unauthorized);
        assert!(c.credentials().token().is_none());
    }

    #[tokio::test]
    async fn test_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/employees")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server, Some("tok")).list_employees().await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Decode);
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn test_list_workorders_status_filter() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/workorders")
            .match_query(Matcher::UrlEncoded("status".into(), "In behandeling".into()))
            .with_status(200)
            .with_body(
                r#"[{"id":"2025-014","vehicle":"Volkswagen Golf 2018","customer":"Jan de Vries","status":"In behandeling"}]"#,
            )
            .create_async()
            .await;

        let orders = client(&server, Some("tok"))
            .list_workorders(Some(WorkorderStatus::InProgress))
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(orders[0].customer, "Jan de Vries");
    }

    #[tokio::test]
    async fn test_update_workorder_sends_sparse_patch() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/workorders/2025-014")
            .match_body(Matcher::Json(serde_json::json!({"status": "Afgerond"})))
            .with_status(200)
            .with_body(r#"{"id":"2025-014","vehicle":"Golf","status":"Afgerond"}"#)
            .create_async()
            .await;

        let wo = client(&server, Some("tok"))
            .update_workorder("2025-014", WorkorderPatch::status(WorkorderStatus::Done))
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(wo.status, WorkorderStatus::Done);
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/login")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "balie".into()),
                Matcher::UrlEncoded("password".into(), "geheim".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"fresh","token_type":"bearer"}"#)
            .create_async()
            .await;

        let c = client(&server, None);
        let login = c.login("balie", "geheim").await.unwrap();
        m.assert_async().await;
        assert_eq!(login.access_token, "fresh");
        assert_eq!(c.credentials().token().as_deref(), Some("fresh"));

        c.logout().unwrap();
        assert!(c.credentials().token().is_none());
    }

    #[tokio::test]
    async fn test_login_rejected_is_not_session_expiry() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"detail":"Incorrect username or password"}"#)
            .create_async()
            .await;

        let err = client(&server, None).login("x", "y").await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Status);
        assert_eq!(err.detail(), Some("Incorrect username or password"));
    }

    #[tokio::test]
    async fn test_connect_error_is_transport() {
        let creds = Arc::new(CredentialStore::in_memory(Some("tok".into())));
        let c = WorkshopHttpClient::new("http://127.0.0.1:1", creds, 1_000).unwrap();
        let err = c.list_customers().await.unwrap_err();
        assert!(err.kind().is_transport());
        assert_eq!(
            err.user_message(),
            "Network or server error. Check the connection."
        );
    }
}
