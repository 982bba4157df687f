use std::time::Duration;

use api_types::{
    ErrorBody,
    balance::Transaction,
    expense::{Expense, ExpenseNew},
    group::{Group, GroupNew},
    user::{User, UserNew},
};
use divvy_engine::{ApiError, SplitApi};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the expense-tracker REST API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::BaseUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::BaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { base_url, http })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("invalid base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        let res = request
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return res
                .json::<T>()
                .await
                .map_err(|err| ApiError::Malformed(err.to_string()));
        }

        let url = res.url().clone();
        let message = res
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        tracing::warn!(
            "{url} answered {status}: {}",
            message.as_deref().unwrap_or("no error message")
        );

        let err = match status {
            StatusCode::NOT_FOUND => ApiError::NotFound { message },
            _ => ApiError::Rejected {
                status: status.as_u16(),
                message,
            },
        };
        Err(err)
    }
}

impl SplitApi for Client {
    async fn create_user(&self, body: &UserNew) -> std::result::Result<User, ApiError> {
        let endpoint = self.endpoint(&["user", "create"])?;
        self.send(self.http.post(endpoint).json(body)).await
    }

    async fn list_users(&self) -> std::result::Result<Vec<User>, ApiError> {
        let endpoint = self.endpoint(&["user"])?;
        self.send(self.http.get(endpoint)).await
    }

    async fn create_group(&self, body: &GroupNew) -> std::result::Result<Group, ApiError> {
        let endpoint = self.endpoint(&["groups"])?;
        self.send(self.http.post(endpoint).json(body)).await
    }

    async fn get_group(&self, group_id: &str) -> std::result::Result<Group, ApiError> {
        let endpoint = self.endpoint(&["groups", group_id])?;
        self.send(self.http.get(endpoint)).await
    }

    async fn list_groups(&self) -> std::result::Result<Vec<Group>, ApiError> {
        let endpoint = self.endpoint(&["groups"])?;
        self.send(self.http.get(endpoint)).await
    }

    async fn list_expenses(&self, group_id: &str) -> std::result::Result<Vec<Expense>, ApiError> {
        let endpoint = self.endpoint(&["expenses"])?;
        self.send(self.http.get(endpoint).query(&[("groupId", group_id)]))
            .await
    }

    async fn create_expense(&self, body: &ExpenseNew) -> std::result::Result<Expense, ApiError> {
        let endpoint = self.endpoint(&["expenses"])?;
        self.send(self.http.post(endpoint).json(body)).await
    }

    async fn get_balances(
        &self,
        group_id: &str,
        transitive: bool,
    ) -> std::result::Result<Vec<Transaction>, ApiError> {
        let endpoint = self.endpoint(&["groups", group_id, "balances"])?;
        self.send(self.http.get(endpoint).query(&[("transitive", transitive)]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;

    async fn get_group(Path(id): Path<String>) -> Response {
        if id == "g1" {
            Json(json!({
                "_id": "g1",
                "name": "Trip",
                "members": ["u1", {"_id": "u2", "name": "Bea"}],
            }))
            .into_response()
        } else {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Group not found"})),
            )
                .into_response()
        }
    }

    async fn list_expenses(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
        let group_id = query.get("groupId").cloned().unwrap_or_default();
        Json(json!([{
            "_id": "e1",
            "groupId": group_id,
            "payerId": {"_id": "u1", "name": "Ada"},
            "amount": 12.5,
            "splitAmong": ["u1", "u2"],
            "createdAt": "2024-05-01T10:00:00Z",
        }]))
    }

    async fn balances(
        Path(id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let to = if query.get("transitive").map(String::as_str) == Some("true") {
            "u3"
        } else {
            "u2"
        };
        Json(json!([{
            "from": "u1",
            "fromName": id,
            "to": to,
            "toName": "Someone",
            "amount": 5.0,
        }]))
    }

    async fn create_user(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({"_id": "u9", "name": body["name"]}))
    }

    async fn create_expense(Json(body): Json<Value>) -> Response {
        if body["splitAmong"].as_array().is_some_and(Vec::is_empty) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Split members are required"})),
            )
                .into_response();
        }
        (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    }

    async fn broken_users() -> &'static str {
        "not json"
    }

    async fn spawn_server() -> Client {
        let app = Router::new()
            .route("/api/user", get(broken_users))
            .route("/api/user/create", post(create_user))
            .route("/api/groups/{id}", get(get_group))
            .route("/api/groups/{id}/balances", get(balances))
            .route("/api/expenses", get(list_expenses).post(create_expense));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Client::new(&format!("http://{addr}/api")).unwrap()
    }

    #[test]
    fn endpoint_keeps_base_path_and_encodes_segments() {
        let client = Client::new("http://localhost:3000/api/").unwrap();
        let url = client.endpoint(&["groups", "a b", "balances"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/groups/a%20b/balances"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(Client::new("not a url").is_err());
        assert!(Client::new("mailto:someone@example.com").is_err());
    }

    #[tokio::test]
    async fn group_members_in_both_shapes() {
        let client = spawn_server().await;
        let group = client.get_group("g1").await.unwrap();
        assert_eq!(group.name, "Trip");
        assert_eq!(group.members[0].id(), "u1");
        assert_eq!(group.members[1].id(), "u2");
    }

    #[tokio::test]
    async fn not_found_carries_server_message() {
        let client = spawn_server().await;
        let err = client.get_group("missing").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::NotFound {
                message: Some("Group not found".to_string())
            }
        );
    }

    #[tokio::test]
    async fn expenses_are_filtered_by_group_query() {
        let client = spawn_server().await;
        let expenses = client.list_expenses("g1").await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].group_id.id(), "g1");
        assert_eq!(expenses[0].split_among.len(), 2);
    }

    #[tokio::test]
    async fn balances_pass_transitive_flag() {
        let client = spawn_server().await;
        let direct = client.get_balances("g1", false).await.unwrap();
        let simplified = client.get_balances("g1", true).await.unwrap();
        assert_eq!(direct[0].to, "u2");
        assert_eq!(simplified[0].to, "u3");
        assert_eq!(direct[0].from_name, "g1");
    }

    #[tokio::test]
    async fn create_user_posts_name() {
        let client = spawn_server().await;
        let user = client
            .create_user(&UserNew {
                name: "Dora".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, "u9");
        assert_eq!(user.name, "Dora");
    }

    #[tokio::test]
    async fn rejection_with_and_without_error_body() {
        let client = spawn_server().await;
        let mut body = ExpenseNew {
            group_id: "g1".to_string(),
            payer_id: "u1".to_string(),
            amount: 10.0,
            split_among: Vec::new(),
        };

        let err = client.create_expense(&body).await.unwrap_err();
        assert_eq!(err.user_message("Failed to create expense"), "Split members are required");

        body.split_among.push("u1".to_string());
        let err = client.create_expense(&body).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 500,
                message: None
            }
        );
        assert_eq!(
            err.user_message("Failed to create expense"),
            "Request failed with status code 500"
        );
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let client = spawn_server().await;
        let err = client.list_users().await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
        assert_eq!(err.user_message("Failed to fetch users"), "Failed to fetch users");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(&format!("http://{addr}/api")).unwrap();
        let err = client.list_groups().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
