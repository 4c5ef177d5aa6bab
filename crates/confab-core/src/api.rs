//! HTTP client for the chat server.
//!
//! Every mutation posts form-encoded fields, matching the server's form
//! handlers. The server tracks the active session in a cookie, so the
//! client keeps a cookie store for the life of the process.
//!
//! Endpoints that answer with a rebuilt page (`switch_session`,
//! `new_session`, `continue_from_history`) are fire-and-refetch: callers
//! follow up with [`ApiClient::fetch_page`] for the canonical document.

use anyhow::{Context, Result};
use url::Url;

use crate::config::Config;
use crate::wire::{LogEntry, LogsReply, PageState, SaveReply, SendReply, StatusReply};

/// Client for the chat server endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client from config (server URL and request timeout).
    pub fn from_config(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.server_url)
            .with_context(|| format!("Invalid server URL: {}", config.server_url))?;

        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { http, base })
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {path}"))
    }

    /// GET `/` as JSON: the canonical page document.
    pub async fn fetch_page(&self) -> Result<PageState> {
        tracing::debug!(url = %self.base, "fetching page state");
        let response = self
            .http
            .get(self.base.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to request page state")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Page state request failed (HTTP {status})");
        }

        response
            .json()
            .await
            .context("Failed to parse page state")
    }

    /// POST `/switch_session`.
    pub async fn switch_session(&self, session_id: &str) -> Result<()> {
        self.post_navigation("switch_session", &[("session_id", session_id)])
            .await
    }

    /// POST `/new_session` with a client-minted temporary id.
    pub async fn new_session(&self, temp_session_id: &str) -> Result<()> {
        self.post_navigation("new_session", &[("temp_session_id", temp_session_id)])
            .await
    }

    /// POST `/continue_from_history`. The server truncates history to the
    /// given index (inclusive) and rebuilds the page.
    pub async fn continue_from_history(&self, history_index: usize) -> Result<()> {
        let index = history_index.to_string();
        self.post_navigation("continue_from_history", &[("history_index", index.as_str())])
            .await
    }

    /// POST `/send_message`.
    ///
    /// Server-side failures arrive in the reply body (`response` carries the
    /// error text), so the status code is not checked here.
    pub async fn send_message(&self, message: &str) -> Result<SendReply> {
        let url = self.endpoint("send_message")?;
        let response = self
            .http
            .post(url)
            .form(&[("message", message)])
            .send()
            .await
            .context("Failed to post message")?;

        response
            .json()
            .await
            .context("Failed to parse message reply")
    }

    /// POST `/rename_session`.
    ///
    /// Refusals arrive as `success: false` bodies on non-2xx statuses, so
    /// the body is parsed unconditionally.
    pub async fn rename_session(&self, old_name: &str, new_name: &str) -> Result<StatusReply> {
        let url = self.endpoint("rename_session")?;
        let response = self
            .http
            .post(url)
            .form(&[("old_name", old_name), ("new_name", new_name)])
            .send()
            .await
            .context("Failed to post rename")?;

        response
            .json()
            .await
            .context("Failed to parse rename reply")
    }

    /// POST `/delete_session`.
    ///
    /// Refusals arrive as `success: false` bodies on non-2xx statuses, so
    /// the body is parsed unconditionally.
    pub async fn delete_session(&self, session_id: &str) -> Result<StatusReply> {
        let url = self.endpoint("delete_session")?;
        let response = self
            .http
            .post(url)
            .form(&[("session_id", session_id)])
            .send()
            .await
            .context("Failed to post delete")?;

        response
            .json()
            .await
            .context("Failed to parse delete reply")
    }

    /// POST `/save_session` (no fields; the server saves the active session).
    pub async fn save_session(&self) -> Result<SaveReply> {
        let url = self.endpoint("save_session")?;
        let response = self
            .http
            .post(url)
            .send()
            .await
            .context("Failed to post save")?;

        response.json().await.context("Failed to parse save reply")
    }

    /// GET `/get_recursion_logs`, accepting both reply shapes.
    pub async fn fetch_recursion_logs(&self) -> Result<Vec<LogEntry>> {
        let url = self.endpoint("get_recursion_logs")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to request recursion logs")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Recursion log request failed (HTTP {status})");
        }

        let reply: LogsReply = response
            .json()
            .await
            .context("Failed to parse recursion logs")?;
        Ok(reply.into_entries())
    }

    async fn post_navigation(&self, path: &str, fields: &[(&str, &str)]) -> Result<()> {
        tracing::debug!(path, "posting navigation request");
        let url = self.endpoint(path)?;
        let response = self
            .http
            .post(url)
            .form(fields)
            .send()
            .await
            .with_context(|| format!("Failed to post {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("{path} failed (HTTP {status})");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            server_url: server.uri(),
            ..Default::default()
        };
        ApiClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_parses_document() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sessions": ["a", "b"],
                "current_session": "a",
                "history": [["user", "hi"], ["assistant", "hello"]],
                "recursion_logs": [{"level": "call", "function": "invoke"}]
            })))
            .mount(&server)
            .await;

        let page = client_for(&server).fetch_page().await.unwrap();
        assert_eq!(page.sessions, vec!["a", "b"]);
        assert_eq!(page.history.len(), 2);
        assert_eq!(page.recursion_logs.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_posts_form_field() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .and(body_string_contains("message=hello"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": "**hi**"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).send_message("hello").await.unwrap();
        assert_eq!(reply.response, "**hi**");
    }

    #[tokio::test]
    async fn test_send_message_reads_body_on_server_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"response": "发生错误: boom"})),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).send_message("hello").await.unwrap();
        assert!(reply.response.starts_with("发生错误"));
    }

    #[tokio::test]
    async fn test_delete_refusal_parses_status_body() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/delete_session"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": "不能删除当前正在使用的会话"
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server).delete_session("current").await.unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message.as_deref(), Some("不能删除当前正在使用的会话"));
    }

    #[tokio::test]
    async fn test_navigation_post_fails_on_error_status() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/continue_from_history"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "操作失败"})))
            .mount(&server)
            .await;

        let result = client_for(&server).continue_from_history(3).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_logs_accepts_bare_array() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_recursion_logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"timestamp": "10:00:00.000", "level": "START", "function": "f"}
            ])))
            .mount(&server)
            .await;

        let entries = client_for(&server).fetch_recursion_logs().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].function, "f");
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let config = Config {
            server_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(ApiClient::from_config(&config).is_err());
    }
}
