//! HTTP endpoints for status polling and configuration submission
//!
//! Four routes, all JSON:
//!   GET  /status           latest run snapshot
//!   GET  /logs?since=N     log entries after cursor N
//!   POST /config           validate and store operator configuration
//!   POST /test-connection  best-effort domain reachability check
//!
//! GET handlers only read the status board, so they stay responsive while a
//! run is executing.

use crate::core::config::Configuration;
use crate::core::settings::Settings;
use crate::error::ValidationError;
use crate::status::{LogLevel, StatusBoard};
use crate::validate;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// JSON body accepted by POST /config and POST /test-connection.
#[derive(Debug, Deserialize)]
struct ConfigSubmission {
    domain: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub struct ApiServer {
    board: Arc<StatusBoard>,
    settings: Arc<Settings>,
}

impl ApiServer {
    pub fn new(board: Arc<StatusBoard>, settings: Arc<Settings>) -> Self {
        Self { board, settings }
    }

    /// Bind `addr` and serve until the task is dropped.
    pub async fn serve(self: Arc<Self>, addr: SocketAddr) -> crate::error::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %addr, "Status API listening");
        self.serve_on(listener).await
    }

    /// Accept loop over an already-bound listener.
    pub async fn serve_on(self: Arc<Self>, listener: TcpListener) -> crate::error::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { server.handle(req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(peer = %peer, error = %err, "Connection error");
                }
            });
        }
    }

    async fn handle(
        &self,
        req: Request<Incoming>,
    ) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);
        let body = req.into_body().collect().await?.to_bytes();
        Ok(self.route(&method, &path, query.as_deref(), body).await)
    }

    async fn route(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        body: Bytes,
    ) -> Response<Full<Bytes>> {
        match (method, path) {
            (&Method::GET, "/status") => self.get_status().await,
            (&Method::GET, "/logs") => self.get_logs(query).await,
            (&Method::POST, "/config") => self.post_config(&body).await,
            (&Method::POST, "/test-connection") => self.post_test_connection(&body).await,
            (_, "/status") | (_, "/logs") | (_, "/config") | (_, "/test-connection") => {
                json_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    &json!({"error": "method not allowed"}),
                )
            }
            _ => json_response(StatusCode::NOT_FOUND, &json!({"error": "not found"})),
        }
    }

    async fn get_status(&self) -> Response<Full<Bytes>> {
        let run = self.board.status().await;
        json_response(
            StatusCode::OK,
            &json!({
                "runState": run.state,
                "steps": run.steps,
            }),
        )
    }

    async fn get_logs(&self, query: Option<&str>) -> Response<Full<Bytes>> {
        let since = query.and_then(parse_since);
        let (logs, next_cursor) = self.board.logs_since(since).await;
        json_response(
            StatusCode::OK,
            &json!({
                "logs": logs,
                "nextCursor": next_cursor,
            }),
        )
    }

    async fn post_config(&self, body: &Bytes) -> Response<Full<Bytes>> {
        let submitted: ConfigSubmission = match serde_json::from_slice(body) {
            Ok(parsed) => parsed,
            Err(err) => {
                return json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({
                        "success": false,
                        "errors": [ValidationError::new("body", &format!("invalid json: {}", err))],
                    }),
                )
            }
        };

        let domain = validate::domain(&submitted.domain);
        let username = validate::username(&submitted.username);
        let password = validate::password(&submitted.password, &self.settings.password_policy);

        match (domain, username, password) {
            (Ok(domain), Ok(username), Ok(password)) => {
                let email = format!("admin@{}", domain);
                let config = Configuration::assemble(domain, username, email, password);
                if let Err(err) = config.save(&self.settings.config_path()) {
                    error!(error = %err, "Failed to store configuration");
                    return json_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        &json!({
                            "success": false,
                            "errors": [ValidationError::new(
                                "storage",
                                "could not persist configuration",
                            )],
                        }),
                    );
                }
                self.board
                    .append_log(
                        LogLevel::Info,
                        None,
                        format!("configuration accepted for {}", config.domain),
                    )
                    .await;
                info!(domain = %config.domain, "Configuration accepted");
                json_response(StatusCode::OK, &json!({"success": true}))
            }
            (domain, username, password) => {
                let errors: Vec<ValidationError> = [domain.err(), username.err(), password.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({"success": false, "errors": errors}),
                )
            }
        }
    }

    async fn post_test_connection(&self, body: &Bytes) -> Response<Full<Bytes>> {
        let submitted: ConfigSubmission = match serde_json::from_slice(body) {
            Ok(parsed) => parsed,
            Err(err) => {
                return json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({"success": false, "error": format!("invalid json: {}", err)}),
                )
            }
        };

        // a malformed domain can never be reachable, skip the dial
        let domain = match validate::domain(&submitted.domain) {
            Ok(domain) => domain,
            Err(err) => {
                return json_response(
                    StatusCode::OK,
                    &json!({"success": false, "error": err.to_string()}),
                )
            }
        };

        match super::test_connection(&domain).await {
            Ok(()) => json_response(StatusCode::OK, &json!({"success": true})),
            Err(err) => json_response(
                StatusCode::OK,
                &json!({"success": false, "error": err.to_string()}),
            ),
        }
    }
}

fn parse_since(query: &str) -> Option<u64> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("since="))
        .and_then(|value| value.parse().ok())
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("{}"))))
}
