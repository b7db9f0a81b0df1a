use super::*;
use crate::config::Config;
use crate::error::RpcError;
use crate::rpc::Value;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tower::ServiceExt;


/// In-process stand-in for the download daemon
///
/// Records every RPC call with its parameters and keeps just enough
/// mutable state (paused flag, queue ids, bandwidth cap) for the
/// mutation handlers to observe their own effects.
struct MockDaemon {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    paused: Mutex<bool>,
    queue_ids: Mutex<Vec<i64>>,
    maxrate: Mutex<i32>,
    fail: Mutex<bool>,
}

impl MockDaemon {
    fn new(queue_ids: Vec<i64>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            paused: Mutex::new(false),
            queue_ids: Mutex::new(queue_ids),
            maxrate: Mutex::new(0),
            fail: Mutex::new(false),
        })
    }

    fn set_paused(&self, paused: bool) {
        *self.paused.lock().unwrap() = paused;
    }

    fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// How many times `method` was invoked
    fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == method)
            .count()
    }

    /// The parameter lists of every invocation of `method`, in order
    fn calls_for(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn status_struct(&self) -> Value {
        let mut members = BTreeMap::new();
        members.insert(
            "is_paused".to_string(),
            Value::Bool(*self.paused.lock().unwrap()),
        );
        members.insert("rate".to_string(), Value::Double(42.5));
        members.insert(
            "maxrate".to_string(),
            Value::Int(*self.maxrate.lock().unwrap()),
        );
        members.insert("queued_mb".to_string(), Value::Int(700));
        members.insert("eta".to_string(), Value::Int(120));
        members.insert("percent_complete".to_string(), Value::Int(33));
        Value::Struct(members)
    }

    fn queue_array(&self) -> Value {
        let items = self
            .queue_ids
            .lock()
            .unwrap()
            .iter()
            .map(|id| {
                let mut members = BTreeMap::new();
                members.insert("id".to_string(), Value::Int(*id as i32));
                members.insert("nzbName".to_string(), Value::String(format!("nzb-{id}")));
                members.insert("is_par_recovery".to_string(), Value::Bool(false));
                members.insert("total_mb".to_string(), Value::Int(350));
                Value::Struct(members)
            })
            .collect();
        Value::Array(items)
    }
}

#[async_trait::async_trait]
impl HellanzbRpc for MockDaemon {
    async fn call(&self, method: &str, params: Vec<Value>) -> crate::error::Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        if *self.fail.lock().unwrap() {
            return Err(RpcError::Connection("connection refused".to_string()).into());
        }

        match method {
            "status" => Ok(self.status_struct()),
            "list" => Ok(self.queue_array()),
            "pause" => {
                self.set_paused(true);
                Ok(Value::Bool(true))
            }
            "continue" => {
                self.set_paused(false);
                Ok(Value::Bool(true))
            }
            "maxrate" => {
                if let Some(Value::Int(kbps)) = params.first() {
                    *self.maxrate.lock().unwrap() = *kbps;
                }
                Ok(Value::Bool(true))
            }
            "dequeue" => {
                if let Some(Value::String(id)) = params.first() {
                    let id: i64 = id.parse().unwrap_or(-1);
                    self.queue_ids.lock().unwrap().retain(|q| *q != id);
                }
                Ok(Value::Bool(true))
            }
            "move" | "enqueuenewzbin" => Ok(Value::Bool(true)),
            "asciiart" => Ok(Value::String("hellanzb".to_string())),
            other => Err(RpcError::Fault {
                code: 8001,
                message: format!("no such method: {other}"),
            }
            .into()),
        }
    }
}

/// Build a router and its mock daemon with the given queue and cache TTL
fn test_router(queue_ids: Vec<i64>, ttl_secs: u64) -> (Arc<MockDaemon>, Router) {
    let daemon = MockDaemon::new(queue_ids);

    let mut config = Config::default();
    config.cache.ttl_secs = ttl_secs;
    config.server.cors_enabled = false;
    config.server.swagger_ui = false;
    let config = Arc::new(config);

    let state = AppState::new(daemon.clone() as Arc<dyn HellanzbRpc>, config);
    let router = create_router(state);
    (daemon, router)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

/// Extract the `name=value` session cookie pair from a response
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookie| cookie.split(';').next())
        .map(str::to_string)
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in with the default credentials and return the session cookie
async fn login(router: &Router) -> String {
    let response = send(
        router,
        post_json(
            "/login/login",
            None,
            json!({ "name": "joe", "password": "honker" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response).expect("login should set a session cookie")
}

#[tokio::test]
async fn test_health_endpoint_is_public() {
    let (_daemon, router) = test_router(vec![], 4);

    let response = send(&router, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_every_response_carries_a_session_cookie() {
    let (_daemon, router) = test_router(vec![], 4);

    let response = send(&router, get("/health", None)).await;
    let cookie = session_cookie(&response).expect("fresh request should set a cookie");
    assert!(cookie.starts_with("hellahella_session="));

    // Replaying the cookie must not mint a second session
    let response = send(&router, get("/health", Some(&cookie))).await;
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_cors_headers_when_enabled() {
    let daemon = MockDaemon::new(vec![]);
    let mut config = Config::default();
    config.server.cors_enabled = true;
    config.server.cors_origins = vec!["*".to_string()];
    let state = AppState::new(daemon as Arc<dyn HellanzbRpc>, Arc::new(config));
    let router = create_router(state);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let (_daemon, router) = test_router(vec![], 4);

    let response = send(&router, get("/openapi.json", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["paths"]["/hellanzb/update_order"].is_object());
}
