#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bookshelf_app::Application;
use bookshelf_db::Database;
use bookshelf_inference::{InferenceError, TextGenerator};
use bookshelf_kernel::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Text generator that records prompts and returns a canned reply.
pub struct StubGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(InferenceError::Status {
                status: 503,
                body: "model unavailable".to_string(),
            }),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` part of the Set-Cookie header.
    pub fn cookie(&self) -> String {
        let raw = self
            .headers
            .get(header::SET_COOKIE)
            .expect("response sets a cookie")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub generator: Arc<StubGenerator>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_generator(StubGenerator::replying("Read Dune next.")).await
    }

    pub async fn with_generator(generator: Arc<StubGenerator>) -> Self {
        let mut settings = Settings::default();
        settings.auth.password_cost = 4;

        let db = Database::connect_in_memory().await.unwrap();
        let app = Application::build_with(settings, db.clone(), generator.clone())
            .await
            .unwrap();

        Self {
            router: app.router(),
            db,
            generator,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request(Method::GET, uri, None, Some(cookie)).await
    }

    pub async fn post(&self, uri: &str, body: Value, cookie: &str) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(cookie)).await
    }

    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/register",
            Some(json!({
                "username": username,
                "password": password,
                "email": format!("{username}@example.com"),
                "full_name": "Test Reader"
            })),
            None,
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/login",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    /// Register `username` and return its session cookie.
    pub async fn signed_in(&self, username: &str) -> String {
        assert_eq!(self.register(username, "pw-123456").await.status, StatusCode::OK);
        let login = self.login(username, "pw-123456").await;
        assert_eq!(login.status, StatusCode::OK);
        login.cookie()
    }

    pub async fn create_book(&self, cookie: &str, title: &str, author: &str, genre: &str) -> i64 {
        let response = self
            .post(
                "/books",
                json!({ "title": title, "author": author, "genre": genre }),
                cookie,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"].as_i64().unwrap()
    }

    pub async fn review(&self, cookie: &str, book_id: i64, rating: i64) -> TestResponse {
        self.post(
            &format!("/books/{book_id}/reviews"),
            json!({ "review_text": format!("{rating} stars"), "rating": rating }),
            cookie,
        )
        .await
    }
}
