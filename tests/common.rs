#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use player_lookup_api::config::Config;
use player_lookup_api::prober::Prober;
use player_lookup_api::routes::{self, AppState};
use player_lookup_api::upstream::{Transport, TransportError, UpstreamResponse};

/// In-memory upstream: answers from a URL-keyed table and records every call.
#[derive(Default)]
pub struct FakeUpstream {
    responses: HashMap<String, (u16, String)>,
    calls: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, url: &str) -> Result<UpstreamResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some((status, body)) => Ok(UpstreamResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Err(TransportError::Connect("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl Transport for FakeUpstream {
    async fn get(
        &self,
        url: &str,
        _timeout: Duration,
    ) -> Result<UpstreamResponse, TransportError> {
        self.answer(url)
    }

    async fn head(
        &self,
        url: &str,
        _timeout: Duration,
    ) -> Result<UpstreamResponse, TransportError> {
        self.answer(url)
    }
}

pub fn endpoints(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("http://ep{i}.test/api/player")).collect()
}

pub fn test_config(n: usize) -> Config {
    Config {
        endpoints: endpoints(n),
        ..Config::default()
    }
}

pub fn app(config: Config, upstream: Arc<FakeUpstream>) -> axum::Router {
    let prober = Prober::new(&config, upstream);
    routes::router(AppState::new(config, prober))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(resp: Response<Body>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
