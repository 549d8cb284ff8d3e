use serde::{Deserialize, Serialize};

/// Canonical player record returned to callers, whichever upstream produced it.
/// Every field is populated once a record exists; `img_url` is serialized as `null` when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub uid: String,
    pub nickname: String,
    pub level: u32,
    pub rank: String,
    pub region: String,
    pub clan: String,
    pub kills: u64,
    pub matches: u64,
    pub img_url: Option<String>,
    pub last_seen: String,
}

/// Result of one lookup request.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Success { record: PlayerRecord, source: String },
    NotFound,
    ValidationError(String),
    InternalError(String),
}

/// Body of a successful `GET /api/player/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub success: bool,
    pub data: PlayerRecord,
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub version: String,
}

/// Reachability of one endpoint as seen by a HEAD probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub endpoint: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectivityResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<EndpointStatus>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend: Option<String>,
    pub endpoints: ApiRoutes,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiRoutes {
    pub health: String,
    pub player: String,
    pub connectivity: String,
}
