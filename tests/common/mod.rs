use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

use chemviz::gateway::HttpGateway;
use chemviz::{App, Config};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn temp_csv(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join("pumps.csv");
    fs::write(&path, contents).expect("failed to write csv file");
    (temp_dir, path)
}

/// Base URL of the mock server's `/api/` root
#[allow(dead_code)]
pub fn api_base(server: &MockServer) -> String {
    format!("{}/api/", server.uri())
}

#[allow(dead_code)]
pub fn http_gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(&api_base(server), Duration::from_secs(5)).expect("valid gateway")
}

#[allow(dead_code)]
pub fn http_app(server: &MockServer) -> App {
    let mut config = Config::default();
    config.api.base_url = api_base(server);
    App::new(Arc::new(http_gateway(server)), &config)
}

#[allow(dead_code)]
pub fn summary_json(id: u64) -> Value {
    json!({
        "id": id,
        "filename": format!("set_{}.csv", id),
        "uploaded_at": "2026-03-01T12:00:00Z",
        "total_rows": 10
    })
}

#[allow(dead_code)]
pub fn detail_json(id: u64) -> Value {
    json!({
        "id": id,
        "filename": format!("set_{}.csv", id),
        "summary": {
            "total_count": 2,
            "avg_flowrate": 120.5,
            "avg_pressure": 5.25,
            "avg_temperature": 110.0,
            "equipment_types": {"Pump": 1, "Valve": 1}
        },
        "equipment": [
            {"id": 1, "equipment_name": "Pump-1", "equipment_type": "Pump",
             "flowrate": 120.5, "pressure": 5.2, "temperature": 110.0},
            {"id": 2, "equipment_name": "Valve-1", "equipment_type": "Valve",
             "flowrate": 120.5, "pressure": 5.3, "temperature": 110.0}
        ]
    })
}
