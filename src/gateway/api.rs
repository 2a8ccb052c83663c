//! Typed calls for each endpoint of the visualizer API
//!
//! These are thin: build the [`ApiRequest`], send it through any
//! [`Gateway`], decode the response.

use bytes::Bytes;
use serde_json::json;

use crate::error::GatewayResult;
use crate::gateway::{ApiRequest, Gateway, ResponseKind};
use crate::models::{AuthResponse, AuthStatus, DatasetDetail, DatasetSummary};

pub const AUTH_STATUS: &str = "auth/status/";
pub const AUTH_LOGIN: &str = "auth/login/";
pub const AUTH_REGISTER: &str = "auth/register/";
pub const AUTH_LOGOUT: &str = "auth/logout/";
pub const DATASETS: &str = "datasets/";
pub const DATASET_UPLOAD: &str = "datasets/upload/";

/// Multipart field carrying the uploaded CSV
pub const UPLOAD_FIELD: &str = "file";

/// Path of one dataset's detail
pub fn dataset_path(id: u64) -> String {
    format!("datasets/{}/", id)
}

/// Path of one dataset's PDF report
pub fn report_path(id: u64) -> String {
    format!("datasets/{}/generate_pdf/", id)
}

pub async fn auth_status(gateway: &dyn Gateway) -> GatewayResult<AuthStatus> {
    gateway.send(ApiRequest::get(AUTH_STATUS)).await?.into_json()
}

pub async fn login(
    gateway: &dyn Gateway,
    username: &str,
    password: &str,
) -> GatewayResult<AuthResponse> {
    let request = ApiRequest::post(AUTH_LOGIN).json(json!({
        "username": username,
        "password": password,
    }));
    gateway.send(request).await?.into_json()
}

pub async fn register(
    gateway: &dyn Gateway,
    username: &str,
    email: &str,
    password: &str,
) -> GatewayResult<AuthResponse> {
    let request = ApiRequest::post(AUTH_REGISTER).json(json!({
        "username": username,
        "email": email,
        "password": password,
    }));
    gateway.send(request).await?.into_json()
}

pub async fn logout(gateway: &dyn Gateway) -> GatewayResult<()> {
    gateway
        .send(ApiRequest::post(AUTH_LOGOUT).expect(ResponseKind::Empty))
        .await
        .map(|_| ())
}

pub async fn list_datasets(gateway: &dyn Gateway) -> GatewayResult<Vec<DatasetSummary>> {
    gateway.send(ApiRequest::get(DATASETS)).await?.into_json()
}

pub async fn upload_dataset(
    gateway: &dyn Gateway,
    file_name: &str,
    bytes: Bytes,
) -> GatewayResult<DatasetDetail> {
    let request = ApiRequest::post(DATASET_UPLOAD).multipart(UPLOAD_FIELD, file_name, bytes);
    gateway.send(request).await?.into_json()
}

pub async fn get_dataset(gateway: &dyn Gateway, id: u64) -> GatewayResult<DatasetDetail> {
    gateway.send(ApiRequest::get(dataset_path(id))).await?.into_json()
}

pub async fn generate_report(gateway: &dyn Gateway, id: u64) -> GatewayResult<Bytes> {
    gateway
        .send(ApiRequest::get(report_path(id)).expect(ResponseKind::Binary))
        .await?
        .into_bytes()
}
