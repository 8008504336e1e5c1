use axum::Json;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: &'static str,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Location of the OpenAPI document.
    pub docs: &'static str,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Service",
    operation_id = "serviceInfo",
    summary = "Service banner",
    responses((status = 200, description = "Service name and version", body = ServiceInfo)),
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "shorts-server",
        version: env!("CARGO_PKG_VERSION"),
        docs: "/api-docs/openapi.json",
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Service",
    operation_id = "health",
    summary = "Liveness probe",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
