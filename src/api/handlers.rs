use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::ApiError;
use super::AppState;
use crate::hashing::{fingerprint, CertificateFields};
use crate::ledger::CertificateRecord;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashResponse {
    pub cert_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub cert_id: String,
    pub cert_hash: String,
    pub issuer: String,
    /// Unix seconds as a decimal string
    pub timestamp: String,
}

impl From<&CertificateRecord> for CertificateResponse {
    fn from(record: &CertificateRecord) -> Self {
        Self {
            cert_id: record.identifier.clone(),
            cert_hash: record.fingerprint.to_string(),
            issuer: record.issuer.to_string(),
            timestamp: record.issued_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheckResponse {
    #[serde(flatten)]
    pub certificate: CertificateResponse,
    pub computed_hash: String,
    pub valid: bool,
}

/// POST /hash: stateless fingerprint service, never touches the ledger
pub async fn hash_certificate(Json(fields): Json<CertificateFields>) -> Json<HashResponse> {
    let cert_hash = fingerprint(&fields.name, &fields.course, &fields.date);
    debug!("Computed certificate hash {}", cert_hash);
    Json(HashResponse {
        cert_hash: cert_hash.to_string(),
    })
}

/// GET /verify/:cert_id: return the anchored record for the identifier
pub async fn get_certificate(
    State(state): State<AppState>,
    Path(cert_id): Path<String>,
) -> Result<Json<CertificateResponse>, ApiError> {
    let outcome = state.verifier.verify(&cert_id, None).await?;
    let record = outcome
        .record()
        .ok_or_else(|| ApiError::NotFound(cert_id.clone()))?;

    info!("Served certificate {}", cert_id);
    Ok(Json(CertificateResponse::from(record)))
}

/// POST /verify/:cert_id: recompute the hash from supplied fields and
/// compare it with the anchored one
pub async fn check_certificate(
    State(state): State<AppState>,
    Path(cert_id): Path<String>,
    Json(fields): Json<CertificateFields>,
) -> Result<Json<FieldCheckResponse>, ApiError> {
    let outcome = state.verifier.verify(&cert_id, Some(&fields)).await?;
    let valid = outcome.is_valid();

    let record = outcome
        .record()
        .ok_or_else(|| ApiError::NotFound(cert_id.clone()))?;

    Ok(Json(FieldCheckResponse {
        certificate: CertificateResponse::from(record),
        computed_hash: fields.fingerprint().to_string(),
        valid,
    }))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "certificate-ledger",
        "timestamp": chrono::Utc::now()
    }))
}
