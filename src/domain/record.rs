use crate::domain::status::RecordStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(rename = "user_id")]
    pub owner_id: i64,
    #[serde(rename = "email")]
    pub owner_email: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRecordRequest {
    #[serde(rename = "user_id")]
    pub owner_id: i64,
    #[serde(rename = "email")]
    pub owner_email: String,
    pub amount: Decimal,
    pub currency: String,
}

/// Row handed to the store at creation. The status is decided by the
/// creation service, never by the caller.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub owner_id: i64,
    pub owner_email: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateStatusRequest {
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusView {
    pub status: RecordStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}
