#![allow(dead_code)]

use payment_service::domain::entity::{Entity, Payment, Transfer};
use payment_service::domain::record::CreateRecordRequest;
use payment_service::http::middleware::basic_auth::BasicCredentials;
use payment_service::repo::memory::MemoryRecordStore;
use payment_service::service::draw::{DrawSource, FixedDraw};
use payment_service::service::record_service::RecordService;
use payment_service::AppState;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

pub fn service<E: Entity>(error_chance: f64) -> RecordService<MemoryRecordStore<E>> {
    RecordService::new(MemoryRecordStore::new(), Arc::new(FixedDraw(0.5)), error_chance)
}

pub fn service_with_draw<E: Entity>(
    draw: Arc<dyn DrawSource>,
    error_chance: f64,
) -> RecordService<MemoryRecordStore<E>> {
    RecordService::new(MemoryRecordStore::new(), draw, error_chance)
}

pub fn request(owner_id: i64, email: &str, amount: Decimal, currency: &str) -> CreateRecordRequest {
    CreateRecordRequest {
        owner_id,
        owner_email: email.to_string(),
        amount,
        currency: currency.to_string(),
    }
}

pub type TestState = AppState<MemoryRecordStore<Payment>, MemoryRecordStore<Transfer>>;

pub fn app_state(error_chance: f64) -> TestState {
    AppState {
        payments: service::<Payment>(error_chance),
        transfers: service::<Transfer>(error_chance),
        update_credentials: BasicCredentials {
            user: "admin".to_string(),
            pass: "pass".to_string(),
        },
        request_timeout: Duration::from_secs(5),
    }
}
