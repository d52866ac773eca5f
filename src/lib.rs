pub mod config;
pub mod domain {
    pub mod entity;
    pub mod error;
    pub mod page;
    pub mod record;
    pub mod status;
}
pub mod http {
    pub mod error;
    pub mod router;
    pub mod handlers {
        pub mod ops;
        pub mod records;
    }
    pub mod middleware {
        pub mod basic_auth;
        pub mod cors;
        pub mod deadline;
        pub mod request_id;
    }
}
pub mod repo;
pub mod service {
    pub mod draw;
    pub mod record_service;
}

use http::middleware::basic_auth::BasicCredentials;
use repo::RecordStore;
use service::record_service::RecordService;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState<P: RecordStore, T: RecordStore> {
    pub payments: RecordService<P>,
    pub transfers: RecordService<T>,
    pub update_credentials: BasicCredentials,
    pub request_timeout: Duration,
}
