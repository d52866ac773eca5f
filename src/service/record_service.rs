use crate::domain::entity::Entity;
use crate::domain::error::ServiceError;
use crate::domain::page::PageRequest;
use crate::domain::record::{CreateRecordRequest, NewRecord, Record};
use crate::domain::status::RecordStatus;
use crate::repo::{RecordStore, StoreError, UnitOfWork};
use crate::service::draw::DrawSource;
use rust_decimal::Decimal;
use std::sync::Arc;

pub const DEFAULT_ERROR_CHANCE: f64 = 0.1;

/// Lifecycle operations for one entity, generic over where records live.
#[derive(Clone)]
pub struct RecordService<S: RecordStore> {
    pub store: S,
    pub draw: Arc<dyn DrawSource>,
    pub error_chance: f64,
}

enum Transition {
    Update(RecordStatus),
    Discard,
}

impl Transition {
    fn requested(&self) -> RecordStatus {
        match self {
            Transition::Update(status) => *status,
            Transition::Discard => RecordStatus::Canceled,
        }
    }
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(store: S, draw: Arc<dyn DrawSource>, error_chance: f64) -> Self {
        Self {
            store,
            draw,
            error_chance,
        }
    }

    fn name() -> &'static str {
        <S::Entity as Entity>::NAME
    }

    pub fn initial_status(&self) -> RecordStatus {
        let r = self.draw.draw();
        if 1.0 - r <= self.error_chance {
            RecordStatus::Error
        } else {
            RecordStatus::New
        }
    }

    pub async fn create(&self, req: CreateRecordRequest) -> Result<Record, ServiceError> {
        validate_create(&req)?;
        let name = Self::name();

        let status = self.initial_status();
        let new_record = NewRecord {
            owner_id: req.owner_id,
            owner_email: req.owner_email,
            amount: req.amount,
            currency: req.currency,
            status,
        };

        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|e| self.infra(e, "can't start transaction"))?;
        let record = uow
            .insert(new_record)
            .await
            .map_err(|e| self.infra(e, &format!("can't create {name} record")))?;
        uow.commit()
            .await
            .map_err(|e| self.infra(e, &format!("can't commit {name}")))?;

        tracing::info!(
            "{} {} created for user {} with status {}",
            name,
            record.id,
            record.owner_id,
            record.status
        );
        Ok(record)
    }

    pub async fn get_status(&self, id: i64) -> Result<RecordStatus, ServiceError> {
        let name = Self::name();
        self.store
            .get_status(id)
            .await
            .map_err(|e| self.infra(e, &format!("can't get {name}")))?
            .ok_or_else(|| not_found(name, id))
    }

    pub async fn update_status(&self, id: i64, requested: RecordStatus) -> Result<(), ServiceError> {
        self.transition(id, Transition::Update(requested)).await
    }

    pub async fn cancel(&self, id: i64) -> Result<(), ServiceError> {
        self.transition(id, Transition::Discard).await
    }

    async fn transition(&self, id: i64, transition: Transition) -> Result<(), ServiceError> {
        let name = Self::name();
        let requested = transition.requested();
        let failure_details = match transition {
            Transition::Update(_) => format!("can't update {name}"),
            Transition::Discard => format!("can't delete {name}"),
        };

        // Any early return drops `uow`, which rolls it back.
        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|e| self.infra(e, "can't start transaction"))?;

        let current = uow
            .get_status(id)
            .await
            .map_err(|e| self.infra(e, &failure_details))?
            .ok_or_else(|| not_found(name, id))?;

        if !current.can_transition_to(requested) {
            return Err(self.rejected(id, current, &transition));
        }

        let rows = match transition {
            Transition::Update(status) => uow.conditional_update_status(id, current, status).await,
            Transition::Discard => uow.conditional_discard(id).await,
        }
        .map_err(|e| self.infra(e, &failure_details))?;

        if rows == 0 {
            // Lost a race: report what the winner left behind.
            let latest = uow.get_status(id).await.ok().flatten().unwrap_or(current);
            return Err(self.rejected(id, latest, &transition));
        }

        let commit_details = match transition {
            Transition::Update(_) => format!("can't commit {name}"),
            Transition::Discard => "can't commit transaction".to_string(),
        };
        uow.commit()
            .await
            .map_err(|e| self.infra(e, &commit_details))?;

        tracing::info!("{} {} moved from {} to {}", name, id, current, requested);
        Ok(())
    }

    pub async fn list_by_owner_id(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Record>, ServiceError> {
        let name = Self::name();
        validate_page(page)?;
        let records = self
            .store
            .list_by_owner_id(owner_id, page)
            .await
            .map_err(|e| self.infra(e, &format!("can't find {name}")))?;

        if records.is_empty() {
            return Err(ServiceError::EmptyPage {
                error: format!("no {name}s was found for {owner_id} user id"),
                details: format!("no {name}s found"),
            });
        }
        Ok(records)
    }

    pub async fn list_by_owner_email(
        &self,
        email: &str,
        page: PageRequest,
    ) -> Result<Vec<Record>, ServiceError> {
        let name = Self::name();
        if email.trim().is_empty() {
            return Err(ServiceError::validation("no email provided", "invalid email"));
        }
        validate_page(page)?;
        let records = self
            .store
            .list_by_owner_email(email, page)
            .await
            .map_err(|e| self.infra(e, &format!("can't find {name}")))?;

        if records.is_empty() {
            return Err(ServiceError::EmptyPage {
                error: format!("no {name}s was found for {email} email"),
                details: format!("no {name}s found"),
            });
        }
        Ok(records)
    }

    fn rejected(&self, id: i64, current: RecordStatus, transition: &Transition) -> ServiceError {
        let name = Self::name();
        let requested = transition.requested();
        tracing::warn!(
            "rejected {} {} transition from {} to {}",
            name,
            id,
            current,
            requested
        );

        let (error, details) = match transition {
            Transition::Update(_) => (
                format!("can't update from {current} status to {requested} status"),
                format!("can't update {name} status"),
            ),
            Transition::Discard => (
                format!("can't discard {name}, it has {current} status"),
                format!("can't discard {name}, it has terminal status"),
            ),
        };

        ServiceError::InvalidTransition {
            id,
            current,
            requested,
            error,
            details,
        }
    }

    fn infra(&self, source: StoreError, details: &str) -> ServiceError {
        tracing::error!("{} store failure: {}: {}", Self::name(), details, source);
        ServiceError::infrastructure(source, details)
    }
}

fn not_found(name: &str, id: i64) -> ServiceError {
    ServiceError::NotFound {
        id,
        error: format!("{name} {id} does not exist"),
        details: format!("{name} not found"),
    }
}

fn validate_create(req: &CreateRecordRequest) -> Result<(), ServiceError> {
    let email = req.owner_email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::validation(
            format!("invalid email {:?}", req.owner_email),
            "email must be a non-empty address",
        ));
    }
    if req.currency.len() != 3 || !req.currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ServiceError::validation(
            format!("invalid currency {:?}", req.currency),
            "currency must be a three-letter code",
        ));
    }
    if req.amount <= Decimal::ZERO {
        return Err(ServiceError::validation(
            format!("invalid amount {}", req.amount),
            "amount must be > 0",
        ));
    }
    Ok(())
}

fn validate_page(page: PageRequest) -> Result<(), ServiceError> {
    if page.limit < 1 {
        return Err(ServiceError::validation(
            format!("invalid limit {}", page.limit),
            "limit must be >= 1",
        ));
    }
    Ok(())
}
