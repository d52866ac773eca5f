use crate::domain::entity::Entity;
use crate::domain::page::PageRequest;
use crate::domain::record::{NewRecord, Record};
use crate::domain::status::RecordStatus;
use crate::repo::{RecordStore, StoreError, UnitOfWork};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::marker::PhantomData;

const RECORD_COLUMNS: &str = "id, user_id, email, amount, currency, status, created_at, updated_at";

pub struct RecordsRepo<E: Entity> {
    pub pool: PgPool,
    _entity: PhantomData<E>,
}

impl<E: Entity> RecordsRepo<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Clone for RecordsRepo<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

pub struct PgUnitOfWork<E: Entity> {
    tx: Transaction<'static, Postgres>,
    _entity: PhantomData<E>,
}

fn status_names(statuses: &[RecordStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn parse_status(raw: &str) -> Result<RecordStatus, StoreError> {
    raw.parse::<RecordStatus>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn to_record(row: &PgRow) -> Result<Record, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(Record {
        id: row.try_get("id")?,
        owner_id: row.try_get("user_id")?,
        owner_email: row.try_get("email")?,
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
        status: parse_status(&status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl<E: Entity> RecordStore for RecordsRepo<E> {
    type Entity = E;
    type UnitOfWork = PgUnitOfWork<E>;

    async fn begin(&self) -> Result<Self::UnitOfWork, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork {
            tx,
            _entity: PhantomData,
        })
    }

    async fn get_status(&self, id: i64) -> Result<Option<RecordStatus>, StoreError> {
        let row = sqlx::query(&format!("SELECT status FROM {} WHERE id = $1", E::TABLE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let raw: String = r.try_get("status")?;
                Ok(Some(parse_status(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn list_by_owner_id(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM {}
            WHERE user_id = $1 AND id > $2
            ORDER BY id ASC
            LIMIT $3
            "#,
            E::TABLE
        ))
        .bind(owner_id)
        .bind(page.cursor)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(to_record).collect()
    }

    async fn list_by_owner_email(
        &self,
        email: &str,
        page: PageRequest,
    ) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM {}
            WHERE email = $1 AND id > $2
            ORDER BY id ASC
            LIMIT $3
            "#,
            E::TABLE
        ))
        .bind(email)
        .bind(page.cursor)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(to_record).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> UnitOfWork for PgUnitOfWork<E> {
    async fn insert(&mut self, record: NewRecord) -> Result<Record, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO {} (user_id, email, amount, currency, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECORD_COLUMNS}
            "#,
            E::TABLE
        ))
        .bind(record.owner_id)
        .bind(&record.owner_email)
        .bind(record.amount)
        .bind(&record.currency)
        .bind(record.status.as_str())
        .fetch_one(self.tx.as_mut())
        .await?;

        to_record(&row)
    }

    async fn get_status(&mut self, id: i64) -> Result<Option<RecordStatus>, StoreError> {
        let row = sqlx::query(&format!("SELECT status FROM {} WHERE id = $1", E::TABLE))
            .bind(id)
            .fetch_optional(self.tx.as_mut())
            .await?;

        match row {
            Some(r) => {
                let raw: String = r.try_get("status")?;
                Ok(Some(parse_status(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn conditional_update_status(
        &mut self,
        id: i64,
        expected: RecordStatus,
        requested: RecordStatus,
    ) -> Result<u64, StoreError> {
        let sources = status_names(&RecordStatus::sources_for(requested));
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = $3 AND status = ANY($4)
            "#,
            E::TABLE
        ))
        .bind(id)
        .bind(requested.as_str())
        .bind(expected.as_str())
        .bind(&sources)
        .execute(self.tx.as_mut())
        .await?;

        Ok(result.rows_affected())
    }

    async fn conditional_discard(&mut self, id: i64) -> Result<u64, StoreError> {
        let sources = status_names(&RecordStatus::sources_for(RecordStatus::Canceled));
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = ANY($3)
            "#,
            E::TABLE
        ))
        .bind(id)
        .bind(RecordStatus::Canceled.as_str())
        .bind(&sources)
        .execute(self.tx.as_mut())
        .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
