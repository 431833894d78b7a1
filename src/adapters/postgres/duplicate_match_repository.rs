//! PostgreSQL implementation of DuplicateMatchRepository.
//!
//! The unresolved-pair invariant is carried by a partial unique index over
//! `(LEAST(contact1_id, contact2_id), GREATEST(contact1_id, contact2_id))
//! WHERE NOT resolved`; `insert_if_absent` leans on it with
//! `ON CONFLICT ... DO NOTHING` instead of a racy pre-check. Merge
//! consolidation runs in a single transaction so a half-moved contact can
//! never be observed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::dedupe::{DuplicateMatch, MergeHistory, ScoreBreakdown};
use crate::domain::foundation::{
    ContactId, DomainError, DuplicateMatchId, TenantId, Timestamp,
};
use crate::ports::DuplicateMatchRepository;

/// PostgreSQL implementation of the DuplicateMatchRepository port.
pub struct PostgresDuplicateMatchRepository {
    pool: PgPool,
}

impl PostgresDuplicateMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a duplicate match.
#[derive(Debug, sqlx::FromRow)]
struct DuplicateMatchRow {
    id: Uuid,
    contact1_id: Uuid,
    contact2_id: Uuid,
    name_score: i16,
    email_score: i16,
    phone_score: i16,
    address_score: i16,
    confidence_score: i16,
    resolved: bool,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DuplicateMatchRow> for DuplicateMatch {
    type Error = DomainError;

    fn try_from(row: DuplicateMatchRow) -> Result<Self, Self::Error> {
        Ok(DuplicateMatch {
            id: DuplicateMatchId::from_uuid(row.id),
            contact1_id: ContactId::from_uuid(row.contact1_id),
            contact2_id: ContactId::from_uuid(row.contact2_id),
            scores: ScoreBreakdown {
                name: score_from_db(row.name_score)?,
                email: score_from_db(row.email_score)?,
                phone: score_from_db(row.phone_score)?,
                address: score_from_db(row.address_score)?,
                confidence: score_from_db(row.confidence_score)?,
            },
            resolved: row.resolved,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn score_from_db(value: i16) -> Result<u8, DomainError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| DomainError::database(format!("score out of range: {}", value)))
}

const MATCH_COLUMNS: &str = "id, contact1_id, contact2_id, name_score, email_score, \
     phone_score, address_score, confidence_score, resolved, reviewed_by, reviewed_at, created_at";

#[async_trait]
impl DuplicateMatchRepository for PostgresDuplicateMatchRepository {
    async fn insert_if_absent(&self, candidate: &DuplicateMatch) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO duplicate_matches
                (id, contact1_id, contact2_id, name_score, email_score,
                 phone_score, address_score, confidence_score, resolved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, $9)
            ON CONFLICT (LEAST(contact1_id, contact2_id), GREATEST(contact1_id, contact2_id))
                WHERE NOT resolved
            DO NOTHING
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(candidate.contact1_id.as_uuid())
        .bind(candidate.contact2_id.as_uuid())
        .bind(candidate.scores.name as i16)
        .bind(candidate.scores.email as i16)
        .bind(candidate.scores.phone as i16)
        .bind(candidate.scores.address as i16)
        .bind(candidate.scores.confidence as i16)
        .bind(candidate.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(
        &self,
        id: DuplicateMatchId,
    ) -> Result<Option<DuplicateMatch>, DomainError> {
        let row: Option<DuplicateMatchRow> = sqlx::query_as(&format!(
            "SELECT {} FROM duplicate_matches WHERE id = $1",
            MATCH_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(DuplicateMatch::try_from).transpose()
    }

    async fn list_unresolved(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<DuplicateMatch>, DomainError> {
        let rows: Vec<DuplicateMatchRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM duplicate_matches dm
            WHERE NOT dm.resolved
              AND EXISTS (
                  SELECT 1 FROM tenant_contacts tc
                  WHERE tc.tenant_id = $1
                    AND tc.contact_id IN (dm.contact1_id, dm.contact2_id)
              )
            ORDER BY dm.confidence_score DESC, dm.created_at ASC
            "#,
            MATCH_COLUMNS
        ))
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        rows.into_iter().map(DuplicateMatch::try_from).collect()
    }

    async fn record_ignore(&self, resolved: &DuplicateMatch) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::database)?;
        mark_resolved(&mut tx, resolved).await?;
        tx.commit().await.map_err(DomainError::database)
    }

    async fn record_merge(
        &self,
        resolved: &DuplicateMatch,
        primary_id: ContactId,
        secondary_id: ContactId,
        history: &MergeHistory,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::database)?;

        mark_resolved(&mut tx, resolved).await?;

        sqlx::query(
            r#"
            INSERT INTO merge_history
                (id, primary_contact_id, merged_contact_id, merged_by, merged_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(history.id)
        .bind(history.primary_contact_id.as_uuid())
        .bind(history.merged_contact_id.as_uuid())
        .bind(&history.merged_by)
        .bind(history.merged_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        // Move channel rows, demoting a migrated primary whenever the
        // surviving contact already holds one for that channel, then
        // promote a replacement wherever the merge left none (verified
        // first, oldest row wins).
        for table in ["emails", "phones", "locations"] {
            sqlx::query(&format!(
                r#"
                UPDATE {table}
                SET is_primary = FALSE
                WHERE contact_id = $1 AND is_primary
                  AND EXISTS (SELECT 1 FROM {table} WHERE contact_id = $2 AND is_primary)
                "#,
            ))
            .bind(secondary_id.as_uuid())
            .bind(primary_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DomainError::database)?;

            sqlx::query(&format!(
                "UPDATE {table} SET contact_id = $2 WHERE contact_id = $1"
            ))
            .bind(secondary_id.as_uuid())
            .bind(primary_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DomainError::database)?;

            sqlx::query(&format!(
                r#"
                UPDATE {table}
                SET is_primary = TRUE
                WHERE id = (
                    SELECT id FROM {table} WHERE contact_id = $1
                    ORDER BY verified DESC, created_at ASC
                    LIMIT 1
                )
                AND NOT EXISTS (
                    SELECT 1 FROM {table} WHERE contact_id = $1 AND is_primary
                )
                "#,
            ))
            .bind(primary_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DomainError::database)?;
        }

        sqlx::query("UPDATE employer_data SET contact_id = $2 WHERE contact_id = $1")
            .bind(secondary_id.as_uuid())
            .bind(primary_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DomainError::database)?;

        sqlx::query("UPDATE donations SET contact_id = $2 WHERE contact_id = $1")
            .bind(secondary_id.as_uuid())
            .bind(primary_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DomainError::database)?;

        // Tenant links move idempotently: the primary may already be linked.
        sqlx::query(
            r#"
            INSERT INTO tenant_contacts (tenant_id, contact_id)
            SELECT tenant_id, $2 FROM tenant_contacts WHERE contact_id = $1
            ON CONFLICT (tenant_id, contact_id) DO NOTHING
            "#,
        )
        .bind(secondary_id.as_uuid())
        .bind(primary_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        sqlx::query("DELETE FROM tenant_contacts WHERE contact_id = $1")
            .bind(secondary_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DomainError::database)?;

        // Soft-deactivate the secondary; the row stays for FK history.
        sqlx::query(
            "UPDATE contacts SET merged_into = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(secondary_id.as_uuid())
        .bind(primary_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        tx.commit().await.map_err(DomainError::database)
    }
}

/// Flips the match row to resolved, guarding against concurrent resolution.
async fn mark_resolved(
    tx: &mut Transaction<'_, Postgres>,
    resolved: &DuplicateMatch,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE duplicate_matches
        SET resolved = TRUE, reviewed_by = $2, reviewed_at = $3
        WHERE id = $1 AND NOT resolved
        "#,
    )
    .bind(resolved.id.as_uuid())
    .bind(&resolved.reviewed_by)
    .bind(resolved.reviewed_at.map(|t| *t.as_datetime()))
    .execute(&mut **tx)
    .await
    .map_err(DomainError::database)?;

    if result.rows_affected() == 0 {
        return Err(DomainError::validation(
            "duplicate_id",
            "duplicate match is already resolved or does not exist",
        ));
    }
    Ok(())
}
