//! PostgreSQL implementation of ContactRepository.
//!
//! The find-or-create path is one transaction built around the unique
//! constraint on `emails.address`: a provisional contact is inserted, the
//! email is upserted with `ON CONFLICT ... DO UPDATE ... RETURNING
//! contact_id`, and when the conflict reveals an existing owner the
//! provisional row is deleted and the owner updated instead. Two concurrent
//! ingestions of the same new address therefore converge on one contact.
//!
//! The single-primary invariant is enforced here as well: channel inserts
//! compute `is_primary` from the current table state inside the statement,
//! never in application code.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::contact::{Contact, ContactStatus, EmployerRecord, Location, PhoneNumber};
use crate::domain::dedupe::{ContactSnapshot, SnapshotAddress};
use crate::domain::donation::DonorData;
use crate::domain::foundation::{ContactId, DomainError, TenantId, Timestamp};
use crate::ports::{ContactRepository, ResolvedContact};

/// PostgreSQL implementation of the ContactRepository port.
pub struct PostgresContactRepository {
    pool: PgPool,
}

impl PostgresContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a contact.
#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    status: String,
    merged_into: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = DomainError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        Ok(Contact {
            id: ContactId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            status: parse_status(&row.status)?,
            merged_into: row.merged_into.map(ContactId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<ContactStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "prospect" => Ok(ContactStatus::Prospect),
        "active" => Ok(ContactStatus::Active),
        "donor" => Ok(ContactStatus::Donor),
        _ => Err(DomainError::database(format!("invalid contact status: {}", s))),
    }
}

fn status_to_string(status: ContactStatus) -> &'static str {
    match status {
        ContactStatus::Prospect => "prospect",
        ContactStatus::Active => "active",
        ContactStatus::Donor => "donor",
    }
}

const CONTACT_COLUMNS: &str =
    "id, first_name, last_name, status, merged_into, created_at, updated_at";

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, DomainError> {
        let row: Option<ContactRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.first_name, c.last_name, c.status, c.merged_into,
                   c.created_at, c.updated_at
            FROM contacts c
            INNER JOIN emails e ON e.contact_id = c.id
            WHERE e.address = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Contact::try_from).transpose()
    }

    async fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, DomainError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "SELECT {} FROM contacts WHERE id = $1",
            CONTACT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Contact::try_from).transpose()
    }

    async fn find_or_create_by_email(
        &self,
        email: &str,
        donor: &DonorData,
    ) -> Result<ResolvedContact, DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::database)?;

        let provisional_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO contacts (id, first_name, last_name, status)
            VALUES ($1, $2, $3, 'prospect')
            "#,
        )
        .bind(provisional_id)
        .bind(&donor.first_name)
        .bind(&donor.last_name)
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        // The no-op DO UPDATE makes RETURNING yield the row on conflict, so
        // one statement answers "who owns this address now".
        let (owner_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO emails (id, contact_id, address, kind, is_primary, verified)
            VALUES ($1, $2, $3, 'main', TRUE, FALSE)
            ON CONFLICT (address) DO UPDATE SET address = EXCLUDED.address
            RETURNING contact_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(provisional_id)
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        let created = owner_id == provisional_id;
        if !created {
            // Lost the race (or the address predated us): drop the
            // provisional contact and refresh the owner instead.
            sqlx::query("DELETE FROM contacts WHERE id = $1")
                .bind(provisional_id)
                .execute(&mut *tx)
                .await
                .map_err(DomainError::database)?;

            sqlx::query(
                r#"
                UPDATE contacts
                SET first_name = COALESCE($2, first_name),
                    last_name = COALESCE($3, last_name),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(owner_id)
            .bind(&donor.first_name)
            .bind(&donor.last_name)
            .execute(&mut *tx)
            .await
            .map_err(DomainError::database)?;
        }

        let row: ContactRow = sqlx::query_as(&format!(
            "SELECT {} FROM contacts WHERE id = $1",
            CONTACT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        tx.commit().await.map_err(DomainError::database)?;

        Ok(ResolvedContact {
            contact: Contact::try_from(row)?,
            created,
        })
    }

    async fn update_from_donor(
        &self,
        contact_id: ContactId,
        donor: &DonorData,
    ) -> Result<Contact, DomainError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            r#"
            UPDATE contacts
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        ))
        .bind(contact_id.as_uuid())
        .bind(&donor.first_name)
        .bind(&donor.last_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Contact::try_from)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("contact"))
    }

    async fn attach_email(&self, contact_id: ContactId, email: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO emails (id, contact_id, address, kind, is_primary, verified)
            VALUES (
                $1, $2, $3, 'main',
                NOT EXISTS (SELECT 1 FROM emails WHERE contact_id = $2 AND is_primary),
                FALSE
            )
            ON CONFLICT (address) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(contact_id.as_uuid())
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;
        Ok(())
    }

    async fn add_phone(&self, phone: &PhoneNumber) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO phones (id, contact_id, number, kind, is_primary, verified)
            VALUES (
                $1, $2, $3, $4,
                NOT EXISTS (SELECT 1 FROM phones WHERE contact_id = $2 AND is_primary),
                $5
            )
            "#,
        )
        .bind(phone.id)
        .bind(phone.contact_id.as_uuid())
        .bind(&phone.number)
        .bind(&phone.kind)
        .bind(phone.verified)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;
        Ok(())
    }

    async fn add_location(&self, location: &Location) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO locations
                (id, contact_id, street, city, state, zip, country, kind, is_primary, verified)
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                NOT EXISTS (SELECT 1 FROM locations WHERE contact_id = $2 AND is_primary),
                $9
            )
            "#,
        )
        .bind(location.id)
        .bind(location.contact_id.as_uuid())
        .bind(&location.street)
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.zip)
        .bind(&location.country)
        .bind(&location.kind)
        .bind(location.verified)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;
        Ok(())
    }

    async fn add_employer(&self, record: &EmployerRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO employer_data
                (id, contact_id, employer, occupation,
                 employer_street, employer_city, employer_state,
                 employer_zip, employer_country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(record.contact_id.as_uuid())
        .bind(&record.data.employer)
        .bind(&record.data.occupation)
        .bind(&record.data.employer_street)
        .bind(&record.data.employer_city)
        .bind(&record.data.employer_state)
        .bind(&record.data.employer_zip)
        .bind(&record.data.employer_country)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;
        Ok(())
    }

    async fn link_tenant(
        &self,
        tenant_id: TenantId,
        contact_id: ContactId,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO tenant_contacts (tenant_id, contact_id)
            VALUES ($1, $2)
            ON CONFLICT (tenant_id, contact_id) DO NOTHING
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(contact_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;
        Ok(())
    }

    async fn promote_to_donor(&self, contact_id: ContactId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE contacts
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status <> $2
            "#,
        )
        .bind(contact_id.as_uuid())
        .bind(status_to_string(ContactStatus::Donor))
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;
        Ok(())
    }

    async fn list_snapshots_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ContactSnapshot>, DomainError> {
        let contact_rows: Vec<(Uuid, Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT c.id, c.first_name, c.last_name
            FROM contacts c
            INNER JOIN tenant_contacts tc ON tc.contact_id = c.id
            WHERE tc.tenant_id = $1 AND c.merged_into IS NULL
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        let ids: Vec<Uuid> = contact_rows.iter().map(|(id, _, _)| *id).collect();

        let mut snapshots: HashMap<Uuid, ContactSnapshot> = contact_rows
            .into_iter()
            .map(|(id, first_name, last_name)| {
                (
                    id,
                    ContactSnapshot {
                        id: ContactId::from_uuid(id),
                        first_name,
                        last_name,
                        emails: vec![],
                        phones: vec![],
                        addresses: vec![],
                    },
                )
            })
            .collect();

        let email_rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT contact_id, address FROM emails WHERE contact_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;
        for (contact_id, address) in email_rows {
            if let Some(snapshot) = snapshots.get_mut(&contact_id) {
                snapshot.emails.push(address);
            }
        }

        let phone_rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT contact_id, number FROM phones WHERE contact_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;
        for (contact_id, number) in phone_rows {
            if let Some(snapshot) = snapshots.get_mut(&contact_id) {
                snapshot.phones.push(number);
            }
        }

        let location_rows: Vec<(
            Uuid,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        )> = sqlx::query_as(
            "SELECT contact_id, street, city, state, zip FROM locations WHERE contact_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;
        for (contact_id, street, city, state, zip) in location_rows {
            if let Some(snapshot) = snapshots.get_mut(&contact_id) {
                snapshot.addresses.push(SnapshotAddress {
                    street,
                    city,
                    state,
                    zip,
                });
            }
        }

        let mut result: Vec<ContactSnapshot> = snapshots.into_values().collect();
        result.sort_by_key(|s| s.id);
        Ok(result)
    }
}
