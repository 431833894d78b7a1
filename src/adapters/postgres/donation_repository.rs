//! PostgreSQL implementation of DonationRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::donation::{CustomField, Donation, MerchandiseItem};
use crate::domain::foundation::{DomainError, DonationId};
use crate::ports::DonationRepository;

/// PostgreSQL implementation of the DonationRepository port.
pub struct PostgresDonationRepository {
    pool: PgPool,
}

impl PostgresDonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationRepository for PostgresDonationRepository {
    async fn insert(&self, donation: &Donation) -> Result<(), DomainError> {
        let shipping = donation.shipping.clone().unwrap_or_default();
        sqlx::query(
            r#"
            INSERT INTO donations
                (id, contact_id, amount, paid_at, recurring_period, recurring_duration,
                 order_number, status, is_mobile, is_express, is_paypal,
                 smart_boost_amount, gift_note,
                 shipping_name, shipping_street, shipping_city,
                 shipping_state, shipping_zip, shipping_country,
                 created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(donation.id.as_uuid())
        .bind(donation.contact_id.map(|id| *id.as_uuid()))
        .bind(donation.amount)
        .bind(donation.paid_at.as_datetime())
        .bind(donation.recurring_period.as_str())
        .bind(donation.recurring_duration)
        .bind(&donation.order_number)
        .bind(&donation.status)
        .bind(donation.is_mobile)
        .bind(donation.is_express)
        .bind(donation.is_paypal)
        .bind(donation.smart_boost_amount)
        .bind(&donation.gift_note)
        .bind(&shipping.name)
        .bind(&shipping.street)
        .bind(&shipping.city)
        .bind(&shipping.state)
        .bind(&shipping.zip)
        .bind(&shipping.country)
        .bind(donation.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;
        Ok(())
    }

    async fn add_custom_fields(
        &self,
        donation_id: DonationId,
        fields: &[CustomField],
    ) -> Result<(), DomainError> {
        for field in fields {
            sqlx::query(
                r#"
                INSERT INTO donation_custom_fields (id, donation_id, name, value)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(donation_id.as_uuid())
            .bind(&field.name)
            .bind(&field.value)
            .execute(&self.pool)
            .await
            .map_err(DomainError::database)?;
        }
        Ok(())
    }

    async fn add_merchandise(
        &self,
        donation_id: DonationId,
        items: &[MerchandiseItem],
    ) -> Result<(), DomainError> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO donation_merchandise (id, donation_id, name, quantity, amount)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(donation_id.as_uuid())
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.amount)
            .execute(&self.pool)
            .await
            .map_err(DomainError::database)?;
        }
        Ok(())
    }
}
