//! Fryer and oil batch tracking service
//!
//! Usage totals come from the database; usage percentages, elapsed time and
//! alerts are derived on every read with the pure functions in `shared`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::alerts::{
    evaluate_alert, sort_alerts, usage_bar_tier, usage_stat_for_batch, AlertThresholds, OilAlert,
};
use shared::models::{
    default_batch_name, BatchDetail, BatchStatus, CloseBatchInput, CreateFryerInput, Fryer,
    FryerDashboardEntry, OilBatch, OilUsageEntry, RecordUsageInput, StartBatchInput,
    UpdateFryerInput,
};
use shared::validation::{normalize_optional_text, validate_target_usage, validate_usage_units};

/// Fryer service for fryers, oil batches and usage
#[derive(Clone)]
pub struct FryerService {
    db: PgPool,
    thresholds: AlertThresholds,
}

/// Row for fryer queries
#[derive(Debug, FromRow)]
struct FryerRow {
    id: Uuid,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FryerRow> for Fryer {
    fn from(row: FryerRow) -> Self {
        Fryer {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row for batch queries, with fryer name and usage total joined in
#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    fryer_id: Uuid,
    fryer_name: String,
    batch_name: String,
    oil_added_at: DateTime<Utc>,
    target_usage_units: Decimal,
    status: String,
    closed_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    total_units: Decimal,
}

impl BatchRow {
    fn into_batch(self) -> AppResult<(OilBatch, Decimal)> {
        let status = BatchStatus::from_str(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown batch status '{}'", self.status))
        })?;

        Ok((
            OilBatch {
                id: self.id,
                fryer_id: self.fryer_id,
                fryer_name: self.fryer_name,
                batch_name: self.batch_name,
                oil_added_at: self.oil_added_at,
                target_usage_units: self.target_usage_units,
                status,
                closed_at: self.closed_at,
                notes: self.notes,
                created_at: self.created_at,
            },
            self.total_units,
        ))
    }
}

/// Row for usage entries
#[derive(Debug, FromRow)]
struct UsageRow {
    id: Uuid,
    batch_id: Uuid,
    units: Decimal,
    product_name: Option<String>,
    notes: Option<String>,
    recorded_at: DateTime<Utc>,
    recorded_by: Option<Uuid>,
}

impl From<UsageRow> for OilUsageEntry {
    fn from(row: UsageRow) -> Self {
        OilUsageEntry {
            id: row.id,
            batch_id: row.batch_id,
            units: row.units,
            product_name: row.product_name,
            notes: row.notes,
            recorded_at: row.recorded_at,
            recorded_by: row.recorded_by,
        }
    }
}

const FRYER_COLUMNS: &str = "id, name, is_active, created_at, updated_at";

const SELECT_BATCH: &str = r#"
    SELECT b.id, b.fryer_id, f.name AS fryer_name, b.batch_name, b.oil_added_at,
           b.target_usage_units, b.status, b.closed_at, b.notes, b.created_at,
           COALESCE((SELECT SUM(u.units) FROM oil_usage_entries u WHERE u.batch_id = b.id), 0)
               AS total_units
    FROM oil_batches b
    JOIN fryers f ON f.id = b.fryer_id
"#;

impl FryerService {
    pub fn new(db: PgPool, thresholds: AlertThresholds) -> Self {
        Self { db, thresholds }
    }

    // ========================================================================
    // Fryers
    // ========================================================================

    /// List fryers by name
    pub async fn list_fryers(&self) -> AppResult<Vec<Fryer>> {
        let rows = sqlx::query_as::<_, FryerRow>(
            &format!("SELECT {} FROM fryers ORDER BY name", FRYER_COLUMNS),
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Fryer::from).collect())
    }

    /// Get a fryer by ID
    pub async fn get_fryer(&self, fryer_id: Uuid) -> AppResult<Fryer> {
        sqlx::query_as::<_, FryerRow>(
            &format!("SELECT {} FROM fryers WHERE id = $1", FRYER_COLUMNS),
        )
        .bind(fryer_id)
        .fetch_optional(&self.db)
        .await?
        .map(Fryer::from)
        .ok_or_else(|| AppError::NotFound("Fryer".to_string()))
    }

    /// Create a fryer
    pub async fn create_fryer(&self, input: CreateFryerInput) -> AppResult<Fryer> {
        let input = CreateFryerInput {
            name: input.name.trim().to_string(),
            ..input
        };
        input.validate()?;

        let fryer = sqlx::query_as::<_, FryerRow>(
            r#"
            INSERT INTO fryers (name, is_active)
            VALUES ($1, $2)
            RETURNING id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        tracing::info!(fryer_id = %fryer.id, name = %fryer.name, "Fryer created");
        Ok(fryer.into())
    }

    /// Update a fryer's name or active flag
    pub async fn update_fryer(&self, fryer_id: Uuid, input: UpdateFryerInput) -> AppResult<Fryer> {
        let input = UpdateFryerInput {
            name: input.name.map(|n| n.trim().to_string()),
            ..input
        };
        input.validate()?;

        let existing = self.get_fryer(fryer_id).await?;

        let fryer = sqlx::query_as::<_, FryerRow>(
            r#"
            UPDATE fryers
            SET name = $1, is_active = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(fryer_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        Ok(fryer.into())
    }

    /// Delete a fryer that has never had oil batches
    pub async fn delete_fryer(&self, fryer_id: Uuid) -> AppResult<()> {
        let has_batches = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM oil_batches WHERE fryer_id = $1)",
        )
        .bind(fryer_id)
        .fetch_one(&self.db)
        .await?;

        if has_batches {
            return Err(AppError::Conflict {
                resource: "fryer".to_string(),
                message: "Fryer has oil batch history; deactivate it instead".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM fryers WHERE id = $1")
            .bind(fryer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Fryer".to_string()));
        }

        tracing::info!(%fryer_id, "Fryer deleted");
        Ok(())
    }

    // ========================================================================
    // Oil batches
    // ========================================================================

    /// Start a new oil batch, closing the fryer's current one
    pub async fn start_batch(
        &self,
        fryer_id: Uuid,
        input: StartBatchInput,
    ) -> AppResult<BatchDetail> {
        input.validate()?;
        validate_target_usage(input.target_usage_units)
            .map_err(|msg| AppError::validation("target_usage_units", msg))?;

        let now = Utc::now();
        let oil_added_at = input.oil_added_at.unwrap_or(now);
        if oil_added_at > now {
            return Err(AppError::validation(
                "oil_added_at",
                "Oil added time cannot be in the future",
            ));
        }

        let mut tx = self.db.begin().await?;

        // Row lock serializes concurrent batch starts on the same fryer
        let fryer = sqlx::query_as::<_, FryerRow>(&format!(
            "SELECT {} FROM fryers WHERE id = $1 FOR UPDATE",
            FRYER_COLUMNS
        ))
        .bind(fryer_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Fryer::from)
        .ok_or_else(|| AppError::NotFound("Fryer".to_string()))?;

        if !fryer.is_active {
            return Err(AppError::InvalidStateTransition(format!(
                "Fryer '{}' is inactive",
                fryer.name
            )));
        }

        let batch_name = normalize_optional_text(input.batch_name)
            .unwrap_or_else(|| default_batch_name(&fryer.name, oil_added_at));

        let closed = sqlx::query(
            r#"
            UPDATE oil_batches
            SET status = 'closed', closed_at = $2
            WHERE fryer_id = $1 AND status = 'active'
            "#,
        )
        .bind(fryer_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let batch_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO oil_batches (fryer_id, batch_name, oil_added_at, target_usage_units, status, notes)
            VALUES ($1, $2, $3, $4, 'active', $5)
            RETURNING id
            "#,
        )
        .bind(fryer_id)
        .bind(&batch_name)
        .bind(oil_added_at)
        .bind(input.target_usage_units)
        .bind(normalize_optional_text(input.notes))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::conflict_on_unique_violation(
                e,
                "oil_batch",
                "Another oil batch was started on this fryer at the same time",
            )
        })?;

        tx.commit().await?;

        tracing::info!(
            %fryer_id,
            %batch_id,
            closed_previous = closed,
            target = %input.target_usage_units,
            "Oil batch started"
        );

        self.get_batch_detail(batch_id).await
    }

    /// Close an active batch
    pub async fn close_batch(&self, batch_id: Uuid, input: CloseBatchInput) -> AppResult<BatchDetail> {
        let (batch, _) = self.fetch_batch(batch_id).await?;
        if !batch.is_active() {
            return Err(AppError::InvalidStateTransition(
                "Batch is already closed".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE oil_batches
            SET status = 'closed', closed_at = NOW(), notes = COALESCE($2, notes)
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(batch_id)
        .bind(normalize_optional_text(input.notes))
        .execute(&self.db)
        .await?;

        // Lost a race with another close or a new batch on the same fryer
        if result.rows_affected() == 0 {
            return Err(AppError::InvalidStateTransition(
                "Batch is already closed".to_string(),
            ));
        }

        tracing::info!(%batch_id, fryer_id = %batch.fryer_id, "Oil batch closed");
        self.get_batch_detail(batch_id).await
    }

    /// List batches for a fryer, newest first
    pub async fn list_batches(
        &self,
        fryer_id: Uuid,
        status: Option<BatchStatus>,
    ) -> AppResult<Vec<BatchDetail>> {
        self.get_fryer(fryer_id).await?;

        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "{} WHERE b.fryer_id = $1 AND ($2::text IS NULL OR b.status = $2) ORDER BY b.oil_added_at DESC",
            SELECT_BATCH
        ))
        .bind(fryer_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        let now = Utc::now();
        rows.into_iter()
            .map(|row| row.into_batch().map(|(b, total)| self.detail(b, total, now)))
            .collect()
    }

    /// Batch with usage stat and alert
    pub async fn get_batch_detail(&self, batch_id: Uuid) -> AppResult<BatchDetail> {
        let (batch, total_units) = self.fetch_batch(batch_id).await?;
        Ok(self.detail(batch, total_units, Utc::now()))
    }

    async fn fetch_batch(&self, batch_id: Uuid) -> AppResult<(OilBatch, Decimal)> {
        sqlx::query_as::<_, BatchRow>(&format!("{} WHERE b.id = $1", SELECT_BATCH))
            .bind(batch_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Oil batch".to_string()))?
            .into_batch()
    }

    fn detail(&self, batch: OilBatch, total_units: Decimal, now: DateTime<Utc>) -> BatchDetail {
        let usage = usage_stat_for_batch(&batch, total_units, now);
        let alert = evaluate_alert(&batch, &usage, &self.thresholds);

        BatchDetail {
            usage_bar: usage_bar_tier(usage.usage_percentage),
            batch,
            usage,
            alert,
        }
    }

    // ========================================================================
    // Usage
    // ========================================================================

    /// Record usage against an active batch
    pub async fn record_usage(
        &self,
        batch_id: Uuid,
        user_id: Uuid,
        input: RecordUsageInput,
    ) -> AppResult<OilUsageEntry> {
        input.validate()?;
        validate_usage_units(input.units).map_err(|msg| AppError::validation("units", msg))?;

        let entry = sqlx::query_as::<_, UsageRow>(
            r#"
            INSERT INTO oil_usage_entries (batch_id, units, product_name, notes, recorded_by)
            SELECT b.id, $2, $3, $4, $5
            FROM oil_batches b
            WHERE b.id = $1 AND b.status = 'active'
            RETURNING id, batch_id, units, product_name, notes, recorded_at, recorded_by
            "#,
        )
        .bind(batch_id)
        .bind(input.units)
        .bind(normalize_optional_text(input.product_name))
        .bind(normalize_optional_text(input.notes))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        match entry {
            Some(entry) => Ok(entry.into()),
            None => {
                // Distinguish a missing batch from a closed one
                self.fetch_batch(batch_id).await?;
                Err(AppError::InvalidStateTransition(
                    "Cannot record usage on a closed batch".to_string(),
                ))
            }
        }
    }

    /// Usage entries for a batch, newest first
    pub async fn list_usage(&self, batch_id: Uuid) -> AppResult<Vec<OilUsageEntry>> {
        self.fetch_batch(batch_id).await?;

        let rows = sqlx::query_as::<_, UsageRow>(
            r#"
            SELECT id, batch_id, units, product_name, notes, recorded_at, recorded_by
            FROM oil_usage_entries
            WHERE batch_id = $1
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(OilUsageEntry::from).collect())
    }

    // ========================================================================
    // Dashboard
    // ========================================================================

    /// Active fryers with their active batch state
    pub async fn dashboard(&self) -> AppResult<Vec<FryerDashboardEntry>> {
        let fryers = sqlx::query_as::<_, FryerRow>(
            r#"
            SELECT id, name, is_active, created_at, updated_at
            FROM fryers
            WHERE is_active = true
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let active = self.active_batches().await?;
        let now = Utc::now();

        let fryers = fryers.into_iter().map(Fryer::from).collect();
        Ok(pair_active_batches(fryers, active)
            .into_iter()
            .map(|(fryer, active_batch)| FryerDashboardEntry {
                fryer,
                active_batch: active_batch.map(|(b, total)| self.detail(b, total, now)),
            })
            .collect())
    }

    /// Alerts across all active batches, most severe first
    pub async fn alerts(&self) -> AppResult<Vec<OilAlert>> {
        let now = Utc::now();
        let mut alerts: Vec<OilAlert> = self
            .active_batches()
            .await?
            .into_iter()
            .filter_map(|(batch, total)| self.detail(batch, total, now).alert)
            .collect();

        sort_alerts(&mut alerts);
        Ok(alerts)
    }

    async fn active_batches(&self) -> AppResult<Vec<(OilBatch, Decimal)>> {
        sqlx::query_as::<_, BatchRow>(&format!(
            "{} WHERE b.status = 'active' ORDER BY f.name",
            SELECT_BATCH
        ))
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(BatchRow::into_batch)
        .collect()
    }
}

/// Attach each fryer's active batch, keeping the fryer order. Batches for
/// fryers not in the list are dropped.
fn pair_active_batches(
    fryers: Vec<Fryer>,
    mut active: Vec<(OilBatch, Decimal)>,
) -> Vec<(Fryer, Option<(OilBatch, Decimal)>)> {
    fryers
        .into_iter()
        .map(|fryer| {
            let batch = active
                .iter()
                .position(|(b, _)| b.fryer_id == fryer.id)
                .map(|idx| active.swap_remove(idx));
            (fryer, batch)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fryer(name: &str) -> Fryer {
        let now = Utc::now();
        Fryer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn active_batch(fryer: &Fryer, total: i64) -> (OilBatch, Decimal) {
        let now = Utc::now();
        (
            OilBatch {
                id: Uuid::new_v4(),
                fryer_id: fryer.id,
                fryer_name: fryer.name.clone(),
                batch_name: format!("{} batch", fryer.name),
                oil_added_at: now,
                target_usage_units: Decimal::from(200),
                status: BatchStatus::Active,
                closed_at: None,
                notes: None,
                created_at: now,
            },
            Decimal::from(total),
        )
    }

    #[test]
    fn test_dashboard_pairs_each_fryer_with_its_own_batch() {
        let a = fryer("Fryer A");
        let b = fryer("Fryer B");
        let c = fryer("Fryer C");
        let stray = fryer("Inactive fryer");

        // Batch order differs from fryer order
        let active = vec![
            active_batch(&c, 30),
            active_batch(&stray, 99),
            active_batch(&a, 10),
        ];

        let paired = pair_active_batches(vec![a.clone(), b.clone(), c.clone()], active);

        let names: Vec<_> = paired.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["Fryer A", "Fryer B", "Fryer C"]);

        let (_, batch_a) = &paired[0];
        let (batch, total) = batch_a.as_ref().unwrap();
        assert_eq!(batch.fryer_id, a.id);
        assert_eq!(*total, Decimal::from(10));

        assert!(paired[1].1.is_none());

        let (batch, total) = paired[2].1.as_ref().unwrap();
        assert_eq!(batch.fryer_id, c.id);
        assert_eq!(*total, Decimal::from(30));
    }

    #[test]
    fn test_dashboard_pairing_without_batches() {
        let paired = pair_active_batches(vec![fryer("Fryer A")], Vec::new());
        assert_eq!(paired.len(), 1);
        assert!(paired[0].1.is_none());
    }
}
