//! Oil batch usage statistics and alert evaluation
//!
//! Everything here is a pure function of its inputs. The current time is
//! always passed in, so dashboards can poll these computations as often as
//! they like and always get the same answer for the same data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::OilBatch;

/// Derived usage of an oil batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStat {
    pub total_units: Decimal,
    pub target_usage_units: Decimal,
    /// total_units / target_usage_units x 100, two decimal places
    pub usage_percentage: Decimal,
    /// Hours since the oil was added, one decimal place
    pub time_elapsed_hours: Decimal,
}

/// Compute usage statistics for a batch at `now`
pub fn compute_usage_stat(
    total_units: Decimal,
    target_usage_units: Decimal,
    oil_added_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> UsageStat {
    UsageStat {
        total_units,
        target_usage_units,
        usage_percentage: usage_percentage(total_units, target_usage_units),
        time_elapsed_hours: elapsed_hours(oil_added_at, now),
    }
}

/// Usage statistics for a stored batch; a closed batch stops ageing at `closed_at`
pub fn usage_stat_for_batch(batch: &OilBatch, total_units: Decimal, now: DateTime<Utc>) -> UsageStat {
    let until = batch.closed_at.unwrap_or(now);
    compute_usage_stat(total_units, batch.target_usage_units, batch.oil_added_at, until)
}

/// Usage as a percentage of target; zero when the target is not positive.
///
/// Ratios too large for `Decimal` saturate at `Decimal::MAX` (or `MIN`).
pub fn usage_percentage(total_units: Decimal, target_usage_units: Decimal) -> Decimal {
    if target_usage_units <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    total_units
        .checked_div(target_usage_units)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if total_units.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
        .round_dp(2)
}

/// Hours between `from` and `now`, clamped at zero
pub fn elapsed_hours(from: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
    let seconds = (now - from).num_seconds().max(0);
    (Decimal::from(seconds) / Decimal::from(3600)).round_dp(1)
}

/// Ordinal alert level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tiered thresholds for usage percentage and elapsed hours
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub low_usage_percent: Decimal,
    pub medium_usage_percent: Decimal,
    pub high_usage_percent: Decimal,
    pub low_hours: Decimal,
    pub medium_hours: Decimal,
    pub high_hours: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_usage_percent: Decimal::from(60),
            medium_usage_percent: Decimal::from(80),
            high_usage_percent: Decimal::from(100),
            low_hours: Decimal::from(48),
            medium_hours: Decimal::from(72),
            high_hours: Decimal::from(96),
        }
    }
}

impl AlertThresholds {
    /// Tiers must be positive and strictly ascending
    pub fn validate(&self) -> Result<(), &'static str> {
        let usage = [
            self.low_usage_percent,
            self.medium_usage_percent,
            self.high_usage_percent,
        ];
        let hours = [self.low_hours, self.medium_hours, self.high_hours];

        if usage.iter().chain(hours.iter()).any(|t| *t <= Decimal::ZERO) {
            return Err("Alert thresholds must be positive");
        }
        if !(usage[0] < usage[1] && usage[1] < usage[2]) {
            return Err("Usage thresholds must be ascending: low < medium < high");
        }
        if !(hours[0] < hours[1] && hours[1] < hours[2]) {
            return Err("Hour thresholds must be ascending: low < medium < high");
        }
        Ok(())
    }

    /// Tier reached by a usage percentage
    pub fn usage_severity(&self, usage_percentage: Decimal) -> Option<AlertSeverity> {
        tier(
            usage_percentage,
            self.low_usage_percent,
            self.medium_usage_percent,
            self.high_usage_percent,
        )
    }

    /// Tier reached by elapsed time
    pub fn time_severity(&self, time_elapsed_hours: Decimal) -> Option<AlertSeverity> {
        tier(
            time_elapsed_hours,
            self.low_hours,
            self.medium_hours,
            self.high_hours,
        )
    }
}

fn tier(value: Decimal, low: Decimal, medium: Decimal, high: Decimal) -> Option<AlertSeverity> {
    if value >= high {
        Some(AlertSeverity::High)
    } else if value >= medium {
        Some(AlertSeverity::Medium)
    } else if value >= low {
        Some(AlertSeverity::Low)
    } else {
        None
    }
}

/// Severity for a usage stat: the higher of the usage tier and the time tier
pub fn alert_severity(stat: &UsageStat, thresholds: &AlertThresholds) -> Option<AlertSeverity> {
    let by_usage = thresholds.usage_severity(stat.usage_percentage);
    let by_time = thresholds.time_severity(stat.time_elapsed_hours);
    by_usage.max(by_time)
}

/// An alert raised for an active oil batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OilAlert {
    pub batch_id: Uuid,
    pub fryer_id: Uuid,
    pub fryer_name: String,
    pub batch_name: String,
    pub severity: AlertSeverity,
    pub current_usage: Decimal,
    pub target_usage: Decimal,
    pub usage_percentage: Decimal,
    pub time_elapsed_hours: Decimal,
    pub message: String,
}

/// Evaluate a batch's usage against the thresholds.
///
/// Returns `None` for closed batches and for batches below every tier.
pub fn evaluate_alert(
    batch: &OilBatch,
    stat: &UsageStat,
    thresholds: &AlertThresholds,
) -> Option<OilAlert> {
    if !batch.is_active() {
        return None;
    }

    let severity = alert_severity(stat, thresholds)?;

    let mut reasons = Vec::with_capacity(2);
    if thresholds.usage_severity(stat.usage_percentage).is_some() {
        reasons.push(format!(
            "Oil usage at {:.2}% of target ({} / {} units)",
            stat.usage_percentage,
            stat.total_units.normalize(),
            stat.target_usage_units.normalize(),
        ));
    }
    if thresholds.time_severity(stat.time_elapsed_hours).is_some() {
        reasons.push(format!(
            "Oil in use for {:.1} hours",
            stat.time_elapsed_hours
        ));
    }

    Some(OilAlert {
        batch_id: batch.id,
        fryer_id: batch.fryer_id,
        fryer_name: batch.fryer_name.clone(),
        batch_name: batch.batch_name.clone(),
        severity,
        current_usage: stat.total_units,
        target_usage: stat.target_usage_units,
        usage_percentage: stat.usage_percentage,
        time_elapsed_hours: stat.time_elapsed_hours,
        message: reasons.join("; "),
    })
}

/// Most severe first, then highest usage
pub fn sort_alerts(alerts: &mut [OilAlert]) {
    alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.usage_percentage.cmp(&a.usage_percentage))
            .then_with(|| a.fryer_name.cmp(&b.fryer_name))
    });
}

/// Display tier of the usage progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageBarTier {
    Normal,
    Warning,
    Critical,
}

impl UsageBarTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageBarTier::Normal => "normal",
            UsageBarTier::Warning => "warning",
            UsageBarTier::Critical => "critical",
        }
    }
}

/// Color tier for a usage percentage: warning from 80%, critical from 100%
pub fn usage_bar_tier(usage_percentage: Decimal) -> UsageBarTier {
    if usage_percentage >= Decimal::ONE_HUNDRED {
        UsageBarTier::Critical
    } else if usage_percentage >= Decimal::from(80) {
        UsageBarTier::Warning
    } else {
        UsageBarTier::Normal
    }
}

/// Width of the progress bar fill, capped at 100
pub fn usage_bar_width(usage_percentage: Decimal) -> Decimal {
    usage_percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}
