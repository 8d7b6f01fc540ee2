//! Engine configuration

use crate::{CaseKind, ConfigError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const DEFAULT_SLA_WARNING_HOURS: i64 = 24;
const DEFAULT_LEAD_TIME_DAYS: i64 = 7;
const DEFAULT_SEQUENCE_WIDTH: usize = 4;

/// Ten years, in hours and days.
const MAX_SLA_WARNING_HOURS: i64 = 24 * 366 * 10;
const MAX_LEAD_TIME_DAYS: i64 = 366 * 10;

/// Workflow engine configuration.
///
/// Durations are stored as whole hours/days so the struct serializes
/// cleanly; use the accessor methods to get `chrono::Duration` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A case is in `warning` once its due date is this close.
    pub sla_warning_hours: i64,
    /// Due date lead per kind, applied at creation.
    pub lead_time_days: BTreeMap<CaseKind, i64>,
    /// Kinds whose RCA must be approved before resolution.
    pub rca_review_gate: BTreeSet<CaseKind>,
    /// Minimum digits in the sequence part of a case id.
    pub sequence_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sla_warning_hours: DEFAULT_SLA_WARNING_HOURS,
            lead_time_days: CaseKind::ALL
                .iter()
                .map(|kind| (*kind, DEFAULT_LEAD_TIME_DAYS))
                .collect(),
            rca_review_gate: BTreeSet::new(),
            sequence_width: DEFAULT_SEQUENCE_WIDTH,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CASEFLOW_SLA_WARNING_HOURS`: warning window in hours (default: 24)
    /// - `CASEFLOW_LEAD_TIME_DAYS`: lead time in days for every kind (default: 7)
    /// - `CASEFLOW_RCA_REVIEW_GATE`: comma-separated kinds requiring RCA approval (default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CASEFLOW_SLA_WARNING_HOURS") {
            config.sla_warning_hours = parse_number("CASEFLOW_SLA_WARNING_HOURS", &raw)?;
        }

        if let Some(raw) = lookup("CASEFLOW_LEAD_TIME_DAYS") {
            let days = parse_number("CASEFLOW_LEAD_TIME_DAYS", &raw)?;
            for lead in config.lead_time_days.values_mut() {
                *lead = days;
            }
        }

        if let Some(raw) = lookup("CASEFLOW_RCA_REVIEW_GATE") {
            config.rca_review_gate = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<CaseKind>().map_err(|e| ConfigError::InvalidValue {
                        field: "CASEFLOW_RCA_REVIEW_GATE".to_string(),
                        value: s.to_string(),
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject durations outside `1..=MAX` and a zero sequence width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "sla_warning_hours",
            self.sla_warning_hours,
            MAX_SLA_WARNING_HOURS,
        )?;

        for kind in CaseKind::ALL {
            match self.lead_time_days.get(kind) {
                None => {
                    return Err(ConfigError::MissingRequired {
                        field: format!("lead_time_days.{}", kind),
                    })
                }
                Some(days) => {
                    check_range(&format!("lead_time_days.{}", kind), *days, MAX_LEAD_TIME_DAYS)?
                }
            }
        }

        if self.sequence_width == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sequence_width".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Warning window as a duration. Fails on an out-of-range value, which
    /// only an unvalidated config can hold.
    pub fn sla_warning_window(&self) -> Result<Duration, ConfigError> {
        check_range(
            "sla_warning_hours",
            self.sla_warning_hours,
            MAX_SLA_WARNING_HOURS,
        )?;
        Duration::try_hours(self.sla_warning_hours)
            .ok_or_else(|| out_of_range("sla_warning_hours", self.sla_warning_hours, MAX_SLA_WARNING_HOURS))
    }

    /// Due date lead for `kind`, falling back to the default lead.
    pub fn lead_time(&self, kind: CaseKind) -> Result<Duration, ConfigError> {
        let field = format!("lead_time_days.{}", kind);
        let days = self
            .lead_time_days
            .get(&kind)
            .copied()
            .unwrap_or(DEFAULT_LEAD_TIME_DAYS);
        check_range(&field, days, MAX_LEAD_TIME_DAYS)?;
        Duration::try_days(days).ok_or_else(|| out_of_range(&field, days, MAX_LEAD_TIME_DAYS))
    }

    pub fn requires_rca_review(&self, kind: CaseKind) -> bool {
        self.rca_review_gate.contains(&kind)
    }

    pub fn with_rca_review(mut self, kind: CaseKind) -> Self {
        self.rca_review_gate.insert(kind);
        self
    }
}

fn out_of_range(field: &str, value: i64, max: i64) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("must be between 1 and {}", max),
    }
}

fn check_range(field: &str, value: i64, max: i64) -> Result<(), ConfigError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(field, value, max))
    }
}

fn parse_number(field: &str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason: "expected an integer".to_string(),
    })
}
