use crate::resource::Machinery;
use crate::task::Task;
use chrono::NaiveDate;
use tracing::debug;

pub const TYPE_MATCH_BONUS: f64 = 2.0;
pub const TYPE_MISMATCH_PENALTY: f64 = -1.0;
pub const MAINTENANCE_BONUS: f64 = 0.5;
pub const AVAILABILITY_BONUS: f64 = 0.5;
pub const MAX_AGE_PENALTY: f64 = 1.0;

const DAYS_PER_YEAR: f64 = 365.0;
const PURCHASE_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_purchase_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), PURCHASE_DATE_FORMAT)
}

/// Machine age in fractional years as of `today`. Negative for purchase
/// dates in the future.
pub fn age_in_years(purchase_date: NaiveDate, today: NaiveDate) -> f64 {
    (today - purchase_date).num_days() as f64 / DAYS_PER_YEAR
}

/// Scores how well `machine` fits `task` as of `today`.
///
/// The terms are additive: type fit, maintenance record, availability and an
/// age penalty capped at [`MAX_AGE_PENALTY`]. A purchase date that does not
/// parse contributes nothing.
pub struct EfficiencyScorer {
    today: NaiveDate,
}

impl EfficiencyScorer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn score(&self, machine: &Machinery, task: &Task) -> f64 {
        let mut efficiency = if machine.machine_type == task.task_type {
            TYPE_MATCH_BONUS
        } else {
            TYPE_MISMATCH_PENALTY
        };

        if machine.has_maintenance_record() {
            efficiency += MAINTENANCE_BONUS;
        }

        if machine.is_available() {
            efficiency += AVAILABILITY_BONUS;
        }

        efficiency - self.age_penalty(machine)
    }

    fn age_penalty(&self, machine: &Machinery) -> f64 {
        let Some(raw) = machine.purchase_date.as_deref() else {
            return 0.0;
        };
        match parse_purchase_date(raw) {
            Ok(purchased) => age_in_years(purchased, self.today).min(MAX_AGE_PENALTY),
            Err(err) => {
                debug!(
                    machine_id = %machine.id,
                    purchase_date = raw,
                    error = %err,
                    "skipping age penalty for unparsable purchase date"
                );
                0.0
            }
        }
    }
}
