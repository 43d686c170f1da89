//! Scenario runner: baseline vs planned schedules and the savings between them
//!
//! Builds the engine configuration once from the loan terms, then runs the
//! schedule builder twice — without extras (baseline) and with the user's
//! extras bucketed by month (planned) — and annotates the planned rows with
//! cumulative interest saved against the baseline.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::loan::{build_extra_map, ExtraPayment, ExtraPaymentBucket, LoanTerms};
use crate::money::round_money;
use crate::schedule::{
    monthly_payment, ScheduleConfig, ScheduleEngine, ScheduleError, ScheduleResult,
    MAX_SCHEDULE_MONTHS,
};

/// Aggregate savings of the planned schedule vs the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsSummary {
    /// Baseline total interest minus planned total interest
    pub interest_saved: f64,

    /// Baseline total commission minus planned total commission
    pub commission_saved: f64,

    /// Interest and commission savings combined
    pub total_saved: f64,

    /// Months cut off the baseline term (floored at 0)
    pub months_reduced: u32,
}

/// Result of one baseline-vs-planned run
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    /// Schedule with no extras applied
    pub baseline: ScheduleResult,

    /// Schedule with the user's extras; rows carry `cumulative_interest_saved`
    pub planned: ScheduleResult,

    /// Top-level savings metrics
    pub savings: SavingsSummary,

    /// Scheduled monthly payment both schedules start from
    pub payment_used: f64,
}

impl ScenarioOutcome {
    /// Due date of the last planned installment
    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.planned.payoff_date()
    }

    /// Interest still to be paid under the plan
    pub fn total_interest_to_pay(&self) -> f64 {
        self.planned.summary.total_interest
    }
}

/// Runs baseline and planned schedules for one set of loan terms
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    terms: LoanTerms,
}

impl ScenarioRunner {
    /// Create a runner for the given terms
    pub fn new(terms: LoanTerms) -> Self {
        Self { terms }
    }

    /// The loan terms this runner was built from
    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// Scheduled monthly payment derived from the terms
    pub fn payment(&self) -> f64 {
        monthly_payment(self.terms.principal, self.terms.monthly_rate(), self.terms.term_months)
    }

    /// Validate the terms and assemble a schedule engine
    fn engine(&self) -> Result<ScheduleEngine, ScheduleError> {
        if self.terms.principal <= 0.0 {
            return Err(ScheduleError::InvalidInput("loan amount"));
        }

        let payment = self.payment();
        if payment <= 0.0 {
            return Err(ScheduleError::InvalidInput("monthly payment"));
        }

        Ok(ScheduleEngine::new(ScheduleConfig {
            principal: self.terms.principal,
            monthly_rate: self.terms.monthly_rate(),
            monthly_payment: payment,
            initial_term_months: self.terms.term_months,
            first_due_date: self.terms.first_payment_date,
            commission: self.terms.commission,
            max_months: MAX_SCHEDULE_MONTHS,
        }))
    }

    /// Run the baseline schedule only (no extras)
    pub fn baseline(&self) -> Result<ScheduleResult, ScheduleError> {
        self.engine()?.build(&HashMap::new())
    }

    /// Run a schedule against an explicit month -> bucket map.
    ///
    /// Used by the coach's synthetic uniform-extra projection; normal callers
    /// go through [`run`](Self::run).
    pub fn run_with_map(
        &self,
        extras: &HashMap<u32, ExtraPaymentBucket>,
    ) -> Result<ScheduleResult, ScheduleError> {
        self.engine()?.build(extras)
    }

    /// Run baseline and planned schedules and derive the savings metrics
    pub fn run(&self, extras: &[ExtraPayment]) -> Result<ScenarioOutcome, ScheduleError> {
        let engine = self.engine()?;

        let baseline = engine.build(&HashMap::new())?;
        let mut planned = engine.build(&build_extra_map(extras))?;

        // Annotate each planned row with interest saved vs the baseline row
        // of the same month. Months past the baseline's end (possible only
        // if a plan stretches the schedule) compare against the baseline's
        // full interest, i.e. "already fully paid off" savings.
        let baseline_cumulative: HashMap<u32, f64> = baseline
            .rows
            .iter()
            .map(|row| (row.month, row.cumulative_interest))
            .collect();

        for row in &mut planned.rows {
            let reference = baseline_cumulative
                .get(&row.month)
                .copied()
                .unwrap_or(baseline.summary.total_interest);
            row.cumulative_interest_saved = round_money(reference - row.cumulative_interest);
        }

        let interest_saved =
            round_money(baseline.summary.total_interest - planned.summary.total_interest);
        let commission_saved =
            round_money(baseline.summary.total_commission - planned.summary.total_commission);
        let savings = SavingsSummary {
            interest_saved,
            commission_saved,
            total_saved: round_money(interest_saved + commission_saved),
            months_reduced: baseline.summary.months.saturating_sub(planned.summary.months),
        };

        log::debug!(
            "scenario: baseline {} months, planned {} months, saved {:.2}",
            baseline.summary.months,
            planned.summary.months,
            savings.total_saved
        );

        Ok(ScenarioOutcome {
            baseline,
            planned,
            savings,
            payment_used: self.payment(),
        })
    }
}
