//! Emit a full scenario + coaching report as JSON
//!
//! Intended for API integration: prints a single JSON document to stdout.
//! Accepts config via environment variables:
//!   LOAN_AMOUNT, ANNUAL_RATE, TERM_MONTHS, FIRST_PAYMENT_DATE,
//!   COMMISSION_MODE, COMMISSION_RATE, FIXED_COMMISSION, STATE_PATH, TIP_LIMIT
//! Pass --pretty for indented output.

use std::env;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;

use mortgage_os::chart::{payment_mix_by_year, PaymentMixBar, PAYMENT_MIX_MAX_BARS};
use mortgage_os::coach::{CoachEngine, CoachSummary, PrepaymentTip};
use mortgage_os::loan::{CommissionMode, StateStore};
use mortgage_os::scenario::{SavingsSummary, ScenarioRunner};
use mortgage_os::schedule::{AmortizationRow, ScheduleSummary};

#[derive(Serialize)]
struct LoanParamsOutput {
    loan_amount: f64,
    annual_rate_pct: f64,
    term_months: u32,
    first_payment_date: NaiveDate,
    commission_mode: &'static str,
    commission_rate_pct: f64,
    fixed_commission: f64,
}

#[derive(Serialize)]
struct CoachReport {
    params: LoanParamsOutput,
    payment_used: f64,
    baseline_summary: ScheduleSummary,
    planned_summary: ScheduleSummary,
    savings: SavingsSummary,
    completion_date: Option<NaiveDate>,
    planned_rows: Vec<AmortizationRow>,
    payment_mix: Vec<PaymentMixBar>,
    tips: Vec<PrepaymentTip>,
    coach_summary: Option<CoachSummary>,
    execution_time_ms: u64,
}

#[derive(Serialize)]
struct ErrorReport {
    error: String,
}

fn env_f64(name: &str) -> Option<f64> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}

fn main() {
    env_logger::init();

    let pretty = env::args().any(|arg| arg == "--pretty");
    let start = Instant::now();

    // Persisted record (optional) as the base layer, env vars on top
    let mut state = match env::var("STATE_PATH") {
        Ok(path) => StateStore::new(path).load(),
        Err(_) => Default::default(),
    };

    if let Some(amount) = env_f64("LOAN_AMOUNT") {
        state.loan_amount = amount;
    }
    if let Some(rate) = env_f64("ANNUAL_RATE") {
        state.annual_interest_rate = rate;
    }
    if let Some(term) = env::var("TERM_MONTHS").ok().and_then(|value| value.parse().ok()) {
        state.loan_term_months = term;
    }
    if let Some(date) = env::var("FIRST_PAYMENT_DATE").ok().and_then(|value| value.parse().ok()) {
        state.first_payment_date = date;
    }
    if let Some(mode) = env::var("COMMISSION_MODE").ok().and_then(|value| CommissionMode::parse(&value)) {
        state.commission_mode = mode;
    }
    if let Some(rate) = env_f64("COMMISSION_RATE") {
        state.commission_rate = rate;
    }
    if let Some(fixed) = env_f64("FIXED_COMMISSION") {
        state.fixed_commission = fixed;
    }

    let tip_limit: usize = env::var("TIP_LIMIT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(4);

    let terms = state.loan_terms();
    let extras = state.extra_payments();

    let runner = ScenarioRunner::new(terms.clone());
    let outcome = match runner.run(&extras) {
        Ok(outcome) => outcome,
        Err(err) => {
            let report = ErrorReport { error: err.to_string() };
            println!("{}", serde_json::to_string(&report).expect("error report serializes"));
            std::process::exit(1);
        }
    };

    let coach = CoachEngine::new(terms.clone());
    let tips = coach.prepayment_tips(&outcome.baseline, tip_limit);
    let coach_summary = coach.summary(&tips, &outcome.baseline, &extras, outcome.payment_used);
    let payment_mix = payment_mix_by_year(&outcome.planned.rows, terms.principal, PAYMENT_MIX_MAX_BARS);

    let report = CoachReport {
        params: LoanParamsOutput {
            loan_amount: terms.principal,
            annual_rate_pct: terms.annual_rate_pct,
            term_months: terms.term_months,
            first_payment_date: terms.first_payment_date,
            commission_mode: terms.commission.mode.as_str(),
            commission_rate_pct: terms.commission.rate_pct,
            fixed_commission: terms.commission.fixed_amount,
        },
        payment_used: outcome.payment_used,
        baseline_summary: outcome.baseline.summary,
        planned_summary: outcome.planned.summary,
        savings: outcome.savings,
        completion_date: outcome.completion_date(),
        planned_rows: outcome.planned.rows,
        payment_mix,
        tips,
        coach_summary,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };

    println!("{}", json.expect("report serializes"));
}
