//! MortgageOS CLI
//!
//! Runs a loan scenario (baseline vs planned extras), prints the repayment
//! schedule with savings and coach output, and optionally exports the full
//! planned schedule to CSV.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use mortgage_os::chart::{payment_mix_by_year, PAYMENT_MIX_MAX_BARS};
use mortgage_os::coach::{CoachEngine, CoachSession};
use mortgage_os::loan::{
    CommissionMode, ExtraPayment, PersistedExtraPayment, PrepaymentStrategy, StateStore,
};
use mortgage_os::scenario::ScenarioRunner;

#[derive(Parser, Debug)]
#[command(name = "mortgage_os", about = "Amortization schedule and prepayment coaching")]
struct Cli {
    /// Loan amount
    #[arg(long)]
    amount: Option<f64>,

    /// Annual interest rate (%)
    #[arg(long)]
    rate: Option<f64>,

    /// Term in months
    #[arg(long)]
    term: Option<u32>,

    /// First payment date (YYYY-MM-DD)
    #[arg(long)]
    first_payment: Option<NaiveDate>,

    /// Commission type: none | interestRate | balanceRate | fixed
    #[arg(long)]
    commission_mode: Option<String>,

    /// Commission rate (%)
    #[arg(long)]
    commission_rate: Option<f64>,

    /// Fixed monthly commission
    #[arg(long)]
    fixed_commission: Option<f64>,

    /// Extra payment as month:amount[:reduceTime|reducePayment]; repeatable.
    /// Replaces the persisted extra list when given.
    #[arg(long = "extra")]
    extras: Vec<String>,

    /// State file to load defaults from and save back to
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write the full planned schedule to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Number of coach tips to generate
    #[arg(long, default_value_t = 4)]
    tips: usize,
}

fn parse_extra(raw: &str, id: u32) -> anyhow::Result<ExtraPayment> {
    let mut parts = raw.splitn(3, ':');
    let month: u32 = parts
        .next()
        .context("missing month")?
        .parse()
        .context("extra payment month must be an integer")?;
    let amount: f64 = parts
        .next()
        .context("missing amount")?
        .parse()
        .context("extra payment amount must be a number")?;
    let strategy = match parts.next() {
        Some(value) => PrepaymentStrategy::parse(value)
            .with_context(|| format!("unknown prepayment strategy: {value}"))?,
        None => PrepaymentStrategy::ReduceTime,
    };

    Ok(ExtraPayment { id, month: month.max(1), amount, strategy })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // Start from the persisted record (or built-in defaults) and layer the
    // command line on top
    let store = cli.state.as_ref().map(|path| StateStore::new(path.clone()));
    let mut state = store.as_ref().map(|s| s.load()).unwrap_or_default();

    if let Some(amount) = cli.amount {
        state.loan_amount = amount;
    }
    if let Some(rate) = cli.rate {
        state.annual_interest_rate = rate;
    }
    if let Some(term) = cli.term {
        state.loan_term_months = term;
    }
    if let Some(date) = cli.first_payment {
        state.first_payment_date = date;
    }
    if let Some(mode) = &cli.commission_mode {
        state.commission_mode = CommissionMode::parse(mode)
            .with_context(|| format!("unknown commission mode: {mode}"))?;
    }
    if let Some(rate) = cli.commission_rate {
        state.commission_rate = rate;
    }
    if let Some(fixed) = cli.fixed_commission {
        state.fixed_commission = fixed;
    }
    if !cli.extras.is_empty() {
        state.extra_payments = cli
            .extras
            .iter()
            .enumerate()
            .map(|(index, raw)| parse_extra(raw, index as u32 + 1))
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .map(|extra| PersistedExtraPayment {
                id: extra.id,
                month: extra.month,
                amount: extra.amount,
                strategy: Some(extra.strategy),
            })
            .collect();
    }

    let terms = state.loan_terms();
    let extras = state.extra_payments();

    println!("MortgageOS v0.1.0");
    println!("=================\n");
    println!("Loan: {:.2} at {:.2}% over {} months", terms.principal, terms.annual_rate_pct, terms.term_months);
    println!("  First payment: {}", terms.first_payment_date);
    println!("  Commission: {} (rate {:.2}%, fixed {:.2})",
        terms.commission.mode.as_str(),
        terms.commission.rate_pct,
        terms.commission.fixed_amount,
    );
    for extra in &extras {
        println!("  Extra: month {} -> {:.2} ({})", extra.month, extra.amount, extra.strategy.as_str());
    }
    println!();

    let runner = ScenarioRunner::new(terms.clone());
    let outcome = runner.run(&extras).context("unable to calculate schedule")?;

    // Print the first 24 planned months to console
    println!("Repayment Schedule ({} months):", outcome.planned.summary.months);
    println!(
        "{:>5} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "Month", "Date", "Payment", "Principal", "Interest", "Extra", "Saved", "End balance"
    );
    println!("{}", "-".repeat(98));
    for row in outcome.planned.rows.iter().take(24) {
        println!(
            "{:>5} {:>12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.month,
            row.due_date.to_string(),
            row.total_payment_due,
            row.principal_paid,
            row.interest_paid,
            row.extra_payment,
            row.cumulative_interest_saved,
            row.ending_balance,
        );
    }
    if outcome.planned.rows.len() > 24 {
        println!("... ({} more months)", outcome.planned.rows.len() - 24);
    }

    println!("\nSummary:");
    println!("  Base payment: {:.2}", outcome.payment_used);
    println!("  Total interest to pay: {:.2}", outcome.total_interest_to_pay());
    println!("  Interest saved: {:.2}", outcome.savings.interest_saved);
    println!("  Commission saved: {:.2}", outcome.savings.commission_saved);
    println!("  Total saved: {:.2}", outcome.savings.total_saved);
    println!("  Months reduced: {}", outcome.savings.months_reduced);
    if let Some(date) = outcome.completion_date() {
        println!("  Payoff date: {date}");
    }

    // Yearly payment mix
    let bars = payment_mix_by_year(&outcome.planned.rows, terms.principal, PAYMENT_MIX_MAX_BARS);
    println!("\nYearly payment mix:");
    for bar in &bars {
        println!(
            "  {}: principal {:>12.2} ({:>5.1}%)  interest {:>11.2} ({:>5.1}%)  extra {:>10.2}",
            bar.year, bar.principal_paid, bar.principal_pct, bar.interest_paid, bar.interest_pct, bar.extra_paid,
        );
    }

    // Coaching: dispatch carries a token; the result is delivered only if no
    // newer request superseded it
    let session = CoachSession::new();
    let token = session.begin();
    let coach = CoachEngine::new(terms.clone());
    let tips = coach.prepayment_tips(&outcome.baseline, cli.tips);
    let summary = coach.summary(&tips, &outcome.baseline, &extras, outcome.payment_used);

    if let Some((tips, summary)) = session.deliver(token, (tips, summary)) {
        println!("\nCoach: best months for extra payment");
        for tip in &tips {
            println!(
                "  Month {:>3} ({}): suggest {:>10.2}, est. saved {:>10.2} [{}]",
                tip.month, tip.due_date, tip.suggested_extra, tip.estimated_interest_saved, tip.reason,
            );
        }

        if let Some(summary) = summary {
            println!("\nCoach summary:");
            println!("  Best months: {:?}", summary.best_months);
            println!("  Strategy: {}", summary.recommended_strategy.as_str());
            println!("  Suggested extra: {:.2} ({})", summary.recommended_extra, summary.recommended_tier.as_str());
            println!("  Current phase: {}", summary.current_phase.as_str());
            println!(
                "  Paying +{:.2}/month cuts ~{} months and saves ~{:.2} interest",
                summary.recommended_extra, summary.projected_months_cut, summary.projected_interest_saved,
            );
            if summary.budget_risk {
                println!("  Warning: an extra payment is above 3x the monthly payment; consider splitting it");
            }
        }
    }

    // Write the full planned schedule as CSV
    if let Some(path) = &cli.csv {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("unable to create CSV file {}", path.display()))?;
        for row in &outcome.planned.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!("\nFull schedule written to: {}", path.display());
    }

    if let Some(store) = &store {
        state.prepayment_strategy = None;
        store.save(&state);
        log::info!("state saved to {}", store.path().display());
    }

    Ok(())
}
