//! Prepayment tip generation from a baseline schedule

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::round_money;
use crate::schedule::ScheduleResult;

/// Where a month sits on the interest/principal split of its payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterestPhase {
    /// Interest share above 60% of the payment
    InterestHeavy,
    /// Interest share between 30% and 60%
    Balanced,
    /// Interest share below 30%
    PrincipalHeavy,
}

impl InterestPhase {
    /// Classify from the interest share of a month's payment, in percent
    pub fn from_share_pct(share_pct: f64) -> Self {
        if share_pct > 60.0 {
            InterestPhase::InterestHeavy
        } else if share_pct >= 30.0 {
            InterestPhase::Balanced
        } else {
            InterestPhase::PrincipalHeavy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestPhase::InterestHeavy => "interest-heavy",
            InterestPhase::Balanced => "balanced",
            InterestPhase::PrincipalHeavy => "principal-heavy",
        }
    }
}

/// Size class of an extra amount, as a share of the monthly payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtraTier {
    /// Below 5% of the payment
    Small,
    /// 5% to 20%
    Meaningful,
    /// Above 20%
    Aggressive,
}

impl ExtraTier {
    /// Classify an extra amount expressed as a percentage of the payment
    pub fn from_pct_of_payment(pct: f64) -> Self {
        if pct < 5.0 {
            ExtraTier::Small
        } else if pct <= 20.0 {
            ExtraTier::Meaningful
        } else {
            ExtraTier::Aggressive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraTier::Small => "small",
            ExtraTier::Meaningful => "meaningful",
            ExtraTier::Aggressive => "aggressive",
        }
    }
}

/// A candidate month for an extra payment, with the suggested amount and a
/// first-order estimate of the interest it would save
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepaymentTip {
    pub month: u32,
    pub due_date: NaiveDate,

    /// Interest cost of this month in the baseline schedule
    pub interest_paid: f64,

    /// Interest share of the month's payment, in percent
    pub interest_share_pct: f64,

    /// Suggested extra amount for this month
    pub suggested_extra: f64,

    /// Rough interest saving if the suggestion is followed.
    /// First-order approximation, not a re-simulation.
    pub estimated_interest_saved: f64,

    pub tier: ExtraTier,
    pub phase: InterestPhase,

    /// Human-readable rationale for ranking this month
    pub reason: String,
}

/// Floor for suggested extra amounts
const MIN_SUGGESTED_EXTRA: f64 = 100.0;

/// Rotating rationale templates, keyed by tip rank
const REASON_TEMPLATES: [&str; 4] = [
    "High interest share this month, so extra payment is very effective.",
    "Remaining balance is still high here, so prepayment impact is strong.",
    "Interest cost is among the highest in this period.",
    "Paying extra now reduces future interest-heavy months.",
];

/// Extra-to-payment ratio suggested for a month with the given interest share
fn suggested_extra_ratio(share_pct: f64) -> f64 {
    if share_pct > 60.0 {
        0.24
    } else if share_pct >= 30.0 {
        0.12
    } else {
        0.04
    }
}

fn reason_for(rank: usize, phase: InterestPhase, tier: ExtraTier, share_pct: f64) -> String {
    let template = REASON_TEMPLATES[rank % REASON_TEMPLATES.len()];
    format!(
        "{} ({}, {}, interest share: {:.1}%)",
        template,
        phase.as_str(),
        tier.as_str(),
        share_pct
    )
}

/// Rank baseline months by interest exposure and produce up to `limit` tips.
///
/// The score rewards months with both a high current interest cost and a
/// high remaining balance; ties break toward the earlier month. Returns an
/// empty list when there is no baseline schedule to work from.
pub fn prepayment_tips(
    baseline: &ScheduleResult,
    monthly_rate: f64,
    limit: usize,
) -> Vec<PrepaymentTip> {
    if baseline.rows.is_empty() {
        return Vec::new();
    }

    let max_month = baseline.summary.months;

    let mut candidates: Vec<(f64, PrepaymentTip)> = baseline
        .rows
        .iter()
        .map(|row| {
            let share_pct = if row.base_payment > 0.0 {
                row.interest_paid / row.base_payment * 100.0
            } else {
                0.0
            };
            let phase = InterestPhase::from_share_pct(share_pct);
            let ratio = suggested_extra_ratio(share_pct);
            let suggested_extra = round_money((row.base_payment * ratio).max(MIN_SUGGESTED_EXTRA));
            let tier = ExtraTier::from_pct_of_payment(ratio * 100.0);

            let months_remaining = max_month.saturating_sub(row.month) + 1;
            let estimated_interest_saved =
                round_money(suggested_extra * monthly_rate * months_remaining as f64);

            let score = row.interest_paid + row.starting_balance * monthly_rate;

            let tip = PrepaymentTip {
                month: row.month,
                due_date: row.due_date,
                interest_paid: row.interest_paid,
                interest_share_pct: share_pct,
                suggested_extra,
                estimated_interest_saved,
                tier,
                phase,
                reason: String::new(),
            };
            (score, tip)
        })
        .collect();

    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.month.cmp(&b.1.month)));

    candidates
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(rank, (_score, mut tip))| {
            tip.reason = reason_for(rank, tip.phase, tip.tier, tip.interest_share_pct);
            tip
        })
        .collect()
}
