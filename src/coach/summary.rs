//! Coach summary: strategy, pattern, timing and projected impact

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::loan::{ExtraPayment, ExtraPaymentBucket, LoanTerms, PrepaymentStrategy};
use crate::money::{normalize_money, round_money};
use crate::scenario::ScenarioRunner;
use crate::schedule::ScheduleResult;
use super::tips::{prepayment_tips, ExtraTier, InterestPhase, PrepaymentTip};

/// When the user should act on a planned lump sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimingAdvice {
    /// A large extra is scheduled late; pay it as early as possible
    Asap,
    /// The current plan is already front-loaded enough
    KeepPlan,
}

/// Shape of the user's extra-payment habits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentPattern {
    /// No positive extras at all
    None,
    /// At least one extra of 2x the monthly payment or more
    LumpSum,
    /// Extras spread over consecutive-ish months
    Recurring,
    /// Both lump-sum and recurring behavior present
    Mixed,
}

/// Aggregated coaching recommendation derived from the tip set and the
/// user's actual extra-payment list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachSummary {
    /// Top recommended months, best first (at most 3)
    pub best_months: Vec<u32>,

    pub recommended_strategy: PrepaymentStrategy,

    /// Mean of the tips' suggested extras
    pub recommended_extra: f64,

    /// Tier of the recommended extra relative to the monthly payment
    pub recommended_tier: ExtraTier,

    /// Phase of the schedule's first month
    pub current_phase: InterestPhase,

    /// Months cut if the recommended extra were paid every month
    pub projected_months_cut: u32,

    /// Interest saved under the same uniform projection
    pub projected_interest_saved: f64,

    pub timing_advice: TimingAdvice,
    pub payment_pattern: PaymentPattern,

    /// True when a single extra exceeds 3x the monthly payment
    pub budget_risk: bool,
}

/// Derives tips and the coach summary for one set of loan terms
#[derive(Debug, Clone)]
pub struct CoachEngine {
    terms: LoanTerms,
}

impl CoachEngine {
    pub fn new(terms: LoanTerms) -> Self {
        Self { terms }
    }

    /// Ranked candidate months for the given baseline schedule
    pub fn prepayment_tips(&self, baseline: &ScheduleResult, limit: usize) -> Vec<PrepaymentTip> {
        prepayment_tips(baseline, self.terms.monthly_rate(), limit)
    }

    /// Build the coach summary, or `None` when there is nothing to coach on
    /// (no baseline rows or no tips).
    pub fn summary(
        &self,
        tips: &[PrepaymentTip],
        baseline: &ScheduleResult,
        extras: &[ExtraPayment],
        payment_used: f64,
    ) -> Option<CoachSummary> {
        if baseline.rows.is_empty() || tips.is_empty() {
            return None;
        }

        let recommended_strategy = recommend_strategy(extras);
        let recommended_extra =
            round_money(tips.iter().map(|tip| tip.suggested_extra).sum::<f64>() / tips.len() as f64);

        let extra_pct_of_payment = if payment_used > 0.0 {
            recommended_extra / payment_used * 100.0
        } else {
            0.0
        };
        let recommended_tier = ExtraTier::from_pct_of_payment(extra_pct_of_payment);

        let first_row = &baseline.rows[0];
        let current_share = if first_row.base_payment > 0.0 {
            first_row.interest_paid / first_row.base_payment * 100.0
        } else {
            0.0
        };
        let current_phase = InterestPhase::from_share_pct(current_share);

        let (projected_months_cut, projected_interest_saved) =
            self.estimate_recurring_impact(baseline, recommended_extra, recommended_strategy);

        Some(CoachSummary {
            best_months: tips.iter().take(3).map(|tip| tip.month).collect(),
            recommended_strategy,
            recommended_extra,
            recommended_tier,
            current_phase,
            projected_months_cut,
            projected_interest_saved,
            timing_advice: timing_advice(extras, payment_used),
            payment_pattern: payment_pattern(extras, payment_used),
            budget_risk: has_budget_risk(extras, payment_used),
        })
    }

    /// Projected impact of paying `extra` in every month, estimated by
    /// re-running the schedule builder under a synthetic uniform scenario.
    /// Failures yield zero impact; the projection is advisory.
    fn estimate_recurring_impact(
        &self,
        baseline: &ScheduleResult,
        extra: f64,
        strategy: PrepaymentStrategy,
    ) -> (u32, f64) {
        if extra <= 0.0 {
            return (0, 0.0);
        }

        let mut scenario_map: HashMap<u32, ExtraPaymentBucket> = HashMap::new();
        for month in 1..=baseline.summary.months {
            let bucket = match strategy {
                PrepaymentStrategy::ReducePayment => ExtraPaymentBucket {
                    reduce_time: 0.0,
                    reduce_payment: extra,
                },
                PrepaymentStrategy::ReduceTime => ExtraPaymentBucket {
                    reduce_time: extra,
                    reduce_payment: 0.0,
                },
            };
            scenario_map.insert(month, bucket);
        }

        match ScenarioRunner::new(self.terms.clone()).run_with_map(&scenario_map) {
            Ok(scenario) => (
                baseline.summary.months.saturating_sub(scenario.summary.months),
                round_money(
                    (baseline.summary.total_interest - scenario.summary.total_interest).max(0.0),
                ),
            ),
            Err(err) => {
                log::debug!("uniform-extra projection failed, reporting zero impact: {err}");
                (0, 0.0)
            }
        }
    }
}

fn positive_extras(extras: &[ExtraPayment]) -> Vec<&ExtraPayment> {
    extras
        .iter()
        .filter(|item| normalize_money(item.amount) > 0.0)
        .collect()
}

/// Recurring means at least 3 distinct months where 60% or more of the
/// consecutive gaps are a month or less
fn is_recurring_pattern(extras: &[&ExtraPayment]) -> bool {
    let months: BTreeSet<u32> = extras.iter().map(|item| item.month.max(1)).collect();
    if months.len() < 3 {
        return false;
    }

    let months: Vec<u32> = months.into_iter().collect();
    let links = months.windows(2).filter(|pair| pair[1] - pair[0] <= 1).count();
    links as f64 >= ((months.len() - 1) as f64 * 0.6).ceil()
}

fn recommend_strategy(extras: &[ExtraPayment]) -> PrepaymentStrategy {
    let positive = positive_extras(extras);
    if positive.is_empty() {
        return PrepaymentStrategy::ReduceTime;
    }

    // A recurring habit is best spent shortening the term
    if is_recurring_pattern(&positive) {
        return PrepaymentStrategy::ReduceTime;
    }

    let reduce_payment_count = positive
        .iter()
        .filter(|item| item.strategy == PrepaymentStrategy::ReducePayment)
        .count();
    let reduce_time_count = positive.len() - reduce_payment_count;

    if reduce_payment_count > reduce_time_count {
        PrepaymentStrategy::ReducePayment
    } else {
        PrepaymentStrategy::ReduceTime
    }
}

fn payment_pattern(extras: &[ExtraPayment], payment_used: f64) -> PaymentPattern {
    let positive = positive_extras(extras);
    if positive.is_empty() {
        return PaymentPattern::None;
    }

    let has_lump_sum = positive
        .iter()
        .any(|item| normalize_money(item.amount) >= payment_used * 2.0);
    let recurring = is_recurring_pattern(&positive);

    if has_lump_sum && recurring {
        PaymentPattern::Mixed
    } else if has_lump_sum {
        PaymentPattern::LumpSum
    } else if recurring || positive.len() > 1 {
        PaymentPattern::Recurring
    } else {
        PaymentPattern::None
    }
}

fn timing_advice(extras: &[ExtraPayment], payment_used: f64) -> TimingAdvice {
    let has_future_lump_sum = extras.iter().any(|item| {
        normalize_money(item.amount) >= payment_used * 2.0 && item.month.max(1) > 1
    });

    if has_future_lump_sum {
        TimingAdvice::Asap
    } else {
        TimingAdvice::KeepPlan
    }
}

fn has_budget_risk(extras: &[ExtraPayment], payment_used: f64) -> bool {
    extras
        .iter()
        .any(|item| normalize_money(item.amount) > payment_used * 3.0)
}
