use super::engine::{compound_step, compounded_balance, monthly_rate, percent_of};
use super::types::{
    ComparisonPoint, GoalCategory, GoalPlan, GoalProgress, Milestone, PlanTimeline, TimeToGoal,
};

// 100 years of monthly steps.
pub const MAX_SIMULATION_MONTHS: u32 = 1_200;

pub const MILESTONE_PERCENTS: [u8; 4] = [25, 50, 75, 100];

pub const DEFAULT_COMPARISON_HORIZONS: [u32; 6] = [1, 3, 5, 10, 15, 20];

pub fn effective_target(plan: &GoalPlan) -> f64 {
    match plan.category {
        GoalCategory::House => plan.target_amount * (plan.down_payment_percent / 100.0),
        GoalCategory::Car | GoalCategory::Education | GoalCategory::Other => plan.target_amount,
    }
}

pub fn goal_progress(plan: &GoalPlan) -> GoalProgress {
    let effective_target = effective_target(plan);
    GoalProgress {
        effective_target,
        remaining: effective_target - plan.current_savings,
        progress_percent: percent_of(plan.current_savings, effective_target).min(100.0),
    }
}

pub fn time_to_target(plan: &GoalPlan, with_return: bool) -> TimeToGoal {
    months_to_amount(plan, effective_target(plan), with_return)
}

fn months_to_amount(plan: &GoalPlan, target: f64, with_return: bool) -> TimeToGoal {
    let remaining = target - plan.current_savings;
    if remaining <= 0.0 {
        return TimeToGoal::Reachable { months: 0 };
    }
    if plan.monthly_contribution <= 0.0 {
        return TimeToGoal::Unreachable;
    }

    if !with_return {
        let months = (remaining / plan.monthly_contribution).ceil();
        if !months.is_finite() || months > f64::from(u32::MAX) {
            return TimeToGoal::Unreachable;
        }
        return TimeToGoal::Reachable {
            months: months as u32,
        };
    }

    let rate = monthly_rate(plan.annual_return_percent);
    let mut accumulated = plan.current_savings;
    let mut months = 0;
    while accumulated < target && months < MAX_SIMULATION_MONTHS {
        accumulated = compound_step(accumulated, rate, plan.monthly_contribution);
        months += 1;
    }

    if accumulated >= target {
        TimeToGoal::Reachable { months }
    } else {
        TimeToGoal::Unreachable
    }
}

pub fn months_saved_by_investing(plan: &GoalPlan) -> Option<u32> {
    let without = time_to_target(plan, false).months()?;
    let with = time_to_target(plan, true).months()?;
    without.checked_sub(with).filter(|saved| *saved > 0)
}

pub fn milestone_series(plan: &GoalPlan) -> Vec<Milestone> {
    let effective_target = effective_target(plan);
    let progress_percent = percent_of(plan.current_savings, effective_target);

    MILESTONE_PERCENTS
        .iter()
        .map(|&percent| {
            let amount_at_percent = effective_target * (f64::from(percent) / 100.0);
            let reached = progress_percent >= f64::from(percent);
            let months_to_reach = if reached {
                TimeToGoal::Reachable { months: 0 }
            } else {
                months_to_amount(plan, amount_at_percent, true)
            };
            Milestone {
                percent,
                amount_at_percent,
                reached,
                months_to_reach,
            }
        })
        .collect()
}

pub fn comparison_series(plan: &GoalPlan, horizons_years: &[u32]) -> Vec<ComparisonPoint> {
    horizons_years
        .iter()
        .map(|&years| {
            let months = years.saturating_mul(12);
            let linear_amount =
                plan.current_savings + plan.monthly_contribution * f64::from(months);
            let compounded_amount = compounded_balance(
                plan.current_savings,
                plan.monthly_contribution,
                plan.annual_return_percent,
                months,
            );
            let difference = compounded_amount - linear_amount;
            ComparisonPoint {
                years,
                linear_amount,
                compounded_amount,
                difference,
                percentage_gain: percent_of(difference, linear_amount),
            }
        })
        .collect()
}

pub fn plan_timeline(plan: &GoalPlan) -> PlanTimeline {
    PlanTimeline {
        progress: goal_progress(plan),
        without_return: time_to_target(plan, false),
        with_return: time_to_target(plan, true),
        months_saved_by_investing: months_saved_by_investing(plan),
        milestones: milestone_series(plan),
        comparison: comparison_series(plan, &DEFAULT_COMPARISON_HORIZONS),
    }
}
