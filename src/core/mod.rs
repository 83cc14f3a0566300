mod engine;
mod goals;
mod types;

pub use engine::{
    LONG_TERM_INVESTMENT_YEARS, LONG_TERM_RETURN_PERCENT, LONG_TERM_SAVINGS_YEARS,
    SAVINGS_MILESTONE_YEARS, accumulated_savings, compounded_balance, compute_savings,
    long_term_projection, project_growth, savings_outlook, savings_plan, savings_trend,
    total_expenses,
};
pub use goals::{
    DEFAULT_COMPARISON_HORIZONS, MAX_SIMULATION_MONTHS, MILESTONE_PERCENTS, comparison_series,
    effective_target, goal_progress, milestone_series, months_saved_by_investing, plan_timeline,
    time_to_target,
};
pub use types::{
    BudgetHistoryEntry, ComparisonPoint, Expense, GoalCategory, GoalPlan, GoalProgress,
    GrowthInputs, HorizonAmount, IncomeExpenseSnapshot, InvestmentProjection,
    LongTermProjection, Milestone, PlanTimeline, SavingsOutlook, SavingsPlan, SavingsResult,
    TimeToGoal, YearlyBalance,
};
