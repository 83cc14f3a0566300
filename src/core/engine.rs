use super::types::{
    Expense, GrowthInputs, HorizonAmount, InvestmentProjection, LongTermProjection,
    SavingsOutlook, SavingsPlan, SavingsResult, YearlyBalance,
};

const MONTHS_PER_YEAR: u32 = 12;

pub const SAVINGS_MILESTONE_YEARS: [u32; 9] = [1, 2, 3, 5, 10, 15, 20, 25, 30];
pub const LONG_TERM_SAVINGS_YEARS: [u32; 6] = [1, 2, 5, 10, 20, 30];
pub const LONG_TERM_INVESTMENT_YEARS: [u32; 4] = [5, 10, 20, 30];
pub const LONG_TERM_RETURN_PERCENT: f64 = 7.0;

pub fn compute_savings(income: f64, expenses: &[Expense]) -> SavingsResult {
    let total_expenses = total_expenses(expenses);
    let savings = income - total_expenses;
    SavingsResult {
        total_expenses,
        savings,
        savings_rate_percent: percent_of(savings, income),
    }
}

pub fn total_expenses(expenses: &[Expense]) -> f64 {
    expenses
        .iter()
        .map(|expense| sanitize_amount(expense.amount))
        .sum()
}

pub fn savings_outlook(monthly_savings: f64) -> SavingsOutlook {
    SavingsOutlook {
        monthly: monthly_savings,
        yearly: accumulated_savings(monthly_savings, 1),
        five_year: accumulated_savings(monthly_savings, 5),
        ten_year: accumulated_savings(monthly_savings, 10),
    }
}

pub fn accumulated_savings(monthly_savings: f64, years: u32) -> f64 {
    monthly_savings * f64::from(MONTHS_PER_YEAR) * f64::from(years)
}

pub fn savings_trend(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

// Runs one step per month and keeps one entry per year; callers bound the horizon.
pub fn project_growth(inputs: GrowthInputs) -> InvestmentProjection {
    let monthly_rate = monthly_rate(inputs.annual_return_percent);

    let mut balance = inputs.initial_amount;
    let yearly_amounts: Vec<YearlyBalance> = (1..=inputs.horizon_years)
        .map(|year| {
            for _ in 0..MONTHS_PER_YEAR {
                balance = compound_step(balance, monthly_rate, inputs.monthly_contribution);
            }
            YearlyBalance { year, balance }
        })
        .collect();

    let total_months = f64::from(inputs.horizon_years) * f64::from(MONTHS_PER_YEAR);
    let total_contributions = inputs.initial_amount + inputs.monthly_contribution * total_months;
    InvestmentProjection {
        final_amount: balance,
        total_contributions,
        total_interest: balance - total_contributions,
        yearly_amounts,
    }
}

pub fn savings_plan(monthly_savings: f64, years: u32) -> SavingsPlan {
    SavingsPlan {
        years,
        total_savings: accumulated_savings(monthly_savings, years),
        milestones: SAVINGS_MILESTONE_YEARS
            .iter()
            .copied()
            .filter(|&milestone| milestone <= years)
            .map(|milestone| HorizonAmount {
                years: milestone,
                amount: accumulated_savings(monthly_savings, milestone),
            })
            .collect(),
    }
}

pub fn long_term_projection(monthly_savings: f64) -> LongTermProjection {
    LongTermProjection {
        annual_return_percent: LONG_TERM_RETURN_PERCENT,
        savings: LONG_TERM_SAVINGS_YEARS
            .iter()
            .map(|&years| HorizonAmount {
                years,
                amount: accumulated_savings(monthly_savings, years),
            })
            .collect(),
        invested: LONG_TERM_INVESTMENT_YEARS
            .iter()
            .map(|&years| HorizonAmount {
                years,
                amount: compounded_balance(
                    0.0,
                    monthly_savings,
                    LONG_TERM_RETURN_PERCENT,
                    years * MONTHS_PER_YEAR,
                ),
            })
            .collect(),
    }
}

pub fn compounded_balance(
    seed: f64,
    monthly_contribution: f64,
    annual_return_percent: f64,
    months: u32,
) -> f64 {
    let monthly_rate = monthly_rate(annual_return_percent);
    (0..months).fold(seed, |balance, _| {
        compound_step(balance, monthly_rate, monthly_contribution)
    })
}

pub(crate) fn monthly_rate(annual_return_percent: f64) -> f64 {
    annual_return_percent / 100.0 / 12.0
}

pub(crate) fn compound_step(balance: f64, monthly_rate: f64, contribution: f64) -> f64 {
    balance * (1.0 + monthly_rate) + contribution
}

pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() { amount } else { 0.0 }
}
