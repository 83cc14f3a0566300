use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::{
    BudgetHistoryEntry, Expense, GoalCategory, GoalPlan, IncomeExpenseSnapshot, SavingsResult,
    compute_savings, savings_trend,
};
use crate::store::{Persistence, StoreError, StoreKey};

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("expense name must not be empty")]
    MissingExpenseLabel,
    #[error("plan name must not be empty")]
    MissingPlanName,
    #[error("no expense at position {0}")]
    UnknownExpense(usize),
    #[error("no budget history entry with id {0}")]
    UnknownHistoryEntry(String),
    #[error("no plan with id {0}")]
    UnknownPlan(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoalPlan {
    pub name: String,
    pub category: GoalCategory,
    pub target_amount: f64,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub annual_return_percent: f64,
    pub down_payment_percent: f64,
}

impl NewGoalPlan {
    pub fn into_plan(self, id: String, created_at: DateTime<Utc>) -> GoalPlan {
        GoalPlan {
            id,
            name: self.name,
            category: self.category,
            target_amount: self.target_amount,
            current_savings: self.current_savings,
            monthly_contribution: self.monthly_contribution,
            annual_return_percent: self.annual_return_percent,
            down_payment_percent: self.down_payment_percent,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTrend {
    #[serde(flatten)]
    pub entry: BudgetHistoryEntry,
    pub savings_trend_percent: f64,
}

#[derive(Debug)]
pub struct BudgetState {
    persistence: Persistence,
    snapshot: IncomeExpenseSnapshot,
    history: Vec<BudgetHistoryEntry>,
    plans: Vec<GoalPlan>,
}

impl BudgetState {
    pub fn load(persistence: Persistence) -> Result<Self, StateError> {
        let defaults = IncomeExpenseSnapshot::default();
        let income = load_or_default(&persistence, StoreKey::CurrentIncome, defaults.income)?;
        let expenses =
            load_or_default(&persistence, StoreKey::CurrentExpenses, defaults.expenses)?;
        let history = load_or_default(&persistence, StoreKey::BudgetHistory, Vec::new())?;
        let plans = load_or_default(&persistence, StoreKey::FinancialPlans, Vec::new())?;

        let state = Self {
            persistence,
            snapshot: IncomeExpenseSnapshot { income, expenses },
            history,
            plans,
        };
        info!(
            expenses = state.snapshot.expenses.len(),
            history = state.history.len(),
            plans = state.plans.len(),
            "budget state loaded"
        );
        Ok(state)
    }

    pub fn snapshot(&self) -> &IncomeExpenseSnapshot {
        &self.snapshot
    }

    pub fn savings(&self) -> SavingsResult {
        compute_savings(self.snapshot.income, &self.snapshot.expenses)
    }

    pub fn set_income(&mut self, income: f64) -> Result<(), StateError> {
        self.persistence.set(StoreKey::CurrentIncome, &income)?;
        let savings = compute_savings(income, &self.snapshot.expenses).savings;
        self.persistence.set(StoreKey::CurrentSavings, &savings)?;
        self.snapshot.income = income;
        Ok(())
    }

    pub fn set_expenses(&mut self, expenses: Vec<Expense>) -> Result<(), StateError> {
        self.persistence.set(StoreKey::CurrentExpenses, &expenses)?;
        let savings = compute_savings(self.snapshot.income, &expenses).savings;
        self.persistence.set(StoreKey::CurrentSavings, &savings)?;
        self.snapshot.expenses = expenses;
        Ok(())
    }

    pub fn add_expense(&mut self, label: &str, amount: f64) -> Result<(), StateError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StateError::MissingExpenseLabel);
        }
        let mut expenses = self.snapshot.expenses.clone();
        expenses.push(Expense::new(label, amount));
        self.set_expenses(expenses)
    }

    pub fn update_expense_amount(&mut self, index: usize, amount: f64) -> Result<(), StateError> {
        let mut expenses = self.snapshot.expenses.clone();
        let expense = expenses
            .get_mut(index)
            .ok_or(StateError::UnknownExpense(index))?;
        expense.amount = amount;
        self.set_expenses(expenses)
    }

    pub fn rename_expense(&mut self, index: usize, label: &str) -> Result<(), StateError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StateError::MissingExpenseLabel);
        }
        let mut expenses = self.snapshot.expenses.clone();
        let expense = expenses
            .get_mut(index)
            .ok_or(StateError::UnknownExpense(index))?;
        expense.label = label.to_string();
        self.set_expenses(expenses)
    }

    pub fn remove_expense(&mut self, index: usize) -> Result<Expense, StateError> {
        if index >= self.snapshot.expenses.len() {
            return Err(StateError::UnknownExpense(index));
        }
        let mut expenses = self.snapshot.expenses.clone();
        let removed = expenses.remove(index);
        self.set_expenses(expenses)?;
        Ok(removed)
    }

    pub fn save_snapshot(&mut self) -> Result<BudgetHistoryEntry, StateError> {
        self.save_snapshot_at(Utc::now())
    }

    pub fn save_snapshot_at(
        &mut self,
        timestamp: DateTime<Utc>,
    ) -> Result<BudgetHistoryEntry, StateError> {
        let savings = self.savings();
        let entry = BudgetHistoryEntry {
            id: Uuid::new_v4().to_string(),
            timestamp,
            income: self.snapshot.income,
            total_expenses: savings.total_expenses,
            savings: savings.savings,
            savings_rate_percent: savings.savings_rate_percent,
        };
        let mut history = self.history.clone();
        history.push(entry.clone());
        self.commit_history(history)?;
        info!(id = %entry.id, savings = entry.savings, "budget snapshot saved");
        Ok(entry)
    }

    pub fn history(&self) -> &[BudgetHistoryEntry] {
        &self.history
    }

    pub fn history_trends(&self) -> Vec<HistoryTrend> {
        let mut previous_savings = None;
        self.history
            .iter()
            .map(|entry| {
                let savings_trend_percent = previous_savings
                    .map(|previous| savings_trend(entry.savings, previous))
                    .unwrap_or(0.0);
                previous_savings = Some(entry.savings);
                HistoryTrend {
                    entry: entry.clone(),
                    savings_trend_percent,
                }
            })
            .collect()
    }

    pub fn delete_history_entry(&mut self, id: &str) -> Result<BudgetHistoryEntry, StateError> {
        let position = self
            .history
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| StateError::UnknownHistoryEntry(id.to_string()))?;
        let mut history = self.history.clone();
        let removed = history.remove(position);
        self.commit_history(history)?;
        info!(id, "budget history entry deleted");
        Ok(removed)
    }

    pub fn plans(&self) -> &[GoalPlan] {
        &self.plans
    }

    pub fn plan(&self, id: &str) -> Option<&GoalPlan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn create_plan(&mut self, new_plan: NewGoalPlan) -> Result<GoalPlan, StateError> {
        self.create_plan_at(new_plan, Utc::now())
    }

    pub fn create_plan_at(
        &mut self,
        new_plan: NewGoalPlan,
        created_at: DateTime<Utc>,
    ) -> Result<GoalPlan, StateError> {
        let name = new_plan.name.trim().to_string();
        if name.is_empty() {
            return Err(StateError::MissingPlanName);
        }
        let plan =
            NewGoalPlan { name, ..new_plan }.into_plan(Uuid::new_v4().to_string(), created_at);
        let mut plans = self.plans.clone();
        plans.push(plan.clone());
        self.commit_plans(plans)?;
        info!(id = %plan.id, name = %plan.name, "plan created");
        Ok(plan)
    }

    pub fn delete_plan(&mut self, id: &str) -> Result<GoalPlan, StateError> {
        let position = self
            .plans
            .iter()
            .position(|plan| plan.id == id)
            .ok_or_else(|| StateError::UnknownPlan(id.to_string()))?;
        let mut plans = self.plans.clone();
        let removed = plans.remove(position);
        self.commit_plans(plans)?;
        info!(id, name = %removed.name, "plan deleted");
        Ok(removed)
    }

    // Store before memory: a failed write leaves the state as it was.
    fn commit_history(&mut self, history: Vec<BudgetHistoryEntry>) -> Result<(), StateError> {
        self.persistence.set(StoreKey::BudgetHistory, &history)?;
        self.history = history;
        Ok(())
    }

    fn commit_plans(&mut self, plans: Vec<GoalPlan>) -> Result<(), StateError> {
        self.persistence.set(StoreKey::FinancialPlans, &plans)?;
        self.plans = plans;
        Ok(())
    }
}

fn load_or_default<T: serde::de::DeserializeOwned>(
    persistence: &Persistence,
    key: StoreKey,
    default: T,
) -> Result<T, StateError> {
    match persistence.get(key) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Ok(default),
        Err(err @ StoreError::Decode { .. }) => {
            warn!(%key, error = %err, "discarding undecodable stored value");
            Ok(default)
        }
        Err(err) => Err(err.into()),
    }
}
