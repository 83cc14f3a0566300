use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawExpense")]
pub struct Expense {
    pub label: String,
    pub amount: f64,
}

#[derive(Deserialize)]
struct RawExpense {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    amount: f64,
}

impl From<RawExpense> for Expense {
    fn from(raw: RawExpense) -> Self {
        let label = [raw.label, raw.name, raw.category]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        Self {
            label,
            amount: raw.amount,
        }
    }
}

impl Expense {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let amount = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if amount.is_finite() { amount } else { 0.0 })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeExpenseSnapshot {
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Default for IncomeExpenseSnapshot {
    fn default() -> Self {
        Self {
            income: 0.0,
            expenses: vec![
                Expense::new("Rent", 0.0),
                Expense::new("Food", 0.0),
                Expense::new("Health Insurance", 0.0),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsResult {
    pub total_expenses: f64,
    pub savings: f64,
    pub savings_rate_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsOutlook {
    pub monthly: f64,
    pub yearly: f64,
    pub five_year: f64,
    pub ten_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonAmount {
    pub years: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlan {
    pub years: u32,
    pub total_savings: f64,
    pub milestones: Vec<HorizonAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermProjection {
    pub annual_return_percent: f64,
    pub savings: Vec<HorizonAmount>,
    pub invested: Vec<HorizonAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetHistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub income: f64,
    pub total_expenses: f64,
    pub savings: f64,
    pub savings_rate_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthInputs {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub annual_return_percent: f64,
    pub horizon_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyBalance {
    pub year: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProjection {
    pub final_amount: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub yearly_amounts: Vec<YearlyBalance>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    House,
    Car,
    Education,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlan {
    pub id: String,
    pub name: String,
    pub category: GoalCategory,
    pub target_amount: f64,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub annual_return_percent: f64,
    pub down_payment_percent: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TimeToGoal {
    Reachable { months: u32 },
    Unreachable,
}

impl TimeToGoal {
    pub fn months(self) -> Option<u32> {
        match self {
            TimeToGoal::Reachable { months } => Some(months),
            TimeToGoal::Unreachable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub effective_target: f64,
    pub remaining: f64,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub percent: u8,
    pub amount_at_percent: f64,
    pub reached: bool,
    pub months_to_reach: TimeToGoal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    pub years: u32,
    pub linear_amount: f64,
    pub compounded_amount: f64,
    pub difference: f64,
    pub percentage_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTimeline {
    pub progress: GoalProgress,
    pub without_return: TimeToGoal,
    pub with_return: TimeToGoal,
    pub months_saved_by_investing: Option<u32>,
    pub milestones: Vec<Milestone>,
    pub comparison: Vec<ComparisonPoint>,
}
