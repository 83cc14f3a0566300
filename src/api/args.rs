use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::{Expense, GoalCategory, GrowthInputs};
use crate::state::NewGoalPlan;

pub const DEFAULT_INITIAL_AMOUNT: f64 = 10_000.0;
pub const DEFAULT_MONTHLY_CONTRIBUTION: f64 = 500.0;
pub const DEFAULT_ANNUAL_RETURN: f64 = 7.0;
pub const DEFAULT_HORIZON_YEARS: u32 = 20;
pub const MAX_HORIZON_YEARS: u32 = 40;

pub const DEFAULT_MONTHLY_SAVINGS: f64 = 500.0;
pub const DEFAULT_SAVINGS_YEARS: u32 = 5;
pub const MAX_SAVINGS_YEARS: u32 = 30;

pub const DEFAULT_PLAN_TARGET: f64 = 1_500_000.0;
pub const DEFAULT_PLAN_MONTHLY_SAVINGS: f64 = 2_000.0;
pub const DEFAULT_DOWN_PAYMENT: f64 = 20.0;

#[derive(Parser, Debug)]
#[command(
    name = "fipa",
    about = "Personal finance planner: savings rate, investment growth and goal timelines"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Serve the JSON API backed by a persistent budget store")]
    Serve(ServeArgs),
    #[command(about = "Savings and savings rate for one month of income and expenses")]
    Savings(SavingsArgs),
    #[command(about = "Savings milestones and long-term projections for a monthly amount")]
    Projection(ProjectionArgs),
    #[command(about = "Compound growth of an investment with monthly contributions")]
    Growth(GrowthArgs),
    #[command(about = "Timeline, milestones and comparison for a savings goal")]
    Goal(GoalArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "FIPA_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        env = "FIPA_DATA_FILE",
        default_value = "fipa-data.json",
        help = "JSON file holding the budget, history and plans"
    )]
    pub data_file: PathBuf,
    #[arg(long, help = "Keep everything in memory; nothing is written to disk")]
    pub in_memory: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SavingsArgs {
    #[arg(long, allow_negative_numbers = true, help = "Monthly income")]
    pub income: f64,
    #[arg(
        long = "expense",
        value_parser = parse_expense,
        help = "Monthly expense as LABEL=AMOUNT; repeat for each expense"
    )]
    pub expenses: Vec<Expense>,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectionArgs {
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_MONTHLY_SAVINGS)]
    pub monthly_savings: f64,
    #[arg(long, default_value_t = DEFAULT_SAVINGS_YEARS, help = "Savings horizon in years")]
    pub years: u32,
}

#[derive(Args, Debug, Clone)]
pub struct GrowthArgs {
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_INITIAL_AMOUNT)]
    pub initial_amount: f64,
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_MONTHLY_CONTRIBUTION)]
    pub monthly_contribution: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = DEFAULT_ANNUAL_RETURN,
        help = "Expected annual return in percent, e.g. 7"
    )]
    pub annual_return: f64,
    #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS, help = "Investment horizon in years")]
    pub years: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliGoalCategory {
    House,
    Car,
    Education,
    Other,
}

impl From<CliGoalCategory> for GoalCategory {
    fn from(value: CliGoalCategory) -> Self {
        match value {
            CliGoalCategory::House => GoalCategory::House,
            CliGoalCategory::Car => GoalCategory::Car,
            CliGoalCategory::Education => GoalCategory::Education,
            CliGoalCategory::Other => GoalCategory::Other,
        }
    }
}

impl From<GoalCategory> for CliGoalCategory {
    fn from(value: GoalCategory) -> Self {
        match value {
            GoalCategory::House => CliGoalCategory::House,
            GoalCategory::Car => CliGoalCategory::Car,
            GoalCategory::Education => CliGoalCategory::Education,
            GoalCategory::Other => CliGoalCategory::Other,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GoalArgs {
    #[arg(long, default_value = "Goal")]
    pub name: String,
    #[arg(long, value_enum, default_value_t = CliGoalCategory::House)]
    pub category: CliGoalCategory,
    #[arg(long, default_value_t = DEFAULT_PLAN_TARGET, help = "Price of the goal")]
    pub target_amount: f64,
    #[arg(long, default_value_t = 0.0)]
    pub current_savings: f64,
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_PLAN_MONTHLY_SAVINGS)]
    pub monthly_contribution: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = DEFAULT_ANNUAL_RETURN,
        help = "Expected annual return in percent while saving"
    )]
    pub annual_return: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_DOWN_PAYMENT,
        help = "Down payment in percent of the price; house goals only"
    )]
    pub down_payment: f64,
}

pub fn default_growth_args() -> GrowthArgs {
    GrowthArgs {
        initial_amount: DEFAULT_INITIAL_AMOUNT,
        monthly_contribution: DEFAULT_MONTHLY_CONTRIBUTION,
        annual_return: DEFAULT_ANNUAL_RETURN,
        years: DEFAULT_HORIZON_YEARS,
    }
}

pub fn default_goal_args() -> GoalArgs {
    GoalArgs {
        name: "Goal".to_string(),
        category: CliGoalCategory::House,
        target_amount: DEFAULT_PLAN_TARGET,
        current_savings: 0.0,
        monthly_contribution: DEFAULT_PLAN_MONTHLY_SAVINGS,
        annual_return: DEFAULT_ANNUAL_RETURN,
        down_payment: DEFAULT_DOWN_PAYMENT,
    }
}

pub fn parse_expense(raw: &str) -> Result<Expense, String> {
    let Some((label, amount)) = raw.rsplit_once('=') else {
        return Err(format!("expected LABEL=AMOUNT, got '{raw}'"));
    };
    let label = label.trim();
    if label.is_empty() {
        return Err("expense label must not be empty".to_string());
    }
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid amount for '{label}': {e}"))?;
    if !amount.is_finite() {
        return Err(format!("amount for '{label}' must be finite"));
    }
    Ok(Expense::new(label, amount))
}

pub fn validate_savings_args(args: &SavingsArgs) -> Result<(), String> {
    if !args.income.is_finite() {
        return Err("--income must be a finite number".to_string());
    }
    Ok(())
}

pub fn validate_projection_args(args: &ProjectionArgs) -> Result<(), String> {
    if !args.monthly_savings.is_finite() {
        return Err("--monthly-savings must be a finite number".to_string());
    }
    if !(1..=MAX_SAVINGS_YEARS).contains(&args.years) {
        return Err(format!("--years must be between 1 and {MAX_SAVINGS_YEARS}"));
    }
    Ok(())
}

pub fn build_growth_inputs(args: &GrowthArgs) -> Result<GrowthInputs, String> {
    for (name, value) in [
        ("--initial-amount", args.initial_amount),
        ("--monthly-contribution", args.monthly_contribution),
        ("--annual-return", args.annual_return),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if args.annual_return <= -100.0 {
        return Err("--annual-return must be > -100".to_string());
    }

    if args.years > MAX_HORIZON_YEARS {
        return Err(format!("--years must be between 0 and {MAX_HORIZON_YEARS}"));
    }

    Ok(GrowthInputs {
        initial_amount: args.initial_amount,
        monthly_contribution: args.monthly_contribution,
        annual_return_percent: args.annual_return,
        horizon_years: args.years,
    })
}

pub fn build_new_plan(args: &GoalArgs) -> Result<NewGoalPlan, String> {
    for (name, value) in [
        ("--target-amount", args.target_amount),
        ("--current-savings", args.current_savings),
        ("--monthly-contribution", args.monthly_contribution),
        ("--annual-return", args.annual_return),
        ("--down-payment", args.down_payment),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if args.target_amount < 0.0 {
        return Err("--target-amount must be >= 0".to_string());
    }

    if args.current_savings < 0.0 {
        return Err("--current-savings must be >= 0".to_string());
    }

    if args.annual_return <= -100.0 {
        return Err("--annual-return must be > -100".to_string());
    }

    if !(0.0..=100.0).contains(&args.down_payment) {
        return Err("--down-payment must be between 0 and 100".to_string());
    }

    Ok(NewGoalPlan {
        name: args.name.trim().to_string(),
        category: args.category.into(),
        target_amount: args.target_amount,
        current_savings: args.current_savings,
        monthly_contribution: args.monthly_contribution,
        annual_return_percent: args.annual_return,
        down_payment_percent: args.down_payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_growth_command_with_negative_contribution() {
        let cli = Cli::try_parse_from([
            "fipa",
            "growth",
            "--initial-amount",
            "1000",
            "--monthly-contribution",
            "-50",
            "--years",
            "5",
        ])
        .expect("valid command line");
        let Command::Growth(args) = cli.command else {
            panic!("expected growth command");
        };
        assert_eq!(args.initial_amount, 1_000.0);
        assert_eq!(args.monthly_contribution, -50.0);
        assert_eq!(args.annual_return, DEFAULT_ANNUAL_RETURN);
        assert_eq!(args.years, 5);
    }

    #[test]
    fn cli_parses_repeated_expenses() {
        let cli = Cli::try_parse_from([
            "fipa",
            "savings",
            "--income",
            "8000",
            "--expense",
            "Rent=2000",
            "--expense",
            "Health Insurance=400",
        ])
        .expect("valid command line");
        let Command::Savings(args) = cli.command else {
            panic!("expected savings command");
        };
        assert_eq!(
            args.expenses,
            vec![
                Expense::new("Rent", 2_000.0),
                Expense::new("Health Insurance", 400.0)
            ]
        );
    }

    #[test]
    fn cli_goal_defaults_to_house_down_payment() {
        let cli = Cli::try_parse_from(["fipa", "goal"]).expect("valid command line");
        let Command::Goal(args) = cli.command else {
            panic!("expected goal command");
        };
        assert_eq!(args.category, CliGoalCategory::House);
        assert_eq!(args.down_payment, DEFAULT_DOWN_PAYMENT);
        assert_eq!(args.target_amount, DEFAULT_PLAN_TARGET);
    }

    #[test]
    fn parse_expense_rejects_malformed_values() {
        assert!(parse_expense("Rent").is_err());
        assert!(parse_expense("=100").is_err());
        assert!(parse_expense("Rent=abc").is_err());
        assert!(parse_expense("Rent=inf").is_err());
        assert_eq!(
            parse_expense(" Food = 600.5 ").expect("valid"),
            Expense::new("Food", 600.5)
        );
    }

    #[test]
    fn savings_args_reject_non_finite_income() {
        let cli = Cli::try_parse_from(["fipa", "savings", "--income", "inf"])
            .expect("clap parses inf as f64");
        let Command::Savings(args) = cli.command else {
            panic!("expected savings command");
        };
        let err = validate_savings_args(&args).expect_err("must reject inf");
        assert!(err.contains("--income"));

        let ok = SavingsArgs {
            income: -250.0,
            expenses: Vec::new(),
        };
        assert!(validate_savings_args(&ok).is_ok());
    }

    #[test]
    fn cli_projection_defaults_and_bounds() {
        let cli = Cli::try_parse_from(["fipa", "projection"]).expect("valid command line");
        let Command::Projection(args) = cli.command else {
            panic!("expected projection command");
        };
        assert_eq!(args.monthly_savings, DEFAULT_MONTHLY_SAVINGS);
        assert_eq!(args.years, DEFAULT_SAVINGS_YEARS);
        assert!(validate_projection_args(&args).is_ok());

        for years in [0, MAX_SAVINGS_YEARS + 1] {
            let args = ProjectionArgs {
                monthly_savings: 500.0,
                years,
            };
            let err = validate_projection_args(&args).expect_err("must reject years");
            assert!(err.contains("--years"));
        }

        let args = ProjectionArgs {
            monthly_savings: f64::NAN,
            years: 5,
        };
        assert!(validate_projection_args(&args).is_err());
    }

    #[test]
    fn build_growth_inputs_rejects_long_horizons() {
        let mut args = default_growth_args();
        args.years = MAX_HORIZON_YEARS + 1;
        let err = build_growth_inputs(&args).expect_err("must reject horizon");
        assert!(err.contains("--years"));
    }

    #[test]
    fn build_growth_inputs_rejects_non_finite_numbers() {
        let mut args = default_growth_args();
        args.monthly_contribution = f64::NAN;
        let err = build_growth_inputs(&args).expect_err("must reject NaN");
        assert!(err.contains("--monthly-contribution"));
    }

    #[test]
    fn build_growth_inputs_accepts_zero_horizon() {
        let mut args = default_growth_args();
        args.years = 0;
        let inputs = build_growth_inputs(&args).expect("valid inputs");
        assert_eq!(inputs.horizon_years, 0);
    }

    #[test]
    fn build_new_plan_rejects_invalid_down_payment() {
        let mut args = default_goal_args();
        args.down_payment = 120.0;
        let err = build_new_plan(&args).expect_err("must reject down payment");
        assert!(err.contains("--down-payment"));
    }

    #[test]
    fn build_new_plan_trims_name_and_maps_category() {
        let mut args = default_goal_args();
        args.name = "  New car ".to_string();
        args.category = CliGoalCategory::Car;
        let plan = build_new_plan(&args).expect("valid plan");
        assert_eq!(plan.name, "New car");
        assert_eq!(plan.category, GoalCategory::Car);
    }
}
