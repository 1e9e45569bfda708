//! Report CLI commands
//!
//! The monthly dashboard and transaction search.

use clap::Args;

use super::{parse_amount, parse_day, parse_kind, parse_mode, parse_month};
use crate::app::AppContext;
use crate::display::transaction::format_transaction_table;
use crate::error::TrackerResult;
use crate::reports::{MonthlySummary, SearchFilter, Totals};

/// Search criteria; all given criteria must match
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Text contained in the label (case-insensitive)
    #[arg(long)]
    pub text: Option<String>,
    /// Transaction type (income, expense)
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,
    /// Payment mode (cash, card, upi, bank-transfer)
    #[arg(short, long)]
    pub mode: Option<String>,
    /// Bank name or ID
    #[arg(short, long)]
    pub bank: Option<String>,
    /// First day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: Option<String>,
    /// Last day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<String>,
    /// Minimum amount, inclusive
    #[arg(long)]
    pub min: Option<String>,
    /// Maximum amount, inclusive
    #[arg(long)]
    pub max: Option<String>,
}

impl SearchArgs {
    fn to_filter(&self, ctx: &AppContext) -> TrackerResult<SearchFilter> {
        let mut filter = SearchFilter::new();
        if let Some(text) = &self.text {
            filter = filter.text(text.as_str());
        }
        if let Some(kind) = &self.kind {
            filter = filter.kind(parse_kind(kind)?);
        }
        if let Some(mode) = &self.mode {
            filter = filter.mode(parse_mode(mode)?);
        }
        if let Some(bank) = &self.bank {
            filter = filter.bank(ctx.store.resolve_bank_id(bank)?);
        }

        let from = self.from.as_deref().map(parse_day).transpose()?;
        let to = self.to.as_deref().map(parse_day).transpose()?;
        let min = self.min.as_deref().map(parse_amount).transpose()?;
        let max = self.max.as_deref().map(parse_amount).transpose()?;

        Ok(filter.date_range(from, to).amount_range(min, max))
    }
}

/// Show the monthly dashboard, or all-time totals with `all`
pub fn handle_summary_command(ctx: &AppContext, month: Option<String>, all: bool) -> TrackerResult<()> {
    let transactions = ctx.store.transactions();
    let currency = ctx.currency();

    if all {
        let totals = Totals::of(&transactions);
        println!("All-time totals");
        println!("{}", "=".repeat(40));
        println!("{:<16} {}{:.2}", "Total Income:", currency, totals.income);
        println!("{:<16} {}{:.2}", "Total Expense:", currency, totals.expense);
        println!("{:<16} {}{:.2}", "Net:", currency, totals.balance());
        println!("{:<16} {}", "Transactions:", transactions.len());
        return Ok(());
    }

    let month = parse_month(month.as_deref())?;
    let summary = MonthlySummary::generate(&transactions, month);
    print!("{}", summary.format_terminal(currency));

    if !summary.recent.is_empty() {
        println!();
        println!("Recent transactions");
        print!(
            "{}",
            format_transaction_table(&summary.recent, &ctx.store.banks(), currency)
        );
    }

    Ok(())
}

/// Search transactions
pub fn handle_search_command(ctx: &AppContext, args: SearchArgs) -> TrackerResult<()> {
    let filter = args.to_filter(ctx)?;
    let results = filter.apply(&ctx.store.transactions());

    print!(
        "{}",
        format_transaction_table(&results, &ctx.store.banks(), ctx.currency())
    );
    println!("\n{} matching transaction(s)", results.len());
    Ok(())
}
