use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use finance_ledger::{
    category_shares, load_snapshot, monthly_totals, recent_transactions, top_expenses, Category,
    EngineConfig, LedgerSnapshot, PaymentType, ReportPeriod, TransactionFilter, CONFIG_ENV,
};

const USAGE: &str = "\
usage: finance-ledger <summary|cards|bills|groups|monthly> --transactions FILE.csv
         [--cards FILE.csv] [--groups FILE.json] [--as-of YYYY-MM-DD]
         [--config FILE.json] [--json]
         [--search TEXT] [--payment-type TYPE] [--category NAME] [--from DATE] [--to DATE]
         [--period week|month|quarter|year]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Summary,
    Cards,
    Bills,
    Groups,
    Monthly,
}

#[derive(Debug)]
struct Options {
    command: Command,
    transactions: PathBuf,
    cards: Option<PathBuf>,
    groups: Option<PathBuf>,
    config: Option<PathBuf>,
    as_of: NaiveDate,
    json: bool,
    filter: TransactionFilter,
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", value))
}

fn parse_args(args: &[String]) -> Result<Options> {
    let command = match args.get(1).map(String::as_str) {
        Some("summary") => Command::Summary,
        Some("cards") => Command::Cards,
        Some("bills") => Command::Bills,
        Some("groups") => Command::Groups,
        Some("monthly") => Command::Monthly,
        Some(other) => bail!("Unknown command '{}'\n{}", other, USAGE),
        None => bail!("{}", USAGE),
    };

    let mut transactions = None;
    let mut cards = None;
    let mut groups = None;
    let mut config = env::var_os(CONFIG_ENV).map(PathBuf::from);
    let mut as_of = chrono::Local::now().date_naive();
    let mut json = false;
    let mut filter = TransactionFilter::all();
    let mut period = None;

    let mut rest = args.iter().skip(2);
    while let Some(flag) = rest.next() {
        if flag == "--json" {
            json = true;
            continue;
        }

        let value = rest
            .next()
            .with_context(|| format!("Missing value for {}", flag))?;
        match flag.as_str() {
            "--transactions" => transactions = Some(PathBuf::from(value)),
            "--cards" => cards = Some(PathBuf::from(value)),
            "--groups" => groups = Some(PathBuf::from(value)),
            "--config" => config = Some(PathBuf::from(value)),
            "--as-of" => as_of = parse_date(value)?,
            "--search" => filter = filter.with_search(value.as_str()),
            "--payment-type" => {
                let payment_type: PaymentType = value.parse()?;
                filter = filter.with_payment_type(payment_type);
            }
            "--category" => {
                let category: Category = value.parse()?;
                filter = filter.with_category(category);
            }
            "--from" => filter.date_from = Some(parse_date(value)?),
            "--to" => filter.date_to = Some(parse_date(value)?),
            "--period" => period = Some(value.parse::<ReportPeriod>()?),
            other => bail!("Unknown option '{}'\n{}", other, USAGE),
        }
    }

    // --period is relative to --as-of, wherever either appears
    if let Some(period) = period {
        filter = filter.for_period(period, as_of);
    }

    let transactions = transactions.with_context(|| format!("--transactions is required\n{}", USAGE))?;

    Ok(Options {
        command,
        transactions,
        cards,
        groups,
        config,
        as_of,
        json,
        filter,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args)?;

    let config = match &options.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let snapshot = load_snapshot(
        &options.transactions,
        options.cards.as_deref(),
        options.groups.as_deref(),
    )?;
    info!(command = ?options.command, as_of = %options.as_of, "running");

    match options.command {
        Command::Summary => run_summary(&snapshot, &options, &config),
        Command::Cards => run_cards(&snapshot, &options, &config),
        Command::Bills => run_bills(&snapshot, &options, &config),
        Command::Groups => run_groups(&snapshot, &options),
        Command::Monthly => run_monthly(&snapshot, &options),
    }
}

fn run_summary(snapshot: &LedgerSnapshot, options: &Options, config: &EngineConfig) -> Result<()> {
    let report = snapshot.report(Some(&options.filter))?;
    let shares = category_shares(&report)?;

    let matching: Vec<_> = options.filter.apply(snapshot.all_transactions()).cloned().collect();
    let top = top_expenses(&matching, config.top_expenses);
    let recent = recent_transactions(&matching, config.recent_transactions);

    if options.json {
        #[derive(Serialize)]
        struct SummaryOutput<'a> {
            report: &'a finance_ledger::LedgerReport,
            categories: &'a [finance_ledger::CategoryShare],
            top_expenses: Vec<&'a finance_ledger::Transaction>,
            recent: Vec<&'a finance_ledger::Transaction>,
        }
        return print_json(&SummaryOutput {
            report: &report,
            categories: &shares,
            top_expenses: top,
            recent,
        });
    }

    let s = &report.summary;
    println!("📊 Summary ({} transactions)", report.transaction_count);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Income:    {:>12}", s.income);
    println!("  Expenses:  {:>12}", s.expenses);
    println!("  Shared:    {:>12}", s.shared_total);
    println!("  Net:       {:>12}", s.net);

    if !shares.is_empty() {
        println!("\n📂 By category");
        for share in &shares {
            println!("  {:<14} {:>12}  {:>6}%", share.category.label(), share.total, share.percentage);
        }
    }

    if !report.by_card.is_empty() {
        println!("\n💳 By card");
        for (card_id, total) in &report.by_card {
            println!("  {:<14} {:>12}", card_id, total);
        }
    }

    if !top.is_empty() {
        println!("\n🔝 Top expenses");
        for tx in &top {
            println!("  {}  {:<30} {:>12}", tx.date, tx.description, tx.amount);
        }
    }

    if !recent.is_empty() {
        println!("\n🕑 Recent");
        for tx in &recent {
            println!("  {}  {:<30} {:>12}", tx.date, tx.description, tx.amount);
        }
    }

    Ok(())
}

fn run_cards(snapshot: &LedgerSnapshot, options: &Options, config: &EngineConfig) -> Result<()> {
    let engine = config.cycle_engine()?;
    let statuses = snapshot.card_statuses(&engine, options.as_of)?;

    if options.json {
        return print_json(&statuses);
    }

    println!("💳 Card cycles as of {}", options.as_of);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for status in &statuses {
        let utilization = status
            .utilization_pct
            .map(|pct| format!("{}%", pct))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<12} {} → {}  spent {:>10} of {:>10}  ({}, {})  due {}",
            status.card_id,
            status.cycle_start,
            status.cycle_end,
            status.spent_in_cycle,
            status.limit,
            utilization,
            status.status.as_str(),
            status.due_date
        );
    }

    Ok(())
}

fn run_bills(snapshot: &LedgerSnapshot, options: &Options, config: &EngineConfig) -> Result<()> {
    let engine = config.cycle_engine()?;
    let bills = snapshot.upcoming_bills(&engine, options.as_of, config.urgent_bill_days)?;

    if options.json {
        return print_json(&bills);
    }

    println!("🧾 Upcoming bills as of {}", options.as_of);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if bills.is_empty() {
        println!("  Nothing due.");
    }
    for bill in &bills {
        println!(
            "  {:<16} {:>10}  due {} (in {} days) {:?}",
            bill.card_name, bill.amount, bill.due_date, bill.days_until_due, bill.status
        );
    }

    Ok(())
}

fn run_groups(snapshot: &LedgerSnapshot, options: &Options) -> Result<()> {
    let overviews = snapshot.group_overviews()?;

    if options.json {
        return print_json(&overviews);
    }

    for overview in &overviews {
        println!(
            "👥 {} ({} members) shared {}{}",
            overview.name,
            overview.member_count,
            overview.shared_total,
            if overview.settled { " ✓ settled" } else { "" }
        );
        for balance in &overview.balances {
            println!("  {:<16} {:>12}", balance.user_id, balance.net_position);
        }
        for transfer in finance_ledger::settle_up(&overview.balances) {
            println!("  ↳ {} pays {} {}", transfer.from, transfer.to, transfer.amount);
        }
    }

    Ok(())
}

fn run_monthly(snapshot: &LedgerSnapshot, options: &Options) -> Result<()> {
    let months = monthly_totals(snapshot.all_transactions(), Some(&options.filter))?;

    if options.json {
        return print_json(&months);
    }

    println!("📅 {:<8} {:>12} {:>12} {:>12} {:>12}", "Month", "Income", "Expenses", "Shared", "Net");
    for month in &months {
        let s = &month.summary;
        println!(
            "   {}-{:02}  {:>12} {:>12} {:>12} {:>12}",
            month.year, month.month, s.income, s.expenses, s.shared_total, s.net
        );
    }

    Ok(())
}
