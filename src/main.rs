//! Headless driver for the AccountCat view layer.
//!
//! Mounts the accounting screen against the configured backend (or an
//! in-memory one with `--demo`), prints what a renderer would show, and
//! optionally submits one item with `--add <name> <amount>`. `--insight`
//! also prints the weekly histogram and the yearly summary.

use std::sync::Arc;
use std::time::Duration;

use accountcat_view::adapters::{MockAccountingService, MockUserService, ReqwestHttpClient, RpcClient};
use accountcat_view::config::ViewConfig;
use accountcat_view::models::{format_timestamp, DaySpending, MonthlySpending};
use accountcat_view::reactive::Scope;
use accountcat_view::traits::{AccountingService, UserService};
use accountcat_view::view_state::{
    AccountingScreen, AnnouncementBanner, WeeklyHistogram, YearlySummary,
};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("accountcat_view=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// `--add <name> <amount>` from the command line, if present.
fn parse_add(args: &[String]) -> Result<Option<(String, String)>> {
    let Some(pos) = args.iter().position(|a| a == "--add") else {
        return Ok(None);
    };
    match (args.get(pos + 1), args.get(pos + 2)) {
        (Some(name), Some(amount)) => Ok(Some((name.clone(), amount.clone()))),
        _ => Err(eyre!("usage: --add <name> <amount>")),
    }
}

async fn wait_until<T: Clone>(
    mut rx: watch::Receiver<T>,
    what: &str,
    ready: impl FnMut(&T) -> bool,
) -> Result<T> {
    let value = tokio::time::timeout(LOAD_TIMEOUT, rx.wait_for(ready))
        .await
        .map_err(|_| eyre!("timed out waiting for {}", what))?
        .map_err(|_| eyre!("{} closed", what))?;
    Ok(value.clone())
}

/// Wait for every call spawned in `scope` to finish.
async fn wait_idle(scope: &Scope, what: &str) -> Result<()> {
    tokio::time::timeout(LOAD_TIMEOUT, async {
        while scope.pending_tasks() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .map_err(|_| eyre!("timed out waiting for {}", what))
}

async fn print_insight(accounting: Arc<dyn AccountingService>) -> Result<()> {
    let weekly = WeeklyHistogram::mount(Arc::clone(&accounting));
    let yearly = YearlySummary::mount(accounting);
    wait_idle(weekly.scope(), "histogram").await?;
    wait_idle(yearly.scope(), "yearly summary").await?;

    println!("last 7 days {}", weekly.range().get());
    for day in weekly.dataset().get() {
        println!("  {:<10} -{:>10.2} +{:>10.2}", day.date, day.expense, day.income);
    }
    println!("year {}", yearly.year());
    for month in yearly.dataset().get() {
        println!("  {:<10} -{:>10.2} +{:>10.2}", month.date, month.expense, month.income);
    }
    Ok(())
}

fn services(config: &ViewConfig, demo: bool) -> Result<(Arc<dyn AccountingService>, Arc<dyn UserService>)> {
    if demo {
        let accounting = MockAccountingService::new()
            .with_tags(&["food", "rent", "travel"])
            .with_currencies(&["TWD", "USD", "JPY", "EUR"])
            .with_histogram(vec![
                DaySpending::new("10/13", 120.0, 0.0),
                DaySpending::new("10/14", 80.0, 1500.0),
            ])
            .with_yearly_summary(vec![MonthlySpending::new("1", 3200.0, 45000.0)]);
        let users: Arc<dyn UserService> = Arc::new(MockUserService::new());
        let accounting: Arc<dyn AccountingService> = Arc::new(accounting);
        return Ok((accounting, users));
    }
    let http = ReqwestHttpClient::from_config(config)?;
    let rpc = Arc::new(RpcClient::new(http, config.api_base_url.clone()));
    let accounting: Arc<dyn AccountingService> = rpc.clone();
    let users: Arc<dyn UserService> = rpc;
    Ok((accounting, users))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("accountcat-view {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    init_logging();

    let demo = args.iter().any(|a| a == "--demo");
    let insight = args.iter().any(|a| a == "--insight");
    let add = parse_add(&args)?;
    let config = ViewConfig::from_env();
    info!(api = %config.api_base_url, demo, "starting");

    let (accounting, users) = services(&config, demo)?;
    let banner = AnnouncementBanner::mount(users, None);
    let screen = AccountingScreen::mount(Arc::clone(&accounting), &config);

    let currencies = wait_until(screen.currencies().watch(), "currencies", Option::is_some).await?;
    let mut items = wait_until(screen.items().watch(), "items", Option::is_some).await?;

    if banner.is_visible() {
        println!("** {} **", banner.content().get());
    }
    println!("currencies: {}", currencies.unwrap_or_default().join(", "));

    if let Some((name, amount)) = add {
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let _outcome = screen
            .add_outcomes()
            .subscribe(move |outcome| {
                outcome_tx.send_replace(Some(outcome.clone()));
            });
        screen.on_name_change(name);
        screen.on_amount_change(amount);
        screen.on_add();
        let outcome = wait_until(outcome_rx, "add result", Option::is_some).await?;
        if let Some(err) = outcome.as_ref().and_then(|o| o.error()) {
            let category = err.category();
            eprintln!("{} ({}: {})", err.user_message(), category, category.hint());
        } else {
            let before = items.as_ref().map(Vec::len);
            items = wait_until(screen.items().watch(), "refreshed items", |current| {
                current.as_ref().map(Vec::len) != before
            })
            .await?;
        }
    }

    for item in items.unwrap_or_default() {
        println!(
            "{:<24} {:>12} {} {:<8} {}",
            item.name,
            item.amount.amount,
            item.amount.currency,
            item.amount_type.label(),
            format_timestamp(item.occurred_at.or(item.created_at)),
        );
    }

    if insight {
        print_insight(accounting).await?;
    }

    screen.unmount();
    banner.unmount();
    Ok(())
}
