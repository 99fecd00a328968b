use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use shop_admin::config::AdminConfig;
use shop_admin::domain::category::{CategoryCommandHandler, FlatCategory};
use shop_admin::domain::order::{
    format_usd, parse_milestone, MilestoneDates, OrderCommand, OrderCommandHandler, OrderFilter,
    OrderStatus, OrderView, PlacedWithin,
};
use shop_admin::metrics::Metrics;
use shop_admin::store::{HttpRecordStore, RecordStore};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shop back-office admin", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "SHOP_ADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// Admin API base URL, overrides the config file
    #[arg(long, env = "SHOP_ADMIN_API_URL")]
    api_url: Option<String>,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Order lifecycle operations
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Category tree operations
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// List the order status catalogue
    Statuses,
}

#[derive(Subcommand, Debug)]
enum OrderAction {
    Show {
        id: Uuid,
    },
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<OrderStatus>,
        /// today, week or month
        #[arg(long, default_value = "any")]
        placed: PlacedWithin,
    },
    SetStatus {
        id: Uuid,
        #[arg(value_parser = parse_status)]
        status: OrderStatus,
    },
    Cancel {
        id: Uuid,
    },
    /// Edit milestone dates. Omitted flags keep the current value; an empty
    /// value clears the milestone.
    SetTimeline {
        id: Uuid,
        #[arg(long)]
        approved_at: Option<String>,
        #[arg(long)]
        carrier_at: Option<String>,
        #[arg(long)]
        customer_at: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryAction {
    Tree {
        #[arg(long)]
        search: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

fn parse_status(value: &str) -> Result<OrderStatus, String> {
    OrderStatus::from_name(value).ok_or_else(|| {
        let names: Vec<_> = OrderStatus::ALL.iter().map(|s| s.name()).collect();
        format!("unknown status {value:?}, expected one of {}", names.join(", "))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AdminConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AdminConfig::default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    config.validate()?;

    // RUST_LOG wins over the configured filter
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| "info,shop_admin=debug".to_string());
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::debug!(base_url = %config.api.base_url, "Using admin API");

    let metrics = Arc::new(Metrics::new()?);
    let store: Arc<dyn RecordStore> = Arc::new(
        HttpRecordStore::new(&config.api.base_url, config.timeout(), config.retry_config())?
            .with_metrics(metrics.clone()),
    );

    let timezone = config.timezone()?;
    let orders = OrderCommandHandler::new(store.clone())
        .with_pricing(config.pricing_policy())
        .with_write_policy(config.write_policy)
        .with_metrics(metrics.clone());
    let categories = CategoryCommandHandler::new(store);

    match cli.command {
        Command::Order { action } => run_order(&orders, action, timezone).await?,
        Command::Category { action } => run_category(&categories, action).await?,
        Command::Statuses => {
            for status in OrderStatus::ALL {
                println!("{}  {}", status.id(), status.name());
            }
        }
    }

    if cli.metrics {
        print!("{}", metrics.render()?);
    }

    Ok(())
}

async fn run_order(
    handler: &OrderCommandHandler,
    action: OrderAction,
    timezone: FixedOffset,
) -> anyhow::Result<()> {
    match action {
        OrderAction::Show { id } => print_order(&handler.load(id).await?),
        OrderAction::List {
            search,
            status,
            placed,
        } => {
            let filter = OrderFilter {
                search,
                status,
                placed,
            };
            let now = Utc::now().with_timezone(&timezone);
            for view in handler.list(&filter, now).await? {
                println!(
                    "{}  {:<10}  {:>12}  {}",
                    view.order.id,
                    view.status_label,
                    format_usd(view.order.total_price),
                    view.order.created_at.with_timezone(&timezone).format("%Y-%m-%d %H:%M"),
                );
            }
        }
        OrderAction::SetStatus { id, status } => {
            let current = handler.load(id).await?;
            let view = handler
                .handle(&current.order, OrderCommand::UpdateStatus { target: status })
                .await?;
            print_order(&view);
        }
        OrderAction::Cancel { id } => {
            let current = handler.load(id).await?;
            let view = handler.handle(&current.order, OrderCommand::Cancel).await?;
            print_order(&view);
        }
        OrderAction::SetTimeline {
            id,
            approved_at,
            carrier_at,
            customer_at,
        } => {
            let current = handler.load(id).await?;
            let existing = current.order.milestones();

            let dates = MilestoneDates {
                order_approved_at: merge_milestone(approved_at, existing.order_approved_at, timezone)?,
                order_delivered_carrier_date: merge_milestone(
                    carrier_at,
                    existing.order_delivered_carrier_date,
                    timezone,
                )?,
                order_delivered_customer_date: merge_milestone(
                    customer_at,
                    existing.order_delivered_customer_date,
                    timezone,
                )?,
            };

            let view = handler
                .handle(&current.order, OrderCommand::UpdateTimeline { dates })
                .await?;
            print_order(&view);
        }
    }
    Ok(())
}

fn merge_milestone(
    input: Option<String>,
    existing: Option<DateTime<Utc>>,
    timezone: FixedOffset,
) -> anyhow::Result<Option<DateTime<Utc>>> {
    match input {
        Some(value) => Ok(parse_milestone(&value, timezone)?),
        None => Ok(existing),
    }
}

async fn run_category(handler: &CategoryCommandHandler, action: CategoryAction) -> anyhow::Result<()> {
    match action {
        CategoryAction::Tree { search } => print_categories(&handler.load_rows(search.as_deref()).await?),
        CategoryAction::Delete { id } => print_categories(&handler.delete(id, None).await?),
    }
    Ok(())
}

fn print_order(view: &OrderView) {
    let order = &view.order;
    println!("Order {}", order.id);
    println!("  status:    {} ({:?})", view.status_label, view.tone);
    match view.progress_step() {
        -1 => println!("  progress:  cancelled"),
        step => println!("  progress:  step {} of 4", step + 1),
    }
    println!("  customer:  {}", order.customer_id);
    if let Some(coupon) = order.coupon_id {
        println!("  coupon:    {coupon}");
    }
    println!("  placed:    {}", order.created_at.to_rfc3339());

    let milestone = |value: Option<DateTime<Utc>>| {
        value
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("  approved:  {}", milestone(order.order_approved_at));
    println!("  carrier:   {}", milestone(order.order_delivered_carrier_date));
    println!("  delivered: {}", milestone(order.order_delivered_customer_date));
    println!("  timeline:  {}", if view.timeline_editable { "editable" } else { "locked" });

    for item in &order.items {
        println!(
            "  - {} x{} @ {} = {}",
            item.product_id,
            item.quantity,
            format_usd(item.price),
            format_usd(item.line_total()),
        );
    }

    let summary = &view.summary;
    println!("  subtotal:  {}", format_usd(summary.subtotal));
    println!("  tax:       {}", format_usd(summary.tax));
    println!("  shipping:  {}", format_usd(summary.shipping));
    println!("  total:     {}", format_usd(summary.recorded_total));
    if !summary.reconciles() {
        println!("  note:      items add up to {}", format_usd(summary.computed_total));
    }

    let targets: Vec<_> = view.allowed_targets.iter().map(|s| s.name()).collect();
    if !targets.is_empty() {
        println!("  can move to: {}", targets.join(", "));
    }
}

fn print_categories(rows: &[FlatCategory]) {
    // rows arrive in pre-order, so a parent's depth is always known first
    let mut depth: HashMap<Uuid, usize> = HashMap::with_capacity(rows.len());

    for row in rows {
        let level = row
            .parent_id
            .and_then(|parent| depth.get(&parent))
            .map_or(0, |d| d + 1);
        depth.insert(row.id, level);

        println!(
            "{}{}{}  [{}]",
            "  ".repeat(level),
            row.category_name,
            if row.active { "" } else { " (inactive)" },
            row.id,
        );
    }
}
