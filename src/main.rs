use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use seller_margin::engine::{solve_target_price_checked, AlertSettings, ScenarioSet, TargetPrice};
use seller_margin::export::{self, ExportRecord};
use seller_margin::format::{format_krw, format_number, format_percent};
use seller_margin::history::HistoryManager;
use seller_margin::share::{self, AppState};
use seller_margin::{
    classify, compare_platforms, compute, compute_roi, config::Config, db::init_db,
    evaluate_alerts, forecast_annual, rank_platforms, simulate_volume, FeePreset, KeyValueStore,
    MarginInput, MarginResult, Platform, Repository,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Net payout, margin and break-even calculator for Korean marketplace sellers.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute payout, margin and break-even price for one order.
    Calc(InputArgs),
    /// Compare two platforms, or rank every platform when --against is omitted.
    Compare {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        against: Option<Platform>,
        /// Also print scenario A/B/C built from the input.
        #[arg(long)]
        scenarios: bool,
    },
    /// Solve the sale price that reaches a target margin.
    Target {
        #[command(flatten)]
        input: InputArgs,
        /// Target net margin in percent.
        #[arg(long)]
        margin: f64,
    },
    /// Totals for a batch of identical orders.
    Simulate {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        quantity: f64,
    },
    /// Twelve-month forecast from monthly sales quantities.
    Forecast {
        #[command(flatten)]
        input: InputArgs,
        /// Twelve comma-separated monthly quantities.
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        monthly: Vec<f64>,
    },
    /// Return on an initial investment at a monthly volume.
    Roi {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        investment: f64,
        #[arg(long)]
        monthly_quantity: f64,
    },
    /// Built-in and custom fee presets.
    Presets {
        #[command(subcommand)]
        action: Option<PresetAction>,
    },
    /// Saved calculations.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Export a calculation as JSON, CSV or a share query.
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    List,
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        base: f64,
        #[arg(long, default_value_t = 0.0)]
        linkage: f64,
        #[arg(long, default_value_t = 0.0)]
        shipping: f64,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Save {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        input: InputArgs,
    },
    Delete {
        id: String,
    },
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
    Query,
}

#[derive(Args, Clone)]
struct InputArgs {
    /// JSON file holding a calculation input.
    #[arg(long, conflicts_with = "query")]
    input: Option<PathBuf>,

    /// Share query, e.g. "platform=coupang&salePrice=10000&cost=9000".
    #[arg(long)]
    query: Option<String>,

    /// Platform whose fee preset fills in missing rates.
    #[arg(long)]
    platform: Option<Platform>,

    #[arg(long)]
    sale_price: Option<f64>,

    #[arg(long)]
    cost: Option<f64>,
}

impl InputArgs {
    fn load(&self, config: &Config) -> anyhow::Result<AppState> {
        let mut state = match (&self.query, &self.input) {
            (Some(query), _) => share::deserialize_state(query)
                .ok_or_else(|| anyhow!("share query has no valid platform"))?,
            (None, Some(path)) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let input: MarginInput = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?;
                AppState {
                    platform: self.platform.unwrap_or(config.default_platform),
                    input,
                }
            }
            (None, None) => AppState {
                platform: self.platform.unwrap_or(config.default_platform),
                input: MarginInput::default(),
            },
        };

        if let Some(platform) = self.platform {
            state.platform = platform;
        }
        if !has_fee_rates(&state.input) {
            state.input = state.platform.preset().apply(&state.input);
        }
        if let Some(price) = self.sale_price {
            state.input.sale_price = price;
        }
        if let Some(cost) = self.cost {
            state.input.cost = cost;
        }
        Ok(state)
    }
}

fn has_fee_rates(input: &MarginInput) -> bool {
    [
        input.base_fee_rate,
        input.linkage_fee_rate,
        input.shipping_fee_rate,
        input.platform_fee_rate,
        input.payment_fee_rate,
    ]
    .iter()
    .any(Option::is_some)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let cli = Cli::parse();
    if let Err(e) = run(cli, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn open_history(config: &Config) -> anyhow::Result<HistoryManager> {
    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("opening {}", config.database_path))?;
    let store: Arc<dyn KeyValueStore> = Arc::new(Repository::new(pool));
    Ok(HistoryManager::new(store).with_limits(config.history_limit, config.preset_limit))
}

/// Alert settings saved in an existing store, else the configured ones.
/// A plain calculation never creates the database.
async fn stored_alert_settings(config: &Config) -> anyhow::Result<AlertSettings> {
    if !Path::new(&config.database_path).is_file() {
        return Ok(config.alerts);
    }
    let history = open_history(config).await?;
    Ok(history.alert_settings(config.alerts).await?)
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Calc(args) => {
            let state = args.load(&config)?;
            let result = compute(&state.input);
            let settings = stored_alert_settings(&config).await?;
            let alerts = evaluate_alerts(&result, &settings);
            let status = classify(result.net_payout, result.net_margin_rate);

            if json {
                #[derive(Serialize)]
                struct Output<'a> {
                    platform: Platform,
                    result: &'a MarginResult,
                    status: seller_margin::Status,
                    alerts: &'a [seller_margin::engine::Alert],
                }
                print_json(&Output {
                    platform: state.platform,
                    result: &result,
                    status,
                    alerts: &alerts,
                })?;
            } else {
                println!("{} ({})", state.platform.display_name(), state.platform);
                print_result(&result);
                println!("status:            {}", status);
                for alert in &alerts {
                    println!("[{:?}] {}", alert.severity, alert.message());
                }
            }
        }
        Commands::Compare {
            input,
            against,
            scenarios,
        } => {
            let state = input.load(&config)?;
            match against {
                Some(other) => {
                    let comparison = compare_platforms(&state.input, state.platform, other);
                    if json {
                        print_json(&comparison)?;
                    } else {
                        for outcome in [&comparison.first, &comparison.second] {
                            println!(
                                "{:<12} payout {:>12}  margin {:>8}  {}",
                                outcome.platform.display_name(),
                                format_krw(outcome.result.net_payout),
                                format_percent(outcome.result.net_margin_rate, 2),
                                outcome.status
                            );
                        }
                        println!(
                            "difference   payout {:>12}  margin {:>8}",
                            format_krw(comparison.payout_diff),
                            format_percent(comparison.margin_diff, 2)
                        );
                    }
                }
                None => {
                    let ranked = rank_platforms(&state.input);
                    if json {
                        print_json(&ranked)?;
                    } else {
                        for (rank, outcome) in ranked.iter().enumerate() {
                            println!(
                                "{:>2}. {:<12} profit {:>12}  margin {:>8}  {}",
                                rank + 1,
                                outcome.platform.display_name(),
                                format_krw(outcome.result.net_profit),
                                format_percent(outcome.result.net_margin_rate, 2),
                                outcome.status
                            );
                        }
                    }
                }
            }

            if scenarios {
                let set = ScenarioSet::new(&state.input);
                if json {
                    print_json(&set.scenarios())?;
                } else {
                    print!(
                        "{}",
                        export::scenarios_to_csv(state.platform, set.scenarios())?
                    );
                }
            }
        }
        Commands::Target { input, margin } => {
            let state = input.load(&config)?;
            let target = solve_target_price_checked(&state.input, margin);
            if json {
                print_json(&target)?;
            } else {
                match target {
                    TargetPrice::Feasible(price) => println!(
                        "sale price for {} margin: {}",
                        format_percent(margin, 2),
                        format_krw(price)
                    ),
                    TargetPrice::Infeasible => println!(
                        "{} margin is unreachable with the current fee rates",
                        format_percent(margin, 2)
                    ),
                }
            }
        }
        Commands::Simulate { input, quantity } => {
            let state = input.load(&config)?;
            let sim = simulate_volume(&state.input, quantity);
            if json {
                print_json(&sim)?;
            } else {
                println!("quantity:          {}", format_number(sim.quantity));
                println!("total revenue:     {}", format_krw(sim.total_revenue));
                println!("total costs:       {}", format_krw(sim.total_costs));
                println!("total fees:        {}", format_krw(sim.total_fees));
                println!("net profit:        {}", format_krw(sim.net_profit));
                println!(
                    "profit per unit:   {}",
                    format_krw(sim.average_profit_per_unit)
                );
            }
        }
        Commands::Forecast { input, monthly } => {
            let state = input.load(&config)?;
            let count = monthly.len();
            let quantities: [f64; 12] = monthly
                .try_into()
                .map_err(|_| anyhow!("expected 12 monthly quantities, got {}", count))?;
            let forecast = forecast_annual(&state.input, &quantities);
            if json {
                print_json(&forecast)?;
            } else {
                for month in &forecast.monthly {
                    println!(
                        "{:>2}  qty {:>8}  revenue {:>14}  profit {:>14}",
                        month.month,
                        format_number(month.sales_quantity),
                        format_krw(month.revenue),
                        format_krw(month.profit)
                    );
                }
                println!("total revenue:     {}", format_krw(forecast.total_revenue));
                println!("total profit:      {}", format_krw(forecast.total_profit));
                println!(
                    "monthly average:   {}",
                    format_krw(forecast.average_monthly_profit)
                );
            }
        }
        Commands::Roi {
            input,
            investment,
            monthly_quantity,
        } => {
            let state = input.load(&config)?;
            let roi = compute_roi(&state.input, investment, monthly_quantity);
            if json {
                print_json(&roi)?;
            } else {
                println!("monthly profit:    {}", format_krw(roi.monthly_profit));
                println!("annual profit:     {}", format_krw(roi.annual_profit));
                println!("roi:               {}", format_percent(roi.roi, 2));
                if roi.never_pays_back() {
                    println!("payback:           never");
                } else {
                    println!(
                        "payback:           {} months ({} days)",
                        format_number(roi.payback_months.ceil()),
                        format_number(roi.payback_days.ceil())
                    );
                }
            }
        }
        Commands::Presets { action } => {
            let history = open_history(&config).await?;
            match action.unwrap_or(PresetAction::List) {
                PresetAction::List => {
                    let custom = history.presets().await?;
                    if json {
                        #[derive(Serialize)]
                        struct Builtin {
                            platform: Platform,
                            name: &'static str,
                            #[serde(flatten)]
                            rates: FeePreset,
                        }
                        let builtin: Vec<Builtin> = Platform::ALL
                            .iter()
                            .map(|p| Builtin {
                                platform: *p,
                                name: p.display_name(),
                                rates: p.preset(),
                            })
                            .collect();
                        print_json(&serde_json::json!({ "builtin": builtin, "custom": custom }))?;
                    } else {
                        for p in Platform::ALL {
                            print_rates(p.id(), p.display_name(), &p.preset());
                        }
                        for c in &custom {
                            print_rates(&c.id, &c.name, &c.fee_preset());
                        }
                    }
                }
                PresetAction::Save {
                    name,
                    base,
                    linkage,
                    shipping,
                } => {
                    let id = history
                        .save_preset(&name, FeePreset::new(base, linkage, shipping))
                        .await?;
                    println!("{}", id);
                }
                PresetAction::Delete { id } => history.delete_preset(&id).await?,
            }
        }
        Commands::History { action } => {
            let history = open_history(&config).await?;
            match action {
                HistoryAction::List => {
                    let saved = history.calculations().await?;
                    if json {
                        print_json(&saved)?;
                    } else if saved.is_empty() {
                        println!("no saved calculations");
                    } else {
                        for calc in &saved {
                            let when = calc
                                .saved_at()
                                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                                .unwrap_or_default();
                            let (payout, margin) = calc
                                .result
                                .map(|r| (format_krw(r.net_payout), format_percent(r.net_margin_rate, 2)))
                                .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
                            println!(
                                "{}  {}  {:<10} {:<20} {:>12} {:>8}",
                                calc.id, when, calc.platform, calc.name, payout, margin
                            );
                        }
                    }
                }
                HistoryAction::Save { name, input } => {
                    let state = input.load(&config)?;
                    let id = history
                        .save_calculation(&name, state.platform, &state.input)
                        .await?;
                    println!("{}", id);
                }
                HistoryAction::Delete { id } => history.delete_calculation(&id).await?,
                HistoryAction::Clear => history.clear_calculations().await?,
            }
        }
        Commands::Export {
            input,
            format,
            output,
        } => {
            let state = input.load(&config)?;
            let text = match format {
                ExportFormat::Json => {
                    export::to_json(&ExportRecord::new(state.platform, state.input))?
                }
                ExportFormat::Csv => {
                    export::to_csv(&ExportRecord::new(state.platform, state.input))?
                }
                ExportFormat::Query => share::serialize_state(&state),
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "export written");
                }
                None => println!("{}", text.trim_end()),
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rates(id: &str, name: &str, rates: &FeePreset) {
    println!(
        "{:<32} {:<12} base {:>7}  linkage {:>7}  shipping {:>7}",
        id,
        name,
        format_percent(rates.base_fee_rate * 100.0, 2),
        format_percent(rates.linkage_fee_rate * 100.0, 2),
        format_percent(rates.shipping_fee_rate * 100.0, 2)
    );
}

fn print_result(result: &MarginResult) {
    println!("gmv:               {}", format_krw(result.gmv));
    println!("total fees:        {}", format_krw(result.total_fees));
    println!("vat:               {}", format_krw(result.vat));
    println!("return cost:       {}", format_krw(result.expected_return_cost));
    println!("total costs:       {}", format_krw(result.total_costs));
    println!("net payout:        {}", format_krw(result.net_payout));
    println!("net profit:        {}", format_krw(result.net_profit));
    println!(
        "net margin:        {}",
        format_percent(result.net_margin_rate, 2)
    );
    match result.bep {
        Some(bep) => println!("break-even price:  {}", format_krw(bep)),
        None => println!("break-even price:  n/a"),
    }
}

