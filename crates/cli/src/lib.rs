use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use command::{CommandAction, CommandHandler, CommandRequest, CommandResponse};
use config::{Overrides, Settings};
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tanf_protocol::serialize_json;

mod command;
mod config;
mod http_api;
mod report;
mod server_security;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "tanf")]
#[command(about = "TANF benefit estimates backed by a benefit simulation engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file, JSON or TOML (env: TANF_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Simulator base URL (env: TANF_SIMULATOR_URL)
    #[arg(long, global = true)]
    simulator_url: Option<String>,

    /// Per-request simulator timeout in seconds (env: TANF_SIMULATOR_TIMEOUT_SECS)
    #[arg(long, global = true)]
    simulator_timeout_secs: Option<u64>,

    /// Simulations in flight per sweep or comparison (env: TANF_MAX_CONCURRENCY)
    #[arg(long, global = true)]
    max_concurrency: Option<usize>,

    /// Tax year used when a request omits one (env: TANF_DEFAULT_YEAR)
    #[arg(long, global = true)]
    default_year: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a JSON Command API request
    Command(CommandArgs),

    /// Estimate TANF for one household
    Calculate(CalculateArgs),

    /// TANF across a range of annual income
    Range(RangeArgs),

    /// TANF, SNAP, EITC and CTC across a range of annual income
    #[command(name = "combined-range")]
    CombinedRange(CombinedRangeArgs),

    /// The same household in every supported state, ranked by benefit
    #[command(name = "all-states")]
    AllStates(AllStatesArgs),

    /// Two households side by side
    Compare(CompareArgs),

    /// List supported states
    States(OutputArgs),

    /// List counties of a state
    Counties(CountiesArgs),

    /// Serve the Command API and REST routes over HTTP
    #[command(name = "serve-http")]
    ServeHttp(ServeArgs),
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON request (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing the JSON request
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pretty-print JSON response
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Print the full JSON response
    #[arg(long)]
    json: bool,
}

/// Household fields that do not depend on location.
#[derive(Args)]
struct FamilyArgs {
    /// Tax year (defaults to the configured year)
    #[arg(long)]
    year: Option<i32>,

    /// Adults in the household (1-2)
    #[arg(long, default_value_t = 1)]
    adults: u8,

    /// Children in the household (0-10)
    #[arg(long, default_value_t = 1)]
    children: u8,

    /// Annual earned income of the first adult
    #[arg(long, default_value_t = 0.0)]
    earned: f64,

    /// Annual unearned income
    #[arg(long, default_value_t = 0.0)]
    unearned: f64,

    /// Child ages, comma separated, one per child
    #[arg(long, value_delimiter = ',')]
    child_ages: Option<Vec<u32>>,

    /// Household already receives TANF (recipient income rules)
    #[arg(long)]
    enrolled: bool,

    /// Countable assets
    #[arg(long, default_value_t = 0.0)]
    resources: f64,
}

impl FamilyArgs {
    fn payload(&self) -> Value {
        let mut payload = json!({
            "num_adults": self.adults,
            "num_children": self.children,
            "earned_income": self.earned,
            "unearned_income": self.unearned,
            "is_tanf_enrolled": self.enrolled,
            "resources": self.resources,
        });
        if let Some(year) = self.year {
            payload["year"] = json!(year);
        }
        if let Some(ages) = &self.child_ages {
            payload["child_ages"] = json!(ages);
        }
        payload
    }
}

#[derive(Args)]
struct HouseholdArgs {
    /// Two-letter state code
    #[arg(long)]
    state: String,

    /// County code, for states with county-based rules
    #[arg(long)]
    county: Option<String>,

    #[command(flatten)]
    family: FamilyArgs,
}

impl HouseholdArgs {
    fn payload(&self) -> Value {
        let mut payload = self.family.payload();
        payload["state"] = json!(self.state);
        if let Some(county) = &self.county {
            payload["county"] = json!(county);
        }
        payload
    }
}

#[derive(Args)]
struct IncomeRangeArgs {
    /// Lowest annual total income
    #[arg(long)]
    income_min: Option<f64>,

    /// Highest annual total income
    #[arg(long)]
    income_max: Option<f64>,

    /// Annual income increment
    #[arg(long)]
    income_step: Option<f64>,
}

impl IncomeRangeArgs {
    fn extend(&self, payload: &mut Value) {
        for (key, value) in [
            ("income_min", self.income_min),
            ("income_max", self.income_max),
            ("income_step", self.income_step),
        ] {
            if let Some(value) = value {
                payload[key] = json!(value);
            }
        }
    }
}

#[derive(Args)]
struct CalculateArgs {
    #[command(flatten)]
    household: HouseholdArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct RangeArgs {
    #[command(flatten)]
    household: HouseholdArgs,

    #[command(flatten)]
    range: IncomeRangeArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CombinedRangeArgs {
    #[command(flatten)]
    household: HouseholdArgs,

    #[command(flatten)]
    range: IncomeRangeArgs,

    /// Programs to include, comma separated (tanf,snap,eitc,ctc); all by default
    #[arg(long, value_delimiter = ',')]
    programs: Option<Vec<String>>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct AllStatesArgs {
    #[command(flatten)]
    family: FamilyArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CompareArgs {
    /// Scenario A household as JSON
    #[arg(long)]
    scenario_a: String,

    /// Scenario B household as JSON
    #[arg(long)]
    scenario_b: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CountiesArgs {
    /// Two-letter state code
    state: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:8000
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Allow binding to non-loopback addresses (requires --auth-token)
    #[arg(long)]
    public: bool,

    /// Require Authorization: Bearer <token> on all requests (env: TANF_AUTH_TOKEN)
    #[arg(long)]
    auth_token: Option<String>,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for JSON whenever a command prints it
    let json_output = match &cli.command {
        Commands::Command(_) => true,
        Commands::Calculate(args) => args.output.json,
        Commands::Range(args) => args.output.json,
        Commands::CombinedRange(args) => args.output.json,
        Commands::AllStates(args) => args.output.json,
        Commands::Compare(args) => args.output.json,
        Commands::States(args) => args.json,
        Commands::Counties(args) => args.output.json,
        Commands::ServeHttp(_) => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let settings = Settings::resolve(&Overrides {
        config: cli.config.clone(),
        simulator_url: cli.simulator_url.clone(),
        simulator_timeout_secs: cli.simulator_timeout_secs,
        max_concurrency: cli.max_concurrency,
        default_year: cli.default_year,
    })?;
    if let Some(path) = &settings.config_path {
        log::debug!("Loaded config {}", path.display());
    }
    let handler = CommandHandler::new(&settings)?;

    match cli.command {
        Commands::Command(args) => run_command(args, &handler).await?,
        Commands::Calculate(args) => {
            run_action(
                &handler,
                CommandAction::Calculate,
                args.household.payload(),
                args.output,
            )
            .await?
        }
        Commands::Range(args) => {
            let mut payload = args.household.payload();
            args.range.extend(&mut payload);
            run_action(&handler, CommandAction::CalculateRange, payload, args.output).await?
        }
        Commands::CombinedRange(args) => {
            let mut payload = args.household.payload();
            args.range.extend(&mut payload);
            if let Some(programs) = &args.programs {
                let programs: Vec<String> = programs
                    .iter()
                    .map(|program| program.trim().to_ascii_lowercase())
                    .collect();
                payload["include_programs"] = json!(programs);
            }
            run_action(
                &handler,
                CommandAction::CalculateCombinedRange,
                payload,
                args.output,
            )
            .await?
        }
        Commands::AllStates(args) => {
            run_action(
                &handler,
                CommandAction::CalculateAllStates,
                args.family.payload(),
                args.output,
            )
            .await?
        }
        Commands::Compare(args) => {
            let scenario_a: Value =
                serde_json::from_str(&args.scenario_a).context("Invalid JSON in --scenario-a")?;
            let scenario_b: Value =
                serde_json::from_str(&args.scenario_b).context("Invalid JSON in --scenario-b")?;
            run_action(
                &handler,
                CommandAction::CalculateComparison,
                json!({ "scenario_a": scenario_a, "scenario_b": scenario_b }),
                args.output,
            )
            .await?
        }
        Commands::States(args) => {
            run_action(&handler, CommandAction::States, json!({}), args).await?
        }
        Commands::Counties(args) => {
            run_action(
                &handler,
                CommandAction::Counties,
                json!({ "state": args.state }),
                args.output,
            )
            .await?
        }
        Commands::ServeHttp(args) => serve_http(args, handler).await?,
    }

    Ok(())
}

async fn run_command(args: CommandArgs, handler: &CommandHandler) -> Result<()> {
    let raw = read_payload(&args)?;
    let request: CommandRequest =
        serde_json::from_str(&raw).context("Invalid JSON passed to --json/--file")?;

    let response = handler.execute(request).await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serialize_json(&response)?
    };
    print_stdout(&output)?;

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_payload(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Command request is empty. Provide --json, --file, or pipe JSON via stdin.");
    }

    Ok(buffer)
}

async fn run_action(
    handler: &CommandHandler,
    action: CommandAction,
    payload: Value,
    output: OutputArgs,
) -> Result<()> {
    let response = handler.execute(CommandRequest { action, payload }).await;

    if output.json {
        print_stdout(&serde_json::to_string_pretty(&response)?)?;
        if response.is_error() {
            std::process::exit(1);
        }
        return Ok(());
    }
    if response.is_error() {
        report_failure(&response);
        std::process::exit(1);
    }
    print_stdout(&report::render(action, &response.data))?;
    for hint in &response.hints {
        log::warn!("{}", hint.text);
    }
    Ok(())
}

fn report_failure(response: &CommandResponse) {
    eprintln!(
        "Error: {}",
        response.message.as_deref().unwrap_or("Unknown error")
    );
    if let Some(hint) = response.error.as_ref().and_then(|error| error.hint.as_deref()) {
        eprintln!("Hint: {hint}");
    }
}

async fn serve_http(args: ServeArgs, handler: CommandHandler) -> Result<()> {
    let addrs = server_security::guarded_bind_addrs(&args.bind, args.public).await?;
    let auth_token = server_security::AuthToken::resolve(args.auth_token.as_deref(), args.public)?;
    let auth_enabled = auth_token.is_some();

    let state = Arc::new(http_api::HttpState {
        handler,
        auth_token,
    });
    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving Command API: {base_url}/command"))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;

    if auth_enabled {
        print_stdout(&format!(
            "Auth enabled: add header 'Authorization: Bearer ${}'",
            server_security::AUTH_TOKEN_ENV
        ))?;
    }
    if args.public {
        let addrs = addrs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        print_stdout(&format!(
            "Public bind enabled (--public). Resolved addresses: {addrs}"
        ))?;
    }

    print_stdout(&format!("Try: curl {base_url}/states"))?;
    print_stdout(&format!(
        "Try: curl -X POST {base_url}/calculate -H 'Content-Type: application/json' -d '{{\"state\":\"CA\",\"num_children\":2}}'"
    ))?;
    axum::serve(listener, app).await?;
    Ok(())
}
