//! oakreport - VTC OAK usage reports from DynamoDB tables

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use oakreport::{
    cli::{Cli, env_file_error},
    error::Result,
    json_source::JsonDirSource,
    metrics::MetricsUsageTypeMap,
    report::{ReportOutcome, ReportRequest, build_report},
    source::TableSource,
    timezone::TimezoneConfig,
};
use oakreport_dynamodb::DynamoDbSource;
use oakreport_render::{
    BrandingAsset, RenderContext, ReportFormat, branding, get_renderer,
    output::default_output_name,
    preview::{format_json, format_preview},
    write_report,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(cli: &Cli) {
    // --quiet and --verbose override RUST_LOG
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("oakreport=debug,oakreport_core=debug,oakreport_dynamodb=debug,oakreport_render=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("oakreport=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn fetch_spinner() -> Option<ProgressBar> {
    if !is_terminal::is_terminal(std::io::stderr()) {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Fetching tables...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

async fn fetch_report(
    cli: &Cli,
    request: &ReportRequest,
    metrics: &MetricsUsageTypeMap,
) -> Result<ReportOutcome> {
    let source: Box<dyn TableSource> = match &cli.data_dir {
        Some(dir) => {
            info!("Reading tables from {}", dir.display());
            Box::new(JsonDirSource::new(dir))
        }
        None => Box::new(DynamoDbSource::new(&cli.connection.dynamodb_config()).await?),
    };

    let spinner = if cli.json || cli.quiet { None } else { fetch_spinner() };
    let outcome = build_report(source.as_ref(), request, metrics).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    outcome
}

async fn run(cli: Cli) -> Result<()> {
    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", tz_config.display_name());

    let request = ReportRequest {
        start: cli.start_date,
        end: cli.end_date,
        today: tz_config.today(),
        timezone: tz_config.tz,
        date_filter: !cli.no_date_filter,
        tables: cli.connection.tables(),
        exclude_domains: cli.exclude_domains.clone(),
    };
    // Fail on a bad range before connecting to anything
    let range = request.resolve_range()?;

    let metrics = match &cli.metrics_map {
        Some(path) => MetricsUsageTypeMap::from_path(path)?,
        None => MetricsUsageTypeMap::default(),
    };
    debug!("Metrics: {:?}", metrics.metric_names());

    let outcome = fetch_report(&cli, &request, &metrics).await?;
    debug!(
        "Summary: {}",
        serde_json::to_string(&outcome.summary).unwrap_or_default()
    );

    let branding = if cli.format == ReportFormat::Docx && !cli.preview && !cli.json {
        match &cli.logo {
            Some(path) => BrandingAsset::load(path),
            None => BrandingAsset::locate(&branding::default_candidates()),
        }
    } else {
        None
    };

    let ctx = RenderContext::new(&outcome.table, &range, chrono::Utc::now())
        .with_timezone_label(tz_config.display_name())
        .with_title(&cli.title)
        .with_branding(branding.as_ref());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&format_json(&ctx))?);
        return Ok(());
    }

    if cli.preview {
        println!("{}", ctx.title.bold());
        println!("{}", ctx.subtitle());
        println!("{}", format_preview(&outcome.table));
        return Ok(());
    }

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_name(cli.format, &range).into());
    write_report(get_renderer(cli.format).as_ref(), &ctx, &path)?;

    println!(
        "{} {} report for {} accounts written to {}",
        "✓".green().bold(),
        cli.format.label(),
        outcome.table.len(),
        path.display().to_string().bold()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials may live in a local .env file; load it before clap reads env
    let env_error = env_file_error(dotenvy::dotenv());

    let cli = Cli::parse();
    init_logging(&cli);
    if let Some(e) = env_error {
        warn!("Ignoring .env file: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
