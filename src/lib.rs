pub mod anomalies;
pub mod cli;
pub mod error;
pub mod ingest;
pub mod nulls;
pub mod rows;
pub mod schema;
pub mod service;
pub mod session;
pub mod table;

use std::{env, fs, path::Path, sync::OnceLock};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};

use crate::{
    cli::{CheckArgs, Cli, Commands, FillArgs, SchemaArgs, ScoresArgs, ValidateArgs},
    nulls::{format_null_rate, NullRateMap},
    schema::{render_schema_json, ColumnKind, SchemaMap},
    service::HttpCheckService,
    session::SessionOrchestrator,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("dq_workbench", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Building async runtime")?;
    runtime.block_on(async {
        match cli.command {
            Commands::Check(args) => handle_check(&args).await,
            Commands::Validate(args) => handle_validate(&args).await,
            Commands::Fill(args) => handle_fill(&args).await,
            Commands::Schema(args) => handle_schema(&args).await,
            Commands::Scores(args) => handle_scores(&args).await,
        }
    })
}

/// Stages the input file, uploads it, and runs the full check pass. Every
/// subcommand starts here because the session is never persisted between
/// invocations.
async fn prepare_session(
    input: &Path,
    server: &str,
    delimiter: Option<u8>,
) -> Result<SessionOrchestrator<HttpCheckService>> {
    let service = HttpCheckService::new(server)?;
    let mut orchestrator = SessionOrchestrator::new(service);
    orchestrator
        .health()
        .await
        .with_context(|| format!("Reaching checking service at {server}"))?;

    let bytes = fs::read(input).with_context(|| format!("Reading input file {input:?}"))?;
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.csv")
        .to_string();
    let preview = orchestrator.select_file(&name, bytes, delimiter)?;
    info!("Staged '{}' with {} preview row(s)", name, preview.rows.len());

    orchestrator.upload().await?;
    orchestrator.run_checks().await?;
    Ok(orchestrator)
}

async fn handle_check(args: &CheckArgs) -> Result<()> {
    let mut orchestrator = prepare_session(&args.input, &args.server, args.delimiter).await?;

    let session = orchestrator.session();
    if let Some(preview) = session.ingest().preview() {
        println!("Preview (first {} row(s)):", preview.rows.len());
        table::print_table(&preview.columns, &preview.rows);
    }

    println!("\nSnapshot:");
    table::print_rows(session.snapshot());

    println!("\nDetected schema:");
    print_schema(session.reconciler().detected());

    println!("\nNull rates:");
    print_null_rates(session.nulls().rates());

    if args.all {
        while orchestrator.session().anomalies().has_more() {
            orchestrator.reveal_anomalies();
        }
    }
    let pager = orchestrator.session().anomalies();
    println!("\nAnomalies:");
    if pager.is_empty() {
        println!("no anomalies found");
    } else {
        table::print_rows(pager.visible());
        if pager.has_more() {
            println!(
                "({} of {} row(s) shown; pass --all to reveal everything)",
                pager.visible().len(),
                pager.total()
            );
        }
    }
    Ok(())
}

async fn handle_validate(args: &ValidateArgs) -> Result<()> {
    let mut orchestrator = prepare_session(&args.input, &args.server, None).await?;

    if let Some(path) = &args.schema {
        let bytes =
            fs::read(path).with_context(|| format!("Reading expected schema from {path:?}"))?;
        orchestrator.load_schema_file(&bytes)?;
    }
    if !args.columns.is_empty() {
        let mut expected = orchestrator.session().reconciler().expected().clone();
        for spec in &args.columns {
            let (column, kind) = parse_column_spec(spec)?;
            expected.insert(column, kind);
        }
        orchestrator.load_schema_text(&render_schema_json(&expected))?;
    }

    for (column, hint) in orchestrator.session().reconciler().mismatch_hints() {
        warn!("{column}: {hint}");
    }

    let entries = orchestrator.validate_schema().await?;
    if entries.is_empty() {
        println!("no schema checks matched; define expected types and try again");
        return Ok(());
    }
    let headers = vec![
        "column".to_string(),
        "exists".to_string(),
        "type_ok".to_string(),
    ];
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.column.clone(),
                yes_no(entry.exists),
                yes_no(entry.type_ok),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}

async fn handle_fill(args: &FillArgs) -> Result<()> {
    // Reject malformed assignments before touching the network.
    let replacements = args
        .set
        .iter()
        .map(|assignment| {
            assignment
                .split_once('=')
                .map(|(column, value)| (column.trim().to_string(), value.to_string()))
                .ok_or_else(|| anyhow!("Expected 'column=value' but got '{assignment}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut orchestrator = prepare_session(&args.input, &args.server, None).await?;

    println!("Null rates:");
    print_null_rates(orchestrator.session().nulls().rates());

    for (column, value) in &replacements {
        if !orchestrator.set_null_replacement(column, value) {
            warn!("Column '{column}' has no null-rate entry, ignoring replacement");
        }
    }

    let reference = orchestrator.fill_nulls().await?.to_string();
    let link = orchestrator.service().absolute_url(&reference);
    println!("remediated file ready: {link}");

    let bytes = orchestrator.download(&reference).await?;
    fs::write(&args.output, bytes)
        .with_context(|| format!("Writing remediated CSV to {:?}", args.output))?;
    info!("Wrote remediated CSV to {:?}", args.output);
    Ok(())
}

async fn handle_schema(args: &SchemaArgs) -> Result<()> {
    let orchestrator = prepare_session(&args.input, &args.server, None).await?;
    let document = orchestrator.session().reconciler().export_json();
    fs::write(&args.output, document)
        .with_context(|| format!("Writing schema document to {:?}", args.output))?;
    info!(
        "Exported {} column(s) to {:?}",
        orchestrator.session().reconciler().expected().len(),
        args.output
    );
    Ok(())
}

async fn handle_scores(args: &ScoresArgs) -> Result<()> {
    let orchestrator = prepare_session(&args.input, &args.server, None).await?;
    let scores = orchestrator.anomaly_scores().await?;
    if scores.is_empty() {
        println!("no anomaly scores reported");
        return Ok(());
    }
    let headers = vec!["row".to_string(), "score".to_string()];
    let rows = scores
        .iter()
        .map(|entry| vec![entry.index.to_string(), format!("{:.4}", entry.score)])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}

fn print_schema(schema: &SchemaMap) {
    let headers = vec!["column".to_string(), "type".to_string()];
    let rows = schema
        .iter()
        .map(|(column, kind)| vec![column.clone(), kind.to_string()])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
}

fn print_null_rates(rates: &NullRateMap) {
    let headers = vec!["column".to_string(), "null %".to_string()];
    let rows = rates
        .iter()
        .map(|(column, rate)| vec![column.clone(), format_null_rate(*rate)])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
}

fn parse_column_spec(spec: &str) -> Result<(String, ColumnKind)> {
    let (column, kind) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected 'column:type' but got '{spec}'"))?;
    Ok((column.trim().to_string(), kind.parse()?))
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
