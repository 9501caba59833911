// Entry point and high-level CLI flow.
//
// Two ways in:
// - the interactive menu, which keeps one `AppState` for the session and
//   swaps datasets in and out of it;
// - `--report`, which loads the export, writes every report file and exits.
mod charts;
mod config;
mod demo;
mod insights;
mod loader;
mod mapping;
mod metrics;
mod output;
mod parser;
mod reports;
mod state;
mod types;
mod util;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::Args;
use insights::{
    account_prompt, campaign_prompt, parse_json_reply, render_tab_reply, request_audit,
    variants_prompt, AnthropicClient, InsightTab, LlmClient, ACCOUNT_MAX_TOKENS,
    CAMPAIGN_MAX_TOKENS,
};
use state::AppState;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Print `label` and read one trimmed line from stdin.
fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn load_into(state: AppState, path: &Path, args: &Args) -> AppState {
    match loader::load_file(path, &args.overrides, args.client.as_deref()) {
        Ok((dataset, report)) => {
            println!(
                "Processing export... ({} rows, {} campaigns)",
                util::format_int(report.total_rows),
                util::format_int(dataset.campaigns.len())
            );
            println!("\nFirst rows:\n");
            output::preview_raw_rows(&report.headers, &report.preview);
            println!("Column mapping:\n");
            output::preview_table_rows(&report.mapping.to_rows(&report.headers), usize::MAX);
            if !report.missing_required.is_empty() {
                let names: Vec<&str> = report.missing_required.iter().map(|f| f.label()).collect();
                println!("Note: required columns not found: {}\n", names.join(", "));
            }
            state.with_dataset(dataset)
        }
        Err(e) => {
            eprintln!("Failed to load file: {:#}\n", e);
            state
        }
    }
}

fn handle_load(state: AppState, args: &Args) -> AppState {
    let default = args.file.as_ref().map(|p| p.display().to_string());
    let label = match &default {
        Some(d) => format!("CSV path [{}]: ", d),
        None => "CSV path: ".to_string(),
    };
    let input = prompt(&label);
    let path = if input.is_empty() {
        match default {
            Some(d) => PathBuf::from(d),
            None => {
                println!("No path given.\n");
                return state;
            }
        }
    } else {
        PathBuf::from(input)
    };
    load_into(state, &path, args)
}

/// Write every report file for the current dataset and print previews.
fn generate_reports(state: &AppState, out_dir: &Path, insights: Option<&str>) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let ds = &state.dataset;

    println!("Generating reports for {} ({})...\n", ds.client_name, ds.period);

    let kpis = reports::kpi_cards(&ds.metrics);
    output::write_csv(&out_dir.join("kpis.csv"), &kpis)?;
    println!("KPIs de cuenta\n");
    output::preview_table_rows(&kpis, kpis.len());

    let rows = reports::campaign_table(&ds.campaigns);
    output::write_csv(&out_dir.join("campaigns.csv"), &rows)?;
    println!("Detalle por campaña ({} campañas)\n", rows.len());
    output::preview_table_rows(&rows, 10);

    let alerts = reports::alerts(ds);
    println!("Alertas ({} activas)\n", reports::alert_count(ds));
    output::preview_table_rows(&alerts, alerts.len());

    let summary = reports::generate_summary(ds);
    output::write_json(&out_dir.join("summary.json"), &summary)?;
    output::write_json(&out_dir.join("dataset.json"), ds)?;
    output::write_json(
        &out_dir.join("charts.json"),
        &charts::build_charts(ds, state.theme),
    )?;

    let today = chrono::Local::now().date_naive();
    let report_path = out_dir.join(output::report_file_name(&ds.client_name, today));
    output::write_text(
        &report_path,
        &output::render_markdown_report(ds, insights, today),
    )?;

    println!(
        "Outputs saved to {} (kpis.csv, campaigns.csv, summary.json, dataset.json, charts.json, {})\n",
        out_dir.display(),
        report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    info!(path = %report_path.display(), "report written");
    Ok(report_path)
}

fn client_for(state: &AppState, args: &Args) -> Result<AnthropicClient> {
    Ok(AnthropicClient::new(
        state.api_key.as_deref(),
        &args.model,
        &args.api_url,
    )?)
}

fn account_insights(state: &AppState, args: &Args) -> Result<String> {
    let client = client_for(state, args)?;
    Ok(client.complete(&account_prompt(&state.dataset), ACCOUNT_MAX_TOKENS)?)
}

/// Deep-dive on one campaign. Replies that are not the requested JSON are
/// returned as-is.
fn campaign_insights(state: &AppState, args: &Args, index: usize, tab: InsightTab) -> Result<String> {
    let prompt = campaign_prompt(&state.dataset, index, tab)
        .ok_or_else(|| anyhow!("no campaign at index {}", index))?;
    let client = client_for(state, args)?;
    let text = client.complete(&prompt, CAMPAIGN_MAX_TOKENS)?;
    match parse_json_reply(&text).and_then(|v| render_tab_reply(tab, &v)) {
        Ok(rendered) => Ok(rendered),
        Err(e) => {
            warn!(error = %e, "reply was not the expected JSON; showing raw text");
            Ok(text)
        }
    }
}

/// Request the account audit and write it next to the other reports.
fn audit_report(state: &AppState, args: &Args) -> Result<PathBuf> {
    let client = client_for(state, args)?;
    println!("Requesting audit for {}...", state.dataset.client_name);
    let analysis = request_audit(&client, &state.dataset)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let today = chrono::Local::now().date_naive();
    let path = args
        .out_dir
        .join(output::audit_file_name(&state.dataset.client_name, today));
    output::write_text(
        &path,
        &output::render_audit_report(&state.dataset.client_name, &analysis, today),
    )?;
    info!(path = %path.display(), "audit written");
    Ok(path)
}

fn variant_ideas(state: &AppState, args: &Args) -> Result<String> {
    let prompt = variants_prompt(&state.dataset)
        .ok_or_else(|| anyhow!("no campaign has both CTR and CPL-I to rank"))?;
    let client = client_for(state, args)?;
    let text = client.complete(&prompt, CAMPAIGN_MAX_TOKENS)?;
    match parse_json_reply(&text) {
        Ok(v) if v["variantes"].is_array() => Ok(serde_json::to_string_pretty(&v["variantes"])?),
        _ => Err(anyhow!("unexpected reply from the model")),
    }
}

fn handle_campaign_insights(state: &AppState, args: &Args) {
    for (i, c) in state.dataset.campaigns.iter().enumerate() {
        println!("[{}] {} ({})", i, c.name, c.action);
    }
    let Ok(index) = prompt("Campaign index: ").parse::<usize>() else {
        println!("Invalid index.\n");
        return;
    };
    for (i, tab) in InsightTab::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, tab.title());
    }
    let tab = match prompt("Tab: ").as_str() {
        "1" => InsightTab::Diagnostico,
        "2" => InsightTab::Audiencia,
        "3" => InsightTab::Ideas,
        _ => {
            println!("Invalid tab.\n");
            return;
        }
    };
    match campaign_insights(state, args, index, tab) {
        Ok(text) => println!("\n{}\n", text),
        Err(e) => eprintln!("Insights failed: {:#}\n", e),
    }
}

fn run_report_mode(state: AppState, args: &Args) -> Result<()> {
    let state = match &args.file {
        Some(path) => {
            let (dataset, _) = loader::load_file(path, &args.overrides, args.client.as_deref())?;
            state.with_dataset(dataset)
        }
        None => {
            warn!("no --file given; reporting on the demo dataset");
            state
        }
    };

    let mut sections = Vec::new();
    if args.insights {
        sections.push(account_insights(&state, args)?);
    }
    if let Some(tab) = args.campaign_tab {
        let winner = reports::pick_winner(&state.dataset.campaigns)
            .ok_or_else(|| anyhow!("no campaign has both CTR and CPL-I to rank"))?;
        let name = &state.dataset.campaigns[winner.index].name;
        let text = campaign_insights(&state, args, winner.index, tab)?;
        sections.push(format!("### {} · {}\n\n{}", name, tab.title(), text));
    }
    let insights = if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    };
    generate_reports(&state, &args.out_dir, insights.as_deref())?;
    if args.audit {
        let path = audit_report(&state, args)?;
        println!("Audit saved to {}\n", path.display());
    }
    Ok(())
}

fn print_menu(state: &AppState) {
    let source = if state.imported { "imported" } else { "demo" };
    println!(
        "Dataset: {} · {} ({}) · theme: {:?} · API key: {}",
        state.dataset.client_name,
        state.dataset.period,
        source,
        state.theme,
        if state.api_key.is_some() { "set" } else { "not set" }
    );
    println!("[1] Load a CSV export");
    println!("[2] Reset to demo data");
    println!("[3] Generate reports");
    println!("[4] AI insights (account)");
    println!("[5] AI insights (campaign)");
    println!("[6] AI creative variants of the winning ad");
    println!("[7] Toggle theme");
    println!("[8] Set API key");
    println!("[9] AI audit report");
    println!("[0] Exit\n");
}

fn run_menu(mut state: AppState, args: &Args) {
    let mut last_insights: Option<String> = None;
    loop {
        print_menu(&state);
        match read_choice().as_str() {
            "1" => {
                state = handle_load(state, args);
                last_insights = None;
            }
            "2" => {
                state = state.reset_to_demo();
                last_insights = None;
                println!("Demo data restored.\n");
            }
            "3" => {
                if let Err(e) = generate_reports(&state, &args.out_dir, last_insights.as_deref()) {
                    error!("{:#}", e);
                    eprintln!("Write error: {:#}\n", e);
                }
            }
            "4" => match account_insights(&state, args) {
                Ok(text) => {
                    println!("\n{}\n", text);
                    last_insights = Some(text);
                }
                Err(e) => eprintln!("Insights failed: {:#}\n", e),
            },
            "5" => handle_campaign_insights(&state, args),
            "6" => match variant_ideas(&state, args) {
                Ok(text) => println!("\n{}\n", text),
                Err(e) => eprintln!("Insights failed: {:#}\n", e),
            },
            "7" => {
                state = state.toggle_theme();
                println!("Theme: {:?}\n", state.theme);
            }
            "8" => {
                let key = prompt("API key (blank clears): ");
                state = state.with_api_key(&key);
            }
            "9" => match audit_report(&state, args) {
                Ok(path) => println!("Audit saved to {}\n", path.display()),
                Err(e) => eprintln!("Audit failed: {:#}\n", e),
            },
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-9.\n"),
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level);

    let state = AppState::new(args.theme, args.api_key.clone());

    if args.report {
        return run_report_mode(state, &args);
    }

    let state = match &args.file {
        Some(path) => load_into(state, path, &args),
        None => state,
    };
    run_menu(state, &args);
    Ok(())
}
