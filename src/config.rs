use crate::insights::{InsightTab, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::mapping::{parse_override, MappingOverride};
use crate::state::Theme;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ads_report",
    about = "KPIs, alerts and AI insights from a Meta Ads performance export"
)]
pub struct Args {
    /// Meta Ads export (CSV) to load at startup
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Client label; defaults to the file name without `.csv`
    #[arg(long)]
    pub client: Option<String>,

    /// Override a detected column, e.g. `--map ctr_link=3` (`-1` unmaps)
    #[arg(long = "map", value_name = "FIELD=INDEX", value_parser = parse_override)]
    pub overrides: Vec<MappingOverride>,

    /// Directory the report files are written to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Palette used for the exported chart series
    #[arg(long, value_enum, default_value_t = Theme::Light)]
    pub theme: Theme,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Anthropic API key for AI insights
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "ADS_REPORT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "ADS_REPORT_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Write all reports and exit instead of opening the menu
    #[arg(long)]
    pub report: bool,

    /// With --report: also request account insights and embed them
    #[arg(long, requires = "report")]
    pub insights: bool,

    /// With --report: also request the AI audit and write it as its own file
    #[arg(long, requires = "report")]
    pub audit: bool,

    /// With --report: campaign deep-dive to request for the winning ad
    #[arg(long, value_enum, requires = "report")]
    pub campaign_tab: Option<InsightTab>,
}
