use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// One source line split into cells, in column order.
pub type RawRow = Vec<String>;

/// Header row plus the non-empty data rows of an export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Canonical columns of a Meta Ads performance export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CampaignName,
    AmountSpent,
    CpcAll,
    CtrLink,
    LandingPageViews,
    Impressions,
    Reach,
    LinkClicks,
    Frequency,
    Cpm,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::CampaignName,
        Field::AmountSpent,
        Field::CpcAll,
        Field::CtrLink,
        Field::LandingPageViews,
        Field::Impressions,
        Field::Reach,
        Field::LinkClicks,
        Field::Frequency,
        Field::Cpm,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::CampaignName => "campaign_name",
            Field::AmountSpent => "amount_spent",
            Field::CpcAll => "cpc_all",
            Field::CtrLink => "ctr_link",
            Field::LandingPageViews => "landing_page_views",
            Field::Impressions => "impressions",
            Field::Reach => "reach",
            Field::LinkClicks => "link_clicks",
            Field::Frequency => "frequency",
            Field::Cpm => "cpm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::CampaignName => "Nombre de Campaña",
            Field::AmountSpent => "Gasto (Amount Spent)",
            Field::CpcAll => "CPC (Link Clicks)",
            Field::CtrLink => "CTR (Enlace)",
            Field::LandingPageViews => "Landing Page Views",
            Field::Impressions => "Impresiones",
            Field::Reach => "Alcance",
            Field::LinkClicks => "Link Clicks",
            Field::Frequency => "Frecuencia",
            Field::Cpm => "CPM",
        }
    }

    /// The upload form asks for these two; nothing downstream enforces it.
    pub fn required(self) -> bool {
        matches!(self, Field::CampaignName | Field::AmountSpent)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Recommendation attached to every campaign, chosen from its CPL-I.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    #[serde(rename = "Escalar")]
    Escalar,
    #[serde(rename = "Optimizar")]
    Optimizar,
    #[serde(rename = "Pausar HOY")]
    PausarHoy,
    #[serde(rename = "Estable")]
    Estable,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Escalar => "Escalar",
            Action::Optimizar => "Optimizar",
            Action::PausarHoy => "Pausar HOY",
            Action::Estable => "Estable",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized cell values for one row, before anything is derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignFields {
    pub name: Option<String>,
    pub spend: Option<f64>,
    pub cpc: Option<f64>,
    pub ctr: Option<f64>,
    pub lpv: Option<u64>,
    pub freq: Option<f64>,
    pub cpm: Option<f64>,
    pub impressions: Option<u64>,
    pub reach: Option<u64>,
    pub link_clicks: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    pub name: String,
    pub spend: f64,
    pub cpc: Option<f64>,
    pub ctr: Option<f64>,
    pub lpv: Option<u64>,
    pub freq: Option<f64>,
    pub cpm: Option<f64>,
    pub impressions: Option<u64>,
    pub reach: Option<u64>,
    pub link_clicks: Option<u64>,
    /// High-intent clicks. This export has no separate column, so it mirrors `lpv`.
    pub intent: Option<u64>,
    pub cpli: Option<f64>,
    pub action: Action,
}

/// Account-level totals and the ratios recomputed from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountMetrics {
    pub spend: f64,
    pub impressions: u64,
    pub reach: u64,
    pub link_clicks: u64,
    pub lpv_total: u64,
    pub intent_clicks: u64,
    pub ctr: Option<f64>,
    pub lpv_rate: Option<f64>,
    pub cpli: Option<f64>,
    pub cpc: Option<f64>,
    pub cpm: Option<f64>,
    pub freq: Option<f64>,
}

/// Everything the reports, charts and insights work from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub client_name: String,
    pub period: String,
    pub metrics: AccountMetrics,
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MappingRow {
    #[serde(rename = "Field")]
    #[tabled(rename = "Campo")]
    pub field: String,
    #[serde(rename = "Label")]
    #[tabled(rename = "Etiqueta")]
    pub label: String,
    #[serde(rename = "Column")]
    #[tabled(rename = "Columna")]
    pub column: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiCard {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Métrica")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Valor")]
    pub value: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Estado")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CampaignRow {
    #[serde(rename = "Campaign")]
    #[tabled(rename = "Campaña")]
    pub name: String,
    #[serde(rename = "Spend")]
    #[tabled(rename = "Gasto")]
    pub spend: String,
    #[serde(rename = "CPC")]
    #[tabled(rename = "CPC")]
    pub cpc: String,
    #[serde(rename = "CTR")]
    #[tabled(rename = "CTR")]
    pub ctr: String,
    #[serde(rename = "LPV")]
    #[tabled(rename = "LPV")]
    pub lpv: String,
    #[serde(rename = "Frequency")]
    #[tabled(rename = "Frec.")]
    pub freq: String,
    #[serde(rename = "CPLI")]
    #[tabled(rename = "CPL-I")]
    pub cpli: String,
    #[serde(rename = "Action")]
    #[tabled(rename = "Acción")]
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub client_name: String,
    pub period: String,
    pub total_campaigns: usize,
    pub scale_count: usize,
    pub optimize_count: usize,
    pub pause_count: usize,
    pub stable_count: usize,
    pub metrics: AccountMetrics,
    pub winner: Option<String>,
    pub alert_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
    Ok,
    Info,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::Critical => "CRÍTICA",
            AlertLevel::Warning => "AVISO",
            AlertLevel::Ok => "OK",
            AlertLevel::Info => "INFO",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct Alert {
    #[tabled(rename = "Nivel")]
    pub level: AlertLevel,
    #[tabled(rename = "Alerta")]
    pub title: String,
    #[tabled(rename = "Detalle")]
    pub detail: String,
    #[tabled(rename = "Acción")]
    pub action: String,
}

/// Campaign names grouped by what to do with them next.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Decisions {
    pub scale: Vec<String>,
    pub optimize: Vec<String>,
    pub pause: Vec<String>,
}
