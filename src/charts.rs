// Chart series handed to an external renderer as JSON.
use crate::reports::CPLI_BENCHMARK;
use crate::state::Theme;
use crate::types::{Campaign, Dataset};
use serde::Serialize;

const SERIES_COLORS: [&str; 6] = ["#e73642", "#10c98f", "#f59e0b", "#6366f1", "#ec4899", "#06b6d4"];

const RED: &str = "rgba(231,54,66,.75)";
const AMBER: &str = "rgba(245,158,11,.75)";
const GREEN: &str = "rgba(16,201,143,.7)";

const MAX_LABEL_CHARS: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub grid: &'static str,
    pub tick: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            grid: "rgba(0,0,0,.05)",
            tick: "#8888a8",
            text: "#4a4a62",
            border: "#ffffff",
        },
        Theme::Dark => Palette {
            grid: "rgba(255,255,255,.04)",
            tick: "#55556a",
            text: "#9999b8",
            border: "#1a1b25",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    /// Reference line drawn across the bars, when the chart has one.
    pub benchmark: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub theme: Theme,
    pub palette: Palette,
    pub spend_share: Series,
    pub cpli_by_campaign: Series,
    pub ctr_vs_frequency: Vec<ScatterPoint>,
}

/// Names longer than 16 characters are cut to 15 plus an ellipsis.
pub fn short_label(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_CHARS {
        let mut s: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
        s.push('…');
        s
    } else {
        name.to_string()
    }
}

fn cpli_color(v: f64) -> &'static str {
    if v > 8.0 {
        RED
    } else if v > 5.0 {
        AMBER
    } else {
        GREEN
    }
}

/// Green: engaging and fresh. Red: weak CTR or a saturated audience.
fn scatter_color(c: &Campaign) -> &'static str {
    let ctr = c.ctr.unwrap_or(0.0);
    let freq = c.freq.unwrap_or(0.0);
    if ctr > 2.0 && freq < 2.5 {
        "rgba(16,201,143,.8)"
    } else if ctr < 1.5 || freq > 3.5 {
        "rgba(231,54,66,.8)"
    } else {
        "rgba(245,158,11,.8)"
    }
}

pub fn build_charts(ds: &Dataset, theme: Theme) -> ChartSet {
    let labels: Vec<String> = ds.campaigns.iter().map(|c| short_label(&c.name)).collect();

    let spend_share = Series {
        title: "Distribución de Gasto".to_string(),
        labels: labels.clone(),
        values: ds.campaigns.iter().map(|c| c.spend).collect(),
        colors: (0..ds.campaigns.len())
            .map(|i| format!("{}bb", SERIES_COLORS[i % SERIES_COLORS.len()]))
            .collect(),
        benchmark: None,
    };

    let cpli_values: Vec<f64> = ds.campaigns.iter().map(|c| c.cpli.unwrap_or(0.0)).collect();
    let cpli_by_campaign = Series {
        title: "CPL-I por Campaña".to_string(),
        labels: labels.clone(),
        colors: cpli_values.iter().map(|v| cpli_color(*v).to_string()).collect(),
        values: cpli_values,
        benchmark: Some(CPLI_BENCHMARK),
    };

    let ctr_vs_frequency = ds
        .campaigns
        .iter()
        .map(|c| ScatterPoint {
            label: c.name.clone(),
            x: c.freq.unwrap_or(0.0),
            y: c.ctr.unwrap_or(0.0),
            color: scatter_color(c).to_string(),
        })
        .collect();

    ChartSet {
        theme,
        palette: palette(theme),
        spend_share,
        cpli_by_campaign,
        ctr_vs_frequency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_dataset;

    #[test]
    fn labels_are_truncated_by_chars() {
        assert_eq!(short_label("Retarg_Homepage"), "Retarg_Homepage");
        assert_eq!(short_label("Prosp_Broad_Static_Image"), "Prosp_Broad_Sta…");
        assert_eq!(short_label("Campaña_de_Otoño_MX"), "Campaña_de_Otoñ…");
    }

    #[test]
    fn series_line_up_with_campaigns() {
        let ds = demo_dataset();
        let charts = build_charts(&ds, Theme::Dark);
        assert_eq!(charts.palette, palette(Theme::Dark));
        assert_eq!(charts.spend_share.values.len(), 6);
        assert_eq!(charts.spend_share.colors[0], "#e73642bb");
        assert_eq!(charts.cpli_by_campaign.benchmark, Some(5.0));
        // Prosp_Broad_Static_Image at 9.60 is over the red line.
        assert_eq!(charts.cpli_by_campaign.colors[4], RED);
        assert_eq!(charts.cpli_by_campaign.colors[0], GREEN);
        assert_eq!(charts.ctr_vs_frequency[0].x, 1.6);
        assert_eq!(charts.ctr_vs_frequency[0].color, "rgba(16,201,143,.8)");
        assert_eq!(charts.ctr_vs_frequency[4].color, "rgba(231,54,66,.8)");
    }

    #[test]
    fn missing_cpli_plots_as_zero() {
        let mut ds = demo_dataset();
        ds.campaigns[2].cpli = None;
        let charts = build_charts(&ds, Theme::Light);
        assert_eq!(charts.cpli_by_campaign.values[2], 0.0);
    }
}
