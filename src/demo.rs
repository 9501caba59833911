// Built-in sample account shown before any export is loaded.
use crate::types::{AccountMetrics, Action, Campaign, Dataset};

#[allow(clippy::too_many_arguments)]
fn demo_campaign(
    name: &str,
    spend: f64,
    cpc: f64,
    cpli: f64,
    ctr: f64,
    lpv: u64,
    freq: f64,
    intent: u64,
    action: Action,
) -> Campaign {
    Campaign {
        name: name.to_string(),
        spend,
        cpc: Some(cpc),
        ctr: Some(ctr),
        lpv: Some(lpv),
        freq: Some(freq),
        cpm: None,
        impressions: None,
        reach: None,
        link_clicks: None,
        intent: Some(intent),
        cpli: Some(cpli),
        action,
    }
}

/// Curated figures, not derived: the campaign rows and account totals are
/// fixed sample values and do not reconcile with each other.
pub fn demo_dataset() -> Dataset {
    Dataset {
        client_name: "DEMO".to_string(),
        period: "Demo · 15 días".to_string(),
        metrics: AccountMetrics {
            spend: 3200.0,
            impressions: 280_000,
            reach: 142_000,
            link_clicks: 7560,
            lpv_total: 5897,
            intent_clicks: 1840,
            ctr: Some(2.7),
            lpv_rate: Some(78.0),
            cpli: Some(3.20),
            cpc: Some(1.74),
            cpm: Some(11.40),
            freq: Some(2.1),
        },
        campaigns: vec![
            demo_campaign("Prosp_Familias_Video", 820.0, 1.60, 3.10, 3.1, 512, 1.6, 265, Action::Escalar),
            demo_campaign("Retarg_Visita_Producto", 210.0, 1.05, 1.80, 4.2, 200, 2.9, 117, Action::Optimizar),
            demo_campaign("Prosp_Broad_Carousel", 640.0, 2.80, 5.40, 2.4, 229, 1.9, 118, Action::Estable),
            demo_campaign("LAL_1pct_Compradores", 590.0, 3.10, 6.20, 2.1, 190, 2.0, 95, Action::Estable),
            demo_campaign("Prosp_Broad_Static_Image", 480.0, 4.80, 9.60, 1.1, 100, 4.1, 50, Action::PausarHoy),
            demo_campaign("Retarg_Homepage", 460.0, 2.30, 7.10, 2.6, 200, 3.8, 65, Action::Optimizar),
        ],
    }
}
