use crate::types::{
    AccountMetrics, Action, Alert, AlertLevel, Campaign, CampaignRow, Dataset, Decisions,
    KpiCard, SummaryStats,
};
use crate::util::{fmt_count, fmt_k, fmt_money, fmt_pct, fmt_times};

/// Target CPL-I for the account, in account currency.
pub const CPLI_BENCHMARK: f64 = 5.0;

const NO_DATA: &str = "Sin datos";

fn cpli_badge(cpli: Option<f64>) -> &'static str {
    match cpli.unwrap_or(0.0) {
        v if v <= 0.0 => NO_DATA,
        v if v < 5.0 => "Bajo benchmark",
        v if v < 8.0 => "Monitorear",
        _ => "Sobre benchmark",
    }
}

fn ctr_badge(ctr: Option<f64>) -> &'static str {
    match ctr {
        None => NO_DATA,
        Some(v) if v >= 3.0 => "Excelente",
        Some(v) if v >= 2.0 => "Sólido",
        Some(v) if v >= 1.0 => "Bajo — Revisar creative",
        Some(_) => "Crítico",
    }
}

fn lpv_rate_badge(rate: Option<f64>) -> &'static str {
    match rate {
        None => NO_DATA,
        Some(v) if v >= 85.0 => "Óptima",
        Some(v) if v >= 70.0 => "Monitorear",
        Some(_) => "Crítica — Fricción alta",
    }
}

fn freq_badge(freq: Option<f64>) -> &'static str {
    match freq {
        None => NO_DATA,
        Some(v) if v > 2.5 => "Monitorear",
        Some(_) => "OK",
    }
}

fn card(metric: &str, value: String, status: &str) -> KpiCard {
    KpiCard {
        metric: metric.to_string(),
        value,
        status: status.to_string(),
    }
}

pub fn kpi_cards(m: &AccountMetrics) -> Vec<KpiCard> {
    vec![
        card("CPL-I", fmt_money(m.cpli), cpli_badge(m.cpli)),
        card("CTR (enlace)", fmt_pct(m.ctr), ctr_badge(m.ctr)),
        card("Tasa LPV / LC", fmt_pct(m.lpv_rate), lpv_rate_badge(m.lpv_rate)),
        card("Clics intención", fmt_k(Some(m.intent_clicks as f64)), ""),
        card("CPC", fmt_money(m.cpc), ""),
        card("CPM", fmt_money(m.cpm), ""),
        card("Frecuencia", fmt_times(m.freq), freq_badge(m.freq)),
        card("Gasto", fmt_money(Some(m.spend)), ""),
    ]
}

pub fn campaign_table(campaigns: &[Campaign]) -> Vec<CampaignRow> {
    campaigns
        .iter()
        .map(|c| CampaignRow {
            name: c.name.clone(),
            spend: fmt_money(Some(c.spend)),
            cpc: fmt_money(c.cpc),
            ctr: fmt_pct(c.ctr),
            lpv: fmt_count(c.lpv),
            freq: fmt_times(c.freq),
            cpli: fmt_money(c.cpli),
            action: c.action.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winner {
    pub index: usize,
    pub score: f64,
}

/// CTR per unit of CPL-I, boosted for campaigns that are not yet saturated.
/// Campaigns without a nonzero CTR and CPL-I are not ranked.
pub fn winner_score(c: &Campaign) -> Option<f64> {
    let cpli = c.cpli.filter(|v| *v != 0.0)?;
    let ctr = c.ctr.filter(|v| *v != 0.0)?;
    let boost = if c.freq.unwrap_or(3.0) < 2.5 { 1.2 } else { 0.8 };
    Some(ctr / cpli * boost)
}

/// Highest score wins; the earlier campaign keeps ties.
pub fn pick_winner(campaigns: &[Campaign]) -> Option<Winner> {
    let mut best: Option<Winner> = None;
    for (index, c) in campaigns.iter().enumerate() {
        let Some(score) = winner_score(c) else { continue };
        if best.map_or(true, |b| score > b.score) {
            best = Some(Winner { index, score });
        }
    }
    best
}

fn over_pause_line(c: &Campaign) -> bool {
    c.cpli.is_some_and(|v| v > CPLI_BENCHMARK * 2.0)
}

fn shows_scale_signal(c: &Campaign) -> bool {
    c.cpli.is_some_and(|v| v != 0.0 && v < CPLI_BENCHMARK * 0.7) && c.freq.unwrap_or(3.0) < 2.0
}

fn lpv_rate_alert(m: &AccountMetrics) -> Option<Alert> {
    let rate = m.lpv_rate.filter(|r| *r != 0.0 && *r < 85.0)?;
    Some(Alert {
        level: if rate < 70.0 {
            AlertLevel::Critical
        } else {
            AlertLevel::Warning
        },
        title: format!("Tasa LPV/LC en {} — Fricción post-clic", fmt_pct(Some(rate))),
        detail: format!(
            "El {:.0}% de los clics no completan la carga. Revisar velocidad de carga mobile.",
            100.0 - rate
        ),
        action: "Auditar PageSpeed mobile · Considerar landing propia".to_string(),
    })
}

pub fn alerts(ds: &Dataset) -> Vec<Alert> {
    let mut out = Vec::new();

    for c in ds.campaigns.iter().filter(|c| over_pause_line(c)) {
        let detail = match c.freq {
            Some(f) if f > 3.0 => format!(
                "Frecuencia {} confirma saturación. Creative agotado. Pausar y crear nuevo ad antes de reactivar.",
                fmt_times(Some(f))
            ),
            _ => "CPL-I fuera de rango. Revisar segmentación, creativos y relevancia del CTA.".to_string(),
        };
        out.push(Alert {
            level: AlertLevel::Critical,
            title: format!("{} — CPL-I {} supera 2× benchmark", c.name, fmt_money(c.cpli)),
            detail,
            action: "Pausar · Crear nuevo creative".to_string(),
        });
    }

    out.extend(lpv_rate_alert(&ds.metrics));

    for c in ds
        .campaigns
        .iter()
        .filter(|c| shows_scale_signal(c) && c.ctr.unwrap_or(0.0) > 2.5)
    {
        out.push(Alert {
            level: AlertLevel::Ok,
            title: format!("{} — Señal de escala activa", c.name),
            detail: format!(
                "CPL-I {} sostenido con CTR {} y frecuencia {} controlada. Incrementar +20% y producir variación.",
                fmt_money(c.cpli),
                fmt_pct(c.ctr),
                fmt_times(c.freq)
            ),
            action: "Escalar budget +20% · Producir variación creative".to_string(),
        });
    }

    out.push(Alert {
        level: AlertLevel::Info,
        title: "Solicitar datos de conversión al cliente".to_string(),
        detail: format!(
            "Entregaste {} clics de alta intención. Pedir número de ventas/reservas del período vs anterior.",
            fmt_k(Some(ds.metrics.intent_clicks as f64))
        ),
        action: "Enviar solicitud semanal al cliente".to_string(),
    });
    out
}

/// Alerts that need attention: campaigns past the pause line plus the
/// account LPV-rate warning. Scale signals and the info note are not counted.
pub fn alert_count(ds: &Dataset) -> usize {
    let campaigns = ds.campaigns.iter().filter(|c| over_pause_line(c)).count();
    campaigns + usize::from(lpv_rate_alert(&ds.metrics).is_some())
}

pub fn decisions(campaigns: &[Campaign]) -> Decisions {
    let mut d = Decisions::default();
    for c in campaigns {
        let name = c.name.clone();
        if shows_scale_signal(c) {
            d.scale.push(name);
        } else if over_pause_line(c) || c.freq.unwrap_or(0.0) > 4.5 {
            d.pause.push(name);
        } else {
            d.optimize.push(name);
        }
    }
    d
}

pub fn generate_summary(ds: &Dataset) -> SummaryStats {
    let count = |a: Action| ds.campaigns.iter().filter(|c| c.action == a).count();
    SummaryStats {
        client_name: ds.client_name.clone(),
        period: ds.period.clone(),
        total_campaigns: ds.campaigns.len(),
        scale_count: count(Action::Escalar),
        optimize_count: count(Action::Optimizar),
        pause_count: count(Action::PausarHoy),
        stable_count: count(Action::Estable),
        metrics: ds.metrics.clone(),
        winner: pick_winner(&ds.campaigns).map(|w| ds.campaigns[w.index].name.clone()),
        alert_count: alert_count(ds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_dataset;
    use crate::metrics::derive_campaign;
    use crate::types::CampaignFields;

    fn campaign(name: &str, cpli: Option<f64>, ctr: Option<f64>, freq: Option<f64>) -> Campaign {
        let mut c = derive_campaign(CampaignFields {
            name: Some(name.to_string()),
            ..Default::default()
        });
        c.cpli = cpli;
        c.ctr = ctr;
        c.freq = freq;
        c
    }

    #[test]
    fn kpi_badges_follow_thresholds() {
        assert_eq!(cpli_badge(None), "Sin datos");
        assert_eq!(cpli_badge(Some(4.99)), "Bajo benchmark");
        assert_eq!(cpli_badge(Some(5.0)), "Monitorear");
        assert_eq!(cpli_badge(Some(8.0)), "Sobre benchmark");
        assert_eq!(ctr_badge(Some(3.0)), "Excelente");
        assert_eq!(ctr_badge(Some(2.0)), "Sólido");
        assert_eq!(ctr_badge(Some(0.5)), "Crítico");
        assert_eq!(lpv_rate_badge(Some(85.0)), "Óptima");
        assert_eq!(lpv_rate_badge(Some(69.9)), "Crítica — Fricción alta");
    }

    #[test]
    fn kpi_cards_render_missing_as_placeholder() {
        let cards = kpi_cards(&AccountMetrics::default());
        assert_eq!(cards[0].value, "--");
        assert_eq!(cards[0].status, "Sin datos");
        assert_eq!(cards.last().unwrap().value, "$0.00");
    }

    #[test]
    fn campaign_table_formats_rows() {
        let rows = campaign_table(&demo_dataset().campaigns);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].spend, "$820.00");
        assert_eq!(rows[0].ctr, "3.1%");
        assert_eq!(rows[4].action, "Pausar HOY");
    }

    #[test]
    fn winner_prefers_cheap_unsaturated_campaigns() {
        let cs = vec![
            campaign("a", Some(4.0), Some(2.0), Some(3.0)),
            campaign("b", Some(4.0), Some(2.0), Some(1.5)),
            campaign("c", None, Some(9.0), Some(1.0)),
        ];
        let w = pick_winner(&cs).unwrap();
        assert_eq!(w.index, 1);
        assert!((w.score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn winner_ties_keep_first_and_empty_has_none() {
        let cs = vec![
            campaign("a", Some(2.0), Some(2.0), None),
            campaign("b", Some(2.0), Some(2.0), None),
        ];
        assert_eq!(pick_winner(&cs).unwrap().index, 0);
        assert_eq!(pick_winner(&[campaign("x", None, None, None)]), None);
    }

    #[test]
    fn demo_winner_is_retargeting() {
        // 4.2 / 1.8 * 0.8 beats 3.1 / 3.1 * 1.2.
        let ds = demo_dataset();
        let w = pick_winner(&ds.campaigns).unwrap();
        assert_eq!(ds.campaigns[w.index].name, "Retarg_Visita_Producto");
    }

    #[test]
    fn alerts_in_order() {
        let mut ds = demo_dataset();
        ds.campaigns = vec![
            campaign("caro", Some(12.0), Some(1.0), Some(3.5)),
            campaign("escala", Some(3.0), Some(3.0), Some(1.5)),
        ];
        ds.metrics.lpv_rate = Some(60.0);
        let a = alerts(&ds);
        assert_eq!(a.len(), 4);
        assert_eq!(a[0].level, AlertLevel::Critical);
        assert!(a[0].title.starts_with("caro — CPL-I $12.00"));
        assert!(a[0].detail.contains("saturación"));
        assert_eq!(a[1].level, AlertLevel::Critical);
        assert!(a[1].detail.starts_with("El 40%"));
        assert_eq!(a[2].level, AlertLevel::Ok);
        assert_eq!(a[3].level, AlertLevel::Info);
        assert!(a[3].detail.contains("2K"));
        assert_eq!(alert_count(&ds), 2);
    }

    #[test]
    fn lpv_warning_between_70_and_85() {
        let mut ds = demo_dataset();
        assert_eq!(lpv_rate_alert(&ds.metrics).unwrap().level, AlertLevel::Warning);
        ds.metrics.lpv_rate = Some(90.0);
        assert!(lpv_rate_alert(&ds.metrics).is_none());
        ds.metrics.lpv_rate = None;
        assert!(lpv_rate_alert(&ds.metrics).is_none());
    }

    #[test]
    fn decision_buckets() {
        let d = decisions(&demo_dataset().campaigns);
        assert_eq!(d.scale, vec!["Prosp_Familias_Video"]);
        assert!(d.pause.is_empty());
        assert_eq!(d.optimize.len(), 5);

        let d = decisions(&[
            campaign("saturada", Some(5.0), None, Some(4.6)),
            campaign("cara", Some(10.5), None, None),
        ]);
        assert_eq!(d.pause, vec!["saturada", "cara"]);
    }

    #[test]
    fn summary_counts_actions() {
        let s = generate_summary(&demo_dataset());
        assert_eq!(s.total_campaigns, 6);
        assert_eq!(s.scale_count, 1);
        assert_eq!(s.optimize_count, 2);
        assert_eq!(s.pause_count, 1);
        assert_eq!(s.stable_count, 2);
        assert_eq!(s.winner.as_deref(), Some("Retarg_Visita_Producto"));
        assert_eq!(s.alert_count, 1);
    }
}
