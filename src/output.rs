use crate::reports::{alerts, campaign_table, decisions, kpi_cards, pick_winner};
use crate::types::Dataset;
use crate::util::{fmt_money, fmt_pct, fmt_times};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

pub fn markdown_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    println!("{}\n", markdown_table(&slice));
}

/// Markdown table over untyped rows. Short rows are padded to the widest one.
pub fn markdown_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let width = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    if width == 0 {
        return "(no rows)".to_string();
    }
    let padded = |cells: &[String]| -> Vec<String> {
        let mut v = cells.to_vec();
        v.resize(width, String::new());
        v
    };
    let mut builder = Builder::default();
    builder.push_record(padded(headers));
    for row in rows {
        builder.push_record(padded(row.as_slice()));
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_raw_rows(headers: &[String], rows: &[Vec<String>]) {
    println!("{}\n", markdown_grid(headers, rows));
}

fn dashed(client_name: &str) -> String {
    client_name
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// `dashboard-<client>-<date>.md`, with whitespace in the client name dashed.
pub fn report_file_name(client_name: &str, date: NaiveDate) -> String {
    format!("dashboard-{}-{}.md", dashed(client_name), date.format("%Y-%m-%d"))
}

/// `auditoria-<client>-<date>.md`; the client name is dashed and lowercased.
pub fn audit_file_name(client_name: &str, date: NaiveDate) -> String {
    format!(
        "auditoria-{}-{}.md",
        dashed(client_name).to_lowercase(),
        date.format("%Y-%m-%d")
    )
}

const PRIORITY_MARKERS: [(&str, &str); 3] = [
    ("🔴", "URGENTE"),
    ("🟡", "PRIORITARIO"),
    ("🟢", "OPTIMIZACIÓN"),
];

/// Lay out the model's audit text as a document: `## ` headings become
/// uppercase section headings, coloured-dot lines become labelled priority
/// items and inline bold markers are dropped from body text.
pub fn render_audit_report(client_name: &str, analysis: &str, generated: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# AUDITORÍA META ADS\n");
    let _ = writeln!(out, "{} · {}\n", client_name, generated.format("%d/%m/%Y"));

    for raw in analysis.lines() {
        let line = raw.trim();
        if line.is_empty() {
            out.push('\n');
            continue;
        }
        if let Some(title) = line.strip_prefix("## ") {
            let _ = writeln!(out, "\n## {}\n", title.to_uppercase());
            continue;
        }
        if let Some((label, rest)) = PRIORITY_MARKERS
            .iter()
            .find_map(|(mark, label)| line.strip_prefix(mark).map(|rest| (label, rest)))
        {
            let _ = writeln!(out, "- **● {} — {}**", label, rest.trim().replace("**", ""));
            continue;
        }
        if let Some(title) = line.strip_prefix("### ") {
            let _ = writeln!(out, "**{}**", title.trim().replace("**", ""));
            continue;
        }
        if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
            let _ = writeln!(out, "**{}**", line.replace("**", ""));
            continue;
        }
        if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("• ")) {
            let _ = writeln!(out, "- {}", item.trim().replace("**", ""));
            continue;
        }
        let _ = writeln!(out, "{}", line.replace("**", ""));
    }

    let _ = writeln!(out, "\n---\nGenerado con IA · {}", generated.format("%d/%m/%Y"));
    out
}

fn bullet_list(out: &mut String, items: &[String], empty: &str) {
    if items.is_empty() {
        let _ = writeln!(out, "- {}", empty);
    }
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

/// Full account report as a Markdown document, one section per dashboard block.
pub fn render_markdown_report(ds: &Dataset, insights: Option<&str>, generated: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# META ADS INTELLIGENCE · {}\n", ds.client_name);
    let _ = writeln!(out, "Período: {}  ", ds.period);
    let _ = writeln!(out, "Campañas: {}\n", ds.campaigns.len());

    let _ = writeln!(out, "## KPIs de cuenta\n");
    let _ = writeln!(out, "{}\n", markdown_table(&kpi_cards(&ds.metrics)));

    if let Some(w) = pick_winner(&ds.campaigns) {
        let c = &ds.campaigns[w.index];
        let _ = writeln!(out, "## Ad ganador\n");
        let _ = writeln!(
            out,
            "**{}** · CTR {} · CPL-I {} · Frec {}\n",
            c.name,
            fmt_pct(c.ctr),
            fmt_money(c.cpli),
            fmt_times(c.freq)
        );
    }

    let _ = writeln!(out, "## Detalle por campaña\n");
    let _ = writeln!(out, "{}\n", markdown_table(&campaign_table(&ds.campaigns)));

    let _ = writeln!(out, "## Alertas\n");
    let _ = writeln!(out, "{}\n", markdown_table(&alerts(ds)));

    let d = decisions(&ds.campaigns);
    let _ = writeln!(out, "## Árbol de decisiones\n");
    let _ = writeln!(out, "### Escalar");
    bullet_list(&mut out, &d.scale, "Sin candidatas aún");
    let _ = writeln!(out, "\n### Optimizar");
    bullet_list(&mut out, &d.optimize, "Sin campañas en optimización");
    let _ = writeln!(out, "\n### Pausar");
    bullet_list(&mut out, &d.pause, "Sin campañas en zona de pausa");

    if let Some(text) = insights {
        let _ = writeln!(out, "\n## AI Insights\n");
        let _ = writeln!(out, "{}", text.trim());
    }

    let _ = writeln!(out, "\n---\nGenerado el {}", generated.format("%d/%m/%Y"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_dataset;

    #[test]
    fn file_name_dashes_whitespace() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(report_file_name("Hotel Playa MX", d), "dashboard-Hotel-Playa-MX-2026-10-19.md");
    }

    #[test]
    fn audit_file_name_is_lowercased() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(audit_file_name("Hotel Playa MX", d), "auditoria-hotel-playa-mx-2026-10-19.md");
    }

    #[test]
    fn audit_report_lays_out_sections_and_priorities() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let analysis = "## Executive Summary\n\
                        - **CPL-I** alto en Prosp_Broad\n\
                        \n\
                        ## Plan de acción priorizado\n\
                        🔴 Pausar Prosp_Broad_Static_Image\n\
                        🟡 Nuevo creative para Retarg_Homepage\n\
                        🟢 Probar LAL 3%\n\
                        ### Nota\n\
                        Texto con **énfasis**.";
        let md = render_audit_report("DEMO", analysis, d);
        for expected in [
            "# AUDITORÍA META ADS\n\nDEMO · 19/10/2026",
            "## EXECUTIVE SUMMARY",
            "- CPL-I alto en Prosp_Broad",
            "## PLAN DE ACCIÓN PRIORIZADO",
            "- **● URGENTE — Pausar Prosp_Broad_Static_Image**",
            "- **● PRIORITARIO — Nuevo creative para Retarg_Homepage**",
            "- **● OPTIMIZACIÓN — Probar LAL 3%**",
            "**Nota**",
            "Texto con énfasis.",
            "Generado con IA · 19/10/2026",
        ] {
            assert!(md.contains(expected), "missing {expected:?}");
        }
    }

    #[test]
    fn grid_pads_ragged_rows() {
        let headers = vec!["Campaign name".to_string(), "Reach".to_string()];
        let rows = vec![vec!["A".to_string()], vec!["B".to_string(), "10".to_string()]];
        let grid = markdown_grid(&headers, &rows);
        assert_eq!(grid.lines().count(), 4);
        assert!(grid.lines().next().unwrap().contains("Campaign name"));
        assert!(grid.contains("10"));
        assert_eq!(markdown_grid(&[], &[]), "(no rows)");
    }

    #[test]
    fn markdown_report_has_every_section() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let md = render_markdown_report(&demo_dataset(), Some("Escalar video."), d);
        for heading in [
            "# META ADS INTELLIGENCE · DEMO",
            "## KPIs de cuenta",
            "## Ad ganador",
            "**Retarg_Visita_Producto**",
            "## Detalle por campaña",
            "## Alertas",
            "### Pausar\n- Sin campañas en zona de pausa",
            "## AI Insights\n\nEscalar video.",
            "Generado el 19/10/2026",
        ] {
            assert!(md.contains(heading), "missing {heading:?}");
        }
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let ds = demo_dataset();

        let csv_path = dir.path().join("campaigns.csv");
        write_csv(&csv_path, &campaign_table(&ds.campaigns)).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.starts_with("Campaign,Spend,CPC,CTR,LPV,Frequency,CPLI,Action"));
        assert_eq!(csv_text.lines().count(), 7);

        let json_path = dir.path().join("dataset.json");
        write_json(&json_path, &ds).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(v["campaigns"][4]["action"], "Pausar HOY");
        assert!(v["campaigns"][0]["cpm"].is_null());
    }

    #[test]
    fn write_reports_missing_directory() {
        let err = write_text(Path::new("/no/such/dir/report.md"), "x").unwrap_err();
        assert!(err.to_string().contains("writing"));
    }
}
