// Natural-language insights from a hosted LLM.
//
// Prompts are built from the dataset only; the client is a thin blocking
// wrapper over the Anthropic Messages API with no retries.
use crate::reports::pick_winner;
use crate::types::{Campaign, Dataset};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const ACCOUNT_MAX_TOKENS: u32 = 1000;
pub const CAMPAIGN_MAX_TOKENS: u32 = 1200;
pub const AUDIT_MAX_TOKENS: u32 = 2000;

/// Stand-in body when the model answers with no text at all.
pub const EMPTY_AUDIT_REPLY: &str = "Sin respuesta de la IA.";

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("no API key configured (set ANTHROPIC_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid JSON in reply: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}

pub type Result<T> = std::result::Result<T, InsightsError>;

pub trait LlmClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

pub struct AnthropicClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: Option<&str>, model: &str, base_url: &str) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(InsightsError::MissingApiKey)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl LlmClient for AnthropicClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });
        debug!(model = %self.model, max_tokens, "sending insights request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()?;

        let status = response.status();
        let payload: Value = response.json().unwrap_or(Value::Null);
        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("API {}", status.as_u16()));
            return Err(InsightsError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let text = reply_text(&payload)?;
        info!(chars = text.len(), "insights received");
        Ok(text)
    }
}

/// Concatenate the text blocks of a Messages API response.
pub fn reply_text(payload: &Value) -> Result<String> {
    let blocks = payload["content"]
        .as_array()
        .ok_or_else(|| InsightsError::UnexpectedReply("missing content array".to_string()))?;
    Ok(blocks
        .iter()
        .filter_map(|b| b["text"].as_str())
        .collect::<Vec<_>>()
        .join(""))
}

/// Drop markdown code fences some replies wrap their JSON in, then parse.
pub fn parse_json_reply(text: &str) -> Result<Value> {
    let mut cleaned = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            let rest = trimmed.trim_start_matches('`');
            let rest = rest
                .strip_prefix("json")
                .or_else(|| rest.strip_prefix("JSON"))
                .unwrap_or(rest);
            cleaned.push_str(rest);
        } else {
            cleaned.push_str(line);
        }
        cleaned.push('\n');
    }
    Ok(serde_json::from_str(cleaned.trim())?)
}

fn or_zero(v: Option<f64>) -> f64 {
    v.unwrap_or(0.0)
}

pub fn account_summary(ds: &Dataset) -> String {
    let m = &ds.metrics;
    let mut lines = vec![
        format!("Datos Meta Ads ({}):", ds.period),
        format!("Gasto: ${:.0}", m.spend),
        format!("CPL-I: ${:.2} (bench <$5)", or_zero(m.cpli)),
        format!("CTR: {:.1}%", or_zero(m.ctr)),
        format!("Frecuencia: {:.1}×", or_zero(m.freq)),
        "Campañas:".to_string(),
    ];
    for c in &ds.campaigns {
        lines.push(format!(
            "- {}: ${} CPL-I ${:.2} CTR {:.1}% Frec {:.1}× {}",
            c.name,
            c.spend,
            or_zero(c.cpli),
            or_zero(c.ctr),
            or_zero(c.freq),
            c.action
        ));
    }
    lines.join("\n")
}

pub fn account_prompt(ds: &Dataset) -> String {
    format!(
        "Eres estratega experto en Meta Ads. Analiza y da:\n\
         1. Diagnóstico general (2-3 líneas)\n\
         2. Top 3 prioridades inmediatas (específicas a campañas y métricas reales)\n\
         3. Una oportunidad no obvia\n\
         Directo, específico, basado en números. Español.\n\n{}",
        account_summary(ds)
    )
}

fn or_na(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Full account audit: every campaign plus the account averages, answered as
/// a sectioned Markdown report with a prioritised action plan.
pub fn audit_prompt(ds: &Dataset) -> String {
    let m = &ds.metrics;
    let campaigns: Vec<String> = ds
        .campaigns
        .iter()
        .map(|c| {
            format!(
                "{} | Spend: ${} | CTR: {}% | CPC: ${} | CPM: {} | Frec: {} | Acción: {}",
                c.name,
                c.spend,
                or_na(c.ctr),
                or_na(c.cpc),
                or_na(c.cpm),
                or_na(c.freq),
                c.action
            )
        })
        .collect();
    format!(
        "Eres un Senior Meta Ads Auditor con 10+ años de experiencia. Tu análisis debe ser técnico, ejecutivo y 100% accionable. Sin relleno. Sin frases genéricas. Habla en español.\n\n\
         DATOS DE LA CUENTA:\n\
         Cliente: {}\n\
         Total campañas: {}\n\
         Presupuesto total del período: ${}\n\
         CTR promedio cuenta: {}%\n\
         CPC promedio: ${}\n\
         CPM promedio: ${}\n\
         Frecuencia promedio: {}\n\
         Impresiones: {}\n\
         Clicks: {}\n\n\
         DETALLE DE CAMPAÑAS:\n{}\n\n\
         GENERA UN REPORTE CON EXACTAMENTE ESTA ESTRUCTURA:\n\n\
         ## EXECUTIVE SUMMARY\n\
         5 puntos críticos con el dato numérico que los sustenta.\n\n\
         ## DIAGNÓSTICO DE SALUD (escala 1-10 con justificación breve)\n\
         - Eficiencia de presupuesto: X/10\n\
         - Calidad estructural: X/10\n\
         - Saturación de audiencias: X/10\n\
         - Rendimiento de creativos: X/10\n\
         - Puntuación global: X/10\n\n\
         ## DESPERDICIOS IDENTIFICADOS\n\
         Lista: Campaña | Problema | Acción recomendada\n\n\
         ## ANÁLISIS TÉCNICO\n\
         Estructura, rendimiento, señales de alerta. Específico con los nombres de campañas reales.\n\n\
         ## PLAN DE ACCIÓN PRIORIZADO\n\
         🔴 URGENTE (esta semana): máx 3 acciones → impacto esperado\n\
         🟡 PRIORITARIO (próximas 2 semanas): máx 4 acciones\n\
         🟢 OPTIMIZACIÓN (próximo mes): máx 4 acciones\n\n\
         ## PROYECCIÓN DE MEJORA\n\
         - Ahorro mensual estimado si se ejecutan acciones urgentes\n\
         - Mejora de CTR proyectada\n\
         - Reducción de CPC proyectada\n\
         - Observación final: una línea con el hallazgo más importante.",
        ds.client_name,
        ds.campaigns.len(),
        m.spend,
        or_na(m.ctr),
        or_na(m.cpc),
        or_na(m.cpm),
        or_na(m.freq),
        m.impressions,
        m.link_clicks,
        campaigns.join("\n")
    )
}

/// Ask `client` for the account audit. A blank reply becomes a placeholder.
pub fn request_audit(client: &dyn LlmClient, ds: &Dataset) -> Result<String> {
    let text = client.complete(&audit_prompt(ds), AUDIT_MAX_TOKENS)?;
    if text.trim().is_empty() {
        return Ok(EMPTY_AUDIT_REPLY.to_string());
    }
    Ok(text)
}

/// The three campaign deep-dive views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InsightTab {
    Diagnostico,
    Audiencia,
    Ideas,
}

impl InsightTab {
    pub const ALL: [InsightTab; 3] = [InsightTab::Diagnostico, InsightTab::Audiencia, InsightTab::Ideas];

    pub fn title(self) -> &'static str {
        match self {
            InsightTab::Diagnostico => "Diagnóstico",
            InsightTab::Audiencia => "Audiencia",
            InsightTab::Ideas => "Ideas",
        }
    }

    /// Display labels for the JSON keys the reply is asked to contain.
    pub fn labels(self) -> &'static [(&'static str, &'static str)] {
        match self {
            InsightTab::Diagnostico => &[
                ("performance", "Rendimiento"),
                ("hook", "Hook & Formato creativo"),
                ("cta", "CTA & Landing"),
                ("audiencia", "Señales de audiencia"),
                ("urgencia", "Vida útil estimada"),
            ],
            InsightTab::Audiencia => &[
                ("perfil", "Perfil de audiencia"),
                ("tamanio", "Tamaño estimado"),
                ("calidad", "Calidad de señal"),
                ("expansion", "Potencial de escala"),
                ("fatiga", "Fatiga proyectada"),
            ],
            InsightTab::Ideas => &[],
        }
    }
}

pub fn campaign_context(ds: &Dataset, c: &Campaign) -> String {
    let m = &ds.metrics;
    let others: Vec<&str> = ds
        .campaigns
        .iter()
        .filter(|x| x.name != c.name)
        .map(|x| x.name.as_str())
        .collect();
    let others = if others.is_empty() {
        "--".to_string()
    } else {
        others.join(", ")
    };
    format!(
        "Campaña: \"{}\"\nGasto: ${}\nCPL-I: ${:.2} (bench <$5)\nCTR: {:.1}%\nCPC: ${:.2}\nLPV: {}\n\
         Frecuencia: {:.1}x\nAcción: {}\nCuenta total: gasto ${} CPL-I avg ${:.2} CTR {:.1}%\nOtras campañas: {}",
        c.name,
        c.spend,
        or_zero(c.cpli),
        or_zero(c.ctr),
        or_zero(c.cpc),
        c.lpv.unwrap_or(0),
        or_zero(c.freq),
        c.action,
        m.spend,
        or_zero(m.cpli),
        or_zero(m.ctr),
        others
    )
}

/// `None` when `index` is past the last campaign.
pub fn campaign_prompt(ds: &Dataset, index: usize, tab: InsightTab) -> Option<String> {
    let c = ds.campaigns.get(index)?;
    let ctx = campaign_context(ds, c);
    let prompt = match tab {
        InsightTab::Diagnostico => format!(
            "Analiza esta campaña de Meta Ads. Responde SOLO en JSON sin texto extra:\n\
             {{\"performance\":\"...\",\"hook\":\"...\",\"cta\":\"...\",\"audiencia\":\"...\",\"urgencia\":\"...\"}}\nData:\n{}",
            ctx
        ),
        InsightTab::Audiencia => format!(
            "Analiza el perfil de audiencia. Responde SOLO en JSON:\n\
             {{\"perfil\":\"...\",\"tamanio\":\"...\",\"calidad\":\"...\",\"expansion\":\"...\",\"fatiga\":\"...\"}}\nData:\n{}",
            ctx
        ),
        InsightTab::Ideas => format!(
            "Genera 3 ideas de ads para replicar el éxito. Responde SOLO en JSON:\n\
             {{\"ideas\":[{{\"titulo\":\"...\",\"formato\":\"...\",\"hook\":\"...\",\"descripcion\":\"...\",\"porque\":\"...\",\"tags\":[\"...\"]}},...]}}\nData:\n{}",
            ctx
        ),
    };
    Some(prompt)
}

/// Ask for three creative variants of the top-ranked campaign.
pub fn variants_prompt(ds: &Dataset) -> Option<String> {
    let w = pick_winner(&ds.campaigns)?;
    let c = &ds.campaigns[w.index];
    let m = &ds.metrics;
    Some(format!(
        "Eres un estratega creativo experto en Meta Ads. Analiza este ad ganador y genera 3 variantes para recrearlo y mejorarlo.\n\n\
         Ad Ganador: \"{}\"\n\
         CPL-I: ${:.2} | CTR: {:.1}% | Frecuencia: {:.1}x | LPV: {}\n\
         Contexto cuenta: Gasto total ${} · CPL-I promedio ${:.2} · {} campañas activas\n\n\
         Responde SOLO en JSON sin texto extra ni markdown:\n\
         {{\"variantes\":[{{\"num\":\"VARIANTE 01\",\"formato\":\"[Video Reel/Imagen Estática/Carrusel/Story]\",\"titulo\":\"...\",\"hook\":\"...\",\"descripcion\":\"...\",\"tags\":[\"...\"]}},...]}}",
        c.name,
        or_zero(c.cpli),
        or_zero(c.ctr),
        or_zero(c.freq),
        c.lpv.unwrap_or(0),
        m.spend,
        or_zero(m.cpli),
        ds.campaigns.len()
    ))
}

/// Render a parsed tab reply as `Label: text` lines; ideas become a numbered list.
pub fn render_tab_reply(tab: InsightTab, reply: &Value) -> Result<String> {
    match tab {
        InsightTab::Ideas => {
            let ideas = reply["ideas"]
                .as_array()
                .ok_or_else(|| InsightsError::UnexpectedReply("missing `ideas` array".to_string()))?;
            let mut out = Vec::new();
            for (i, idea) in ideas.iter().enumerate() {
                let field = |k: &str| idea[k].as_str().unwrap_or("--").to_string();
                let tags: Vec<&str> = idea["tags"]
                    .as_array()
                    .map(|t| t.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                out.push(format!(
                    "IDEA {} [{}] {}\n  Hook: \"{}\"\n  {}\n  Por qué funcionará: {}\n  Tags: {}",
                    i + 1,
                    field("formato"),
                    field("titulo"),
                    field("hook"),
                    field("descripcion"),
                    field("porque"),
                    if tags.is_empty() { "--".to_string() } else { tags.join(", ") }
                ));
            }
            Ok(out.join("\n"))
        }
        _ => {
            if !reply.is_object() {
                return Err(InsightsError::UnexpectedReply("expected a JSON object".to_string()));
            }
            Ok(tab
                .labels()
                .iter()
                .map(|(key, label)| format!("{}: {}", label, reply[*key].as_str().unwrap_or("--")))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
