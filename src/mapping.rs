// Header auto-detection and manual column overrides.
use crate::types::{Field, MappingRow};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static FIELD_BY_KEY: Lazy<HashMap<&'static str, Field>> =
    Lazy::new(|| Field::ALL.iter().map(|f| (f.key(), *f)).collect());

/// Lowercase substrings that identify each field, covering the English and
/// Spanish column names Ads Manager exports with.
pub fn patterns(field: Field) -> &'static [&'static str] {
    match field {
        Field::CampaignName => &["campaign name", "campana", "nombre"],
        Field::AmountSpent => &["amount spent", "gasto", "importe", "spend"],
        Field::CpcAll => &["cpc", "cost per click"],
        Field::CtrLink => &["ctr (link)", "ctr link", "link ctr"],
        Field::LandingPageViews => &["landing page views", "lpv"],
        Field::Impressions => &["impressions", "impresiones"],
        Field::Reach => &["reach", "alcance"],
        Field::LinkClicks => &["link clicks", "clics"],
        Field::Frequency => &["frequency", "frecuencia"],
        Field::Cpm => &["cpm"],
    }
}

pub fn field_by_key(key: &str) -> Option<Field> {
    FIELD_BY_KEY.get(key.trim().to_lowercase().as_str()).copied()
}

/// Canonical field -> column index. A missing entry means "not mapped".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: HashMap<Field, usize>,
}

impl ColumnMapping {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn set(&mut self, field: Field, column: Option<usize>) {
        match column {
            Some(idx) => {
                self.columns.insert(field, idx);
            }
            None => {
                self.columns.remove(&field);
            }
        }
    }

    pub fn apply(&mut self, overrides: &[MappingOverride]) {
        for o in overrides {
            self.set(o.field, o.column);
        }
    }

    /// The mapped cell for `field`, or `None` when unmapped, out of range or empty.
    pub fn read<'a>(&self, row: &'a [String], field: Field) -> Option<&'a str> {
        let idx = self.get(field)?;
        row.get(idx).map(String::as_str).filter(|s| !s.is_empty())
    }

    pub fn unmapped(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn to_rows(&self, headers: &[String]) -> Vec<MappingRow> {
        Field::ALL
            .iter()
            .map(|f| {
                let column = match self.get(*f) {
                    Some(idx) => match headers.get(idx) {
                        Some(h) => format!("[{}] {}", idx, h),
                        None => format!("[{}]", idx),
                    },
                    None => "--".to_string(),
                };
                let label = if f.required() {
                    format!("{} *", f.label())
                } else {
                    f.label().to_string()
                };
                MappingRow {
                    field: f.key().to_string(),
                    label,
                    column,
                }
            })
            .collect()
    }
}

/// First header (in header order) containing any of the field's patterns,
/// compared case-insensitively.
pub fn auto_detect(headers: &[String]) -> ColumnMapping {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let mut mapping = ColumnMapping::default();
    for field in Field::ALL {
        let pats = patterns(field);
        let found = lowered
            .iter()
            .position(|h| pats.iter().any(|p| h.contains(p)));
        mapping.set(field, found);
    }
    mapping
}

/// A user choice for one field, given on the command line as `field=idx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingOverride {
    pub field: Field,
    pub column: Option<usize>,
}

/// Parse `field=idx`; `-1` clears the mapping for that field.
pub fn parse_override(s: &str) -> Result<MappingOverride, String> {
    let (key, idx) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=INDEX, got `{}`", s))?;
    let field = field_by_key(key).ok_or_else(|| {
        let known: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        format!("unknown field `{}` (expected one of: {})", key.trim(), known.join(", "))
    })?;
    let idx: i64 = idx
        .trim()
        .parse()
        .map_err(|_| format!("invalid column index `{}`", idx.trim()))?;
    let column = match idx {
        -1 => None,
        i if i >= 0 => Some(i as usize),
        _ => return Err(format!("column index must be >= -1, got {}", idx)),
    };
    Ok(MappingOverride { field, column })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn meta_headers() -> Vec<String> {
        headers(&[
            "Campaign name",
            "Amount spent (USD)",
            "CPC (cost per link click) (USD)",
            "CTR (link click-through rate)",
            "Landing page views",
            "Impressions",
            "Reach",
            "Link clicks",
            "Frequency",
            "CPM (cost per 1,000 impressions) (USD)",
        ])
    }

    #[test]
    fn detects_english_export() {
        let m = auto_detect(&meta_headers());
        assert_eq!(m.get(Field::CampaignName), Some(0));
        assert_eq!(m.get(Field::AmountSpent), Some(1));
        assert_eq!(m.get(Field::CpcAll), Some(2));
        assert_eq!(m.get(Field::LandingPageViews), Some(4));
        assert_eq!(m.get(Field::Impressions), Some(5));
        assert_eq!(m.get(Field::Reach), Some(6));
        assert_eq!(m.get(Field::LinkClicks), Some(7));
        assert_eq!(m.get(Field::Frequency), Some(8));
        assert_eq!(m.get(Field::Cpm), Some(9));
        // "CTR (link click-through rate)" matches none of the ctr patterns.
        assert_eq!(m.get(Field::CtrLink), None);
    }

    #[test]
    fn detects_spanish_export_case_insensitively() {
        let m = auto_detect(&headers(&[
            "NOMBRE DE LA CAMPAÑA",
            "Importe gastado (MXN)",
            "Impresiones",
            "Alcance",
            "Frecuencia",
            "Clics en el enlace",
        ]));
        assert_eq!(m.get(Field::CampaignName), Some(0));
        assert_eq!(m.get(Field::AmountSpent), Some(1));
        assert_eq!(m.get(Field::Impressions), Some(2));
        assert_eq!(m.get(Field::Reach), Some(3));
        assert_eq!(m.get(Field::Frequency), Some(4));
        assert_eq!(m.get(Field::LinkClicks), Some(5));
        assert_eq!(m.get(Field::Cpm), None);
    }

    #[test]
    fn first_matching_header_wins_and_fields_may_share_a_column() {
        let m = auto_detect(&headers(&["Spend", "Amount spent", "CPC / CPM"]));
        assert_eq!(m.get(Field::AmountSpent), Some(0));
        assert_eq!(m.get(Field::CpcAll), Some(2));
        assert_eq!(m.get(Field::Cpm), Some(2));
    }

    #[test]
    fn mapped_reads_return_the_intended_column() {
        let hs = meta_headers();
        let m = auto_detect(&hs);
        for field in Field::ALL {
            if let Some(idx) = m.get(field) {
                let lowered = hs[idx].to_lowercase();
                assert!(patterns(field).iter().any(|p| lowered.contains(p)));
                assert_eq!(m.read(&hs, field), Some(hs[idx].as_str()));
            }
        }
    }

    #[test]
    fn read_handles_missing_and_empty_cells() {
        let mut m = ColumnMapping::default();
        m.set(Field::Reach, Some(5));
        m.set(Field::Cpm, Some(1));
        let row = headers(&["a", ""]);
        assert_eq!(m.read(&row, Field::Reach), None);
        assert_eq!(m.read(&row, Field::Cpm), None);
        assert_eq!(m.read(&row, Field::Frequency), None);
    }

    #[test]
    fn overrides_replace_and_clear_entries() {
        let mut m = auto_detect(&meta_headers());
        m.apply(&[
            parse_override("ctr_link=3").unwrap(),
            parse_override("reach=-1").unwrap(),
        ]);
        assert_eq!(m.get(Field::CtrLink), Some(3));
        assert_eq!(m.get(Field::Reach), None);
        assert!(m.unmapped().contains(&Field::Reach));
    }

    #[test]
    fn parse_override_rejects_bad_input() {
        assert!(parse_override("ctr_link").is_err());
        assert!(parse_override("nope=1").is_err());
        assert!(parse_override("cpm=x").is_err());
        assert!(parse_override("cpm=-4").is_err());
        assert_eq!(
            parse_override(" CPM = 2 ").unwrap(),
            MappingOverride { field: Field::Cpm, column: Some(2) }
        );
    }
}
