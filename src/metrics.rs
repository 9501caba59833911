// Per-campaign derivations and account-level aggregation.
//
// Ratios are always recomputed from summed counts rather than averaged from
// per-campaign ratios, so large campaigns weigh in proportionally.
use crate::types::{AccountMetrics, Action, Campaign, CampaignFields};

pub const DEFAULT_CAMPAIGN_NAME: &str = "Sin nombre";

/// Spend per intent click; `None` unless spend is nonzero and intent positive.
pub fn cost_per_intent(spend: f64, intent: Option<u64>) -> Option<f64> {
    match intent {
        Some(i) if i > 0 && spend != 0.0 => Some(spend / i as f64).filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Threshold ladder over CPL-I. Order matters: first match wins and all
/// comparisons are strict, so exactly 10 is `Optimizar` and exactly 6 is `Estable`.
pub fn recommend(cpli: Option<f64>) -> Action {
    match cpli {
        None => Action::Estable,
        Some(v) if v > 10.0 => Action::PausarHoy,
        Some(v) if v > 6.0 => Action::Optimizar,
        Some(v) if v < 3.5 => Action::Escalar,
        Some(_) => Action::Estable,
    }
}

pub fn derive_campaign(fields: CampaignFields) -> Campaign {
    let spend = fields.spend.unwrap_or(0.0);
    let intent = fields.lpv;
    let cpli = cost_per_intent(spend, intent);
    Campaign {
        name: fields
            .name
            .unwrap_or_else(|| DEFAULT_CAMPAIGN_NAME.to_string()),
        spend,
        cpc: fields.cpc,
        ctr: fields.ctr,
        lpv: fields.lpv,
        freq: fields.freq,
        cpm: fields.cpm,
        impressions: fields.impressions,
        reach: fields.reach,
        link_clicks: fields.link_clicks,
        intent,
        cpli,
        action: recommend(cpli),
    }
}

/// `num / den * scale`, or `None` when the denominator is zero.
fn ratio(num: f64, den: f64, scale: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    Some(num / den * scale).filter(|v| v.is_finite())
}

pub fn aggregate(campaigns: &[Campaign]) -> AccountMetrics {
    let mut m = AccountMetrics::default();
    for c in campaigns {
        // Counts can reach u64::MAX from a single cell; totals saturate.
        m.spend += c.spend;
        m.impressions = m.impressions.saturating_add(c.impressions.unwrap_or(0));
        m.reach = m.reach.saturating_add(c.reach.unwrap_or(0));
        m.link_clicks = m.link_clicks.saturating_add(c.link_clicks.unwrap_or(0));
        m.lpv_total = m.lpv_total.saturating_add(c.lpv.unwrap_or(0));
        m.intent_clicks = m.intent_clicks.saturating_add(c.intent.unwrap_or(0));
    }

    let impressions = m.impressions as f64;
    let reach = m.reach as f64;
    let link_clicks = m.link_clicks as f64;
    let lpv = m.lpv_total as f64;
    let intent = m.intent_clicks as f64;

    m.ctr = ratio(link_clicks, impressions, 100.0);
    m.lpv_rate = ratio(lpv, link_clicks, 100.0);
    m.cpli = ratio(m.spend, intent, 1.0);
    m.cpc = ratio(m.spend, link_clicks, 1.0);
    m.cpm = ratio(m.spend, impressions, 1000.0);
    m.freq = ratio(impressions, reach, 1.0);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-3;

    fn fields(spend: f64, imp: u64, lc: u64, lpv: u64) -> CampaignFields {
        CampaignFields {
            name: Some("c".to_string()),
            spend: Some(spend),
            impressions: Some(imp),
            link_clicks: Some(lc),
            lpv: Some(lpv),
            ..Default::default()
        }
    }

    #[test]
    fn cpli_needs_spend_and_positive_intent() {
        assert_eq!(cost_per_intent(100.0, Some(20)), Some(5.0));
        assert_eq!(cost_per_intent(100.0, Some(0)), None);
        assert_eq!(cost_per_intent(100.0, None), None);
        assert_eq!(cost_per_intent(0.0, Some(20)), None);
    }

    #[test]
    fn action_thresholds() {
        assert_eq!(recommend(Some(11.0)), Action::PausarHoy);
        assert_eq!(recommend(Some(7.0)), Action::Optimizar);
        assert_eq!(recommend(Some(3.0)), Action::Escalar);
        assert_eq!(recommend(Some(5.0)), Action::Estable);
        assert_eq!(recommend(None), Action::Estable);
    }

    #[test]
    fn action_boundaries_are_strict() {
        assert_eq!(recommend(Some(10.0)), Action::Optimizar);
        assert_eq!(recommend(Some(6.0)), Action::Estable);
        assert_eq!(recommend(Some(3.5)), Action::Estable);
        assert_eq!(recommend(Some(10.5)), Action::PausarHoy);
    }

    #[test]
    fn derive_fills_defaults_and_intent() {
        let c = derive_campaign(CampaignFields::default());
        assert_eq!(c.name, DEFAULT_CAMPAIGN_NAME);
        assert_eq!(c.spend, 0.0);
        assert_eq!(c.cpli, None);
        assert_eq!(c.action, Action::Estable);

        let c = derive_campaign(fields(100.0, 1000, 30, 20));
        assert_eq!(c.intent, Some(20));
        assert_eq!(c.cpli, Some(5.0));
        assert_eq!(c.action, Action::Estable);
    }

    #[test]
    fn aggregates_from_sums() {
        let cs = vec![
            derive_campaign(fields(100.0, 1000, 20, 15)),
            derive_campaign(fields(200.0, 2000, 30, 20)),
        ];
        let m = aggregate(&cs);
        assert_eq!(m.spend, 300.0);
        assert_eq!(m.impressions, 3000);
        assert_eq!(m.link_clicks, 50);
        assert_eq!(m.lpv_total, 35);
        assert_eq!(m.intent_clicks, 35);
        assert!((m.ctr.unwrap() - 1.667).abs() < EPS);
        assert!((m.lpv_rate.unwrap() - 70.0).abs() < EPS);
        assert!((m.cpli.unwrap() - 8.571).abs() < EPS);
        assert!((m.cpc.unwrap() - 6.0).abs() < EPS);
        assert!((m.cpm.unwrap() - 100.0).abs() < EPS);
        // No reach column anywhere.
        assert_eq!(m.freq, None);
    }

    #[test]
    fn zero_denominators_yield_none() {
        let m = aggregate(&[]);
        assert_eq!(m.spend, 0.0);
        assert_eq!(m.ctr, None);
        assert_eq!(m.lpv_rate, None);
        assert_eq!(m.cpli, None);
        assert_eq!(m.cpc, None);
        assert_eq!(m.cpm, None);
        assert_eq!(m.freq, None);

        let only_spend = derive_campaign(CampaignFields {
            spend: Some(50.0),
            ..Default::default()
        });
        let m = aggregate(&[only_spend]);
        assert_eq!(m.spend, 50.0);
        assert_eq!(m.cpli, None);
        assert_eq!(m.cpm, None);
    }

    #[test]
    fn frequency_uses_reach() {
        let c = derive_campaign(CampaignFields {
            impressions: Some(3000),
            reach: Some(1500),
            ..Default::default()
        });
        assert_eq!(aggregate(&[c]).freq, Some(2.0));
    }

    #[test]
    fn frequency_is_zero_without_impressions() {
        let c = derive_campaign(CampaignFields {
            reach: Some(300),
            ..Default::default()
        });
        assert_eq!(aggregate(&[c]).freq, Some(0.0));
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let big = derive_campaign(CampaignFields {
            impressions: Some(u64::MAX),
            lpv: Some(u64::MAX),
            ..Default::default()
        });
        let small = derive_campaign(fields(10.0, 5, 1, 1));
        let m = aggregate(&[big, small]);
        assert_eq!(m.impressions, u64::MAX);
        assert_eq!(m.lpv_total, u64::MAX);
        assert_eq!(m.intent_clicks, u64::MAX);
        assert!(m.ctr.unwrap().is_finite());
        assert!(m.cpm.unwrap() >= 0.0);
    }
}
