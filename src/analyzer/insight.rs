//! Structured insight inputs and the deterministic fallback insight

use serde::{Deserialize, Serialize};

use crate::persona::PersonaCatalog;
use crate::types::{ContentKind, ContentPiece, PerformanceSummary, Rate};

/// Display name for the general (blog) audience
const GENERAL_AUDIENCE_NAME: &str = "All segments";

/// One piece singled out for the insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceHighlight {
    pub content_id: String,
    pub persona_id: Option<String>,
    pub persona_name: String,
    pub kind: ContentKind,
    pub title: String,
    pub delivered: u64,
    pub clicked: u64,
    pub open_rate: Rate,
    pub click_rate: Rate,
}

/// Everything the generator needs to write a qualitative insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    pub campaign_id: String,
    pub topic: String,
    pub pass: u32,
    pub total_delivered: u64,
    pub ranked: usize,
    pub unranked: usize,
    pub best: Option<PieceHighlight>,
    pub worst: Option<PieceHighlight>,

    /// Best minus worst open rate, when both are defined
    pub open_rate_delta: Option<f64>,

    /// Best minus worst click rate, when both are defined
    pub click_rate_delta: Option<f64>,
}

/// Build the structured insight inputs for a summary
pub fn insight_request(
    topic: &str,
    summary: &PerformanceSummary,
    pieces: &[ContentPiece],
    catalog: &PersonaCatalog,
) -> InsightRequest {
    let highlight = |id: Option<&str>| -> Option<PieceHighlight> {
        let id = id?;
        let metrics = summary.metrics_for(id)?;
        let piece = pieces.iter().find(|p| p.id == id)?;
        let persona_name = match piece.persona_id.as_deref() {
            Some(pid) => catalog
                .get(pid)
                .map(|p| p.name.clone())
                .unwrap_or_else(|_| pid.to_string()),
            None => GENERAL_AUDIENCE_NAME.to_string(),
        };
        Some(PieceHighlight {
            content_id: id.to_string(),
            persona_id: piece.persona_id.clone(),
            persona_name,
            kind: piece.kind,
            title: piece.title.clone(),
            delivered: metrics.counts.delivered,
            clicked: metrics.counts.clicked,
            open_rate: metrics.open_rate,
            click_rate: metrics.click_rate,
        })
    };

    let best = highlight(summary.top());
    let worst = if summary.ranking.len() > 1 {
        highlight(summary.bottom())
    } else {
        None
    };

    let delta = |pick: fn(&PieceHighlight) -> Rate| -> Option<f64> {
        let (b, w) = (best.as_ref()?, worst.as_ref()?);
        Some(pick(b).value()? - pick(w).value()?)
    };
    let open_rate_delta = delta(|h: &PieceHighlight| h.open_rate);
    let click_rate_delta = delta(|h: &PieceHighlight| h.click_rate);

    InsightRequest {
        campaign_id: summary.campaign_id.clone(),
        topic: topic.to_string(),
        pass: summary.pass,
        total_delivered: summary.metrics.iter().map(|m| m.counts.delivered).sum(),
        ranked: summary.ranking.len(),
        unranked: summary.unranked.len(),
        best,
        worst,
        open_rate_delta,
        click_rate_delta,
    }
}

/// Deterministic insight text used when the generator cannot write one
pub fn fallback_insight(request: &InsightRequest) -> String {
    let Some(best) = request.best.as_ref() else {
        return format!(
            "Pass {} produced no deliveries for \"{}\", so there is no engagement to compare yet.",
            request.pass, request.topic
        );
    };

    let mut text = format!(
        "Delivered to {} recipients across {} ranked piece(s). The {} {} \"{}\" led with {} clicks ({} open rate, {} click-through).",
        request.total_delivered,
        request.ranked,
        best.persona_name,
        best.kind,
        best.title,
        best.clicked,
        best.open_rate,
        best.click_rate,
    );

    if let Some(worst) = request.worst.as_ref() {
        text.push_str(&format!(
            " The {} {} trailed with {} clicks ({} open rate",
            worst.persona_name, worst.kind, worst.clicked, worst.open_rate,
        ));
        if let Some(delta) = request.open_rate_delta {
            text.push_str(&format!(", {:.1} points behind", delta * 100.0));
        }
        text.push_str(").");
    }

    text.push_str(&format!(
        " Keep the angle that resonated with {} and test sharper subject lines for the weaker segments.",
        best.persona_name
    ));

    if request.unranked > 0 {
        text.push_str(&format!(
            " {} piece(s) had no deliveries and were left unranked.",
            request.unranked
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::types::{DistributionMode, EngagementCounts, EngagementOutcome};

    fn setup() -> (Vec<ContentPiece>, PerformanceSummary, PersonaCatalog) {
        let catalog = PersonaCatalog::bundled().unwrap();
        let blog = ContentPiece::new("c1", None, ContentKind::Blog, "Automation 101", "words here", 0);
        let creatives = ContentPiece::new(
            "c1",
            Some("creatives".into()),
            ContentKind::Newsletter,
            "Create more",
            "words",
            1,
        );
        let founders = ContentPiece::new(
            "c1",
            Some("founders".into()),
            ContentKind::Newsletter,
            "ROI now",
            "words",
            2,
        );
        let counts = |d, o, c| EngagementCounts { delivered: d, opened: o, clicked: c, unsubscribed: 0, bounced: 0 };
        let outcomes = vec![
            EngagementOutcome::new(&blog.id, counts(100, 20, 2), DistributionMode::Mock),
            EngagementOutcome::new(&creatives.id, counts(100, 40, 10), DistributionMode::Mock),
            EngagementOutcome::new(&founders.id, counts(100, 30, 4), DistributionMode::Mock),
        ];
        let pieces = vec![blog, creatives, founders];
        let summary = analyze("c1", 1, &pieces, &outcomes);
        (pieces, summary, catalog)
    }

    #[test]
    fn test_request_best_and_worst() {
        let (pieces, summary, catalog) = setup();
        let req = insight_request("AI tools", &summary, &pieces, &catalog);

        let best = req.best.as_ref().unwrap();
        assert_eq!(best.persona_name, "Creative Professionals");
        assert_eq!(best.clicked, 10);

        let worst = req.worst.as_ref().unwrap();
        assert_eq!(worst.persona_name, "All segments");
        assert_eq!(worst.kind, ContentKind::Blog);

        assert!((req.open_rate_delta.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(req.total_delivered, 300);
        assert_eq!(req.ranked, 3);
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let (pieces, summary, catalog) = setup();
        let req = insight_request("AI tools", &summary, &pieces, &catalog);

        let a = fallback_insight(&req);
        let b = fallback_insight(&req);
        assert_eq!(a, b);
        assert!(a.contains("Creative Professionals"));
        assert!(a.contains("40.0% open rate"));
        assert!(a.contains("20.0 points behind"));
    }

    #[test]
    fn test_fallback_without_deliveries() {
        let catalog = PersonaCatalog::bundled().unwrap();
        let piece = ContentPiece::new("c1", None, ContentKind::Blog, "T", "b", 0);
        let summary = analyze("c1", 1, std::slice::from_ref(&piece), &[]);
        let req = insight_request("AI tools", &summary, &[piece], &catalog);

        assert!(req.best.is_none());
        assert!(req.worst.is_none());
        assert!(fallback_insight(&req).contains("no deliveries"));
    }

    #[test]
    fn test_single_ranked_piece_has_no_worst() {
        let catalog = PersonaCatalog::bundled().unwrap();
        let piece = ContentPiece::new("c1", Some("founders".into()), ContentKind::Newsletter, "T", "b", 0);
        let outcome = EngagementOutcome::new(
            &piece.id,
            EngagementCounts { delivered: 10, opened: 5, clicked: 1, unsubscribed: 0, bounced: 0 },
            DistributionMode::Mock,
        );
        let summary = analyze("c1", 2, std::slice::from_ref(&piece), &[outcome]);
        let req = insight_request("AI tools", &summary, &[piece], &catalog);

        assert!(req.best.is_some());
        assert!(req.worst.is_none());
        assert!(req.open_rate_delta.is_none());
        assert!(!fallback_insight(&req).contains("trailed"));
    }
}
