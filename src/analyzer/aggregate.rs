//! Outcome aggregation, rate computation and ranking

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::types::{
    ContentMetrics, ContentPiece, EngagementCounts, EngagementOutcome, InsightSource,
    PerformanceSummary,
};

/// Sum every outcome of each piece. Pieces without outcomes get zero counts;
/// outcomes for pieces not in `pieces` are ignored. Output follows `pieces` order.
pub fn aggregate(pieces: &[ContentPiece], outcomes: &[EngagementOutcome]) -> Vec<ContentMetrics> {
    let mut totals: HashMap<&str, EngagementCounts> = HashMap::new();
    for outcome in outcomes {
        *totals.entry(outcome.content_id.as_str()).or_default() += outcome.counts;
    }

    pieces
        .iter()
        .map(|piece| {
            let counts = totals.get(piece.id.as_str()).copied().unwrap_or_default();
            ContentMetrics::from_counts(piece.id.clone(), piece.persona_id.clone(), piece.kind, counts)
        })
        .collect()
}

/// Rank metrics best first.
///
/// Order: clicks desc, open rate desc, created_at asc, sequence asc. Pieces
/// with zero deliveries are returned separately as unranked, in content order.
pub fn rank(metrics: &[ContentMetrics], pieces: &[ContentPiece]) -> (Vec<String>, Vec<String>) {
    let by_id: HashMap<&str, &ContentPiece> = pieces.iter().map(|p| (p.id.as_str(), p)).collect();

    let (mut rankable, unrankable): (Vec<&ContentMetrics>, Vec<&ContentMetrics>) =
        metrics.iter().partition(|m| m.is_rankable());

    rankable.sort_by(|a, b| {
        b.counts
            .clicked
            .cmp(&a.counts.clicked)
            .then_with(|| {
                // Rankable pieces always have a defined open rate
                let a_open = a.open_rate.value().unwrap_or(0.0);
                let b_open = b.open_rate.value().unwrap_or(0.0);
                b_open.total_cmp(&a_open)
            })
            .then_with(|| match (by_id.get(a.content_id.as_str()), by_id.get(b.content_id.as_str())) {
                (Some(pa), Some(pb)) => pa.creation_order(pb),
                _ => Ordering::Equal,
            })
            .then_with(|| a.content_id.cmp(&b.content_id))
    });

    (
        rankable.into_iter().map(|m| m.content_id.clone()).collect(),
        unrankable.into_iter().map(|m| m.content_id.clone()).collect(),
    )
}

/// Analyze one pass. The insight is left empty for the caller to fill in
/// from the generator or [`super::fallback_insight`].
pub fn analyze(
    campaign_id: &str,
    pass: u32,
    pieces: &[ContentPiece],
    outcomes: &[EngagementOutcome],
) -> PerformanceSummary {
    let metrics = aggregate(pieces, outcomes);
    let (ranking, unranked) = rank(&metrics, pieces);

    debug!(
        campaign_id,
        pass,
        ranked = ranking.len(),
        unranked = unranked.len(),
        "Analyzed content performance"
    );

    PerformanceSummary {
        campaign_id: campaign_id.to_string(),
        pass,
        metrics,
        ranking,
        unranked,
        insight: String::new(),
        insight_source: InsightSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentKind, DistributionMode};

    fn piece(seq: u32, persona: Option<&str>) -> ContentPiece {
        let kind = if persona.is_some() { ContentKind::Newsletter } else { ContentKind::Blog };
        ContentPiece::new("c1", persona.map(String::from), kind, "T", "body text", seq)
    }

    fn outcome(content: &ContentPiece, delivered: u64, opened: u64, clicked: u64) -> EngagementOutcome {
        EngagementOutcome::new(
            &content.id,
            EngagementCounts { delivered, opened, clicked, unsubscribed: 0, bounced: 0 },
            DistributionMode::Mock,
        )
    }

    #[test]
    fn test_aggregate_sums_multiple_outcomes() {
        let a = piece(0, Some("founders"));
        let outcomes = vec![outcome(&a, 50, 10, 2), outcome(&a, 40, 8, 3)];

        let metrics = aggregate(std::slice::from_ref(&a), &outcomes);

        assert_eq!(metrics[0].counts.delivered, 90);
        assert_eq!(metrics[0].counts.opened, 18);
        assert_eq!(metrics[0].counts.clicked, 5);
        assert_eq!(metrics[0].open_rate.value(), Some(0.2));
    }

    #[test]
    fn test_piece_without_outcomes_is_unranked() {
        let a = piece(0, None);
        let b = piece(1, Some("founders"));
        let outcomes = vec![outcome(&b, 90, 27, 5)];

        let summary = analyze("c1", 1, &[a.clone(), b.clone()], &outcomes);

        assert_eq!(summary.ranking, vec![b.id.clone()]);
        assert_eq!(summary.unranked, vec![a.id.clone()]);
        let m = summary.metrics_for(&a.id).unwrap();
        assert!(!m.open_rate.is_defined());
        assert!(!m.click_rate.is_defined());
    }

    #[test]
    fn test_rank_clicks_then_open_rate() {
        let a = piece(0, Some("founders"));
        let b = piece(1, Some("creatives"));
        let c = piece(2, Some("operations"));
        let outcomes = vec![
            outcome(&a, 100, 30, 5),
            outcome(&b, 100, 40, 5),
            outcome(&c, 100, 10, 9),
        ];

        let summary = analyze("c1", 1, &[a.clone(), b.clone(), c.clone()], &outcomes);
        assert_eq!(summary.ranking, vec![c.id, b.id, a.id]);
    }

    #[test]
    fn test_rank_ties_fall_back_to_creation_order() {
        let a = piece(0, Some("founders"));
        let mut b = piece(1, Some("creatives"));
        b.created_at = a.created_at;
        let outcomes = vec![outcome(&b, 100, 30, 5), outcome(&a, 100, 30, 5)];

        let summary = analyze("c1", 1, &[b.clone(), a.clone()], &outcomes);
        assert_eq!(summary.ranking, vec![a.id, b.id]);
    }

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![Vec::new()];
        }
        let mut all = Vec::new();
        for shorter in permutations(n - 1) {
            for pos in 0..=shorter.len() {
                let mut order = shorter.clone();
                order.insert(pos, n - 1);
                all.push(order);
            }
        }
        all
    }

    #[test]
    fn test_ranking_is_permutation_invariant() {
        let first = piece(0, None);
        let mut pieces = vec![first.clone()];
        for seq in 1..4 {
            // Shared timestamp so ties fall through to the sequence
            let mut p = piece(seq, Some("founders"));
            p.created_at = first.created_at;
            pieces.push(p);
        }
        let outcomes = vec![
            outcome(&pieces[0], 270, 80, 12),
            outcome(&pieces[1], 90, 27, 5),
            outcome(&pieces[2], 90, 27, 5),
            outcome(&pieces[3], 95, 25, 5),
        ];

        let expected = analyze("c1", 1, &pieces, &outcomes).ranking;
        // 12 clicks first, then 27/90 twice (sequence decides), then 25/95
        assert_eq!(
            expected,
            vec![
                pieces[0].id.clone(),
                pieces[1].id.clone(),
                pieces[2].id.clone(),
                pieces[3].id.clone()
            ]
        );

        let orders = permutations(4);
        assert_eq!(orders.len(), 24);
        for piece_order in &orders {
            for outcome_order in &orders {
                let shuffled_pieces: Vec<ContentPiece> =
                    piece_order.iter().map(|&i| pieces[i].clone()).collect();
                let shuffled_outcomes: Vec<EngagementOutcome> =
                    outcome_order.iter().map(|&i| outcomes[i].clone()).collect();

                let summary = analyze("c1", 1, &shuffled_pieces, &shuffled_outcomes);
                assert_eq!(summary.ranking, expected, "pieces {:?} outcomes {:?}", piece_order, outcome_order);
            }
        }
    }

    #[test]
    fn test_outcomes_for_other_pieces_ignored() {
        let a = piece(0, Some("founders"));
        let stray = piece(1, Some("creatives"));
        let outcomes = vec![outcome(&stray, 10, 5, 1)];

        let summary = analyze("c1", 2, std::slice::from_ref(&a), &outcomes);
        assert_eq!(summary.metrics.len(), 1);
        assert_eq!(summary.unranked, vec![a.id]);
        assert_eq!(summary.pass, 2);
    }
}
