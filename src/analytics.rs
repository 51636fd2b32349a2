//! Analytics aggregation over the feedback store
//!
//! A single pass over all records produces the dashboard's
//! [`AnalyticsSnapshot`]: totals, per-type and per-label counts, per-section
//! rollups, and a trailing 7-day trend. The aggregator holds no state and is
//! recomputed from scratch on every query; calling it twice with no
//! intervening writes yields identical output.
//!
//! Two contracts are load-bearing here: absent `type`/`sentiment` fields go
//! to explicit default buckets (`text`, neutral, score 0.5), and every
//! division guards its zero denominator by yielding 0 rather than NaN.

use crate::types::{
    AnalyticsSnapshot, FeedbackRecord, FeedbackType, SectionStat, SentimentLabel, TrendPoint,
};
use chrono::{Days, NaiveDate};
use indexmap::IndexMap;

/// Number of calendar days in the recent-trends window
const TREND_DAYS: u64 = 7;

/// Compute the full analytics snapshot for the given record set
///
/// `today` anchors the trend window (its last entry); passing it in keeps
/// the function pure and testable against fixed dates.
pub fn aggregate(records: &[FeedbackRecord], today: NaiveDate) -> AnalyticsSnapshot {
    let mut snapshot = AnalyticsSnapshot {
        total_responses: records.len() as u64,
        ..Default::default()
    };

    // Per-section accumulator keyed in encounter order, so equal-count
    // sections keep a stable ordering after the sort below.
    let mut section_totals: IndexMap<String, (u64, f64)> = IndexMap::new();
    let mut score_sum = 0.0;

    for record in records {
        match record.feedback_type.unwrap_or(FeedbackType::Text) {
            FeedbackType::Text => snapshot.responses_by_type.text += 1,
            FeedbackType::Voice => snapshot.responses_by_type.voice += 1,
        }

        let label = record
            .sentiment
            .map(|s| s.label)
            .unwrap_or(SentimentLabel::Neutral);
        match label {
            SentimentLabel::Positive => snapshot.sentiment_distribution.positive += 1,
            SentimentLabel::Neutral => snapshot.sentiment_distribution.neutral += 1,
            SentimentLabel::Negative => snapshot.sentiment_distribution.negative += 1,
        }

        let score = record.sentiment.map(|s| s.score).unwrap_or(0.5);
        score_sum += score;

        for (section_id, answer) in &record.sections {
            if !answer.has_content() {
                continue;
            }
            let entry = section_totals.entry(section_id.clone()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += score;
        }
    }

    snapshot.average_sentiment = if records.is_empty() {
        0.0
    } else {
        score_sum / records.len() as f64
    };

    let mut top_sections: Vec<SectionStat> = section_totals
        .into_iter()
        .map(|(section_id, (count, sum))| SectionStat {
            section_id,
            response_count: count,
            average_sentiment: if count > 0 { sum / count as f64 } else { 0.0 },
        })
        .collect();
    // Stable sort: ties keep encounter order
    top_sections.sort_by(|a, b| b.response_count.cmp(&a.response_count));
    snapshot.top_sections = top_sections;

    snapshot.recent_trends = recent_trends(records, today);
    snapshot
}

/// One entry per calendar day ending `today` inclusive, oldest first
fn recent_trends(records: &[FeedbackRecord], today: NaiveDate) -> Vec<TrendPoint> {
    (0..TREND_DAYS)
        .rev()
        .map(|offset| {
            let date = today
                .checked_sub_days(Days::new(offset))
                .unwrap_or(today);

            let mut count = 0u64;
            let mut sum = 0.0;
            for record in records {
                if record.timestamp.date_naive() == date {
                    count += 1;
                    sum += record.sentiment.map(|s| s.score).unwrap_or(0.5);
                }
            }

            TrendPoint {
                date,
                count,
                average_sentiment: if count > 0 { sum / count as f64 } else { 0.0 },
            }
        })
        .collect()
}
