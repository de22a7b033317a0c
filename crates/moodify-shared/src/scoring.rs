//! Assessment scoring.

use chrono::{DateTime, Utc};

use crate::types::{new_record_id, Assessment, AssessmentCategory, QuestionnaireResponse};

/// Mean of the numeric answers. Text answers count in neither the sum nor
/// the denominator. No numeric answers at all scores 0.
pub fn score_responses(responses: &[QuestionnaireResponse]) -> f64 {
    let (sum, count) = responses
        .iter()
        .filter_map(|r| r.answer.as_number())
        .fold((0.0_f64, 0_u32), |(sum, count), n| (sum + n, count + 1));

    if count == 0 {
        return 0.0;
    }
    sum / f64::from(count)
}

pub fn categorize(score: f64) -> AssessmentCategory {
    if score >= 8.0 {
        AssessmentCategory::Excellent
    } else if score >= 6.0 {
        AssessmentCategory::Good
    } else if score >= 4.0 {
        AssessmentCategory::Fair
    } else {
        AssessmentCategory::NeedsAttention
    }
}

/// Score the responses and wrap them into a completed assessment.
pub fn build_assessment(
    responses: Vec<QuestionnaireResponse>,
    completed_at: DateTime<Utc>,
) -> Assessment {
    let score = score_responses(&responses);
    Assessment {
        id: new_record_id(),
        responses,
        completed_at,
        score,
        category: categorize(score),
    }
}
