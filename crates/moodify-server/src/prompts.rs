//! Prompt text for the generative-language model.

use moodify_shared::constants::{ANALYSIS_MOOD_WINDOW, DEFAULT_TIMEFRAME};
use moodify_shared::protocol::{AnalyzeMoodRequest, DailyQuestionRequest};

/// "happy (intensity: 7/10), sad (intensity: 3/10)" over the most recent
/// entries, oldest first.
pub fn mood_summary(req: &AnalyzeMoodRequest) -> String {
    let skip = req.mood_history.len().saturating_sub(ANALYSIS_MOOD_WINDOW);
    req.mood_history[skip..]
        .iter()
        .map(|e| format!("{} (intensity: {}/10)", e.mood, e.intensity))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn analysis_prompt(req: &AnalyzeMoodRequest) -> String {
    let summary = mood_summary(req);
    let summary = if summary.is_empty() {
        "No mood data yet"
    } else {
        summary.as_str()
    };
    let latest = req
        .assessment_history
        .last()
        .map_or("Not completed", |a| a.category.as_str());
    let timeframe = req
        .timeframe
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TIMEFRAME);
    let window = ANALYSIS_MOOD_WINDOW;

    format!(
        "You are a supportive mental health companion for teenagers. Analyze the following mood data and provide personalized, actionable insights.

Recent Mood Entries (last {window}): {summary}
Latest Assessment Score: {latest}
Timeframe: {timeframe}

Provide a brief analysis (3-4 sentences) that:
1. Identifies any patterns or trends in their moods
2. Offers 2-3 specific, actionable suggestions for improving their wellbeing
3. Celebrates any positive patterns you notice
4. Uses warm, supportive, teen-friendly language
5. Avoids being overly clinical or alarming

Keep your response concise, supportive, and focused on practical next steps."
    )
}

pub fn daily_question_prompt(req: &DailyQuestionRequest) -> String {
    let context = req
        .user_context
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("New user");

    format!(
        "You are a supportive mental health companion for teenagers. Generate a thoughtful, age-appropriate daily check-in question that helps them reflect on their emotions and wellbeing.

Context about the user (if available): {context}

Requirements:
- Keep it simple and relatable for teens (ages 13-19)
- Focus on emotional awareness, self-care, or positive habits
- Be warm, non-judgmental, and supportive in tone
- Avoid clinical or overly serious language
- Make it thought-provoking but not overwhelming
- Length: 1-2 sentences max

Generate ONE unique daily check-in question:"
    )
}
