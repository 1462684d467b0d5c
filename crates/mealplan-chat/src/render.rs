//! Transcript text for backend replies and failures.

use mealplan_core::types::{BackendReply, RecipeCard, RecipeDetail, RecommendationResult};

use crate::error::BackendError;
use crate::formatter::strip_markup;

/// Shown when a recommendation carries no usable explanation.
pub const FALLBACK_EXPLANATION: &str = "No explanation was returned.";

/// Appended when the backend loosened the constraints to find matches.
pub const RELAXATION_NOTE: &str =
    "Note: some of your preferences were relaxed to find enough matches.";

const UNKNOWN_TITLE: &str = "Unknown";
const UNKNOWN_SPEED: &str = "n/a";
const UNKNOWN_TIME: &str = "?";

/// Turns backend outcomes into bot messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRenderer;

impl ResponseRenderer {
    pub fn render(&self, reply: &BackendReply) -> String {
        match reply {
            BackendReply::Recommendation(result) => self.render_recommendation(result),
            BackendReply::Detail(detail) => self.render_detail(detail),
        }
    }

    /// Explanation followed by a numbered "Top picks" list.
    ///
    /// The list keeps backend order and is omitted when there are no recipes.
    pub fn render_recommendation(&self, result: &RecommendationResult) -> String {
        let explanation = strip_markup(result.explanation.as_deref());
        let mut out = if explanation.trim().is_empty() {
            FALLBACK_EXPLANATION.to_string()
        } else {
            explanation.trim().to_string()
        };

        if !result.similar_recipes.is_empty() {
            out.push_str("\n\nTop picks:");
            for (i, card) in result.similar_recipes.iter().enumerate() {
                out.push('\n');
                out.push_str(&pick_line(i + 1, card));
            }
        }

        if result.used_relaxation {
            out.push_str("\n\n");
            out.push_str(RELAXATION_NOTE);
        }

        out
    }

    /// Recipe card: title, meta line, description, ingredients, directions.
    pub fn render_detail(&self, detail: &RecipeDetail) -> String {
        let title = strip_markup(detail.title.as_deref());
        let title = non_blank(&title).unwrap_or(UNKNOWN_TITLE);
        let mut sections = vec![title.to_string()];

        let mut meta = Vec::new();
        if let Some(speed) = detail.cook_speed.as_deref().and_then(non_blank) {
            meta.push(format!("Speed: {speed}"));
        }
        if let Some(difficulty) = detail.difficulty.as_deref().and_then(non_blank) {
            meta.push(format!("Difficulty: {difficulty}"));
        }
        if let Some(minutes) = detail.total_time_min {
            meta.push(format!("Time: ~{} min", format_minutes(Some(minutes))));
        }
        if !meta.is_empty() {
            sections[0].push('\n');
            sections[0].push_str(&meta.join(" | "));
        }

        let description = strip_markup(detail.description.as_deref());
        if let Some(description) = non_blank(&description) {
            sections.push(description.to_string());
        }

        if !detail.ingredients_list.is_empty() {
            let mut block = String::from("Ingredients:");
            for item in &detail.ingredients_list {
                block.push_str("\n- ");
                block.push_str(item.trim());
            }
            sections.push(block);
        }

        if !detail.directions_list.is_empty() {
            let mut block = String::from("Directions:");
            for (i, step) in detail.directions_list.iter().enumerate() {
                block.push_str(&format!("\n{}. {}", i + 1, step.trim()));
            }
            sections.push(block);
        }

        sections.join("\n\n")
    }

    pub fn render_error(&self, err: &BackendError) -> String {
        format!("Error: {}", err.user_detail())
    }
}

fn pick_line(n: usize, card: &RecipeCard) -> String {
    let title = card
        .title
        .as_deref()
        .and_then(non_blank)
        .unwrap_or(UNKNOWN_TITLE);
    let speed = card
        .cook_speed
        .as_deref()
        .and_then(non_blank)
        .unwrap_or(UNKNOWN_SPEED);
    format!(
        "{n}. {title} ({speed}, ~{} min)",
        format_minutes(card.total_time_min)
    )
}

/// Whole minutes print without a fractional part.
fn format_minutes(minutes: Option<f64>) -> String {
    match minutes {
        Some(m) if m.is_finite() => m.to_string(),
        _ => UNKNOWN_TIME.to_string(),
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
