//! Survey-to-constraint compilation.

use mealplan_core::types::{
    BaselineConstraints, CookSpeed, QuestionKind, SurveyQuestion, SurveyResponses, NO_PREFERENCE,
};
use tracing::debug;

/// Reduces survey answers to the baseline constraints sent with every
/// recommendation request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintCompiler;

impl ConstraintCompiler {
    /// Compile recorded answers into constraints.
    ///
    /// `responses[i]` is the answer to `questions[i]`; extra questions with no
    /// answer are ignored. Returns `None` when no key would be set.
    pub fn compile(
        &self,
        questions: &[SurveyQuestion],
        responses: &SurveyResponses,
    ) -> Option<BaselineConstraints> {
        let mut constraints = BaselineConstraints::default();

        for (question, answer) in questions.iter().zip(responses.iter()) {
            let chosen: Vec<&str> = answer
                .iter()
                .map(String::as_str)
                .filter(|v| *v != NO_PREFERENCE)
                .collect();
            if chosen.is_empty() {
                continue;
            }

            match question.kind {
                QuestionKind::Cuisine => constraints
                    .cuisines_include
                    .get_or_insert_with(Vec::new)
                    .extend(chosen.iter().map(|v| v.to_lowercase())),
                QuestionKind::Dietary => {
                    for token in &chosen {
                        if !apply_dietary_flag(&mut constraints, token) {
                            debug!(token = %token, "Ignoring unrecognized dietary option");
                        }
                    }
                }
                QuestionKind::Effort => {
                    let speeds: Vec<CookSpeed> =
                        chosen.iter().filter_map(|v| CookSpeed::from_token(v)).collect();
                    // Zero or several speeds is ambiguous: leave speed unconstrained.
                    if let [speed] = speeds.as_slice() {
                        constraints.cook_speed = Some(*speed);
                    }
                }
                QuestionKind::DishType => constraints
                    .course_list
                    .get_or_insert_with(Vec::new)
                    .extend(chosen.iter().map(|v| v.to_string())),
            }
        }

        if constraints.is_empty() {
            None
        } else {
            Some(constraints)
        }
    }
}

/// Set the flag matching a dietary token. Returns `false` if unrecognized.
fn apply_dietary_flag(constraints: &mut BaselineConstraints, token: &str) -> bool {
    let normalized = token.trim().to_lowercase().replace(['_', ' '], "-");
    let flag = match normalized.as_str() {
        "vegan" => &mut constraints.is_vegan,
        "vegetarian" => &mut constraints.is_vegetarian,
        "gluten-free" => &mut constraints.is_gluten_free,
        "nut-free" => &mut constraints.is_nut_free,
        "dairy-free" => &mut constraints.is_dairy_free,
        "halal" => &mut constraints.is_halal,
        "kosher" => &mut constraints.is_kosher,
        _ => return false,
    };
    *flag = Some(true);
    true
}
