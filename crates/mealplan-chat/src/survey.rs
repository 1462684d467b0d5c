//! Preference survey sequencing.
//!
//! Walks a fixed list of multiple-choice questions, tracks the pending
//! selection for the current question, and records each submitted answer.

use mealplan_core::config::SkipPolicy;
use mealplan_core::types::{
    QuestionKind, SelectionMode, SurveyOption, SurveyQuestion, SurveyResponses, NO_PREFERENCE,
};

// =============================================================================
// Built-in questions
// =============================================================================

/// The four built-in survey questions: cuisine, dietary needs, effort, dish type.
pub fn default_questions() -> Vec<SurveyQuestion> {
    vec![
        SurveyQuestion {
            kind: QuestionKind::Cuisine,
            prompt: "Which cuisines do you enjoy?".to_string(),
            options: vec![
                SurveyOption::new("Italian", "Italian"),
                SurveyOption::new("Mexican", "Mexican"),
                SurveyOption::new("Chinese", "Chinese"),
                SurveyOption::new("Indian", "Indian"),
                SurveyOption::new("Japanese", "Japanese"),
                SurveyOption::new("Thai", "Thai"),
                SurveyOption::new("Mediterranean", "Mediterranean"),
                SurveyOption::new("American", "American"),
                SurveyOption::no_preference("No preference"),
            ],
            selection: SelectionMode::Multi,
        },
        SurveyQuestion {
            kind: QuestionKind::Dietary,
            prompt: "Do you have any dietary restrictions?".to_string(),
            options: vec![
                SurveyOption::new("Vegan", "Vegan"),
                SurveyOption::new("Vegetarian", "Vegetarian"),
                SurveyOption::new("Gluten-free", "Gluten-free"),
                SurveyOption::new("Nut-free", "Nut-free"),
                SurveyOption::new("Dairy-free", "Dairy-free"),
                SurveyOption::new("Halal", "Halal"),
                SurveyOption::new("Kosher", "Kosher"),
                SurveyOption::no_preference("No restrictions"),
            ],
            selection: SelectionMode::Multi,
        },
        SurveyQuestion {
            kind: QuestionKind::Effort,
            prompt: "How much time do you usually want to spend cooking?".to_string(),
            options: vec![
                SurveyOption::new("Quick (under 30 minutes)", "fast"),
                SurveyOption::new("Moderate (30-60 minutes)", "medium"),
                SurveyOption::new("I enjoy long cooks", "slow"),
                SurveyOption::no_preference("No preference"),
            ],
            selection: SelectionMode::Multi,
        },
        SurveyQuestion {
            kind: QuestionKind::DishType,
            prompt: "What kinds of dishes are you looking for?".to_string(),
            options: vec![
                SurveyOption::new("Breakfast", "breakfast"),
                SurveyOption::new("Lunch", "lunch"),
                SurveyOption::new("Dinner", "dinner"),
                SurveyOption::new("Dessert", "dessert"),
                SurveyOption::new("Snack", "snack"),
                SurveyOption::no_preference("Anything"),
            ],
            selection: SelectionMode::Multi,
        },
    ]
}

// =============================================================================
// State
// =============================================================================

/// Where the conversation is relative to the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyPhase {
    /// Waiting for an answer to question `step` (0-based).
    InSurvey { step: usize },
    /// Survey finished or skipped; free-text chat.
    Freeform,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyAdvance {
    /// Moved on to question `step`.
    Next { step: usize },
    /// That was the last question.
    Completed,
}

/// Survey sequencer over a fixed question list.
#[derive(Debug, Clone)]
pub struct SurveyFlow {
    questions: Vec<SurveyQuestion>,
    responses: SurveyResponses,
    pending: Vec<String>,
    phase: SurveyPhase,
}

impl SurveyFlow {
    /// Start a survey. An empty question list starts directly in freeform.
    pub fn new(questions: Vec<SurveyQuestion>) -> Self {
        let phase = if questions.is_empty() {
            SurveyPhase::Freeform
        } else {
            SurveyPhase::InSurvey { step: 0 }
        };
        Self {
            questions,
            responses: Vec::new(),
            pending: Vec::new(),
            phase,
        }
    }

    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, SurveyPhase::InSurvey { .. })
    }

    pub fn questions(&self) -> &[SurveyQuestion] {
        &self.questions
    }

    /// Answers recorded so far, in question order.
    pub fn responses(&self) -> &SurveyResponses {
        &self.responses
    }

    /// Options selected for the current question but not yet submitted.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn current_question(&self) -> Option<&SurveyQuestion> {
        match self.phase {
            SurveyPhase::InSurvey { step } => self.questions.get(step),
            SurveyPhase::Freeform => None,
        }
    }

    /// Toggle one option of the current question.
    ///
    /// Picking the "no preference" option clears everything else; picking a
    /// real option drops "no preference". Returns `false` if the value is not
    /// an option of the current question.
    pub fn toggle(&mut self, value: &str) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        if question.option(value).is_none() {
            return false;
        }
        let single = question.selection == SelectionMode::Single;

        if let Some(pos) = self.pending.iter().position(|v| v == value) {
            self.pending.remove(pos);
        } else if value == NO_PREFERENCE || single {
            self.pending = vec![value.to_string()];
        } else {
            self.pending.retain(|v| v != NO_PREFERENCE);
            self.pending.push(value.to_string());
        }

        self.normalize_pending();
        true
    }

    /// Replace the pending selection for the current question.
    ///
    /// Unknown values are dropped. If "no preference" is among the values
    /// the selection collapses to it alone.
    pub fn select<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(question) = self.current_question() else {
            return;
        };

        let mut chosen: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref();
            if question.option(value).is_some() && !chosen.iter().any(|c| c == value) {
                chosen.push(value.to_string());
            }
        }

        if chosen.iter().any(|v| v == NO_PREFERENCE) {
            chosen = vec![NO_PREFERENCE.to_string()];
        } else if question.selection == SelectionMode::Single {
            chosen.truncate(1);
        }

        self.pending = chosen;
        self.normalize_pending();
    }

    /// Record the pending selection and move to the next question.
    ///
    /// Returns `None` (and changes nothing) when the survey is not active or
    /// nothing is selected.
    pub fn submit(&mut self) -> Option<SurveyAdvance> {
        let SurveyPhase::InSurvey { step } = self.phase else {
            return None;
        };
        if self.pending.is_empty() {
            return None;
        }

        self.responses.push(std::mem::take(&mut self.pending));

        let next = step + 1;
        if next < self.questions.len() {
            self.phase = SurveyPhase::InSurvey { step: next };
            Some(SurveyAdvance::Next { step: next })
        } else {
            self.phase = SurveyPhase::Freeform;
            Some(SurveyAdvance::Completed)
        }
    }

    /// Abandon the remaining questions.
    ///
    /// Under [`SkipPolicy::ClearConstraints`] recorded answers are discarded;
    /// under [`SkipPolicy::RetainAnswered`] they are kept for compilation.
    pub fn skip(&mut self, policy: SkipPolicy) {
        self.pending.clear();
        if policy == SkipPolicy::ClearConstraints {
            self.responses.clear();
        }
        self.phase = SurveyPhase::Freeform;
    }

    /// Questions that have a recorded answer.
    pub fn answered_questions(&self) -> &[SurveyQuestion] {
        &self.questions[..self.responses.len()]
    }

    /// Labels of the options recorded for question `step`, comma-separated.
    pub fn summary(&self, step: usize) -> Option<String> {
        let question = self.questions.get(step)?;
        let answer = self.responses.get(step)?;
        let labels: Vec<&str> = answer
            .iter()
            .map(|v| question.option(v).map_or(v.as_str(), |o| o.label.as_str()))
            .collect();
        Some(labels.join(", "))
    }

    /// Keep the pending selection in the question's option order.
    fn normalize_pending(&mut self) {
        let SurveyPhase::InSurvey { step } = self.phase else {
            return;
        };
        let Some(question) = self.questions.get(step) else {
            return;
        };
        self.pending.sort_by_key(|v| {
            question
                .options
                .iter()
                .position(|o| &o.value == v)
                .unwrap_or(usize::MAX)
        });
    }
}
