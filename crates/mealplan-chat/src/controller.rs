//! Conversation controller: owns the session and sequences survey, chat and
//! backend round trips.
//!
//! Every interaction is split in two. A synchronous step (`submit_survey`,
//! `submit_text`) mutates the session and returns the request to issue, or
//! `None` when the input short-circuits. [`ConversationController::finish`]
//! then merges the backend outcome into the transcript. Exactly one request
//! is outstanding at a time: the first step sets `loading`, `finish` clears
//! it, and nothing is issued in between.

use mealplan_core::config::{MealPlanConfig, SkipPolicy};
use mealplan_core::types::{
    BackendReply, BaselineConstraints, RecipeDetailRequest, RecommendationRequest,
    SurveyQuestion, Transcript,
};
use tracing::{debug, info, warn};

use crate::classifier::QueryClassifier;
use crate::client::{BackendRequest, RecipeBackend};
use crate::constraints::ConstraintCompiler;
use crate::error::{BackendError, ChatError};
use crate::render::ResponseRenderer;
use crate::survey::{SurveyAdvance, SurveyFlow, SurveyPhase};

pub const SURVEY_GREETING: &str =
    "Hi! Answer a few quick questions so I can tailor recipe suggestions to you.";
pub const FREEFORM_GREETING: &str =
    "Hi! Tell me what you feel like eating, or ask me how to make a dish.";
pub const SURVEY_COMPLETE: &str =
    "Thanks! Here are a few recipes to start with based on your answers.";
pub const SURVEY_SKIPPED: &str =
    "Survey skipped. Ask me for recipe ideas or how to make a dish any time.";

// =============================================================================
// SessionState
// =============================================================================

/// Everything one chat session knows. Lost when the session ends.
#[derive(Debug, Clone)]
pub struct SessionState {
    transcript: Transcript,
    survey: SurveyFlow,
    constraints: Option<BaselineConstraints>,
    loading: bool,
}

impl SessionState {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn survey(&self) -> &SurveyFlow {
        &self.survey
    }

    /// Constraints compiled when the survey ended; fixed for the session.
    pub fn constraints(&self) -> Option<&BaselineConstraints> {
        self.constraints.as_ref()
    }

    /// True while a backend request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

// =============================================================================
// ConversationController
// =============================================================================

pub struct ConversationController {
    state: SessionState,
    classifier: QueryClassifier,
    compiler: ConstraintCompiler,
    renderer: ResponseRenderer,
    top_n: u32,
    skip_policy: SkipPolicy,
    starter_prompt: String,
    loading_placeholder: String,
}

impl ConversationController {
    /// Start a session.
    ///
    /// With the survey disabled in `config`, or no questions, the session
    /// opens directly in freeform chat.
    pub fn new(
        config: &MealPlanConfig,
        questions: Vec<SurveyQuestion>,
    ) -> Result<Self, ChatError> {
        config.validate()?;

        let questions = if config.survey.enabled {
            questions
        } else {
            Vec::new()
        };
        let survey = SurveyFlow::new(questions);

        let mut transcript = Transcript::new();
        match survey.current_question() {
            Some(question) => {
                transcript.push_bot(SURVEY_GREETING);
                transcript.push_bot(question.prompt.clone());
            }
            None => transcript.push_bot(FREEFORM_GREETING),
        }

        info!(
            survey = survey.is_active(),
            questions = survey.questions().len(),
            "Conversation started"
        );

        Ok(Self {
            state: SessionState {
                transcript,
                survey,
                constraints: None,
                loading: false,
            },
            classifier: QueryClassifier,
            compiler: ConstraintCompiler,
            renderer: ResponseRenderer,
            top_n: config.backend.top_n,
            skip_policy: config.survey.skip_policy,
            starter_prompt: config.chat.starter_prompt.clone(),
            loading_placeholder: config.chat.loading_placeholder.clone(),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Transient text to show while a request is outstanding.
    pub fn placeholder(&self) -> Option<&str> {
        self.state
            .loading
            .then_some(self.loading_placeholder.as_str())
    }

    // ---- survey ----

    /// Toggle one option of the current question. See [`SurveyFlow::toggle`].
    pub fn toggle_option(&mut self, value: &str) -> bool {
        self.state.survey.toggle(value)
    }

    /// Replace the pending selection. See [`SurveyFlow::select`].
    pub fn select_options<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state.survey.select(values);
    }

    /// Submit the pending selection for the current question.
    ///
    /// Records a summary of the answer, then shows the next question. After
    /// the last question the constraints are compiled and the starter
    /// recommendation request is returned.
    pub fn submit_survey(&mut self) -> Option<BackendRequest> {
        if self.state.loading {
            debug!("Ignoring survey submission while a request is outstanding");
            return None;
        }
        let step = match self.state.survey.phase() {
            SurveyPhase::InSurvey { step } => step,
            SurveyPhase::Freeform => {
                debug!("Ignoring survey submission outside the survey");
                return None;
            }
        };

        let Some(advance) = self.state.survey.submit() else {
            debug!(step, "Ignoring survey submission with nothing selected");
            return None;
        };

        if let Some(summary) = self.state.survey.summary(step) {
            self.state.transcript.push_user(summary);
        }

        match advance {
            SurveyAdvance::Next { .. } => {
                if let Some(question) = self.state.survey.current_question() {
                    self.state.transcript.push_bot(question.prompt.clone());
                }
                None
            }
            SurveyAdvance::Completed => {
                self.state.constraints = self.compiler.compile(
                    self.state.survey.questions(),
                    self.state.survey.responses(),
                );
                info!(
                    constrained = self.state.constraints.is_some(),
                    "Survey completed"
                );
                self.state.transcript.push_bot(SURVEY_COMPLETE);

                let request = self.recommend(self.starter_prompt.clone());
                self.state.loading = true;
                Some(request)
            }
        }
    }

    /// Abandon the remaining survey questions.
    ///
    /// Returns `false` when there is no survey to skip.
    pub fn skip_survey(&mut self) -> bool {
        if self.state.loading || !self.state.survey.is_active() {
            return false;
        }

        self.state.survey.skip(self.skip_policy);
        self.state.constraints = match self.skip_policy {
            SkipPolicy::ClearConstraints => None,
            SkipPolicy::RetainAnswered => self.compiler.compile(
                self.state.survey.answered_questions(),
                self.state.survey.responses(),
            ),
        };
        info!(
            policy = ?self.skip_policy,
            constrained = self.state.constraints.is_some(),
            "Survey skipped"
        );
        self.state.transcript.push_bot(SURVEY_SKIPPED);
        true
    }

    // ---- freeform ----

    /// Submit free text.
    ///
    /// Ignored while loading, during the survey, or when the text is blank.
    /// Otherwise the literal text is recorded and a detail or recommendation
    /// request is returned.
    pub fn submit_text(&mut self, input: &str) -> Option<BackendRequest> {
        if self.state.loading {
            debug!("Ignoring message while a request is outstanding");
            return None;
        }
        if self.state.survey.is_active() {
            debug!("Ignoring free text during the survey");
            return None;
        }
        if input.trim().is_empty() {
            debug!("Ignoring empty message");
            return None;
        }

        self.state.transcript.push_user(input);

        let request = if self.classifier.is_detail_request(input) {
            BackendRequest::Detail(RecipeDetailRequest {
                recipe_query: self.classifier.detail_query(input),
            })
        } else {
            self.recommend(input.to_string())
        };

        info!(path = request.path(), "Dispatching request");
        self.state.loading = true;
        Some(request)
    }

    // ---- backend ----

    /// Merge a backend outcome into the transcript and clear `loading`.
    pub fn finish(&mut self, outcome: Result<BackendReply, BackendError>) {
        let text = match outcome {
            Ok(reply) => self.renderer.render(&reply),
            Err(err) => {
                warn!(error = %err, "Backend request failed");
                self.renderer.render_error(&err)
            }
        };
        self.state.transcript.push_bot(text);
        self.state.loading = false;
    }

    /// Issue `request` against `backend` and merge the outcome.
    pub async fn dispatch<B>(&mut self, backend: &B, request: BackendRequest)
    where
        B: RecipeBackend + ?Sized,
    {
        let outcome = backend.send(&request).await;
        self.finish(outcome);
    }

    fn recommend(&self, user_message: String) -> BackendRequest {
        BackendRequest::Recommend(RecommendationRequest {
            user_message,
            top_n: self.top_n,
            baseline_constraints: self.state.constraints.clone(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::default_questions;
    use async_trait::async_trait;
    use mealplan_core::types::{
        CookSpeed, RecipeCard, RecipeDetail, RecommendationResult, Role, NO_PREFERENCE,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes and records what it was sent.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<BackendReply, BackendError>>>,
        sent: Mutex<Vec<BackendRequest>>,
    }

    impl ScriptedBackend {
        fn with(replies: Vec<Result<BackendReply, BackendError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<BackendRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecipeBackend for ScriptedBackend {
        async fn send(&self, request: &BackendRequest) -> Result<BackendReply, BackendError> {
            self.sent.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(BackendReply::Recommendation(RecommendationResult::default())))
        }
    }

    fn controller() -> ConversationController {
        ConversationController::new(&MealPlanConfig::default(), default_questions()).unwrap()
    }

    fn freeform_controller() -> ConversationController {
        let mut config = MealPlanConfig::default();
        config.survey.enabled = false;
        ConversationController::new(&config, default_questions()).unwrap()
    }

    fn last_text(ctl: &ConversationController) -> &str {
        &ctl.state().transcript().last().unwrap().content
    }

    fn answer(ctl: &mut ConversationController, values: &[&str]) -> Option<BackendRequest> {
        ctl.select_options(values.iter().copied());
        ctl.submit_survey()
    }

    fn recipes(titles: &[&str]) -> BackendReply {
        BackendReply::Recommendation(RecommendationResult {
            explanation: Some("Some ideas.".to_string()),
            similar_recipes: titles
                .iter()
                .map(|t| RecipeCard {
                    title: Some(t.to_string()),
                    cook_speed: Some("fast".to_string()),
                    total_time_min: Some(15.0),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_new_session_opens_with_first_question() {
        let ctl = controller();
        let messages = ctl.state().transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, SURVEY_GREETING);
        assert_eq!(messages[1].content, default_questions()[0].prompt);
        assert_eq!(ctl.state().survey().phase(), SurveyPhase::InSurvey { step: 0 });
        assert!(!ctl.state().is_loading());
        assert!(ctl.placeholder().is_none());
    }

    #[test]
    fn test_disabled_survey_opens_in_freeform() {
        let ctl = freeform_controller();
        assert_eq!(ctl.state().transcript().len(), 1);
        assert_eq!(last_text(&ctl), FREEFORM_GREETING);
        assert_eq!(ctl.state().survey().phase(), SurveyPhase::Freeform);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MealPlanConfig::default();
        config.backend.top_n = 0;
        let result = ConversationController::new(&config, default_questions());
        assert!(matches!(result, Err(ChatError::Config(_))));
    }

    #[test]
    fn test_survey_submit_without_selection_is_ignored() {
        let mut ctl = controller();
        let before = ctl.state().transcript().len();
        assert!(ctl.submit_survey().is_none());
        assert_eq!(ctl.state().transcript().len(), before);
        assert_eq!(ctl.state().survey().phase(), SurveyPhase::InSurvey { step: 0 });
    }

    #[test]
    fn test_survey_answer_appends_summary_and_next_prompt() {
        let mut ctl = controller();
        assert!(answer(&mut ctl, &["Italian", "Thai"]).is_none());

        let messages = ctl.state().transcript().messages();
        let summary = &messages[messages.len() - 2];
        assert_eq!(summary.role, Role::User);
        assert_eq!(summary.content, "Italian, Thai");
        assert_eq!(last_text(&ctl), default_questions()[1].prompt);
        assert_eq!(ctl.state().survey().phase(), SurveyPhase::InSurvey { step: 1 });
    }

    #[tokio::test]
    async fn test_end_to_end_survey_then_starter_request() {
        let mut ctl = controller();
        assert!(answer(&mut ctl, &["Italian"]).is_none());
        assert!(answer(&mut ctl, &["Vegan"]).is_none());
        assert!(answer(&mut ctl, &["fast"]).is_none());
        let request = answer(&mut ctl, &[NO_PREFERENCE]).expect("starter request");

        let expected = BaselineConstraints {
            cuisines_include: Some(vec!["italian".to_string()]),
            is_vegan: Some(true),
            cook_speed: Some(CookSpeed::Fast),
            ..Default::default()
        };
        assert_eq!(ctl.state().constraints(), Some(&expected));
        assert_eq!(ctl.state().survey().phase(), SurveyPhase::Freeform);
        assert!(ctl.state().is_loading());
        assert_eq!(ctl.placeholder(), Some("Thinking..."));

        match &request {
            BackendRequest::Recommend(req) => {
                assert_eq!(req.user_message, MealPlanConfig::default().chat.starter_prompt);
                assert_eq!(req.top_n, 5);
                assert_eq!(req.baseline_constraints.as_ref(), Some(&expected));
            }
            other => panic!("expected recommend request, got {:?}", other),
        }

        let backend = ScriptedBackend::with(vec![Ok(recipes(&["Pesto Pasta"]))]);
        ctl.dispatch(&backend, request).await;

        assert!(!ctl.state().is_loading());
        assert_eq!(
            last_text(&ctl),
            "Some ideas.\n\nTop picks:\n1. Pesto Pasta (fast, ~15 min)"
        );
        assert_eq!(backend.sent().len(), 1);
    }

    #[test]
    fn test_all_sentinel_survey_sends_null_constraints() {
        let mut ctl = controller();
        for _ in 0..3 {
            assert!(answer(&mut ctl, &[NO_PREFERENCE]).is_none());
        }
        let request = answer(&mut ctl, &[NO_PREFERENCE]).unwrap();
        assert!(ctl.state().constraints().is_none());
        match request {
            BackendRequest::Recommend(req) => assert!(req.baseline_constraints.is_none()),
            other => panic!("expected recommend request, got {:?}", other),
        }
    }

    #[test]
    fn test_text_ignored_during_survey() {
        let mut ctl = controller();
        let before = ctl.state().transcript().len();
        assert!(ctl.submit_text("pasta please").is_none());
        assert_eq!(ctl.state().transcript().len(), before);
    }

    #[test]
    fn test_blank_text_ignored() {
        let mut ctl = freeform_controller();
        assert!(ctl.submit_text("").is_none());
        assert!(ctl.submit_text("   ").is_none());
        assert_eq!(ctl.state().transcript().len(), 1);
        assert!(!ctl.state().is_loading());
    }

    #[test]
    fn test_submit_while_loading_is_noop() {
        let mut ctl = freeform_controller();
        assert!(ctl.submit_text("something spicy").is_some());
        assert!(ctl.state().is_loading());
        let len = ctl.state().transcript().len();

        assert!(ctl.submit_text("and another thing").is_none());
        assert!(ctl.submit_survey().is_none());
        assert_eq!(ctl.state().transcript().len(), len);

        ctl.finish(Ok(recipes(&[])));
        assert!(!ctl.state().is_loading());
        assert!(ctl.submit_text("and another thing").is_some());
    }

    #[test]
    fn test_detail_request_strips_leading_phrase() {
        let mut ctl = freeform_controller();
        let request = ctl.submit_text("recipe for banana bread").unwrap();
        assert_eq!(
            request,
            BackendRequest::Detail(RecipeDetailRequest {
                recipe_query: "banana bread".to_string()
            })
        );
        let last = ctl.state().transcript().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "recipe for banana bread");
    }

    #[test]
    fn test_general_request_uses_configured_top_n() {
        let mut config = MealPlanConfig::default();
        config.survey.enabled = false;
        config.backend.top_n = 8;
        let mut ctl = ConversationController::new(&config, default_questions()).unwrap();

        match ctl.submit_text("What's good for dinner?").unwrap() {
            BackendRequest::Recommend(req) => {
                assert_eq!(req.user_message, "What's good for dinner?");
                assert_eq!(req.top_n, 8);
                assert!(req.baseline_constraints.is_none());
            }
            other => panic!("expected recommend request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_detail_reply_rendered_as_card() {
        let mut ctl = freeform_controller();
        let request = ctl.submit_text("How do I make chili?").unwrap();
        let backend = ScriptedBackend::with(vec![Ok(BackendReply::Detail(RecipeDetail {
            title: Some("Chili".to_string()),
            ingredients_list: vec!["beans".to_string()],
            directions_list: vec!["Simmer.".to_string()],
            ..Default::default()
        }))]);
        ctl.dispatch(&backend, request).await;

        assert_eq!(
            backend.sent(),
            vec![BackendRequest::Detail(RecipeDetailRequest {
                recipe_query: "chili".to_string()
            })]
        );
        assert_eq!(
            last_text(&ctl),
            "Chili\n\nIngredients:\n- beans\n\nDirections:\n1. Simmer."
        );
    }

    #[tokio::test]
    async fn test_backend_error_becomes_message_and_session_survives() {
        let mut ctl = freeform_controller();
        let request = ctl.submit_text("recipe for unicorn stew").unwrap();
        let backend = ScriptedBackend::with(vec![
            Err(BackendError::from_status(
                404,
                Some("Not Found"),
                r#"{"detail":"Recipe not found."}"#,
            )),
            Ok(recipes(&["Lentil Stew"])),
        ]);
        ctl.dispatch(&backend, request).await;

        let last = ctl.state().transcript().last().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert_eq!(last.content, "Error: Recipe not found.");
        assert!(!ctl.state().is_loading());

        let retry = ctl.submit_text("any stew").unwrap();
        ctl.dispatch(&backend, retry).await;
        assert!(last_text(&ctl).contains("1. Lentil Stew"));
    }

    #[test]
    fn test_transport_error_message() {
        let mut ctl = freeform_controller();
        ctl.submit_text("soup").unwrap();
        ctl.finish(Err(BackendError::Transport("connection refused".to_string())));
        assert_eq!(last_text(&ctl), "Error: connection refused");
    }

    #[test]
    fn test_skip_clears_constraints_by_default() {
        let mut ctl = controller();
        answer(&mut ctl, &["Mexican"]);
        assert!(ctl.skip_survey());

        assert_eq!(ctl.state().survey().phase(), SurveyPhase::Freeform);
        assert!(ctl.state().survey().responses().is_empty());
        assert!(ctl.state().constraints().is_none());
        assert_eq!(last_text(&ctl), SURVEY_SKIPPED);
        assert!(!ctl.state().is_loading());

        match ctl.submit_text("tacos tonight").unwrap() {
            BackendRequest::Recommend(req) => assert!(req.baseline_constraints.is_none()),
            other => panic!("expected recommend request, got {:?}", other),
        }
    }

    #[test]
    fn test_skip_retaining_answers_compiles_them() {
        let mut config = MealPlanConfig::default();
        config.survey.skip_policy = SkipPolicy::RetainAnswered;
        let mut ctl = ConversationController::new(&config, default_questions()).unwrap();

        answer(&mut ctl, &["Mexican"]);
        answer(&mut ctl, &["Vegetarian"]);
        assert!(ctl.skip_survey());

        let constraints = ctl.state().constraints().unwrap();
        assert_eq!(constraints.cuisines_include, Some(vec!["mexican".to_string()]));
        assert_eq!(constraints.is_vegetarian, Some(true));
        assert!(constraints.cook_speed.is_none());
    }

    #[test]
    fn test_skip_outside_survey_is_rejected() {
        let mut ctl = freeform_controller();
        assert!(!ctl.skip_survey());
        assert_eq!(ctl.state().transcript().len(), 1);
    }

    #[test]
    fn test_toggle_option_tracks_pending() {
        let mut ctl = controller();
        assert!(ctl.toggle_option("Italian"));
        assert!(!ctl.toggle_option("Klingon"));
        assert_eq!(ctl.state().survey().pending(), ["Italian".to_string()]);
        assert!(ctl.toggle_option(NO_PREFERENCE));
        assert_eq!(ctl.state().survey().pending(), [NO_PREFERENCE.to_string()]);
    }
}
