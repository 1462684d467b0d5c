use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MealPlanError, Result};

/// Option value that means "no preference" for a survey question.
pub const NO_PREFERENCE: &str = "no_preference";

// =============================================================================
// Transcript
// =============================================================================

/// Who authored a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// A single displayed chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }
}

/// Append-only, oldest-first sequence of chat messages.
///
/// Messages cannot be removed, reordered, or edited once pushed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_bot(&mut self, content: impl Into<String>) {
        self.messages.push(Message::bot(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

// =============================================================================
// Survey
// =============================================================================

/// A selectable answer to a survey question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyOption {
    /// Text shown to the user.
    pub label: String,
    /// Token recorded in the survey responses.
    pub value: String,
}

impl SurveyOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The "no preference" option for a question.
    pub fn no_preference(label: impl Into<String>) -> Self {
        Self::new(label, NO_PREFERENCE)
    }

    pub fn is_sentinel(&self) -> bool {
        self.value == NO_PREFERENCE
    }
}

/// Whether a question accepts one or many options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    #[default]
    Multi,
}

/// Which preference a question feeds into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Cuisines to include.
    Cuisine,
    /// Dietary restriction flags.
    Dietary,
    /// Preferred cooking effort (fast / medium / slow).
    Effort,
    /// Courses or dish types.
    DishType,
}

/// One step of the preference survey.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<SurveyOption>,
    #[serde(default)]
    pub selection: SelectionMode,
}

impl SurveyQuestion {
    /// Look up an option by its value token.
    pub fn option(&self, value: &str) -> Option<&SurveyOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Map a 1-based option number (as shown to the user) to its value.
    pub fn option_value_at(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.options.get(i))
            .map(|o| o.value.as_str())
    }
}

/// Selected option values, one entry per answered question, in question order.
pub type SurveyResponses = Vec<Vec<String>>;

// =============================================================================
// Constraints
// =============================================================================

/// Preferred cooking effort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookSpeed {
    Fast,
    Medium,
    Slow,
}

impl CookSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookSpeed::Fast => "fast",
            CookSpeed::Medium => "medium",
            CookSpeed::Slow => "slow",
        }
    }

    /// Parse a survey token, ignoring case and surrounding whitespace.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "fast" => Some(CookSpeed::Fast),
            "medium" => Some(CookSpeed::Medium),
            "slow" => Some(CookSpeed::Slow),
            _ => None,
        }
    }
}

/// Normalized preferences derived from the survey and attached to every
/// recommendation request. Unset keys are omitted from the JSON body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisines_include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vegan: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vegetarian: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_gluten_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_nut_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dairy_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_halal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_kosher: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_speed: Option<CookSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_list: Option<Vec<String>>,
}

impl BaselineConstraints {
    /// True when no preference key is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Body of `POST /submit`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_message: String,
    pub top_n: u32,
    /// Serialized as `null` when the session has no constraints.
    pub baseline_constraints: Option<BaselineConstraints>,
}

/// Body of `POST /recipe_details`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetailRequest {
    pub recipe_query: String,
}

/// A ranked recipe in a recommendation. Every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeCard {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub cook_speed: Option<String>,
    pub difficulty: Option<String>,
    pub healthiness_score: Option<f64>,
    pub total_time_min: Option<f64>,
    pub similarity_score: Option<f64>,
}

/// Successful `/submit` payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationResult {
    pub explanation: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub similar_recipes: Vec<RecipeCard>,
    pub anchor_recipe: Option<RecipeCard>,
    pub candidate_count: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub used_relaxation: bool,
}

/// Successful `/recipe_details` payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeDetail {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cook_speed: Option<String>,
    pub difficulty: Option<String>,
    pub total_time_min: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub ingredients_list: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub directions_list: Vec<String>,
}

/// A decoded backend payload.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendReply {
    Detail(RecipeDetail),
    Recommendation(RecommendationResult),
}

impl BackendReply {
    /// Decode a JSON payload.
    ///
    /// An object carrying a non-null `ingredients_list` or `directions_list`
    /// is a recipe detail; any other object is a recommendation result.
    pub fn decode(value: serde_json::Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(MealPlanError::Serialization(
                "expected a JSON object from the backend".to_string(),
            ));
        };

        let has_field = |key: &str| object.get(key).is_some_and(|v| !v.is_null());

        if has_field("ingredients_list") || has_field("directions_list") {
            Ok(BackendReply::Detail(serde_json::from_value(value)?))
        } else {
            Ok(BackendReply::Recommendation(serde_json::from_value(value)?))
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
