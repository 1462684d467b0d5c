//! Conversation layer for the meal planner client.
//!
//! Provides the preference survey, survey-to-constraint compilation, query
//! classification, backend transport, and rendering of backend replies into
//! a chat transcript.

pub mod classifier;
pub mod client;
pub mod constraints;
pub mod controller;
pub mod error;
pub mod formatter;
pub mod render;
pub mod survey;

pub use classifier::QueryClassifier;
pub use client::{BackendRequest, HttpBackend, RecipeBackend};
pub use constraints::ConstraintCompiler;
pub use controller::{ConversationController, SessionState};
pub use error::{BackendError, ChatError};
pub use formatter::strip_markup;
pub use render::ResponseRenderer;
pub use survey::{default_questions, SurveyAdvance, SurveyFlow, SurveyPhase};
