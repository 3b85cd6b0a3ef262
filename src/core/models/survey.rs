use crate::core::models::question::{QuestionDetail, QuestionForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TITLE_MAX_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Survey {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Survey fields plus the complete nested question set, as submitted by the author.
///
/// On update, questions and choices carrying an `id` refer to persisted rows; rows
/// without one are new, and persisted rows missing from the form are removed.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<QuestionForm>,
}

fn active_by_default() -> bool {
    true
}

impl SurveyForm {
    /// Strips surrounding whitespace from every text field.
    pub fn clean(mut self) -> Self {
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.questions = self.questions.into_iter().map(QuestionForm::clean).collect();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub title: String,
    pub description: String,
    pub created_by: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct Update {
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Default)]
pub struct Query {
    pub created_by_eq: Option<i32>,
    pub is_active_eq: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: Survey,
    pub questions: Vec<QuestionDetail>,
}
