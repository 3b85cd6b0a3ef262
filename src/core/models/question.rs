use crate::core::models::choice::{Choice, ChoiceForm};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(sqlx::Type)]
#[sqlx(type_name = "question_type")]
#[sqlx(rename_all = "lowercase")]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Text,
    Single,
    Multiple,
}

impl QuestionType {
    pub fn is_choice(&self) -> bool {
        !matches!(self, QuestionType::Text)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Question {
    pub id: i32,
    pub survey_id: i32,
    pub text: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub question_type: Option<QuestionType>,
    #[serde(default = "required_by_default")]
    pub is_required: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub choices: Vec<ChoiceForm>,
}

fn required_by_default() -> bool {
    true
}

impl QuestionForm {
    pub fn clean(mut self) -> Self {
        self.text = self.text.trim().to_owned();
        self.choices = self.choices.into_iter().map(ChoiceForm::clean).collect();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub survey_id: i32,
    pub text: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order: i32,
}

#[derive(Debug, Clone)]
pub struct Update {
    pub text: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order: i32,
}

pub struct Query {
    pub survey_id_eq: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}
