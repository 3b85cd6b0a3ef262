use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Choice(i32),
    Choices(Vec<i32>),
}

impl AnswerValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            AnswerValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_choice_ids(self) -> Vec<i32> {
        match self {
            AnswerValue::Choice(id) => vec![id],
            AnswerValue::Choices(ids) => ids,
            AnswerValue::Text(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub response_id: i32,
    pub question_id: i32,
    pub text_answer: Option<String>,
}

/// An answer joined with the ids of the choices it selected.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct AnswerRecord {
    pub id: i32,
    pub question_id: i32,
    pub text_answer: Option<String>,
    pub choice_ids: Vec<i32>,
}

pub struct Query {
    pub survey_id_eq: i32,
}
