use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TEXT_MAX_LEN: usize = 200;
pub const VALUE_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Choice {
    pub id: i32,
    pub question_id: i32,
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceForm {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: String,
}

impl ChoiceForm {
    pub fn clean(mut self) -> Self {
        self.text = self.text.trim().to_owned();
        self.value = self.value.trim().to_owned();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub question_id: i32,
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Update {
    pub text: String,
    pub value: String,
}

pub struct Query {
    pub question_id_in: Vec<i32>,
}
