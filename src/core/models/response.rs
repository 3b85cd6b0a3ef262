use crate::core::models::answer::AnswerValue;
use serde::Deserialize;
use std::collections::HashMap;

/// One survey-taking session: question id to submitted value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub answers: HashMap<i32, AnswerValue>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub survey_id: i32,
    pub respondent_id: Option<i32>,
}

pub struct Query {
    pub survey_id_eq: i32,
}
