use crate::core::models::{choice::Choice, question::Question, survey::Survey};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SurveyResults {
    pub survey: Survey,
    pub response_count: i64,
    pub questions: Vec<QuestionStats>,
}

#[derive(Debug, Serialize)]
pub struct QuestionStats {
    pub question: Question,
    pub answer_count: i64,
    #[serde(flatten)]
    pub breakdown: Breakdown,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Breakdown {
    Text { answers: Vec<String> },
    Choice { choices: Vec<ChoiceStats> },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChoiceStats {
    pub choice: Choice,
    pub count: i64,
    pub percentage: f64,
}
