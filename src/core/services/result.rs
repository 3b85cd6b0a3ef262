use crate::core::models::{
    answer::{AnswerRecord, Query as AnswerQuery},
    question::QuestionDetail,
    response::Query as ResponseQuery,
    result::{Breakdown, ChoiceStats, QuestionStats, SurveyResults},
};
use crate::core::ports::repository::{AnswerCommon, ResponseCommon, Store, SurveyCommon};
use crate::core::services::survey::questions_with_choices;
use crate::error::Error;
use itertools::Itertools;

/// Tallies every answer of the survey, for its owner only.
pub async fn compute_results<S>(store: &mut S, uid: i32, survey_id: i32) -> Result<SurveyResults, Error>
where
    S: Store,
{
    let survey = match SurveyCommon::get(store, survey_id).await? {
        Some(survey) if survey.created_by == uid => survey,
        _ => return Err(Error::NotOwnerError),
    };
    let response_count = ResponseCommon::count(store, ResponseQuery { survey_id_eq: survey_id }).await?;
    let questions = questions_with_choices(store, survey_id).await?;
    let mut answers = AnswerCommon::query(store, AnswerQuery { survey_id_eq: survey_id })
        .await?
        .into_iter()
        .into_group_map_by(|a| a.question_id);
    let questions = questions
        .into_iter()
        .map(|detail| {
            let answers = answers.remove(&detail.question.id).unwrap_or_default();
            tally(detail, &answers)
        })
        .collect();
    Ok(SurveyResults {
        survey,
        response_count,
        questions,
    })
}

/// Statistics of one question over its answers.
///
/// Text questions count the non-empty texts. Choice questions count, per choice, the
/// answers selecting it, relative to the answers that selected anything at all.
pub fn tally(detail: QuestionDetail, answers: &[AnswerRecord]) -> QuestionStats {
    let QuestionDetail { question, choices } = detail;
    if !question.question_type.is_choice() {
        let texts: Vec<String> = answers
            .iter()
            .filter_map(|a| a.text_answer.as_deref())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        return QuestionStats {
            question,
            answer_count: texts.len() as i64,
            breakdown: Breakdown::Text { answers: texts },
        };
    }
    let answer_count = answers.iter().filter(|a| !a.choice_ids.is_empty()).count() as i64;
    let choices = choices
        .into_iter()
        .map(|choice| {
            let count = answers.iter().filter(|a| a.choice_ids.contains(&choice.id)).count() as i64;
            ChoiceStats {
                percentage: percentage(count, answer_count),
                count,
                choice,
            }
        })
        .collect();
    QuestionStats {
        question,
        answer_count,
        breakdown: Breakdown::Choice { choices },
    }
}

pub fn percentage(count: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}
