use crate::core::models::{
    answer::{AnswerValue, Insert as AnswerInsert},
    choice::{Choice, Query as ChoiceQuery},
    common::Pagination,
    question::Query as QuestionQuery,
    response::{Insert as ResponseInsert, Submission},
    survey::{Query as SurveyQuery, Survey},
};
use crate::core::ports::repository::{AnswerCommon, ChoiceCommon, QuestionCommon, ResponseCommon, Store, SurveyCommon, TxStore};
use crate::error::Error;
use itertools::Itertools;
use log::info;

pub async fn list_active_surveys<S>(store: &mut S, pagination: Pagination) -> Result<(Vec<Survey>, i64), Error>
where
    S: Store,
{
    let query = SurveyQuery {
        is_active_eq: Some(true),
        ..default::default()
    };
    let total = SurveyCommon::count(store, &query).await?;
    let surveys = SurveyCommon::query(store, &query, Some(pagination)).await?;
    Ok((surveys, total))
}

/// Records one session of answers against the survey's current questions.
///
/// Every question of the survey gets an answer row, answered or not. Submitted ids of
/// questions outside the survey are ignored, as are choice ids that do not belong to the
/// question they were submitted for. Required questions are not enforced.
pub async fn submit_response<T>(mut store: T, survey_id: i32, respondent_id: Option<i32>, submission: Submission) -> Result<i32, Error>
where
    T: TxStore,
{
    SurveyCommon::get(&mut store, survey_id).await?.ok_or(Error::NotFoundError("survey"))?;
    let questions = QuestionCommon::query(&mut store, QuestionQuery { survey_id_eq: survey_id }).await?;
    let mut choices = ChoiceCommon::query(
        &mut store,
        ChoiceQuery {
            question_id_in: questions.iter().filter(|q| q.question_type.is_choice()).map(|q| q.id).collect(),
        },
    )
    .await?
    .into_iter()
    .into_group_map_by(|c| c.question_id);
    let response_id = ResponseCommon::insert(&mut store, ResponseInsert { survey_id, respondent_id }).await?;
    let mut answers = submission.answers;
    for question in questions {
        let submitted = answers.remove(&question.id);
        if !question.question_type.is_choice() {
            AnswerCommon::insert(
                &mut store,
                AnswerInsert {
                    response_id,
                    question_id: question.id,
                    text_answer: submitted.and_then(AnswerValue::into_text),
                },
            )
            .await?;
            continue;
        }
        let answer_id = AnswerCommon::insert(
            &mut store,
            AnswerInsert {
                response_id,
                question_id: question.id,
                text_answer: None,
            },
        )
        .await?;
        let selected = resolve_choices(choices.remove(&question.id).unwrap_or_default(), submitted);
        if !selected.is_empty() {
            AnswerCommon::add_choices(&mut store, answer_id, selected).await?;
        }
    }
    store.commit().await?;
    info!("response {} recorded for survey {}", response_id, survey_id);
    Ok(response_id)
}

/// Ids of the question's own choices that were submitted, in display order and without
/// duplicates.
fn resolve_choices(choices: Vec<Choice>, submitted: Option<AnswerValue>) -> Vec<i32> {
    let submitted = submitted.map(AnswerValue::into_choice_ids).unwrap_or_default();
    choices.into_iter().map(|c| c.id).filter(|id| submitted.contains(id)).collect()
}
