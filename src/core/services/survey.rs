use crate::core::models::{
    choice::{Choice, ChoiceForm, Insert as ChoiceInsert, Query as ChoiceQuery, Update as ChoiceUpdate, TEXT_MAX_LEN, VALUE_MAX_LEN},
    common::Pagination,
    question::{Insert as QuestionInsert, Query as QuestionQuery, QuestionDetail, QuestionForm, Update as QuestionUpdate},
    survey::{Insert as SurveyInsert, Query as SurveyQuery, Survey, SurveyDetail, SurveyForm, Update as SurveyUpdate, TITLE_MAX_LEN},
};
use crate::core::ports::repository::{ChoiceCommon, Common, QuestionCommon, Store, SurveyCommon, TxStore};
use crate::error::{Error, FieldErrors};
use itertools::Itertools;
use log::{debug, info};
use std::collections::HashSet;

const REQUIRED: &str = "This field is required.";

pub async fn create_survey<T>(mut store: T, uid: i32, form: SurveyForm) -> Result<i32, Error>
where
    T: TxStore,
{
    let form = form.clean();
    validate(&form, &[])?;
    let survey_id = SurveyCommon::insert(
        &mut store,
        SurveyInsert {
            title: form.title,
            description: form.description,
            created_by: uid,
            is_active: form.is_active,
        },
    )
    .await?;
    for question in form.questions {
        insert_question(&mut store, survey_id, question).await?;
    }
    store.commit().await?;
    info!("user {} created survey {}", uid, survey_id);
    Ok(survey_id)
}

pub async fn update_survey<T>(mut store: T, uid: i32, id: i32, form: SurveyForm) -> Result<(), Error>
where
    T: TxStore,
{
    let survey = SurveyCommon::get_for_update(&mut store, id).await?.ok_or(Error::NotFoundError("survey"))?;
    if survey.created_by != uid {
        return Err(Error::NotOwnerError);
    }
    let form = form.clean();
    let existing = questions_with_choices(&mut store, id).await?;
    validate(&form, &existing)?;
    SurveyCommon::update(
        &mut store,
        id,
        SurveyUpdate {
            title: form.title,
            description: form.description,
            is_active: form.is_active,
        },
    )
    .await?;
    reconcile_questions(&mut store, id, &existing, form.questions).await?;
    store.commit().await?;
    info!("user {} updated survey {}", uid, id);
    Ok(())
}

pub async fn delete_survey<T>(mut store: T, uid: i32, id: i32) -> Result<(), Error>
where
    T: TxStore,
{
    match SurveyCommon::get_for_update(&mut store, id).await? {
        Some(survey) if survey.created_by == uid => {}
        _ => return Err(Error::NotOwnerError),
    }
    SurveyCommon::delete(&mut store, id).await?;
    store.commit().await?;
    info!("user {} deleted survey {}", uid, id);
    Ok(())
}

pub async fn survey_detail<S>(store: &mut S, id: i32) -> Result<SurveyDetail, Error>
where
    S: Store,
{
    let survey = SurveyCommon::get(store, id).await?.ok_or(Error::NotFoundError("survey"))?;
    let questions = questions_with_choices(store, id).await?;
    Ok(SurveyDetail { survey, questions })
}

/// The survey as its owner edits it.
pub async fn editable_survey<S>(store: &mut S, uid: i32, id: i32) -> Result<SurveyDetail, Error>
where
    S: Store,
{
    let detail = survey_detail(store, id).await?;
    if detail.survey.created_by != uid {
        return Err(Error::NotOwnerError);
    }
    Ok(detail)
}

pub async fn list_own_surveys<S>(store: &mut S, uid: i32, pagination: Pagination) -> Result<(Vec<Survey>, i64), Error>
where
    S: Store,
{
    let query = SurveyQuery {
        created_by_eq: Some(uid),
        ..default::default()
    };
    let total = SurveyCommon::count(store, &query).await?;
    let surveys = SurveyCommon::query(store, &query, Some(pagination)).await?;
    Ok((surveys, total))
}

/// The survey's questions in display order, each with its choices.
pub(crate) async fn questions_with_choices<S>(store: &mut S, survey_id: i32) -> Result<Vec<QuestionDetail>, Error>
where
    S: Common,
{
    let questions = QuestionCommon::query(store, QuestionQuery { survey_id_eq: survey_id }).await?;
    if questions.is_empty() {
        return Ok(Vec::new());
    }
    let mut choices = ChoiceCommon::query(
        store,
        ChoiceQuery {
            question_id_in: questions.iter().map(|q| q.id).collect(),
        },
    )
    .await?
    .into_iter()
    .into_group_map_by(|c| c.question_id);
    Ok(questions
        .into_iter()
        .map(|question| QuestionDetail {
            choices: choices.remove(&question.id).unwrap_or_default(),
            question,
        })
        .collect())
}

/// Collects every field problem of a cleaned form. `existing` is the persisted question
/// set the form's ids must refer to (empty when creating).
fn validate(form: &SurveyForm, existing: &[QuestionDetail]) -> Result<(), Error> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "title".into(), &form.title, TITLE_MAX_LEN);
    let mut seen_questions = HashSet::new();
    for (i, question) in form.questions.iter().enumerate() {
        let path = format!("questions[{}]", i);
        if question.text.is_empty() {
            add_error(&mut errors, format!("{}.text", path), REQUIRED.into());
        }
        if question.question_type.is_none() {
            add_error(&mut errors, format!("{}.question_type", path), REQUIRED.into());
        }
        let persisted = match question.id {
            None => None,
            Some(id) if !seen_questions.insert(id) => {
                add_error(&mut errors, format!("{}.id", path), "Duplicate question.".into());
                None
            }
            Some(id) => {
                let found = existing.iter().find(|d| d.question.id == id);
                if found.is_none() {
                    add_error(&mut errors, format!("{}.id", path), format!("Unknown question {}.", id));
                }
                found
            }
        };
        let mut seen_choices = HashSet::new();
        for (j, choice) in question.choices.iter().enumerate() {
            let path = format!("{}.choices[{}]", path, j);
            check_text(&mut errors, format!("{}.text", path), &choice.text, TEXT_MAX_LEN);
            check_text(&mut errors, format!("{}.value", path), &choice.value, VALUE_MAX_LEN);
            if let Some(id) = choice.id {
                let known = persisted.map_or(false, |d| d.choices.iter().any(|c| c.id == id));
                if !seen_choices.insert(id) {
                    add_error(&mut errors, format!("{}.id", path), "Duplicate choice.".into());
                } else if !known {
                    add_error(&mut errors, format!("{}.id", path), format!("Unknown choice {}.", id));
                }
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationError(errors))
    }
}

fn check_text(errors: &mut FieldErrors, field: String, value: &str, max_len: usize) {
    let len = value.chars().count();
    if len == 0 {
        add_error(errors, field, REQUIRED.into());
    } else if len > max_len {
        add_error(errors, field, format!("Ensure this value has at most {} characters (it has {}).", max_len, len));
    }
}

fn add_error(errors: &mut FieldErrors, field: String, message: String) {
    errors.entry(field).or_default().push(message);
}

async fn insert_question<T>(store: &mut T, survey_id: i32, question: QuestionForm) -> Result<i32, Error>
where
    T: TxStore,
{
    let question_id = QuestionCommon::insert(
        store,
        QuestionInsert {
            survey_id,
            text: question.text,
            question_type: question.question_type.unwrap_or_default(),
            is_required: question.is_required,
            order: question.order,
        },
    )
    .await?;
    for choice in question.choices {
        ChoiceCommon::insert(
            store,
            ChoiceInsert {
                question_id,
                text: choice.text,
                value: choice.value,
            },
        )
        .await?;
    }
    Ok(question_id)
}

async fn reconcile_questions<T>(store: &mut T, survey_id: i32, existing: &[QuestionDetail], forms: Vec<QuestionForm>) -> Result<(), Error>
where
    T: TxStore,
{
    let kept: HashSet<i32> = forms.iter().filter_map(|q| q.id).collect();
    let removed: Vec<i32> = existing.iter().map(|d| d.question.id).filter(|id| !kept.contains(id)).collect();
    debug!("survey {}: keeping {} questions, removing {}", survey_id, kept.len(), removed.len());
    if !removed.is_empty() {
        QuestionCommon::delete(store, removed).await?;
    }
    for form in forms {
        let Some(id) = form.id else {
            insert_question(store, survey_id, form).await?;
            continue;
        };
        QuestionCommon::update(
            store,
            id,
            QuestionUpdate {
                text: form.text,
                question_type: form.question_type.unwrap_or_default(),
                is_required: form.is_required,
                order: form.order,
            },
        )
        .await?;
        let current = existing.iter().find(|d| d.question.id == id).map(|d| d.choices.as_slice()).unwrap_or_default();
        reconcile_choices(store, id, current, form.choices).await?;
    }
    Ok(())
}

async fn reconcile_choices<T>(store: &mut T, question_id: i32, existing: &[Choice], forms: Vec<ChoiceForm>) -> Result<(), Error>
where
    T: TxStore,
{
    let kept: HashSet<i32> = forms.iter().filter_map(|c| c.id).collect();
    let removed: Vec<i32> = existing.iter().map(|c| c.id).filter(|id| !kept.contains(id)).collect();
    if !removed.is_empty() {
        ChoiceCommon::delete(store, removed).await?;
    }
    for form in forms {
        match form.id {
            Some(id) => {
                ChoiceCommon::update(
                    store,
                    id,
                    ChoiceUpdate {
                        text: form.text,
                        value: form.value,
                    },
                )
                .await?
            }
            None => {
                ChoiceCommon::insert(
                    store,
                    ChoiceInsert {
                        question_id,
                        text: form.text,
                        value: form.value,
                    },
                )
                .await?;
            }
        }
    }
    Ok(())
}
