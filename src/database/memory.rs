//! Process-local store backing the service and handler tests.
//!
//! A transaction works on a snapshot of the tables and publishes it on commit, so a
//! transaction dropped without committing leaves nothing behind.

use crate::core::models::{
    answer::{AnswerRecord, Insert as AnswerInsert, Query as AnswerQuery},
    choice::{Choice, Insert as ChoiceInsert, Query as ChoiceQuery, Update as ChoiceUpdate},
    common::Pagination,
    question::{Insert as QuestionInsert, Query as QuestionQuery, Question, Update as QuestionUpdate},
    response::{Insert as ResponseInsert, Query as ResponseQuery},
    survey::{Insert as SurveyInsert, Query as SurveyQuery, Survey, Update as SurveyUpdate},
    user::{Insert as UserInsert, User},
};
use crate::core::ports::repository::{AnswerCommon, ChoiceCommon, Common, Manager, QuestionCommon, ResponseCommon, Store, SurveyCommon, TxStore, UserCommon};
use crate::core::services::user::hash_password;
use crate::error::Error;
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

pub const SEEDED_PASSWORD: &str = "password";

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: i32,
    pub survey_id: i32,
    pub respondent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub id: i32,
    pub response_id: i32,
    pub question_id: i32,
    pub text_answer: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub surveys: Vec<Survey>,
    pub questions: Vec<Question>,
    pub choices: Vec<Choice>,
    pub responses: Vec<Response>,
    pub answers: Vec<AnswerRow>,
    /// `(answer_id, choice_id)`
    pub answer_choices: Vec<(i32, i32)>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn delete_answers(&mut self, answer_ids: &HashSet<i32>) {
        self.answers.retain(|a| !answer_ids.contains(&a.id));
        self.answer_choices.retain(|(a, _)| !answer_ids.contains(a));
    }

    fn delete_choices(&mut self, ids: &HashSet<i32>) {
        self.choices.retain(|c| !ids.contains(&c.id));
        self.answer_choices.retain(|(_, c)| !ids.contains(c));
    }

    fn delete_questions(&mut self, ids: &HashSet<i32>) {
        let choices: HashSet<i32> = self.choices.iter().filter(|c| ids.contains(&c.question_id)).map(|c| c.id).collect();
        self.delete_choices(&choices);
        let answers: HashSet<i32> = self.answers.iter().filter(|a| ids.contains(&a.question_id)).map(|a| a.id).collect();
        self.delete_answers(&answers);
        self.questions.retain(|q| !ids.contains(&q.id));
    }

    fn matches(survey: &Survey, query: &SurveyQuery) -> bool {
        query.created_by_eq.map_or(true, |uid| survey.created_by == uid) && query.is_active_eq.map_or(true, |active| survey.is_active == active)
    }
}

/// Writes that can be made to fail, to exercise rollback paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    ChoiceInsert,
    AnswerInsert,
}

#[derive(Clone, Default)]
pub struct MemoryManager {
    tables: Rc<RefCell<Tables>>,
    fail_point: Rc<Cell<Option<FailPoint>>>,
}

impl MemoryManager {
    /// Adds a user whose password is [`SEEDED_PASSWORD`].
    pub fn seed_user(&self, username: &str) -> i32 {
        let mut tables = self.tables.borrow_mut();
        let id = tables.next_id();
        let salt = format!("salt-{}", id);
        tables.users.push(User {
            id,
            username: username.to_owned(),
            password: hash_password(SEEDED_PASSWORD, &salt),
            salt,
        });
        id
    }

    /// Snapshot of the committed state.
    pub fn tables(&self) -> Tables {
        self.tables.borrow().clone()
    }

    pub fn fail_on(&self, point: FailPoint) {
        self.fail_point.set(Some(point));
    }

    fn store(&self, pending: Option<Tables>) -> Memory {
        Memory {
            shared: self.tables.clone(),
            fail_point: self.fail_point.clone(),
            pending,
        }
    }
}

impl Manager for MemoryManager {
    type Store = Memory;
    type TxStore = Memory;

    async fn db(&self) -> Result<Self::Store, Error> {
        Ok(self.store(None))
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        Ok(self.store(Some(self.tables())))
    }
}

pub struct Memory {
    shared: Rc<RefCell<Tables>>,
    fail_point: Rc<Cell<Option<FailPoint>>>,
    /// Working copy while inside a transaction.
    pending: Option<Tables>,
}

impl Memory {
    fn with<R>(&mut self, f: impl FnOnce(&mut Tables) -> R) -> R {
        match self.pending.as_mut() {
            Some(tables) => f(tables),
            None => f(&mut *self.shared.borrow_mut()),
        }
    }

    fn check(&self, point: FailPoint) -> Result<(), Error> {
        if self.fail_point.get() == Some(point) {
            return Err(Error::DatabaseError(sqlx::Error::Protocol(format!("injected failure at {:?}", point))));
        }
        Ok(())
    }
}

impl SurveyCommon for Memory {
    async fn insert(&mut self, data: SurveyInsert) -> Result<i32, Error> {
        Ok(self.with(|t| {
            let id = t.next_id();
            let now = Utc::now();
            t.surveys.push(Survey {
                id,
                title: data.title,
                description: data.description,
                created_by: data.created_by,
                created_at: now,
                updated_at: now,
                is_active: data.is_active,
            });
            id
        }))
    }

    async fn update(&mut self, id: i32, data: SurveyUpdate) -> Result<(), Error> {
        self.with(|t| {
            if let Some(survey) = t.surveys.iter_mut().find(|s| s.id == id) {
                survey.title = data.title;
                survey.description = data.description;
                survey.is_active = data.is_active;
                survey.updated_at = Utc::now();
            }
        });
        Ok(())
    }

    async fn get(&mut self, id: i32) -> Result<Option<Survey>, Error> {
        Ok(self.with(|t| t.surveys.iter().find(|s| s.id == id).cloned()))
    }

    async fn get_for_update(&mut self, id: i32) -> Result<Option<Survey>, Error> {
        SurveyCommon::get(self, id).await
    }

    async fn query(&mut self, query: &SurveyQuery, pagination: Option<Pagination>) -> Result<Vec<Survey>, Error> {
        Ok(self.with(|t| {
            let mut surveys: Vec<Survey> = t.surveys.iter().filter(|s| Tables::matches(s, query)).cloned().collect();
            surveys.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            match pagination {
                Some(Pagination { limit, offset }) => surveys.into_iter().skip(offset as usize).take(limit as usize).collect(),
                None => surveys,
            }
        }))
    }

    async fn count(&mut self, query: &SurveyQuery) -> Result<i64, Error> {
        Ok(self.with(|t| t.surveys.iter().filter(|s| Tables::matches(s, query)).count() as i64))
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        self.with(|t| {
            let questions: HashSet<i32> = t.questions.iter().filter(|q| q.survey_id == id).map(|q| q.id).collect();
            t.delete_questions(&questions);
            let responses: HashSet<i32> = t.responses.iter().filter(|r| r.survey_id == id).map(|r| r.id).collect();
            let answers: HashSet<i32> = t.answers.iter().filter(|a| responses.contains(&a.response_id)).map(|a| a.id).collect();
            t.delete_answers(&answers);
            t.responses.retain(|r| r.survey_id != id);
            t.surveys.retain(|s| s.id != id);
        });
        Ok(())
    }
}

impl QuestionCommon for Memory {
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error> {
        Ok(self.with(|t| {
            let id = t.next_id();
            t.questions.push(Question {
                id,
                survey_id: question.survey_id,
                text: question.text,
                question_type: question.question_type,
                is_required: question.is_required,
                order: question.order,
            });
            id
        }))
    }

    async fn update(&mut self, id: i32, question: QuestionUpdate) -> Result<(), Error> {
        self.with(|t| {
            if let Some(q) = t.questions.iter_mut().find(|q| q.id == id) {
                q.text = question.text;
                q.question_type = question.question_type;
                q.is_required = question.is_required;
                q.order = question.order;
            }
        });
        Ok(())
    }

    async fn query(&mut self, query: QuestionQuery) -> Result<Vec<Question>, Error> {
        Ok(self.with(|t| {
            let mut questions: Vec<Question> = t.questions.iter().filter(|q| q.survey_id == query.survey_id_eq).cloned().collect();
            questions.sort_by_key(|q| (q.order, q.id));
            questions
        }))
    }

    async fn delete(&mut self, ids: Vec<i32>) -> Result<(), Error> {
        self.with(|t| t.delete_questions(&ids.into_iter().collect::<HashSet<_>>()));
        Ok(())
    }
}

impl ChoiceCommon for Memory {
    async fn insert(&mut self, choice: ChoiceInsert) -> Result<i32, Error> {
        self.check(FailPoint::ChoiceInsert)?;
        Ok(self.with(|t| {
            let id = t.next_id();
            t.choices.push(Choice {
                id,
                question_id: choice.question_id,
                text: choice.text,
                value: choice.value,
            });
            id
        }))
    }

    async fn update(&mut self, id: i32, choice: ChoiceUpdate) -> Result<(), Error> {
        self.with(|t| {
            if let Some(c) = t.choices.iter_mut().find(|c| c.id == id) {
                c.text = choice.text;
                c.value = choice.value;
            }
        });
        Ok(())
    }

    async fn query(&mut self, query: ChoiceQuery) -> Result<Vec<Choice>, Error> {
        Ok(self.with(|t| {
            let mut choices: Vec<Choice> = t.choices.iter().filter(|c| query.question_id_in.contains(&c.question_id)).cloned().collect();
            choices.sort_by_key(|c| c.id);
            choices
        }))
    }

    async fn delete(&mut self, ids: Vec<i32>) -> Result<(), Error> {
        self.with(|t| t.delete_choices(&ids.into_iter().collect::<HashSet<_>>()));
        Ok(())
    }
}

impl ResponseCommon for Memory {
    async fn insert(&mut self, response: ResponseInsert) -> Result<i32, Error> {
        Ok(self.with(|t| {
            let id = t.next_id();
            t.responses.push(Response {
                id,
                survey_id: response.survey_id,
                respondent_id: response.respondent_id,
                created_at: Utc::now(),
            });
            id
        }))
    }

    async fn count(&mut self, query: ResponseQuery) -> Result<i64, Error> {
        Ok(self.with(|t| t.responses.iter().filter(|r| r.survey_id == query.survey_id_eq).count() as i64))
    }
}

impl AnswerCommon for Memory {
    async fn insert(&mut self, answer: AnswerInsert) -> Result<i32, Error> {
        self.check(FailPoint::AnswerInsert)?;
        Ok(self.with(|t| {
            let id = t.next_id();
            t.answers.push(AnswerRow {
                id,
                response_id: answer.response_id,
                question_id: answer.question_id,
                text_answer: answer.text_answer,
            });
            id
        }))
    }

    async fn add_choices(&mut self, answer_id: i32, choice_ids: Vec<i32>) -> Result<(), Error> {
        self.with(|t| {
            for choice_id in choice_ids {
                if !t.answer_choices.contains(&(answer_id, choice_id)) {
                    t.answer_choices.push((answer_id, choice_id));
                }
            }
        });
        Ok(())
    }

    async fn query(&mut self, query: AnswerQuery) -> Result<Vec<AnswerRecord>, Error> {
        Ok(self.with(|t| {
            let responses: HashSet<i32> = t.responses.iter().filter(|r| r.survey_id == query.survey_id_eq).map(|r| r.id).collect();
            t.answers
                .iter()
                .filter(|a| responses.contains(&a.response_id))
                .map(|a| {
                    let mut choice_ids: Vec<i32> = t.answer_choices.iter().filter(|(id, _)| *id == a.id).map(|(_, c)| *c).collect();
                    choice_ids.sort();
                    AnswerRecord {
                        id: a.id,
                        question_id: a.question_id,
                        text_answer: a.text_answer.clone(),
                        choice_ids,
                    }
                })
                .collect()
        }))
    }
}

impl UserCommon for Memory {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        Ok(self.with(|t| {
            let id = t.next_id();
            t.users.push(User {
                id,
                username: user.username,
                password: user.password,
                salt: user.salt,
            });
            id
        }))
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        Ok(self.with(|t| t.users.iter().find(|u| u.username == username).cloned()))
    }

    async fn exists(&mut self, username: &str) -> Result<bool, Error> {
        Ok(self.with(|t| t.users.iter().any(|u| u.username == username)))
    }
}

impl Common for Memory {}
impl Store for Memory {}

impl TxStore for Memory {
    async fn commit(mut self) -> Result<(), Error> {
        if let Some(tables) = self.pending.take() {
            *self.shared.borrow_mut() = tables;
        }
        Ok(())
    }
}
