use crate::core::models::{
    answer::{AnswerRecord, Insert as AnswerInsert, Query as AnswerQuery},
    choice::{Choice, Insert as ChoiceInsert, Query as ChoiceQuery, Update as ChoiceUpdate},
    common::Pagination,
    question::{Insert as QuestionInsert, Query as QuestionQuery, Question, Update as QuestionUpdate},
    response::{Insert as ResponseInsert, Query as ResponseQuery},
    survey::{Insert as SurveyInsert, Query as SurveyQuery, Survey, Update as SurveyUpdate},
    user::{Insert as UserInsert, User},
};
use crate::error::Error;

pub trait SurveyCommon {
    async fn insert(&mut self, data: SurveyInsert) -> Result<i32, Error>;
    async fn update(&mut self, id: i32, data: SurveyUpdate) -> Result<(), Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Survey>, Error>;
    async fn get_for_update(&mut self, id: i32) -> Result<Option<Survey>, Error>;
    /// Newest first.
    async fn query(&mut self, query: &SurveyQuery, pagination: Option<Pagination>) -> Result<Vec<Survey>, Error>;
    async fn count(&mut self, query: &SurveyQuery) -> Result<i64, Error>;
    /// Removes the survey together with its questions, choices, responses and answers.
    async fn delete(&mut self, id: i32) -> Result<(), Error>;
}

pub trait QuestionCommon {
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error>;
    async fn update(&mut self, id: i32, question: QuestionUpdate) -> Result<(), Error>;
    /// Ordered by `order`, then by id.
    async fn query(&mut self, query: QuestionQuery) -> Result<Vec<Question>, Error>;
    async fn delete(&mut self, ids: Vec<i32>) -> Result<(), Error>;
}

pub trait ChoiceCommon {
    async fn insert(&mut self, choice: ChoiceInsert) -> Result<i32, Error>;
    async fn update(&mut self, id: i32, choice: ChoiceUpdate) -> Result<(), Error>;
    /// Ordered by id.
    async fn query(&mut self, query: ChoiceQuery) -> Result<Vec<Choice>, Error>;
    async fn delete(&mut self, ids: Vec<i32>) -> Result<(), Error>;
}

pub trait ResponseCommon {
    async fn insert(&mut self, response: ResponseInsert) -> Result<i32, Error>;
    async fn count(&mut self, query: ResponseQuery) -> Result<i64, Error>;
}

pub trait AnswerCommon {
    async fn insert(&mut self, answer: AnswerInsert) -> Result<i32, Error>;
    async fn add_choices(&mut self, answer_id: i32, choice_ids: Vec<i32>) -> Result<(), Error>;
    async fn query(&mut self, query: AnswerQuery) -> Result<Vec<AnswerRecord>, Error>;
}

pub trait UserCommon {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error>;
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error>;
    async fn exists(&mut self, username: &str) -> Result<bool, Error>;
}

pub trait Common: SurveyCommon + QuestionCommon + ChoiceCommon + ResponseCommon + AnswerCommon + UserCommon {}

pub trait Store: Common {}

pub trait TxStore: Store {
    /// Uncommitted writes are discarded when the store is dropped.
    async fn commit(self) -> Result<(), Error>;
}

pub trait Manager {
    type Store: Store;
    type TxStore: TxStore;

    async fn db(&self) -> Result<Self::Store, Error>;
    async fn tx(&self) -> Result<Self::TxStore, Error>;
}
