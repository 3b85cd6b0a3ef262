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
use crate::error::Error;
use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, QueryBuilder, Transaction};

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

fn push_survey_filters(stmt: &mut QueryBuilder<'_, Postgres>, query: &SurveyQuery) {
    stmt.push(" WHERE 1 = 1");
    if let Some(uid) = query.created_by_eq {
        stmt.push(" AND created_by = ").push_bind(uid);
    }
    if let Some(active) = query.is_active_eq {
        stmt.push(" AND is_active = ").push_bind(active);
    }
}

impl<E> SurveyCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: SurveyInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO surveys (title, description, created_by, is_active) VALUES ($1, $2, $3, $4) RETURNING id")
            .bind(data.title)
            .bind(data.description)
            .bind(data.created_by)
            .bind(data.is_active)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn update(&mut self, id: i32, data: SurveyUpdate) -> Result<(), Error> {
        query("UPDATE surveys SET title = $1, description = $2, is_active = $3, updated_at = NOW() WHERE id = $4")
            .bind(data.title)
            .bind(data.description)
            .bind(data.is_active)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn get(&mut self, id: i32) -> Result<Option<Survey>, Error> {
        let survey = query_as("SELECT * FROM surveys WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(survey)
    }

    async fn get_for_update(&mut self, id: i32) -> Result<Option<Survey>, Error> {
        let survey = query_as("SELECT * FROM surveys WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(survey)
    }

    async fn query(&mut self, query: &SurveyQuery, pagination: Option<Pagination>) -> Result<Vec<Survey>, Error> {
        let mut stmt: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM surveys");
        push_survey_filters(&mut stmt, query);
        stmt.push(" ORDER BY created_at DESC, id DESC");
        if let Some(Pagination { limit, offset }) = pagination {
            stmt.push(" LIMIT ").push_bind(limit);
            stmt.push(" OFFSET ").push_bind(offset);
        }
        let surveys = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(surveys)
    }

    async fn count(&mut self, query: &SurveyQuery) -> Result<i64, Error> {
        let mut stmt: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM surveys");
        push_survey_filters(&mut stmt, query);
        let (n,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        query("DELETE FROM surveys WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }
}

impl<E> QuestionCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error> {
        let id = query_scalar(r#"INSERT INTO questions (survey_id, text, question_type, is_required, "order") VALUES ($1, $2, $3, $4, $5) RETURNING id"#)
            .bind(question.survey_id)
            .bind(question.text)
            .bind(question.question_type)
            .bind(question.is_required)
            .bind(question.order)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn update(&mut self, id: i32, question: QuestionUpdate) -> Result<(), Error> {
        query(r#"UPDATE questions SET text = $1, question_type = $2, is_required = $3, "order" = $4 WHERE id = $5"#)
            .bind(question.text)
            .bind(question.question_type)
            .bind(question.is_required)
            .bind(question.order)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn query(&mut self, query: QuestionQuery) -> Result<Vec<Question>, Error> {
        let questions = query_as(r#"SELECT * FROM questions WHERE survey_id = $1 ORDER BY "order", id"#)
            .bind(query.survey_id_eq)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(questions)
    }

    async fn delete(&mut self, ids: Vec<i32>) -> Result<(), Error> {
        query("DELETE FROM questions WHERE id = ANY($1)").bind(ids).execute(&mut self.executor).await?;
        Ok(())
    }
}

impl<E> ChoiceCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, choice: ChoiceInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO choices (question_id, text, value) VALUES ($1, $2, $3) RETURNING id")
            .bind(choice.question_id)
            .bind(choice.text)
            .bind(choice.value)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn update(&mut self, id: i32, choice: ChoiceUpdate) -> Result<(), Error> {
        query("UPDATE choices SET text = $1, value = $2 WHERE id = $3")
            .bind(choice.text)
            .bind(choice.value)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn query(&mut self, query: ChoiceQuery) -> Result<Vec<Choice>, Error> {
        let choices = query_as("SELECT * FROM choices WHERE question_id = ANY($1) ORDER BY id")
            .bind(query.question_id_in)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(choices)
    }

    async fn delete(&mut self, ids: Vec<i32>) -> Result<(), Error> {
        query("DELETE FROM choices WHERE id = ANY($1)").bind(ids).execute(&mut self.executor).await?;
        Ok(())
    }
}

impl<E> ResponseCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, response: ResponseInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO responses (survey_id, respondent_id) VALUES ($1, $2) RETURNING id")
            .bind(response.survey_id)
            .bind(response.respondent_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn count(&mut self, query: ResponseQuery) -> Result<i64, Error> {
        let n = query_scalar("SELECT COUNT(*) FROM responses WHERE survey_id = $1")
            .bind(query.survey_id_eq)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(n)
    }
}

impl<E> AnswerCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, answer: AnswerInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO answers (response_id, question_id, text_answer) VALUES ($1, $2, $3) RETURNING id")
            .bind(answer.response_id)
            .bind(answer.question_id)
            .bind(answer.text_answer)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn add_choices(&mut self, answer_id: i32, choice_ids: Vec<i32>) -> Result<(), Error> {
        let mut stmt: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO answer_choices (answer_id, choice_id) ");
        stmt.push_values(choice_ids, |mut b, choice_id| {
            b.push_bind(answer_id).push_bind(choice_id);
        });
        stmt.push(" ON CONFLICT DO NOTHING");
        stmt.build().execute(&mut self.executor).await?;
        Ok(())
    }

    async fn query(&mut self, query: AnswerQuery) -> Result<Vec<AnswerRecord>, Error> {
        let answers = query_as(
            "
        SELECT
            a.id AS id,
            a.question_id AS question_id,
            a.text_answer AS text_answer,
            COALESCE(ARRAY_AGG(ac.choice_id ORDER BY ac.choice_id) FILTER (WHERE ac.choice_id IS NOT NULL), '{}') AS choice_ids
        FROM answers AS a
        JOIN responses AS r ON r.id = a.response_id
        LEFT JOIN answer_choices AS ac ON ac.answer_id = a.id
        WHERE r.survey_id = $1
        GROUP BY a.id, a.question_id, a.text_answer
        ORDER BY a.id",
        )
        .bind(query.survey_id_eq)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(answers)
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO users (username, password, salt) VALUES ($1, $2, $3) RETURNING id")
            .bind(user.username)
            .bind(user.password)
            .bind(user.salt)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE username = $1").bind(username).fetch_optional(&mut self.executor).await?;
        Ok(user)
    }

    async fn exists(&mut self, username: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }
}

impl<E> Common for PgSqlx<E> where for<'e> &'e mut E: Executor<'e, Database = Postgres> {}
impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Store for PgSqlx<Transaction<'a, Postgres>> {}

impl<'a> TxStore for PgSqlx<Transaction<'a, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Manager for PgSqlxManager {
    type Store = PgSqlx<PoolConnection<Postgres>>;
    type TxStore = PgSqlx<Transaction<'static, Postgres>>;

    async fn db(&self) -> Result<Self::Store, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx::new(conn))
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx::new(tx))
    }
}
