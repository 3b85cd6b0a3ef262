use crate::context::UserInfo;
use crate::core::models::survey::{Survey, SurveyDetail, SurveyForm};
use crate::core::ports::repository::Manager;
use crate::core::services::{response, survey};
use crate::error::Error;
use crate::request::Pagination;
use crate::response::{CreateResponse, DeleteResponse, List};
use actix_web::http::header::LOCATION;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;

pub async fn list<M: Manager>(manager: Data<M>, pagination: Query<Pagination>) -> Result<Json<List<Survey>>, Error> {
    let mut store = manager.db().await?;
    let (surveys, total) = response::list_active_surveys(&mut store, pagination.into_inner().into()).await?;
    Ok(Json(List::new(surveys, total)))
}

pub async fn my_surveys<M: Manager>(user: UserInfo, manager: Data<M>, pagination: Query<Pagination>) -> Result<Json<List<Survey>>, Error> {
    let mut store = manager.db().await?;
    let (surveys, total) = survey::list_own_surveys(&mut store, user.id, pagination.into_inner().into()).await?;
    Ok(Json(List::new(surveys, total)))
}

pub async fn detail<M: Manager>(manager: Data<M>, path: Path<(i32,)>) -> Result<Json<SurveyDetail>, Error> {
    let (id,) = path.into_inner();
    let mut store = manager.db().await?;
    Ok(Json(survey::survey_detail(&mut store, id).await?))
}

pub async fn edit_form<M: Manager>(user: UserInfo, manager: Data<M>, path: Path<(i32,)>) -> Result<Json<SurveyDetail>, Error> {
    let (id,) = path.into_inner();
    let mut store = manager.db().await?;
    Ok(Json(survey::editable_survey(&mut store, user.id, id).await?))
}

pub async fn create<M: Manager>(user: UserInfo, manager: Data<M>, Json(form): Json<SurveyForm>) -> Result<HttpResponse, Error> {
    let id = survey::create_survey(manager.tx().await?, user.id, form).await?;
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, format!("/surveys/{}/", id)))
        .json(CreateResponse { id }))
}

pub async fn edit<M: Manager>(user: UserInfo, manager: Data<M>, path: Path<(i32,)>, Json(form): Json<SurveyForm>) -> Result<HttpResponse, Error> {
    let (id,) = path.into_inner();
    survey::update_survey(manager.tx().await?, user.id, id, form).await?;
    Ok(HttpResponse::Ok()
        .insert_header((LOCATION, format!("/surveys/{}/", id)))
        .json(CreateResponse { id }))
}

pub async fn delete<M: Manager>(user: UserInfo, manager: Data<M>, path: Path<(i32,)>) -> Result<HttpResponse, Error> {
    let (id,) = path.into_inner();
    survey::delete_survey(manager.tx().await?, user.id, id).await?;
    Ok(HttpResponse::Ok()
        .insert_header((LOCATION, "/surveys/my-surveys/"))
        .json(DeleteResponse { deleted: 1 }))
}
