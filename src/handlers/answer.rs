use crate::context::UserInfo;
use crate::core::models::response::Submission;
use crate::core::ports::repository::Manager;
use crate::core::services::response::submit_response;
use crate::error::Error;
use crate::response::SubmitResponse;
use actix_web::http::header::LOCATION;
use actix_web::web::{Data, Json, Path};
use actix_web::HttpResponse;

pub const THANK_YOU: &str = "Thank you for completing the survey!";

/// Open to anonymous respondents.
pub async fn submit<M: Manager>(
    user: Option<UserInfo>,
    manager: Data<M>,
    path: Path<(i32,)>,
    Json(submission): Json<Submission>,
) -> Result<HttpResponse, Error> {
    let (survey_id,) = path.into_inner();
    let id = submit_response(manager.tx().await?, survey_id, user.map(|u| u.id), submission).await?;
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, "/surveys/"))
        .json(SubmitResponse { id, message: THANK_YOU }))
}
