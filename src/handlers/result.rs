use crate::context::UserInfo;
use crate::core::models::result::SurveyResults;
use crate::core::ports::repository::Manager;
use crate::core::services::result::compute_results;
use crate::error::Error;
use actix_web::web::{Data, Json, Path};

pub async fn results<M: Manager>(user: UserInfo, manager: Data<M>, path: Path<(i32,)>) -> Result<Json<SurveyResults>, Error> {
    let (id,) = path.into_inner();
    let mut store = manager.db().await?;
    Ok(Json(compute_results(&mut store, user.id, id).await?))
}
