use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

use crate::dto::api::ListApiQuery;
use crate::repository::errors::ApiError;
use crate::repository::HttpRepository;
use crate::routes::parse_resource;
use crate::services::listing::ListCache;
use crate::services::{ServiceError, api as api_service};
use crate::session::AuthSession;

fn error_body(err: &ServiceError) -> serde_json::Value {
    json!({ "message": err.user_message() })
}

#[get("/v1/{resource}")]
/// JSON page of any resource, driven by query parameters alone.
pub async fn api_v1_list(
    path: web::Path<String>,
    query: web::Query<ListApiQuery>,
    auth: Option<AuthSession>,
    repo: web::Data<HttpRepository>,
    cache: web::Data<ListCache>,
) -> impl Responder {
    let Some(auth) = auth else {
        return HttpResponse::Unauthorized().json(error_body(&ServiceError::Unauthorized));
    };
    let resource = match parse_resource(&path) {
        Ok(resource) => resource,
        Err(response) => return response,
    };

    match api_service::list_json(
        repo.get_ref(),
        cache.get_ref(),
        &auth,
        resource,
        query.into_inner(),
    )
    .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err @ ServiceError::Unauthorized) => HttpResponse::Unauthorized().json(error_body(&err)),
        Err(err @ ServiceError::Forbidden(_)) => HttpResponse::Forbidden().json(error_body(&err)),
        Err(err @ ServiceError::NotFound) => HttpResponse::NotFound().json(error_body(&err)),
        Err(err @ ServiceError::Backend(ApiError::Request(_))) => {
            log::error!("Failed to build {resource} request: {err}");
            HttpResponse::InternalServerError().json(error_body(&err))
        }
        Err(err @ (ServiceError::Backend(_) | ServiceError::Export(_))) => {
            log::error!("Failed to serve {resource} list: {err}");
            HttpResponse::BadGateway().json(error_body(&err))
        }
        Err(err) => HttpResponse::BadRequest().json(error_body(&err)),
    }
}
