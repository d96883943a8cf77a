use actix_session::Session;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, get, web};

use crate::listing::store::ViewStore;
use crate::repository::HttpRepository;
use crate::routes::{parse_resource, service_error_response};
use crate::services::export as export_service;
use crate::session::AuthSession;

#[get("/{resource}/export")]
pub async fn export_list(
    path: web::Path<String>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    views: web::Data<ViewStore>,
) -> impl Responder {
    let resource = match parse_resource(&path) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    let view = views.view(&auth, resource);

    match export_service::export_list(repo.get_ref(), &auth, resource, &view).await {
        Ok(download) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(download.file_name)],
            })
            .body(download.body),
        Err(err) => service_error_response(&session, err, &format!("/{}", resource.slug())),
    }
}
