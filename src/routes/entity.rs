//! Detail pages and add/edit forms.

use actix_multipart::form::MultipartForm;
use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::resource::Resource;
use crate::domain::session::SessionContext;
use crate::dto::entity::FormPageData;
use crate::forms::entity::EntityMultipartForm;
use crate::listing::actions::InFlightRows;
use crate::repository::HttpRepository;
use crate::routes::{
    base_context, parse_resource, redirect, render_template, service_error_response,
};
use crate::services::ServiceError;
use crate::services::entity::{self as entity_service, SaveOutcome};
use crate::services::listing::ListCache;
use crate::session::AuthSession;

#[derive(Deserialize)]
struct DetailQuery {
    tab: Option<String>,
    page: Option<usize>,
}

fn render_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    auth: &SessionContext,
    resource: Resource,
    data: &FormPageData,
) -> HttpResponse {
    let mut context = base_context(flash_messages, Some(auth), resource.slug());
    context.insert("form", data);
    render_template(tera, "entity/form.html", &context)
}

#[get("/{resource}/new")]
pub async fn new_entity(
    path: web::Path<String>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let resource = match parse_resource(&path) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    match entity_service::load_form(repo.get_ref(), &auth, resource, None).await {
        Ok(data) => render_form(&tera, &flash_messages, &auth, resource, &data),
        Err(err) => service_error_response(&session, err, &format!("/{}", resource.slug())),
    }
}

#[get("/{resource}/{id}/edit")]
pub async fn edit_entity(
    path: web::Path<(String, String)>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (slug, id) = path.into_inner();
    let resource = match parse_resource(&slug) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    match entity_service::load_form(repo.get_ref(), &auth, resource, Some(&id)).await {
        Ok(data) => render_form(&tera, &flash_messages, &auth, resource, &data),
        Err(err) => service_error_response(&session, err, &format!("/{slug}")),
    }
}

#[allow(clippy::too_many_arguments)]
async fn save(
    resource: Resource,
    id: Option<&str>,
    form: EntityMultipartForm,
    auth: &SessionContext,
    session: &Session,
    repo: &HttpRepository,
    cache: &ListCache,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    let back = format!("/{}", resource.slug());
    let submission = match form.into_submission(resource.form_fields()) {
        Ok(submission) => submission,
        Err(err) => {
            log::warn!("Rejected {resource} form: {err}");
            return service_error_response(session, ServiceError::from(err), &back);
        }
    };

    match entity_service::save_entity(repo, cache, auth, resource, id, submission).await {
        Ok(SaveOutcome::Saved(message)) => {
            FlashMessage::success(message).send();
            redirect(&back)
        }
        Ok(SaveOutcome::Rejected(data)) => render_form(tera, flash_messages, auth, resource, &data),
        Err(err) => service_error_response(session, err, &back),
    }
}

#[post("/{resource}/new")]
#[allow(clippy::too_many_arguments)]
pub async fn create_entity(
    path: web::Path<String>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    cache: web::Data<ListCache>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<EntityMultipartForm>,
) -> impl Responder {
    let resource = match parse_resource(&path) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    save(
        resource,
        None,
        form,
        &auth,
        &session,
        repo.get_ref(),
        cache.get_ref(),
        &flash_messages,
        &tera,
    )
    .await
}

#[post("/{resource}/{id}/edit")]
#[allow(clippy::too_many_arguments)]
pub async fn update_entity(
    path: web::Path<(String, String)>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    cache: web::Data<ListCache>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<EntityMultipartForm>,
) -> impl Responder {
    let (slug, id) = path.into_inner();
    let resource = match parse_resource(&slug) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    save(
        resource,
        Some(&id),
        form,
        &auth,
        &session,
        repo.get_ref(),
        cache.get_ref(),
        &flash_messages,
        &tera,
    )
    .await
}

#[get("/{resource}/{id}")]
#[allow(clippy::too_many_arguments)]
pub async fn show_entity(
    path: web::Path<(String, String)>,
    query: web::Query<DetailQuery>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    rows: web::Data<InFlightRows>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (slug, id) = path.into_inner();
    let resource = match parse_resource(&slug) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    let query = query.into_inner();

    match entity_service::load_detail(
        repo.get_ref(),
        rows.get_ref(),
        &auth,
        resource,
        &id,
        query.tab.as_deref(),
        query.page.unwrap_or(1),
    )
    .await
    {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&auth), resource.slug());
            context.insert("detail", &data);

            render_template(&tera, "entity/detail.html", &context)
        }
        Err(err) => service_error_response(&session, err, &format!("/{slug}")),
    }
}
