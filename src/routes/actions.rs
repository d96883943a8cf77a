use actix_session::Session;
use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::list::ConfirmForm;
use crate::listing::actions::InFlightRows;
use crate::repository::HttpRepository;
use crate::routes::{
    base_context, parse_resource, redirect, render_template, service_error_response,
};
use crate::services::actions::{self as actions_service, ActionOutcome};
use crate::services::listing::ListCache;
use crate::session::AuthSession;

#[get("/{resource}/{id}/action/{action}")]
pub async fn open_action(
    path: web::Path<(String, String, String)>,
    auth: AuthSession,
    session: Session,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (slug, id, action) = path.into_inner();
    let resource = match parse_resource(&slug) {
        Ok(resource) => resource,
        Err(response) => return response,
    };

    match actions_service::open_action(&auth, resource, &id, &action) {
        Ok(ActionOutcome::Redirect(location)) => redirect(&location),
        Ok(ActionOutcome::Confirm(data)) => {
            let mut context = base_context(&flash_messages, Some(&auth), resource.slug());
            context.insert("confirm", &data);

            render_template(&tera, "entity/confirm.html", &context)
        }
        Err(err) => service_error_response(&session, err, &format!("/{slug}")),
    }
}

#[post("/{resource}/{id}/action/{action}")]
#[allow(clippy::too_many_arguments)]
pub async fn execute_action(
    path: web::Path<(String, String, String)>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    cache: web::Data<ListCache>,
    rows: web::Data<InFlightRows>,
    web::Form(form): web::Form<ConfirmForm>,
) -> impl Responder {
    let (slug, id, action) = path.into_inner();
    let resource = match parse_resource(&slug) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    let back = format!("/{slug}");

    match actions_service::execute_action(
        repo.get_ref(),
        cache.get_ref(),
        rows.get_ref(),
        &auth,
        resource,
        &id,
        &action,
        form.is_confirmed(),
    )
    .await
    {
        Ok(Some(message)) => {
            FlashMessage::success(message).send();
            redirect(&back)
        }
        Ok(None) => {
            FlashMessage::info("Nothing was changed.").send();
            redirect(&back)
        }
        Err(err) => service_error_response(&session, err, &back),
    }
}
