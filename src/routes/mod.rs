//! HTTP handlers and the helpers they share.

use actix_session::Session;
use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::domain::resource::Resource;
use crate::domain::session::SessionContext;
use crate::services::ServiceError;
use crate::services::main::load_dashboard;
use crate::session::sign_out;

pub mod actions;
pub mod api;
pub mod auth;
pub mod entity;
pub mod export;
pub mod list;
pub mod main;

/// Maps a flash level to the CSS class used by the alert partial.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Context every page starts from: alerts, current user and navigation.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    session: Option<&SessionContext>,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    if let Some(session) = session {
        context.insert("current_user", &session.user);
        context.insert("navigation", &load_dashboard(session).resources);
    }
    context
}

/// Resolves the `{resource}` path segment.
pub fn parse_resource(slug: &str) -> Result<Resource, HttpResponse> {
    slug.parse::<Resource>().map_err(|err| {
        log::debug!("{err}");
        HttpResponse::NotFound().finish()
    })
}

/// Turns a failed service call into the response the console shows.
///
/// An expired backend session also ends the local one.
pub fn service_error_response(session: &Session, err: ServiceError, back: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            sign_out(session);
            HttpResponse::Unauthorized().finish()
        }
        ServiceError::Forbidden(_) => {
            FlashMessage::error(err.user_message()).send();
            redirect("/")
        }
        ServiceError::Backend(_) | ServiceError::Export(_) => {
            log::error!("{err}");
            FlashMessage::error(err.user_message()).send();
            redirect(back)
        }
        other => {
            FlashMessage::error(other.user_message()).send();
            redirect(back)
        }
    }
}
