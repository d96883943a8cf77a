//! List pages: table, search, page size, pagination and the filter drawer.
//!
//! Every handler here mutates the stored [`ListView`] of one resource and
//! redirects back to the list, which is the only place that fetches.

use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::resource::Resource;
use crate::domain::session::SessionContext;
use crate::domain::types::PageSize;
use crate::forms::list::{FilterForm, PageSizeForm, SearchForm};
use crate::listing::actions::InFlightRows;
use crate::listing::store::ViewStore;
use crate::listing::view::ListView;
use crate::models::config::ServerConfig;
use crate::repository::HttpRepository;
use crate::routes::{
    base_context, parse_resource, redirect, render_template, service_error_response,
};
use crate::services::ServiceError;
use crate::services::listing::{self as listing_service, ListCache};
use crate::session::AuthSession;

fn list_url(resource: Resource) -> String {
    format!("/{}", resource.slug())
}

/// Lets `update` change the stored view and goes back to the list.
fn update_view(
    views: &ViewStore,
    auth: &SessionContext,
    slug: &str,
    update: impl FnOnce(Resource, &mut ListView),
) -> HttpResponse {
    let resource = match parse_resource(slug) {
        Ok(resource) => resource,
        Err(response) => return response,
    };
    views.update(auth, resource, |view| update(resource, view));
    redirect(&list_url(resource))
}

#[get("/{resource}")]
#[allow(clippy::too_many_arguments)]
pub async fn show_list(
    path: web::Path<String>,
    auth: AuthSession,
    session: Session,
    repo: web::Data<HttpRepository>,
    cache: web::Data<ListCache>,
    rows: web::Data<InFlightRows>,
    views: web::Data<ViewStore>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let resource = match parse_resource(&path) {
        Ok(resource) => resource,
        Err(response) => return response,
    };

    match listing_service::load_list_page(
        repo.get_ref(),
        cache.get_ref(),
        rows.get_ref(),
        views.get_ref(),
        &auth,
        resource,
    )
    .await
    {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&auth), resource.slug());
            context.insert("list", &data);
            context.insert("search_debounce_ms", &server_config.search_debounce_ms);

            render_template(&tera, "list/index.html", &context)
        }
        Err(err) => service_error_response(&session, err, "/"),
    }
}

#[post("/{resource}/search")]
pub async fn search(
    path: web::Path<String>,
    auth: AuthSession,
    views: web::Data<ViewStore>,
    web::Form(form): web::Form<SearchForm>,
) -> impl Responder {
    update_view(&views, &auth, &path, |resource, view| {
        match form.into_term() {
            Ok(term) => {
                view.search(&term);
            }
            Err(err) => {
                log::warn!("Rejected {resource} search: {err}");
                FlashMessage::error(ServiceError::from(err).user_message()).send();
            }
        }
    })
}

#[post("/{resource}/page-size")]
pub async fn page_size(
    path: web::Path<String>,
    auth: AuthSession,
    views: web::Data<ViewStore>,
    web::Form(form): web::Form<PageSizeForm>,
) -> impl Responder {
    update_view(&views, &auth, &path, |_, view| {
        match PageSize::try_from(form) {
            Ok(page_size) => {
                view.set_page_size(page_size);
            }
            Err(err) => FlashMessage::error(ServiceError::from(err).user_message()).send(),
        }
    })
}

#[get("/{resource}/page/{page}")]
pub async fn go_to_page(
    path: web::Path<(String, usize)>,
    auth: AuthSession,
    views: web::Data<ViewStore>,
) -> impl Responder {
    let (slug, page) = path.into_inner();
    update_view(&views, &auth, &slug, |_, view| {
        if let Err(err) = listing_service::go_to_page(view, page) {
            FlashMessage::error(err.user_message()).send();
        }
    })
}

#[get("/{resource}/filters")]
pub async fn open_filters(
    path: web::Path<String>,
    auth: AuthSession,
    views: web::Data<ViewStore>,
) -> impl Responder {
    update_view(&views, &auth, &path, |_, view| view.open_drawer())
}

#[get("/{resource}/filters/close")]
pub async fn close_filters(
    path: web::Path<String>,
    auth: AuthSession,
    views: web::Data<ViewStore>,
) -> impl Responder {
    update_view(&views, &auth, &path, |_, view| view.close_drawer())
}

#[post("/{resource}/filters/apply")]
pub async fn apply_filters(
    path: web::Path<String>,
    auth: AuthSession,
    views: web::Data<ViewStore>,
    body: String,
) -> impl Responder {
    update_view(&views, &auth, &path, |resource, view| {
        let result = FilterForm::parse(resource, &body)
            .map_err(ServiceError::from)
            .and_then(|form| listing_service::apply_filters(resource, view, form.values));
        match result {
            Ok(_) => {}
            // The drawer stays open and shows the message next to the field.
            Err(ServiceError::Filter(_)) => {}
            Err(err) => FlashMessage::error(err.user_message()).send(),
        }
    })
}

#[post("/{resource}/filters/reset")]
pub async fn reset_filters(
    path: web::Path<String>,
    auth: AuthSession,
    views: web::Data<ViewStore>,
) -> impl Responder {
    update_view(&views, &auth, &path, |_, view| {
        view.reset_filters();
    })
}
