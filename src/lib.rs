use std::time::Duration;

use actix_cors::Cors;
use actix_files::Files;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use crate::listing::actions::InFlightRows;
use crate::listing::store::ViewStore;
use crate::middleware::RedirectUnauthorized;
use crate::models::config::ServerConfig;
use crate::repository::HttpRepository;
use crate::routes::actions::{execute_action, open_action};
use crate::routes::api::api_v1_list;
use crate::routes::auth::{login, logout, show_login};
use crate::routes::entity::{create_entity, edit_entity, new_entity, show_entity, update_entity};
use crate::routes::export::export_list;
use crate::routes::list::{
    apply_filters, close_filters, go_to_page, open_filters, page_size, reset_filters, search,
    show_list,
};
use crate::routes::main::show_dashboard;
use crate::services::listing::ListCache;

pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod session;

/// Registers the JSON API and the console pages. Literal segments come
/// before the `{id}` and `{resource}` catch-alls.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").service(api_v1_list)).service(
        web::scope("")
            .wrap(RedirectUnauthorized)
            .service(show_dashboard)
            .service(show_login)
            .service(login)
            .service(logout)
            .service(new_entity)
            .service(create_entity)
            .service(export_list)
            .service(open_filters)
            .service(close_filters)
            .service(apply_filters)
            .service(reset_filters)
            .service(search)
            .service(page_size)
            .service(go_to_page)
            .service(edit_entity)
            .service(update_entity)
            .service(open_action)
            .service(execute_action)
            .service(show_entity)
            .service(show_list),
    );
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let repo = HttpRepository::new(&server_config.backend_url, server_config.request_timeout())
        .map_err(|e| std::io::Error::other(format!("Failed to build backend client: {e}")))?;

    // Shared across workers: cached list pages, per-user list state and rows
    // with a mutation in flight.
    let cache = web::Data::new(ListCache::new(server_config.cache_ttl()));
    let views = web::Data::new(ViewStore::new(server_config.view_idle()));
    let rows = web::Data::new(InFlightRows::new());

    // Drop expired list pages and forgotten list state so neither grows with
    // every query or user seen.
    let (cache_sweeper, view_sweeper) = (cache.clone(), views.clone());
    let sweep_every = server_config.cache_ttl().max(Duration::from_secs(1));
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let purged = cache_sweeper.purge_expired();
            if purged > 0 {
                log::debug!("Purged {purged} expired list pages");
            }
            let forgotten = view_sweeper.purge_idle();
            if forgotten > 0 {
                log::debug!("Forgot {forgotten} idle list views");
            }
        }
    });

    // Keys and stores for sessions and flash messages.
    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid session secret: {e}")))?;

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(actix_web::middleware::Compress::default())
            .wrap(actix_web::middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .configure(configure_routes)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(cache.clone())
            .app_data(views.clone())
            .app_data(rows.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
