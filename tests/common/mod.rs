//! Console wired against a fake backend.

#![allow(dead_code, unused_macros)]

use std::time::Duration;

use membership_admin::models::config::ServerConfig;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn server_config(backend: &MockServer) -> ServerConfig {
    ServerConfig {
        domain: "localhost".into(),
        address: "127.0.0.1".into(),
        port: 8080,
        backend_url: backend.uri(),
        templates_dir: "templates/**/*".into(),
        secret: "x".repeat(64),
        request_timeout_secs: 5,
        cache_ttl_secs: 60,
        search_debounce_ms: 400,
        view_idle_secs: 3600,
    }
}

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Accepts any sign-in as a plain admin.
pub async fn mount_login(backend: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "token": "tok",
                "user": {"id": 1, "name": "Ada", "email": "ada@example.com", "role": "admin"}
            }
        })))
        .mount(backend)
        .await;
}

/// Builds the console the way `run` does, minus the network listener.
macro_rules! console_app {
    ($backend:expr) => {{
        let config = common::server_config($backend);
        let repo = membership_admin::repository::HttpRepository::new(
            config.backend_url.clone(),
            common::TIMEOUT,
        )
        .unwrap();
        let tera = tera::Tera::new(&config.templates_dir).unwrap();
        let key = actix_web::cookie::Key::generate();
        let flash = actix_web_flash_messages::FlashMessagesFramework::builder(
            actix_web_flash_messages::storage::CookieMessageStore::builder(key.clone()).build(),
        )
        .build();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(flash)
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        key,
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(membership_admin::configure_routes)
                .app_data(actix_web::web::Data::new(tera))
                .app_data(actix_web::web::Data::new(repo))
                .app_data(actix_web::web::Data::new(
                    membership_admin::services::listing::ListCache::new(config.cache_ttl()),
                ))
                .app_data(actix_web::web::Data::new(
                    membership_admin::listing::actions::InFlightRows::new(),
                ))
                .app_data(actix_web::web::Data::new(
                    membership_admin::listing::store::ViewStore::new(config.view_idle()),
                ))
                .app_data(actix_web::web::Data::new(config)),
        )
        .await
    }};
}
