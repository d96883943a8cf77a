//! Sign-in and sign-out pages.

use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::forms::auth::LoginForm;
use crate::listing::store::ViewStore;
use crate::repository::HttpRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::listing::ListCache;
use crate::services::{ServiceError, auth as auth_service};
use crate::session::{AuthSession, sign_in, sign_out};

#[derive(Deserialize)]
struct LoginQuery {
    #[serde(default)]
    expired: Option<u8>,
}

#[get("/login")]
pub async fn show_login(
    auth: Option<AuthSession>,
    query: web::Query<LoginQuery>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if auth.is_some() {
        return redirect("/");
    }
    let mut context = base_context(&flash_messages, None, "login");
    context.insert("expired", &query.expired.is_some());

    render_template(&tera, "auth/login.html", &context)
}

#[post("/login")]
pub async fn login(
    session: Session,
    repo: web::Data<HttpRepository>,
    web::Form(form): web::Form<LoginForm>,
) -> HttpResponse {
    match auth_service::login(repo.get_ref(), form).await {
        Ok(context) => {
            sign_in(&session, &context);
            FlashMessage::success(format!("Welcome, {}.", context.user.name)).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/login")
        }
        Err(err) => {
            log::error!("Failed to sign in: {err}");
            FlashMessage::error(err.user_message()).send();
            redirect("/login")
        }
    }
}

#[post("/logout")]
pub async fn logout(
    auth: Option<AuthSession>,
    session: Session,
    cache: web::Data<ListCache>,
    views: web::Data<ViewStore>,
) -> impl Responder {
    if let Some(auth) = auth {
        auth_service::logout(cache.get_ref(), views.get_ref(), &auth);
    }
    sign_out(&session);
    redirect("/login")
}
