use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::routes::{base_context, render_template};
use crate::services::main as main_service;
use crate::session::AuthSession;

#[get("/")]
pub async fn show_dashboard(
    auth: AuthSession,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = main_service::load_dashboard(&auth);
    let mut context = base_context(&flash_messages, Some(&auth), "dashboard");
    context.insert("resources", &data.resources);

    render_template(&tera, "main/index.html", &context)
}
