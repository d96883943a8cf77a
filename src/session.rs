//! Cookie-session glue. The cookie carries the signed-in [`SessionContext`]
//! and nothing else; list state lives in
//! [`ViewStore`](crate::listing::store::ViewStore).

use std::future::{Ready, ready};
use std::ops::Deref;

use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::session::SessionContext;

const SESSION_KEY: &str = "session";

/// Extractor for handlers that talk to the backend. Answers 401 when nobody
/// is signed in.
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionContext);

impl Deref for AuthSession {
    type Target = SessionContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.get_session().get::<SessionContext>(SESSION_KEY) {
            Ok(Some(context)) => Ok(AuthSession(context)),
            Ok(None) => Err(ErrorUnauthorized("Your session has expired.")),
            Err(err) => {
                log::warn!("Unreadable session cookie: {err}");
                Err(ErrorUnauthorized("Your session has expired."))
            }
        };
        ready(result)
    }
}

/// Starts a fresh session for `context`.
pub fn sign_in(session: &Session, context: &SessionContext) {
    session.renew();
    if let Err(err) = session.insert(SESSION_KEY, context) {
        log::error!("Failed to store the session: {err}");
    }
}

/// Forgets the signed-in user.
pub fn sign_out(session: &Session) {
    session.purge();
}
