//! Sign-in and sign-out.

use validator::Validate;

use crate::domain::session::SessionContext;
use crate::forms::FormError;
use crate::forms::auth::LoginForm;
use crate::listing::store::ViewStore;
use crate::repository::Authenticator;
use crate::repository::errors::ApiError;
use crate::services::listing::ListCache;
use crate::services::{ServiceError, ServiceResult};

/// Exchanges credentials for a session.
pub async fn login<R>(repo: &R, form: LoginForm) -> ServiceResult<SessionContext>
where
    R: Authenticator + ?Sized,
{
    form.validate().map_err(FormError::from)?;
    let email = form.email.trim();

    match repo.login(email, &form.password).await {
        Ok(session) => {
            log::info!("{} signed in", session.user.email);
            Ok(session)
        }
        Err(ApiError::Unauthorized) => {
            log::warn!("Rejected sign-in for {email}");
            Err(ServiceError::Form("Invalid e-mail or password.".to_string()))
        }
        Err(err) => {
            log::error!("Sign-in failed: {err}");
            Err(ServiceError::Backend(err))
        }
    }
}

/// Drops everything cached or stored on behalf of the session.
pub fn logout(cache: &ListCache, views: &ViewStore, session: &SessionContext) {
    let dropped = cache.invalidate_scope(session.cache_scope());
    let forgotten = views.clear_scope(session.cache_scope());
    log::info!(
        "{} signed out, dropped {dropped} cached list(s) and {forgotten} list view(s)",
        session.user.email
    );
}
