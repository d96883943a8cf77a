use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Sign-in form.
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}
