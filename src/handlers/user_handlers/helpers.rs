use crate::auth::validate;
use crate::errors::AppError;
use crate::identity::{IdentityStore, User};
use crate::models::user::{UserCreateForm, UserEditForm};

pub const USER_NOT_FOUND: &str = "User is not found";

pub async fn find_user(store: &dyn IdentityStore, id: &str) -> Result<User, AppError> {
    store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
}

pub fn validate_edit_form(form: &UserEditForm) -> Vec<String> {
    let mut errors = vec![];
    errors.extend(validate::validate_username(&form.user_name));
    errors.extend(validate::validate_email(&form.email));
    errors.extend(validate::validate_optional(&form.full_name, "Full name", 100));
    errors
}

pub fn validate_create_form(form: &UserCreateForm) -> Vec<String> {
    let mut errors = vec![];
    errors.extend(validate::validate_username(&form.user_name));
    errors.extend(validate::validate_email(&form.email));
    errors.extend(validate::validate_optional(&form.full_name, "Full name", 100));
    errors.extend(validate::validate_password(&form.password));
    errors
}
