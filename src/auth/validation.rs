use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    auth::dto::{LoginRequest, RegisterRequest},
    error::{AppError, FieldError},
};

pub const USERNAME_LEN: (usize, usize) = (3, 50);
pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 100;
pub const PASSWORD_LEN: (usize, usize) = (6, 100);
pub const PHONE_DIGITS: (usize, usize) = (7, 15);
/// Separators included; matches the `phone_number` column width.
pub const PHONE_MAX_LEN: usize = 20;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    email.chars().count() <= EMAIL_MAX_LEN && EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9(][0-9 ()\-]*[0-9]$").unwrap();
    }
    if phone.chars().count() > PHONE_MAX_LEN {
        return false;
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    PHONE_RE.is_match(phone) && (PHONE_DIGITS.0..=PHONE_DIGITS.1).contains(&digits)
}

fn check_len(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(FieldError::new(
            field,
            format!("must be between {} and {} characters", min, max),
        ));
    }
}

/// Field-level checks for a registration body. Reports every failing field.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if req.username.trim() != req.username {
        errors.push(FieldError::new(
            "username",
            "must not start or end with whitespace",
        ));
    } else {
        check_len(&mut errors, "username", &req.username, USERNAME_LEN);
    }

    if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }

    check_len(&mut errors, "firstName", req.first_name.trim(), (1, NAME_MAX_LEN));
    check_len(&mut errors, "lastName", req.last_name.trim(), (1, NAME_MAX_LEN));
    check_len(&mut errors, "password", &req.password, PASSWORD_LEN);

    if !is_valid_phone(&req.phone_number) {
        errors.push(FieldError::new("phoneNumber", "must be a valid phone number"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn validate_login(req: &LoginRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if req.username_or_email.is_empty() {
        errors.push(FieldError::new("usernameOrEmail", "is required"));
    }
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
