use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo::User,
    },
    error::AppError,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Register a new account. Fails Conflict when the email is already taken,
/// including when a concurrent registration wins the race.
pub async fn register_user(db: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if User::find_by_email(db, email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::conflict("Email already registered"));
    }

    let hash = hash_password(password)?;
    let user = match User::create(db, email, &hash).await {
        Ok(u) => u,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(email = %email, "email registration race lost");
            return Err(AppError::conflict("Email already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Authenticate by email and password. Unknown email and wrong password are
/// deliberately indistinguishable to the caller.
pub async fn authenticate_user(db: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    let invalid = || AppError::unauthorized("Incorrect email or password");

    let user = match User::find_by_email(db, email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(invalid());
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(user)
}

/// Remove the account and, by cascade, every entry it owns. Irreversible.
pub async fn delete_account(db: &PgPool, user_id: uuid::Uuid) -> Result<(), AppError> {
    User::delete(db, user_id).await?;
    info!(user_id = %user_id, "account deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn register_rejects_five_char_password() {
        let state = AppState::fake();
        let err = register_user(&state.db, "short@example.com", "12345")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn password_length_counts_characters_not_bytes() {
        let state = AppState::fake();
        // five characters, fifteen bytes
        let err = register_user(&state.db, "short@example.com", "日日日日日")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn register_rejects_malformed_email_before_touching_storage() {
        let state = AppState::fake();
        let err = register_user(&state.db, "not-an-email", "long-enough")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn accepts_plausible_emails() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("@example.com"));
    }
}
