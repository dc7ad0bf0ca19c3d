//! Account registration and password login.
//!
//! Login trades credentials for a bearer token minted by [`JwtIdentity`]; every
//! other request only ever sees the resulting [`ActorId`].

use std::sync::Arc;

use thiserror::Error;
use time::Duration;
use tokio::task;
use tracing::info;

use crate::application::identity::{AuthError, JwtIdentity};
use crate::application::password::{hash_password, verify_password};
use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

const USERNAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 8;
const PASSWORD_MAX_CHARS: usize = 128;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("invalid registration: {0}")]
    Invalid(String),
    #[error("credential processing failed: {0}")]
    Internal(String),
    #[error(transparent)]
    Token(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: Duration,
}

pub struct AccountService {
    users: Arc<dyn UsersRepo>,
    tokens: Arc<JwtIdentity>,
    token_ttl: Duration,
}

impl AccountService {
    pub fn new(users: Arc<dyn UsersRepo>, tokens: Arc<JwtIdentity>, token_ttl: Duration) -> Self {
        Self {
            users,
            tokens,
            token_ttl,
        }
    }

    pub async fn register(&self, command: RegisterCommand) -> Result<UserRecord, AccountError> {
        let email = normalize_email(&command.email)?;
        let username = validate_username(&command.username)?;
        validate_password(&command.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AccountError::UsernameTaken);
        }

        let password = command.password;
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|err| AccountError::Internal(err.to_string()))?
            .map_err(|err| AccountError::Internal(err.to_string()))?;

        let user = self
            .users
            .create_user(CreateUserParams {
                email,
                username,
                password_hash,
            })
            .await?;

        info!(
            target = "blogline::accounts",
            user_id = user.id,
            "account registered"
        );
        Ok(user)
    }

    /// `identifier` is an email address or a username.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<IssuedToken, AccountError> {
        let identifier = identifier.trim();
        let user = if identifier.contains('@') {
            self.users
                .find_by_email(&identifier.to_ascii_lowercase())
                .await?
        } else {
            self.users.find_by_username(identifier).await?
        };
        let Some(user) = user else {
            return Err(AccountError::InvalidCredentials);
        };

        let password = password.to_owned();
        let stored = user.password_hash.clone();
        let matches = task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|err| AccountError::Internal(err.to_string()))?
            .map_err(|err| AccountError::Internal(err.to_string()))?;
        if !matches {
            return Err(AccountError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(user.actor(), self.token_ttl)?;
        info!(
            target = "blogline::accounts",
            user_id = user.id,
            "token issued"
        );
        Ok(IssuedToken {
            access_token,
            expires_in: self.token_ttl,
        })
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

fn normalize_email(raw: &str) -> Result<String, AccountError> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AccountError::Invalid("email is not a valid address".into()))
    }
}

fn validate_username(raw: &str) -> Result<String, AccountError> {
    let username = raw.trim();
    let length = username.chars().count();
    if length == 0 || length > USERNAME_MAX_CHARS {
        return Err(AccountError::Invalid(format!(
            "username must be 1 to {USERNAME_MAX_CHARS} characters"
        )));
    }
    if username.contains('@') || username.chars().any(char::is_whitespace) {
        return Err(AccountError::Invalid(
            "username may not contain `@` or whitespace".into(),
        ));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    let length = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&length) {
        return Err(AccountError::Invalid(format!(
            "password must be {PASSWORD_MIN_CHARS} to {PASSWORD_MAX_CHARS} characters"
        )));
    }
    Ok(())
}
