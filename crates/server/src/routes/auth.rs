//! Registration, login and logout.

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::Redirect,
};
use inkpost_core::Role;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{
    AppError, HandlerError, OrRedirect, Result, clear_sentry_user, set_sentry_user,
};
use crate::middleware::set_session_user;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Requested role, taken as given. Absent means `user`.
    pub role: Option<String>,
}

/// Login form data.
///
/// Absent fields fail the request. Present but empty values are checked
/// like any other credentials.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Unwrap a form body, treating a rejected body as a failed request.
fn form_or_redirect<T>(
    form: std::result::Result<Form<T>, FormRejection>,
    message: &'static str,
) -> Result<T> {
    form.map(|Form(inner)| inner)
        .map_err(|e| AppError::BadRequest(e.body_text()))
        .or_redirect(message)
}

/// Handle registration form submission.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    form: std::result::Result<Form<RegisterForm>, FormRejection>,
) -> Result<Redirect> {
    let form = form_or_redirect(form, REGISTRATION_FAILED)?;

    let role = form.role.map_or_else(Role::default, Role::from);
    if role.is_admin() {
        tracing::warn!(username = %form.username, "Registering with self-assigned admin role");
    }

    let user = AuthService::new(state.store())
        .register(&form.username, &form.password, role)
        .await
        .or_redirect(REGISTRATION_FAILED)?;

    set_session_user(&session, user.id)
        .await
        .or_redirect(REGISTRATION_FAILED)?;
    set_sentry_user(&user.id, user.username.as_str());

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
    Ok(Redirect::to("/dashboard"))
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Result<Redirect> {
    let form = form_or_redirect(form, LOGIN_FAILED)?;

    let Some(username) = form.username else {
        return Err(HandlerError::new(AppError::MissingField("username"), LOGIN_FAILED));
    };
    let Some(password) = form.password else {
        return Err(HandlerError::new(AppError::MissingField("password"), LOGIN_FAILED));
    };

    let user = match AuthService::new(state.store())
        .login(&username, &password)
        .await
    {
        Ok(user) => user,
        Err(e @ AuthError::InvalidCredentials) => {
            return Err(HandlerError::new(e.into(), INVALID_CREDENTIALS));
        }
        Err(e) => return Err(HandlerError::new(e.into(), LOGIN_FAILED)),
    };

    set_session_user(&session, user.id)
        .await
        .or_redirect(LOGIN_FAILED)?;
    set_sentry_user(&user.id, user.username.as_str());

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
    Ok(Redirect::to("/dashboard"))
}

/// Destroy the session and return to the landing page.
///
/// Always succeeds, including when there is no session to destroy.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session on logout");
    }
    clear_sentry_user();

    Redirect::to("/")
}
