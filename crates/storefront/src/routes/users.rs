//! User route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::extract::ValidJson;
use crate::models::{CreateUserInput, User};
use crate::state::AppState;

/// Register a user.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateUserInput>,
) -> Result<Json<User>> {
    Ok(Json(state.users().register(input).await?))
}

/// List all users.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users().list().await?))
}
