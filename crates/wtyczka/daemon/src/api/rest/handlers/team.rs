//! Contacts listing

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{extract::State, Json};
use wtyczka_types::TeamMember;

/// List organizer contacts. Gated on `CONTACT_DATE` by the middleware.
pub async fn list_team_members(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamMember>>> {
    let members = state.storage.list_team_members().await?;
    Ok(Json(members))
}
