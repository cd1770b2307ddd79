//! User account handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use threadline_core::models::User;
use threadline_core::{UserId, UserRole};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Roles offered in the role picker.
const ROLES: [UserRole; 2] = [UserRole::Customer, UserRole::Admin];

/// One row of the user grid. Emails are masked.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub verified: bool,
    pub joined: String,
}

impl From<&User> for UserRowView {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            name: user.full_name(),
            email: user.masked_email(),
            role: user.role.to_string(),
            verified: user.is_email_verified,
            joined: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleOption {
    pub value: String,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub page: PageContext,
    pub users: Vec<UserRowView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "users/edit.html")]
pub struct UserEditTemplate {
    pub page: PageContext,
    pub user: UserRowView,
    pub roles: Vec<RoleOption>,
    /// Admins cannot demote or delete themselves.
    pub is_self: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub role: String,
}

#[instrument(skip(state, admin, page))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
) -> Result<UsersTemplate> {
    let users = state.backend_for(&admin).list_users().await?;
    Ok(UsersTemplate {
        page,
        users: users.iter().map(UserRowView::from).collect(),
    })
}

#[instrument(skip(state, admin, page))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
    Path(id): Path<UserId>,
) -> Result<UserEditTemplate> {
    let user = state.backend_for(&admin).get_user(&id).await?;
    let roles = ROLES
        .iter()
        .map(|role| RoleOption {
            value: role.to_string(),
            selected: *role == user.role,
        })
        .collect();

    Ok(UserEditTemplate {
        page,
        is_self: user.user_id == admin.user_id,
        user: UserRowView::from(&user),
        roles,
    })
}

/// Change a user's role.
#[instrument(skip(state, admin, session))]
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<UserId>,
    Form(form): Form<RoleForm>,
) -> Redirect {
    let back = Redirect::to(&format!("/users/{id}/edit"));

    let Ok(role) = form.role.parse::<UserRole>() else {
        set_flash(&session, Flash::error("Choose a valid role.")).await;
        return back;
    };
    if id == admin.user_id && !role.is_admin() {
        set_flash(&session, Flash::error("You cannot remove your own admin role.")).await;
        return back;
    }

    match state.backend_for(&admin).update_user_role(&id, role).await {
        Ok(()) => {
            tracing::info!(user_id = %id, role = %role, "User role changed");
            set_flash(&session, Flash::success(format!("Role changed to {role}."))).await;
            Redirect::to("/users")
        }
        Err(e) => {
            tracing::warn!(error = %e, user_id = %id, "Failed to change user role");
            set_flash(&session, Flash::error(e.user_message())).await;
            back
        }
    }
}

#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<UserId>,
) -> Redirect {
    if id == admin.user_id {
        set_flash(&session, Flash::error("You cannot delete your own account.")).await;
        return Redirect::to("/users");
    }

    match state.backend_for(&admin).delete_user(&id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, "User deleted");
            set_flash(&session, Flash::success("User deleted.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, user_id = %id, "Failed to delete user");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Redirect::to("/users")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_masks_email() {
        let user: User = serde_json::from_value(serde_json::json!({
            "userId": "u-1",
            "email": "jane.doe@example.com",
            "firstName": "Jane",
            "lastName": "Doe",
            "createdAt": "2024-05-01T10:00:00Z",
            "isEmailVerified": false,
            "role": "customer"
        }))
        .expect("valid user json");

        let row = UserRowView::from(&user);
        assert_eq!(row.email, threadline_core::mask_email("jane.doe@example.com"));
        assert_ne!(row.email, "jane.doe@example.com");
        assert_eq!(row.role, "customer");
        assert_eq!(row.joined, "2024-05-01");
    }
}
