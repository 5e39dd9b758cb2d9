use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::user::Role;

/// Body of `PUT /users`, sent by the client after every sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: Role,
}
