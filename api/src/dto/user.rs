//! User administration DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use vx_core::entities::UserView;
use vx_core::services::UserUpdate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub first_name: Option<String>,
    #[validate(length(max = 255))]
    pub last_name: Option<String>,
    #[validate(length(max = 72))]
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(request: UpdateUserRequest) -> Self {
        UserUpdate {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            password: request.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
    pub total_users: u64,
}
