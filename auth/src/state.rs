/*
 * Responsibility
 * - Shared context handed to every handler (cheap to clone)
 */
use crate::services::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
}

impl AppState {
    pub fn new(users: UserService) -> Self {
        Self { users }
    }
}
