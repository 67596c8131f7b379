/*
 * Responsibility
 * - Shared context handed to every handler (cheap to clone)
 */
use std::sync::Arc;

use crate::repos::land_repo::LandStore;
use crate::services::lands::LandService;

#[derive(Clone)]
pub struct AppState {
    pub lands: LandService,
}

impl AppState {
    pub fn new(store: Arc<dyn LandStore>) -> Self {
        Self {
            lands: LandService::new(store),
        }
    }
}
