use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::storage::{Database, ImageStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenSigner>,
    pub images: Arc<ImageStore>,
}
