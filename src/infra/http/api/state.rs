use std::sync::Arc;

use crate::application::accounts::AccountService;
use crate::application::identity::IdentityVerifier;
use crate::application::posts::PostService;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub accounts: Arc<AccountService>,
    pub identity: Arc<dyn IdentityVerifier>,
}
