use std::sync::Arc;

use crate::auth::Authenticator;
use crate::store::CounterStore;
use crate::views::ViewIncrementer;

/// Shared state of the HTTP handlers.
#[derive(Debug)]
pub struct App<S> {
    pub views: ViewIncrementer<S>,
    pub authenticator: Authenticator,
}

impl<S> Clone for App<S> {
    fn clone(&self) -> Self {
        Self {
            views: self.views.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

pub fn create_app<S: CounterStore>(store: Arc<S>, authenticator: Authenticator) -> App<S> {
    App {
        views: ViewIncrementer::new(store),
        authenticator,
    }
}
