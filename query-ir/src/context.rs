use crate::store::Store;
use std::{fmt, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Per-operation evaluation context handed to opaque leaves: the store
/// handle, the roles granted to the request, and a cancellation token.
///
/// The context is private to one operation; the store behind it is the only
/// shared resource and synchronizes itself.
#[derive(Clone)]
pub struct ExecutionContext {
    store: Arc<dyn Store>,
    roles: Vec<String>,
    token: CancellationToken,
}

impl ExecutionContext {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            roles: Vec::new(),
            token: CancellationToken::new(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|granted| granted == role)
    }

    /// Once this returns `true`, no further leaf evaluation is started.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("roles", &self.roles)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
