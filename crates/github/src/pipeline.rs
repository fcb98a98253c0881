//! Ordered chain of request transforms.
//!
//! Every outgoing [`HttpRequest`] passes through the pipeline before it
//! reaches the response cache and the transport. The client installs the
//! authorization step first; caller-supplied interceptors follow in the
//! order they were registered.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::http::HttpRequest;

/// A single request transform.
pub type Interceptor = Arc<dyn Fn(HttpRequest) -> HttpRequest + Send + Sync>;

/// An ordered list of request transforms applied before transmission.
#[derive(Clone, Default)]
pub struct RequestPipeline {
    stages: Vec<Interceptor>,
}

impl RequestPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform to the end of the chain.
    #[must_use]
    pub fn then<F>(mut self, stage: F) -> Self
    where
        F: Fn(HttpRequest) -> HttpRequest + Send + Sync + 'static,
    {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends an already shared transform.
    #[must_use]
    pub fn then_shared(mut self, stage: Interceptor) -> Self {
        self.stages.push(stage);
        self
    }

    /// Runs `request` through every stage in order.
    #[must_use]
    pub fn apply(&self, request: HttpRequest) -> HttpRequest {
        self.stages.iter().fold(request, |req, stage| stage(req))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

/// Builds the stage that adds `Authorization: token {token}`.
///
/// Returns `None` for an empty token so anonymous clients send no
/// `Authorization` header at all. Method and body are left untouched.
#[must_use]
pub fn authorization(token: &SecretString) -> Option<Interceptor> {
    if token.expose_secret().is_empty() {
        return None;
    }
    let token = token.clone();
    Some(Arc::new(move |mut req: HttpRequest| {
        req.set_header("Authorization", format!("token {}", token.expose_secret()));
        req
    }))
}
