//! Extra routes merged into the API router by embedding applications.

use aide::axum::ApiRouter;

use crate::service::ServiceState;

/// Routes added next to the built-in ones.
///
/// Private routes sit behind the same authentication layer as the built-in
/// private routes; public routes do not.
///
/// # Examples
///
/// ```rust
/// use proptrack_server::handler::CustomRoutes;
///
/// let custom = CustomRoutes::new();
/// assert!(custom.is_empty());
/// ```
#[must_use]
#[derive(Default, Clone)]
pub struct CustomRoutes {
    /// Routes that require a session token.
    pub private_routes: Option<ApiRouter<ServiceState>>,
    /// Routes that don't.
    pub public_routes: Option<ApiRouter<ServiceState>>,
    /// Leaves out `/auth/signup/` and `/auth/login/`.
    pub disable_authentication: bool,
}

impl CustomRoutes {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the private routes, replacing any set before.
    pub fn with_private_routes(mut self, routes: ApiRouter<ServiceState>) -> Self {
        self.private_routes = Some(routes);
        self
    }

    /// Sets the public routes, replacing any set before.
    pub fn with_public_routes(mut self, routes: ApiRouter<ServiceState>) -> Self {
        self.public_routes = Some(routes);
        self
    }

    /// Merges `routes` into the private routes.
    pub fn add_private_routes(mut self, routes: ApiRouter<ServiceState>) -> Self {
        self.private_routes = Some(match self.private_routes.take() {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Merges `routes` into the public routes.
    pub fn add_public_routes(mut self, routes: ApiRouter<ServiceState>) -> Self {
        self.public_routes = Some(match self.public_routes.take() {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    pub fn with_disable_authentication(mut self, disable: bool) -> Self {
        self.disable_authentication = disable;
        self
    }

    /// Returns true if no custom routes are configured.
    pub fn is_empty(&self) -> bool {
        self.private_routes.is_none() && self.public_routes.is_none()
    }

    pub(crate) fn take_private_routes(&mut self) -> Option<ApiRouter<ServiceState>> {
        self.private_routes.take()
    }

    pub(crate) fn take_public_routes(&mut self) -> Option<ApiRouter<ServiceState>> {
        self.public_routes.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ping() -> &'static str {
        "pong"
    }

    #[test]
    fn added_routes_are_merged() {
        use aide::axum::routing::get;

        let mut custom = CustomRoutes::new()
            .add_public_routes(ApiRouter::new().api_route("/ping/", get(ping)))
            .add_public_routes(ApiRouter::new().api_route("/pong/", get(ping)));

        assert!(!custom.is_empty());
        assert!(custom.take_public_routes().is_some());
        assert!(custom.take_private_routes().is_none());
        assert!(custom.is_empty());
    }
}
