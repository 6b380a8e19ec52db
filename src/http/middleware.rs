//! Request filter middleware.
//!
//! Runs the inspection engine in front of the next handler. Rejected requests
//! end here with a bare status code; allowed requests go on with their
//! original headers, query and body bytes.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::config::schema::FilterConfig;
use crate::config::validation::ValidationError;
use crate::filter::{Rejection, RequestFilter};
use crate::http::request::request_id;
use crate::observability::metrics;

/// Shared, swappable handle to the active rules.
///
/// Each request loads one snapshot on entry and keeps it until its verdict,
/// so a reload never changes the rules half way through an inspection.
#[derive(Clone)]
pub struct FilterState {
    filter: Arc<ArcSwap<RequestFilter>>,
}

impl FilterState {
    pub fn new(filter: RequestFilter) -> Self {
        Self {
            filter: Arc::new(ArcSwap::from_pointee(filter)),
        }
    }

    /// The rules in force right now.
    pub fn current(&self) -> Arc<RequestFilter> {
        self.filter.load_full()
    }

    /// Compile `config` and swap it in. On error the current rules stay.
    pub fn reload(&self, config: &FilterConfig) -> Result<(), Vec<ValidationError>> {
        match RequestFilter::from_config(config) {
            Ok(filter) => {
                self.filter.store(Arc::new(filter));
                metrics::record_reload(true);
                tracing::info!(
                    header_rules = config.headers.len(),
                    query_rules = config.query.len(),
                    body_rules = config.body.json.len(),
                    "Filter rules reloaded"
                );
                Ok(())
            }
            Err(errors) => {
                metrics::record_reload(false);
                tracing::error!(errors = errors.len(), "Rejected filter reload, keeping current rules");
                Err(errors)
            }
        }
    }
}

/// Wrap every route of `router` with the request filter.
pub fn with_request_filter<S>(router: Router<S>, state: FilterState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, request_filter_middleware))
}

pub async fn request_filter_middleware(
    State(state): State<FilterState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let filter = state.current();
    let request_id = request_id(&req);
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match filter.filter(req).await {
        Ok(req) => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "Request allowed");
            metrics::record_allowed();
            next.run(req).await
        }
        Err(rejection) => {
            match &rejection {
                Rejection::ForbiddenContent { location, key, value } => {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        location = %location,
                        key = %key,
                        value = %value,
                        "Forbidden value in request"
                    );
                }
                Rejection::MethodForbidden { .. } => {
                    tracing::warn!(request_id = %request_id, method = %method, path = %path, "Method forbidden while body rules are configured");
                }
                Rejection::BodyRead(_) | Rejection::BodyDecode(_) => {
                    tracing::info!(request_id = %request_id, method = %method, path = %path, error = %rejection, "Bad request body");
                }
            }
            metrics::record_rejected(rejection.reason());
            rejection.into_response()
        }
    }
}
