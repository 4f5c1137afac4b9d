use axum::{
    extract::{Request, State},
    http::{header, uri::PathAndQuery, HeaderName, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::tenancy::{Resolution, TenantResolver};

/// Informational header carrying the resolved tenant to downstream handlers.
/// Any copy sent by a client is stripped before resolution.
pub static TENANT_HEADER: HeaderName = HeaderName::from_static("x-menuhost-tenant");

static FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Marker extension set on every rewritten request. Extensions cannot be
/// supplied by clients, so its presence proves the rewrite happened here.
#[derive(Debug, Clone, Copy)]
pub struct TenantRewritten;

/// Outer middleware: resolves the tenant once per request, before routing.
///
/// Must wrap the router as a service (see `app::build`); a route layer
/// would run after the URI had already been matched.
pub async fn resolve_tenant_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let already_rewritten = request.extensions().get::<TenantRewritten>().is_some();
    if !already_rewritten {
        request.headers_mut().remove(&TENANT_HEADER);
    }

    let host = request_host(&request, &state.resolver);
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    match state.resolver.resolve(host.as_deref(), &path_and_query, already_rewritten) {
        Resolution::PassThrough => next.run(request).await,

        Resolution::Redirect { location } => match HeaderValue::from_str(&location) {
            Ok(value) => {
                tracing::debug!(host = ?host, %location, "redirecting www host");
                (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response()
            }
            Err(_) => {
                tracing::warn!(%location, "unencodable redirect target, passing through");
                next.run(request).await
            }
        },

        Resolution::Rewrite { tenant, path_and_query } => {
            let Some(uri) = rewrite_uri(request.uri(), &path_and_query) else {
                tracing::warn!(%tenant, %path_and_query, "rewritten path is not a valid URI, passing through");
                return next.run(request).await;
            };
            tracing::debug!(%tenant, from = %request.uri(), to = %uri, "tenant rewrite");

            *request.uri_mut() = uri;
            if let Ok(value) = HeaderValue::from_str(tenant.as_str()) {
                request.headers_mut().insert(TENANT_HEADER.clone(), value);
            }
            request.extensions_mut().insert(tenant);
            request.extensions_mut().insert(TenantRewritten);
            next.run(request).await
        }
    }
}

/// Host used for resolution: trusted `X-Forwarded-Host`, then `Host`, then
/// the request-target authority (HTTP/2).
fn request_host(request: &Request, resolver: &TenantResolver) -> Option<String> {
    let headers = request.headers();

    if resolver.trust_forwarded_host() {
        let forwarded = headers
            .get(&FORWARDED_HOST)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(host) = forwarded {
            return Some(host.to_string());
        }
    }

    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            let uri = request.uri();
            uri.host().map(|host| match uri.port_u16() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        })
}

fn rewrite_uri(original: &Uri, path_and_query: &str) -> Option<Uri> {
    let mut parts = original.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}
