use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::{validate_jwt, AdminRole, Claims};
use crate::error::ApiError;
use crate::types::TenantId;

/// Authenticated administrator extracted from JWT
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub subject: String,
    pub role: AdminRole,
    pub tenant_id: Option<TenantId>,
}

impl From<Claims> for AdminUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            tenant_id: claims.tenant_id,
        }
    }
}

impl AdminUser {
    pub fn ensure_root(&self) -> Result<(), ApiError> {
        match self.role {
            AdminRole::Root => Ok(()),
            AdminRole::Owner => Err(ApiError::forbidden("Root access required")),
        }
    }

    /// Owners may only manage their own restaurant
    pub fn ensure_can_manage(&self, tenant: TenantId) -> Result<(), ApiError> {
        match self.role {
            AdminRole::Root => Ok(()),
            AdminRole::Owner if self.tenant_id == Some(tenant) => Ok(()),
            AdminRole::Owner => {
                tracing::warn!(subject = %self.subject, %tenant, "owner attempted cross-tenant access");
                Err(ApiError::forbidden("Access to this restaurant is not allowed"))
            }
        }
    }
}

/// JWT authentication middleware that validates tokens and injects `AdminUser`
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_jwt_from_headers(&headers) {
        Ok(token) => token,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    let claims = match validate_jwt(&token, &state.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => return ApiError::unauthorized(e.to_string()).into_response(),
    };

    request.extensions_mut().insert(AdminUser::from(claims));
    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn bearer_prefix_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(extract_jwt_from_headers(&headers).is_err());
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn owners_are_confined_to_their_tenant() {
        let own = TenantId(Uuid::new_v4());
        let owner = AdminUser {
            subject: "alice".to_string(),
            role: AdminRole::Owner,
            tenant_id: Some(own),
        };
        assert!(owner.ensure_can_manage(own).is_ok());
        assert!(owner.ensure_can_manage(TenantId(Uuid::new_v4())).is_err());
        assert!(owner.ensure_root().is_err());
    }
}
