use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::error::AppError;
use crate::utils::jwt;

/// Utilisateur authentifié, extrait du header `Authorization: Bearer <token>`.
///
/// Routes protégées : `auth_user: AuthUser` (401 si absent ou invalide).
/// Routes publiques : `viewer: Option<AuthUser>`, un token absent ou invalide
/// donne `None` (visiteur anonyme), jamais une erreur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
}

impl AuthUser {
    /// Identité à passer aux services pour les champs dépendant du visiteur
    pub fn viewer_id(user: &Option<AuthUser>) -> Option<i32> {
        user.as_ref().map(|u| u.user_id)
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_auth_user(req))
    }
}

fn extract_auth_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?;

    // 2. Convertir le header en string
    let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    // 4. Vérifier le token JWT
    let claims = jwt::verify_token(token).map_err(|e| {
        log::debug!("Rejected token: {}", e);
        AppError::Unauthorized
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extracts_user_from_bearer_token() {
        let token = jwt::generate_token(42, "chef");
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let user = extract_auth_user(&req).unwrap();
        assert_eq!(user.user_id, 42);
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(extract_auth_user(&req), Err(AppError::Unauthorized)));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Token abc"))
            .to_http_request();
        assert!(matches!(extract_auth_user(&req), Err(AppError::Unauthorized)));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
            .to_http_request();
        assert!(matches!(extract_auth_user(&req), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_viewer_id() {
        assert_eq!(AuthUser::viewer_id(&None), None);
        let user = Some(AuthUser { user_id: 3 });
        assert_eq!(AuthUser::viewer_id(&user), Some(3));
    }
}
