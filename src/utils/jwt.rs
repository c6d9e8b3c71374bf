use std::env;
use std::sync::OnceLock;

use jsonwebtoken::{decode, errors::Error as JwtError, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

// Les tokens sont émis par le service d'authentification,
// ce backend ne fait que les vérifier avec le même secret
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub username: String,
    pub exp: i64,        // expiration timestamp
}

static JWT_SECRET: OnceLock<String> = OnceLock::new();

/// Clé secrète partagée, lue une seule fois dans l'environnement
fn jwt_secret() -> &'static str {
    JWT_SECRET.get_or_init(|| {
        env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            "default-insecure-key-change-this".to_string()
        })
    })
}

/// Vérifie la signature HS256 et l'expiration, retourne les claims
pub fn verify_token(token: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(jwt_secret().as_bytes());

    decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256)).map(|data| data.claims)
}

/// Génère un token comme le ferait le service d'authentification
#[cfg(test)]
pub fn generate_token(user_id: i32, username: &str) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (Utc::now() + Duration::hours(24)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
        .expect("Failed to generate token")
}
