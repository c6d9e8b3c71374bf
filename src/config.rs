// configuration de l'application (variables d'environnement / .env)

use std::env;
use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Dossier où sont écrites les images des recettes
    pub media_root: PathBuf,
    /// Préfixe public ajouté au chemin relatif des images dans les réponses
    pub media_url: String,
    /// Crée les tables manquantes au démarrage
    pub create_schema: bool,
}

impl AppConfig {
    /// Lit la configuration depuis l'environnement (appeler dotenv avant)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::Internal("DATABASE_URL must be set in .env file".to_string()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Internal(format!("Invalid PORT: {}", raw)))?,
            None => 8080,
        };

        let create_schema = match lookup("CREATE_SCHEMA").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(AppError::Internal(format!("Invalid CREATE_SCHEMA: {}", other)));
            }
        };

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            media_root: PathBuf::from(lookup("MEDIA_ROOT").unwrap_or_else(|| "media".to_string())),
            media_url: lookup("MEDIA_URL").unwrap_or_else(|| "/media/".to_string()),
            create_schema,
        })
    }

    /// URL publique d'une image stockée sous media_root
    pub fn image_url(&self, relative_path: &str) -> String {
        format!("{}{}", self.media_url, relative_path)
    }
}
