use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::{distributions::Alphanumeric, Rng};
use base64::{Engine, engine::general_purpose::STANDARD};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "pbkdf2_sha256";
#[cfg(not(test))]
const ITERATIONS: u32 = 260000;
// les tests hashent beaucoup de comptes
#[cfg(test)]
const ITERATIONS: u32 = 1000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 22;

/// Hash un mot de passe au format Django (compatible avec les comptes existants)
/// Format: pbkdf2_sha256$iterations$salt$hash (hash en base64 standard)
pub fn hash_password(password: &str) -> Result<String, String> {
    hash_password_with(password, ITERATIONS)
}

fn hash_password_with(password: &str, iterations: u32) -> Result<String, String> {
    // Django utilise un salt alphanumérique, pas des octets bruts
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect();

    let key = derive_key(password, &salt, iterations, KEY_LENGTH)?;

    Ok(format!("{}${}${}${}", ALGORITHM, iterations, salt, STANDARD.encode(key)))
}

/// Vérifie un mot de passe contre un hash Django
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 4 {
        return Err("Invalid hash format".to_string());
    }

    if parts[0] != ALGORITHM {
        return Err(format!("Unsupported algorithm: {}", parts[0]));
    }

    let iterations = parts[1]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;
    let salt = parts[2];
    let expected_hash = STANDARD
        .decode(parts[3])
        .map_err(|e| format!("Invalid hash encoding: {}", e))?;

    let computed = derive_key(password, salt, iterations, expected_hash.len())?;

    Ok(computed == expected_hash)
}

fn derive_key(password: &str, salt: &str, iterations: u32, length: usize) -> Result<Vec<u8>, String> {
    let mut key = vec![0u8; length];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key)
        .map_err(|e| format!("PBKDF2 failed: {}", e))?;
    Ok(key)
}
