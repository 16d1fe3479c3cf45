use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use chrono::{Utc, TimeZone};
use tracing::{debug, warn};
use shared_models::auth::{JwtClaims, User, UserRole};

type HmacSha256 = Hmac<Sha256>;

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        },
    };

    if let Some(exp) = claims.exp {
        let now = chrono::Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let created_at = claims.iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let role = resolve_role(&claims);

    let user = User {
        id: claims.sub,
        email: claims.email,
        role,
        metadata: claims.user_metadata,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

/// Supabase always sets `role: authenticated`; the application role lives in
/// `app_metadata.role` (admin-assigned) or `user_metadata.tipo` (chosen at signup).
/// Users can edit their own `user_metadata`, so `tipo` never grants admin.
fn resolve_role(claims: &JwtClaims) -> Option<String> {
    let metadata_str = |metadata: &Option<Value>, key: &str| {
        metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let self_declared = metadata_str(&claims.user_metadata, "tipo").filter(|tipo| {
        if tipo.parse::<UserRole>() == Ok(UserRole::Admin) {
            warn!("Ignoring admin role declared in user metadata for {}", claims.sub);
            false
        } else {
            true
        }
    });

    metadata_str(&claims.app_metadata, "role")
        .or(self_declared)
        .or_else(|| claims.role.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "unit-test-secret";

    fn sign(payload: Value) -> String {
        JwtTestUtils::sign(&payload, SECRET)
    }

    #[test]
    fn accepts_valid_token() {
        let test_user = TestUser::doctor("doc@example.com");
        let token = JwtTestUtils::create_test_token(&test_user, SECRET, Some(1));

        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, test_user.id);
        assert_eq!(user.role.as_deref(), Some("medico"));
    }

    #[test]
    fn rejects_expired_and_tampered_tokens() {
        let test_user = TestUser::default();

        let expired = JwtTestUtils::create_expired_token(&test_user, SECRET);
        assert_eq!(validate_token(&expired, SECRET).unwrap_err(), "Token expired");

        let forged = JwtTestUtils::create_invalid_signature_token(&test_user);
        assert_eq!(validate_token(&forged, SECRET).unwrap_err(), "Invalid token signature");

        assert!(validate_token(&JwtTestUtils::create_malformed_token(), SECRET).is_err());
        assert_eq!(validate_token("a.b", SECRET).unwrap_err(), "Invalid token format");
    }

    #[test]
    fn metadata_role_overrides_supabase_role_claim() {
        let token = sign(json!({
            "sub": "user-1",
            "role": "authenticated",
            "user_metadata": { "tipo": "paciente", "nome": "João" },
            "exp": Utc::now().timestamp() + 60
        }));
        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.role.as_deref(), Some("paciente"));
        assert_eq!(user.display_name(), "João");

        let admin = sign(json!({
            "sub": "user-2",
            "role": "authenticated",
            "app_metadata": { "role": "admin" },
            "user_metadata": { "tipo": "medico" }
        }));
        let user = validate_token(&admin, SECRET).unwrap();
        assert!(user.is_admin());
    }

    #[test]
    fn admin_is_only_granted_through_app_metadata() {
        let self_promoted = sign(json!({
            "sub": "user-3",
            "role": "authenticated",
            "user_metadata": { "tipo": "admin" }
        }));
        let user = validate_token(&self_promoted, SECRET).unwrap();
        assert!(!user.is_admin());
        assert_eq!(user.role.as_deref(), Some("authenticated"));

        let spelled_out = sign(json!({
            "sub": "user-4",
            "app_metadata": { "role": "medico" },
            "user_metadata": { "tipo": "Administrador" }
        }));
        let user = validate_token(&spelled_out, SECRET).unwrap();
        assert_eq!(user.app_role(), Some(UserRole::Doctor));
    }

    #[test]
    fn refuses_to_validate_without_secret() {
        assert_eq!(validate_token("a.b.c", "").unwrap_err(), "JWT secret is not set");
    }
}
