use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token payload. The wire field is `_id` to match the auth cookie
/// this gateway was generalized from (section 6 "Auth").
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(rename = "_id")]
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

pub fn create_access_token(
    user_id: Uuid,
    secret: &str,
    expiry_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        user_id,
        exp: (now + Duration::minutes(expiry_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_user_id() {
        let user_id = Uuid::new_v4();
        let token = create_access_token(user_id, "secret", 15).unwrap();
        let claims = validate_access_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn rejects_a_token_signed_with_a_different_secret() {
        let token = create_access_token(Uuid::new_v4(), "secret", 15).unwrap();
        assert!(validate_access_token(&token, "wrong").is_err());
    }
}
