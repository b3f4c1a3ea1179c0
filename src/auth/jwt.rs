use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Tokens are issued elsewhere; this service only checks them.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("refresh tokens cannot be used for API access".to_string());
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(token_type: TokenType, secret: &str) -> String {
        let claims = Claims {
            user_id: 1,
            sub: "budi".into(),
            role: 2,
            exp: 4_102_444_800, // 2100-01-01
            token_type,
            employee_id: Some(10),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_access_token() {
        let claims = verify_token(&token(TokenType::Access, "s3cret"), "s3cret").unwrap();
        assert_eq!(claims.employee_id, Some(10));
    }

    #[test]
    fn rejects_refresh_token_and_wrong_secret() {
        assert!(verify_token(&token(TokenType::Refresh, "s3cret"), "s3cret").is_err());
        assert!(verify_token(&token(TokenType::Access, "other"), "s3cret").is_err());
    }
}
