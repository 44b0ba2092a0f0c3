use app_schema::auth::user::{AuthUser, Role};
pub use jsonwebtoken::Algorithm;
use jsonwebtoken::errors::Error;
pub use jsonwebtoken::errors::ErrorKind as JWTErrorKind;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, TokenData, Validation, decode as jdec, encode as jenc,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub iat: i64,
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub session: u64,
}

impl Claims {
    pub fn new(user: &AuthUser, iat: i64, exp: i64) -> Self {
        Self {
            exp,
            iat,
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            session: user.session,
        }
    }

    pub fn user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            session: self.session,
        }
    }
}

/// Value kept in the session store for a live refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub session: u64,
    pub token: String,
}

pub fn generate_token<T>(algorithm: Algorithm, key: &str, claims: T) -> Result<String, Error>
where
    T: Serialize,
{
    jenc(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
}

pub fn validate_token<T>(
    algorithm: Algorithm,
    key: &str,
    token: &str,
) -> Result<TokenData<T>, Error>
where
    for<'a> T: Deserialize<'a>,
{
    let validation = Validation::new(algorithm);
    jdec::<T>(
        token,
        &DecodingKey::from_secret(key.as_bytes()),
        &validation,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn check_jwt_functions() {
        let user = AuthUser {
            id: "12".to_owned(),
            name: "test".to_owned(),
            email: "test@unit".to_owned(),
            role: Role::Customer,
            session: 1,
        };
        let secret = "unit-secret";
        let mut my_claim = Claims::new(&user, 0, i64::MAX);
        let token = generate_token(Algorithm::HS256, secret, &my_claim).unwrap();
        let validate = validate_token::<Claims>(Algorithm::HS256, secret, &token).unwrap();
        assert_eq!(validate.claims.email, "test@unit".to_owned());
        assert_eq!(validate.claims.user().customer_id(), Some(12));

        let wrong_key = validate_token::<Claims>(Algorithm::HS256, "other", &token).err();
        assert_eq!(wrong_key.unwrap().kind(), &JWTErrorKind::InvalidSignature);

        my_claim.exp = 0;
        let token = generate_token(Algorithm::HS256, secret, &my_claim).unwrap();
        let error = validate_token::<Claims>(Algorithm::HS256, secret, &token).err();
        assert_eq!(error.unwrap().kind(), &JWTErrorKind::ExpiredSignature)
    }
}
