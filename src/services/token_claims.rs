use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

/// Claims both vendors put in their access tokens. The signature is checked by
/// the vendor on every request; locally the token is only read.
#[derive(Debug, Deserialize)]
pub struct AccessClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub exp: Option<i64>,
}

pub fn read_claims(token: &str) -> Option<AccessClaims> {
    let header = jsonwebtoken::decode_header(token).ok()?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// Expiry of `token`: its `exp` claim when readable, otherwise `expires_in`
/// seconds from now.
pub fn expires_at(token: &str, expires_in: Option<i64>) -> DateTime<Utc> {
    read_claims(token)
        .and_then(|claims| claims.exp)
        .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
        .unwrap_or_else(|| Utc::now() + Duration::seconds(expires_in.unwrap_or(3600)))
}
