mod bidder;
pub use bidder::Bidder;

mod jwt;
pub use jwt::{CustomClaims, JwtVerifier};

mod now;
pub use now::Now;

use hammer_core::models::BidderId;
use jwt_simple::{
    claims::Claims,
    prelude::{Duration, HS256Key, MACLike},
};
use uuid::Uuid;

/// Generate a bearer token and the account string it identifies.
///
/// The subject is a freshly generated bidder id; `name` is the display name
/// the identity collaborator would resolve for the connection.
pub fn generate_token(
    raw_key: &str,
    name: &str,
    duration_days: u64,
) -> Result<(String, String), jwt_simple::Error> {
    let key = HS256Key::from_bytes(raw_key.as_bytes());
    let account: BidderId = Uuid::new_v4().into();
    let account_str = account.to_string();
    let claims = Claims::with_custom_claims(
        CustomClaims { name: name.into() },
        Duration::from_days(duration_days),
    )
    .with_subject(&account_str);

    let token = key.authenticate(claims)?;
    Ok((token, account_str))
}
