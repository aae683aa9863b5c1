//! Role allow-lists.
//!
//! [`authorize`] is the pure decision. [`Authorized`] runs it during extraction so a
//! role mismatch answers 403 before any request body is validated.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};
use std::marker::PhantomData;

use super::extractors::Identity;
use crate::error::AppError;
use crate::models::Role;

/// Passes if `identity.role` is in `allowed`, otherwise `AppError::Forbidden`.
pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role '{}' is not allowed to access this resource",
            identity.role.as_str()
        )))
    }
}

/// Static allow-list attached to a route through [`Authorized`].
pub trait RolePolicy {
    const ALLOWED: &'static [Role];
}

pub struct UserOrAdmin;

impl RolePolicy for UserOrAdmin {
    const ALLOWED: &'static [Role] = &[Role::User, Role::Admin];
}

pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

/// An [`Identity`] whose role passed the policy `P`.
pub struct Authorized<P: RolePolicy> {
    pub identity: Identity,
    _policy: PhantomData<P>,
}

impl<P: RolePolicy> Authorized<P> {
    pub fn into_inner(self) -> Identity {
        self.identity
    }
}

impl<P: RolePolicy> FromRequest for Authorized<P> {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Identity::authenticate(req).and_then(|identity| {
            authorize(&identity, P::ALLOWED)?;
            Ok(Authorized {
                identity,
                _policy: PhantomData,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_authorize_allow_list() {
        assert!(authorize(&identity(Role::User), UserOrAdmin::ALLOWED).is_ok());
        assert!(authorize(&identity(Role::Admin), UserOrAdmin::ALLOWED).is_ok());
        assert!(authorize(&identity(Role::Admin), AdminOnly::ALLOWED).is_ok());

        match authorize(&identity(Role::User), AdminOnly::ALLOWED) {
            Err(AppError::Forbidden(msg)) => assert!(msg.contains("'user'")),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        assert!(authorize(&identity(Role::Admin), &[]).is_err());
    }
}
