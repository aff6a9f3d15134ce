//! Customer identity as an explicit capability.
//!
//! The submission path never reads ambient session storage directly; it is
//! handed an `IdentityProvider` and maps an absent identity to
//! `MissingIdentity` instead of proceeding with an undefined customer.

/// An authenticated marketplace customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub customer_id: String,
}

/// Supplies the current customer identity, if any.
pub trait IdentityProvider {
    fn current(&self) -> Option<Identity>;
}

/// Environment-backed provider: the host shell exports `GALA_CUSTOMER_ID`
/// after login.
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn current(&self) -> Option<Identity> {
        std::env::var("GALA_CUSTOMER_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .map(|customer_id| Identity { customer_id })
    }
}

/// Fixed identity, the test double for `EnvIdentity`.
#[cfg(test)]
pub struct StaticIdentity(pub Option<Identity>);

#[cfg(test)]
impl StaticIdentity {
    pub fn logged_in(customer_id: &str) -> Self {
        Self(Some(Identity {
            customer_id: customer_id.to_string(),
        }))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[cfg(test)]
impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Option<Identity> {
        self.0.clone()
    }
}
