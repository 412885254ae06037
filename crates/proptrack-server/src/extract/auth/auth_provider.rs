//! Ownership and admin checks for authenticated callers.

use uuid::Uuid;

use super::TRACING_TARGET_AUTHORIZATION;
use crate::handler::{ErrorKind, Result};

/// Authorization checks shared by every handler.
///
/// Records belong to exactly one account. Administrators may act on every
/// record; everyone else only on their own.
pub trait AuthProvider {
    /// Account the request acts on behalf of.
    fn account_id(&self) -> Uuid;

    /// Whether the account has global administrator privileges.
    fn is_admin(&self) -> bool;

    /// Returns `true` if the caller owns the record or is an admin.
    fn is_owner_or_admin(&self, owner_id: Option<Uuid>) -> bool {
        self.is_admin() || owner_id == Some(self.account_id())
    }

    /// Fails with `403 Forbidden` unless the caller owns the record.
    ///
    /// Records without an owner (e.g. imported properties) can only be
    /// changed by administrators.
    fn authorize_owner(&self, owner_id: Option<Uuid>, resource: &'static str) -> Result<()> {
        if self.is_owner_or_admin(owner_id) {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET_AUTHORIZATION,
            account_id = %self.account_id(),
            owner_id = ?owner_id,
            resource,
            "access denied: caller does not own the record"
        );

        Err(ErrorKind::Forbidden
            .with_message(format!("You do not have access to this {resource}"))
            .with_resource(resource))
    }

    /// Fails with `403 Forbidden` unless the caller is an administrator.
    fn authorize_admin(&self) -> Result<()> {
        if self.is_admin() {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET_AUTHORIZATION,
            account_id = %self.account_id(),
            "access denied: administrator privileges required"
        );

        Err(ErrorKind::Forbidden.with_message("Administrator privileges required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Caller {
        id: Uuid,
        admin: bool,
    }

    impl AuthProvider for Caller {
        fn account_id(&self) -> Uuid {
            self.id
        }

        fn is_admin(&self) -> bool {
            self.admin
        }
    }

    #[test]
    fn owner_may_act_on_own_record() {
        let caller = Caller {
            id: Uuid::new_v4(),
            admin: false,
        };

        assert!(caller.authorize_owner(Some(caller.id), "property").is_ok());
        assert!(caller.authorize_admin().is_err());
    }

    #[test]
    fn stranger_is_forbidden() -> anyhow::Result<()> {
        let caller = Caller {
            id: Uuid::new_v4(),
            admin: false,
        };

        let Err(error) = caller.authorize_owner(Some(Uuid::new_v4()), "invoice") else {
            anyhow::bail!("stranger was authorized");
        };
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert!(caller.authorize_owner(None, "property").is_err());
        Ok(())
    }

    #[test]
    fn admin_may_act_on_everything() {
        let admin = Caller {
            id: Uuid::new_v4(),
            admin: true,
        };

        assert!(admin.authorize_owner(Some(Uuid::new_v4()), "tenancy").is_ok());
        assert!(admin.authorize_owner(None, "property").is_ok());
        assert!(admin.authorize_admin().is_ok());
    }
}
