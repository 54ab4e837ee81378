//! # Request Context
//!
//! Who is calling and on behalf of which tenant.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  identity layer (external)          tenant resolver (external)          │
//! │         │                                    │                          │
//! │         ▼                                    ▼                          │
//! │      Actor { user_id, is_super_admin }   Option<TenantId>               │
//! │         └──────────────┬─────────────────────┘                          │
//! │                        ▼                                                │
//! │                  RequestContext ──► every service operation             │
//! │                                                                         │
//! │  tenant missing            → ServiceError::Validation                   │
//! │  row in another tenant     → ServiceError::NotFound                     │
//! │  row owned by someone else → ServiceError::Forbidden (unless admin)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ServiceError, ServiceResult};
use stockflow_core::validation::validate_tenant_id;

/// Identifier of the tenant every query is partitioned by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        TenantId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        TenantId::new(id)
    }
}

impl From<String> for TenantId {
    fn from(id: String) -> Self {
        TenantId(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of the tenant an operation is scoped to.
pub trait TenantScope {
    fn current_tenant(&self) -> Option<TenantId>;
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    /// Bypasses ownership checks. Never bypasses tenant scoping.
    pub is_super_admin: bool,
}

impl Actor {
    pub fn user(user_id: impl Into<String>) -> Self {
        Actor {
            user_id: user_id.into(),
            is_super_admin: false,
        }
    }

    pub fn super_admin(user_id: impl Into<String>) -> Self {
        Actor {
            user_id: user_id.into(),
            is_super_admin: true,
        }
    }
}

/// Per-call context handed to every service operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub tenant: Option<TenantId>,
    pub actor: Actor,
}

impl RequestContext {
    pub fn new(tenant: impl Into<TenantId>, actor: Actor) -> Self {
        RequestContext {
            tenant: Some(tenant.into()),
            actor,
        }
    }

    /// Context for a caller whose tenant could not be resolved.
    pub fn without_tenant(actor: Actor) -> Self {
        RequestContext {
            tenant: None,
            actor,
        }
    }

    /// Checks that the actor may act on a row owned by `owner_user_id`.
    pub(crate) fn ensure_owner(
        &self,
        owner_user_id: &str,
        entity: &str,
        id: &str,
    ) -> ServiceResult<()> {
        if self.actor.is_super_admin || self.actor.user_id == owner_user_id {
            return Ok(());
        }
        Err(ServiceError::Forbidden(format!(
            "{entity} {id} belongs to another user"
        )))
    }
}

impl TenantScope for RequestContext {
    fn current_tenant(&self) -> Option<TenantId> {
        self.tenant.clone()
    }
}

/// Resolves and validates the tenant, or fails with a validation error.
pub fn require_tenant(scope: &impl TenantScope) -> ServiceResult<TenantId> {
    let tenant = scope
        .current_tenant()
        .ok_or_else(|| ServiceError::Validation("tenant is required".to_string()))?;
    validate_tenant_id(tenant.as_str())?;
    Ok(tenant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tenant_is_validation_error() {
        let ctx = RequestContext::without_tenant(Actor::user("u-1"));
        assert!(matches!(require_tenant(&ctx), Err(ServiceError::Validation(_))));

        let ctx = RequestContext::new("   ", Actor::user("u-1"));
        assert!(matches!(require_tenant(&ctx), Err(ServiceError::Validation(_))));

        let ctx = RequestContext::new("tenant-a", Actor::user("u-1"));
        assert_eq!(require_tenant(&ctx).unwrap().as_str(), "tenant-a");
    }

    #[test]
    fn test_ownership() {
        let owner = RequestContext::new("t", Actor::user("u-1"));
        let stranger = RequestContext::new("t", Actor::user("u-2"));
        let admin = RequestContext::new("t", Actor::super_admin("root"));

        assert!(owner.ensure_owner("u-1", "Order", "o-1").is_ok());
        assert!(matches!(
            stranger.ensure_owner("u-1", "Order", "o-1"),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(admin.ensure_owner("u-1", "Order", "o-1").is_ok());
    }

    struct FixedScope(Option<&'static str>);

    impl TenantScope for FixedScope {
        fn current_tenant(&self) -> Option<TenantId> {
            self.0.map(TenantId::from)
        }
    }

    #[test]
    fn test_any_scope_can_resolve() {
        assert!(require_tenant(&FixedScope(Some("acme"))).is_ok());
        assert!(require_tenant(&FixedScope(None)).is_err());
    }
}
