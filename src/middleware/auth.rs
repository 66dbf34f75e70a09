//! Authentication middleware
//! 
//! This module guards the admin screens and the catalog upload path.

use std::collections::HashSet;
use tracing::{debug, warn};
use crate::utils::errors::{ShopError, Result};

/// Admin access guard
#[derive(Debug, Clone)]
pub struct AuthMiddleware {
    admin_ids: HashSet<i64>,
}

impl AuthMiddleware {
    /// Create a new AuthMiddleware instance
    pub fn new(admin_ids: &[i64]) -> Self {
        Self {
            admin_ids: admin_ids.iter().copied().collect(),
        }
    }

    /// Check if user is an admin
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Check if user is authorized for admin features
    pub fn check_admin_auth(&self, user_id: i64) -> Result<()> {
        if self.is_admin(user_id) {
            debug!(user_id = user_id, "Admin authentication successful");
            Ok(())
        } else {
            warn!(user_id = user_id, "Unauthorized admin access attempt");
            Err(ShopError::PermissionDenied(
                "Admin privileges required".to_string()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_admin_check() {
        let auth = AuthMiddleware::new(&[10, 20]);

        assert!(auth.is_admin(10));
        assert!(auth.check_admin_auth(20).is_ok());
        assert_matches!(auth.check_admin_auth(30), Err(ShopError::PermissionDenied(_)));
    }
}
