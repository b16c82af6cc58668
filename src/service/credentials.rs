use subtle::ConstantTimeEq;

/// Verifies presented admin credentials.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Single admin identity taken from configuration.
pub struct ConfiguredAdmin {
    username: String,
    password: String,
}

impl ConfiguredAdmin {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl CredentialVerifier for ConfiguredAdmin {
    fn verify(&self, username: &str, password: &str) -> bool {
        if !self.is_configured() {
            return false;
        }
        // compare both before combining so timing does not reveal which one failed
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        let admin = ConfiguredAdmin::new("admin", "s3cret");
        assert!(admin.verify("admin", "s3cret"));
        assert!(!admin.verify("Admin", "s3cret"));
        assert!(!admin.verify("admin", "S3cret"));
        assert!(!admin.verify("admin", "s3cret "));
        assert!(!admin.verify("", ""));
    }

    #[test]
    fn unconfigured_admin_rejects_everything() {
        let admin = ConfiguredAdmin::new("admin", "");
        assert!(!admin.is_configured());
        assert!(!admin.verify("admin", ""));
    }
}
