//! Authentication and authorization.
//!
//! Sessions are UUID bearer tokens stored in the database with an expiry.
//! Role checks are centralized in the extractors in [`session`] instead of
//! inline conditionals per handler.

pub mod password;
pub mod session;

pub use session::{AdminSession, Session, StaffSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Kasir,
    Customer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "kasir" => Some(Self::Kasir),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Kasir => "kasir",
            Self::Customer => "customer",
        }
    }

    /// Staff can operate the POS register.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Kasir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("kasir"), Some(Role::Kasir));
        assert_eq!(Role::parse("manager"), None);
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Kasir.is_staff());
        assert!(!Role::Customer.is_staff());
    }
}
