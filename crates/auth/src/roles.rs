use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eggtrack_core::DomainError;

/// Supply-chain role carried in the caller's `role` attribute and on
/// participant records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Farmer,
    Shipper,
    Distributor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Farmer, Role::Shipper, Role::Distributor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "Farmer",
            Role::Shipper => "Shipper",
            Role::Distributor => "Distributor",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown role '{s}' (expected Farmer, Shipper or Distributor)"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_role_names() {
        assert_eq!("Shipper".parse::<Role>().unwrap(), Role::Shipper);
        assert!("shipper".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_as_plain_name() {
        assert_eq!(serde_json::to_string(&Role::Distributor).unwrap(), "\"Distributor\"");
    }
}
