use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type AccountId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Organizer,
    Participant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Participant => "participant",
        }
    }

    /// Landing page for an account of this role.
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Organizer => "/organizer/profiles",
            Self::Participant => "/user/profiles",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rôle inconnu: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(Self::Organizer),
            "participant" => Ok(Self::Participant),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Application-level profile, distinct from the identity provider's user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub identity_user_id: String,
    pub full_name: String,
    pub image_url: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub identity_user_id: String,
    pub full_name: String,
    pub image_url: Option<String>,
    pub role: Role,
}

/// Public fields of an account, as joined onto an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOwner {
    pub id: AccountId,
    pub full_name: String,
    pub image_url: Option<String>,
}

impl From<&Account> for EventOwner {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name.clone(),
            image_url: account.image_url.clone(),
        }
    }
}

/// Resolved view of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub account: Account,
    pub email: String,
}

impl Profile {
    pub fn new(account: Account, email: String) -> Self {
        Self { account, email }
    }

    pub fn user_id(&self) -> AccountId {
        self.account.id
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    pub fn full_name(&self) -> &str {
        &self.account.full_name
    }

    pub fn image_url(&self) -> Option<&str> {
        self.account.image_url.as_deref()
    }

    pub fn initials(&self) -> String {
        initials(&self.account.full_name)
    }
}

/// First letters of up to the first two space-separated name tokens,
/// uppercased. `"U"` for an empty name.
pub fn initials(full_name: &str) -> String {
    let letters: String = full_name
        .split_whitespace()
        .take(2)
        .filter_map(|token| token.chars().next())
        .collect();

    if letters.is_empty() {
        "U".to_string()
    } else {
        letters.to_uppercase()
    }
}

/// Registration form submitted once per identity user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterProfile {
    pub full_name: String,
    pub role: Role,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub full_name: String,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials("marie curie"), "MC");
        assert_eq!(initials("Ada Lovelace Byron"), "AL");
        assert_eq!(initials("  Turing  "), "T");
        assert_eq!(initials(""), "U");
        assert_eq!(initials("   "), "U");
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("organizer".parse::<Role>(), Ok(Role::Organizer));
        assert_eq!(Role::Participant.to_string(), "participant");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_home_paths_differ_by_role() {
        assert_eq!(Role::Organizer.home_path(), "/organizer/profiles");
        assert_eq!(Role::Participant.home_path(), "/user/profiles");
    }
}
