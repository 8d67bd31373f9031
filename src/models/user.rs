//! User profile model

use serde::{Deserialize, Serialize};

/// Row of the `user_profiles` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing)]
    pub encrypted_private_key: Option<String>,
}

/// Upsert payload written on registration
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpsert {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Key material stored for a user
#[derive(Debug, Clone, Serialize)]
pub struct KeyPairUpdate {
    pub public_key: String,
    pub encrypted_private_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_never_serialized() {
        let profile = UserProfile {
            id: "u1".into(),
            email: Some("a@b.c".into()),
            name: Some("A".into()),
            profile_picture: None,
            public_key: Some("pub".into()),
            encrypted_private_key: Some("secret".into()),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["public_key"], "pub");
        assert!(json.get("encrypted_private_key").is_none());
    }
}
