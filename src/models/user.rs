use serde::{Deserialize, Serialize};

/// Workspace member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub team: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub real_name: String,

    /// Never exposed through the API
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub image_24: String,

    #[serde(default)]
    pub image_32: String,

    #[serde(default)]
    pub image_48: String,

    #[serde(default)]
    pub image_72: String,

    #[serde(default)]
    pub image_192: String,

    #[serde(default)]
    pub image_original: String,

    #[serde(default)]
    pub title: String,
}
