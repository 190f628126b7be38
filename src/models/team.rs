use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Workspace team; the unit of search isolation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,

    /// Workspace subdomain
    #[serde(default)]
    pub domain: String,

    /// Host name the archive is served under for this team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub is_disabled: bool,

    #[serde(default)]
    pub is_hidden: bool,

    #[serde(default)]
    pub plan: String,

    #[serde(default)]
    pub icon: BTreeMap<String, serde_json::Value>,
}
