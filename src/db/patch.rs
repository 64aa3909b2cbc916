use serde_json::Value;

use crate::secrets::SecretInput;

/// Validated insert payload; secrets still carry plaintext and are sealed by the actor.
#[derive(Debug, Clone, Default)]
pub struct SoftwareCreate {
    pub name: String,
    pub category: String,
    pub description: String,
    pub icon: String,
    pub license: String,
    pub systems: Vec<String>,
    pub website: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub download_links: Vec<Value>,
    pub secrets: Vec<SecretInput>,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct SoftwarePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// `Some("")` clears the icon.
    pub icon: Option<String>,
    pub license: Option<String>,
    pub systems: Option<Vec<String>>,
    pub website: Option<String>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    pub download_links: Option<Vec<Value>>,
    /// Merged by id against the stored list.
    pub secrets: Option<Vec<SecretInput>>,
}
