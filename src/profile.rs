use serde::Deserialize;

/// Columns requested from the profiles table, in query order.
pub const PROFILE_COLUMNS: &str = "user_name,email,image_url";

/// Display attributes of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

/// A row of the profiles table as returned by the data service.
///
/// Missing columns and JSON `null` both deserialize to `None`; columns
/// outside of [`PROFILE_COLUMNS`] are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            user_name: record.user_name,
            email: record.email,
            image_url: record.image_url,
        }
    }
}
