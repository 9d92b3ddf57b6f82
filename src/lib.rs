pub mod config;
mod errors;
pub mod identity;
pub mod profile;
pub mod service;
pub mod store;
pub mod supabase;

pub use config::SupabaseConfig;
pub use errors::{ProfileError, Result};
pub use identity::{Identity, IdentityCell, Subscription};
pub use profile::{Profile, ProfileRecord};
pub use service::ProfileService;
pub use store::ProfileStore;
pub use supabase::SupabaseClient;
