pub mod profiles;
pub mod sessions;

pub use profiles::{is_valid_profile_id, ProfileStore};
pub use sessions::SessionStore;
