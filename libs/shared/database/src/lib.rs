pub mod local;
pub mod supabase;

pub use local::LocalStore;
pub use supabase::{SupabaseClient, SupabaseError};
