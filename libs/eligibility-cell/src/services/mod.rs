pub mod matcher;
pub mod registry;

pub use matcher::check_eligibility;
pub use registry::RegionRegistry;
