pub mod bounds;
pub mod geodesy;
pub mod ids;
pub mod name;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use geodesy::*;
pub use ids::*;
pub use name::*;
