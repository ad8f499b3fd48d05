pub mod catalog;
pub mod ids;
pub mod included;
pub mod known;
pub mod name;

pub use catalog::TypeCatalog;
pub use ids::TypeKey;
pub use included::{IncludedType, IncludedTypeSet};
pub use known::{KnownType, KnownTypeSet};
pub use name::XmlName;
