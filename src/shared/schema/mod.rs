#[path = "deals.rs"]
mod deals_schema;
#[path = "projects.rs"]
mod projects_schema;
#[path = "proposals.rs"]
mod proposals_schema;
#[path = "speakers.rs"]
mod speakers_schema;

pub use self::deals_schema::*;
pub use self::projects_schema::*;
pub use self::proposals_schema::*;
pub use self::speakers_schema::*;
