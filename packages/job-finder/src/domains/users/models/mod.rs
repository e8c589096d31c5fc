pub mod saved_search;
pub mod user;
pub mod user_job_interaction;
pub mod user_skill;

pub use saved_search::*;
pub use user::*;
pub use user_job_interaction::*;
pub use user_skill::*;
