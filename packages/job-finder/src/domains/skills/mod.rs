pub mod extractor;
pub mod taxonomy;

pub use extractor::{
    extract_posting_skills, extract_skills, extract_skills_with_categories, SkillExtractor,
};
pub use taxonomy::SkillCategory;
