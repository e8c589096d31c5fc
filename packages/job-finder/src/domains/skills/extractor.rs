use std::collections::{BTreeMap, BTreeSet, HashMap};

use lazy_static::lazy_static;
use regex::Regex;

use super::taxonomy::{self, SkillCategory, AMBIGUOUS};

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref HTML_ENTITY: Regex = Regex::new(r"&(?:nbsp|amp|lt|gt|quot|#39);").unwrap();
    static ref DEFAULT_EXTRACTOR: SkillExtractor = SkillExtractor::new();
}

/// Dictionary-based skill matcher.
///
/// Text and vocabulary phrases are split into the same tokens, so
/// `"Ruby on Rails"` matches the three-token phrase and `"CI/CD"` matches
/// `ci/cd`. At each position the longest known phrase wins.
pub struct SkillExtractor {
    phrases: HashMap<Vec<String>, &'static str>,
    longest_phrase: usize,
}

impl SkillExtractor {
    pub fn new() -> Self {
        let mut phrases = HashMap::new();
        let mut longest_phrase = 1;

        for (phrase, canonical) in taxonomy::vocabulary() {
            let tokens: Vec<String> = tokenize(phrase).into_iter().map(|t| t.to_lowercase()).collect();
            if tokens.is_empty() {
                continue;
            }
            longest_phrase = longest_phrase.max(tokens.len());
            phrases.insert(tokens, canonical);
        }

        Self {
            phrases,
            longest_phrase,
        }
    }

    /// Canonical (lower-case) skills mentioned in `text`.
    pub fn canonical_skills(&self, text: &str) -> BTreeSet<&'static str> {
        let cleaned = strip_html(text);
        let raw_tokens = tokenize(&cleaned);
        let tokens: Vec<String> = raw_tokens.iter().map(|t| t.to_lowercase()).collect();

        let mut found = BTreeSet::new();
        let mut i = 0;
        while i < tokens.len() {
            let max_len = self.longest_phrase.min(tokens.len() - i);
            let matched = (1..=max_len).rev().find_map(|len| {
                let canonical = self.phrases.get(&tokens[i..i + len])?;
                if len == 1 && is_ambiguous(&tokens[i]) && !starts_uppercase(raw_tokens[i]) {
                    return None;
                }
                Some((len, *canonical))
            });

            match matched {
                Some((len, canonical)) => {
                    found.insert(canonical);
                    i += len;
                }
                None => i += 1,
            }
        }

        found
    }

    /// Display names of the skills in `text`, deduplicated and sorted.
    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        let mut skills: Vec<String> = self
            .canonical_skills(text)
            .into_iter()
            .map(taxonomy::display_name)
            .collect();
        skills.sort_by_key(|skill| skill.to_lowercase());
        skills.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        skills
    }

    /// Skills grouped by category. Categories with no hits are omitted, as
    /// are skills that belong to no category.
    pub fn extract_skills_with_categories(
        &self,
        text: &str,
    ) -> BTreeMap<SkillCategory, Vec<String>> {
        let mut grouped: BTreeMap<SkillCategory, Vec<String>> = BTreeMap::new();
        for canonical in self.canonical_skills(text) {
            if let Some(category) = SkillCategory::of(canonical) {
                grouped
                    .entry(category)
                    .or_default()
                    .push(taxonomy::display_name(canonical));
            }
        }
        for skills in grouped.values_mut() {
            skills.sort_by_key(|skill| skill.to_lowercase());
        }
        grouped
    }
}

impl Default for SkillExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract skills with the shared default vocabulary.
pub fn extract_skills(text: &str) -> Vec<String> {
    DEFAULT_EXTRACTOR.extract_skills(text)
}

pub fn extract_skills_with_categories(text: &str) -> BTreeMap<SkillCategory, Vec<String>> {
    DEFAULT_EXTRACTOR.extract_skills_with_categories(text)
}

/// Skills for a posting, taken from its title and description.
pub fn extract_posting_skills(title: &str, description: Option<&str>) -> Vec<String> {
    match description {
        Some(description) => extract_skills(&format!("{title}\n{description}")),
        None => extract_skills(title),
    }
}

fn strip_html(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, " ");
    HTML_ENTITY.replace_all(&without_tags, " ").into_owned()
}

/// Split on anything other than alphanumerics and `+ # .`, then trim dots
/// from the token ends so sentence punctuation does not stick.
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|token| token.trim_matches('.'))
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_ambiguous(token: &str) -> bool {
    AMBIGUOUS.contains(&token)
}

fn starts_uppercase(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}
