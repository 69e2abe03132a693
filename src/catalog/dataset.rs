use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use rust_embed::Embed;
use serde::Deserialize;

use crate::catalog::{Catalog, Course, Problem, Session, group_into_courses};
use crate::engine::scoring::nfc;

#[derive(Embed)]
#[folder = "assets/problems/"]
struct ProblemAssets;

#[derive(Clone, Debug, Deserialize)]
pub struct ProblemRecord {
    pub category: String,
    #[serde(default)]
    pub ja: String,
    pub en: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Full {
        #[serde(default)]
        monsters: HashMap<String, String>,
        problems: Vec<ProblemRecord>,
    },
    Bare(Vec<ProblemRecord>),
}

impl From<ProblemRecord> for Problem {
    fn from(record: ProblemRecord) -> Self {
        Problem {
            category: record.category,
            prompt: nfc(&record.ja).into_owned(),
            target: nfc(&record.en).into_owned(),
        }
    }
}

/// Parse a dataset file into courses. Returns None if the content is not a
/// recognised dataset.
pub fn parse_courses(content: &str) -> Option<Vec<Course>> {
    let (monsters, records) = match serde_json::from_str::<DatasetFile>(content).ok()? {
        DatasetFile::Full { monsters, problems } => (monsters, problems),
        DatasetFile::Bare(problems) => (HashMap::new(), problems),
    };
    let problems: Vec<Problem> = records.into_iter().map(Problem::from).collect();
    Some(group_into_courses(&problems, &monsters))
}

fn read_user_dataset(dir: &Path, session: Session) -> Option<String> {
    let path = dir.join(format!("{}.json", session.to_key()));
    fs::read_to_string(path).ok()
}

fn read_bundled_dataset(session: Session) -> Option<String> {
    let file = ProblemAssets::get(&format!("{}.json", session.to_key()))?;
    std::str::from_utf8(file.data.as_ref()).ok().map(str::to_string)
}

/// Load courses for one session, preferring the user problem directory over
/// the bundled data. Missing or broken data leaves the session empty.
pub fn load_session(user_dir: Option<&Path>, session: Session) -> Vec<Course> {
    let content = user_dir
        .and_then(|dir| read_user_dataset(dir, session))
        .or_else(|| read_bundled_dataset(session));

    let Some(content) = content else {
        warn!("No problem data for session {}", session.to_key());
        return Vec::new();
    };

    match parse_courses(&content) {
        Some(courses) => {
            info!(
                "Loaded {} courses for session {}",
                courses.len(),
                session.to_key()
            );
            courses
        }
        None => {
            warn!("Problem data for session {} is malformed", session.to_key());
            Vec::new()
        }
    }
}

pub fn load_catalog(user_dir: Option<&Path>) -> Catalog {
    let mut catalog = Catalog::new();
    for &session in Session::all() {
        catalog.insert(session, load_session(user_dir, session));
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_dataset() {
        let json = r#"{
            "monsters": { "greetings": "slime" },
            "problems": [
                { "category": "greetings", "ja": "こんにちは", "en": "hello" },
                { "category": "greetings", "ja": "さようなら", "en": "goodbye" },
                { "category": "animals", "ja": "ねこ", "en": "cat" }
            ]
        }"#;
        let courses = parse_courses(json).unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].name, "greetings");
        assert_eq!(courses[0].monster.as_deref(), Some("slime"));
        assert_eq!(courses[0].problems[1].target, "goodbye");
        assert_eq!(courses[1].problems[0].prompt, "ねこ");
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[{ "category": "a", "ja": "x", "en": "apple" }]"#;
        let courses = parse_courses(json).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].monster, None);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_courses("not json").is_none());
        assert!(parse_courses(r#"{"problems": 3}"#).is_none());
    }

    #[test]
    fn test_targets_are_nfc_normalized() {
        // "cafe" followed by a combining acute accent
        let json = r#"[{ "category": "a", "ja": "", "en": "cafe\u0301" }]"#;
        let courses = parse_courses(json).unwrap();
        assert_eq!(courses[0].problems[0].target, "caf\u{e9}");
    }

    #[test]
    fn test_bundled_sessions_have_courses() {
        for &session in Session::all() {
            assert!(
                !load_session(None, session).is_empty(),
                "bundled data missing for {}",
                session.to_key()
            );
        }
    }

    #[test]
    fn test_user_dir_overrides_bundled() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("vocabulary.json"),
            r#"[{ "category": "custom", "ja": "", "en": "zebra" }]"#,
        )
        .unwrap();
        let courses = load_session(Some(dir.path()), Session::Vocabulary);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].name, "custom");

        // Sessions without a user file still fall back to bundled data
        assert!(!load_session(Some(dir.path()), Session::GrammarQuiz).is_empty());
    }
}
