pub mod dataset;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// --- Session ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    SentenceQuiz,
    GrammarQuiz,
    Vocabulary,
}

impl Session {
    pub fn to_key(self) -> &'static str {
        match self {
            Session::SentenceQuiz => "sentence_quiz",
            Session::GrammarQuiz => "grammar_quiz",
            Session::Vocabulary => "vocabulary",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "sentence_quiz" => Some(Session::SentenceQuiz),
            "grammar_quiz" => Some(Session::GrammarQuiz),
            "vocabulary" => Some(Session::Vocabulary),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Session::SentenceQuiz => "Sentence Quiz",
            Session::GrammarQuiz => "Grammar Quiz",
            Session::Vocabulary => "Vocabulary",
        }
    }

    pub fn all() -> &'static [Session] {
        &[Session::SentenceQuiz, Session::GrammarQuiz, Session::Vocabulary]
    }
}

// --- Problems and courses ---

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub category: String,
    /// Hint shown above the target, usually a translation.
    pub prompt: String,
    /// Exact text the player has to reproduce.
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Course {
    pub name: String,
    pub problems: Vec<Problem>,
    pub monster: Option<String>,
}

/// Partition problems into courses by category, keeping the order in which
/// each category first appears.
pub fn group_into_courses(problems: &[Problem], monsters: &HashMap<String, String>) -> Vec<Course> {
    let mut courses: Vec<Course> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();

    for problem in problems {
        let idx = match index_by_name.get(problem.category.as_str()) {
            Some(&idx) => idx,
            None => {
                courses.push(Course {
                    name: problem.category.clone(),
                    problems: Vec::new(),
                    monster: monsters.get(&problem.category).cloned(),
                });
                index_by_name.insert(problem.category.as_str(), courses.len() - 1);
                courses.len() - 1
            }
        };
        courses[idx].problems.push(problem.clone());
    }

    courses
}

/// Courses for every session. Sessions without data have no courses.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    sessions: HashMap<Session, Vec<Course>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: Session, courses: Vec<Course>) {
        self.sessions.insert(session, courses);
    }

    pub fn with_problems(mut self, session: Session, problems: &[Problem]) -> Self {
        self.insert(session, group_into_courses(problems, &HashMap::new()));
        self
    }

    pub fn courses(&self, session: Session) -> &[Course] {
        self.sessions
            .get(&session)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn course(&self, session: Session, index: usize) -> Option<&Course> {
        self.courses(session).get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(category: &str, target: &str) -> Problem {
        Problem {
            category: category.to_string(),
            prompt: String::new(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let problems = vec![
            problem("animals", "cat"),
            problem("food", "bread"),
            problem("animals", "dog"),
            problem("colors", "red"),
            problem("food", "rice"),
        ];
        let courses = group_into_courses(&problems, &HashMap::new());
        let names: Vec<&str> = courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["animals", "food", "colors"]);

        let animals: Vec<&str> = courses[0].problems.iter().map(|p| p.target.as_str()).collect();
        assert_eq!(animals, vec!["cat", "dog"]);
        assert_eq!(courses[1].problems.len(), 2);
    }

    #[test]
    fn test_group_empty_input_yields_no_courses() {
        assert!(group_into_courses(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn test_group_attaches_monster_asset() {
        let mut monsters = HashMap::new();
        monsters.insert("food".to_string(), "slime".to_string());
        let courses =
            group_into_courses(&[problem("animals", "cat"), problem("food", "egg")], &monsters);
        assert_eq!(courses[0].monster, None);
        assert_eq!(courses[1].monster.as_deref(), Some("slime"));
    }

    #[test]
    fn test_missing_session_is_empty() {
        let catalog = Catalog::new().with_problems(Session::Vocabulary, &[problem("a", "x")]);
        assert_eq!(catalog.courses(Session::Vocabulary).len(), 1);
        assert!(catalog.courses(Session::GrammarQuiz).is_empty());
        assert!(catalog.course(Session::GrammarQuiz, 0).is_none());
    }

    #[test]
    fn test_session_key_roundtrip() {
        for &session in Session::all() {
            assert_eq!(Session::from_key(session.to_key()), Some(session));
        }
        assert_eq!(Session::from_key("kanji"), None);
    }
}
