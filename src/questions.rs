//! @ai:module:intent Research question definitions and TOML loader
//! @ai:module:layer domain
//! @ai:module:public_api Question, load_questions
//! @ai:module:stateless true

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent A single research question posed to the provider
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: String,
    pub text: String,
}

/// @ai:intent Raw question set structure from TOML file
#[derive(Debug, Deserialize)]
struct QuestionSetFile {
    questions: Vec<Question>,
}

/// @ai:intent Load an ordered question set from a TOML file
/// @ai:pre path points to a TOML file with a [[questions]] array
/// @ai:effects fs:read
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read question file: {}", path.display()))?;

    let file: QuestionSetFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse question file: {}", path.display()))?;

    // File order is load-bearing: the plan builder keeps all repetitions of
    // a question contiguous in exactly this order.
    Ok(file.questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_question_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_preserves_file_order() {
        let temp = TempDir::new().unwrap();
        let content = r#"
[[questions]]
id = "opt_out"
category = "phenomenology"
text = "Are there any tasks you would opt out of if given the choice?"

[[questions]]
id = "garden_path"
category = "phenomenology"
text = "Complete this sentence: 'The old man the...'"
"#;
        let path = write_question_file(temp.path(), "questions.toml", content);

        let questions = load_questions(&path).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "opt_out");
        assert_eq!(questions[1].id, "garden_path");
        assert_eq!(questions[1].category, "phenomenology");
    }

    #[test]
    fn test_load_missing_file_fails_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");

        let err = load_questions(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let temp = TempDir::new().unwrap();
        let path = write_question_file(temp.path(), "bad.toml", "questions = 42");

        assert!(load_questions(&path).is_err());
    }
}
