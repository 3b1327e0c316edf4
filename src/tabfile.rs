/**
 * The tab-delimited import format: one physical line per question.
 *
 * A multiple-choice row is `MC`, the question text, one (text, correct/incorrect)
 * pair per option in shuffled order, and a fixed trailing
 * ("None of the others", "incorrect") pair. A file-upload row is `FIL` followed
 * by the question text. The format forbids embedded newlines and tabs, so all
 * runs of whitespace collapse to single spaces, and math delimiters are rewritten
 * for MathJax.
 */
use std::fs;
use std::path::Path;

use regex::Regex;

use super::common::{ExportError, Result};
use super::quiz::{Question, QuestionKind};
use super::shuffle;


/// Render one question as a tab-separated row (without a trailing newline).
pub fn tab_row(question: &Question) -> String {
    match question.kind {
        QuestionKind::FileUpload => {
            format!("FIL\t{}", normalize(&question.export_text()))
        },
        QuestionKind::MultipleChoice => {
            let answer = normalize(&question.answer);
            let wrong_answers: Vec<String> =
                question.wrong_answers.iter().map(|w| normalize(w)).collect();
            let arrangement =
                shuffle::arrange(&answer, &wrong_answers, true, true, question.shuffle_seed);

            let mut row = vec![String::from("MC"), normalize(&question.text)];
            for (slot, text) in arrangement.answers.iter().enumerate() {
                row.push(text.clone());
                row.push(String::from(if slot == arrangement.correct_index {
                    "correct"
                } else {
                    "incorrect"
                }));
            }
            row.join("\t")
        },
    }
}

/// Write one row per question to `path`.
pub fn write_tabfile(path: &Path, questions: &[Question]) -> Result<()> {
    let mut contents = String::new();
    for question in questions.iter() {
        contents.push_str(&tab_row(question));
        contents.push('\n');
    }
    fs::write(path, contents).or(Err(ExportError::CannotWriteToFile(path.to_path_buf())))
}

/// Normalize a text field for the single-line format: display math first, then
/// inline math, then `\dfrac` (which the target renderer chokes on), and finally
/// whitespace.
fn normalize(s: &str) -> String {
    let display_math = Regex::new(r"\$\$(.*?)\$\$").unwrap();
    let inline_math = Regex::new(r"\$(.*?)\$").unwrap();
    let dfrac = Regex::new(r"\\dfrac\b").unwrap();
    let whitespace = Regex::new(r"[\n ]+").unwrap();

    let s = display_math.replace_all(s, r"\[${1}\]");
    let s = inline_math.replace_all(&s, r"\(${1}\)");
    let s = dfrac.replace_all(&s, r"\frac");
    let s = whitespace.replace_all(&s, " ");
    s.into_owned()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_rows_are_single_lines() {
        let mut question = Question::file_upload("Find\n$$\\dfrac{x}{2}$$  please.");
        question.variant_number = 2;
        assert_eq!(
            tab_row(&question),
            "FIL\tFind \\[\\frac{x}{2}\\] please.<br>[For office use only: V2]"
        );
    }

    #[test]
    fn mcq_rows_have_one_pair_per_option() {
        let question = Question::multiple_choice("Evaluate $x$.", "a", &["b", "c", "d"]);
        let row = tab_row(&question);
        let fields: Vec<&str> = row.split('\t').collect();

        // MC + text + 5 option pairs (4 answers plus the none-option).
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[0], "MC");
        assert_eq!(fields[1], "Evaluate \\(x\\).");
        assert_eq!(fields[10], shuffle::NONE_OF_THE_OTHERS);
        assert_eq!(fields[11], "incorrect");

        let corrects = fields.iter().filter(|f| **f == "correct").count();
        assert_eq!(corrects, 1);
        let correct_slot = fields.iter().position(|f| *f == "correct").unwrap();
        assert_eq!(fields[correct_slot - 1], "a");
    }

    #[test]
    fn mcq_rows_respect_the_shuffle_seed() {
        let mut question = Question::multiple_choice("Pick.", "a", &["b", "c", "d"]);
        question.shuffle_seed = 99;
        assert_eq!(tab_row(&question), tab_row(&question));
    }

    #[test]
    fn generalizes_to_other_option_counts() {
        let question = Question::multiple_choice("Pick.", "a", &["b"]);
        let fields: Vec<String> = tab_row(&question)
            .split('\t')
            .map(String::from)
            .collect();
        // MC + text + 3 option pairs.
        assert_eq!(fields.len(), 8);
    }

    #[test]
    fn tabfiles_have_one_line_per_question() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        let questions = vec![
            Question::file_upload("one"),
            Question::multiple_choice("two", "a", &["b", "c", "d"]),
        ];
        write_tabfile(&path, &questions).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("FIL\t"));
        assert!(lines[1].starts_with("MC\t"));
    }
}
