/**
 * The question data model shared by every export surface.
 */
use serde::{Deserialize, Serialize};

use super::markup;
use super::shuffle;


/// Represents a question.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub kind: QuestionKind,
    /// The text of the question: a constrained HTML subset with inline math
    /// delimited by `$...$`.
    pub text: String,
    #[serde(default = "default_points")]
    pub points: f64,
    /// 0 means unassigned; `assign_variant_numbers` rewrites a batch to 1..N.
    #[serde(default)]
    pub variant_number: u32,
    /// The correct answer. Only used when `kind` is `MultipleChoice`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub answer: String,
    /// Incorrect answers. Only used when `kind` is `MultipleChoice`; typically
    /// three, but any count works.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wrong_answers: Vec<String>,
    /// Seed for shuffling the answer options; 0 means unseeded.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub shuffle_seed: u64,
}


/// An enumeration for the `kind` field of `Question` objects.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    FileUpload,
    MultipleChoice,
}


fn default_points() -> f64 {
    1.0
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}


impl Question {
    /// Return a new file-upload question.
    pub fn file_upload(text: &str) -> Self {
        Question {
            kind: QuestionKind::FileUpload,
            text: String::from(text),
            points: 3.0,
            variant_number: 0,
            answer: String::new(),
            wrong_answers: Vec::new(),
            shuffle_seed: 0,
        }
    }

    /// Return a new multiple-choice question.
    pub fn multiple_choice(text: &str, answer: &str, wrong_answers: &[&str]) -> Self {
        Question {
            kind: QuestionKind::MultipleChoice,
            text: String::from(text),
            points: 1.0,
            variant_number: 0,
            answer: String::from(answer),
            wrong_answers: wrong_answers.iter().map(|w| String::from(*w)).collect(),
            shuffle_seed: 0,
        }
    }

    /// The text as it should appear in an export. File-upload questions with an
    /// assigned variant number carry a marker so that submissions can be matched
    /// back to the variant the student saw.
    pub fn export_text(&self) -> String {
        if self.kind == QuestionKind::FileUpload && self.variant_number > 0 {
            format!(
                "{}<br>[For office use only: V{}]",
                self.text, self.variant_number
            )
        } else {
            self.text.clone()
        }
    }

    pub fn title(&self) -> String {
        format!("Question {}", self.variant_number)
    }

    /// Return `true` if the question's options are all distinct. Always true for
    /// file-upload questions.
    pub fn has_distinct_answers(&self) -> bool {
        match self.kind {
            QuestionKind::FileUpload => true,
            QuestionKind::MultipleChoice => {
                shuffle::has_distinct_answers(&self.answer, &self.wrong_answers)
            },
        }
    }

    /// The local media files referenced by the question text and, for multiple
    /// choice, by each of its options.
    pub fn media_refs(&self) -> Vec<String> {
        let mut refs = markup::image_refs(&self.text);
        if self.kind == QuestionKind::MultipleChoice {
            refs.extend(markup::image_refs(&self.answer));
            for wrong in self.wrong_answers.iter() {
                refs.extend(markup::image_refs(wrong));
            }
        }
        refs
    }

    /// Typeset the question as a LaTeX fragment. Multiple-choice options are
    /// listed with the correct answer first and the none-option last.
    pub fn latex(&self) -> String {
        let mut out = markup::translate(&self.export_text());
        if self.kind == QuestionKind::MultipleChoice {
            out.push('\n');
            out.push_str("\\begin{enumerate}\n");
            out.push_str(&format!("  \\item {}\n", self.answer));
            for wrong in self.wrong_answers.iter() {
                out.push_str(&format!("  \\item {}\n", wrong));
            }
            out.push_str(&format!("  \\item {}\n", shuffle::NONE_OF_THE_OTHERS));
            out.push_str("\\end{enumerate}");
        }
        out
    }
}


/// Assign sequential variant numbers 1..N to `questions` in list order.
pub fn assign_variant_numbers(questions: &mut [Question]) {
    for (k, question) in questions.iter_mut().enumerate() {
        question.variant_number = (k + 1) as u32;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_numbers_are_assigned_in_list_order() {
        let mut questions = vec![
            Question::multiple_choice("q1", "a", &["b", "c", "d"]),
            Question::file_upload("q2"),
            Question::multiple_choice("q3", "x", &["y", "z", "w"]),
        ];
        assign_variant_numbers(&mut questions);
        for (k, question) in questions.iter().enumerate() {
            assert_eq!(question.variant_number, (k + 1) as u32);
        }
    }

    #[test]
    fn upload_questions_carry_a_variant_marker() {
        let mut question = Question::file_upload("Integrate $f$.");
        assert_eq!(question.export_text(), "Integrate $f$.");
        question.variant_number = 7;
        assert_eq!(
            question.export_text(),
            "Integrate $f$.<br>[For office use only: V7]"
        );
    }

    #[test]
    fn mcq_text_has_no_variant_marker() {
        let mut question = Question::multiple_choice("Pick one.", "a", &["b"]);
        question.variant_number = 3;
        assert_eq!(question.export_text(), "Pick one.");
    }

    #[test]
    fn media_refs_cover_options() {
        let question = Question::multiple_choice(
            "Which graph? <img src=\"graphs/q.png\">",
            "<img src=\"graphs/a.png\">",
            &["<img src=\"graphs/b.png\">", "none"],
        );
        assert_eq!(
            question.media_refs(),
            vec!["graphs/q.png", "graphs/a.png", "graphs/b.png"]
        );
    }

    #[test]
    fn latex_lists_options_with_the_correct_answer_first() {
        let question = Question::multiple_choice("<b>Pick</b> one.", "a", &["b", "c"]);
        let latex = question.latex();
        assert!(latex.starts_with("{\\bf Pick} "));
        assert!(latex.contains("\\item a\n  \\item b\n  \\item c\n"));
        assert!(latex.contains("\\item None of the others\n\\end{enumerate}"));
    }
}
