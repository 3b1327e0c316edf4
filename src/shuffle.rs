/**
 * Ordering of multiple-choice answer options.
 *
 * The candidate list is always the correct answer followed by the wrong answers,
 * optionally with a trailing "None of the others" option. Shuffling permutes the
 * candidates but keeps the none-option pinned to the last slot so it reads
 * sensibly on screen.
 */
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

pub const NONE_OF_THE_OTHERS: &str = "None of the others";


/// The result of arranging a question's answer options.
#[derive(Debug)]
pub struct Arrangement {
    /// The option texts in their final order.
    pub answers: Vec<String>,
    /// `ordering[slot]` is the index of that slot's option in the candidate list
    /// (0 = the correct answer).
    pub ordering: Vec<usize>,
    /// The slot holding the originally-correct answer.
    pub correct_index: usize,
}


/// Arrange the answer options for one question. A `seed` of 0 means ambient
/// randomness; any other value makes the order reproducible.
pub fn arrange(
    answer: &str,
    wrong_answers: &[String],
    none_of_the_others: bool,
    shuffle: bool,
    seed: u64,
) -> Arrangement {
    let mut candidates = Vec::with_capacity(wrong_answers.len() + 2);
    candidates.push(String::from(answer));
    candidates.extend(wrong_answers.iter().cloned());
    if none_of_the_others {
        candidates.push(String::from(NONE_OF_THE_OTHERS));
    }

    let mut ordering: Vec<usize> = (0..candidates.len()).collect();
    if shuffle {
        // The none-option, when present, keeps the last slot.
        let limit = if none_of_the_others {
            ordering.len() - 1
        } else {
            ordering.len()
        };
        if seed != 0 {
            let mut rng = StdRng::seed_from_u64(seed);
            ordering[..limit].shuffle(&mut rng);
        } else {
            let mut rng = thread_rng();
            ordering[..limit].shuffle(&mut rng);
        }
    }

    let answers = ordering.iter().map(|&k| candidates[k].clone()).collect();
    let correct_index = ordering.iter().position(|&k| k == 0).unwrap();
    Arrangement { answers, ordering, correct_index }
}

/// Return `true` if no two of the question's options are equal. Duplicate options
/// silently break scoring, so callers should check this before exporting.
pub fn has_distinct_answers(answer: &str, wrong_answers: &[String]) -> bool {
    let mut seen = HashSet::new();
    seen.insert(answer);
    for wrong in wrong_answers.iter() {
        if !seen.insert(wrong.as_str()) {
            return false;
        }
    }
    true
}
