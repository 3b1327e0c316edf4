/**
 * Author quiz questions and export them to LMS formats from the command line.
 */
use std::io::Write;
use std::path::Path;

use colored::*;
use structopt::StructOpt;

use quill::common::{
    CheckOptions, Command, LatexOptions, Options, QtiOptions, Result, TabfileOptions,
};
use quill::iohelper::prettyprint;
use quill::package::{assemble, AssembleOptions};
use quill::quiz::{Question, QuestionKind};
use quill::{my_print, my_println, persistence, tabfile};


fn main() {
    let options = Options::from_args();
    if options.no_color {
        colored::control::set_override(false);
    }

    let result = match options.cmd {
        Command::Qti(options) => {
            main_qti(options)
        },
        Command::Tabfile(options) => {
            main_tabfile(options)
        },
        Command::Latex(options) => {
            main_latex(options)
        },
        Command::Check(options) => {
            main_check(options)
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red(), e);
        ::std::process::exit(2);
    }
}


/// The main function for the `qti` subcommand.
fn main_qti(options: QtiOptions) -> Result<()> {
    let mut questions = persistence::load_pool(&options.pool)?;
    let assemble_options = AssembleOptions {
        zip_path: options.output.clone(),
        title: options.title.clone(),
        work_dir: options.work_dir.clone(),
        overwrite: options.overwrite,
        clean_up: !options.keep,
        make_variant_numbers: !options.no_variant_numbers,
        verbose: options.verbose,
    };
    assemble(&mut questions, &assemble_options)?;
    my_println!(
        "Created {}. You can upload it to the LMS.",
        options.output.display()
    )
}


/// The main function for the `tabfile` subcommand.
fn main_tabfile(options: TabfileOptions) -> Result<()> {
    let questions = persistence::load_pool(&options.pool)?;
    tabfile::write_tabfile(&options.output, &questions)?;
    my_println!("Created {}.", options.output.display())
}


/// The main function for the `latex` subcommand.
fn main_latex(options: LatexOptions) -> Result<()> {
    let questions = persistence::load_pool(&options.pool)?;
    for (k, question) in questions.iter().enumerate() {
        if k > 0 {
            my_print!("\n\n")?;
        }
        my_println!("{}", question.latex())?;
    }
    Ok(())
}


/// The main function for the `check` subcommand.
fn main_check(options: CheckOptions) -> Result<()> {
    let questions = persistence::load_pool(&options.pool)?;
    let mut problems = 0;
    for (k, question) in questions.iter().enumerate() {
        let label = format!("question {}", k + 1);
        if question.kind == QuestionKind::MultipleChoice && !question.has_distinct_answers() {
            problems += 1;
            report(&label, "has duplicate answer options")?;
        }
        for reference in missing_media(question) {
            problems += 1;
            report(&label, &format!("references missing media file '{}'", reference))?;
        }
    }

    if problems == 0 {
        my_println!("{}", "No problems found.".green())
    } else {
        my_println!("{}", format!("{} problem(s) found.", problems).red())
    }
}


fn report(label: &str, message: &str) -> Result<()> {
    prettyprint(&format!("{}: {}", label, message), "  ")
}


fn missing_media(question: &Question) -> Vec<String> {
    question
        .media_refs()
        .into_iter()
        .filter(|reference| !Path::new(reference).exists())
        .collect()
}
