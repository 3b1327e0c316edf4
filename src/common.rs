/**
 * Definitions of data structures used by several modules, such as `ExportError` and
 * the various structs that hold command-line arguments.
 */
use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use structopt::StructOpt;


pub type Result<T> = ::std::result::Result<T, ExportError>;


#[derive(Debug)]
pub enum ExportError {
    /// For when the export target already exists and `overwrite` was not given.
    AlreadyExists(PathBuf),
    CannotWriteToFile(PathBuf),
    EmptyPool,
    Io(io::Error),
    /// For JSON errors.
    Json(serde_json::Error),
    /// For when a referenced media file cannot be copied into the package.
    MediaMissing(PathBuf),
    /// For when the user names a question pool that does not exist.
    PoolNotFound(PathBuf),
    /// For when the seed document lacks a required template fragment.
    TemplateMissing(&'static str),
    Xml(String),
    Zip(zip::result::ZipError),
}


impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExportError::AlreadyExists(ref path) => {
                write!(
                    f,
                    "'{}' already exists (use --overwrite to delete it first)",
                    path.to_string_lossy()
                )
            },
            ExportError::CannotWriteToFile(ref path) => {
                write!(f, "cannot write to file '{}'", path.to_string_lossy())
            },
            ExportError::EmptyPool => {
                write!(f, "no questions found")
            },
            ExportError::Io(ref err) => {
                write!(f, "IO error ({})", err)
            },
            ExportError::Json(ref err) => {
                write!(f, "could not parse JSON ({})", err)
            },
            ExportError::MediaMissing(ref path) => {
                write!(f, "could not find media file '{}'", path.to_string_lossy())
            },
            ExportError::PoolNotFound(ref path) => {
                write!(f, "could not find question pool '{}'", path.to_string_lossy())
            },
            ExportError::TemplateMissing(kind) => {
                write!(f, "seed document has no '{}' fragment", kind)
            },
            ExportError::Xml(ref message) => {
                write!(f, "XML error ({})", message)
            },
            ExportError::Zip(ref err) => {
                write!(f, "zip error ({})", err)
            },
        }
    }
}


impl error::Error for ExportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ExportError::Io(ref err) => Some(err),
            ExportError::Json(ref err) => Some(err),
            ExportError::Zip(ref err) => Some(err),
            _ => None,
        }
    }
}


/// Holds the command-line configuration for the application.
#[derive(StructOpt)]
#[structopt(name = "quill", about = "Author quiz questions and export them to LMS formats.")]
pub struct Options {
    /// Do not emit colorized output.
    #[structopt(long = "no-color")]
    pub no_color: bool,
    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Export a question pool as a QTI package.
    #[structopt(name = "qti")]
    Qti(QtiOptions),
    /// Export a question pool as a tab-delimited import file.
    #[structopt(name = "tabfile")]
    Tabfile(TabfileOptions),
    /// Print the questions in a pool as LaTeX fragments.
    #[structopt(name = "latex")]
    Latex(LatexOptions),
    /// Check a question pool for duplicate options and missing media.
    #[structopt(name = "check")]
    Check(CheckOptions),
}

#[derive(StructOpt)]
pub struct QtiOptions {
    /// Path to the question pool file.
    pub pool: PathBuf,
    /// Where to write the package zip.
    #[structopt(short = "o", long = "output", default_value = "upload_me.zip")]
    pub output: PathBuf,
    /// Assessment title.
    #[structopt(short = "t", long = "title", default_value = "Quill question pool")]
    pub title: String,
    /// Working directory for package assembly.
    #[structopt(long = "work-dir", default_value = "quill_pool")]
    pub work_dir: PathBuf,
    /// Delete an existing output zip and working directory first.
    #[structopt(long = "overwrite")]
    pub overwrite: bool,
    /// Keep the working directory after the zip has been written.
    #[structopt(long = "keep")]
    pub keep: bool,
    /// Do not assign sequential variant numbers before exporting.
    #[structopt(long = "no-variant-numbers")]
    pub no_variant_numbers: bool,
    /// Print a message for each assembly step.
    #[structopt(long = "verbose")]
    pub verbose: bool,
}

#[derive(StructOpt)]
pub struct TabfileOptions {
    /// Path to the question pool file.
    pub pool: PathBuf,
    /// Where to write the tab-delimited file.
    #[structopt(short = "o", long = "output", default_value = "questions.txt")]
    pub output: PathBuf,
}

#[derive(StructOpt)]
pub struct LatexOptions {
    /// Path to the question pool file.
    pub pool: PathBuf,
}

#[derive(StructOpt)]
pub struct CheckOptions {
    /// Path to the question pool file.
    pub pool: PathBuf,
}
