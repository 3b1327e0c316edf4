/**
 * Assembly of the QTI package: directory layout, media copying, manifest
 * creation and zip packaging.
 *
 * The assembler owns the working directory for the duration of one export. It
 * never retries and never rolls back: a failure before the zip step aborts with
 * the working directory left in place so the caller can inspect it, except that
 * precondition violations abort before anything is touched at all.
 */
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::ZipWriter;

use super::common::{ExportError, Result};
use super::ident;
use super::iohelper::{remove_dir_recursive, walk_files};
use super::qti::ExportSession;
use super::quiz::{self, Question};

pub const MEDIA_DIR: &str = "Uploaded Media";


/// Holds the configuration for one package assembly.
pub struct AssembleOptions {
    pub zip_path: PathBuf,
    pub title: String,
    pub work_dir: PathBuf,
    /// Delete an existing zip and working directory before starting.
    pub overwrite: bool,
    /// Delete the working directory after the zip has been written.
    pub clean_up: bool,
    /// Assign sequential variant numbers 1..N before building the document.
    pub make_variant_numbers: bool,
    pub verbose: bool,
}

impl AssembleOptions {
    pub fn new(zip_path: &Path, title: &str) -> Self {
        AssembleOptions {
            zip_path: zip_path.to_path_buf(),
            title: String::from(title),
            work_dir: PathBuf::from("quill_pool"),
            overwrite: false,
            clean_up: true,
            make_variant_numbers: true,
            verbose: false,
        }
    }
}


/// Assemble `questions` into a QTI package zip at `options.zip_path`.
pub fn assemble(questions: &mut [Question], options: &AssembleOptions) -> Result<()> {
    if questions.is_empty() {
        return Err(ExportError::EmptyPool);
    }

    // Both preconditions are checked before anything is mutated.
    if options.zip_path.exists() && !options.overwrite {
        return Err(ExportError::AlreadyExists(options.zip_path.clone()));
    }
    if options.work_dir.exists() && !options.overwrite {
        return Err(ExportError::AlreadyExists(options.work_dir.clone()));
    }
    if options.zip_path.exists() {
        fs::remove_file(&options.zip_path).map_err(ExportError::Io)?;
    }
    if options.work_dir.exists() {
        remove_dir_recursive(&options.work_dir)?;
    }
    fs::create_dir_all(&options.work_dir).map_err(ExportError::Io)?;

    if options.make_variant_numbers {
        quiz::assign_variant_numbers(questions);
    }

    // Every media file referenced anywhere in the pool, deduplicated.
    let mut media: Vec<String> = Vec::new();
    for question in questions.iter() {
        for reference in question.media_refs() {
            if !media.contains(&reference) {
                media.push(reference);
            }
        }
    }

    let assessment_ident = ident::item_ident();
    let session = ExportSession::new(&options.title, &assessment_ident)?;
    let mut document = session.new_document();
    for question in questions.iter() {
        document.push_item(session.item(question));
    }

    let basenames = copy_media(&media, &options.work_dir)?;
    if options.verbose && !basenames.is_empty() {
        my_println!("Copied {} media file(s).", basenames.len())?;
    }

    let assessment_dir = options.work_dir.join(&assessment_ident);
    fs::create_dir_all(&assessment_dir).map_err(ExportError::Io)?;
    let assessment_path = assessment_dir.join(format!("{}.xml", assessment_ident));
    fs::write(&assessment_path, document.to_xml()?)
        .or(Err(ExportError::CannotWriteToFile(assessment_path.clone())))?;

    let manifest = super::manifest::build_manifest(&assessment_ident, &basenames)?;
    let manifest_path = options.work_dir.join("imsmanifest.xml");
    fs::write(&manifest_path, manifest.to_xml(false)?)
        .or(Err(ExportError::CannotWriteToFile(manifest_path.clone())))?;

    write_zip(&options.work_dir, &options.zip_path)?;
    if options.verbose {
        my_println!("Created {}.", options.zip_path.display())?;
    }

    if options.clean_up {
        remove_dir_recursive(&options.work_dir)?;
    }
    Ok(())
}

/// Copy each referenced media file into the package's media folder, returning
/// the copied basenames. A missing source aborts the assembly; the partially
/// populated working directory is intentionally left behind for inspection.
fn copy_media(media: &[String], work_dir: &Path) -> Result<Vec<String>> {
    let mut basenames = Vec::new();
    if media.is_empty() {
        return Ok(basenames);
    }

    let media_dir = work_dir.join(MEDIA_DIR);
    fs::create_dir_all(&media_dir).map_err(ExportError::Io)?;
    for reference in media.iter() {
        let source = Path::new(reference);
        if !source.exists() {
            return Err(ExportError::MediaMissing(source.to_path_buf()));
        }
        let basename = source
            .file_name()
            .ok_or_else(|| ExportError::MediaMissing(source.to_path_buf()))?;
        fs::copy(source, media_dir.join(basename)).map_err(ExportError::Io)?;
        basenames.push(basename.to_string_lossy().into_owned());
    }
    Ok(basenames)
}

/// Write every file under `work_dir` into a zip at `zip_path`, at paths relative
/// to `work_dir`.
fn write_zip(work_dir: &Path, zip_path: &Path) -> Result<()> {
    let files = walk_files(work_dir)?;
    let output = fs::File::create(zip_path).map_err(ExportError::Io)?;
    let mut zip = ZipWriter::new(output);
    for path in files.iter() {
        let relative = path.strip_prefix(work_dir).unwrap_or_else(|_| path.as_path());
        zip.start_file(relative.to_string_lossy().into_owned(), FileOptions::default())
            .map_err(ExportError::Zip)?;
        let contents = fs::read(path).map_err(ExportError::Io)?;
        zip.write_all(&contents).map_err(ExportError::Io)?;
    }
    zip.finish().map_err(ExportError::Zip)?;
    Ok(())
}
