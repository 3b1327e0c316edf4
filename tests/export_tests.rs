/**
 * End-to-end tests for package assembly: real directories, real zips.
 */
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use quill::common::ExportError;
use quill::package::{assemble, AssembleOptions};
use quill::quiz::Question;


fn two_mcqs() -> Vec<Question> {
    vec![
        Question::multiple_choice(
            "What is $2+2$?",
            "4",
            &["3", "5", "22"],
        ),
        Question::multiple_choice(
            "Which function solves $y' = y$?",
            "$e^x$",
            &["$x^2$", "$\\ln x$", "$\\sin x$"],
        ),
    ]
}

fn options_for(dir: &Path) -> AssembleOptions {
    let mut options = AssembleOptions::new(&dir.join("upload_me.zip"), "Week 3 quiz");
    options.work_dir = dir.join("pool");
    options
}

fn zip_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}


#[test]
fn assembles_a_package_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(dir.path());
    let mut questions = two_mcqs();
    assemble(&mut questions, &options).unwrap();

    // Variant numbers were assigned in list order.
    assert_eq!(questions[0].variant_number, 1);
    assert_eq!(questions[1].variant_number, 2);

    // The working directory is gone and the zip holds exactly the manifest and
    // the assessment file, with no media entries.
    assert!(!options.work_dir.exists());
    let names = zip_names(&options.zip_path);
    assert_eq!(names.len(), 2);
    assert!(names.contains(&String::from("imsmanifest.xml")));

    let assessment = names.iter().find(|n| *n != "imsmanifest.xml").unwrap();
    let parts: Vec<&str> = assessment.split('/').collect();
    assert_eq!(parts.len(), 2);
    assert_eq!(format!("{}.xml", parts[0]), parts[1]);
    assert!(parts[0].starts_with('g'));
    assert!(!names.iter().any(|n| n.starts_with("Uploaded Media")));
}

#[test]
fn packaged_xml_is_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options_for(dir.path());
    options.clean_up = false;
    let mut questions = two_mcqs();
    questions.push(Question::file_upload("Upload your working for $f(x)$."));
    assemble(&mut questions, &options).unwrap();

    // The manifest's assessment resource href matches the file on disk.
    let manifest = fs::read_to_string(options.work_dir.join("imsmanifest.xml")).unwrap();
    let assessment_path = find_assessment(&options.work_dir);
    let ident = assessment_path.file_stem().unwrap().to_string_lossy().into_owned();
    assert!(manifest.contains(&format!("{}/{}.xml", ident, ident)));

    let assessment = fs::read_to_string(&assessment_path).unwrap();
    assert!(assessment.starts_with("<?xml"));
    assert!(assessment.contains("Week 3 quiz"));
    // Three items, each with its own scoring cross-reference.
    assert_eq!(assessment.matches("<item ").count(), 3);
    assert_eq!(
        assessment
            .matches("assessment_question_identifierref")
            .count(),
        3
    );
    // Math was rewritten for MathJax.
    assert!(assessment.contains("\\(2+2\\)"));
    // The upload question carries its variant marker.
    assert!(assessment.contains("[For office use only: V3]"));
}

#[test]
fn media_files_are_copied_and_listed() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("df.png");
    fs::write(&image, b"not really a png").unwrap();

    let mut questions = vec![Question::multiple_choice(
        &format!("Which field? <img src=\"{}\">", image.display()),
        "this one",
        &["that one", "another", "neither"],
    )];
    let mut options = options_for(dir.path());
    options.clean_up = false;
    assemble(&mut questions, &options).unwrap();

    assert!(options.work_dir.join("Uploaded Media").join("df.png").exists());
    let names = zip_names(&options.zip_path);
    assert!(names.contains(&String::from("Uploaded Media/df.png")));

    let manifest = fs::read_to_string(options.work_dir.join("imsmanifest.xml")).unwrap();
    assert!(manifest.contains("Uploaded Media/df.png"));
    assert!(manifest.contains("webcontent"));

    // The assessment text points at the package media folder, not the source.
    let assessment = fs::read_to_string(find_assessment(&options.work_dir)).unwrap();
    assert!(assessment.contains("$IMS-CC-FILEBASE$/Uploaded%20Media/df.png"));
}

#[test]
fn existing_targets_are_not_overwritten_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(dir.path());
    fs::write(&options.zip_path, b"precious bytes").unwrap();

    let mut questions = two_mcqs();
    let err = assemble(&mut questions, &options).unwrap_err();
    match err {
        ExportError::AlreadyExists(path) => assert_eq!(path, options.zip_path),
        other => panic!("unexpected error: {:?}", other),
    }
    // Nothing was touched: not the zip, and no working directory appeared.
    assert_eq!(fs::read(&options.zip_path).unwrap(), b"precious bytes");
    assert!(!options.work_dir.exists());
}

#[test]
fn existing_work_dirs_are_not_overwritten_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(dir.path());
    fs::create_dir_all(&options.work_dir).unwrap();

    let mut questions = two_mcqs();
    let err = assemble(&mut questions, &options).unwrap_err();
    match err {
        ExportError::AlreadyExists(path) => assert_eq!(path, options.work_dir),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!options.zip_path.exists());
}

#[test]
fn overwrite_replaces_existing_targets() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options_for(dir.path());
    options.overwrite = true;
    fs::write(&options.zip_path, b"old").unwrap();
    fs::create_dir_all(options.work_dir.join("stale")).unwrap();

    let mut questions = two_mcqs();
    assemble(&mut questions, &options).unwrap();
    assert_eq!(zip_names(&options.zip_path).len(), 2);
}

#[test]
fn missing_media_aborts_and_leaves_the_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(dir.path());
    let mut questions = vec![Question::file_upload(
        "See <img src=\"does_not_exist.png\"> above.",
    )];

    let err = assemble(&mut questions, &options).unwrap_err();
    match err {
        ExportError::MediaMissing(path) => {
            assert_eq!(path, PathBuf::from("does_not_exist.png"))
        },
        other => panic!("unexpected error: {:?}", other),
    }
    // No zip was created, and the partial working directory survives for
    // inspection.
    assert!(!options.zip_path.exists());
    assert!(options.work_dir.exists());
}

#[test]
fn empty_pools_are_rejected_before_any_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(dir.path());
    let mut questions: Vec<Question> = Vec::new();

    let err = assemble(&mut questions, &options).unwrap_err();
    match err {
        ExportError::EmptyPool => {},
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!options.zip_path.exists());
    assert!(!options.work_dir.exists());
}

#[test]
fn variant_numbers_can_be_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options_for(dir.path());
    options.make_variant_numbers = false;
    let mut questions = two_mcqs();
    questions[0].variant_number = 41;
    assemble(&mut questions, &options).unwrap();
    assert_eq!(questions[0].variant_number, 41);
    assert_eq!(questions[1].variant_number, 0);
}


fn find_assessment(work_dir: &Path) -> PathBuf {
    for entry in fs::read_dir(work_dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() && path.file_name().unwrap() != "Uploaded Media" {
            let ident = path.file_name().unwrap().to_string_lossy().into_owned();
            return path.join(format!("{}.xml", ident));
        }
    }
    panic!("no assessment directory under {}", work_dir.display());
}
