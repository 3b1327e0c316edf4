/**
 * Quill: author quiz questions and export them as LMS interchange packages.
 *
 * The two export surfaces are a tab-delimited import file (`tabfile`) and a
 * QTI 1.2 assessment package (`qti` + `manifest` + `package`). Questions are
 * kept in JSON pool files (`persistence`) and carry a constrained HTML
 * subset in their text, which `markup` can lower to LaTeX.
 */
#[macro_use]
pub mod iohelper;

pub mod common;
pub mod ident;
pub mod manifest;
pub mod markup;
pub mod package;
pub mod persistence;
pub mod qti;
pub mod quiz;
pub mod shuffle;
pub mod tabfile;
pub mod xmltree;
