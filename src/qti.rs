/**
 * Construction of the QTI 1.2 assessment document.
 *
 * Item fragments are never built field by field. A seed document containing one
 * well-formed item of each supported kind is parsed once per export; the items are
 * pulled out as templates and every question is instantiated by deep-copying a
 * template and rewriting its identifiers, title, text and point value. Anything
 * the interchange schema requires but Quill never touches survives the copy
 * untouched, which is what keeps the output parseable by the consuming LMS.
 */
use std::path::Path;

use regex::Regex;

use super::common::{ExportError, Result};
use super::ident;
use super::quiz::{Question, QuestionKind};
use super::shuffle;
use super::xmltree::Element;


/// The built-in seed document. One multiple-choice item, one file-upload item.
const SEED_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<questestinterop xmlns="http://www.imsglobal.org/xsd/ims_qtiasiv1p2" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.imsglobal.org/xsd/ims_qtiasiv1p2 http://www.imsglobal.org/xsd/ims_qtiasiv1p2p1.xsd">
  <assessment ident="g818fa26c05b44ed2943692bf4d4a9e81" title="Seed pool">
    <qtimetadata>
      <qtimetadatafield>
        <fieldlabel>cc_maxattempts</fieldlabel>
        <fieldentry>1</fieldentry>
      </qtimetadatafield>
    </qtimetadata>
    <section ident="root_section">
      <item ident="g2c61e46ab7144bd0895df4ac16b17f6e" title="Sample multiple choice">
        <itemmetadata>
          <qtimetadata>
            <qtimetadatafield>
              <fieldlabel>question_type</fieldlabel>
              <fieldentry>multiple_choice_question</fieldentry>
            </qtimetadatafield>
            <qtimetadatafield>
              <fieldlabel>points_possible</fieldlabel>
              <fieldentry>1.0</fieldentry>
            </qtimetadatafield>
            <qtimetadatafield>
              <fieldlabel>original_answer_ids</fieldlabel>
              <fieldentry>5204,8137,2946,6621</fieldentry>
            </qtimetadatafield>
            <qtimetadatafield>
              <fieldlabel>assessment_question_identifierref</fieldlabel>
              <fieldentry>g7be126b8a34e4a2f8df41a0e08c29d05</fieldentry>
            </qtimetadatafield>
          </qtimetadata>
        </itemmetadata>
        <presentation>
          <material>
            <mattext texttype="text/html">&lt;div&gt;&lt;p&gt;Pick the correct answer&lt;/p&gt;&lt;/div&gt;</mattext>
          </material>
          <response_lid ident="response1" rcardinality="Single">
            <render_choice>
              <response_label ident="5204">
                <material>
                  <mattext texttype="text/plain">the correct answer</mattext>
                </material>
              </response_label>
              <response_label ident="8137">
                <material>
                  <mattext texttype="text/plain">a wrong answer</mattext>
                </material>
              </response_label>
              <response_label ident="2946">
                <material>
                  <mattext texttype="text/plain">another wrong answer</mattext>
                </material>
              </response_label>
              <response_label ident="6621">
                <material>
                  <mattext texttype="text/plain">a third wrong answer</mattext>
                </material>
              </response_label>
            </render_choice>
          </response_lid>
        </presentation>
        <resprocessing>
          <outcomes>
            <decvar maxvalue="100" minvalue="0" varname="SCORE" vartype="Decimal"/>
          </outcomes>
          <respcondition continue="No">
            <conditionvar>
              <varequal respident="response1">5204</varequal>
            </conditionvar>
            <setvar action="Set" varname="SCORE">100</setvar>
          </respcondition>
        </resprocessing>
      </item>
      <item ident="gd95c2f0e7f2a46b584babd6b4a6e9c10" title="Sample file upload">
        <itemmetadata>
          <qtimetadata>
            <qtimetadatafield>
              <fieldlabel>question_type</fieldlabel>
              <fieldentry>file_upload_question</fieldentry>
            </qtimetadatafield>
            <qtimetadatafield>
              <fieldlabel>points_possible</fieldlabel>
              <fieldentry>1.0</fieldentry>
            </qtimetadatafield>
            <qtimetadatafield>
              <fieldlabel>original_answer_ids</fieldlabel>
              <fieldentry></fieldentry>
            </qtimetadatafield>
            <qtimetadatafield>
              <fieldlabel>assessment_question_identifierref</fieldlabel>
              <fieldentry>g0f6e8a24cd8944ec92e0c1f03a92c97b</fieldentry>
            </qtimetadatafield>
          </qtimetadata>
        </itemmetadata>
        <presentation>
          <material>
            <mattext texttype="text/html">&lt;div&gt;&lt;p&gt;Upload your solution&lt;/p&gt;&lt;/div&gt;</mattext>
          </material>
        </presentation>
        <resprocessing>
          <outcomes>
            <decvar maxvalue="100" minvalue="0" varname="SCORE" vartype="Decimal"/>
          </outcomes>
        </resprocessing>
      </item>
    </section>
  </assessment>
</questestinterop>
"#;


/// The templates and empty assessment shell for one export, extracted once from a
/// seed document and threaded explicitly through the pipeline.
#[derive(Debug)]
pub struct ExportSession {
    shell: Element,
    upload_template: Element,
    mcq_template: Element,
    option_template: Element,
}


impl ExportSession {
    /// Build a session from the built-in seed document.
    pub fn new(title: &str, assessment_ident: &str) -> Result<ExportSession> {
        ExportSession::from_seed(SEED_DOCUMENT, title, assessment_ident)
    }

    /// Build a session from an arbitrary seed document. The seed must contain at
    /// least one item of each supported kind; the first item of each kind becomes
    /// that kind's template and later duplicates are ignored.
    pub fn from_seed(seed: &str, title: &str, assessment_ident: &str) -> Result<ExportSession> {
        let mut shell = Element::parse(seed)?;

        let mut upload_template = None;
        let mut mcq_template = None;
        for item in shell.find_all("item") {
            match item_question_type(item).as_deref() {
                Some("file_upload_question") if upload_template.is_none() => {
                    upload_template = Some(item.clone());
                },
                Some("multiple_choice_question") if mcq_template.is_none() => {
                    mcq_template = Some(item.clone());
                },
                _ => {},
            }
        }
        let upload_template =
            upload_template.ok_or(ExportError::TemplateMissing("file_upload_question"))?;
        let mcq_template =
            mcq_template.ok_or(ExportError::TemplateMissing("multiple_choice_question"))?;
        let option_template = mcq_template
            .find("response_label")
            .cloned()
            .ok_or(ExportError::TemplateMissing("response_label"))?;
        if mcq_template.find("varequal").is_none() {
            return Err(ExportError::TemplateMissing("varequal"));
        }

        // What remains becomes the empty shell, ready for new items.
        let section = shell
            .find_mut("section")
            .ok_or(ExportError::TemplateMissing("section"))?;
        section.remove_children("item");
        let assessment = shell
            .find_mut("assessment")
            .ok_or(ExportError::TemplateMissing("assessment"))?;
        assessment.set_attr("title", title);
        assessment.set_attr("ident", assessment_ident);

        Ok(ExportSession { shell, upload_template, mcq_template, option_template })
    }

    /// Start an empty assessment document from the shell.
    pub fn new_document(&self) -> AssessmentDocument {
        let root = self.shell.clone();
        let ident = root
            .find("assessment")
            .and_then(|a| a.attr("ident"))
            .map(String::from)
            .unwrap_or_default();
        AssessmentDocument { ident, root }
    }

    /// Instantiate an item fragment for `question`, with its text and options
    /// prepared for QTI consumption.
    pub fn item(&self, question: &Question) -> Element {
        match question.kind {
            QuestionKind::FileUpload => self.upload_item(
                &qti_text(&question.export_text()),
                question.points,
                &question.title(),
                None,
                None,
            ),
            QuestionKind::MultipleChoice => {
                let wrong_answers: Vec<String> =
                    question.wrong_answers.iter().map(|w| qti_text(w)).collect();
                self.mcq_item(
                    &qti_text(&question.export_text()),
                    question.points,
                    &question.title(),
                    &qti_text(&question.answer),
                    &wrong_answers,
                    true,
                    true,
                    question.shuffle_seed,
                    None,
                    None,
                )
            },
        }
    }

    /// Instantiate a file-upload item. `item_ident` and `xref` are generated
    /// unless supplied.
    pub fn upload_item(
        &self,
        text: &str,
        points: f64,
        title: &str,
        item_ident: Option<String>,
        xref: Option<String>,
    ) -> Element {
        let mut item = self.upload_template.clone();
        rewrite_common(&mut item, text, points, title, item_ident, xref);
        item
    }

    /// Instantiate a multiple-choice item: arrange the options, give each a
    /// locally-unique response identifier, and point the scoring rule at the slot
    /// holding the correct answer.
    pub fn mcq_item(
        &self,
        text: &str,
        points: f64,
        title: &str,
        answer: &str,
        wrong_answers: &[String],
        none_of_the_others: bool,
        shuffle_answers: bool,
        seed: u64,
        item_ident: Option<String>,
        xref: Option<String>,
    ) -> Element {
        let mut item = self.mcq_template.clone();
        rewrite_common(&mut item, text, points, title, item_ident, xref);

        let arrangement =
            shuffle::arrange(answer, wrong_answers, none_of_the_others, shuffle_answers, seed);
        // One identifier per candidate, in candidate order: the correct answer's
        // identifier is always the first.
        let answer_ids = ident::option_idents(arrangement.ordering.len());
        set_metadata_field(&mut item, "original_answer_ids", &answer_ids.join(","));

        if let Some(render_choice) = item.find_mut("render_choice") {
            render_choice.remove_children("response_label");
        }
        for (slot, &original) in arrangement.ordering.iter().enumerate() {
            let mut option = self.option_template.clone();
            option.set_attr("ident", &answer_ids[original]);
            if let Some(mattext) = option.find_mut("mattext") {
                mattext.set_text(&arrangement.answers[slot]);
            }
            if let Some(render_choice) = item.find_mut("render_choice") {
                render_choice.push(option);
            }
        }

        if let Some(varequal) = item.find_mut("varequal") {
            varequal.set_text(&answer_ids[0]);
        }
        item
    }
}


/// An in-memory assessment document being filled with item fragments.
pub struct AssessmentDocument {
    ident: String,
    root: Element,
}

impl AssessmentDocument {
    /// The assessment identifier, which also names the package subdirectory and
    /// the inner XML file.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn push_item(&mut self, item: Element) {
        if let Some(section) = self.root.find_mut("section") {
            section.push(item);
        }
    }

    pub fn item_count(&self) -> usize {
        self.root.find_all("item").len()
    }

    pub fn to_xml(&self) -> Result<String> {
        self.root.to_xml(true)
    }
}


/// Rewrite the fields common to every item kind: title, item identifier, question
/// text, scoring cross-reference identifier and point value.
fn rewrite_common(
    item: &mut Element,
    text: &str,
    points: f64,
    title: &str,
    item_ident: Option<String>,
    xref: Option<String>,
) {
    item.set_attr("title", title);
    let item_ident = item_ident.unwrap_or_else(ident::item_ident);
    item.set_attr("ident", &item_ident);
    // The first mattext in document order is the question text.
    if let Some(mattext) = item.find_mut("mattext") {
        mattext.set_text(text);
    }
    let xref = xref.unwrap_or_else(ident::item_ident);
    set_metadata_field(item, "assessment_question_identifierref", &xref);
    set_metadata_field(item, "points_possible", &format!("{}", points));
}

/// Set the entry of the metadata field labelled `label`, wherever it appears in
/// the item.
fn set_metadata_field(item: &mut Element, label: &str, value: &str) {
    for field in item.find_all_mut("qtimetadatafield") {
        let matches = field
            .find("fieldlabel")
            .map(|l| l.text() == label)
            .unwrap_or(false);
        if matches {
            if let Some(entry) = field.find_mut("fieldentry") {
                entry.set_text(value);
            }
        }
    }
}

/// Read an item's `question_type` metadata entry.
fn item_question_type(item: &Element) -> Option<String> {
    for field in item.find_all("qtimetadatafield") {
        let matches = field
            .find("fieldlabel")
            .map(|l| l.text() == "question_type")
            .unwrap_or(false);
        if matches {
            return field.find("fieldentry").map(|e| e.text());
        }
    }
    None
}

/// Prepare a question or answer string for the assessment XML: turn `$...$` into
/// MathJax delimiters and point image references at the package's media folder.
pub fn qti_text(s: &str) -> String {
    let math = Regex::new(r"\$(.*?)\$").unwrap();
    let mut text = math.replace_all(s, r"\(${1}\)").into_owned();
    for reference in super::markup::image_refs(&text) {
        let basename = Path::new(&reference)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| reference.clone());
        text = text.replace(
            &reference,
            &format!("$IMS-CC-FILEBASE$/Uploaded%20Media/{}", basename),
        );
    }
    text
}
