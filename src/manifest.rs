/**
 * Construction of the IMS content-package manifest that accompanies the
 * assessment XML inside the zip.
 *
 * The manifest starts from a fixed skeleton; the resource list is rebuilt from
 * scratch on every call, with one entry for the assessment file and one per media
 * file. Equal inputs give content-equivalent manifests, not byte-equivalent ones,
 * because resource identifiers are random.
 */
use chrono::Utc;

use super::common::{ExportError, Result};
use super::ident;
use super::xmltree::Element;


const MANIFEST_SKELETON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="g4f1b6c8d27a94be7b6f2e01d3c5a8f90" xmlns="http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1" xmlns:lom="http://ltsc.ieee.org/xsd/imsccv1p1/LOM/resource" xmlns:imsmd="http://www.imsglobal.org/xsd/imsmd_v1p2" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1 http://www.imsglobal.org/xsd/imscp_v1p1.xsd http://ltsc.ieee.org/xsd/imsccv1p1/LOM/resource http://www.imsglobal.org/profile/cc/ccv1p1/LOM/ccv1p1_lomresource_v1p0.xsd http://www.imsglobal.org/xsd/imsmd_v1p2 http://www.imsglobal.org/xsd/imsmd_v1p2p2.xsd">
  <metadata>
    <schema>IMS Content</schema>
    <schemaversion>1.1.3</schemaversion>
    <imsmd:lom>
      <imsmd:general>
        <imsmd:title>
          <imsmd:string>QTI quiz export</imsmd:string>
        </imsmd:title>
      </imsmd:general>
      <imsmd:lifeCycle>
        <imsmd:contribute>
          <imsmd:date>
            <imsmd:dateTime>1970-01-01</imsmd:dateTime>
          </imsmd:date>
        </imsmd:contribute>
      </imsmd:lifeCycle>
      <imsmd:rights>
        <imsmd:copyrightAndOtherRestrictions>
          <imsmd:value>yes</imsmd:value>
        </imsmd:copyrightAndOtherRestrictions>
        <imsmd:description>
          <imsmd:string>Private (Copyrighted) - http://en.wikipedia.org/wiki/Copyright</imsmd:string>
        </imsmd:description>
      </imsmd:rights>
    </imsmd:lom>
  </metadata>
  <organizations/>
  <resources>
    <resource identifier="g93d07e55c16a4b2da2f4f5b7e8c9d0a1" type="imsqti_xmlv1p2">
      <file href="g93d07e55c16a4b2da2f4f5b7e8c9d0a1/g93d07e55c16a4b2da2f4f5b7e8c9d0a1.xml"/>
    </resource>
  </resources>
</manifest>
"#;


/// Build the manifest document for an assessment and its media files.
/// `media_files` holds basenames, as copied into the package's media folder.
pub fn build_manifest(assessment_ident: &str, media_files: &[String]) -> Result<Element> {
    let mut manifest = Element::parse(MANIFEST_SKELETON)?;
    manifest.set_attr("identifier", &ident::item_ident());
    if let Some(date) = manifest.find_mut("imsmd:dateTime") {
        date.set_text(&Utc::now().format("%Y-%m-%d").to_string());
    }

    let resource_template = manifest
        .find("resource")
        .cloned()
        .ok_or(ExportError::TemplateMissing("resource"))?;
    let resources = manifest
        .find_mut("resources")
        .ok_or(ExportError::TemplateMissing("resources"))?;
    resources.children.clear();

    resources.push(assessment_resource(&resource_template, assessment_ident));
    for media in media_files.iter() {
        resources.push(media_resource(&resource_template, media));
    }
    Ok(manifest)
}

/// The resource entry for the assessment XML file itself.
fn assessment_resource(template: &Element, assessment_ident: &str) -> Element {
    let mut resource = template.clone();
    resource.set_attr("identifier", assessment_ident);
    resource.set_attr("type", "imsqti_xmlv1p2");
    if let Some(file) = resource.find_mut("file") {
        file.set_attr(
            "href",
            &format!("{}/{}.xml", assessment_ident, assessment_ident),
        );
    }
    resource
}

/// The resource entry for one uploaded media file, with a fresh identifier.
fn media_resource(template: &Element, filename: &str) -> Element {
    let mut resource = template.clone();
    let href = format!("Uploaded Media/{}", filename);
    resource.set_attr("identifier", &ident::item_ident());
    resource.set_attr("type", "webcontent");
    resource.set_attr("href", &href);
    if let Some(file) = resource.find_mut("file") {
        file.set_attr("href", &href);
    }
    resource
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_references_the_assessment_file() {
        let manifest = build_manifest("gdeadbeef", &[]).unwrap();
        let resources = manifest.find("resources").unwrap();
        let entries: Vec<&Element> = resources.elements().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attr("identifier"), Some("gdeadbeef"));
        assert_eq!(entries[0].attr("type"), Some("imsqti_xmlv1p2"));
        assert_eq!(
            entries[0].find("file").unwrap().attr("href"),
            Some("gdeadbeef/gdeadbeef.xml")
        );
    }

    #[test]
    fn media_files_get_webcontent_entries() {
        let media = vec![String::from("df.png"), String::from("phase.jpg")];
        let manifest = build_manifest("gdeadbeef", &media).unwrap();
        let resources = manifest.find("resources").unwrap();
        let entries: Vec<&Element> = resources.elements().collect();
        assert_eq!(entries.len(), 3);

        for (entry, name) in entries[1..].iter().zip(media.iter()) {
            let href = format!("Uploaded Media/{}", name);
            assert_eq!(entry.attr("type"), Some("webcontent"));
            assert_eq!(entry.attr("href"), Some(href.as_str()));
            assert_eq!(entry.find("file").unwrap().attr("href"), Some(href.as_str()));
            let ident = entry.attr("identifier").unwrap();
            assert!(ident.starts_with('g'));
            assert_ne!(ident, "gdeadbeef");
        }
    }

    #[test]
    fn manifest_carries_todays_date() {
        let manifest = build_manifest("gdeadbeef", &[]).unwrap();
        let date = manifest.find("imsmd:dateTime").unwrap().text();
        assert_eq!(date, Utc::now().format("%Y-%m-%d").to_string());
    }
}
