//! Path file format
//!
//! A path file is one flat XML record:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <Path Data="M 0,0 L 10,10" StrokeThickness="1" Stroke="Black" Fill="Transparent"/>
//! ```
//!
//! Only the first `Path` element is read. Missing style attributes fall
//! back to [`Style::default`].

use std::fs;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use tracing::debug;

use crate::error::{LoadError, SaveError};
use crate::palette::{Color, parse_color};
use crate::path::{self, Path};

const ELEMENT: &str = "Path";

/// Stroke and fill attributes of the record
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Stroke width in path units (default: 1)
    pub stroke_thickness: f64,
    /// Color name or `#hex` (default: black)
    pub stroke: String,
    /// Color name or `#hex` (default: transparent)
    pub fill: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_thickness: 1.0,
            stroke: "Black".to_string(),
            fill: "Transparent".to_string(),
        }
    }
}

impl Style {
    /// Resolved stroke color; unknown names draw black
    pub fn stroke_color(&self) -> Color {
        parse_color(&self.stroke).unwrap_or(Color::BLACK)
    }

    /// Resolved fill color; unknown names draw nothing
    pub fn fill_color(&self) -> Color {
        parse_color(&self.fill).unwrap_or(Color::TRANSPARENT)
    }
}

/// Raw path text plus its style, as stored on disk
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathDocument {
    pub data: String,
    pub style: Style,
}

impl PathDocument {
    pub fn new(data: impl Into<String>, style: Style) -> Self {
        Self {
            data: data.into(),
            style,
        }
    }

    /// Read the record from XML text. The path data is not parsed here.
    pub fn from_xml(xml: &str) -> Result<Self, LoadError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == ELEMENT.as_bytes() {
                        return Self::from_element(e);
                    }
                }
                Ok(Event::Eof) => return Err(LoadError::MissingElement),
                Err(e) => return Err(LoadError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }
    }

    fn from_element(e: &BytesStart) -> Result<Self, LoadError> {
        let mut data = None;
        let mut style = Style::default();

        for attr in e.attributes() {
            let attr = attr.map_err(|e| LoadError::Xml(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| LoadError::Xml(e.to_string()))?;
            let raw = std::str::from_utf8(&attr.value).map_err(|e| LoadError::Xml(e.to_string()))?;
            let value = unescape(raw)
                .map_err(|e| LoadError::Xml(e.to_string()))?
                .into_owned();

            match key {
                "Data" => data = Some(value),
                "StrokeThickness" => {
                    style.stroke_thickness = value
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|t| t.is_finite() && *t >= 0.0)
                        .ok_or(LoadError::InvalidThickness(value))?;
                }
                "Stroke" => style.stroke = value,
                "Fill" => style.fill = value,
                _ => {}
            }
        }

        let data = data.ok_or(LoadError::MissingData)?;
        Ok(Self { data, style })
    }

    /// Write the record as XML: a declaration and one self-closed element.
    pub fn to_xml(&self) -> Result<String, SaveError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| SaveError::Xml(e.to_string()))?;

        let thickness = self.style.stroke_thickness.to_string();
        let mut elem = BytesStart::new(ELEMENT);
        elem.push_attribute(("Data", self.data.as_str()));
        elem.push_attribute(("StrokeThickness", thickness.as_str()));
        elem.push_attribute(("Stroke", self.style.stroke.as_str()));
        elem.push_attribute(("Fill", self.style.fill.as_str()));
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| SaveError::Xml(e.to_string()))?;

        let mut xml =
            String::from_utf8(writer.into_inner()).map_err(|e| SaveError::Xml(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }

    pub fn load<P: AsRef<std::path::Path>>(file: P) -> Result<Self, LoadError> {
        let file = file.as_ref();
        let xml = fs::read_to_string(file).map_err(|source| LoadError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let doc = Self::from_xml(&xml)?;
        debug!(file = %file.display(), data = %doc.data, "loaded path document");
        Ok(doc)
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, file: P) -> Result<(), SaveError> {
        let file = file.as_ref();
        let xml = self.to_xml()?;
        fs::write(file, xml).map_err(|source| SaveError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        debug!(file = %file.display(), "saved path document");
        Ok(())
    }

    /// Parse the stored path data
    pub fn geometry(&self) -> Result<Path, LoadError> {
        Ok(path::parse(&self.data)?)
    }
}

/// Load a path file and parse its geometry.
pub fn load_file<P: AsRef<std::path::Path>>(file: P) -> Result<(Path, Style), LoadError> {
    let doc = PathDocument::load(file)?;
    let geometry = doc.geometry()?;
    Ok((geometry, doc.style))
}

/// Serialize `path` and write it with `style` to a path file.
pub fn save_file<P: AsRef<std::path::Path>>(
    file: P,
    path: &Path,
    style: &Style,
) -> Result<(), SaveError> {
    PathDocument::new(path::serialize(path), style.clone()).save(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_xml_all_attributes() {
        let xml = r##"<?xml version="1.0"?>
<Path Data="M 0,0 L 10,10" StrokeThickness="2.5" Stroke="Red" Fill="#ff00ff00"/>"##;
        let doc = PathDocument::from_xml(xml).unwrap();
        assert_eq!(doc.data, "M 0,0 L 10,10");
        assert_eq!(doc.style.stroke_thickness, 2.5);
        assert_eq!(doc.style.stroke, "Red");
        assert_eq!(doc.style.fill_color(), Color::from_argb(0xFF00FF00));
    }

    #[test]
    fn test_from_xml_defaults() {
        let doc = PathDocument::from_xml(r#"<Path Data="M1,1 L2,2"></Path>"#).unwrap();
        assert_eq!(doc.style, Style::default());
        assert_eq!(doc.style.stroke_color(), Color::BLACK);
        assert!(doc.style.fill_color().is_transparent());
    }

    #[test]
    fn test_from_xml_errors() {
        assert!(matches!(
            PathDocument::from_xml("<Other/>"),
            Err(LoadError::MissingElement)
        ));
        assert!(matches!(
            PathDocument::from_xml(r#"<Path Fill="Red"/>"#),
            Err(LoadError::MissingData)
        ));
        assert!(matches!(
            PathDocument::from_xml(r#"<Path Data="M0,0" StrokeThickness="wide"/>"#),
            Err(LoadError::InvalidThickness(t)) if t == "wide"
        ));
        assert!(matches!(
            PathDocument::from_xml(r#"<Path Data="M0,0" Data="M1,1"/>"#),
            Err(LoadError::Xml(_))
        ));
    }

    #[test]
    fn test_escaped_data() {
        let doc = PathDocument::new("M0,0 L1,1", Style {
            stroke: "a&b".to_string(),
            ..Style::default()
        });
        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("a&amp;b"));
        assert_eq!(PathDocument::from_xml(&xml).unwrap(), doc);
    }

    #[test]
    fn test_to_xml_layout() {
        let xml = PathDocument::new("M0,0 L1,1", Style::default()).to_xml().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(
            r#"<Path Data="M0,0 L1,1" StrokeThickness="1" Stroke="Black" Fill="Transparent"/>"#
        ));
    }

    #[test]
    fn test_geometry_parse_error() {
        let doc = PathDocument::new("M0,0 L", Style::default());
        assert!(matches!(doc.geometry(), Err(LoadError::Parse(_))));
    }
}
