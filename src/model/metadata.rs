//! Document metadata: information dictionary and XMP packet.
//!
//! Both sources are read when present. When they disagree, XMP wins; it
//! is the more structured and later-introduced source.

use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Merged document metadata.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Primary natural language (catalog /Lang or XMP dc:language).
    pub language: Option<String>,
    /// Whether /ViewerPreferences requests the title in the window bar.
    pub display_doc_title: bool,
    /// Raw information-dictionary entries, in document order.
    pub info: IndexMap<String, String>,
    /// Whether an XMP metadata stream was found.
    pub xmp_present: bool,
}

impl Metadata {
    /// Non-empty title, if declared.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Non-empty language tag, if declared.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Overlay XMP fields onto fields already read from the info
    /// dictionary. XMP takes precedence where both are present.
    pub fn apply_xmp(&mut self, xmp: XmpFields) {
        self.xmp_present = true;
        if let Some(title) = xmp.title.filter(|t| !t.trim().is_empty()) {
            self.title = Some(title);
        }
        if let Some(author) = xmp.creator.filter(|a| !a.trim().is_empty()) {
            self.author = Some(author);
        }
        if let Some(lang) = xmp.language.filter(|l| !l.trim().is_empty()) {
            self.language = Some(lang);
        }
    }
}

/// Fields extracted from an XMP packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmpFields {
    /// dc:title
    pub title: Option<String>,
    /// dc:creator
    pub creator: Option<String>,
    /// dc:language
    pub language: Option<String>,
}

/// Parse the fields we care about out of an XMP packet.
///
/// XMP is RDF/XML; the values live in `rdf:li` items under the
/// `dc:title`, `dc:creator` and `dc:language` elements. Malformed XML
/// yields whatever was read up to the error, never a failure: metadata
/// extraction is best effort.
pub fn parse_xmp(bytes: &[u8]) -> XmpFields {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    #[derive(PartialEq, Clone, Copy)]
    enum Field {
        None,
        Title,
        Creator,
        Language,
    }

    let mut fields = XmpFields::default();
    let mut current = Field::None;
    let mut depth_into_field = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let local = e.local_name().as_ref().to_vec();
                if current == Field::None {
                    current = match local.as_slice() {
                        b"title" => Field::Title,
                        b"creator" => Field::Creator,
                        b"language" => Field::Language,
                        _ => Field::None,
                    };
                    depth_into_field = 0;
                } else {
                    depth_into_field += 1;
                }
            }
            Ok(Event::End(_)) => {
                if current != Field::None {
                    if depth_into_field == 0 {
                        current = Field::None;
                    } else {
                        depth_into_field -= 1;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if current != Field::None {
                    let text = t.unescape().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        let slot = match current {
                            Field::Title => &mut fields.title,
                            Field::Creator => &mut fields.creator,
                            Field::Language => &mut fields.language,
                            Field::None => unreachable!(),
                        };
                        if slot.is_none() {
                            *slot = Some(text);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("malformed XMP metadata: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    fields
}

/// Decode a PDF text string: UTF-16BE with BOM, or PDFDocEncoding
/// (approximated as Latin-1 for the printable range).
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
