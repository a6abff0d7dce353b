//! Builds the [`DocumentModel`] from the object graph.
//!
//! Construction is best effort: malformed or unresolvable structures are
//! skipped with a recorded [`BuilderWarning`] instead of aborting. Only a
//! document whose catalog cannot be reached at all fails fatally.

use std::collections::{HashMap, HashSet};

use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId};

use crate::error::Result;
use crate::graph::{int_value, name_str, number_value, type_name, ObjectGraph};
use crate::model::content::scan;
use crate::model::metadata::{decode_pdf_string, parse_xmp, Metadata};
use crate::model::structure::{Role, StructureChild, StructureNode, StructureTree};
use crate::model::{
    Annotation, BuilderWarning, DocumentModel, FieldAction, FieldFlags, FieldType, FontInfo,
    FormField, Page, PageLabel, PageLabels,
};

/// Maximum RoleMap indirection hops before the mapping is abandoned.
const ROLE_MAP_HOPS: usize = 8;

/// Transforms an [`ObjectGraph`] into a [`DocumentModel`].
pub struct ModelBuilder<'a> {
    graph: &'a ObjectGraph,
    page_index: HashMap<ObjectId, usize>,
    warnings: Vec<BuilderWarning>,
}

impl<'a> ModelBuilder<'a> {
    /// Create a builder over `graph`.
    pub fn new(graph: &'a ObjectGraph) -> Self {
        Self {
            graph,
            page_index: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Build the model. Fatal only when the catalog is unreachable.
    pub fn build(mut self) -> Result<DocumentModel> {
        let catalog = self.graph.catalog()?;

        let page_ids = self.graph.pages();
        self.page_index = page_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();

        let mut pages = Vec::with_capacity(page_ids.len());
        let mut fonts: Vec<FontInfo> = Vec::new();
        let mut seen_fonts: HashSet<String> = HashSet::new();
        for (idx, id) in page_ids.iter().enumerate() {
            let (page, page_fonts) = self.build_page(idx, *id);
            for font in page_fonts {
                if seen_fonts.insert(font.name.clone()) {
                    fonts.push(font);
                }
            }
            pages.push(page);
        }

        let metadata = self.build_metadata(catalog);
        let structure = self.build_structure(catalog);
        let annotations = self.build_annotations(&page_ids);
        let (has_form, form_fields) = self.build_form(catalog);
        let page_labels = self.build_page_labels(catalog);
        let bookmark_count = self.build_outline(catalog);

        for warning in &self.warnings {
            log::warn!("builder: {}", warning);
        }

        Ok(DocumentModel {
            pages,
            metadata,
            structure,
            annotations,
            form_fields,
            has_form,
            fonts,
            page_labels,
            bookmark_count,
            warnings: self.warnings,
        })
    }

    fn warn(&mut self, warning: BuilderWarning) {
        self.warnings.push(warning);
    }

    // -- small tolerant accessors -------------------------------------

    fn string_of(&self, dict: &Dictionary, key: &[u8]) -> Option<String> {
        match self.graph.dict_get(dict, key)? {
            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
            _ => None,
        }
    }

    fn name_of(&self, dict: &Dictionary, key: &[u8]) -> Option<String> {
        self.graph
            .dict_get(dict, key)
            .and_then(name_str)
            .map(str::to_string)
    }

    fn int_of(&self, dict: &Dictionary, key: &[u8]) -> Option<i64> {
        self.graph.dict_get(dict, key).and_then(int_value)
    }

    fn bool_of(&self, dict: &Dictionary, key: &[u8]) -> Option<bool> {
        match self.graph.dict_get(dict, key)? {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    // -- pages ---------------------------------------------------------

    fn build_page(&mut self, index: usize, id: ObjectId) -> (Page, Vec<FontInfo>) {
        let mut page = Page {
            index,
            ..Default::default()
        };

        let dict = match self.graph.get(id) {
            Ok(Object::Dictionary(d)) => d,
            _ => {
                self.warn(
                    BuilderWarning::new("page object is not a dictionary")
                        .with_context(format!("page {}", index + 1)),
                );
                return (page, Vec::new());
            }
        };

        page.tabs_structure_order = self.name_of(dict, b"Tabs").as_deref() == Some("S");

        let resources = self.inherited_resources(dict);
        let mut properties: HashMap<String, Option<u32>> = HashMap::new();
        let mut xobjects: HashMap<String, bool> = HashMap::new();
        let mut fonts: Vec<FontInfo> = Vec::new();

        if let Some(resources) = resources {
            if let Some(props) = self.graph.dict_get_dict(resources, b"Properties") {
                for (key, value) in props.iter() {
                    let name = String::from_utf8_lossy(key).into_owned();
                    let mcid = match self.graph.resolve(value) {
                        Ok(Object::Dictionary(d)) => self.int_of(d, b"MCID").map(|i| i as u32),
                        _ => None,
                    };
                    properties.insert(name, mcid);
                }
            }
            if let Some(xobjs) = self.graph.dict_get_dict(resources, b"XObject") {
                for (key, value) in xobjs.iter() {
                    let name = String::from_utf8_lossy(key).into_owned();
                    let is_image = match self.graph.resolve(value) {
                        Ok(Object::Stream(s)) => {
                            self.name_of(&s.dict, b"Subtype").as_deref() == Some("Image")
                        }
                        _ => false,
                    };
                    xobjects.insert(name, is_image);
                }
            }
            if let Some(font_dict) = self.graph.dict_get_dict(resources, b"Font") {
                for (_, value) in font_dict.iter() {
                    if let Ok(Object::Dictionary(fd)) = self.graph.resolve(value) {
                        if let Some(info) = self.build_font(fd) {
                            page.font_names.push(info.name.clone());
                            fonts.push(info);
                        }
                    }
                }
            }
        }

        if let Some(bytes) = self.page_content_bytes(dict, index) {
            match Content::decode(&bytes) {
                Ok(content) => page.content = scan(&content, &properties, &xobjects),
                Err(e) => self.warn(
                    BuilderWarning::new(format!("content stream failed to parse: {}", e))
                        .with_context(format!("page {}", index + 1)),
                ),
            }
        }

        (page, fonts)
    }

    /// /Resources with page-tree inheritance (walks /Parent, cycle-safe).
    fn inherited_resources(&self, page_dict: &'a Dictionary) -> Option<&'a Dictionary> {
        let mut current = page_dict;
        let mut visited: HashSet<ObjectId> = HashSet::new();
        loop {
            if let Some(resources) = self.graph.dict_get_dict(current, b"Resources") {
                return Some(resources);
            }
            let parent_id = match current.get(b"Parent").ok()? {
                Object::Reference(id) => *id,
                _ => return None,
            };
            if !visited.insert(parent_id) {
                return None;
            }
            current = match self.graph.get(parent_id).ok()? {
                Object::Dictionary(d) => d,
                _ => return None,
            };
        }
    }

    /// Concatenated decoded bytes of the page's content streams.
    /// Undecodable streams degrade to absent content with a warning.
    fn page_content_bytes(&mut self, page_dict: &Dictionary, index: usize) -> Option<Vec<u8>> {
        let contents = page_dict.get(b"Contents").ok()?;
        let mut parts: Vec<&Object> = Vec::new();
        match contents {
            Object::Array(items) => parts.extend(items.iter()),
            other => parts.push(other),
        }

        let mut bytes = Vec::new();
        for item in parts {
            let chunk: Option<Vec<u8>> = match item {
                Object::Reference(id) => match self.graph.decoded_stream(*id) {
                    Ok(data) => Some(data.to_vec()),
                    Err(e) => {
                        self.warnings.push(
                            BuilderWarning::new(format!("content stream unreadable: {}", e))
                                .with_context(format!("page {}", index + 1)),
                        );
                        None
                    }
                },
                Object::Stream(stream) => stream
                    .decompressed_content()
                    .ok()
                    .or_else(|| Some(stream.content.clone())),
                _ => None,
            };
            if let Some(chunk) = chunk {
                bytes.extend_from_slice(&chunk);
                bytes.push(b'\n');
            }
        }
        if bytes.is_empty() {
            None
        } else {
            Some(bytes)
        }
    }

    fn build_font(&self, font: &Dictionary) -> Option<FontInfo> {
        let name = self
            .name_of(font, b"BaseFont")
            .or_else(|| self.name_of(font, b"Name"))?;
        let subtype = self.name_of(font, b"Subtype");

        let descriptor = self
            .graph
            .dict_get_dict(font, b"FontDescriptor")
            .or_else(|| {
                // Type0 fonts keep the descriptor on the descendant font.
                let descendants = self.graph.dict_get_array(font, b"DescendantFonts")?;
                match self.graph.resolve(descendants.first()?) {
                    Ok(Object::Dictionary(d)) => self.graph.dict_get_dict(d, b"FontDescriptor"),
                    _ => None,
                }
            });
        let embedded = descriptor
            .map(|d| d.has(b"FontFile") || d.has(b"FontFile2") || d.has(b"FontFile3"))
            .unwrap_or(false);

        Some(FontInfo {
            name,
            subtype,
            embedded,
        })
    }

    // -- metadata -------------------------------------------------------

    fn build_metadata(&mut self, catalog: &'a Dictionary) -> Metadata {
        let mut metadata = Metadata::default();

        let trailer = self.graph.trailer();
        if let Some(Object::Dictionary(info)) = self.graph.dict_get(trailer, b"Info") {
            for (key, value) in info.iter() {
                let key = String::from_utf8_lossy(key).into_owned();
                if let Ok(Object::String(bytes, _)) = self.graph.resolve(value) {
                    metadata.info.insert(key, decode_pdf_string(bytes));
                }
            }
            metadata.title = metadata.info.get("Title").cloned();
            metadata.author = metadata.info.get("Author").cloned();
        }

        metadata.language = self.string_of(catalog, b"Lang");
        if let Some(prefs) = self.graph.dict_get_dict(catalog, b"ViewerPreferences") {
            metadata.display_doc_title = self.bool_of(prefs, b"DisplayDocTitle").unwrap_or(false);
        }

        // The XMP stream takes precedence over the info dictionary for
        // fields both declare.
        if let Ok(Object::Reference(id)) = catalog.get(b"Metadata") {
            match self.graph.decoded_stream(*id) {
                Ok(bytes) => metadata.apply_xmp(parse_xmp(&bytes)),
                Err(e) => self.warn(
                    BuilderWarning::new(format!("XMP metadata stream unreadable: {}", e))
                        .with_context("catalog /Metadata"),
                ),
            }
        }

        metadata
    }

    // -- structure tree -------------------------------------------------

    fn build_structure(&mut self, catalog: &'a Dictionary) -> StructureTree {
        let mut tree = StructureTree::default();

        // Absent structure tree is a fact about the document, not a build
        // error; techniques decide what it means.
        let root = match self.graph.dict_get_dict(catalog, b"StructTreeRoot") {
            Some(d) => d,
            None => return tree,
        };

        if let Some(role_map) = self.graph.dict_get_dict(root, b"RoleMap") {
            for (key, value) in role_map.iter() {
                if let Some(target) = name_str(value) {
                    tree.role_map
                        .insert(String::from_utf8_lossy(key).into_owned(), target.to_string());
                }
            }
        }

        let role_map = tree.role_map.clone();
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut referenced: HashSet<ObjectId> = HashSet::new();
        if let Ok(k) = root.get(b"K") {
            let children =
                self.build_struct_children(k, None, &role_map, &mut visited, &mut referenced);
            for child in children {
                match child {
                    StructureChild::Node(node) => tree.roots.push(*node),
                    // Content items cannot be direct children of the root.
                    _ => self.warn(BuilderWarning::new(
                        "content item directly under StructTreeRoot",
                    )),
                }
            }
        }
        tree.referenced_annotations = referenced;

        tree
    }

    /// Interpret a /K value (single child or array of children).
    fn build_struct_children<'b>(
        &mut self,
        k: &'b Object,
        inherited_page: Option<usize>,
        role_map: &HashMap<String, String>,
        visited: &mut HashSet<ObjectId>,
        referenced: &mut HashSet<ObjectId>,
    ) -> Vec<StructureChild>
    where
        'a: 'b,
    {
        let resolved = match self.resolve_struct_object(k, visited) {
            Some(obj) => obj,
            None => return Vec::new(),
        };
        match resolved {
            Object::Array(items) => items
                .iter()
                .filter_map(|item| {
                    self.build_struct_child(item, inherited_page, role_map, visited, referenced)
                })
                .collect(),
            other => self
                .build_struct_child(other, inherited_page, role_map, visited, referenced)
                .into_iter()
                .collect(),
        }
    }

    fn build_struct_child<'b>(
        &mut self,
        obj: &'b Object,
        inherited_page: Option<usize>,
        role_map: &HashMap<String, String>,
        visited: &mut HashSet<ObjectId>,
        referenced: &mut HashSet<ObjectId>,
    ) -> Option<StructureChild>
    where
        'a: 'b,
    {
        let resolved = self.resolve_struct_object(obj, visited)?;

        match resolved {
            Object::Integer(mcid) if *mcid >= 0 => Some(StructureChild::ContentItem {
                page: inherited_page,
                mcid: *mcid as u32,
            }),
            Object::Dictionary(dict) => match self.name_of(dict, b"Type").as_deref() {
                Some("MCR") => {
                    let page = self.page_of(dict).or(inherited_page);
                    let mcid = self.int_of(dict, b"MCID")?;
                    Some(StructureChild::ContentItem {
                        page,
                        mcid: mcid as u32,
                    })
                }
                Some("OBJR") => {
                    if let Ok(Object::Reference(id)) = dict.get(b"Obj") {
                        referenced.insert(*id);
                        Some(StructureChild::AnnotationRef(*id))
                    } else {
                        self.warn(BuilderWarning::new("OBJR without /Obj reference"));
                        None
                    }
                }
                _ => self
                    .build_struct_elem(dict, inherited_page, role_map, visited, referenced)
                    .map(|node| StructureChild::Node(Box::new(node))),
            },
            other => {
                self.warn(BuilderWarning::new(format!(
                    "unexpected {} among structure children",
                    type_name(other)
                )));
                None
            }
        }
    }

    fn build_struct_elem<'b>(
        &mut self,
        dict: &'b Dictionary,
        inherited_page: Option<usize>,
        role_map: &HashMap<String, String>,
        visited: &mut HashSet<ObjectId>,
        referenced: &mut HashSet<ObjectId>,
    ) -> Option<StructureNode>
    where
        'a: 'b,
    {
        let raw_role = match self.name_of(dict, b"S") {
            Some(name) => name,
            None => {
                self.warn(BuilderWarning::new("structure element without /S role"));
                return None;
            }
        };

        let mut node = StructureNode::new(Role::from_name(&resolve_role(&raw_role, role_map)));
        node.raw_role = raw_role;
        node.page = self.page_of(dict).or(inherited_page);
        node.alt = self.string_of(dict, b"Alt");
        node.actual_text = self.string_of(dict, b"ActualText");
        node.lang = self.string_of(dict, b"Lang");
        self.read_attributes(dict, &mut node);

        if let Ok(k) = dict.get(b"K") {
            node.children = self.build_struct_children(k, node.page, role_map, visited, referenced);
        }

        Some(node)
    }

    /// Table-related attributes from /A (a dict, or an array of dicts
    /// interleaved with revision numbers).
    fn read_attributes(&self, dict: &Dictionary, node: &mut StructureNode) {
        let attr = match self.graph.dict_get(dict, b"A") {
            Some(a) => a,
            None => return,
        };
        let mut dicts: Vec<&Dictionary> = Vec::new();
        match attr {
            Object::Dictionary(d) => dicts.push(d),
            Object::Array(items) => {
                for item in items {
                    if let Ok(Object::Dictionary(d)) = self.graph.resolve(item) {
                        dicts.push(d);
                    }
                }
            }
            _ => {}
        }
        for d in dicts {
            if node.scope.is_none() {
                node.scope = self.name_of(d, b"Scope");
            }
            if node.headers.is_empty() {
                if let Some(headers) = self.graph.dict_get_array(d, b"Headers") {
                    node.headers = headers
                        .iter()
                        .filter_map(|h| match h {
                            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
                            Object::Name(bytes) => {
                                Some(String::from_utf8_lossy(bytes).into_owned())
                            }
                            _ => None,
                        })
                        .collect();
                }
            }
        }
    }

    /// Page index referenced by a /Pg entry, if present.
    fn page_of(&self, dict: &Dictionary) -> Option<usize> {
        match dict.get(b"Pg").ok()? {
            Object::Reference(id) => self.page_index.get(id).copied(),
            _ => None,
        }
    }

    /// Resolve a potential reference inside the structure tree, recording
    /// warnings for broken targets and cycles instead of failing.
    fn resolve_struct_object<'b>(
        &mut self,
        obj: &'b Object,
        visited: &mut HashSet<ObjectId>,
    ) -> Option<&'b Object>
    where
        'a: 'b,
    {
        let graph = self.graph;
        let mut current = obj;
        while let Object::Reference(id) = current {
            if !visited.insert(*id) {
                self.warn(BuilderWarning::new(format!(
                    "cycle in structure tree at object {} {} R",
                    id.0, id.1
                )));
                return None;
            }
            match graph.get(*id) {
                Ok(next) => current = next,
                Err(e) => {
                    self.warn(BuilderWarning::new(format!(
                        "unresolvable structure element: {}",
                        e
                    )));
                    return None;
                }
            }
        }
        Some(current)
    }

    // -- annotations ----------------------------------------------------

    fn build_annotations(&mut self, page_ids: &[ObjectId]) -> Vec<Annotation> {
        let mut annotations = Vec::new();
        for (index, id) in page_ids.iter().enumerate() {
            let dict = match self.graph.get(*id) {
                Ok(Object::Dictionary(d)) => d,
                _ => continue,
            };
            let annots = match self.graph.dict_get_array(dict, b"Annots") {
                Some(a) => a,
                None => continue,
            };
            for entry in annots {
                let annot_id = match entry {
                    Object::Reference(id) => Some(*id),
                    _ => None,
                };
                match self.graph.resolve(entry) {
                    Ok(Object::Dictionary(annot)) => {
                        annotations.push(self.build_annotation(index, annot_id, annot));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.warnings.push(
                            BuilderWarning::new(format!("unresolvable annotation: {}", e))
                                .with_context(format!("page {}", index + 1)),
                        );
                    }
                }
            }
        }
        annotations
    }

    fn build_annotation(&self, page: usize, id: Option<ObjectId>, dict: &Dictionary) -> Annotation {
        let rect = self.graph.dict_get_array(dict, b"Rect").and_then(|arr| {
            if arr.len() == 4 {
                let mut rect = [0.0f32; 4];
                for (slot, value) in rect.iter_mut().zip(arr.iter()) {
                    *slot = match self.graph.resolve(value) {
                        Ok(obj) => number_value(obj).unwrap_or(0.0),
                        Err(_) => 0.0,
                    };
                }
                Some(rect)
            } else {
                None
            }
        });

        let uri = self.graph.dict_get_dict(dict, b"A").and_then(|action| {
            if self.name_of(action, b"S").as_deref() == Some("URI") {
                self.string_of(action, b"URI")
            } else {
                None
            }
        });

        Annotation {
            id,
            page,
            subtype: self.name_of(dict, b"Subtype").unwrap_or_default(),
            rect,
            contents: self.string_of(dict, b"Contents"),
            alt: self.string_of(dict, b"Alt"),
            uri,
            struct_parent: self.int_of(dict, b"StructParent"),
        }
    }

    // -- interactive form ----------------------------------------------

    fn build_form(&mut self, catalog: &'a Dictionary) -> (bool, Vec<FormField>) {
        let form = match self.graph.dict_get_dict(catalog, b"AcroForm") {
            Some(f) => f,
            None => return (false, Vec::new()),
        };
        let mut fields = Vec::new();
        if let Some(roots) = self.graph.dict_get_array(form, b"Fields") {
            let mut visited = HashSet::new();
            for entry in roots {
                self.collect_fields(entry, None, FieldFlags::empty(), &mut fields, &mut visited);
            }
        }
        (true, fields)
    }

    /// Walk the field tree, inheriting /FT and /Ff, collecting leaves.
    fn collect_fields(
        &mut self,
        entry: &Object,
        inherited_type: Option<FieldType>,
        inherited_flags: FieldFlags,
        out: &mut Vec<FormField>,
        visited: &mut HashSet<ObjectId>,
    ) {
        if let Object::Reference(id) = entry {
            if !visited.insert(*id) {
                self.warn(BuilderWarning::new("cycle in form field tree"));
                return;
            }
        }
        let dict = match self.graph.resolve(entry) {
            Ok(Object::Dictionary(d)) => d,
            Ok(_) => return,
            Err(e) => {
                self.warn(BuilderWarning::new(format!(
                    "unresolvable form field: {}",
                    e
                )));
                return;
            }
        };

        let field_type = self
            .name_of(dict, b"FT")
            .map(|ft| FieldType::from_name(&ft))
            .or(inherited_type);
        let flags = self
            .int_of(dict, b"Ff")
            .map(|ff| FieldFlags::from_bits_truncate(ff as u32))
            .unwrap_or(inherited_flags);

        if let Some(kids) = self.graph.dict_get_array(dict, b"Kids") {
            if !kids.is_empty() {
                for kid in kids {
                    self.collect_fields(kid, field_type.clone(), flags, out, visited);
                }
                return;
            }
        }

        let has_value = dict.has(b"V") || dict.has(b"DV") || dict.has(b"Opt");
        let action = self.graph.dict_get_dict(dict, b"A").map(|a| FieldAction {
            kind: self.name_of(a, b"S").unwrap_or_default(),
            has_js: a.has(b"JS"),
        });

        out.push(FormField {
            name: self.string_of(dict, b"T"),
            tooltip: self.string_of(dict, b"TU"),
            field_type,
            flags,
            has_value,
            action,
        });
    }

    // -- page labels ----------------------------------------------------

    fn build_page_labels(&mut self, catalog: &'a Dictionary) -> Option<PageLabels> {
        let labels = self.graph.dict_get_dict(catalog, b"PageLabels")?;
        let mut out = PageLabels::default();

        let nums = match self.graph.dict_get_array(labels, b"Nums") {
            Some(n) => n,
            None => {
                self.warn(BuilderWarning::new("/PageLabels without /Nums array"));
                out.malformed = true;
                return Some(out);
            }
        };

        if nums.len() % 2 != 0 {
            out.malformed = true;
        }
        for pair in nums.chunks_exact(2) {
            let key = match self.graph.resolve(&pair[0]).ok().and_then(int_value) {
                Some(k) => k,
                None => {
                    out.malformed = true;
                    continue;
                }
            };
            let label = match self.graph.resolve(&pair[1]) {
                Ok(Object::Dictionary(d)) => PageLabel {
                    style: self.name_of(d, b"S"),
                    prefix: self.string_of(d, b"P"),
                    start: self.int_of(d, b"St"),
                },
                _ => {
                    out.malformed = true;
                    PageLabel::default()
                }
            };
            out.entries.push((key, label));
        }
        Some(out)
    }

    // -- outline --------------------------------------------------------

    fn build_outline(&mut self, catalog: &'a Dictionary) -> usize {
        let outlines = match self.graph.dict_get_dict(catalog, b"Outlines") {
            Some(o) => o,
            None => return 0,
        };
        if let Some(count) = self.int_of(outlines, b"Count") {
            return count.unsigned_abs() as usize;
        }
        // No /Count: walk the top-level /First../Next chain.
        let mut count = 0usize;
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut current = outlines.get(b"First").ok().cloned();
        while let Some(Object::Reference(id)) = current {
            if !visited.insert(id) {
                self.warn(BuilderWarning::new("cycle in outline item chain"));
                break;
            }
            count += 1;
            current = match self.graph.get(id) {
                Ok(Object::Dictionary(d)) => d.get(b"Next").ok().cloned(),
                _ => None,
            };
        }
        count
    }
}

/// Follow the RoleMap, bounded to avoid mapping loops.
fn resolve_role(raw: &str, role_map: &HashMap<String, String>) -> String {
    let mut current = raw;
    for _ in 0..ROLE_MAP_HOPS {
        match role_map.get(current) {
            Some(next) if next != current => current = next,
            _ => break,
        }
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Stream};

    #[test]
    fn test_resolve_role_follows_map() {
        let mut map = HashMap::new();
        map.insert("Heading1".to_string(), "H1".to_string());
        assert_eq!(resolve_role("Heading1", &map), "H1");
        assert_eq!(resolve_role("P", &map), "P");
    }

    #[test]
    fn test_resolve_role_survives_loops() {
        let mut map = HashMap::new();
        map.insert("A".to_string(), "B".to_string());
        map.insert("B".to_string(), "A".to_string());
        // Bounded: terminates on a loop rather than spinning.
        let resolved = resolve_role("A", &map);
        assert!(resolved == "A" || resolved == "B");
    }

    fn minimal_doc() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    fn build(doc: Document) -> DocumentModel {
        let graph = ObjectGraph::from_document(doc).unwrap();
        ModelBuilder::new(&graph).build().unwrap()
    }

    fn catalog_mut(doc: &mut Document) -> &mut Dictionary {
        let root = match doc.trailer.get(b"Root").unwrap() {
            Object::Reference(id) => *id,
            _ => panic!("indirect root expected"),
        };
        match doc.objects.get_mut(&root).unwrap() {
            Object::Dictionary(d) => d,
            _ => panic!("catalog is a dictionary"),
        }
    }

    #[test]
    fn test_untagged_document_builds_empty_tree() {
        let model = build(minimal_doc());
        assert_eq!(model.pages.len(), 1);
        assert!(model.structure.is_empty());
        assert!(model.warnings.is_empty());
    }

    #[test]
    fn test_structure_tree_with_role_map() {
        let mut doc = minimal_doc();
        let elem_id = doc.add_object(dictionary! {
            "Type" => "StructElem",
            "S" => "Chapter",
            "K" => 0,
        });
        let root_id = doc.add_object(dictionary! {
            "Type" => "StructTreeRoot",
            "K" => Object::Reference(elem_id),
            "RoleMap" => dictionary! { "Chapter" => "Sect" },
        });
        catalog_mut(&mut doc).set("StructTreeRoot", Object::Reference(root_id));

        let model = build(doc);
        assert_eq!(model.structure.roots.len(), 1);
        let node = &model.structure.roots[0];
        assert_eq!(node.role, Role::Sect);
        assert_eq!(node.raw_role, "Chapter");
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn test_structure_cycle_yields_warning_not_hang() {
        let mut doc = minimal_doc();
        let elem_id = doc.new_object_id();
        doc.objects.insert(
            elem_id,
            Object::Dictionary(dictionary! {
                "Type" => "StructElem",
                "S" => "P",
                "K" => Object::Reference(elem_id),
            }),
        );
        let root_id = doc.add_object(dictionary! {
            "Type" => "StructTreeRoot",
            "K" => Object::Reference(elem_id),
        });
        catalog_mut(&mut doc).set("StructTreeRoot", Object::Reference(root_id));

        let model = build(doc);
        assert_eq!(model.structure.roots.len(), 1);
        assert!(model
            .warnings
            .iter()
            .any(|w| w.message.contains("cycle in structure tree")));
    }

    #[test]
    fn test_metadata_info_and_lang() {
        let mut doc = minimal_doc();
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Yearly summary"),
            "Author" => Object::string_literal("Kari Nordmann"),
        });
        doc.trailer.set("Info", Object::Reference(info_id));
        catalog_mut(&mut doc).set("Lang", Object::string_literal("nb-NO"));

        let model = build(doc);
        assert_eq!(model.metadata.title(), Some("Yearly summary"));
        assert_eq!(model.metadata.author.as_deref(), Some("Kari Nordmann"));
        assert_eq!(model.metadata.language(), Some("nb-NO"));
        assert!(!model.metadata.xmp_present);
    }

    #[test]
    fn test_xmp_overrides_info_title() {
        let mut doc = minimal_doc();
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("info title"),
        });
        doc.trailer.set("Info", Object::Reference(info_id));
        let xmp = br#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
<rdf:Description xmlns:dc="http://purl.org/dc/elements/1.1/">
<dc:title><rdf:Alt><rdf:li>xmp title</rdf:li></rdf:Alt></dc:title>
</rdf:Description></rdf:RDF></x:xmpmeta>"#;
        let meta_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            xmp.to_vec(),
        )));
        catalog_mut(&mut doc).set("Metadata", Object::Reference(meta_id));

        let model = build(doc);
        assert_eq!(model.metadata.title(), Some("xmp title"));
        assert!(model.metadata.xmp_present);
    }

    #[test]
    fn test_form_fields_collected_with_inheritance() {
        let mut doc = minimal_doc();
        let kid_id = doc.add_object(dictionary! {
            "T" => Object::string_literal("email"),
            "TU" => Object::string_literal("Your e-mail"),
        });
        let parent_id = doc.add_object(dictionary! {
            "FT" => "Tx",
            "Kids" => vec![Object::Reference(kid_id)],
        });
        let form = dictionary! { "Fields" => vec![Object::Reference(parent_id)] };
        catalog_mut(&mut doc).set("AcroForm", Object::Dictionary(form));

        let model = build(doc);
        assert!(model.has_form);
        assert_eq!(model.form_fields.len(), 1);
        let field = &model.form_fields[0];
        assert_eq!(field.field_type, Some(FieldType::Text));
        assert_eq!(field.label(), Some("Your e-mail"));
    }

    #[test]
    fn test_page_labels_and_outline_count() {
        let mut doc = minimal_doc();
        let labels = dictionary! {
            "Nums" => vec![
                Object::Integer(0),
                Object::Dictionary(dictionary! { "S" => "r" }),
            ],
        };
        catalog_mut(&mut doc).set("PageLabels", Object::Dictionary(labels));
        let outline_id = doc.add_object(dictionary! {
            "Type" => "Outlines",
            "Count" => 3,
        });
        catalog_mut(&mut doc).set("Outlines", Object::Reference(outline_id));

        let model = build(doc);
        let labels = model.page_labels.expect("page labels present");
        assert!(!labels.malformed);
        assert_eq!(labels.entries.len(), 1);
        assert_eq!(labels.entries[0].0, 0);
        assert_eq!(labels.entries[0].1.style.as_deref(), Some("r"));
        assert_eq!(model.bookmark_count, 3);
    }

    #[test]
    fn test_annotation_extraction() {
        let mut doc = minimal_doc();
        let annot_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                Object::Integer(10), Object::Integer(10),
                Object::Integer(100), Object::Integer(30),
            ],
            "A" => dictionary! {
                "S" => "URI",
                "URI" => Object::string_literal("https://example.org"),
            },
            "StructParent" => 0,
        });
        let page_id = doc.get_pages()[&1];
        if let Object::Dictionary(page) = doc.objects.get_mut(&page_id).unwrap() {
            page.set("Annots", vec![Object::Reference(annot_id)]);
        }

        let model = build(doc);
        assert_eq!(model.annotations.len(), 1);
        let annot = &model.annotations[0];
        assert_eq!(annot.subtype, "Link");
        assert_eq!(annot.uri.as_deref(), Some("https://example.org"));
        assert!(model.is_annotation_tagged(annot));
        assert_eq!(model.external_links().count(), 1);
    }
}
