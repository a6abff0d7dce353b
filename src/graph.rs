//! Read-only adapter over the low-level PDF object graph.
//!
//! Wraps a parsed [`lopdf::Document`] behind a normalized view: reference
//! resolution with cycle detection, tolerant dictionary lookups, and a
//! per-run cache of decoded stream bytes. All accessors are read-only; the
//! only mutable state is the stream cache, which is confined to the
//! adapter instance (one adapter per in-flight document).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Filters `decoded_stream` knows how to apply (via the underlying parser).
/// Anything else fails with [`Error::UnsupportedFilter`] rather than
/// silently truncating.
const SUPPORTED_FILTERS: &[&str] = &["FlateDecode", "LZWDecode"];

/// A parsed PDF document exposed as a navigable, read-only object graph.
pub struct ObjectGraph {
    doc: Document,
    stream_cache: RefCell<HashMap<ObjectId, Rc<[u8]>>>,
}

impl ObjectGraph {
    /// Parse a document from raw bytes.
    ///
    /// Fails fatally on a malformed container or an encrypted document;
    /// per spec a fatal parse error means "could not be checked" and is
    /// never conflated with an accessibility Fail.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Self::from_document(doc)
    }

    /// Wrap an already-parsed document.
    pub fn from_document(doc: Document) -> Result<Self> {
        if doc.trailer.has(b"Encrypt") {
            return Err(Error::Encrypted);
        }
        Ok(Self {
            doc,
            stream_cache: RefCell::new(HashMap::new()),
        })
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The trailer dictionary.
    pub fn trailer(&self) -> &Dictionary {
        &self.doc.trailer
    }

    /// The document catalog. A missing or malformed catalog is fatal.
    pub fn catalog(&self) -> Result<&Dictionary> {
        Ok(self.doc.catalog()?)
    }

    /// Page object ids in page order (0-based externally).
    pub fn pages(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Look up an object by id.
    pub fn get(&self, id: ObjectId) -> Result<&Object> {
        self.doc
            .get_object(id)
            .map_err(|_| Error::BrokenReference(id.0, id.1))
    }

    /// Resolve an object, following reference chains.
    ///
    /// Each call tracks its own visited set, so a reference loop is
    /// reported as [`Error::CircularReference`] instead of recursing
    /// forever.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        let mut current = obj;
        let mut visited: HashSet<ObjectId> = HashSet::new();
        while let Object::Reference(id) = current {
            if !visited.insert(*id) {
                return Err(Error::CircularReference(id.0, id.1));
            }
            current = self.get(*id)?;
        }
        Ok(current)
    }

    /// Tolerant lookup: get `key` from `dict` and resolve it, returning
    /// `None` on absence or a broken/circular reference. Model building
    /// uses this to degrade gracefully where the strict contract of
    /// [`ObjectGraph::resolve`] would abort.
    pub fn dict_get<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let obj = dict.get(key).ok()?;
        match self.resolve(obj) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                log::warn!(
                    "failed to resolve /{}: {}",
                    String::from_utf8_lossy(key),
                    e
                );
                None
            }
        }
    }

    /// Like [`ObjectGraph::dict_get`], narrowed to dictionaries.
    pub fn dict_get_dict<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
        match self.dict_get(dict, key)? {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Like [`ObjectGraph::dict_get`], narrowed to arrays.
    pub fn dict_get_array<'a>(
        &'a self,
        dict: &'a Dictionary,
        key: &[u8],
    ) -> Option<&'a Vec<Object>> {
        match self.dict_get(dict, key)? {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Decoded bytes of the stream object `id`, applying its declared
    /// filter chain. Results are cached per object id for the lifetime of
    /// this adapter so the same stream is never decoded twice in one run.
    pub fn decoded_stream(&self, id: ObjectId) -> Result<Rc<[u8]>> {
        if let Some(bytes) = self.stream_cache.borrow().get(&id) {
            return Ok(Rc::clone(bytes));
        }

        let stream = match self.get(id)? {
            Object::Stream(s) => s,
            other => {
                return Err(Error::Decode(format!(
                    "object {} {} R is not a stream (found {})",
                    id.0,
                    id.1,
                    type_name(other)
                )))
            }
        };

        for filter in stream_filters(self, &stream.dict) {
            if !SUPPORTED_FILTERS.contains(&filter.as_str()) {
                return Err(Error::UnsupportedFilter(filter));
            }
        }

        let bytes: Rc<[u8]> = if stream.dict.get(b"Filter").is_err() {
            Rc::from(stream.content.as_slice())
        } else {
            Rc::from(
                stream
                    .decompressed_content()
                    .map_err(|e| Error::Decode(e.to_string()))?
                    .as_slice(),
            )
        };

        self.stream_cache.borrow_mut().insert(id, Rc::clone(&bytes));
        Ok(bytes)
    }
}

/// The declared filter chain of a stream dictionary, as names.
fn stream_filters(graph: &ObjectGraph, dict: &Dictionary) -> Vec<String> {
    match graph.dict_get(dict, b"Filter") {
        Some(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Some(Object::Array(filters)) => filters
            .iter()
            .filter_map(|f| match graph.resolve(f) {
                Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Name of an object variant, for diagnostics.
pub fn type_name(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "Null",
        Object::Boolean(_) => "Boolean",
        Object::Integer(_) => "Integer",
        Object::Real(_) => "Real",
        Object::Name(_) => "Name",
        Object::String(..) => "String",
        Object::Array(_) => "Array",
        Object::Dictionary(_) => "Dictionary",
        Object::Stream(_) => "Stream",
        Object::Reference(_) => "Reference",
    }
}

/// A name object as UTF-8, if it is one.
pub fn name_str(obj: &Object) -> Option<&str> {
    match obj {
        Object::Name(bytes) => std::str::from_utf8(bytes).ok(),
        _ => None,
    }
}

/// An integer object's value, if it is one.
pub fn int_value(obj: &Object) -> Option<i64> {
    match obj {
        Object::Integer(i) => Some(*i),
        _ => None,
    }
}

/// A numeric object's value as f32 (integers widen).
pub fn number_value(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
