use indexmap::IndexMap;
use std::sync::Arc;

/// A file attached to a request, shared with the transport rather than copied.
#[derive(Debug, Clone)]
pub struct FileHolder {
    /// File name reported to the server
    pub name: String,
    /// MIME type of the content
    pub mime_type: String,
    /// File content
    pub content: Arc<[u8]>,
}

impl FileHolder {
    /// Create a new FileHolder
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        FileHolder {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Size of the content in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Files maps request keys to attached files.
#[derive(Debug, Clone, Default)]
pub struct Files {
    entries: IndexMap<String, FileHolder>,
}

impl Files {
    /// Create an empty attachment set
    pub fn new() -> Self {
        Files::default()
    }

    /// Attach a file under `key`, replacing any previous one
    pub fn add(&mut self, key: impl Into<String>, file: FileHolder) {
        self.entries.insert(key.into(), file);
    }

    /// Get the file attached under `key`
    pub fn get(&self, key: &str) -> Option<&FileHolder> {
        self.entries.get(key)
    }

    /// Number of attached files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no file is attached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over attachments in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileHolder)> {
        self.entries.iter()
    }
}
