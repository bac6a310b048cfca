//! Image selection and client-side type gating.

use uuid::Uuid;

/// Declared media types the upload slots accept, everywhere.
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

pub const REJECTION_MESSAGE: &str = "Please upload a PNG, JPG or JPEG image.";

/// A file as selected by the user: declared name and media type plus the
/// raw bytes. Transient; never persisted itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn is_accepted_type(&self) -> bool {
        ACCEPTED_MEDIA_TYPES.contains(&self.media_type.as_str())
    }
}

/// Stand-in for an object URL: a revocable reference tied to one selected
/// file, dropped with the slot content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    fn for_file(file: &ImageFile) -> Self {
        Self(format!("preview://{}/{}", Uuid::new_v4(), file.name))
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

/// One upload slot. Slots are independent: a rejection here never disturbs
/// another slot's state.
#[derive(Debug, Default)]
pub struct ImageSlot {
    image: Option<ImageFile>,
    preview: Option<PreviewHandle>,
    error: Option<String>,
}

impl ImageSlot {
    /// Returns whether the file was accepted. A rejected file clears the
    /// slot entirely so no stale preview survives it.
    pub fn select(&mut self, file: ImageFile) -> bool {
        if !file.is_accepted_type() {
            self.image = None;
            self.preview = None;
            self.error = Some(REJECTION_MESSAGE.to_string());
            return false;
        }

        self.error = None;
        self.preview = Some(PreviewHandle::for_file(&file));
        self.image = Some(file);
        true
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_filled(&self) -> bool {
        self.image.is_some()
    }
}
