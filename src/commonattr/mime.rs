//! MIME type categories used to narrow common file searches

/// Picture, video and audio types
pub const MEDIA_MIME_TYPES: &[&str] = &[
    "image/bmp",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "image/webp",
    "image/x-icon",
    "image/x-ms-bmp",
    "image/vnd.adobe.photoshop",
    "image/vnd.microsoft.icon",
    "image/x-raw-nikon",
    "video/3gpp",
    "video/3gpp2",
    "video/mp4",
    "video/mpeg",
    "video/ogg",
    "video/quicktime",
    "video/webm",
    "video/x-flv",
    "video/x-m4v",
    "video/x-ms-wmv",
    "video/x-msvideo",
    "audio/midi",
    "audio/mpeg",
    "audio/ogg",
    "audio/wav",
    "audio/webm",
    "audio/x-ms-wma",
];

/// Office, PDF and plain text document types
pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "text/plain",
    "text/csv",
    "text/html",
    "text/css",
    "text/calendar",
    "application/rtf",
    "application/pdf",
    "application/json",
    "application/xml",
    "application/msword",
    "application/vnd.ms-excel",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.oasis.opendocument.text",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.oasis.opendocument.presentation",
    "application/x-msoffice",
    "application/x-ooxml",
];

/// Which MIME categories a search is restricted to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MimeFilter {
    pub media: bool,
    pub documents: bool,
}

impl MimeFilter {
    pub fn new(media: bool, documents: bool) -> Self {
        Self { media, documents }
    }

    pub fn is_active(&self) -> bool {
        self.media || self.documents
    }

    /// Files without a MIME type never pass an active filter
    pub fn allows(&self, mime_type: Option<&str>) -> bool {
        if !self.is_active() {
            return true;
        }
        match mime_type {
            Some(mime) => {
                let mime = mime.trim().to_ascii_lowercase();
                (self.media && MEDIA_MIME_TYPES.contains(&mime.as_str()))
                    || (self.documents && DOCUMENT_MIME_TYPES.contains(&mime.as_str()))
            }
            None => false,
        }
    }

    /// Title fragments appended after the search scope
    pub fn title_parts(&self) -> Vec<&'static str> {
        let mut parts = Vec::new();
        if self.media {
            parts.push("Media");
        }
        if self.documents {
            parts.push("Documents");
        }
        parts
    }
}
