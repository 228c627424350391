use std::fmt;
use std::path::PathBuf;

/// Largest upload the service accepts, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Declared media types the service accepts. `video/avi` and `video/x-msvideo`
/// both name AVI containers depending on the platform that labelled the file.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/avi",
    "video/x-msvideo",
    "video/quicktime",
];

pub const SIZE_REJECTION: &str = "File size must be less than 500MB";
pub const FORMAT_REJECTION: &str = "Unsupported video format. Please use MP4, WebM, AVI, or MOV";

/// A file offered for upload, as seen by the picker or a drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Carries the canonical media type matched from [`ACCEPTED_MEDIA_TYPES`].
    Accepted { media_type: &'static str },
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TooLarge { size_bytes: u64 },
    UnsupportedFormat { content_type: Option<String> },
}

impl Rejection {
    /// User-facing reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::TooLarge { .. } => SIZE_REJECTION,
            Rejection::UnsupportedFormat { .. } => FORMAT_REJECTION,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Pure predicate shared by the picker and drag-drop paths. Size is checked
/// before the media type.
pub fn validate(file: &CandidateFile) -> Validation {
    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Validation::Rejected(Rejection::TooLarge {
            size_bytes: file.size_bytes,
        });
    }

    match file.content_type.as_deref().and_then(accepted_media_type) {
        Some(media_type) => Validation::Accepted { media_type },
        None => Validation::Rejected(Rejection::UnsupportedFormat {
            content_type: file.content_type.clone(),
        }),
    }
}

fn accepted_media_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    ACCEPTED_MEDIA_TYPES
        .iter()
        .copied()
        .find(|accepted| accepted.eq_ignore_ascii_case(essence))
}
