use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use enhancer_core::CandidateFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    Reset,
    History,
    Select(String),
    Download,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
}

/// Parses one line of terminal input. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "upload" | "u" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("upload"));
            }
            Command::Upload(PathBuf::from(unquote(rest)))
        }
        "select" | "s" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("select"));
            }
            Command::Select(rest.to_string())
        }
        "reset" => Command::Reset,
        "history" | "h" => Command::History,
        "download" | "d" => Command::Download,
        "dismiss" => Command::Dismiss,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn unquote(text: &str) -> &str {
    ["\"", "'"]
        .iter()
        .find_map(|&quote| text.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(text)
}

/// Declared media type for a file, judged by extension the way a browser
/// file picker would. Unrecognized extensions have no declared type.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" | "qt" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "flv" => "video/x-flv",
        "wmv" => "video/x-ms-wmv",
        "mpg" | "mpeg" => "video/mpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(media_type)
}

/// Builds the candidate for validation from a path on disk.
pub fn probe_candidate(path: &Path) -> io::Result<CandidateFile> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(CandidateFile {
        path: path.to_path_buf(),
        filename,
        size_bytes: metadata.len(),
        content_type: media_type_for(path).map(str::to_string),
    })
}
