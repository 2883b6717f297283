//! Turn what the user typed in an image field into a storable image string.
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::FormError;

/// URLs and `data:` URLs pass through; anything else is read as a local file
/// and inlined as a base64 `data:` URL.
pub fn resolve_image(source: &str) -> Result<String, FormError> {
    let source = source.trim();
    if is_inline_or_remote(source) {
        return Ok(source.to_string());
    }
    let path = Path::new(source);
    let bytes = std::fs::read(path).map_err(|e| FormError::Image(format!("{}: {e}", path.display())))?;
    Ok(format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes)))
}

pub fn is_inline_or_remote(source: &str) -> bool {
    ["http://", "https://", "data:"].iter().any(|p| source.starts_with(p))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Short description of an image string for the details pane.
pub fn describe(image: Option<&str>) -> String {
    match image {
        None | Some("") => "(none)".to_string(),
        Some(s) if s.starts_with("data:") => {
            let mime = s["data:".len()..].split([';', ',']).next().unwrap_or("");
            format!("inline {} ({} bytes encoded)", mime, s.len())
        }
        Some(s) => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_pass_through() {
        assert_eq!(resolve_image(" https://x.io/a.png ").unwrap(), "https://x.io/a.png");
        assert_eq!(resolve_image("data:image/png;base64,AA==").unwrap(), "data:image/png;base64,AA==");
    }

    #[test]
    fn local_file_becomes_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let url = resolve_image(path.to_str().unwrap()).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = resolve_image("/definitely/not/here.jpg").unwrap_err();
        assert!(matches!(err, FormError::Image(_)));
    }

    #[test]
    fn describe_summarises_data_urls() {
        assert_eq!(describe(None), "(none)");
        assert!(describe(Some("data:image/png;base64,AA==")).starts_with("inline image/png"));
    }
}
