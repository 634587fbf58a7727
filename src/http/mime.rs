//! MIME type lookup by file extension.

/// Maps a path (or bare extension like ".json") to a MIME type string.
///
/// Unknown extensions and extension-less paths fall back to
/// `application/text`.
pub fn mime_type(path: &str) -> &'static str {
    let ext = match path.rfind('.') {
        Some(pos) => &path[pos..],
        None => return "application/text",
    };

    match ext.to_ascii_lowercase().as_str() {
        ".htm" | ".html" | ".php" => "text/html",
        ".css" => "text/css",
        ".txt" => "text/plain",
        ".js" => "application/javascript",
        ".json" => "application/json",
        ".xml" => "application/xml",
        ".png" => "image/png",
        ".jpe" | ".jpeg" | ".jpg" => "image/jpeg",
        ".gif" => "image/gif",
        ".bmp" => "image/bmp",
        ".ico" => "image/vnd.microsoft.icon",
        ".tiff" | ".tif" => "image/tiff",
        ".svg" | ".svgz" => "image/svg+xml",
        ".flv" => "video/x-flv",
        ".swf" => "application/x-shockwave-flash",
        _ => "application/text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(mime_type("index.html"), "text/html");
        assert_eq!(mime_type(".json"), "application/json");
        assert_eq!(mime_type("logo.PNG"), "image/png");
        assert_eq!(mime_type("/var/www/site.css"), "text/css");
    }

    #[test]
    fn unknown_falls_back() {
        assert_eq!(mime_type("archive.tar.xz"), "application/text");
        assert_eq!(mime_type("noextension"), "application/text");
    }
}
