//! Resource locators and anchor identifiers.
//!
//! Clip and frame identifiers are opaque backend filenames and may contain
//! spaces, slashes, `#` and other characters that are unsafe inside a URL
//! path or an anchor. Every locator built here percent-encodes each
//! identifier it embeds.

/// Local image substituted for any media resource that failed to load.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.jpg";

/// Accessible description given to an image that failed to load.
pub const NOT_FOUND_ALT: &str = "Image not found";

/// MIME prefix for inline images sent by the backend.
const INLINE_IMAGE_PREFIX: &str = "data:image/jpeg;base64,";

/// `GET /download/{clip}`
pub fn clip_download_url(clip: &str) -> String {
    format!("/download/{}", urlencoding::encode(clip))
}

/// `GET /download_frame/{clip}/{frame}`
pub fn frame_url(clip: &str, frame: &str) -> String {
    format!(
        "/download_frame/{}/{}",
        urlencoding::encode(clip),
        urlencoding::encode(frame)
    )
}

/// Anchor identifier of the region that shows `clip`.
pub fn clip_anchor(clip: &str) -> String {
    urlencoding::encode(clip).into_owned()
}

/// `data:` URI for an already-validated base64 image.
pub fn inline_image_uri(encoded: &str) -> String {
    format!("{INLINE_IMAGE_PREFIX}{encoded}")
}

/// Whether `src` is an inline `data:` URI rather than a server resource.
pub fn is_inline(src: &str) -> bool {
    src.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_pass_through() {
        assert_eq!(clip_download_url("clip_1.mp4"), "/download/clip_1.mp4");
        assert_eq!(
            frame_url("clip_1.mp4", "frame_0001.jpg"),
            "/download_frame/clip_1.mp4/frame_0001.jpg"
        );
    }

    #[test]
    fn unsafe_characters_are_encoded() {
        assert_eq!(
            clip_download_url("my video #1.mp4"),
            "/download/my%20video%20%231.mp4"
        );
        assert_eq!(
            frame_url("a/b.mp4", "temp/a_frames/frame 1.jpg"),
            "/download_frame/a%2Fb.mp4/temp%2Fa_frames%2Fframe%201.jpg"
        );
    }

    #[test]
    fn anchor_round_trips_unicode() {
        let clip = "Café scène?.mp4";
        let anchor = clip_anchor(clip);
        assert!(!anchor.contains(' '));
        assert!(!anchor.contains('?'));
        assert_eq!(urlencoding::decode(&anchor).unwrap(), clip);
    }

    #[test]
    fn inline_uri() {
        let uri = inline_image_uri("aGk=");
        assert_eq!(uri, "data:image/jpeg;base64,aGk=");
        assert!(is_inline(&uri));
        assert!(!is_inline(PLACEHOLDER_IMAGE));
    }
}
