/// Validation of custom video clips uploaded from the meme picker
use crate::config::Limits;
use crate::error::Rejection;
use crate::reaction::{MediaSelection, MediaSource};
use serde::Deserialize;

pub const ACCEPTED_VIDEO_TYPES: [&str; 3] = ["video/mp4", "video/webm", "video/quicktime"];

/// What the browser tells us about a picked file
#[derive(Debug, Clone, PartialEq)]
pub struct ClipFile {
    pub mime: String,
    pub size_bytes: u64,
}

/// Metadata read from the video element once it has loaded
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipMetadata {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

pub fn check_file(file: &ClipFile, limits: &Limits) -> Result<(), Rejection> {
    if !ACCEPTED_VIDEO_TYPES.contains(&file.mime.as_str()) {
        return Err(Rejection::InvalidUploadType);
    }
    if file.size_bytes > limits.max_upload_bytes {
        return Err(Rejection::OversizedUpload);
    }
    Ok(())
}

pub fn check_metadata(metadata: &ClipMetadata, limits: &Limits) -> Result<(), Rejection> {
    if !metadata.duration_secs.is_finite() || metadata.duration_secs > limits.max_clip_seconds {
        return Err(Rejection::OversizedUpload);
    }
    Ok(())
}

/// Media selection for a clip stored at `url`
pub fn custom_video(url: impl Into<String>, metadata: &ClipMetadata) -> MediaSelection {
    MediaSelection::new(MediaSource::CustomVideo, url, metadata.width, metadata.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(mime: &str, size_bytes: u64) -> ClipFile {
        ClipFile {
            mime: mime.to_string(),
            size_bytes,
        }
    }

    fn metadata(duration_secs: f64) -> ClipMetadata {
        ClipMetadata {
            width: 1920,
            height: 1080,
            duration_secs,
        }
    }

    #[test]
    fn test_accepted_types() {
        let limits = Limits::default();
        assert_eq!(check_file(&clip("video/mp4", 1024), &limits), Ok(()));
        assert_eq!(check_file(&clip("video/webm", 1024), &limits), Ok(()));
        assert_eq!(
            check_file(&clip("image/gif", 1024), &limits),
            Err(Rejection::InvalidUploadType)
        );
    }

    #[test]
    fn test_file_size_limit() {
        let limits = Limits::default();
        assert_eq!(check_file(&clip("video/mp4", 8 * 1024 * 1024), &limits), Ok(()));
        assert_eq!(
            check_file(&clip("video/mp4", 8 * 1024 * 1024 + 1), &limits),
            Err(Rejection::OversizedUpload)
        );
    }

    #[test]
    fn test_duration_cap() {
        let limits = Limits::default();
        assert_eq!(check_metadata(&metadata(8.0), &limits), Ok(()));
        assert_eq!(
            check_metadata(&metadata(8.01), &limits),
            Err(Rejection::OversizedUpload)
        );
        assert_eq!(
            check_metadata(&metadata(f64::INFINITY), &limits),
            Err(Rejection::OversizedUpload)
        );
    }

    #[test]
    fn test_custom_video_selection() {
        let media = custom_video("https://cdn/clip.mp4", &metadata(5.0));
        assert_eq!(media.source, MediaSource::CustomVideo);
        assert_eq!((media.width, media.height), (1920, 1080));
    }

    #[test]
    fn test_metadata_from_probe() {
        let parsed: ClipMetadata =
            serde_json::from_str(r#"{"width": 720, "height": 1280, "durationSecs": 6.5}"#).unwrap();
        assert_eq!(parsed, metadata_of(720, 1280, 6.5));
    }

    fn metadata_of(width: u32, height: u32, duration_secs: f64) -> ClipMetadata {
        ClipMetadata {
            width,
            height,
            duration_secs,
        }
    }
}
