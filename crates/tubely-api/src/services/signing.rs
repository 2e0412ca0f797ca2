//! Rendering video records with freshly signed URLs.

use tubely_core::{Video, VideoResponse};
use tubely_storage::AccessUrlIssuer;

/// Render `video` for a client, signing its media reference if it has one.
///
/// A reference that cannot be signed leaves `video_url` unset; the record is
/// still returned.
pub async fn render_video(urls: &AccessUrlIssuer, video: Video) -> VideoResponse {
    let video_url = match video.storage_reference() {
        Some(reference) => match urls.sign(reference).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    video_id = %video.id,
                    bucket = %reference.bucket(),
                    key = %reference.key(),
                    error = %e,
                    "Failed to sign video URL; returning record without it"
                );
                None
            }
        },
        None => None,
    };

    VideoResponse::from_video(video, video_url)
}
