//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tubely_core::{Orientation, VideoResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video ingestion API. Uploads are probed, remuxed for fast start, stored under an orientation prefix and served through short-lived signed URLs."
    ),
    paths(
        handlers::video_upload::upload_video_file,
        handlers::video_get::get_video,
        handlers::video_get::list_videos,
        handlers::assets::serve_asset,
    ),
    components(
        schemas(VideoResponse, Orientation, error::ErrorResponse)
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video records and media upload"),
        (name = "assets", description = "Signed object access for the local backend")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
