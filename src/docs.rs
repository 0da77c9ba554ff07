use utoipa::OpenApi;
use crate::common::response::ErrorResponse;
use crate::modules::audio::dto::{DurationResponse, TrimResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::audio::handler::get_duration,
        crate::modules::audio::handler::trim_audio,
        crate::modules::audio::download_handler::download_file,
    ),
    components(
        schemas(DurationResponse, TrimResponse, ErrorResponse)
    ),
    tags(
        (name = "Audio", description = "Duration lookup, trimming and one-time download")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::middleware::api_key::API_KEY_HEADER,
                ))),
            );
        }
    }
}
