//! OpenAPI document generation with a Scalar API reference UI.

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi, SecurityScheme, Tag};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::extract::auth::SECURITY_SCHEME;

/// Paths the OpenAPI document and the Scalar UI are served from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Route serving the generated OpenAPI document.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Route serving the Scalar reference page.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] to add OpenAPI documentation.
pub trait RouterOpenApiExt<S> {
    /// Finishes the API router, serving its OpenAPI document and the Scalar UI.
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info: api_info(),
            tags: vec![
                tag("Questions", "Browse, upload and delete past question papers"),
                tag("Files", "Download stored PDF files"),
                tag("Monitors", "Service health"),
            ],
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        let router = router.finish_api_with(&mut api, |api| {
            api.security_scheme(
                SECURITY_SCHEME,
                SecurityScheme::Http {
                    scheme: "bearer".to_owned(),
                    bearer_format: Some("JWT".to_owned()),
                    description: Some(
                        "HS256 token signed with the shared secret, carrying `\"admin\": true`"
                            .to_owned(),
                    ),
                    extensions: Default::default(),
                },
            )
        });

        router.layer(Extension(api))
    }
}

fn api_info() -> Info {
    Info {
        title: "QuestVault API".to_owned(),
        summary: Some("Catalog of past examination question papers".to_owned()),
        description: Some(
            "Students browse and filter past question papers by level, semester, \
            department and year, and download the PDFs. Administrators upload and \
            delete papers with a bearer token."
                .to_owned(),
        ),
        license: Some(License {
            name: "MIT".to_owned(),
            identifier: Some("MIT".to_owned()),
            ..License::default()
        }),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ..Info::default()
    }
}

fn tag(name: &str, description: &str) -> Tag {
    Tag {
        name: name.to_owned(),
        description: Some(description.to_owned()),
        ..Tag::default()
    }
}
