use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atlas API",
        version = "0.1.0",
        description = "Countries and persons behind JWT bearer authentication."
    ),
    paths(
        crate::routes::get_countries,
        crate::routes::get_country,
        crate::routes::create_country,
        crate::routes::update_country,
        crate::routes::delete_country,
        crate::routes::get_persons,
        crate::routes::get_person,
        crate::routes::create_person,
        crate::routes::update_person,
        crate::routes::delete_person,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::CountryBody,
        crate::dto::PersonRequest,
        crate::dto::PersonResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "countries", description = "Country management (writes need the admin role)"),
        (name = "persons", description = "Person management"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the JWT bearer security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the identity provider."))
                        .build(),
                ),
            );
        }
    }
}
