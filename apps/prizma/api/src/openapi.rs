use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Prizma API",
        version = "0.1.0",
        description = "JSON:API resources for projects and users"
    ),
    servers((url = "/api", description = "API base path")),
    nest(
        (path = "/project", api = domain_projects::handlers::ApiDoc),
        (path = "/user", api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_both_resources() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/project"));
        assert!(doc.paths.paths.contains_key("/project/{id}"));
        assert!(doc.paths.paths.contains_key("/user"));
        assert!(doc.paths.paths.contains_key("/user/{id}"));
    }
}
