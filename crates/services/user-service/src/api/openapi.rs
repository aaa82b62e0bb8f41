//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::api::handlers::{health_handler, user_handler};
use domain::{CreateUserRequest, PaginationParams, SearchUsersRequest, UpdateUserRequest, UserView};

/// OpenAPI documentation for the user service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service",
        version = "0.1.0",
        description = "User account administration: create, update, soft delete, lookup and search"
    ),
    paths(
        health_handler::health,
        user_handler::create_user,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::search_users,
        user_handler::username_exists,
    ),
    components(
        schemas(
            CreateUserRequest,
            UpdateUserRequest,
            SearchUsersRequest,
            PaginationParams,
            UserView,
            user_handler::ExistsResponse,
            health_handler::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "Admin user management"),
        (name = "Health", description = "Service liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_user_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        assert!(paths.contains(&"/api/admin/user".to_string()));
        assert!(paths.contains(&"/api/admin/user/{id}".to_string()));
        assert!(paths.contains(&"/api/admin/user/search".to_string()));
        assert!(paths.contains(&"/api/admin/user/exists".to_string()));
        assert!(paths.contains(&"/health".to_string()));
    }
}
