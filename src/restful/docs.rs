//! OpenAPI document generated from the resolved route tables.

use utoipa::openapi::{
    path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn},
    security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme},
    ComponentsBuilder, InfoBuilder, OpenApi, OpenApiBuilder, Paths, Required, ResponseBuilder,
};

use super::action::CrudAction;
use super::resolver::{ResolvedRoute, RouteTable};

const BEARER_SCHEME: &str = "bearer_jwt";

pub fn build_openapi(prefix: &str, tables: &[RouteTable]) -> OpenApi {
    let mut paths = Paths::new();
    for route in tables.iter().flat_map(|t| t.routes.iter()) {
        paths.add_path_operation(
            format!("{}{}", prefix, route.path),
            vec![http_method(route.action)],
            operation(route),
        );
    }

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Folio API")
                .version(env!("CARGO_PKG_VERSION"))
                .build(),
        )
        .paths(paths)
        .components(Some(
            ComponentsBuilder::new()
                .security_scheme(
                    BEARER_SCHEME,
                    SecurityScheme::Http(
                        HttpBuilder::new()
                            .scheme(HttpAuthScheme::Bearer)
                            .bearer_format("JWT")
                            .build(),
                    ),
                )
                .build(),
        ))
        .build()
}

fn http_method(action: CrudAction) -> HttpMethod {
    match action {
        CrudAction::List | CrudAction::Detail => HttpMethod::Get,
        CrudAction::Store => HttpMethod::Post,
        CrudAction::Update | CrudAction::Restore => HttpMethod::Patch,
        CrudAction::Delete => HttpMethod::Delete,
    }
}

fn operation(route: &ResolvedRoute) -> utoipa::openapi::path::Operation {
    let success = if route.action == CrudAction::Store { "201" } else { "200" };
    let mut builder = OperationBuilder::new()
        .operation_id(Some(format!("{}_{}", route.resource, route.action)))
        .tags(Some(vec![route.resource.clone()]))
        .summary(route.description.clone())
        .description(Some(format!("Input: {}", route.input.name())))
        .response(success, ResponseBuilder::new().description("Success").build())
        .response("422", ResponseBuilder::new().description("Invalid input").build());

    if route.action.has_item() {
        builder = builder.parameter(
            ParameterBuilder::new()
                .name("item")
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .description(Some("Record id (UUID)"))
                .build(),
        );
    }

    if !route.guest {
        builder = builder
            .security(SecurityRequirement::new(BEARER_SCHEME, Vec::<String>::new()))
            .response("401", ResponseBuilder::new().description("Authentication required").build())
            .response("403", ResponseBuilder::new().description("Not allowed").build());
    }

    builder.build()
}
