//! Categories at `/categories`, managed by `content-manager`.

use crate::rbac::{Checker, PermissionAction};
use crate::restful::{shape, simple_crud_options, RouteManifest};

use super::dto::{CreateCategoryDto, QueryCategoryDto, UpdateCategoryDto};

pub const SUBJECT: &str = "category";

pub fn manifest() -> RouteManifest {
    RouteManifest::new(SUBJECT)
        .actions(simple_crud_options(
            &["list", "detail", "store", "update", "delete", "restore"],
            &[Checker::can(PermissionAction::Manage, SUBJECT)],
            "Manage categories",
        ))
        .list_shape(shape::<QueryCategoryDto>())
        .store_shape(shape::<CreateCategoryDto>())
        .update_shape(shape::<UpdateCategoryDto>())
}
