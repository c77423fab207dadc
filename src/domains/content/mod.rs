//! The `content` feature: posts, categories and comments.

pub mod category;
pub mod comment;
pub mod dto;
pub mod post;
pub mod sanitize;

use serde_json::Value;
use std::sync::Arc;

use crate::config::{Configure, PostTypeOption};
use crate::domain::{MemoryRecordStore, RecordService, RecordStore, SearchIndex, SubjectStore};
use crate::module::{FeatureDescriptor, Provider};
use crate::rbac::{RbacContribution, RoleDef, USER_ROLE};
use crate::restful::{manifest_factory, BaseController, RestfulResource};

use comment::CommentController;
use post::PostController;
use sanitize::HtmlSanitizer;

pub const FEATURE: &str = "content";
pub const POST_AUTHOR_ROLE: &str = "post-author";
pub const CONTENT_MANAGER_ROLE: &str = "content-manager";

pub fn rbac() -> RbacContribution {
    let mut contribution = RbacContribution::default();
    for subject in [post::SUBJECT, category::SUBJECT, comment::SUBJECT] {
        contribution.permissions.extend(RbacContribution::crud(subject).permissions);
    }
    contribution
        .role(RoleDef::new(USER_ROLE, ["post.read", "comment.read", "comment.create"]))
        .role(
            RoleDef::new(POST_AUTHOR_ROLE, ["post.create", "post.read"])
                .with_label("Post author", "Writes and edits their own posts"),
        )
        .role(
            RoleDef::new(
                CONTENT_MANAGER_ROLE,
                ["post.manage", "category.manage", "comment.manage"],
            )
            .with_label("Content manager", "Manages every post, category and comment"),
        )
}

pub async fn build(configure: Arc<Configure>, _params: Value) -> anyhow::Result<FeatureDescriptor> {
    let post_type = configure.get("content.post_type", PostTypeOption::All);

    let post_store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let category_store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let comment_store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());

    let post_search = configure
        .get("search.enabled", false)
        .then(|| Arc::new(SearchIndex::new(["title", "body", "summary", "keywords"])));
    let sanitizer = matches!(post_type, PostTypeOption::Html | PostTypeOption::All)
        .then(|| Arc::new(HtmlSanitizer::new()));

    let posts = Arc::new(
        RecordService::new(post::SUBJECT, post_store.clone()).with_search(post_search.clone()),
    );
    let categories = Arc::new(RecordService::new(category::SUBJECT, category_store.clone()));
    let comments = Arc::new(RecordService::new(comment::SUBJECT, comment_store.clone()));

    let post_controller = Arc::new(PostController::new(
        posts.clone(),
        categories.clone(),
        post_type,
        sanitizer.clone(),
    ));
    let category_controller = Arc::new(BaseController::new(
        category::SUBJECT,
        "/categories",
        categories,
    ));
    let comment_controller = Arc::new(CommentController::new(comments, posts.clone()));

    let mut descriptor = FeatureDescriptor::new()
        .import(super::user::FEATURE)
        .import(super::rbac::FEATURE)
        .provide_exported(Provider::shared("content.posts", posts))
        .provide(Provider::value("content.post.store", SubjectStore::new(post::SUBJECT, post_store)))
        .provide(Provider::value(
            "content.category.store",
            SubjectStore::new(category::SUBJECT, category_store),
        ))
        .provide(Provider::value(
            "content.comment.store",
            SubjectStore::new(comment::SUBJECT, comment_store),
        ))
        .provide(Provider::value("content.rbac", rbac()))
        .provide(Provider::value(
            "content.post.restful",
            RestfulResource::new(
                post_controller,
                manifest_factory(|configure: Arc<Configure>| async move {
                    Ok(post::manifest(
                        configure.get("content.post_type", PostTypeOption::All),
                    ))
                }),
            ),
        ))
        .provide(Provider::value(
            "content.category.restful",
            RestfulResource::new(
                category_controller,
                manifest_factory(|_| async { Ok(category::manifest()) }),
            ),
        ))
        .provide(Provider::value(
            "content.comment.restful",
            RestfulResource::new(
                comment_controller,
                manifest_factory(|_| async { Ok(comment::manifest()) }),
            ),
        ));

    if let Some(sanitizer) = sanitizer {
        descriptor = descriptor.provide_exported(Provider::shared("content.sanitizer", sanitizer));
    }
    if let Some(index) = post_search {
        descriptor = descriptor.provide(Provider::shared("content.post.search", index));
    }
    Ok(descriptor)
}
