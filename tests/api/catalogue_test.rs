//! Manga and novel catalogues

use super::{test_configure, TestApp};
use axum::http::StatusCode;
use folio_core::domains;
use folio_core::module::Registration;
use serde_json::{json, Value};

fn manga(title: &str, tags: &[&str]) -> Value {
    json!({
        "title": title,
        "author": "Oda",
        "tags": tags,
        "generated_time": "2024-05-01T10:00:00Z",
    })
}

#[tokio::test]
async fn test_manga_editor_adds_and_guest_reads() {
    let app = TestApp::spawn().await;

    let (status, _) = app.post("/api/mangas", None, manga("One Piece", &["pirates"])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, reader) = app.login(&["user"]);
    let (status, _) = app
        .post("/api/mangas", Some(&reader), manga("One Piece", &["pirates"]))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, editor) = app.login(&["manga-editor"]);
    let (status, created) = app
        .post("/api/mangas", Some(&editor), manga("One Piece", &["pirates"]))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.unwrap()["status"], json!("serializing"));
    app.post("/api/mangas", Some(&editor), manga("Naruto", &["ninja"]))
        .await;

    let (status, list) = app.get("/api/mangas?tags=ninja", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.unwrap();
    assert_eq!(list["pagination"]["total"], json!(1));
    assert_eq!(list["data"][0]["title"], json!("Naruto"));
}

#[tokio::test]
async fn test_manga_delete_needs_manager() {
    let app = TestApp::spawn().await;
    let (_, editor) = app.login(&["manga-editor"]);
    let (_, created) = app
        .post("/api/mangas", Some(&editor), manga("Bleach", &[]))
        .await;
    let id = created.unwrap()["id"].clone();

    let (status, _) = app.delete("/api/mangas", Some(&editor), json!({"items": [id]})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, manager) = app.login(&["manga-manager"]);
    let (status, _) = app
        .delete("/api/mangas", Some(&manager), json!({"items": [id], "trash": true}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, trashed) = app.get("/api/mangas?trashed=only", None).await;
    assert_eq!(trashed.unwrap()["pagination"]["total"], json!(1));

    let (status, restored) = app
        .patch("/api/mangas/restore", Some(&manager), json!({"items": [id]}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored.unwrap().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_when_enabled() {
    let app = TestApp::spawn_with(&[("search.enabled", "true")]).await;
    let (_, editor) = app.login(&["manga-editor"]);
    app.post("/api/mangas", Some(&editor), manga("Vinland Saga", &["vikings"]))
        .await;
    app.post("/api/mangas", Some(&editor), manga("Berserk", &["dark"]))
        .await;

    let (_, found) = app.get("/api/mangas?search=viking", None).await;
    assert_eq!(found.unwrap()["pagination"]["total"], json!(1));
}

#[tokio::test]
async fn test_novel_allow_guest_param() {
    let configure = test_configure(&[]);
    let app = TestApp::boot(
        &domains::registry(),
        configure,
        &[
            Registration::from("rbac"),
            Registration::from("restful"),
            Registration::from("novel").with_params(json!({"allow_guest": true})),
        ],
        None,
    )
    .await;

    let (status, created) = app
        .post(
            "/api/novels",
            None,
            json!({"name": "Dune", "author": "Herbert", "crawl_time": "2024-01-01T00:00:00Z"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.unwrap()["owner_id"], json!(uuid::Uuid::nil()));

    let (status, _) = app
        .post(
            "/api/novels",
            None,
            json!({"name": "Dune", "author": "Herbert", "rating": 11, "crawl_time": "2024-01-01T00:00:00Z"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_numeric_query_values_stay_text() {
    let app = TestApp::spawn_with(&[("search.enabled", "true")]).await;
    let (_, editor) = app.login(&["manga-editor"]);
    app.post("/api/mangas", Some(&editor), manga("Dandadan", &["2024"]))
        .await;
    app.post("/api/mangas", Some(&editor), manga("Akira", &["1982"]))
        .await;

    let (status, tagged) = app.get("/api/mangas?tags=2024", None).await;
    assert_eq!(status, StatusCode::OK);
    let tagged = tagged.unwrap();
    assert_eq!(tagged["pagination"]["total"], json!(1));
    assert_eq!(tagged["data"][0]["title"], json!("Dandadan"));

    let (status, found) = app.get("/api/mangas?search=1982&page=1&limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    let found = found.unwrap();
    assert_eq!(found["pagination"]["total"], json!(1));
    assert_eq!(found["data"][0]["title"], json!("Akira"));

    let (status, _) = app.get("/api/mangas?limit=lots", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_manga_chapters_and_chapter_count_filters() {
    let app = TestApp::spawn().await;
    let (_, editor) = app.login(&["manga-editor"]);
    let (_, created) = app
        .post("/api/mangas", Some(&editor), manga("Monster", &[]))
        .await;
    let manga_id = created.unwrap()["id"].clone();
    app.post("/api/mangas", Some(&editor), manga("Pluto", &[]))
        .await;

    let chapter = |name: &str, order: i32| {
        json!({"manga_id": manga_id, "chapter_name": name, "sort_order": order})
    };
    let (status, _) = app.post("/api/manga-chapters", None, chapter("Ch. 1", 1)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, reader) = app.login(&["user"]);
    let (status, _) = app
        .post("/api/manga-chapters", Some(&reader), chapter("Ch. 1", 1))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for (name, order) in [("Ch. 2", 2), ("Ch. 1", 1), ("Ch. 3", 3)] {
        let (status, _) = app
            .post("/api/manga-chapters", Some(&editor), chapter(name, order))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = app
        .post(
            "/api/manga-chapters",
            Some(&editor),
            json!({"manga_id": uuid::Uuid::new_v4(), "chapter_name": "Lost"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let path = format!("/api/manga-chapters?manga_id={}", manga_id.as_str().unwrap());
    let (status, chapters) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::OK);
    let chapters = chapters.unwrap();
    assert_eq!(chapters["pagination"]["total"], json!(3));
    assert_eq!(chapters["data"][0]["chapter_name"], json!("Ch. 1"));
    let first_chapter = chapters["data"][0]["id"].clone();

    let (status, image) = app
        .post(
            "/api/manga-images",
            Some(&editor),
            json!({"chapter_id": first_chapter, "image_url": "https://img.example.com/1.png"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(image.unwrap()["manga_id"], manga_id);

    let (_, ranged) = app.get("/api/mangas?min_chapters=3", None).await;
    let ranged = ranged.unwrap();
    assert_eq!(ranged["pagination"]["total"], json!(1));
    assert_eq!(ranged["data"][0]["title"], json!("Monster"));
    assert_eq!(ranged["data"][0]["total_chapters"], json!(3));

    let (_, short) = app.get("/api/mangas?max_chapters=2", None).await;
    let short = short.unwrap();
    assert_eq!(short["pagination"]["total"], json!(1));
    assert_eq!(short["data"][0]["title"], json!("Pluto"));
}

#[tokio::test]
async fn test_novel_volumes_carry_their_chapters() {
    let app = TestApp::spawn().await;
    let (_, editor) = app.login(&["novel-editor"]);
    let (_, novel) = app
        .post(
            "/api/novels",
            Some(&editor),
            json!({"name": "Dune", "author": "Herbert", "crawl_time": "2024-01-01T00:00:00Z"}),
        )
        .await;
    let novel_id = novel.unwrap()["id"].clone();

    let (status, volume) = app
        .post(
            "/api/novel-volumes",
            Some(&editor),
            json!({"novel_id": novel_id, "volume_name": "Book One"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let volume_id = volume.unwrap()["id"].clone();

    let (status, chapter) = app
        .post(
            "/api/novel-chapters",
            Some(&editor),
            json!({"volume_id": volume_id, "chapter_title": "Arrakis", "word_count": 4200}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chapter.unwrap()["novel_id"], novel_id);

    let path = format!("/api/novel-chapters?novel_id={}", novel_id.as_str().unwrap());
    let (_, listed) = app.get(&path, None).await;
    assert_eq!(listed.unwrap()["pagination"]["total"], json!(1));
}
