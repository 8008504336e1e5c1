use crate::common::{TestApp, routes, sample_bytes};

#[tokio::test]
async fn toggle_likes_then_unlikes() {
    let app = TestApp::spawn().await;
    let id = app.create_video("a.mp4", sample_bytes(4)).await;

    let first = app.post(&routes::like(id)).await;
    assert_eq!(first.status, 200, "{}", first.text);
    assert_eq!(first.body["is_liked"], true);
    assert_eq!(first.body["like_count"], 1);
    assert_eq!(first.body["video_id"], id);

    let second = app.post(&routes::like(id)).await;
    assert_eq!(second.body["is_liked"], false);
    assert_eq!(second.body["like_count"], 0);
}

#[tokio::test]
async fn status_reflects_caller_like() {
    let app = TestApp::spawn().await;
    let id = app.create_video("a.mp4", sample_bytes(4)).await;

    let before = app.get(&routes::like(id)).await;
    assert_eq!(before.status, 200);
    assert_eq!(before.body["is_liked"], false);
    assert_eq!(before.body["like_count"], 0);

    app.post(&routes::like(id)).await;

    let after = app.get(&routes::like(id)).await;
    assert_eq!(after.body["is_liked"], true);
    assert_eq!(after.body["like_count"], 1);
}

#[tokio::test]
async fn explicit_unlike() {
    let app = TestApp::spawn().await;
    let id = app.create_video("a.mp4", sample_bytes(4)).await;

    let res = app.delete(&routes::like(id)).await;
    assert_eq!(res.status, 404);

    app.post(&routes::like(id)).await;
    let res = app.delete(&routes::like(id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["is_liked"], false);
    assert_eq!(res.body["like_count"], 0);
}

#[tokio::test]
async fn likes_are_per_video() {
    let app = TestApp::spawn().await;
    let a = app.create_video("a.mp4", sample_bytes(4)).await;
    let b = app.create_video("b.mp4", sample_bytes(4)).await;

    app.post(&routes::like(a)).await;

    let res = app.get(&routes::like(b)).await;
    assert_eq!(res.body["like_count"], 0);
    assert_eq!(res.body["is_liked"], false);
}

#[tokio::test]
async fn like_on_missing_video_is_not_found() {
    let app = TestApp::spawn().await;

    assert_eq!(app.post(&routes::like(12)).await.status, 404);
    assert_eq!(app.get(&routes::like(12)).await.status, 404);
}

#[tokio::test]
async fn concurrent_toggles_never_duplicate() {
    let app = TestApp::spawn().await;
    let id = app.create_video("a.mp4", sample_bytes(4)).await;

    let path = routes::like(id);
    let (r1, r2) = tokio::join!(app.post(&path), app.post(&path));
    assert_eq!(r1.status, 200);
    assert_eq!(r2.status, 200);

    let res = app.get(&path).await;
    let count = res.body["like_count"].as_u64().unwrap();
    assert!(count <= 1, "like_count = {count}");
}
