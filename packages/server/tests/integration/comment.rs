use serde_json::json;

use crate::common::{TestApp, routes, sample_bytes};

mod comment_create {
    use super::*;

    #[tokio::test]
    async fn create_returns_comment_json() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(4)).await;

        let res = app
            .post_json(&routes::comments(id), &json!({ "content": "  First!  " }))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["video_id"], id);
        assert_eq!(res.body["content"], "First!");
        assert_eq!(res.body["user_identifier"], "127.0.0.1");
        assert!(res.body["created_at"].is_string());
        assert!(res.body["updated_at"].is_string());
    }

    #[tokio::test]
    async fn empty_and_oversized_content_are_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(4)).await;

        let empty = app
            .post_json(&routes::comments(id), &json!({ "content": "   " }))
            .await;
        assert_eq!(empty.status, 400);
        assert_eq!(empty.code(), "VALIDATION_ERROR");

        let long = app
            .post_json(&routes::comments(id), &json!({ "content": "x".repeat(1001) }))
            .await;
        assert_eq!(long.status, 400);

        let exact = app
            .post_json(&routes::comments(id), &json!({ "content": "x".repeat(1000) }))
            .await;
        assert_eq!(exact.status, 201);
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(4)).await;

        let res = app
            .post_json(&routes::comments(id), &json!({ "text": "wrong field" }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn comment_on_missing_video_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(&routes::comments(5), &json!({ "content": "hello" }))
            .await;

        assert_eq!(res.status, 404);
    }
}

mod comment_list {
    use super::*;

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(4)).await;
        let other = app.create_video("b.mp4", sample_bytes(4)).await;
        let c1 = app.create_comment(id, "one").await;
        let c2 = app.create_comment(id, "two").await;
        let c3 = app.create_comment(id, "three").await;
        app.create_comment(other, "elsewhere").await;

        let res = app
            .get(&format!("{}?limit=2", routes::comments(id)))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 3);
        let comments = res.body["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0]["id"], c3);
        assert_eq!(comments[1]["id"], c2);

        let res = app
            .get(&format!("{}?skip=2&limit=2", routes::comments(id)))
            .await;
        let comments = res.body["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["id"], c1);
    }

    #[tokio::test]
    async fn list_on_missing_video_is_not_found() {
        let app = TestApp::spawn().await;

        assert_eq!(app.get(&routes::comments(3)).await.status, 404);
    }
}

mod comment_edit {
    use super::*;

    #[tokio::test]
    async fn patch_updates_content() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(4)).await;
        let cid = app.create_comment(id, "draft").await;

        let res = app
            .patch_json(&routes::comment(id, cid), &json!({ "content": "final" }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["content"], "final");
        assert_eq!(res.id(), cid);
    }

    #[tokio::test]
    async fn patch_with_invalid_content_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(4)).await;
        let cid = app.create_comment(id, "draft").await;

        let res = app
            .patch_json(&routes::comment(id, cid), &json!({ "content": "" }))
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn comment_must_belong_to_video() {
        let app = TestApp::spawn().await;
        let a = app.create_video("a.mp4", sample_bytes(4)).await;
        let b = app.create_video("b.mp4", sample_bytes(4)).await;
        let cid = app.create_comment(a, "on a").await;

        let res = app
            .patch_json(&routes::comment(b, cid), &json!({ "content": "moved" }))
            .await;
        assert_eq!(res.status, 404);

        assert_eq!(app.delete(&routes::comment(b, cid)).await.status, 404);
    }

    #[tokio::test]
    async fn delete_removes_comment() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(4)).await;
        let cid = app.create_comment(id, "bye").await;

        let res = app.delete(&routes::comment(id, cid)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["comment_id"], cid);

        let list = app.get(&routes::comments(id)).await;
        assert_eq!(list.body["total"], 0);
        assert_eq!(app.delete(&routes::comment(id, cid)).await.status, 404);
    }
}
