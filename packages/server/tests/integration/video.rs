use sea_orm::EntityTrait;
use shorts_server::entity::video;

use crate::common::{TEST_MAX_UPLOAD, TestApp, routes, sample_bytes};

mod video_upload {
    use super::*;

    #[tokio::test]
    async fn upload_returns_asset_json() {
        let app = TestApp::spawn().await;

        let res = app.upload("beach.mp4", sample_bytes(1000)).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["original_filename"], "beach.mp4");
        assert_eq!(res.body["file_size"], 1000);
        assert_eq!(res.body["content_type"], "video/mp4");
        let key = res.body["filename"].as_str().unwrap();
        assert!(key.ends_with(".mp4"));
        assert_ne!(key, "beach.mp4");
        assert!(res.body["file_path"].as_str().unwrap().ends_with(key));
        assert!(res.body["uploaded_at"].is_string());
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn extension_is_case_insensitive() {
        let app = TestApp::spawn().await;

        let res = app.upload("CLIP.MOV", sample_bytes(10)).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["filename"].as_str().unwrap().ends_with(".mov"));
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected_without_side_effects() {
        let app = TestApp::spawn().await;

        let res = app.upload("notes.txt", b"hello".to_vec()).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_FORMAT");
        assert!(app.stored_files().is_empty());
        assert!(video::Entity::find().all(&app.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_without_side_effects() {
        let app = TestApp::spawn().await;

        let res = app
            .upload("big.mp4", sample_bytes(TEST_MAX_UPLOAD as usize + 1))
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "TOO_LARGE");
        assert!(app.stored_files().is_empty());
        assert!(video::Entity::find().all(&app.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_at_limit_is_accepted() {
        let app = TestApp::spawn().await;

        let res = app
            .upload("edge.webm", sample_bytes(TEST_MAX_UPLOAD as usize))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = TestApp::spawn().await;

        let form = reqwest::multipart::Form::new().text("title", "nothing");
        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::UPLOAD))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
    }
}

mod video_read {
    use super::*;

    #[tokio::test]
    async fn get_returns_metadata() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(5)).await;

        let res = app.get(&routes::video(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.id(), id);
        assert_eq!(res.body["original_filename"], "a.mp4");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::video(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn list_paginates_newest_first() {
        let app = TestApp::spawn().await;
        let mut ids = Vec::new();
        for i in 0..3 {
            ids.push(app.create_video(&format!("v{i}.mp4"), sample_bytes(4)).await);
        }

        let res = app.get(&format!("{}?skip=0&limit=2", routes::VIDEOS)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 3);
        let videos = res.body["videos"].as_array().unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0]["id"], ids[2]);
        assert_eq!(videos[1]["id"], ids[1]);

        let res = app.get(&format!("{}?skip=2&limit=2", routes::VIDEOS)).await;
        let videos = res.body["videos"].as_array().unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0]["id"], ids[0]);
    }

    #[tokio::test]
    async fn search_matches_case_insensitively() {
        let app = TestApp::spawn().await;
        app.create_video("Sunset Beach.mp4", sample_bytes(4)).await;
        app.create_video("city_night.mp4", sample_bytes(4)).await;

        let res = app.get(&format!("{}?q=beach", routes::SEARCH)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 1);
        assert_eq!(res.body["videos"][0]["original_filename"], "Sunset Beach.mp4");
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let app = TestApp::spawn().await;
        app.create_video("city_night.mp4", sample_bytes(4)).await;
        app.create_video("cityXnight.mp4", sample_bytes(4)).await;

        let res = app.get(&format!("{}?q=y_n", routes::SEARCH)).await;

        assert_eq!(res.body["total"], 1);
        assert_eq!(res.body["videos"][0]["original_filename"], "city_night.mp4");
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{}?q=%20", routes::SEARCH)).await;

        assert_eq!(res.status, 400);
    }
}

mod video_replace {
    use super::*;

    #[tokio::test]
    async fn replace_file_switches_key_and_removes_old_object() {
        let app = TestApp::spawn().await;
        let upload = app.upload("old.mp4", sample_bytes(100)).await;
        let id = upload.id();
        let old_key = upload.body["filename"].as_str().unwrap().to_string();

        let res = app
            .replace(id, Some(("new.webm", sample_bytes(40))), None)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new_key = res.body["filename"].as_str().unwrap();
        assert_ne!(new_key, old_key);
        assert!(new_key.ends_with(".webm"));
        assert_eq!(res.body["file_size"], 40);
        assert_eq!(res.body["original_filename"], "new.webm");

        let files = app.stored_files();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with(new_key));

        let streamed = app.get_raw(&routes::stream(id), None).await;
        assert_eq!(streamed.bytes, sample_bytes(40));
    }

    #[tokio::test]
    async fn replace_with_display_name_only_renames() {
        let app = TestApp::spawn().await;
        let upload = app.upload("old.mp4", sample_bytes(10)).await;
        let id = upload.id();

        let res = app.replace(id, None, Some("Holiday")).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["original_filename"], "Holiday");
        assert_eq!(res.body["filename"], upload.body["filename"]);
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn replace_with_file_and_name_uses_name() {
        let app = TestApp::spawn().await;
        let id = app.create_video("old.mp4", sample_bytes(10)).await;

        let res = app
            .replace(id, Some(("raw_0001.mp4", sample_bytes(12))), Some("Final cut"))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["original_filename"], "Final cut");
    }

    #[tokio::test]
    async fn replace_without_changes_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_video("old.mp4", sample_bytes(10)).await;

        let res = app.replace(id, None, None).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn replace_with_bad_format_keeps_original() {
        let app = TestApp::spawn().await;
        let upload = app.upload("old.mp4", sample_bytes(10)).await;
        let id = upload.id();

        let res = app
            .replace(id, Some(("doc.pdf", b"%PDF".to_vec())), None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_FORMAT");
        let current = app.get(&routes::video(id)).await;
        assert_eq!(current.body["filename"], upload.body["filename"]);
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn replace_missing_video_stores_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .replace(404, Some(("new.mp4", sample_bytes(10))), None)
            .await;

        assert_eq!(res.status, 404);
        assert!(app.stored_files().is_empty());
    }
}

mod video_delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_record_and_file() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(10)).await;

        let res = app.delete(&routes::video(id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["video_id"], id);
        assert_eq!(res.body["file_deleted"], true);
        assert!(res.body["message"].is_string());
        assert!(app.stored_files().is_empty());
        assert_eq!(app.get(&routes::video(id)).await.status, 404);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(10)).await;
        let other = app.create_video("b.mp4", sample_bytes(10)).await;

        assert_eq!(app.delete(&routes::video(id)).await.status, 200);
        let res = app.delete(&routes::video(id)).await;

        assert_eq!(res.status, 404);
        assert_eq!(app.get(&routes::video(other)).await.status, 200);
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_likes_and_comments() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(10)).await;
        app.post(&routes::like(id)).await;
        app.create_comment(id, "nice").await;

        assert_eq!(app.delete(&routes::video(id)).await.status, 200);

        use shorts_server::entity::{comment, like};
        assert!(like::Entity::find().all(&app.db).await.unwrap().is_empty());
        assert!(comment::Entity::find().all(&app.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_after_delete_is_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_video("a.mp4", sample_bytes(10)).await;
        app.delete(&routes::video(id)).await;

        let res = app.get_raw(&routes::stream(id), None).await;

        assert_eq!(res.status, 404);
    }
}
