use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use serde_json::json;
use tracing::info;

use crate::application::board_service::BoardService;
use crate::application::rate_limit::{Action, RateLimiter};
use crate::data::board_repository::MemoryBoardRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AttachmentForm, CreatePostForm, DeletePostRequest, into_upload};
use crate::presentation::utils::{ClientIdentity, request_id};

type Board = web::Data<BoardService<MemoryBoardRepository>>;

#[get("/posts")]
async fn list_posts(
    req: HttpRequest,
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    board: Board,
) -> Result<HttpResponse, DomainError> {
    limiter.check(&client.0, Action::ViewIndex).await?;
    let posts = board.list_posts().await?;

    info!(request_id = %request_id(&req), "posts listed");

    Ok(HttpResponse::Ok().json(json!({
        "posts": posts,
        "total": posts.len()
    })))
}

#[get("/posts/{id}")]
async fn get_post(
    req: HttpRequest,
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    board: Board,
    path: web::Path<u64>,
) -> Result<HttpResponse, DomainError> {
    limiter.check(&client.0, Action::ViewPost).await?;
    let post_id = path.into_inner();
    let detail = board.get_post(post_id).await?;

    info!(request_id = %request_id(&req), post_id, "post viewed");

    Ok(HttpResponse::Ok().json(detail))
}

#[post("/posts")]
async fn create_post(
    req: HttpRequest,
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    board: Board,
    MultipartForm(form): MultipartForm<CreatePostForm>,
) -> Result<HttpResponse, DomainError> {
    limiter.check(&client.0, Action::CreatePost).await?;
    let upload = into_upload(form.media).await?;
    let post = board
        .create_post(
            form.title.into_inner(),
            form.content.into_inner(),
            form.secret.map(|s| s.into_inner()),
            upload,
        )
        .await?;

    info!(request_id = %request_id(&req), post_id = post.id, "post created");

    Ok(HttpResponse::Created().json(post))
}

#[post("/posts/{id}/comments")]
async fn add_comment(
    req: HttpRequest,
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    board: Board,
    path: web::Path<u64>,
    MultipartForm(form): MultipartForm<AttachmentForm>,
) -> Result<HttpResponse, DomainError> {
    limiter.check(&client.0, Action::AddComment).await?;
    let post_id = path.into_inner();
    let upload = into_upload(form.media).await?;
    let comment = board
        .add_comment(post_id, form.content.into_inner(), upload)
        .await?;

    info!(
        request_id = %request_id(&req),
        post_id,
        comment_id = comment.id,
        "comment added"
    );

    Ok(HttpResponse::Created().json(comment))
}

#[post("/comments/{id}/replies")]
async fn add_reply(
    req: HttpRequest,
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    board: Board,
    path: web::Path<u64>,
    MultipartForm(form): MultipartForm<AttachmentForm>,
) -> Result<HttpResponse, DomainError> {
    limiter.check(&client.0, Action::AddReply).await?;
    let comment_id = path.into_inner();
    let upload = into_upload(form.media).await?;
    let reply = board
        .add_reply(comment_id, form.content.into_inner(), upload)
        .await?;

    info!(
        request_id = %request_id(&req),
        comment_id,
        reply_id = reply.id,
        "reply added"
    );

    Ok(HttpResponse::Created().json(reply))
}

#[delete("/posts/{id}")]
async fn delete_post(
    req: HttpRequest,
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    board: Board,
    path: web::Path<u64>,
    payload: web::Json<DeletePostRequest>,
) -> Result<HttpResponse, DomainError> {
    limiter.check(&client.0, Action::DeletePost).await?;
    let post_id = path.into_inner();
    board.delete_post(post_id, &payload.secret).await?;

    info!(request_id = %request_id(&req), post_id, "post deleted");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use async_trait::async_trait;

    use super::*;
    use crate::application::rate_limit::RateLimits;
    use crate::domain::content::MediaRef;
    use crate::infrastructure::media::MediaStore;
    use crate::presentation::middleware::RequestTrace;

    struct NullMediaStore;

    #[async_trait]
    impl MediaStore for NullMediaStore {
        async fn save(&self, _: Vec<u8>, suggested_name: &str) -> Result<MediaRef, DomainError> {
            Ok(MediaRef(suggested_name.to_owned()))
        }
    }

    fn board() -> Board {
        web::Data::new(BoardService::new(
            Arc::new(MemoryBoardRepository::new()),
            Arc::new(NullMediaStore),
            true,
        ))
    }

    fn limiter() -> web::Data<RateLimiter> {
        web::Data::new(RateLimiter::new(RateLimits::default(), false))
    }

    macro_rules! test_app {
        ($board:expr, $limiter:expr) => {
            test::init_service(
                App::new()
                    .wrap(RequestTrace)
                    .app_data($board.clone())
                    .app_data($limiter.clone())
                    .service(list_posts)
                    .service(get_post)
                    .service(create_post)
                    .service(add_comment)
                    .service(add_reply)
                    .service(delete_post),
            )
            .await
        };
    }

    const BOUNDARY: &str = "test-boundary";

    fn multipart_body(fields: &[(&str, &str)]) -> (String, String) {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            body,
        )
    }

    fn form_req(uri: &str, fields: &[(&str, &str)]) -> test::TestRequest {
        let (content_type, body) = multipart_body(fields);
        test::TestRequest::post()
            .uri(uri)
            .insert_header(("content-type", content_type))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn create_then_list_and_fetch() {
        let app = test_app!(board(), limiter());

        let res = form_req("/posts", &[("title", "A"), ("content", "hello"), ("secret", "s1")])
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(created["id"], 1);
        assert!(created.get("secret").is_none());

        let res = test::TestRequest::get()
            .uri("/posts")
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let listed: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(listed["total"], 1);

        let res = test::TestRequest::get()
            .uri("/posts/1")
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_post_is_404() {
        let app = test_app!(board(), limiter());
        let res = test::TestRequest::get()
            .uri("/posts/99")
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn oversized_content_is_400() {
        let app = test_app!(board(), limiter());
        let long = "a".repeat(201);
        let res = form_req("/posts", &[("title", "A"), ("content", &long), ("secret", "s1")])
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn comment_and_reply_nest_under_post() {
        let app = test_app!(board(), limiter());
        form_req("/posts", &[("title", "A"), ("content", "hello"), ("secret", "s1")])
            .send_request(&app)
            .await;

        let res = form_req("/posts/1/comments", &[("content", "nice")])
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = form_req("/comments/1/replies", &[("content", "thanks")])
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = test::TestRequest::get()
            .uri("/posts/1")
            .send_request(&app)
            .await;
        let detail: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(detail["comments"][0]["replies"][0]["content"], "thanks");
    }

    #[actix_web::test]
    async fn comment_on_missing_post_is_404() {
        let app = test_app!(board(), limiter());
        let res = form_req("/posts/7/comments", &[("content", "nice")])
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_requires_the_right_secret() {
        let app = test_app!(board(), limiter());
        form_req("/posts", &[("title", "A"), ("content", "hello"), ("secret", "s1")])
            .send_request(&app)
            .await;

        let res = test::TestRequest::delete()
            .uri("/posts/1")
            .set_json(serde_json::json!({ "secret": "wrong" }))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = test::TestRequest::delete()
            .uri("/posts/1")
            .set_json(serde_json::json!({ "secret": "s1" }))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::TestRequest::get()
            .uri("/posts/1")
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn rate_limited_create_is_429() {
        let app = test_app!(
            board(),
            web::Data::new(RateLimiter::new(RateLimits::default(), true))
        );
        let mut rejected = 0;
        for i in 0..10 {
            let title = format!("t{i}");
            let res = form_req("/posts", &[("title", &title), ("content", "c"), ("secret", "s")])
                .send_request(&app)
                .await;
            if res.status() == StatusCode::TOO_MANY_REQUESTS {
                rejected += 1;
            }
        }
        // 3/min cap: even if the loop straddles a minute boundary, at
        // most 6 of the 10 can be accepted
        assert!(rejected >= 4);
    }
}
