//! # rf-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core use
//! cases. Handlers stay thin: extract, call `execute`, wrap the result in the
//! `{status, data}` envelope.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use rf_core::traits::{AuthProvider, AuthenticationRepo, CommentRepo, ReplyRepo, ThreadRepo, UserRepo};
use rf_core::{
    AddCommentUseCase, AddReplyUseCase, AddThreadUseCase, AddUserUseCase, DeleteCommentUseCase,
    DeleteReplyUseCase, DetailThreadUseCase, LoginUserUseCase, LogoutUserUseCase,
    RefreshAuthenticationUseCase,
};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::ApiError;

type HandlerResult = Result<HttpResponse, ApiError>;

/// Concrete adapters chosen by the binary.
pub struct Ports {
    pub users: Arc<dyn UserRepo>,
    pub authentications: Arc<dyn AuthenticationRepo>,
    pub threads: Arc<dyn ThreadRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub replies: Arc<dyn ReplyRepo>,
    pub auth: Arc<dyn AuthProvider>,
}

/// State shared across all Actix-web workers.
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    add_user: AddUserUseCase,
    login: LoginUserUseCase,
    refresh: RefreshAuthenticationUseCase,
    logout: LogoutUserUseCase,
    add_thread: AddThreadUseCase,
    detail_thread: DetailThreadUseCase,
    add_comment: AddCommentUseCase,
    delete_comment: DeleteCommentUseCase,
    add_reply: AddReplyUseCase,
    delete_reply: DeleteReplyUseCase,
}

impl AppState {
    pub fn new(ports: Ports) -> Self {
        let Ports { users, authentications, threads, comments, replies, auth } = ports;
        Self {
            add_user: AddUserUseCase::new(users.clone(), auth.clone()),
            login: LoginUserUseCase::new(users, authentications.clone(), auth.clone()),
            refresh: RefreshAuthenticationUseCase::new(authentications.clone(), auth.clone()),
            logout: LogoutUserUseCase::new(authentications),
            add_thread: AddThreadUseCase::new(threads.clone()),
            detail_thread: DetailThreadUseCase::new(threads.clone(), comments.clone(), replies.clone()),
            add_comment: AddCommentUseCase::new(threads.clone(), comments.clone()),
            delete_comment: DeleteCommentUseCase::new(threads.clone(), comments.clone()),
            add_reply: AddReplyUseCase::new(threads.clone(), comments.clone(), replies.clone()),
            delete_reply: DeleteReplyUseCase::new(threads, comments, replies),
            auth,
        }
    }
}

fn success() -> Value {
    json!({ "status": "success" })
}

fn success_with(data: Value) -> Value {
    json!({ "status": "success", "data": data })
}

pub async fn hello() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "success", "message": "Hello World!" }))
}

pub async fn post_user(data: web::Data<AppState>, body: web::Json<Value>) -> HandlerResult {
    let added_user = data.add_user.execute(&body).await?;
    Ok(HttpResponse::Created().json(success_with(json!({ "addedUser": added_user }))))
}

pub async fn post_authentication(data: web::Data<AppState>, body: web::Json<Value>) -> HandlerResult {
    let tokens = data.login.execute(&body).await?;
    Ok(HttpResponse::Created().json(success_with(json!(tokens))))
}

pub async fn put_authentication(data: web::Data<AppState>, body: web::Json<Value>) -> HandlerResult {
    let access_token = data.refresh.execute(&body).await?;
    Ok(HttpResponse::Ok().json(success_with(json!({ "accessToken": access_token }))))
}

pub async fn delete_authentication(data: web::Data<AppState>, body: web::Json<Value>) -> HandlerResult {
    data.logout.execute(&body).await?;
    Ok(HttpResponse::Ok().json(success()))
}

pub async fn post_thread(
    data: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<Value>,
) -> HandlerResult {
    let added_thread = data.add_thread.execute(&body, user.id()).await?;
    Ok(HttpResponse::Created().json(success_with(json!({ "addedThread": added_thread }))))
}

pub async fn get_thread(data: web::Data<AppState>, path: web::Path<String>) -> HandlerResult {
    let thread = data.detail_thread.execute(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(success_with(json!({ "thread": thread }))))
}

pub async fn post_comment(
    data: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HandlerResult {
    let thread_id = path.into_inner();
    let added_comment = data.add_comment.execute(&body, &thread_id, user.id()).await?;
    Ok(HttpResponse::Created().json(success_with(json!({ "addedComment": added_comment }))))
}

pub async fn delete_comment(
    data: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(String, String)>,
) -> HandlerResult {
    let (thread_id, comment_id) = path.into_inner();
    data.delete_comment.execute(&thread_id, &comment_id, user.id()).await?;
    Ok(HttpResponse::Ok().json(success()))
}

pub async fn post_reply(
    data: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(String, String)>,
    body: web::Json<Value>,
) -> HandlerResult {
    let (thread_id, comment_id) = path.into_inner();
    let added_reply = data
        .add_reply
        .execute(&body, &thread_id, &comment_id, user.id())
        .await?;
    Ok(HttpResponse::Created().json(success_with(json!({ "addedReply": added_reply }))))
}

pub async fn delete_reply(
    data: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(String, String, String)>,
) -> HandlerResult {
    let (thread_id, comment_id, reply_id) = path.into_inner();
    data.delete_reply
        .execute(&thread_id, &comment_id, &reply_id, user.id())
        .await?;
    Ok(HttpResponse::Ok().json(success()))
}
