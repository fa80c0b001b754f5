use std::sync::Arc;

use actix_web::{web, HttpResponse};
use cc_auth::BearerAuth;
use cc_dto::rpc::{bye, hello, job, update};
use cc_keeper::RoomKeeper;
use cc_scheduler::OpeningBook;

use crate::error::ApiFailure;

pub async fn hello(
    _auth: BearerAuth,
    keeper: web::Data<Arc<RoomKeeper>>,
    body: web::Json<hello::Request>,
) -> Result<HttpResponse, ApiFailure> {
    let resp = keeper.hello(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resp))
}

pub async fn job(
    _auth: BearerAuth,
    keeper: web::Data<Arc<RoomKeeper>>,
    book: web::Data<Arc<dyn OpeningBook>>,
    body: web::Json<job::Request>,
) -> Result<HttpResponse, ApiFailure> {
    let resp = keeper.job(body.into_inner(), book.as_ref().as_ref()).await?;
    Ok(HttpResponse::Ok().json(resp))
}

pub async fn update(
    _auth: BearerAuth,
    keeper: web::Data<Arc<RoomKeeper>>,
    body: web::Json<update::Request>,
) -> Result<HttpResponse, ApiFailure> {
    let resp = keeper.update(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resp))
}

pub async fn bye(
    _auth: BearerAuth,
    keeper: web::Data<Arc<RoomKeeper>>,
    body: web::Json<bye::Request>,
) -> Result<HttpResponse, ApiFailure> {
    let resp = keeper.bye(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resp))
}
