// region:    --- Imports
use crate::auction::commands::{
    handle_approve_auction, handle_cancel_auction, handle_create_auction, handle_delete_auction,
    handle_reject_auction, ApproveAuctionCommand, CancelAuctionCommand, CreateAuctionCommand,
    DeleteAuctionCommand, RejectAuctionCommand,
};
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::error::AuctionError;
use crate::participation::commands::{handle_join_auction, JoinAuctionCommand};
use crate::query::handlers::{self as query_handlers, ListFilter};
use crate::scheduler;
use crate::store::AuctionStore;
use crate::winner::OrderGateway;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- App State

/// 라우터 공유 상태: 경매 저장소 + 주문 생성 협력자
pub type AppState = (Arc<dyn AuctionStore>, Arc<dyn OrderGateway>);

// endregion: --- App State

// region:    --- Request Models

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub admin_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub admin_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub user_id: i64,
    #[serde(default)]
    pub as_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BidRequest {
    pub bidder_id: i64,
    pub bid_amount: i64,
}

// endregion: --- Request Models

// region:    --- Error Mapping

/// 도메인 에러를 HTTP 응답으로 변환
fn error_response(e: AuctionError) -> Response {
    let status = match &e {
        AuctionError::NotFound => StatusCode::NOT_FOUND,
        AuctionError::Forbidden => StatusCode::FORBIDDEN,
        AuctionError::Conflict => StatusCode::CONFLICT,
        AuctionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(e.to_json())).into_response()
}

// endregion: --- Error Mapping

// region:    --- Command Handlers

/// 경매 생성 요청 처리
pub async fn handle_create(
    State((store, _)): State<AppState>,
    Json(cmd): Json<CreateAuctionCommand>,
) -> impl IntoResponse {
    match handle_create_auction(cmd, store.as_ref()).await {
        Ok(auction) => (StatusCode::CREATED, Json(auction)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 승인 요청 처리
pub async fn handle_approve(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<ApproveRequest>,
) -> impl IntoResponse {
    let cmd = ApproveAuctionCommand {
        auction_id,
        admin_id: req.admin_id,
    };
    match handle_approve_auction(cmd, store.as_ref()).await {
        Ok(auction) => Json(auction).into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 거절 요청 처리
pub async fn handle_reject(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> impl IntoResponse {
    let cmd = RejectAuctionCommand {
        auction_id,
        admin_id: req.admin_id,
    };
    match handle_reject_auction(cmd, store.as_ref()).await {
        Ok(auction) => Json(auction).into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 취소 요청 처리
pub async fn handle_cancel(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<CancelRequest>,
) -> impl IntoResponse {
    let cmd = CancelAuctionCommand {
        auction_id,
        user_id: req.user_id,
        as_admin: req.as_admin,
    };
    match handle_cancel_auction(cmd, store.as_ref()).await {
        Ok(auction) => Json(auction).into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 삭제 요청 처리
pub async fn handle_delete(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<DeleteRequest>,
) -> impl IntoResponse {
    let cmd = DeleteAuctionCommand {
        auction_id,
        user_id: req.user_id,
    };
    match handle_delete_auction(cmd, store.as_ref()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 참가 요청 처리
pub async fn handle_join(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<JoinRequest>,
) -> impl IntoResponse {
    let cmd = JoinAuctionCommand {
        auction_id,
        user_id: req.user_id,
    };
    match handle_join_auction(cmd, store.as_ref()).await {
        Ok(auction) => Json(auction).into_response(),
        Err(e) => error_response(e),
    }
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<BidRequest>,
) -> impl IntoResponse {
    let cmd = PlaceBidCommand {
        auction_id,
        bidder_id: req.bidder_id,
        bid_amount: req.bid_amount,
    };
    let bid_amount = cmd.bid_amount;
    match handle_place_bid(cmd, store.as_ref()).await {
        Ok(auction) => Json(serde_json::json!({
            "message": "입찰이 성공적으로 처리되었습니다.",
            "current_price": auction.current_price,
            "bid_amount": bid_amount
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// 스케줄러 스윕 트리거 처리 (외부 주기 실행기가 호출)
pub async fn handle_run_sweep(State((store, gateway)): State<AppState>) -> impl IntoResponse {
    info!("{:<12} --> 스윕 트리거 요청", "Handler");
    match scheduler::run_sweep(store.as_ref(), gateway.as_ref(), Utc::now()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 경매 목록 조회
pub async fn handle_list_auctions(
    State((store, _)): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> impl IntoResponse {
    match query_handlers::list_auctions(store.as_ref(), &filter).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => error_response(e),
    }
}

/// 경매 단건 조회
pub async fn handle_get_auction(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    match query_handlers::get_auction(store.as_ref(), auction_id).await {
        Ok(auction) => Json(auction).into_response(),
        Err(e) => error_response(e),
    }
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    match query_handlers::get_bid_history(store.as_ref(), auction_id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => error_response(e),
    }
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid(
    State((store, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    match query_handlers::get_highest_bid(store.as_ref(), auction_id).await {
        Ok(highest) => Json(serde_json::json!({ "highest_bid": highest })).into_response(),
        Err(e) => error_response(e),
    }
}

// endregion: --- Query Handlers
