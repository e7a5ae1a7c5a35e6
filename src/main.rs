// region:    --- Imports
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Modules
mod auction;
mod bidding;
mod database;
mod error;
mod handlers;
mod participation;
mod query;
mod scheduler;
mod store;
mod winner;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let db_manager = match database::DatabaseManager::new().await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
            return Err(e.into());
        }
    };

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 저장소 및 주문 협력자 생성
    let auction_store: Arc<dyn store::AuctionStore> =
        Arc::new(store::postgres::PgAuctionStore::new(Arc::clone(&db_manager)));
    let order_gateway: Arc<dyn winner::OrderGateway> =
        Arc::new(winner::MemoryOrderGateway::new());

    // 경매 상태 스케줄러 시작
    let sweep_interval = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let auction_scheduler = scheduler::AuctionScheduler::new(
        Arc::clone(&auction_store),
        Arc::clone(&order_gateway),
        sweep_interval,
    );
    auction_scheduler.start().await;
    info!(
        "{:<12} --> 스케줄러 시작 (주기 {}초)",
        "Main", sweep_interval
    );

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        .route("/auctions", post(handlers::handle_create))
        .route("/auctions", get(handlers::handle_list_auctions))
        .route("/auctions/:id", get(handlers::handle_get_auction))
        .route("/auctions/:id", delete(handlers::handle_delete))
        .route("/auctions/:id/approve", post(handlers::handle_approve))
        .route("/auctions/:id/reject", post(handlers::handle_reject))
        .route("/auctions/:id/cancel", post(handlers::handle_cancel))
        .route("/auctions/:id/join", post(handlers::handle_join))
        .route("/auctions/:id/bid", post(handlers::handle_bid))
        .route("/auctions/:id/bids", get(handlers::handle_get_bid_history))
        .route(
            "/auctions/:id/highest-bid",
            get(handlers::handle_get_highest_bid),
        )
        .route("/scheduler/sweep", post(handlers::handle_run_sweep))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 20))
        .with_state((auction_store, order_gateway));

    // 리스너 생성
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
