/// 조회 핸들러 (읽기 전용)
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::error::AuctionError;
use crate::store::AuctionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Query Models

/// 기본 페이지 크기
const DEFAULT_LIMIT: i64 = 20;
/// 최대 페이지 크기
const MAX_LIMIT: i64 = 100;

/// 목록 조회 필터
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ListFilter {
    pub status: Option<AuctionStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// 목록 응답용 경매 요약
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuctionSummary {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub status: AuctionStatus,
    pub starting_price: i64,
    pub current_price: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participant_count: usize,
    pub bid_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Auction> for AuctionSummary {
    fn from(a: &Auction) -> Self {
        Self {
            id: a.id,
            title: a.title.clone(),
            category: a.category.clone(),
            status: a.status,
            starting_price: a.starting_price,
            current_price: a.current_price,
            start_time: a.start_time,
            end_time: a.end_time,
            participant_count: a.participants.len(),
            bid_count: a.bids.len(),
            created_at: a.created_at,
        }
    }
}

/// 페이지 단위 목록
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuctionPage {
    pub items: Vec<AuctionSummary>,
    pub total: usize,
    pub page: i64,
    pub limit: i64,
}

// endregion: --- Query Models

// region:    --- Query Handlers

/// 경매 조회 (상태 무관)
pub async fn get_auction(store: &dyn AuctionStore, id: i64) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", id);
    store.load(id).await
}

/// 경매 목록 조회: 필터 적용 후 최신 생성 순으로 페이지네이션
pub async fn list_auctions(
    store: &dyn AuctionStore,
    filter: &ListFilter,
) -> Result<AuctionPage, AuctionError> {
    info!("{:<12} --> 경매 목록 조회: {:?}", "Query", filter);

    let mut auctions: Vec<Auction> = store
        .find_all()
        .await?
        .into_iter()
        .filter(|a| matches_filter(a, filter))
        .collect();
    auctions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = auctions.len();
    let page = filter.page.unwrap_or(1).max(1);
    let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    // page 는 클라이언트 입력이므로 곱셈 오버플로를 포화 연산으로 막는다
    let offset = (page - 1).saturating_mul(limit) as usize;

    let items = auctions
        .iter()
        .skip(offset)
        .take(limit as usize)
        .map(AuctionSummary::from)
        .collect();

    Ok(AuctionPage {
        items,
        total,
        page,
        limit,
    })
}

fn matches_filter(auction: &Auction, filter: &ListFilter) -> bool {
    if let Some(status) = filter.status {
        if auction.status != status {
            return false;
        }
    }
    if let Some(category) = &filter.category {
        if !auction.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !auction.title.to_lowercase().contains(&needle)
            && !auction.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

/// 입찰 이력 조회 (최신 순)
pub async fn get_bid_history(
    store: &dyn AuctionStore,
    id: i64,
) -> Result<Vec<Bid>, AuctionError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", id);
    let auction = store.load(id).await?;
    let mut bids = auction.bids;
    bids.reverse();
    Ok(bids)
}

/// 최고 입찰가 조회
pub async fn get_highest_bid(
    store: &dyn AuctionStore,
    id: i64,
) -> Result<Option<i64>, AuctionError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", id);
    let auction = store.load(id).await?;
    Ok(auction.highest_bid().map(|b| b.amount))
}

// endregion: --- Query Handlers
