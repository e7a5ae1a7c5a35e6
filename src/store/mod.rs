/// 경매 저장소 추상화
/// save 는 버전 비교(compare-and-swap)로 동시 수정을 감지하고,
/// 덮어쓰는 대신 Conflict 를 반환한다. 모든 변경 커맨드는 이 충돌을
/// 재시도 루프(MAX_RETRIES)로 흡수한다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus};
use crate::error::AuctionError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

pub mod postgres;

// endregion: --- Imports

// region:    --- Store Trait

/// 낙관적 재시도 한도
pub const MAX_RETRIES: i32 = 100;

/// 경매 저장소 트레이트
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// 신규 경매 저장. id 를 부여해 돌려준다.
    async fn insert(&self, auction: Auction) -> Result<Auction, AuctionError>;

    /// id 로 경매 조회
    async fn load(&self, id: i64) -> Result<Auction, AuctionError>;

    /// 버전 비교 저장. 저장된 버전이 `auction.version` 과 다르면 Conflict.
    /// 성공 시 버전이 1 증가된 경매를 돌려준다.
    async fn save(&self, auction: &Auction) -> Result<Auction, AuctionError>;

    /// 버전 비교 삭제. 저장된 버전이 `version` 과 다르면 Conflict.
    /// 삭제도 다른 변경과 같은 직렬화 규칙을 따라야 한다.
    async fn delete(&self, id: i64, version: i64) -> Result<(), AuctionError>;

    /// 전체 경매 조회 (목록/검색용)
    async fn find_all(&self) -> Result<Vec<Auction>, AuctionError>;

    /// 스케줄러 대상 조회: 시간 경과에 따라 전이될 수 있는 경매
    async fn find_approved_or_active(&self) -> Result<Vec<Auction>, AuctionError>;

    /// 종료되었으나 아직 낙찰 처리되지 않은 경매 조회
    async fn find_ended_unresolved(&self) -> Result<Vec<Auction>, AuctionError>;
}

// endregion: --- Store Trait

// region:    --- Memory Store

/// 인메모리 저장소 구현체 (테스트 및 로컬 실행용)
pub struct MemoryAuctionStore {
    auctions: RwLock<HashMap<i64, Auction>>,
    next_id: AtomicI64,
}

impl MemoryAuctionStore {
    pub fn new() -> Self {
        Self {
            auctions: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryAuctionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuctionStore for MemoryAuctionStore {
    async fn insert(&self, mut auction: Auction) -> Result<Auction, AuctionError> {
        let mut auctions = self.auctions.write().await;
        auction.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        auctions.insert(auction.id, auction.clone());
        Ok(auction)
    }

    async fn load(&self, id: i64) -> Result<Auction, AuctionError> {
        let auctions = self.auctions.read().await;
        auctions.get(&id).cloned().ok_or(AuctionError::NotFound)
    }

    async fn save(&self, auction: &Auction) -> Result<Auction, AuctionError> {
        let mut auctions = self.auctions.write().await;
        let stored = auctions.get(&auction.id).ok_or(AuctionError::NotFound)?;

        // 버전이 다르면 다른 쓰기가 먼저 커밋된 것
        if stored.version != auction.version {
            return Err(AuctionError::Conflict);
        }

        let mut saved = auction.clone();
        saved.version += 1;
        auctions.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: i64, version: i64) -> Result<(), AuctionError> {
        let mut auctions = self.auctions.write().await;
        let stored = auctions.get(&id).ok_or(AuctionError::NotFound)?;
        if stored.version != version {
            return Err(AuctionError::Conflict);
        }
        auctions.remove(&id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Auction>, AuctionError> {
        let auctions = self.auctions.read().await;
        Ok(auctions.values().cloned().collect())
    }

    async fn find_approved_or_active(&self) -> Result<Vec<Auction>, AuctionError> {
        let auctions = self.auctions.read().await;
        Ok(auctions
            .values()
            .filter(|a| {
                matches!(a.status, AuctionStatus::Approved | AuctionStatus::Active)
            })
            .cloned()
            .collect())
    }

    async fn find_ended_unresolved(&self) -> Result<Vec<Auction>, AuctionError> {
        let auctions = self.auctions.read().await;
        Ok(auctions
            .values()
            .filter(|a| a.status == AuctionStatus::Ended && !a.winner_resolved)
            .cloned()
            .collect())
    }
}

// endregion: --- Memory Store
