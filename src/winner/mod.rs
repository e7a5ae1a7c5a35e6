/// 낙찰 처리
/// 종료된 경매에서 최고 입찰을 낙찰자로 확정하고, 외부 주문 생성
/// 협력자(OrderGateway)에게 낙찰 사실을 전달한다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus};
use crate::error::AuctionError;
use crate::store::{AuctionStore, MAX_RETRIES};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Order Gateway

/// 낙찰 주문 요청
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub auction_id: i64,
    pub winner_id: i64,
    pub amount: i64,
    pub requested_at: DateTime<Utc>,
}

/// 주문 생성 협력자 트레이트
/// 구현체는 경매당 최대 한 건의 주문만 생성해야 한다 (멱등성).
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(
        &self,
        auction_id: i64,
        winner_id: i64,
        amount: i64,
    ) -> Result<(), AuctionError>;
}

/// 인메모리 주문 협력자 구현체
/// 경매 id 기준으로 중복 주문을 걸러낸다.
pub struct MemoryOrderGateway {
    orders: RwLock<HashMap<i64, OrderRequest>>,
}

impl MemoryOrderGateway {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// 지금까지 생성된 주문 조회
    pub async fn orders(&self) -> Vec<OrderRequest> {
        let orders = self.orders.read().await;
        orders.values().cloned().collect()
    }
}

impl Default for MemoryOrderGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderGateway for MemoryOrderGateway {
    async fn create_order(
        &self,
        auction_id: i64,
        winner_id: i64,
        amount: i64,
    ) -> Result<(), AuctionError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&auction_id) {
            info!(
                "{:<12} --> 경매 {} 주문이 이미 존재하여 건너뜀",
                "OrderGateway", auction_id
            );
            return Ok(());
        }
        orders.insert(
            auction_id,
            OrderRequest {
                auction_id,
                winner_id,
                amount,
                requested_at: Utc::now(),
            },
        );
        info!(
            "{:<12} --> 주문 생성: 경매 {} 낙찰자 {} 금액 {}",
            "OrderGateway", auction_id, winner_id, amount
        );
        Ok(())
    }
}

// endregion: --- Order Gateway

// region:    --- Winner Resolver

/// 낙찰 확정
/// - 입찰이 없으면 낙찰자 없이 처리 완료로 표시하고 협력자를 호출하지 않는다.
/// - 이미 처리된 경매는 기록된 결과를 그대로 돌려준다 (멱등).
pub async fn resolve(
    auction_id: i64,
    store: &dyn AuctionStore,
    gateway: &dyn OrderGateway,
) -> Result<Auction, AuctionError> {
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let mut auction = store.load(auction_id).await?;

        if auction.status != AuctionStatus::Ended {
            return Err(AuctionError::InvalidState);
        }
        if auction.winner_resolved {
            return Ok(auction);
        }

        let winning = auction.highest_bid().cloned();
        match &winning {
            Some(bid) => {
                auction.winner_id = Some(bid.bidder_id);
                auction.winner_amount = Some(bid.amount);

                // 주문 요청이 성공한 뒤에만 처리 완료로 기록한다.
                // 실패하면 winner_resolved 가 남지 않아 다음 스윕이 다시 시도하고,
                // 협력자는 경매당 멱등이라 재시도 재호출도 안전하다.
                gateway
                    .create_order(auction_id, bid.bidder_id, bid.amount)
                    .await?;
                info!(
                    "{:<12} --> 경매 {} 낙찰자 {} 금액 {}",
                    "Winner", auction_id, bid.bidder_id, bid.amount
                );
            }
            None => {
                info!(
                    "{:<12} --> 경매 {} 입찰 없음: 유찰 처리",
                    "Winner", auction_id
                );
            }
        }
        auction.winner_resolved = true;

        match store.save(&auction).await {
            Ok(saved) => {
                return Ok(saved);
            }
            Err(AuctionError::Conflict) => {
                warn!("{:<12} --> 버전 충돌: 낙찰 처리 재시도", "Winner");
                retries += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(AuctionError::Conflict)
}

// endregion: --- Winner Resolver
