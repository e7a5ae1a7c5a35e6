/// 입찰 커맨드 처리
/// 입찰 검증과 기록 추가는 버전 비교 저장과 한 단위로 묶인다.
/// 같은 경매에 대한 동시 입찰은 버전 충돌로 직렬화되고, 패배한 쪽은
/// 갱신된 current_price 를 기준으로 재평가된다 (동액 입찰은 LOW_BID 로 거절).
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::error::AuctionError;
use crate::store::{AuctionStore, MAX_RETRIES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder_id: i64,
    pub bid_amount: i64,
}

/// 입찰
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &dyn AuctionStore,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let mut auction = store.load(cmd.auction_id).await?;
        let now = Utc::now();

        validate_bid(&auction, &cmd, now)?;

        auction.bids.push(Bid {
            bidder_id: cmd.bidder_id,
            amount: cmd.bid_amount,
            bid_time: now,
        });
        auction.current_price = cmd.bid_amount;

        match store.save(&auction).await {
            Ok(saved) => {
                info!(
                    "{:<12} --> 입찰 성공: 경매 {} 현재 가격 {}",
                    "Command", saved.id, saved.current_price
                );
                return Ok(saved);
            }
            Err(AuctionError::Conflict) => {
                warn!(
                    "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도",
                    "Command"
                );
                retries += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(AuctionError::Conflict)
}

/// 입찰 검증
/// 거절되는 입찰은 어떤 상태 변경도 남기지 않는다.
fn validate_bid(
    auction: &Auction,
    cmd: &PlaceBidCommand,
    now: DateTime<Utc>,
) -> Result<(), AuctionError> {
    if auction.status != AuctionStatus::Active {
        return Err(AuctionError::InvalidState);
    }
    // 스케줄러가 아직 종료 전이를 수행하지 않은 구간의 입찰도 거절
    if now >= auction.end_time {
        return Err(AuctionError::InvalidState);
    }
    if !auction.participants.contains(&cmd.bidder_id) {
        return Err(AuctionError::NotParticipant);
    }
    if cmd.bid_amount <= 0 {
        return Err(AuctionError::InvalidAmount);
    }
    if cmd.bid_amount <= auction.current_price {
        return Err(AuctionError::TooLow);
    }
    if cmd.bid_amount < auction.min_next_bid() {
        return Err(AuctionError::BelowMinIncrement);
    }
    Ok(())
}

// endregion: --- Commands
