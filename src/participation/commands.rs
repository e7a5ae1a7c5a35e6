/// 참가 커맨드 처리
/// 정원(max_participants) 검사는 매 재시도마다 새로 읽은 경매를 대상으로
/// 수행되고 버전 비교 저장과 한 단위로 묶이므로, 경계에서 N 개의 동시
/// 참가 요청이 들어와도 정확히 정원만큼만 수락된다.
// region:    --- Imports
use crate::auction::model::Auction;
use crate::error::AuctionError;
use crate::store::{AuctionStore, MAX_RETRIES};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands

/// 경매 참가 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JoinAuctionCommand {
    pub auction_id: i64,
    pub user_id: i64,
}

/// 경매 참가
/// 상태 제한 없이 참가를 허용한다 (승인 전 경매에도 참가 가능).
pub async fn handle_join_auction(
    cmd: JoinAuctionCommand,
    store: &dyn AuctionStore,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 참가 요청 처리 시작: {:?}", "Command", cmd);
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let mut auction = store.load(cmd.auction_id).await?;

        if auction.participants.contains(&cmd.user_id) {
            return Err(AuctionError::AlreadyJoined);
        }
        if auction.is_full() {
            return Err(AuctionError::Full);
        }

        auction.participants.push(cmd.user_id);

        match store.save(&auction).await {
            Ok(saved) => {
                info!(
                    "{:<12} --> 참가 완료: 경매 {} 참가자 {}명",
                    "Command",
                    saved.id,
                    saved.participants.len()
                );
                return Ok(saved);
            }
            Err(AuctionError::Conflict) => {
                warn!("{:<12} --> 버전 충돌: 참가 재시도", "Command");
                retries += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(AuctionError::Conflict)
}

// endregion: --- Commands
