/// 경매 수명주기 커맨드 처리
/// 1. 경매 생성
/// 2. 승인 / 거절 / 취소
/// 3. 삭제
// region:    --- Imports
use crate::auction::lifecycle;
use crate::auction::model::{Auction, AuctionStatus};
use crate::error::AuctionError;
use crate::store::{AuctionStore, MAX_RETRIES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands

/// 경매 생성 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    pub condition: String,
    pub starting_price: i64,
    pub min_increment: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i64,
    pub creator_id: i64,
}

/// 경매 승인 명령 (관리자 권한 검증은 바깥 계층의 책임)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApproveAuctionCommand {
    pub auction_id: i64,
    pub admin_id: i64,
}

/// 경매 거절 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RejectAuctionCommand {
    pub auction_id: i64,
    pub admin_id: i64,
}

/// 경매 취소 명령
/// as_admin 은 바깥 계층에서 관리자 권한을 확인한 요청에만 설정된다.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CancelAuctionCommand {
    pub auction_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub as_admin: bool,
}

/// 경매 삭제 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeleteAuctionCommand {
    pub auction_id: i64,
    pub user_id: i64,
}

// endregion: --- Commands

// region:    --- Command Handlers

/// 1. 경매 생성
/// 검증을 통과하면 PENDING 상태의 경매가 저장된다.
pub async fn handle_create_auction(
    cmd: CreateAuctionCommand,
    store: &dyn AuctionStore,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 생성 요청 처리 시작: {}", "Command", cmd.title);
    let now = Utc::now();
    validate_create(&cmd, now)?;

    let auction = Auction {
        id: 0, // 저장소가 부여
        title: cmd.title,
        description: cmd.description,
        images: cmd.images,
        category: cmd.category,
        condition: cmd.condition,
        starting_price: cmd.starting_price,
        current_price: cmd.starting_price,
        min_increment: cmd.min_increment,
        start_time: cmd.start_time,
        end_time: cmd.end_time,
        max_participants: cmd.max_participants,
        participants: Vec::new(),
        bids: Vec::new(),
        status: AuctionStatus::Pending,
        created_by: cmd.creator_id,
        winner_id: None,
        winner_amount: None,
        winner_resolved: false,
        created_at: now,
        version: 0,
    };

    store.insert(auction).await
}

/// 생성 입력 검증
fn validate_create(cmd: &CreateAuctionCommand, now: DateTime<Utc>) -> Result<(), AuctionError> {
    if cmd.starting_price < 0 {
        return Err(AuctionError::Validation(
            "시작 가격은 0 이상이어야 합니다.".to_string(),
        ));
    }
    if cmd.min_increment <= 0 {
        return Err(AuctionError::Validation(
            "최소 입찰 단위는 0보다 커야 합니다.".to_string(),
        ));
    }
    if !(1..=10).contains(&cmd.max_participants) {
        return Err(AuctionError::Validation(
            "최대 참가 인원은 1 이상 10 이하여야 합니다.".to_string(),
        ));
    }
    if cmd.start_time <= now {
        return Err(AuctionError::Validation(
            "시작 시간은 미래여야 합니다.".to_string(),
        ));
    }
    if cmd.end_time <= cmd.start_time {
        return Err(AuctionError::Validation(
            "종료 시간은 시작 시간 이후여야 합니다.".to_string(),
        ));
    }
    Ok(())
}

/// 2-1. 경매 승인 (PENDING -> APPROVED)
pub async fn handle_approve_auction(
    cmd: ApproveAuctionCommand,
    store: &dyn AuctionStore,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 승인 요청 처리 시작: {:?}", "Command", cmd);
    apply_transition(cmd.auction_id, store, lifecycle::approve).await
}

/// 2-2. 경매 거절 (PENDING -> REJECTED)
pub async fn handle_reject_auction(
    cmd: RejectAuctionCommand,
    store: &dyn AuctionStore,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 거절 요청 처리 시작: {:?}", "Command", cmd);
    apply_transition(cmd.auction_id, store, lifecycle::reject).await
}

/// 2-3. 경매 취소 (PENDING/APPROVED -> CANCELLED)
/// 생성자 또는 관리자가 취소할 수 있다.
pub async fn handle_cancel_auction(
    cmd: CancelAuctionCommand,
    store: &dyn AuctionStore,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 취소 요청 처리 시작: {:?}", "Command", cmd);
    let mut retries = 0;
    while retries < MAX_RETRIES {
        let mut auction = store.load(cmd.auction_id).await?;
        if !cmd.as_admin && auction.created_by != cmd.user_id {
            return Err(AuctionError::Forbidden);
        }
        lifecycle::cancel(&mut auction)?;
        match store.save(&auction).await {
            Ok(saved) => return Ok(saved),
            Err(AuctionError::Conflict) => {
                warn!("{:<12} --> 버전 충돌: 취소 재시도", "Command");
                retries += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(AuctionError::Conflict)
}

/// 3. 경매 삭제
/// 생성자만, 승인 전(PENDING)에만 삭제할 수 있다.
/// 삭제도 버전 비교를 거치므로 조회와 삭제 사이에 다른 전이가
/// 커밋되면 새로 읽은 상태로 재검증한다.
pub async fn handle_delete_auction(
    cmd: DeleteAuctionCommand,
    store: &dyn AuctionStore,
) -> Result<(), AuctionError> {
    info!("{:<12} --> 경매 삭제 요청 처리 시작: {:?}", "Command", cmd);
    let mut retries = 0;
    while retries < MAX_RETRIES {
        let auction = store.load(cmd.auction_id).await?;
        if auction.created_by != cmd.user_id {
            return Err(AuctionError::Forbidden);
        }
        if auction.status != AuctionStatus::Pending {
            return Err(AuctionError::InvalidState);
        }
        match store.delete(cmd.auction_id, auction.version).await {
            Ok(()) => return Ok(()),
            Err(AuctionError::Conflict) => {
                warn!("{:<12} --> 버전 충돌: 삭제 재시도", "Command");
                retries += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(AuctionError::Conflict)
}

/// 상태 전이 공통 처리: 조회 -> 전이 -> 버전 비교 저장, 충돌 시 재시도
async fn apply_transition(
    auction_id: i64,
    store: &dyn AuctionStore,
    transition: fn(&mut Auction) -> Result<(), AuctionError>,
) -> Result<Auction, AuctionError> {
    let mut retries = 0;
    while retries < MAX_RETRIES {
        let mut auction = store.load(auction_id).await?;
        transition(&mut auction)?;
        match store.save(&auction).await {
            Ok(saved) => return Ok(saved),
            Err(AuctionError::Conflict) => {
                warn!("{:<12} --> 버전 충돌: 상태 전이 재시도", "Command");
                retries += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(AuctionError::Conflict)
}

// endregion: --- Command Handlers
