/// 경매 상태 전이 (순수 함수, IO 없음)
/// 전이 표:
/// - PENDING -> APPROVED (관리자 승인)
/// - APPROVED -> ACTIVE (시작 시간 도달)
/// - ACTIVE -> ENDED (종료 시간 경과)
/// - PENDING -> REJECTED (관리자 거절)
/// - PENDING/APPROVED -> CANCELLED (활성화 이전 취소)
/// 상태를 건너뛰는 전이는 허용하지 않는다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus};
use crate::error::AuctionError;
use chrono::{DateTime, Utc};

// endregion: --- Imports

// region:    --- Transitions

/// 승인: PENDING 에서만 가능
pub fn approve(auction: &mut Auction) -> Result<(), AuctionError> {
    match auction.status {
        AuctionStatus::Pending => {
            auction.status = AuctionStatus::Approved;
            Ok(())
        }
        _ => Err(AuctionError::InvalidState),
    }
}

/// 활성화: APPROVED 이고 start_time <= now < end_time 일 때만 가능.
/// 이미 ACTIVE 인 경우는 멱등한 no-op 으로 처리한다.
pub fn activate(auction: &mut Auction, now: DateTime<Utc>) -> Result<(), AuctionError> {
    match auction.status {
        AuctionStatus::Active => Ok(()),
        AuctionStatus::Approved if now >= auction.start_time && now < auction.end_time => {
            auction.status = AuctionStatus::Active;
            Ok(())
        }
        _ => Err(AuctionError::InvalidState),
    }
}

/// 종료: ACTIVE 이고 now >= end_time 일 때만 가능
pub fn end(auction: &mut Auction, now: DateTime<Utc>) -> Result<(), AuctionError> {
    match auction.status {
        AuctionStatus::Active if now >= auction.end_time => {
            auction.status = AuctionStatus::Ended;
            Ok(())
        }
        _ => Err(AuctionError::InvalidState),
    }
}

/// 거절: PENDING 에서만 가능
pub fn reject(auction: &mut Auction) -> Result<(), AuctionError> {
    match auction.status {
        AuctionStatus::Pending => {
            auction.status = AuctionStatus::Rejected;
            Ok(())
        }
        _ => Err(AuctionError::InvalidState),
    }
}

/// 취소: 활성화 이전(PENDING/APPROVED)에서만 가능
pub fn cancel(auction: &mut Auction) -> Result<(), AuctionError> {
    match auction.status {
        AuctionStatus::Pending | AuctionStatus::Approved => {
            auction.status = AuctionStatus::Cancelled;
            Ok(())
        }
        _ => Err(AuctionError::InvalidState),
    }
}

// endregion: --- Transitions
