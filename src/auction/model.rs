/// 경매 애그리거트 모델
// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Status

/// 경매 상태
/// PENDING -> APPROVED -> ACTIVE -> ENDED 순서로만 진행되며,
/// REJECTED/CANCELLED 는 활성화 이전에만 진입 가능한 종료 상태이다.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    Pending,
    Approved,
    Active,
    Ended,
    Rejected,
    Cancelled,
}

impl AuctionStatus {
    /// 저장소 TEXT 컬럼 값
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Pending => "PENDING",
            AuctionStatus::Approved => "APPROVED",
            AuctionStatus::Active => "ACTIVE",
            AuctionStatus::Ended => "ENDED",
            AuctionStatus::Rejected => "REJECTED",
            AuctionStatus::Cancelled => "CANCELLED",
        }
    }

    /// 저장소 TEXT 컬럼 값으로부터 복원
    pub fn parse(s: &str) -> Option<AuctionStatus> {
        match s {
            "PENDING" => Some(AuctionStatus::Pending),
            "APPROVED" => Some(AuctionStatus::Approved),
            "ACTIVE" => Some(AuctionStatus::Active),
            "ENDED" => Some(AuctionStatus::Ended),
            "REJECTED" => Some(AuctionStatus::Rejected),
            "CANCELLED" => Some(AuctionStatus::Cancelled),
            _ => None,
        }
    }

    /// 종료 상태 여부 (더 이상 전이 불가)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuctionStatus::Ended | AuctionStatus::Rejected | AuctionStatus::Cancelled
        )
    }
}

// endregion: --- Status

// region:    --- Bid Model

/// 입찰 기록
/// bids 시퀀스는 추가 전용이며, 수락 순서대로 금액이 순증가한다.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Bid {
    pub bidder_id: i64,
    pub amount: i64,
    pub bid_time: DateTime<Utc>,
}

// endregion: --- Bid Model

// region:    --- Auction Model

/// 경매 애그리거트
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Auction {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub category: String,
    pub condition: String,
    pub starting_price: i64,
    pub current_price: i64,
    pub min_increment: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i64,
    pub participants: Vec<i64>,
    pub bids: Vec<Bid>,
    pub status: AuctionStatus,
    pub created_by: i64,
    pub winner_id: Option<i64>,
    pub winner_amount: Option<i64>,
    /// 낙찰 처리 완료 여부. 유찰(입찰 없음)도 한 번 처리되면 true 가 되어
    /// 낙찰 처리가 경매당 최대 한 번만 수행되도록 한다.
    pub winner_resolved: bool,
    pub created_at: DateTime<Utc>,
    /// 낙관적 동시성 제어용 버전. 저장 성공 시마다 1 증가한다.
    pub version: i64,
}

impl Auction {
    /// 최고 입찰 조회. 금액이 같은 경우(정상 흐름에서는 발생하지 않음)
    /// 먼저 수락된 입찰을 선택한다.
    pub fn highest_bid(&self) -> Option<&Bid> {
        let mut best: Option<&Bid> = None;
        for bid in &self.bids {
            if best.map_or(true, |b| bid.amount > b.amount) {
                best = Some(bid);
            }
        }
        best
    }

    /// 다음 입찰이 넘어야 하는 최소 금액
    /// i64 상한 근처에서는 포화 연산으로 오버플로를 막는다.
    pub fn min_next_bid(&self) -> i64 {
        self.current_price.saturating_add(self.min_increment)
    }

    /// 참가 정원이 가득 찼는지 여부
    pub fn is_full(&self) -> bool {
        self.participants.len() as i64 >= self.max_participants
    }
}

// endregion: --- Auction Model
