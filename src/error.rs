/// 경매 도메인 에러
/// 모든 도메인 에러는 복구 가능하며, 호출자에게 구조화된 형태로 전달된다.
// region:    --- Imports
use serde_json::json;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Auction Error

/// 경매 처리 중 발생할 수 있는 에러
#[derive(Debug, Error)]
pub enum AuctionError {
    /// 경매를 찾을 수 없음
    #[error("경매를 찾을 수 없습니다.")]
    NotFound,

    /// 현재 상태에서 허용되지 않는 전이/동작
    #[error("현재 경매 상태에서는 허용되지 않는 동작입니다.")]
    InvalidState,

    /// 생성자가 아닌 사용자의 수정/삭제 시도
    #[error("요청을 수행할 권한이 없습니다.")]
    Forbidden,

    /// 참가 정원 초과
    #[error("참가 인원이 가득 찼습니다.")]
    Full,

    /// 이미 참가한 경매
    #[error("이미 참가한 경매입니다.")]
    AlreadyJoined,

    /// 참가자가 아닌 사용자의 입찰
    #[error("경매 참가자만 입찰할 수 있습니다.")]
    NotParticipant,

    /// 0 이하의 입찰 금액
    #[error("입찰 금액이 올바르지 않습니다.")]
    InvalidAmount,

    /// 현재 가격 이하의 입찰
    #[error("입찰 금액이 현재 가격보다 낮거나 같습니다.")]
    TooLow,

    /// 최소 입찰 단위 미달
    #[error("입찰 금액이 최소 입찰 단위에 미달합니다.")]
    BelowMinIncrement,

    /// 낙관적 동시성 버전 충돌 (재시도 한도 초과 시 표면화)
    #[error("버전 충돌로 요청을 처리하지 못했습니다.")]
    Conflict,

    /// 생성 입력 검증 실패
    #[error("{0}")]
    Validation(String),

    /// 저장소 장애 (유일한 비도메인 에러)
    #[error("저장소 오류: {0}")]
    Store(String),
}

impl AuctionError {
    /// 클라이언트가 분기할 수 있는 고정 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::NotFound => "NOT_FOUND",
            AuctionError::InvalidState => "INVALID_STATUS",
            AuctionError::Forbidden => "FORBIDDEN",
            AuctionError::Full => "FULL",
            AuctionError::AlreadyJoined => "ALREADY_JOINED",
            AuctionError::NotParticipant => "NOT_PARTICIPANT",
            AuctionError::InvalidAmount => "INVALID_AMOUNT",
            AuctionError::TooLow => "LOW_BID",
            AuctionError::BelowMinIncrement => "BELOW_MIN_INCREMENT",
            AuctionError::Conflict => "CONFLICT",
            AuctionError::Validation(_) => "VALIDATION_ERROR",
            AuctionError::Store(_) => "STORE_ERROR",
        }
    }

    /// `{error, code}` 형태의 응답 바디
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": self.to_string(),
            "code": self.code(),
        })
    }
}

impl From<sqlx::Error> for AuctionError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AuctionError::NotFound,
            other => AuctionError::Store(other.to_string()),
        }
    }
}

// endregion: --- Auction Error
