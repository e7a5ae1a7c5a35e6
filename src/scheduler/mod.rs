/// 경매 상태 업데이트 스케줄러
/// 주기적으로 스윕을 실행해 시간 경과에 따른 상태 전이를 수행한다.
/// 스윕 자체는 now 를 인자로 받는 함수라 시계 조작 없이 테스트할 수 있고,
/// 같은 now 로 두 번 실행해도 추가 전이가 발생하지 않는다 (멱등).
// region:    --- Imports
use crate::auction::lifecycle;
use crate::auction::model::AuctionStatus;
use crate::error::AuctionError;
use crate::store::AuctionStore;
use crate::winner::{self, OrderGateway};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, warn};

// endregion: --- Imports

// region:    --- Sweep

/// 스윕 한 번의 결과
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub activated: u64,
    pub ended: u64,
    pub resolved: u64,
}

/// 스윕 실행
/// 1. APPROVED 이고 시작 시간이 지난 경매를 ACTIVE 로
/// 2. ACTIVE 이고 종료 시간이 지난 경매를 ENDED 로
/// 3. ENDED 이고 낙찰 미처리인 경매의 낙찰 확정
/// 스윕이 겹쳐 실행되어도 버전 비교 저장 덕에 전이는 한 번만 커밋되며,
/// 충돌한 항목은 건너뛴다 (다른 쪽 스윕이 이미 처리).
pub async fn run_sweep(
    store: &dyn AuctionStore,
    gateway: &dyn OrderGateway,
    now: DateTime<Utc>,
) -> Result<SweepReport, AuctionError> {
    let mut report = SweepReport::default();

    for mut auction in store.find_approved_or_active().await? {
        match auction.status {
            AuctionStatus::Approved
                if now >= auction.start_time && now < auction.end_time =>
            {
                lifecycle::activate(&mut auction, now)?;
                match store.save(&auction).await {
                    Ok(_) => report.activated += 1,
                    Err(AuctionError::Conflict) => {
                        warn!(
                            "{:<12} --> 경매 {} 활성화 충돌: 건너뜀",
                            "Scheduler", auction.id
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            AuctionStatus::Active if now >= auction.end_time => {
                lifecycle::end(&mut auction, now)?;
                match store.save(&auction).await {
                    Ok(_) => report.ended += 1,
                    Err(AuctionError::Conflict) => {
                        warn!(
                            "{:<12} --> 경매 {} 종료 충돌: 건너뜀",
                            "Scheduler", auction.id
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => {}
        }
    }

    for auction in store.find_ended_unresolved().await? {
        match winner::resolve(auction.id, store, gateway).await {
            Ok(_) => report.resolved += 1,
            Err(AuctionError::Conflict) => {
                warn!(
                    "{:<12} --> 경매 {} 낙찰 처리 충돌: 건너뜀",
                    "Scheduler", auction.id
                );
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        "{:<12} --> 스윕 완료: 활성화 {} 종료 {} 낙찰 {}",
        "Scheduler", report.activated, report.ended, report.resolved
    );

    Ok(report)
}

// endregion: --- Sweep

// region:    --- Auction Scheduler

/// 주기 실행기
pub struct AuctionScheduler {
    store: Arc<dyn AuctionStore>,
    gateway: Arc<dyn OrderGateway>,
    interval_secs: u64,
}

impl AuctionScheduler {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        gateway: Arc<dyn OrderGateway>,
        interval_secs: u64,
    ) -> Self {
        Self {
            store,
            gateway,
            interval_secs,
        }
    }

    /// 스케줄러 시작
    pub async fn start(&self) {
        let store = Arc::clone(&self.store);
        let gateway = Arc::clone(&self.gateway);
        let interval_secs = self.interval_secs;
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                if let Err(e) = run_sweep(store.as_ref(), gateway.as_ref(), Utc::now()).await {
                    error!(
                        "{:<12} --> 경매 상태 업데이트 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
            }
        });
    }
}

// endregion: --- Auction Scheduler
