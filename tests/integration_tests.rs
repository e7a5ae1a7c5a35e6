use auction_engine::auction::commands::{
    handle_approve_auction, handle_cancel_auction, handle_create_auction, handle_delete_auction,
    ApproveAuctionCommand, CancelAuctionCommand, CreateAuctionCommand, DeleteAuctionCommand,
};
use auction_engine::auction::model::{Auction, AuctionStatus};
use auction_engine::bidding::commands::{handle_place_bid, PlaceBidCommand};
use auction_engine::error::AuctionError;
use auction_engine::participation::commands::{handle_join_auction, JoinAuctionCommand};
use auction_engine::query::handlers::{list_auctions, ListFilter};
use auction_engine::store::{AuctionStore, MemoryAuctionStore};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// 트레이싱 초기화 (중복 호출 허용)
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// 저장소 설정
fn setup() -> Arc<MemoryAuctionStore> {
    init_tracing();
    Arc::new(MemoryAuctionStore::new())
}

/// 테스트용 경매 생성 (저장소에 직접 삽입)
async fn insert_test_auction(
    store: &MemoryAuctionStore,
    status: AuctionStatus,
    starting_price: i64,
    min_increment: i64,
    max_participants: i64,
) -> Auction {
    let now = Utc::now();
    let auction = Auction {
        id: 0,
        title: "테스트 경매".to_string(),
        description: "테스트용 경매입니다.".to_string(),
        images: vec![],
        category: "electronics".to_string(),
        condition: "used".to_string(),
        starting_price,
        current_price: starting_price,
        min_increment,
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(2),
        max_participants,
        participants: vec![],
        bids: vec![],
        status,
        created_by: 100,
        winner_id: None,
        winner_amount: None,
        winner_resolved: false,
        created_at: now,
        version: 0,
    };
    store.insert(auction).await.unwrap()
}

/// 유효한 생성 명령
fn valid_create_command() -> CreateAuctionCommand {
    let now = Utc::now();
    CreateAuctionCommand {
        title: "빈티지 카메라".to_string(),
        description: "상태 좋은 필름 카메라입니다.".to_string(),
        images: vec!["camera.jpg".to_string()],
        category: "camera".to_string(),
        condition: "used".to_string(),
        starting_price: 100_000,
        min_increment: 5_000,
        start_time: now + Duration::hours(1),
        end_time: now + Duration::hours(25),
        max_participants: 2,
        creator_id: 100,
    }
}

/// 경매 생성 테스트
#[tokio::test]
async fn test_create_auction() {
    let store = setup();

    let auction = handle_create_auction(valid_create_command(), store.as_ref())
        .await
        .unwrap();

    assert!(auction.id > 0);
    assert_eq!(auction.status, AuctionStatus::Pending);
    assert_eq!(auction.current_price, auction.starting_price);
    assert!(auction.bids.is_empty());
    assert!(auction.participants.is_empty());
}

/// 생성 입력 검증 테스트
#[tokio::test]
async fn test_create_auction_validation() {
    let store = setup();

    // 음수 시작 가격
    let mut cmd = valid_create_command();
    cmd.starting_price = -1;
    let err = handle_create_auction(cmd, store.as_ref()).await.unwrap_err();
    assert!(matches!(err, AuctionError::Validation(_)));

    // 참가 인원 상한 초과
    let mut cmd = valid_create_command();
    cmd.max_participants = 11;
    let err = handle_create_auction(cmd, store.as_ref()).await.unwrap_err();
    assert!(matches!(err, AuctionError::Validation(_)));

    // 참가 인원 하한 미달
    let mut cmd = valid_create_command();
    cmd.max_participants = 0;
    let err = handle_create_auction(cmd, store.as_ref()).await.unwrap_err();
    assert!(matches!(err, AuctionError::Validation(_)));

    // 과거 시작 시간
    let mut cmd = valid_create_command();
    cmd.start_time = Utc::now() - Duration::hours(1);
    let err = handle_create_auction(cmd, store.as_ref()).await.unwrap_err();
    assert!(matches!(err, AuctionError::Validation(_)));

    // 시작보다 빠른 종료 시간
    let mut cmd = valid_create_command();
    cmd.end_time = cmd.start_time - Duration::hours(1);
    let err = handle_create_auction(cmd, store.as_ref()).await.unwrap_err();
    assert!(matches!(err, AuctionError::Validation(_)));

    // 0 이하 최소 입찰 단위
    let mut cmd = valid_create_command();
    cmd.min_increment = 0;
    let err = handle_create_auction(cmd, store.as_ref()).await.unwrap_err();
    assert!(matches!(err, AuctionError::Validation(_)));
}

/// 참가-입찰 시나리오 테스트
/// 시작가 100000, 최소 단위 5000, 정원 2명
#[tokio::test]
async fn test_join_and_bid_scenario() {
    let store = setup();
    let auction =
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 100_000, 5_000, 2).await;

    // 두 명 참가
    for user_id in [1, 2] {
        handle_join_auction(
            JoinAuctionCommand {
                auction_id: auction.id,
                user_id,
            },
            store.as_ref(),
        )
        .await
        .unwrap();
    }

    // 104000 입찰: 최소 단위 미달 (105000 이상 필요)
    let err = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 1,
            bid_amount: 104_000,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::BelowMinIncrement));

    // 105000 입찰: 성공
    let updated = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 1,
            bid_amount: 105_000,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(updated.current_price, 105_000);
    assert_eq!(updated.bids.len(), 1);

    // 세 번째 참가 시도: 정원 초과
    let err = handle_join_auction(
        JoinAuctionCommand {
            auction_id: auction.id,
            user_id: 3,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::Full));

    // 참가자가 아닌 사용자의 입찰
    let err = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 3,
            bid_amount: 106_000,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::NotParticipant));

    // 동액 재입찰: 현재 가격 이하
    let err = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 2,
            bid_amount: 105_000,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::TooLow));
}

/// 중복 참가 테스트
#[tokio::test]
async fn test_join_duplicate() {
    let store = setup();
    let auction =
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 10_000, 1_000, 5).await;

    let cmd = JoinAuctionCommand {
        auction_id: auction.id,
        user_id: 7,
    };
    handle_join_auction(cmd.clone(), store.as_ref()).await.unwrap();
    let err = handle_join_auction(cmd, store.as_ref()).await.unwrap_err();
    assert!(matches!(err, AuctionError::AlreadyJoined));
}

/// 없는 경매 참가 테스트
#[tokio::test]
async fn test_join_not_found() {
    let store = setup();
    let err = handle_join_auction(
        JoinAuctionCommand {
            auction_id: 999,
            user_id: 1,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::NotFound));
}

/// 승인 전 경매 참가 허용 테스트 (상태 제한 없음)
#[tokio::test]
async fn test_join_pending_auction_allowed() {
    let store = setup();
    let auction =
        insert_test_auction(store.as_ref(), AuctionStatus::Pending, 10_000, 1_000, 5).await;

    let joined = handle_join_auction(
        JoinAuctionCommand {
            auction_id: auction.id,
            user_id: 1,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(joined.participants, vec![1]);
}

/// 동시 참가 정원 테스트: 정확히 정원만큼만 수락
#[tokio::test]
async fn test_concurrent_joins_at_capacity() {
    let store = setup();
    let auction =
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 10_000, 1_000, 3).await;

    let mut handles = vec![];
    for user_id in 1..=10 {
        let store = Arc::clone(&store);
        let auction_id = auction.id;
        handles.push(tokio::spawn(async move {
            handle_join_auction(JoinAuctionCommand { auction_id, user_id }, store.as_ref()).await
        }));
    }

    let mut joined = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => joined += 1,
            Err(AuctionError::Full) => full += 1,
            Err(e) => panic!("예상하지 못한 에러: {:?}", e),
        }
    }

    assert_eq!(joined, 3);
    assert_eq!(full, 7);

    let final_auction = store.load(auction.id).await.unwrap();
    assert_eq!(final_auction.participants.len(), 3);
}

/// 동시 입찰 테스트: 수락된 입찰 금액은 순증가해야 한다
#[tokio::test]
async fn test_concurrent_bidding() {
    let store = setup();
    let auction =
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 100_000, 1_000, 10).await;

    // 참가자 등록
    for user_id in 1..=10 {
        handle_join_auction(
            JoinAuctionCommand {
                auction_id: auction.id,
                user_id,
            },
            store.as_ref(),
        )
        .await
        .unwrap();
    }

    // 서로 다른 금액으로 동시 입찰
    let mut handles = vec![];
    for i in 1..=10_i64 {
        let store = Arc::clone(&store);
        let auction_id = auction.id;
        handles.push(tokio::spawn(async move {
            handle_place_bid(
                PlaceBidCommand {
                    auction_id,
                    bidder_id: i,
                    bid_amount: 100_000 + i * 1_000,
                },
                store.as_ref(),
            )
            .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AuctionError::TooLow) | Err(AuctionError::BelowMinIncrement) => {}
            Err(e) => panic!("예상하지 못한 에러: {:?}", e),
        }
    }
    assert!(accepted >= 1);

    // 최종 상태: 수락 순서대로 금액이 순증가하고, 현재 가격은 최대 입찰가
    let final_auction = store.load(auction.id).await.unwrap();
    assert_eq!(final_auction.bids.len(), accepted);
    let amounts: Vec<i64> = final_auction.bids.iter().map(|b| b.amount).collect();
    for pair in amounts.windows(2) {
        assert!(pair[0] < pair[1], "입찰 금액이 순증가하지 않음: {:?}", amounts);
    }
    assert_eq!(
        final_auction.current_price,
        *amounts.iter().max().unwrap()
    );
}

/// 잘못된 입찰 테스트
#[tokio::test]
async fn test_invalid_bids() {
    let store = setup();
    let auction =
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 10_000, 1_000, 5).await;
    handle_join_auction(
        JoinAuctionCommand {
            auction_id: auction.id,
            user_id: 1,
        },
        store.as_ref(),
    )
    .await
    .unwrap();

    // 0 이하 금액
    let err = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 1,
            bid_amount: 0,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::InvalidAmount));

    // 활성화되지 않은 경매 입찰
    let pending =
        insert_test_auction(store.as_ref(), AuctionStatus::Pending, 10_000, 1_000, 5).await;
    handle_join_auction(
        JoinAuctionCommand {
            auction_id: pending.id,
            user_id: 1,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    let err = handle_place_bid(
        PlaceBidCommand {
            auction_id: pending.id,
            bidder_id: 1,
            bid_amount: 20_000,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::InvalidState));
}

/// 삭제 권한/상태 테스트
#[tokio::test]
async fn test_delete_auction() {
    let store = setup();
    let auction = handle_create_auction(valid_create_command(), store.as_ref())
        .await
        .unwrap();

    // 생성자가 아닌 사용자의 삭제
    let err = handle_delete_auction(
        DeleteAuctionCommand {
            auction_id: auction.id,
            user_id: 999,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::Forbidden));

    // 승인 후 삭제 시도
    handle_approve_auction(
        ApproveAuctionCommand {
            auction_id: auction.id,
            admin_id: 1,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    let err = handle_delete_auction(
        DeleteAuctionCommand {
            auction_id: auction.id,
            user_id: 100,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::InvalidState));

    // 승인 전 경매는 생성자가 삭제 가능
    let deletable = handle_create_auction(valid_create_command(), store.as_ref())
        .await
        .unwrap();
    handle_delete_auction(
        DeleteAuctionCommand {
            auction_id: deletable.id,
            user_id: 100,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    let err = store.load(deletable.id).await.unwrap_err();
    assert!(matches!(err, AuctionError::NotFound));
}

/// 취소 권한/상태 테스트
#[tokio::test]
async fn test_cancel_auction() {
    let store = setup();
    let auction = handle_create_auction(valid_create_command(), store.as_ref())
        .await
        .unwrap();

    // 생성자도 관리자도 아닌 사용자의 취소
    let err = handle_cancel_auction(
        CancelAuctionCommand {
            auction_id: auction.id,
            user_id: 999,
            as_admin: false,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::Forbidden));

    // 승인 후에도 취소 가능
    handle_approve_auction(
        ApproveAuctionCommand {
            auction_id: auction.id,
            admin_id: 1,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    let cancelled = handle_cancel_auction(
        CancelAuctionCommand {
            auction_id: auction.id,
            user_id: 100,
            as_admin: false,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(cancelled.status, AuctionStatus::Cancelled);

    // 활성화된 경매는 취소 불가
    let active =
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 10_000, 1_000, 5).await;
    let err = handle_cancel_auction(
        CancelAuctionCommand {
            auction_id: active.id,
            user_id: 100,
            as_admin: false,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::InvalidState));
}

/// 관리자 취소 테스트: 생성자가 아니어도 관리자 요청은 취소 가능
#[tokio::test]
async fn test_admin_can_cancel_auction() {
    let store = setup();
    let auction = handle_create_auction(valid_create_command(), store.as_ref())
        .await
        .unwrap();

    let cancelled = handle_cancel_auction(
        CancelAuctionCommand {
            auction_id: auction.id,
            user_id: 999,
            as_admin: true,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(cancelled.status, AuctionStatus::Cancelled);
}

/// i64 상한 근처 입찰 테스트: 포화 연산으로 패닉 없이 처리
#[tokio::test]
async fn test_bid_near_i64_max() {
    let store = setup();
    let auction = insert_test_auction(
        store.as_ref(),
        AuctionStatus::Active,
        i64::MAX - 10_000,
        5_000,
        5,
    )
    .await;
    for user_id in [1, 2] {
        handle_join_auction(
            JoinAuctionCommand {
                auction_id: auction.id,
                user_id,
            },
            store.as_ref(),
        )
        .await
        .unwrap();
    }

    // 상한 바로 아래 입찰 (최소 단위 충족)
    let updated = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 1,
            bid_amount: i64::MAX - 500,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(updated.current_price, i64::MAX - 500);

    // 상한 입찰: min_next_bid 가 포화되어 i64::MAX 로 수락
    let updated = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 2,
            bid_amount: i64::MAX,
        },
        store.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(updated.current_price, i64::MAX);

    // 더 높은 입찰은 불가능: 동액은 거절
    let err = handle_place_bid(
        PlaceBidCommand {
            auction_id: auction.id,
            bidder_id: 1,
            bid_amount: i64::MAX,
        },
        store.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::TooLow));

    // 금액 순증가 불변식 유지
    let final_auction = store.load(auction.id).await.unwrap();
    let amounts: Vec<i64> = final_auction.bids.iter().map(|b| b.amount).collect();
    for pair in amounts.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

/// 버전 비교 삭제 테스트: 조회 이후 다른 쓰기가 커밋되면 삭제는 충돌
#[tokio::test]
async fn test_delete_checks_version() {
    let store = setup();
    let auction =
        insert_test_auction(store.as_ref(), AuctionStatus::Pending, 10_000, 1_000, 5).await;

    // 다른 쓰기가 버전을 올린다
    let mut modified = store.load(auction.id).await.unwrap();
    modified.title = "수정된 제목".to_string();
    let modified = store.save(&modified).await.unwrap();

    // 이전 버전 기준 삭제는 거부
    let err = store.delete(auction.id, auction.version).await.unwrap_err();
    assert!(matches!(err, AuctionError::Conflict));
    assert!(store.load(auction.id).await.is_ok());

    // 현재 버전 기준 삭제는 성공
    store.delete(auction.id, modified.version).await.unwrap();
    let err = store.load(auction.id).await.unwrap_err();
    assert!(matches!(err, AuctionError::NotFound));
}

/// 목록 조회 필터/페이지네이션 테스트
#[tokio::test]
async fn test_list_auctions() {
    let store = setup();
    for _ in 0..3 {
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 10_000, 1_000, 5).await;
    }
    insert_test_auction(store.as_ref(), AuctionStatus::Pending, 10_000, 1_000, 5).await;

    // 상태 필터
    let page = list_auctions(
        store.as_ref(),
        &ListFilter {
            status: Some(AuctionStatus::Active),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 3);

    // 페이지네이션
    let page = list_auctions(
        store.as_ref(),
        &ListFilter {
            page: Some(2),
            limit: Some(3),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 1);

    // 카테고리 필터 (일치 없음)
    let page = list_auctions(
        store.as_ref(),
        &ListFilter {
            category: Some("furniture".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 0);

    // 검색 필터
    let page = list_auctions(
        store.as_ref(),
        &ListFilter {
            search: Some("테스트".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 4);
}

/// 과도한 페이지 번호 테스트: 오프셋 계산이 포화되어 빈 페이지 반환
#[tokio::test]
async fn test_list_auctions_huge_page() {
    let store = setup();
    for _ in 0..3 {
        insert_test_auction(store.as_ref(), AuctionStatus::Active, 10_000, 1_000, 5).await;
    }

    let page = list_auctions(
        store.as_ref(),
        &ListFilter {
            page: Some(i64::MAX),
            limit: Some(100),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 3);
    assert!(page.items.is_empty());
}
