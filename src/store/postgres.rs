/// Postgres 저장소 구현체
/// 버전 조건부 UPDATE 로 낙관적 동시성 제어를 수행한다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::store::AuctionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;

// endregion: --- Imports

// region:    --- Queries

const COLUMNS: &str = "id, title, description, images, category, item_condition, \
     starting_price, current_price, min_increment, start_time, end_time, \
     max_participants, participants, bids, status, created_by, winner_id, \
     winner_amount, winner_resolved, created_at, version";

const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (title, description, images, category, item_condition,
        starting_price, current_price, min_increment, start_time, end_time,
        max_participants, participants, bids, status, created_by, winner_id,
        winner_amount, winner_resolved, created_at, version)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
    RETURNING id
"#;

const SAVE_AUCTION: &str = r#"
    UPDATE auctions
    SET title = $1, description = $2, images = $3, category = $4, item_condition = $5,
        current_price = $6, min_increment = $7, start_time = $8, end_time = $9,
        max_participants = $10, participants = $11, bids = $12, status = $13,
        winner_id = $14, winner_amount = $15, winner_resolved = $16,
        version = version + 1
    WHERE id = $17 AND version = $18
    RETURNING version
"#;

const DELETE_AUCTION: &str = "DELETE FROM auctions WHERE id = $1 AND version = $2";

const GET_VERSION: &str = "SELECT version FROM auctions WHERE id = $1";

const FIND_APPROVED_OR_ACTIVE: &str =
    "WHERE status IN ('APPROVED', 'ACTIVE')";

const FIND_ENDED_UNRESOLVED: &str =
    "WHERE status = 'ENDED' AND winner_resolved = FALSE";

// endregion: --- Queries

// region:    --- Row Model

/// auctions 테이블 한 행
#[derive(FromRow)]
struct AuctionRow {
    id: i64,
    title: String,
    description: String,
    images: Json<Vec<String>>,
    category: String,
    item_condition: String,
    starting_price: i64,
    current_price: i64,
    min_increment: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    max_participants: i64,
    participants: Json<Vec<i64>>,
    bids: Json<Vec<Bid>>,
    status: String,
    created_by: i64,
    winner_id: Option<i64>,
    winner_amount: Option<i64>,
    winner_resolved: bool,
    created_at: DateTime<Utc>,
    version: i64,
}

impl AuctionRow {
    fn into_auction(self) -> Result<Auction, AuctionError> {
        let status = AuctionStatus::parse(&self.status)
            .ok_or_else(|| AuctionError::Store(format!("잘못된 상태 값: {}", self.status)))?;
        Ok(Auction {
            id: self.id,
            title: self.title,
            description: self.description,
            images: self.images.0,
            category: self.category,
            condition: self.item_condition,
            starting_price: self.starting_price,
            current_price: self.current_price,
            min_increment: self.min_increment,
            start_time: self.start_time,
            end_time: self.end_time,
            max_participants: self.max_participants,
            participants: self.participants.0,
            bids: self.bids.0,
            status,
            created_by: self.created_by,
            winner_id: self.winner_id,
            winner_amount: self.winner_amount,
            winner_resolved: self.winner_resolved,
            created_at: self.created_at,
            version: self.version,
        })
    }
}

// endregion: --- Row Model

// region:    --- Postgres Store

/// Postgres 저장소 구현체
pub struct PgAuctionStore {
    db: Arc<DatabaseManager>,
}

impl PgAuctionStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    async fn fetch_where(&self, clause: &str) -> Result<Vec<Auction>, AuctionError> {
        let sql = format!("SELECT {} FROM auctions {}", COLUMNS, clause);
        let rows = sqlx::query_as::<_, AuctionRow>(&sql)
            .fetch_all(self.db.pool())
            .await?;
        rows.into_iter().map(AuctionRow::into_auction).collect()
    }
}

#[async_trait]
impl AuctionStore for PgAuctionStore {
    async fn insert(&self, auction: Auction) -> Result<Auction, AuctionError> {
        let id = sqlx::query_scalar::<_, i64>(INSERT_AUCTION)
            .bind(&auction.title)
            .bind(&auction.description)
            .bind(Json(&auction.images))
            .bind(&auction.category)
            .bind(&auction.condition)
            .bind(auction.starting_price)
            .bind(auction.current_price)
            .bind(auction.min_increment)
            .bind(auction.start_time)
            .bind(auction.end_time)
            .bind(auction.max_participants)
            .bind(Json(&auction.participants))
            .bind(Json(&auction.bids))
            .bind(auction.status.as_str())
            .bind(auction.created_by)
            .bind(auction.winner_id)
            .bind(auction.winner_amount)
            .bind(auction.winner_resolved)
            .bind(auction.created_at)
            .bind(auction.version)
            .fetch_one(self.db.pool())
            .await?;

        let mut saved = auction;
        saved.id = id;
        Ok(saved)
    }

    async fn load(&self, id: i64) -> Result<Auction, AuctionError> {
        let sql = format!("SELECT {} FROM auctions WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, AuctionRow>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(AuctionError::NotFound)?;
        row.into_auction()
    }

    async fn save(&self, auction: &Auction) -> Result<Auction, AuctionError> {
        // 버전이 일치하는 행만 갱신된다. 갱신된 행이 없으면 충돌.
        let new_version = sqlx::query_scalar::<_, i64>(SAVE_AUCTION)
            .bind(&auction.title)
            .bind(&auction.description)
            .bind(Json(&auction.images))
            .bind(&auction.category)
            .bind(&auction.condition)
            .bind(auction.current_price)
            .bind(auction.min_increment)
            .bind(auction.start_time)
            .bind(auction.end_time)
            .bind(auction.max_participants)
            .bind(Json(&auction.participants))
            .bind(Json(&auction.bids))
            .bind(auction.status.as_str())
            .bind(auction.winner_id)
            .bind(auction.winner_amount)
            .bind(auction.winner_resolved)
            .bind(auction.id)
            .bind(auction.version)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(AuctionError::Conflict)?;

        let mut saved = auction.clone();
        saved.version = new_version;
        Ok(saved)
    }

    async fn delete(&self, id: i64, version: i64) -> Result<(), AuctionError> {
        let result = sqlx::query(DELETE_AUCTION)
            .bind(id)
            .bind(version)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            // 행이 없으면 NotFound, 있으면 버전 충돌
            let exists = sqlx::query_scalar::<_, i64>(GET_VERSION)
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;
            return match exists {
                Some(_) => Err(AuctionError::Conflict),
                None => Err(AuctionError::NotFound),
            };
        }
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Auction>, AuctionError> {
        self.fetch_where("").await
    }

    async fn find_approved_or_active(&self) -> Result<Vec<Auction>, AuctionError> {
        self.fetch_where(FIND_APPROVED_OR_ACTIVE).await
    }

    async fn find_ended_unresolved(&self) -> Result<Vec<Auction>, AuctionError> {
        self.fetch_where(FIND_ENDED_UNRESOLVED).await
    }
}

// endregion: --- Postgres Store
