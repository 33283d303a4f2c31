// src/database.rs
use crate::contact_pipeline::ContactRecord;
use crate::models::{LeadRow, ProductLaunch};
use chrono::{DateTime, NaiveDate, Utc};
use mobc::{Manager, Pool};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use tracing::{debug, info};

/// One harvested launch as stored, including its enrichment state.
#[derive(Debug, Clone)]
pub struct StoredLaunch {
    pub id: i64,
    pub snapshot_date: NaiveDate,
    pub rank: i64,
    pub name: String,
    pub tagline: String,
    pub votes: i64,
    pub product_url: String,
    pub website_url: Option<String>,
    pub maker_urls: Vec<String>,
    pub email: Option<String>,
    pub email_source: Option<String>,
    pub social_handle: Option<String>,
    pub contact_page_url: Option<String>,
    pub maker_email: Option<String>,
    pub maker_social: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub enriched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub total_launches: i64,
    pub enriched: i64,
    pub with_email: i64,
    pub with_social: i64,
    pub snapshots: i64,
}

pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }
}

#[async_trait::async_trait]
impl Manager for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        debug!("Opening database: {}", self.db_path);
        let conn = Connection::open(&self.db_path)?;

        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        conn.execute("PRAGMA synchronous=NORMAL", [])?;
        conn.execute("PRAGMA busy_timeout=5000", [])?;
        conn.execute("PRAGMA temp_store=memory", [])?;

        init_schema(&conn)?;
        Ok(conn)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(conn)
    }
}

fn init_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS launches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            snapshot_date TEXT NOT NULL,
            rank INTEGER NOT NULL,
            name TEXT NOT NULL,
            tagline TEXT,
            votes INTEGER NOT NULL DEFAULT 0,
            product_url TEXT NOT NULL,
            website_url TEXT,
            maker_urls TEXT NOT NULL DEFAULT '[]',
            email TEXT,
            email_source TEXT,
            social_handle TEXT,
            contact_page_url TEXT,
            maker_email TEXT,
            maker_social TEXT,
            scraped_at TEXT NOT NULL,
            enriched_at TEXT,
            UNIQUE(snapshot_date, product_url)
        )
        "#,
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_launches_pending
         ON launches(enriched_at) WHERE enriched_at IS NULL",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_launches_snapshot ON launches(snapshot_date)",
        [],
    )?;
    Ok(())
}

pub type DbPool = Pool<SqliteManager>;

pub async fn create_db_pool(
    db_path: &str,
) -> Result<DbPool, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let manager = SqliteManager::new(db_path.to_string());
    let pool = Pool::builder().max_open(10).max_idle(5).build(manager);

    info!("✓ SQLite connection pool created: {}", db_path);
    Ok(pool)
}

/// Inserts or refreshes one leaderboard card. Re-harvesting a snapshot
/// updates rank/votes/tagline but never clears enrichment results.
pub async fn upsert_launch(
    pool: &DbPool,
    launch: &ProductLaunch,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    let maker_urls = serde_json::to_string(&launch.maker_urls)?;

    conn.execute(
        r#"
        INSERT INTO launches
            (snapshot_date, rank, name, tagline, votes, product_url, website_url, maker_urls, scraped_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(snapshot_date, product_url) DO UPDATE SET
            rank = excluded.rank,
            name = excluded.name,
            tagline = excluded.tagline,
            votes = excluded.votes,
            website_url = COALESCE(excluded.website_url, launches.website_url),
            maker_urls = excluded.maker_urls
        "#,
        params![
            launch.snapshot_date,
            launch.rank,
            launch.name,
            launch.tagline,
            launch.votes,
            launch.product_url,
            launch.website_url,
            maker_urls,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Launches that still need the enrichment pass, oldest snapshots first.
pub async fn pending_enrichment(
    pool: &DbPool,
    limit: usize,
) -> Result<Vec<StoredLaunch>, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    let mut stmt = conn.prepare(
        r#"
        SELECT id, snapshot_date, rank, name, tagline, votes, product_url, website_url,
               maker_urls, email, email_source, social_handle, contact_page_url,
               maker_email, maker_social, scraped_at, enriched_at
        FROM launches
        WHERE enriched_at IS NULL
        ORDER BY snapshot_date ASC, rank ASC
        LIMIT ?1
        "#,
    )?;
    let rows = stmt
        .query_map(params![limit as i64], row_to_launch)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

/// Records the outcome of one enrichment attempt. The best email wins the
/// export column: the product's own website first, maker profiles second.
pub async fn record_enrichment(
    pool: &DbPool,
    launch_id: i64,
    site: &ContactRecord,
    maker: &ContactRecord,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (email, email_source) = if !site.email.is_empty() {
        (site.email.as_str(), "website")
    } else if !maker.email.is_empty() {
        (maker.email.as_str(), "maker-profile")
    } else {
        ("", "")
    };
    let social_handle = if !site.social_handle.is_empty() {
        site.social_handle.as_str()
    } else {
        maker.social_handle.as_str()
    };

    let conn = pool.get().await?;
    conn.execute(
        r#"
        UPDATE launches SET
            email = ?1,
            email_source = ?2,
            social_handle = ?3,
            contact_page_url = ?4,
            maker_email = ?5,
            maker_social = ?6,
            enriched_at = ?7
        WHERE id = ?8
        "#,
        params![
            email,
            email_source,
            social_handle,
            site.contact_page_url,
            maker.email,
            maker.social_handle,
            Utc::now().to_rfc3339(),
            launch_id,
        ],
    )?;
    Ok(())
}

pub async fn last_snapshot_date(
    pool: &DbPool,
) -> Result<Option<NaiveDate>, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    let date = conn
        .query_row("SELECT MAX(snapshot_date) FROM launches", [], |row| {
            row.get::<_, Option<NaiveDate>>(0)
        })
        .optional()?
        .flatten();
    Ok(date)
}

pub async fn export_rows(
    pool: &DbPool,
) -> Result<Vec<LeadRow>, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    let mut stmt = conn.prepare(
        r#"
        SELECT snapshot_date, rank, name, tagline, votes, product_url, website_url,
               email, email_source, social_handle, contact_page_url
        FROM launches
        ORDER BY snapshot_date ASC, rank ASC
        "#,
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(LeadRow {
                snapshot_date: row.get(0)?,
                rank: row.get(1)?,
                name: row.get(2)?,
                tagline: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                votes: row.get(4)?,
                product_url: row.get(5)?,
                website_url: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                email: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                email_source: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                social_handle: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                contact_page_url: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

pub async fn store_stats(
    pool: &DbPool,
) -> Result<StoreStats, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    let stats = StoreStats {
        total_launches: count(&conn, "SELECT COUNT(*) FROM launches")?,
        enriched: count(&conn, "SELECT COUNT(*) FROM launches WHERE enriched_at IS NOT NULL")?,
        with_email: count(&conn, "SELECT COUNT(*) FROM launches WHERE email <> ''")?,
        with_social: count(&conn, "SELECT COUNT(*) FROM launches WHERE social_handle <> ''")?,
        snapshots: count(&conn, "SELECT COUNT(DISTINCT snapshot_date) FROM launches")?,
    };
    Ok(stats)
}

fn count(conn: &Connection, sql: &str) -> SqliteResult<i64> {
    conn.query_row(sql, [], |row| row.get(0))
}

fn row_to_launch(row: &rusqlite::Row<'_>) -> SqliteResult<StoredLaunch> {
    let maker_urls: String = row.get(8)?;
    Ok(StoredLaunch {
        id: row.get(0)?,
        snapshot_date: row.get(1)?,
        rank: row.get(2)?,
        name: row.get(3)?,
        tagline: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        votes: row.get(5)?,
        product_url: row.get(6)?,
        website_url: row.get(7)?,
        maker_urls: serde_json::from_str(&maker_urls).unwrap_or_default(),
        email: row.get(9)?,
        email_source: row.get(10)?,
        social_handle: row.get(11)?,
        contact_page_url: row.get(12)?,
        maker_email: row.get(13)?,
        maker_social: row.get(14)?,
        scraped_at: row
            .get::<_, String>(15)?
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
        enriched_at: row
            .get::<_, Option<String>>(16)?
            .and_then(|s| s.parse::<DateTime<Utc>>().ok()),
    })
}
