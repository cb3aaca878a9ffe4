//! # Promotion Repository
//!
//! Storage for promotion codes.
//!
//! ## Row Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  promotions row                          Promotion.rule                 │
//! │  ──────────────────────────────────────  ─────────────────────────────  │
//! │  buy_x_get_y_free  threshold=4           FreeUnit { threshold: 4,       │
//! │                    free_count=1            free_count: 1,               │
//! │                    target_type='sushi'     target: Sushi }              │
//! │                                                                         │
//! │  percentage        value=2000            Percentage { bps: 2000,        │
//! │                    applicable_types=       applies_to: {Boneless} }     │
//! │                      '["boneless"]'                                     │
//! │                                                                         │
//! │  fixed_amount      value=500             FixedAmount { amount: $5.00,   │
//! │                    applicable_types='[]'   applies_to: {} }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The order engine never awaits the store: the calling layer loads a
//! [`PromotionBook`] and hands that to `apply_promotion`.

use std::collections::BTreeSet;

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use comanda_core::promotions::normalize_code;
use comanda_core::{
    default_promotions, DiscountMethod, ItemType, Money, Promotion, PromotionBook, PromotionKind,
    PromotionRule, MAX_DISCOUNT_BPS,
};

/// Column list for promotions queries.
const COLUMNS: &str = "code, description, active, kind, discount_method, value, \
    min_purchase_cents, applicable_types, threshold, free_count, target_type";

const INSERT: &str = "INSERT INTO promotions \
        (code, description, active, kind, discount_method, value, \
         min_purchase_cents, applicable_types, threshold, free_count, target_type) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct PromotionRow {
    code: String,
    description: String,
    active: bool,
    kind: String,
    discount_method: String,
    value: i64,
    min_purchase_cents: i64,
    applicable_types: String,
    threshold: Option<i64>,
    free_count: Option<i64>,
    target_type: Option<ItemType>,
}

impl PromotionRow {
    fn invalid(&self, reason: impl Into<String>) -> DbError {
        DbError::invalid_record(&self.code, reason)
    }

    fn count(&self, field: &str, value: i64) -> DbResult<u32> {
        u32::try_from(value).map_err(|_| self.invalid(format!("{} out of range: {}", field, value)))
    }

    fn applies_to(&self) -> DbResult<BTreeSet<ItemType>> {
        serde_json::from_str(&self.applicable_types)
            .map_err(|e| self.invalid(format!("applicable_types: {}", e)))
    }

    fn rule(&self) -> DbResult<PromotionRule> {
        match self.discount_method.as_str() {
            "buy_x_get_y_free" => {
                let threshold = self
                    .threshold
                    .ok_or_else(|| self.invalid("free-unit promotion without threshold"))?;
                let threshold = self.count("threshold", threshold)?;
                let free_count = self.count("free_count", self.free_count.unwrap_or(1))?;
                let target = self
                    .target_type
                    .ok_or_else(|| self.invalid("free-unit promotion without target type"))?;
                if free_count == 0 || free_count > threshold {
                    return Err(self.invalid(format!(
                        "free_count {} does not fit threshold {}",
                        free_count, threshold
                    )));
                }
                Ok(PromotionRule::FreeUnit {
                    threshold,
                    free_count,
                    target,
                })
            }
            "percentage" => {
                let bps = self.count("value", self.value)?;
                if bps > MAX_DISCOUNT_BPS {
                    return Err(self.invalid(format!("percentage above 100%: {} bps", bps)));
                }
                Ok(PromotionRule::Percentage {
                    bps,
                    applies_to: self.applies_to()?,
                })
            }
            "fixed_amount" => Ok(PromotionRule::FixedAmount {
                amount: Money::from_cents(self.value),
                applies_to: self.applies_to()?,
            }),
            other => Err(self.invalid(format!("unknown discount method '{}'", other))),
        }
    }
}

impl TryFrom<PromotionRow> for Promotion {
    type Error = DbError;

    fn try_from(row: PromotionRow) -> DbResult<Self> {
        let rule = row.rule()?;
        let promotion = Promotion {
            code: normalize_code(&row.code),
            description: row.description,
            active: row.active,
            min_purchase: Money::from_cents(row.min_purchase_cents),
            rule,
        };

        if kind_name(promotion.kind()) != row.kind {
            return Err(DbError::invalid_record(
                row.code,
                format!("kind '{}' does not match its discount method", row.kind),
            ));
        }
        Ok(promotion)
    }
}

fn kind_name(kind: PromotionKind) -> &'static str {
    match kind {
        PromotionKind::Special => "special",
        PromotionKind::Regular => "regular",
    }
}

fn method_name(method: DiscountMethod) -> &'static str {
    match method {
        DiscountMethod::BuyXGetYFree => "buy_x_get_y_free",
        DiscountMethod::Percentage => "percentage",
        DiscountMethod::FixedAmount => "fixed_amount",
    }
}

/// Column values for one promotion, in `INSERT` parameter order.
struct PromotionParams {
    code: String,
    applicable_types: String,
    threshold: Option<i64>,
    free_count: Option<i64>,
    target_type: Option<ItemType>,
}

impl PromotionParams {
    fn from_promotion(promotion: &Promotion) -> DbResult<Self> {
        let applicable_types = serde_json::to_string(&promotion.applicable_types())
            .map_err(|e| DbError::Internal(e.to_string()))?;
        let (threshold, free_count, target_type) = match &promotion.rule {
            PromotionRule::FreeUnit {
                threshold,
                free_count,
                target,
            } => (
                Some(i64::from(*threshold)),
                Some(i64::from(*free_count)),
                Some(*target),
            ),
            PromotionRule::Percentage { .. } | PromotionRule::FixedAmount { .. } => {
                (None, None, None)
            }
        };
        Ok(PromotionParams {
            code: normalize_code(&promotion.code),
            applicable_types,
            threshold,
            free_count,
            target_type,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for promotion database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.promotions();
/// repo.seed_defaults().await?;
///
/// let book = repo.load_book().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Finds the active promotion for a code, matched after trimming and
    /// upper-casing.
    pub async fn find_active(&self, code: &str) -> DbResult<Option<Promotion>> {
        let code = normalize_code(code);
        debug!(code = %code, "Looking up promotion");

        let query = format!("SELECT {COLUMNS} FROM promotions WHERE code = ?1 AND active = 1");
        let row = sqlx::query_as::<_, PromotionRow>(&query)
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Promotion::try_from).transpose()
    }

    /// Gets a promotion by code, active or not.
    pub async fn get(&self, code: &str) -> DbResult<Promotion> {
        let code = normalize_code(code);
        let query = format!("SELECT {COLUMNS} FROM promotions WHERE code = ?1");
        let row = sqlx::query_as::<_, PromotionRow>(&query)
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Promotion", &code))?;

        Promotion::try_from(row)
    }

    /// Lists every active promotion, ordered by code.
    pub async fn list_active(&self) -> DbResult<Vec<Promotion>> {
        self.fetch_active_rows()
            .await?
            .into_iter()
            .map(Promotion::try_from)
            .collect()
    }

    /// Loads the active promotions into a [`PromotionBook`] for the order
    /// engine.
    ///
    /// Rows that do not map to a valid promotion are logged and left out, so
    /// one bad row does not take every other code offline.
    pub async fn load_book(&self) -> DbResult<PromotionBook> {
        let mut book = PromotionBook::new();
        for row in self.fetch_active_rows().await? {
            match Promotion::try_from(row) {
                Ok(promotion) => {
                    book.insert(promotion);
                }
                Err(e) => warn!(error = %e, "Skipping invalid promotion"),
            }
        }

        debug!(count = book.len(), "Loaded promotion book");
        Ok(book)
    }

    async fn fetch_active_rows(&self) -> DbResult<Vec<PromotionRow>> {
        let query = format!("SELECT {COLUMNS} FROM promotions WHERE active = 1 ORDER BY code");
        let rows = sqlx::query_as::<_, PromotionRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Inserts a promotion, or replaces the stored one with the same code.
    pub async fn upsert(&self, promotion: &Promotion) -> DbResult<()> {
        let params = PromotionParams::from_promotion(promotion)?;
        debug!(code = %params.code, "Upserting promotion");

        let query = format!(
            "{INSERT} \
             ON CONFLICT(code) DO UPDATE SET \
                description        = excluded.description, \
                active             = excluded.active, \
                kind               = excluded.kind, \
                discount_method    = excluded.discount_method, \
                value              = excluded.value, \
                min_purchase_cents = excluded.min_purchase_cents, \
                applicable_types   = excluded.applicable_types, \
                threshold          = excluded.threshold, \
                free_count         = excluded.free_count, \
                target_type        = excluded.target_type, \
                updated_at         = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')"
        );
        self.execute_write(&query, promotion, params).await?;
        Ok(())
    }

    /// Inserts a promotion unless its code already exists.
    ///
    /// ## Returns
    /// Whether a row was inserted.
    pub async fn insert_if_missing(&self, promotion: &Promotion) -> DbResult<bool> {
        let params = PromotionParams::from_promotion(promotion)?;
        let query = format!("{INSERT} ON CONFLICT(code) DO NOTHING");
        let rows = self.execute_write(&query, promotion, params).await?;
        Ok(rows > 0)
    }

    async fn execute_write(
        &self,
        query: &str,
        promotion: &Promotion,
        params: PromotionParams,
    ) -> DbResult<u64> {
        let result = sqlx::query(query)
            .bind(params.code)
            .bind(&promotion.description)
            .bind(promotion.active)
            .bind(kind_name(promotion.kind()))
            .bind(method_name(promotion.method()))
            .bind(promotion.value())
            .bind(promotion.min_purchase.cents())
            .bind(params.applicable_types)
            .bind(params.threshold)
            .bind(params.free_count)
            .bind(params.target_type)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Enables or retires a promotion code.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        let code = normalize_code(code);
        debug!(code = %code, active, "Setting promotion active flag");

        let result = sqlx::query(
            "UPDATE promotions \
             SET active = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             WHERE code = ?2",
        )
        .bind(active)
        .bind(&code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", code));
        }
        Ok(())
    }

    /// Installs the built-in promotions that are not stored yet.
    ///
    /// ## Returns
    /// How many were inserted. Existing codes are left as they are.
    pub async fn seed_defaults(&self) -> DbResult<usize> {
        let mut inserted = 0;
        for promotion in default_promotions() {
            if self.insert_if_missing(&promotion).await? {
                inserted += 1;
            }
        }

        info!(inserted, "Default promotions seeded");
        Ok(inserted)
    }

    /// Counts stored promotions, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM promotions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
