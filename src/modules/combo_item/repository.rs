use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::PgExecutor;
use ulid::Ulid;
use validator::Validate;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ComboItem {
    pub id: String,
    pub combo_id: String,
    pub dish_id: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub sort: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Line item as supplied by callers. The owning combo's id is not part
/// of the payload: it is stamped onto every row at persistence time.
#[derive(Deserialize, Clone, Validate)]
pub struct CreateComboItemPayload {
    #[validate(length(min = 1))]
    pub dish_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub price: BigDecimal,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn create_batch<'e, E: PgExecutor<'e>>(
    e: E,
    combo_id: String,
    items: Vec<CreateComboItemPayload>,
) -> Result<(), Error> {
    if items.is_empty() {
        return Ok(());
    }

    let mut query_builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
        "INSERT INTO combo_items (id, combo_id, dish_id, name, price, quantity, sort) ",
    );

    query_builder.push_values(items.into_iter().enumerate(), |mut row, (position, item)| {
        row.push_bind(Ulid::new().to_string())
            .push_bind(combo_id.clone())
            .push_bind(item.dish_id)
            .push_bind(item.name)
            .push_bind(item.price)
            .push_bind(item.quantity)
            .push_bind(position as i32);
    });

    match query_builder.build().execute(e).await {
        Ok(_) => Ok(()),
        Err(err) => {
            tracing::error!(
                "Error occurred while trying to create items for combo {}: {}",
                combo_id,
                err
            );
            Err(Error::UnexpectedError)
        }
    }
}

pub async fn find_by_combo_id<'e, E: PgExecutor<'e>>(
    e: E,
    combo_id: String,
) -> Result<Vec<ComboItem>, Error> {
    match sqlx::query_as::<_, ComboItemRow>(
        "SELECT * FROM combo_items WHERE combo_id = $1 ORDER BY sort",
    )
    .bind(combo_id.clone())
    .fetch_all(e)
    .await
    {
        Ok(rows) => Ok(rows.into_iter().map(ComboItem::from).collect()),
        Err(err) => {
            tracing::error!(
                "Error occurred while trying to fetch items for combo {}: {}",
                combo_id,
                err
            );
            Err(Error::UnexpectedError)
        }
    }
}

pub async fn delete_by_combo_ids<'e, E: PgExecutor<'e>>(
    e: E,
    combo_ids: &[String],
) -> Result<(), Error> {
    match sqlx::query("DELETE FROM combo_items WHERE combo_id = ANY($1)")
        .bind(combo_ids)
        .execute(e)
        .await
    {
        Ok(_) => Ok(()),
        Err(err) => {
            tracing::error!("Error occurred while trying to delete combo items: {}", err);
            Err(Error::UnexpectedError)
        }
    }
}

#[derive(sqlx::FromRow)]
struct ComboItemRow {
    id: String,
    combo_id: String,
    dish_id: String,
    name: String,
    price: BigDecimal,
    quantity: i32,
    sort: i32,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
}

impl From<ComboItemRow> for ComboItem {
    fn from(row: ComboItemRow) -> Self {
        Self {
            id: row.id,
            combo_id: row.combo_id,
            dish_id: row.dish_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            sort: row.sort,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
