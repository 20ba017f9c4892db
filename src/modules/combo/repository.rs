use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::PgExecutor;
use ulid::Ulid;

use crate::utils::pagination::{Paginated, Pagination};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum ComboStatus {
    #[serde(rename = "ON_SALE")]
    OnSale,
    #[serde(rename = "OFF_SALE")]
    OffSale,
}

impl From<String> for ComboStatus {
    fn from(value: String) -> Self {
        match value.as_ref() {
            "ON_SALE" => ComboStatus::OnSale,
            "OFF_SALE" => ComboStatus::OffSale,
            status => unreachable!("Invalid combo status: {}", status),
        }
    }
}

impl ToString for ComboStatus {
    fn to_string(&self) -> String {
        match self {
            ComboStatus::OnSale => String::from("ON_SALE"),
            ComboStatus::OffSale => String::from("OFF_SALE"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Combo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub status: ComboStatus,
    pub category_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(sqlx::FromRow)]
struct ComboRow {
    id: String,
    name: String,
    description: Option<String>,
    price: BigDecimal,
    status: String,
    category_id: String,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
}

impl From<ComboRow> for Combo {
    fn from(row: ComboRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            status: row.status.into(),
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct CreateComboPayload {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub status: ComboStatus,
    pub category_id: String,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreateComboPayload,
) -> Result<Combo, Error> {
    match sqlx::query_as::<_, ComboRow>(
        "
        INSERT INTO combos (
            id,
            name,
            description,
            price,
            status,
            category_id
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.status.to_string())
    .bind(payload.category_id)
    .fetch_one(e)
    .await
    {
        Ok(combo) => Ok(combo.into()),
        Err(err) => {
            tracing::error!("Error occurred while trying to create a combo: {}", err);
            Err(Error::UnexpectedError)
        }
    }
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Combo>, Error> {
    match sqlx::query_as::<_, ComboRow>("SELECT * FROM combos WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
    {
        Ok(maybe_combo) => Ok(maybe_combo.map(Combo::from)),
        Err(err) => {
            tracing::error!(
                "Error occurred while trying to fetch combo by id {}: {}",
                id,
                err
            );
            Err(Error::UnexpectedError)
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct Filters {
    pub status: Option<ComboStatus>,
    pub category_id: Option<String>,
    pub name: Option<String>,
}

pub async fn find_many<'e, E>(
    e: E,
    pagination: Pagination,
    filters: Filters,
) -> Result<Paginated<Combo>, Error>
where
    E: PgExecutor<'e> + Copy,
{
    let total = match sqlx::query_scalar::<_, i64>(
        "
            SELECT COUNT(id) FROM combos
            WHERE
                ($1::TEXT IS NULL OR status = $1)
                AND ($2::TEXT IS NULL OR category_id = $2)
                AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%')
        ",
    )
    .bind(filters.status.clone().map(|s| s.to_string()))
    .bind(filters.category_id.clone())
    .bind(filters.name.clone())
    .fetch_one(e)
    .await
    {
        Ok(total) => total,
        Err(err) => {
            tracing::error!("Error occurred while trying to count combos: {}", err);
            return Err(Error::UnexpectedError);
        }
    };

    match sqlx::query_as::<_, ComboRow>(
        "
            SELECT * FROM combos
            WHERE
                ($1::TEXT IS NULL OR status = $1)
                AND ($2::TEXT IS NULL OR category_id = $2)
                AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4
            OFFSET $5
        ",
    )
    .bind(filters.status.map(|s| s.to_string()))
    .bind(filters.category_id)
    .bind(filters.name)
    .bind(pagination.per_page as i64)
    .bind(((pagination.page - 1) * pagination.per_page) as i64)
    .fetch_all(e)
    .await
    {
        Ok(rows) => Ok(Paginated::new(
            rows.into_iter().map(Combo::from).collect(),
            total as u32,
            pagination.page,
            pagination.per_page,
        )),
        Err(err) => {
            tracing::error!("Error occurred while trying to fetch many combos: {}", err);
            Err(Error::UnexpectedError)
        }
    }
}

#[derive(Serialize)]
pub struct UpdateComboPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub status: Option<ComboStatus>,
    pub category_id: Option<String>,
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateComboPayload,
) -> Result<(), Error> {
    match sqlx::query(
        "
            UPDATE combos SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                status = COALESCE($4, status),
                category_id = COALESCE($5, category_id),
                updated_at = NOW()
            WHERE
                id = $6
        ",
    )
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.status.map(|s| s.to_string()))
    .bind(payload.category_id)
    .bind(id.clone())
    .execute(e)
    .await
    {
        Ok(_) => Ok(()),
        Err(err) => {
            tracing::error!(
                "Error occurred while trying to update combo by id {}: {}",
                id,
                err
            );
            Err(Error::UnexpectedError)
        }
    }
}

pub async fn delete_by_ids<'e, E: PgExecutor<'e>>(e: E, ids: &[String]) -> Result<(), Error> {
    match sqlx::query("DELETE FROM combos WHERE id = ANY($1)")
        .bind(ids)
        .execute(e)
        .await
    {
        Ok(_) => Ok(()),
        Err(err) => {
            tracing::error!("Error occurred while trying to delete combos: {}", err);
            Err(Error::UnexpectedError)
        }
    }
}

pub async fn find_on_sale_ids<'e, E: PgExecutor<'e>>(
    e: E,
    ids: &[String],
) -> Result<Vec<String>, Error> {
    match sqlx::query_scalar::<_, String>(
        "SELECT id FROM combos WHERE id = ANY($1) AND status = $2",
    )
    .bind(ids)
    .bind(ComboStatus::OnSale.to_string())
    .fetch_all(e)
    .await
    {
        Ok(on_sale_ids) => Ok(on_sale_ids),
        Err(err) => {
            tracing::error!(
                "Error occurred while trying to fetch on-sale combos: {}",
                err
            );
            Err(Error::UnexpectedError)
        }
    }
}

pub async fn update_status_by_ids<'e, E: PgExecutor<'e>>(
    e: E,
    ids: &[String],
    status: ComboStatus,
) -> Result<(), Error> {
    match sqlx::query(
        "
            UPDATE combos SET
                status = $2,
                updated_at = NOW()
            WHERE
                id = ANY($1)
        ",
    )
    .bind(ids)
    .bind(status.to_string())
    .execute(e)
    .await
    {
        Ok(_) => Ok(()),
        Err(err) => {
            tracing::error!("Error occurred while trying to update combo status: {}", err);
            Err(Error::UnexpectedError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ComboStatus;

    #[test]
    fn combo_status_round_trips_through_its_storage_form() {
        assert_eq!(
            ComboStatus::from(ComboStatus::OnSale.to_string()).to_string(),
            "ON_SALE"
        );
        assert_eq!(
            ComboStatus::from(ComboStatus::OffSale.to_string()).to_string(),
            "OFF_SALE"
        );
    }
}
