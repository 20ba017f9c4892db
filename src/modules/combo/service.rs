use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use crate::modules::combo_item::{
    self,
    repository::{ComboItem, CreateComboItemPayload},
};
use crate::types::Context;
use crate::utils::pagination::{Paginated, Pagination};

use super::repository::{self, Combo, ComboStatus, Filters};

/// A combo together with its full line-item collection. Assembled per
/// call; never stored in this shape.
#[derive(Serialize, Clone, Debug)]
pub struct ComboWithItems {
    pub combo: Combo,
    pub items: Vec<ComboItem>,
}

#[derive(Deserialize, Validate)]
pub struct CreateComboWithItemsPayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub status: ComboStatus,
    #[validate(length(min = 1))]
    pub category_id: String,
    #[validate(nested)]
    pub items: Vec<CreateComboItemPayload>,
}

#[derive(Debug)]
pub enum CreateError {
    InvalidPayload(ValidationErrors),
    UnexpectedError,
}

pub async fn create_with_items(
    ctx: Arc<Context>,
    payload: CreateComboWithItemsPayload,
) -> Result<ComboWithItems, CreateError> {
    payload.validate().map_err(|errors| {
        tracing::warn!("Failed to validate payload: {errors}");
        CreateError::InvalidPayload(errors)
    })?;

    let mut tx = ctx.db_conn.pool.begin().await.map_err(|err| {
        tracing::error!("Failed to start database transaction: {}", err);
        CreateError::UnexpectedError
    })?;

    let combo = repository::create(
        &mut *tx,
        repository::CreateComboPayload {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            status: payload.status,
            category_id: payload.category_id,
        },
    )
    .await
    .map_err(|_| CreateError::UnexpectedError)?;

    combo_item::repository::create_batch(&mut *tx, combo.id.clone(), payload.items)
        .await
        .map_err(|_| CreateError::UnexpectedError)?;

    let items = combo_item::repository::find_by_combo_id(&mut *tx, combo.id.clone())
        .await
        .map_err(|_| CreateError::UnexpectedError)?;

    tx.commit().await.map_err(|err| {
        tracing::error!("Failed to commit database transaction: {}", err);
        CreateError::UnexpectedError
    })?;

    Ok(ComboWithItems { combo, items })
}

#[derive(Debug)]
pub enum RemoveError {
    NoCombosSelected,
    ComboOnSale(Vec<String>),
    UnexpectedError,
}

pub async fn remove_with_items(ctx: Arc<Context>, ids: Vec<String>) -> Result<(), RemoveError> {
    if ids.is_empty() {
        return Err(RemoveError::NoCombosSelected);
    }

    let mut tx = ctx.db_conn.pool.begin().await.map_err(|err| {
        tracing::error!("Failed to start database transaction: {}", err);
        RemoveError::UnexpectedError
    })?;

    let on_sale_ids = repository::find_on_sale_ids(&mut *tx, &ids)
        .await
        .map_err(|_| RemoveError::UnexpectedError)?;

    if !on_sale_ids.is_empty() {
        tracing::warn!("Refusing to remove combos currently on sale: {:?}", on_sale_ids);
        return Err(RemoveError::ComboOnSale(on_sale_ids));
    }

    repository::delete_by_ids(&mut *tx, &ids)
        .await
        .map_err(|_| RemoveError::UnexpectedError)?;

    combo_item::repository::delete_by_combo_ids(&mut *tx, &ids)
        .await
        .map_err(|_| RemoveError::UnexpectedError)?;

    tx.commit().await.map_err(|err| {
        tracing::error!("Failed to commit database transaction: {}", err);
        RemoveError::UnexpectedError
    })
}

#[derive(Deserialize, Validate)]
pub struct UpdateComboWithItemsPayload {
    #[validate(length(min = 1))]
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub status: Option<ComboStatus>,
    pub category_id: Option<String>,
    /// Full replacement collection. The existing items are discarded
    /// wholesale; an empty collection leaves the combo with no items.
    #[validate(nested)]
    pub items: Vec<CreateComboItemPayload>,
}

#[derive(Debug)]
pub enum UpdateError {
    InvalidPayload(ValidationErrors),
    ComboNotFound,
    UnexpectedError,
}

pub async fn update_with_items(
    ctx: Arc<Context>,
    payload: UpdateComboWithItemsPayload,
) -> Result<ComboWithItems, UpdateError> {
    payload.validate().map_err(|errors| {
        tracing::warn!("Failed to validate payload: {errors}");
        UpdateError::InvalidPayload(errors)
    })?;

    let mut tx = ctx.db_conn.pool.begin().await.map_err(|err| {
        tracing::error!("Failed to start database transaction: {}", err);
        UpdateError::UnexpectedError
    })?;

    repository::update_by_id(
        &mut *tx,
        payload.id.clone(),
        repository::UpdateComboPayload {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            status: payload.status,
            category_id: payload.category_id,
        },
    )
    .await
    .map_err(|_| UpdateError::UnexpectedError)?;

    let combo = repository::find_by_id(&mut *tx, payload.id.clone())
        .await
        .map_err(|_| UpdateError::UnexpectedError)?
        .ok_or(UpdateError::ComboNotFound)?;

    combo_item::repository::delete_by_combo_ids(&mut *tx, &[payload.id.clone()])
        .await
        .map_err(|_| UpdateError::UnexpectedError)?;

    combo_item::repository::create_batch(&mut *tx, combo.id.clone(), payload.items)
        .await
        .map_err(|_| UpdateError::UnexpectedError)?;

    let items = combo_item::repository::find_by_combo_id(&mut *tx, combo.id.clone())
        .await
        .map_err(|_| UpdateError::UnexpectedError)?;

    tx.commit().await.map_err(|err| {
        tracing::error!("Failed to commit database transaction: {}", err);
        UpdateError::UnexpectedError
    })?;

    Ok(ComboWithItems { combo, items })
}

#[derive(Debug)]
pub enum FindError {
    ComboNotFound,
    UnexpectedError,
}

pub async fn find_with_items(ctx: Arc<Context>, id: String) -> Result<ComboWithItems, FindError> {
    let combo = repository::find_by_id(&ctx.db_conn.pool, id.clone())
        .await
        .map_err(|_| FindError::UnexpectedError)?
        .ok_or(FindError::ComboNotFound)?;

    let items = combo_item::repository::find_by_combo_id(&ctx.db_conn.pool, id)
        .await
        .map_err(|_| FindError::UnexpectedError)?;

    Ok(ComboWithItems { combo, items })
}

#[derive(Debug)]
pub enum UpdateStatusError {
    NoCombosSelected,
    UnexpectedError,
}

pub async fn update_status(
    ctx: Arc<Context>,
    ids: Vec<String>,
    status: ComboStatus,
) -> Result<(), UpdateStatusError> {
    if ids.is_empty() {
        return Err(UpdateStatusError::NoCombosSelected);
    }

    repository::update_status_by_ids(&ctx.db_conn.pool, &ids, status)
        .await
        .map_err(|_| UpdateStatusError::UnexpectedError)
}

#[derive(Debug)]
pub enum ListError {
    UnexpectedError,
}

pub async fn list(
    ctx: Arc<Context>,
    pagination: Pagination,
    filters: Filters,
) -> Result<Paginated<Combo>, ListError> {
    repository::find_many(&ctx.db_conn.pool, pagination, filters)
        .await
        .map_err(|_| ListError::UnexpectedError)
}
