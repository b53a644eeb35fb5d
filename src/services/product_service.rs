use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::{MONEY_SCALE, Product, max_money},
    response::Meta,
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_products(state: &AppState, query: ProductQuery) -> AppResult<(ProductList, Meta)> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }
    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }
    if let Some(brand) = query.brand.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Brand.eq(brand.clone()));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok((ProductList { items }, Meta::new(page, limit, total)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<Product> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity)
        .ok_or(AppError::NotFound("Product"))
}

pub async fn create_product(
    state: &AppState,
    actor: Uuid,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    let name = required_text("name", &payload.name)?;
    let category = required_text("category", &payload.category)?;
    let brand = required_text("brand", &payload.brand)?;
    validate_price(payload.price)?;
    validate_stock(payload.stock)?;
    ensure_name_free(state, &name, None).await?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        image: Set(payload.image),
        category: Set(category),
        brand: Set(brand),
        stock: Set(payload.stock),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    tracing::info!(product_id = %product.id, "product created");
    audit::record(
        &state.pool,
        actor,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(product_from_entity(product))
}

pub async fn update_product(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = required_text("name", &name)?;
        ensure_name_free(state, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(category) = payload.category {
        active.category = Set(required_text("category", &category)?);
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(required_text("brand", &brand)?);
    }
    if let Some(stock) = payload.stock {
        validate_stock(stock)?;
        active.stock = Set(stock);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        actor,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(product_from_entity(product))
}

/// Delete a product. Pending cart lines go with it; order lines keep their snapshot.
pub async fn delete_product(state: &AppState, actor: Uuid, id: Uuid) -> AppResult<()> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }

    tracing::info!(product_id = %id, "product deleted");
    audit::record(
        &state.pool,
        actor,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(())
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Products::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "Product name {name:?} is already taken"
        )));
    }
    Ok(())
}

fn required_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if price.normalize().scale() > MONEY_SCALE {
        return Err(AppError::BadRequest(format!(
            "price must have at most {MONEY_SCALE} decimal places"
        )));
    }
    if price > max_money() {
        return Err(AppError::BadRequest(format!(
            "price must not exceed {}",
            max_money()
        )));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }
    Ok(())
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        image: model.image,
        category: model.category,
        brand: model.brand,
        stock: model.stock,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
