use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current stock of one product at one deposit. Single source of truth for
/// "how much stock exists where"; mutated only by the sync and adjustment
/// services. `version` is the optimistic-concurrency token guarding updates.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub deposit_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_available: Decimal,
    pub version: i32,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deposit::Entity",
        from = "Column::DepositId",
        to = "super::deposit::Column::Id"
    )]
    Deposit,
    #[sea_orm(
        belongs_to = "super::catalog_product::Entity",
        from = "Column::ProductId",
        to = "super::catalog_product::Column::Id"
    )]
    CatalogProduct,
}

impl Related<super::deposit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposit.def()
    }
}

impl Related<super::catalog_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CatalogProduct.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
