use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed direction of a movement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Ingress,
    Egress,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Ingress => "ingress",
            TransactionType::Egress => "egress",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ingress" => Some(TransactionType::Ingress),
            "egress" => Some(TransactionType::Egress),
            _ => None,
        }
    }
}

/// One line of a ledger movement. Append-only, quantity always positive; the
/// direction lives in `transaction_type`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movement_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub header_id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub transaction_type: String,
    pub actor_role: String,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movement_header::Entity",
        from = "Column::HeaderId",
        to = "super::movement_header::Column::Id"
    )]
    MovementHeader,
}

impl Related<super::movement_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovementHeader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
