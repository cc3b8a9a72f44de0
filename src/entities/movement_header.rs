use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header of one ledger movement. Append-only; never mutated or deleted once
/// written.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movement_headers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub occurred_at: DateTimeUtc,
    pub donor_actor_id: Option<Uuid>,
    pub operator_actor_id: Option<Uuid>,
    pub status: String,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movement_line::Entity")]
    MovementLine,
}

impl Related<super::movement_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovementLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
