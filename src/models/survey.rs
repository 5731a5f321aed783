//! A visitor's tag preference submission. Written once, read by the
//! recommendation listing, never edited.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "surveys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub department: String,
    pub year: String,
    /// Comma-joined, prefix-stripped tag tokens, e.g. "Future, transport".
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    #[sea_orm(indexed)]
    pub timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
