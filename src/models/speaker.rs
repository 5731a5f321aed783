//! A speaker profile. The slug is derived from the name on first save.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait};
use serde::Serialize;

use crate::util::slugify;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "speakers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub about: String,
    pub facebook: String,
    pub twitter: String,
    pub website: String,
    pub image: String,
    pub slug: String,
    #[sea_orm(indexed)]
    pub timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let slug_missing = !matches!(
            &self.slug,
            ActiveValue::Set(slug) | ActiveValue::Unchanged(slug) if !slug.is_empty()
        );
        if slug_missing {
            if let ActiveValue::Set(name) | ActiveValue::Unchanged(name) = &self.name {
                self.slug = ActiveValue::Set(slugify(name));
            }
        }
        Ok(self)
    }
}
