//! A blog/event post. The slug is derived from the title on first save and
//! carries a uniqueness constraint.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Condition, ConnectionTrait, QueryFilter, Select};
use serde::Serialize;

use crate::util::slugify;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    #[sea_orm(indexed)]
    pub published: bool,
    #[sea_orm(indexed)]
    pub is_highlight: bool,
    pub category: String,
    pub date: String,
    pub time: String,
    pub contact: String,
    pub fee: String,
    pub image: String,
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
            if let ActiveValue::Set(title) | ActiveValue::Unchanged(title) = &self.title {
                self.slug = ActiveValue::Set(slugify(title));
            }
        }
        Ok(self)
    }
}

impl Entity {
    /// Entries visible to anonymous callers.
    pub fn public() -> Select<Entity> {
        Self::find().filter(Column::Published.eq(true))
    }

    /// Unpublished entries, for the admin drafts listing.
    pub fn drafts() -> Select<Entity> {
        Self::find().filter(Column::Published.eq(false))
    }

    /// Public entries promoted as highlights plus any matching the visitor's
    /// tags. Matching is substring containment over the free-text tags
    /// column, not exact membership.
    pub fn recommended(tags: &[String]) -> Select<Entity> {
        let mut any_tag = Condition::any().add(Column::Tags.contains("highlight"));
        for tag in tags {
            any_tag = any_tag.add(Column::Tags.contains(tag));
        }
        Self::public().filter(any_tag)
    }
}
