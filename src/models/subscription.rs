use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Abonnement : user_id (abonné) suit author_id (auteur suivi)
// Pas de Related<users::Entity> : deux relations vers la même table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub author_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk_subscriptions_follower"
    )]
    Follower,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk_subscriptions_author"
    )]
    Author,
}

impl ActiveModelBehavior for ActiveModel {}
