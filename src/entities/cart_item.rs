use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, QueryFilter};

use crate::entities::user::Entity as User;

//product_id references the upstream catalog, so no foreign key for it here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "crate::entities::cart_item::Column::UserId",
        to = "crate::entities::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}

impl Related<crate::entities::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Entity {
    pub async fn find_by_user<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
    ) -> Result<Vec<Model>, DbErr> {
        Self::find()
            .filter(Column::UserId.eq(user_id))
            .all(conn)
            .await
    }

    pub async fn find_for_user_and_product<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        product_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Self::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ProductId.eq(product_id))
            .one(conn)
            .await
    }

    pub async fn exists_for_user_and_product<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        product_id: i64,
    ) -> Result<bool, DbErr> {
        Self::find_for_user_and_product(conn, user_id, product_id)
            .await
            .map(|entry| entry.is_some())
    }

    //No-op when nothing matches, so removal stays idempotent.
    pub async fn delete_for_user_and_product<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        product_id: i64,
    ) -> Result<(), DbErr> {
        Self::delete_many()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ProductId.eq(product_id))
            .exec(conn)
            .await
            .map(|_| ())
    }
}
