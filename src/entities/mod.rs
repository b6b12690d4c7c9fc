pub mod cart_item;
pub mod favourite;
pub mod user;

use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};

use crate::entities::{
    cart_item::Entity as CartItem,
    favourite::Entity as Favourite,
    user::Entity as User,
};

pub async fn setup_schema(db: &DatabaseConnection) {
    let schema = Schema::new(db.get_database_backend());
    let mut create_user_table = schema.create_table_from_entity(User);
    create_user_table.if_not_exists();
    let mut create_cart_item_table = schema.create_table_from_entity(CartItem);
    create_cart_item_table.if_not_exists();
    let mut create_favourite_table = schema.create_table_from_entity(Favourite);
    create_favourite_table.if_not_exists();

    db.execute(db.get_database_backend().build(&create_user_table))
        .await
        .expect("Failed to create users schema");
    db.execute(db.get_database_backend().build(&create_cart_item_table))
        .await
        .expect("Failed to create cart_items schema");
    db.execute(db.get_database_backend().build(&create_favourite_table))
        .await
        .expect("Failed to create favourites schema");
}
