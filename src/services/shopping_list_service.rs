use sea_orm::*;
use sea_orm::sea_query::Expr;

use crate::models::{ingredient, recipe, recipe_ingredient, shopping_cart};

pub const SHOPPING_LIST_FILENAME: &str = "list.txt";

pub struct ShoppingListService;

/// Une ligne de la liste : ingrédient (nom + unité) et quantité totale
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl ShoppingListService {
    /// Additionne les ingrédients de toutes les recettes du panier.
    ///
    /// Regroupement par (nom, unité) : "Sel, g" et "Sel, pincée" restent deux
    /// lignes. Tri alphabétique par nom puis unité. Les lignes de jointure dont
    /// l'ingrédient a été supprimé sont ignorées. Panier vide -> liste vide.
    pub async fn collect<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> Result<Vec<ShoppingListLine>, DbErr> {
        recipe_ingredient::Entity::find()
            .select_only()
            .column_as(ingredient::Column::Name, "name")
            .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
            .column_as(
                Expr::col((recipe_ingredient::Entity, recipe_ingredient::Column::Amount)).sum(),
                "amount",
            )
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Ingredient.def())
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Recipe.def())
            .join(JoinType::InnerJoin, recipe::Relation::ShoppingCart.def())
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .group_by(ingredient::Column::Name)
            .group_by(ingredient::Column::MeasurementUnit)
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::MeasurementUnit)
            .into_model::<ShoppingListLine>()
            .all(db)
            .await
    }
}

/// "Farine: 500 g\n" par ligne, concaténé
pub fn render_shopping_list(lines: &[ShoppingListLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}: {} {}\n", line.name, line.amount, line.measurement_unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::services::relation_service::RelationService;
    use crate::test_support::{create_ingredient, create_recipe, create_user};

    fn line(name: &str, amount: i64, unit: &str) -> ShoppingListLine {
        ShoppingListLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_render_lines() {
        let text = render_shopping_list(&[line("Flour", 500, "g"), line("Milk", 1, "l")]);
        assert_eq!(text, "Flour: 500 g\nMilk: 1 l\n");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_shopping_list(&[]), "");
    }

    #[actix_web::test]
    async fn test_empty_cart_gives_empty_list() {
        let db = test_connection().await;
        let user = create_user(&db, "cook").await;
        let flour = create_ingredient(&db, "Flour", "g").await;
        // recette existante mais pas dans le panier
        create_recipe(&db, user.id, "Bread", &[], &[(flour.id, 200)]).await;

        let lines = ShoppingListService::collect(&db, user.id).await.unwrap();
        assert!(lines.is_empty());
    }

    #[actix_web::test]
    async fn test_same_ingredient_is_summed_once() {
        let db = test_connection().await;
        let user = create_user(&db, "cook").await;
        let flour = create_ingredient(&db, "Flour", "g").await;
        let a = create_recipe(&db, user.id, "Bread", &[], &[(flour.id, 200)]).await;
        let b = create_recipe(&db, user.id, "Cake", &[], &[(flour.id, 300)]).await;

        RelationService::add::<shopping_cart::Entity, _>(&db, user.id, a.id).await.unwrap();
        RelationService::add::<shopping_cart::Entity, _>(&db, user.id, b.id).await.unwrap();

        let lines = ShoppingListService::collect(&db, user.id).await.unwrap();
        assert_eq!(lines, vec![line("Flour", 500, "g")]);
        assert_eq!(render_shopping_list(&lines), "Flour: 500 g\n");
    }

    #[actix_web::test]
    async fn test_groups_by_name_and_unit_sorted_by_name() {
        let db = test_connection().await;
        let user = create_user(&db, "cook").await;
        let salt_g = create_ingredient(&db, "Salt", "g").await;
        let salt_pinch = create_ingredient(&db, "Salt", "pinch").await;
        let eggs = create_ingredient(&db, "Eggs", "pcs").await;
        let recipe = create_recipe(
            &db,
            user.id,
            "Omelette",
            &[],
            &[(salt_pinch.id, 1), (eggs.id, 3), (salt_g.id, 5)],
        )
        .await;

        RelationService::add::<shopping_cart::Entity, _>(&db, user.id, recipe.id)
            .await
            .unwrap();

        let lines = ShoppingListService::collect(&db, user.id).await.unwrap();
        assert_eq!(
            lines,
            vec![line("Eggs", 3, "pcs"), line("Salt", 5, "g"), line("Salt", 1, "pinch")]
        );
    }

    #[actix_web::test]
    async fn test_deleted_ingredient_is_left_out() {
        let db = test_connection().await;
        let user = create_user(&db, "cook").await;
        let flour = create_ingredient(&db, "Flour", "g").await;
        let salt = create_ingredient(&db, "Salt", "g").await;
        let recipe = create_recipe(&db, user.id, "Bread", &[], &[(flour.id, 200), (salt.id, 5)]).await;
        RelationService::add::<shopping_cart::Entity, _>(&db, user.id, recipe.id)
            .await
            .unwrap();

        ingredient::Entity::delete_by_id(salt.id).exec(&db).await.unwrap();

        // la ligne de jointure reste, sans ingrédient
        let orphans = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::IngredientId.is_null())
            .all(&db)
            .await
            .unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].amount, 5);

        let lines = ShoppingListService::collect(&db, user.id).await.unwrap();
        assert_eq!(render_shopping_list(&lines), "Flour: 200 g\n");
    }

    #[actix_web::test]
    async fn test_other_users_cart_is_ignored() {
        let db = test_connection().await;
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        let milk = create_ingredient(&db, "Milk", "ml").await;
        let recipe = create_recipe(&db, alice.id, "Latte", &[], &[(milk.id, 250)]).await;

        RelationService::add::<shopping_cart::Entity, _>(&db, bob.id, recipe.id)
            .await
            .unwrap();

        assert!(ShoppingListService::collect(&db, alice.id).await.unwrap().is_empty());
        assert_eq!(
            ShoppingListService::collect(&db, bob.id).await.unwrap(),
            vec![line("Milk", 250, "ml")]
        );
    }
}
