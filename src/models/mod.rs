// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table (SeaORM, Postgres ou SQLite).
//
// Liste des modules:
//   - health : Health check API
//   - dto : requêtes / réponses JSON de l'API
//   - users : Utilisateurs (email et username uniques)
//   - tag : Tags (nom, couleur, slug)
//   - ingredient : Ingrédients (nom + unité de mesure)
//   - recipe : Recettes
//   - recipe_tag : jointure recette <-> tag
//   - recipe_ingredient : jointure recette <-> ingrédient (+ quantité)
//   - favorite : Favoris (utilisateur, recette)
//   - shopping_cart : Panier d'achats (utilisateur, recette)
//   - subscription : Abonnements (abonné, auteur)
//
// Points d'attention:
//   - favorite / shopping_cart / subscription ont une clé primaire composite :
//     un doublon est rejeté par la base elle-même
//   - recipe.author_id et les jointures tag/ingrédient passent à NULL
//     quand l'entité référencée est supprimée
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod tag;
pub mod ingredient;
pub mod recipe;
pub mod recipe_tag;
pub mod recipe_ingredient;
pub mod favorite;
pub mod shopping_cart;
pub mod subscription;
