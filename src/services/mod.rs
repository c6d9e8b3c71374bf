// logique métier, indépendante d'actix : chaque fonction reçoit la connexion
// et l'identité de l'utilisateur en paramètres

pub mod catalogue_service;
pub mod presenter;
pub mod recipe_service;
pub mod relation_service;
pub mod shopping_list_service;
pub mod subscription_service;
pub mod user_service;
