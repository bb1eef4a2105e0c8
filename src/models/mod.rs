// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM
//   (tables créées par crate::migrations).
//
// Liste des modules:
//   - health : Health check API
//   - dto : Data Transfer Objects (requêtes et réponses API)
//   - users : Utilisateurs (+ token de vérification email, expire 24h)
//   - matches : Matchs importés depuis football-data.org
//   - ratings : Notes 0.5 - 5.0
//   - comments : Commentaires (match FINISHED seulement)
//   - favorites : Matchs favoris
//   - watchlist_items : Matchs à regarder
//   - watched_matches : Matchs regardés (journal / diary)
//
// Points d'attention:
//   - Les tables de jointure ont un index unique (user_id, match_id)
//   - Les dates sont stockées en UTC sans fuseau (NaiveDateTime)
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod matches;
pub mod ratings;
pub mod comments;
pub mod favorites;
pub mod watchlist_items;
pub mod watched_matches;
