// Logique métier, appelée par les routes. Les services retournent
// Result<_, AppError> et reçoivent la connexion BD en paramètre.
pub mod auth_service;
pub mod email_service;
pub mod interaction_service;
pub mod library_service;
pub mod match_import_service;
pub mod match_service;
pub mod profile_service;
