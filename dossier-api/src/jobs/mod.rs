pub mod dossier_manager;
pub mod upload_tracker;
