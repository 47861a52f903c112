//! Définition des constantes globales pour l'application.

use log::LevelFilter;

pub const LOG_FILE: &str = "./signup.log"; // Fichier de log par défaut.
pub const LOG_FILE_ENV: &str = "SIGNUP_LOG_FILE"; // Variable d'environnement pour changer le fichier de log.
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;
