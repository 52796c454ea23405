use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Directory of poster images to serve statically, if any.
    pub poster_dir_path: Option<String>,
    /// Secret used to sign and verify identity tokens.
    pub jwt_secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            poster_dir_path: None,
            jwt_secret: "filmlog-dev-secret".to_string(),
        }
    }
}
