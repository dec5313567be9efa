use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Rakuten application ID sent on every catalog request
    pub rakuten_application_id: String,

    /// Rakuten Recipe API base URL
    #[serde(default = "default_rakuten_api_url")]
    pub rakuten_api_url: String,

    /// OpenAI API key for nutrition estimation and cheer messages
    pub openai_api_key: String,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Chat model used for estimation and cheer generation
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Open-Meteo forecast endpoint
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    /// SQLite database URL for the meal log
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    /// Default daily calorie target when a request does not carry one
    #[serde(default = "default_target_kcal")]
    pub target_kcal: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_rakuten_api_url() -> String {
    "https://app.rakuten.co.jp/services/api/Recipe".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_weather_api_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_sqlite_path() -> String {
    "sqlite://nutribuddy.db".to_string()
}

fn default_target_kcal() -> u32 {
    1800
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Full URL of the category taxonomy endpoint.
    pub fn category_list_url(&self) -> String {
        format!("{}/CategoryList/20121121", self.rakuten_api_url)
    }

    /// Full URL of the per-category ranking endpoint.
    pub fn category_ranking_url(&self) -> String {
        format!("{}/CategoryRanking/20170426", self.rakuten_api_url)
    }
}
