pub const DEFAULT_WHATSAPP_API_URL: &str = "https://graph.facebook.com/v18.0";
pub const DEFAULT_ACCEPTANCE_MESSAGE: &str = "Aceito a proposta";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub whatsapp_api_url: String,
    pub whatsapp_phone_id: String,
    pub whatsapp_access_token: String,
    /// Number the customer messages to accept a proposal.
    pub acceptance_number: String,
    /// Text pre-filled in the acceptance message.
    pub acceptance_message: String,
    /// Idle time after which an untouched proposal draft is dropped.
    pub draft_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            whatsapp_api_url: {
                let url = std::env::var("WHATSAPP_API_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_WHATSAPP_API_URL.to_string());
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("WHATSAPP_API_URL must start with http:// or https://");
                }
                url
            },
            whatsapp_phone_id: required_var("WHATSAPP_PHONE_ID")?,
            whatsapp_access_token: required_var("WHATSAPP_ACCESS_TOKEN")?,
            acceptance_number: required_var("ACCEPTANCE_WHATSAPP_NUMBER").and_then(|number| {
                if !number.chars().any(|c| c.is_ascii_digit()) {
                    anyhow::bail!("ACCEPTANCE_WHATSAPP_NUMBER must contain digits");
                }
                Ok(number)
            })?,
            acceptance_message: std::env::var("ACCEPTANCE_MESSAGE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ACCEPTANCE_MESSAGE.to_string()),
            draft_ttl_secs: std::env::var("DRAFT_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DRAFT_TTL_SECS must be a number of seconds"))
                .and_then(|ttl: u64| {
                    if ttl == 0 {
                        anyhow::bail!("DRAFT_TTL_SECS must be greater than zero");
                    }
                    Ok(ttl)
                })?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("WhatsApp API URL: {}", config.whatsapp_api_url);
        tracing::debug!("WhatsApp phone id: {}", config.whatsapp_phone_id);
        tracing::debug!("Draft TTL: {}s", config.draft_ttl_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    Ok(value)
}
