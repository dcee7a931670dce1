use std::env;

// Origins allowed to call the public notification endpoint.
const PROD_ORIGINS: &[&str] = &[
    "https://refineplasticsurgerytz.com",
    "https://www.refineplasticsurgerytz.com",
    "https://refine-plastic-surgery.vercel.app",
];

const DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:8080",
];

const DEFAULT_WHATSAPP: &str = "+255793145167";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_minute: u32,
    pub mail: MailConfig,
    pub contact: SiteContact,
    pub upload_dir: String,
    pub upload_base_url: String,
    pub error_tracking_dsn: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub operator_email: String,
}

#[derive(Clone, Debug)]
pub struct SiteContact {
    pub clinic_name: String,
    pub phone: String,
    pub whatsapp_number: String,
    pub email: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(24);

        // Explicit list wins; otherwise the production list, plus the dev
        // origins when APP_ENV=development.
        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(list) => list
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            Err(_) => {
                let mut origins: Vec<String> =
                    PROD_ORIGINS.iter().map(|o| o.to_string()).collect();
                let app_env =
                    env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());
                if app_env == "development" {
                    origins.extend(DEV_ORIGINS.iter().map(|o| o.to_string()));
                }
                origins
            }
        };

        let rate_limit_per_minute = env::var("RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(30);

        let mail = MailConfig {
            api_url: env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            api_key: env::var("MAIL_API_KEY")?,
            from: env::var("MAIL_FROM").unwrap_or_else(|_| {
                "Refine Appointments <appointments@refineplasticsurgerytz.com>".to_string()
            }),
            operator_email: env::var("OPERATOR_EMAIL")
                .unwrap_or_else(|_| "info@refineplasticsurgerytz.com".to_string()),
        };

        let contact = SiteContact {
            clinic_name: env::var("CLINIC_NAME")
                .unwrap_or_else(|_| "Refine Plastic & Aesthetic Surgery Centre".to_string()),
            phone: env::var("CLINIC_PHONE").unwrap_or_else(|_| "(+255) 793 145 167".to_string()),
            whatsapp_number: env::var("WHATSAPP_NUMBER")
                .unwrap_or_else(|_| DEFAULT_WHATSAPP.to_string()),
            email: env::var("OPERATOR_EMAIL")
                .unwrap_or_else(|_| "info@refineplasticsurgerytz.com".to_string()),
        };

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let upload_base_url =
            env::var("UPLOAD_BASE_URL").unwrap_or_else(|_| "/uploads".to_string());

        let error_tracking_dsn = env::var("ERROR_TRACKING_DSN").ok().filter(|s| !s.is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            session_ttl_hours,
            allowed_origins,
            rate_limit_per_minute,
            mail,
            contact,
            upload_dir,
            upload_base_url,
            error_tracking_dsn,
        })
    }
}
