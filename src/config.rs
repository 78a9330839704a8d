use clap::Parser;

pub const GEOAPIFY_BASE_URL: &str = "https://api.geoapify.com/v1/geocode";

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long, default_value = "127.0.0.1")]
    pub host: String,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    /// Comma separated list of origins allowed by CORS
    #[clap(env, long, default_value = "http://localhost:3000")]
    pub origin_urls: String,

    /// Base URL of the directory REST API, paths are appended verbatim
    #[clap(env, long)]
    pub api_base_url: String,

    #[clap(env, long, default_value_t = 10)]
    pub api_timeout_secs: u64,

    #[clap(env, long)]
    pub geoapify_api_key: String,

    #[clap(env, long, default_value = GEOAPIFY_BASE_URL)]
    pub geoapify_base_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_from_flags() {
        let config = Config::parse_from([
            "kosher-directory-server",
            "--api-base-url",
            "http://localhost:8080/api",
            "--geoapify-api-key",
            "key",
        ]);

        assert_eq!(config.api_timeout_secs, 10);
        assert_eq!(config.geoapify_base_url, GEOAPIFY_BASE_URL);
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
    }
}
