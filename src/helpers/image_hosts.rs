use url::Url;

/// Hosts listing images may be served from over plain http as well as https.
pub const ALLOWED_IMAGE_HOSTS: [&str; 4] = [
    "firebasestorage.googleapis.com",
    "lh3.googleusercontent.com",
    "images.unsplash.com",
    "res.cloudinary.com",
];

/// Image sources a listing may reference: the fixed hosts, plus any https host.
#[derive(Clone, Debug)]
pub struct ImageHostAllowList {
    hosts: Vec<String>,
    any_https: bool,
}

impl Default for ImageHostAllowList {
    fn default() -> Self {
        Self::new(
            ALLOWED_IMAGE_HOSTS.iter().map(|host| host.to_string()).collect(),
            true,
        )
    }
}

impl ImageHostAllowList {
    pub fn new(hosts: Vec<String>, any_https: bool) -> Self {
        Self { hosts, any_https }
    }

    pub fn allows(&self, image: &str) -> bool {
        let Ok(url) = Url::parse(image) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };

        match url.scheme() {
            "https" => self.any_https || self.is_listed(host),
            "http" => self.is_listed(host),
            _ => false,
        }
    }

    fn is_listed(&self, host: &str) -> bool {
        self.hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host))
    }
}
