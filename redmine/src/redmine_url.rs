#[derive(Debug, Clone)]
pub struct RedmineURL(String);

impl AsRef<str> for RedmineURL {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl RedmineURL {
    /// Creates a new RedmineURL from the host of a connection, e.g. `https://redmine.example.com`.
    pub fn new(host: &str) -> Self {
        Self(host.trim().trim_end_matches('/').to_string())
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }
}
