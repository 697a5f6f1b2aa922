//! GitRepository URL handling

use url::Url;

use crate::models::Datasource;

/// Host and `owner/repo` path of a Git remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRemote {
    pub host: String,
    pub project: String,
}

impl GitRemote {
    /// Parse `https://`, `ssh://` and scp-like `git@host:owner/repo.git` remotes
    pub fn parse(remote: &str) -> Option<Self> {
        let remote = remote.trim();
        let normalized = match remote.strip_prefix("git@") {
            Some(rest) if !rest.contains("://") => {
                let (host, path) = rest.split_once(':')?;
                format!("https://{}/{}", host, path.trim_start_matches('/'))
            }
            _ => remote.to_string(),
        };

        let url = Url::parse(&normalized).ok()?;
        let host = url.host_str()?.to_string();
        let project = url
            .path()
            .trim_matches('/')
            .trim_end_matches(".git")
            .to_string();
        if project.is_empty() {
            return None;
        }
        Some(Self { host, project })
    }

    /// Human-facing `https://` form of the remote
    pub fn source_url(&self) -> String {
        format!("https://{}/{}", self.host, self.project)
    }

    /// Tag datasource for this host, if it has a dedicated one
    pub fn tags_datasource(&self) -> Option<Datasource> {
        match self.host.as_str() {
            "github.com" => Some(Datasource::GithubTags),
            "gitlab.com" => Some(Datasource::GitlabTags),
            "bitbucket.org" => Some(Datasource::BitbucketTags),
            _ => None,
        }
    }
}
