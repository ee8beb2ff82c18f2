use serde::Deserialize;

// GitHub API response structures. The detail endpoint
// (`/repositories/{id}`) returns a superset of the listing summary, so one
// struct covers both; fields a summary omits deserialize to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRepo {
    pub id: u64,
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub owner: Option<RawOwner>,
    pub language: Option<String>,
    pub visibility: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub homepage: Option<String>,
    pub topics: Option<Vec<String>>,
    pub license: Option<RawLicense>,
    pub size: Option<u64>,
    pub default_branch: Option<String>,
    pub has_wiki: Option<bool>,
    pub has_pages: Option<bool>,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOwner {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLicense {
    pub name: Option<String>,
    pub spdx_id: Option<String>,
}
