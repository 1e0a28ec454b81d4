//! Wire types for the GitHub REST API.
//!
//! Only the fields Grove reads are modelled; everything else in the
//! responses is ignored by serde.

use serde::{Deserialize, Serialize};

/// Response of `GET /repos/{owner}/{repo}/git/trees/{ref}?recursive=1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub sha: String,

    #[serde(default)]
    pub tree: Vec<TreeEntry>,

    /// Set when GitHub cut the listing short (very large repositories).
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a recursive tree listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,

    /// `blob`, `tree` or `commit` (submodules).
    #[serde(rename = "type")]
    pub entry_type: String,

    #[serde(default)]
    pub size: Option<u64>,
}

/// Response of `GET /repos/{owner}/{repo}/contents/{path}` for a file.
///
/// Files above the inline limit come back with `encoding: "none"` and an
/// empty `content`; callers decide what to do with those.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentsResponse {
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub encoding: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,
}

/// Repository owner as returned inside [`RepoResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerResponse {
    #[serde(default)]
    pub login: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One repository from `GET /user/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoResponse {
    pub id: u64,
    pub name: String,
    pub full_name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub html_url: String,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub owner: Option<OwnerResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_response_parses_github_payload() {
        let json = r#"{
            "sha": "9fb037999f264ba9a7fc6274d15fa3ae2ab98312",
            "url": "https://api.github.com/repos/octocat/Hello-World/trees/9fb0379",
            "tree": [
                {"path": "src", "mode": "040000", "type": "tree", "sha": "a1"},
                {"path": "src/main.rs", "mode": "100644", "type": "blob", "sha": "b2", "size": 30},
                {"path": "vendor/lib", "mode": "160000", "type": "commit", "sha": "c3"}
            ],
            "truncated": false
        }"#;
        let resp: TreeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.tree.len(), 3);
        assert_eq!(resp.tree[1].entry_type, "blob");
        assert_eq!(resp.tree[1].size, Some(30));
        assert!(!resp.truncated);
    }

    #[test]
    fn test_contents_response_tolerates_missing_fields() {
        let resp: ContentsResponse =
            serde_json::from_str(r#"{"type": "file", "encoding": "none", "content": ""}"#)
                .unwrap();
        assert_eq!(resp.encoding.as_deref(), Some("none"));
        assert_eq!(resp.content.as_deref(), Some(""));
        assert!(resp.path.is_none());
    }

    #[test]
    fn test_repo_response_without_owner() {
        let json = r#"{
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "html_url": "https://github.com/octocat/Hello-World",
            "private": false
        }"#;
        let repo: RepoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name, "octocat/Hello-World");
        assert!(repo.owner.is_none());
        assert!(repo.description.is_none());
    }
}
