//! Remote listing fetcher.
//!
//! One recursive listing call per import. No retries here: a failed listing
//! aborts the import.

use tracing::{debug, warn};

use crate::credentials::AccessToken;
use crate::errors::GroveError;
use crate::remote::{RemoteError, RemoteRepositoryService};
use crate::types::{RemoteListing, RepositoryReference, RepositorySummary};

/// Fetch the complete recursive path listing of `repo`.
///
/// A truncated listing is returned as-is with a warning logged; the caller
/// records it in the import summary.
pub fn fetch_listing(
    remote: &dyn RemoteRepositoryService,
    repo: &RepositoryReference,
    token: &AccessToken,
) -> Result<RemoteListing, GroveError> {
    debug!("Listing {}", repo);
    let listing = remote
        .list_tree(repo, token.as_str())
        .map_err(listing_error)?;

    if listing.truncated {
        warn!(
            "Listing of {} was truncated by the remote; only {} entries will be considered",
            repo,
            listing.entries.len()
        );
    }
    debug!("Listed {} entries in {}", listing.entries.len(), repo);
    Ok(listing)
}

/// List repositories visible to the token's owner.
pub fn fetch_repositories(
    remote: &dyn RemoteRepositoryService,
    token: &AccessToken,
) -> Result<Vec<RepositorySummary>, GroveError> {
    let repos = remote
        .list_repositories(token.as_str())
        .map_err(listing_error)?;
    debug!("Listed {} repositories", repos.len());
    Ok(repos)
}

/// Map a remote failure of a listing call to `UpstreamListing`.
///
/// Transport and decode failures have no status and report 0.
fn listing_error(err: RemoteError) -> GroveError {
    match err {
        RemoteError::Status { status, body } => GroveError::UpstreamListing { status, body },
        RemoteError::RateLimited { status, .. } => GroveError::UpstreamListing {
            status,
            body: "rate limit exceeded".to_string(),
        },
        RemoteError::Transport(msg) | RemoteError::Malformed(msg) => {
            GroveError::UpstreamListing { status: 0, body: msg }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RemoteContent, RemotePathEntry};

    struct FixedRemote {
        result: Result<RemoteListing, RemoteError>,
    }

    impl RemoteRepositoryService for FixedRemote {
        fn list_tree(
            &self,
            _repo: &RepositoryReference,
            token: &str,
        ) -> Result<RemoteListing, RemoteError> {
            assert_eq!(token, "tok");
            self.result.clone()
        }

        fn fetch_content(
            &self,
            _repo: &RepositoryReference,
            _path: &str,
            _token: &str,
        ) -> Result<RemoteContent, RemoteError> {
            unreachable!("listing never fetches content")
        }

        fn list_repositories(&self, _token: &str) -> Result<Vec<RepositorySummary>, RemoteError> {
            Err(RemoteError::Status {
                status: 401,
                body: "Bad credentials".to_string(),
            })
        }
    }

    fn repo() -> RepositoryReference {
        RepositoryReference::github("octo/demo").unwrap()
    }

    #[test]
    fn test_listing_passes_entries_through_in_order() {
        let remote = FixedRemote {
            result: Ok(RemoteListing {
                entries: vec![RemotePathEntry::blob("b.txt"), RemotePathEntry::blob("a.txt")],
                truncated: true,
            }),
        };
        let token = AccessToken::new("tok").unwrap();
        let listing = fetch_listing(&remote, &repo(), &token).unwrap();
        assert_eq!(listing.entries[0].path, "b.txt");
        assert!(listing.truncated);
    }

    #[test]
    fn test_listing_status_becomes_upstream_error() {
        let remote = FixedRemote {
            result: Err(RemoteError::Status {
                status: 404,
                body: "Not Found".to_string(),
            }),
        };
        let token = AccessToken::new("tok").unwrap();
        match fetch_listing(&remote, &repo(), &token) {
            Err(GroveError::UpstreamListing { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_transport_error_reports_status_zero() {
        let remote = FixedRemote {
            result: Err(RemoteError::Transport("connection refused".to_string())),
        };
        let token = AccessToken::new("tok").unwrap();
        assert!(matches!(
            fetch_listing(&remote, &repo(), &token),
            Err(GroveError::UpstreamListing { status: 0, .. })
        ));
    }

    #[test]
    fn test_repository_listing_error() {
        let remote = FixedRemote {
            result: Ok(RemoteListing::default()),
        };
        let token = AccessToken::new("tok").unwrap();
        assert!(matches!(
            fetch_repositories(&remote, &token),
            Err(GroveError::UpstreamListing { status: 401, .. })
        ));
    }
}
