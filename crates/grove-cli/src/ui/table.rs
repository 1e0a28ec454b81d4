//! Table rendering for CLI output using comfy-table.
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `grove list` | `render_workspaces_table()` |
//! | `grove repos` | `render_repositories_table()` |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use grove_core::{RepositorySummary, WorkspaceRecord};

use super::color::terminal_width;
use super::format::{format_relative_time, truncate_str};

/// Render stored workspaces for `grove list`.
///
/// ```text
/// ID                                     TEMPLATE  REPOSITORY   CREATED     TITLE
/// 5f0c3c1e-1d1f-4b57-9b1e-7c9b0d7c5a11   NEXTJS    octo/demo    2h ago      octo/demo
/// ```
pub fn render_workspaces_table(workspaces: &[WorkspaceRecord]) -> String {
    if workspaces.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("TEMPLATE"),
        Cell::new("REPOSITORY"),
        Cell::new("CREATED"),
        Cell::new("TITLE"),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(36)), // ID
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // TEMPLATE
        ColumnConstraint::LowerBoundary(Width::Fixed(12)), // REPOSITORY
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // CREATED
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // TITLE
    ]);

    for workspace in workspaces {
        table.add_row(vec![
            Cell::new(workspace.id.as_str()),
            Cell::new(&workspace.template_kind),
            Cell::new(truncate_str(&workspace.repository_full_name, 40)),
            Cell::new(format_relative_time(workspace.created_at)),
            Cell::new(truncate_str(&workspace.title, 40)),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render the user's GitHub repositories for `grove repos`.
///
/// The description column shrinks to what the terminal has left.
pub fn render_repositories_table(repos: &[RepositorySummary]) -> String {
    if repos.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("REPOSITORY"),
        Cell::new("LANGUAGE"),
        Cell::new("VISIBILITY"),
        Cell::new("UPDATED").set_alignment(CellAlignment::Right),
        Cell::new("DESCRIPTION"),
    ]);

    let name_width = repos
        .iter()
        .map(|r| r.full_name.chars().count())
        .max()
        .unwrap_or(10)
        .min(50);
    let description_width = terminal_width()
        .saturating_sub(name_width + 12 + 10 + 10 + 8)
        .max(20);

    for repo in repos {
        let updated = repo
            .updated_at
            .as_deref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|t| format_relative_time(t.with_timezone(&chrono::Utc)))
            .unwrap_or_else(|| "-".to_string());
        let description = repo
            .description
            .as_deref()
            .map(|d| truncate_str(d, description_width))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(truncate_str(&repo.full_name, 50)),
            Cell::new(repo.language.as_deref().unwrap_or("-")),
            Cell::new(if repo.private { "private" } else { "public" }),
            Cell::new(updated).set_alignment(CellAlignment::Right),
            Cell::new(description),
        ]);
    }

    table.trim_fmt().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::types::RepositoryOwner;
    use grove_core::WorkspaceId;

    fn workspace(id: &str, title: &str) -> WorkspaceRecord {
        WorkspaceRecord {
            id: WorkspaceId::new(id),
            title: title.to_string(),
            description: None,
            template_kind: "REACT".to_string(),
            repository_full_name: "octo/demo".to_string(),
            repository_url: "https://github.com/octo/demo".to_string(),
            user_id: "local".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_empty_tables_render_nothing() {
        assert_eq!(render_workspaces_table(&[]), "");
        assert_eq!(render_repositories_table(&[]), "");
    }

    #[test]
    fn test_workspaces_table_rows() {
        let output = render_workspaces_table(&[workspace("ws-1", "Demo"), workspace("ws-2", "Other")]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("TEMPLATE"));
        assert!(lines[1].contains("ws-1"));
        assert!(lines[1].contains("REACT"));
        assert!(lines[2].contains("Other"));
        assert!(output.contains("just now"));
    }

    #[test]
    fn test_repositories_table_rows() {
        let repo = RepositorySummary {
            id: 1,
            name: "demo".to_string(),
            full_name: "octo/demo".to_string(),
            description: None,
            html_url: "https://github.com/octo/demo".to_string(),
            language: Some("Rust".to_string()),
            private: true,
            updated_at: Some("not a date".to_string()),
            owner: RepositoryOwner::default(),
        };
        let output = render_repositories_table(&[repo]);
        assert!(output.contains("octo/demo"));
        assert!(output.contains("Rust"));
        assert!(output.contains("private"));
        assert!(output.lines().nth(1).is_some_and(|l| l.trim_end().ends_with('-')));
    }
}
