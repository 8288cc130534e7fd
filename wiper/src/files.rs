//! Selection of remote files to purge on a wipe
//!
//! `plan` decides which file groups apply; `resolve` lists each group's root on
//! the panel and matches the listing against the group's globs. Groups are
//! resolved concurrently and independently: a group whose listing fails is
//! recorded and skipped, the others still contribute their matches.

use futures::future::join_all;
use glob::{MatchOptions, Pattern};

use crate::config::{FileGroup, ServerWipeConfig};
use crate::constants::blueprints;
use crate::errors::FileOperationError;
use crate::panel::PanelClient;
use crate::run_log::RunLog;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Per-player blueprint databases, purged on every blueprint wipe
pub fn blueprint_group() -> FileGroup {
    FileGroup {
        root: blueprints::ROOT.to_string(),
        files: vec![blueprints::GLOB.to_string()],
    }
}

/// File groups to purge, in order: every wipe, force wipe, built-in blueprint, blueprint wipe
pub fn plan(config: &ServerWipeConfig, is_force_wipe: bool, is_blueprint_wipe: bool) -> Vec<FileGroup> {
    let mut groups = config.files_on_wipe.clone();

    if is_force_wipe {
        groups.extend(config.files_on_force_wipe.iter().cloned());
    }

    if is_blueprint_wipe {
        groups.push(blueprint_group());
        groups.extend(config.files_on_blueprint_wipe.iter().cloned());
    }

    groups
}

/// Absolute paths of `names` matching the group's globs, glob by glob
pub fn match_names(group: &FileGroup, names: &[String]) -> Result<Vec<String>, FileOperationError> {
    let mut matched = Vec::new();

    for glob in &group.files {
        let pattern = Pattern::new(glob).map_err(|e| FileOperationError::InvalidPattern {
            root: group.root.clone(),
            pattern: glob.clone(),
            reason: e.to_string(),
        })?;

        matched.extend(
            names
                .iter()
                .filter(|name| pattern.matches_with(name, MATCH_OPTIONS))
                .map(|name| join_posix(&group.root, name)),
        );
    }

    Ok(matched)
}

fn join_posix(root: &str, name: &str) -> String {
    if root.ends_with('/') {
        format!("{}{}", root, name)
    } else {
        format!("{}/{}", root, name)
    }
}

#[derive(Debug, Default)]
pub struct ResolvedFiles {
    pub paths: Vec<String>,
    pub failures: Vec<FileOperationError>,
}

/// List and match every group; failures are collected, never fatal
pub async fn resolve(panel: &PanelClient, server_id: &str, groups: &[FileGroup], log: &RunLog) -> ResolvedFiles {
    let lookups = groups.iter().map(|group| async move {
        let names = panel.list_files(server_id, &group.root).await
            .map_err(|source| FileOperationError::ListFailed {
                root: group.root.clone(),
                source,
            })?;
        let matched = match_names(group, &names)?;
        Ok::<_, FileOperationError>((group, matched))
    });

    let mut resolved = ResolvedFiles::default();
    for result in join_all(lookups).await {
        match result {
            Ok((group, matched)) => {
                if !matched.is_empty() {
                    log.line(format!(
                        "match (root: {}, globs: {:?}): {:?}",
                        group.root, group.files, matched
                    ))
                    .await;
                }
                resolved.paths.extend(matched);
            }
            Err(e) => {
                log.warn(format!("error finding files for server {}: {}", server_id, e)).await;
                resolved.failures.push(e);
            }
        }
    }

    resolved
}
