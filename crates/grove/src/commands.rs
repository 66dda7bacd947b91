use clap::ArgMatches;
use tracing::{error, info, warn};

use std::path::PathBuf;

use grove_core::AgentType;
use grove_core::agents;
use grove_core::config::GroveConfig;
use grove_core::continuity::{
    ContinuityQuery, SessionQuery, UsageEntry, UsageLedger, WaitOptions, adapter_for,
    find_latest, find_latest_branch_session, find_latest_branch_sessions_by_tool,
    refresh_quick_start_entries, resolve_continue_session_id, wait_for,
};
use grove_core::events;
use grove_core::git;

use crate::table::truncate;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    match matches.subcommand() {
        Some(("list", sub_matches)) => handle_list_command(sub_matches),
        Some(("quickstart", sub_matches)) => handle_quickstart_command(sub_matches),
        Some(("continue", sub_matches)) => handle_continue_command(sub_matches),
        Some(("discover", sub_matches)) => handle_discover_command(sub_matches),
        Some(("record", sub_matches)) => handle_record_command(sub_matches),
        Some(("history", sub_matches)) => handle_history_command(sub_matches),
        Some(("agents", sub_matches)) => handle_agents_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> GroveConfig {
    match GroveConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.grove/config.toml and ./.grove/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            GroveConfig::default()
        }
    }
}

/// Validate branch name to prevent injection attacks
fn is_valid_branch_name(name: &str) -> bool {
    // Allow alphanumeric, hyphens, underscores, dots and forward slashes.
    // Prevent path traversal and special characters.
    !name.is_empty()
        && !name.contains("..")
        && !name.starts_with('/')
        && !name.ends_with('/')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        && name.len() <= 255
}

/// Primary repository root plus the worktree inventory for the current
/// directory.
fn repo_context() -> Result<(PathBuf, Vec<grove_core::WorktreeInfo>), Box<dyn std::error::Error>>
{
    let cwd = std::env::current_dir()?;
    let root = git::main_repo_root(&cwd)?;
    let worktrees = git::list_worktrees(&root)?;
    Ok((root, worktrees))
}

fn handle_list_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.list_started", json_output = json_output);

    let config = load_config_with_warning();
    let (root, worktrees) = repo_context()?;
    let data = UsageLedger::for_repo(&root, &config)?.load()?;

    #[derive(serde::Serialize)]
    struct WorktreeRow {
        branch: String,
        path: String,
        last_usage: Option<UsageEntry>,
    }

    let rows: Vec<WorktreeRow> = worktrees
        .iter()
        .map(|wt| WorktreeRow {
            branch: wt.branch.clone(),
            path: wt.path.display().to_string(),
            last_usage: find_latest_branch_session(&data.history, &wt.branch, None).cloned(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No worktrees found.");
    } else {
        println!("Worktrees in {}:", root.display());
        for row in &rows {
            let usage = row
                .last_usage
                .as_ref()
                .map(|entry| {
                    format!(
                        "{} @ {}",
                        entry.tool_label,
                        entry.timestamp.format("%Y-%m-%d %H:%M")
                    )
                })
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} {} ({})",
                truncate(&row.branch, 28),
                usage,
                row.path
            );
        }
    }

    info!(event = "cli.list_completed", count = rows.len());

    Ok(())
}

fn handle_quickstart_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let branch = matches
        .get_one::<String>("branch")
        .ok_or("Branch argument is required")?;
    let json_output = matches.get_flag("json");

    if !is_valid_branch_name(branch) {
        return Err(format!("Invalid branch name: '{}'", branch).into());
    }

    info!(event = "cli.quickstart_started", branch = branch);

    let config = load_config_with_warning();
    let (root, worktrees) = repo_context()?;
    let data = UsageLedger::for_repo(&root, &config)?.load()?;

    // Explicit worktree wins; otherwise the worktree that has the branch
    // checked out, if any.
    let worktree_path: Option<PathBuf> = matches
        .get_one::<String>("worktree")
        .map(PathBuf::from)
        .or_else(|| {
            worktrees
                .iter()
                .find(|wt| wt.branch == *branch)
                .map(|wt| wt.path.clone())
        });

    let candidates = find_latest_branch_sessions_by_tool(
        &data.history,
        branch,
        worktree_path.as_deref().and_then(|p| p.to_str()),
    );

    let query = ContinuityQuery {
        branch: branch.clone(),
        tool_id: None,
        worktree_path,
    };
    let refreshed = refresh_quick_start_entries(&config, &candidates, &query);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&refreshed)?);
    } else if refreshed.is_empty() {
        println!("No quick-start candidates for branch '{}'.", branch);
    } else {
        println!("Quick-start candidates for '{}':", branch);
        let formatter = crate::table::TableFormatter::new(&refreshed);
        formatter.print_table(&refreshed);
    }

    info!(
        event = "cli.quickstart_completed",
        branch = branch,
        count = refreshed.len()
    );

    Ok(())
}

fn handle_continue_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let branch = matches
        .get_one::<String>("branch")
        .ok_or("Branch argument is required")?;
    let agent_name = matches
        .get_one::<String>("agent")
        .ok_or("Agent argument is required")?;
    let json_output = matches.get_flag("json");

    if !is_valid_branch_name(branch) {
        return Err(format!("Invalid branch name: '{}'", branch).into());
    }

    info!(
        event = "cli.continue_started",
        branch = branch,
        agent = agent_name
    );

    let config = load_config_with_warning();
    let (root, _) = repo_context()?;
    let data = UsageLedger::for_repo(&root, &config)?.load()?;

    let session_id = resolve_continue_session_id(&data, branch, agent_name);

    #[derive(serde::Serialize)]
    struct ContinueResponse {
        branch: String,
        agent: String,
        session_id: Option<String>,
        resume_command: Option<String>,
    }

    let resume_command = session_id.as_deref().and_then(|id| {
        let backend = agents::get_agent(agent_name)?;
        let base = config.get_agent_command(agent_name).ok()?;
        let mut parts = vec![base];
        parts.extend(backend.resume_args(id));
        Some(parts.join(" "))
    });

    if json_output {
        let response = ContinueResponse {
            branch: branch.clone(),
            agent: agent_name.clone(),
            session_id: session_id.clone(),
            resume_command: resume_command.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        match (&session_id, &resume_command) {
            (Some(id), Some(command)) => {
                println!("Session: {}", id);
                println!("Resume with: {}", command);
            }
            (Some(id), None) => println!("Session: {}", id),
            _ => println!(
                "No resumable session found for '{}' with {}.",
                branch, agent_name
            ),
        }
    }

    info!(
        event = "cli.continue_completed",
        branch = branch,
        agent = agent_name,
        found = session_id.is_some()
    );

    Ok(())
}

fn handle_discover_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let agent_name = matches
        .get_one::<String>("agent")
        .ok_or("Agent argument is required")?;
    let json_output = matches.get_flag("json");

    let agent: AgentType = agent_name.parse()?;
    let config = load_config_with_warning();

    info!(event = "cli.discover_started", agent = agent_name);

    // Discovery works outside a repository too; the inventory is only an
    // extra scoping aid when available.
    let worktrees = repo_context().map(|(_, wts)| wts).unwrap_or_default();
    let query = SessionQuery {
        worktree: matches.get_one::<String>("worktree").map(PathBuf::from),
        worktrees,
        ..Default::default()
    };

    let found = find_latest(&config, agent, &query);

    #[derive(serde::Serialize)]
    struct DiscoverResponse {
        agent: String,
        session_id: String,
        source_path: String,
        modified_at: String,
    }

    match found {
        Some(candidate) => {
            if json_output {
                let response = DiscoverResponse {
                    agent: agent_name.clone(),
                    session_id: candidate.id.clone(),
                    source_path: candidate.source_path.display().to_string(),
                    modified_at: candidate.modified_at.to_rfc3339(),
                };
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("Session: {}", candidate.id);
                println!("File: {}", candidate.source_path.display());
                println!(
                    "Modified: {}",
                    candidate.modified_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
            info!(
                event = "cli.discover_completed",
                agent = agent_name,
                session_id = %candidate.id
            );
        }
        None => {
            if json_output {
                println!("null");
            } else {
                println!("No session found for {}.", agent_name);
            }
            info!(event = "cli.discover_completed", agent = agent_name, found = false);
        }
    }

    Ok(())
}

fn handle_record_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let branch = matches
        .get_one::<String>("branch")
        .ok_or("Branch argument is required")?;
    let agent_name = matches
        .get_one::<String>("agent")
        .ok_or("Agent argument is required")?;

    if !is_valid_branch_name(branch) {
        return Err(format!("Invalid branch name: '{}'", branch).into());
    }

    let agent: AgentType = agent_name.parse()?;
    let config = load_config_with_warning();
    let (root, _) = repo_context()?;

    let worktree = matches.get_one::<String>("worktree").cloned();
    let launched_at = chrono::Utc::now();

    info!(
        event = "cli.record_started",
        branch = branch,
        agent = agent_name,
        worktree = ?worktree
    );

    // Prefer an id the orchestrator already knows; otherwise optionally
    // poll for the freshly written session file.
    let mut session_id = matches.get_one::<String>("session-id").cloned();
    if session_id.is_none()
        && let Some(wait_ms) = matches.get_one::<u64>("wait-ms")
        && let Some(adapter) = adapter_for(agent, &config)
    {
        let query = SessionQuery {
            worktree: worktree.as_ref().map(PathBuf::from),
            window: Some(chrono::TimeDelta::milliseconds(
                config.continuity.window_ms as i64,
            )),
            ..Default::default()
        };
        let opts = WaitOptions {
            started_at: launched_at,
            timeout: std::time::Duration::from_millis(*wait_ms),
            poll_interval: std::time::Duration::from_millis(config.continuity.poll_interval_ms),
        };
        session_id = wait_for(adapter.as_ref(), &query, &opts).map(|candidate| candidate.id);
    }

    let tool_label = matches
        .get_one::<String>("label")
        .cloned()
        .or_else(|| agents::get_agent(agent_name).map(|b| b.display_name().to_string()))
        .unwrap_or_else(|| agent_name.clone());

    let entry = UsageEntry {
        tool_id: agent.as_str().to_string(),
        tool_label,
        branch: branch.clone(),
        worktree_path: worktree,
        model: matches.get_one::<String>("model").cloned(),
        mode: matches
            .get_one::<String>("mode")
            .cloned()
            .unwrap_or_else(|| "interactive".to_string()),
        inference_level: matches.get_one::<String>("inference-level").cloned(),
        timestamp: launched_at,
        session_id: session_id.clone(),
    };

    let ledger = UsageLedger::for_repo(&root, &config)?;
    match ledger.append(std::slice::from_ref(&entry)) {
        Ok(()) => {
            match &session_id {
                Some(id) => println!("✅ Recorded launch of {} on '{}' (session {})", agent_name, branch, id),
                None => println!(
                    "✅ Recorded launch of {} on '{}' (session id not discovered yet)",
                    agent_name, branch
                ),
            }
            info!(
                event = "cli.record_completed",
                branch = branch,
                agent = agent_name,
                session_id = ?session_id
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to record launch: {}", e);
            error!(
                event = "cli.record_failed",
                branch = branch,
                agent = agent_name,
                error = %e
            );
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_history_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_warning();
    let (root, _) = repo_context()?;
    let ledger = UsageLedger::for_repo(&root, &config)?;

    if let Some(("clear", _)) = matches.subcommand() {
        ledger.clear()?;
        println!("✅ Usage history cleared for {}", root.display());
        info!(event = "cli.history_cleared");
        return Ok(());
    }

    let json_output = matches.get_flag("json");

    match ledger.load() {
        Ok(data) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if data.history.is_empty() {
                println!("No usage history for {}.", root.display());
            } else {
                println!("Usage history for {}:", root.display());
                let formatter = crate::table::TableFormatter::new(&data.history);
                formatter.print_table(&data.history);
            }
            info!(event = "cli.history_completed", count = data.history.len());
            Ok(())
        }
        Err(e) => {
            // A corrupt ledger is loss of user-visible history; fail loudly
            // instead of presenting an empty screen.
            eprintln!("❌ Could not read usage history: {}", e);
            eprintln!(
                "   The file exists but does not parse. Fix or remove it: {}",
                ledger.path().display()
            );
            error!(event = "cli.history_failed", error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_agents_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    #[derive(serde::Serialize)]
    struct AgentRow {
        name: &'static str,
        display_name: &'static str,
        command: &'static str,
        available: bool,
    }

    let rows: Vec<AgentRow> = AgentType::all()
        .iter()
        .filter_map(|agent| agents::get_agent_by_type(*agent))
        .map(|backend| AgentRow {
            name: backend.name(),
            display_name: backend.display_name(),
            command: backend.default_command(),
            available: backend.is_available(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("Supported agents:");
        for row in &rows {
            let marker = if row.available { "✓" } else { "✗" };
            println!(
                "  {} {} ({}) - {}",
                marker,
                truncate(row.display_name, 14),
                row.name,
                if row.available {
                    "installed"
                } else {
                    "not found in PATH"
                }
            );
        }
    }

    info!(event = "cli.agents_completed", count = rows.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_branch_name() {
        assert!(is_valid_branch_name("main"));
        assert!(is_valid_branch_name("feature/login-form"));
        assert!(is_valid_branch_name("release/v1.2.3"));
        assert!(is_valid_branch_name("fix_bug"));

        assert!(!is_valid_branch_name(""));
        assert!(!is_valid_branch_name("../escape"));
        assert!(!is_valid_branch_name("/leading"));
        assert!(!is_valid_branch_name("trailing/"));
        assert!(!is_valid_branch_name("has space"));
        assert!(!is_valid_branch_name("semi;colon"));
    }
}
