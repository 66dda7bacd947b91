use clap::{Arg, ArgAction, Command};

const AGENT_VALUES: [&str; 4] = ["claude", "codex", "gemini", "opencode"];

pub fn build_cli() -> Command {
    Command::new("grove")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Juggle git worktrees running AI coding agents, with session continuity")
        .long_about(
            "Grove tracks the coding-agent sessions produced in your git worktrees. \
            Each supported agent CLI writes its own session transcripts to disk in its \
            own format; Grove discovers those session ids, keeps a per-repository \
            history of launches, and tells you exactly what 'continue' should resume \
            on a given branch, worktree, and agent.",
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list").about("List worktrees with their latest agent usage").arg(
                Arg::new("json")
                    .long("json")
                    .help("Output in JSON format")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("quickstart")
                .about("Show quick-start session candidates for a branch, one per agent")
                .arg(
                    Arg::new("branch")
                        .help("Branch to look up")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("worktree")
                        .long("worktree")
                        .short('w')
                        .help("Worktree path (default: the worktree that has the branch checked out)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("continue")
                .about("Resolve the session id that 'continue' should resume")
                .arg(
                    Arg::new("branch")
                        .help("Branch to continue work on")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("agent")
                        .long("agent")
                        .short('a')
                        .help("Agent to continue with")
                        .required(true)
                        .value_parser(AGENT_VALUES),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("discover")
                .about("Find the most recent on-disk session for an agent right now")
                .arg(
                    Arg::new("agent")
                        .long("agent")
                        .short('a')
                        .help("Agent whose session files to search")
                        .required(true)
                        .value_parser(AGENT_VALUES),
                )
                .arg(
                    Arg::new("worktree")
                        .long("worktree")
                        .short('w')
                        .help("Restrict discovery to sessions from this worktree"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("record")
                .about("Record a completed agent launch in the usage ledger")
                .long_about(
                    "Called by the launch orchestrator after an agent subprocess has been \
                    spawned. If the session id is not known yet, --wait-ms polls the \
                    agent's session directory until the freshly written session file \
                    appears or the budget runs out; the entry is recorded either way \
                    and the history refresher can fill the id in later.",
                )
                .arg(
                    Arg::new("branch")
                        .long("branch")
                        .short('b')
                        .help("Branch the agent was launched on")
                        .required(true),
                )
                .arg(
                    Arg::new("agent")
                        .long("agent")
                        .short('a')
                        .help("Agent that was launched")
                        .required(true)
                        .value_parser(AGENT_VALUES),
                )
                .arg(
                    Arg::new("worktree")
                        .long("worktree")
                        .short('w')
                        .help("Worktree the agent was launched in"),
                )
                .arg(
                    Arg::new("session-id")
                        .long("session-id")
                        .help("Session id, if the orchestrator already knows it"),
                )
                .arg(
                    Arg::new("label")
                        .long("label")
                        .help("Display label for the tool (default: the agent's display name)"),
                )
                .arg(Arg::new("model").long("model").help("Model the agent was launched with"))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .help("Launch mode to record")
                        .default_value("interactive"),
                )
                .arg(
                    Arg::new("inference-level")
                        .long("inference-level")
                        .help("Inference/reasoning level the agent was launched with"),
                )
                .arg(
                    Arg::new("wait-ms")
                        .long("wait-ms")
                        .help("Poll this long for the agent's session file before recording")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Show the usage ledger for this repository")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                )
                .subcommand(Command::new("clear").about("Delete the usage ledger for this repository")),
        )
        .subcommand(
            Command::new("agents").about("List supported agents and their availability").arg(
                Arg::new("json")
                    .long("json")
                    .help("Output in JSON format")
                    .action(ArgAction::SetTrue),
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_quickstart_requires_branch() {
        let result = build_cli().try_get_matches_from(["grove", "quickstart"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_continue_requires_agent() {
        let result = build_cli().try_get_matches_from(["grove", "continue", "main"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_accepts_full_argument_set() {
        let result = build_cli().try_get_matches_from([
            "grove",
            "record",
            "--branch",
            "feature/login",
            "--agent",
            "codex",
            "--worktree",
            "/repo/worktrees/login",
            "--model",
            "o4-mini",
            "--inference-level",
            "high",
            "--wait-ms",
            "5000",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_unknown_agent() {
        let result =
            build_cli().try_get_matches_from(["grove", "discover", "--agent", "cursor"]);
        assert!(result.is_err());
    }
}
