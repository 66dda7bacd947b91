//! Session location: one-shot lookup and post-launch polling.
//!
//! `wait_for` is the engine's race-handling core. The launching process and
//! the agent's own session-file write are two independent, unsynchronized
//! processes with no shared signal, so the only option is polling the
//! filesystem until the file shows up or the deadline passes.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use super::adapters::{SessionAdapter, adapter_for};
use super::types::{SessionCandidate, SessionQuery};
use crate::agents::AgentType;
use crate::config::{ContinuityConfig, GroveConfig};

/// How far before the launch timestamp a candidate's file time may sit and
/// still count as belonging to the launch. Covers clock skew between the
/// launcher's clock and filesystem timestamps.
const LAUNCH_SLACK_SECS: i64 = 2;

/// Timing for a post-launch wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// When the subprocess launch happened.
    pub started_at: DateTime<Utc>,
    /// Total budget before giving up.
    pub timeout: Duration,
    /// Cadence between polls.
    pub poll_interval: Duration,
}

impl WaitOptions {
    pub fn from_config(config: &ContinuityConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            timeout: Duration::from_millis(config.wait_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// One-shot lookup: the best existing session for an agent right now.
pub fn find_latest(
    config: &GroveConfig,
    agent: AgentType,
    query: &SessionQuery,
) -> Option<SessionCandidate> {
    let adapter = adapter_for(agent, config)?;
    adapter.find_latest_session(query)
}

/// Poll an adapter until a session written on or after `started_at`
/// appears, or the timeout elapses.
///
/// The deadline is computed up front and checked once per iteration, so
/// the call is guaranteed to terminate and never sleeps past the deadline
/// by more than one poll interval. A poll that finds nothing (including
/// one that failed on I/O inside the adapter) just means "not yet".
pub fn wait_for(
    adapter: &dyn SessionAdapter,
    query: &SessionQuery,
    opts: &WaitOptions,
) -> Option<SessionCandidate> {
    let deadline = Instant::now() + opts.timeout;
    let slack = TimeDelta::seconds(LAUNCH_SLACK_SECS);
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        let probe = SessionQuery {
            prefer_closest_to: Some(opts.started_at),
            ..query.clone()
        };

        if let Some(candidate) = adapter.find_latest_session(&probe)
            && candidate.modified_at >= opts.started_at - slack
        {
            info!(
                event = "core.continuity.wait_for_resolved",
                agent = adapter.agent_type().as_str(),
                session_id = %candidate.id,
                polls = polls
            );
            return Some(candidate);
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(
                event = "core.continuity.wait_for_timed_out",
                agent = adapter.agent_type().as_str(),
                polls = polls
            );
            return None;
        }
        std::thread::sleep(opts.poll_interval.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuity::adapters::OpenCodeSessions;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const SESSION_ID: &str = "99999999-9999-4999-8999-999999999999";

    fn opencode_dir(home: &Path) -> std::path::PathBuf {
        home.join(".opencode").join("sessions")
    }

    fn wait_options(timeout_ms: u64, poll_ms: u64, started_at: DateTime<Utc>) -> WaitOptions {
        WaitOptions {
            started_at,
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_millis(poll_ms),
        }
    }

    #[test]
    fn test_wait_for_discovers_file_written_mid_wait() {
        let home = tempdir().unwrap();
        let dir = opencode_dir(home.path());
        fs::create_dir_all(&dir).unwrap();

        let started_at = Utc::now();
        let file_path = dir.join(format!("{SESSION_ID}.json"));
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            fs::write(&file_path, "{}").unwrap();
        });

        let adapter = OpenCodeSessions::new(home.path().to_path_buf());
        let found = wait_for(
            &adapter,
            &SessionQuery::default(),
            &wait_options(5000, 25, started_at),
        );
        writer.join().unwrap();

        assert_eq!(found.unwrap().id, SESSION_ID);
    }

    #[test]
    fn test_wait_for_times_out_when_nothing_appears() {
        let home = tempdir().unwrap();
        fs::create_dir_all(opencode_dir(home.path())).unwrap();

        let adapter = OpenCodeSessions::new(home.path().to_path_buf());
        let begun = Instant::now();
        let found = wait_for(
            &adapter,
            &SessionQuery::default(),
            &wait_options(200, 40, Utc::now()),
        );
        let elapsed = begun.elapsed();

        assert!(found.is_none());
        assert!(elapsed >= Duration::from_millis(200));
        // Must not hang past timeout + one poll interval (plus scheduling
        // headroom for slow CI machines).
        assert!(elapsed < Duration::from_millis(2000));
    }

    #[test]
    fn test_wait_for_ignores_sessions_older_than_launch() {
        let home = tempdir().unwrap();
        let dir = opencode_dir(home.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{SESSION_ID}.json")), "{}").unwrap();

        // Launch timestamp far in the future makes the existing file a
        // stale session from an unrelated prior run.
        let started_at = Utc::now() + TimeDelta::seconds(3600);
        let adapter = OpenCodeSessions::new(home.path().to_path_buf());
        let found = wait_for(
            &adapter,
            &SessionQuery::default(),
            &wait_options(150, 40, started_at),
        );

        assert!(found.is_none());
    }

    #[test]
    fn test_find_latest_with_home_override() {
        let home = tempdir().unwrap();
        let dir = opencode_dir(home.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{SESSION_ID}.json")), "{}").unwrap();

        let mut config = GroveConfig::default();
        config.agents.insert(
            "opencode".to_string(),
            crate::config::AgentSettings {
                home_dir: Some(home.path().to_path_buf()),
                ..Default::default()
            },
        );

        let found = find_latest(&config, AgentType::OpenCode, &SessionQuery::default());
        assert_eq!(found.unwrap().id, SESSION_ID);
    }

    #[test]
    fn test_wait_options_from_config() {
        let config = ContinuityConfig::default();
        let started_at = Utc::now();
        let opts = WaitOptions::from_config(&config, started_at);
        assert_eq!(opts.timeout, Duration::from_millis(15_000));
        assert_eq!(opts.poll_interval, Duration::from_millis(500));
        assert_eq!(opts.started_at, started_at);
    }
}
