use std::fmt::Write;

use {
    anyhow::Result,
    beacon_config::{BeaconConfig, ResolvedConfig, resolve_from_env},
};

pub fn handle_check(settings: BeaconConfig) -> Result<()> {
    let resolved = resolve_from_env(settings)?;
    print!("{}", render_report(&resolved));
    Ok(())
}

/// Human-readable summary of the resolved configuration. Never includes
/// secret values.
fn render_report(resolved: &ResolvedConfig) -> String {
    let presence = &resolved.settings.presence;
    let mut slots: Vec<(&str, String)> = resolved
        .accounts
        .iter()
        .map(|a| (a.key.as_str(), format!("ready (api id {})", a.api_id)))
        .chain(
            resolved
                .skipped
                .iter()
                .map(|s| (s.key.as_str(), format!("skipped ({})", s.reason))),
        )
        .collect();
    slots.sort_by_key(|(key, _)| key.parse::<u32>().unwrap_or(u32::MAX));

    let mut out = String::new();
    let _ = writeln!(out, "control bot: token set");
    let _ = writeln!(
        out,
        "presence: every {}s, retry after {}s",
        presence.interval_secs, presence.retry_interval_secs
    );
    for (key, state) in slots {
        let _ = writeln!(out, "account {key}: {state}");
    }
    let _ = writeln!(
        out,
        "extra operators: {}",
        resolved.settings.bot.allowed_users.len()
    );
    out
}
