//! Keep access and refresh tokens out of core dumps.

use std::env;

use anyhow::{Context, Result};

const ALLOW_COREDUMPS_ENV: &str = "STAYMATE_ALLOW_COREDUMPS";

/// Disable core dumps for this process unless the override is set.
pub fn disable_core_dumps() -> Result<()> {
    if override_enabled(env::var(ALLOW_COREDUMPS_ENV).ok().as_deref()) {
        tracing::warn!(
            env_var = ALLOW_COREDUMPS_ENV,
            "Core dumps left enabled by environment override"
        );
        return Ok(());
    }
    platform::disable().context("failed to disable core dumps")?;
    tracing::debug!("Core dumps disabled");
    Ok(())
}

fn override_enabled(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

#[cfg(unix)]
mod platform {
    use std::io;

    pub(super) fn disable() -> io::Result<()> {
        let limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: `limit` is a valid rlimit that outlives the call.
        if unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) } != 0 {
            return Err(io::Error::last_os_error());
        }
        #[cfg(target_os = "linux")]
        {
            // SAFETY: PR_SET_DUMPABLE takes plain integer arguments.
            if unsafe { libc::prctl(libc::PR_SET_DUMPABLE, 0, 0, 0, 0) } != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod platform {
    pub(super) fn disable() -> std::io::Result<()> {
        Ok(())
    }
}
