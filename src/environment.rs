//! Runtime environment detection.
//!
//! Answers the questions plugins keep asking about where they are
//! running: is this a CLI invocation, a localhost request, a
//! development install? All answers come from the injected request
//! context, never from process globals.

use crate::context::RequestContext;

const DEV_HOST_SUFFIXES: &[&str] = &[".local", ".test", ".localhost"];

/// True when there is no HTTP request at all (no request method in the
/// environment), i.e. the code runs from a shell or cron job.
pub fn is_cli(ctx: &dyn RequestContext) -> bool {
    ctx.var_nonempty("REQUEST_METHOD").is_none()
}

/// True when the request originates from the machine itself, by client
/// address or by host name.
pub fn is_localhost(ctx: &dyn RequestContext) -> bool {
    if let Some(ip) = ctx.client_ip() {
        if ip == "127.0.0.1" || ip == "::1" {
            return true;
        }
    }
    match host_without_port(ctx) {
        Some(host) => host == "localhost" || host == "127.0.0.1",
        None => false,
    }
}

/// Development vs. production. An explicit `ENVIRONMENT`/`APP_ENV`
/// variable wins; otherwise fall back to a host-suffix heuristic.
pub fn is_development(ctx: &dyn RequestContext) -> bool {
    let explicit = ctx
        .var_nonempty("ENVIRONMENT")
        .or_else(|| ctx.var_nonempty("APP_ENV"));
    if let Some(env) = explicit {
        return matches!(
            env.to_lowercase().as_str(),
            "development" | "dev" | "local" | "staging"
        );
    }

    match host_without_port(ctx) {
        Some(host) => {
            host == "localhost"
                || DEV_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
        }
        None => false,
    }
}

fn host_without_port(ctx: &dyn RequestContext) -> Option<String> {
    let host = ctx.var_nonempty("HTTP_HOST")?;
    let host = host.to_lowercase();
    Some(match host.rsplit_once(':') {
        // Avoid chopping bare IPv6 hosts; only strip a numeric port.
        Some((front, back)) if !front.is_empty() && back.chars().all(|c| c.is_ascii_digit()) => {
            front.to_string()
        }
        _ => host,
    })
}
