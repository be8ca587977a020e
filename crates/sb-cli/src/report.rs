//! Human-facing per-build console lines.

use sb_reconcile::{Outcome, Status};

const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[0;31m";
const DIM: &str = "\x1b[1;30m";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    pub color: bool,
}

impl Style {
    /// Colour unless `--no-color` was given or `NO_COLOR` is set.
    pub fn detect(no_color_flag: bool) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            color: !(no_color_flag || no_color_env),
        }
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.color {
            code
        } else {
            ""
        }
    }
}

/// `sha: <sha> with status: <status>` for a publish,
/// `sha[Cache]: <sha> with status: <status>` for a cache hit.
pub fn render_outcome(o: &Outcome, style: Style) -> String {
    let reset = style.paint(RESET);
    let status_color = match o.status {
        Status::Success => style.paint(GREEN),
        Status::Pending | Status::Failure => style.paint(RED),
    };

    if o.is_cache_hit() {
        let dim = style.paint(DIM);
        return format!(
            "{reset}sha[Cache]: {dim}{sha} {reset}with status: {status_color}{status}{reset}",
            sha = o.sha,
            status = o.status,
        );
    }

    let failed = if o.is_publish_failure() {
        " (publish failed)"
    } else {
        ""
    };
    format!(
        "{reset}sha: {sha} with status: {status_color}{status}{reset}{failed}",
        sha = o.sha,
        status = o.status,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_reconcile::{CacheWrite, Disposition};

    const PLAIN: Style = Style { color: false };
    const COLOR: Style = Style { color: true };

    fn outcome(status: Status, disposition: Disposition) -> Outcome {
        Outcome {
            job: "Rev.com-build-feature_x".to_string(),
            sha: "deadbeef".to_string(),
            status,
            disposition,
            cache_write: CacheWrite::Written,
        }
    }

    #[test]
    fn plain_publish_line() {
        let o = outcome(Status::Success, Disposition::Published);
        assert_eq!(
            render_outcome(&o, PLAIN),
            "sha: deadbeef with status: success"
        );
    }

    #[test]
    fn plain_cache_hit_line() {
        let o = outcome(Status::Failure, Disposition::CacheHit);
        assert_eq!(
            render_outcome(&o, PLAIN),
            "sha[Cache]: deadbeef with status: failure"
        );
    }

    #[test]
    fn failed_publish_is_marked() {
        let o = outcome(
            Status::Pending,
            Disposition::PublishFailed {
                error: "x".to_string(),
            },
        );
        assert_eq!(
            render_outcome(&o, PLAIN),
            "sha: deadbeef with status: pending (publish failed)"
        );
    }

    #[test]
    fn success_is_green_everything_else_red() {
        let ok = render_outcome(&outcome(Status::Success, Disposition::Published), COLOR);
        assert!(ok.contains("\x1b[0;32msuccess"));

        let bad = render_outcome(&outcome(Status::Failure, Disposition::Published), COLOR);
        assert!(bad.contains("\x1b[0;31mfailure"));

        let hit = render_outcome(&outcome(Status::Pending, Disposition::CacheHit), COLOR);
        assert!(hit.contains("\x1b[1;30mdeadbeef"));
        assert!(hit.contains("\x1b[0;31mpending"));
    }
}
