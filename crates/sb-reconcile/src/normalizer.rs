//! Raw build outcome -> canonical [`Status`].

use crate::{Build, Status};

/// Pending iff running; otherwise Success iff successful; otherwise Failure.
///
/// Total over every [`Build`]. An empty commit SHA is not special-cased here.
pub fn normalize(build: &Build) -> Status {
    if build.is_running {
        Status::Pending
    } else if build.is_successful {
        Status::Success
    } else {
        Status::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(is_running: bool, is_successful: bool) -> Build {
        Build::new("abc", is_running, is_successful, "http://ci/1/")
    }

    #[test]
    fn running_is_pending_regardless_of_success_flag() {
        assert_eq!(normalize(&build(true, true)), Status::Pending);
        assert_eq!(normalize(&build(true, false)), Status::Pending);
    }

    #[test]
    fn finished_build_maps_on_success_flag() {
        assert_eq!(normalize(&build(false, true)), Status::Success);
        assert_eq!(normalize(&build(false, false)), Status::Failure);
    }

    #[test]
    fn empty_sha_still_normalizes() {
        let b = Build::new("", false, true, "http://ci/1/");
        assert_eq!(normalize(&b), Status::Success);
    }
}
