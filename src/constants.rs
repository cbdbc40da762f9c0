use std::time::Duration;

pub(crate) const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(1);
pub(crate) const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const DEFAULT_COLLECT_MARGIN: Duration = Duration::from_secs(2);

pub(crate) const ECHO_PAYLOAD_LEN: usize = 56;
pub(crate) const FIRST_HOST_SUFFIX: u16 = 1;
pub(crate) const LAST_HOST_SUFFIX: u16 = 254;
