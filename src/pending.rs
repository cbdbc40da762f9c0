use std::{collections::HashMap, net::IpAddr};

#[derive(Debug, Default)]
pub(super) struct PendingSet {
    resolved: HashMap<IpAddr, bool>,
}

impl PendingSet {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn register(&mut self, addr: IpAddr) {
        self.resolved.entry(addr).or_insert(false);
    }

    /// Returns `true` only for the first reply from a registered address.
    pub(super) fn resolve(&mut self, addr: &IpAddr) -> bool {
        match self.resolved.get_mut(addr) {
            Some(resolved) if !*resolved => {
                *resolved = true;
                true
            }
            _ => false,
        }
    }

    pub(super) fn drain_unresolved(&mut self) -> Vec<IpAddr> {
        self.resolved
            .iter_mut()
            .filter(|(_, resolved)| !**resolved)
            .map(|(addr, resolved)| {
                *resolved = true;
                *addr
            })
            .collect()
    }

    pub(super) fn targets(&self) -> Vec<IpAddr> {
        self.resolved.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::PendingSet;

    const TARGET: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));
    const STRAY: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 6));

    #[test]
    fn test_resolves_once() {
        let mut pending = PendingSet::new();
        pending.register(TARGET);
        assert!(pending.resolve(&TARGET));
        assert!(!pending.resolve(&TARGET));
        assert!(pending.drain_unresolved().is_empty());
    }

    #[test]
    fn test_ignores_unregistered() {
        let mut pending = PendingSet::new();
        pending.register(TARGET);
        assert!(!pending.resolve(&STRAY));
        assert_eq!(pending.targets(), vec![TARGET]);
    }

    #[test]
    fn test_drain_marks_resolved() {
        let mut pending = PendingSet::new();
        pending.register(TARGET);
        pending.register(TARGET);
        assert_eq!(pending.drain_unresolved(), vec![TARGET]);
        assert!(pending.drain_unresolved().is_empty());
        assert!(!pending.resolve(&TARGET));
    }
}
