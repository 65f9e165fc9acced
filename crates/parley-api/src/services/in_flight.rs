use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Users with a generation currently running
#[derive(Clone, Default)]
pub struct InFlight {
    users: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the user's slot; `None` while another request holds it
    pub fn try_acquire(&self, user: &str) -> Option<InFlightGuard> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        if !users.insert(user.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            users: Arc::clone(&self.users),
            user: user.to_string(),
        })
    }

    pub fn is_busy(&self, user: &str) -> bool {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(user)
    }
}

/// Releases the slot on drop
pub struct InFlightGuard {
    users: Arc<Mutex<HashSet<String>>>,
    user: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let in_flight = InFlight::new();

        let guard = in_flight.try_acquire("alice").unwrap();
        assert!(in_flight.try_acquire("alice").is_none());
        assert!(in_flight.is_busy("alice"));

        // other users are independent
        let _bob = in_flight.try_acquire("bob").unwrap();

        drop(guard);
        assert!(!in_flight.is_busy("alice"));
        assert!(in_flight.try_acquire("alice").is_some());
    }
}
