// Level unlock state: single source of truth for what the menu may offer.

use bevy::prelude::*;

use crate::prefs::PrefStore;

fn unlock_key(level: u32) -> String {
    format!("UnlockedLevel_{level}")
}

/// Which levels are unlocked. Mutated only through [`Progress::unlock`];
/// every unlock is written through the preference store immediately.
#[derive(Resource)]
pub struct Progress {
    total_levels: u32,
    unlocked: Vec<bool>,
}

impl Progress {
    /// Seed from persisted state. Level 1 is unlocked unconditionally on
    /// first run and the seed is written back so it survives restarts.
    pub fn from_store(total_levels: u32, store: &mut PrefStore) -> Self {
        let mut unlocked = vec![false; total_levels as usize];
        for (index, flag) in unlocked.iter_mut().enumerate() {
            *flag = store.get_str(&unlock_key(index as u32 + 1)) == Some("1");
        }
        let mut progress = Self {
            total_levels,
            unlocked,
        };
        if !progress.is_unlocked(1) {
            progress.unlock(1, store);
        }
        progress
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    /// Fails closed: false for any level outside [1, total].
    pub fn is_unlocked(&self, level: u32) -> bool {
        if level == 0 {
            return false;
        }
        self.unlocked
            .get(level as usize - 1)
            .copied()
            .unwrap_or(false)
    }

    /// No-op for invalid levels; otherwise sets the flag and persists
    /// immediately. No batching, no retry.
    pub fn unlock(&mut self, level: u32, store: &mut PrefStore) {
        if level == 0 || level > self.total_levels {
            warn!("ignoring unlock for out-of-range level {level}");
            return;
        }
        self.unlocked[level as usize - 1] = true;
        store.set_str(&unlock_key(level), "1");
        store.save();
        info!("unlocked level {level}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::tests::temp_prefs_path;

    #[test]
    fn level_one_is_unlocked_with_no_prior_state() {
        let mut store = PrefStore::in_memory();
        let progress = Progress::from_store(5, &mut store);
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));
        // The seed is written through like any other unlock.
        assert_eq!(store.get_str("UnlockedLevel_1"), Some("1"));
    }

    #[test]
    fn out_of_range_queries_fail_closed() {
        let mut store = PrefStore::in_memory();
        let mut progress = Progress::from_store(5, &mut store);
        assert!(!progress.is_unlocked(0));
        assert!(!progress.is_unlocked(6));
        assert!(!progress.is_unlocked(u32::MAX));

        progress.unlock(0, &mut store);
        progress.unlock(6, &mut store);
        assert_eq!(store.get_str("UnlockedLevel_0"), None);
        assert_eq!(store.get_str("UnlockedLevel_6"), None);
    }

    #[test]
    fn unlock_survives_a_simulated_restart() {
        let path = temp_prefs_path("progress-restart");

        let mut store = PrefStore::load_from(path.clone());
        let mut progress = Progress::from_store(5, &mut store);
        progress.unlock(2, &mut store);
        drop(progress);
        drop(store);

        let mut store = PrefStore::load_from(path.clone());
        let progress = Progress::from_store(5, &mut store);
        assert!(progress.is_unlocked(1));
        assert!(progress.is_unlocked(2));
        assert!(!progress.is_unlocked(3));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn fresh_five_level_scenario() {
        let mut store = PrefStore::in_memory();
        let mut progress = Progress::from_store(5, &mut store);
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));

        // Completing level 1 unlocks level 2 and nothing beyond it.
        progress.unlock(2, &mut store);
        assert!(progress.is_unlocked(2));
        assert!(!progress.is_unlocked(3));
    }
}
