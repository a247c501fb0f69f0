/// Realtime document store the panel reads configuration from and writes reactions to
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;

/// Key-path document database.
///
/// Paths are `/`-separated. Futures are not `Send`: everything runs on the page's event loop.
#[async_trait(?Send)]
pub trait Store {
    /// One-shot read; `None` when nothing is stored at `path`
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Children of `path` whose `child` field equals `value`, as `(key, value)` pairs
    async fn find_by_child(
        &self,
        path: &str,
        child: &str,
        value: &str,
    ) -> Result<Vec<(String, Value)>, StoreError>;

    /// Store `record` under a newly generated key below `path` and return the key
    async fn append(&self, path: &str, record: Value) -> Result<String, StoreError>;

    /// Merge the fields of `partial` into the object at `path`
    async fn update(&self, path: &str, partial: Value) -> Result<(), StoreError>;

    /// Atomically add `delta` to the number at `path`
    async fn increment(&self, path: &str, delta: i64) -> Result<(), StoreError>;

    /// Call `on_change` with the current value now and after every change
    fn subscribe(&self, path: &str, on_change: Box<dyn FnMut(Option<Value>)>);

    /// Drop every subscription on `path`
    fn unsubscribe(&self, path: &str);
}

/// Locations of the documents the panel uses
pub mod paths {
    use crate::tier::ReactionTier;

    pub const USER_STREAMER: &str = "/UserStreamer";
    pub const EXTRA_TIPS: &str = "/TwitchExtensionProducts/ExtraTips";
    pub const BOT_VOICES: &str = "/VoiceBotAvailableVoices";
    pub const MEMES_LIBRARY: &str = "/QaplaInteractions/Memes";

    pub fn streamer_donations(streamer_uid: &str) -> String {
        format!("/StreamersDonations/{}", streamer_uid)
    }

    pub fn donation_administrative(key: &str) -> String {
        format!("/StreamersDonationAdministrative/{}", key)
    }

    pub fn reactions_count(uid: &str, streamer_uid: &str) -> String {
        format!("/UsersReactionsCount/{}/{}", uid, streamer_uid)
    }

    pub fn streamer_price(streamer_uid: &str, tier: ReactionTier) -> String {
        format!("/ReactionsPricesLevels/{}/{}", streamer_uid, tier.level_key())
    }

    pub fn default_price(tier: ReactionTier) -> String {
        format!("/ReactionsPricesLevelsDefaults/{}", tier.level_key())
    }

    pub fn reactions_enabled(streamer_uid: &str) -> String {
        format!("/StreamerAlertsSettings/{}/reactionsEnabled", streamer_uid)
    }
}

/// Split a path into its non-empty segments
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_segments() {
        assert_eq!(segments("/UsersReactionsCount/u1/s1"), vec!["UsersReactionsCount", "u1", "s1"]);
        assert!(segments("/").is_empty());
    }

    #[test]
    fn test_paths() {
        use crate::tier::ReactionTier;

        assert_eq!(
            paths::streamer_price("s1", ReactionTier::Two),
            "/ReactionsPricesLevels/s1/level2"
        );
        assert_eq!(paths::default_price(ReactionTier::Three), "/ReactionsPricesLevelsDefaults/level3");
        assert_eq!(paths::reactions_count("u1", "s1"), "/UsersReactionsCount/u1/s1");
    }

    #[test]
    fn test_append_generates_increasing_keys() {
        let store = MemoryStore::new();

        let first = block_on(store.append("/StreamersDonations/s1", json!({"message": "a"}))).unwrap();
        let second = block_on(store.append("/StreamersDonations/s1", json!({"message": "b"}))).unwrap();

        assert!(second > first);
        assert_eq!(
            store.read(&format!("/StreamersDonations/s1/{}/message", second)),
            Some(json!("b"))
        );
    }

    #[test]
    fn test_update_merges_fields() {
        let store = MemoryStore::with("/Users/u1", json!({"userName": "old", "level": 3}));

        block_on(store.update("/Users/u1", json!({"userName": "new"}))).unwrap();

        assert_eq!(store.read("/Users/u1"), Some(json!({"userName": "new", "level": 3})));
        assert!(block_on(store.update("/Users/u1", json!(5))).is_err());
    }

    #[test]
    fn test_increment_missing_value_starts_at_zero() {
        let store = MemoryStore::new();

        block_on(store.increment("/UsersReactionsCount/u1/s1", -1)).unwrap();

        assert_eq!(store.read("/UsersReactionsCount/u1/s1"), Some(json!(-1)));
    }

    #[test]
    fn test_find_by_child() {
        let store = MemoryStore::with(
            "/UserStreamer",
            json!({
                "uidA": {"id": "111", "displayName": "A"},
                "uidB": {"id": "222", "displayName": "B"}
            }),
        );

        let found = block_on(store.find_by_child("/UserStreamer", "id", "222")).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "uidB");
    }

    #[test]
    fn test_subscribers_match_whole_segments() {
        let store = MemoryStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        store.subscribe(
            "/UsersReactionsCount/u1/s1",
            Box::new(move |value| sink.borrow_mut().push(value)),
        );
        block_on(store.increment("/UsersReactionsCount/u1/s10", 5)).unwrap();
        block_on(store.increment("/UsersReactionsCount/u1/s1", 2)).unwrap();

        assert_eq!(*seen.borrow(), vec![None, Some(json!(2))]);
    }

    #[test]
    fn test_subscribe_sees_current_and_later_values() {
        let store = MemoryStore::with("/UsersReactionsCount/u1/s1", json!(2));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        store.subscribe(
            "/UsersReactionsCount/u1/s1",
            Box::new(move |value| sink.borrow_mut().push(value)),
        );
        block_on(store.increment("/UsersReactionsCount/u1/s1", -1)).unwrap();
        store.unsubscribe("/UsersReactionsCount/u1/s1");
        block_on(store.increment("/UsersReactionsCount/u1/s1", -1)).unwrap();

        assert_eq!(*seen.borrow(), vec![Some(json!(2)), Some(json!(1))]);
    }
}
