//! The recipe store.
//!
//! Two independent ordered collections, `recipes` and `favorites`, each kept
//! as one JSON array under its own key. Every mutation is a full
//! read-modify-write of that array.
//!
//! Mutations are funnelled through a single writer task so that two
//! overlapping appends can never read the same snapshot and clobber each
//! other. Reads go straight to the backend; since a backend `set` replaces a
//! key atomically, a reader sees either the old or the new collection.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::recipe::{FavoriteEntry, Recipe};
use crate::storage::KeyValueStore;

/// Pending mutations the writer will buffer before callers wait.
const WRITE_QUEUE_DEPTH: usize = 64;

/// One of the two persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// User-authored recipes.
    Recipes,
    /// Recipes the user marked as favorite.
    Favorites,
}

impl Collection {
    /// Both collections.
    pub const ALL: [Self; 2] = [Self::Recipes, Self::Favorites];

    /// Storage key of the collection.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Recipes => "recipes",
            Self::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Mutation carried to the writer task.
#[derive(Debug)]
enum WriteOp {
    /// Add at the end; fail if the id is taken.
    Append(Recipe),
    /// Add at the end unless the id is already present.
    AppendIfAbsent(Recipe),
    /// Drop every record with this id.
    Remove(String),
}

/// What a mutation did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug)]
struct WriteRequest {
    collection: Collection,
    op: WriteOp,
    reply: oneshot::Sender<Result<WriteOutcome>>,
}

/// Handle to the recipe and favorites collections.
///
/// Cloning is cheap; all clones share one backend and one writer. The writer
/// task stops once the last handle is dropped.
#[derive(Debug, Clone)]
pub struct RecipeStore {
    backend: Arc<dyn KeyValueStore>,
    writer: mpsc::Sender<WriteRequest>,
}

impl RecipeStore {
    /// Create a store over `backend` and start its writer task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::channel(WRITE_QUEUE_DEPTH);
        tokio::spawn(run_writer(Arc::clone(&backend), rx));
        Self {
            backend,
            writer: tx,
        }
    }

    /// Load every record of `collection`, in insertion order.
    ///
    /// A collection that was never written is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageRead`] if the backend read fails and
    /// [`Error::Parse`] if the stored value is not a recipe list.
    pub async fn load_all(&self, collection: Collection) -> Result<Vec<Recipe>> {
        let records = read_collection(self.backend.as_ref(), collection).await?;
        debug!("Loaded {} records from '{}'", records.len(), collection);
        Ok(records)
    }

    /// Add `record` at the end of `collection`.
    ///
    /// The caller generates the id (see [`crate::recipe::new_recipe_id`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the id is already present, or a
    /// read, parse or write error from the backend. Nothing is written on
    /// failure.
    pub async fn append(&self, collection: Collection, record: Recipe) -> Result<()> {
        self.submit(collection, WriteOp::Append(record)).await?;
        Ok(())
    }

    /// Remove the record with `id` from `collection`.
    ///
    /// Removing an id that is not present succeeds without writing.
    ///
    /// # Errors
    ///
    /// Returns a read, parse or write error from the backend.
    pub async fn remove(&self, collection: Collection, id: &str) -> Result<()> {
        self.submit(collection, WriteOp::Remove(id.to_string()))
            .await?;
        Ok(())
    }

    /// Find a record by id.
    ///
    /// # Errors
    ///
    /// Returns a read or parse error from the backend.
    pub async fn find(&self, collection: Collection, id: &str) -> Result<Option<Recipe>> {
        let records = self.load_all(collection).await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    /// Check whether a record with `id` is present.
    ///
    /// # Errors
    ///
    /// Returns a read or parse error from the backend.
    pub async fn contains(&self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self.find(collection, id).await?.is_some())
    }

    /// Number of records in `collection`.
    ///
    /// # Errors
    ///
    /// Returns a read or parse error from the backend.
    pub async fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self.load_all(collection).await?.len())
    }

    /// Copy `recipe` into the favorites collection.
    ///
    /// Returns `false` if a favorite with the same id already exists, in
    /// which case nothing is written. The copy has no link back to the
    /// recipe; it survives the recipe's deletion.
    ///
    /// # Errors
    ///
    /// Returns a read, parse or write error from the backend.
    pub async fn add_favorite(&self, recipe: FavoriteEntry) -> Result<bool> {
        let outcome = self
            .submit(Collection::Favorites, WriteOp::AppendIfAbsent(recipe))
            .await?;
        Ok(outcome == WriteOutcome::Added)
    }

    async fn submit(&self, collection: Collection, op: WriteOp) -> Result<WriteOutcome> {
        let (reply, response) = oneshot::channel();
        self.writer
            .send(WriteRequest {
                collection,
                op,
                reply,
            })
            .await
            .map_err(|_| Error::WriterClosed)?;
        response.await.map_err(|_| Error::WriterClosed)?
    }
}

/// Apply queued mutations one at a time until every handle is gone.
async fn run_writer(backend: Arc<dyn KeyValueStore>, mut requests: mpsc::Receiver<WriteRequest>) {
    while let Some(request) = requests.recv().await {
        let result = apply(backend.as_ref(), request.collection, request.op).await;
        if let Err(e) = &result {
            warn!("Write to '{}' failed: {}", request.collection, e);
        }
        // The caller may have stopped waiting
        let _ = request.reply.send(result);
    }
    debug!("Store writer stopped");
}

async fn apply(
    backend: &dyn KeyValueStore,
    collection: Collection,
    op: WriteOp,
) -> Result<WriteOutcome> {
    let mut records = read_collection(backend, collection).await?;

    let outcome = match op {
        WriteOp::Append(record) => {
            if records.iter().any(|r| r.id == record.id) {
                return Err(Error::DuplicateId {
                    key: collection.key().to_string(),
                    id: record.id,
                });
            }
            debug!("Appending '{}' to '{}'", record.id, collection);
            records.push(record);
            WriteOutcome::Added
        }
        WriteOp::AppendIfAbsent(record) => {
            if records.iter().any(|r| r.id == record.id) {
                return Ok(WriteOutcome::Unchanged);
            }
            debug!("Appending '{}' to '{}'", record.id, collection);
            records.push(record);
            WriteOutcome::Added
        }
        WriteOp::Remove(id) => {
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                debug!("Nothing to remove for '{}' in '{}'", id, collection);
                return Ok(WriteOutcome::Unchanged);
            }
            debug!("Removing '{}' from '{}'", id, collection);
            WriteOutcome::Removed
        }
    };

    write_collection(backend, collection, &records).await?;
    Ok(outcome)
}

async fn read_collection(backend: &dyn KeyValueStore, collection: Collection) -> Result<Vec<Recipe>> {
    let key = collection.key();
    let Some(raw) = backend.get(key).await? else {
        return Ok(Vec::new());
    };
    // An empty value counts as never written
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(|source| Error::Parse {
        key: key.to_string(),
        source,
    })
}

async fn write_collection(
    backend: &dyn KeyValueStore,
    collection: Collection,
    records: &[Recipe],
) -> Result<()> {
    let raw = serde_json::to_string(records)?;
    backend.set(collection.key(), &raw).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::category::{self, CategoryFilter};
    use crate::recipe::RecipeImage;
    use crate::storage::MemoryStore;

    /// Memory store whose reads or writes can be made to fail.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(Error::storage_read(key, "read refused"));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Error::storage_write(key, "write refused"));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }
    }

    fn recipe(id: &str, title: &str, category: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            ingredients: "water\nsalt".to_string(),
            instructions: "boil".to_string(),
            temperature: None,
            time: None,
            image: RecipeImage::None,
        }
    }

    fn memory_store() -> (RecipeStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        (RecipeStore::new(backend.clone()), backend)
    }

    fn flaky_store() -> (RecipeStore, Arc<FlakyStore>) {
        let backend = Arc::new(FlakyStore::default());
        (RecipeStore::new(backend.clone()), backend)
    }

    fn ids(records: &[Recipe]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_collection_keys() {
        assert_eq!(Collection::Recipes.key(), "recipes");
        assert_eq!(Collection::Favorites.key(), "favorites");
        assert_eq!(Collection::Favorites.to_string(), "favorites");
    }

    #[tokio::test]
    async fn test_empty_start() {
        let (store, _) = memory_store();
        for collection in Collection::ALL {
            assert!(store.load_all(collection).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_append_then_load_returns_record_last() {
        let (store, _) = memory_store();
        store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap();
        let mut cake = recipe("2", "Cake", "Dessert");
        cake.temperature = Some("180".to_string());
        cake.image = RecipeImage::RemoteUrl("https://example.com/cake.jpg".to_string());
        store.append(Collection::Recipes, cake.clone()).await.unwrap();

        let loaded = store.load_all(Collection::Recipes).await.unwrap();
        assert_eq!(loaded.last(), Some(&cake));
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let (store, _) = memory_store();
        for id in ["r1", "r2", "r3"] {
            store
                .append(Collection::Recipes, recipe(id, id, "Snack"))
                .await
                .unwrap();
        }
        let loaded = store.load_all(Collection::Recipes).await.unwrap();
        assert_eq!(ids(&loaded), vec!["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn test_append_duplicate_id_rejected() {
        let (store, _) = memory_store();
        store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap();
        let err = store
            .append(Collection::Recipes, recipe("1", "Other", "Drink"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateId { .. }));

        let loaded = store.load_all(Collection::Recipes).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Soup");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (store, _) = memory_store();
        for id in ["1", "2"] {
            store
                .append(Collection::Recipes, recipe(id, id, "Drink"))
                .await
                .unwrap();
        }

        store.remove(Collection::Recipes, "1").await.unwrap();
        let after_first = store.load_all(Collection::Recipes).await.unwrap();
        store.remove(Collection::Recipes, "1").await.unwrap();
        let after_second = store.load_all(Collection::Recipes).await.unwrap();

        assert_eq!(ids(&after_first), vec!["2"]);
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_remove_absent_does_not_write() {
        let (store, backend) = flaky_store();
        store.remove(Collection::Recipes, "nope").await.unwrap();
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let (store, backend) = memory_store();
        store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap();
        let recipes_raw = backend.get("recipes").await.unwrap();

        store
            .append(Collection::Favorites, recipe("9", "Tea", "Drink"))
            .await
            .unwrap();
        store.remove(Collection::Favorites, "9").await.unwrap();
        assert_eq!(backend.get("recipes").await.unwrap(), recipes_raw);

        let favorites_raw = backend.get("favorites").await.unwrap();
        store.remove(Collection::Recipes, "1").await.unwrap();
        assert_eq!(backend.get("favorites").await.unwrap(), favorites_raw);
    }

    #[tokio::test]
    async fn test_favorite_survives_recipe_deletion() {
        let (store, _) = memory_store();
        let soup = recipe("1", "Soup", "Main Course");
        store.append(Collection::Recipes, soup.clone()).await.unwrap();
        assert!(store.add_favorite(soup).await.unwrap());

        store.remove(Collection::Recipes, "1").await.unwrap();
        assert!(store.contains(Collection::Favorites, "1").await.unwrap());
        assert!(!store.contains(Collection::Recipes, "1").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_favorite_twice_is_noop() {
        let (store, backend) = flaky_store();
        let soup = recipe("1", "Soup", "Main Course");
        assert!(store.add_favorite(soup.clone()).await.unwrap());
        assert!(!store.add_favorite(soup).await.unwrap());
        assert_eq!(store.count(Collection::Favorites).await.unwrap(), 1);
        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_find() {
        let (store, _) = memory_store();
        store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap();
        let found = store.find(Collection::Recipes, "1").await.unwrap();
        assert_eq!(found.map(|r| r.title), Some("Soup".to_string()));
        assert!(store.find(Collection::Recipes, "2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_parse_error() {
        let (store, backend) = memory_store();
        backend.set("recipes", "{not a list").await.unwrap();

        let err = store.load_all(Collection::Recipes).await.unwrap_err();
        assert!(err.is_parse_error());
        // Favorites are unaffected
        assert!(store.load_all(Collection::Favorites).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partially_valid_array_is_not_salvaged() {
        let (store, backend) = memory_store();
        backend
            .set(
                "recipes",
                r#"[{"id":"1","title":"Soup","category":"Main Course"},{"id":2}]"#,
            )
            .await
            .unwrap();
        assert!(store.load_all(Collection::Recipes).await.unwrap_err().is_parse_error());
    }

    #[tokio::test]
    async fn test_append_over_corrupt_value_fails_without_writing() {
        let (store, backend) = memory_store();
        backend.set("recipes", "garbage").await.unwrap();

        let err = store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(backend.get("recipes").await.unwrap().as_deref(), Some("garbage"));
    }

    #[tokio::test]
    async fn test_empty_value_counts_as_absent() {
        let (store, backend) = memory_store();
        backend.set("favorites", "").await.unwrap();
        assert!(store.load_all(Collection::Favorites).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let (store, backend) = flaky_store();
        backend.fail_reads.store(true, Ordering::SeqCst);

        let err = store.load_all(Collection::Recipes).await.unwrap_err();
        assert!(err.is_read_error());

        let err = store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap_err();
        assert!(err.is_read_error());
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_write_failure_leaves_previous_collection() {
        let (store, backend) = flaky_store();
        store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap();

        backend.fail_writes.store(true, Ordering::SeqCst);
        let err = store
            .append(Collection::Recipes, recipe("2", "Cake", "Dessert"))
            .await
            .unwrap_err();
        assert!(err.is_write_error());
        let err = store.remove(Collection::Recipes, "1").await.unwrap_err();
        assert!(err.is_write_error());

        backend.fail_writes.store(false, Ordering::SeqCst);
        let loaded = store.load_all(Collection::Recipes).await.unwrap();
        assert_eq!(ids(&loaded), vec!["1"]);
    }

    #[tokio::test]
    async fn test_store_usable_after_failed_write() {
        let (store, backend) = flaky_store();
        backend.fail_writes.store(true, Ordering::SeqCst);
        assert!(store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .is_err());

        backend.fail_writes.store(false, Ordering::SeqCst);
        store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap();
        assert_eq!(store.count(Collection::Recipes).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_kept() {
        let (store, _) = memory_store();
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..25 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .append(Collection::Recipes, recipe(&i.to_string(), "Dish", "Snack"))
                    .await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        let loaded = store.load_all(Collection::Recipes).await.unwrap();
        assert_eq!(loaded.len(), 25);
        let mut seen: Vec<u32> = loaded.iter().map(|r| r.id.parse().unwrap()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_soup_scenario() {
        let (store, _) = memory_store();
        let soup = recipe("1", "Soup", "Main Course");
        store.append(Collection::Recipes, soup.clone()).await.unwrap();
        assert_eq!(store.load_all(Collection::Recipes).await.unwrap(), vec![soup]);

        store.remove(Collection::Recipes, "1").await.unwrap();
        assert!(store.load_all(Collection::Recipes).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_scenario() {
        let (store, _) = memory_store();
        store
            .append(Collection::Recipes, recipe("1", "Baklava", "Dessert"))
            .await
            .unwrap();
        store
            .append(Collection::Recipes, recipe("2", "Ayran", "Drink"))
            .await
            .unwrap();

        let snapshot = store.load_all(Collection::Recipes).await.unwrap();
        let desserts = category::filter(&snapshot, &CategoryFilter::Only("Dessert".to_string()));
        assert_eq!(ids(&desserts), vec!["1"]);
        let all = category::filter(&snapshot, &CategoryFilter::All);
        assert_eq!(ids(&all), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_stored_json_is_plain_array() {
        let (store, backend) = memory_store();
        store
            .append(Collection::Recipes, recipe("1", "Soup", "Main Course"))
            .await
            .unwrap();

        let raw = backend.get("recipes").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["id"], "1");
        assert!(array[0]["image"].is_null());
    }
}
