//! Location catalog: which locations a group may play.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock};

use spyglass_protocol::{GroupId, LocationCandidate, LocationId, LocationScope};

/// Supplies the location pool for a group.
pub trait LocationCatalog: Send + Sync + 'static {
    /// Active locations visible to `group_id`: its own plus the global ones,
    /// in ascending id order.
    fn locations_for_group(
        &self,
        group_id: GroupId,
    ) -> impl Future<Output = Vec<LocationCandidate>> + Send;
}

/// The built-in global locations as `(ru, en, az)` names.
pub const DEFAULT_LOCATIONS: &[(&str, &str, &str)] = &[
    ("Больница", "Hospital", "Xəstəxana"),
    ("Школа", "School", "Məktəb"),
    ("Банк", "Bank", "Bank"),
    ("Ресторан", "Restaurant", "Restoran"),
    ("Аэропорт", "Airport", "Hava limanı"),
    ("Полиция", "Police Station", "Polis bölməsi"),
    ("Театр", "Theater", "Teatr"),
    ("Супермаркет", "Supermarket", "Supermarket"),
    ("Пляж", "Beach", "Çimərlik"),
    ("Кинотеатр", "Cinema", "Kinoteatr"),
    ("Университет", "University", "Universitet"),
    ("Отель", "Hotel", "Otel"),
    ("Казино", "Casino", "Kazino"),
    ("Церковь", "Church", "Kilsə"),
    ("Библиотека", "Library", "Kitabxana"),
    ("Парк", "Park", "Park"),
    ("Зоопарк", "Zoo", "Zoopark"),
    ("Музей", "Museum", "Muzey"),
    ("Стадион", "Stadium", "Stadion"),
    ("Метро", "Subway", "Metro"),
    ("Поезд", "Train", "Qatar"),
    ("Самолет", "Airplane", "Təyyarə"),
    ("Корабль", "Ship", "Gəmi"),
    ("Посольство", "Embassy", "Səfirlik"),
    ("Военная база", "Military Base", "Hərbi baza"),
    ("Космическая станция", "Space Station", "Kosmik stansiya"),
    ("Подводная лодка", "Submarine", "Sualtı qayıq"),
    ("Цирк", "Circus", "Sirk"),
    ("Завод", "Factory", "Zavod"),
    ("Ферма", "Farm", "Ferma"),
];

#[derive(Debug, Clone)]
struct Entry {
    candidate: LocationCandidate,
    active: bool,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<LocationId, Entry>,
    next_id: u32,
}

/// Keeps locations in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<Inner>,
}

impl InMemoryCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding [`DEFAULT_LOCATIONS`] as global locations.
    pub fn with_defaults() -> Self {
        let catalog = Self::new();
        for &(ru, en, az) in DEFAULT_LOCATIONS {
            catalog.insert(LocationScope::Global, [("ru", ru), ("en", en), ("az", az)]);
        }
        catalog
    }

    /// Adds an active location and returns its id.
    pub fn insert<'a>(
        &self,
        scope: LocationScope,
        names: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> LocationId {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = LocationId(inner.next_id);
        inner.entries.insert(
            id,
            Entry {
                candidate: LocationCandidate::new(id, scope, names),
                active: true,
            },
        );
        id
    }

    /// Hides a location from future pools. Returns `false` if the id is
    /// unknown.
    pub fn deactivate(&self, id: LocationId) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match inner.entries.get_mut(&id) {
            Some(entry) => {
                entry.active = false;
                true
            }
            None => false,
        }
    }

    /// Removes the locations owned by `group_id`. Global locations stay.
    pub fn purge_group(&self, group_id: GroupId) -> usize {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, e| e.candidate.scope != LocationScope::Group(group_id));
        before - inner.entries.len()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocationCatalog for InMemoryCatalog {
    async fn locations_for_group(&self, group_id: GroupId) -> Vec<LocationCandidate> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .values()
            .filter(|e| e.active && e.candidate.scope.visible_to(group_id))
            .map(|e| e.candidate.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_defaults_loads_every_default_globally() {
        let catalog = InMemoryCatalog::with_defaults();
        let pool = catalog.locations_for_group(GroupId(1)).await;

        assert_eq!(pool.len(), DEFAULT_LOCATIONS.len());
        assert!(pool.iter().all(|l| l.scope == LocationScope::Global));
        assert_eq!(pool[0].name("en"), "Hospital");
        assert_eq!(pool[0].name("az"), "Xəstəxana");
    }

    #[tokio::test]
    async fn test_locations_for_group_unions_own_and_global() {
        let catalog = InMemoryCatalog::new();
        let global = catalog.insert(LocationScope::Global, [("en", "Bank")]);
        let mine = catalog.insert(LocationScope::Group(GroupId(1)), [("en", "Dacha")]);
        let theirs = catalog.insert(LocationScope::Group(GroupId(2)), [("en", "Yacht")]);

        let ids: Vec<_> = catalog
            .locations_for_group(GroupId(1))
            .await
            .into_iter()
            .map(|l| l.id)
            .collect();

        assert_eq!(ids, vec![global, mine]);
        assert!(!ids.contains(&theirs));
    }

    #[tokio::test]
    async fn test_deactivate_hides_location() {
        let catalog = InMemoryCatalog::new();
        let id = catalog.insert(LocationScope::Global, [("en", "Bank")]);

        assert!(catalog.deactivate(id));
        assert!(!catalog.deactivate(LocationId(999)));
        assert!(catalog.locations_for_group(GroupId(1)).await.is_empty());
        assert_eq!(catalog.len(), 1, "deactivated, not deleted");
    }

    #[tokio::test]
    async fn test_purge_group_keeps_global_locations() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(LocationScope::Global, [("en", "Bank")]);
        catalog.insert(LocationScope::Group(GroupId(1)), [("en", "Dacha")]);
        catalog.insert(LocationScope::Group(GroupId(1)), [("en", "Garage")]);

        assert_eq!(catalog.purge_group(GroupId(1)), 2);
        assert_eq!(catalog.locations_for_group(GroupId(1)).await.len(), 1);
    }
}
