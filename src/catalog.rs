use tokio::sync::RwLock;
use ulid::Ulid;

use crate::engine::BookingError;
use crate::engine::conflict::now;
use crate::limits::MAX_NAME_LEN;
use crate::model::Resource;

/// The set of bookable rooms. Knows nothing about time.
///
/// Mutations are serialized through one lock; reads return snapshot copies in
/// insertion order.
#[derive(Default)]
pub struct ResourceCatalog {
    resources: RwLock<Vec<Resource>>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Resource> {
        self.resources.read().await.clone()
    }

    pub async fn add(&self, name: &str, capacity: i64) -> Result<Resource, BookingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BookingError::InvalidArgument("name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(BookingError::InvalidArgument("name too long"));
        }
        if capacity <= 0 {
            return Err(BookingError::InvalidArgument("capacity must be positive"));
        }
        let capacity = u32::try_from(capacity)
            .map_err(|_| BookingError::InvalidArgument("capacity too large"))?;

        let resource = Resource {
            id: Ulid::new(),
            name: name.to_string(),
            capacity,
            created_at: now(),
        };
        self.resources.write().await.push(resource.clone());
        Ok(resource)
    }

    /// Drops the room from the catalog only. Reservations are purged by
    /// `ReservationStore::retire_resource`, the one caller.
    pub(crate) async fn delete(&self, id: Ulid) -> bool {
        let mut guard = self.resources.write().await;
        match guard.iter().position(|r| r.id == id) {
            Some(pos) => {
                guard.remove(pos);
                true
            }
            None => false,
        }
    }

    pub async fn exists(&self, id: Ulid) -> bool {
        self.resources.read().await.iter().any(|r| r.id == id)
    }

    pub async fn get(&self, id: Ulid) -> Option<Resource> {
        self.resources.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Case-insensitive lookup by display name.
    pub async fn find_by_name(&self, name: &str) -> Option<Resource> {
        let name = name.trim();
        self.resources
            .read()
            .await
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}
