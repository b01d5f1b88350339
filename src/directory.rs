use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{Profile, Result, SocialError, UserRecord, Username};

/// Stable reference to a profile slot. Slots are never reused, so a handle to
/// a deleted profile simply stops resolving.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub struct ProfileHandle(usize);

/// Owns every [`Profile`].
///
/// Profiles live in an arena and are addressed by [`ProfileHandle`]; all
/// cross-profile mutation goes through [`Directory::pair_mut`] or the cascade
/// in [`Directory::remove`], so no two mutable references to the same profile
/// can ever exist.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    slots: Vec<Option<Profile>>,
    by_name: HashMap<Username, ProfileHandle>,
    order: Vec<ProfileHandle>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds empty profiles for every loaded record, in load order. Repeated
    /// usernames are skipped.
    pub fn seed<'a>(records: impl IntoIterator<Item = &'a UserRecord>) -> Self {
        let mut directory = Self::new();
        for record in records {
            if let Err(error) = directory.register(record.username.clone()) {
                warn!(%error, "skipping stored user");
            }
        }
        directory
    }

    pub fn register(&mut self, username: Username) -> Result<&mut Profile> {
        if self.by_name.contains_key(&username) {
            return Err(SocialError::DuplicateUser(username));
        }
        let handle = ProfileHandle(self.slots.len());
        info!(%username, "registered user");
        self.by_name.insert(username.clone(), handle);
        self.order.push(handle);
        self.slots.push(None);
        Ok(self.slots[handle.0].insert(Profile::new(username)))
    }

    pub fn handle(&self, username: &Username) -> Result<ProfileHandle> {
        self.by_name
            .get(username)
            .copied()
            .ok_or_else(|| SocialError::NotFound(username.clone()))
    }

    pub fn find(&self, username: &Username) -> Result<&Profile> {
        let handle = self.handle(username)?;
        self.get(handle)
            .ok_or_else(|| SocialError::NotFound(username.clone()))
    }

    pub fn find_mut(&mut self, username: &Username) -> Result<&mut Profile> {
        let handle = self.handle(username)?;
        self.slot_mut(handle)
            .ok_or_else(|| SocialError::NotFound(username.clone()))
    }

    pub fn contains(&self, username: &Username) -> bool {
        self.by_name.contains_key(username)
    }

    pub fn get(&self, handle: ProfileHandle) -> Option<&Profile> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, handle: ProfileHandle) -> Option<&mut Profile> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Borrows two distinct profiles mutably at once. Returns `None` when the
    /// handles are equal or either one no longer resolves.
    pub(crate) fn pair_mut(
        &mut self,
        a: ProfileHandle,
        b: ProfileHandle,
    ) -> Option<(&mut Profile, &mut Profile)> {
        if a == b || a.0 >= self.slots.len() || b.0 >= self.slots.len() {
            return None;
        }
        let (low, high, swapped) = if a.0 < b.0 { (a.0, b.0, false) } else { (b.0, a.0, true) };
        let (head, tail) = self.slots.split_at_mut(high);
        let first = head[low].as_mut()?;
        let second = tail[0].as_mut()?;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    /// Deletes `username`, first purging it from every other profile's
    /// friends and requests.
    pub fn remove(&mut self, username: &Username) -> Result<Profile> {
        let handle = self.handle(username)?;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if index == handle.0 {
                continue;
            }
            if let Some(profile) = slot {
                profile.forget(username);
            }
        }
        debug!(%username, "purged references");

        self.by_name.remove(username);
        self.order.retain(|h| *h != handle);
        let profile = self
            .slots
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or_else(|| SocialError::NotFound(username.clone()))?;
        info!(%username, "deleted user");
        Ok(profile)
    }

    /// Live profiles in registration order.
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> + '_ {
        self.order.iter().filter_map(|handle| self.get(*handle))
    }

    pub fn list_all(&self) -> Vec<Username> {
        self.profiles().map(|p| p.username().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Username {
        Username(s.into())
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut directory = Directory::new();
        directory.register(name("alice")).unwrap();
        assert_eq!(
            directory.register(name("alice")).err(),
            Some(SocialError::DuplicateUser(name("alice")))
        );
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn list_all_keeps_registration_order() {
        let mut directory = Directory::new();
        for user in ["carol", "alice", "bob"] {
            directory.register(name(user)).unwrap();
        }
        directory.remove(&name("alice")).unwrap();
        directory.register(name("dave")).unwrap();
        assert_eq!(
            directory.list_all(),
            vec![name("carol"), name("bob"), name("dave")]
        );
    }

    #[test]
    fn removed_user_no_longer_resolves() {
        let mut directory = Directory::new();
        directory.register(name("alice")).unwrap();
        let handle = directory.handle(&name("alice")).unwrap();

        directory.remove(&name("alice")).unwrap();
        assert!(directory.get(handle).is_none());
        assert_eq!(
            directory.find(&name("alice")).err(),
            Some(SocialError::NotFound(name("alice")))
        );
        assert_eq!(
            directory.remove(&name("alice")).err(),
            Some(SocialError::NotFound(name("alice")))
        );

        // the name is free again, in a fresh slot
        directory.register(name("alice")).unwrap();
        assert_ne!(directory.handle(&name("alice")).unwrap(), handle);
    }

    #[test]
    fn pair_mut_refuses_aliasing() {
        let mut directory = Directory::new();
        directory.register(name("alice")).unwrap();
        directory.register(name("bob")).unwrap();
        let a = directory.handle(&name("alice")).unwrap();
        let b = directory.handle(&name("bob")).unwrap();

        assert!(directory.pair_mut(a, a).is_none());
        let (bob, alice) = directory.pair_mut(b, a).unwrap();
        assert_eq!(bob.username(), &name("bob"));
        assert_eq!(alice.username(), &name("alice"));
    }

    #[test]
    fn seed_skips_repeated_names() {
        let records = vec![
            UserRecord::new(name("alice"), "pw"),
            UserRecord::new(name("bob"), "pw"),
            UserRecord::new(name("alice"), "other"),
        ];
        let directory = Directory::seed(&records);
        assert_eq!(directory.list_all(), vec![name("alice"), name("bob")]);
    }
}
