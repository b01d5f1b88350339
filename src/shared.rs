use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    Directory, ProfileSnapshot, RelationshipEngine, Result, SessionView, UserRecord, Username,
};

/// Cloneable handle to a directory shared between tasks.
///
/// Every mutation runs under the write lock for its whole duration, so a
/// two-profile change is never observed half applied. Queries share the read
/// lock.
#[derive(Clone, Default)]
pub struct SharedDirectory {
    inner: Arc<RwLock<Directory>>,
}

impl SharedDirectory {
    pub fn new(directory: Directory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(directory)),
        }
    }

    pub fn seed(records: &[UserRecord]) -> Self {
        Self::new(Directory::seed(records))
    }

    pub async fn read<T>(&self, func: impl FnOnce(&Directory) -> T) -> T {
        func(&*self.inner.read().await)
    }

    pub async fn write<T>(&self, func: impl FnOnce(&mut Directory) -> T) -> T {
        func(&mut *self.inner.write().await)
    }

    /// Runs `func` against a [`SessionView`] for `viewer`.
    pub async fn view<T>(
        &self,
        viewer: &Username,
        func: impl FnOnce(&SessionView<'_>) -> T,
    ) -> Result<T> {
        let directory = self.inner.read().await;
        let view = SessionView::new(&directory, viewer)?;
        Ok(func(&view))
    }

    pub async fn register(&self, username: Username) -> Result<()> {
        self.write(|d| d.register(username).map(|_| ())).await
    }

    pub async fn find(&self, username: &Username) -> Result<ProfileSnapshot> {
        self.read(|d| d.find(username).map(ProfileSnapshot::from)).await
    }

    pub async fn list_all(&self) -> Vec<Username> {
        self.read(Directory::list_all).await
    }

    pub async fn delete_user(&self, username: &Username) -> Result<()> {
        self.write(|d| RelationshipEngine::delete_user(d, username)).await
    }

    pub async fn send_request(&self, from: &Username, to: &Username) -> Result<()> {
        self.write(|d| RelationshipEngine::send_request(d, from, to)).await
    }

    pub async fn accept_request(&self, accepter: &Username, requester: &Username) -> Result<()> {
        self.write(|d| RelationshipEngine::accept_request(d, accepter, requester))
            .await
    }

    pub async fn reject_request(&self, rejecter: &Username, requester: &Username) -> Result<()> {
        self.write(|d| RelationshipEngine::reject_request(d, rejecter, requester))
            .await
    }

    pub async fn remove_friend(&self, user: &Username, friend: &Username) -> Result<bool> {
        self.write(|d| RelationshipEngine::remove_friend(d, user, friend))
            .await
    }

    pub async fn add_post(&self, owner: &Username, text: impl Into<String>) -> Result<usize> {
        let text = text.into();
        self.write(|d| RelationshipEngine::add_post(d, owner, text)).await
    }

    pub async fn delete_post(&self, owner: &Username, index: usize) -> Result<bool> {
        self.write(|d| RelationshipEngine::delete_post(d, owner, index))
            .await
    }

    pub async fn like_own_post(&self, owner: &Username, index: usize) -> Result<bool> {
        self.write(|d| RelationshipEngine::like_own_post(d, owner, index))
            .await
    }

    pub async fn like_post(
        &self,
        viewer: &Username,
        owner: &Username,
        index: usize,
    ) -> Result<bool> {
        self.write(|d| RelationshipEngine::like_post(d, viewer, owner, index))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Username {
        Username(s.into())
    }

    #[tokio::test]
    async fn concurrent_accepts_stay_symmetric() -> anyhow::Result<()> {
        let shared = SharedDirectory::default();
        shared.register(name("hub")).await?;
        let spokes: Vec<_> = (0..16).map(|i| name(&format!("user{i}"))).collect();
        for spoke in &spokes {
            shared.register(spoke.clone()).await?;
            shared.send_request(spoke, &name("hub")).await?;
        }

        let tasks: Vec<_> = spokes
            .iter()
            .cloned()
            .map(|spoke| {
                let shared = shared.clone();
                tokio::spawn(async move { shared.accept_request(&name("hub"), &spoke).await })
            })
            .collect();
        for task in tasks {
            task.await??;
        }

        let hub = shared.find(&name("hub")).await?;
        assert_eq!(hub.friends.len(), spokes.len());
        assert!(hub.incoming_requests.is_empty());
        for spoke in &spokes {
            let profile = shared.find(spoke).await?;
            assert_eq!(profile.friends, vec![name("hub")]);
            assert!(profile.outgoing_requests.is_empty());
        }
        Ok(())
    }

    #[tokio::test]
    async fn view_reports_visibility() -> anyhow::Result<()> {
        let shared = SharedDirectory::seed(&[
            UserRecord::new(name("alice"), "a"),
            UserRecord::new(name("bob"), "b"),
        ]);
        shared.add_post(&name("alice"), "hi").await?;
        let seen = shared
            .view(&name("bob"), |view| view.can_see_posts(&name("alice")))
            .await??;
        assert!(!seen);

        shared.send_request(&name("alice"), &name("bob")).await?;
        shared.accept_request(&name("bob"), &name("alice")).await?;
        assert!(shared.like_post(&name("bob"), &name("alice"), 0).await?);
        let likes = shared
            .view(&name("bob"), |view| {
                view.visible_posts(&name("alice"))
                    .map(|posts| posts.map(|p| p[0].likes))
            })
            .await??;
        assert_eq!(likes, Some(1));
        Ok(())
    }
}
